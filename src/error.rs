/*
 * This file is part of Sensorview.
 *
 * Copyright (C) 2025 Sensorview contributors
 *
 * Sensorview is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorview is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorview. If not, see <https://www.gnu.org/licenses/>.
 */

//! Unified error handling for Sensorview
//!
//! Every failure the dashboard can run into is one variant of [`ViewerError`].
//! None of them are fatal to the refresh loop: the session converts each one
//! into a status line and keeps polling.

use std::io;

/// Result type alias using ViewerError
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Unified error type for all Sensorview operations
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Request for sensor {sensor} failed: {reason}")]
    FetchFailure {
        sensor: String,
        reason: String,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: u16,
        url: String,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No readings for sensor {0}")]
    EmptyResult(String),

    // ============================================================================
    // Rendering Errors
    // ============================================================================
    #[error("Render target not found: {0}")]
    MissingRenderTarget(String),

    #[error("No sensors available")]
    NoSensorsAvailable,

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ViewerError {
    /// Create a fetch failure for a sensor
    pub fn fetch(sensor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailure {
            sensor: sensor.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Network errors, non-2xx statuses and undecodable bodies all count as a failed fetch.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailure { .. } | Self::HttpStatus { .. } | Self::MalformedPayload(_)
        )
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        match e.status() {
            Some(status) => Self::HttpStatus { status: status.as_u16(), url },
            None if e.is_decode() => Self::MalformedPayload(e.to_string()),
            None => Self::FetchFailure { sensor: String::new(), reason: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_classification() {
        assert!(ViewerError::fetch("s1", "connection refused").is_fetch_failure());
        assert!(ViewerError::HttpStatus { status: 500, url: "x".into() }.is_fetch_failure());
        assert!(ViewerError::MalformedPayload("eof".into()).is_fetch_failure());
        assert!(!ViewerError::EmptyResult("s1".into()).is_fetch_failure());
        assert!(!ViewerError::NoSensorsAvailable.is_fetch_failure());
        assert!(!ViewerError::MissingRenderTarget("tempChart".into()).is_fetch_failure());
    }

    #[test]
    fn test_display_messages() {
        let e = ViewerError::HttpStatus { status: 500, url: "http://h/api".into() };
        assert_eq!(e.to_string(), "HTTP 500 from http://h/api");
        assert_eq!(ViewerError::config("bad").to_string(), "Configuration error: bad");
    }
}
