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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::shaper::{Clock, Metric};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_refresh_interval_ms() -> u64 { DEFAULT_REFRESH_INTERVAL_MS }
fn default_request_timeout_ms() -> u64 { 10_000 }
fn default_reading_limit() -> u32 { 100 }
fn default_surfaces() -> Vec<String> {
    Metric::ALL.iter().map(|m| m.surface_id().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Sent as `?limit=` on chart-data requests
    #[serde(default = "default_reading_limit")]
    pub reading_limit: u32,
    /// Fixed sensor list. When empty the list is read from the backend once at startup.
    #[serde(default)]
    pub sensors: Vec<String>,
    /// Chart surfaces laid out on screen; leaving one out hides that metric's chart.
    #[serde(default = "default_surfaces")]
    pub surfaces: Vec<String>,
    /// Render timestamps in UTC instead of local time
    #[serde(default)]
    pub utc: bool,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            reading_limit: default_reading_limit(),
            sensors: Vec::new(),
            surfaces: default_surfaces(),
            utc: false,
            log_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn clock(&self) -> Clock {
        if self.utc { Clock::Utc } else { Clock::Local }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("sensorview").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("sensorview")
            .join("config.json");
    }
    PathBuf::from("/etc/sensorview/config.json")
}

pub fn is_safe_sensor_id(s: &str) -> bool {
    // ids end up in a URL path segment
    if s.is_empty() || s.len() > 128 { return false; }
    s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '@'))
}

pub fn validate_config(cfg: &ViewerConfig) -> Result<()> {
    let url = cfg.base_url.trim();
    if url.is_empty() {
        return Err(ViewerError::config("base_url must not be empty"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ViewerError::config(format!("base_url must start with http:// or https:// (got {url})")));
    }
    if cfg.refresh_interval_ms < MIN_REFRESH_INTERVAL_MS {
        return Err(ViewerError::config(format!(
            "refresh_interval_ms must be at least {MIN_REFRESH_INTERVAL_MS}"
        )));
    }
    if cfg.request_timeout_ms == 0 {
        return Err(ViewerError::config("request_timeout_ms must be positive"));
    }
    if cfg.reading_limit == 0 || cfg.reading_limit > 10_000 {
        return Err(ViewerError::config("reading_limit out of range (1..10000)"));
    }
    if cfg.sensors.len() > 256 {
        return Err(ViewerError::config("too many sensors (max 256)"));
    }
    for (i, s) in cfg.sensors.iter().enumerate() {
        if !is_safe_sensor_id(s) {
            return Err(ViewerError::config(format!("invalid characters or length in sensor #{}", i + 1)));
        }
    }
    for s in &cfg.surfaces {
        if !Metric::ALL.iter().any(|m| m.surface_id() == s) {
            return Err(ViewerError::config(format!("unknown chart surface: {s}")));
        }
    }
    Ok(())
}

pub fn load_config_from(path: &Path) -> Result<ViewerConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: ViewerConfig = serde_json::from_str(&data)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Load the user config; a missing file means defaults.
pub fn load_config() -> Result<ViewerConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(ViewerConfig::default());
    }
    load_config_from(&path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    /// Query the sensor list once, print the result and exit
    Check,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub url: Option<String>,
    pub interval_ms: Option<u64>,
    pub sensors: Vec<String>,
    pub logging: bool,
    pub utc: bool,
    pub check: bool,
}

impl CliOptions {
    /// Parse everything after the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = CliOptions::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_ref() {
                "--url" => opts.url = Some(expect_value(&mut it, "--url")?),
                "--interval" => {
                    let v = expect_value(&mut it, "--interval")?;
                    let ms = v
                        .parse::<u64>()
                        .map_err(|_| ViewerError::config(format!("--interval expects milliseconds, got {v}")))?;
                    opts.interval_ms = Some(ms);
                }
                "--sensor" => opts.sensors.push(expect_value(&mut it, "--sensor")?),
                "--logging" => opts.logging = true,
                "--utc" => opts.utc = true,
                "check" => opts.check = true,
                other => return Err(ViewerError::config(format!("unknown argument: {other}"))),
            }
        }
        Ok(opts)
    }

    pub fn command(&self) -> Command {
        if self.check { Command::Check } else { Command::Dashboard }
    }

    /// Command-line values win over the file.
    pub fn apply(&self, cfg: &mut ViewerConfig) -> Result<()> {
        if let Some(url) = &self.url { cfg.base_url = url.clone(); }
        if let Some(ms) = self.interval_ms { cfg.refresh_interval_ms = ms; }
        if !self.sensors.is_empty() { cfg.sensors = self.sensors.clone(); }
        if self.utc { cfg.utc = true; }
        validate_config(cfg)
    }
}

fn expect_value<I, S>(it: &mut I, flag: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    it.next()
        .map(|v| v.as_ref().to_string())
        .ok_or_else(|| ViewerError::config(format!("{flag} requires a value")))
}
