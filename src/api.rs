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

//! HTTP client for the sensor backend.
//!
//! Two endpoints are consumed:
//! - `GET {base}/api/sensors/{id}/chart-data?limit=N` -> [`TimeSeriesPayload`]
//! - `GET {base}/api/sensors` -> list of [`SensorSummary`] (startup list and diagnostics)

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};

/// Opaque sensor identifier as served by the backend.
pub type SensorId = String;

/// Column-oriented chart data; index `i` of every column is one reading.
/// A reading may lack any single metric, which arrives as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPayload {
    pub timestamps: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub moisture: Vec<Option<f64>>,
}

impl TimeSeriesPayload {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// All four columns must be the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.timestamps.len();
        if self.temperature.len() != n || self.humidity.len() != n || self.moisture.len() != n {
            return Err(ViewerError::MalformedPayload(format!(
                "misaligned columns: timestamps={} temperature={} humidity={} moisture={}",
                n,
                self.temperature.len(),
                self.humidity.len(),
                self.moisture.len()
            )));
        }
        Ok(())
    }
}

/// Entry of the sensor list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSummary {
    pub id: SensorId,
    #[serde(default)]
    pub hub_id: Option<String>,
}

#[derive(Clone)]
pub struct SensorApi {
    http_client: Client,
    base_url: Url,
    reading_limit: u32,
}

impl SensorApi {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ViewerError::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ViewerError::config(format!("invalid base_url {}: {e}", config.base_url)))?;

        Ok(Self {
            http_client,
            base_url,
            reading_limit: config.reading_limit,
        })
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so ids containing `/`, `?` or `#` stay one segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ViewerError::config(format!("base_url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn chart_data_url(&self, sensor: &str) -> Result<Url> {
        let mut url = self.endpoint(["api", "sensors", sensor, "chart-data"])?;
        url.set_query(Some(&format!("limit={}", self.reading_limit)));
        Ok(url)
    }

    pub fn sensors_url(&self) -> Result<Url> {
        self.endpoint(["api", "sensors"])
    }

    /// Fetch the recent series for one sensor.
    ///
    /// # Errors
    ///
    /// `FetchFailure` on transport errors, `HttpStatus` on non-2xx responses and
    /// `MalformedPayload` when the body does not decode or the columns disagree in length.
    /// An empty payload is returned as `Ok`; deciding what "no data" means is up to the caller.
    pub async fn chart_data(&self, sensor: &str) -> Result<TimeSeriesPayload> {
        let url = self.chart_data_url(sensor)?;
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ViewerError::fetch(sensor, format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ViewerError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ViewerError::fetch(sensor, format!("Failed to read body: {e}")))?;
        let payload: TimeSeriesPayload = serde_json::from_slice(&body)
            .map_err(|e| ViewerError::MalformedPayload(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    /// List every sensor the backend knows about.
    pub async fn sensors(&self) -> Result<Vec<SensorSummary>> {
        let url = self.sensors_url()?;
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ViewerError::fetch("", format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ViewerError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ViewerError::MalformedPayload(e.to_string()))
    }
}

/// Result of the manual "Check API" diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticReport {
    Working(Vec<SensorSummary>),
    HttpError(u16),
    ConnectionFailed(String),
}

impl DiagnosticReport {
    pub fn from_result(result: Result<Vec<SensorSummary>>) -> Self {
        match result {
            Ok(sensors) => Self::Working(sensors),
            Err(ViewerError::HttpStatus { status, .. }) => Self::HttpError(status),
            Err(e) => Self::ConnectionFailed(e.to_string()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Working(sensors) => {
                let mut out = vec![format!("API is working. Found {} sensors.", sensors.len())];
                out.extend(sensors.iter().map(|s| {
                    format!("Sensor: {}, Hub: {}", s.id, s.hub_id.as_deref().unwrap_or("Unknown"))
                }));
                out
            }
            Self::HttpError(status) => vec![format!("API error: {status}")],
            Self::ConnectionFailed(reason) => vec![format!("API connection failed: {reason}")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> SensorApi {
        let cfg = ViewerConfig {
            base_url: "http://localhost:8000/".to_string(),
            reading_limit: 50,
            ..ViewerConfig::default()
        };
        SensorApi::new(&cfg).unwrap()
    }

    #[test]
    fn test_urls() {
        let api = api();
        assert_eq!(
            api.chart_data_url("s1").unwrap().as_str(),
            "http://localhost:8000/api/sensors/s1/chart-data?limit=50"
        );
        assert_eq!(api.sensors_url().unwrap().as_str(), "http://localhost:8000/api/sensors");
    }

    #[test]
    fn test_sensor_id_stays_one_path_segment() {
        let api = api();
        assert_eq!(
            api.chart_data_url("hub#1").unwrap().as_str(),
            "http://localhost:8000/api/sensors/hub%231/chart-data?limit=50"
        );
        assert_eq!(
            api.chart_data_url("a/b?c").unwrap().as_str(),
            "http://localhost:8000/api/sensors/a%2Fb%3Fc/chart-data?limit=50"
        );
    }

    #[test]
    fn test_base_url_with_prefix() {
        let cfg = ViewerConfig {
            base_url: "http://gateway.lan/sensors-backend".to_string(),
            ..ViewerConfig::default()
        };
        let api = SensorApi::new(&cfg).unwrap();
        assert_eq!(
            api.sensors_url().unwrap().as_str(),
            "http://gateway.lan/sensors-backend/api/sensors"
        );
    }

    #[test]
    fn test_payload_validation() {
        let mut p = TimeSeriesPayload {
            timestamps: vec!["2024-01-01T00:00:00Z".into()],
            temperature: vec![Some(21.5)],
            humidity: vec![Some(40.0)],
            moisture: vec![Some(55.0)],
        };
        assert!(p.validate().is_ok());
        p.moisture.clear();
        assert!(matches!(p.validate(), Err(ViewerError::MalformedPayload(_))));
        assert!(TimeSeriesPayload::default().validate().is_ok());
        assert!(TimeSeriesPayload::default().is_empty());
    }

    #[test]
    fn test_payload_missing_column_is_malformed() {
        let parsed: std::result::Result<TimeSeriesPayload, _> =
            serde_json::from_str(r#"{"timestamps":[],"temperature":[],"humidity":[]}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_payload_null_values_decode() {
        let p: TimeSeriesPayload = serde_json::from_str(
            r#"{"timestamps":["2024-01-01T00:00:00Z","2024-01-01T01:00:00Z"],
                "temperature":[21.5,null],"humidity":[null,41.0],"moisture":[55.0,56.0]}"#,
        )
        .unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.temperature, vec![Some(21.5), None]);
        assert_eq!(p.humidity, vec![None, Some(41.0)]);
    }

    #[test]
    fn test_sensor_summary_hub_optional() {
        let list: Vec<SensorSummary> =
            serde_json::from_str(r#"[{"id":"s1","hub_id":"hub-a"},{"id":"s2"}]"#).unwrap();
        assert_eq!(list[0].hub_id.as_deref(), Some("hub-a"));
        assert_eq!(list[1].hub_id, None);
    }

    #[test]
    fn test_diagnostic_lines() {
        let report = DiagnosticReport::Working(vec![
            SensorSummary { id: "s1".into(), hub_id: Some("hub-a".into()) },
            SensorSummary { id: "s2".into(), hub_id: None },
        ]);
        assert_eq!(
            report.lines(),
            vec![
                "API is working. Found 2 sensors.".to_string(),
                "Sensor: s1, Hub: hub-a".to_string(),
                "Sensor: s2, Hub: Unknown".to_string(),
            ]
        );
        let err = DiagnosticReport::from_result(Err(ViewerError::HttpStatus { status: 503, url: String::new() }));
        assert_eq!(err.lines(), vec!["API error: 503".to_string()]);
    }
}
