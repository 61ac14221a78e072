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

//! Turns a raw [`TimeSeriesPayload`] into chart-ready series and the latest reading.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};

use crate::api::TimeSeriesPayload;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Moisture,
}

impl Metric {
    /// Render order within one cycle.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Moisture];

    /// Fixed drawing surface each metric is bound to.
    pub fn surface_id(self) -> &'static str {
        match self {
            Metric::Temperature => "tempChart",
            Metric::Humidity => "humidityChart",
            Metric::Moisture => "moistureChart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::Humidity => "Humidity (%)",
            Metric::Moisture => "Moisture (%)",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity | Metric::Moisture => "%",
        }
    }

    /// Line colour as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Metric::Temperature => (255, 99, 132),
            Metric::Humidity => (54, 162, 235),
            Metric::Moisture => (75, 192, 192),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Metric::Temperature => 0,
            Metric::Humidity => 1,
            Metric::Moisture => 2,
        }
    }
}

/// One timestamped sample across all three metrics. `None` means the sensor did not report it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub moisture: Option<f64>,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Moisture => self.moisture,
        }
    }
}

/// Which clock labels are rendered in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    Local,
    Utc,
}

const LABEL_FORMAT: &str = "%b %-d, %I:%M %p";
const READING_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Labels and per-metric values for one fetch, ready for the chart manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedSeries {
    pub labels: Vec<String>,
    pub values: [Vec<Option<f64>>; 3],
}

impl ShapedSeries {
    pub fn values(&self, metric: Metric) -> &[Option<f64>] {
        &self.values[metric.index()]
    }
}

pub fn shape(payload: &TimeSeriesPayload, clock: Clock) -> ShapedSeries {
    ShapedSeries {
        labels: format_timestamps_with(&payload.timestamps, clock),
        values: [
            payload.temperature.clone(),
            payload.humidity.clone(),
            payload.moisture.clone(),
        ],
    }
}

/// Short axis labels ("Jan 1, 09:05 AM") in local time.
pub fn format_timestamps(timestamps: &[String]) -> Vec<String> {
    format_timestamps_with(timestamps, Clock::Local)
}

pub fn format_timestamps_with(timestamps: &[String], clock: Clock) -> Vec<String> {
    timestamps
        .iter()
        .map(|ts| format_in(ts, clock, LABEL_FORMAT))
        .collect()
}

/// Long form used by the summary panel ("1/1/2024, 12:00:00 AM").
pub fn format_reading_time(timestamp: &str, clock: Clock) -> String {
    format_in(timestamp, clock, READING_FORMAT)
}

/// The final element by position; the backend delivers series in chronological order.
pub fn extract_latest(payload: &TimeSeriesPayload) -> Option<Reading> {
    let last = payload.timestamps.len().checked_sub(1)?;
    Some(Reading {
        timestamp: payload.timestamps[last].clone(),
        temperature: *payload.temperature.get(last)?,
        humidity: *payload.humidity.get(last)?,
        moisture: *payload.moisture.get(last)?,
    })
}

fn format_in(raw: &str, clock: Clock, fmt: &str) -> String {
    let formatted = match clock {
        Clock::Local => convert(raw, &Local).map(|d| d.format(fmt).to_string()),
        Clock::Utc => convert(raw, &Utc).map(|d| d.format(fmt).to_string()),
    };
    // unparseable timestamps are shown verbatim
    formatted.unwrap_or_else(|| raw.to_string())
}

/// Offset-carrying timestamps are converted; naive ones are taken as wall time in `tz`.
fn convert<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    tz.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(n: usize) -> TimeSeriesPayload {
        TimeSeriesPayload {
            timestamps: (0..n).map(|i| format!("2024-01-01T{:02}:00:00Z", i)).collect(),
            temperature: (0..n).map(|i| Some(20.0 + i as f64)).collect(),
            humidity: (0..n).map(|i| Some(40.0 + i as f64)).collect(),
            moisture: (0..n).map(|i| Some(50.0 + i as f64)).collect(),
        }
    }

    #[test]
    fn test_extract_latest_is_last_index() {
        let p = payload(5);
        let r = extract_latest(&p).unwrap();
        assert_eq!(r.timestamp, "2024-01-01T04:00:00Z");
        assert_eq!(r.temperature, Some(24.0));
        assert_eq!(r.humidity, Some(44.0));
        assert_eq!(r.moisture, Some(54.0));
    }

    #[test]
    fn test_extract_latest_does_not_sort() {
        let p = TimeSeriesPayload {
            timestamps: vec!["2024-06-01T00:00:00Z".into(), "2024-01-01T00:00:00Z".into()],
            temperature: vec![Some(30.0), Some(10.0)],
            humidity: vec![Some(1.0), Some(2.0)],
            moisture: vec![Some(3.0), Some(4.0)],
        };
        let r = extract_latest(&p).unwrap();
        assert_eq!(r.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(r.temperature, Some(10.0));
    }

    #[test]
    fn test_extract_latest_keeps_missing_metric() {
        let mut p = payload(2);
        p.humidity[1] = None;
        let r = extract_latest(&p).unwrap();
        assert_eq!(r.humidity, None);
        assert_eq!(r.value(Metric::Temperature), Some(21.0));
    }

    #[test]
    fn test_extract_latest_empty() {
        assert_eq!(extract_latest(&TimeSeriesPayload::default()), None);
    }

    #[test]
    fn test_format_timestamps_preserves_length_and_order() {
        let ts: Vec<String> = vec![
            "2024-01-01T00:00:00Z".into(),
            "2024-03-15T13:45:00Z".into(),
            "2024-12-31T09:05:30+00:00".into(),
        ];
        let labels = format_timestamps_with(&ts, Clock::Utc);
        assert_eq!(labels, vec!["Jan 1, 12:00 AM", "Mar 15, 01:45 PM", "Dec 31, 09:05 AM"]);
        assert_eq!(labels, format_timestamps_with(&ts, Clock::Utc));
        assert_eq!(format_timestamps(&ts).len(), ts.len());
    }

    #[test]
    fn test_format_naive_and_offset_timestamps() {
        // naive isoformat() output, with microseconds
        let labels = format_timestamps_with(&["2024-01-01T12:30:00.123456".to_string()], Clock::Utc);
        assert_eq!(labels, vec!["Jan 1, 12:30 PM"]);
        let labels = format_timestamps_with(&["2024-01-01T12:30:00+02:00".to_string()], Clock::Utc);
        assert_eq!(labels, vec!["Jan 1, 10:30 AM"]);
    }

    #[test]
    fn test_unparseable_timestamp_passes_through() {
        let labels = format_timestamps_with(&["yesterday".to_string()], Clock::Utc);
        assert_eq!(labels, vec!["yesterday"]);
    }

    #[test]
    fn test_format_reading_time() {
        assert_eq!(format_reading_time("2024-01-01T00:00:00Z", Clock::Utc), "1/1/2024, 12:00:00 AM");
    }

    #[test]
    fn test_shape_splits_columns() {
        let shaped = shape(&payload(3), Clock::Utc);
        assert_eq!(shaped.labels.len(), 3);
        assert_eq!(shaped.values(Metric::Temperature), &[Some(20.0), Some(21.0), Some(22.0)]);
        assert_eq!(shaped.values(Metric::Moisture), &[Some(50.0), Some(51.0), Some(52.0)]);
    }

    #[test]
    fn test_metric_surfaces_are_distinct() {
        let ids: Vec<_> = Metric::ALL.iter().map(|m| m.surface_id()).collect();
        assert_eq!(ids, vec!["tempChart", "humidityChart", "moistureChart"]);
    }
}
