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

//! View state the terminal renderer draws from: sensor list, heading and summary panel.

use crate::api::SensorId;
use crate::charts::{ChartBackend, ChartManager};
use crate::error::ViewerError;
use crate::logger::log_event;
use crate::shaper::{format_reading_time, Clock, Metric, Reading};

/// Status lines shown in the summary panel. The texts are distinct on purpose.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    NoData,
    Error,
    NoSensors,
}

impl Status {
    pub fn message(self) -> &'static str {
        match self {
            Status::Loading => "Loading data...",
            Status::NoData => "No data available for this sensor",
            Status::Error => "Error loading data. Please try again later.",
            Status::NoSensors => "No sensors available",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Blank,
    Status(Status),
    Latest(Reading),
}

#[derive(Debug, Clone)]
pub struct SummaryPanel {
    content: PanelContent,
    clock: Clock,
}

impl SummaryPanel {
    pub fn new(clock: Clock) -> Self {
        Self { content: PanelContent::Blank, clock }
    }

    pub fn content(&self) -> &PanelContent {
        &self.content
    }

    pub fn render_latest(&mut self, reading: Option<Reading>) {
        self.content = match reading {
            Some(r) => PanelContent::Latest(r),
            None => PanelContent::Status(Status::NoData),
        };
    }

    /// Replaces whatever reading was displayed.
    pub fn render_status(&mut self, status: Status) {
        self.content = PanelContent::Status(status);
    }

    pub fn status(&self) -> Option<Status> {
        match self.content {
            PanelContent::Status(s) => Some(s),
            _ => None,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match &self.content {
            PanelContent::Blank => Vec::new(),
            PanelContent::Status(s) => vec![s.message().to_string()],
            PanelContent::Latest(r) => {
                let mut out = vec![format!("Time: {}", format_reading_time(&r.timestamp, self.clock))];
                out.extend(Metric::ALL.iter().map(|m| {
                    let name = match m {
                        Metric::Temperature => "Temperature",
                        Metric::Humidity => "Humidity",
                        Metric::Moisture => "Moisture",
                    };
                    match r.value(*m) {
                        Some(v) => format!("{}: {:.1}{}", name, v, m.unit()),
                        None => format!("{}: n/a", name),
                    }
                }));
                out
            }
        }
    }
}

/// Selectable sensors; at most one entry is active.
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    entries: Vec<SensorId>,
    active: Option<usize>,
}

impl SelectionList {
    pub fn new(entries: Vec<SensorId>) -> Self {
        Self { entries, active: None }
    }

    pub fn entries(&self) -> &[SensorId] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active == Some(idx)
    }

    /// Deactivate everything, then activate the entry for `id`. Unknown ids leave nothing active.
    pub fn activate_id(&mut self, id: &str) -> Option<usize> {
        self.active = self.entries.iter().position(|e| e == id);
        self.active
    }
}

pub struct ViewBinder {
    pub selection: SelectionList,
    pub summary: SummaryPanel,
    pub heading: String,
    /// Per-cycle notices (missing chart surfaces)
    pub notices: Vec<String>,
}

impl ViewBinder {
    pub fn new(clock: Clock) -> Self {
        Self {
            selection: SelectionList::default(),
            summary: SummaryPanel::new(clock),
            heading: String::new(),
            notices: Vec::new(),
        }
    }

    /// Install the sensor list. Returns the entry to select first, or `None`
    /// after switching to the "no sensors" state with every chart cleared.
    pub fn bind_selection_list<B: ChartBackend>(
        &mut self,
        entries: Vec<SensorId>,
        charts: &mut ChartManager<B>,
    ) -> Option<SensorId> {
        self.selection = SelectionList::new(entries);
        self.notices.clear();
        if self.selection.is_empty() {
            self.heading = Status::NoSensors.message().to_string();
            self.summary.render_status(Status::NoSensors);
            charts.clear_all();
            let e = ViewerError::NoSensorsAvailable;
            log_event("no_sensors", serde_json::json!({ "error": e.to_string() }));
            return None;
        }
        self.selection.entries().first().cloned()
    }

    pub fn show_selected(&mut self, id: &str) {
        self.heading = format!("Sensor: {id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::TerminalCharts;

    fn reading() -> Reading {
        Reading {
            timestamp: "2024-01-01T00:00:00Z".into(),
            temperature: Some(21.5),
            humidity: Some(40.0),
            moisture: Some(55.0),
        }
    }

    #[test]
    fn test_status_messages_are_distinct() {
        let all = [Status::Loading, Status::NoData, Status::Error, Status::NoSensors];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn test_render_latest_lines() {
        let mut panel = SummaryPanel::new(Clock::Utc);
        panel.render_latest(Some(reading()));
        assert_eq!(
            panel.lines(),
            vec![
                "Time: 1/1/2024, 12:00:00 AM",
                "Temperature: 21.5°C",
                "Humidity: 40.0%",
                "Moisture: 55.0%",
            ]
        );
        assert_eq!(panel.status(), None);
    }

    #[test]
    fn test_render_latest_missing_metric_placeholder() {
        let mut panel = SummaryPanel::new(Clock::Utc);
        panel.render_latest(Some(Reading { humidity: None, ..reading() }));
        let lines = panel.lines();
        assert_eq!(lines[1], "Temperature: 21.5°C");
        assert_eq!(lines[2], "Humidity: n/a");
    }

    #[test]
    fn test_render_latest_none_shows_no_data() {
        let mut panel = SummaryPanel::new(Clock::Utc);
        panel.render_latest(None);
        assert_eq!(panel.status(), Some(Status::NoData));
    }

    #[test]
    fn test_status_overwrites_reading() {
        let mut panel = SummaryPanel::new(Clock::Utc);
        panel.render_latest(Some(reading()));
        panel.render_status(Status::Loading);
        assert_eq!(panel.lines(), vec!["Loading data..."]);
    }

    #[test]
    fn test_single_active_entry() {
        let mut list = SelectionList::new(vec!["s1".into(), "s2".into(), "s3".into()]);
        assert_eq!(list.activate_id("s1"), Some(0));
        assert_eq!(list.activate_id("s3"), Some(2));
        assert!(!list.is_active(0));
        assert!(list.is_active(2));
        assert_eq!(list.activate_id("missing"), None);
        assert_eq!(list.active(), None);
        assert_eq!(list.activate_id("s2"), Some(1));
    }

    #[test]
    fn test_bind_empty_list_shows_no_sensors_and_clears_charts() {
        let mut charts = ChartManager::new(TerminalCharts::with_all_surfaces());
        charts.render_series(Metric::Temperature, &["a".into()], &[Some(1.0)]).unwrap();
        let mut view = ViewBinder::new(Clock::Utc);
        assert_eq!(view.bind_selection_list(Vec::new(), &mut charts), None);
        assert_eq!(view.summary.status(), Some(Status::NoSensors));
        assert_eq!(view.heading, "No sensors available");
        assert_eq!(charts.live_charts(), 0);
    }

    #[test]
    fn test_bind_returns_first_entry() {
        let mut charts = ChartManager::new(TerminalCharts::with_all_surfaces());
        let mut view = ViewBinder::new(Clock::Utc);
        let first = view.bind_selection_list(vec!["s1".into(), "s2".into()], &mut charts);
        assert_eq!(first.as_deref(), Some("s1"));
        assert_eq!(view.selection.entries().len(), 2);
    }
}
