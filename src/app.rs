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

use std::time::{Duration, Instant};

use chrono::Local;
use serde_json::json;

use crate::api::{DiagnosticReport, SensorId, SensorSummary, TimeSeriesPayload};
use crate::charts::{ChartManager, TerminalCharts};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::logger::log_event;
use crate::session::{CycleOutcome, FetchTicket, Session};

pub const HELP_LINE: &str =
    "↑/↓ or j/k: select | 1-9: jump | r: refresh | d: check API | R: reload | q: quit";

pub struct App {
    pub config: ViewerConfig,
    pub session: Session<TerminalCharts>,
    // app status panel
    pub loaded_at: String,
    pub sensors_detected: usize,
    pub diagnostics: Vec<String>,
    pub diagnostic_running: bool,
    pub last_outcome: Option<CycleOutcome>,
    reload_generation: u64,
    pending_reload: Option<u64>,
}

impl App {
    /// Build the "page": one fresh session bound to `entries`.
    /// Returns the first request to run, if any sensor is available.
    pub fn new(config: ViewerConfig, entries: Vec<SensorId>, now: Instant) -> (Self, Option<FetchTicket>) {
        let session = Self::fresh_session(&config);
        let mut app = Self {
            config,
            session,
            loaded_at: String::new(),
            sensors_detected: 0,
            diagnostics: Vec::new(),
            diagnostic_running: false,
            last_outcome: None,
            reload_generation: 0,
            pending_reload: None,
        };
        let ticket = app.start(entries, now);
        (app, ticket)
    }

    fn fresh_session(config: &ViewerConfig) -> Session<TerminalCharts> {
        let charts = ChartManager::new(TerminalCharts::new(config.surfaces.iter().cloned()));
        Session::new(charts, config.clock())
    }

    fn start(&mut self, entries: Vec<SensorId>, now: Instant) -> Option<FetchTicket> {
        self.loaded_at = Local::now().format("%H:%M:%S").to_string();
        self.sensors_detected = entries.len();
        self.last_outcome = None;
        self.session
            .start_auto_refresh(Duration::from_millis(self.config.refresh_interval_ms), now);
        self.session.bind(entries)
    }

    /// Ask for a fresh sensor list. Returns the generation its response must carry;
    /// the current page stays on screen until that response arrives.
    pub fn begin_reload(&mut self) -> u64 {
        self.reload_generation += 1;
        self.pending_reload = Some(self.reload_generation);
        log_event("reload_requested", json!({ "generation": self.reload_generation }));
        self.reload_generation
    }

    pub fn is_reloading(&self) -> bool {
        self.pending_reload.is_some()
    }

    /// Apply a sensor-list response. Only the most recent reload request is honoured;
    /// a failed list reloads into the "no sensors" state.
    pub fn finish_reload(
        &mut self,
        generation: u64,
        result: Result<Vec<SensorSummary>>,
        now: Instant,
    ) -> Option<FetchTicket> {
        if self.pending_reload != Some(generation) {
            log_event("stale_sensor_list", json!({ "generation": generation }));
            return None;
        }
        let entries = match result {
            Ok(list) => list.into_iter().map(|s| s.id).collect(),
            Err(e) => {
                log_event("sensor_list_failed", json!({ "error": e.to_string() }));
                Vec::new()
            }
        };
        self.reload(entries, now)
    }

    /// Tear the current session down completely and start over with a new list.
    pub fn reload(&mut self, entries: Vec<SensorId>, now: Instant) -> Option<FetchTicket> {
        self.pending_reload = None;
        self.session.teardown();
        let mut session = Self::fresh_session(&self.config);
        session.continue_numbering_from(self.session.state());
        self.session = session;
        self.diagnostics.clear();
        self.start(entries, now)
    }

    pub fn apply_diagnostic(&mut self, report: DiagnosticReport) {
        self.diagnostic_running = false;
        self.diagnostics = report.lines();
    }

    pub fn begin_diagnostic(&mut self) {
        self.diagnostic_running = true;
        self.diagnostics = vec!["Checking API...".to_string()];
    }

    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<TimeSeriesPayload>) {
        let outcome = self.session.complete(ticket, result);
        if outcome != CycleOutcome::Stale {
            self.last_outcome = Some(outcome);
        }
    }

    /// Shut down: no timer and no charts survive.
    pub fn shutdown(&mut self) {
        self.session.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Status;

    fn payload() -> TimeSeriesPayload {
        TimeSeriesPayload {
            timestamps: vec!["2024-01-01T00:00:00Z".into()],
            temperature: vec![Some(21.5)],
            humidity: vec![Some(40.0)],
            moisture: vec![Some(55.0)],
        }
    }

    #[test]
    fn test_new_starts_timer_and_selects_first() {
        let now = Instant::now();
        let (app, ticket) = App::new(ViewerConfig::default(), vec!["s1".into(), "s2".into()], now);
        assert_eq!(ticket.unwrap().sensor, "s1");
        assert!(app.session.timer().is_active());
        assert_eq!(app.session.timer().interval(), Some(Duration::from_secs(60)));
        assert_eq!(app.sensors_detected, 2);
    }

    #[test]
    fn test_reload_replaces_session() {
        let now = Instant::now();
        let (mut app, ticket) = App::new(ViewerConfig::default(), vec!["s1".into()], now);
        let ticket = ticket.unwrap();
        app.complete(&ticket, Ok(payload()));
        assert_eq!(app.session.charts().live_charts(), 3);

        let next = app.reload(Vec::new(), now);
        assert!(next.is_none());
        assert_eq!(app.session.charts().live_charts(), 0);
        assert_eq!(app.session.view().summary.status(), Some(Status::NoSensors));
        // response for the old page is ignored
        app.complete(&ticket, Ok(payload()));
        assert_eq!(app.session.charts().live_charts(), 0);
    }

    #[test]
    fn test_reload_same_list_ignores_old_ticket() {
        let now = Instant::now();
        let (mut app, old) = App::new(ViewerConfig::default(), vec!["s1".into()], now);
        let old = old.unwrap();
        let new = app.reload(vec!["s1".into()], now).unwrap();
        assert_ne!(old.seq, new.seq);
        app.complete(&old, Ok(payload()));
        assert_eq!(app.session.charts().live_charts(), 0);
        app.complete(&new, Ok(payload()));
        assert_eq!(app.session.charts().live_charts(), 3);
    }

    fn summaries(ids: &[&str]) -> Vec<SensorSummary> {
        ids.iter().map(|id| SensorSummary { id: id.to_string(), hub_id: None }).collect()
    }

    #[test]
    fn test_superseded_sensor_list_is_ignored() {
        let now = Instant::now();
        let (mut app, _) = App::new(ViewerConfig::default(), vec!["s1".into()], now);
        let first = app.begin_reload();
        let second = app.begin_reload();
        assert!(app.is_reloading());

        // the older response arrives late and must not rebuild the page
        assert!(app.finish_reload(first, Ok(summaries(&["old"])), now).is_none());
        assert!(app.is_reloading());
        assert_eq!(app.session.view().selection.entries().to_vec(), vec!["s1".to_string()]);

        let ticket = app.finish_reload(second, Ok(summaries(&["n1", "n2"])), now).unwrap();
        assert_eq!(ticket.sensor, "n1");
        assert!(!app.is_reloading());
        assert_eq!(app.sensors_detected, 2);

        // and once applied, nothing else from the first request counts either
        assert!(app.finish_reload(first, Ok(summaries(&["old"])), now).is_none());
        assert_eq!(app.session.selected().map(String::as_str), Some("n1"));
    }

    #[test]
    fn test_failed_sensor_list_reloads_empty() {
        let now = Instant::now();
        let (mut app, _) = App::new(ViewerConfig::default(), vec!["s1".into()], now);
        let generation = app.begin_reload();
        let err = crate::error::ViewerError::fetch("", "connection refused");
        assert!(app.finish_reload(generation, Err(err), now).is_none());
        assert_eq!(app.session.view().summary.status(), Some(Status::NoSensors));
        assert!(!app.is_reloading());
    }

    #[test]
    fn test_direct_reload_cancels_pending_list() {
        let now = Instant::now();
        let (mut app, _) = App::new(ViewerConfig::default(), vec!["s1".into()], now);
        let generation = app.begin_reload();
        app.reload(vec!["s2".into()], now);
        assert!(app.finish_reload(generation, Ok(summaries(&["x"])), now).is_none());
        assert_eq!(app.session.selected().map(String::as_str), Some("s2"));
    }

    #[test]
    fn test_surfaces_follow_config() {
        let cfg = ViewerConfig { surfaces: vec!["tempChart".into()], ..ViewerConfig::default() };
        let (mut app, ticket) = App::new(cfg, vec!["s1".into()], Instant::now());
        app.complete(&ticket.unwrap(), Ok(payload()));
        assert_eq!(app.session.charts().live_charts(), 1);
        assert_eq!(app.session.view().notices.len(), 2);
    }

    #[test]
    fn test_diagnostic_flow() {
        let (mut app, _) = App::new(ViewerConfig::default(), Vec::new(), Instant::now());
        app.begin_diagnostic();
        assert!(app.diagnostic_running);
        app.apply_diagnostic(DiagnosticReport::HttpError(502));
        assert!(!app.diagnostic_running);
        assert_eq!(app.diagnostics, vec!["API error: 502".to_string()]);
    }
}
