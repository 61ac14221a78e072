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

//! Sensor session: which sensor is selected, the fetch/render cycle and the refresh timer.
//!
//! The session never performs I/O itself. Starting a cycle hands out a
//! [`FetchTicket`]; whoever runs the request feeds the result back through
//! [`Session::complete`]. Only the most recently issued ticket for the
//! currently selected sensor is applied, so a slow response for a sensor the
//! user already switched away from can never overwrite the display.

use std::time::{Duration, Instant};

use serde_json::json;

use crate::api::{SensorId, TimeSeriesPayload};
use crate::charts::{ChartBackend, ChartManager};
use crate::config::DEFAULT_REFRESH_INTERVAL_MS;
use crate::error::{Result, ViewerError};
use crate::logger::log_event;
use crate::shaper::{extract_latest, shape, Clock, Metric};
use crate::view::{Status, ViewBinder};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS);

/// Identifies one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub sensor: SensorId,
}

/// What a completed fetch did to the display.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Rendered { points: usize, missing: Vec<Metric> },
    Empty,
    Failed(String),
    /// Superseded by a newer request or a different selection; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct SessionState {
    selected: Option<SensorId>,
    last_seq: u64,
}

impl SessionState {
    pub fn selected(&self) -> Option<&SensorId> {
        self.selected.as_ref()
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    fn issue(&mut self, sensor: SensorId) -> FetchTicket {
        self.last_seq += 1;
        FetchTicket { seq: self.last_seq, sensor }
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.last_seq && self.selected.as_deref() == Some(ticket.sensor.as_str())
    }
}

/// Single recurring timer. Starting it again replaces the old schedule.
#[derive(Debug, Default)]
pub struct RefreshTimer {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.interval = Some(interval);
        self.next_due = Some(now + interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// True once per elapsed period; missed periods are not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match (self.interval, self.next_due) {
            (Some(interval), Some(due)) if now >= due => {
                self.next_due = Some(now + interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

pub struct Session<B: ChartBackend> {
    state: SessionState,
    charts: ChartManager<B>,
    view: ViewBinder,
    timer: RefreshTimer,
    clock: Clock,
}

impl<B: ChartBackend> Session<B> {
    pub fn new(charts: ChartManager<B>, clock: Clock) -> Self {
        Self {
            state: SessionState::default(),
            charts,
            view: ViewBinder::new(clock),
            timer: RefreshTimer::default(),
            clock,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Keep ticket numbers increasing across a replaced session so tickets
    /// issued by the old one can never match the new one.
    pub fn continue_numbering_from(&mut self, previous: &SessionState) {
        self.state.last_seq = self.state.last_seq.max(previous.last_seq);
    }

    pub fn selected(&self) -> Option<&SensorId> {
        self.state.selected()
    }

    pub fn charts(&self) -> &ChartManager<B> {
        &self.charts
    }

    pub fn view(&self) -> &ViewBinder {
        &self.view
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    /// Install the sensor list and select the first entry.
    /// An empty list yields the "no sensors" state and no request.
    pub fn bind(&mut self, entries: Vec<SensorId>) -> Option<FetchTicket> {
        let first = self.view.bind_selection_list(entries, &mut self.charts)?;
        Some(self.select(first))
    }

    /// Select by list position.
    pub fn select_index(&mut self, idx: usize) -> Option<FetchTicket> {
        let id = self.view.selection.entries().get(idx).cloned()?;
        Some(self.select(id))
    }

    /// Select `sensor` and start a fresh cycle, even if it was already selected.
    pub fn select(&mut self, sensor: SensorId) -> FetchTicket {
        self.view.selection.activate_id(&sensor);
        self.view.show_selected(&sensor);
        self.state.selected = Some(sensor.clone());
        log_event("select", json!({ "sensor": sensor }));
        self.begin_cycle(sensor)
    }

    /// Timer entry point; no-op without a selection.
    pub fn refresh_tick(&mut self) -> Option<FetchTicket> {
        let sensor = self.state.selected.clone()?;
        Some(self.begin_cycle(sensor))
    }

    pub fn start_auto_refresh(&mut self, interval: Duration, now: Instant) {
        self.timer.start(interval, now);
    }

    /// Run the timer; returns a ticket when a refresh cycle was started.
    pub fn poll_timer(&mut self, now: Instant) -> Option<FetchTicket> {
        if self.timer.poll(now) {
            self.refresh_tick()
        } else {
            None
        }
    }

    fn begin_cycle(&mut self, sensor: SensorId) -> FetchTicket {
        self.view.summary.render_status(Status::Loading);
        self.state.issue(sensor)
    }

    /// Apply the result of a fetch.
    ///
    /// Charts are updated temperature, humidity, moisture, then the summary.
    /// Failures and empty results clear every chart so nothing stale stays on screen.
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<TimeSeriesPayload>) -> CycleOutcome {
        if !self.state.is_current(ticket) {
            log_event(
                "stale_response",
                json!({ "sensor": ticket.sensor, "seq": ticket.seq, "current_seq": self.state.last_seq }),
            );
            return CycleOutcome::Stale;
        }

        let payload = match result.and_then(|p| p.validate().map(|_| p)) {
            Ok(p) => p,
            Err(e) => {
                log_event("fetch_failed", json!({ "sensor": ticket.sensor, "error": e.to_string() }));
                self.charts.clear_all();
                self.view.notices.clear();
                self.view.summary.render_status(Status::Error);
                return CycleOutcome::Failed(e.to_string());
            }
        };

        if payload.is_empty() {
            let e = ViewerError::EmptyResult(ticket.sensor.clone());
            log_event("fetch_empty", json!({ "sensor": ticket.sensor, "error": e.to_string() }));
            self.charts.clear_all();
            self.view.notices.clear();
            self.view.summary.render_latest(None);
            return CycleOutcome::Empty;
        }

        let shaped = shape(&payload, self.clock);
        let mut missing = Vec::new();
        self.view.notices.clear();
        for metric in Metric::ALL {
            if let Err(ViewerError::MissingRenderTarget(surface)) =
                self.charts.render_series(metric, &shaped.labels, shaped.values(metric))
            {
                missing.push(metric);
                self.view.notices.push(format!("Chart surface {surface} not found"));
            }
        }
        self.view.summary.render_latest(extract_latest(&payload));
        log_event("fetch_ok", json!({ "sensor": ticket.sensor, "points": payload.len() }));

        CycleOutcome::Rendered { points: payload.len(), missing }
    }

    /// Select-list navigation helpers used by the key handler.
    pub fn select_next(&mut self) -> Option<FetchTicket> {
        let len = self.view.selection.entries().len();
        if len == 0 {
            return None;
        }
        let next = self.view.selection.active().map(|i| (i + 1) % len).unwrap_or(0);
        self.select_index(next)
    }

    pub fn select_prev(&mut self) -> Option<FetchTicket> {
        let len = self.view.selection.entries().len();
        if len == 0 {
            return None;
        }
        let prev = self
            .view
            .selection
            .active()
            .map(|i| (i + len - 1) % len)
            .unwrap_or(0);
        self.select_index(prev)
    }

    /// Stop the timer and destroy every chart. Pending tickets become stale.
    pub fn teardown(&mut self) {
        self.timer.stop();
        self.charts.clear_all();
        self.state.selected = None;
        self.state.last_seq += 1;
        log_event("teardown", json!({}));
    }
}
