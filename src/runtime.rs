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

//! Runs backend requests off the UI thread.
//!
//! Requests are spawned on a tokio runtime; each result is posted back over a
//! channel tagged with the ticket it answers, and the UI loop drains the channel
//! between frames. Nothing here decides whether a result is still wanted; that
//! is the session's job.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::api::{DiagnosticReport, SensorApi, SensorId, SensorSummary, TimeSeriesPayload};
use crate::error::{Result, ViewerError};
use crate::session::FetchTicket;

#[derive(Debug)]
pub enum Completion {
    ChartData {
        ticket: FetchTicket,
        result: Result<TimeSeriesPayload>,
    },
    Diagnostic(DiagnosticReport),
    /// Sensor list for the reload tagged `generation`.
    SensorList {
        generation: u64,
        result: Result<Vec<SensorSummary>>,
    },
}

pub struct Fetcher {
    runtime: Runtime,
    api: SensorApi,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Fetcher {
    pub fn new(api: SensorApi) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sensorview-fetch")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel();
        Ok(Self { runtime, api, tx, rx })
    }

    pub fn api(&self) -> &SensorApi {
        &self.api
    }

    /// Start the chart-data request for `ticket`. Returns immediately.
    pub fn dispatch(&self, ticket: FetchTicket) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.chart_data(&ticket.sensor).await;
            // receiver gone means the UI is shutting down
            let _ = tx.send(Completion::ChartData { ticket, result });
        });
    }

    pub fn dispatch_diagnostic(&self) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let report = DiagnosticReport::from_result(api.sensors().await);
            let _ = tx.send(Completion::Diagnostic(report));
        });
    }

    pub fn dispatch_sensor_list(&self, generation: u64) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.sensors().await;
            let _ = tx.send(Completion::SensorList { generation, result });
        });
    }

    /// Everything that has arrived so far, in arrival order.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next completion.
    pub fn wait_one(&self, timeout: Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Read the sensor list once, before the UI starts.
    /// Failures produce an empty list, which the view turns into "no sensors".
    pub fn load_sensor_ids(&self) -> (Vec<SensorId>, Option<ViewerError>) {
        match self.runtime.block_on(self.api.sensors()) {
            Ok(list) => (list.into_iter().map(|s| s.id).collect(), None),
            Err(e) => (Vec::new(), Some(e)),
        }
    }

    pub fn check(&self) -> DiagnosticReport {
        DiagnosticReport::from_result(self.runtime.block_on(self.api.sensors()))
    }
}

/// Poll timeout for the UI loop: wake for the refresh timer, but at least every `max`.
pub fn next_wake(until_due: Option<Duration>, max: Duration) -> Duration {
    until_due.map(|d| d.min(max)).unwrap_or(max)
}
