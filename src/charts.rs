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

//! Chart lifecycle: at most one live chart per drawing surface.
//!
//! A [`ChartBackend`] is the charting engine (the terminal renderer in production).
//! [`ChartManager`] owns one [`ChartSlot`] per metric and always destroys the
//! previous occupant of a slot before asking the backend for a new chart.

use std::collections::HashMap;

use crate::error::{Result, ViewerError};
use crate::logger::log_event;
use crate::shaper::Metric;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

/// Everything the backend needs to draw one line series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub color: (u8, u8, u8),
    pub labels: Vec<String>,
    /// One entry per label; gaps are readings without this metric.
    pub values: Vec<Option<f64>>,
}

impl ChartSpec {
    pub fn for_metric(metric: Metric, labels: &[String], values: &[Option<f64>]) -> Self {
        Self {
            title: metric.label().to_string(),
            color: metric.color(),
            labels: labels.to_vec(),
            values: values.to_vec(),
        }
    }

    /// Points as (index, value) pairs. Gaps are skipped but keep their x position.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }

    /// Y bounds with a little headroom; flat series get a unit band.
    pub fn y_bounds(&self) -> [f64; 2] {
        let present = || self.values.iter().flatten().copied();
        let min = present().fold(f64::INFINITY, f64::min);
        let max = present().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return [0.0, 1.0];
        }
        if (max - min).abs() < f64::EPSILON {
            return [min - 1.0, max + 1.0];
        }
        let pad = (max - min) * 0.1;
        [min - pad, max + pad]
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ChartBackend {
    fn has_surface(&self, surface: &str) -> bool;
    fn create(&mut self, surface: &str, spec: ChartSpec) -> ChartId;
    fn destroy(&mut self, id: ChartId);
}

/// Owning handle for one live chart. Not `Clone`: whoever holds it is responsible for destroying it.
#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    id: ChartId,
    surface: &'static str,
}

impl ChartHandle {
    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn surface(&self) -> &'static str {
        self.surface
    }
}

/// Single-occupant slot bound to one surface.
#[derive(Debug, Default)]
pub struct ChartSlot {
    handle: Option<ChartHandle>,
}

impl ChartSlot {
    pub fn is_occupied(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&ChartHandle> {
        self.handle.as_ref()
    }

    /// Destroy the current occupant, if any.
    pub fn release<B: ChartBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(old) = self.handle.take() {
            backend.destroy(old.id);
        }
    }

    /// Release the previous occupant, then create and hold the new chart.
    pub fn replace<B: ChartBackend + ?Sized>(&mut self, backend: &mut B, surface: &'static str, spec: ChartSpec) {
        self.release(backend);
        let id = backend.create(surface, spec);
        self.handle = Some(ChartHandle { id, surface });
    }
}

pub struct ChartManager<B: ChartBackend> {
    backend: B,
    slots: [ChartSlot; 3],
}

impl<B: ChartBackend> ChartManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: Default::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn slot(&self, metric: Metric) -> &ChartSlot {
        &self.slots[metric.index()]
    }

    pub fn live_charts(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    /// Create (or replace) the chart for `metric`.
    ///
    /// A missing surface is reported as `MissingRenderTarget`; the slot is left
    /// empty and the other metrics are unaffected.
    pub fn render_series(&mut self, metric: Metric, labels: &[String], values: &[Option<f64>]) -> Result<()> {
        let surface = metric.surface_id();
        let slot = &mut self.slots[metric.index()];
        if !self.backend.has_surface(surface) {
            slot.release(&mut self.backend);
            log_event("missing_render_target", serde_json::json!({ "surface": surface }));
            return Err(ViewerError::MissingRenderTarget(surface.to_string()));
        }
        slot.replace(&mut self.backend, surface, ChartSpec::for_metric(metric, labels, values));
        Ok(())
    }

    /// Destroy every live chart. No-op when nothing is rendered.
    pub fn clear_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.release(&mut self.backend);
        }
    }
}

/// Chart backend for the terminal UI: keeps the live datasets the renderer draws from.
#[derive(Debug, Default)]
pub struct TerminalCharts {
    surfaces: Vec<String>,
    live: HashMap<ChartId, (String, ChartSpec)>,
    next_id: u64,
}

impl TerminalCharts {
    pub fn new<I, S>(surfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            surfaces: surfaces.into_iter().map(Into::into).collect(),
            live: HashMap::new(),
            next_id: 1,
        }
    }

    /// Backend with every metric surface present.
    pub fn with_all_surfaces() -> Self {
        Self::new(Metric::ALL.iter().map(|m| m.surface_id()))
    }

    pub fn chart_on(&self, surface: &str) -> Option<&ChartSpec> {
        self.live
            .values()
            .find(|(s, _)| s == surface)
            .map(|(_, spec)| spec)
    }

    pub fn live_on(&self, surface: &str) -> usize {
        self.live.values().filter(|(s, _)| s == surface).count()
    }

    pub fn live_total(&self) -> usize {
        self.live.len()
    }
}

impl ChartBackend for TerminalCharts {
    fn has_surface(&self, surface: &str) -> bool {
        self.surfaces.iter().any(|s| s == surface)
    }

    fn create(&mut self, surface: &str, spec: ChartSpec) -> ChartId {
        let id = ChartId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, (surface.to_string(), spec));
        id
    }

    fn destroy(&mut self, id: ChartId) {
        self.live.remove(&id);
    }
}
