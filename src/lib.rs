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

//! Sensorview - terminal dashboard for environmental sensors
//!
//! Polls a sensor backend over HTTP and keeps three charts (temperature,
//! humidity, moisture) and a latest-reading panel in sync with the selected sensor.

pub mod api;
pub mod app;
pub mod charts;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod runtime;
pub mod session;
pub mod shaper;
pub mod ui;
pub mod view;
