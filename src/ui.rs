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

pub mod ui_charts;
pub mod ui_components;

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use ui_charts::render_chart_column;
use ui_components::{render_header, render_selection_list, render_status_bar, render_status_panel, render_summary_panel};

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    // Layout: header | body | status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, app, chunks[0]);

    // Left: sensors, latest reading, app status. Right: the charts.
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(7),
            Constraint::Min(7),
        ])
        .split(body[0]);

    render_selection_list(f, app, left[0]);
    render_summary_panel(f, app, left[1]);
    render_status_panel(f, app, left[2]);
    render_chart_column(f, app, body[1]);

    render_status_bar(f, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TimeSeriesPayload;
    use crate::config::ViewerConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_renders_reading_and_chart_titles() {
        let cfg = ViewerConfig { utc: true, ..ViewerConfig::default() };
        let (mut app, ticket) = App::new(cfg, vec!["s1".into(), "s2".into()], Instant::now());
        let payload = TimeSeriesPayload {
            timestamps: vec!["2024-01-01T00:00:00Z".into()],
            temperature: vec![Some(21.5)],
            humidity: vec![Some(40.0)],
            moisture: vec![Some(55.0)],
        };
        app.complete(&ticket.unwrap(), Ok(payload));
        let text = screen_text(&app);
        assert!(text.contains("Sensor: s1"));
        assert!(text.contains("Temperature: 21.5°C"));
        assert!(text.contains("Humidity: 40.0%"));
        assert!(text.contains("Moisture: 55.0%"));
        assert!(text.contains("Temperature (°C)"));
        assert!(text.contains("Moisture (%)"));
    }

    #[test]
    fn test_status_bar_shows_help_then_reload_progress() {
        let (mut app, _) = App::new(ViewerConfig::default(), vec!["s1".into()], Instant::now());
        assert!(screen_text(&app).contains("q: quit"));
        app.begin_reload();
        let text = screen_text(&app);
        assert!(text.contains("Reloading sensor list..."));
        assert!(!text.contains("q: quit"));
    }

    #[test]
    fn test_renders_no_sensors_state() {
        let (app, _) = App::new(ViewerConfig::default(), Vec::new(), Instant::now());
        let text = screen_text(&app);
        assert!(text.contains("No sensors available"));
    }
}
