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

use crate::app::{App, HELP_LINE};
use crate::session::CycleOutcome;
use crate::view::{PanelContent, Status};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let heading = &app.session.view().heading;
    let header = Paragraph::new(format!(" {}", heading))
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    f.render_widget(header, header_cols[0]);

    let backend = Paragraph::new(format!("{} ", app.config.base_url))
        .alignment(ratatui::layout::Alignment::Right)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(backend, header_cols[1]);
}

/// Render the sensor list; the active entry is highlighted
pub fn render_selection_list(f: &mut Frame, app: &App, area: Rect) {
    let selection = &app.session.view().selection;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" Sensors ({}) ", selection.entries().len()))
        .border_style(Style::default().fg(Color::Cyan));

    if selection.is_empty() {
        let empty = Paragraph::new(Status::NoSensors.message())
            .block(block)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = selection
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, id)| {
            let marker = if selection.is_active(idx) { "> " } else { "  " };
            let hotkey = if idx < 9 { format!("{} ", idx + 1) } else { "  ".to_string() };
            ListItem::new(format!("{}{}{}", marker, hotkey, id))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    let mut state = ListState::default();
    state.select(selection.active());
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render_summary_panel(f: &mut Frame, app: &App, area: Rect) {
    let summary = &app.session.view().summary;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Latest Reading ");

    let style = match summary.content() {
        PanelContent::Status(Status::Error) => Style::default().fg(Color::Red),
        PanelContent::Status(Status::Loading) => Style::default().fg(Color::Yellow),
        PanelContent::Status(_) => Style::default().fg(Color::Gray),
        _ => Style::default(),
    };
    let lines: Vec<Line> = summary.lines().into_iter().map(Line::from).collect();
    let paragraph = Paragraph::new(lines).block(block).style(style).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// App status: load time, sensor count, refresh period, last cycle, diagnostics
pub fn render_status_panel(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" App Status ");

    let mut lines: Vec<Line> = vec![
        Line::from(format!("UI loaded at: {}", app.loaded_at)),
        Line::from(format!("Sensors detected: {}", app.sensors_detected)),
    ];
    if let Some(interval) = app.session.timer().interval() {
        lines.push(Line::from(format!("Auto-refresh: every {}s", interval.as_secs())));
    }
    let last = match &app.last_outcome {
        Some(CycleOutcome::Rendered { points, .. }) => format!("Last fetch: {} point(s)", points),
        Some(CycleOutcome::Empty) => "Last fetch: empty".to_string(),
        Some(CycleOutcome::Failed(reason)) => format!("Last fetch failed: {}", reason),
        Some(CycleOutcome::Stale) | None => "Last fetch: -".to_string(),
    };
    lines.push(Line::from(last));
    for notice in &app.session.view().notices {
        lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Yellow)));
    }
    if !app.diagnostics.is_empty() {
        lines.push(Line::from(""));
        lines.extend(app.diagnostics.iter().map(|d| Line::from(d.clone())));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_reloading() {
        Paragraph::new("Reloading sensor list...").style(Style::default().fg(Color::Yellow))
    } else {
        Paragraph::new(HELP_LINE).style(Style::default().fg(Color::Gray))
    };
    f.render_widget(status, area);
}
