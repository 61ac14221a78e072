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

use crate::app::App;
use crate::charts::ChartSpec;
use crate::shaper::Metric;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Stack one panel per configured surface, in metric order
pub fn render_chart_column(f: &mut Frame, app: &App, area: Rect) {
    let backend = app.session.charts().backend();
    let metrics: Vec<Metric> = Metric::ALL
        .iter()
        .copied()
        .filter(|m| app.config.surfaces.iter().any(|s| s == m.surface_id()))
        .collect();

    if metrics.is_empty() {
        let block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).title(" Charts ");
        f.render_widget(Paragraph::new("(no chart surfaces configured)").block(block), area);
        return;
    }

    let constraints: Vec<Constraint> = metrics
        .iter()
        .map(|_| Constraint::Ratio(1, metrics.len() as u32))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (metric, row) in metrics.iter().zip(rows.iter()) {
        match backend.chart_on(metric.surface_id()) {
            Some(spec) => render_line_chart(f, spec, *row),
            None => render_empty_panel(f, *metric, *row),
        }
    }
}

fn render_empty_panel(f: &mut Frame, metric: Metric, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", metric.label()))
        .border_style(Style::default().fg(Color::DarkGray));
    let empty = Paragraph::new("no data")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    f.render_widget(empty, area);
}

fn render_line_chart(f: &mut Frame, spec: &ChartSpec, area: Rect) {
    let (r, g, b) = spec.color;
    let color = Color::Rgb(r, g, b);
    let points = spec.points();
    let [y_min, y_max] = spec.y_bounds();
    let x_max = (spec.values.len().saturating_sub(1)).max(1) as f64;

    let x_labels: Vec<Span> = match (spec.labels.first(), spec.labels.last()) {
        (Some(first), Some(last)) => vec![Span::raw(first.clone()), Span::raw(last.clone())],
        _ => Vec::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", spec.title))
        .border_style(Style::default().fg(color));

    let datasets = vec![Dataset::default()
        .name(spec.title.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );
    f.render_widget(chart, area);
}
