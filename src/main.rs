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

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use sensorview::api::{SensorApi, SensorId};
use sensorview::app::App;
use sensorview::config::{config_path, load_config, CliOptions, Command, ViewerConfig};
use sensorview::events::{handle_key_event, Action};
use sensorview::logger;
use sensorview::runtime::{next_wake, Completion, Fetcher};
use sensorview::ui::ui;

/// Upper bound on how long the loop sleeps, so arriving responses show up promptly
const MAX_FRAME: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliOptions::parse(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: sensorview [check] [--url URL] [--interval MS] [--sensor ID]... [--utc] [--logging]");
            std::process::exit(2);
        }
    };

    let mut cfg = match load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid config at {}: {}", config_path().display(), e);
            std::process::exit(1);
        }
    };
    if let Err(e) = cli.apply(&mut cfg) {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    // Optional JSON-lines event log
    if cli.logging {
        let path = cfg.log_path.clone().unwrap_or_else(logger::default_log_path);
        logger::init_logging(&path);
        logger::log_event("startup", serde_json::json!({
            "args": args,
            "base_url": cfg.base_url,
            "refresh_interval_ms": cfg.refresh_interval_ms,
        }));
    }

    let fetcher = Fetcher::new(SensorApi::new(&cfg)?)?;

    // `sensorview check`: the diagnostic without the dashboard
    if cli.command() == Command::Check {
        let report = fetcher.check();
        logger::log_event("diagnostic", serde_json::json!({ "result": report.lines() }));
        for line in report.lines() {
            println!("{line}");
        }
        return Ok(());
    }

    let entries = sensor_entries(&cfg, &fetcher);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, cfg, entries, &fetcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        std::process::exit(1);
    }

    Ok(())
}

/// The selectable list, read once: configured ids, else whatever the backend reports.
fn sensor_entries(cfg: &ViewerConfig, fetcher: &Fetcher) -> Vec<SensorId> {
    if !cfg.sensors.is_empty() {
        return cfg.sensors.clone();
    }
    let (ids, err) = fetcher.load_sensor_ids();
    if let Some(e) = err {
        logger::log_event("sensor_list_failed", serde_json::json!({ "error": e.to_string() }));
    }
    ids
}

/// Configured lists reload at once; otherwise the list request runs in the background.
fn start_reload(app: &mut App, fetcher: &Fetcher) {
    if app.config.sensors.is_empty() {
        fetcher.dispatch_sensor_list(app.begin_reload());
    } else {
        let entries = app.config.sensors.clone();
        if let Some(ticket) = app.reload(entries, Instant::now()) {
            fetcher.dispatch(ticket);
        }
    }
}

fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    cfg: ViewerConfig,
    entries: Vec<SensorId>,
    fetcher: &Fetcher,
) -> anyhow::Result<()> {
    let (mut app, first) = App::new(cfg, entries, Instant::now());
    if let Some(ticket) = first {
        fetcher.dispatch(ticket);
    }

    let result = event_loop(terminal, &mut app, fetcher);
    app.shutdown();
    result
}

fn event_loop(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    fetcher: &Fetcher,
) -> anyhow::Result<()> {
    loop {
        // draw
        terminal.draw(|f| ui(f, app))?;

        // input
        let timeout = next_wake(app.session.timer().time_until_due(Instant::now()), MAX_FRAME);
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    match handle_key_event(app, key_event)? {
                        Action::Quit => return Ok(()),
                        Action::Fetch(ticket) => fetcher.dispatch(ticket),
                        Action::CheckApi => fetcher.dispatch_diagnostic(),
                        Action::Reload => start_reload(app, fetcher),
                        Action::None => {}
                    }
                }
            }
        }

        // responses
        for completion in fetcher.drain() {
            match completion {
                Completion::ChartData { ticket, result } => app.complete(&ticket, result),
                Completion::Diagnostic(report) => {
                    logger::log_event("diagnostic", serde_json::json!({ "result": report.lines() }));
                    app.apply_diagnostic(report);
                }
                Completion::SensorList { generation, result } => {
                    if let Some(ticket) = app.finish_reload(generation, result, Instant::now()) {
                        fetcher.dispatch(ticket);
                    }
                }
            }
        }

        // tick
        if let Some(ticket) = app.session.poll_timer(Instant::now()) {
            fetcher.dispatch(ticket);
        }
    }
}
