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

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::session::FetchTicket;

/// What the main loop has to do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Fetch(FetchTicket),
    CheckApi,
    Reload,
}

/// Main event handler that processes keyboard input
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> anyhow::Result<Action> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Down | KeyCode::Char('j') => fetch(app.session.select_next()),
        KeyCode::Up | KeyCode::Char('k') => fetch(app.session.select_prev()),
        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            fetch(app.session.select_index(idx))
        }
        KeyCode::Char('r') => fetch(app.session.refresh_tick()),
        KeyCode::Char('R') => Action::Reload,
        KeyCode::Char('d') => {
            if app.diagnostic_running {
                Action::None
            } else {
                app.begin_diagnostic();
                Action::CheckApi
            }
        }
        _ => Action::None,
    };
    Ok(action)
}

fn fetch(ticket: Option<FetchTicket>) -> Action {
    ticket.map(Action::Fetch).unwrap_or(Action::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use std::time::Instant;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(sensors: &[&str]) -> App {
        let entries = sensors.iter().map(|s| s.to_string()).collect();
        App::new(ViewerConfig::default(), entries, Instant::now()).0
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(&["s1"]);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap(), Action::Quit);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Esc)).unwrap(), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(&mut app, ctrl_c).unwrap(), Action::Quit);
    }

    #[test]
    fn test_navigation_issues_fetch() {
        let mut app = app(&["s1", "s2", "s3"]);
        match handle_key_event(&mut app, key(KeyCode::Down)).unwrap() {
            Action::Fetch(t) => assert_eq!(t.sensor, "s2"),
            other => panic!("unexpected action {other:?}"),
        }
        match handle_key_event(&mut app, key(KeyCode::Char('3'))).unwrap() {
            Action::Fetch(t) => assert_eq!(t.sensor, "s3"),
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('9'))).unwrap(), Action::None);
        assert_eq!(app.session.view().selection.active(), Some(2));
    }

    #[test]
    fn test_refresh_without_sensors_is_noop() {
        let mut app = app(&[]);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('r'))).unwrap(), Action::None);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Down)).unwrap(), Action::None);
    }

    #[test]
    fn test_check_api_not_doubled() {
        let mut app = app(&["s1"]);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('d'))).unwrap(), Action::CheckApi);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('d'))).unwrap(), Action::None);
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('R'))).unwrap(), Action::Reload);
    }
}
