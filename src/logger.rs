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

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};

const FALLBACK_LOG_PATH: &str = "/tmp/sensorview_logs.json";

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub fn default_log_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_STATE_HOME") {
        return Path::new(&xdg).join("sensorview").join("logs.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".local")
            .join("state")
            .join("sensorview")
            .join("logs.json");
    }
    PathBuf::from(FALLBACK_LOG_PATH)
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Start appending events to `path`. Returns the path actually in use.
pub fn init_logging(path: &Path) -> PathBuf {
    let (file, used) = match open_append(path) {
        Some(f) => (Some(f), path.to_path_buf()),
        // Last resort: fall back to /tmp (silent)
        None => (open_append(Path::new(FALLBACK_LOG_PATH)), PathBuf::from(FALLBACK_LOG_PATH)),
    };
    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = file;
    }
    used
}

pub fn is_enabled() -> bool {
    LOG_FILE.lock().map(|g| g.is_some()).unwrap_or(false)
}

pub fn format_line(event: &str, data: Value) -> String {
    json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string()
}

/// Append one JSON line. Does nothing unless logging was enabled; the terminal is never written to.
pub fn log_event(event: &str, data: Value) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", format_line(event, data));
        }
    }
}
