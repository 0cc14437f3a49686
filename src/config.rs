/*
 * This file is part of Ecsense.
 *
 * Copyright (C) 2025 Ecsense contributors
 *
 * Ecsense is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Ecsense is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Ecsense. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_poll_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Exact DMI board name to use instead of autodetection.
    #[serde(default)]
    pub board: Option<String>,
    /// Watch-mode refresh period in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board: None,
            poll_ms: default_poll_ms(),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("ecsense").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("ecsense")
            .join("config.json");
    }
    PathBuf::from("/etc/ecsense/config.json")
}

pub fn load_settings() -> Option<Settings> {
    let path = config_path();
    let data = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

fn is_safe_board_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 128 {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
}

pub fn validate_settings(settings: &Settings) -> Result<(), String> {
    if settings.poll_ms < 100 {
        return Err("poll_ms too small (min 100)".to_string());
    }
    if settings.poll_ms > 3_600_000 {
        return Err("poll_ms too large (max 3600000)".to_string());
    }
    if let Some(board) = &settings.board {
        if !is_safe_board_name(board) {
            return Err("invalid board name".to_string());
        }
    }
    Ok(())
}
