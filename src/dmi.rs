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

//! Identify the running board through the kernel's DMI id files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::board::{find_profile, BoardProfile, BOARD_VENDOR};
use crate::error::{EcError, Result};

pub const DMI_ID_PATH: &str = "/sys/devices/virtual/dmi/id";

/// Match the running board against the supported-board table. Vendor and
/// board name must both match exactly; EC register layouts differ even
/// between revisions of one product line, so no fuzzy matching.
pub fn resolve_active_board() -> Result<&'static BoardProfile> {
    resolve_at(Path::new(DMI_ID_PATH))
}

pub fn resolve_at(root: &Path) -> Result<&'static BoardProfile> {
    let read_trim = |file: &str| -> Option<String> {
        fs::read_to_string(root.join(file))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let vendor = read_trim("board_vendor").unwrap_or_default();
    let name = read_trim("board_name").unwrap_or_default();

    if vendor != BOARD_VENDOR {
        debug!(%vendor, %name, "board vendor not supported");
        return Err(EcError::UnsupportedBoard(describe(&vendor, &name)));
    }
    find_profile(&name).ok_or_else(|| {
        debug!(%name, "ASUS board without a known EC sensor set");
        EcError::UnsupportedBoard(describe(&vendor, &name))
    })
}

fn describe(vendor: &str, name: &str) -> String {
    let full = format!("{} {}", vendor, name);
    let full = full.trim();
    if full.is_empty() {
        "unknown".to_string()
    } else {
        full.to_string()
    }
}
