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

//! Ecsense - ASUS motherboard sensors over the embedded controller
//!
//! This library reads the sensor registers the board firmware maintains in
//! the EC: temperatures, fan speeds and currents that never show up in the
//! usual Super I/O chips. Supported boards are identified through DMI; all
//! register access is serialized behind a hardware guard and served from a
//! short-lived cache.

pub mod board;
pub mod catalog;
pub mod config;
pub mod dmi;
pub mod driver;
pub mod ec;
pub mod error;
pub mod guard;
pub mod plan;

mod decode;
mod reader;

#[cfg(test)]
pub mod test_utils;

pub use board::{find_profile, BoardProfile, SUPPORTED_BOARDS};
pub use catalog::{SensorKind, KNOWN_SENSORS};
pub use driver::{EcSensors, Reading, CACHE_TTL, GUARD_TIMEOUT};
pub use ec::{EcDev, EcTransport};
pub use error::{EcError, Result};
pub use guard::{FileLockGuard, HardwareGuard};
