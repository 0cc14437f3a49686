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

use std::io;

use thiserror::Error;

use crate::catalog::SensorKind;

/// Unified error type for the crate.
#[derive(Debug, Error)]
pub enum EcError {
    /// The running board is not in the supported-board table.
    #[error("unsupported board: {0}")]
    UnsupportedBoard(String),

    /// A board profile selects no sensors at all.
    #[error("board {0} has no EC sensors")]
    EmptyPlan(&'static str),

    /// A board profile spreads its sensors over more banks than a single
    /// read pass supports.
    #[error("sensor set spans more than {0} register banks")]
    TooManyBanks(usize),

    /// No sensor of the requested kind exists at the requested channel.
    #[error("no {kind} sensor on channel {channel}")]
    NoSuchSensor { kind: SensorKind, channel: usize },

    /// The exclusive hardware guard could not be taken in time.
    #[error("hardware guard {name} unavailable: {source}")]
    GuardUnavailable {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Selecting a register bank on the EC failed.
    #[error("EC bank switch to {bank:#04x} failed: {source}")]
    BankSwitch {
        bank: u8,
        #[source]
        source: io::Error,
    },

    /// Reading a single EC register failed mid-pass.
    #[error("EC register {register:#06x} read failed: {source}")]
    RegisterRead {
        register: u16,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, EcError>;
