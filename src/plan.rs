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

//! Per-board read plan: which registers to read, in which banks.
//!
//! Built once at setup from the board's sensor set and immutable after
//! that. Every read pass walks the same plan, so the buffer layout the
//! decoder sees is fixed for the lifetime of the driver.

use crate::board::BoardProfile;
use crate::catalog::{EcSensorInfo, SensorKind, KNOWN_SENSORS};
use crate::error::{EcError, Result};

/// Most banks a single board may spread its sensors over.
pub const MAX_BANKS: usize = 4;

/// Bank byte of a full register address.
pub(crate) fn register_bank(register: u16) -> u8 {
    (register >> 8) as u8
}

/// Ordered register read plan for one board.
#[derive(Debug, Clone)]
pub struct RegisterPlan {
    /// Catalog indices of the board's sensors, in catalog order.
    sensors: Vec<usize>,
    /// Every register to read, bank byte included, in catalog order.
    /// Multi-byte sensors contribute one entry per byte.
    registers: Vec<u16>,
    /// Banks the registers touch, ascending, no duplicates.
    banks: Vec<u8>,
}

impl RegisterPlan {
    /// Expand a board's sensor set into the full plan.
    pub fn build(profile: &BoardProfile) -> Result<Self> {
        let mut sensors = Vec::with_capacity(profile.sensor_count());
        let mut registers = Vec::new();
        let mut banks: Vec<u8> = Vec::with_capacity(MAX_BANKS);

        for (idx, info) in KNOWN_SENSORS.iter().enumerate() {
            if profile.sensors & (1 << idx) == 0 {
                continue;
            }
            sensors.push(idx);
            let base = info.addr.register();
            for byte in 0..u16::from(info.addr.size) {
                registers.push(base + byte);
            }
            if !banks.contains(&info.addr.bank) {
                if banks.len() == MAX_BANKS {
                    return Err(EcError::TooManyBanks(MAX_BANKS));
                }
                banks.push(info.addr.bank);
            }
        }

        if registers.is_empty() {
            return Err(EcError::EmptyPlan(profile.name));
        }
        banks.sort_unstable();

        Ok(Self {
            sensors,
            registers,
            banks,
        })
    }

    /// Catalog indices of the planned sensors, in catalog order.
    pub fn sensors(&self) -> &[usize] {
        &self.sensors
    }

    /// Every register a read pass fetches, in plan order.
    pub fn registers(&self) -> &[u16] {
        &self.registers
    }

    /// Banks touched by the plan, ascending.
    pub fn banks(&self) -> &[u8] {
        &self.banks
    }

    /// Catalog entry of the `slot`-th planned sensor.
    pub fn info(&self, slot: usize) -> &'static EcSensorInfo {
        &KNOWN_SENSORS[self.sensors[slot]]
    }

    /// Map a `(kind, channel)` query to a plan slot. Channels number the
    /// board's sensors of one kind in catalog order, starting at zero.
    pub fn find(&self, kind: SensorKind, channel: usize) -> Option<usize> {
        let mut remaining = channel;
        for (slot, &idx) in self.sensors.iter().enumerate() {
            if KNOWN_SENSORS[idx].kind != kind {
                continue;
            }
            if remaining == 0 {
                return Some(slot);
            }
            remaining -= 1;
        }
        None
    }

    /// How many sensors of `kind` the plan carries.
    pub fn channels(&self, kind: SensorKind) -> usize {
        self.sensors
            .iter()
            .filter(|&&idx| KNOWN_SENSORS[idx].kind == kind)
            .count()
    }
}
