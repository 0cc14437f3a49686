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

//! Turn a raw register buffer into per-sensor values.
//!
//! The EC stores multi-byte readings big-endian. Decoded values are
//! scaled into the milli-units the query surface serves, so cached data
//! never needs a second conversion.

use crate::catalog::SensorKind;
use crate::plan::RegisterPlan;

fn raw_value(size: u8, bytes: &[u8]) -> u32 {
    match size {
        1 => u32::from(bytes[0]),
        2 => u32::from(u16::from_be_bytes([bytes[0], bytes[1]])),
        4 => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        _ => 0,
    }
}

/// Scale a decoded value into its reporting unit. Temperatures, currents
/// and voltages are served in milli-units; fan speeds are RPM as-is.
pub(crate) fn scale(kind: SensorKind, value: u32) -> u32 {
    match kind {
        SensorKind::Temperature | SensorKind::Current | SensorKind::Voltage => {
            value.saturating_mul(1000)
        }
        SensorKind::Fan => value,
    }
}

/// Decode a full pass buffer into `values`, one entry per plan sensor.
pub(crate) fn decode_into(plan: &RegisterPlan, raw: &[u8], values: &mut [u32]) {
    debug_assert_eq!(raw.len(), plan.registers().len());
    debug_assert_eq!(values.len(), plan.sensors().len());

    let mut offset = 0;
    for slot in 0..plan.sensors().len() {
        let info = plan.info(slot);
        let size = usize::from(info.addr.size);
        values[slot] = scale(info.kind, raw_value(info.addr.size, &raw[offset..offset + size]));
        offset += size;
    }
}
