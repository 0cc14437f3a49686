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

//! Static catalog of every EC sensor any supported board exposes.
//!
//! Each sensor has a fixed bit in a [`SensorSet`]; a board profile is just
//! the union of the bits it populates. The catalog is ordered by ascending
//! bit value, so iterating it while testing bits yields sensors in a stable,
//! board-independent order.

use std::fmt;

use serde::Serialize;

/// Set of catalog sensors, one bit per [`KNOWN_SENSORS`] entry.
pub type SensorSet = u16;

/// Chipset temperature [m°C].
pub const TEMP_CHIPSET: SensorSet = 0x0001;
/// CPU temperature [m°C].
pub const TEMP_CPU: SensorSet = 0x0002;
/// Motherboard temperature [m°C].
pub const TEMP_MB: SensorSet = 0x0004;
/// "T_Sensor" header temperature [m°C].
pub const TEMP_T_SENSOR: SensorSet = 0x0008;
/// VRM temperature [m°C].
pub const TEMP_VRM: SensorSet = 0x0010;
/// CPU_Opt fan [RPM].
pub const FAN_CPU_OPT: SensorSet = 0x0020;
/// VRM heat sink fan [RPM].
pub const FAN_VRM_HS: SensorSet = 0x0040;
/// Chipset fan [RPM].
pub const FAN_CHIPSET: SensorSet = 0x0080;
/// Water flow meter [RPM].
pub const FAN_WATER_FLOW: SensorSet = 0x0100;
/// CPU current [mA].
pub const CURR_CPU: SensorSet = 0x0200;
/// "Water_In" loop temperature [m°C].
pub const TEMP_WATER_IN: SensorSet = 0x0400;
/// "Water_Out" loop temperature [m°C].
pub const TEMP_WATER_OUT: SensorSet = 0x0800;

/// What a sensor measures. Determines the unit scaling applied to decoded
/// values and how channels are numbered on the query surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Fan,
    Current,
    Voltage,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Fan => "fan",
            SensorKind::Current => "current",
            SensorKind::Voltage => "voltage",
        };
        write!(f, "{}", name)
    }
}

/// Where a sensor lives on the EC: a register bank, the first register
/// index inside that bank, and how many consecutive registers it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAddress {
    pub bank: u8,
    pub index: u8,
    pub size: u8,
}

impl SensorAddress {
    pub const fn new(size: u8, bank: u8, index: u8) -> Self {
        Self { bank, index, size }
    }

    /// Full register address of the first byte, bank in the high byte.
    pub const fn register(&self) -> u16 {
        ((self.bank as u16) << 8) | self.index as u16
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcSensorInfo {
    pub label: &'static str,
    pub kind: SensorKind,
    pub addr: SensorAddress,
}

const fn sensor(
    label: &'static str,
    kind: SensorKind,
    size: u8,
    bank: u8,
    index: u8,
) -> EcSensorInfo {
    EcSensorInfo {
        label,
        kind,
        addr: SensorAddress::new(size, bank, index),
    }
}

/// Every sensor any supported board exposes, ordered by ascending set bit.
/// Entry `i` corresponds to bit `1 << i`.
pub const KNOWN_SENSORS: [EcSensorInfo; 12] = [
    sensor("Chipset", SensorKind::Temperature, 1, 0x00, 0x3a), // TEMP_CHIPSET
    sensor("CPU", SensorKind::Temperature, 1, 0x00, 0x3b),     // TEMP_CPU
    sensor("Motherboard", SensorKind::Temperature, 1, 0x00, 0x3c), // TEMP_MB
    sensor("T_Sensor", SensorKind::Temperature, 1, 0x00, 0x3d), // TEMP_T_SENSOR
    sensor("VRM", SensorKind::Temperature, 1, 0x00, 0x3e),     // TEMP_VRM
    sensor("CPU_Opt", SensorKind::Fan, 2, 0x00, 0xb0),         // FAN_CPU_OPT
    sensor("VRM HS", SensorKind::Fan, 2, 0x00, 0xb2),          // FAN_VRM_HS
    sensor("Chipset", SensorKind::Fan, 2, 0x00, 0xb4),         // FAN_CHIPSET
    sensor("Water_Flow", SensorKind::Fan, 2, 0x00, 0xbc),      // FAN_WATER_FLOW
    sensor("CPU", SensorKind::Current, 1, 0x00, 0xf4),         // CURR_CPU
    sensor("Water_In", SensorKind::Temperature, 1, 0x01, 0x00), // TEMP_WATER_IN
    sensor("Water_Out", SensorKind::Temperature, 1, 0x01, 0x01), // TEMP_WATER_OUT
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_set_bit() {
        // A u16 set with one bit per entry leaves no bit unaccounted for.
        assert_eq!(KNOWN_SENSORS.len(), 12);
        let all: SensorSet = TEMP_CHIPSET
            | TEMP_CPU
            | TEMP_MB
            | TEMP_T_SENSOR
            | TEMP_VRM
            | FAN_CPU_OPT
            | FAN_VRM_HS
            | FAN_CHIPSET
            | FAN_WATER_FLOW
            | CURR_CPU
            | TEMP_WATER_IN
            | TEMP_WATER_OUT;
        assert_eq!(all.count_ones() as usize, KNOWN_SENSORS.len());
        assert_eq!(all, (1 << KNOWN_SENSORS.len()) - 1);
    }

    #[test]
    fn test_register_addresses_are_unique() {
        for (i, a) in KNOWN_SENSORS.iter().enumerate() {
            for b in &KNOWN_SENSORS[i + 1..] {
                assert_ne!(
                    a.addr.register(),
                    b.addr.register(),
                    "{} and {} share a register",
                    a.label,
                    b.label
                );
            }
        }
    }

    #[test]
    fn test_register_packs_bank_into_high_byte() {
        let addr = SensorAddress::new(1, 0x01, 0x3a);
        assert_eq!(addr.register(), 0x013a);
        let addr = SensorAddress::new(2, 0x00, 0xb0);
        assert_eq!(addr.register(), 0x00b0);
    }

    #[test]
    fn test_multi_byte_sensors_are_fans() {
        // Only fan tachometers span more than one register on these boards.
        for info in &KNOWN_SENSORS {
            if info.addr.size > 1 {
                assert_eq!(info.kind, SensorKind::Fan, "{}", info.label);
            }
        }
    }

    #[test]
    fn test_kind_display_names() {
        assert_eq!(SensorKind::Temperature.to_string(), "temperature");
        assert_eq!(SensorKind::Voltage.to_string(), "voltage");
    }
}
