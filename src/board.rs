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

//! Supported boards and the sensor set each one populates.

use crate::catalog::{
    SensorSet, CURR_CPU, FAN_CHIPSET, FAN_CPU_OPT, FAN_VRM_HS, FAN_WATER_FLOW, TEMP_CHIPSET,
    TEMP_CPU, TEMP_MB, TEMP_T_SENSOR, TEMP_VRM, TEMP_WATER_IN, TEMP_WATER_OUT,
};

/// DMI board vendor string all supported boards report.
pub const BOARD_VENDOR: &str = "ASUSTeK COMPUTER INC.";

/// ACPI mutex the ASUS WMI firmware takes around its own EC accesses.
/// Every process touching the EC registers is expected to hold it.
pub const ASUS_HW_ACCESS_GUARD: &str = "\\AMW0.ASMX";

/// One supported board: its exact DMI name, the catalog sensors it
/// populates and the name of the hardware guard serializing EC access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardProfile {
    pub name: &'static str,
    pub sensors: SensorSet,
    pub guard: &'static str,
}

impl BoardProfile {
    pub fn sensor_count(&self) -> usize {
        self.sensors.count_ones() as usize
    }
}

const fn asus_board(name: &'static str, sensors: SensorSet) -> BoardProfile {
    BoardProfile {
        name,
        sensors,
        guard: ASUS_HW_ACCESS_GUARD,
    }
}

pub const SUPPORTED_BOARDS: [BoardProfile; 8] = [
    asus_board(
        "Pro WS X570-ACE",
        TEMP_CHIPSET | TEMP_CPU | TEMP_MB | TEMP_VRM | FAN_CHIPSET | CURR_CPU,
    ),
    asus_board(
        "ROG CROSSHAIR VIII HERO",
        TEMP_CHIPSET
            | TEMP_CPU
            | TEMP_MB
            | TEMP_T_SENSOR
            | TEMP_VRM
            | TEMP_WATER_IN
            | TEMP_WATER_OUT
            | FAN_CPU_OPT
            | FAN_CHIPSET
            | FAN_WATER_FLOW
            | CURR_CPU,
    ),
    // Same as Hero but without chipset fan.
    asus_board(
        "ROG CROSSHAIR VIII DARK HERO",
        TEMP_CHIPSET
            | TEMP_CPU
            | TEMP_MB
            | TEMP_T_SENSOR
            | TEMP_VRM
            | TEMP_WATER_IN
            | TEMP_WATER_OUT
            | FAN_CPU_OPT
            | FAN_WATER_FLOW
            | CURR_CPU,
    ),
    // Same as Hero but without the water loop.
    asus_board(
        "ROG CROSSHAIR VIII FORMULA",
        TEMP_CHIPSET
            | TEMP_CPU
            | TEMP_MB
            | TEMP_T_SENSOR
            | TEMP_VRM
            | FAN_CPU_OPT
            | FAN_CHIPSET
            | CURR_CPU,
    ),
    asus_board(
        "ROG CROSSHAIR VIII IMPACT",
        TEMP_CHIPSET | TEMP_CPU | TEMP_MB | TEMP_T_SENSOR | TEMP_VRM | FAN_CHIPSET | CURR_CPU,
    ),
    asus_board(
        "ROG STRIX B550-E GAMING",
        TEMP_CHIPSET | TEMP_CPU | TEMP_MB | TEMP_T_SENSOR | TEMP_VRM | FAN_CPU_OPT | CURR_CPU,
    ),
    asus_board(
        "ROG STRIX B550-I GAMING",
        TEMP_CHIPSET | TEMP_CPU | TEMP_MB | TEMP_T_SENSOR | TEMP_VRM | FAN_VRM_HS | CURR_CPU,
    ),
    asus_board(
        "ROG STRIX X570-E GAMING",
        TEMP_CHIPSET | TEMP_CPU | TEMP_MB | TEMP_T_SENSOR | TEMP_VRM | FAN_CHIPSET | CURR_CPU,
    ),
];

/// Look a board up by its exact DMI name.
pub fn find_profile(name: &str) -> Option<&'static BoardProfile> {
    SUPPORTED_BOARDS.iter().find(|board| board.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::KNOWN_SENSORS;

    #[test]
    fn test_every_board_sensor_exists_in_catalog() {
        let known: SensorSet = (1 << KNOWN_SENSORS.len()) - 1;
        for board in &SUPPORTED_BOARDS {
            assert_eq!(board.sensors & !known, 0, "{}", board.name);
            assert!(board.sensor_count() > 0, "{}", board.name);
        }
    }

    #[test]
    fn test_board_names_are_unique() {
        for (i, a) in SUPPORTED_BOARDS.iter().enumerate() {
            for b in &SUPPORTED_BOARDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_find_profile_is_exact() {
        let hero = find_profile("ROG CROSSHAIR VIII HERO").unwrap();
        assert_eq!(hero.sensor_count(), 11);
        assert_eq!(hero.guard, ASUS_HW_ACCESS_GUARD);

        // Case and substring variants do not match.
        assert!(find_profile("ROG Crosshair VIII Hero").is_none());
        assert!(find_profile("ROG CROSSHAIR VIII").is_none());
        assert!(find_profile("").is_none());
    }

    #[test]
    fn test_dark_hero_is_hero_without_chipset_fan() {
        let hero = find_profile("ROG CROSSHAIR VIII HERO").unwrap();
        let dark = find_profile("ROG CROSSHAIR VIII DARK HERO").unwrap();
        assert_eq!(dark.sensors, hero.sensors & !crate::catalog::FAN_CHIPSET);
    }
}
