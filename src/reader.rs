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

//! One bulk read pass over a register plan.
//!
//! The EC exposes 256-byte banks behind a selector register; a pass
//! switches through the plan's banks in ascending order and leaves the
//! selector the way it found it. Callers hold the hardware guard for the
//! whole pass.

use std::io;

use tracing::warn;

use crate::ec::{EcTransport, BANK_REGISTER};
use crate::error::{EcError, Result};
use crate::plan::{register_bank, RegisterPlan};

/// Select `bank`. With `prev` the current selection is captured first and
/// the write is skipped when it already matches; without it the write is
/// unconditional, which is what the restore path wants.
fn switch_bank<T: EcTransport>(ec: &mut T, bank: u8, prev: Option<&mut u8>) -> io::Result<()> {
    if let Some(prev) = prev {
        *prev = ec.read_register(BANK_REGISTER)?;
        if *prev == bank {
            return Ok(());
        }
    }
    ec.write_register(BANK_REGISTER, bank)
}

/// Read every plan register into `buffer`, one byte per plan slot.
///
/// Each bank pass scans the whole register list and takes every register
/// of the current or a later bank; later banks then overwrite the slots
/// they own with the correct bytes. That keeps bank switches to one per
/// bank. The selector is restored whatever happens; if both the scan and
/// the restore fail, the scan error is the one reported.
pub(crate) fn read_all<T: EcTransport>(
    plan: &RegisterPlan,
    ec: &mut T,
    buffer: &mut [u8],
) -> Result<()> {
    debug_assert_eq!(buffer.len(), plan.registers().len());

    let mut prev_bank = 0u8;
    let mut bank = 0u8;
    switch_bank(ec, bank, Some(&mut prev_bank))
        .map_err(|source| EcError::BankSwitch { bank, source })?;
    if prev_bank != 0 {
        warn!(
            prev_bank,
            "EC was not on its default bank; concurrent access possible"
        );
    }

    let mut scan: Result<()> = Ok(());
    'pass: for &next in plan.banks() {
        if bank != next {
            bank = next;
            if let Err(source) = switch_bank(ec, bank, None) {
                scan = Err(EcError::BankSwitch { bank, source });
                break 'pass;
            }
        }
        for (slot, &register) in plan.registers().iter().enumerate() {
            if register_bank(register) < bank {
                continue;
            }
            match ec.read_register(register & 0x00ff) {
                Ok(value) => buffer[slot] = value,
                Err(source) => {
                    scan = Err(EcError::RegisterRead { register, source });
                    break 'pass;
                }
            }
        }
    }

    // Other EC users address registers relative to the selector; put it
    // back even when the scan already failed.
    let restore = switch_bank(ec, prev_bank, None).map_err(|source| EcError::BankSwitch {
        bank: prev_bank,
        source,
    });
    scan.and(restore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CURR_CPU, FAN_CPU_OPT, TEMP_CHIPSET, TEMP_WATER_IN, TEMP_WATER_OUT};
    use crate::test_utils::{create_test_profile, FakeEc, Op};

    fn plan_for(sensors: crate::catalog::SensorSet) -> RegisterPlan {
        RegisterPlan::build(&create_test_profile(sensors)).unwrap()
    }

    #[test]
    fn test_single_bank_pass_reads_in_plan_order() {
        let plan = plan_for(TEMP_CHIPSET | FAN_CPU_OPT);
        let mut ec = FakeEc::new();
        ec.set(0, 0x3a, 45);
        ec.set_span(0, 0xb0, &[0x03, 0xe8]);

        let mut buffer = vec![0u8; plan.registers().len()];
        read_all(&plan, &mut ec, &mut buffer).unwrap();

        assert_eq!(buffer, vec![45, 0x03, 0xe8]);
        assert_eq!(
            ec.ops,
            vec![
                Op::Read(BANK_REGISTER),
                Op::Read(0x3a),
                Op::Read(0xb0),
                Op::Read(0xb1),
                Op::Write(BANK_REGISTER, 0x00),
            ]
        );
    }

    #[test]
    fn test_later_bank_overwrites_redundant_early_reads() {
        let plan = plan_for(TEMP_CHIPSET | CURR_CPU | TEMP_WATER_IN | TEMP_WATER_OUT);
        let mut ec = FakeEc::new();
        ec.set(0, 0x3a, 45);
        ec.set(0, 0xf4, 9);
        // Bank 0 has junk at the water register offsets; bank 1 has the
        // real readings.
        ec.set(0, 0x00, 0xaa);
        ec.set(0, 0x01, 0xbb);
        ec.set(1, 0x00, 31);
        ec.set(1, 0x01, 29);

        let mut buffer = vec![0u8; plan.registers().len()];
        read_all(&plan, &mut ec, &mut buffer).unwrap();

        assert_eq!(buffer, vec![45, 9, 31, 29]);
        assert_eq!(
            ec.ops,
            vec![
                Op::Read(BANK_REGISTER),
                // Bank 0 pass covers the whole list.
                Op::Read(0x3a),
                Op::Read(0xf4),
                Op::Read(0x00),
                Op::Read(0x01),
                Op::Write(BANK_REGISTER, 0x01),
                // Bank 1 pass retakes only its own registers.
                Op::Read(0x00),
                Op::Read(0x01),
                Op::Write(BANK_REGISTER, 0x00),
            ]
        );
    }

    #[test]
    fn test_foreign_bank_is_restored_after_the_pass() {
        let plan = plan_for(TEMP_CHIPSET);
        let mut ec = FakeEc::new();
        ec.select(0x02);
        ec.set(0, 0x3a, 45);

        let mut buffer = vec![0u8; 1];
        read_all(&plan, &mut ec, &mut buffer).unwrap();

        assert_eq!(buffer, vec![45]);
        assert_eq!(ec.selected(), 0x02);
        assert_eq!(
            ec.ops,
            vec![
                Op::Read(BANK_REGISTER),
                Op::Write(BANK_REGISTER, 0x00),
                Op::Read(0x3a),
                Op::Write(BANK_REGISTER, 0x02),
            ]
        );
    }

    #[test]
    fn test_register_read_failure_aborts_but_still_restores() {
        let plan = plan_for(TEMP_CHIPSET | FAN_CPU_OPT);
        let mut ec = FakeEc::new();
        ec.fail_read_at = Some(0xb0);

        let mut buffer = vec![0u8; plan.registers().len()];
        let err = read_all(&plan, &mut ec, &mut buffer).unwrap_err();

        assert!(matches!(err, EcError::RegisterRead { register: 0x00b0, .. }));
        assert_eq!(ec.ops.last(), Some(&Op::Write(BANK_REGISTER, 0x00)));
        // Nothing after the failing register was read.
        assert!(!ec.ops.contains(&Op::Read(0xb1)));
    }

    #[test]
    fn test_bank_switch_failure_aborts_remaining_banks() {
        let plan = plan_for(TEMP_CHIPSET | TEMP_WATER_IN);
        let mut ec = FakeEc::new();
        ec.fail_select = Some(0x01);

        let mut buffer = vec![0u8; plan.registers().len()];
        let err = read_all(&plan, &mut ec, &mut buffer).unwrap_err();

        assert!(matches!(err, EcError::BankSwitch { bank: 0x01, .. }));
        // The restore to bank 0 still went out.
        assert_eq!(ec.ops.last(), Some(&Op::Write(BANK_REGISTER, 0x00)));
    }

    #[test]
    fn test_restore_failure_after_clean_scan_is_reported() {
        let plan = plan_for(TEMP_CHIPSET);
        let mut ec = FakeEc::new();
        ec.select(0x02);
        ec.set(0, 0x3a, 45);
        ec.fail_select = Some(0x02);

        let mut buffer = vec![0u8; 1];
        let err = read_all(&plan, &mut ec, &mut buffer).unwrap_err();

        assert!(matches!(err, EcError::BankSwitch { bank: 0x02, .. }));
        // The scan itself completed before the restore blew up.
        assert_eq!(buffer, vec![45]);
    }

    #[test]
    fn test_scan_failure_wins_over_restore_failure() {
        let plan = plan_for(TEMP_CHIPSET);
        let mut ec = FakeEc::new();
        ec.select(0x02);
        ec.fail_read_at = Some(0x3a);
        ec.fail_select = Some(0x02);

        let mut buffer = vec![0u8; 1];
        let err = read_all(&plan, &mut ec, &mut buffer).unwrap_err();
        assert!(matches!(err, EcError::RegisterRead { register: 0x003a, .. }));
    }

    #[test]
    fn test_selector_read_failure_fails_the_pass_up_front() {
        let plan = plan_for(TEMP_CHIPSET);
        let mut ec = FakeEc::new();
        ec.fail_read_at = Some(BANK_REGISTER);

        let mut buffer = vec![0u8; 1];
        let err = read_all(&plan, &mut ec, &mut buffer).unwrap_err();
        assert!(matches!(err, EcError::BankSwitch { bank: 0x00, .. }));
        assert_eq!(ec.ops.len(), 1);
    }
}
