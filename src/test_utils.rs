/*
 * Test utilities and fake hardware for Ecsense
 *
 * This module provides an in-memory EC and guard plus helper constructors
 * that can be used across different test modules.
 */

use std::io;
use std::time::Duration;

use crate::board::BoardProfile;
use crate::catalog::SensorSet;
use crate::ec::{EcTransport, BANK_REGISTER};
use crate::guard::HardwareGuard;

/// Creates a board profile with an arbitrary sensor set for testing.
pub fn create_test_profile(sensors: SensorSet) -> BoardProfile {
    BoardProfile {
        name: "TEST BOARD",
        sensors,
        guard: "\\TEST.MUX",
    }
}

/// One transport call, as the fake EC saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read(u16),
    Write(u16, u8),
}

/// In-memory EC: four 256-byte banks behind the selector register.
///
/// Records every call in order and can inject failures on a chosen
/// register read or on selecting a chosen bank value.
pub struct FakeEc {
    banks: [[u8; 256]; 4],
    selected: u8,
    pub ops: Vec<Op>,
    pub reads: usize,
    pub writes: usize,
    pub fail_read_at: Option<u16>,
    pub fail_select: Option<u8>,
}

impl FakeEc {
    pub fn new() -> Self {
        Self {
            banks: [[0u8; 256]; 4],
            selected: 0,
            ops: Vec::new(),
            reads: 0,
            writes: 0,
            fail_read_at: None,
            fail_select: None,
        }
    }

    /// Seed one register in one bank.
    pub fn set(&mut self, bank: u8, index: u8, value: u8) {
        self.banks[usize::from(bank)][usize::from(index)] = value;
    }

    /// Seed consecutive registers in one bank.
    pub fn set_span(&mut self, bank: u8, index: u8, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.set(bank, index + i as u8, *byte);
        }
    }

    /// Pretend another EC user left this bank selected.
    pub fn select(&mut self, bank: u8) {
        self.selected = bank;
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }
}

impl EcTransport for FakeEc {
    fn read_register(&mut self, address: u16) -> io::Result<u8> {
        assert!(
            address <= 0xff,
            "read address {address:#06x} outside the bank window"
        );
        self.ops.push(Op::Read(address));
        self.reads += 1;
        if self.fail_read_at == Some(address) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }
        if address == BANK_REGISTER {
            return Ok(self.selected);
        }
        assert!(self.selected < 4, "bank {} not modelled", self.selected);
        Ok(self.banks[usize::from(self.selected)][usize::from(address)])
    }

    fn write_register(&mut self, address: u16, value: u8) -> io::Result<()> {
        assert!(
            address <= 0xff,
            "write address {address:#06x} outside the bank window"
        );
        self.ops.push(Op::Write(address, value));
        self.writes += 1;
        if address == BANK_REGISTER {
            if self.fail_select == Some(value) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "injected bank switch failure",
                ));
            }
            self.selected = value;
            return Ok(());
        }
        assert!(self.selected < 4, "bank {} not modelled", self.selected);
        self.banks[usize::from(self.selected)][usize::from(address)] = value;
        Ok(())
    }
}

/// Guard that always grants immediately and counts its calls.
#[derive(Debug, Default)]
pub struct FakeGuard {
    pub acquired: usize,
    pub released: usize,
    pub held: bool,
    pub fail_acquire: bool,
}

impl FakeGuard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HardwareGuard for FakeGuard {
    fn acquire(&mut self, _timeout: Duration) -> io::Result<()> {
        if self.fail_acquire {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "injected guard timeout",
            ));
        }
        assert!(!self.held, "guard acquired while already held");
        self.held = true;
        self.acquired += 1;
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        self.held = false;
        self.released += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_ec_keeps_banks_isolated() {
        let mut ec = FakeEc::new();
        ec.set(0, 0x10, 1);
        ec.set(1, 0x10, 2);

        assert_eq!(ec.read_register(0x10).unwrap(), 1);
        ec.write_register(BANK_REGISTER, 1).unwrap();
        assert_eq!(ec.read_register(0x10).unwrap(), 2);
        assert_eq!(ec.selected(), 1);
    }

    #[test]
    fn test_fake_ec_selector_reads_back_current_bank() {
        let mut ec = FakeEc::new();
        assert_eq!(ec.read_register(BANK_REGISTER).unwrap(), 0);
        ec.select(3);
        assert_eq!(ec.read_register(BANK_REGISTER).unwrap(), 3);
    }

    #[test]
    fn test_fake_ec_records_ops_in_order() {
        let mut ec = FakeEc::new();
        ec.read_register(0x3a).unwrap();
        ec.write_register(BANK_REGISTER, 1).unwrap();
        assert_eq!(ec.ops, vec![Op::Read(0x3a), Op::Write(BANK_REGISTER, 1)]);
        assert_eq!((ec.reads, ec.writes), (1, 1));
    }

    #[test]
    fn test_fake_guard_counts_hold_cycles() {
        let mut guard = FakeGuard::new();
        guard.acquire(Duration::from_millis(1)).unwrap();
        assert!(guard.held);
        guard.release().unwrap();
        assert!(!guard.held);
        assert_eq!((guard.acquired, guard.released), (1, 1));

        guard.fail_acquire = true;
        let err = guard.acquire(Duration::from_millis(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(guard.acquired, 1);
    }
}
