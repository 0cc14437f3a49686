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

//! Byte-level access to the embedded controller register file.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::error::Result;

/// Bank selector register. Lives at the same offset in every bank.
pub const BANK_REGISTER: u16 = 0xff;

/// Register window the kernel exposes when `ec_sys` is loaded with
/// `write_support=1`.
pub const EC_IO_PATH: &str = "/sys/kernel/debug/ec/ec0/io";

/// One byte in or out of the EC register window.
///
/// Addresses are offsets within the currently selected bank; callers mask
/// the bank byte off full register addresses before handing them down.
#[cfg_attr(test, mockall::automock)]
pub trait EcTransport {
    fn read_register(&mut self, address: u16) -> io::Result<u8>;
    fn write_register(&mut self, address: u16, value: u8) -> io::Result<()>;
}

impl<T: EcTransport + ?Sized> EcTransport for &mut T {
    fn read_register(&mut self, address: u16) -> io::Result<u8> {
        (**self).read_register(address)
    }

    fn write_register(&mut self, address: u16, value: u8) -> io::Result<()> {
        (**self).write_register(address, value)
    }
}

/// The real EC, reached through the kernel's debugfs register window.
#[derive(Debug)]
pub struct EcDev {
    file: File,
}

impl EcDev {
    /// Open the default debugfs window. Needs root.
    pub fn open() -> Result<Self> {
        Self::open_path(Path::new(EC_IO_PATH))
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }
}

impl EcTransport for EcDev {
    fn read_register(&mut self, address: u16) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.file.read_exact_at(&mut byte, u64::from(address))?;
        Ok(byte[0])
    }

    fn write_register(&mut self, address: u16, value: u8) -> io::Result<()> {
        self.file.write_all_at(&[value], u64::from(address))
    }
}
