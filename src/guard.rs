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

//! Exclusive hardware guard held around every EC read pass.
//!
//! Firmware serializes its own EC accesses behind a named mutex; anything
//! else poking the registers is expected to hold the equivalent exclusion
//! before switching banks. [`FileLockGuard`] provides the userspace
//! equivalent with an advisory `flock(2)` on a well-known lock file, so
//! concurrent instances of this tool (and anything else honouring the
//! lock) never interleave bank switches.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::error;

/// Exclusive access to the EC for the duration of one read pass.
#[cfg_attr(test, mockall::automock)]
pub trait HardwareGuard {
    /// Take the guard, waiting up to `timeout`. `ErrorKind::TimedOut`
    /// means somebody else held it for the whole window.
    fn acquire(&mut self, timeout: Duration) -> io::Result<()>;

    /// Give the guard back. Releasing a guard that is not held is a no-op.
    fn release(&mut self) -> io::Result<()>;
}

impl<G: HardwareGuard + ?Sized> HardwareGuard for &mut G {
    fn acquire(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).acquire(timeout)
    }

    fn release(&mut self) -> io::Result<()> {
        (**self).release()
    }
}

/// Scoped hold on a [`HardwareGuard`]; releases on drop, whichever way
/// the read pass ends.
pub(crate) struct GuardLease<'a, G: HardwareGuard> {
    guard: &'a mut G,
}

impl<'a, G: HardwareGuard> GuardLease<'a, G> {
    pub(crate) fn acquire(guard: &'a mut G, timeout: Duration) -> io::Result<Self> {
        guard.acquire(timeout)?;
        Ok(Self { guard })
    }
}

impl<G: HardwareGuard> Drop for GuardLease<'_, G> {
    fn drop(&mut self) {
        if let Err(err) = self.guard.release() {
            // Nothing to propagate from here; the next acquire will fail
            // loudly if the guard is actually wedged.
            error!("failed to release hardware guard: {err}");
        }
    }
}

const LOCK_DIR: &str = "/run/lock";
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Advisory file lock standing in for the firmware's named mutex.
#[derive(Debug)]
pub struct FileLockGuard {
    path: PathBuf,
    file: Option<File>,
}

impl FileLockGuard {
    /// Guard backed by `/run/lock/ecsense-<name>.lock`.
    pub fn for_name(name: &str) -> Self {
        let file = format!("ecsense-{}.lock", sanitize_name(name));
        Self::at_path(Path::new(LOCK_DIR).join(file))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HardwareGuard for FileLockGuard {
    fn acquire(&mut self, timeout: Duration) -> io::Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        let deadline = Instant::now() + timeout;
        loop {
            // SAFETY: flock on a descriptor we own and keep open.
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
            if rc == 0 {
                self.file = Some(file);
                return Ok(());
            }
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(libc::EWOULDBLOCK) | Some(libc::EINTR) => {}
                _ => return Err(err),
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("lock {} held elsewhere", self.path.display()),
                ));
            }
            thread::sleep(LOCK_RETRY_DELAY);
        }
    }

    fn release(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            // SAFETY: unlocking the descriptor we locked in acquire.
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

fn sanitize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
            out.push(c);
        } else if c.is_whitespace() {
            out.push('_');
        }
    }
    if out.is_empty() {
        "guard".into()
    } else {
        out
    }
}
