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

//! The sensor driver: read-through cache over bulk EC passes.
//!
//! Every query answers from a cache that is at most [`CACHE_TTL`] old.
//! A stale cache triggers one full pass over the board's register plan,
//! taken under the hardware guard; all sensors refresh together, so one
//! snapshot is internally consistent. A failed pass leaves the previous
//! values and their timestamp in place.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::board::BoardProfile;
use crate::catalog::SensorKind;
use crate::decode;
use crate::dmi;
use crate::ec::{EcDev, EcTransport};
use crate::error::{EcError, Result};
use crate::guard::{FileLockGuard, GuardLease, HardwareGuard};
use crate::plan::RegisterPlan;
use crate::reader;

/// How long one bulk pass stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(1);

/// How long to wait for the hardware guard before giving up.
pub const GUARD_TIMEOUT: Duration = Duration::from_millis(500);

/// One sensor reading, already scaled into its reporting unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub kind: SensorKind,
    pub channel: usize,
    pub label: &'static str,
    pub value: u32,
}

struct CacheState {
    /// Scaled per-sensor values, one per plan slot.
    values: Vec<u32>,
    /// Scratch buffer for the raw pass, one byte per plan register.
    buffer: Vec<u8>,
    /// When `values` was last committed. `None` until the first pass
    /// lands, so the first query always reads hardware.
    last_updated: Option<Instant>,
}

impl CacheState {
    fn new(plan: &RegisterPlan) -> Self {
        Self {
            values: vec![0; plan.sensors().len()],
            buffer: vec![0; plan.registers().len()],
            last_updated: None,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.last_updated {
            None => true,
            Some(at) => now.duration_since(at) >= CACHE_TTL,
        }
    }
}

struct Inner<T, G> {
    ec: T,
    guard: G,
    cache: CacheState,
}

/// EC sensors of one board.
///
/// Generic over the transport and the guard so the whole read path runs
/// against fakes in tests. Shared references suffice for queries; the
/// transport, guard and cache sit behind one mutex, so concurrent
/// callers serialize and at most one pass is in flight at a time.
pub struct EcSensors<T, G> {
    profile: BoardProfile,
    plan: RegisterPlan,
    inner: Mutex<Inner<T, G>>,
}

impl EcSensors<EcDev, FileLockGuard> {
    /// Identify the running board via DMI and open the real EC.
    pub fn probe() -> Result<Self> {
        let profile = *dmi::resolve_active_board()?;
        let ec = EcDev::open()?;
        let guard = FileLockGuard::for_name(profile.guard);
        Self::new(profile, ec, guard)
    }
}

impl<T: EcTransport, G: HardwareGuard> EcSensors<T, G> {
    pub fn new(profile: BoardProfile, ec: T, guard: G) -> Result<Self> {
        let plan = RegisterPlan::build(&profile)?;
        info!(
            board = profile.name,
            sensors = plan.sensors().len(),
            registers = plan.registers().len(),
            "EC sensor set planned"
        );
        let cache = CacheState::new(&plan);
        Ok(Self {
            profile,
            plan,
            inner: Mutex::new(Inner { ec, guard, cache }),
        })
    }

    pub fn board(&self) -> &BoardProfile {
        &self.profile
    }

    /// Whether a `(kind, channel)` pair exists on this board.
    pub fn is_visible(&self, kind: SensorKind, channel: usize) -> bool {
        self.plan.find(kind, channel).is_some()
    }

    /// Number of channels of `kind` on this board.
    pub fn channels(&self, kind: SensorKind) -> usize {
        self.plan.channels(kind)
    }

    pub fn label(&self, kind: SensorKind, channel: usize) -> Result<&'static str> {
        self.plan
            .find(kind, channel)
            .map(|slot| self.plan.info(slot).label)
            .ok_or(EcError::NoSuchSensor { kind, channel })
    }

    /// Current value of one sensor, refreshing the cache if it is stale.
    ///
    /// Temperatures, currents and voltages come back in milli-units, fan
    /// speeds in RPM.
    pub fn value(&self, kind: SensorKind, channel: usize) -> Result<u32> {
        let slot = self
            .plan
            .find(kind, channel)
            .ok_or(EcError::NoSuchSensor { kind, channel })?;
        let mut inner = self.inner.lock();
        self.refresh_if_stale(&mut inner)?;
        Ok(inner.cache.values[slot])
    }

    /// Every sensor of the board in catalog order, from one cache
    /// generation.
    pub fn snapshot(&self) -> Result<Vec<Reading>> {
        let mut inner = self.inner.lock();
        self.refresh_if_stale(&mut inner)?;

        let mut channels: HashMap<SensorKind, usize> = HashMap::new();
        let mut readings = Vec::with_capacity(self.plan.sensors().len());
        for (slot, value) in inner.cache.values.iter().enumerate() {
            let info = self.plan.info(slot);
            let channel = channels.entry(info.kind).or_insert(0);
            readings.push(Reading {
                kind: info.kind,
                channel: *channel,
                label: info.label,
                value: *value,
            });
            *channel += 1;
        }
        Ok(readings)
    }

    fn refresh_if_stale(&self, inner: &mut Inner<T, G>) -> Result<()> {
        if !inner.cache.is_stale(Instant::now()) {
            return Ok(());
        }

        let Inner { ec, guard, cache } = inner;
        let lease =
            GuardLease::acquire(guard, GUARD_TIMEOUT).map_err(|source| EcError::GuardUnavailable {
                name: self.profile.guard.to_string(),
                source,
            })?;
        let pass = reader::read_all(&self.plan, ec, &mut cache.buffer);
        drop(lease);

        if let Err(err) = pass {
            error!(board = self.profile.name, %err, "EC sensor refresh failed");
            return Err(err);
        }

        decode::decode_into(&self.plan, &cache.buffer, &mut cache.values);
        cache.last_updated = Some(Instant::now());
        debug!(registers = self.plan.registers().len(), "EC registers refreshed");
        Ok(())
    }
}
