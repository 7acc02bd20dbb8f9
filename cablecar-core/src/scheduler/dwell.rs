//! Dwell decomposition
//!
//! A dwell is longer than the platform lets a single wait call run, so it
//! is issued as a flat series of sub-waits. The plan is derived once per
//! run and never changes.
//!
//! Sub-waits are issued in whole scheduler ticks. Sub-wait `k` of `n`
//! spans `round((k+1)·T/n) − round(k·T/n)` ticks, where `T` is the dwell
//! rounded to ticks. The series always sums to `T`, the individual lengths
//! differ by at most one tick, and at no boundary does the elapsed time
//! drift from the exact dwell by a full tick.

use crate::config::{ConfigurationError, RunConfig, SubWaitPolicy};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scheduler ticks per second (one tick = 1 ms)
pub const TICK_HZ: u32 = 1000;

/// Round a non-negative duration in seconds to the nearest tick
pub(crate) fn round_ticks(seconds: f64) -> u64 {
    (seconds * TICK_HZ as f64 + 0.5) as u64
}

/// Whole ticks contained in a non-negative duration in seconds
pub(crate) fn floor_ticks(seconds: f64) -> u64 {
    (seconds * TICK_HZ as f64) as u64
}

fn ceil_div(num: u64, den: u64) -> u64 {
    num / den + u64::from(num % den != 0)
}

/// Longest single wait the platform tolerates before auto power-off
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaitCeiling {
    max_s: f64,
}

impl WaitCeiling {
    /// Ceiling of the reference robot
    pub const REFERENCE: WaitCeiling = WaitCeiling { max_s: 15.0 };

    /// Create a ceiling; it must be finite and at least one tick long
    pub fn new(max_s: f64) -> Result<Self, ConfigurationError> {
        if !max_s.is_finite() || max_s <= 0.0 {
            return Err(ConfigurationError::InvalidCeiling);
        }
        let ticks = floor_ticks(max_s);
        if ticks == 0 || ticks > u64::from(u32::MAX) {
            return Err(ConfigurationError::InvalidCeiling);
        }
        Ok(Self { max_s })
    }

    /// Ceiling in seconds
    pub fn max_s(&self) -> f64 {
        self.max_s
    }

    /// Ceiling in whole ticks (rounded down)
    pub fn max_ticks(&self) -> u64 {
        floor_ticks(self.max_s)
    }
}

/// One dwell period realised as `sub_wait_count` sub-waits
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DwellPlan {
    dwell_s: f64,
    sub_wait_count: u32,
}

impl DwellPlan {
    /// Derive the plan for a dwell under the given ceiling and policy
    ///
    /// Fails if the dwell or ceiling are invalid, or if a sub-wait would be
    /// longer than the ceiling.
    pub fn build(
        dwell_s: f64,
        ceiling: &WaitCeiling,
        policy: SubWaitPolicy,
    ) -> Result<Self, ConfigurationError> {
        if !dwell_s.is_finite() || dwell_s <= 0.0 {
            return Err(ConfigurationError::InvalidDwell);
        }
        // Tick count must fit u64 without saturating
        if dwell_s * TICK_HZ as f64 >= u64::MAX as f64 {
            return Err(ConfigurationError::InvalidDwell);
        }
        let total_ticks = round_ticks(dwell_s);
        if total_ticks == 0 {
            return Err(ConfigurationError::InvalidDwell);
        }

        let sub_wait_count = match policy {
            SubWaitPolicy::FromCeiling => {
                derive_count(dwell_s, total_ticks, ceiling.max_s, ceiling)?
            }
            SubWaitPolicy::MaxLength(target_s) => {
                if !target_s.is_finite() || target_s <= 0.0 || target_s > ceiling.max_s {
                    return Err(ConfigurationError::InvalidSubWaitTarget);
                }
                derive_count(dwell_s, total_ticks, target_s, ceiling)?
            }
            SubWaitPolicy::FixedCount(count) => {
                if count == 0 {
                    return Err(ConfigurationError::ZeroSubWaitCount);
                }
                count
            }
        };

        let plan = Self {
            dwell_s,
            sub_wait_count,
        };

        if plan.sub_wait_s() > ceiling.max_s
            || plan.longest_sub_wait_ticks() > ceiling.max_ticks()
        {
            return Err(ConfigurationError::SubWaitAboveCeiling);
        }

        Ok(plan)
    }

    /// Validate a run and derive its dwell plan
    pub fn for_run(run: &RunConfig, ceiling: &WaitCeiling) -> Result<Self, ConfigurationError> {
        run.validate(ceiling)?;
        Self::build(run.dwell_s, ceiling, run.sub_wait_policy)
    }

    /// Full dwell duration (seconds)
    pub fn dwell_s(&self) -> f64 {
        self.dwell_s
    }

    /// Number of sub-waits per dwell
    pub fn sub_wait_count(&self) -> u32 {
        self.sub_wait_count
    }

    /// Nominal sub-wait length (seconds)
    pub fn sub_wait_s(&self) -> f64 {
        self.dwell_s / self.sub_wait_count as f64
    }

    /// Dwell length in ticks, as actually issued
    pub fn total_ticks(&self) -> u64 {
        round_ticks(self.dwell_s)
    }

    /// Longest issued sub-wait in ticks
    pub fn longest_sub_wait_ticks(&self) -> u64 {
        ceil_div(self.total_ticks(), u64::from(self.sub_wait_count))
    }

    /// Tick lengths of the sub-waits, in issue order
    pub fn sub_waits(&self) -> SubWaits {
        SubWaits {
            total_ticks: self.total_ticks(),
            count: self.sub_wait_count,
            index: 0,
            elapsed: 0,
        }
    }
}

/// Fewest sub-waits of at most `target_s` that also respect the ceiling
fn derive_count(
    dwell_s: f64,
    total_ticks: u64,
    target_s: f64,
    ceiling: &WaitCeiling,
) -> Result<u32, ConfigurationError> {
    let target_ticks = floor_ticks(target_s).min(ceiling.max_ticks());
    if target_ticks == 0 {
        return Err(ConfigurationError::InvalidSubWaitTarget);
    }

    let mut count = ceil_div(total_ticks, target_ticks);
    if count > u64::from(u32::MAX) {
        return Err(ConfigurationError::InvalidDwell);
    }
    // The dwell may sit up to half a tick above its tick rounding
    while dwell_s / count as f64 > target_s.min(ceiling.max_s) {
        count += 1;
    }

    u32::try_from(count).map_err(|_| ConfigurationError::InvalidDwell)
}

/// Iterator over sub-wait lengths in ticks
#[derive(Debug, Clone)]
pub struct SubWaits {
    total_ticks: u64,
    count: u32,
    index: u32,
    elapsed: u64,
}

impl SubWaits {
    fn boundary(&self, k: u32) -> u64 {
        let count = u128::from(self.count);
        let scaled = u128::from(k) * u128::from(self.total_ticks) + count / 2;
        (scaled / count) as u64
    }
}

impl Iterator for SubWaits {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.index >= self.count {
            return None;
        }
        self.index += 1;
        let end = self.boundary(self.index);
        let ticks = end - self.elapsed;
        self.elapsed = end;
        // Bounded by the ceiling, which fits u32
        Some(ticks as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubWaits {}
