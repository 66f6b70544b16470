//! Virtual time model.
//!
//! # Design
//!
//! Time is a monotonically non-decreasing `SimTime` counter of whole
//! simulated minutes.  It is advanced only by the scheduler when it pops the
//! next event, and it has no relation to wall-clock time.
//!
//! Using an integer as the canonical time unit keeps all schedule arithmetic
//! exact (no floating-point drift), which together with the insertion
//! sequence tie-break makes runs replayable bit-for-bit.

use std::fmt;

/// An absolute point on the virtual clock, in minutes since the run started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Return the time `delay` minutes after `self`.
    #[inline]
    pub fn offset(self, delay: u64) -> SimTime {
        SimTime(self.0 + delay)
    }

    /// Minutes elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Break the time into (hour, minute) since the start of the run.
    pub fn hm(self) -> (u64, u64) {
        (self.0 / 60, self.0 % 60)
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
