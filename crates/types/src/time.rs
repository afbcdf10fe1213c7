//! Simulated time.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A simulated timestamp or offset.
///
/// Time is continuous: ordinary spike events land at "little tick"
/// resolution between the coarse "big tick" synchronization boundaries.
/// The wrapper provides the total ordering an event queue key needs,
/// which bare `f64` lacks.
///
/// Values are expected to be finite and non-negative; arithmetic here
/// does not produce NaN from finite inputs, and `total_cmp` keeps the
/// ordering total regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub f64);

impl SimTime {
    /// The start of simulated time.
    pub const ZERO: Self = SimTime(0.0);

    /// Create a timestamp from a raw value.
    pub fn new(t: f64) -> Self {
        SimTime(t)
    }

    /// Get the raw value.
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.6}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total() {
        let mut times = vec![SimTime(2.5), SimTime(0.0), SimTime(1.001), SimTime(1.0)];
        times.sort();
        assert_eq!(
            times,
            vec![SimTime(0.0), SimTime(1.0), SimTime(1.001), SimTime(2.5)]
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = SimTime(1.5) + SimTime(0.25);
        assert_eq!(a, SimTime(1.75));
        assert_eq!(a - SimTime(0.75), SimTime(1.0));
    }
}
