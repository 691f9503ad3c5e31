use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Virtual seconds elapsed since the start of a run. Total-ordered: the
/// scheduler never produces `NaN` timestamps, so `Ord` is implemented via
/// `partial_cmp` and panics if that invariant is ever violated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VirtualTime(pub f64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl Eq for VirtualTime {}

impl Ord for VirtualTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).expect("virtual time is never NaN")
    }
}

impl Add<f64> for VirtualTime {
    type Output = VirtualTime;
    fn add(self, rhs: f64) -> VirtualTime {
        VirtualTime(self.0 + rhs)
    }
}

impl Sub for VirtualTime {
    type Output = f64;
    fn sub(self, rhs: VirtualTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
