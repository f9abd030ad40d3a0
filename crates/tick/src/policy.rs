//! Handling of pathologically long ticks.

use serde::{Deserialize, Serialize};

use crate::TickConfigError;

/// What to do with a single tick interval before it is folded into the average.
///
/// A host stall (GC pause, disk flush, world save) produces one huge interval.
/// Unclamped, the moving average absorbs it over roughly a hundred ticks;
/// clamping bounds how far a single sample can move the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallPolicy {
    /// Fold the raw interval into the average.
    #[default]
    Unclamped,
    /// Clamp the interval to `n` nominal tick durations.
    MaxMultiple(u32),
    /// Clamp the interval to an absolute number of nanoseconds.
    MaxNanos(u64),
}

impl StallPolicy {
    /// Validate the policy parameters.
    pub fn validate(self) -> Result<(), TickConfigError> {
        match self {
            Self::Unclamped => Ok(()),
            Self::MaxMultiple(0) => Err(TickConfigError::InvalidStallMultiple(0)),
            Self::MaxMultiple(_) => Ok(()),
            Self::MaxNanos(0) => Err(TickConfigError::InvalidStallCeiling),
            Self::MaxNanos(_) => Ok(()),
        }
    }

    /// Upper bound for a single interval, if any.
    pub fn ceiling(self, nominal_nanos: u64) -> Option<u64> {
        match self {
            Self::Unclamped => None,
            Self::MaxMultiple(n) => Some(nominal_nanos.saturating_mul(u64::from(n))),
            Self::MaxNanos(max) => Some(max),
        }
    }

    /// Apply the policy to a raw interval.
    pub fn apply(self, elapsed_nanos: u64, nominal_nanos: u64) -> u64 {
        match self.ceiling(nominal_nanos) {
            Some(ceiling) => elapsed_nanos.min(ceiling),
            None => elapsed_nanos,
        }
    }
}
