use serde::{Deserialize, Serialize};
use std::time::Duration;

use mapshim_core::NANOS_PER_MILLI;

/// Ceiling on background work time within a single tick.
///
/// The budget only supplies the ceiling. Consumption is tracked by the caller
/// because what counts as work (chunks loaded, tiles rendered) is specific to
/// the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickBudget {
    ceiling_nanos: u64,
}

impl TickBudget {
    /// Budget of `ceiling_nanos` nanoseconds per tick.
    pub const fn from_nanos(ceiling_nanos: u64) -> Self {
        Self { ceiling_nanos }
    }

    /// Budget derived from a host-supplied millisecond maximum.
    pub const fn from_millis(millis: u64) -> Self {
        Self::from_nanos(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// Configured ceiling in nanoseconds.
    pub const fn ceiling_nanos(self) -> u64 {
        self.ceiling_nanos
    }

    /// Configured ceiling as a [`Duration`].
    pub const fn ceiling(self) -> Duration {
        Duration::from_nanos(self.ceiling_nanos)
    }

    /// Budget left after `consumed` time, never more than the ceiling.
    pub fn remaining(self, consumed: Duration) -> Duration {
        self.ceiling().saturating_sub(consumed)
    }

    /// Whether `consumed` time has used the whole budget.
    pub fn is_exhausted(self, consumed: Duration) -> bool {
        self.remaining(consumed).is_zero()
    }
}
