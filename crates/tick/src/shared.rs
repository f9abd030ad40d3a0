//! Cross-thread view of the tick rate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mapshim_core::SimTick;

/// Point-in-time copy of the published rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRateSnapshot {
    /// Tick at which the rate was published.
    pub tick: SimTick,
    /// Ticks per second at that tick.
    pub tps: f64,
}

/// Lock-free handle the tick owner publishes into and readers poll.
///
/// The rate is stored before the tick and read after it, so while a publish is
/// in flight a reader may pair tick `n` with the newer rate of tick `n + 1`,
/// but never a tick with a rate older than it.
#[derive(Debug, Clone)]
pub struct SharedTickRate {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tps_bits: AtomicU64,
    tick: AtomicU64,
}

impl SharedTickRate {
    /// Handle seeded with `tps` at tick zero.
    pub fn new(tps: f64) -> Self {
        Self {
            inner: Arc::new(Inner {
                tps_bits: AtomicU64::new(tps.to_bits()),
                tick: AtomicU64::new(SimTick::ZERO.0),
            }),
        }
    }

    pub(crate) fn publish(&self, tps: f64, tick: SimTick) {
        self.inner.tps_bits.store(tps.to_bits(), Ordering::Release);
        self.inner.tick.store(tick.0, Ordering::Release);
    }

    /// Most recently published rate.
    pub fn tps(&self) -> f64 {
        f64::from_bits(self.inner.tps_bits.load(Ordering::Acquire))
    }

    /// Most recently published tick and rate.
    pub fn snapshot(&self) -> TickRateSnapshot {
        let tick = SimTick(self.inner.tick.load(Ordering::Acquire));
        TickRateSnapshot {
            tick,
            tps: self.tps(),
        }
    }
}
