//! Smoothed tick-duration estimator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use mapshim_core::{MonotonicClock, SimTick, NANOS_PER_MILLI, NANOS_PER_SECOND};

use crate::{SharedTickRate, StallPolicy, TickBudget, TickConfigError};

/// Weight of the history in the moving average, out of [`EMA_SCALE`].
const EMA_HISTORY_WEIGHT: u128 = 99;
const EMA_SCALE: u128 = 100;

/// Host tick timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target tick duration of the host loop in milliseconds.
    pub nominal_tick_ms: u64,
    /// Treatment of abnormally long ticks.
    pub stall_policy: StallPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            nominal_tick_ms: 50,
            stall_policy: StallPolicy::Unclamped,
        }
    }
}

impl TickConfig {
    /// Nominal tick duration in nanoseconds.
    pub fn nominal_tick_nanos(&self) -> u64 {
        self.nominal_tick_ms.saturating_mul(NANOS_PER_MILLI)
    }

    /// Reject configurations that would produce an infinite or undefined rate.
    pub fn validate(&self) -> Result<(), TickConfigError> {
        if self.nominal_tick_ms == 0 {
            return Err(TickConfigError::ZeroNominalDuration);
        }
        self.stall_policy.validate()
    }
}

/// Result of a single [`TickClock::on_tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSample {
    /// Tick count after this tick was recorded.
    pub tick: SimTick,
    /// Interval folded into the average (after the stall policy).
    pub elapsed_nanos: u64,
    /// Smoothed tick duration.
    pub average_tick_nanos: u64,
    /// Ticks per second derived from the smoothed duration.
    pub tps: f64,
}

/// Tick-rate estimator and per-tick budget holder.
///
/// Owned by whatever loop drives the host ticks. [`TickClock::on_tick`] takes
/// `&mut self`, so it can never run concurrently with itself; other threads
/// observe the rate through [`TickClock::shared_rate`].
#[derive(Debug)]
pub struct TickClock<C> {
    clock: C,
    nominal_tick_nanos: u64,
    stall_policy: StallPolicy,
    budget: TickBudget,
    last_tick_nanos: u64,
    average_tick_nanos: u64,
    current_tps: f64,
    tick: SimTick,
    units_this_tick: u32,
    shared: SharedTickRate,
}

impl<C: MonotonicClock> TickClock<C> {
    /// Start estimating with the average seeded to `nominal_tick_nanos`.
    pub fn new(
        nominal_tick_nanos: u64,
        budget_nanos: u64,
        clock: C,
    ) -> Result<Self, TickConfigError> {
        if nominal_tick_nanos == 0 {
            return Err(TickConfigError::ZeroNominalDuration);
        }
        let last_tick_nanos = clock.now_nanos();
        let current_tps = rate_for(nominal_tick_nanos);
        let shared = SharedTickRate::new(current_tps);
        Ok(Self {
            clock,
            nominal_tick_nanos,
            stall_policy: StallPolicy::Unclamped,
            budget: TickBudget::from_nanos(budget_nanos),
            last_tick_nanos,
            average_tick_nanos: nominal_tick_nanos,
            current_tps,
            tick: SimTick::ZERO,
            units_this_tick: 0,
            shared,
        })
    }

    /// Build from configuration plus the engine-supplied budget.
    pub fn from_config(
        config: &TickConfig,
        budget: TickBudget,
        clock: C,
    ) -> Result<Self, TickConfigError> {
        config.validate()?;
        let clock = Self::new(config.nominal_tick_nanos(), budget.ceiling_nanos(), clock)?;
        Ok(clock.with_stall_policy(config.stall_policy))
    }

    /// Replace the stall policy.
    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    /// Record a tick boundary.
    ///
    /// `units_allowance` is the consumer's per-tick work allowance (e.g. the
    /// number of chunk loads permitted this tick); it replaces whatever was
    /// left of the previous tick's allowance.
    pub fn on_tick(&mut self, units_allowance: u32) -> TickSample {
        let now = self.clock.now_nanos();
        let raw_elapsed = now.saturating_sub(self.last_tick_nanos);
        self.last_tick_nanos = now;

        let elapsed = self.stall_policy.apply(raw_elapsed, self.nominal_tick_nanos);
        if elapsed != raw_elapsed {
            debug!(
                tick = self.tick.0,
                raw_elapsed,
                elapsed,
                "Clamped stalled tick interval"
            );
        }

        self.average_tick_nanos = next_average(self.average_tick_nanos, elapsed);
        self.current_tps = rate_for(self.average_tick_nanos);
        self.units_this_tick = units_allowance;
        self.tick = self.tick.advance(1);
        self.shared.publish(self.current_tps, self.tick);

        trace!(
            tick = self.tick.0,
            elapsed,
            average = self.average_tick_nanos,
            tps = self.current_tps,
            "tick"
        );

        TickSample {
            tick: self.tick,
            elapsed_nanos: elapsed,
            average_tick_nanos: self.average_tick_nanos,
            tps: self.current_tps,
        }
    }

    /// Current ticks-per-second estimate.
    pub fn current_rate(&self) -> f64 {
        self.current_tps
    }

    /// Budget left this tick after the caller has spent `consumed`.
    pub fn remaining_budget(&self, consumed: Duration) -> Duration {
        self.budget.remaining(consumed)
    }

    /// Time since the most recent tick boundary.
    pub fn elapsed_this_tick(&self) -> Duration {
        Duration::from_nanos(self.clock.now_nanos().saturating_sub(self.last_tick_nanos))
    }

    /// Take `units` from this tick's allowance; refuses without side effects
    /// when not enough is left.
    pub fn try_consume_units(&mut self, units: u32) -> bool {
        if self.units_this_tick < units {
            return false;
        }
        self.units_this_tick -= units;
        true
    }

    /// Allowance left for this tick.
    pub fn units_this_tick(&self) -> u32 {
        self.units_this_tick
    }

    /// Smoothed tick duration in nanoseconds.
    pub fn average_tick_nanos(&self) -> u64 {
        self.average_tick_nanos
    }

    /// Ticks recorded so far.
    pub fn tick_count(&self) -> SimTick {
        self.tick
    }

    /// Configured per-tick work ceiling.
    pub fn budget(&self) -> TickBudget {
        self.budget
    }

    /// Active stall policy.
    pub fn stall_policy(&self) -> StallPolicy {
        self.stall_policy
    }

    /// Handle for reading the rate from other threads.
    pub fn shared_rate(&self) -> SharedTickRate {
        self.shared.clone()
    }
}

/// One step of the integer moving average: `(avg * 99 + elapsed) / 100`,
/// floored at 1 ns so the derived rate stays finite.
fn next_average(average: u64, elapsed: u64) -> u64 {
    let next = (u128::from(average) * EMA_HISTORY_WEIGHT + u128::from(elapsed)) / EMA_SCALE;
    u64::try_from(next).unwrap_or(u64::MAX).max(1)
}

fn rate_for(average_tick_nanos: u64) -> f64 {
    NANOS_PER_SECOND as f64 / average_tick_nanos as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshim_testkit::ManualClock;

    const NOMINAL: u64 = 50_000_000;

    fn clock_at_nominal() -> (ManualClock, TickClock<ManualClock>) {
        let time = ManualClock::new();
        let clock = TickClock::new(NOMINAL, 0, time.clone()).expect("valid config");
        (time, clock)
    }

    #[test]
    fn rejects_zero_nominal_duration() {
        let err = TickClock::new(0, 0, ManualClock::new()).unwrap_err();
        assert_eq!(err, TickConfigError::ZeroNominalDuration);
    }

    #[test]
    fn seeded_rate_is_twenty_tps() {
        let (_, clock) = clock_at_nominal();
        assert_eq!(clock.average_tick_nanos(), NOMINAL);
        assert!((clock.current_rate() - 20.0).abs() < 1e-9);
        assert_eq!(clock.tick_count(), SimTick::ZERO);
    }

    #[test]
    fn nominal_interval_keeps_average() {
        let (time, mut clock) = clock_at_nominal();
        time.advance_nanos(NOMINAL);
        let sample = clock.on_tick(0);
        assert_eq!(sample.average_tick_nanos, NOMINAL);
        assert_eq!(sample.elapsed_nanos, NOMINAL);
        assert_eq!(sample.tick, SimTick(1));
    }

    #[test]
    fn doubled_interval_moves_average_by_one_percent() {
        let (time, mut clock) = clock_at_nominal();
        time.advance_nanos(2 * NOMINAL);
        let sample = clock.on_tick(0);
        assert_eq!(sample.average_tick_nanos, 50_500_000);
        assert!((sample.tps - 19.80198).abs() < 1e-4, "tps {}", sample.tps);
        assert!(clock.current_rate() < 20.0);
    }

    #[test]
    fn backwards_clock_counts_as_zero_interval() {
        let time = ManualClock::starting_at(1_000_000_000);
        let mut clock = TickClock::new(NOMINAL, 0, time.clone()).unwrap();
        time.set_nanos(0);
        let sample = clock.on_tick(0);
        assert_eq!(sample.elapsed_nanos, 0);
        assert_eq!(sample.average_tick_nanos, NOMINAL * 99 / 100);
    }

    #[test]
    fn average_never_reaches_zero() {
        let time = ManualClock::new();
        let mut clock = TickClock::new(1, 0, time).unwrap();
        for _ in 0..10 {
            clock.on_tick(0);
        }
        assert_eq!(clock.average_tick_nanos(), 1);
        assert!(clock.current_rate().is_finite());
    }

    #[test]
    fn huge_stall_does_not_overflow() {
        let (time, mut clock) = clock_at_nominal();
        time.set_nanos(u64::MAX);
        let sample = clock.on_tick(0);
        assert!(sample.average_tick_nanos > NOMINAL);
        assert!(sample.tps > 0.0);
    }

    #[test]
    fn stall_policy_bounds_single_tick_change() {
        let time = ManualClock::new();
        let config = TickConfig {
            nominal_tick_ms: 50,
            stall_policy: StallPolicy::MaxMultiple(2),
        };
        let mut clock =
            TickClock::from_config(&config, TickBudget::from_millis(10), time.clone()).unwrap();
        time.advance_nanos(60 * NOMINAL);
        let sample = clock.on_tick(0);
        assert_eq!(sample.elapsed_nanos, 2 * NOMINAL);
        assert_eq!(sample.average_tick_nanos, 50_500_000);
    }

    #[test]
    fn from_config_rejects_invalid_policy() {
        let config = TickConfig {
            nominal_tick_ms: 50,
            stall_policy: StallPolicy::MaxNanos(0),
        };
        let err =
            TickClock::from_config(&config, TickBudget::default(), ManualClock::new()).unwrap_err();
        assert_eq!(err, TickConfigError::InvalidStallCeiling);
    }

    #[test]
    fn units_reset_every_tick() {
        let (time, mut clock) = clock_at_nominal();
        time.advance_nanos(NOMINAL);
        clock.on_tick(3);
        assert!(clock.try_consume_units(2));
        assert!(!clock.try_consume_units(2));
        assert_eq!(clock.units_this_tick(), 1);

        time.advance_nanos(NOMINAL);
        clock.on_tick(5);
        assert_eq!(clock.units_this_tick(), 5);
    }

    #[test]
    fn remaining_budget_tracks_time_in_tick() {
        let time = ManualClock::new();
        let mut clock = TickClock::new(NOMINAL, 20_000_000, time.clone()).unwrap();
        time.advance_nanos(NOMINAL);
        clock.on_tick(0);
        time.advance(Duration::from_millis(5));
        let used = clock.elapsed_this_tick();
        assert_eq!(used, Duration::from_millis(5));
        assert_eq!(clock.remaining_budget(used), Duration::from_millis(15));
        assert_eq!(
            clock.remaining_budget(Duration::from_millis(30)),
            Duration::ZERO
        );
    }

    #[test]
    fn shared_rate_follows_ticks() {
        let (time, mut clock) = clock_at_nominal();
        let shared = clock.shared_rate();
        time.advance_nanos(2 * NOMINAL);
        clock.on_tick(0);
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.tick, SimTick(1));
        assert!((snapshot.tps - clock.current_rate()).abs() < f64::EPSILON);
    }

    #[test]
    fn config_parses_from_toml() {
        let config: TickConfig = toml::from_str(
            r#"
nominal_tick_ms = 25

[stall_policy]
max_multiple = 8
"#,
        )
        .expect("parse");
        assert_eq!(config.nominal_tick_ms, 25);
        assert_eq!(config.stall_policy, StallPolicy::MaxMultiple(8));

        let defaults: TickConfig = toml::from_str("").expect("parse");
        assert_eq!(defaults, TickConfig::default());
    }
}
