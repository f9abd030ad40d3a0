#![warn(missing_docs)]
//! Tick-rate estimation and per-tick work budgeting.
//!
//! The host drives [`TickClock::on_tick`] once per game tick. The clock keeps
//! an integer exponential moving average of the tick duration, derives the
//! current ticks-per-second rate from it, and hands out the per-tick work
//! ceiling that background consumers (chunk loading, rendering) spend before
//! yielding back to the host loop.

mod budget;
mod error;
mod estimator;
mod policy;
mod shared;

pub use budget::TickBudget;
pub use error::TickConfigError;
pub use estimator::{TickClock, TickConfig, TickSample};
pub use policy::StallPolicy;
pub use shared::{SharedTickRate, TickRateSnapshot};
