use thiserror::Error;

/// Rejected tick configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickConfigError {
    /// The nominal tick duration must be positive.
    #[error("nominal tick duration must be greater than zero")]
    ZeroNominalDuration,
    /// A stall clamp expressed as a multiple of the nominal duration must be at least 1.
    #[error("stall clamp multiple must be at least 1, got {0}")]
    InvalidStallMultiple(u32),
    /// An absolute stall clamp must be positive.
    #[error("stall clamp ceiling must be greater than zero")]
    InvalidStallCeiling,
}
