//! Typed rejections for out-of-range inputs at the engine boundary.
//!
//! Nothing here is fatal: callers get a value they can log and ignore while
//! the host loop keeps running.

use thiserror::Error;

/// Input rejected by validation before it reaches any component state.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid wave {0}: waves start at 1")]
    InvalidWave(u32),

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown challenge {0}")]
    UnknownChallenge(u32),

    #[error("invalid initials {0:?}: must be 1-3 characters")]
    InvalidInitials(String),

    #[error("implausible score {score} for wave {wave}")]
    ImplausibleScore { score: u64, wave: u32 },

    #[error("invalid tier table: {0}")]
    InvalidTierTable(&'static str),

    #[error("invalid weapon table: {0}")]
    InvalidWeaponTable(&'static str),

    #[error("power-up weights must be positive and sum to 1.0 (got {0})")]
    InvalidPowerUpWeights(f64),

    #[error("malformed tuning document: {0}")]
    Config(#[from] serde_json::Error),
}
