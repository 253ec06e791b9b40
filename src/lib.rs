//! Invader Rules - progression and combat-rules engine for an arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame deterministic components (tiers, formation, bosses,
//!   power-ups, weapon, UFO, combo, endless pacing) and the session loop
//! - `meta`: Session-boundary services (achievements, challenges, daily seed,
//!   ghosts, lifetime stats, ships, cosmetics, share text)
//! - `persistence`: Key-value store seam with default-on-failure records
//! - `platform`: Browser/native storage binding
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod highscores;
pub mod meta;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::RulesError;
pub use highscores::HighScores;
pub use settings::{AccessibilitySettings, Settings};
pub use tuning::Tuning;

use serde::{Deserialize, Serialize};

/// One discrete round of the combat loop. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Wave(u32);

impl Wave {
    pub const FIRST: Wave = Wave(1);

    pub fn new(wave: u32) -> Result<Self, RulesError> {
        if wave == 0 {
            return Err(RulesError::InvalidWave(wave));
        }
        Ok(Self(wave))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Waves elapsed since the first one (0 on wave 1)
    #[inline]
    pub fn offset(self) -> u32 {
        self.0 - 1
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Wave {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for Wave {
    type Error = RulesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Wave> for u32 {
    fn from(wave: Wave) -> Self {
        wave.0
    }
}

impl std::fmt::Display for Wave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clamp a host-supplied frame delta (ms) to a usable value.
/// Negative, NaN and infinite deltas advance nothing.
#[inline]
pub fn sanitize_delta(delta_ms: f32) -> f32 {
    if delta_ms.is_finite() && delta_ms > 0.0 {
        delta_ms
    } else {
        0.0
    }
}

/// Format an integer with `,` thousands separators (en-US style)
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
