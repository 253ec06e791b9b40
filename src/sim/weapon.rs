//! Score-driven weapon upgrades

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::tuning::WeaponTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirePattern {
    Single,
    Double,
    Piercing,
    Plasma,
}

impl FirePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            FirePattern::Single => "single",
            FirePattern::Double => "double",
            FirePattern::Piercing => "piercing",
            FirePattern::Plasma => "plasma",
        }
    }
}

/// One row of the upgrade table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponLevel {
    pub name: String,
    /// Cumulative score needed to reach this level
    pub threshold: u64,
    pub bullet_speed: f32,
    pub fire_cooldown_ms: f32,
    pub max_bullets: u32,
    pub pattern: FirePattern,
}

pub(crate) fn validate_levels(levels: &[WeaponLevel]) -> Result<(), RulesError> {
    let Some(first) = levels.first() else {
        return Err(RulesError::InvalidWeaponTable("no weapon levels"));
    };
    if first.threshold != 0 {
        return Err(RulesError::InvalidWeaponTable("first level must start at 0"));
    }
    if levels.windows(2).any(|pair| pair[1].threshold <= pair[0].threshold) {
        return Err(RulesError::InvalidWeaponTable("thresholds must strictly ascend"));
    }
    Ok(())
}

/// Current weapon level and the score tracked toward the next one
#[derive(Debug, Clone)]
pub struct WeaponSystem {
    levels: Vec<WeaponLevel>,
    level: usize,
    score: u64,
}

impl WeaponSystem {
    pub fn new(tuning: &WeaponTuning) -> Result<Self, RulesError> {
        validate_levels(&tuning.levels)?;
        Ok(Self {
            levels: tuning.levels.clone(),
            level: 0,
            score: 0,
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn config(&self) -> &WeaponLevel {
        &self.levels[self.level]
    }

    pub fn name(&self) -> &str {
        &self.config().name
    }

    pub fn pattern(&self) -> FirePattern {
        self.config().pattern
    }

    /// Accumulate score and climb as many levels as it pays for.
    /// Returns the new level index if it changed.
    pub fn add_score(&mut self, points: u64) -> Option<usize> {
        self.score = self.score.saturating_add(points);
        let start = self.level;
        while self.level < self.max_level() && self.score >= self.levels[self.level + 1].threshold {
            self.level += 1;
        }
        if self.level != start {
            log::info!("Weapon upgraded to {} ({})", self.level, self.name());
            Some(self.level)
        } else {
            None
        }
    }

    /// Drop one level (floor 0), rewinding the tracked score to its threshold.
    /// Returns the new level index if it changed.
    pub fn level_down(&mut self) -> Option<usize> {
        if self.level == 0 {
            return None;
        }
        self.level -= 1;
        self.score = self.levels[self.level].threshold;
        log::info!("Weapon downgraded to {} ({})", self.level, self.name());
        Some(self.level)
    }

    /// Fraction of the way to the next level; 1.0 at the top level
    pub fn progress(&self) -> f32 {
        if self.level >= self.max_level() {
            return 1.0;
        }
        let current = self.levels[self.level].threshold;
        let next = self.levels[self.level + 1].threshold;
        let span = next.saturating_sub(current);
        if span == 0 {
            return 1.0;
        }
        (self.score.saturating_sub(current) as f64 / span as f64).clamp(0.0, 1.0) as f32
    }

    pub fn reset(&mut self) {
        self.level = 0;
        self.score = 0;
    }
}

impl Default for WeaponSystem {
    fn default() -> Self {
        Self {
            levels: WeaponTuning::default().levels,
            level: 0,
            score: 0,
        }
    }
}
