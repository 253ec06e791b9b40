//! Wave-based difficulty tiers
//!
//! Maps a wave to one of five ordered tiers and gates the advanced enemy
//! behaviors that unlock at a given tier.

use serde::{Deserialize, Serialize};

use crate::Wave;
use crate::error::RulesError;
use crate::tuning::{TierRange, TierTuning};

/// Difficulty bracket, in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Recruit,
    Soldier,
    Veteran,
    Commander,
    Admiral,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 5] = [
        DifficultyTier::Recruit,
        DifficultyTier::Soldier,
        DifficultyTier::Veteran,
        DifficultyTier::Commander,
        DifficultyTier::Admiral,
    ];

    /// Position in the ascending tier order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Recruit => "RECRUIT",
            DifficultyTier::Soldier => "SOLDIER",
            DifficultyTier::Veteran => "VETERAN",
            DifficultyTier::Commander => "COMMANDER",
            DifficultyTier::Admiral => "ADMIRAL",
        }
    }

    /// Title-case rank name used on share cards
    pub fn rank_name(self) -> &'static str {
        match self {
            DifficultyTier::Recruit => "Recruit",
            DifficultyTier::Soldier => "Soldier",
            DifficultyTier::Veteran => "Veteran",
            DifficultyTier::Commander => "Commander",
            DifficultyTier::Admiral => "Admiral",
        }
    }
}

/// Enemy behaviors gated behind a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DiveBomb,
    SplitFormation,
    Escort,
}

/// Validated tier table plus feature start tiers
#[derive(Debug, Clone)]
pub struct TierGate {
    ranges: Vec<TierRange>,
    dive_bomb_start: DifficultyTier,
    dive_bomb_chance: f64,
    split_formation_start: DifficultyTier,
    escort_start: DifficultyTier,
}

impl TierGate {
    /// Build from tuning, rejecting tables that leave gaps or overlap
    pub fn new(tuning: &TierTuning) -> Result<Self, RulesError> {
        let ranges = &tuning.ranges;
        let Some(first) = ranges.first() else {
            return Err(RulesError::InvalidTierTable("no tiers"));
        };
        if first.min_wave != 1 {
            return Err(RulesError::InvalidTierTable("first tier must start at wave 1"));
        }

        for (i, range) in ranges.iter().enumerate() {
            let is_last = i + 1 == ranges.len();
            match (range.max_wave, is_last) {
                (None, false) => {
                    return Err(RulesError::InvalidTierTable("only the last tier may be open-ended"));
                }
                (Some(_), true) => {
                    return Err(RulesError::InvalidTierTable("last tier must be open-ended"));
                }
                (Some(max), false) => {
                    if max < range.min_wave {
                        return Err(RulesError::InvalidTierTable("tier range is empty"));
                    }
                    let next = &ranges[i + 1];
                    if next.min_wave != max + 1 {
                        return Err(RulesError::InvalidTierTable("tier ranges must be contiguous"));
                    }
                    if next.tier <= range.tier {
                        return Err(RulesError::InvalidTierTable("tiers must ascend"));
                    }
                }
                (None, true) => {}
            }
        }

        Ok(Self {
            ranges: ranges.clone(),
            dive_bomb_start: tuning.dive_bomb_start,
            dive_bomb_chance: tuning.dive_bomb_chance,
            split_formation_start: tuning.split_formation_start,
            escort_start: tuning.escort_start,
        })
    }

    /// Tier for a wave; waves past every bounded range get the open-ended tier
    pub fn tier(&self, wave: Wave) -> DifficultyTier {
        let w = wave.get();
        self.ranges
            .iter()
            .find(|r| w >= r.min_wave && r.max_wave.is_none_or(|max| w <= max))
            .or(self.ranges.last())
            .map(|r| r.tier)
            .unwrap_or(DifficultyTier::Admiral)
    }

    pub fn label(&self, wave: Wave) -> &'static str {
        self.tier(wave).label()
    }

    /// True iff the wave's tier is at or past `start`
    pub fn is_enabled_from(&self, wave: Wave, start: DifficultyTier) -> bool {
        self.tier(wave).index() >= start.index()
    }

    pub fn is_feature_enabled(&self, wave: Wave, feature: Feature) -> bool {
        let start = match feature {
            Feature::DiveBomb => self.dive_bomb_start,
            Feature::SplitFormation => self.split_formation_start,
            Feature::Escort => self.escort_start,
        };
        self.is_enabled_from(wave, start)
    }

    pub fn dive_bomb_chance(&self, wave: Wave) -> f64 {
        if self.is_feature_enabled(wave, Feature::DiveBomb) {
            self.dive_bomb_chance
        } else {
            0.0
        }
    }

    /// The new tier if moving from `old_wave` to `new_wave` crossed a boundary
    pub fn changed_tier(&self, new_wave: Wave, old_wave: Wave) -> Option<DifficultyTier> {
        let new_tier = self.tier(new_wave);
        (new_tier != self.tier(old_wave)).then_some(new_tier)
    }
}

impl Default for TierGate {
    fn default() -> Self {
        let tuning = TierTuning::default();
        Self {
            ranges: tuning.ranges,
            dive_bomb_start: tuning.dive_bomb_start,
            dive_bomb_chance: tuning.dive_bomb_chance,
            split_formation_start: tuning.split_formation_start,
            escort_start: tuning.escort_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(n: u32) -> Wave {
        Wave::new(n).unwrap()
    }

    #[test]
    fn test_tier_boundaries() {
        let gate = TierGate::default();
        assert_eq!(gate.tier(w(1)), DifficultyTier::Recruit);
        assert_eq!(gate.tier(w(3)), DifficultyTier::Recruit);
        assert_eq!(gate.tier(w(4)), DifficultyTier::Soldier);
        assert_eq!(gate.tier(w(9)), DifficultyTier::Veteran);
        assert_eq!(gate.tier(w(10)), DifficultyTier::Commander);
        assert_eq!(gate.tier(w(13)), DifficultyTier::Admiral);
        assert_eq!(gate.tier(w(500)), DifficultyTier::Admiral);
        assert_eq!(gate.label(w(7)), "VETERAN");
    }

    #[test]
    fn test_feature_gates() {
        let gate = TierGate::default();
        assert!(!gate.is_feature_enabled(w(6), Feature::DiveBomb));
        assert!(gate.is_feature_enabled(w(7), Feature::DiveBomb));
        assert!(!gate.is_feature_enabled(w(9), Feature::SplitFormation));
        assert!(gate.is_feature_enabled(w(10), Feature::SplitFormation));
        assert!(!gate.is_feature_enabled(w(12), Feature::Escort));
        assert!(gate.is_feature_enabled(w(13), Feature::Escort));
        assert_eq!(gate.dive_bomb_chance(w(2)), 0.0);
        assert_eq!(gate.dive_bomb_chance(w(8)), 0.10);
    }

    #[test]
    fn test_changed_tier_fires_once() {
        let gate = TierGate::default();
        assert_eq!(gate.changed_tier(w(4), w(3)), Some(DifficultyTier::Soldier));
        assert_eq!(gate.changed_tier(w(5), w(4)), None);
        assert_eq!(gate.changed_tier(w(3), w(3)), None);
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut tuning = TierTuning::default();
        tuning.ranges[0].min_wave = 2;
        assert!(TierGate::new(&tuning).is_err());

        let mut tuning = TierTuning::default();
        tuning.ranges[4].max_wave = Some(20);
        assert!(TierGate::new(&tuning).is_err());

        let mut tuning = TierTuning::default();
        tuning.ranges[1].max_wave = Some(7);
        assert!(TierGate::new(&tuning).is_err());

        let tuning = TierTuning {
            ranges: Vec::new(),
            ..TierTuning::default()
        };
        assert!(TierGate::new(&tuning).is_err());
    }

    proptest! {
        #[test]
        fn prop_tier_non_decreasing(a in 1u32..10_000, b in 1u32..10_000) {
            let gate = TierGate::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(gate.tier(w(lo)) <= gate.tier(w(hi)));
        }

        #[test]
        fn prop_exactly_one_range_matches(wave in 1u32..10_000) {
            let tuning = TierTuning::default();
            let matches = tuning
                .ranges
                .iter()
                .filter(|r| wave >= r.min_wave && r.max_wave.is_none_or(|max| wave <= max))
                .count();
            prop_assert_eq!(matches, 1);
        }
    }
}
