//! Numbered challenge stages with bronze/silver/gold ratings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::persistence::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeRating {
    Bronze,
    Silver,
    Gold,
}

/// Outcome of a challenge attempt; absent fields count as not achieved
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChallengeResult {
    pub waves_cleared: u32,
    pub lives_remaining: u32,
    pub accuracy: u32,
    pub time_seconds: Option<f64>,
    pub kills: u32,
    pub score: u64,
    pub bosses_defeated: u32,
    pub survival_seconds: f64,
}

pub struct Challenge {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub bronze: &'static str,
    pub silver: &'static str,
    pub gold: &'static str,
    evaluate: fn(&ChallengeResult) -> Option<ChallengeRating>,
}

impl Challenge {
    pub fn evaluate(&self, result: &ChallengeResult) -> Option<ChallengeRating> {
        (self.evaluate)(result)
    }
}

use ChallengeRating::{Bronze, Gold, Silver};

fn tiered<T: PartialOrd>(value: T, gold: T, silver: T, bronze: T) -> Option<ChallengeRating> {
    if value >= gold {
        Some(Gold)
    } else if value >= silver {
        Some(Silver)
    } else if value >= bronze {
        Some(Bronze)
    } else {
        None
    }
}

/// Clearing the wave is gold; otherwise rate the fallback metric
fn clear_or(r: &ChallengeResult, fallback: Option<ChallengeRating>) -> Option<ChallengeRating> {
    if r.waves_cleared >= 1 { Some(Gold) } else { fallback }
}

pub const CHALLENGES: &[Challenge] = &[
    Challenge {
        id: 1,
        name: "Boot Camp",
        description: "Standard wave, 5 lives",
        bronze: "Clear wave",
        silver: "Clear with 3+ lives",
        gold: "Clear with 5 lives",
        evaluate: |r| {
            if r.waves_cleared < 1 {
                return None;
            }
            tiered(r.lives_remaining, 5, 3, 0)
        },
    },
    Challenge {
        id: 2,
        name: "Sharpshooter",
        description: "Only 30 bullets for the entire wave",
        bronze: "Clear wave",
        silver: "70% accuracy",
        gold: "90% accuracy",
        evaluate: |r| {
            if r.waves_cleared < 1 {
                return None;
            }
            tiered(r.accuracy, 90, 70, 0)
        },
    },
    Challenge {
        id: 3,
        name: "Speed Run",
        description: "Clear 3 waves as fast as possible",
        bronze: "Under 120s",
        silver: "Under 90s",
        gold: "Under 60s",
        evaluate: |r| {
            if r.waves_cleared < 3 {
                return None;
            }
            match r.time_seconds {
                Some(t) if t < 60.0 => Some(Gold),
                Some(t) if t < 90.0 => Some(Silver),
                Some(t) if t < 120.0 => Some(Bronze),
                _ => None,
            }
        },
    },
    Challenge {
        id: 4,
        name: "No Miss",
        description: "1 life, standard wave",
        bronze: "Reach 20 kills",
        silver: "Reach 40 kills",
        gold: "Clear wave",
        evaluate: |r| clear_or(r, tiered(r.kills, u32::MAX, 40, 20)),
    },
    Challenge {
        id: 5,
        name: "Bullet Hell",
        description: "Triple alien fire rate",
        bronze: "Survive 60s",
        silver: "Survive 120s",
        gold: "Clear wave",
        evaluate: |r| clear_or(r, tiered(r.survival_seconds, f64::INFINITY, 120.0, 60.0)),
    },
    Challenge {
        id: 6,
        name: "Last Stand",
        description: "Start at wave 10, 1 life, no shields",
        bronze: "Reach 10 kills",
        silver: "Reach 30 kills",
        gold: "Clear wave",
        evaluate: |r| clear_or(r, tiered(r.kills, u32::MAX, 30, 10)),
    },
    Challenge {
        id: 7,
        name: "UFO Hunt",
        description: "UFOs spawn every 5s, only UFO kills count",
        bronze: "Score 500",
        silver: "Score 1500",
        gold: "Score 3000",
        evaluate: |r| tiered(r.score, 3000, 1500, 500),
    },
    Challenge {
        id: 8,
        name: "Boss Rush",
        description: "3 bosses back-to-back, 5 lives",
        bronze: "Beat 1 boss",
        silver: "Beat 2 bosses",
        gold: "Beat all 3",
        evaluate: |r| tiered(r.bosses_defeated, 3, 2, 1),
    },
    Challenge {
        id: 9,
        name: "Minimalist",
        description: "Max 1 bullet on screen, no power-ups",
        bronze: "Clear 1 wave",
        silver: "Clear 3 waves",
        gold: "Clear 5 waves",
        evaluate: |r| tiered(r.waves_cleared, 5, 3, 1),
    },
    Challenge {
        id: 10,
        name: "ADMIRAL Trial",
        description: "Wave 13+ settings from start, 2 lives",
        bronze: "Survive 60s",
        silver: "Survive 120s",
        gold: "Clear wave",
        evaluate: |r| clear_or(r, tiered(r.survival_seconds, f64::INFINITY, 120.0, 60.0)),
    },
];

pub fn find(id: u32) -> Option<&'static Challenge> {
    CHALLENGES.iter().find(|c| c.id == id)
}

/// Rate a result against challenge `id`
pub fn evaluate(id: u32, result: &ChallengeResult) -> Result<Option<ChallengeRating>, RulesError> {
    find(id)
        .map(|c| c.evaluate(result))
        .ok_or(RulesError::UnknownChallenge(id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    pub gold_count: usize,
}

/// Best rating per challenge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeLedger {
    ratings: BTreeMap<u32, ChallengeRating>,
}

impl Record for ChallengeLedger {
    const KEY: &'static str = "space-invaders-challenges";
}

impl ChallengeLedger {
    /// 1-3 are always open; each later one needs any rating on its predecessor
    pub fn is_unlocked(&self, id: u32) -> bool {
        if find(id).is_none() {
            return false;
        }
        id <= 3 || self.ratings.contains_key(&(id - 1))
    }

    pub fn rating(&self, id: u32) -> Option<ChallengeRating> {
        self.ratings.get(&id).copied()
    }

    /// Record a rating if it beats the stored one.
    /// Returns Ok(true) if stored, Ok(false) for an ignored downgrade or repeat.
    pub fn set_rating(&mut self, id: u32, rating: ChallengeRating) -> Result<bool, RulesError> {
        if find(id).is_none() {
            return Err(RulesError::UnknownChallenge(id));
        }
        if self.rating(id).is_some_and(|existing| existing >= rating) {
            return Ok(false);
        }
        log::info!("Challenge {} rated {:?}", id, rating);
        self.ratings.insert(id, rating);
        Ok(true)
    }

    /// Evaluate a result and keep the rating if it is an upgrade
    pub fn record_result(
        &mut self,
        id: u32,
        result: &ChallengeResult,
    ) -> Result<Option<ChallengeRating>, RulesError> {
        let rating = evaluate(id, result)?;
        if let Some(rating) = rating {
            self.set_rating(id, rating)?;
        }
        Ok(rating)
    }

    pub fn completion_stats(&self) -> CompletionStats {
        CompletionStats {
            completed: self.ratings.len(),
            total: CHALLENGES.len(),
            gold_count: self.ratings.values().filter(|&&r| r == Gold).count(),
        }
    }

    pub fn reset(&mut self) {
        self.ratings.clear();
    }
}
