//! High score table and leaderboard cache
//!
//! The local top-5 table is persisted through the store seam. Remote
//! leaderboards are reached through `LeaderboardTransport`; the cache answers
//! "is this a high score" from the freshest data it has and never blocks on
//! the network.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RulesError;
use crate::meta::ships::ShipKind;
use crate::persistence::{KeyValueStore, Record};
use crate::sim::state::GameMode;
use crate::tuning::DifficultyLevel;

/// Maximum number of local high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Highest plausible score per wave reached
pub const MAX_SCORE_PER_WAVE: u64 = 3000;

/// A single local high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub initials: String,
}

/// Local high score table, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl Record for HighScores {
    const KEY: &'static str = "space-invaders-high-scores";
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Load from the store, re-sorting and trimming whatever was saved
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut scores = Self::load_from(store);
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        scores
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64, initials: &str) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            initials: initials.to_uppercase(),
        };

        // Sorted descending; ties keep the older entry first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score {} at rank {}", score, rank);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score, 0 when the table is empty
    pub fn top_score(&self) -> u64 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardPeriod {
    Daily,
    Weekly,
    #[default]
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub mode: GameMode,
    pub period: LeaderboardPeriod,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub initials: String,
    pub score: u64,
    pub wave: u32,
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    pub ship: ShipKind,
    pub accuracy: Option<u32>,
}

/// A finished run offered to the remote leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub initials: String,
    pub score: u64,
    pub wave: u32,
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    pub ship: ShipKind,
    pub accuracy: Option<u32>,
    /// Date of the daily run this score belongs to
    pub daily_seed: Option<String>,
}

impl ScoreSubmission {
    /// Reject malformed or implausible submissions before they leave the client
    pub fn validate(&self) -> Result<(), RulesError> {
        let len = self.initials.chars().count();
        if !(1..=3).contains(&len) {
            return Err(RulesError::InvalidInitials(self.initials.clone()));
        }
        if self.wave < 1 {
            return Err(RulesError::InvalidWave(self.wave));
        }
        if self.score > u64::from(self.wave) * MAX_SCORE_PER_WAVE {
            return Err(RulesError::ImplausibleScore {
                score: self.score,
                wave: self.wave,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Remote leaderboard service
pub trait LeaderboardTransport {
    fn fetch(&mut self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, TransportError>;
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), TransportError>;
}

/// Last known remote top lists, keyed by mode and period
#[derive(Debug, Clone, Default)]
pub struct LeaderboardCache {
    lists: HashMap<(GameMode, LeaderboardPeriod), Vec<LeaderboardEntry>>,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort refresh. A failed fetch keeps the previous list.
    /// Returns true if the cache was updated.
    pub fn refresh(&mut self, transport: &mut dyn LeaderboardTransport, query: &LeaderboardQuery) -> bool {
        match transport.fetch(query) {
            Ok(mut entries) => {
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                entries.truncate(query.limit);
                for (i, entry) in entries.iter_mut().enumerate() {
                    entry.rank = i + 1;
                }
                log::debug!(
                    "Leaderboard {}/{:?}: {} entries",
                    query.mode.as_str(),
                    query.period,
                    entries.len()
                );
                self.lists.insert((query.mode, query.period), entries);
                true
            }
            Err(e) => {
                log::warn!("Leaderboard refresh failed: {}", e);
                false
            }
        }
    }

    pub fn entries(&self, mode: GameMode, period: LeaderboardPeriod) -> Option<&[LeaderboardEntry]> {
        self.lists.get(&(mode, period)).map(Vec::as_slice)
    }

    /// Whether `score` would place in the top `limit`. Uses the cached remote
    /// list when there is one, otherwise the local table.
    pub fn is_high_score(
        &self,
        mode: GameMode,
        period: LeaderboardPeriod,
        limit: usize,
        score: u64,
        local: &HighScores,
    ) -> bool {
        match self.entries(mode, period) {
            Some(entries) => {
                score > 0 && (entries.len() < limit || entries.last().is_none_or(|e| score > e.score))
            }
            None => local.qualifies(score),
        }
    }

    /// Whether `score` beats every cached entry for the mode/period
    pub fn is_number_one(&self, mode: GameMode, period: LeaderboardPeriod, score: u64) -> bool {
        score > 0
            && self
                .entries(mode, period)
                .is_some_and(|entries| entries.first().is_none_or(|e| score > e.score))
    }

    /// Validate, then fire-and-forget the submission. A transport failure is
    /// logged and does not affect play.
    pub fn submit(
        &mut self,
        transport: &mut dyn LeaderboardTransport,
        submission: &ScoreSubmission,
    ) -> Result<(), RulesError> {
        submission.validate()?;
        let submission = ScoreSubmission {
            initials: submission.initials.to_uppercase(),
            ..submission.clone()
        };
        if let Err(e) = transport.submit(&submission) {
            log::warn!("Score submission failed: {}", e);
        }
        Ok(())
    }
}
