//! Lifetime statistics across every run

use serde::{Deserialize, Serialize};

use crate::persistence::Record;

/// Summary of one finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub score: u64,
    pub wave: u32,
    pub play_time_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeStats {
    pub total_games_played: u32,
    pub total_play_time_ms: f64,
    pub total_aliens_destroyed: u64,
    pub total_shots_fired: u64,
    pub total_shots_hit: u64,
    pub highest_score: u64,
    pub highest_wave: u32,
    pub total_ufos_destroyed: u32,
    pub total_bosses_defeated: u32,
    pub total_power_ups_collected: u32,
    /// Oldest first
    pub recent_scores: Vec<u64>,
}

impl Record for LifetimeStats {
    const KEY: &'static str = "space-invaders-stats";
}

impl LifetimeStats {
    /// Fold a finished run in, keeping only the last `recent_count` scores
    pub fn record_game_end(&mut self, run: RunSummary, recent_count: usize) {
        self.total_games_played += 1;
        self.total_play_time_ms += run.play_time_ms.max(0.0);
        self.highest_score = self.highest_score.max(run.score);
        self.highest_wave = self.highest_wave.max(run.wave);
        self.recent_scores.push(run.score);
        if self.recent_scores.len() > recent_count {
            let excess = self.recent_scores.len() - recent_count;
            self.recent_scores.drain(..excess);
        }
    }

    pub fn record_shot(&mut self, hit: bool) {
        self.total_shots_fired += 1;
        if hit {
            self.total_shots_hit += 1;
        }
    }

    pub fn record_alien_kill(&mut self) {
        self.total_aliens_destroyed += 1;
    }

    pub fn record_ufo_kill(&mut self) {
        self.total_ufos_destroyed += 1;
    }

    pub fn record_boss_kill(&mut self) {
        self.total_bosses_defeated += 1;
    }

    pub fn record_power_up(&mut self) {
        self.total_power_ups_collected += 1;
    }

    /// Hit percentage, 0 with no shots
    pub fn accuracy(&self) -> f64 {
        if self.total_shots_fired == 0 {
            return 0.0;
        }
        self.total_shots_hit as f64 / self.total_shots_fired as f64 * 100.0
    }

    pub fn average_score(&self) -> f64 {
        if self.recent_scores.is_empty() {
            return 0.0;
        }
        self.recent_scores.iter().sum::<u64>() as f64 / self.recent_scores.len() as f64
    }

    pub fn play_time_minutes(&self) -> u64 {
        (self.total_play_time_ms / 60_000.0) as u64
    }

    /// Wipe everything, but only when the player confirmed
    pub fn reset(&mut self, confirm: bool) {
        if confirm {
            log::info!("Lifetime stats reset");
            *self = Self::default();
        }
    }
}
