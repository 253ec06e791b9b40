//! Achievement rules and the persisted unlock ledger

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::Record;

/// Flattened run + lifetime state the achievement rules read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSnapshot {
    pub total_aliens_destroyed: u64,
    pub total_games_played: u32,
    pub highest_wave: u32,
    pub current_wave: u32,
    pub wave_cleared_no_damage: bool,
    /// Percent hits for the current wave
    pub wave_accuracy: f64,
    pub wave_shots_fired: u32,
    /// Time taken by the last cleared wave, if any
    pub wave_clear_time_ms: Option<f32>,
    pub total_ufos_destroyed: u32,
    pub boss_defeated_this_wave: bool,
    /// Value of the most recent UFO hit
    pub ufo_points_scored: u64,
    pub current_score: u64,
    pub combo_count: u32,
    pub consecutive_no_damage_waves: u32,
    pub is_number_one_on_leaderboard: bool,
}

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    condition: fn(&GameSnapshot) -> bool,
}

impl Achievement {
    pub fn is_met(&self, snapshot: &GameSnapshot) -> bool {
        (self.condition)(snapshot)
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first-contact",
        name: "First Contact",
        description: "Destroy your first alien",
        condition: |s| s.total_aliens_destroyed >= 1,
    },
    Achievement {
        id: "quarter-muncher",
        name: "Quarter Muncher",
        description: "Play 25 games",
        condition: |s| s.total_games_played >= 25,
    },
    Achievement {
        id: "wave-rider",
        name: "Wave Rider",
        description: "Reach wave 10",
        condition: |s| s.highest_wave >= 10,
    },
    Achievement {
        id: "perfect-wave",
        name: "Perfect Wave",
        description: "Clear a wave without taking damage",
        condition: |s| s.wave_cleared_no_damage,
    },
    Achievement {
        id: "sharpshooter",
        name: "Sharpshooter",
        description: "Achieve 90% accuracy in a wave with at least 20 shots",
        condition: |s| s.wave_accuracy >= 90.0 && s.wave_shots_fired >= 20,
    },
    Achievement {
        id: "speed-demon",
        name: "Speed Demon",
        description: "Clear a wave in under 12 seconds",
        condition: |s| s.wave_clear_time_ms.is_some_and(|t| t < 12_000.0),
    },
    Achievement {
        id: "ufo-hunter",
        name: "UFO Hunter",
        description: "Destroy 10 UFOs",
        condition: |s| s.total_ufos_destroyed >= 10,
    },
    Achievement {
        id: "boss-slayer",
        name: "Boss Slayer",
        description: "Defeat a boss",
        condition: |s| s.boss_defeated_this_wave,
    },
    Achievement {
        id: "the-300-club",
        name: "The 300 Club",
        description: "Hit a 300-point UFO",
        condition: |s| s.ufo_points_scored >= 300,
    },
    Achievement {
        id: "marathon-runner",
        name: "Marathon Runner",
        description: "Reach wave 20",
        condition: |s| s.highest_wave >= 20,
    },
    Achievement {
        id: "combo-master",
        name: "Combo Master",
        description: "Achieve a 10-kill combo",
        condition: |s| s.combo_count >= 10,
    },
    Achievement {
        id: "no-coin-needed",
        name: "No Coin Needed",
        description: "Score 50,000 points",
        condition: |s| s.current_score >= 50_000,
    },
    Achievement {
        id: "admiral",
        name: "Admiral",
        description: "Reach wave 13",
        condition: |s| s.current_wave >= 13,
    },
    Achievement {
        id: "untouchable",
        name: "Untouchable",
        description: "Complete 3 consecutive waves without taking damage",
        condition: |s| s.consecutive_no_damage_waves >= 3,
    },
    Achievement {
        id: "high-score-hero",
        name: "High Score Hero",
        description: "Hold the #1 spot on a leaderboard",
        condition: |s| s.is_number_one_on_leaderboard,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Unlocked ids (in unlock order) plus numeric progress counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementLedger {
    unlocked: Vec<String>,
    progress: BTreeMap<String, f64>,
}

impl Record for AchievementLedger {
    const KEY: &'static str = "space-invaders-achievements";
}

impl AchievementLedger {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    /// Returns true if newly unlocked; unlocks are never revoked
    pub fn unlock(&mut self, id: &str) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked.push(id.to_string());
        true
    }

    pub fn progress(&self, id: &str) -> f64 {
        self.progress.get(id).copied().unwrap_or(0.0)
    }

    pub fn set_progress(&mut self, id: &str, value: f64) {
        self.progress.insert(id.to_string(), value);
    }

    /// Evaluate every locked rule and unlock all that pass.
    /// Returns only the ids unlocked by this call.
    pub fn check(&mut self, snapshot: &GameSnapshot) -> Vec<&'static str> {
        let mut newly = Vec::new();
        for achievement in ACHIEVEMENTS {
            if self.is_unlocked(achievement.id) || !achievement.is_met(snapshot) {
                continue;
            }
            log::info!("Achievement unlocked: {}", achievement.name);
            self.unlocked.push(achievement.id.to_string());
            newly.push(achievement.id);
        }
        newly
    }

    pub fn reset(&mut self) {
        self.unlocked.clear();
        self.progress.clear();
    }
}
