//! Cosmetic unlockables: bullet trails, explosion styles, backgrounds

use serde::{Deserialize, Serialize};

use crate::persistence::Record;
use crate::tuning::CosmeticsTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CosmeticSlot {
    Trail,
    Explosion,
    Background,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmetics {
    unlocked_trails: Vec<String>,
    unlocked_explosions: Vec<String>,
    unlocked_backgrounds: Vec<String>,
    selected_trail: String,
    selected_explosion: String,
    selected_background: String,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            unlocked_trails: vec!["default".to_string()],
            unlocked_explosions: vec!["default".to_string()],
            unlocked_backgrounds: vec!["deep-space".to_string()],
            selected_trail: "default".to_string(),
            selected_explosion: "default".to_string(),
            selected_background: "deep-space".to_string(),
        }
    }
}

impl Record for Cosmetics {
    const KEY: &'static str = "space-invaders-cosmetics";
}

impl Cosmetics {
    pub fn unlocked(&self, slot: CosmeticSlot) -> &[String] {
        match slot {
            CosmeticSlot::Trail => &self.unlocked_trails,
            CosmeticSlot::Explosion => &self.unlocked_explosions,
            CosmeticSlot::Background => &self.unlocked_backgrounds,
        }
    }

    pub fn selected(&self, slot: CosmeticSlot) -> &str {
        match slot {
            CosmeticSlot::Trail => &self.selected_trail,
            CosmeticSlot::Explosion => &self.selected_explosion,
            CosmeticSlot::Background => &self.selected_background,
        }
    }

    pub fn is_unlocked(&self, slot: CosmeticSlot, name: &str) -> bool {
        self.unlocked(slot).iter().any(|n| n == name)
    }

    /// Returns true if `name` was newly unlocked
    pub fn unlock(&mut self, slot: CosmeticSlot, name: &str) -> bool {
        if self.is_unlocked(slot, name) {
            return false;
        }
        log::info!("Cosmetic unlocked: {:?} {}", slot, name);
        let list = match slot {
            CosmeticSlot::Trail => &mut self.unlocked_trails,
            CosmeticSlot::Explosion => &mut self.unlocked_explosions,
            CosmeticSlot::Background => &mut self.unlocked_backgrounds,
        };
        list.push(name.to_string());
        true
    }

    /// Select an unlocked item. Returns false (no change) for a locked one.
    pub fn select(&mut self, slot: CosmeticSlot, name: &str) -> bool {
        if !self.is_unlocked(slot, name) {
            return false;
        }
        let selected = match slot {
            CosmeticSlot::Trail => &mut self.selected_trail,
            CosmeticSlot::Explosion => &mut self.selected_explosion,
            CosmeticSlot::Background => &mut self.selected_background,
        };
        *selected = name.to_string();
        true
    }

    /// Unlock trails earned by lifetime score and backgrounds earned by
    /// play time. Returns what was newly unlocked.
    pub fn check_unlocks(
        &mut self,
        tuning: &CosmeticsTuning,
        lifetime_score: u64,
        play_time_minutes: u64,
    ) -> Vec<(CosmeticSlot, String)> {
        let mut unlocked = Vec::new();
        for (name, &needed) in tuning.bullet_trails.iter().zip(&tuning.trail_unlock_scores) {
            if lifetime_score >= needed && self.unlock(CosmeticSlot::Trail, name) {
                unlocked.push((CosmeticSlot::Trail, name.clone()));
            }
        }
        for (name, &needed) in tuning.backgrounds.iter().zip(&tuning.background_unlock_minutes) {
            if play_time_minutes >= needed && self.unlock(CosmeticSlot::Background, name) {
                unlocked.push((CosmeticSlot::Background, name.clone()));
            }
        }
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let c = Cosmetics::default();
        assert_eq!(c.selected(CosmeticSlot::Trail), "default");
        assert_eq!(c.selected(CosmeticSlot::Background), "deep-space");
        assert!(!c.is_unlocked(CosmeticSlot::Trail, "rainbow"));
    }

    #[test]
    fn test_check_unlocks_by_thresholds() {
        let tuning = CosmeticsTuning::default();
        let mut c = Cosmetics::default();
        let got = c.check_unlocks(&tuning, 25_000, 60);
        assert_eq!(
            got,
            vec![
                (CosmeticSlot::Trail, "blue-plasma".to_string()),
                (CosmeticSlot::Trail, "red-laser".to_string()),
                (CosmeticSlot::Background, "nebula".to_string()),
            ]
        );
        assert!(c.check_unlocks(&tuning, 25_000, 60).is_empty());
        assert!(!c.is_unlocked(CosmeticSlot::Trail, "green-retro"));
    }

    #[test]
    fn test_select_only_unlocked() {
        let mut c = Cosmetics::default();
        assert!(!c.select(CosmeticSlot::Explosion, "fireworks"));
        c.unlock(CosmeticSlot::Explosion, "fireworks");
        assert!(c.select(CosmeticSlot::Explosion, "fireworks"));
        assert_eq!(c.selected(CosmeticSlot::Explosion), "fireworks");
    }

    #[test]
    fn test_persisted() {
        let mut store = MemoryStore::new();
        let mut c = Cosmetics::default();
        c.unlock(CosmeticSlot::Background, "synthwave");
        c.select(CosmeticSlot::Background, "synthwave");
        c.save_to(&mut store);
        let loaded = Cosmetics::load_from(&store);
        assert_eq!(loaded.selected(CosmeticSlot::Background), "synthwave");
        assert_eq!(loaded.unlocked(CosmeticSlot::Trail), &["default".to_string()]);
    }
}
