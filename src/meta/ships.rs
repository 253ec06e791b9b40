//! Playable ship classes and the player's unlocked/selected ship

use serde::{Deserialize, Serialize};

use crate::persistence::Record;
use crate::tuning::{ShipStats, ShipTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    #[default]
    Classic,
    Interceptor,
    Fortress,
    Sniper,
    Ghost,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Classic,
        ShipKind::Interceptor,
        ShipKind::Fortress,
        ShipKind::Sniper,
        ShipKind::Ghost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShipKind::Classic => "Classic",
            ShipKind::Interceptor => "Interceptor",
            ShipKind::Fortress => "Fortress",
            ShipKind::Sniper => "Sniper",
            ShipKind::Ghost => "Ghost",
        }
    }
}

/// Special ability of a ship class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipSpecial {
    #[default]
    None,
    /// Shots pass through the first invader
    Pierce,
    /// Brief invulnerability after a hit
    Ghost,
}

/// Unlocked ships and the current pick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hangar {
    unlocked: Vec<ShipKind>,
    selected: ShipKind,
}

impl Default for Hangar {
    fn default() -> Self {
        Self {
            unlocked: vec![ShipKind::Classic],
            selected: ShipKind::Classic,
        }
    }
}

impl Record for Hangar {
    const KEY: &'static str = "space-invaders-ships";
}

impl Hangar {
    pub fn is_unlocked(&self, kind: ShipKind) -> bool {
        self.unlocked.contains(&kind)
    }

    pub fn unlocked(&self) -> &[ShipKind] {
        &self.unlocked
    }

    /// Returns true if the ship was newly unlocked
    pub fn unlock(&mut self, kind: ShipKind) -> bool {
        if self.is_unlocked(kind) {
            return false;
        }
        log::info!("Ship unlocked: {}", kind.name());
        self.unlocked.push(kind);
        true
    }

    /// The selected ship, or classic if the stored pick is not unlocked
    pub fn selected(&self) -> ShipKind {
        if self.is_unlocked(self.selected) {
            self.selected
        } else {
            ShipKind::Classic
        }
    }

    /// Select an unlocked ship. Returns false (no change) for a locked one.
    pub fn select(&mut self, kind: ShipKind) -> bool {
        if !self.is_unlocked(kind) {
            return false;
        }
        self.selected = kind;
        true
    }

    pub fn selected_stats<'a>(&self, tuning: &'a ShipTuning) -> &'a ShipStats {
        tuning.stats(self.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore};

    #[test]
    fn test_defaults() {
        let hangar = Hangar::default();
        assert!(hangar.is_unlocked(ShipKind::Classic));
        assert!(!hangar.is_unlocked(ShipKind::Sniper));
        assert_eq!(hangar.selected(), ShipKind::Classic);
    }

    #[test]
    fn test_select_requires_unlock() {
        let mut hangar = Hangar::default();
        assert!(!hangar.select(ShipKind::Fortress));
        assert_eq!(hangar.selected(), ShipKind::Classic);
        assert!(hangar.unlock(ShipKind::Fortress));
        assert!(!hangar.unlock(ShipKind::Fortress));
        assert!(hangar.select(ShipKind::Fortress));
        assert_eq!(hangar.selected_stats(&ShipTuning::default()).starting_lives, 4);
    }

    #[test]
    fn test_persisted_and_tolerant() {
        let mut store = MemoryStore::new();
        let mut hangar = Hangar::default();
        hangar.unlock(ShipKind::Ghost);
        hangar.select(ShipKind::Ghost);
        hangar.save_to(&mut store);
        let loaded = Hangar::load_from(&store);
        assert_eq!(loaded.selected(), ShipKind::Ghost);

        store
            .set(Hangar::KEY, r#"{ "unlocked": ["classic"], "selected": "sniper" }"#)
            .unwrap();
        assert_eq!(Hangar::load_from(&store).selected(), ShipKind::Classic);

        store.set(Hangar::KEY, r#"{ "selected": "warbird" }"#).unwrap();
        assert_eq!(Hangar::load_from(&store).unlocked(), &[ShipKind::Classic]);
    }
}
