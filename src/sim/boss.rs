//! Boss encounters: scheduling, HP, phase state machine and attack tables

use serde::{Deserialize, Serialize};

use crate::Wave;
use crate::tuning::{BossSpec, BossTuning};

/// Boss archetype, cycled through on boss waves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossType {
    Mothership,
    Commander,
    Admiral,
}

impl BossType {
    pub const CYCLE: [BossType; 3] = [BossType::Mothership, BossType::Commander, BossType::Admiral];
}

/// Attack stage, 1 (fresh) through 3 (desperate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

impl BossPhase {
    pub fn number(self) -> u8 {
        match self {
            BossPhase::One => 1,
            BossPhase::Two => 2,
            BossPhase::Three => 3,
        }
    }

    fn slot(self) -> usize {
        self.number() as usize - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttackKind {
    Spread,
    Deploy,
    Laser,
    Homing,
    ShieldRegen,
    Teleport,
    Ring,
    Gravity,
}

/// One row of a boss's attack table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackPattern {
    pub kind: AttackKind,
    pub bullet_count: Option<u32>,
    pub interval_ms: f32,
}

pub fn is_boss_wave(tuning: &BossTuning, wave: Wave) -> bool {
    tuning.schedule > 0 && wave.get() % tuning.schedule == 0
}

/// Archetype for a boss wave, cycling mothership, commander, admiral
pub fn boss_type_for_wave(tuning: &BossTuning, wave: Wave) -> Option<BossType> {
    if !is_boss_wave(tuning, wave) {
        return None;
    }
    let index = (wave.get() / tuning.schedule - 1) as usize % BossType::CYCLE.len();
    Some(BossType::CYCLE[index])
}

/// Reward for defeating the boss of `wave`
pub fn boss_points(tuning: &BossTuning, wave: Wave) -> u64 {
    tuning.points_per_wave * u64::from(wave.get())
}

/// Live boss HP and phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub boss_type: BossType,
    pub hp: u32,
    pub max_hp: u32,
    pub phase: BossPhase,
    spec: BossSpec,
}

impl BossState {
    pub fn new(boss_type: BossType, spec: BossSpec) -> Self {
        Self {
            boss_type,
            hp: spec.max_hp,
            max_hp: spec.max_hp,
            phase: BossPhase::One,
            spec,
        }
    }

    /// Boss with an explicit max HP (challenge modes override the default)
    pub fn with_max_hp(boss_type: BossType, spec: BossSpec, max_hp: u32) -> Self {
        Self::new(boss_type, BossSpec { max_hp, ..spec })
    }

    /// Apply damage. Returns the new phase when a threshold was crossed.
    pub fn take_damage(&mut self, amount: u32) -> Option<BossPhase> {
        self.hp = self.hp.saturating_sub(amount);

        let fraction = self.hp_fraction();
        let phase = if fraction <= self.spec.phase3_threshold {
            BossPhase::Three
        } else if fraction <= self.spec.phase2_threshold {
            BossPhase::Two
        } else {
            BossPhase::One
        };

        // HP never rises, so a lower phase here can only mean bad thresholds
        if phase > self.phase {
            log::info!("{:?} enters phase {}", self.boss_type, phase.number());
            self.phase = phase;
            Some(phase)
        } else {
            None
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Remaining HP as a fraction of max (0 for a zero-HP boss)
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }

    pub fn attack_pattern(&self) -> AttackPattern {
        self.spec.patterns[self.phase.slot()]
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
    fn test_boss_schedule() {
        let tuning = BossTuning::default();
        assert!(!is_boss_wave(&tuning, w(4)));
        assert!(is_boss_wave(&tuning, w(5)));
        assert_eq!(boss_type_for_wave(&tuning, w(4)), None);
        assert_eq!(boss_type_for_wave(&tuning, w(5)), Some(BossType::Mothership));
        assert_eq!(boss_type_for_wave(&tuning, w(10)), Some(BossType::Commander));
        assert_eq!(boss_type_for_wave(&tuning, w(15)), Some(BossType::Admiral));
        assert_eq!(boss_type_for_wave(&tuning, w(20)), Some(BossType::Mothership));
        assert_eq!(boss_points(&tuning, w(5)), 2500);
        assert_eq!(boss_points(&tuning, w(10)), 5000);
    }

    #[test]
    fn test_phase_sequence() {
        let tuning = BossTuning::default();
        let mut boss = BossState::with_max_hp(BossType::Mothership, tuning.mothership, 20);
        let mut phases = Vec::new();
        phases.extend(boss.take_damage(10));
        phases.extend(boss.take_damage(5));
        assert_eq!(phases, vec![BossPhase::Two, BossPhase::Three]);
        assert_eq!(boss.hp, 5);
        assert!(!boss.is_defeated());
    }

    #[test]
    fn test_phase_change_fires_once() {
        let tuning = BossTuning::default();
        let mut boss = BossState::new(BossType::Admiral, tuning.admiral);
        assert_eq!(boss.take_damage(20), Some(BossPhase::Two));
        assert_eq!(boss.take_damage(1), None);
        assert_eq!(boss.take_damage(0), None);
        assert_eq!(boss.phase, BossPhase::Two);
    }

    #[test]
    fn test_skip_straight_to_phase_three() {
        let tuning = BossTuning::default();
        let mut boss = BossState::new(BossType::Commander, tuning.commander);
        assert_eq!(boss.take_damage(25), Some(BossPhase::Three));
        assert_eq!(boss.attack_pattern().kind, AttackKind::Homing);
        assert_eq!(boss.attack_pattern().bullet_count, Some(3));
    }

    #[test]
    fn test_defeat_floors_at_zero() {
        let tuning = BossTuning::default();
        let mut boss = BossState::new(BossType::Mothership, tuning.mothership);
        boss.take_damage(1000);
        assert_eq!(boss.hp, 0);
        assert!(boss.is_defeated());
        assert_eq!(boss.hp_fraction(), 0.0);
    }

    #[test]
    fn test_attack_table_follows_phase() {
        let tuning = BossTuning::default();
        let mut boss = BossState::new(BossType::Mothership, tuning.mothership);
        assert_eq!(boss.attack_pattern().kind, AttackKind::Spread);
        boss.take_damage(10);
        assert_eq!(boss.attack_pattern().kind, AttackKind::Deploy);
        boss.take_damage(5);
        assert_eq!(boss.attack_pattern().kind, AttackKind::Laser);
    }

    #[test]
    fn test_zero_hp_boss() {
        let tuning = BossTuning::default();
        let boss = BossState::with_max_hp(BossType::Admiral, tuning.admiral, 0);
        assert!(boss.is_defeated());
        assert_eq!(boss.hp_fraction(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_hp_and_phase_monotonic(hits in proptest::collection::vec(0u32..15, 0..40)) {
            let tuning = BossTuning::default();
            let mut boss = BossState::new(BossType::Commander, tuning.commander);
            let mut last_hp = boss.hp;
            let mut last_phase = boss.phase;
            for hit in hits {
                boss.take_damage(hit);
                prop_assert!(boss.hp <= last_hp);
                prop_assert!(boss.phase >= last_phase);
                last_hp = boss.hp;
                last_phase = boss.phase;
            }
        }
    }
}
