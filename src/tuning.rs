//! Data-driven game balance
//!
//! One immutable structure holds every number the rules engine is tuned by.
//! `Tuning::default()` is the shipped balance; `Tuning::from_json` overlays a
//! partial JSON document on top of it (missing keys keep their defaults).
//! Components are constructed from the slice they need and never read a
//! global.

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::meta::daily::DailyModifier;
use crate::meta::ships::{ShipKind, ShipSpecial};
use crate::sim::boss::{AttackKind, AttackPattern, BossType};
use crate::sim::formation::InvaderKind;
use crate::sim::powerup::PowerUpKind;
use crate::sim::tier::{DifficultyTier, TierGate};
use crate::sim::weapon::{FirePattern, WeaponLevel};

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub canvas: CanvasTuning,
    pub player: PlayerTuning,
    pub formation: FormationTuning,
    pub shield: ShieldTuning,
    pub wave: WaveTuning,
    pub ufo: UfoTuning,
    pub power_up: PowerUpTuning,
    pub tiers: TierTuning,
    pub boss: BossTuning,
    pub weapon: WeaponTuning,
    pub difficulty: DifficultyPresets,
    pub ships: ShipTuning,
    pub endless: EndlessTuning,
    pub time_attack: TimeAttackTuning,
    pub daily: DailyTuning,
    pub share: ShareTuning,
    pub cosmetics: CosmeticsTuning,
    pub ghost: GhostTuning,
    pub stats: StatsTuning,
}

impl Tuning {
    /// Parse a JSON overlay and validate the resulting tables
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the invariants the components rely on
    pub fn validate(&self) -> Result<(), RulesError> {
        TierGate::new(&self.tiers)?;
        crate::sim::weapon::validate_levels(&self.weapon.levels)?;
        crate::sim::powerup::validate_weights(&self.power_up.kinds)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasTuning {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 640.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Player ship line (invaders reaching it end the run)
    pub y_position: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self { y_position: 600.0 }
    }
}

/// Points per invader kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvaderPoints {
    pub squid: u64,
    pub crab: u64,
    pub octopus: u64,
}

impl Default for InvaderPoints {
    fn default() -> Self {
        Self {
            squid: 30,
            crab: 20,
            octopus: 10,
        }
    }
}

impl InvaderPoints {
    pub fn for_kind(&self, kind: InvaderKind) -> u64 {
        match kind {
            InvaderKind::Squid => self.squid,
            InvaderKind::Crab => self.crab,
            InvaderKind::Octopus => self.octopus,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    pub rows: usize,
    pub cols: usize,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub step_size: f32,
    pub drop_size: f32,
    /// Horizontal margin the formation reverses at
    pub edge_margin: f32,
    pub start_y: f32,
    /// Each later wave starts this much lower
    pub wave_y_offset: f32,
    /// Step interval with one survivor left
    pub step_interval_floor_ms: f32,
    /// Step interval with the full formation alive
    pub step_interval_ceil_ms: f32,
    pub max_enemy_shots: u32,
    pub fire_interval_ms: f32,
    pub fire_interval_decrease_ms: f32,
    pub min_fire_interval_ms: f32,
    /// Enemy shots spawn this far below the shooter
    pub shot_offset_y: f32,
    /// Distance above the player line that counts as an invasion
    pub invasion_margin: f32,
    /// Invader kind for each row, top to bottom
    pub row_kinds: Vec<InvaderKind>,
    pub points: InvaderPoints,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 11,
            spacing_x: 36.0,
            spacing_y: 32.0,
            step_size: 16.0,
            drop_size: 16.0,
            edge_margin: 20.0,
            start_y: 100.0,
            wave_y_offset: 16.0,
            step_interval_floor_ms: 50.0,
            step_interval_ceil_ms: 1000.0,
            max_enemy_shots: 3,
            fire_interval_ms: 1500.0,
            fire_interval_decrease_ms: 50.0,
            min_fire_interval_ms: 400.0,
            shot_offset_y: 16.0,
            invasion_margin: 20.0,
            row_kinds: vec![
                InvaderKind::Squid,
                InvaderKind::Crab,
                InvaderKind::Crab,
                InvaderKind::Octopus,
                InvaderKind::Octopus,
            ],
            points: InvaderPoints::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldTuning {
    pub count: usize,
    pub y_position: f32,
    pub block_size: f32,
    pub x_margin: f32,
    pub min_spacing: f32,
    /// Bunker width in blocks
    pub columns: usize,
    /// Bunker height in blocks
    pub rows: usize,
    pub arch_half_width: f32,
    pub arch_height: usize,
    pub placement_attempts: u32,
}

impl Default for ShieldTuning {
    fn default() -> Self {
        Self {
            count: 3,
            y_position: 500.0,
            block_size: 3.0,
            x_margin: 40.0,
            min_spacing: 80.0,
            columns: 16,
            rows: 12,
            arch_half_width: 3.0,
            arch_height: 4,
            placement_attempts: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Pause between a cleared wave and the next one
    pub clear_pause_ms: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            clear_pause_ms: 1500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoTuning {
    pub speed: f32,
    pub spawn_interval_min_ms: f32,
    pub spawn_interval_max_ms: f32,
    pub spawn_interval_decrease_per_wave_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub speed_increase_per_wave: f32,
    pub points_cycle: Vec<u64>,
}

impl Default for UfoTuning {
    fn default() -> Self {
        Self {
            speed: 120.0,
            spawn_interval_min_ms: 20000.0,
            spawn_interval_max_ms: 40000.0,
            spawn_interval_decrease_per_wave_ms: 1000.0,
            min_spawn_interval_ms: 12000.0,
            speed_increase_per_wave: 0.10,
            points_cycle: vec![50, 100, 150, 300],
        }
    }
}

/// Duration and selection weight of one power-up kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerUpSpec {
    pub kind: PowerUpKind,
    /// 0 means active until consumed
    pub duration_ms: f32,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub kinds: Vec<PowerUpSpec>,
    pub drop_chance_base: f64,
    pub drop_chance_increase_per_wave: f64,
    pub max_drop_chance: f64,
    pub expiry_warning_ms: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            kinds: vec![
                PowerUpSpec {
                    kind: PowerUpKind::Spread,
                    duration_ms: 8000.0,
                    weight: 0.30,
                },
                PowerUpSpec {
                    kind: PowerUpKind::Rapid,
                    duration_ms: 6000.0,
                    weight: 0.25,
                },
                PowerUpSpec {
                    kind: PowerUpKind::Shield,
                    duration_ms: 0.0,
                    weight: 0.25,
                },
                PowerUpSpec {
                    kind: PowerUpKind::Multiplier,
                    duration_ms: 10000.0,
                    weight: 0.20,
                },
            ],
            drop_chance_base: 0.08,
            drop_chance_increase_per_wave: 0.01,
            max_drop_chance: 0.15,
            expiry_warning_ms: 2000.0,
        }
    }
}

impl PowerUpTuning {
    pub fn spec(&self, kind: PowerUpKind) -> Option<&PowerUpSpec> {
        self.kinds.iter().find(|s| s.kind == kind)
    }
}

/// Wave range covered by one difficulty tier (`max_wave` of `None` = open-ended)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierRange {
    pub tier: DifficultyTier,
    pub min_wave: u32,
    pub max_wave: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTuning {
    pub ranges: Vec<TierRange>,
    pub dive_bomb_start: DifficultyTier,
    pub dive_bomb_chance: f64,
    pub split_formation_start: DifficultyTier,
    pub escort_start: DifficultyTier,
}

impl Default for TierTuning {
    fn default() -> Self {
        let range = |tier, min_wave, max_wave| TierRange {
            tier,
            min_wave,
            max_wave,
        };
        Self {
            ranges: vec![
                range(DifficultyTier::Recruit, 1, Some(3)),
                range(DifficultyTier::Soldier, 4, Some(6)),
                range(DifficultyTier::Veteran, 7, Some(9)),
                range(DifficultyTier::Commander, 10, Some(12)),
                range(DifficultyTier::Admiral, 13, None),
            ],
            dive_bomb_start: DifficultyTier::Veteran,
            dive_bomb_chance: 0.10,
            split_formation_start: DifficultyTier::Commander,
            escort_start: DifficultyTier::Admiral,
        }
    }
}

/// Hit points, phase thresholds and per-phase attacks of one boss archetype
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossSpec {
    pub max_hp: u32,
    /// HP fraction at or below which phase 2 starts
    pub phase2_threshold: f32,
    /// HP fraction at or below which phase 3 starts
    pub phase3_threshold: f32,
    /// Attack pattern for phases 1, 2 and 3
    pub patterns: [AttackPattern; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// A boss appears every `schedule` waves
    pub schedule: u32,
    pub points_per_wave: u64,
    pub mothership: BossSpec,
    pub commander: BossSpec,
    pub admiral: BossSpec,
}

impl Default for BossTuning {
    fn default() -> Self {
        let pattern = |kind, bullet_count, interval_ms| AttackPattern {
            kind,
            bullet_count,
            interval_ms,
        };
        Self {
            schedule: 5,
            points_per_wave: 500,
            mothership: BossSpec {
                max_hp: 20,
                phase2_threshold: 0.5,
                phase3_threshold: 0.25,
                patterns: [
                    pattern(AttackKind::Spread, Some(3), 1500.0),
                    pattern(AttackKind::Deploy, Some(3), 2000.0),
                    // warning + beam duration
                    pattern(AttackKind::Laser, None, 1300.0),
                ],
            },
            commander: BossSpec {
                max_hp: 30,
                phase2_threshold: 0.5,
                phase3_threshold: 0.27,
                patterns: [
                    pattern(AttackKind::Homing, None, 2000.0),
                    pattern(AttackKind::ShieldRegen, None, 10000.0),
                    pattern(AttackKind::Homing, Some(3), 1200.0),
                ],
            },
            admiral: BossSpec {
                max_hp: 40,
                phase2_threshold: 0.5,
                phase3_threshold: 0.25,
                patterns: [
                    pattern(AttackKind::Teleport, None, 4000.0),
                    pattern(AttackKind::Ring, Some(8), 2500.0),
                    pattern(AttackKind::Gravity, None, 3000.0),
                ],
            },
        }
    }
}

impl BossTuning {
    pub fn spec(&self, boss: BossType) -> &BossSpec {
        match boss {
            BossType::Mothership => &self.mothership,
            BossType::Commander => &self.commander,
            BossType::Admiral => &self.admiral,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Ascending by score threshold; the first level starts at 0
    pub levels: Vec<WeaponLevel>,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        let level = |name: &str, threshold, bullet_speed, fire_cooldown_ms, max_bullets, pattern| {
            WeaponLevel {
                name: name.to_string(),
                threshold,
                bullet_speed,
                fire_cooldown_ms,
                max_bullets,
                pattern,
            }
        };
        Self {
            levels: vec![
                level("Standard", 0, 400.0, 150.0, 3, FirePattern::Single),
                level("Accelerated", 500, 500.0, 100.0, 3, FirePattern::Single),
                level("Double", 1500, 500.0, 100.0, 4, FirePattern::Double),
                level("Piercing", 3500, 500.0, 100.0, 4, FirePattern::Piercing),
                level("Plasma", 6000, 500.0, 1200.0, 1, FirePattern::Plasma),
            ],
        }
    }
}

/// Player-selected difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Recruit,
    #[default]
    Veteran,
    Admiral,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Recruit => "recruit",
            DifficultyLevel::Veteran => "veteran",
            DifficultyLevel::Admiral => "admiral",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Recruit => "RECRUIT",
            DifficultyLevel::Veteran => "VETERAN",
            DifficultyLevel::Admiral => "ADMIRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DifficultyPreset {
    pub lives: u32,
    /// Added to the formation fire interval (negative = faster fire)
    pub fire_interval_bonus_ms: f32,
    pub alien_bullet_speed: f32,
    /// 0 disables shields entirely
    pub shield_block_hp: u32,
    pub ufo_points_multiplier: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyPresets {
    pub recruit: DifficultyPreset,
    pub veteran: DifficultyPreset,
    pub admiral: DifficultyPreset,
}

impl Default for DifficultyPresets {
    fn default() -> Self {
        Self {
            recruit: DifficultyPreset {
                lives: 5,
                fire_interval_bonus_ms: 500.0,
                alien_bullet_speed: 100.0,
                shield_block_hp: 4,
                ufo_points_multiplier: 2,
            },
            veteran: DifficultyPreset {
                lives: 3,
                fire_interval_bonus_ms: 0.0,
                alien_bullet_speed: 150.0,
                shield_block_hp: 3,
                ufo_points_multiplier: 1,
            },
            admiral: DifficultyPreset {
                lives: 2,
                fire_interval_bonus_ms: -200.0,
                alien_bullet_speed: 200.0,
                shield_block_hp: 0,
                ufo_points_multiplier: 1,
            },
        }
    }
}

impl DifficultyPresets {
    pub fn preset(&self, level: DifficultyLevel) -> &DifficultyPreset {
        match level {
            DifficultyLevel::Recruit => &self.recruit,
            DifficultyLevel::Veteran => &self.veteran,
            DifficultyLevel::Admiral => &self.admiral,
        }
    }
}

/// Handling stats of one ship class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipStats {
    pub speed: f32,
    pub fire_cooldown_ms: f32,
    pub max_bullets: u32,
    pub starting_lives: u32,
    pub special: ShipSpecial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub classic: ShipStats,
    pub interceptor: ShipStats,
    pub fortress: ShipStats,
    pub sniper: ShipStats,
    pub ghost: ShipStats,
}

impl Default for ShipTuning {
    fn default() -> Self {
        let ship = |speed, fire_cooldown_ms, max_bullets, starting_lives, special| ShipStats {
            speed,
            fire_cooldown_ms,
            max_bullets,
            starting_lives,
            special,
        };
        Self {
            classic: ship(200.0, 150.0, 3, 3, ShipSpecial::None),
            interceptor: ship(280.0, 120.0, 2, 3, ShipSpecial::None),
            fortress: ship(150.0, 180.0, 3, 4, ShipSpecial::None),
            sniper: ship(200.0, 300.0, 2, 3, ShipSpecial::Pierce),
            ghost: ship(220.0, 150.0, 3, 3, ShipSpecial::Ghost),
        }
    }
}

impl ShipTuning {
    pub fn stats(&self, kind: ShipKind) -> &ShipStats {
        match kind {
            ShipKind::Classic => &self.classic,
            ShipKind::Interceptor => &self.interceptor,
            ShipKind::Fortress => &self.fortress,
            ShipKind::Sniper => &self.sniper,
            ShipKind::Ghost => &self.ghost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndlessTuning {
    pub initial_spawn_interval_ms: f32,
    pub spawn_interval_decrease_per_minute_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub group_size_min: u32,
    pub group_size_max: u32,
    pub power_up_drop_multiplier: f64,
    /// Horizontal margin for group spawn positions
    pub spawn_margin: f32,
}

impl Default for EndlessTuning {
    fn default() -> Self {
        Self {
            initial_spawn_interval_ms: 6000.0,
            spawn_interval_decrease_per_minute_ms: 100.0,
            min_spawn_interval_ms: 1500.0,
            group_size_min: 3,
            group_size_max: 8,
            power_up_drop_multiplier: 1.5,
            spawn_margin: 40.0,
        }
    }
}

/// Minimum time-attack score for each grade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub s: u64,
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            s: 15000,
            a: 10000,
            b: 6000,
            c: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAttackTuning {
    pub duration_ms: f32,
    /// Combo counts at which multiplier index + 1 applies
    pub combo_thresholds: Vec<u32>,
    pub max_multiplier: u64,
    /// Idle time without a kill that breaks the combo
    pub combo_timeout_ms: f32,
    /// Final stretch in which the timer shows a warning
    pub warning_ms: f32,
    pub grades: GradeThresholds,
}

impl Default for TimeAttackTuning {
    fn default() -> Self {
        Self {
            duration_ms: 90000.0,
            combo_thresholds: vec![1, 3, 6, 10, 15],
            max_multiplier: 5,
            combo_timeout_ms: 2000.0,
            warning_ms: 10000.0,
            grades: GradeThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyTuning {
    pub modifiers: Vec<DailyModifier>,
    /// Day #1 of daily challenge numbering (YYYY-MM-DD)
    pub epoch: String,
}

impl Default for DailyTuning {
    fn default() -> Self {
        Self {
            modifiers: vec![
                DailyModifier::DoubleUfos,
                DailyModifier::FastAliens,
                DailyModifier::PowerupRain,
                DailyModifier::NoShields,
                DailyModifier::MirrorMode,
            ],
            epoch: "2026-01-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareTuning {
    /// Wave thresholds for 2..=5 stars
    pub star_thresholds: [u32; 4],
}

impl Default for ShareTuning {
    fn default() -> Self {
        Self {
            star_thresholds: [3, 6, 9, 14],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmeticsTuning {
    pub bullet_trails: Vec<String>,
    pub explosion_styles: Vec<String>,
    pub backgrounds: Vec<String>,
    /// Lifetime score unlocking the trail at the same index
    pub trail_unlock_scores: Vec<u64>,
    /// Play time (minutes) unlocking the background at the same index
    pub background_unlock_minutes: Vec<u64>,
}

impl Default for CosmeticsTuning {
    fn default() -> Self {
        let names = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            bullet_trails: names(&["default", "blue-plasma", "red-laser", "green-retro", "rainbow"]),
            explosion_styles: names(&["default", "pixel-burst", "fireworks", "electric", "vaporize"]),
            backgrounds: names(&["deep-space", "nebula", "asteroid-field", "retro-crt", "synthwave"]),
            trail_unlock_scores: vec![0, 10000, 25000, 50000, 100000],
            background_unlock_minutes: vec![0, 60, 180, 300, 600],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostTuning {
    pub sample_rate_hz: f32,
    pub score_milestone_interval: u64,
}

impl Default for GhostTuning {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10.0,
            score_milestone_interval: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsTuning {
    pub recent_scores_count: usize,
}

impl Default for StatsTuning {
    fn default() -> Self {
        Self {
            recent_scores_count: 10,
        }
    }
}
