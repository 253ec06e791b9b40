//! Session state and the events the core reports back to the host
//!
//! A `Session` owns every per-run component. The host drives it through
//! `sim::tick` and reads decisions back from the returned events.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{self, AttackPattern, BossPhase, BossState, BossType};
use super::combo::TimeAttackState;
use super::endless::{EndlessPacer, EndlessSpawn};
use super::formation::{Formation, StepKind};
use super::powerup::{PowerUpKind, PowerUpState};
use super::shields::Shields;
use super::tier::{DifficultyTier, TierGate};
use super::ufo::{UfoScheduler, UfoSpawn};
use super::weapon::WeaponSystem;
use crate::Wave;
use crate::error::RulesError;
use crate::meta::achievements::GameSnapshot;
use crate::meta::daily::{DailyChallenge, DailyRng};
use crate::meta::stats::{LifetimeStats, RunSummary};
use crate::tuning::{DifficultyLevel, DifficultyPreset, Tuning};

/// Which ruleset a run is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    Classic,
    Endless,
    TimeAttack,
    Daily,
}

impl GameMode {
    /// Storage/leaderboard name
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Endless => "endless",
            GameMode::TimeAttack => "time-attack",
            GameMode::Daily => "daily",
        }
    }
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// Active combat
    Playing,
    /// Pause between a cleared wave and the next one
    WaveClear { remaining_ms: f32 },
    /// Run ended
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    OutOfLives,
    /// Invaders reached the player line
    Invaded,
    TimeUp,
}

/// Decisions and notifications for the host, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreAwarded { points: u64, total: u64 },
    /// Spawn a power-up pickup at `at`
    PowerUpDrop { kind: PowerUpKind, at: Vec2 },
    PowerUpExpired(PowerUpKind),
    WeaponLevelChanged { level: usize, name: String },
    FormationStepped(StepKind),
    /// Spawn an enemy shot
    AlienFired { at: Vec2, speed: f32 },
    UfoSpawned(UfoSpawn),
    BossSpawned { boss_type: BossType, max_hp: u32 },
    BossPhaseChanged { boss_type: BossType, phase: BossPhase },
    BossAttack { boss_type: BossType, pattern: AttackPattern },
    BossDefeated { boss_type: BossType, points: u64 },
    WaveCleared { wave: Wave, time_ms: f32, no_damage: bool },
    WaveStarted { wave: Wave, tier: DifficultyTier, boss: Option<BossType> },
    TierChanged(DifficultyTier),
    /// The power-up shield took the hit
    ShieldAbsorbed,
    ShieldBlockDestroyed { index: usize },
    PlayerDied { lives_remaining: u32 },
    EndlessSpawn(EndlessSpawn),
    TimeUp,
    GameOver { score: u64, wave: Wave, reason: GameOverReason },
}

/// Counters for the wave in progress (or the one just cleared)
#[derive(Debug, Clone, Default)]
pub(super) struct WaveStats {
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub damage_taken: bool,
    pub elapsed_ms: f32,
    pub clear_time_ms: Option<f32>,
    pub cleared_no_damage: bool,
    pub boss_defeated: bool,
}

/// Counters for the whole run
#[derive(Debug, Clone, Default)]
pub(super) struct RunStats {
    pub shots_fired: u64,
    pub shots_hit: u64,
    pub aliens_destroyed: u64,
    pub ufos_destroyed: u32,
    pub bosses_defeated: u32,
    pub power_ups_collected: u32,
    pub play_time_ms: f64,
    pub consecutive_no_damage_waves: u32,
    pub last_ufo_points: u64,
}

/// One run of the game: every per-frame component plus run bookkeeping
#[derive(Debug, Clone)]
pub struct Session<R = Pcg32> {
    pub(super) tuning: Tuning,
    pub(super) mode: GameMode,
    pub(super) difficulty: DifficultyLevel,
    pub(super) preset: DifficultyPreset,
    pub(super) rng: R,
    pub(super) phase: SessionPhase,
    pub(super) wave: Wave,
    pub(super) score: u64,
    pub(super) lives: u32,
    pub(super) tiers: TierGate,
    pub(super) formation: Formation,
    pub(super) boss: Option<BossState>,
    pub(super) boss_attack_timer_ms: f32,
    pub(super) power_up: PowerUpState,
    pub(super) weapon: WeaponSystem,
    pub(super) ufo: UfoScheduler,
    pub(super) shields: Shields,
    pub(super) time_attack: Option<TimeAttackState>,
    pub(super) endless: Option<EndlessPacer>,
    pub(super) wave_stats: WaveStats,
    pub(super) run: RunStats,
}

impl Session<Pcg32> {
    /// Start a run with a `Pcg32` seeded from `seed`
    pub fn new(
        tuning: &Tuning,
        mode: GameMode,
        difficulty: DifficultyLevel,
        seed: u64,
    ) -> Result<Self, RulesError> {
        Self::with_rng(tuning, mode, difficulty, Pcg32::seed_from_u64(seed))
    }
}

impl Session<DailyRng> {
    /// Start the daily run: the day's modifier is applied to the balance
    /// table and all randomness comes from the date seed
    pub fn daily(
        tuning: &Tuning,
        challenge: &DailyChallenge,
        difficulty: DifficultyLevel,
    ) -> Result<Self, RulesError> {
        let tuning = match challenge.modifier {
            Some(modifier) => {
                log::info!("Daily #{} modifier: {}", challenge.number, modifier.label());
                modifier.apply(tuning)
            }
            None => tuning.clone(),
        };
        Self::with_rng(&tuning, GameMode::Daily, difficulty, challenge.rng())
    }
}

impl<R: Rng> Session<R> {
    /// Start a run drawing all gameplay randomness from `rng`
    pub fn with_rng(
        tuning: &Tuning,
        mode: GameMode,
        difficulty: DifficultyLevel,
        mut rng: R,
    ) -> Result<Self, RulesError> {
        tuning.validate()?;
        let preset = *tuning.difficulty.preset(difficulty);
        let width = tuning.canvas.width;
        let shields = Shields::build(&tuning.shield, width, preset.shield_block_hp, &mut rng);

        let mut session = Self {
            tuning: tuning.clone(),
            mode,
            difficulty,
            preset,
            rng,
            phase: SessionPhase::Playing,
            wave: Wave::FIRST,
            score: 0,
            lives: preset.lives,
            tiers: TierGate::new(&tuning.tiers)?,
            formation: Formation::empty(&tuning.formation, width),
            boss: None,
            boss_attack_timer_ms: 0.0,
            power_up: PowerUpState::new(&tuning.power_up),
            weapon: WeaponSystem::new(&tuning.weapon)?,
            ufo: UfoScheduler::new(&tuning.ufo),
            shields,
            time_attack: (mode == GameMode::TimeAttack)
                .then(|| TimeAttackState::new(&tuning.time_attack)),
            endless: (mode == GameMode::Endless).then(|| EndlessPacer::new(&tuning.endless, width)),
            wave_stats: WaveStats::default(),
            run: RunStats::default(),
        };
        session.start_wave();
        log::info!(
            "{} run started on {} ({} lives)",
            mode.as_str(),
            difficulty.label(),
            session.lives
        );
        Ok(session)
    }

    /// Restore the initial state of every component. The RNG stream carries on.
    pub fn reset(&mut self) {
        let width = self.tuning.canvas.width;
        self.phase = SessionPhase::Playing;
        self.wave = Wave::FIRST;
        self.score = 0;
        self.lives = self.preset.lives;
        self.boss = None;
        self.boss_attack_timer_ms = 0.0;
        self.power_up.reset();
        self.weapon.reset();
        self.ufo.reset();
        self.shields = Shields::build(
            &self.tuning.shield,
            width,
            self.preset.shield_block_hp,
            &mut self.rng,
        );
        if let Some(ta) = &mut self.time_attack {
            ta.reset();
        }
        if let Some(pacer) = &mut self.endless {
            pacer.reset();
        }
        self.wave_stats = WaveStats::default();
        self.run = RunStats::default();
        self.start_wave();
        log::info!("Session reset");
    }

    /// Lay out the current wave: a boss on boss waves, otherwise a fresh grid
    /// that starts a little lower each wave
    pub(super) fn start_wave(&mut self) -> Option<BossType> {
        let width = self.tuning.canvas.width;
        let boss_type = boss::boss_type_for_wave(&self.tuning.boss, self.wave);
        match boss_type {
            Some(boss_type) => {
                let spec = *self.tuning.boss.spec(boss_type);
                self.boss = Some(BossState::new(boss_type, spec));
                self.formation = Formation::empty(&self.tuning.formation, width);
            }
            None => {
                self.boss = None;
                let f = &self.tuning.formation;
                let start_y = f.start_y + f.wave_y_offset * self.wave.offset() as f32;
                self.formation = Formation::spawn(f, width, start_y);
            }
        }
        self.boss_attack_timer_ms = 0.0;
        self.ufo.reschedule();
        self.wave_stats = WaveStats::default();
        log::info!(
            "Wave {} ({}){}",
            self.wave,
            self.tiers.label(self.wave),
            if boss_type.is_some() { " boss" } else { "" }
        );
        boss_type
    }

    /// Enemy fire interval for the current wave, including the difficulty bonus
    pub fn fire_interval_ms(&self) -> f32 {
        let f = &self.tuning.formation;
        let decayed = f.fire_interval_ms - f.fire_interval_decrease_ms * self.wave.offset() as f32;
        (decayed.max(f.min_fire_interval_ms) + self.preset.fire_interval_bonus_ms).max(0.0)
    }

    /// Chance multiplier for power-up drops in this mode
    pub(super) fn drop_multiplier(&self) -> f64 {
        self.endless
            .as_ref()
            .map(|p| p.power_up_drop_multiplier())
            .unwrap_or(1.0)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn wave(&self) -> Wave {
        self.wave
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tiers.tier(self.wave)
    }

    pub fn tiers(&self) -> &TierGate {
        &self.tiers
    }

    /// Score of the run; in time attack this is the combo-weighted total
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn boss(&self) -> Option<&BossState> {
        self.boss.as_ref()
    }

    pub fn power_up(&self) -> &PowerUpState {
        &self.power_up
    }

    pub fn weapon(&self) -> &WeaponSystem {
        &self.weapon
    }

    pub fn ufo(&self) -> &UfoScheduler {
        &self.ufo
    }

    pub fn shields(&self) -> &Shields {
        &self.shields
    }

    pub fn time_attack(&self) -> Option<&TimeAttackState> {
        self.time_attack.as_ref()
    }

    pub fn endless(&self) -> Option<&EndlessPacer> {
        self.endless.as_ref()
    }

    /// Whole-run hit percentage, rounded
    pub fn accuracy(&self) -> u32 {
        percent(self.run.shots_hit, self.run.shots_fired).round() as u32
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            wave: self.wave.get(),
            play_time_ms: self.run.play_time_ms,
        }
    }

    /// Flatten run state plus lifetime totals for the achievement rules.
    /// `lifetime` holds earlier runs only; this run's counters are added here.
    pub fn snapshot(&self, lifetime: &LifetimeStats, is_number_one: bool) -> GameSnapshot {
        GameSnapshot {
            total_aliens_destroyed: lifetime.total_aliens_destroyed + self.run.aliens_destroyed,
            total_games_played: lifetime.total_games_played + 1,
            highest_wave: lifetime.highest_wave.max(self.wave.get()),
            current_wave: self.wave.get(),
            wave_cleared_no_damage: self.wave_stats.cleared_no_damage,
            wave_accuracy: percent(
                u64::from(self.wave_stats.shots_hit),
                u64::from(self.wave_stats.shots_fired),
            ),
            wave_shots_fired: self.wave_stats.shots_fired,
            wave_clear_time_ms: self.wave_stats.clear_time_ms,
            total_ufos_destroyed: lifetime.total_ufos_destroyed + self.run.ufos_destroyed,
            boss_defeated_this_wave: self.wave_stats.boss_defeated,
            ufo_points_scored: self.run.last_ufo_points,
            current_score: self.score,
            combo_count: self.time_attack.as_ref().map_or(0, |ta| ta.highest_combo()),
            consecutive_no_damage_waves: self.run.consecutive_no_damage_waves,
            is_number_one_on_leaderboard: is_number_one,
        }
    }

    /// Fold this run into the lifetime record (call once, at game end)
    pub fn record_into(&self, lifetime: &mut LifetimeStats) {
        lifetime.total_aliens_destroyed += self.run.aliens_destroyed;
        lifetime.total_shots_fired += self.run.shots_fired;
        lifetime.total_shots_hit += self.run.shots_hit;
        lifetime.total_ufos_destroyed += self.run.ufos_destroyed;
        lifetime.total_bosses_defeated += self.run.bosses_defeated;
        lifetime.total_power_ups_collected += self.run.power_ups_collected;
        lifetime.record_game_end(self.summary(), self.tuning.stats.recent_scores_count);
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: GameMode, difficulty: DifficultyLevel) -> Session {
        Session::new(&Tuning::default(), mode, difficulty, 7).unwrap()
    }

    #[test]
    fn test_new_session_starts_wave_one() {
        let s = session(GameMode::Classic, DifficultyLevel::Veteran);
        assert_eq!(s.wave(), Wave::FIRST);
        assert_eq!(s.lives(), 3);
        assert_eq!(s.score(), 0);
        assert_eq!(s.formation().alive_count(), 55);
        assert!(s.boss().is_none());
        assert!(s.time_attack().is_none());
        assert!(s.endless().is_none());
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.tier(), DifficultyTier::Recruit);
    }

    #[test]
    fn test_difficulty_presets_apply() {
        let recruit = session(GameMode::Classic, DifficultyLevel::Recruit);
        assert_eq!(recruit.lives(), 5);
        assert_eq!(recruit.fire_interval_ms(), 2000.0);
        assert!(!recruit.shields().blocks().is_empty());
        assert_eq!(recruit.shields().blocks()[0].max_hp, 4);

        let admiral = session(GameMode::Classic, DifficultyLevel::Admiral);
        assert_eq!(admiral.lives(), 2);
        assert_eq!(admiral.fire_interval_ms(), 1300.0);
        assert!(admiral.shields().blocks().is_empty());
    }

    #[test]
    fn test_fire_interval_decays_to_floor() {
        let mut s = session(GameMode::Classic, DifficultyLevel::Veteran);
        assert_eq!(s.fire_interval_ms(), 1500.0);
        s.wave = Wave::new(3).unwrap();
        assert_eq!(s.fire_interval_ms(), 1400.0);
        s.wave = Wave::new(40).unwrap();
        assert_eq!(s.fire_interval_ms(), 400.0);
    }

    #[test]
    fn test_mode_components() {
        let ta = session(GameMode::TimeAttack, DifficultyLevel::Veteran);
        assert!(ta.time_attack().is_some());
        let endless = session(GameMode::Endless, DifficultyLevel::Veteran);
        assert!(endless.endless().is_some());
        assert_eq!(endless.drop_multiplier(), 1.5);
        assert_eq!(GameMode::TimeAttack.as_str(), "time-attack");
    }

    #[test]
    fn test_daily_session_applies_modifier() {
        let tuning = Tuning::default();
        // "No Shields" day
        let challenge = DailyChallenge::for_date(&tuning.daily, "2026-10-19").unwrap();
        let s = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran).unwrap();
        assert_eq!(s.mode(), GameMode::Daily);
        assert!(s.shields().blocks().is_empty());
        assert_eq!(s.tuning().shield.count, 0);
    }

    #[test]
    fn test_daily_sessions_are_reproducible() {
        let tuning = Tuning::default();
        let challenge = DailyChallenge::for_date(&tuning.daily, "2026-02-16").unwrap();
        let a = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran).unwrap();
        let b = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran).unwrap();
        let xs = |s: &Session<DailyRng>| s.shields().blocks().iter().map(|b| b.pos.x).collect::<Vec<_>>();
        assert_eq!(xs(&a), xs(&b));
    }

    #[test]
    fn test_boss_wave_has_no_formation() {
        let mut s = session(GameMode::Classic, DifficultyLevel::Veteran);
        s.wave = Wave::new(5).unwrap();
        assert_eq!(s.start_wave(), Some(BossType::Mothership));
        assert!(s.formation().is_cleared());
        assert_eq!(s.boss().map(|b| b.max_hp), Some(20));
    }

    #[test]
    fn test_later_waves_start_lower() {
        let mut s = session(GameMode::Classic, DifficultyLevel::Veteran);
        let first_y = s.formation().invaders()[0].pos.y;
        s.wave = Wave::new(3).unwrap();
        s.start_wave();
        assert_eq!(s.formation().invaders()[0].pos.y, first_y + 32.0);
    }

    #[test]
    fn test_snapshot_adds_run_to_lifetime() {
        let mut s = session(GameMode::Classic, DifficultyLevel::Veteran);
        s.run.aliens_destroyed = 4;
        s.wave_stats.shots_fired = 20;
        s.wave_stats.shots_hit = 19;
        let lifetime = LifetimeStats {
            total_aliens_destroyed: 10,
            total_games_played: 2,
            highest_wave: 9,
            ..LifetimeStats::default()
        };
        let snap = s.snapshot(&lifetime, true);
        assert_eq!(snap.total_aliens_destroyed, 14);
        assert_eq!(snap.total_games_played, 3);
        assert_eq!(snap.highest_wave, 9);
        assert!((snap.wave_accuracy - 95.0).abs() < 1e-9);
        assert!(snap.is_number_one_on_leaderboard);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut s = session(GameMode::TimeAttack, DifficultyLevel::Veteran);
        s.score = 900;
        s.lives = 1;
        s.wave = Wave::new(6).unwrap();
        s.phase = SessionPhase::GameOver;
        s.run.shots_fired = 12;
        s.reset();
        assert_eq!(s.score(), 0);
        assert_eq!(s.lives(), 3);
        assert_eq!(s.wave(), Wave::FIRST);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.accuracy(), 0);
        assert_eq!(s.formation().alive_count(), 55);
        assert_eq!(s.time_attack().map(|t| t.score()), Some(0));
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.weapon.levels.clear();
        assert!(Session::new(&tuning, GameMode::Classic, DifficultyLevel::Veteran, 1).is_err());
    }
}
