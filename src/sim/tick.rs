//! Frame step for a session
//!
//! The host reports what happened since the last frame as `HostEvent`s, then
//! the clock advances by `delta_ms`. Everything the host must act on comes
//! back as `GameEvent`s in order.

use rand::Rng;

use super::formation::InvaderKind;
use super::powerup::{self, PowerUpKind};
use super::state::{GameEvent, GameOverReason, Session, SessionPhase};
use crate::sanitize_delta;
use crate::sim::boss;

/// Something the host observed this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Player shot killed the formation slot `index`
    AlienKilled { index: usize },
    /// Player shot killed an invader from an endless reinforcement group
    ReinforcementKilled { kind: InvaderKind },
    BossHit { damage: u32 },
    UfoHit,
    /// The UFO left the screen unharmed
    UfoEscaped,
    ShotFired,
    /// A player shot left the screen without hitting anything
    ShotMissed,
    PlayerHit,
    ShieldBlockHit { index: usize },
    /// An enemy shot hit something or left the screen
    EnemyShotGone,
    PowerUpCollected(PowerUpKind),
}

/// Apply this frame's host events, then advance every timer by `delta_ms`.
/// A finished session ignores everything.
pub fn tick<R: Rng>(session: &mut Session<R>, events: &[HostEvent], delta_ms: f32) -> Vec<GameEvent> {
    let mut out = Vec::new();
    if session.is_game_over() {
        return out;
    }

    for event in events {
        handle_event(session, *event, &mut out);
        if session.is_game_over() {
            return out;
        }
    }

    advance(session, sanitize_delta(delta_ms), &mut out);
    out
}

fn handle_event<R: Rng>(s: &mut Session<R>, event: HostEvent, out: &mut Vec<GameEvent>) {
    match event {
        HostEvent::AlienKilled { index } => {
            let Some(kind) = s.formation.kill(index) else {
                log::debug!("Ignoring kill of empty slot {}", index);
                return;
            };
            let at = s.formation.position(index).unwrap_or_default();
            score_alien(s, kind, at, out);
            check_wave_clear(s, out);
        }
        HostEvent::ReinforcementKilled { kind } => {
            score_alien(s, kind, glam::Vec2::ZERO, out);
        }
        HostEvent::BossHit { damage } => {
            let Some(boss_state) = s.boss.as_mut() else {
                return;
            };
            let boss_type = boss_state.boss_type;
            let phase = boss_state.take_damage(damage);
            let defeated = boss_state.is_defeated();
            record_hit(s);
            if let Some(phase) = phase {
                s.boss_attack_timer_ms = 0.0;
                out.push(GameEvent::BossPhaseChanged { boss_type, phase });
            }
            if defeated {
                let points = boss::boss_points(&s.tuning.boss, s.wave) * s.power_up.score_multiplier();
                log::info!("{:?} defeated for {} points", boss_type, points);
                s.boss = None;
                s.run.bosses_defeated += 1;
                s.wave_stats.boss_defeated = true;
                out.push(GameEvent::BossDefeated { boss_type, points });
                award(s, points, out);
                check_wave_clear(s, out);
            }
        }
        HostEvent::UfoHit => {
            if !s.ufo.is_active() {
                return;
            }
            record_hit(s);
            let points = s.ufo.on_hit() * s.preset.ufo_points_multiplier * s.power_up.score_multiplier();
            s.run.ufos_destroyed += 1;
            s.run.last_ufo_points = points;
            award(s, points, out);
        }
        HostEvent::UfoEscaped => s.ufo.on_escaped(),
        HostEvent::ShotFired => {
            s.run.shots_fired += 1;
            s.wave_stats.shots_fired += 1;
            if let Some(ta) = &mut s.time_attack {
                ta.record_shot();
            }
        }
        HostEvent::ShotMissed => {
            if let Some(ta) = &mut s.time_attack {
                ta.record_miss();
            }
        }
        HostEvent::PlayerHit => player_hit(s, out),
        HostEvent::ShieldBlockHit { index } => {
            if s.shields.hit(index) == Some(false) {
                out.push(GameEvent::ShieldBlockDestroyed { index });
            }
        }
        HostEvent::EnemyShotGone => s.formation.on_shot_gone(),
        HostEvent::PowerUpCollected(kind) => {
            s.run.power_ups_collected += 1;
            s.power_up.activate(kind);
        }
    }
}

fn record_hit<R: Rng>(s: &mut Session<R>) {
    s.run.shots_hit += 1;
    s.wave_stats.shots_hit += 1;
}

/// Score a dead invader and roll for a power-up drop where it fell
fn score_alien<R: Rng>(s: &mut Session<R>, kind: InvaderKind, at: glam::Vec2, out: &mut Vec<GameEvent>) {
    record_hit(s);
    s.run.aliens_destroyed += 1;

    let base = s.tuning.formation.points.for_kind(kind);
    let points = match &mut s.time_attack {
        Some(ta) => ta.record_kill(base),
        None => base * s.power_up.score_multiplier(),
    };
    award(s, points, out);

    let multiplier = s.drop_multiplier();
    if powerup::should_drop_scaled(&s.tuning.power_up, s.wave, multiplier, &mut s.rng) {
        let kind = powerup::select_kind(&s.tuning.power_up, &mut s.rng);
        out.push(GameEvent::PowerUpDrop { kind, at });
    }
}

/// Add points to the run and feed them to weapon progression
fn award<R: Rng>(s: &mut Session<R>, points: u64, out: &mut Vec<GameEvent>) {
    s.score += points;
    out.push(GameEvent::ScoreAwarded {
        points,
        total: s.score,
    });
    if let Some(level) = s.weapon.add_score(points) {
        out.push(GameEvent::WeaponLevelChanged {
            level,
            name: s.weapon.name().to_string(),
        });
    }
}

fn player_hit<R: Rng>(s: &mut Session<R>, out: &mut Vec<GameEvent>) {
    if s.power_up.consume_shield() {
        out.push(GameEvent::ShieldAbsorbed);
        return;
    }

    s.wave_stats.damage_taken = true;
    s.run.consecutive_no_damage_waves = 0;
    if let Some(level) = s.weapon.level_down() {
        out.push(GameEvent::WeaponLevelChanged {
            level,
            name: s.weapon.name().to_string(),
        });
    }

    // time attack runs on the clock, not on lives
    if let Some(ta) = s.time_attack.as_mut() {
        ta.record_death();
        out.push(GameEvent::PlayerDied {
            lives_remaining: s.lives,
        });
        return;
    }

    s.lives = s.lives.saturating_sub(1);
    log::info!("Player hit, {} lives left", s.lives);
    out.push(GameEvent::PlayerDied {
        lives_remaining: s.lives,
    });
    if s.lives == 0 {
        game_over(s, GameOverReason::OutOfLives, out);
    }
}

fn check_wave_clear<R: Rng>(s: &mut Session<R>, out: &mut Vec<GameEvent>) {
    if s.phase != SessionPhase::Playing || s.boss.is_some() || !s.formation.is_cleared() {
        return;
    }
    let no_damage = !s.wave_stats.damage_taken;
    let time_ms = s.wave_stats.elapsed_ms;
    s.wave_stats.clear_time_ms = Some(time_ms);
    s.wave_stats.cleared_no_damage = no_damage;
    if no_damage {
        s.run.consecutive_no_damage_waves += 1;
    }
    log::info!("Wave {} cleared in {:.1}s", s.wave, time_ms / 1000.0);
    s.phase = SessionPhase::WaveClear {
        remaining_ms: s.tuning.wave.clear_pause_ms,
    };
    out.push(GameEvent::WaveCleared {
        wave: s.wave,
        time_ms,
        no_damage,
    });
}

fn next_wave<R: Rng>(s: &mut Session<R>, out: &mut Vec<GameEvent>) {
    let old = s.wave;
    s.wave = old.next();
    s.phase = SessionPhase::Playing;
    if let Some(tier) = s.tiers.changed_tier(s.wave, old) {
        log::info!("Tier up: {}", tier.label());
        out.push(GameEvent::TierChanged(tier));
    }
    let boss = s.start_wave();
    if let Some(boss_state) = &s.boss {
        out.push(GameEvent::BossSpawned {
            boss_type: boss_state.boss_type,
            max_hp: boss_state.max_hp,
        });
    }
    out.push(GameEvent::WaveStarted {
        wave: s.wave,
        tier: s.tier(),
        boss,
    });
}

fn game_over<R: Rng>(s: &mut Session<R>, reason: GameOverReason, out: &mut Vec<GameEvent>) {
    log::info!("Game over ({:?}): score {} on wave {}", reason, s.score, s.wave);
    s.phase = SessionPhase::GameOver;
    out.push(GameEvent::GameOver {
        score: s.score,
        wave: s.wave,
        reason,
    });
}

fn advance<R: Rng>(s: &mut Session<R>, delta_ms: f32, out: &mut Vec<GameEvent>) {
    s.run.play_time_ms += f64::from(delta_ms);

    if let Some(kind) = s.power_up.update(delta_ms) {
        out.push(GameEvent::PowerUpExpired(kind));
    }

    let time_up = match &mut s.time_attack {
        Some(ta) => {
            ta.update(delta_ms);
            ta.is_time_up()
        }
        None => false,
    };
    if time_up {
        out.push(GameEvent::TimeUp);
        game_over(s, GameOverReason::TimeUp, out);
        return;
    }

    match s.phase {
        SessionPhase::WaveClear { remaining_ms } => {
            let remaining_ms = remaining_ms - delta_ms;
            if remaining_ms > 0.0 {
                s.phase = SessionPhase::WaveClear { remaining_ms };
            } else {
                next_wave(s, out);
            }
        }
        SessionPhase::Playing => advance_combat(s, delta_ms, out),
        SessionPhase::GameOver => {}
    }
}

fn advance_combat<R: Rng>(s: &mut Session<R>, delta_ms: f32, out: &mut Vec<GameEvent>) {
    s.wave_stats.elapsed_ms += delta_ms;

    let fire_interval = s.fire_interval_ms();
    let update = s.formation.update(delta_ms, fire_interval, &mut s.rng);
    if let Some(step) = update.step {
        out.push(GameEvent::FormationStepped(step));
    }
    if let Some(at) = update.shot {
        out.push(GameEvent::AlienFired {
            at,
            speed: s.preset.alien_bullet_speed,
        });
    }

    let line = s.tuning.player.y_position - s.tuning.formation.invasion_margin;
    if s.formation.has_reached(line) {
        game_over(s, GameOverReason::Invaded, out);
        return;
    }

    if let Some(spawn) = s.ufo.update(delta_ms, s.wave, &mut s.rng) {
        out.push(GameEvent::UfoSpawned(spawn));
    }

    if let Some(boss_state) = &s.boss {
        let pattern = boss_state.attack_pattern();
        s.boss_attack_timer_ms += delta_ms;
        if s.boss_attack_timer_ms >= pattern.interval_ms {
            s.boss_attack_timer_ms = 0.0;
            out.push(GameEvent::BossAttack {
                boss_type: boss_state.boss_type,
                pattern,
            });
        }
    }

    if let Some(pacer) = &mut s.endless {
        if let Some(spawn) = pacer.next_spawn(delta_ms, &mut s.rng) {
            out.push(GameEvent::EndlessSpawn(spawn));
        }
    }
}
