//! Headless demo: a scripted pilot plays one session against the rules
//! engine, then the end-of-run services are run and persisted.
//!
//! Native usage: `invader-rules [classic|endless|time-attack|daily] [seed]`

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use invader_rules::highscores::HighScores;
use invader_rules::meta::achievements::AchievementLedger;
use invader_rules::meta::challenges::ChallengeLedger;
use invader_rules::meta::cosmetics::Cosmetics;
use invader_rules::meta::daily::{DailyAttempts, DailyChallenge};
use invader_rules::meta::ghost::{GhostRecorder, GhostStore};
use invader_rules::meta::share;
use invader_rules::meta::stats::LifetimeStats;
use invader_rules::persistence::{KeyValueStore, Record};
use invader_rules::platform;
use invader_rules::sim::{GameEvent, GameMode, HostEvent, Session, tick};
use invader_rules::tuning::{DifficultyLevel, Tuning};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Fixed frame step (ms)
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Simulated time cap for one demo run
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// What the pilot has on screen between frames
#[derive(Default)]
struct Pilot {
    x: f32,
    enemy_shots: u32,
    ufo_frames: Option<u32>,
    pending: Vec<HostEvent>,
}

impl Pilot {
    /// Turn last frame's core decisions into this frame's host events
    fn react<P: Rng>(&mut self, events: &[GameEvent], rng: &mut P) {
        for event in events {
            match event {
                GameEvent::AlienFired { .. } => self.enemy_shots += 1,
                GameEvent::UfoSpawned(_) => self.ufo_frames = Some(0),
                GameEvent::PowerUpDrop { kind, .. } if rng.random_bool(0.5) => {
                    self.pending.push(HostEvent::PowerUpCollected(*kind));
                }
                _ => {}
            }
        }
    }

    fn frame<R: Rng, P: Rng>(&mut self, session: &Session<R>, rng: &mut P) -> Vec<HostEvent> {
        let mut events = std::mem::take(&mut self.pending);

        // enemy shots resolve about once a second each
        for _ in 0..self.enemy_shots {
            if rng.random_bool(1.0 / 60.0) {
                self.enemy_shots -= 1;
                events.push(HostEvent::EnemyShotGone);
                if rng.random_bool(0.08) {
                    events.push(HostEvent::PlayerHit);
                } else if rng.random_bool(0.3) && !session.shields().blocks().is_empty() {
                    let index = rng.random_range(0..session.shields().blocks().len());
                    events.push(HostEvent::ShieldBlockHit { index });
                }
            }
        }

        if let Some(frames) = self.ufo_frames.as_mut() {
            *frames += 1;
            if *frames > 240 {
                self.ufo_frames = None;
                events.push(HostEvent::UfoEscaped);
            } else if rng.random_bool(0.01) {
                self.ufo_frames = None;
                events.push(HostEvent::ShotFired);
                events.push(HostEvent::UfoHit);
            }
        }

        // fire every ten frames; most shots connect
        if rng.random_bool(0.1) {
            events.push(HostEvent::ShotFired);
            if session.boss().is_some() {
                events.push(HostEvent::BossHit { damage: 1 });
            } else if let Some(&index) = session.formation().firing_candidates().first() {
                if rng.random_bool(0.7) {
                    if let Some(pos) = session.formation().position(index) {
                        self.x = pos.x;
                    }
                    events.push(HostEvent::AlienKilled { index });
                } else {
                    events.push(HostEvent::ShotMissed);
                }
            }
        }
        events
    }
}

fn play<R: Rng>(session: &mut Session<R>, pilot_seed: u64, ghost: &mut GhostRecorder) {
    let mut pilot_rng = Pcg32::seed_from_u64(pilot_seed);
    let mut pilot = Pilot::default();

    for _ in 0..MAX_FRAMES {
        let host_events = pilot.frame(session, &mut pilot_rng);
        let firing = host_events.contains(&HostEvent::ShotFired);
        let events = tick(session, &host_events, FRAME_MS);
        for event in &events {
            match event {
                GameEvent::WaveStarted { wave, tier, boss } => {
                    log::info!("-> wave {} [{}] boss: {:?}", wave, tier.label(), boss)
                }
                GameEvent::WeaponLevelChanged { name, .. } => log::info!("-> weapon {}", name),
                GameEvent::GameOver { reason, .. } => log::info!("-> game over: {:?}", reason),
                _ => {}
            }
        }
        pilot.react(&events, &mut pilot_rng);
        ghost.update(FRAME_MS, pilot.x, firing, session.score());
        if session.is_game_over() {
            break;
        }
    }
}

/// Persist the end-of-run services and print the results
fn finish<R: Rng>(session: &Session<R>, tuning: &Tuning, store: &mut dyn KeyValueStore, ghost: &GhostRecorder) {
    let mode = session.mode();

    let mut lifetime = LifetimeStats::load_from(store);
    let mut high_scores = HighScores::load(store);
    let is_number_one = session.score() > high_scores.top_score();

    let mut achievements = AchievementLedger::load_from(store);
    let unlocked = achievements.check(&session.snapshot(&lifetime, is_number_one));
    session.record_into(&mut lifetime);

    let mut cosmetics = Cosmetics::load_from(store);
    let cosmetic_unlocks = cosmetics.check_unlocks(
        &tuning.cosmetics,
        lifetime.highest_score,
        lifetime.play_time_minutes(),
    );

    let rank = high_scores.add_score(session.score(), "CPU");
    let ghost_saved = GhostStore::save(store, mode.as_str(), &ghost.recording(), session.score());

    lifetime.save_to(store);
    achievements.save_to(store);
    cosmetics.save_to(store);
    high_scores.save_to(store);

    println!();
    println!(
        "{}",
        share::share_text(
            &tuning.share,
            session.tiers(),
            session.score(),
            session.wave(),
            session.accuracy()
        )
    );
    if let Some(ta) = session.time_attack() {
        let results = ta.results();
        println!(
            "Time attack grade {} (best combo {})",
            results.grade.as_str(),
            results.highest_combo
        );
    }
    if let Some(rank) = rank {
        println!("New high score, rank #{}", rank);
    }
    for id in unlocked {
        println!("Achievement unlocked: {}", id);
    }
    for (slot, name) in cosmetic_unlocks {
        println!("Unlocked {:?}: {}", slot, name);
    }
    println!(
        "Ghost: {} frames{}",
        ghost.frame_count(),
        if ghost_saved { " (new best)" } else { "" }
    );
    let challenges = ChallengeLedger::load_from(store).completion_stats();
    println!(
        "Challenges completed: {}/{}",
        challenges.completed, challenges.total
    );
}

fn run_demo(mode: GameMode, seed: u64) {
    let tuning = Tuning::default();
    let mut store = platform::default_store();
    let mut ghost = GhostRecorder::new(&tuning.ghost);

    let result = if mode == GameMode::Daily {
        let date = platform::today().to_string();
        DailyChallenge::for_date(&tuning.daily, &date).and_then(|challenge| {
            let mut session = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran)?;
            play(&mut session, seed, &mut ghost);
            let mut attempts = DailyAttempts::load_from(store.as_ref());
            let official = !attempts.has_official_attempt(&date);
            attempts.record_attempt(&date, session.score(), official);
            attempts.save_to(store.as_mut());
            println!(
                "{}",
                challenge.share_text(
                    &tuning.share,
                    session.score(),
                    session.wave().get(),
                    session.time_attack().map_or(0, |ta| ta.highest_combo())
                )
            );
            finish(&session, session.tuning(), store.as_mut(), &ghost);
            Ok(())
        })
    } else {
        Session::new(&tuning, mode, DifficultyLevel::Veteran, seed).map(|mut session| {
            play(&mut session, seed.wrapping_add(1), &mut ghost);
            finish(&session, &tuning, store.as_mut(), &ghost);
        })
    };

    if let Err(e) = result {
        log::error!("Demo run failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        Some("endless") => GameMode::Endless,
        Some("time-attack") => GameMode::TimeAttack,
        Some("daily") => GameMode::Daily,
        _ => GameMode::Classic,
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| platform::now_ms() as u64);

    log::info!("Invader rules demo ({}, seed {})", mode.as_str(), seed);
    run_demo(mode, seed);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Invader rules demo starting...");
    run_demo(GameMode::Classic, platform::now_ms() as u64);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
