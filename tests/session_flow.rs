//! End-to-end runs through the public API: a session is played, then the
//! end-of-run services fold it into persisted records.

use invader_rules::HighScores;
use invader_rules::meta::achievements::AchievementLedger;
use invader_rules::meta::challenges::{ChallengeLedger, ChallengeRating, ChallengeResult};
use invader_rules::meta::daily::{DailyAttempts, DailyChallenge};
use invader_rules::meta::stats::LifetimeStats;
use invader_rules::persistence::{MemoryStore, Record};
use invader_rules::sim::{GameEvent, GameMode, GameOverReason, HostEvent, Session, SessionPhase, tick};
use invader_rules::tuning::{DifficultyLevel, Tuning};

fn classic() -> Session {
    Session::new(&Tuning::default(), GameMode::Classic, DifficultyLevel::Veteran, 42).unwrap()
}

fn clear_wave(session: &mut Session) -> Vec<GameEvent> {
    let kills: Vec<HostEvent> = (0..session.formation().total_count())
        .map(|index| HostEvent::AlienKilled { index })
        .collect();
    tick(session, &kills, 0.0)
}

#[test]
fn test_first_wave_unlocks_and_persists() {
    let mut store = MemoryStore::new();
    let mut session = classic();

    let events = clear_wave(&mut session);
    assert!(events.iter().any(|e| matches!(e, GameEvent::WaveCleared { no_damage: true, .. })));
    assert_eq!(session.score(), 990);

    let mut lifetime = LifetimeStats::load_from(&store);
    let mut achievements = AchievementLedger::load_from(&store);
    let unlocked = achievements.check(&session.snapshot(&lifetime, false));
    assert!(unlocked.contains(&"first-contact"));
    assert!(unlocked.contains(&"perfect-wave"));
    assert!(!unlocked.contains(&"boss-slayer"));

    session.record_into(&mut lifetime);
    assert!(lifetime.save_to(&mut store));
    assert!(achievements.save_to(&mut store));

    let mut high_scores = HighScores::load(&store);
    assert_eq!(high_scores.add_score(session.score(), "abc"), Some(1));
    assert!(high_scores.save_to(&mut store));

    let lifetime = LifetimeStats::load_from(&store);
    assert_eq!(lifetime.total_games_played, 1);
    assert_eq!(lifetime.total_aliens_destroyed, 55);
    assert_eq!(lifetime.highest_score, 990);
    assert!(AchievementLedger::load_from(&store).is_unlocked("first-contact"));
    assert_eq!(HighScores::load(&store).top_score(), 990);

    // already unlocked rules stay quiet on the next check
    let again = AchievementLedger::load_from(&store).check(&session.snapshot(&lifetime, false));
    assert!(!again.contains(&"first-contact"));
}

#[test]
fn test_run_to_game_over() {
    let mut session = classic();
    clear_wave(&mut session);
    tick(&mut session, &[], 2000.0);
    assert_eq!(session.wave().get(), 2);
    assert_eq!(session.phase(), SessionPhase::Playing);

    let events = tick(&mut session, &[HostEvent::PlayerHit; 3], 16.0);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::GameOver {
            score: 990,
            reason: GameOverReason::OutOfLives,
            ..
        }
    )));
    assert!(session.is_game_over());
    assert_eq!(session.summary().wave, 2);
}

#[test]
fn test_daily_runs_replay_identically() {
    let tuning = Tuning::default();
    let challenge = DailyChallenge::for_date(&tuning.daily, "2026-02-16").unwrap();
    let mut a = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran).unwrap();
    let mut b = Session::daily(&tuning, &challenge, DifficultyLevel::Veteran).unwrap();
    assert_eq!(a.mode(), GameMode::Daily);

    for frame in 0..600 {
        let host = if frame % 30 == 0 {
            vec![HostEvent::ShotFired, HostEvent::AlienKilled { index: frame / 30 }]
        } else {
            Vec::new()
        };
        assert_eq!(tick(&mut a, &host, 16.0), tick(&mut b, &host, 16.0));
    }
    assert_eq!(a.score(), b.score());

    let mut store = MemoryStore::new();
    let mut attempts = DailyAttempts::load_from(&store);
    attempts.record_attempt("2026-02-16", a.score(), true);
    attempts.record_attempt("2026-02-16", a.score() + 1000, false);
    assert!(attempts.save_to(&mut store));
    assert_eq!(
        DailyAttempts::load_from(&store).official_score("2026-02-16"),
        Some(a.score())
    );
}

#[test]
fn test_challenge_progression() {
    let mut ledger = ChallengeLedger::default();
    assert!(ledger.is_unlocked(3));
    assert!(!ledger.is_unlocked(4));

    let result = ChallengeResult {
        waves_cleared: 3,
        lives_remaining: 3,
        time_seconds: Some(75.0),
        ..ChallengeResult::default()
    };
    assert_eq!(ledger.record_result(3, &result).unwrap(), Some(ChallengeRating::Silver));
    assert!(ledger.is_unlocked(4));
    assert!(ledger.record_result(99, &result).is_err());

    let stats = ledger.completion_stats();
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.gold_count, 0);
}
