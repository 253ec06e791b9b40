//! Daily challenge: date seeding, the seeded generator, modifiers, share text
//! and the per-date attempt ledger.
//!
//! Everything here is a pure function of the date string, so every player
//! gets the same run on the same day.

use std::collections::BTreeMap;
use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::persistence::Record;
use crate::tuning::{DailyTuning, ShareTuning, Tuning};

/// A calendar date (proleptic Gregorian, UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CivilDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Parse a strict `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Result<Self, RulesError> {
        let invalid = || RulesError::InvalidDate(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, RulesError> {
            let part = &s[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let year = digits(0..4)? as i32;
        let month = digits(5..7)?;
        let day = digits(8..10)?;
        Self::new(year, month, day).ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn days_since_epoch(&self) -> i64 {
        let y = i64::from(self.year) - i64::from(self.month <= 2);
        let era = y.div_euclid(400);
        let yoe = y - era * 400;
        let mp = (i64::from(self.month) + 9) % 12;
        let doy = (153 * mp + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    pub fn from_days_since_epoch(days: i64) -> Self {
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as i32;
        Self { year, month, day }
    }
}

impl fmt::Display for CivilDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        _ => 28,
    }
}

/// Positive, non-zero seed for a date string.
///
/// Rolling `h * 31 + c` over UTF-16 code units in wrapping 32-bit signed
/// arithmetic, then the absolute value (0 maps to 1).
pub fn seed(date: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in date.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    match i64::from(h).unsigned_abs() {
        0 => 1,
        v => v as u32,
    }
}

/// Mulberry32: tiny deterministic generator for the daily run
#[derive(Debug, Clone)]
pub struct DailyRng {
    state: u32,
}

impl DailyRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn for_date(date: &str) -> Self {
        Self::new(seed(date))
    }

    /// Next value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl RngCore for DailyRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DailyModifier {
    #[serde(rename = "Double UFOs")]
    DoubleUfos,
    #[serde(rename = "Fast Aliens")]
    FastAliens,
    #[serde(rename = "Powerup Rain")]
    PowerupRain,
    #[serde(rename = "No Shields")]
    NoShields,
    #[serde(rename = "Mirror Mode")]
    MirrorMode,
}

impl DailyModifier {
    pub fn label(self) -> &'static str {
        match self {
            DailyModifier::DoubleUfos => "Double UFOs",
            DailyModifier::FastAliens => "Fast Aliens",
            DailyModifier::PowerupRain => "Powerup Rain",
            DailyModifier::NoShields => "No Shields",
            DailyModifier::MirrorMode => "Mirror Mode",
        }
    }

    /// Balance table for a run under this modifier
    pub fn apply(self, tuning: &Tuning) -> Tuning {
        let mut t = tuning.clone();
        match self {
            DailyModifier::DoubleUfos => {
                t.ufo.spawn_interval_min_ms /= 2.0;
                t.ufo.spawn_interval_max_ms /= 2.0;
                t.ufo.min_spawn_interval_ms /= 2.0;
            }
            DailyModifier::FastAliens => {
                t.formation.step_interval_floor_ms *= 0.75;
                t.formation.step_interval_ceil_ms *= 0.75;
            }
            DailyModifier::PowerupRain => {
                t.power_up.drop_chance_base *= 2.0;
                t.power_up.drop_chance_increase_per_wave *= 2.0;
                t.power_up.max_drop_chance = (t.power_up.max_drop_chance * 2.0).min(1.0);
            }
            DailyModifier::NoShields => t.shield.count = 0,
            // input is flipped by the host
            DailyModifier::MirrorMode => {}
        }
        t
    }

    pub fn mirrors_controls(self) -> bool {
        self == DailyModifier::MirrorMode
    }
}

/// Modifier for a date: the first seeded draw indexes the modifier list
pub fn modifier_for_date(tuning: &DailyTuning, date: &str) -> Option<DailyModifier> {
    if tuning.modifiers.is_empty() {
        return None;
    }
    let draw = DailyRng::for_date(date).next_f64();
    let index = ((draw * tuning.modifiers.len() as f64) as usize).min(tuning.modifiers.len() - 1);
    Some(tuning.modifiers[index])
}

/// Whole days since the epoch date, 1-indexed (the epoch itself is #1)
pub fn challenge_number(tuning: &DailyTuning, date: &str) -> Result<i64, RulesError> {
    let epoch = CivilDate::parse(&tuning.epoch)?;
    let day = CivilDate::parse(date)?;
    Ok(day.days_since_epoch() - epoch.days_since_epoch() + 1)
}

/// 1..=5 stars; each wave threshold reached adds one
pub fn star_rating(tuning: &ShareTuning, wave: u32) -> u32 {
    1 + tuning.star_thresholds.iter().filter(|&&t| wave >= t).count() as u32
}

pub fn star_string(stars: u32) -> String {
    let filled = stars.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Everything that defines one day's run
#[derive(Debug, Clone, PartialEq)]
pub struct DailyChallenge {
    pub date: CivilDate,
    pub seed: u32,
    pub number: i64,
    pub modifier: Option<DailyModifier>,
}

impl DailyChallenge {
    pub fn for_date(tuning: &DailyTuning, date: &str) -> Result<Self, RulesError> {
        let parsed = CivilDate::parse(date)?;
        Ok(Self {
            date: parsed,
            seed: seed(date),
            number: challenge_number(tuning, date)?,
            modifier: modifier_for_date(tuning, date),
        })
    }

    /// Fresh generator for the day's gameplay randomness
    pub fn rng(&self) -> DailyRng {
        DailyRng::new(self.seed)
    }

    pub fn share_text(&self, share: &ShareTuning, score: u64, wave: u32, combo_max: u32) -> String {
        format!(
            "SPACE INVADERS DAILY #{}\n{}\nScore: {} | Wave: {} | Combo: {}",
            self.number,
            star_string(star_rating(share, wave)),
            crate::format_thousands(score),
            wave,
            combo_max
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttempt {
    pub official: bool,
    pub score: u64,
}

/// Per-date attempt ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyAttempts {
    attempts: BTreeMap<String, DailyAttempt>,
}

impl Record for DailyAttempts {
    const KEY: &'static str = "space-invaders-daily-attempts";
}

impl DailyAttempts {
    pub fn has_official_attempt(&self, date: &str) -> bool {
        self.attempts.get(date).is_some_and(|a| a.official)
    }

    pub fn official_score(&self, date: &str) -> Option<u64> {
        self.attempts.get(date).filter(|a| a.official).map(|a| a.score)
    }

    pub fn attempt(&self, date: &str) -> Option<DailyAttempt> {
        self.attempts.get(date).copied()
    }

    /// An official attempt always overwrites; practice never replaces an official one
    pub fn record_attempt(&mut self, date: &str, score: u64, official: bool) {
        if official || !self.has_official_attempt(date) {
            self.attempts
                .insert(date.to_string(), DailyAttempt { official, score });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore};
    use proptest::prelude::*;

    #[test]
    fn test_seed_values() {
        assert_eq!(seed("2026-01-01"), 1_161_665_730);
        assert_eq!(seed("2026-02-16"), 1_161_695_557);
        assert_eq!(seed("2026-10-19"), 1_162_559_499);
        assert_eq!(seed(""), 1);
    }

    #[test]
    fn test_mulberry_sequence() {
        let mut rng = DailyRng::new(42);
        let got: Vec<u32> = (0..3).map(|_| rng.next_u32()).collect();
        assert_eq!(got, vec![2_581_720_956, 1_925_393_290, 3_661_312_704]);

        let mut rng = DailyRng::new(42);
        assert!((rng.next_f64() - 0.601_103_751_920_163_6).abs() < 1e-15);
    }

    #[test]
    fn test_modifier_for_date() {
        let tuning = DailyTuning::default();
        assert_eq!(modifier_for_date(&tuning, "2026-01-01"), Some(DailyModifier::DoubleUfos));
        assert_eq!(modifier_for_date(&tuning, "2026-02-16"), Some(DailyModifier::PowerupRain));
        assert_eq!(modifier_for_date(&tuning, "2026-10-19"), Some(DailyModifier::NoShields));
    }

    #[test]
    fn test_challenge_number() {
        let tuning = DailyTuning::default();
        assert_eq!(challenge_number(&tuning, "2026-01-01").unwrap(), 1);
        assert_eq!(challenge_number(&tuning, "2026-10-19").unwrap(), 292);
        assert_eq!(challenge_number(&tuning, "2027-01-01").unwrap(), 366);
        assert!(matches!(
            challenge_number(&tuning, "2026-13-01"),
            Err(RulesError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_civil_date() {
        let date = CivilDate::parse("2026-10-19").unwrap();
        assert_eq!(date.days_since_epoch(), 20_745);
        assert_eq!(CivilDate::from_days_since_epoch(20_745), date);
        assert_eq!(date.to_string(), "2026-10-19");
        assert_eq!(CivilDate::from_days_since_epoch(0).to_string(), "1970-01-01");
        assert!(CivilDate::parse("2026-02-29").is_err());
        assert!(CivilDate::parse("2024-02-29").is_ok());
        assert!(CivilDate::parse("2026-1-01").is_err());
        assert!(CivilDate::parse("+026-01-01").is_err());
    }

    #[test]
    fn test_share_text() {
        let challenge = DailyChallenge::for_date(&DailyTuning::default(), "2026-10-19").unwrap();
        let text = challenge.share_text(&ShareTuning::default(), 12_345, 7, 12);
        assert_eq!(
            text,
            "SPACE INVADERS DAILY #292\n★★★☆☆\nScore: 12,345 | Wave: 7 | Combo: 12"
        );
    }

    #[test]
    fn test_star_rating() {
        let share = ShareTuning::default();
        assert_eq!(star_rating(&share, 1), 1);
        assert_eq!(star_rating(&share, 3), 2);
        assert_eq!(star_rating(&share, 9), 4);
        assert_eq!(star_rating(&share, 14), 5);
        assert_eq!(star_string(2), "★★☆☆☆");
    }

    #[test]
    fn test_modifier_tuning() {
        let base = Tuning::default();
        let t = DailyModifier::NoShields.apply(&base);
        assert_eq!(t.shield.count, 0);
        let t = DailyModifier::DoubleUfos.apply(&base);
        assert_eq!(t.ufo.spawn_interval_min_ms, 10_000.0);
        let t = DailyModifier::PowerupRain.apply(&base);
        assert!((t.power_up.max_drop_chance - 0.30).abs() < 1e-9);
        assert!(t.validate().is_ok());
        assert!(DailyModifier::MirrorMode.mirrors_controls());
    }

    #[test]
    fn test_attempt_ledger() {
        let mut attempts = DailyAttempts::default();
        attempts.record_attempt("2026-10-19", 500, false);
        assert!(!attempts.has_official_attempt("2026-10-19"));
        assert_eq!(attempts.official_score("2026-10-19"), None);

        attempts.record_attempt("2026-10-19", 1200, true);
        attempts.record_attempt("2026-10-19", 9000, false);
        assert_eq!(attempts.official_score("2026-10-19"), Some(1200));

        let mut store = MemoryStore::new();
        attempts.save_to(&mut store);
        let loaded = DailyAttempts::load_from(&store);
        assert_eq!(loaded.official_score("2026-10-19"), Some(1200));

        store.set(DailyAttempts::KEY, "garbage").unwrap();
        assert!(DailyAttempts::load_from(&store).attempt("2026-10-19").is_none());
    }

    proptest! {
        #[test]
        fn prop_seed_positive_and_stable(date in "[0-9]{4}-[0-9]{2}-[0-9]{2}") {
            prop_assert!(seed(&date) > 0);
            prop_assert_eq!(seed(&date), seed(&date));
        }

        #[test]
        fn prop_same_seed_same_sequence(s in any::<u32>()) {
            let mut a = DailyRng::new(s);
            let mut b = DailyRng::new(s);
            for _ in 0..32 {
                prop_assert_eq!(a.next_u32(), b.next_u32());
            }
        }

        #[test]
        fn prop_draws_in_unit_interval(s in any::<u32>()) {
            let mut rng = DailyRng::new(s);
            for _ in 0..32 {
                let v = rng.next_f64();
                prop_assert!((0.0..1.0).contains(&v));
            }
        }
    }
}
