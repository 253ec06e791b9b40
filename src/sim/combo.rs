//! Time-attack mode: countdown, kill combos and end-of-run grading

use serde::{Deserialize, Serialize};

use crate::tuning::{GradeThresholds, TimeAttackTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn for_score(grades: &GradeThresholds, score: u64) -> Self {
        if score >= grades.s {
            Grade::S
        } else if score >= grades.a {
            Grade::A
        } else if score >= grades.b {
            Grade::B
        } else if score >= grades.c {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

/// End-of-run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAttackResults {
    pub score: u64,
    pub total_kills: u32,
    pub total_shots: u32,
    pub total_hits: u32,
    /// Rounded percent, 0 without shots
    pub accuracy: u32,
    pub highest_combo: u32,
    pub grade: Grade,
}

#[derive(Debug, Clone)]
pub struct TimeAttackState {
    tuning: TimeAttackTuning,
    remaining_ms: f32,
    score: u64,
    combo: u32,
    highest_combo: u32,
    total_kills: u32,
    total_shots: u32,
    total_hits: u32,
    since_last_kill_ms: f32,
}

impl TimeAttackState {
    pub fn new(tuning: &TimeAttackTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            remaining_ms: tuning.duration_ms,
            score: 0,
            combo: 0,
            highest_combo: 0,
            total_kills: 0,
            total_shots: 0,
            total_hits: 0,
            since_last_kill_ms: 0.0,
        }
    }

    /// Run the clock. An idle stretch of at least the timeout breaks the combo.
    pub fn update(&mut self, delta_ms: f32) {
        self.remaining_ms = (self.remaining_ms - delta_ms).max(0.0);
        self.since_last_kill_ms += delta_ms;
        if self.combo > 0 && self.since_last_kill_ms >= self.tuning.combo_timeout_ms {
            log::debug!("Combo x{} timed out", self.combo);
            self.combo = 0;
        }
    }

    /// Score a kill. Returns the points awarded after the combo multiplier.
    pub fn record_kill(&mut self, base_points: u64) -> u64 {
        self.combo += 1;
        self.highest_combo = self.highest_combo.max(self.combo);
        self.total_kills += 1;
        self.total_hits += 1;
        self.since_last_kill_ms = 0.0;

        let awarded = base_points * self.multiplier();
        self.score += awarded;
        awarded
    }

    pub fn record_shot(&mut self) {
        self.total_shots += 1;
    }

    pub fn record_miss(&mut self) {
        self.combo = 0;
    }

    pub fn record_death(&mut self) {
        self.combo = 0;
    }

    pub fn multiplier(&self) -> u64 {
        multiplier_for(&self.tuning, self.combo)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn highest_combo(&self) -> u32 {
        self.highest_combo
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    pub fn is_time_up(&self) -> bool {
        self.remaining_ms <= 0.0
    }

    pub fn is_warning(&self) -> bool {
        self.remaining_ms > 0.0 && self.remaining_ms <= self.tuning.warning_ms
    }

    pub fn grade(&self) -> Grade {
        Grade::for_score(&self.tuning.grades, self.score)
    }

    pub fn results(&self) -> TimeAttackResults {
        let accuracy = if self.total_shots > 0 {
            (f64::from(self.total_hits) / f64::from(self.total_shots) * 100.0).round() as u32
        } else {
            0
        };
        TimeAttackResults {
            score: self.score,
            total_kills: self.total_kills,
            total_shots: self.total_shots,
            total_hits: self.total_hits,
            accuracy,
            highest_combo: self.highest_combo,
            grade: self.grade(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(&self.tuning);
    }
}

/// Highest threshold index (+1) the combo has reached, capped
pub fn multiplier_for(tuning: &TimeAttackTuning, combo: u32) -> u64 {
    let reached = tuning.combo_thresholds.iter().filter(|&&t| combo >= t).count() as u64;
    reached.max(1).min(tuning.max_multiplier.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> TimeAttackState {
        TimeAttackState::new(&TimeAttackTuning::default())
    }

    #[test]
    fn test_three_kills_cross_double() {
        let mut ta = state();
        let awarded: Vec<u64> = (0..3).map(|_| ta.record_kill(10)).collect();
        assert_eq!(awarded, vec![10, 10, 20]);
        assert_eq!(ta.score(), 40);
        assert_eq!(ta.multiplier(), 2);
    }

    #[test]
    fn test_multiplier_table() {
        let tuning = TimeAttackTuning::default();
        let got: Vec<u64> = [0, 1, 2, 3, 5, 6, 10, 15, 100]
            .iter()
            .map(|&c| multiplier_for(&tuning, c))
            .collect();
        assert_eq!(got, vec![1, 1, 1, 2, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn test_miss_and_death_break_combo() {
        let mut ta = state();
        ta.record_kill(10);
        ta.record_kill(10);
        ta.record_miss();
        assert_eq!(ta.combo(), 0);
        ta.record_kill(10);
        ta.record_death();
        assert_eq!(ta.combo(), 0);
        assert_eq!(ta.highest_combo(), 2);
    }

    #[test]
    fn test_idle_timeout_breaks_combo() {
        let mut ta = state();
        ta.record_kill(10);
        ta.update(1999.0);
        assert_eq!(ta.combo(), 1);
        ta.update(1.0);
        assert_eq!(ta.combo(), 0);
    }

    #[test]
    fn test_clock_and_warning() {
        let mut ta = state();
        assert!(!ta.is_warning());
        ta.update(80_000.0);
        assert!(ta.is_warning());
        assert!(!ta.is_time_up());
        ta.update(20_000.0);
        assert_eq!(ta.remaining_ms(), 0.0);
        assert!(ta.is_time_up());
        assert!(!ta.is_warning());
    }

    #[test]
    fn test_grades() {
        let grades = GradeThresholds::default();
        assert_eq!(Grade::for_score(&grades, 15000), Grade::S);
        assert_eq!(Grade::for_score(&grades, 14999), Grade::A);
        assert_eq!(Grade::for_score(&grades, 6000), Grade::B);
        assert_eq!(Grade::for_score(&grades, 3000), Grade::C);
        assert_eq!(Grade::for_score(&grades, 0), Grade::D);
    }

    #[test]
    fn test_results() {
        let mut ta = state();
        assert_eq!(ta.results().accuracy, 0);
        for _ in 0..3 {
            ta.record_shot();
        }
        ta.record_kill(10);
        ta.record_kill(10);
        ta.record_miss();
        let results = ta.results();
        assert_eq!(results.total_shots, 3);
        assert_eq!(results.total_kills, 2);
        assert_eq!(results.accuracy, 67);
        assert_eq!(results.highest_combo, 2);
        assert_eq!(results.grade, Grade::D);
    }

    #[test]
    fn test_reset() {
        let mut ta = state();
        ta.record_kill(100);
        ta.update(5000.0);
        ta.reset();
        assert_eq!(ta.score(), 0);
        assert_eq!(ta.highest_combo(), 0);
        assert_eq!(ta.remaining_ms(), 90_000.0);
    }

    proptest! {
        #[test]
        fn prop_multiplier_monotonic_and_capped(a in 0u32..100, b in 0u32..100) {
            let tuning = TimeAttackTuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(multiplier_for(&tuning, lo) <= multiplier_for(&tuning, hi));
            prop_assert!(multiplier_for(&tuning, hi) <= tuning.max_multiplier);
        }
    }
}
