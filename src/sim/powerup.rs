//! Power-up drops and the single active power-up slot

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Wave;
use crate::error::RulesError;
use crate::tuning::{PowerUpSpec, PowerUpTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    Spread,
    Rapid,
    /// Absorbs one hit; never times out
    Shield,
    /// Doubles score while active
    Multiplier,
}

pub(crate) fn validate_weights(kinds: &[PowerUpSpec]) -> Result<(), RulesError> {
    let total: f64 = kinds.iter().map(|s| s.weight).sum();
    if kinds.is_empty() || kinds.iter().any(|s| s.weight <= 0.0) || (total - 1.0).abs() > 1e-6 {
        return Err(RulesError::InvalidPowerUpWeights(total));
    }
    Ok(())
}

/// Weighted pick over the configured kinds.
/// Falls back to the last kind when rounding leaves the roll uncovered.
pub fn select_kind<R: Rng + ?Sized>(tuning: &PowerUpTuning, rng: &mut R) -> PowerUpKind {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for spec in &tuning.kinds {
        cumulative += spec.weight;
        if roll < cumulative {
            return spec.kind;
        }
    }
    tuning
        .kinds
        .last()
        .map(|s| s.kind)
        .unwrap_or(PowerUpKind::Multiplier)
}

/// Per-kill drop probability: rises with the wave, then flat at the cap
pub fn drop_chance(tuning: &PowerUpTuning, wave: Wave) -> f64 {
    (tuning.drop_chance_base + f64::from(wave.offset()) * tuning.drop_chance_increase_per_wave)
        .min(tuning.max_drop_chance)
}

pub fn should_drop<R: Rng + ?Sized>(tuning: &PowerUpTuning, wave: Wave, rng: &mut R) -> bool {
    should_drop_scaled(tuning, wave, 1.0, rng)
}

/// Drop roll with the chance scaled by a mode multiplier (endless, daily)
pub fn should_drop_scaled<R: Rng + ?Sized>(
    tuning: &PowerUpTuning,
    wave: Wave,
    multiplier: f64,
    rng: &mut R,
) -> bool {
    let chance = (drop_chance(tuning, wave) * multiplier).clamp(0.0, 1.0);
    rng.random::<f64>() < chance
}

/// The currently active power-up, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpState {
    active: Option<PowerUpKind>,
    remaining_ms: f32,
    tuning: PowerUpTuning,
}

impl PowerUpState {
    pub fn new(tuning: &PowerUpTuning) -> Self {
        Self {
            active: None,
            remaining_ms: 0.0,
            tuning: tuning.clone(),
        }
    }

    pub fn active(&self) -> Option<PowerUpKind> {
        self.active
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    /// Activate with the kind's configured duration, replacing any active one
    pub fn activate(&mut self, kind: PowerUpKind) {
        let duration = self.tuning.spec(kind).map(|s| s.duration_ms).unwrap_or(0.0);
        self.activate_for(kind, duration);
    }

    pub fn activate_for(&mut self, kind: PowerUpKind, duration_ms: f32) {
        log::debug!("Power-up {:?} active for {} ms", kind, duration_ms);
        self.active = Some(kind);
        self.remaining_ms = duration_ms.max(0.0);
    }

    /// Count down timed power-ups. Returns the kind that just expired.
    pub fn update(&mut self, delta_ms: f32) -> Option<PowerUpKind> {
        let kind = self.active?;
        if kind == PowerUpKind::Shield {
            return None;
        }
        self.remaining_ms = (self.remaining_ms - delta_ms).max(0.0);
        if self.remaining_ms <= 0.0 {
            self.active = None;
            self.remaining_ms = 0.0;
            return Some(kind);
        }
        None
    }

    /// Timed power-up inside its final warning window
    pub fn is_expiring(&self) -> bool {
        match self.active {
            None | Some(PowerUpKind::Shield) => false,
            Some(_) => self.remaining_ms > 0.0 && self.remaining_ms < self.tuning.expiry_warning_ms,
        }
    }

    pub fn score_multiplier(&self) -> u64 {
        if self.active == Some(PowerUpKind::Multiplier) { 2 } else { 1 }
    }

    pub fn is_shield_active(&self) -> bool {
        self.active == Some(PowerUpKind::Shield)
    }

    /// Use up the shield. Returns false (and does nothing) without one.
    pub fn consume_shield(&mut self) -> bool {
        if !self.is_shield_active() {
            return false;
        }
        self.active = None;
        self.remaining_ms = 0.0;
        true
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.remaining_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn w(n: u32) -> Wave {
        Wave::new(n).unwrap()
    }

    #[test]
    fn test_drop_chance_curve() {
        let tuning = PowerUpTuning::default();
        assert!((drop_chance(&tuning, w(1)) - 0.08).abs() < 1e-9);
        assert!((drop_chance(&tuning, w(4)) - 0.11).abs() < 1e-9);
        assert!((drop_chance(&tuning, w(8)) - 0.15).abs() < 1e-9);
        assert!((drop_chance(&tuning, w(50)) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_selection_frequencies_match_weights() {
        let tuning = PowerUpTuning::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut counts = [0usize; 4];
        let n = 10_000;
        for _ in 0..n {
            let idx = match select_kind(&tuning, &mut rng) {
                PowerUpKind::Spread => 0,
                PowerUpKind::Rapid => 1,
                PowerUpKind::Shield => 2,
                PowerUpKind::Multiplier => 3,
            };
            counts[idx] += 1;
        }
        for (spec, count) in tuning.kinds.iter().zip(counts) {
            let freq = count as f64 / n as f64;
            assert!(
                (freq - spec.weight).abs() <= spec.weight * 0.10,
                "{:?}: {} vs {}",
                spec.kind,
                freq,
                spec.weight
            );
        }
    }

    #[test]
    fn test_should_drop_rate() {
        let tuning = PowerUpTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let drops = (0..20_000)
            .filter(|_| should_drop(&tuning, w(1), &mut rng))
            .count();
        let rate = drops as f64 / 20_000.0;
        assert!((rate - 0.08).abs() < 0.01, "rate {}", rate);
    }

    #[test]
    fn test_activate_replaces() {
        let mut state = PowerUpState::new(&PowerUpTuning::default());
        state.activate(PowerUpKind::Spread);
        assert_eq!(state.remaining_ms(), 8000.0);
        state.activate(PowerUpKind::Rapid);
        assert_eq!(state.active(), Some(PowerUpKind::Rapid));
        assert_eq!(state.remaining_ms(), 6000.0);
    }

    #[test]
    fn test_timed_expiry() {
        let mut state = PowerUpState::new(&PowerUpTuning::default());
        state.activate(PowerUpKind::Multiplier);
        assert_eq!(state.score_multiplier(), 2);
        assert_eq!(state.update(7000.0), None);
        assert!(!state.is_expiring());
        assert_eq!(state.update(1500.0), None);
        assert!(state.is_expiring());
        assert_eq!(state.update(1500.0), Some(PowerUpKind::Multiplier));
        assert_eq!(state.active(), None);
        assert_eq!(state.score_multiplier(), 1);
        assert!(!state.is_expiring());
    }

    #[test]
    fn test_shield_is_permanent_until_consumed() {
        let mut state = PowerUpState::new(&PowerUpTuning::default());
        state.activate(PowerUpKind::Shield);
        assert_eq!(state.update(1_000_000.0), None);
        assert!(state.is_shield_active());
        assert!(!state.is_expiring());
        assert!(state.consume_shield());
        assert!(!state.is_shield_active());
        assert!(!state.consume_shield());
    }

    #[test]
    fn test_consume_shield_noop_for_other_kinds() {
        let mut state = PowerUpState::new(&PowerUpTuning::default());
        state.activate(PowerUpKind::Rapid);
        assert!(!state.consume_shield());
        assert_eq!(state.active(), Some(PowerUpKind::Rapid));
    }

    #[test]
    fn test_weight_validation() {
        assert!(validate_weights(&PowerUpTuning::default().kinds).is_ok());
        assert!(validate_weights(&[]).is_err());
    }
}
