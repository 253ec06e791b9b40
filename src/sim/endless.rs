//! Endless-mode pacing: ever-faster group spawns

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::EndlessTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndlessFormation {
    Line,
    VShape,
    Diamond,
    Cluster,
    Column,
}

impl EndlessFormation {
    pub const ALL: [EndlessFormation; 5] = [
        EndlessFormation::Line,
        EndlessFormation::VShape,
        EndlessFormation::Diamond,
        EndlessFormation::Cluster,
        EndlessFormation::Column,
    ];
}

/// A group to drop into the playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndlessSpawn {
    pub group_size: u32,
    pub formation: EndlessFormation,
    pub x: f32,
}

#[derive(Debug, Clone)]
pub struct EndlessPacer {
    tuning: EndlessTuning,
    canvas_width: f32,
    elapsed_minutes: f32,
    spawn_timer_ms: f32,
}

impl EndlessPacer {
    pub fn new(tuning: &EndlessTuning, canvas_width: f32) -> Self {
        Self {
            tuning: tuning.clone(),
            canvas_width,
            elapsed_minutes: 0.0,
            spawn_timer_ms: 0.0,
        }
    }

    pub fn elapsed_minutes(&self) -> f32 {
        self.elapsed_minutes
    }

    pub fn spawn_interval(&self) -> f32 {
        let decrease = self.elapsed_minutes * self.tuning.spawn_interval_decrease_per_minute_ms;
        (self.tuning.initial_spawn_interval_ms - decrease).max(self.tuning.min_spawn_interval_ms)
    }

    /// True at most once per interval; the timer restarts on a spawn
    pub fn should_spawn(&mut self, delta_ms: f32) -> bool {
        self.spawn_timer_ms += delta_ms;
        self.elapsed_minutes += delta_ms / 60_000.0;
        if self.spawn_timer_ms >= self.spawn_interval() {
            self.spawn_timer_ms = 0.0;
            true
        } else {
            false
        }
    }

    pub fn group_size<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let lo = self.tuning.group_size_min;
        let hi = self.tuning.group_size_max.max(lo);
        rng.random_range(lo..=hi)
    }

    pub fn formation<R: Rng + ?Sized>(&self, rng: &mut R) -> EndlessFormation {
        EndlessFormation::ALL[rng.random_range(0..EndlessFormation::ALL.len())]
    }

    pub fn spawn_x<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let margin = self.tuning.spawn_margin;
        let span = (self.canvas_width - 2.0 * margin).max(0.0);
        margin + rng.random::<f32>() * span
    }

    /// `should_spawn` plus the randomised group it produces
    pub fn next_spawn<R: Rng + ?Sized>(&mut self, delta_ms: f32, rng: &mut R) -> Option<EndlessSpawn> {
        if !self.should_spawn(delta_ms) {
            return None;
        }
        let spawn = EndlessSpawn {
            group_size: self.group_size(rng),
            formation: self.formation(rng),
            x: self.spawn_x(rng),
        };
        log::debug!("Endless spawn {:?}", spawn);
        Some(spawn)
    }

    pub fn power_up_drop_multiplier(&self) -> f64 {
        self.tuning.power_up_drop_multiplier
    }

    pub fn reset(&mut self) {
        self.elapsed_minutes = 0.0;
        self.spawn_timer_ms = 0.0;
    }
}
