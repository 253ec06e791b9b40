//! Mystery-ship scheduling and scoring

use rand::Rng;

use crate::Wave;
use crate::tuning::UfoTuning;

/// Points for the next hit, cycling on the hit counter
pub fn points(tuning: &UfoTuning, shot_count: u32) -> u64 {
    if tuning.points_cycle.is_empty() {
        return 0;
    }
    tuning.points_cycle[shot_count as usize % tuning.points_cycle.len()]
}

/// Horizontal speed, +10% of the base per wave after the first
pub fn speed(tuning: &UfoTuning, wave: Wave) -> f32 {
    tuning.speed * (1.0 + tuning.speed_increase_per_wave * wave.offset() as f32)
}

/// Spawn interval range `(min, max)` for a wave. Both ends stop shrinking at
/// the configured floor and max is never below min.
pub fn spawn_interval(tuning: &UfoTuning, wave: Wave) -> (f32, f32) {
    let decrease = tuning.spawn_interval_decrease_per_wave_ms * wave.offset() as f32;
    let min = (tuning.spawn_interval_min_ms - decrease).max(tuning.min_spawn_interval_ms);
    let max = (tuning.spawn_interval_max_ms - decrease).max(min);
    (min, max)
}

/// Travel direction: even spawns go left-to-right (+1), odd ones right-to-left (-1)
pub fn direction(spawn_count: u32) -> f32 {
    if spawn_count % 2 == 0 { 1.0 } else { -1.0 }
}

/// Spawn command for the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UfoSpawn {
    pub direction: f32,
    pub speed: f32,
    /// Value awarded if this ship is shot down
    pub points: u64,
}

/// Spawn countdown plus the counters that drive scoring and direction
#[derive(Debug, Clone)]
pub struct UfoScheduler {
    tuning: UfoTuning,
    spawn_count: u32,
    shot_count: u32,
    countdown_ms: Option<f32>,
    active: bool,
}

impl UfoScheduler {
    pub fn new(tuning: &UfoTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            spawn_count: 0,
            shot_count: 0,
            countdown_ms: None,
            active: false,
        }
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn shot_count(&self) -> u32 {
        self.shot_count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time left until the next spawn, once one is scheduled
    pub fn countdown_ms(&self) -> Option<f32> {
        self.countdown_ms
    }

    /// Advance the spawn countdown. At most one UFO is alive at a time.
    pub fn update<R: Rng + ?Sized>(&mut self, delta_ms: f32, wave: Wave, rng: &mut R) -> Option<UfoSpawn> {
        if self.active {
            return None;
        }
        let remaining = match self.countdown_ms {
            Some(ms) => ms - delta_ms,
            None => {
                self.schedule(wave, rng);
                return None;
            }
        };
        if remaining > 0.0 {
            self.countdown_ms = Some(remaining);
            return None;
        }

        let spawn = UfoSpawn {
            direction: direction(self.spawn_count),
            speed: speed(&self.tuning, wave),
            points: points(&self.tuning, self.shot_count),
        };
        self.spawn_count += 1;
        self.countdown_ms = None;
        self.active = true;
        log::debug!("UFO spawn #{} heading {}", self.spawn_count, spawn.direction);
        Some(spawn)
    }

    /// Confirmed hit: returns the points and advances the cycle
    pub fn on_hit(&mut self) -> u64 {
        let awarded = points(&self.tuning, self.shot_count);
        self.shot_count += 1;
        self.active = false;
        awarded
    }

    /// The UFO left the screen unharmed
    pub fn on_escaped(&mut self) {
        self.active = false;
    }

    /// Drop any pending countdown (e.g. at a wave change) so the next update
    /// reschedules for the new wave
    pub fn reschedule(&mut self) {
        self.countdown_ms = None;
    }

    pub fn reset(&mut self) {
        self.spawn_count = 0;
        self.shot_count = 0;
        self.countdown_ms = None;
        self.active = false;
    }

    fn schedule<R: Rng + ?Sized>(&mut self, wave: Wave, rng: &mut R) {
        let (min, max) = spawn_interval(&self.tuning, wave);
        let delay = if max > min { rng.random_range(min..=max) } else { min };
        self.countdown_ms = Some(delay);
    }
}
