//! Invader formation: grid population, step cadence, edge drop-and-reverse,
//! and bottom-of-column shooter selection.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::FormationTuning;

/// Invader species (decides the points awarded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvaderKind {
    Squid,
    Crab,
    Octopus,
}

/// One grid slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invader {
    pub pos: Vec2,
    pub kind: InvaderKind,
    pub alive: bool,
}

/// What a formation step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Every survivor moved one step sideways
    Move,
    /// Every survivor dropped one row and the direction reversed
    Drop,
}

/// Result of one `Formation::update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormationUpdate {
    pub step: Option<StepKind>,
    /// Spawn position of an enemy shot fired this frame
    pub shot: Option<Vec2>,
}

/// The invader grid for one wave
#[derive(Debug, Clone)]
pub struct Formation {
    invaders: Vec<Invader>,
    /// +1 = right, -1 = left
    direction: f32,
    step_timer: f32,
    fire_timer: f32,
    shots_in_flight: u32,
    canvas_width: f32,
    tuning: FormationTuning,
}

impl Formation {
    /// Spawn a full grid centred horizontally with its top row at `start_y`
    pub fn spawn(tuning: &FormationTuning, canvas_width: f32, start_y: f32) -> Self {
        let grid_width = tuning.cols.saturating_sub(1) as f32 * tuning.spacing_x;
        let offset_x = (canvas_width - grid_width) / 2.0;

        let mut invaders = Vec::with_capacity(tuning.rows * tuning.cols);
        for row in 0..tuning.rows {
            let kind = tuning
                .row_kinds
                .get(row)
                .or(tuning.row_kinds.last())
                .copied()
                .unwrap_or(InvaderKind::Octopus);
            for col in 0..tuning.cols {
                invaders.push(Invader {
                    pos: Vec2::new(
                        offset_x + col as f32 * tuning.spacing_x,
                        start_y + row as f32 * tuning.spacing_y,
                    ),
                    kind,
                    alive: true,
                });
            }
        }

        Self::from_invaders(tuning, canvas_width, invaders)
    }

    /// A formation with no occupants (boss waves)
    pub fn empty(tuning: &FormationTuning, canvas_width: f32) -> Self {
        Self::from_invaders(tuning, canvas_width, Vec::new())
    }

    fn from_invaders(tuning: &FormationTuning, canvas_width: f32, invaders: Vec<Invader>) -> Self {
        Self {
            invaders,
            direction: 1.0,
            step_timer: 0.0,
            fire_timer: 0.0,
            shots_in_flight: 0,
            canvas_width,
            tuning: tuning.clone(),
        }
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn total_count(&self) -> usize {
        self.invaders.len()
    }

    pub fn alive_count(&self) -> usize {
        self.invaders.iter().filter(|i| i.alive).count()
    }

    /// Cleared exactly when no occupant is alive
    pub fn is_cleared(&self) -> bool {
        self.alive_count() == 0
    }

    pub fn shots_in_flight(&self) -> u32 {
        self.shots_in_flight
    }

    /// Step interval (ms): slow at full population, fast with one survivor
    pub fn step_interval(&self) -> f32 {
        let floor = self.tuning.step_interval_floor_ms;
        let ceil = self.tuning.step_interval_ceil_ms.max(floor);
        let total = self.total_count();
        if total == 0 {
            return floor;
        }
        let alive = self.alive_count() as f32;
        (floor + (ceil - floor) * alive / total as f32).clamp(floor, ceil)
    }

    /// Advance timers; steps and fires at most once each per call
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_ms: f32,
        fire_interval_ms: f32,
        rng: &mut R,
    ) -> FormationUpdate {
        let mut result = FormationUpdate::default();

        self.step_timer += delta_ms;
        if self.step_timer >= self.step_interval() {
            self.step_timer = 0.0;
            result.step = self.step();
        }

        self.fire_timer += delta_ms;
        if self.fire_timer >= fire_interval_ms {
            self.fire_timer = 0.0;
            result.shot = self.try_fire(rng);
        }

        result
    }

    /// Move sideways, or drop and reverse if any survivor would cross a margin
    pub fn step(&mut self) -> Option<StepKind> {
        let step = self.direction * self.tuning.step_size;
        let left = self.tuning.edge_margin;
        let right = self.canvas_width - self.tuning.edge_margin;

        if self.is_cleared() {
            return None;
        }

        let at_edge = self
            .invaders
            .iter()
            .filter(|i| i.alive)
            .any(|i| {
                let next_x = i.pos.x + step;
                next_x < left || next_x > right
            });

        if at_edge {
            for invader in self.invaders.iter_mut().filter(|i| i.alive) {
                invader.pos.y += self.tuning.drop_size;
            }
            self.direction = -self.direction;
            Some(StepKind::Drop)
        } else {
            for invader in self.invaders.iter_mut().filter(|i| i.alive) {
                invader.pos.x += step;
            }
            Some(StepKind::Move)
        }
    }

    /// Indices of the lowest survivor in each column, in column order
    pub fn firing_candidates(&self) -> Vec<usize> {
        let mut columns: BTreeMap<i32, usize> = BTreeMap::new();
        for (index, invader) in self.invaders.iter().enumerate() {
            if !invader.alive {
                continue;
            }
            let col = (invader.pos.x / self.tuning.spacing_x).round() as i32;
            match columns.get(&col) {
                Some(&existing) if self.invaders[existing].pos.y >= invader.pos.y => {}
                _ => {
                    columns.insert(col, index);
                }
            }
        }
        columns.into_values().collect()
    }

    /// Fire from a random bottom-of-column survivor, respecting the shot cap
    pub fn try_fire<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec2> {
        if self.shots_in_flight >= self.tuning.max_enemy_shots {
            return None;
        }
        let candidates = self.firing_candidates();
        if candidates.is_empty() {
            return None;
        }
        let shooter = candidates[rng.random_range(0..candidates.len())];
        self.shots_in_flight += 1;
        Some(self.invaders[shooter].pos + Vec2::new(0.0, self.tuning.shot_offset_y))
    }

    /// An enemy shot left play (hit something or went off-screen)
    pub fn on_shot_gone(&mut self) {
        self.shots_in_flight = self.shots_in_flight.saturating_sub(1);
    }

    /// Kill the occupant of a slot. Returns its kind only the first time.
    pub fn kill(&mut self, index: usize) -> Option<InvaderKind> {
        let invader = self.invaders.get_mut(index)?;
        if !invader.alive {
            return None;
        }
        invader.alive = false;
        Some(invader.kind)
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.invaders.get(index).map(|i| i.pos)
    }

    /// True once any survivor reaches `line_y`
    pub fn has_reached(&self, line_y: f32) -> bool {
        self.invaders.iter().any(|i| i.alive && i.pos.y >= line_y)
    }
}
