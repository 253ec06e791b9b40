//! Ghost replays: record a run's position/firing timeline and play the best
//! one back next to the live player.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};
use crate::tuning::GhostTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostFrame {
    pub x: f32,
    pub firing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMilestone {
    pub score: u64,
    pub frame_index: usize,
}

/// Immutable once captured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostRecording {
    pub frames: Vec<GhostFrame>,
    pub score_milestones: Vec<ScoreMilestone>,
}

/// Samples the player at a fixed rate and notes score milestones
#[derive(Debug, Clone)]
pub struct GhostRecorder {
    sample_interval_ms: f32,
    milestone_interval: u64,
    sample_timer_ms: f32,
    next_milestone: u64,
    recording: GhostRecording,
}

impl GhostRecorder {
    pub fn new(tuning: &GhostTuning) -> Self {
        let sample_interval_ms = if tuning.sample_rate_hz > 0.0 {
            1000.0 / tuning.sample_rate_hz
        } else {
            f32::INFINITY
        };
        Self {
            sample_interval_ms,
            milestone_interval: tuning.score_milestone_interval.max(1),
            sample_timer_ms: 0.0,
            next_milestone: tuning.score_milestone_interval.max(1),
            recording: GhostRecording::default(),
        }
    }

    /// Append one frame unconditionally
    pub fn record_frame(&mut self, x: f32, firing: bool) {
        self.recording.frames.push(GhostFrame { x, firing });
    }

    pub fn record_score_milestone(&mut self, score: u64, frame_index: usize) {
        self.recording
            .score_milestones
            .push(ScoreMilestone { score, frame_index });
    }

    /// Per-frame hook: samples at the configured rate and tags a milestone
    /// each time the score passes the next multiple of the interval.
    /// Returns true if a frame was sampled.
    pub fn update(&mut self, delta_ms: f32, x: f32, firing: bool, score: u64) -> bool {
        self.sample_timer_ms += delta_ms;
        let sampled = self.sample_timer_ms >= self.sample_interval_ms;
        if sampled {
            self.sample_timer_ms -= self.sample_interval_ms;
            self.record_frame(x, firing);
        }
        if score >= self.next_milestone {
            let frame_index = self.recording.frames.len().saturating_sub(1);
            self.record_score_milestone(score, frame_index);
            while self.next_milestone <= score {
                self.next_milestone += self.milestone_interval;
            }
        }
        sampled
    }

    pub fn frame_count(&self) -> usize {
        self.recording.frames.len()
    }

    pub fn recording(&self) -> GhostRecording {
        self.recording.clone()
    }

    pub fn reset(&mut self) {
        self.sample_timer_ms = 0.0;
        self.next_milestone = self.milestone_interval;
        self.recording = GhostRecording::default();
    }
}

/// Steps through a recording one frame per call
#[derive(Debug, Clone)]
pub struct GhostPlayback {
    recording: GhostRecording,
    current_frame: usize,
}

impl GhostPlayback {
    pub fn new(recording: GhostRecording) -> Self {
        Self {
            recording,
            current_frame: 0,
        }
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Ghost x position; 0 for an empty recording
    pub fn position(&self) -> f32 {
        self.recording
            .frames
            .get(self.current_frame)
            .map(|f| f.x)
            .unwrap_or(0.0)
    }

    pub fn is_firing(&self) -> bool {
        self.recording
            .frames
            .get(self.current_frame)
            .is_some_and(|f| f.firing)
    }

    /// Move one frame forward, stopping on the last one
    pub fn advance(&mut self) {
        if self.current_frame + 1 < self.recording.frames.len() {
            self.current_frame += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_frame + 1 >= self.recording.frames.len()
    }

    /// Latest milestone reached at or before the current frame
    pub fn ghost_score(&self) -> u64 {
        self.recording
            .score_milestones
            .iter()
            .take_while(|m| m.frame_index <= self.current_frame)
            .last()
            .map(|m| m.score)
            .unwrap_or(0)
    }

    /// Live score minus ghost score (positive = player ahead)
    pub fn score_delta(&self, player_score: u64) -> i64 {
        player_score as i64 - self.ghost_score() as i64
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGhost {
    pub recording: GhostRecording,
    pub score: u64,
}

/// Best ghost per game mode
pub struct GhostStore;

impl GhostStore {
    pub fn key(mode: &str) -> String {
        format!("space-invaders-ghost-{}", mode)
    }

    pub fn load(store: &dyn KeyValueStore, mode: &str) -> Option<StoredGhost> {
        persistence::load_json(store, &Self::key(mode))
    }

    /// Keep the recording only if it beats the stored one.
    /// Returns true if it was written.
    pub fn save(store: &mut dyn KeyValueStore, mode: &str, recording: &GhostRecording, score: u64) -> bool {
        if Self::load(store, mode).is_some_and(|existing| existing.score >= score) {
            return false;
        }
        let ghost = StoredGhost {
            recording: recording.clone(),
            score,
        };
        persistence::save_json(store, &Self::key(mode), &ghost)
    }

    pub fn clear(store: &mut dyn KeyValueStore, mode: &str) {
        store.remove(&Self::key(mode));
    }
}
