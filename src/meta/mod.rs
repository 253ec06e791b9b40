//! Session-boundary services
//!
//! Everything here is queried at session start, wave end or game end rather
//! than every frame. Persistent records go through `crate::persistence`.

pub mod achievements;
pub mod challenges;
pub mod cosmetics;
pub mod daily;
pub mod ghost;
pub mod share;
pub mod ships;
pub mod stats;

pub use achievements::{AchievementLedger, GameSnapshot};
pub use challenges::{ChallengeLedger, ChallengeRating, ChallengeResult};
pub use cosmetics::{CosmeticSlot, Cosmetics};
pub use daily::{CivilDate, DailyAttempts, DailyChallenge, DailyModifier, DailyRng};
pub use ghost::{GhostPlayback, GhostRecorder, GhostRecording, GhostStore};
pub use ships::{Hangar, ShipKind};
pub use stats::{LifetimeStats, RunSummary};
