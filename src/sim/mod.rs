//! Per-frame rules components and the session loop
//!
//! Everything here advances only when given a time delta or a discrete event:
//! - Injected RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod boss;
pub mod combo;
pub mod endless;
pub mod formation;
pub mod powerup;
pub mod shields;
pub mod state;
pub mod tick;
pub mod tier;
pub mod ufo;
pub mod weapon;

pub use boss::{AttackKind, AttackPattern, BossPhase, BossState, BossType};
pub use combo::{Grade, TimeAttackResults, TimeAttackState};
pub use endless::{EndlessFormation, EndlessPacer, EndlessSpawn};
pub use formation::{Formation, InvaderKind, StepKind};
pub use powerup::{PowerUpKind, PowerUpState};
pub use shields::Shields;
pub use state::{GameEvent, GameMode, GameOverReason, Session, SessionPhase};
pub use tick::{HostEvent, tick};
pub use tier::{DifficultyTier, Feature, TierGate};
pub use ufo::{UfoScheduler, UfoSpawn};
pub use weapon::{FirePattern, WeaponSystem};
