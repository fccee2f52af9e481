//! Progression engine: streaks, XP levels, growth stages, weekly
//! aggregates and distraction milestones.
//!
//! Everything here is a synchronous transformation over
//! [`StreakState`] and [`ProgressionState`]. Persistence lives in
//! [`store`] and only ever moves whole records.

pub mod dates;
pub mod level;
pub mod milestones;
pub mod model;
pub mod store;
pub mod streak;
pub mod weekly;

pub use dates::{day_key, week_key};
pub use level::{level_for_xp, stage_for_level, stage_progress, XP_PER_LEVEL};
pub use milestones::{Milestone, MILESTONES};
pub use model::{ProgressionState, Stage, StreakState};
pub use streak::{COMPLETE_ORB_REWARD, RELAPSE_ORB_PENALTY};
