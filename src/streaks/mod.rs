//! Streak tracking.
//!
//! Contains:
//! - Streak, milestone reward and freeze types
//! - The expiry/freeze state machine
//! - Default milestone rewards

pub mod defaults;
pub mod engine;
pub mod types;

pub use defaults::default_streak_rewards;
pub use engine::{ActivityOutcome, StreakRules};
pub use types::{
    format_countdown, FreezeResult, Streak, StreakActionResult, StreakFreeze, StreakReward,
    StreakRewardStatus, StreakStatus, StreakType,
};

use crate::error::{RewardError, RewardResult};

/// Parse a streak type tag, rejecting unknown values.
pub fn parse_streak_type(tag: &str) -> RewardResult<StreakType> {
    StreakType::from_str(&tag.to_ascii_lowercase())
        .ok_or_else(|| RewardError::InvalidArgument(format!("unknown streak type '{}'", tag)))
}
