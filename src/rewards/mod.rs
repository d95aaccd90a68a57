//! Reward computation shared by the level and streak engines.
//!
//! Contains:
//! - Reward aggregation ([`sum_rewards`], [`RewardBundle`])
//! - Activity tags and per-activity reward rules
//! - The login streak bonus table and the legacy login counter

pub mod activity;
pub mod bundle;
pub mod login;

pub use activity::{
    calculate_rewards, streak_bonus, ActivityCompletion, ActivityRewards, ActivityType, StreakBonus,
};
pub use bundle::{sum_rewards, RewardBundle, RewardSource};
pub use login::{advance_login_streak, LoginStreakResult};
