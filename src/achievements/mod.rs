//! Achievements and titles.

pub mod manager;
pub mod types;

pub use manager::AchievementManager;
pub use types::{
    default_achievements, Achievement, AchievementCategory, AchievementStatus, CriteriaType, Rarity,
    UserStats, UserTitle,
};
