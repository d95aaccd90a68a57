//! Level table and XP engine.

pub mod engine;
pub mod types;

pub use engine::{LevelEngine, LevelUp, UserLevelProgress, XpResult};
pub use types::{level_for_xp, Level, LevelRewards, LevelTable};
