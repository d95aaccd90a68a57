//! Gamekeeper - XP, Level and Streak Bookkeeping
//!
//! A self-hosted reward core for learning platforms. Converts user activity
//! into XP, levels, coins, gems and streak milestones, and keeps every
//! balance change in a ledger backed by SQLite.

pub mod achievements;
pub mod challenges;
pub mod economy;
pub mod error;
pub mod leaderboard;
pub mod levels;
pub mod power_ups;
pub mod rewards;
pub mod service;
pub mod storage;
pub mod streaks;

// Re-export commonly used types
pub use economy::{Balance, Currency, CurrencyTransaction};
pub use error::{RewardError, RewardResult};
pub use leaderboard::{LeaderboardCategory, LeaderboardEntry};
pub use levels::{LevelEngine, LevelTable, LevelUp, UserLevelProgress, XpResult};
pub use rewards::{ActivityType, RewardBundle};
pub use service::GamificationService;
pub use storage::config::AppConfig;
pub use storage::user_store::UserAccount;
pub use streaks::{Streak, StreakActionResult, StreakStatus, StreakType};
