//! Achievement definitions and unlock criteria.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::user_store::UserAccount;

/// Achievement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Learning,
    Consistency,
    Quiz,
    Research,
    Innovation,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Learning => "learning",
            AchievementCategory::Consistency => "consistency",
            AchievementCategory::Quiz => "quiz",
            AchievementCategory::Research => "research",
            AchievementCategory::Innovation => "innovation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "learning" => Some(AchievementCategory::Learning),
            "consistency" => Some(AchievementCategory::Consistency),
            "quiz" => Some(AchievementCategory::Quiz),
            "research" => Some(AchievementCategory::Research),
            "innovation" => Some(AchievementCategory::Innovation),
            _ => None,
        }
    }
}

/// How rare an achievement is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// Statistic an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaType {
    TotalXp,
    DailyStreak,
    QuizzesTaken,
    Searches,
    Innovations,
}

impl CriteriaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriteriaType::TotalXp => "total_xp",
            CriteriaType::DailyStreak => "daily_streak",
            CriteriaType::QuizzesTaken => "quizzes_taken",
            CriteriaType::Searches => "searches",
            CriteriaType::Innovations => "innovations",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "total_xp" => Some(CriteriaType::TotalXp),
            "daily_streak" => Some(CriteriaType::DailyStreak),
            "quizzes_taken" => Some(CriteriaType::QuizzesTaken),
            "searches" => Some(CriteriaType::Searches),
            "innovations" => Some(CriteriaType::Innovations),
            _ => None,
        }
    }
}

/// Achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub rarity: Rarity,
    pub criteria_type: CriteriaType,
    pub criteria_value: u64,
}

impl Achievement {
    /// Whether the stats satisfy this achievement.
    pub fn is_met(&self, stats: &UserStats) -> bool {
        let value = match self.criteria_type {
            CriteriaType::TotalXp => stats.total_xp,
            CriteriaType::DailyStreak => stats.daily_streak as u64,
            CriteriaType::QuizzesTaken => stats.total_quizzes_taken as u64,
            CriteriaType::Searches => stats.total_searches as u64,
            CriteriaType::Innovations => stats.total_innovations as u64,
        };
        value >= self.criteria_value
    }
}

/// An achievement as seen by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// A title a user has earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTitle {
    pub title: String,
    pub unlocked_at: DateTime<Utc>,
}

/// User statistics checked against achievement criteria.
#[derive(Debug, Clone, Default)]
pub struct UserStats {
    pub total_xp: u64,
    /// Best of the legacy login streak and the tracked daily streak
    pub daily_streak: u32,
    pub total_quizzes_taken: u32,
    pub total_searches: u32,
    pub total_innovations: u32,
}

impl UserStats {
    pub fn from_account(account: &UserAccount, daily_streak_count: u32) -> Self {
        Self {
            total_xp: account.xp,
            daily_streak: account.daily_streak.max(daily_streak_count),
            total_quizzes_taken: account.total_quizzes_taken,
            total_searches: account.total_searches,
            total_innovations: account.total_innovations,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn achievement(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    category: AchievementCategory,
    rarity: Rarity,
    criteria_type: CriteriaType,
    criteria_value: u64,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        category,
        rarity,
        criteria_type,
        criteria_value,
    }
}

/// Achievements seeded into a fresh database.
pub fn default_achievements() -> Vec<Achievement> {
    use AchievementCategory as Cat;

    vec![
        achievement("xp_1000", "Knowledge Seeker", "Earn 1000 XP", "📚", Cat::Learning, Rarity::Common, CriteriaType::TotalXp, 1000),
        achievement("xp_5000", "Knowledge Master", "Earn 5000 XP", "🎓", Cat::Learning, Rarity::Rare, CriteriaType::TotalXp, 5000),
        achievement("streak_7", "Week Warrior", "Maintain a 7-day streak", "🔥", Cat::Consistency, Rarity::Rare, CriteriaType::DailyStreak, 7),
        achievement("streak_30", "Monthly Champion", "Maintain a 30-day streak", "🏆", Cat::Consistency, Rarity::Epic, CriteriaType::DailyStreak, 30),
        achievement("quiz_10", "Quiz Enthusiast", "Complete 10 quizzes", "📝", Cat::Quiz, Rarity::Common, CriteriaType::QuizzesTaken, 10),
        achievement("search_50", "Research Explorer", "Perform 50 searches", "🔍", Cat::Research, Rarity::Common, CriteriaType::Searches, 50),
        achievement("innovation_5", "Innovation Pioneer", "Create 5 innovations", "💡", Cat::Innovation, Rarity::Rare, CriteriaType::Innovations, 5),
    ]
}
