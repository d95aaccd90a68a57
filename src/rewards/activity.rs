//! Activity tags and the deterministic per-activity reward rules.

use serde::{Deserialize, Serialize};

use crate::levels::XpResult;

/// Kind of learning activity that produced XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    General,
    Search,
    Quiz,
    Innovation,
    Research,
    DailyStreak,
    Achievement,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::General => "general",
            ActivityType::Search => "search",
            ActivityType::Quiz => "quiz",
            ActivityType::Innovation => "innovation",
            ActivityType::Research => "research",
            ActivityType::DailyStreak => "daily_streak",
            ActivityType::Achievement => "achievement",
        }
    }

    /// Parse an activity tag. Unknown tags return `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "general" => Some(ActivityType::General),
            "search" => Some(ActivityType::Search),
            "quiz" => Some(ActivityType::Quiz),
            "innovation" => Some(ActivityType::Innovation),
            "research" => Some(ActivityType::Research),
            "daily_streak" => Some(ActivityType::DailyStreak),
            "achievement" => Some(ActivityType::Achievement),
            _ => None,
        }
    }

    /// XP and coin multipliers applied on top of the performance bonus.
    fn multipliers(&self) -> (f64, f64) {
        match self {
            ActivityType::Quiz => (1.2, 1.1),
            ActivityType::Innovation => (1.5, 1.3),
            ActivityType::Research => (1.3, 1.2),
            ActivityType::DailyStreak => (2.0, 1.5),
            ActivityType::Achievement => (1.8, 1.4),
            ActivityType::General | ActivityType::Search => (1.0, 1.0),
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rewards computed for a single completed activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRewards {
    pub xp_reward: u64,
    pub coin_reward: u64,
    pub gem_reward: u64,
    pub performance_score: f64,
    pub activity_type: ActivityType,
}

/// A scored activity and what granting its rewards did to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCompletion {
    pub rewards: ActivityRewards,
    /// `None` when the score earned no XP
    pub xp: Option<XpResult>,
}

/// Compute the rewards for an activity given a base XP value and a performance
/// score in `[0, 1]` (values outside the range are clamped).
pub fn calculate_rewards(activity: ActivityType, base_xp: u64, performance: f64) -> ActivityRewards {
    let performance = if performance.is_nan() {
        0.0
    } else {
        performance.clamp(0.0, 1.0)
    };
    let base = base_xp as f64;

    let mut xp = (base * performance).floor();
    let mut coins = (base * 0.5 * performance).floor();
    let mut gems = 0;

    if performance >= 0.9 {
        xp = (xp * 1.5).floor();
        coins = (coins * 1.5).floor();
        gems = 1;
    } else if performance >= 0.8 {
        xp = (xp * 1.25).floor();
        coins = (coins * 1.25).floor();
    }

    let (xp_mult, coin_mult) = activity.multipliers();
    xp = (xp * xp_mult).floor();
    coins = (coins * coin_mult).floor();

    ActivityRewards {
        xp_reward: xp as u64,
        coin_reward: coins as u64,
        gem_reward: gems,
        performance_score: performance,
        activity_type: activity,
    }
}

/// Bonus granted for holding a login streak of `streak_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakBonus {
    pub xp_bonus: u64,
    pub coin_bonus: u64,
    pub gem_bonus: u64,
    pub multiplier: f64,
    pub streak_days: u32,
}

/// Compute the login streak bonus for a streak length.
pub fn streak_bonus(streak_days: u32) -> StreakBonus {
    let multiplier = match streak_days {
        d if d >= 30 => 3.0,
        d if d >= 14 => 2.0,
        d if d >= 7 => 1.5,
        _ => 1.0,
    };

    let days = streak_days as f64;
    StreakBonus {
        xp_bonus: (days * 10.0 * multiplier).floor() as u64,
        coin_bonus: (days * 5.0 * multiplier).floor() as u64,
        gem_bonus: if streak_days >= 7 { 1 } else { 0 },
        multiplier,
        streak_days,
    }
}
