//! Streak type definitions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::levels::LevelUp;
use crate::rewards::{RewardBundle, RewardSource};

/// Cadence of a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakType {
    Daily,
    Weekly,
    Monthly,
}

impl StreakType {
    pub const ALL: [StreakType; 3] = [StreakType::Daily, StreakType::Weekly, StreakType::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakType::Daily => "daily",
            StreakType::Weekly => "weekly",
            StreakType::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(StreakType::Daily),
            "weekly" => Some(StreakType::Weekly),
            "monthly" => Some(StreakType::Monthly),
            _ => None,
        }
    }

    /// Time allowed between activities before the streak expires.
    pub fn period(&self) -> Duration {
        match self {
            StreakType::Daily => Duration::days(1),
            StreakType::Weekly => Duration::weeks(1),
            StreakType::Monthly => Duration::days(30),
        }
    }
}

impl std::fmt::Display for StreakType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streak lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakStatus {
    #[default]
    Active,
    /// A freeze is holding off expiry
    Frozen,
    Broken,
    /// Reserved; never entered by the engine
    Paused,
}

impl StreakStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakStatus::Active => "active",
            StreakStatus::Frozen => "frozen",
            StreakStatus::Broken => "broken",
            StreakStatus::Paused => "paused",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(StreakStatus::Active),
            "frozen" => Some(StreakStatus::Frozen),
            "broken" => Some(StreakStatus::Broken),
            "paused" => Some(StreakStatus::Paused),
            _ => None,
        }
    }
}

/// A user's streak of one cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub id: Uuid,
    pub user_id: Uuid,
    pub streak_type: StreakType,
    pub current_count: u32,
    /// Highest `current_count` ever reached
    pub longest_count: u32,
    pub status: StreakStatus,
    pub start_date: DateTime<Utc>,
    pub last_activity_date: DateTime<Utc>,
    pub next_activity_deadline: Option<DateTime<Utc>>,
    /// Available freeze charges
    pub freeze_count: u32,
    pub frozen_until: Option<DateTime<Utc>>,
    pub total_xp_earned: u64,
    pub total_coins_earned: u64,
    pub total_gems_earned: u64,
    /// Ids of streak rewards already granted. Never cleared, also not on break.
    pub milestones_achieved: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Streak {
    /// Whether the deadline has passed at `now`.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.next_activity_deadline
            .map(|deadline| now > deadline)
            .unwrap_or(false)
    }

    pub fn has_achieved(&self, reward_id: i64) -> bool {
        self.milestones_achieved.contains(&reward_id)
    }
}

/// Milestone payout for a streak type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakReward {
    pub id: i64,
    pub streak_type: StreakType,
    /// Streak count that unlocks the reward
    pub milestone: u32,
    pub xp_reward: u64,
    pub coin_reward: u64,
    pub gem_reward: u64,
    pub power_up_id: Option<String>,
    pub achievement_id: Option<String>,
    pub title_reward: Option<String>,
    pub xp_multiplier: f64,
    pub coin_multiplier: f64,
    pub bonus_duration_hours: u32,
    pub is_active: bool,
}

impl StreakReward {
    /// A plain XP/coin/gem payout; `id` is assigned by the store on insert.
    pub fn new(streak_type: StreakType, milestone: u32) -> Self {
        Self {
            id: 0,
            streak_type,
            milestone,
            xp_reward: 0,
            coin_reward: 0,
            gem_reward: 0,
            power_up_id: None,
            achievement_id: None,
            title_reward: None,
            xp_multiplier: 1.0,
            coin_multiplier: 1.0,
            bonus_duration_hours: 0,
            is_active: true,
        }
    }

    pub fn with_currency(mut self, xp: u64, coins: u64, gems: u64) -> Self {
        self.xp_reward = xp;
        self.coin_reward = coins;
        self.gem_reward = gems;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title_reward = Some(title.to_string());
        self
    }

    pub fn with_achievement(mut self, achievement_id: &str) -> Self {
        self.achievement_id = Some(achievement_id.to_string());
        self
    }

    pub fn with_power_up(mut self, power_up_id: &str) -> Self {
        self.power_up_id = Some(power_up_id.to_string());
        self
    }

    pub fn with_bonus(mut self, xp_multiplier: f64, coin_multiplier: f64, hours: u32) -> Self {
        self.xp_multiplier = xp_multiplier;
        self.coin_multiplier = coin_multiplier;
        self.bonus_duration_hours = hours;
        self
    }
}

impl RewardSource for StreakReward {
    fn xp(&self) -> u64 {
        self.xp_reward
    }

    fn coins(&self) -> u64 {
        self.coin_reward
    }

    fn gems(&self) -> u64 {
        self.gem_reward
    }

    fn achievement(&self) -> Option<&str> {
        self.achievement_id.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title_reward.as_deref()
    }

    fn power_up(&self) -> Option<&str> {
        self.power_up_id.as_deref()
    }
}

/// Audit record of a freeze activation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakFreeze {
    pub id: Uuid,
    pub user_id: Uuid,
    pub streak_id: Uuid,
    pub freeze_duration_hours: u32,
    pub used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Result of recording streak activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakActionResult {
    pub success: bool,
    pub message: String,
    pub streak_updated: bool,
    pub new_count: u32,
    pub rewards_earned: RewardBundle,
    pub next_milestone: Option<u32>,
    pub time_until_next_deadline: Option<String>,
    /// Present when milestone XP pushed the user over a level threshold
    pub level_up: Option<LevelUp>,
}

/// Result of activating a freeze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeResult {
    pub success: bool,
    pub message: String,
    pub freeze_expires_at: DateTime<Utc>,
    pub remaining_freezes: u32,
}

/// A streak reward as seen by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakRewardStatus {
    #[serde(flatten)]
    pub reward: StreakReward,
    pub is_achieved: bool,
}

/// Format the time left until `deadline` as `"{hours}h {minutes}m"`.
///
/// A deadline already in the past formats as `"0h 0m"`.
pub fn format_countdown(now: DateTime<Utc>, deadline: DateTime<Utc>) -> String {
    let seconds = (deadline - now).num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}
