//! Power-up catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a power-up applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpCategory {
    Quiz,
    General,
}

impl PowerUpCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpCategory::Quiz => "quiz",
            PowerUpCategory::General => "general",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "quiz" => Some(PowerUpCategory::Quiz),
            "general" => Some(PowerUpCategory::General),
            _ => None,
        }
    }
}

/// What a power-up does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    TimeMultiplier,
    SkipQuestion,
    ScoreMultiplier,
    Hint,
    /// Streak protection
    Protection,
}

impl EffectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectType::TimeMultiplier => "time_multiplier",
            EffectType::SkipQuestion => "skip_question",
            EffectType::ScoreMultiplier => "score_multiplier",
            EffectType::Hint => "hint",
            EffectType::Protection => "protection",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "time_multiplier" => Some(EffectType::TimeMultiplier),
            "skip_question" => Some(EffectType::SkipQuestion),
            "score_multiplier" => Some(EffectType::ScoreMultiplier),
            "hint" => Some(EffectType::Hint),
            "protection" => Some(EffectType::Protection),
            _ => None,
        }
    }
}

/// Power-up definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: PowerUpCategory,
    pub effect_type: EffectType,
    pub effect_value: f64,
    /// Effect duration in seconds, 0 for instant effects
    pub duration_secs: u32,
    /// Price per use; both currencies are charged
    pub cost_coins: u64,
    pub cost_gems: u64,
    pub max_uses_per_day: u32,
}

/// Per-user usage of one power-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpUsage {
    pub user_id: Uuid,
    pub power_up_id: String,
    pub uses_today: u32,
    pub last_used: Option<DateTime<Utc>>,
    /// Free uses granted by streak milestones
    pub bonus_charges: u32,
}

impl PowerUpUsage {
    pub fn new(user_id: Uuid, power_up_id: &str) -> Self {
        Self {
            user_id,
            power_up_id: power_up_id.to_string(),
            uses_today: 0,
            last_used: None,
            bonus_charges: 0,
        }
    }

    /// Uses counted against the limit on the calendar day of `now`.
    pub fn uses_on(&self, now: DateTime<Utc>) -> u32 {
        match self.last_used {
            Some(last) if last.date_naive() == now.date_naive() => self.uses_today,
            _ => 0,
        }
    }
}

/// A power-up as seen by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpStatus {
    #[serde(flatten)]
    pub power_up: PowerUp,
    pub uses_today: u32,
    pub bonus_charges: u32,
    pub can_use: bool,
}

/// Outcome of using a power-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpActivation {
    pub power_up_id: String,
    pub effect_type: EffectType,
    pub effect_value: f64,
    pub duration_secs: u32,
    /// True when a bonus charge paid for this use
    pub used_bonus_charge: bool,
    pub coins_spent: u64,
    pub gems_spent: u64,
    pub remaining_uses: u32,
    pub remaining_bonus_charges: u32,
}

#[allow(clippy::too_many_arguments)]
fn power_up(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    category: PowerUpCategory,
    effect_type: EffectType,
    effect_value: f64,
    duration_secs: u32,
    cost: (u64, u64),
    max_uses_per_day: u32,
) -> PowerUp {
    PowerUp {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        category,
        effect_type,
        effect_value,
        duration_secs,
        cost_coins: cost.0,
        cost_gems: cost.1,
        max_uses_per_day,
    }
}

/// Power-ups seeded into a fresh database.
pub fn default_power_ups() -> Vec<PowerUp> {
    use EffectType as E;
    use PowerUpCategory as C;

    vec![
        power_up("extra_time", "Extra Time", "Get 50% more time for your next quiz", "⏰", C::Quiz, E::TimeMultiplier, 1.5, 0, (50, 2), 3),
        power_up("skip_question", "Skip Question", "Skip one question without penalty", "⏭️", C::Quiz, E::SkipQuestion, 1.0, 0, (75, 3), 2),
        power_up("double_points", "Double Points", "Double points for your next correct answer", "✨", C::Quiz, E::ScoreMultiplier, 2.0, 0, (100, 5), 1),
        power_up("hint", "Hint", "Get a hint for the current question", "💡", C::Quiz, E::Hint, 1.0, 0, (25, 1), 5),
        power_up("streak_shield", "Streak Shield", "Protect your daily streak for 24 hours", "🛡️", C::General, E::Protection, 1.0, 86_400, (150, 5), 1),
    ]
}
