//! Default streak milestone rewards.

use super::types::{StreakReward, StreakType};

/// Milestone rewards seeded into a fresh database.
pub fn default_streak_rewards() -> Vec<StreakReward> {
    vec![
        // Daily
        StreakReward::new(StreakType::Daily, 3).with_currency(100, 25, 0),
        StreakReward::new(StreakType::Daily, 7)
            .with_currency(500, 0, 1)
            .with_title("Week Warrior")
            .with_achievement("streak_7"),
        StreakReward::new(StreakType::Daily, 14)
            .with_currency(1000, 200, 2)
            .with_power_up("streak_shield"),
        StreakReward::new(StreakType::Daily, 30)
            .with_currency(2500, 500, 5)
            .with_title("Monthly Champion")
            .with_achievement("streak_30"),
        StreakReward::new(StreakType::Daily, 100)
            .with_currency(10000, 2000, 20)
            .with_title("Centurion")
            .with_bonus(1.5, 1.5, 48),
        // Weekly
        StreakReward::new(StreakType::Weekly, 4).with_currency(400, 100, 1),
        StreakReward::new(StreakType::Weekly, 12)
            .with_currency(1500, 300, 3)
            .with_power_up("double_points"),
        StreakReward::new(StreakType::Weekly, 52)
            .with_currency(8000, 1500, 15)
            .with_title("Year-Round Learner"),
        // Monthly
        StreakReward::new(StreakType::Monthly, 3).with_currency(1000, 250, 2),
        StreakReward::new(StreakType::Monthly, 6)
            .with_currency(2500, 500, 5)
            .with_power_up("extra_time"),
        StreakReward::new(StreakType::Monthly, 12)
            .with_currency(6000, 1200, 12)
            .with_title("Dedicated Scholar")
            .with_bonus(2.0, 1.5, 72),
    ]
}
