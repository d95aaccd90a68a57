//! XP accrual and level recomputation.

use serde::{Deserialize, Serialize};

use super::types::LevelTable;
use crate::economy::Currency;
use crate::error::{RewardError, RewardResult};
use crate::rewards::{ActivityType, RewardBundle};
use crate::storage::user_store::UserAccount;

/// Levels crossed in one update and what they paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub previous_level: u32,
    pub new_level: u32,
    /// Every level reached, in ascending order
    pub levels: Vec<u32>,
    pub levels_gained: u32,
    /// Sum of the rewards of all crossed levels
    pub rewards: RewardBundle,
}

/// Result of an XP grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpResult {
    pub xp_earned: u64,
    pub total_xp: u64,
    pub level: u32,
    /// Percent progress through the current level band
    pub level_progress: f64,
    /// `None` at the highest level
    pub next_level_xp: Option<u64>,
    pub level_up: Option<LevelUp>,
    /// Achievements unlocked as a consequence of this grant
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    /// Daily challenges this grant completed
    #[serde(default)]
    pub challenges_completed: Vec<String>,
    /// What those challenges paid; already included in the totals above
    #[serde(default)]
    pub challenge_rewards: RewardBundle,
}

/// Snapshot of a user's standing on the level curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLevelProgress {
    pub current_level: u32,
    pub current_xp: u64,
    pub level_progress: f64,
    pub next_level_xp: Option<u64>,
    pub xp_to_next_level: Option<u64>,
    pub total_levels: u32,
    pub unlocked_features: Vec<String>,
}

/// Applies XP to a user against a level table.
///
/// Only touches the in-memory [`UserAccount`]. Streak freeze rewards are
/// reported in [`LevelUp::rewards`] for the caller to apply to the user's
/// streaks.
pub struct LevelEngine<'a> {
    table: &'a LevelTable,
}

impl<'a> LevelEngine<'a> {
    pub fn new(table: &'a LevelTable) -> Self {
        Self { table }
    }

    /// Grant `amount` XP for an activity, then recompute the level.
    ///
    /// Fails with `InvalidArgument` for a non-positive amount, leaving the
    /// account untouched.
    pub fn add_xp(
        &self,
        account: &mut UserAccount,
        amount: i64,
        activity: ActivityType,
    ) -> RewardResult<XpResult> {
        if amount <= 0 {
            return Err(RewardError::InvalidArgument(format!(
                "XP amount must be positive, got {}",
                amount
            )));
        }
        let amount = amount as u64;

        account.xp = account.xp.saturating_add(amount);
        account.count_activity(activity);

        let level_up = self.settle(account);
        let (level_progress, next_level_xp) = self.progress(account.xp, account.level);

        tracing::debug!(
            user_id = %account.id,
            amount,
            activity = %activity,
            total_xp = account.xp,
            "XP granted"
        );

        Ok(XpResult {
            xp_earned: amount,
            total_xp: account.xp,
            level: account.level,
            level_progress,
            next_level_xp,
            level_up,
            achievements_unlocked: Vec::new(),
            challenges_completed: Vec::new(),
            challenge_rewards: RewardBundle::default(),
        })
    }

    /// Bring the cached level in line with the user's XP.
    ///
    /// When the level went up, the coin and gem rewards of every crossed
    /// level are credited to the account and the summary is returned.
    pub fn settle(&self, account: &mut UserAccount) -> Option<LevelUp> {
        let previous_level = account.level;
        let new_level = self.table.level_for_xp(account.xp);
        account.level = new_level;

        if new_level <= previous_level {
            return None;
        }

        let rewards = self.table.rewards_between(previous_level, new_level);
        account.credit(Currency::Coins, rewards.coins);
        account.credit(Currency::Gems, rewards.gems);

        tracing::info!(
            user_id = %account.id,
            previous_level,
            new_level,
            coins = rewards.coins,
            gems = rewards.gems,
            streak_freezes = rewards.streak_freezes,
            "Level up"
        );

        Some(LevelUp {
            previous_level,
            new_level,
            levels: ((previous_level + 1)..=new_level).collect(),
            levels_gained: new_level - previous_level,
            rewards,
        })
    }

    /// Progress percentage within `level` and the XP where the next level starts.
    ///
    /// At the highest level progress is reported as 0.0 with no next level.
    pub fn progress(&self, xp: u64, level: u32) -> (f64, Option<u64>) {
        let (current, next) = match (self.table.get(level), self.table.get(level + 1)) {
            (Some(current), Some(next)) => (current, next),
            _ => return (0.0, None),
        };

        let band = next.min_xp.saturating_sub(current.min_xp);
        if band == 0 {
            return (0.0, Some(next.min_xp));
        }

        let into_band = xp.saturating_sub(current.min_xp).min(band);
        (into_band as f64 / band as f64 * 100.0, Some(next.min_xp))
    }

    pub fn user_progress(&self, account: &UserAccount) -> UserLevelProgress {
        let (level_progress, next_level_xp) = self.progress(account.xp, account.level);

        UserLevelProgress {
            current_level: account.level,
            current_xp: account.xp,
            level_progress,
            next_level_xp,
            xp_to_next_level: next_level_xp.map(|next| next.saturating_sub(account.xp)),
            total_levels: self.table.max_level(),
            unlocked_features: self.table.features_through(account.level),
        }
    }
}
