//! Legacy consecutive-login counter kept on the user row.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::levels::LevelUp;
use crate::storage::user_store::UserAccount;

/// XP per day of login streak.
pub const LOGIN_XP_PER_DAY: u64 = 10;
/// Coins per day of login streak.
pub const LOGIN_COINS_PER_DAY: u64 = 5;

/// Result of recording a login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginStreakResult {
    pub daily_streak: u32,
    pub streak_updated: bool,
    pub streak_bonus_xp: u64,
    pub streak_bonus_coins: u64,
    /// XP the next consecutive login would pay
    pub next_streak_bonus: u64,
    pub level_up: Option<LevelUp>,
}

/// Advance the login counter for a login at `now`.
///
/// Compares calendar days (UTC): a login the day after the last one extends
/// the streak, a later one restarts it at 1, a second login on the same day
/// changes nothing. `last_login` is always moved to `now`. Returns true when
/// the counter changed.
pub fn advance_login_streak(account: &mut UserAccount, now: DateTime<Utc>) -> bool {
    let today = now.date_naive();
    let last = account.last_login.date_naive();

    let updated = if last >= today {
        false
    } else if last == today - Duration::days(1) {
        account.daily_streak += 1;
        true
    } else {
        account.daily_streak = 1;
        true
    };

    account.last_login = now;
    account.updated_at = now;
    updated
}
