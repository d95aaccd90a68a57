//! User aggregate storage.
//!
//! The user row carries the balances every engine mutates: XP, cached level,
//! coins, gems, the legacy login streak and the activity counters.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::economy::{Balance, Currency};
use crate::error::{RewardError, RewardResult};
use crate::rewards::ActivityType;
use crate::storage::database::{parse_timestamp, parse_uuid};

/// The user aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    /// Total experience, only ever increases
    pub xp: u64,
    /// Cached level implied by `xp`
    pub level: u32,
    pub coins: u64,
    pub gems: u64,
    /// Legacy consecutive-login counter
    pub daily_streak: u32,
    pub last_login: DateTime<Utc>,
    pub total_searches: u32,
    pub total_quizzes_taken: u32,
    pub total_innovations: u32,
    pub total_earned_coins: u64,
    pub total_earned_gems: u64,
    pub total_spent_coins: u64,
    pub total_spent_gems: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a level 1 user with the given starting balances.
    pub fn new(username: impl Into<String>, coins: u64, gems: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            xp: 0,
            level: 1,
            coins,
            gems,
            daily_streak: 0,
            last_login: now,
            total_searches: 0,
            total_quizzes_taken: 0,
            total_innovations: 0,
            total_earned_coins: 0,
            total_earned_gems: 0,
            total_spent_coins: 0,
            total_spent_gems: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn balance_of(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Coins => self.coins,
            Currency::Gems => self.gems,
        }
    }

    /// Add currency and count it towards lifetime earnings.
    pub fn credit(&mut self, currency: Currency, amount: u64) {
        match currency {
            Currency::Coins => {
                self.coins += amount;
                self.total_earned_coins += amount;
            }
            Currency::Gems => {
                self.gems += amount;
                self.total_earned_gems += amount;
            }
        }
    }

    /// Remove currency, failing without mutation when the balance is too low.
    pub fn debit(&mut self, currency: Currency, amount: u64) -> RewardResult<()> {
        let available = self.balance_of(currency);
        if available < amount {
            return Err(RewardError::insufficient(currency.as_str(), amount, available));
        }

        match currency {
            Currency::Coins => {
                self.coins -= amount;
                self.total_spent_coins += amount;
            }
            Currency::Gems => {
                self.gems -= amount;
                self.total_spent_gems += amount;
            }
        }
        Ok(())
    }

    /// Bump the counter that tracks the given activity, if it has one.
    pub fn count_activity(&mut self, activity: ActivityType) {
        match activity {
            ActivityType::Search => self.total_searches += 1,
            ActivityType::Quiz => self.total_quizzes_taken += 1,
            ActivityType::Innovation => self.total_innovations += 1,
            ActivityType::General
            | ActivityType::Research
            | ActivityType::DailyStreak
            | ActivityType::Achievement => {}
        }
    }

    pub fn balance(&self) -> Balance {
        Balance {
            coins: self.coins,
            gems: self.gems,
            total_earned_coins: self.total_earned_coins,
            total_earned_gems: self.total_earned_gems,
            total_spent_coins: self.total_spent_coins,
            total_spent_gems: self.total_spent_gems,
        }
    }
}

const USER_COLUMNS: &str = "id, username, xp, level, coins, gems, daily_streak, last_login,
     total_searches, total_quizzes_taken, total_innovations,
     total_earned_coins, total_earned_gems, total_spent_coins, total_spent_gems,
     created_at, updated_at";

/// Store for user rows.
pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new user.
    pub fn insert(&self, user: &UserAccount) -> RewardResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                USER_COLUMNS
            ),
            params![
                user.id.to_string(),
                user.username,
                user.xp,
                user.level,
                user.coins,
                user.gems,
                user.daily_streak,
                user.last_login.to_rfc3339(),
                user.total_searches,
                user.total_quizzes_taken,
                user.total_innovations,
                user.total_earned_coins,
                user.total_earned_gems,
                user.total_spent_coins,
                user.total_spent_gems,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get(&self, id: Uuid) -> RewardResult<Option<UserAccount>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![id.to_string()],
                parse_user_row,
            )
            .optional()
            .map_err(RewardError::from)
    }

    /// Get a user by ID, failing with `NotFound` when absent.
    pub fn require(&self, id: Uuid) -> RewardResult<UserAccount> {
        self.get(id)?
            .ok_or_else(|| RewardError::NotFound(format!("user {}", id)))
    }

    /// Get a user by username.
    pub fn get_by_username(&self, username: &str) -> RewardResult<Option<UserAccount>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                parse_user_row,
            )
            .optional()
            .map_err(RewardError::from)
    }

    /// Persist every mutable field of the user.
    pub fn update(&self, user: &UserAccount) -> RewardResult<()> {
        let updated = self.conn.execute(
            "UPDATE users SET
             xp = ?1, level = ?2, coins = ?3, gems = ?4, daily_streak = ?5, last_login = ?6,
             total_searches = ?7, total_quizzes_taken = ?8, total_innovations = ?9,
             total_earned_coins = ?10, total_earned_gems = ?11,
             total_spent_coins = ?12, total_spent_gems = ?13, updated_at = ?14
             WHERE id = ?15",
            params![
                user.xp,
                user.level,
                user.coins,
                user.gems,
                user.daily_streak,
                user.last_login.to_rfc3339(),
                user.total_searches,
                user.total_quizzes_taken,
                user.total_innovations,
                user.total_earned_coins,
                user.total_earned_gems,
                user.total_spent_coins,
                user.total_spent_gems,
                user.updated_at.to_rfc3339(),
                user.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(RewardError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserAccount> {
    let id_str: String = row.get(0)?;
    let last_login_str: String = row.get(7)?;
    let created_at_str: String = row.get(15)?;
    let updated_at_str: String = row.get(16)?;

    Ok(UserAccount {
        id: parse_uuid(0, &id_str)?,
        username: row.get(1)?,
        xp: row.get(2)?,
        level: row.get(3)?,
        coins: row.get(4)?,
        gems: row.get(5)?,
        daily_streak: row.get(6)?,
        last_login: parse_timestamp(7, &last_login_str)?,
        total_searches: row.get(8)?,
        total_quizzes_taken: row.get(9)?,
        total_innovations: row.get(10)?,
        total_earned_coins: row.get(11)?,
        total_earned_gems: row.get(12)?,
        total_spent_coins: row.get(13)?,
        total_spent_gems: row.get(14)?,
        created_at: parse_timestamp(15, &created_at_str)?,
        updated_at: parse_timestamp(16, &updated_at_str)?,
    })
}
