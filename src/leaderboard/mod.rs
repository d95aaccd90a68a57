//! User rankings.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RewardError, RewardResult};
use crate::storage::database::parse_uuid;

/// Statistic users are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardCategory {
    #[default]
    Xp,
    Coins,
    Level,
    /// Legacy daily login streak
    Streak,
}

impl LeaderboardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardCategory::Xp => "xp",
            LeaderboardCategory::Coins => "coins",
            LeaderboardCategory::Level => "level",
            LeaderboardCategory::Streak => "streak",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "xp" => Some(LeaderboardCategory::Xp),
            "coins" => Some(LeaderboardCategory::Coins),
            "level" => Some(LeaderboardCategory::Level),
            "streak" => Some(LeaderboardCategory::Streak),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            LeaderboardCategory::Xp => "xp",
            LeaderboardCategory::Coins => "coins",
            LeaderboardCategory::Level => "level",
            LeaderboardCategory::Streak => "daily_streak",
        }
    }
}

/// Leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub username: String,
    pub level: u32,
    /// Value of the ranked statistic
    pub score: u64,
}

/// Leaderboard queries over the user table.
pub struct LeaderboardService<'a> {
    conn: &'a Connection,
}

impl<'a> LeaderboardService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Top `limit` users by `category`, ranked from 1.
    ///
    /// Ties are broken by XP, then by username.
    pub fn top(&self, category: LeaderboardCategory, limit: u32) -> RewardResult<Vec<LeaderboardEntry>> {
        let column = category.column();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, username, level, {column} FROM users
             ORDER BY {column} DESC, xp DESC, username ASC
             LIMIT ?1"
        ))?;

        let rows = stmt.query_map(params![limit], |row| {
            let id: String = row.get(0)?;
            Ok((parse_uuid(0, &id)?, row.get::<_, String>(1)?, row.get::<_, u32>(2)?, row.get::<_, u64>(3)?))
        })?;

        let mut entries = Vec::new();
        for (idx, row) in rows.enumerate() {
            let (user_id, username, level, score) = row.map_err(RewardError::from)?;
            entries.push(LeaderboardEntry {
                rank: idx as u32 + 1,
                user_id,
                username,
                level,
                score,
            });
        }

        Ok(entries)
    }
}
