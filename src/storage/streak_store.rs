//! Streak and freeze log storage.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{RewardError, RewardResult};
use crate::storage::database::{parse_json, parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::streaks::{Streak, StreakFreeze, StreakStatus, StreakType};

const STREAK_COLUMNS: &str = "id, user_id, streak_type, current_count, longest_count, status,
     start_date, last_activity_date, next_activity_deadline, freeze_count, frozen_until,
     total_xp_earned, total_coins_earned, total_gems_earned, milestones_achieved_json,
     created_at, updated_at";

/// Store for per-user streak rows.
pub struct StreakStore<'a> {
    conn: &'a Connection,
}

impl<'a> StreakStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get the user's streak of one type.
    pub fn get(&self, user_id: Uuid, streak_type: StreakType) -> RewardResult<Option<Streak>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM streaks WHERE user_id = ?1 AND streak_type = ?2",
                    STREAK_COLUMNS
                ),
                params![user_id.to_string(), streak_type.as_str()],
                parse_streak_row,
            )
            .optional()
            .map_err(RewardError::from)
    }

    /// All streaks of a user, daily first.
    pub fn list(&self, user_id: Uuid) -> RewardResult<Vec<Streak>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM streaks WHERE user_id = ?1
             ORDER BY CASE streak_type WHEN 'daily' THEN 0 WHEN 'weekly' THEN 1 ELSE 2 END",
            STREAK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id.to_string()], parse_streak_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }

    pub fn insert(&self, streak: &Streak) -> RewardResult<()> {
        let milestones = serde_json::to_string(&streak.milestones_achieved)?;
        self.conn.execute(
            &format!(
                "INSERT INTO streaks ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                STREAK_COLUMNS
            ),
            params![
                streak.id.to_string(),
                streak.user_id.to_string(),
                streak.streak_type.as_str(),
                streak.current_count,
                streak.longest_count,
                streak.status.as_str(),
                streak.start_date.to_rfc3339(),
                streak.last_activity_date.to_rfc3339(),
                streak.next_activity_deadline.map(|t| t.to_rfc3339()),
                streak.freeze_count,
                streak.frozen_until.map(|t| t.to_rfc3339()),
                streak.total_xp_earned,
                streak.total_coins_earned,
                streak.total_gems_earned,
                milestones,
                streak.created_at.to_rfc3339(),
                streak.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Persist the mutable fields of a streak.
    pub fn update(&self, streak: &Streak) -> RewardResult<()> {
        let milestones = serde_json::to_string(&streak.milestones_achieved)?;
        let updated = self.conn.execute(
            "UPDATE streaks SET
             current_count = ?1, longest_count = ?2, status = ?3, start_date = ?4,
             last_activity_date = ?5, next_activity_deadline = ?6, freeze_count = ?7,
             frozen_until = ?8, total_xp_earned = ?9, total_coins_earned = ?10,
             total_gems_earned = ?11, milestones_achieved_json = ?12, updated_at = ?13
             WHERE id = ?14",
            params![
                streak.current_count,
                streak.longest_count,
                streak.status.as_str(),
                streak.start_date.to_rfc3339(),
                streak.last_activity_date.to_rfc3339(),
                streak.next_activity_deadline.map(|t| t.to_rfc3339()),
                streak.freeze_count,
                streak.frozen_until.map(|t| t.to_rfc3339()),
                streak.total_xp_earned,
                streak.total_coins_earned,
                streak.total_gems_earned,
                milestones,
                streak.updated_at.to_rfc3339(),
                streak.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(RewardError::NotFound(format!("streak {}", streak.id)));
        }
        Ok(())
    }

    /// Give every streak the user owns `count` more freeze charges.
    ///
    /// Returns the number of streaks credited.
    pub fn add_freezes_for_user(&self, user_id: Uuid, count: u32) -> RewardResult<usize> {
        if count == 0 {
            return Ok(0);
        }
        let updated = self.conn.execute(
            "UPDATE streaks SET freeze_count = freeze_count + ?1 WHERE user_id = ?2",
            params![count, user_id.to_string()],
        )?;
        Ok(updated)
    }

    /// Append a freeze activation to the audit log.
    pub fn log_freeze(&self, freeze: &StreakFreeze) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO streak_freezes
             (id, user_id, streak_id, freeze_duration_hours, used_at, expires_at, reason)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                freeze.id.to_string(),
                freeze.user_id.to_string(),
                freeze.streak_id.to_string(),
                freeze.freeze_duration_hours,
                freeze.used_at.to_rfc3339(),
                freeze.expires_at.to_rfc3339(),
                freeze.reason,
            ],
        )?;
        Ok(())
    }

    /// Freeze activations for a streak, newest first.
    pub fn freezes(&self, streak_id: Uuid) -> RewardResult<Vec<StreakFreeze>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, streak_id, freeze_duration_hours, used_at, expires_at, reason
             FROM streak_freezes WHERE streak_id = ?1 ORDER BY used_at DESC",
        )?;
        let rows = stmt.query_map(params![streak_id.to_string()], |row| {
            let id: String = row.get(0)?;
            let user_id: String = row.get(1)?;
            let streak_id: String = row.get(2)?;
            let used_at: String = row.get(4)?;
            let expires_at: String = row.get(5)?;
            Ok(StreakFreeze {
                id: parse_uuid(0, &id)?,
                user_id: parse_uuid(1, &user_id)?,
                streak_id: parse_uuid(2, &streak_id)?,
                freeze_duration_hours: row.get(3)?,
                used_at: parse_timestamp(4, &used_at)?,
                expires_at: parse_timestamp(5, &expires_at)?,
                reason: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }
}

fn parse_streak_row(row: &rusqlite::Row) -> rusqlite::Result<Streak> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let type_str: String = row.get(2)?;
    let status_str: String = row.get(5)?;
    let start_date: String = row.get(6)?;
    let last_activity: String = row.get(7)?;
    let milestones: String = row.get(14)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    let streak_type = StreakType::from_str(&type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown streak type '{}'", type_str).into(),
        )
    })?;

    Ok(Streak {
        id: parse_uuid(0, &id)?,
        user_id: parse_uuid(1, &user_id)?,
        streak_type,
        current_count: row.get(3)?,
        longest_count: row.get(4)?,
        status: StreakStatus::from_str(&status_str).unwrap_or_default(),
        start_date: parse_timestamp(6, &start_date)?,
        last_activity_date: parse_timestamp(7, &last_activity)?,
        next_activity_deadline: parse_optional_timestamp(8, row.get(8)?)?,
        freeze_count: row.get(9)?,
        frozen_until: parse_optional_timestamp(10, row.get(10)?)?,
        total_xp_earned: row.get(11)?,
        total_coins_earned: row.get(12)?,
        total_gems_earned: row.get(13)?,
        milestones_achieved: parse_json(14, &milestones)?,
        created_at: parse_timestamp(15, &created_at)?,
        updated_at: parse_timestamp(16, &updated_at)?,
    })
}
