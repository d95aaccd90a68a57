//! Achievement and title management.
//!
//! Tracks the achievement catalog, criteria checking, and unlocks.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use uuid::Uuid;

use super::types::{
    Achievement, AchievementCategory, AchievementStatus, CriteriaType, Rarity, UserStats, UserTitle,
};
use crate::error::{RewardError, RewardResult};
use crate::storage::database::parse_timestamp;

/// Achievement manager.
pub struct AchievementManager<'a> {
    conn: &'a Connection,
}

impl<'a> AchievementManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert achievements that are not in the catalog yet.
    pub fn seed(&self, achievements: &[Achievement]) -> RewardResult<usize> {
        let mut inserted = 0;
        for achievement in achievements {
            inserted += self.conn.execute(
                "INSERT OR IGNORE INTO achievements
                 (id, name, description, icon, category, rarity, criteria_type, criteria_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    achievement.id,
                    achievement.name,
                    achievement.description,
                    achievement.icon,
                    achievement.category.as_str(),
                    achievement.rarity.as_str(),
                    achievement.criteria_type.as_str(),
                    achievement.criteria_value,
                ],
            )?;
        }
        Ok(inserted)
    }

    /// Get all achievements in the catalog.
    pub fn all(&self) -> RewardResult<Vec<Achievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, icon, category, rarity, criteria_type, criteria_value
             FROM achievements ORDER BY criteria_type, criteria_value, id",
        )?;

        let rows = stmt.query_map([], |row| {
            let category: String = row.get(4)?;
            let rarity: String = row.get(5)?;
            let criteria: String = row.get(6)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                category,
                rarity,
                criteria,
                row.get::<_, u64>(7)?,
            ))
        })?;

        let mut achievements = Vec::new();
        for row in rows {
            let (id, name, description, icon, category, rarity, criteria, criteria_value) = row?;
            let criteria_type = CriteriaType::from_str(&criteria).ok_or_else(|| {
                RewardError::Config(format!(
                    "achievement '{}' has unknown criteria '{}'",
                    id, criteria
                ))
            })?;

            achievements.push(Achievement {
                id,
                name,
                description,
                icon,
                category: AchievementCategory::from_str(&category)
                    .unwrap_or(AchievementCategory::Learning),
                rarity: Rarity::from_str(&rarity).unwrap_or(Rarity::Common),
                criteria_type,
                criteria_value,
            });
        }

        Ok(achievements)
    }

    /// Unlock times of the user's achievements, keyed by achievement id.
    pub fn unlocked(&self, user_id: Uuid) -> RewardResult<HashMap<String, DateTime<Utc>>> {
        let mut stmt = self.conn.prepare(
            "SELECT achievement_id, unlocked_at FROM user_achievements WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let id: String = row.get(0)?;
            let unlocked_at: String = row.get(1)?;
            Ok((id, parse_timestamp(1, &unlocked_at)?))
        })?;
        rows.collect::<Result<HashMap<_, _>, _>>().map_err(RewardError::from)
    }

    /// Unlock an achievement by id.
    ///
    /// Returns false when the user already had it.
    pub fn unlock(&self, user_id: Uuid, achievement_id: &str, now: DateTime<Utc>) -> RewardResult<bool> {
        let known: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM achievements WHERE id = ?1",
            params![achievement_id],
            |row| row.get(0),
        )?;
        if known == 0 {
            return Err(RewardError::NotFound(format!("achievement '{}'", achievement_id)));
        }

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, unlocked_at)
             VALUES (?1, ?2, ?3)",
            params![user_id.to_string(), achievement_id, now.to_rfc3339()],
        )?;

        if inserted > 0 {
            tracing::info!(user_id = %user_id, achievement_id, "Achievement unlocked");
        }
        Ok(inserted > 0)
    }

    /// Check and unlock achievements whose criteria the stats now satisfy.
    ///
    /// Returns only the achievements unlocked by this call.
    pub fn check_and_unlock(
        &self,
        user_id: Uuid,
        stats: &UserStats,
        now: DateTime<Utc>,
    ) -> RewardResult<Vec<Achievement>> {
        let unlocked = self.unlocked(user_id)?;
        let mut newly_unlocked = Vec::new();

        for achievement in self.all()? {
            if unlocked.contains_key(&achievement.id) || !achievement.is_met(stats) {
                continue;
            }
            if self.unlock(user_id, &achievement.id, now)? {
                newly_unlocked.push(achievement);
            }
        }

        Ok(newly_unlocked)
    }

    /// The whole catalog with the user's unlock state.
    pub fn list_for_user(&self, user_id: Uuid) -> RewardResult<Vec<AchievementStatus>> {
        let unlocked = self.unlocked(user_id)?;
        Ok(self
            .all()?
            .into_iter()
            .map(|achievement| {
                let unlocked_at = unlocked.get(&achievement.id).copied();
                AchievementStatus {
                    achievement,
                    unlocked: unlocked_at.is_some(),
                    unlocked_at,
                }
            })
            .collect())
    }

    /// Grant a title. Returns false when the user already holds it.
    pub fn grant_title(&self, user_id: Uuid, title: &str, now: DateTime<Utc>) -> RewardResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_titles (user_id, title, unlocked_at) VALUES (?1, ?2, ?3)",
            params![user_id.to_string(), title, now.to_rfc3339()],
        )?;

        if inserted > 0 {
            tracing::info!(user_id = %user_id, title, "Title granted");
        }
        Ok(inserted > 0)
    }

    /// Titles held by the user, oldest first.
    pub fn titles(&self, user_id: Uuid) -> RewardResult<Vec<UserTitle>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, unlocked_at FROM user_titles WHERE user_id = ?1 ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let unlocked_at: String = row.get(1)?;
            Ok(UserTitle {
                title: row.get(0)?,
                unlocked_at: parse_timestamp(1, &unlocked_at)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }
}
