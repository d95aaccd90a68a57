//! Read-only reward configuration: the level table and streak milestone rewards.
//!
//! Rows are seeded once and loaded into a [`Catalog`] that the engines borrow,
//! so neither engine reaches into the database for configuration.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{RewardError, RewardResult};
use crate::levels::{Level, LevelTable};
use crate::storage::database::parse_json;
use crate::streaks::{StreakReward, StreakType};

/// Configuration loaded at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub levels: LevelTable,
    /// Every configured milestone reward, active or not
    pub streak_rewards: Vec<StreakReward>,
}

impl Catalog {
    /// Active milestone rewards of one streak type, ascending by milestone.
    pub fn streak_rewards_for(&self, streak_type: StreakType) -> Vec<&StreakReward> {
        let mut rewards: Vec<&StreakReward> = self
            .streak_rewards
            .iter()
            .filter(|r| r.is_active && r.streak_type == streak_type)
            .collect();
        rewards.sort_by_key(|r| r.milestone);
        rewards
    }
}

/// Store for the configuration tables.
pub struct CatalogStore<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Write the level table unless one is already stored.
    ///
    /// Returns true when rows were written.
    pub fn seed_levels(&self, table: &LevelTable) -> RewardResult<bool> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM levels", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(false);
        }

        for level in table.levels() {
            self.conn.execute(
                "INSERT INTO levels (level, name, min_xp, max_xp, rewards_json, unlocked_features_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    level.level,
                    level.name,
                    level.min_xp,
                    level.max_xp,
                    serde_json::to_string(&level.rewards)?,
                    serde_json::to_string(&level.unlocked_features)?,
                ],
            )?;
        }

        tracing::info!(levels = table.len(), "Seeded level table");
        Ok(true)
    }

    /// Load and validate the stored level table.
    pub fn load_levels(&self) -> RewardResult<LevelTable> {
        let mut stmt = self.conn.prepare(
            "SELECT level, name, min_xp, max_xp, rewards_json, unlocked_features_json
             FROM levels ORDER BY level ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let rewards: String = row.get(4)?;
            let features: String = row.get(5)?;
            Ok(Level {
                level: row.get(0)?,
                name: row.get(1)?,
                min_xp: row.get(2)?,
                max_xp: row.get(3)?,
                rewards: parse_json(4, &rewards)?,
                unlocked_features: parse_json(5, &features)?,
            })
        })?;
        let levels = rows.collect::<Result<Vec<_>, _>>()?;

        LevelTable::new(levels)
    }

    /// Insert milestone rewards, skipping (type, milestone) pairs already present.
    pub fn seed_streak_rewards(&self, rewards: &[StreakReward]) -> RewardResult<usize> {
        let mut inserted = 0;
        for reward in rewards {
            inserted += self.conn.execute(
                "INSERT OR IGNORE INTO streak_rewards
                 (streak_type, milestone, xp_reward, coin_reward, gem_reward, power_up_id,
                  achievement_id, title_reward, xp_multiplier, coin_multiplier,
                  bonus_duration_hours, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    reward.streak_type.as_str(),
                    reward.milestone,
                    reward.xp_reward,
                    reward.coin_reward,
                    reward.gem_reward,
                    reward.power_up_id,
                    reward.achievement_id,
                    reward.title_reward,
                    reward.xp_multiplier,
                    reward.coin_multiplier,
                    reward.bonus_duration_hours,
                    reward.is_active,
                ],
            )?;
        }

        if inserted > 0 {
            tracing::info!(inserted, "Seeded streak rewards");
        }
        Ok(inserted)
    }

    pub fn load_streak_rewards(&self) -> RewardResult<Vec<StreakReward>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, streak_type, milestone, xp_reward, coin_reward, gem_reward, power_up_id,
                    achievement_id, title_reward, xp_multiplier, coin_multiplier,
                    bonus_duration_hours, is_active
             FROM streak_rewards ORDER BY streak_type, milestone",
        )?;
        let rows = stmt.query_map([], |row| {
            let type_str: String = row.get(1)?;
            let streak_type = StreakType::from_str(&type_str).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    rusqlite::types::Type::Text,
                    format!("unknown streak type '{}'", type_str).into(),
                )
            })?;
            Ok(StreakReward {
                id: row.get(0)?,
                streak_type,
                milestone: row.get(2)?,
                xp_reward: row.get(3)?,
                coin_reward: row.get(4)?,
                gem_reward: row.get(5)?,
                power_up_id: row.get(6)?,
                achievement_id: row.get(7)?,
                title_reward: row.get(8)?,
                xp_multiplier: row.get(9)?,
                coin_multiplier: row.get(10)?,
                bonus_duration_hours: row.get(11)?,
                is_active: row.get(12)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }

    /// Load the whole catalog, failing fast on dangling references.
    pub fn load(&self) -> RewardResult<Catalog> {
        let levels = self.load_levels()?;
        let streak_rewards = self.load_streak_rewards()?;

        for reward in &streak_rewards {
            if let Some(id) = &reward.achievement_id {
                if !self.exists("achievements", id)? {
                    return Err(RewardError::Config(format!(
                        "streak reward {} references unknown achievement '{}'",
                        reward.id, id
                    )));
                }
            }
            if let Some(id) = &reward.power_up_id {
                if !self.exists("power_ups", id)? {
                    return Err(RewardError::Config(format!(
                        "streak reward {} references unknown power-up '{}'",
                        reward.id, id
                    )));
                }
            }
        }

        tracing::debug!(
            levels = levels.len(),
            streak_rewards = streak_rewards.len(),
            "Catalog loaded"
        );
        Ok(Catalog { levels, streak_rewards })
    }

    fn exists(&self, table: &str, id: &str) -> RewardResult<bool> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", table),
                params![id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
