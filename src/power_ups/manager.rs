//! Power-up catalog and per-user usage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{
    EffectType, PowerUp, PowerUpActivation, PowerUpCategory, PowerUpStatus, PowerUpUsage,
};
use crate::economy::Currency;
use crate::error::{RewardError, RewardResult};
use crate::storage::database::parse_optional_timestamp;
use crate::storage::user_store::UserAccount;

const POWER_UP_COLUMNS: &str = "id, name, description, icon, category, effect_type, effect_value,
     duration_secs, cost_coins, cost_gems, max_uses_per_day";

/// Power-up manager.
pub struct PowerUpManager<'a> {
    conn: &'a Connection,
}

impl<'a> PowerUpManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert power-ups that are not in the catalog yet.
    pub fn seed(&self, power_ups: &[PowerUp]) -> RewardResult<usize> {
        let mut inserted = 0;
        for p in power_ups {
            inserted += self.conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO power_ups ({}) VALUES
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    POWER_UP_COLUMNS
                ),
                params![
                    p.id,
                    p.name,
                    p.description,
                    p.icon,
                    p.category.as_str(),
                    p.effect_type.as_str(),
                    p.effect_value,
                    p.duration_secs,
                    p.cost_coins,
                    p.cost_gems,
                    p.max_uses_per_day,
                ],
            )?;
        }
        Ok(inserted)
    }

    pub fn all(&self) -> RewardResult<Vec<PowerUp>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM power_ups ORDER BY cost_coins ASC, id ASC",
            POWER_UP_COLUMNS
        ))?;
        let rows = stmt.query_map([], parse_power_up_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }

    pub fn get(&self, id: &str) -> RewardResult<Option<PowerUp>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM power_ups WHERE id = ?1", POWER_UP_COLUMNS),
                params![id],
                parse_power_up_row,
            )
            .optional()
            .map_err(RewardError::from)
    }

    /// Usage row for a user and power-up, or a fresh one.
    pub fn usage(&self, user_id: Uuid, power_up_id: &str) -> RewardResult<PowerUpUsage> {
        let usage = self
            .conn
            .query_row(
                "SELECT uses_today, last_used, bonus_charges FROM user_power_ups
                 WHERE user_id = ?1 AND power_up_id = ?2",
                params![user_id.to_string(), power_up_id],
                |row| {
                    Ok(PowerUpUsage {
                        user_id,
                        power_up_id: power_up_id.to_string(),
                        uses_today: row.get(0)?,
                        last_used: parse_optional_timestamp(1, row.get(1)?)?,
                        bonus_charges: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(usage.unwrap_or_else(|| PowerUpUsage::new(user_id, power_up_id)))
    }

    fn save_usage(&self, usage: &PowerUpUsage) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO user_power_ups (user_id, power_up_id, uses_today, last_used, bonus_charges)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, power_up_id) DO UPDATE SET
                uses_today = excluded.uses_today,
                last_used = excluded.last_used,
                bonus_charges = excluded.bonus_charges",
            params![
                usage.user_id.to_string(),
                usage.power_up_id,
                usage.uses_today,
                usage.last_used.map(|t| t.to_rfc3339()),
                usage.bonus_charges,
            ],
        )?;
        Ok(())
    }

    /// Give the user free uses of a power-up.
    pub fn grant_charges(&self, user_id: Uuid, power_up_id: &str, count: u32) -> RewardResult<()> {
        if self.get(power_up_id)?.is_none() {
            return Err(RewardError::NotFound(format!("power-up '{}'", power_up_id)));
        }

        let mut usage = self.usage(user_id, power_up_id)?;
        usage.bonus_charges += count;
        self.save_usage(&usage)?;

        tracing::info!(user_id = %user_id, power_up_id, count, "Power-up charges granted");
        Ok(())
    }

    /// The whole catalog with the user's usage for the day of `now`.
    pub fn list_for_user(
        &self,
        account: &UserAccount,
        now: DateTime<Utc>,
    ) -> RewardResult<Vec<PowerUpStatus>> {
        let mut statuses = Vec::new();
        for power_up in self.all()? {
            let usage = self.usage(account.id, &power_up.id)?;
            let uses_today = usage.uses_on(now);
            let affordable =
                account.coins >= power_up.cost_coins && account.gems >= power_up.cost_gems;

            statuses.push(PowerUpStatus {
                can_use: uses_today < power_up.max_uses_per_day
                    && (usage.bonus_charges > 0 || affordable),
                uses_today,
                bonus_charges: usage.bonus_charges,
                power_up,
            });
        }
        Ok(statuses)
    }

    /// Use a power-up.
    ///
    /// A bonus charge pays for the use when one is available; otherwise both
    /// prices are debited from the account. The daily limit applies either way.
    pub fn use_power_up(
        &self,
        account: &mut UserAccount,
        power_up_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<PowerUpActivation> {
        let power_up = self
            .get(power_up_id)?
            .ok_or_else(|| RewardError::NotFound(format!("power-up '{}'", power_up_id)))?;

        let mut usage = self.usage(account.id, power_up_id)?;
        let uses_today = usage.uses_on(now);
        if uses_today >= power_up.max_uses_per_day {
            return Err(RewardError::InvalidState(format!(
                "daily limit of {} uses reached for '{}'",
                power_up.max_uses_per_day, power_up.id
            )));
        }

        let used_bonus_charge = usage.bonus_charges > 0;
        let (coins_spent, gems_spent) = if used_bonus_charge {
            usage.bonus_charges -= 1;
            (0, 0)
        } else {
            if account.coins < power_up.cost_coins {
                return Err(RewardError::insufficient("coins", power_up.cost_coins, account.coins));
            }
            if account.gems < power_up.cost_gems {
                return Err(RewardError::insufficient("gems", power_up.cost_gems, account.gems));
            }
            account.debit(Currency::Coins, power_up.cost_coins)?;
            account.debit(Currency::Gems, power_up.cost_gems)?;
            account.updated_at = now;
            (power_up.cost_coins, power_up.cost_gems)
        };

        usage.uses_today = uses_today + 1;
        usage.last_used = Some(now);
        self.save_usage(&usage)?;

        tracing::info!(
            user_id = %account.id,
            power_up_id,
            used_bonus_charge,
            uses_today = usage.uses_today,
            "Power-up used"
        );

        Ok(PowerUpActivation {
            power_up_id: power_up.id.clone(),
            effect_type: power_up.effect_type,
            effect_value: power_up.effect_value,
            duration_secs: power_up.duration_secs,
            used_bonus_charge,
            coins_spent,
            gems_spent,
            remaining_uses: power_up.max_uses_per_day - usage.uses_today,
            remaining_bonus_charges: usage.bonus_charges,
        })
    }
}

fn parse_power_up_row(row: &rusqlite::Row) -> rusqlite::Result<PowerUp> {
    let category: String = row.get(4)?;
    let effect: String = row.get(5)?;
    let effect_type = EffectType::from_str(&effect).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown effect type '{}'", effect).into(),
        )
    })?;

    Ok(PowerUp {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        category: PowerUpCategory::from_str(&category).unwrap_or(PowerUpCategory::General),
        effect_type,
        effect_value: row.get(6)?,
        duration_secs: row.get(7)?,
        cost_coins: row.get(8)?,
        cost_gems: row.get(9)?,
        max_uses_per_day: row.get(10)?,
    })
}
