//! Daily challenge storage and per-user progress.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{
    select_for_day, ChallengeKind, ChallengeProgress, ChallengeStatus, ChallengeTemplate,
    DailyChallenge, Difficulty,
};
use crate::error::{RewardError, RewardResult};
use crate::rewards::ActivityType;
use crate::storage::database::parse_optional_timestamp;

const CHALLENGE_COLUMNS: &str = "id, challenge_date, kind, title, description, difficulty,
     target_value, xp_reward, coin_reward, gem_reward";

/// Daily challenge manager.
pub struct ChallengeManager<'a> {
    conn: &'a Connection,
}

impl<'a> ChallengeManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Challenges of a day, generating them from `templates` on first use.
    pub fn ensure_for_day(
        &self,
        templates: &[ChallengeTemplate],
        date: NaiveDate,
        count: usize,
    ) -> RewardResult<Vec<DailyChallenge>> {
        let existing = self.for_day(date)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        for template in select_for_day(templates, date, count) {
            let c = template.for_day(date);
            self.conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO daily_challenges ({}) VALUES
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    CHALLENGE_COLUMNS
                ),
                params![
                    c.id,
                    c.challenge_date.to_string(),
                    c.kind.as_str(),
                    c.title,
                    c.description,
                    c.difficulty.as_str(),
                    c.target_value,
                    c.xp_reward,
                    c.coin_reward,
                    c.gem_reward,
                ],
            )?;
        }

        let generated = self.for_day(date)?;
        tracing::info!(date = %date, count = generated.len(), "Daily challenges generated");
        Ok(generated)
    }

    /// Active challenges of a day in generation order.
    pub fn for_day(&self, date: NaiveDate) -> RewardResult<Vec<DailyChallenge>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM daily_challenges
             WHERE challenge_date = ?1 AND is_active = 1
             ORDER BY rowid ASC",
            CHALLENGE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![date.to_string()], parse_challenge_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }

    pub fn progress(&self, user_id: Uuid, challenge_id: &str) -> RewardResult<Option<ChallengeProgress>> {
        self.conn
            .query_row(
                "SELECT progress, is_completed, completed_at FROM user_daily_challenges
                 WHERE user_id = ?1 AND challenge_id = ?2",
                params![user_id.to_string(), challenge_id],
                |row| {
                    Ok(ChallengeProgress {
                        user_id,
                        challenge_id: challenge_id.to_string(),
                        progress: row.get(0)?,
                        is_completed: row.get(1)?,
                        completed_at: parse_optional_timestamp(2, row.get(2)?)?,
                    })
                },
            )
            .optional()
            .map_err(RewardError::from)
    }

    fn save_progress(&self, progress: &ChallengeProgress) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO user_daily_challenges (user_id, challenge_id, progress, is_completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, challenge_id) DO UPDATE SET
                progress = excluded.progress,
                is_completed = excluded.is_completed,
                completed_at = excluded.completed_at",
            params![
                progress.user_id.to_string(),
                progress.challenge_id,
                progress.progress,
                progress.is_completed,
                progress.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Progress row for a user, created empty if the user has none yet.
    fn progress_or_create(&self, user_id: Uuid, challenge_id: &str) -> RewardResult<ChallengeProgress> {
        match self.progress(user_id, challenge_id)? {
            Some(progress) => Ok(progress),
            None => {
                let progress = ChallengeProgress::new(user_id, challenge_id);
                self.save_progress(&progress)?;
                Ok(progress)
            }
        }
    }

    /// The user's standing on each challenge.
    pub fn list_for_user(
        &self,
        user_id: Uuid,
        challenges: Vec<DailyChallenge>,
    ) -> RewardResult<Vec<ChallengeStatus>> {
        let mut statuses = Vec::with_capacity(challenges.len());
        for challenge in challenges {
            let progress = self.progress_or_create(user_id, &challenge.id)?;
            statuses.push(ChallengeStatus::new(challenge, &progress));
        }
        Ok(statuses)
    }

    /// Count one activity against the matching challenges.
    ///
    /// Returns the challenges this activity completed; each completes at most
    /// once per user.
    pub fn record_activity(
        &self,
        user_id: Uuid,
        activity: ActivityType,
        challenges: &[DailyChallenge],
        now: DateTime<Utc>,
    ) -> RewardResult<Vec<DailyChallenge>> {
        let Some(kind) = ChallengeKind::for_activity(activity) else {
            return Ok(Vec::new());
        };

        let mut completed = Vec::new();
        for challenge in challenges.iter().filter(|c| c.kind == kind) {
            let mut progress = self.progress_or_create(user_id, &challenge.id)?;
            if progress.is_completed {
                continue;
            }
            if progress.advance(challenge.target_value, now) {
                tracing::info!(
                    user_id = %user_id,
                    challenge_id = %challenge.id,
                    "Daily challenge completed"
                );
                completed.push(challenge.clone());
            }
            self.save_progress(&progress)?;
        }
        Ok(completed)
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

fn parse_challenge_row(row: &rusqlite::Row) -> rusqlite::Result<DailyChallenge> {
    let date: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let difficulty: String = row.get(5)?;

    Ok(DailyChallenge {
        id: row.get(0)?,
        challenge_date: date
            .parse::<NaiveDate>()
            .map_err(|e| conversion_error(1, e.to_string()))?,
        kind: ChallengeKind::from_str(&kind)
            .ok_or_else(|| conversion_error(2, format!("unknown challenge kind '{}'", kind)))?,
        title: row.get(3)?,
        description: row.get(4)?,
        difficulty: Difficulty::from_str(&difficulty).unwrap_or(Difficulty::Medium),
        target_value: row.get(6)?,
        xp_reward: row.get(7)?,
        coin_reward: row.get(8)?,
        gem_reward: row.get(9)?,
    })
}
