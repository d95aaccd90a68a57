//! Streak state machine.
//!
//! Pure transitions over an in-memory [`Streak`]; the caller loads and saves
//! rows. Expiry is evaluated lazily when a streak is touched, there is no
//! background sweep.
//!
//! ```text
//!            activity                deadline passed, next activity
//!  (none) ───────────▶ ACTIVE ─────────────────────────────────────▶ BROKEN ──┐
//!                        │  ▲                                                 │
//!     use_freeze (past   │  │ activity                        activity        │
//!     deadline, charge)  ▼  │                                (count restarts) │
//!                      FROZEN ◀───────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::types::{Streak, StreakFreeze, StreakReward, StreakStatus, StreakType};
use crate::error::{RewardError, RewardResult};
use crate::rewards::{sum_rewards, RewardBundle};
use crate::storage::config::StreakSettings;

/// Tunable streak rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRules {
    /// Activities closer together than this do not increment the counter.
    pub min_increment_gap: Duration,
    /// Freeze charges a new streak starts with.
    pub starting_freezes: u32,
}

impl Default for StreakRules {
    fn default() -> Self {
        Self::from(&StreakSettings::default())
    }
}

impl From<&StreakSettings> for StreakRules {
    fn from(settings: &StreakSettings) -> Self {
        Self {
            min_increment_gap: Duration::hours(settings.min_increment_gap_hours as i64),
            starting_freezes: settings.starting_freezes,
        }
    }
}

/// What happened to a streak during one activity call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityOutcome {
    /// The streak row did not exist before this call
    pub created: bool,
    /// The deadline had passed and the counter was reset
    pub broke: bool,
    /// The counter went up
    pub incremented: bool,
}

/// Create the streak for a user's first activity of a type.
///
/// The deadline is set right away so a new streak can expire and be frozen
/// like any other.
pub fn start_streak(
    user_id: Uuid,
    streak_type: StreakType,
    now: DateTime<Utc>,
    rules: &StreakRules,
) -> Streak {
    Streak {
        id: Uuid::new_v4(),
        user_id,
        streak_type,
        current_count: 1,
        longest_count: 1,
        status: StreakStatus::Active,
        start_date: now,
        last_activity_date: now,
        next_activity_deadline: Some(now + streak_type.period()),
        freeze_count: rules.starting_freezes,
        frozen_until: None,
        total_xp_earned: 0,
        total_coins_earned: 0,
        total_gems_earned: 0,
        milestones_achieved: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Whether the streak has lapsed at `now`, taking an active freeze into account.
pub fn is_expired(streak: &Streak, now: DateTime<Utc>) -> bool {
    if !streak.is_past_deadline(now) {
        return false;
    }

    match streak.status {
        // A freeze without an expiry offers no protection.
        StreakStatus::Frozen => streak.frozen_until.map(|until| now > until).unwrap_or(true),
        _ => true,
    }
}

/// Apply an activity at `now` to an existing streak.
pub fn record_activity(streak: &mut Streak, now: DateTime<Utc>, rules: &StreakRules) -> ActivityOutcome {
    let mut outcome = ActivityOutcome::default();

    if is_expired(streak, now) {
        tracing::info!(
            streak_id = %streak.id,
            streak_type = %streak.streak_type,
            lost_count = streak.current_count,
            "Streak broken"
        );
        streak.status = StreakStatus::Broken;
        streak.current_count = 0;
        streak.start_date = now;
        streak.frozen_until = None;
        outcome.broke = true;
    }

    let previous_activity = streak.last_activity_date;

    streak.last_activity_date = now;
    streak.status = StreakStatus::Active;
    streak.next_activity_deadline = Some(now + streak.streak_type.period());
    streak.updated_at = now;

    if now - previous_activity >= rules.min_increment_gap {
        streak.current_count += 1;
        streak.longest_count = streak.longest_count.max(streak.current_count);
        outcome.incremented = true;
    }

    outcome
}

/// Grant every milestone the streak has reached but not yet been paid for.
///
/// Marks each matched reward as achieved so it never fires again for this
/// streak, even after a break.
pub fn sweep_milestones(streak: &mut Streak, rewards: &[StreakReward]) -> RewardBundle {
    let mut matched: Vec<&StreakReward> = rewards
        .iter()
        .filter(|r| {
            r.is_active
                && r.streak_type == streak.streak_type
                && r.milestone <= streak.current_count
                && !streak.has_achieved(r.id)
        })
        .collect();
    matched.sort_by_key(|r| (r.milestone, r.id));

    for reward in &matched {
        tracing::info!(
            streak_id = %streak.id,
            milestone = reward.milestone,
            reward_id = reward.id,
            "Streak milestone reached"
        );
        streak.milestones_achieved.push(reward.id);
    }

    sum_rewards(matched.into_iter())
}

/// Add a granted bundle to the streak's lifetime totals.
pub fn add_to_totals(streak: &mut Streak, bundle: &RewardBundle) {
    streak.total_xp_earned += bundle.xp;
    streak.total_coins_earned += bundle.coins;
    streak.total_gems_earned += bundle.gems;
}

/// Lowest active milestone above the current count.
pub fn next_milestone(streak: &Streak, rewards: &[StreakReward]) -> Option<u32> {
    rewards
        .iter()
        .filter(|r| {
            r.is_active && r.streak_type == streak.streak_type && r.milestone > streak.current_count
        })
        .map(|r| r.milestone)
        .min()
}

/// Mark a lapsed streak as broken without touching its counter.
///
/// Used when listing streaks; the counter is reset on the next activity.
/// Returns true when the status changed.
pub fn refresh_status(streak: &mut Streak, now: DateTime<Utc>) -> bool {
    if streak.status == StreakStatus::Broken {
        return false;
    }
    if streak.is_past_deadline(now) && streak.status != StreakStatus::Frozen {
        streak.status = StreakStatus::Broken;
        streak.updated_at = now;
        return true;
    }
    false
}

/// Spend a freeze charge to protect a streak that is past its deadline.
///
/// The deadline is pushed out to the end of the freeze.
pub fn freeze(
    streak: &mut Streak,
    hours: u32,
    now: DateTime<Utc>,
    reason: Option<String>,
) -> RewardResult<StreakFreeze> {
    if hours == 0 {
        return Err(RewardError::InvalidArgument(
            "freeze duration must be at least 1 hour, got 0".to_string(),
        ));
    }
    if streak.freeze_count == 0 {
        return Err(RewardError::insufficient("streak freezes", 1, 0));
    }
    if !streak.is_past_deadline(now) {
        return Err(RewardError::InvalidState(format!(
            "{} streak is not in danger of breaking",
            streak.streak_type
        )));
    }

    let expires_at = now
        .checked_add_signed(Duration::hours(hours as i64))
        .ok_or_else(|| {
            RewardError::InvalidArgument(format!("freeze duration of {} hours is out of range", hours))
        })?;

    streak.freeze_count -= 1;
    streak.status = StreakStatus::Frozen;
    streak.frozen_until = Some(expires_at);
    streak.next_activity_deadline = Some(expires_at);
    streak.updated_at = now;

    tracing::info!(
        streak_id = %streak.id,
        hours,
        remaining = streak.freeze_count,
        "Streak freeze activated"
    );

    Ok(StreakFreeze {
        id: Uuid::new_v4(),
        user_id: streak.user_id,
        streak_id: streak.id,
        freeze_duration_hours: hours,
        used_at: now,
        expires_at,
        reason,
    })
}
