//! Integration tests for daily challenges.
//!
//! Tests the challenge lifecycle through the service:
//! - Per-day generation and lazy progress rows
//! - Progress from tagged XP grants
//! - Completion payouts landing in the ledger exactly once

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamekeeper::storage::config::ChallengeSettings;
use gamekeeper::{ActivityType, AppConfig, GamificationService, RewardError};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, 8, 0, 0).unwrap()
}

fn service() -> GamificationService {
    GamificationService::open_in_memory(AppConfig::default()).unwrap()
}

#[test]
fn test_daily_set_is_stable_within_a_day() {
    let mut svc = service();
    let user = svc.create_user("early_bird", t0()).unwrap();

    let morning = svc.daily_challenges(user.id, t0()).unwrap();
    let evening = svc.daily_challenges(user.id, t0() + Duration::hours(12)).unwrap();
    assert_eq!(morning.len(), 3);

    let ids = |list: &[gamekeeper::challenges::ChallengeStatus]| -> Vec<String> {
        list.iter().map(|s| s.challenge.id.clone()).collect()
    };
    assert_eq!(ids(&morning[..]), ids(&evening[..]));
    assert!(morning.iter().all(|s| s.progress == 0 && !s.is_completed));
    assert!(morning.iter().all(|s| s.challenge.id.starts_with("daily_20260914_")));

    let tomorrow = svc.daily_challenges(user.id, t0() + Duration::days(1)).unwrap();
    assert!(tomorrow.iter().all(|s| s.challenge.id.starts_with("daily_20260915_")));
}

#[test]
fn test_completion_pays_once_through_ledger() {
    let mut svc = service();
    let user = svc.create_user("achiever", t0()).unwrap();

    let challenge = svc.daily_challenges(user.id, t0()).unwrap()[0].challenge.clone();
    let activity = challenge.kind.activity();
    let target = challenge.target_value as i64;

    for k in 0..target - 1 {
        let result = svc
            .add_xp(user.id, 10, activity, t0() + Duration::minutes(k))
            .unwrap();
        assert!(result.challenges_completed.is_empty());
    }

    let result = svc
        .add_xp(user.id, 10, activity, t0() + Duration::minutes(target))
        .unwrap();
    assert_eq!(result.challenges_completed, vec![challenge.id.clone()]);
    assert_eq!(result.challenge_rewards.xp, challenge.xp_reward);
    assert_eq!(result.challenge_rewards.coins, challenge.coin_reward);
    assert_eq!(result.challenge_rewards.gems, challenge.gem_reward);
    assert_eq!(result.total_xp, 10 * target as u64 + challenge.xp_reward);

    let rows: Vec<_> = svc
        .transactions(user.id, 50, 0)
        .unwrap()
        .into_iter()
        .filter(|t| t.source == "daily_challenge")
        .collect();
    let paid: u64 = rows.iter().map(|t| t.amount).sum();
    assert_eq!(rows.len(), 2);
    assert_eq!(paid, challenge.coin_reward + challenge.gem_reward);

    let status = svc
        .daily_challenges(user.id, t0() + Duration::hours(1))
        .unwrap()
        .into_iter()
        .find(|s| s.challenge.id == challenge.id)
        .unwrap();
    assert!(status.is_completed);
    assert_eq!(status.progress, challenge.target_value);
    assert_eq!(status.progress_percent, 100.0);

    let again = svc
        .add_xp(user.id, 10, activity, t0() + Duration::hours(2))
        .unwrap();
    assert!(again.challenges_completed.is_empty());
    assert!(again.challenge_rewards.is_empty());
}

#[test]
fn test_general_xp_makes_no_progress() {
    let mut svc = service();
    let user = svc.create_user("generalist", t0()).unwrap();

    for k in 0..12 {
        svc.add_xp(user.id, 5, ActivityType::General, t0() + Duration::minutes(k))
            .unwrap();
    }

    let statuses = svc.daily_challenges(user.id, t0()).unwrap();
    assert!(statuses.iter().all(|s| s.progress == 0));
}

#[test]
fn test_progress_does_not_carry_over() {
    let config = AppConfig {
        challenges: ChallengeSettings { per_day: 4 },
        ..Default::default()
    };
    let mut svc = GamificationService::open_in_memory(config).unwrap();
    let user = svc.create_user("night_owl", t0()).unwrap();

    svc.add_xp(user.id, 10, ActivityType::Quiz, t0()).unwrap();
    let today = svc.daily_challenges(user.id, t0()).unwrap();
    let quiz = today.iter().find(|s| s.challenge.id.ends_with("_quiz")).unwrap();
    assert_eq!(quiz.progress, 1);

    let tomorrow = svc.daily_challenges(user.id, t0() + Duration::days(1)).unwrap();
    assert_eq!(tomorrow.len(), 4);
    assert!(tomorrow.iter().all(|s| s.progress == 0));
}

#[test]
fn test_unknown_user() {
    let mut svc = service();
    let err = svc.daily_challenges(Uuid::new_v4(), t0()).unwrap_err();
    assert!(matches!(err, RewardError::NotFound(_)));
}
