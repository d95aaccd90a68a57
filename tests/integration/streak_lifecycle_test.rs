//! Integration tests for the streak lifecycle.
//!
//! Tests activity recording end to end:
//! - Milestone rewards landing on the user and in the ledger
//! - Lazy breaking of lapsed streaks
//! - Freezes and their preconditions
//! - Milestone permanence across breaks

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamekeeper::storage::config::StreakSettings;
use gamekeeper::streaks::StreakType;
use gamekeeper::{AppConfig, GamificationService, RewardError, StreakStatus};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 7, 30, 0).unwrap()
}

fn hours(h: i64) -> DateTime<Utc> {
    t0() + Duration::hours(h)
}

fn service_with_freezes(starting_freezes: u32) -> GamificationService {
    let config = AppConfig {
        streaks: StreakSettings {
            starting_freezes,
            ..Default::default()
        },
        ..Default::default()
    };
    GamificationService::open_in_memory(config).unwrap()
}

/// Record daily activity every 20 hours, `days` times.
fn build_daily(svc: &mut GamificationService, user_id: Uuid, days: i64) {
    for k in 0..days {
        svc.record_activity(user_id, StreakType::Daily, hours(20 * k)).unwrap();
    }
}

/// Daily count 6 -> 7 pays the week milestone once
#[test]
fn test_week_milestone_paid_once() {
    let mut svc = service_with_freezes(0);
    let user = svc.create_user("weekly_warrior", t0()).unwrap();
    build_daily(&mut svc, user.id, 6);

    let before = svc.get_user(user.id).unwrap();
    assert_eq!(before.xp, 100);
    assert_eq!(before.coins, 125);

    let result = svc.record_activity(user.id, StreakType::Daily, hours(120)).unwrap();
    assert!(result.streak_updated);
    assert_eq!(result.new_count, 7);
    assert_eq!(result.rewards_earned.xp, 500);
    assert_eq!(result.rewards_earned.gems, 1);
    assert_eq!(result.rewards_earned.coins, 0);
    assert_eq!(result.rewards_earned.titles, vec!["Week Warrior"]);
    assert_eq!(result.next_milestone, Some(14));

    let after = svc.get_user(user.id).unwrap();
    assert_eq!(after.xp, 600);
    assert_eq!(after.gems, before.gems + 1);

    let again = svc.record_activity(user.id, StreakType::Daily, hours(121)).unwrap();
    assert!(!again.streak_updated);
    assert_eq!(again.new_count, 7);
    assert!(again.rewards_earned.is_empty());
    assert_eq!(svc.get_user(user.id).unwrap().xp, 600);

    let streak = &svc.list_streaks(user.id, hours(121)).unwrap()[0];
    assert_eq!(streak.milestones_achieved.len(), 2);
    assert_eq!(streak.total_xp_earned, 600);
    assert_eq!(streak.total_gems_earned, 1);

    let titles = svc.titles(user.id).unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].title, "Week Warrior");

    let achievements = svc.achievements(user.id).unwrap();
    assert!(achievements
        .iter()
        .any(|a| a.achievement.id == "streak_7" && a.unlocked));

    let milestone_rows = svc
        .transactions(user.id, 50, 0)
        .unwrap()
        .into_iter()
        .filter(|t| t.source == "streak_milestone")
        .count();
    // 25 coins at day 3, 1 gem at day 7
    assert_eq!(milestone_rows, 2);
}

#[test]
fn test_reward_listing_marks_achieved() {
    let mut svc = service_with_freezes(0);
    let user = svc.create_user("lister", t0()).unwrap();
    build_daily(&mut svc, user.id, 3);

    let rewards = svc.rewards_for_type(user.id, StreakType::Daily).unwrap();
    let milestones: Vec<u32> = rewards.iter().map(|r| r.reward.milestone).collect();
    assert_eq!(milestones, vec![3, 7, 14, 30, 100]);
    assert!(rewards[0].is_achieved);
    assert!(rewards[1..].iter().all(|r| !r.is_achieved));

    let weekly = svc.rewards_for_type(user.id, StreakType::Weekly).unwrap();
    assert!(weekly.iter().all(|r| !r.is_achieved));
}

/// Lapsed streak is reported broken, reset on the next activity
#[test]
fn test_lapsed_streak_breaks_lazily() {
    let mut svc = service_with_freezes(0);
    let user = svc.create_user("lapsed", t0()).unwrap();
    build_daily(&mut svc, user.id, 2);

    let listed = svc.list_streaks(user.id, hours(50)).unwrap();
    assert_eq!(listed[0].status, StreakStatus::Broken);
    assert_eq!(listed[0].current_count, 2);

    let result = svc.record_activity(user.id, StreakType::Daily, hours(50)).unwrap();
    assert_eq!(result.new_count, 1);
    assert!(result.message.contains("restarted"));

    let listed = svc.list_streaks(user.id, hours(50)).unwrap();
    assert_eq!(listed[0].status, StreakStatus::Active);
    assert_eq!(listed[0].longest_count, 2);
}

#[test]
fn test_milestone_not_regranted_after_break() {
    let mut svc = service_with_freezes(0);
    let user = svc.create_user("again", t0()).unwrap();
    build_daily(&mut svc, user.id, 3);
    assert_eq!(svc.get_user(user.id).unwrap().xp, 100);

    for h in [100, 120, 140] {
        let result = svc.record_activity(user.id, StreakType::Daily, hours(h)).unwrap();
        assert!(result.rewards_earned.is_empty());
    }

    let streak = &svc.list_streaks(user.id, hours(140)).unwrap()[0];
    assert_eq!(streak.current_count, 3);
    assert_eq!(streak.milestones_achieved.len(), 1);
    assert_eq!(svc.get_user(user.id).unwrap().xp, 100);
}

/// Deadline passed two hours ago, one freeze charge
#[test]
fn test_freeze_scenario() {
    let mut svc = service_with_freezes(1);
    let user = svc.create_user("frosty", t0()).unwrap();
    svc.record_activity(user.id, StreakType::Daily, t0()).unwrap();

    let now = hours(26);
    let result = svc
        .use_freeze(user.id, StreakType::Daily, Some(24), Some("sick day".to_string()), now)
        .unwrap();
    assert!(result.success);
    assert_eq!(result.freeze_expires_at, now + Duration::hours(24));
    assert_eq!(result.remaining_freezes, 0);

    let streak = &svc.list_streaks(user.id, now).unwrap()[0];
    assert_eq!(streak.status, StreakStatus::Frozen);
    assert_eq!(streak.frozen_until, Some(now + Duration::hours(24)));
    assert_eq!(streak.next_activity_deadline, Some(now + Duration::hours(24)));

    let err = svc
        .use_freeze(user.id, StreakType::Daily, Some(24), None, now)
        .unwrap_err();
    assert!(matches!(err, RewardError::InsufficientResource { .. }));

    let history = svc.freeze_history(user.id, StreakType::Daily).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].freeze_duration_hours, 24);
    assert_eq!(history[0].reason.as_deref(), Some("sick day"));

    let result = svc.record_activity(user.id, StreakType::Daily, hours(40)).unwrap();
    assert_eq!(result.new_count, 2);
}

#[test]
fn test_freeze_preconditions() {
    let mut svc = service_with_freezes(2);
    let user = svc.create_user("prepared", t0()).unwrap();

    let err = svc.use_freeze(user.id, StreakType::Weekly, None, None, t0()).unwrap_err();
    assert!(matches!(err, RewardError::NotFound(_)));

    svc.record_activity(user.id, StreakType::Weekly, t0()).unwrap();
    let err = svc.use_freeze(user.id, StreakType::Weekly, None, None, hours(30)).unwrap_err();
    assert!(matches!(err, RewardError::InvalidState(_)));

    let err = svc
        .use_freeze(user.id, StreakType::Weekly, Some(0), None, hours(200))
        .unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));

    // Default duration comes from configuration.
    let result = svc.use_freeze(user.id, StreakType::Weekly, None, None, hours(200)).unwrap();
    assert_eq!(result.freeze_expires_at, hours(224));
    assert_eq!(result.remaining_freezes, 1);
}

#[test]
fn test_tagged_activity() {
    let mut svc = service_with_freezes(0);
    let user = svc.create_user("tagged", t0()).unwrap();

    let result = svc.record_activity_tagged(user.id, "MONTHLY", t0()).unwrap();
    assert_eq!(result.new_count, 1);
    assert_eq!(result.time_until_next_deadline.as_deref(), Some("720h 0m"));

    let err = svc.record_activity_tagged(user.id, "fortnightly", t0()).unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));
}

#[test]
fn test_oversized_freeze_is_rejected() {
    let mut svc = service_with_freezes(1);
    let user = svc.create_user("glacier", t0()).unwrap();
    svc.record_activity(user.id, StreakType::Daily, t0()).unwrap();

    let err = svc
        .use_freeze(user.id, StreakType::Daily, Some(721), None, hours(30))
        .unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));

    let streak = &svc.list_streaks(user.id, hours(30)).unwrap()[0];
    assert_eq!(streak.freeze_count, 1);
    assert!(svc.freeze_history(user.id, StreakType::Daily).unwrap().is_empty());
}

/// Even without a configured limit, an expiry past the calendar range fails cleanly
#[test]
fn test_unbounded_freeze_limit_still_errors() {
    let config = AppConfig {
        streaks: StreakSettings {
            starting_freezes: 1,
            max_freeze_hours: u32::MAX,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut svc = GamificationService::open_in_memory(config).unwrap();
    let user = svc.create_user("permafrost", t0()).unwrap();
    svc.record_activity(user.id, StreakType::Daily, t0()).unwrap();

    let err = svc
        .use_freeze(user.id, StreakType::Daily, Some(u32::MAX), None, hours(30))
        .unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));

    let result = svc
        .use_freeze(user.id, StreakType::Daily, Some(24), None, hours(30))
        .unwrap();
    assert_eq!(result.remaining_freezes, 0);
}
