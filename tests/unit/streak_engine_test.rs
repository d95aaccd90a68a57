//! Unit tests for the streak state machine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamekeeper::streaks::engine::{
    freeze, next_milestone, record_activity, start_streak, sweep_milestones,
};
use gamekeeper::streaks::{StreakReward, StreakRules, StreakStatus, StreakType};
use gamekeeper::RewardError;
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

fn milestones() -> Vec<StreakReward> {
    let mut three = StreakReward::new(StreakType::Daily, 3).with_currency(100, 25, 0);
    three.id = 1;
    let mut seven = StreakReward::new(StreakType::Daily, 7)
        .with_currency(500, 0, 1)
        .with_title("Week Warrior");
    seven.id = 2;
    let mut weekly = StreakReward::new(StreakType::Weekly, 4).with_currency(400, 100, 1);
    weekly.id = 3;
    vec![three, seven, weekly]
}

/// Two calls inside the anti-gaming window count once
#[test]
fn test_rapid_repeat_does_not_increment() {
    let rules = StreakRules::default();
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Daily, t0(), &rules);

    let outcome = record_activity(&mut streak, t0() + Duration::hours(3), &rules);
    assert!(!outcome.incremented);
    assert_eq!(streak.current_count, 1);
    assert_eq!(streak.last_activity_date, t0() + Duration::hours(3));

    // The gap is measured from the latest activity, not the first one.
    let outcome = record_activity(&mut streak, t0() + Duration::hours(13), &rules);
    assert!(!outcome.incremented);

    let outcome = record_activity(&mut streak, t0() + Duration::hours(25), &rules);
    assert!(outcome.incremented);
    assert_eq!(streak.current_count, 2);
    assert_eq!(streak.longest_count, 2);
}

#[test]
fn test_lapsed_streak_resets_on_next_touch() {
    let rules = StreakRules::default();
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Weekly, t0(), &rules);
    streak.current_count = 5;
    streak.longest_count = 5;

    let late = t0() + Duration::days(8);
    let outcome = record_activity(&mut streak, late, &rules);

    assert!(outcome.broke);
    assert_eq!(streak.current_count, 1);
    assert_eq!(streak.longest_count, 5);
    assert_eq!(streak.start_date, late);
    assert_eq!(streak.status, StreakStatus::Active);
    assert_eq!(streak.next_activity_deadline, Some(late + Duration::days(7)));
}

/// A milestone fires once per streak lifetime
#[test]
fn test_milestone_fires_once_across_breaks() {
    let rewards = milestones();
    let rules = StreakRules::default();
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Daily, t0(), &rules);
    streak.current_count = 3;

    let bundle = sweep_milestones(&mut streak, &rewards);
    assert_eq!((bundle.xp, bundle.coins), (100, 25));
    assert_eq!(streak.milestones_achieved, vec![1]);

    // Broken, then counted back up to the same milestone.
    record_activity(&mut streak, t0() + Duration::days(3), &rules);
    assert_eq!(streak.current_count, 1);
    streak.current_count = 3;
    assert!(sweep_milestones(&mut streak, &rewards).is_empty());
    assert_eq!(next_milestone(&streak, &rewards), Some(7));
}

#[test]
fn test_sweep_catches_up_on_skipped_milestones() {
    let rewards = milestones();
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Daily, t0(), &StreakRules::default());
    streak.current_count = 8;

    let bundle = sweep_milestones(&mut streak, &rewards);
    assert_eq!(bundle.xp, 600);
    assert_eq!(bundle.gems, 1);
    assert_eq!(bundle.titles, vec!["Week Warrior"]);
    assert_eq!(streak.milestones_achieved, vec![1, 2]);
    assert_eq!(next_milestone(&streak, &rewards), None);
}

/// Freeze on a streak two hours past its deadline
#[test]
fn test_freeze_lapsed_streak() {
    let rules = StreakRules { starting_freezes: 1, ..Default::default() };
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Daily, t0(), &rules);
    let now = t0() + Duration::hours(26);

    let record = freeze(&mut streak, 24, now, None).unwrap();
    assert_eq!(record.expires_at, now + Duration::hours(24));
    assert_eq!(streak.status, StreakStatus::Frozen);
    assert_eq!(streak.frozen_until, Some(now + Duration::hours(24)));
    assert_eq!(streak.next_activity_deadline, Some(now + Duration::hours(24)));
    assert_eq!(streak.freeze_count, 0);

    let err = freeze(&mut streak, 24, now, None).unwrap_err();
    assert!(matches!(err, RewardError::InsufficientResource { .. }));

    // The freeze absorbs the lapse.
    let outcome = record_activity(&mut streak, now + Duration::hours(10), &rules);
    assert!(!outcome.broke);
    assert_eq!(streak.current_count, 2);
}

#[test]
fn test_freeze_rejected_on_healthy_streak() {
    let rules = StreakRules { starting_freezes: 2, ..Default::default() };
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Monthly, t0(), &rules);

    let err = freeze(&mut streak, 24, t0() + Duration::days(2), None).unwrap_err();
    assert!(matches!(err, RewardError::InvalidState(_)));
    assert_eq!(streak.freeze_count, 2);
    assert_eq!(streak.status, StreakStatus::Active);
}

#[test]
fn test_expired_freeze_breaks() {
    let rules = StreakRules { starting_freezes: 1, ..Default::default() };
    let mut streak = start_streak(Uuid::new_v4(), StreakType::Daily, t0(), &rules);
    streak.current_count = 4;
    let now = t0() + Duration::hours(30);
    freeze(&mut streak, 6, now, Some("travel".to_string())).unwrap();

    let outcome = record_activity(&mut streak, now + Duration::hours(7), &rules);
    assert!(outcome.broke);
    assert_eq!(streak.current_count, 1);
    assert_eq!(streak.frozen_until, None);
}
