//! Integration tests for XP grants through the service.
//!
//! Covers the multi-level cascade, freeze handout to every streak,
//! achievement unlocks and rejection without side effects.

use chrono::{DateTime, TimeZone, Utc};
use gamekeeper::storage::config::LevelSettings;
use gamekeeper::streaks::StreakType;
use gamekeeper::{ActivityType, AppConfig, GamificationService, RewardError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap()
}

fn ten_level_service() -> GamificationService {
    let config = AppConfig {
        levels: LevelSettings {
            max_level: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    GamificationService::open_in_memory(config).unwrap()
}

/// Level 3 user receiving 5000 XP
#[test]
fn test_cascade_from_level_three() {
    let mut svc = ten_level_service();
    let user = svc.create_user("climber", t0()).unwrap();

    svc.record_activity(user.id, StreakType::Daily, t0()).unwrap();
    svc.record_activity(user.id, StreakType::Weekly, t0()).unwrap();

    let start = svc.level_table().get(3).unwrap().min_xp;
    let first = svc.add_xp(user.id, start as i64, ActivityType::General, t0()).unwrap();
    assert_eq!(first.level, 3);

    let result = svc.add_xp(user.id, 5000, ActivityType::General, t0()).unwrap();
    let expected_level = svc.level_table().level_for_xp(start + 5000);
    let level_up = result.level_up.expect("level up");

    assert_eq!(result.level, expected_level);
    assert_eq!(level_up.previous_level, 3);
    assert_eq!(level_up.levels_gained, expected_level - 3);
    assert_eq!(level_up.rewards, svc.level_table().rewards_between(3, expected_level));

    // Levels 5 and 10 pay out.
    assert_eq!(level_up.rewards.coins, 250 + 1000);
    assert_eq!(level_up.rewards.gems, 1);
    assert_eq!(level_up.rewards.streak_freezes, 1);

    let stored = svc.get_user(user.id).unwrap();
    assert_eq!(stored.level, expected_level);
    assert_eq!(stored.coins, 100 + 1250);
    assert_eq!(stored.gems, 10 + 1);

    // The freeze goes to every streak the user owns.
    let streaks = svc.list_streaks(user.id, t0()).unwrap();
    assert_eq!(streaks.len(), 2);
    assert!(streaks.iter().all(|s| s.freeze_count == 1));

    assert!(result.achievements_unlocked.contains(&"xp_1000".to_string()));
    assert!(result.achievements_unlocked.contains(&"xp_5000".to_string()));

    let progress = svc.level_progress(user.id).unwrap();
    assert_eq!(progress.current_level, 10);
    assert_eq!(progress.level_progress, 0.0);
    assert_eq!(progress.next_level_xp, None);
    assert_eq!(progress.unlocked_features, vec!["team_creation", "custom_avatar"]);
}

#[test]
fn test_non_positive_xp_leaves_no_trace() {
    let mut svc = ten_level_service();
    let user = svc.create_user("careful", t0()).unwrap();
    let ledger_before = svc.transactions(user.id, 50, 0).unwrap().len();

    for amount in [0, -100] {
        let err = svc.add_xp(user.id, amount, ActivityType::Quiz, t0()).unwrap_err();
        assert!(matches!(err, RewardError::InvalidArgument(_)));
        assert!(err.is_client_error());
    }

    let stored = svc.get_user(user.id).unwrap();
    assert_eq!(stored, user);
    assert_eq!(svc.transactions(user.id, 50, 0).unwrap().len(), ledger_before);
}

#[test]
fn test_level_up_rewards_are_logged() {
    let mut svc = ten_level_service();
    let user = svc.create_user("logged", t0()).unwrap();

    let threshold = svc.level_table().get(5).unwrap().min_xp;
    svc.add_xp(user.id, threshold as i64, ActivityType::Search, t0()).unwrap();

    let ledger = svc.transactions(user.id, 10, 0).unwrap();
    let level_rows: Vec<_> = ledger.iter().filter(|t| t.source == "level_up").collect();
    assert_eq!(level_rows.len(), 1);
    assert_eq!(level_rows[0].amount, 250);

    let balance = svc.balance(user.id).unwrap();
    assert_eq!(balance.coins, 350);
    assert_eq!(balance.total_earned_coins, 350);
}

#[test]
fn test_quiz_achievement_unlocks_once() {
    let mut svc = ten_level_service();
    let user = svc.create_user("quizzer", t0()).unwrap();

    let mut unlocked = Vec::new();
    for _ in 0..11 {
        let result = svc.add_xp(user.id, 1, ActivityType::Quiz, t0()).unwrap();
        unlocked.extend(result.achievements_unlocked);
    }
    assert_eq!(unlocked, vec!["quiz_10"]);

    let statuses = svc.achievements(user.id).unwrap();
    let quiz = statuses.iter().find(|s| s.achievement.id == "quiz_10").unwrap();
    assert!(quiz.unlocked);
    assert!(quiz.unlocked_at.is_some());
    assert!(statuses.iter().filter(|s| s.unlocked).count() == 1);
}
