//! Unit tests for the level table and XP accrual.

use chrono::Utc;
use gamekeeper::levels::{Level, LevelEngine, LevelRewards, LevelTable};
use gamekeeper::storage::config::LevelSettings;
use gamekeeper::{ActivityType, RewardError, UserAccount};

fn curve(max_level: u32) -> LevelTable {
    LevelTable::from_curve(&LevelSettings {
        max_level,
        ..Default::default()
    })
    .unwrap()
}

/// Default curve shape
#[test]
fn test_curve_thresholds() {
    let table = curve(10);
    assert_eq!(table.len(), 10);
    assert_eq!(table.get(1).unwrap().min_xp, 0);
    assert_eq!(table.get(2).unwrap().min_xp, 100);
    assert_eq!(table.get(3).unwrap().min_xp, 282);
    assert_eq!(table.max_level(), 10);
}

#[test]
fn test_curve_rewards_and_features() {
    let table = curve(25);
    assert_eq!(table.get(4).unwrap().rewards, LevelRewards::default());
    assert_eq!(table.get(5).unwrap().rewards.coins, 250);
    assert_eq!(
        table.get(10).unwrap().rewards,
        LevelRewards { coins: 1000, gems: 1, streak_freezes: 1 }
    );
    assert_eq!(table.get(25).unwrap().rewards.gems, 5);
    assert_eq!(
        table.features_through(25),
        vec!["team_creation", "custom_avatar", "premium_quizzes", "mentor_mode"]
    );
}

/// Level lookup prefers the highest qualifying level
#[test]
fn test_level_for_xp_boundaries() {
    let table = curve(10);
    assert_eq!(table.level_for_xp(0), 1);
    assert_eq!(table.level_for_xp(99), 1);
    assert_eq!(table.level_for_xp(100), 2);
    assert_eq!(table.level_for_xp(281), 2);
    assert_eq!(table.level_for_xp(282), 3);
    assert_eq!(table.level_for_xp(u64::MAX), 10);
}

#[test]
fn test_gapped_table_rejected() {
    let err = LevelTable::new(vec![Level::new(1, 0, 100), Level::new(2, 150, 300)]).unwrap_err();
    assert!(matches!(err, RewardError::Config(_)));

    let err = LevelTable::new(vec![Level::new(1, 0, 100), Level::new(3, 100, 300)]).unwrap_err();
    assert!(matches!(err, RewardError::Config(_)));

    let err = LevelTable::new(vec![Level::new(1, 10, 100)]).unwrap_err();
    assert!(matches!(err, RewardError::Config(_)));

    assert!(LevelTable::new(Vec::new()).is_err());
}

/// Crossing three levels pays all three
#[test]
fn test_three_level_jump_sums_rewards() {
    let table = LevelTable::new(vec![
        Level::new(1, 0, 10),
        Level::new(2, 10, 20).with_rewards(LevelRewards { coins: 5, gems: 0, streak_freezes: 0 }),
        Level::new(3, 20, 30).with_rewards(LevelRewards { coins: 7, gems: 1, streak_freezes: 0 }),
        Level::new(4, 30, 40).with_rewards(LevelRewards { coins: 11, gems: 2, streak_freezes: 1 }),
        Level::new(5, 40, 50),
    ])
    .unwrap();
    let engine = LevelEngine::new(&table);
    let mut user = UserAccount::new("jumper", 0, 0, Utc::now());

    let result = engine.add_xp(&mut user, 35, ActivityType::Research).unwrap();
    let level_up = result.level_up.unwrap();

    assert_eq!(level_up.levels, vec![2, 3, 4]);
    assert_eq!(level_up.levels_gained, 3);
    assert_eq!(level_up.rewards.coins, 23);
    assert_eq!(level_up.rewards.gems, 3);
    assert_eq!(level_up.rewards.streak_freezes, 1);
    assert_eq!((user.coins, user.gems), (23, 3));
    assert_eq!(result.level_progress, 50.0);
    assert_eq!(result.next_level_xp, Some(40));
}

#[test]
fn test_add_xp_counts_activity() {
    let table = curve(10);
    let engine = LevelEngine::new(&table);
    let mut user = UserAccount::new("counter", 0, 0, Utc::now());

    engine.add_xp(&mut user, 5, ActivityType::Search).unwrap();
    engine.add_xp(&mut user, 5, ActivityType::Innovation).unwrap();
    engine.add_xp(&mut user, 5, ActivityType::Research).unwrap();

    assert_eq!(user.total_searches, 1);
    assert_eq!(user.total_innovations, 1);
    assert_eq!(user.total_quizzes_taken, 0);
    assert_eq!(user.xp, 15);
}
