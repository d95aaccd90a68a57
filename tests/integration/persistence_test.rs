//! Integration tests for on-disk databases and configuration.

use chrono::{Duration, TimeZone, Utc};
use gamekeeper::achievements::AchievementManager;
use gamekeeper::storage::config::{load_config_from, save_config};
use gamekeeper::storage::Database;
use gamekeeper::streaks::StreakType;
use gamekeeper::{ActivityType, GamificationService};
use tempfile::TempDir;

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 8, 3, 18, 0, 0).unwrap();

    let user_id = {
        let config = load_config_from(dir.path()).unwrap();
        let mut svc = GamificationService::open(config).unwrap();
        let user = svc.create_user("durable", t0).unwrap();
        svc.add_xp(user.id, 150, ActivityType::Research, t0).unwrap();
        svc.record_activity(user.id, StreakType::Daily, t0).unwrap();
        user.id
    };
    assert!(dir.path().join("gamekeeper.db").exists());

    let config = load_config_from(dir.path()).unwrap();
    let mut svc = GamificationService::open(config).unwrap();

    let user = svc.find_user("durable").unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!((user.xp, user.level), (150, 2));

    // Reopening does not seed the catalog twice.
    assert_eq!(svc.catalog().streak_rewards.len(), 11);
    let db = Database::open(&dir.path().join("gamekeeper.db")).unwrap();
    assert_eq!(AchievementManager::new(db.connection()).all().unwrap().len(), 7);

    let result = svc
        .record_activity(user_id, StreakType::Daily, t0 + Duration::hours(14))
        .unwrap();
    assert_eq!(result.new_count, 2);
}

#[test]
fn test_config_drives_starting_balance() {
    let dir = TempDir::new().unwrap();
    let mut config = load_config_from(dir.path()).unwrap();
    config.economy.starting_coins = 0;
    config.economy.starting_gems = 3;
    save_config(&config).unwrap();

    let config = load_config_from(dir.path()).unwrap();
    let mut svc = GamificationService::open(config).unwrap();
    let user = svc.create_user("frugal", Utc::now()).unwrap();

    assert_eq!((user.coins, user.gems), (0, 3));
    assert_eq!(svc.transactions(user.id, 10, 0).unwrap().len(), 1);
}
