//! Integration tests for power-up purchases and milestone charges.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamekeeper::streaks::StreakType;
use gamekeeper::{AppConfig, Currency, GamificationService, RewardError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap()
}

fn service() -> GamificationService {
    GamificationService::open_in_memory(AppConfig::default()).unwrap()
}

#[test]
fn test_purchase_debits_both_currencies() {
    let mut svc = service();
    let user = svc.create_user("hinter", t0()).unwrap();

    let activation = svc.use_power_up(user.id, "hint", t0()).unwrap();
    assert!(!activation.used_bonus_charge);
    assert_eq!((activation.coins_spent, activation.gems_spent), (25, 1));
    assert_eq!(activation.remaining_uses, 4);

    let balance = svc.balance(user.id).unwrap();
    assert_eq!((balance.coins, balance.gems), (75, 9));

    let debits: Vec<_> = svc
        .transactions(user.id, 10, 0)
        .unwrap()
        .into_iter()
        .filter(|t| t.source == "power_up:hint")
        .collect();
    assert_eq!(debits.len(), 2);
}

#[test]
fn test_purchase_failures() {
    let mut svc = service();
    let user = svc.create_user("broke", t0()).unwrap();

    let err = svc.use_power_up(user.id, "time_travel", t0()).unwrap_err();
    assert!(matches!(err, RewardError::NotFound(_)));

    svc.spend(user.id, Currency::Coins, 90, "hat", t0()).unwrap();
    let err = svc.use_power_up(user.id, "double_points", t0()).unwrap_err();
    assert!(matches!(err, RewardError::InsufficientResource { .. }));
    assert_eq!(svc.balance(user.id).unwrap().gems, 10);

    let statuses = svc.list_power_ups(user.id, t0()).unwrap();
    let double = statuses.iter().find(|s| s.power_up.id == "double_points").unwrap();
    assert!(!double.can_use);
    assert_eq!(double.uses_today, 0);
}

/// Daily limit resets on the next calendar day
#[test]
fn test_daily_limit() {
    let mut svc = service();
    let user = svc.create_user("eager", t0()).unwrap();
    svc.earn(user.id, Currency::Coins, 1000, "gift", t0()).unwrap();

    svc.use_power_up(user.id, "double_points", t0()).unwrap();
    let err = svc
        .use_power_up(user.id, "double_points", t0() + Duration::hours(1))
        .unwrap_err();
    assert!(matches!(err, RewardError::InvalidState(_)));

    let tomorrow = t0() + Duration::days(1);
    let statuses = svc.list_power_ups(user.id, tomorrow).unwrap();
    let double = statuses.iter().find(|s| s.power_up.id == "double_points").unwrap();
    assert_eq!(double.uses_today, 0);
    assert!(double.can_use);
    svc.use_power_up(user.id, "double_points", tomorrow).unwrap();
}

/// The 14-day milestone grants a free streak shield
#[test]
fn test_milestone_charge_is_free() {
    let mut svc = service();
    let user = svc.create_user("shielded", t0()).unwrap();
    for k in 0..14 {
        svc.record_activity(user.id, StreakType::Daily, t0() + Duration::hours(20 * k))
            .unwrap();
    }

    let now = t0() + Duration::hours(20 * 13);
    let statuses = svc.list_power_ups(user.id, now).unwrap();
    let shield = statuses.iter().find(|s| s.power_up.id == "streak_shield").unwrap();
    assert_eq!(shield.bonus_charges, 1);

    let coins_before = svc.balance(user.id).unwrap().coins;
    let activation = svc.use_power_up(user.id, "streak_shield", now).unwrap();
    assert!(activation.used_bonus_charge);
    assert_eq!(activation.remaining_bonus_charges, 0);
    assert_eq!(svc.balance(user.id).unwrap().coins, coins_before);
}
