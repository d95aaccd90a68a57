//! Integration tests for balances, the ledger, users and the leaderboard.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamekeeper::economy::TransactionKind;
use gamekeeper::{
    ActivityType, AppConfig, Currency, GamificationService, LeaderboardCategory, RewardError,
};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap()
}

fn service() -> GamificationService {
    GamificationService::open_in_memory(AppConfig::default()).unwrap()
}

#[test]
fn test_earn_and_spend_update_ledger() {
    let mut svc = service();
    let user = svc.create_user("saver", t0()).unwrap();

    svc.earn(user.id, Currency::Coins, 40, "quiz_bonus", t0()).unwrap();
    let spent = svc
        .spend(user.id, Currency::Gems, 4, "avatar", t0() + Duration::minutes(1))
        .unwrap();
    assert_eq!(spent.kind, TransactionKind::Spent);

    let balance = svc.balance(user.id).unwrap();
    assert_eq!((balance.coins, balance.gems), (140, 6));
    assert_eq!(balance.total_earned_coins, 140);
    assert_eq!(balance.total_spent_gems, 4);

    let ledger = svc.transactions(user.id, 10, 0).unwrap();
    assert_eq!(ledger.len(), 4);
    assert_eq!(ledger[0].source, "avatar");
    assert_eq!(ledger[1].source, "quiz_bonus");

    let page = svc.transactions(user.id, 2, 2).unwrap();
    assert!(page.iter().all(|t| t.source == "signup_bonus"));
}

#[test]
fn test_overdraft_rejected() {
    let mut svc = service();
    let user = svc.create_user("spender", t0()).unwrap();

    let err = svc.spend(user.id, Currency::Coins, 101, "sofa", t0()).unwrap_err();
    match err {
        RewardError::InsufficientResource { needed, available, .. } => {
            assert_eq!((needed, available), (101, 100));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = svc.earn(user.id, Currency::Gems, 0, "nothing", t0()).unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));

    assert_eq!(svc.balance(user.id).unwrap().coins, 100);
    assert_eq!(svc.transactions(user.id, 10, 0).unwrap().len(), 2);
}

#[test]
fn test_users() {
    let mut svc = service();
    let user = svc.create_user("  padded  ", t0()).unwrap();
    assert_eq!(user.username, "padded");
    assert_eq!((user.level, user.xp), (1, 0));
    assert_eq!(svc.find_user("padded").unwrap().id, user.id);

    assert!(matches!(svc.create_user("   ", t0()), Err(RewardError::InvalidArgument(_))));
    assert!(matches!(svc.find_user("nobody"), Err(RewardError::NotFound(_))));
    assert!(matches!(svc.balance(Uuid::new_v4()), Err(RewardError::NotFound(_))));
}

#[test]
fn test_leaderboard_ranks() {
    let mut svc = service();
    let ids: Vec<Uuid> = ["ana", "bo", "cy"]
        .iter()
        .map(|name| svc.create_user(name, t0()).unwrap().id)
        .collect();

    svc.add_xp(ids[0], 50, ActivityType::General, t0()).unwrap();
    svc.add_xp(ids[1], 500, ActivityType::General, t0()).unwrap();
    svc.add_xp(ids[2], 120, ActivityType::General, t0()).unwrap();
    svc.earn(ids[0], Currency::Coins, 1000, "gift", t0()).unwrap();

    let by_xp = svc.leaderboard(LeaderboardCategory::Xp, 10).unwrap();
    let names: Vec<&str> = by_xp.iter().map(|e| e.username.as_str()).collect();
    assert_eq!(names, vec!["bo", "cy", "ana"]);
    assert_eq!(by_xp[0].rank, 1);
    assert_eq!(by_xp[0].score, 500);

    let by_coins = svc.leaderboard(LeaderboardCategory::Coins, 1).unwrap();
    assert_eq!(by_coins.len(), 1);
    assert_eq!(by_coins[0].username, "ana");
    assert_eq!(by_coins[0].score, 1100);
}

/// A perfect quiz earns boosted XP, coins and a gem
#[test]
fn test_complete_activity_pays_scored_rewards() {
    let mut svc = service();
    let user = svc.create_user("scholar", t0()).unwrap();

    let completion = svc
        .complete_activity(user.id, ActivityType::Quiz, 100, 1.0, t0())
        .unwrap();
    assert_eq!(completion.rewards.xp_reward, 180);
    assert_eq!(completion.rewards.coin_reward, 82);
    assert_eq!(completion.rewards.gem_reward, 1);
    let xp = completion.xp.expect("xp granted");
    assert_eq!(xp.xp_earned, 180);

    let stored = svc.get_user(user.id).unwrap();
    assert_eq!(stored.xp, 180);
    assert_eq!((stored.coins, stored.gems), (182, 11));
    assert_eq!(stored.total_quizzes_taken, 1);

    let activity_rows = svc
        .transactions(user.id, 10, 0)
        .unwrap()
        .into_iter()
        .filter(|t| t.source == "activity")
        .count();
    assert_eq!(activity_rows, 2);
}

#[test]
fn test_complete_activity_zero_score() {
    let mut svc = service();
    let user = svc.create_user("absent", t0()).unwrap();

    let completion = svc
        .complete_activity(user.id, ActivityType::Search, 50, 0.0, t0())
        .unwrap();
    assert!(completion.xp.is_none());
    assert_eq!(completion.rewards.coin_reward, 0);

    let stored = svc.get_user(user.id).unwrap();
    assert_eq!((stored.xp, stored.total_searches), (0, 0));
    assert_eq!(svc.transactions(user.id, 10, 0).unwrap().len(), 2);

    let err = svc
        .complete_activity(user.id, ActivityType::Search, 0, 1.0, t0())
        .unwrap_err();
    assert!(matches!(err, RewardError::InvalidArgument(_)));
}
