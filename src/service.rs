//! Gamification service.
//!
//! Composes the level engine, the streak engine and the stores over one
//! SQLite database. Every mutating call runs in a single `BEGIN IMMEDIATE`
//! transaction: the write lock is held from the first read of the user row
//! until commit, so concurrent updates to the same user are serialized and
//! a failed call leaves nothing behind.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::achievements::{
    default_achievements, Achievement, AchievementManager, AchievementStatus, UserStats, UserTitle,
};
use crate::challenges::{default_challenge_templates, ChallengeManager, ChallengeStatus, DailyChallenge};
use crate::economy::{Balance, Currency, CurrencyTransaction, EconomyManager};
use crate::error::{RewardError, RewardResult};
use crate::leaderboard::{LeaderboardCategory, LeaderboardEntry, LeaderboardService};
use crate::levels::{LevelEngine, LevelTable, LevelUp, UserLevelProgress, XpResult};
use crate::power_ups::{default_power_ups, PowerUpActivation, PowerUpManager, PowerUpStatus};
use crate::rewards::login::{LOGIN_COINS_PER_DAY, LOGIN_XP_PER_DAY};
use crate::rewards::{
    advance_login_streak, calculate_rewards, streak_bonus, sum_rewards, ActivityCompletion,
    ActivityType, LoginStreakResult, StreakBonus,
};
use crate::storage::{AppConfig, Catalog, CatalogStore, Database, StreakStore, UserAccount, UserStore};
use crate::streaks::engine::{self as streak_engine, ActivityOutcome, StreakRules};
use crate::streaks::{
    default_streak_rewards, format_countdown, parse_streak_type, FreezeResult, Streak,
    StreakActionResult, StreakFreeze, StreakRewardStatus, StreakType,
};

/// Ledger source tags.
const SOURCE_SIGNUP: &str = "signup_bonus";
const SOURCE_LEVEL_UP: &str = "level_up";
const SOURCE_MILESTONE: &str = "streak_milestone";
const SOURCE_LOGIN: &str = "login_streak";
const SOURCE_CHALLENGE: &str = "daily_challenge";
const SOURCE_ACTIVITY: &str = "activity";

/// Entry point for every reward operation.
pub struct GamificationService {
    db: Database,
    catalog: Catalog,
    config: AppConfig,
}

impl GamificationService {
    /// Open the database in the configured data directory.
    pub fn open(config: AppConfig) -> RewardResult<Self> {
        let db = Database::open(&config.database_path())?;
        Self::with_database(db, config)
    }

    /// Service over a private in-memory database.
    pub fn open_in_memory(config: AppConfig) -> RewardResult<Self> {
        Self::with_database(Database::open_in_memory()?, config)
    }

    /// Seed the default catalog where missing, then load it.
    pub fn with_database(mut db: Database, config: AppConfig) -> RewardResult<Self> {
        let tx = db.write_transaction()?;
        seed_defaults(&tx, &config)?;
        tx.commit()?;

        let catalog = CatalogStore::new(db.connection()).load()?;
        Ok(Self { db, catalog, config })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // Users

    /// Create a user with the configured starting balances.
    pub fn create_user(&mut self, username: &str, now: DateTime<Utc>) -> RewardResult<UserAccount> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RewardError::InvalidArgument("username must not be empty".to_string()));
        }

        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        if users.get_by_username(username)?.is_some() {
            return Err(RewardError::InvalidArgument(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let economy = &self.config.economy;
        let mut account = UserAccount::new(username, 0, 0, now);
        account.credit(Currency::Coins, economy.starting_coins);
        account.credit(Currency::Gems, economy.starting_gems);
        users.insert(&account)?;
        EconomyManager::new(&tx).record_credits(
            account.id,
            economy.starting_coins,
            economy.starting_gems,
            SOURCE_SIGNUP,
            now,
        )?;
        tx.commit()?;

        tracing::info!(user_id = %account.id, username, "User created");
        Ok(account)
    }

    pub fn get_user(&self, user_id: Uuid) -> RewardResult<UserAccount> {
        UserStore::new(self.db.connection()).require(user_id)
    }

    pub fn find_user(&self, username: &str) -> RewardResult<UserAccount> {
        UserStore::new(self.db.connection())
            .get_by_username(username)?
            .ok_or_else(|| RewardError::NotFound(format!("user '{}'", username)))
    }

    // Levels

    /// Grant XP for an activity and settle any level-ups.
    ///
    /// The activity also counts toward today's daily challenges; rewards of
    /// challenges it completes are paid in the same transaction.
    pub fn add_xp(
        &mut self,
        user_id: Uuid,
        amount: i64,
        activity: ActivityType,
        now: DateTime<Utc>,
    ) -> RewardResult<XpResult> {
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        let result = grant_xp(&tx, &self.catalog, &self.config, &mut account, amount, activity, now)?;

        users.update(&account)?;
        tx.commit()?;

        tracing::info!(
            user_id = %user_id,
            amount,
            activity = %activity,
            level = result.level,
            "XP added"
        );
        Ok(result)
    }

    /// Grant XP for a free-form activity tag.
    ///
    /// Unrecognised tags are logged and recorded as general activity.
    pub fn add_xp_tagged(
        &mut self,
        user_id: Uuid,
        amount: i64,
        tag: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<XpResult> {
        let activity = ActivityType::from_str(tag).unwrap_or_else(|| {
            tracing::warn!(tag, "Unrecognised activity tag, recording as general");
            ActivityType::General
        });
        self.add_xp(user_id, amount, activity, now)
    }

    /// Score a completed activity and grant what it earned.
    ///
    /// Coins and gems go through the ledger, XP through [`Self::add_xp`]'s
    /// path. A score that earns no XP leaves counters and challenges alone.
    pub fn complete_activity(
        &mut self,
        user_id: Uuid,
        activity: ActivityType,
        base_xp: u32,
        performance: f64,
        now: DateTime<Utc>,
    ) -> RewardResult<ActivityCompletion> {
        if base_xp == 0 {
            return Err(RewardError::InvalidArgument("base XP must be positive, got 0".to_string()));
        }
        let rewards = calculate_rewards(activity, base_xp as u64, performance);

        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        account.credit(Currency::Coins, rewards.coin_reward);
        account.credit(Currency::Gems, rewards.gem_reward);
        EconomyManager::new(&tx).record_credits(
            user_id,
            rewards.coin_reward,
            rewards.gem_reward,
            SOURCE_ACTIVITY,
            now,
        )?;

        let xp = if rewards.xp_reward > 0 {
            let amount = rewards.xp_reward as i64;
            Some(grant_xp(&tx, &self.catalog, &self.config, &mut account, amount, activity, now)?)
        } else {
            account.updated_at = now;
            None
        };

        users.update(&account)?;
        tx.commit()?;

        tracing::info!(
            user_id = %user_id,
            activity = %activity,
            performance = rewards.performance_score,
            xp = rewards.xp_reward,
            coins = rewards.coin_reward,
            "Activity completed"
        );
        Ok(ActivityCompletion { rewards, xp })
    }

    pub fn level_progress(&self, user_id: Uuid) -> RewardResult<UserLevelProgress> {
        let account = self.get_user(user_id)?;
        Ok(LevelEngine::new(&self.catalog.levels).user_progress(&account))
    }

    pub fn level_table(&self) -> &LevelTable {
        &self.catalog.levels
    }

    // Streaks

    /// Record streak activity, granting milestone rewards reached by it.
    pub fn record_activity(
        &mut self,
        user_id: Uuid,
        streak_type: StreakType,
        now: DateTime<Utc>,
    ) -> RewardResult<StreakActionResult> {
        let rules = StreakRules::from(&self.config.streaks);
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let streaks = StreakStore::new(&tx);
        let mut account = users.require(user_id)?;

        let (mut streak, outcome) = match streaks.get(user_id, streak_type)? {
            Some(mut streak) => {
                let outcome = streak_engine::record_activity(&mut streak, now, &rules);
                (streak, outcome)
            }
            None => {
                let streak = streak_engine::start_streak(user_id, streak_type, now, &rules);
                streaks.insert(&streak)?;
                tracing::info!(user_id = %user_id, streak_type = %streak_type, "Streak started");
                (streak, ActivityOutcome { created: true, ..Default::default() })
            }
        };

        let rewards = streak_engine::sweep_milestones(&mut streak, &self.catalog.streak_rewards);
        streak_engine::add_to_totals(&mut streak, &rewards);
        streaks.update(&streak)?;

        if !rewards.is_empty() {
            account.xp = account.xp.saturating_add(rewards.xp);
            account.credit(Currency::Coins, rewards.coins);
            account.credit(Currency::Gems, rewards.gems);
            EconomyManager::new(&tx).record_credits(
                user_id,
                rewards.coins,
                rewards.gems,
                SOURCE_MILESTONE,
                now,
            )?;

            let achievements = AchievementManager::new(&tx);
            for id in &rewards.achievements {
                achievements.unlock(user_id, id, now)?;
            }
            for title in &rewards.titles {
                achievements.grant_title(user_id, title, now)?;
            }
            let power_ups = PowerUpManager::new(&tx);
            for id in &rewards.power_ups {
                power_ups.grant_charges(user_id, id, 1)?;
            }
        }

        // Milestone XP can cross level thresholds.
        let level_up = LevelEngine::new(&self.catalog.levels).settle(&mut account);
        if let Some(level_up) = &level_up {
            apply_level_up(&tx, &account, level_up, now)?;
            streak.freeze_count += level_up.rewards.streak_freezes;
        }
        unlock_by_stats(&tx, &account, now)?;

        account.updated_at = now;
        users.update(&account)?;
        tx.commit()?;

        let next_milestone = streak_engine::next_milestone(&streak, &self.catalog.streak_rewards);
        let time_until_next_deadline = streak
            .next_activity_deadline
            .map(|deadline| format_countdown(now, deadline));

        Ok(StreakActionResult {
            success: true,
            message: activity_message(&streak, &outcome),
            streak_updated: outcome.created || outcome.incremented,
            new_count: streak.current_count,
            rewards_earned: rewards,
            next_milestone,
            time_until_next_deadline,
            level_up,
        })
    }

    /// Record streak activity for a streak type tag.
    pub fn record_activity_tagged(
        &mut self,
        user_id: Uuid,
        streak_type: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<StreakActionResult> {
        let streak_type = parse_streak_type(streak_type)?;
        self.record_activity(user_id, streak_type, now)
    }

    /// All streaks of a user.
    ///
    /// Lapsed streaks are reported and stored as broken; their counters are
    /// reset by the next activity.
    pub fn list_streaks(&mut self, user_id: Uuid, now: DateTime<Utc>) -> RewardResult<Vec<Streak>> {
        let tx = self.db.write_transaction()?;
        UserStore::new(&tx).require(user_id)?;
        let store = StreakStore::new(&tx);

        let mut streaks = store.list(user_id)?;
        for streak in &mut streaks {
            if streak_engine::refresh_status(streak, now) {
                store.update(streak)?;
            }
        }
        tx.commit()?;

        Ok(streaks)
    }

    /// Milestone rewards of a streak type with the user's progress on each.
    pub fn rewards_for_type(
        &self,
        user_id: Uuid,
        streak_type: StreakType,
    ) -> RewardResult<Vec<StreakRewardStatus>> {
        let conn = self.db.connection();
        UserStore::new(conn).require(user_id)?;
        let streak = StreakStore::new(conn).get(user_id, streak_type)?;

        Ok(self
            .catalog
            .streak_rewards_for(streak_type)
            .into_iter()
            .map(|reward| StreakRewardStatus {
                is_achieved: streak.as_ref().is_some_and(|s| s.has_achieved(reward.id)),
                reward: reward.clone(),
            })
            .collect())
    }

    /// Spend a freeze charge on a lapsed streak.
    ///
    /// `hours` defaults to the configured freeze duration and may not exceed
    /// the configured maximum.
    pub fn use_freeze(
        &mut self,
        user_id: Uuid,
        streak_type: StreakType,
        hours: Option<u32>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> RewardResult<FreezeResult> {
        let hours = hours.unwrap_or(self.config.streaks.default_freeze_hours);
        let max_hours = self.config.streaks.max_freeze_hours;
        if hours > max_hours {
            return Err(RewardError::InvalidArgument(format!(
                "freeze duration of {} hours exceeds the limit of {} hours",
                hours, max_hours
            )));
        }

        let tx = self.db.write_transaction()?;
        UserStore::new(&tx).require(user_id)?;
        let store = StreakStore::new(&tx);

        let mut streak = store.get(user_id, streak_type)?.ok_or_else(|| {
            RewardError::NotFound(format!("no {} streak for user {}", streak_type, user_id))
        })?;

        let record = streak_engine::freeze(&mut streak, hours, now, reason)?;
        store.update(&streak)?;
        store.log_freeze(&record)?;
        tx.commit()?;

        Ok(FreezeResult {
            success: true,
            message: format!("{} streak frozen for {} hours", streak_type, hours),
            freeze_expires_at: record.expires_at,
            remaining_freezes: streak.freeze_count,
        })
    }

    /// Freeze activations on one of the user's streaks, newest first.
    pub fn freeze_history(
        &self,
        user_id: Uuid,
        streak_type: StreakType,
    ) -> RewardResult<Vec<StreakFreeze>> {
        let store = StreakStore::new(self.db.connection());
        match store.get(user_id, streak_type)? {
            Some(streak) => store.freezes(streak.id),
            None => Ok(Vec::new()),
        }
    }

    /// Record a login for the legacy daily login counter.
    pub fn update_login_streak(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> RewardResult<LoginStreakResult> {
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        let streak_updated = advance_login_streak(&mut account, now);
        let mut streak_bonus_xp = 0;
        let mut streak_bonus_coins = 0;
        let mut level_up = None;

        if streak_updated {
            let days = account.daily_streak as u64;
            streak_bonus_xp = days * LOGIN_XP_PER_DAY;
            streak_bonus_coins = days * LOGIN_COINS_PER_DAY;

            account.xp = account.xp.saturating_add(streak_bonus_xp);
            account.credit(Currency::Coins, streak_bonus_coins);
            EconomyManager::new(&tx).record_credits(user_id, streak_bonus_coins, 0, SOURCE_LOGIN, now)?;

            level_up = LevelEngine::new(&self.catalog.levels).settle(&mut account);
            if let Some(level_up) = &level_up {
                apply_level_up(&tx, &account, level_up, now)?;
            }
            unlock_by_stats(&tx, &account, now)?;
        }

        users.update(&account)?;
        tx.commit()?;

        Ok(LoginStreakResult {
            daily_streak: account.daily_streak,
            streak_updated,
            streak_bonus_xp,
            streak_bonus_coins,
            next_streak_bonus: (account.daily_streak as u64 + 1) * LOGIN_XP_PER_DAY,
            level_up,
        })
    }

    /// Tiered login bonus for the user's current login streak.
    pub fn login_streak_bonus(&self, user_id: Uuid) -> RewardResult<StreakBonus> {
        Ok(streak_bonus(self.get_user(user_id)?.daily_streak))
    }

    // Daily challenges

    /// Today's challenges with the user's progress on each.
    ///
    /// The day's set is generated on first request and progress rows are
    /// created for the user as needed.
    pub fn daily_challenges(
        &mut self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> RewardResult<Vec<ChallengeStatus>> {
        let tx = self.db.write_transaction()?;
        UserStore::new(&tx).require(user_id)?;

        let challenges = todays_challenges(&tx, &self.config, now)?;
        let statuses = ChallengeManager::new(&tx).list_for_user(user_id, challenges)?;
        tx.commit()?;
        Ok(statuses)
    }

    // Economy

    pub fn earn(
        &mut self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        source: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<CurrencyTransaction> {
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        let entry = EconomyManager::new(&tx).earn(&mut account, currency, amount, source, now)?;
        users.update(&account)?;
        tx.commit()?;
        Ok(entry)
    }

    pub fn spend(
        &mut self,
        user_id: Uuid,
        currency: Currency,
        amount: i64,
        purpose: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<CurrencyTransaction> {
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        let entry = EconomyManager::new(&tx).spend(&mut account, currency, amount, purpose, now)?;
        users.update(&account)?;
        tx.commit()?;
        Ok(entry)
    }

    pub fn balance(&self, user_id: Uuid) -> RewardResult<Balance> {
        Ok(self.get_user(user_id)?.balance())
    }

    /// Ledger entries of a user, newest first.
    pub fn transactions(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> RewardResult<Vec<CurrencyTransaction>> {
        self.get_user(user_id)?;
        EconomyManager::new(self.db.connection()).transactions(user_id, limit, offset)
    }

    // Power-ups

    pub fn list_power_ups(&self, user_id: Uuid, now: DateTime<Utc>) -> RewardResult<Vec<PowerUpStatus>> {
        let account = self.get_user(user_id)?;
        PowerUpManager::new(self.db.connection()).list_for_user(&account, now)
    }

    pub fn use_power_up(
        &mut self,
        user_id: Uuid,
        power_up_id: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<PowerUpActivation> {
        let tx = self.db.write_transaction()?;
        let users = UserStore::new(&tx);
        let mut account = users.require(user_id)?;

        let activation = PowerUpManager::new(&tx).use_power_up(&mut account, power_up_id, now)?;

        let purpose = format!("power_up:{}", power_up_id);
        let economy = EconomyManager::new(&tx);
        economy.record_debit(user_id, Currency::Coins, activation.coins_spent, &purpose, now)?;
        economy.record_debit(user_id, Currency::Gems, activation.gems_spent, &purpose, now)?;

        users.update(&account)?;
        tx.commit()?;
        Ok(activation)
    }

    // Achievements

    pub fn achievements(&self, user_id: Uuid) -> RewardResult<Vec<AchievementStatus>> {
        self.get_user(user_id)?;
        AchievementManager::new(self.db.connection()).list_for_user(user_id)
    }

    pub fn titles(&self, user_id: Uuid) -> RewardResult<Vec<UserTitle>> {
        self.get_user(user_id)?;
        AchievementManager::new(self.db.connection()).titles(user_id)
    }

    // Leaderboard

    pub fn leaderboard(
        &self,
        category: LeaderboardCategory,
        limit: u32,
    ) -> RewardResult<Vec<LeaderboardEntry>> {
        LeaderboardService::new(self.db.connection()).top(category, limit)
    }
}

fn seed_defaults(conn: &Connection, config: &AppConfig) -> RewardResult<()> {
    let catalog = CatalogStore::new(conn);
    catalog.seed_levels(&LevelTable::from_curve(&config.levels)?)?;
    AchievementManager::new(conn).seed(&default_achievements())?;
    PowerUpManager::new(conn).seed(&default_power_ups())?;
    catalog.seed_streak_rewards(&default_streak_rewards())?;
    Ok(())
}

/// Apply XP and everything it triggers to an account inside a transaction.
///
/// Challenge rewards land before the level is recomputed so their XP counts
/// toward the same settlement.
fn grant_xp(
    conn: &Connection,
    catalog: &Catalog,
    config: &AppConfig,
    account: &mut UserAccount,
    amount: i64,
    activity: ActivityType,
    now: DateTime<Utc>,
) -> RewardResult<XpResult> {
    let challenges = todays_challenges(conn, config, now)?;
    let completed = ChallengeManager::new(conn).record_activity(account.id, activity, &challenges, now)?;
    let challenge_rewards = sum_rewards(&completed);
    if !challenge_rewards.is_empty() {
        account.xp = account.xp.saturating_add(challenge_rewards.xp);
        account.credit(Currency::Coins, challenge_rewards.coins);
        account.credit(Currency::Gems, challenge_rewards.gems);
        EconomyManager::new(conn).record_credits(
            account.id,
            challenge_rewards.coins,
            challenge_rewards.gems,
            SOURCE_CHALLENGE,
            now,
        )?;
    }

    let mut result = LevelEngine::new(&catalog.levels).add_xp(account, amount, activity)?;
    account.updated_at = now;

    if let Some(level_up) = &result.level_up {
        apply_level_up(conn, account, level_up, now)?;
    }
    result.achievements_unlocked = unlock_by_stats(conn, account, now)?
        .into_iter()
        .map(|a| a.id)
        .collect();
    result.challenges_completed = completed.into_iter().map(|c| c.id).collect();
    result.challenge_rewards = challenge_rewards;
    Ok(result)
}

fn todays_challenges(
    conn: &Connection,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> RewardResult<Vec<DailyChallenge>> {
    ChallengeManager::new(conn).ensure_for_day(
        &default_challenge_templates(),
        now.date_naive(),
        config.challenges.per_day as usize,
    )
}

/// Log level-up credits and hand out streak freezes to every streak the user owns.
fn apply_level_up(
    conn: &Connection,
    account: &UserAccount,
    level_up: &LevelUp,
    now: DateTime<Utc>,
) -> RewardResult<()> {
    let rewards = &level_up.rewards;
    EconomyManager::new(conn).record_credits(account.id, rewards.coins, rewards.gems, SOURCE_LEVEL_UP, now)?;
    StreakStore::new(conn).add_freezes_for_user(account.id, rewards.streak_freezes)?;
    Ok(())
}

fn unlock_by_stats(
    conn: &Connection,
    account: &UserAccount,
    now: DateTime<Utc>,
) -> RewardResult<Vec<Achievement>> {
    let daily_count = StreakStore::new(conn)
        .get(account.id, StreakType::Daily)?
        .map(|s| s.current_count)
        .unwrap_or(0);
    let stats = UserStats::from_account(account, daily_count);
    AchievementManager::new(conn).check_and_unlock(account.id, &stats, now)
}

fn activity_message(streak: &Streak, outcome: &ActivityOutcome) -> String {
    if outcome.created {
        format!("Started a new {} streak", streak.streak_type)
    } else if outcome.broke {
        format!("Your {} streak lapsed and has restarted", streak.streak_type)
    } else if outcome.incremented {
        format!("{} streak is now {}", streak.streak_type, streak.current_count)
    } else {
        format!("Activity recorded, {} streak already counted for now", streak.streak_type)
    }
}
