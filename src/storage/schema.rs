//! Database schema definitions.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    coins INTEGER NOT NULL DEFAULT 0,
    gems INTEGER NOT NULL DEFAULT 0,
    daily_streak INTEGER NOT NULL DEFAULT 0,
    last_login TEXT NOT NULL,
    total_searches INTEGER NOT NULL DEFAULT 0,
    total_quizzes_taken INTEGER NOT NULL DEFAULT 0,
    total_innovations INTEGER NOT NULL DEFAULT 0,
    total_earned_coins INTEGER NOT NULL DEFAULT 0,
    total_earned_gems INTEGER NOT NULL DEFAULT 0,
    total_spent_coins INTEGER NOT NULL DEFAULT 0,
    total_spent_gems INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Level table (configuration)
CREATE TABLE IF NOT EXISTS levels (
    level INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    min_xp INTEGER NOT NULL,
    max_xp INTEGER NOT NULL,
    rewards_json TEXT NOT NULL DEFAULT '{}',
    unlocked_features_json TEXT NOT NULL DEFAULT '[]'
);

-- Achievement catalog (configuration)
CREATE TABLE IF NOT EXISTS achievements (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    icon TEXT NOT NULL,
    category TEXT NOT NULL,
    rarity TEXT NOT NULL DEFAULT 'common',
    criteria_type TEXT NOT NULL,
    criteria_value INTEGER NOT NULL
);

-- Power-up catalog (configuration)
CREATE TABLE IF NOT EXISTS power_ups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    icon TEXT NOT NULL,
    category TEXT NOT NULL,
    effect_type TEXT NOT NULL,
    effect_value REAL NOT NULL,
    duration_secs INTEGER NOT NULL DEFAULT 0,
    cost_coins INTEGER NOT NULL DEFAULT 0,
    cost_gems INTEGER NOT NULL DEFAULT 0,
    max_uses_per_day INTEGER NOT NULL DEFAULT 3
);

-- Streak milestone rewards (configuration)
CREATE TABLE IF NOT EXISTS streak_rewards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    streak_type TEXT NOT NULL,
    milestone INTEGER NOT NULL,
    xp_reward INTEGER NOT NULL DEFAULT 0,
    coin_reward INTEGER NOT NULL DEFAULT 0,
    gem_reward INTEGER NOT NULL DEFAULT 0,
    power_up_id TEXT,
    achievement_id TEXT,
    title_reward TEXT,
    xp_multiplier REAL NOT NULL DEFAULT 1.0,
    coin_multiplier REAL NOT NULL DEFAULT 1.0,
    bonus_duration_hours INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    UNIQUE(streak_type, milestone)
);

CREATE INDEX IF NOT EXISTS idx_streak_rewards_type ON streak_rewards(streak_type, milestone);

-- Streaks: at most one row per (user, streak type)
CREATE TABLE IF NOT EXISTS streaks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    streak_type TEXT NOT NULL,
    current_count INTEGER NOT NULL DEFAULT 0,
    longest_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active',
    start_date TEXT NOT NULL,
    last_activity_date TEXT NOT NULL,
    next_activity_deadline TEXT,
    freeze_count INTEGER NOT NULL DEFAULT 0,
    frozen_until TEXT,
    total_xp_earned INTEGER NOT NULL DEFAULT 0,
    total_coins_earned INTEGER NOT NULL DEFAULT 0,
    total_gems_earned INTEGER NOT NULL DEFAULT 0,
    milestones_achieved_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, streak_type)
);

-- Streak freeze activations (append-only)
CREATE TABLE IF NOT EXISTS streak_freezes (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    streak_id TEXT NOT NULL REFERENCES streaks(id) ON DELETE CASCADE,
    freeze_duration_hours INTEGER NOT NULL,
    used_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    reason TEXT
);

CREATE INDEX IF NOT EXISTS idx_streak_freezes_streak ON streak_freezes(streak_id);

-- Unlocked achievements
CREATE TABLE IF NOT EXISTS user_achievements (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    achievement_id TEXT NOT NULL REFERENCES achievements(id),
    unlocked_at TEXT NOT NULL,
    PRIMARY KEY (user_id, achievement_id)
);

-- Unlocked titles
CREATE TABLE IF NOT EXISTS user_titles (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    PRIMARY KEY (user_id, title)
);

-- Power-up usage and granted charges
CREATE TABLE IF NOT EXISTS user_power_ups (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    power_up_id TEXT NOT NULL REFERENCES power_ups(id),
    uses_today INTEGER NOT NULL DEFAULT 0,
    last_used TEXT,
    bonus_charges INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, power_up_id)
);

-- Currency ledger (append-only)
CREATE TABLE IF NOT EXISTS currency_transactions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    currency TEXT NOT NULL,
    amount INTEGER NOT NULL,
    source TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_currency_transactions_user ON currency_transactions(user_id, created_at);
"#;

/// Version 2: daily challenges and per-user progress.
pub const SCHEMA_V2: &str = r#"
-- Challenges offered on a day, one row per (day, kind)
CREATE TABLE IF NOT EXISTS daily_challenges (
    id TEXT PRIMARY KEY,
    challenge_date TEXT NOT NULL,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    difficulty TEXT NOT NULL DEFAULT 'medium',
    target_value INTEGER NOT NULL,
    xp_reward INTEGER NOT NULL DEFAULT 0,
    coin_reward INTEGER NOT NULL DEFAULT 0,
    gem_reward INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1,
    UNIQUE(challenge_date, kind)
);

CREATE INDEX IF NOT EXISTS idx_daily_challenges_date ON daily_challenges(challenge_date);

-- Per-user challenge progress, created lazily
CREATE TABLE IF NOT EXISTS user_daily_challenges (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    challenge_id TEXT NOT NULL REFERENCES daily_challenges(id) ON DELETE CASCADE,
    progress INTEGER NOT NULL DEFAULT 0,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    PRIMARY KEY (user_id, challenge_id)
);
"#;

/// Schema version table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;
