//! Gamekeeper command line
//!
//! Thin wrapper over [`GamificationService`]; every command prints its result
//! as JSON.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gamekeeper::storage::config::{load_config, load_config_from, save_config};
use gamekeeper::streaks::parse_streak_type;
use gamekeeper::{ActivityType, Currency, GamificationService, LeaderboardCategory, UserAccount};

#[derive(Parser)]
#[command(name = "gamekeeper", version, about = "XP, level and streak bookkeeping")]
struct Cli {
    /// Data directory (overrides GAMEKEEPER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database, seed the catalog and register a user
    Init { username: String },
    /// Grant XP for an activity
    AddXp {
        username: String,
        amount: i64,
        #[arg(long, default_value = "general")]
        activity: String,
    },
    /// Record streak activity (daily, weekly or monthly)
    Activity {
        username: String,
        #[arg(default_value = "daily")]
        streak_type: String,
    },
    /// Grant XP, coins and gems for a scored activity
    Complete {
        username: String,
        activity: String,
        base_xp: u32,
        /// Score in [0, 1]
        #[arg(long, default_value_t = 1.0)]
        performance: f64,
    },
    /// Record a login for the daily login counter
    Login {
        username: String,
        /// Show the tiered bonus for the current login streak without logging in
        #[arg(long)]
        preview: bool,
    },
    /// Today's daily challenges and progress
    Challenges { username: String },
    /// List a user's streaks
    Streaks { username: String },
    /// Milestone rewards for a streak type
    Rewards {
        username: String,
        #[arg(default_value = "daily")]
        streak_type: String,
    },
    /// Spend a freeze charge on a lapsed streak
    Freeze {
        username: String,
        streak_type: String,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Level progress
    Progress { username: String },
    /// Current balance and recent ledger entries
    Balance {
        username: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Credit currency
    Earn {
        username: String,
        currency: String,
        amount: i64,
        #[arg(long, default_value = "manual")]
        source: String,
    },
    /// Debit currency
    Spend {
        username: String,
        currency: String,
        amount: i64,
        #[arg(long, default_value = "manual")]
        purpose: String,
    },
    /// Power-ups available to a user, or activate one with --use
    PowerUps {
        username: String,
        #[arg(long = "use")]
        activate: Option<String>,
    },
    /// Achievements and titles
    Achievements { username: String },
    /// Top users for a category (xp, coins, level, streak)
    Leaderboard {
        #[arg(default_value = "xp")]
        category: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.data_dir {
        Some(dir) => load_config_from(dir)?,
        None => load_config()?,
    };

    tracing::debug!("Using data directory {}", config.data_dir.display());

    if matches!(cli.command, Command::Init { .. }) && !config.data_dir.join("config.toml").exists() {
        save_config(&config)?;
    }

    let mut service = GamificationService::open(config).context("failed to open database")?;
    run(&mut service, cli.command)
}

fn run(service: &mut GamificationService, command: Command) -> Result<()> {
    let now = Utc::now();

    match command {
        Command::Init { username } => print(&service.create_user(&username, now)?),
        Command::AddXp { username, amount, activity } => {
            let user = user(service, &username)?;
            print(&service.add_xp_tagged(user.id, amount, &activity, now)?)
        }
        Command::Activity { username, streak_type } => {
            let user = user(service, &username)?;
            print(&service.record_activity_tagged(user.id, &streak_type, now)?)
        }
        Command::Complete { username, activity, base_xp, performance } => {
            let user = user(service, &username)?;
            let activity = ActivityType::from_str(&activity)
                .ok_or_else(|| anyhow!("unknown activity '{}'", activity))?;
            print(&service.complete_activity(user.id, activity, base_xp, performance, now)?)
        }
        Command::Login { username, preview } => {
            let user = user(service, &username)?;
            if preview {
                print(&service.login_streak_bonus(user.id)?)
            } else {
                print(&service.update_login_streak(user.id, now)?)
            }
        }
        Command::Challenges { username } => {
            let user = user(service, &username)?;
            print(&service.daily_challenges(user.id, now)?)
        }
        Command::Streaks { username } => {
            let user = user(service, &username)?;
            print(&service.list_streaks(user.id, now)?)
        }
        Command::Rewards { username, streak_type } => {
            let user = user(service, &username)?;
            let streak_type = parse_streak_type(&streak_type)?;
            print(&service.rewards_for_type(user.id, streak_type)?)
        }
        Command::Freeze { username, streak_type, hours, reason } => {
            let user = user(service, &username)?;
            let streak_type = parse_streak_type(&streak_type)?;
            print(&service.use_freeze(user.id, streak_type, hours, reason, now)?)
        }
        Command::Progress { username } => {
            let user = user(service, &username)?;
            print(&service.level_progress(user.id)?)
        }
        Command::Balance { username, limit } => {
            let user = user(service, &username)?;
            print(&serde_json::json!({
                "balance": service.balance(user.id)?,
                "transactions": service.transactions(user.id, limit, 0)?,
            }))
        }
        Command::Earn { username, currency, amount, source } => {
            let user = user(service, &username)?;
            print(&service.earn(user.id, currency_arg(&currency)?, amount, &source, now)?)
        }
        Command::Spend { username, currency, amount, purpose } => {
            let user = user(service, &username)?;
            print(&service.spend(user.id, currency_arg(&currency)?, amount, &purpose, now)?)
        }
        Command::PowerUps { username, activate } => {
            let user = user(service, &username)?;
            match activate {
                Some(id) => print(&service.use_power_up(user.id, &id, now)?),
                None => print(&service.list_power_ups(user.id, now)?),
            }
        }
        Command::Achievements { username } => {
            let user = user(service, &username)?;
            print(&serde_json::json!({
                "achievements": service.achievements(user.id)?,
                "titles": service.titles(user.id)?,
            }))
        }
        Command::Leaderboard { category, limit } => {
            let category = LeaderboardCategory::from_str(&category)
                .ok_or_else(|| anyhow!("unknown leaderboard category '{}'", category))?;
            print(&service.leaderboard(category, limit)?)
        }
    }
}

fn user(service: &GamificationService, username: &str) -> Result<UserAccount> {
    Ok(service.find_user(username)?)
}

fn currency_arg(value: &str) -> Result<Currency> {
    Currency::from_str(&value.to_lowercase())
        .ok_or_else(|| anyhow!("unknown currency '{}', expected coins or gems", value))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
