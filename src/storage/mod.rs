//! Storage module for database and configuration.

pub mod catalog_store;
pub mod config;
pub mod database;
pub mod schema;
pub mod streak_store;
pub mod user_store;

pub use catalog_store::{Catalog, CatalogStore};
pub use config::{AppConfig, ChallengeSettings, EconomySettings, LevelSettings, StreakSettings};
pub use database::{Database, DatabaseError};
pub use streak_store::StreakStore;
pub use user_store::{UserAccount, UserStore};
