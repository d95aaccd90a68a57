//! Consumable power-ups bought with coins and gems.

pub mod manager;
pub mod types;

pub use manager::PowerUpManager;
pub use types::{
    default_power_ups, EffectType, PowerUp, PowerUpActivation, PowerUpCategory, PowerUpStatus,
    PowerUpUsage,
};
