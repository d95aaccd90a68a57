//! Daily challenges: a rotating set of activity targets per calendar day.

pub mod manager;
pub mod types;

pub use manager::ChallengeManager;
pub use types::{
    default_challenge_templates, select_for_day, ChallengeKind, ChallengeProgress, ChallengeStatus,
    ChallengeTemplate, DailyChallenge, Difficulty,
};
