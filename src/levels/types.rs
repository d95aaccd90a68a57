//! Level table types.

use serde::{Deserialize, Serialize};

use crate::error::{RewardError, RewardResult};
use crate::rewards::{RewardBundle, RewardSource};
use crate::storage::config::LevelSettings;

/// Rewards granted on reaching a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelRewards {
    pub coins: u64,
    pub gems: u64,
    pub streak_freezes: u32,
}

impl LevelRewards {
    pub fn is_empty(&self) -> bool {
        self.coins == 0 && self.gems == 0 && self.streak_freezes == 0
    }
}

impl RewardSource for LevelRewards {
    fn coins(&self) -> u64 {
        self.coins
    }

    fn gems(&self) -> u64 {
        self.gems
    }

    fn streak_freezes(&self) -> u32 {
        self.streak_freezes
    }
}

/// One row of the level table. The XP range is half-open: `[min_xp, max_xp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub level: u32,
    pub name: String,
    pub min_xp: u64,
    pub max_xp: u64,
    pub rewards: LevelRewards,
    pub unlocked_features: Vec<String>,
}

impl Level {
    /// Create a level without rewards or features.
    pub fn new(level: u32, min_xp: u64, max_xp: u64) -> Self {
        Self {
            level,
            name: format!("Level {}", level),
            min_xp,
            max_xp,
            rewards: LevelRewards::default(),
            unlocked_features: Vec::new(),
        }
    }

    pub fn with_rewards(mut self, rewards: LevelRewards) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.unlocked_features = features.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// Highest level whose `min_xp <= xp`.
///
/// Works on any slice, including ones with duplicate or gapped thresholds:
/// the highest qualifying level number always wins. Returns 1 when nothing
/// qualifies.
pub fn level_for_xp(levels: &[Level], xp: u64) -> u32 {
    levels
        .iter()
        .filter(|l| l.min_xp <= xp)
        .map(|l| l.level)
        .max()
        .unwrap_or(1)
}

/// Validated, ascending level table.
///
/// Invariants: non-empty, levels numbered 1..=n without gaps, first level
/// starts at 0 XP, every range is non-empty, and each level's `min_xp`
/// equals the previous level's `max_xp`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    levels: Vec<Level>,
}

impl LevelTable {
    /// Build a table, sorting by level number and validating the partition.
    pub fn new(mut levels: Vec<Level>) -> RewardResult<Self> {
        levels.sort_by_key(|l| l.level);
        Self::validate(&levels)?;
        Ok(Self { levels })
    }

    /// Build the default table from a level curve.
    pub fn from_curve(settings: &LevelSettings) -> RewardResult<Self> {
        if settings.max_level == 0 {
            return Err(RewardError::Config("max_level must be at least 1".to_string()));
        }

        let threshold = |level: u32| -> u64 {
            (settings.base_xp as f64 * (level as f64).powf(settings.exponent)).floor() as u64
        };

        let levels = (1..=settings.max_level)
            .map(|level| {
                Level::new(level, threshold(level - 1), threshold(level))
                    .with_rewards(default_rewards(level))
                    .with_features(&default_features(level))
            })
            .collect();

        Self::new(levels)
    }

    fn validate(levels: &[Level]) -> RewardResult<()> {
        let first = levels
            .first()
            .ok_or_else(|| RewardError::Config("level table is empty".to_string()))?;

        if first.level != 1 {
            return Err(RewardError::Config(format!(
                "level table must start at level 1, starts at {}",
                first.level
            )));
        }
        if first.min_xp != 0 {
            return Err(RewardError::Config(format!(
                "level 1 must start at 0 XP, starts at {}",
                first.min_xp
            )));
        }

        for level in levels {
            if level.min_xp >= level.max_xp {
                return Err(RewardError::Config(format!(
                    "level {} has an empty XP range [{}, {})",
                    level.level, level.min_xp, level.max_xp
                )));
            }
        }

        for pair in levels.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.level != prev.level + 1 {
                return Err(RewardError::Config(format!(
                    "level {} is followed by level {}",
                    prev.level, next.level
                )));
            }
            if next.min_xp != prev.max_xp {
                return Err(RewardError::Config(format!(
                    "level {} starts at {} XP but level {} ends at {} XP",
                    next.level, next.min_xp, prev.level, prev.max_xp
                )));
            }
        }

        Ok(())
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Highest defined level number.
    pub fn max_level(&self) -> u32 {
        self.levels.last().map(|l| l.level).unwrap_or(1)
    }

    pub fn get(&self, level: u32) -> Option<&Level> {
        // Levels are numbered 1..=n without gaps.
        level
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx as usize))
    }

    pub fn level_for_xp(&self, xp: u64) -> u32 {
        level_for_xp(&self.levels, xp)
    }

    /// Sum the rewards of every level in `(from, to]`.
    pub fn rewards_between(&self, from: u32, to: u32) -> RewardBundle {
        let crossed = self
            .levels
            .iter()
            .filter(|l| l.level > from && l.level <= to)
            .map(|l| &l.rewards);
        crate::rewards::sum_rewards(crossed)
    }

    /// Union of features unlocked by every level up to and including `level`.
    pub fn features_through(&self, level: u32) -> Vec<String> {
        let mut features: Vec<String> = Vec::new();
        for l in self.levels.iter().filter(|l| l.level <= level) {
            for feature in &l.unlocked_features {
                if !features.contains(feature) {
                    features.push(feature.clone());
                }
            }
        }
        features
    }
}

fn default_rewards(level: u32) -> LevelRewards {
    let mut rewards = LevelRewards::default();
    let lvl = level as u64;

    if level % 5 == 0 {
        rewards.coins = lvl * 50;
    }
    if level % 10 == 0 {
        rewards.coins = lvl * 100;
        rewards.gems = 1;
        rewards.streak_freezes = 1;
    }
    if level % 25 == 0 {
        rewards.coins = lvl * 200;
        rewards.gems = 5;
    }

    rewards
}

fn default_features(level: u32) -> Vec<&'static str> {
    let mut features = Vec::new();
    if level >= 5 {
        features.push("team_creation");
    }
    if level >= 10 {
        features.push("custom_avatar");
    }
    if level >= 15 {
        features.push("premium_quizzes");
    }
    if level >= 25 {
        features.push("mentor_mode");
    }
    features
}
