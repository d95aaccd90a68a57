//! Reward aggregation.
//!
//! Level-up rewards and streak milestone rewards are summed through the same
//! [`sum_rewards`] function so both engines share one aggregation contract.

use serde::{Deserialize, Serialize};

/// A configured payout that can be folded into a [`RewardBundle`].
///
/// Every method defaults to "grants nothing" so implementors only describe
/// the parts of the payout they carry.
pub trait RewardSource {
    fn xp(&self) -> u64 {
        0
    }

    fn coins(&self) -> u64 {
        0
    }

    fn gems(&self) -> u64 {
        0
    }

    fn streak_freezes(&self) -> u32 {
        0
    }

    fn achievement(&self) -> Option<&str> {
        None
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn power_up(&self) -> Option<&str> {
        None
    }
}

/// Summed payout of one or more reward configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    pub xp: u64,
    pub coins: u64,
    pub gems: u64,
    #[serde(default)]
    pub streak_freezes: u32,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub power_ups: Vec<String>,
}

impl RewardBundle {
    /// True when the bundle grants nothing at all.
    pub fn is_empty(&self) -> bool {
        self.xp == 0
            && self.coins == 0
            && self.gems == 0
            && self.streak_freezes == 0
            && self.achievements.is_empty()
            && self.titles.is_empty()
            && self.power_ups.is_empty()
    }

    /// Fold a single reward source into this bundle.
    pub fn add<R: RewardSource + ?Sized>(&mut self, reward: &R) {
        self.xp += reward.xp();
        self.coins += reward.coins();
        self.gems += reward.gems();
        self.streak_freezes += reward.streak_freezes();

        if let Some(id) = reward.achievement() {
            self.achievements.push(id.to_string());
        }
        if let Some(title) = reward.title() {
            self.titles.push(title.to_string());
        }
        if let Some(id) = reward.power_up() {
            self.power_ups.push(id.to_string());
        }
    }
}

/// Sum every matched reward configuration into one bundle.
///
/// Pure: callers decide how the totals are applied to balances.
pub fn sum_rewards<'a, R, I>(rewards: I) -> RewardBundle
where
    R: RewardSource + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut bundle = RewardBundle::default();
    for reward in rewards {
        bundle.add(reward);
    }
    bundle
}
