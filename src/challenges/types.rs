//! Daily challenge types and the template catalog.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rewards::{ActivityType, RewardSource};

/// Activity a challenge counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Quiz,
    Search,
    Innovation,
    Learning,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Quiz => "quiz",
            ChallengeKind::Search => "search",
            ChallengeKind::Innovation => "innovation",
            ChallengeKind::Learning => "learning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "quiz" => Some(ChallengeKind::Quiz),
            "search" => Some(ChallengeKind::Search),
            "innovation" => Some(ChallengeKind::Innovation),
            "learning" => Some(ChallengeKind::Learning),
            _ => None,
        }
    }

    /// The challenge kind an XP activity advances, if any.
    pub fn for_activity(activity: ActivityType) -> Option<Self> {
        match activity {
            ActivityType::Quiz => Some(ChallengeKind::Quiz),
            ActivityType::Search => Some(ChallengeKind::Search),
            ActivityType::Innovation => Some(ChallengeKind::Innovation),
            ActivityType::Research => Some(ChallengeKind::Learning),
            ActivityType::General | ActivityType::DailyStreak | ActivityType::Achievement => None,
        }
    }

    /// The activity tag that advances this kind.
    pub fn activity(&self) -> ActivityType {
        match self {
            ChallengeKind::Quiz => ActivityType::Quiz,
            ChallengeKind::Search => ActivityType::Search,
            ChallengeKind::Innovation => ActivityType::Innovation,
            ChallengeKind::Learning => ActivityType::Research,
        }
    }
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Blueprint a day's challenges are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeTemplate {
    pub kind: ChallengeKind,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Activities needed to complete the challenge
    pub target_value: u32,
    pub xp_reward: u64,
    pub coin_reward: u64,
    pub gem_reward: u64,
}

impl ChallengeTemplate {
    /// Concrete challenge for one calendar day.
    pub fn for_day(&self, date: NaiveDate) -> DailyChallenge {
        DailyChallenge {
            id: format!("daily_{}_{}", date.format("%Y%m%d"), self.kind),
            challenge_date: date,
            kind: self.kind,
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            target_value: self.target_value,
            xp_reward: self.xp_reward,
            coin_reward: self.coin_reward,
            gem_reward: self.gem_reward,
        }
    }
}

/// A challenge offered on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenge {
    /// `daily_<yyyymmdd>_<kind>`
    pub id: String,
    pub challenge_date: NaiveDate,
    pub kind: ChallengeKind,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub target_value: u32,
    pub xp_reward: u64,
    pub coin_reward: u64,
    pub gem_reward: u64,
}

impl RewardSource for DailyChallenge {
    fn xp(&self) -> u64 {
        self.xp_reward
    }

    fn coins(&self) -> u64 {
        self.coin_reward
    }

    fn gems(&self) -> u64 {
        self.gem_reward
    }
}

/// One user's progress on one challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub user_id: Uuid,
    pub challenge_id: String,
    /// Activities counted so far, capped at the target
    pub progress: u32,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ChallengeProgress {
    pub fn new(user_id: Uuid, challenge_id: &str) -> Self {
        Self {
            user_id,
            challenge_id: challenge_id.to_string(),
            progress: 0,
            is_completed: false,
            completed_at: None,
        }
    }

    /// Count one activity. Returns true when this completed the challenge.
    pub fn advance(&mut self, target: u32, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        self.progress = (self.progress + 1).min(target);
        if self.progress >= target {
            self.is_completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }
}

/// A challenge as seen by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub challenge: DailyChallenge,
    pub progress: u32,
    /// Percent of the target reached
    pub progress_percent: f64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ChallengeStatus {
    pub fn new(challenge: DailyChallenge, progress: &ChallengeProgress) -> Self {
        let progress_percent = if challenge.target_value == 0 {
            100.0
        } else {
            progress.progress as f64 / challenge.target_value as f64 * 100.0
        };
        Self {
            challenge,
            progress: progress.progress,
            progress_percent,
            is_completed: progress.is_completed,
            completed_at: progress.completed_at,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    kind: ChallengeKind,
    title: &str,
    description: &str,
    difficulty: Difficulty,
    target_value: u32,
    xp_reward: u64,
    coin_reward: u64,
    gem_reward: u64,
) -> ChallengeTemplate {
    ChallengeTemplate {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        difficulty,
        target_value,
        xp_reward,
        coin_reward,
        gem_reward,
    }
}

/// Templates daily challenges are drawn from.
pub fn default_challenge_templates() -> Vec<ChallengeTemplate> {
    use ChallengeKind as K;
    use Difficulty as D;

    vec![
        template(K::Quiz, "Quiz Master", "Complete 3 quizzes today", D::Medium, 3, 200, 100, 2),
        template(K::Search, "Knowledge Hunter", "Perform 10 searches today", D::Easy, 10, 150, 75, 1),
        template(K::Innovation, "Innovation Creator", "Submit 1 innovation idea today", D::Hard, 1, 300, 150, 3),
        template(K::Learning, "Learning Path", "Complete 2 learning modules today", D::Medium, 2, 250, 125, 2),
    ]
}

/// Pick `count` templates for a day.
///
/// A window of consecutive templates that starts at the day number modulo
/// the catalog size, so every date maps to the same set and the set rotates
/// from one day to the next. Catalog order is kept.
pub fn select_for_day(
    templates: &[ChallengeTemplate],
    date: NaiveDate,
    count: usize,
) -> Vec<ChallengeTemplate> {
    let n = templates.len();
    if n == 0 || count == 0 {
        return Vec::new();
    }
    let count = count.min(n);
    let start = date.num_days_from_ce().rem_euclid(n as i32) as usize;

    let mut indices: Vec<usize> = (0..count).map(|i| (start + i) % n).collect();
    indices.sort_unstable();
    indices.into_iter().map(|i| templates[i].clone()).collect()
}
