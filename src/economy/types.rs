//! Currency and ledger types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spendable currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Regular currency earned through activity
    Coins,
    /// Premium currency
    Gems,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Coins => "coins",
            Currency::Gems => "gems",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "coins" => Some(Currency::Coins),
            "gems" => Some(Currency::Gems),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earned,
    Spent,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earned => "earned",
            TransactionKind::Spent => "spent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "earned" => Some(TransactionKind::Earned),
            "spent" => Some(TransactionKind::Spent),
            _ => None,
        }
    }
}

/// Append-only record of a balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub currency: Currency,
    pub amount: u64,
    /// Where the currency came from (earned) or what it bought (spent)
    pub source: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CurrencyTransaction {
    pub fn new(
        user_id: Uuid,
        kind: TransactionKind,
        currency: Currency,
        amount: u64,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            currency,
            amount,
            source: source.into(),
            description: None,
            created_at,
        }
    }
}

/// Current balances and lifetime totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub coins: u64,
    pub gems: u64,
    pub total_earned_coins: u64,
    pub total_earned_gems: u64,
    pub total_spent_coins: u64,
    pub total_spent_gems: u64,
}
