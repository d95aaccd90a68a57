//! Currency operations and the transaction ledger.
//!
//! Balances live on the user row; every change to them is mirrored by an
//! append-only `currency_transactions` entry written through this manager.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::types::{Currency, CurrencyTransaction, TransactionKind};
use crate::error::{RewardError, RewardResult};
use crate::storage::database::{parse_timestamp, parse_uuid};
use crate::storage::user_store::UserAccount;

/// Ledger-backed currency manager.
pub struct EconomyManager<'a> {
    conn: &'a Connection,
}

impl<'a> EconomyManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Credit currency to the account and log it.
    pub fn earn(
        &self,
        account: &mut UserAccount,
        currency: Currency,
        amount: i64,
        source: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<CurrencyTransaction> {
        let amount = positive_amount(amount)?;
        account.credit(currency, amount);
        account.updated_at = now;

        let entry =
            CurrencyTransaction::new(account.id, TransactionKind::Earned, currency, amount, source, now);
        self.record(&entry)?;
        Ok(entry)
    }

    /// Debit currency from the account and log it.
    ///
    /// Fails with `InsufficientResource` when the balance is too low; nothing
    /// is changed in that case.
    pub fn spend(
        &self,
        account: &mut UserAccount,
        currency: Currency,
        amount: i64,
        purpose: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<CurrencyTransaction> {
        let amount = positive_amount(amount)?;
        account.debit(currency, amount)?;
        account.updated_at = now;

        tracing::info!(
            user_id = %account.id,
            currency = %currency,
            amount,
            purpose,
            "Currency spent"
        );

        let entry =
            CurrencyTransaction::new(account.id, TransactionKind::Spent, currency, amount, purpose, now);
        self.record(&entry)?;
        Ok(entry)
    }

    /// Log coin and gem credits that were already applied to the account.
    ///
    /// Zero amounts are skipped.
    pub fn record_credits(
        &self,
        user_id: Uuid,
        coins: u64,
        gems: u64,
        source: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<Vec<CurrencyTransaction>> {
        let mut entries = Vec::new();
        for (currency, amount) in [(Currency::Coins, coins), (Currency::Gems, gems)] {
            if amount == 0 {
                continue;
            }
            let entry =
                CurrencyTransaction::new(user_id, TransactionKind::Earned, currency, amount, source, now);
            self.record(&entry)?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Log a debit that was already applied to the account.
    pub fn record_debit(
        &self,
        user_id: Uuid,
        currency: Currency,
        amount: u64,
        purpose: &str,
        now: DateTime<Utc>,
    ) -> RewardResult<Option<CurrencyTransaction>> {
        if amount == 0 {
            return Ok(None);
        }
        let entry =
            CurrencyTransaction::new(user_id, TransactionKind::Spent, currency, amount, purpose, now);
        self.record(&entry)?;
        Ok(Some(entry))
    }

    /// Append a ledger entry.
    pub fn record(&self, entry: &CurrencyTransaction) -> RewardResult<()> {
        self.conn.execute(
            "INSERT INTO currency_transactions
             (id, user_id, kind, currency, amount, source, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.kind.as_str(),
                entry.currency.as_str(),
                entry.amount,
                entry.source,
                entry.description,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Ledger entries of a user, newest first.
    pub fn transactions(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> RewardResult<Vec<CurrencyTransaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, kind, currency, amount, source, description, created_at
             FROM currency_transactions
             WHERE user_id = ?1
             ORDER BY rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt.query_map(params![user_id.to_string(), limit, offset], |row| {
            let id: String = row.get(0)?;
            let user_id: String = row.get(1)?;
            let kind: String = row.get(2)?;
            let currency: String = row.get(3)?;
            let created_at: String = row.get(7)?;

            Ok(CurrencyTransaction {
                id: parse_uuid(0, &id)?,
                user_id: parse_uuid(1, &user_id)?,
                kind: TransactionKind::from_str(&kind).unwrap_or(TransactionKind::Earned),
                currency: Currency::from_str(&currency).unwrap_or(Currency::Coins),
                amount: row.get(4)?,
                source: row.get(5)?,
                description: row.get(6)?,
                created_at: parse_timestamp(7, &created_at)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(RewardError::from)
    }
}

fn positive_amount(amount: i64) -> RewardResult<u64> {
    if amount <= 0 {
        return Err(RewardError::InvalidArgument(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount as u64)
}
