//! Virtual economy: coins, gems and the transaction ledger.

pub mod manager;
pub mod types;

pub use manager::EconomyManager;
pub use types::{Balance, Currency, CurrencyTransaction, TransactionKind};
