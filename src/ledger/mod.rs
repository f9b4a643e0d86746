//! In-memory paper-trading ledger
//!
//! - [`BalanceStore`]: per-asset balances, the only place a debit is allowed
//!   to fail for lack of funds
//! - [`TradeLedger`]: trade log plus balances behind a single lock

mod balances;
mod trades;

pub use balances::BalanceStore;
pub use trades::{TradeLedger, FIRST_TRADE_ID};
