//! PaperLedger Library
//!
//! An in-memory paper-trading ledger for a trading bot: simulated balances,
//! a trade log, grid order planning and fee sufficiency checks.

pub mod api;
pub mod common;
pub mod config;
pub mod ledger;
pub mod strategy;

// Re-export commonly used types
pub use api::{ApiReply, LedgerService, Request};
pub use common::errors::{LedgerError, Result};
pub use common::types::{MarkToMarket, NewTrade, PositionValue, Trade, TradingPair, Valuation};
pub use config::types::AppConfig;
pub use ledger::{BalanceStore, TradeLedger};

// Strategy types
pub use strategy::{
    BnbRequirement, FeeBasis, FeeCheck, FeeCheckRequest, FeeChecker, FeeSchedule, GridParams,
    GridPlan, GridPlanner, PlannedLevel, Spacing, Weighting,
};
