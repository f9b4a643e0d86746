//! Request layer for the paper-trading ledger
//!
//! No transport lives here. A server (or the CLI `replay` command) hands a
//! [`Request`] to [`LedgerService::dispatch`] and sends back the
//! [`ApiReply`] status and body unchanged.
//!
//! | op | status on success |
//! |----|-------------------|
//! | `health`, `balances`, `list_trades`, `fee_check`, `valuation`, `reset` | 200 |
//! | `create_trade`, `create_grid` | 201 |
//! | `delete_trade`, `delete_all_trades` | 204 |
//!
//! Errors: invalid argument 400, not found 404, open trade limit 409,
//! insufficient balance 422.

mod requests;
mod service;

pub use requests::{ApiReply, CreateTradeRequest, FeeCheckBody, GridRequest, Request};
pub use service::LedgerService;
