//! Request and reply bodies for the ledger service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::common::errors::LedgerError;
use crate::common::types::NewTrade;
use crate::strategy::{FeeBasis, GridParams};

/// Body of a create-trade call
pub type CreateTradeRequest = NewTrade;

/// Body of a create-grid call
pub type GridRequest = GridParams;

/// Body of a fee-check call
///
/// `fee_amount` wins over `fee_rate` when both are present. With neither,
/// the ledger's scheduled rate for its current BNB balance is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCheckBody {
    pub spent_usdc: Decimal,
    pub qty: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub fee_rate: Option<Decimal>,
    #[serde(default)]
    pub fee_amount: Option<Decimal>,
    #[serde(default)]
    pub min_order_value: Option<Decimal>,
}

impl FeeCheckBody {
    /// Explicit fee basis, if the caller supplied one
    pub fn explicit_basis(&self) -> Option<FeeBasis> {
        match (self.fee_amount, self.fee_rate) {
            (Some(amount), _) => Some(FeeBasis::ByAmount(amount)),
            (None, Some(rate)) => Some(FeeBasis::ByRate(rate)),
            (None, None) => None,
        }
    }
}

/// One call against the ledger service, tagged by `op`
///
/// ```json
/// {"op": "create_grid", "symbol": "BTCUSDC", "lower_price": 100, ...}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Health,
    Balances,
    ListTrades,
    CreateTrade(CreateTradeRequest),
    DeleteTrade { id: u64 },
    DeleteAllTrades,
    CreateGrid(GridRequest),
    FeeCheck(FeeCheckBody),
    /// Value open trades at per-symbol prices, e.g. `{"BTCUSDC": "55000"}`
    Valuation { prices: BTreeMap<String, Decimal> },
    Reset,
}

impl Request {
    /// Name of the operation, as it appears in the `op` tag
    pub fn op(&self) -> &'static str {
        match self {
            Request::Health => "health",
            Request::Balances => "balances",
            Request::ListTrades => "list_trades",
            Request::CreateTrade(_) => "create_trade",
            Request::DeleteTrade { .. } => "delete_trade",
            Request::DeleteAllTrades => "delete_all_trades",
            Request::CreateGrid(_) => "create_grid",
            Request::FeeCheck(_) => "fee_check",
            Request::Valuation { .. } => "valuation",
            Request::Reset => "reset",
        }
    }
}

/// Status code plus JSON body, ready for any transport to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;

    /// Serialize `body` under `status`, degrading to a 500 reply if that fails
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => Self {
                status: 500,
                body: json!({ "error": "serialization", "message": e.to_string() }),
            },
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: Self::NO_CONTENT,
            body: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<LedgerError> for ApiReply {
    fn from(err: LedgerError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "error": err.kind(), "message": err.to_string() }),
        }
    }
}
