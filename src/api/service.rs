//! Ledger service: maps external calls onto the engine

use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::requests::{ApiReply, CreateTradeRequest, FeeCheckBody, GridRequest, Request};
use crate::common::errors::Result;
use crate::config::types::AppConfig;
use crate::ledger::TradeLedger;
use crate::strategy::{FeeBasis, FeeCheckRequest, FeeChecker};

/// Transport-agnostic front for a [`TradeLedger`]
///
/// A server mounts one of these and forwards each endpoint to the matching
/// method; the reply already carries the status code to send.
#[derive(Debug, Clone)]
pub struct LedgerService {
    ledger: TradeLedger,
}

impl LedgerService {
    pub fn new(ledger: TradeLedger) -> Self {
        Self { ledger }
    }

    /// Build a fresh ledger from configuration and wrap it
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(TradeLedger::from_config(config)?))
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    /// Route one tagged request
    #[instrument(skip(self, request), fields(op = request.op()))]
    pub async fn dispatch(&self, request: Request) -> ApiReply {
        let reply = match request {
            Request::Health => self.health(),
            Request::Balances => self.balances().await,
            Request::ListTrades => self.list_trades().await,
            Request::CreateTrade(body) => self.create_trade(body).await,
            Request::DeleteTrade { id } => self.delete_trade(id).await,
            Request::DeleteAllTrades => self.delete_all_trades().await,
            Request::CreateGrid(body) => self.create_grid(body).await,
            Request::FeeCheck(body) => self.fee_check(body).await,
            Request::Valuation { prices } => self.valuation(prices).await,
            Request::Reset => self.reset().await,
        };
        debug!(status = reply.status, "Request handled");
        reply
    }

    pub fn health(&self) -> ApiReply {
        ApiReply::json(ApiReply::OK, &json!({ "status": "ok" }))
    }

    pub async fn balances(&self) -> ApiReply {
        ApiReply::json(ApiReply::OK, &self.ledger.balances().await)
    }

    pub async fn list_trades(&self) -> ApiReply {
        ApiReply::json(ApiReply::OK, &self.ledger.list().await)
    }

    pub async fn create_trade(&self, body: CreateTradeRequest) -> ApiReply {
        match self.ledger.create(body).await {
            Ok(trade) => ApiReply::json(ApiReply::CREATED, &trade),
            Err(err) => err.into(),
        }
    }

    /// Always 204: a missing id is not an error to the caller
    pub async fn delete_trade(&self, id: u64) -> ApiReply {
        if !self.ledger.delete_one(id).await {
            debug!(id, "Delete of unknown trade ignored");
        }
        ApiReply::no_content()
    }

    pub async fn delete_all_trades(&self) -> ApiReply {
        self.ledger.delete_all().await;
        ApiReply::no_content()
    }

    pub async fn create_grid(&self, body: GridRequest) -> ApiReply {
        match self.ledger.create_grid(body).await {
            Ok(trades) => ApiReply::json(ApiReply::CREATED, &json!({ "trades": trades })),
            Err(err) => err.into(),
        }
    }

    pub async fn fee_check(&self, body: FeeCheckBody) -> ApiReply {
        let fee = match body.explicit_basis() {
            Some(basis) => basis,
            None => FeeBasis::ByRate(self.ledger.current_fee_rate().await),
        };
        let request = FeeCheckRequest {
            spent_usdc: body.spent_usdc,
            qty: body.qty,
            entry_price: body.entry_price,
            fee,
            min_order_value: body.min_order_value.or(self.ledger.min_order_value()),
        };

        let check = match FeeChecker::check(&request) {
            Ok(check) => check,
            Err(err) => return err.into(),
        };
        match self.ledger.bnb_requirement(body.spent_usdc).await {
            Ok(cover) => ApiReply::json(ApiReply::OK, &check.with_bnb(cover)),
            Err(err) => err.into(),
        }
    }

    pub async fn valuation(&self, prices: BTreeMap<String, Decimal>) -> ApiReply {
        match self.ledger.valuation(&prices).await {
            Ok(valuation) => ApiReply::json(ApiReply::OK, &valuation),
            Err(err) => err.into(),
        }
    }

    pub async fn reset(&self) -> ApiReply {
        self.ledger.reset().await;
        ApiReply::json(
            ApiReply::OK,
            &json!({ "status": "reset", "balances": self.ledger.balances().await }),
        )
    }
}
