//! Types shared by the ledger, the planner and the request layer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::{LedgerError, Result};

/// Quote assets recognised when no configuration overrides them.
/// The longest matching suffix wins.
pub const DEFAULT_QUOTE_ASSETS: &[&str] = &["USDC", "USDT", "FDUSD", "BUSD", "BTC", "ETH", "BNB"];

/// A trading pair split into its base and quote legs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Normalised (uppercase) pair symbol, e.g. "BTCUSDC"
    pub symbol: String,
    /// Asset being bought, e.g. "BTC"
    pub base: String,
    /// Asset the price and spend are denominated in, e.g. "USDC"
    pub quote: String,
}

impl TradingPair {
    /// Split `symbol` on the longest matching quote asset suffix
    pub fn parse<S: AsRef<str>>(symbol: &str, quote_assets: &[S]) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LedgerError::invalid(format!(
                "symbol must be a non-empty alphanumeric pair, got {:?}",
                symbol
            )));
        }

        let quote = quote_assets
            .iter()
            .map(|q| q.as_ref().to_uppercase())
            .filter(|q| !q.is_empty() && symbol.len() > q.len() && symbol.ends_with(q.as_str()))
            .max_by_key(|q| q.len())
            .ok_or_else(|| {
                LedgerError::invalid(format!("symbol {} has no known quote asset", symbol))
            })?;

        let base = symbol[..symbol.len() - quote.len()].to_string();
        Ok(Self {
            symbol,
            base,
            quote,
        })
    }
}

impl std::fmt::Display for TradingPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Fields a caller supplies to record a single trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub symbol: String,
    /// Nominal position size in quote currency
    pub amount_usdc: Decimal,
    pub entry_price: Decimal,
    pub qty: Decimal,
    /// Quote amount to debit
    pub spent_usdc: Decimal,
}

impl NewTrade {
    /// Reject anything that is not strictly positive
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("amount_usdc", self.amount_usdc),
            ("entry_price", self.entry_price),
            ("qty", self.qty),
            ("spent_usdc", self.spent_usdc),
        ];
        for (name, value) in fields {
            if value <= Decimal::ZERO {
                return Err(LedgerError::invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// A recorded paper trade
///
/// Immutable once created. The ledger hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub symbol: String,
    pub quote_asset: String,
    pub amount_usdc: Decimal,
    pub entry_price: Decimal,
    pub qty: Decimal,
    pub spent_usdc: Decimal,
    /// Level index when the trade came from a grid batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_level: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Valuation of an open trade at a given price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkToMarket {
    /// `qty * price` before fees
    pub gross_value: Decimal,
    /// Exit fee on the gross value
    pub exit_fee: Decimal,
    /// Gross value minus exit fee
    pub net_value: Decimal,
    /// Net value minus what was spent to enter
    pub pnl: Decimal,
}

impl Trade {
    /// Value the position as if sold at `price`, paying `fee_rate` on exit
    pub fn mark_to_market(&self, price: Decimal, fee_rate: Decimal) -> Result<MarkToMarket> {
        if price <= Decimal::ZERO {
            return Err(LedgerError::invalid(format!(
                "{} price must be positive, got {}",
                self.symbol, price
            )));
        }
        if fee_rate < Decimal::ZERO {
            return Err(LedgerError::invalid("fee_rate must not be negative"));
        }

        let out_of_range =
            || LedgerError::invalid(format!("value of trade {} at {} is out of range", self.id, price));
        let gross_value = self.qty.checked_mul(price).ok_or_else(out_of_range)?;
        let exit_fee = gross_value.checked_mul(fee_rate).ok_or_else(out_of_range)?;
        let net_value = gross_value.checked_sub(exit_fee).ok_or_else(out_of_range)?;
        let pnl = net_value.checked_sub(self.spent_usdc).ok_or_else(out_of_range)?;

        Ok(MarkToMarket {
            gross_value,
            exit_fee,
            net_value,
            pnl,
        })
    }
}

/// One trade valued at a supplied price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionValue {
    pub id: u64,
    pub symbol: String,
    pub price: Decimal,
    pub value: MarkToMarket,
}

/// Every open trade valued at caller-supplied prices
///
/// Trades whose symbol has no price are listed in `unpriced` and left out
/// of the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Exit fee rate applied to every position
    pub fee_rate: Decimal,
    pub positions: Vec<PositionValue>,
    pub unpriced: Vec<u64>,
    pub total_spent: Decimal,
    pub total_net_value: Decimal,
    pub total_pnl: Decimal,
}
