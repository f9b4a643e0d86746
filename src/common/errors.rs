//! Error types for the ledger

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Main error type for ledger, planner and fee operations
///
/// Every variant is a deterministic function of the input and the current
/// ledger state. Nothing here is worth retrying without changing the request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Malformed or out-of-range input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Debit would take an asset balance below zero
    #[error("Insufficient {asset} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: String,
        requested: Decimal,
        available: Decimal,
    },

    /// Referenced trade id does not exist
    #[error("Trade not found: {0}")]
    NotFound(u64),

    /// Open trade count would pass the configured limit
    #[error("Open trade limit reached: {open} open, {requested} requested, limit {limit}")]
    TradeLimit {
        open: usize,
        requested: usize,
        limit: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Shorthand for building an `InvalidArgument` error
    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::InvalidArgument(message.into())
    }

    /// Stable snake_case tag for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidArgument(_) => "invalid_argument",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::TradeLimit { .. } => "trade_limit",
            LedgerError::Configuration(_) => "configuration",
        }
    }

    /// Status code the request layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::InvalidArgument(_) => 400,
            LedgerError::InsufficientBalance { .. } => 422,
            LedgerError::NotFound(_) => 404,
            LedgerError::TradeLimit { .. } => 409,
            LedgerError::Configuration(_) => 500,
        }
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_balance_message() {
        let err = LedgerError::InsufficientBalance {
            asset: "USDC".to_string(),
            requested: dec!(150),
            available: dec!(100),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient USDC balance: requested 150, available 100"
        );
        assert_eq!(err.kind(), "insufficient_balance");
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(LedgerError::invalid("bad").status_code(), 400);
        assert_eq!(LedgerError::NotFound(7).status_code(), 404);
        assert_eq!(LedgerError::Configuration("x".into()).status_code(), 500);

        let limit = LedgerError::TradeLimit {
            open: 10,
            requested: 1,
            limit: 10,
        };
        assert_eq!(limit.status_code(), 409);
        assert_eq!(limit.kind(), "trade_limit");
    }
}
