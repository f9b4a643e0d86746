//! Common test utilities and fixtures

use paper_ledger::{BalanceStore, GridParams, LedgerService, NewTrade, TradeLedger};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Seed balances used by most tests
pub fn seed_balances() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        ("USDC".to_string(), dec!(10000)),
        ("USDT".to_string(), dec!(5000)),
        ("BNB".to_string(), dec!(0.5)),
    ])
}

/// Fresh ledger over the seed balances
pub fn seeded_ledger() -> TradeLedger {
    TradeLedger::new(BalanceStore::new(seed_balances()).expect("valid seed"))
}

/// Fresh service over the seed balances
pub fn seeded_service() -> LedgerService {
    LedgerService::new(seeded_ledger())
}

/// A BTCUSDC buy at 50k spending `spent`
pub fn btc_trade(spent: Decimal) -> NewTrade {
    NewTrade {
        symbol: "BTCUSDC".to_string(),
        amount_usdc: spent,
        entry_price: dec!(50000),
        qty: spent / dec!(50000),
        spent_usdc: spent,
    }
}

/// The worked example: 100..200, 3 levels, 300 USDC
pub fn sample_grid() -> GridParams {
    GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(300))
}

/// Sample request scripts for the service
pub mod scripts {
    /// A session touching every operation once
    pub const FULL_SESSION: &str = r#"[
        {"op": "health"},
        {"op": "create_trade", "symbol": "BTCUSDC", "amount_usdc": "100",
         "entry_price": "50000", "qty": "0.002", "spent_usdc": "100"},
        {"op": "create_grid", "symbol": "ETHUSDT", "lower_price": "1800",
         "upper_price": "2400", "levels": 4, "total_usdc": "1000",
         "spacing": "geometric", "weighting": {"weights": ["1", "1", "2", "4"]}},
        {"op": "list_trades"},
        {"op": "delete_trade", "id": 1},
        {"op": "delete_trade", "id": 1},
        {"op": "fee_check", "spent_usdc": "100", "qty": "1", "entry_price": "100",
         "fee_rate": "0.001"},
        {"op": "balances"},
        {"op": "valuation", "prices": {"ETHUSDT": "2500"}},
        {"op": "delete_all_trades"},
        {"op": "reset"}
    ]"#;
}
