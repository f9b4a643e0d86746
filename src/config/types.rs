//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::errors::{LedgerError, Result};
use crate::common::types::DEFAULT_QUOTE_ASSETS;
use crate::strategy::{FeeSchedule, DEFAULT_MAX_GRID_LEVELS};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Balances and grid limits
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Exchange fee rates
    #[serde(default)]
    pub fees: FeeConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Reject values the ledger cannot start from
    pub fn validate(&self) -> Result<()> {
        for (asset, amount) in &self.ledger.initial_balances {
            if *amount < Decimal::ZERO {
                return Err(LedgerError::Configuration(format!(
                    "initial balance for {} must not be negative",
                    asset
                )));
            }
        }
        if self.ledger.quote_assets.is_empty() {
            return Err(LedgerError::Configuration(
                "at least one quote asset is required".to_string(),
            ));
        }
        if self.ledger.max_grid_levels == 0 {
            return Err(LedgerError::Configuration(
                "max_grid_levels must be at least 1".to_string(),
            ));
        }

        let rates = [
            ("standard_rate", self.fees.standard_rate),
            ("bnb_discount_rate", self.fees.bnb_discount_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(LedgerError::Configuration(format!(
                    "fees.{} must be in [0, 1), got {}",
                    name, rate
                )));
            }
        }
        if self.fees.bnb_discount_threshold < Decimal::ZERO {
            return Err(LedgerError::Configuration(
                "fees.bnb_discount_threshold must not be negative".to_string(),
            ));
        }
        if self.fees.bnb_safety_multiplier < Decimal::ONE {
            return Err(LedgerError::Configuration(format!(
                "fees.bnb_safety_multiplier must be at least 1, got {}",
                self.fees.bnb_safety_multiplier
            )));
        }
        if self.fees.bnb_price <= Decimal::ZERO {
            return Err(LedgerError::Configuration(
                "fees.bnb_price must be positive".to_string(),
            ));
        }
        if matches!(self.fees.min_order_value, Some(v) if v < Decimal::ZERO) {
            return Err(LedgerError::Configuration(
                "fees.min_order_value must not be negative".to_string(),
            ));
        }
        if self.ledger.max_open_trades == Some(0) {
            return Err(LedgerError::Configuration(
                "ledger.max_open_trades must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Seed balances, restored on every reset
    #[serde(default = "default_initial_balances")]
    pub initial_balances: BTreeMap<String, Decimal>,
    /// Quote assets recognised when splitting a trading pair
    #[serde(default = "default_quote_assets")]
    pub quote_assets: Vec<String>,
    /// Largest grid a single request may plan
    #[serde(default = "default_max_grid_levels")]
    pub max_grid_levels: u32,
    /// Cap on trades held at once; unlimited when unset
    #[serde(default)]
    pub max_open_trades: Option<usize>,
    /// Run the fee check and BNB cover check before recording trades
    #[serde(default)]
    pub enforce_fee_check: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_balances: default_initial_balances(),
            quote_assets: default_quote_assets(),
            max_grid_levels: default_max_grid_levels(),
            max_open_trades: None,
            enforce_fee_check: false,
        }
    }
}

fn default_initial_balances() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        ("USDC".to_string(), dec!(10000)),
        ("USDT".to_string(), dec!(10000)),
        ("BNB".to_string(), dec!(0.5)),
    ])
}

fn default_quote_assets() -> Vec<String> {
    DEFAULT_QUOTE_ASSETS.iter().map(|q| q.to_string()).collect()
}

fn default_max_grid_levels() -> u32 {
    DEFAULT_MAX_GRID_LEVELS
}

/// Fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee rate without the BNB discount
    #[serde(default = "default_standard_rate")]
    pub standard_rate: Decimal,
    /// Fee rate when paying fees in BNB
    #[serde(default = "default_bnb_discount_rate")]
    pub bnb_discount_rate: Decimal,
    /// BNB balance that must be exceeded for the discount
    #[serde(default = "default_bnb_discount_threshold")]
    pub bnb_discount_threshold: Decimal,
    /// Padding on the BNB needed to cover commission
    #[serde(default = "default_bnb_safety_multiplier")]
    pub bnb_safety_multiplier: Decimal,
    /// Quote price of one BNB
    #[serde(default = "default_bnb_price")]
    pub bnb_price: Decimal,
    /// Net proceeds a fee check must clear
    #[serde(default = "default_min_order_value")]
    pub min_order_value: Option<Decimal>,
}

impl FeeConfig {
    pub fn schedule(&self) -> FeeSchedule {
        FeeSchedule {
            standard_rate: self.standard_rate,
            bnb_discount_rate: self.bnb_discount_rate,
            bnb_discount_threshold: self.bnb_discount_threshold,
            bnb_safety_multiplier: self.bnb_safety_multiplier,
            bnb_price: self.bnb_price,
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            standard_rate: default_standard_rate(),
            bnb_discount_rate: default_bnb_discount_rate(),
            bnb_discount_threshold: default_bnb_discount_threshold(),
            bnb_safety_multiplier: default_bnb_safety_multiplier(),
            bnb_price: default_bnb_price(),
            min_order_value: default_min_order_value(),
        }
    }
}

fn default_standard_rate() -> Decimal {
    FeeSchedule::binance().standard_rate
}

fn default_bnb_discount_rate() -> Decimal {
    FeeSchedule::binance().bnb_discount_rate
}

fn default_bnb_discount_threshold() -> Decimal {
    FeeSchedule::binance().bnb_discount_threshold
}

fn default_bnb_safety_multiplier() -> Decimal {
    FeeSchedule::binance().bnb_safety_multiplier
}

fn default_bnb_price() -> Decimal {
    FeeSchedule::binance().bnb_price
}

fn default_min_order_value() -> Option<Decimal> {
    Some(dec!(10))
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (text, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.initial_balances["USDC"], dec!(10000));
        assert_eq!(config.fees.schedule(), FeeSchedule::binance());
        assert_eq!(config.settings.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let mut config = AppConfig::default();
        config.fees.standard_rate = dec!(1.5);
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_validate_rejects_negative_seed() {
        let mut config = AppConfig::default();
        config
            .ledger
            .initial_balances
            .insert("USDC".to_string(), dec!(-1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_discount_threshold() {
        let mut config = AppConfig::default();
        config.fees.bnb_discount_threshold = dec!(-0.001);
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "configuration");

        config.fees.bnb_discount_threshold = Decimal::ZERO;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bnb_cover_settings() {
        let mut config = AppConfig::default();
        config.fees.bnb_safety_multiplier = dec!(0.9);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fees.bnb_price = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_open_trade_limit() {
        let mut config = AppConfig::default();
        config.ledger.max_open_trades = Some(0);
        assert!(config.validate().is_err());

        config.ledger.max_open_trades = Some(10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_level_cap() {
        let mut config = AppConfig::default();
        config.ledger.max_grid_levels = 0;
        assert!(config.validate().is_err());
    }
}
