//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{LedgerError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. `FEE_RATE_BNB`, `FEE_RATE_NO_BNB`, `BNB_SAFETY` and
///    `MAX_CONCURRENT_TRADES` environment variables
/// 2. Environment variables (prefixed with APP__, e.g. APP__FEES__STANDARD_RATE)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    // Short names kept for existing bot deployments
    builder = builder
        .set_override_option("fees.bnb_discount_rate", std::env::var("FEE_RATE_BNB").ok())?
        .set_override_option("fees.standard_rate", std::env::var("FEE_RATE_NO_BNB").ok())?
        .set_override_option("fees.bnb_safety_multiplier", std::env::var("BNB_SAFETY").ok())?
        .set_override_option(
            "ledger.max_open_trades",
            std::env::var("MAX_CONCURRENT_TRADES").ok(),
        )?;

    let config: AppConfig = builder
        .build()
        .map_err(|e| LedgerError::Configuration(e.to_string()))?
        .try_deserialize()
        .map_err(|e| LedgerError::Configuration(e.to_string()))?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();
    load_config(None)
}
