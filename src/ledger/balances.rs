//! Per-asset balance store

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::common::errors::{LedgerError, Result};

fn normalize(asset: &str) -> String {
    asset.trim().to_uppercase()
}

/// Available capital per asset
///
/// `debit` is the only way a balance goes down, and it refuses to take any
/// entry below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceStore {
    balances: BTreeMap<String, Decimal>,
    initial: BTreeMap<String, Decimal>,
}

impl BalanceStore {
    /// Create a store seeded with `initial`; `reset` returns to this seed
    pub fn new(initial: BTreeMap<String, Decimal>) -> Result<Self> {
        let mut seed = BTreeMap::new();
        for (asset, amount) in initial {
            if amount < Decimal::ZERO {
                return Err(LedgerError::invalid(format!(
                    "initial {} balance must not be negative, got {}",
                    asset, amount
                )));
            }
            let entry = seed.entry(normalize(&asset)).or_insert(Decimal::ZERO);
            *entry = entry.checked_add(amount).ok_or_else(|| {
                LedgerError::invalid(format!("initial {} balance overflows", asset))
            })?;
        }

        Ok(Self {
            balances: seed.clone(),
            initial: seed,
        })
    }

    /// Current balance, zero for unknown assets
    pub fn get(&self, asset: &str) -> Decimal {
        self.balances
            .get(&normalize(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Increase a balance
    pub fn credit(&mut self, asset: &str, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid(format!(
                "credit amount must be positive, got {}",
                amount
            )));
        }

        let entry = self.balances.entry(normalize(asset)).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(amount).ok_or_else(|| {
            LedgerError::invalid(format!("credit of {} overflows the {} balance", amount, asset))
        })?;
        debug!(asset, %amount, balance = %entry, "Credited balance");
        Ok(*entry)
    }

    /// Decrease a balance, failing rather than going negative
    pub fn debit(&mut self, asset: &str, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid(format!(
                "debit amount must be positive, got {}",
                amount
            )));
        }

        let asset = normalize(asset);
        let available = self.balances.get(&asset).copied().unwrap_or(Decimal::ZERO);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                asset,
                requested: amount,
                available,
            });
        }

        let remaining = available - amount;
        debug!(asset = %asset, %amount, balance = %remaining, "Debited balance");
        self.balances.insert(asset, remaining);
        Ok(remaining)
    }

    /// Restore the seed balances
    pub fn reset(&mut self) {
        self.balances = self.initial.clone();
    }

    /// Every tracked asset and its balance, ordered by asset
    pub fn snapshot(&self) -> BTreeMap<String, Decimal> {
        self.balances.clone()
    }
}
