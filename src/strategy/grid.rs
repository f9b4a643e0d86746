//! Grid planner
//!
//! Decomposes a capital allocation into `levels` buy entries spanning a price
//! interval. The planner is a pure function of its parameters: no I/O, no
//! state carried between calls.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use tracing::debug;

use crate::common::errors::{LedgerError, Result};
use crate::strategy::types::{GridParams, GridPlan, PlannedLevel, Spacing, Weighting};

/// Decimal places kept on interior prices, per-level spends and quantities
pub const PLAN_SCALE: u32 = 8;

/// Upper bound on levels when no configuration overrides it
pub const DEFAULT_MAX_GRID_LEVELS: u32 = 500;

fn round_plan(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PLAN_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn overflow(what: &str) -> LedgerError {
    LedgerError::invalid(format!("{} is out of decimal range", what))
}

/// Grid planner with a configurable level cap
#[derive(Debug, Clone, Copy)]
pub struct GridPlanner {
    max_levels: u32,
}

impl GridPlanner {
    pub fn new(max_levels: u32) -> Self {
        Self { max_levels }
    }

    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    /// Build the ordered plan for `params`
    ///
    /// The sum of the returned spends equals `params.total_usdc` exactly:
    /// the last level takes whatever the rounded earlier levels left over.
    pub fn plan(&self, params: &GridParams) -> Result<GridPlan> {
        self.validate(params)?;

        let prices = entry_prices(params)?;
        let spends = level_spends(params)?;

        let mut levels = Vec::with_capacity(prices.len());
        for (i, (entry_price, spent_usdc)) in prices.into_iter().zip(spends).enumerate() {
            let qty = spent_usdc
                .checked_div(entry_price)
                .map(round_plan)
                .ok_or_else(|| overflow(&format!("level {} quantity", i)))?;
            if qty <= Decimal::ZERO {
                return Err(LedgerError::invalid(format!(
                    "level {} spend {} at price {} rounds to zero quantity",
                    i, spent_usdc, entry_price
                )));
            }
            levels.push(PlannedLevel {
                level: i as u32,
                entry_price,
                qty,
                spent_usdc,
            });
        }

        debug!(
            symbol = %params.symbol,
            levels = levels.len(),
            spacing = %params.spacing,
            total = %params.total_usdc,
            "Planned grid"
        );

        Ok(GridPlan {
            symbol: params.symbol.trim().to_uppercase(),
            levels,
        })
    }

    fn validate(&self, params: &GridParams) -> Result<()> {
        if params.levels < 1 {
            return Err(LedgerError::invalid("levels must be at least 1"));
        }
        if params.levels > self.max_levels {
            return Err(LedgerError::invalid(format!(
                "levels {} exceeds maximum of {}",
                params.levels, self.max_levels
            )));
        }
        if params.lower_price <= Decimal::ZERO || params.upper_price <= Decimal::ZERO {
            return Err(LedgerError::invalid("grid prices must be positive"));
        }
        if params.lower_price > params.upper_price {
            return Err(LedgerError::invalid(format!(
                "lower_price {} is above upper_price {}",
                params.lower_price, params.upper_price
            )));
        }
        if params.total_usdc <= Decimal::ZERO {
            return Err(LedgerError::invalid("total_usdc must be positive"));
        }
        if let Weighting::Weights(weights) = &params.weighting {
            if weights.len() != params.levels as usize {
                return Err(LedgerError::invalid(format!(
                    "expected {} weights, got {}",
                    params.levels,
                    weights.len()
                )));
            }
            if weights.iter().any(|w| *w <= Decimal::ZERO) {
                return Err(LedgerError::invalid("weights must all be positive"));
            }
        }
        Ok(())
    }
}

impl Default for GridPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GRID_LEVELS)
    }
}

/// Ascending entry prices, first exactly `lower_price`, last exactly `upper_price`
fn entry_prices(params: &GridParams) -> Result<Vec<Decimal>> {
    let lower = params.lower_price;
    let upper = params.upper_price;
    let n = params.levels;

    if n == 1 {
        return Ok(vec![lower]);
    }

    let steps = Decimal::from(n - 1);
    let mut prices = Vec::with_capacity(n as usize);
    prices.push(lower);

    match params.spacing {
        Spacing::Linear => {
            let step = (upper - lower) / steps;
            for i in 1..n - 1 {
                prices.push(round_plan(lower + step * Decimal::from(i)));
            }
        }
        Spacing::Geometric => {
            let ratio = upper
                .checked_div(lower)
                .ok_or_else(|| overflow("upper_price / lower_price"))?;
            for i in 1..n - 1 {
                let exponent = Decimal::from(i) / steps;
                let factor = ratio.checked_powd(exponent).ok_or_else(|| {
                    LedgerError::invalid(format!(
                        "geometric step overflow for ratio {} at level {}",
                        ratio, i
                    ))
                })?;
                let price = lower
                    .checked_mul(factor)
                    .ok_or_else(|| overflow(&format!("level {} price", i)))?;
                prices.push(round_plan(price));
            }
        }
    }

    prices.push(upper);
    Ok(prices)
}

/// Per-level spends; every level but the last is rounded, the last absorbs the remainder
fn level_spends(params: &GridParams) -> Result<Vec<Decimal>> {
    let total = params.total_usdc;
    let n = params.levels as usize;

    let raw: Vec<Decimal> = match &params.weighting {
        Weighting::Equal => {
            let share = total / Decimal::from(params.levels);
            vec![share; n]
        }
        Weighting::Weights(weights) => {
            let weight_sum = weights
                .iter()
                .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))
                .ok_or_else(|| overflow("sum of weights"))?;
            weights
                .iter()
                .map(|w| {
                    total
                        .checked_mul(*w)
                        .and_then(|scaled| scaled.checked_div(weight_sum))
                        .ok_or_else(|| overflow("weighted level spend"))
                })
                .collect::<Result<_>>()?
        }
    };

    let mut spends = Vec::with_capacity(n);
    let mut running = Decimal::ZERO;
    for (i, share) in raw.into_iter().enumerate() {
        let spend = if i + 1 == n {
            total
                .checked_sub(running)
                .ok_or_else(|| overflow("final level spend"))?
        } else {
            round_plan(share)
        };
        if spend <= Decimal::ZERO {
            return Err(LedgerError::invalid(format!(
                "level {} receives no capital; total_usdc {} is too small to split",
                i, total
            )));
        }
        running = running
            .checked_add(spend)
            .ok_or_else(|| overflow("running grid spend"))?;
        spends.push(spend);
    }

    Ok(spends)
}
