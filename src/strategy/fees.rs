use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{LedgerError, Result};

/// BNB amounts are rounded up to this many decimals
const BNB_SCALE: u32 = 8;

/// Fee schedule for the simulated exchange
///
/// Binance-style spot fees: a standard taker rate, and a discounted rate
/// when fees are paid from a BNB balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Rate applied when the BNB discount is not available (0.001 = 0.1%)
    pub standard_rate: Decimal,
    /// Rate applied when fees can be paid in BNB
    pub bnb_discount_rate: Decimal,
    /// BNB balance that must be exceeded for the discount to apply
    pub bnb_discount_threshold: Decimal,
    /// BNB held must cover the round-trip commission times this factor
    pub bnb_safety_multiplier: Decimal,
    /// Quote price of one BNB, used to express commission in BNB
    pub bnb_price: Decimal,
}

/// Whether a BNB balance covers the commission on a trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BnbRequirement {
    /// Entry plus exit commission in quote currency
    pub round_trip_cost: Decimal,
    pub required_bnb: Decimal,
    pub required_bnb_with_safety: Decimal,
    pub bnb_balance: Decimal,
    pub safety_multiplier: Decimal,
    pub sufficient: bool,
}

impl FeeSchedule {
    /// Binance spot fee structure
    /// - 0.1% standard
    /// - 0.075% when paying with BNB
    pub fn binance() -> Self {
        Self {
            standard_rate: dec!(0.001),
            bnb_discount_rate: dec!(0.00075),
            bnb_discount_threshold: dec!(0.001),
            bnb_safety_multiplier: dec!(1.2),
            bnb_price: dec!(300),
        }
    }

    /// Whether a BNB balance qualifies for the discounted rate
    pub fn has_bnb_discount(&self, bnb_balance: Decimal) -> bool {
        bnb_balance > self.bnb_discount_threshold
    }

    /// Fee rate for a trade given the current BNB balance
    pub fn rate_for(&self, bnb_balance: Decimal) -> Decimal {
        if self.has_bnb_discount(bnb_balance) {
            self.bnb_discount_rate
        } else {
            self.standard_rate
        }
    }

    /// Commission for entering and later exiting a position of `notional`
    ///
    /// Exit is assumed to happen at roughly the entry notional.
    pub fn round_trip_cost(&self, notional: Decimal, bnb_balance: Decimal) -> Result<Decimal> {
        notional
            .checked_mul(self.rate_for(bnb_balance))
            .and_then(|fee| fee.checked_mul(dec!(2)))
            .ok_or_else(|| {
                LedgerError::invalid(format!("commission on {} is out of range", notional))
            })
    }

    /// BNB needed to pay the round-trip commission on `notional`, padded by
    /// the safety multiplier, and whether `bnb_balance` covers it
    pub fn bnb_requirement(&self, notional: Decimal, bnb_balance: Decimal) -> Result<BnbRequirement> {
        if notional < Decimal::ZERO {
            return Err(LedgerError::invalid("notional must not be negative"));
        }
        let round_trip_cost = self.round_trip_cost(notional, bnb_balance)?;
        let required_bnb = round_trip_cost
            .checked_div(self.bnb_price)
            .ok_or_else(|| {
                LedgerError::invalid(format!(
                    "cannot express {} in BNB at price {}",
                    round_trip_cost, self.bnb_price
                ))
            })?
            .round_dp_with_strategy(BNB_SCALE, RoundingStrategy::AwayFromZero);
        let required_bnb_with_safety = required_bnb
            .checked_mul(self.bnb_safety_multiplier)
            .ok_or_else(|| LedgerError::invalid("BNB requirement is out of range"))?
            .round_dp_with_strategy(BNB_SCALE, RoundingStrategy::AwayFromZero);

        Ok(BnbRequirement {
            round_trip_cost,
            required_bnb,
            required_bnb_with_safety,
            bnb_balance,
            safety_multiplier: self.bnb_safety_multiplier,
            sufficient: bnb_balance >= required_bnb_with_safety,
        })
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::binance()
    }
}

/// How the fee for a check is expressed
///
/// Serialized as `{"by_rate": "0.001"}` or `{"by_amount": "0.25"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    /// Fee is `spent_usdc * rate`
    ByRate(Decimal),
    /// Fee is this exact quote amount
    ByAmount(Decimal),
}

/// Inputs to a fee sufficiency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCheckRequest {
    pub spent_usdc: Decimal,
    pub qty: Decimal,
    pub entry_price: Decimal,
    pub fee: FeeBasis,
    /// Net proceeds must exceed this when present
    #[serde(default)]
    pub min_order_value: Option<Decimal>,
}

/// Outcome of a fee check, echoing its inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCheck {
    pub spent_usdc: Decimal,
    pub qty: Decimal,
    pub entry_price: Decimal,
    pub fee: FeeBasis,
    pub min_order_value: Option<Decimal>,
    pub fee_cost: Decimal,
    /// Fee paid on entry and again on an exit of the same size
    pub round_trip_fee: Decimal,
    pub net_proceeds: Decimal,
    pub enough: bool,
    /// BNB cover for the commission, when checked against a ledger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bnb: Option<BnbRequirement>,
}

impl FeeCheck {
    pub fn with_bnb(mut self, requirement: BnbRequirement) -> Self {
        self.bnb = Some(requirement);
        self
    }
}

/// Fee sufficiency checks
///
/// Stateless: reads nothing from the ledger and mutates nothing.
pub struct FeeChecker;

impl FeeChecker {
    /// Decide whether a trade's proceeds clear its fee
    ///
    /// `enough` holds when the net proceeds are positive and, if a minimum
    /// order value is given, strictly above it.
    pub fn check(request: &FeeCheckRequest) -> Result<FeeCheck> {
        Self::validate(request)?;

        let fee_cost = match request.fee {
            FeeBasis::ByRate(rate) => request.spent_usdc.checked_mul(rate).ok_or_else(|| {
                LedgerError::invalid(format!(
                    "fee on {} at rate {} is out of range",
                    request.spent_usdc, rate
                ))
            })?,
            FeeBasis::ByAmount(amount) => amount,
        };
        let round_trip_fee = fee_cost
            .checked_mul(dec!(2))
            .ok_or_else(|| LedgerError::invalid(format!("round-trip fee on {} is out of range", fee_cost)))?;
        let net_proceeds = request.spent_usdc - fee_cost;
        let enough = net_proceeds > Decimal::ZERO
            && request
                .min_order_value
                .map_or(true, |minimum| net_proceeds > minimum);

        Ok(FeeCheck {
            spent_usdc: request.spent_usdc,
            qty: request.qty,
            entry_price: request.entry_price,
            fee: request.fee,
            min_order_value: request.min_order_value,
            fee_cost,
            round_trip_fee,
            net_proceeds,
            enough,
            bnb: None,
        })
    }

    fn validate(request: &FeeCheckRequest) -> Result<()> {
        if request.spent_usdc < Decimal::ZERO {
            return Err(LedgerError::invalid("spent_usdc must not be negative"));
        }
        if request.qty < Decimal::ZERO || request.entry_price < Decimal::ZERO {
            return Err(LedgerError::invalid(
                "qty and entry_price must not be negative",
            ));
        }
        match request.fee {
            FeeBasis::ByRate(rate) if rate < Decimal::ZERO => {
                Err(LedgerError::invalid("fee_rate must not be negative"))
            }
            FeeBasis::ByAmount(amount) if amount < Decimal::ZERO => {
                Err(LedgerError::invalid("fee_amount must not be negative"))
            }
            _ => match request.min_order_value {
                Some(minimum) if minimum < Decimal::ZERO => {
                    Err(LedgerError::invalid("min_order_value must not be negative"))
                }
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(spent: Decimal, fee: FeeBasis) -> FeeCheckRequest {
        FeeCheckRequest {
            spent_usdc: spent,
            qty: dec!(0.002),
            entry_price: dec!(50000),
            fee,
            min_order_value: None,
        }
    }

    #[test]
    fn test_binance_schedule() {
        let fees = FeeSchedule::binance();
        assert_eq!(fees.rate_for(dec!(0)), dec!(0.001));
        assert_eq!(fees.rate_for(dec!(0.001)), dec!(0.001));
        assert_eq!(fees.rate_for(dec!(0.5)), dec!(0.00075));
        assert!(fees.has_bnb_discount(dec!(0.0011)));
    }

    #[test]
    fn test_round_trip_cost() {
        let fees = FeeSchedule::binance();
        // 1000 * 0.001 * 2
        assert_eq!(fees.round_trip_cost(dec!(1000), dec!(0)).unwrap(), dec!(2));
        // 1000 * 0.00075 * 2
        assert_eq!(fees.round_trip_cost(dec!(1000), dec!(1)).unwrap(), dec!(1.5));
        assert!(fees.round_trip_cost(Decimal::MAX, dec!(0)).is_err());
    }

    #[test]
    fn test_bnb_requirement() {
        let fees = FeeSchedule::binance();

        // 1000 * 0.00075 * 2 = 1.5 quote = 0.005 BNB at 300, 0.006 with the 1.2 factor
        let covered = fees.bnb_requirement(dec!(1000), dec!(0.5)).unwrap();
        assert_eq!(covered.round_trip_cost, dec!(1.5));
        assert_eq!(covered.required_bnb, dec!(0.005));
        assert_eq!(covered.required_bnb_with_safety, dec!(0.006));
        assert!(covered.sufficient);

        // without the discount: 2 quote = 0.00666667 BNB, 0.00800001 padded
        let short = fees.bnb_requirement(dec!(1000), dec!(0.001)).unwrap();
        assert_eq!(short.required_bnb, dec!(0.00666667));
        assert_eq!(short.required_bnb_with_safety, dec!(0.00800001));
        assert!(!short.sufficient);
    }

    #[test]
    fn test_bnb_requirement_rejects_unpriced_bnb() {
        let fees = FeeSchedule {
            bnb_price: Decimal::ZERO,
            ..FeeSchedule::binance()
        };
        let err = fees.bnb_requirement(dec!(1000), dec!(1)).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_check_by_rate() {
        let check = FeeChecker::check(&request(dec!(100), FeeBasis::ByRate(dec!(0.001)))).unwrap();
        assert_eq!(check.fee_cost, dec!(0.1));
        assert_eq!(check.net_proceeds, dec!(99.9));
        assert!(check.enough);
        assert_eq!(check.round_trip_fee, dec!(0.2));
        assert_eq!(check.spent_usdc, dec!(100));
        assert_eq!(check.entry_price, dec!(50000));
        assert_eq!(check.bnb, None);
    }

    #[test]
    fn test_fee_overflow_is_invalid() {
        let spent = Decimal::from_i128_with_scale(10i128.pow(25), 0);
        let err = FeeChecker::check(&request(spent, FeeBasis::ByRate(dec!(100000)))).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");

        let err = FeeChecker::check(&request(dec!(10), FeeBasis::ByAmount(Decimal::MAX))).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_check_by_amount() {
        let check = FeeChecker::check(&request(dec!(5), FeeBasis::ByAmount(dec!(5)))).unwrap();
        assert_eq!(check.net_proceeds, dec!(0));
        assert!(!check.enough);

        let check = FeeChecker::check(&request(dec!(5), FeeBasis::ByAmount(dec!(7.5)))).unwrap();
        assert_eq!(check.net_proceeds, dec!(-2.5));
        assert!(!check.enough);
    }

    #[test]
    fn test_minimum_order_value() {
        let mut req = request(dec!(10), FeeBasis::ByRate(dec!(0.001)));
        req.min_order_value = Some(dec!(10));
        // net 9.99 does not clear 10
        let check = FeeChecker::check(&req).unwrap();
        assert_eq!(check.net_proceeds, dec!(9.99));
        assert!(!check.enough);

        req.spent_usdc = dec!(20);
        assert!(FeeChecker::check(&req).unwrap().enough);
    }

    #[test]
    fn test_zero_spend_is_not_enough() {
        let check = FeeChecker::check(&request(dec!(0), FeeBasis::ByRate(dec!(0.001)))).unwrap();
        assert!(!check.enough);
    }

    #[test]
    fn test_malformed_input() {
        assert!(FeeChecker::check(&request(dec!(-1), FeeBasis::ByRate(dec!(0.001)))).is_err());
        assert!(FeeChecker::check(&request(dec!(10), FeeBasis::ByRate(dec!(-0.1)))).is_err());
        assert!(FeeChecker::check(&request(dec!(10), FeeBasis::ByAmount(dec!(-1)))).is_err());

        let mut req = request(dec!(10), FeeBasis::ByRate(dec!(0.001)));
        req.qty = dec!(-1);
        assert!(FeeChecker::check(&req).is_err());
    }

    #[test]
    fn test_fee_basis_serde_shape() {
        let basis: FeeBasis = serde_json::from_str(r#"{"by_rate": "0.001"}"#).unwrap();
        assert_eq!(basis, FeeBasis::ByRate(dec!(0.001)));
    }
}
