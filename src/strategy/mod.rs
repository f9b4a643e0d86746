//! Order placement strategy and fee arithmetic
//!
//! Both halves are pure: they take numbers in and hand plans or verdicts
//! back, leaving balances to the [`crate::ledger`].
//!
//! # Components
//!
//! - [`GridPlanner`]: splits a capital allocation into ascending price levels
//! - [`GridParams`]: range, level count, budget, [`Spacing`] and [`Weighting`]
//! - [`FeeChecker`]: decides whether proceeds clear the exchange fee
//! - [`FeeSchedule`]: standard and BNB-discounted fee rates, and the BNB
//!   needed to cover commission
//!
//! # Example
//!
//! ```
//! use paper_ledger::strategy::{GridParams, GridPlanner, Spacing};
//! use rust_decimal_macros::dec;
//!
//! let params = GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(300))
//!     .with_spacing(Spacing::Linear);
//! let plan = GridPlanner::default().plan(&params).unwrap();
//!
//! assert_eq!(plan.levels[1].entry_price, dec!(150));
//! assert_eq!(plan.total_spend(), dec!(300));
//! ```

mod fees;
mod grid;
mod types;

pub use types::{GridParams, GridPlan, PlannedLevel, Spacing, Weighting};

pub use grid::{GridPlanner, DEFAULT_MAX_GRID_LEVELS, PLAN_SCALE};

pub use fees::{BnbRequirement, FeeBasis, FeeCheck, FeeCheckRequest, FeeChecker, FeeSchedule};
