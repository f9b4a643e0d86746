//! Trade ledger
//!
//! Owns the trade log and coordinates it with the [`BalanceStore`]. All of
//! the mutable state sits behind one lock, so a grid's pre-flight balance
//! check and its debits can never interleave with another caller's debit.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::balances::BalanceStore;
use crate::common::errors::{LedgerError, Result};
use crate::common::types::{
    NewTrade, PositionValue, Trade, TradingPair, Valuation, DEFAULT_QUOTE_ASSETS,
};
use crate::config::types::AppConfig;
use crate::strategy::{
    BnbRequirement, FeeBasis, FeeCheck, FeeCheckRequest, FeeChecker, FeeSchedule, GridParams,
    GridPlanner,
};

/// First id handed out, and the value a reset returns the counter to
pub const FIRST_TRADE_ID: u64 = 1;

/// Asset whose balance decides the discounted fee rate
const FEE_ASSET: &str = "BNB";

/// Everything the lock guards
#[derive(Debug)]
struct LedgerState {
    balances: BalanceStore,
    trades: Vec<Trade>,
    next_id: u64,
}

impl LedgerState {
    /// Debit and record one trade against the given balances
    ///
    /// Takes the balance store and id explicitly so grid batches can run
    /// against a staged copy before committing.
    fn apply(
        balances: &mut BalanceStore,
        id: u64,
        pair: &TradingPair,
        trade: &NewTrade,
        grid_level: Option<u32>,
    ) -> Result<Trade> {
        balances.debit(&pair.quote, trade.spent_usdc)?;
        Ok(Trade {
            id,
            symbol: pair.symbol.clone(),
            quote_asset: pair.quote.clone(),
            amount_usdc: trade.amount_usdc,
            entry_price: trade.entry_price,
            qty: trade.qty,
            spent_usdc: trade.spent_usdc,
            grid_level,
            created_at: Utc::now(),
        })
    }
}

/// Shared handle to the paper-trading ledger
///
/// Cloning the handle is cheap and every clone sees the same state.
#[derive(Debug, Clone)]
pub struct TradeLedger {
    state: Arc<RwLock<LedgerState>>,
    planner: GridPlanner,
    fees: FeeSchedule,
    min_order_value: Option<Decimal>,
    quote_assets: Arc<Vec<String>>,
    max_open_trades: Option<usize>,
    enforce_fee_check: bool,
}

impl TradeLedger {
    /// Create a ledger with default quote assets, planner and fee schedule
    pub fn new(balances: BalanceStore) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState {
                balances,
                trades: Vec::new(),
                next_id: FIRST_TRADE_ID,
            })),
            planner: GridPlanner::default(),
            fees: FeeSchedule::default(),
            min_order_value: None,
            quote_assets: Arc::new(DEFAULT_QUOTE_ASSETS.iter().map(|q| q.to_string()).collect()),
            max_open_trades: None,
            enforce_fee_check: false,
        }
    }

    /// Create a ledger from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let balances = BalanceStore::new(config.ledger.initial_balances.clone())?;

        Ok(Self::new(balances)
            .with_planner(GridPlanner::new(config.ledger.max_grid_levels))
            .with_fee_schedule(config.fees.schedule())
            .with_min_order_value(config.fees.min_order_value)
            .with_quote_assets(config.ledger.quote_assets.clone())
            .with_max_open_trades(config.ledger.max_open_trades)
            .with_fee_check_enforced(config.ledger.enforce_fee_check))
    }

    pub fn with_planner(mut self, planner: GridPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_fee_schedule(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_min_order_value(mut self, min_order_value: Option<Decimal>) -> Self {
        self.min_order_value = min_order_value;
        self
    }

    pub fn with_quote_assets(mut self, quote_assets: Vec<String>) -> Self {
        self.quote_assets = Arc::new(quote_assets);
        self
    }

    pub fn with_max_open_trades(mut self, max_open_trades: Option<usize>) -> Self {
        self.max_open_trades = max_open_trades;
        self
    }

    /// Require every new trade to clear its fee and be covered by BNB
    pub fn with_fee_check_enforced(mut self, enforce: bool) -> Self {
        self.enforce_fee_check = enforce;
        self
    }

    pub fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn planner(&self) -> &GridPlanner {
        &self.planner
    }

    pub fn min_order_value(&self) -> Option<Decimal> {
        self.min_order_value
    }

    pub fn max_open_trades(&self) -> Option<usize> {
        self.max_open_trades
    }

    /// Split a symbol using this ledger's quote assets
    pub fn pair(&self, symbol: &str) -> Result<TradingPair> {
        TradingPair::parse(symbol, self.quote_assets.as_slice())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All trades in creation order
    pub async fn list(&self) -> Vec<Trade> {
        self.state.read().await.trades.clone()
    }

    /// Look up one trade by id
    pub async fn get(&self, id: u64) -> Result<Trade> {
        let state = self.state.read().await;
        state
            .trades
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    /// Snapshot of every tracked balance
    pub async fn balances(&self) -> BTreeMap<String, Decimal> {
        self.state.read().await.balances.snapshot()
    }

    /// Current balance of one asset
    pub async fn balance(&self, asset: &str) -> Decimal {
        self.state.read().await.balances.get(asset)
    }

    /// Scheduled fee rate given the current BNB balance
    pub async fn current_fee_rate(&self) -> Decimal {
        self.fees.rate_for(self.balance(FEE_ASSET).await)
    }

    /// Fee check at the scheduled rate for the current BNB balance
    pub async fn fee_check(
        &self,
        spent_usdc: Decimal,
        qty: Decimal,
        entry_price: Decimal,
    ) -> Result<FeeCheck> {
        let rate = self.current_fee_rate().await;
        let check = FeeChecker::check(&FeeCheckRequest {
            spent_usdc,
            qty,
            entry_price,
            fee: FeeBasis::ByRate(rate),
            min_order_value: self.min_order_value,
        })?;
        Ok(check.with_bnb(self.bnb_requirement(spent_usdc).await?))
    }

    /// BNB cover for the round-trip commission on `notional`
    pub async fn bnb_requirement(&self, notional: Decimal) -> Result<BnbRequirement> {
        self.fees
            .bnb_requirement(notional, self.balance(FEE_ASSET).await)
    }

    /// Value every trade at the given per-symbol prices, net of the exit fee
    /// at the current scheduled rate
    pub async fn valuation(&self, prices: &BTreeMap<String, Decimal>) -> Result<Valuation> {
        let mut normalized = BTreeMap::new();
        for (symbol, price) in prices {
            if *price <= Decimal::ZERO {
                return Err(LedgerError::invalid(format!(
                    "price for {} must be positive, got {}",
                    symbol, price
                )));
            }
            normalized.insert(symbol.trim().to_uppercase(), *price);
        }

        let state = self.state.read().await;
        let fee_rate = self.fees.rate_for(state.balances.get(FEE_ASSET));
        let mut valuation = Valuation {
            fee_rate,
            positions: Vec::new(),
            unpriced: Vec::new(),
            total_spent: Decimal::ZERO,
            total_net_value: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
        };

        for trade in &state.trades {
            let Some(price) = normalized.get(&trade.symbol).copied() else {
                valuation.unpriced.push(trade.id);
                continue;
            };
            let value = trade.mark_to_market(price, fee_rate)?;
            let out_of_range = || LedgerError::invalid("portfolio value is out of range");
            valuation.total_spent = valuation
                .total_spent
                .checked_add(trade.spent_usdc)
                .ok_or_else(out_of_range)?;
            valuation.total_net_value = valuation
                .total_net_value
                .checked_add(value.net_value)
                .ok_or_else(out_of_range)?;
            valuation.total_pnl = valuation
                .total_pnl
                .checked_add(value.pnl)
                .ok_or_else(out_of_range)?;
            valuation.positions.push(PositionValue {
                id: trade.id,
                symbol: trade.symbol.clone(),
                price,
                value,
            });
        }

        Ok(valuation)
    }

    // ========================================================================
    // Pre-flight checks
    // ========================================================================

    fn check_open_limit(&self, open: usize, requested: usize) -> Result<()> {
        match self.max_open_trades {
            Some(limit) if open.saturating_add(requested) > limit => {
                Err(LedgerError::TradeLimit {
                    open,
                    requested,
                    limit,
                })
            }
            _ => Ok(()),
        }
    }

    /// Each trade must clear its fee and the minimum order value, and the
    /// BNB balance must cover the round-trip commission on the batch
    fn check_fees(&self, balances: &BalanceStore, trades: &[NewTrade]) -> Result<()> {
        if !self.enforce_fee_check {
            return Ok(());
        }

        let bnb_balance = balances.get(FEE_ASSET);
        let rate = self.fees.rate_for(bnb_balance);
        let mut notional = Decimal::ZERO;
        for trade in trades {
            let check = FeeChecker::check(&FeeCheckRequest {
                spent_usdc: trade.spent_usdc,
                qty: trade.qty,
                entry_price: trade.entry_price,
                fee: FeeBasis::ByRate(rate),
                min_order_value: self.min_order_value,
            })?;
            if !check.enough {
                return Err(LedgerError::invalid(format!(
                    "spend of {} nets {} after fees, which does not clear the minimum order value",
                    trade.spent_usdc, check.net_proceeds
                )));
            }
            notional = notional
                .checked_add(trade.spent_usdc)
                .ok_or_else(|| LedgerError::invalid("batch spend is out of range"))?;
        }

        let cover = self.fees.bnb_requirement(notional, bnb_balance)?;
        if !cover.sufficient {
            return Err(LedgerError::InsufficientBalance {
                asset: FEE_ASSET.to_string(),
                requested: cover.required_bnb_with_safety,
                available: bnb_balance,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Record a single trade, debiting its quote asset
    #[instrument(skip(self, trade), fields(symbol = %trade.symbol, spent = %trade.spent_usdc))]
    pub async fn create(&self, trade: NewTrade) -> Result<Trade> {
        trade.validate()?;
        let pair = self.pair(&trade.symbol)?;

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if let Err(err) = self
            .check_open_limit(state.trades.len(), 1)
            .and_then(|_| self.check_fees(&state.balances, std::slice::from_ref(&trade)))
        {
            warn!(error = %err, "Trade rejected by pre-flight check");
            return Err(err);
        }

        let id = state.next_id;
        let created = match LedgerState::apply(&mut state.balances, id, &pair, &trade, None) {
            Ok(created) => created,
            Err(err) => {
                warn!(error = %err, "Trade rejected");
                return Err(err);
            }
        };

        state.next_id += 1;
        state.trades.push(created.clone());
        info!(id, symbol = %created.symbol, qty = %created.qty, "Trade created");
        Ok(created)
    }

    /// Plan a grid and record every level, or none of them
    #[instrument(skip(self, params), fields(symbol = %params.symbol, levels = params.levels))]
    pub async fn create_grid(&self, params: GridParams) -> Result<Vec<Trade>> {
        let pair = self.pair(&params.symbol)?;
        let plan = self.planner.plan(&params)?;
        let required = plan.total_spend();

        let trades: Vec<NewTrade> = plan
            .levels
            .iter()
            .map(|level| NewTrade {
                symbol: pair.symbol.clone(),
                amount_usdc: level.spent_usdc,
                entry_price: level.entry_price,
                qty: level.qty,
                spent_usdc: level.spent_usdc,
            })
            .collect();
        for trade in &trades {
            trade.validate()?;
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if let Err(err) = self.check_open_limit(state.trades.len(), trades.len()) {
            warn!(error = %err, "Grid rejected by pre-flight check");
            return Err(err);
        }

        let available = state.balances.get(&pair.quote);
        if required > available {
            warn!(%required, %available, asset = %pair.quote, "Grid rejected by pre-flight check");
            return Err(LedgerError::InsufficientBalance {
                asset: pair.quote.clone(),
                requested: required,
                available,
            });
        }

        if let Err(err) = self.check_fees(&state.balances, &trades) {
            warn!(error = %err, "Grid rejected by pre-flight check");
            return Err(err);
        }

        // Apply against a staged copy so a failure part-way leaves nothing behind
        let mut staged = state.balances.clone();
        let mut created = Vec::with_capacity(trades.len());
        for (offset, (trade, level)) in trades.iter().zip(&plan.levels).enumerate() {
            let id = state.next_id + offset as u64;
            created.push(LedgerState::apply(
                &mut staged,
                id,
                &pair,
                trade,
                Some(level.level),
            )?);
        }

        state.balances = staged;
        state.next_id += created.len() as u64;
        state.trades.extend(created.iter().cloned());
        info!(
            trades = created.len(),
            spent = %required,
            remaining = %state.balances.get(&pair.quote),
            "Grid committed"
        );
        Ok(created)
    }

    /// Remove one trade without refunding its spend
    ///
    /// Returns false when the id is unknown.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, id: u64) -> bool {
        let mut state = self.state.write().await;
        let before = state.trades.len();
        state.trades.retain(|t| t.id != id);
        let removed = state.trades.len() != before;
        if removed {
            info!("Trade deleted");
        }
        removed
    }

    /// Remove every trade, leaving balances untouched
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> usize {
        let mut state = self.state.write().await;
        let removed = state.trades.len();
        state.trades.clear();
        info!(removed, "All trades deleted");
        removed
    }

    /// Clear trades, restart ids and restore the seed balances
    #[instrument(skip(self))]
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.trades.clear();
        state.next_id = FIRST_TRADE_ID;
        state.balances.reset();
        info!("Ledger reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ledger() -> TradeLedger {
        let balances = BalanceStore::new(BTreeMap::from([
            ("USDC".to_string(), dec!(1000)),
            ("BNB".to_string(), dec!(0.5)),
        ]))
        .unwrap();
        TradeLedger::new(balances)
    }

    fn btc_trade(spent: Decimal) -> NewTrade {
        NewTrade {
            symbol: "BTCUSDC".to_string(),
            amount_usdc: spent,
            entry_price: dec!(50000),
            qty: spent / dec!(50000),
            spent_usdc: spent,
        }
    }

    #[tokio::test]
    async fn test_create_debits_quote_asset() {
        let ledger = ledger();
        let trade = ledger.create(btc_trade(dec!(100))).await.unwrap();

        assert_eq!(trade.id, FIRST_TRADE_ID);
        assert_eq!(trade.quote_asset, "USDC");
        assert_eq!(trade.grid_level, None);
        assert_eq!(ledger.balance("USDC").await, dec!(900));
        assert_eq!(ledger.list().await, vec![trade]);
    }

    #[tokio::test]
    async fn test_create_overspend_leaves_state_untouched() {
        let ledger = ledger();
        let err = ledger.create(btc_trade(dec!(1000.01))).await.unwrap_err();

        assert_eq!(err.kind(), "insufficient_balance");
        assert_eq!(ledger.balance("USDC").await, dec!(1000));
        assert!(ledger.list().await.is_empty());

        // the failed call must not burn an id
        let next = ledger.create(btc_trade(dec!(1))).await.unwrap();
        assert_eq!(next.id, FIRST_TRADE_ID);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_quote() {
        let ledger = ledger();
        let mut trade = btc_trade(dec!(10));
        trade.symbol = "BTCEUR".to_string();
        assert_eq!(ledger.create(trade).await.unwrap_err().kind(), "invalid_argument");
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let ledger = ledger();
        let first = ledger.create(btc_trade(dec!(10))).await.unwrap();
        let second = ledger.create(btc_trade(dec!(10))).await.unwrap();

        assert!(ledger.delete_one(second.id).await);
        let third = ledger.create(btc_trade(dec!(10))).await.unwrap();

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[tokio::test]
    async fn test_delete_missing_id() {
        let ledger = ledger();
        ledger.create(btc_trade(dec!(10))).await.unwrap();
        let balances = ledger.balances().await;

        assert!(!ledger.delete_one(42).await);
        assert_eq!(ledger.list().await.len(), 1);
        assert_eq!(ledger.balances().await, balances);
    }

    #[tokio::test]
    async fn test_delete_does_not_refund() {
        let ledger = ledger();
        let trade = ledger.create(btc_trade(dec!(250))).await.unwrap();
        assert!(ledger.delete_one(trade.id).await);
        assert_eq!(ledger.balance("USDC").await, dec!(750));
        assert_eq!(ledger.get(trade.id).await.unwrap_err(), LedgerError::NotFound(trade.id));
    }

    #[tokio::test]
    async fn test_grid_commits_all_levels() {
        let ledger = ledger();
        let trades = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(300)))
            .await
            .unwrap();

        let ids: Vec<u64> = trades.iter().map(|t| t.id).collect();
        let levels: Vec<Option<u32>> = trades.iter().map(|t| t.grid_level).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(levels, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(ledger.balance("USDC").await, dec!(700));
        assert_eq!(ledger.list().await, trades);
    }

    #[tokio::test]
    async fn test_grid_over_budget_creates_nothing() {
        let ledger = ledger();
        ledger.create(btc_trade(dec!(800))).await.unwrap();

        let err = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(300)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                asset: "USDC".to_string(),
                requested: dec!(300),
                available: dec!(200),
            }
        );
        assert_eq!(ledger.list().await.len(), 1);
        assert_eq!(ledger.balance("USDC").await, dec!(200));

        let next = ledger.create(btc_trade(dec!(1))).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_delete_all_keeps_balances() {
        let ledger = ledger();
        ledger.create(btc_trade(dec!(100))).await.unwrap();
        ledger.create(btc_trade(dec!(100))).await.unwrap();

        assert_eq!(ledger.delete_all().await, 2);
        assert!(ledger.list().await.is_empty());
        assert_eq!(ledger.balance("USDC").await, dec!(800));
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let ledger = ledger();
        let initial = ledger.balances().await;
        ledger.create(btc_trade(dec!(100))).await.unwrap();

        ledger.reset().await;
        let once = (ledger.list().await, ledger.balances().await);
        ledger.reset().await;
        let twice = (ledger.list().await, ledger.balances().await);

        assert_eq!(once, twice);
        assert_eq!(twice.1, initial);
        assert!(twice.0.is_empty());
        assert_eq!(ledger.create(btc_trade(dec!(1))).await.unwrap().id, FIRST_TRADE_ID);
    }

    #[tokio::test]
    async fn test_fee_check_uses_bnb_discount() {
        let ledger = ledger();
        let check = ledger.fee_check(dec!(100), dec!(0.002), dec!(50000)).await.unwrap();
        assert_eq!(check.fee, FeeBasis::ByRate(dec!(0.00075)));
        assert_eq!(check.fee_cost, dec!(0.075));
        assert!(check.enough);

        // 0.15 round trip at 300 per BNB, padded by 1.2
        let cover = check.bnb.unwrap();
        assert_eq!(cover.required_bnb_with_safety, dec!(0.0006));
        assert!(cover.sufficient);
    }

    #[tokio::test]
    async fn test_open_trade_limit_on_create() {
        let ledger = ledger().with_max_open_trades(Some(2));
        ledger.create(btc_trade(dec!(10))).await.unwrap();
        ledger.create(btc_trade(dec!(10))).await.unwrap();

        let err = ledger.create(btc_trade(dec!(10))).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::TradeLimit {
                open: 2,
                requested: 1,
                limit: 2,
            }
        );
        assert_eq!(ledger.balance("USDC").await, dec!(980));

        // deleting frees a slot, and the rejected call did not take an id
        assert!(ledger.delete_one(1).await);
        assert_eq!(ledger.create(btc_trade(dec!(10))).await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn test_open_trade_limit_checked_before_grid_commit() {
        let ledger = ledger().with_max_open_trades(Some(4));
        ledger.create(btc_trade(dec!(10))).await.unwrap();

        let err = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 4, dec!(400)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "trade_limit");
        assert_eq!(ledger.list().await.len(), 1);
        assert_eq!(ledger.balance("USDC").await, dec!(990));

        let trades = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(300)))
            .await
            .unwrap();
        assert_eq!(trades[0].id, 2);
        assert_eq!(ledger.list().await.len(), 4);
    }

    #[tokio::test]
    async fn test_enforced_fee_check_rejects_small_trades() {
        let ledger = ledger()
            .with_min_order_value(Some(dec!(10)))
            .with_fee_check_enforced(true);

        // 10 less the 0.075% fee nets 9.9925, short of the minimum
        let err = ledger.create(btc_trade(dec!(10))).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(ledger.balance("USDC").await, dec!(1000));
        assert!(ledger.list().await.is_empty());

        ledger.create(btc_trade(dec!(20))).await.unwrap();

        let err = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 3, dec!(30)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(ledger.list().await.len(), 1);
        assert_eq!(ledger.balance("USDC").await, dec!(980));
    }

    #[tokio::test]
    async fn test_enforced_fee_check_requires_bnb_cover() {
        let balances = BalanceStore::new(BTreeMap::from([
            ("USDC".to_string(), dec!(100000)),
            ("BNB".to_string(), dec!(0.01)),
        ]))
        .unwrap();
        let ledger = TradeLedger::new(balances).with_fee_check_enforced(true);

        // 5000 at 0.075%: 7.5 round trip, 0.025 BNB, 0.03 padded
        let err = ledger.create(btc_trade(dec!(5000))).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                asset: "BNB".to_string(),
                requested: dec!(0.03),
                available: dec!(0.01),
            }
        );
        assert_eq!(ledger.balance("USDC").await, dec!(100000));

        // a grid is covered as one batch
        let err = ledger
            .create_grid(GridParams::new("BTCUSDC", dec!(100), dec!(200), 5, dec!(5000)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "insufficient_balance");
        assert!(ledger.list().await.is_empty());

        ledger.create(btc_trade(dec!(1000))).await.unwrap();
    }

    #[tokio::test]
    async fn test_valuation() {
        let ledger = ledger();
        ledger.create(btc_trade(dec!(100))).await.unwrap();
        ledger
            .create(NewTrade {
                symbol: "ETHUSDC".to_string(),
                amount_usdc: dec!(50),
                entry_price: dec!(2000),
                qty: dec!(0.025),
                spent_usdc: dec!(50),
            })
            .await
            .unwrap();

        let prices = BTreeMap::from([("btcusdc".to_string(), dec!(55000))]);
        let valuation = ledger.valuation(&prices).await.unwrap();

        // 0.002 * 55000 = 110, exit fee 0.0825 at the BNB rate
        assert_eq!(valuation.fee_rate, dec!(0.00075));
        assert_eq!(valuation.positions.len(), 1);
        assert_eq!(valuation.positions[0].id, 1);
        assert_eq!(valuation.positions[0].value.net_value, dec!(109.9175));
        assert_eq!(valuation.unpriced, vec![2]);
        assert_eq!(valuation.total_spent, dec!(100));
        assert_eq!(valuation.total_pnl, dec!(9.9175));
    }
}
