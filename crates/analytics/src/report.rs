use crate::shape::StrategyShape;
use core_types::{Greeks, GreeksPoint, PnLPoint};
use rust_decimal::Decimal;
use serde::Serialize;

/// The full analysis of a multi-leg strategy over a price sweep.
///
/// Both P&L series share the same ascending price grid. `max_loss` is a non-negative
/// magnitude; the signed minimum of the expiration curve is `-max_loss` when it is negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEvaluationResult {
    pub pnl_at_expiration: Vec<PnLPoint>,
    pub pnl_current: Vec<PnLPoint>,
    pub greeks_at_current_price: Greeks,
    pub greeks_over_price_sweep: Vec<GreeksPoint>,
    pub max_profit: Decimal,
    pub max_loss: Decimal,
    /// Net long calls: profit keeps growing past the top of the sweep.
    pub max_profit_unbounded: bool,
    /// Net short calls: loss keeps growing past the top of the sweep.
    pub max_loss_unbounded: bool,
    pub breakeven_prices: Vec<Decimal>,
    pub risk_reward_ratio: Decimal,
    /// Negative for a net debit.
    pub net_debit_or_credit: Decimal,
    pub strategy_label: StrategyShape,
}
