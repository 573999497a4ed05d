use analytics::StrategyEvaluationResult;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use core_types::OptionContract;

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn num(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

pub fn contracts_table(contracts: &[OptionContract]) -> Table {
    let mut table = new_table([
        "Contract", "Type", "Strike", "Exp", "DTE", "Bid", "Ask", "Vol", "OI", "Delta", "Gamma", "Theta", "Vega",
        "IV", "Money",
    ]);
    for c in contracts {
        table.add_row(vec![
            Cell::new(&c.contract_symbol),
            Cell::new(c.option_type),
            num(c.strike_price),
            Cell::new(c.expiration_date),
            num(c.days_to_expiration),
            num(c.bid),
            num(c.ask),
            num(c.volume),
            num(c.open_interest),
            num(format!("{:.3}", c.delta)),
            num(format!("{:.4}", c.gamma)),
            num(format!("{:.3}", c.theta)),
            num(format!("{:.3}", c.vega)),
            num(format!("{:.1}%", c.implied_volatility * 100.0)),
            Cell::new(c.moneyness),
        ]);
    }
    table
}

pub fn strategy_summary(result: &StrategyEvaluationResult) -> Table {
    let unbounded = |flag: bool| if flag { " (unbounded)" } else { "" };
    let breakevens = if result.breakeven_prices.is_empty() {
        "none".to_string()
    } else {
        result
            .breakeven_prices
            .iter()
            .map(|p| p.round_dp(2).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let g = &result.greeks_at_current_price;

    let mut table = new_table(["Metric", "Value"]);
    table.add_row(vec![Cell::new("Strategy"), Cell::new(result.strategy_label)]);
    table.add_row(vec![Cell::new("Net debit/credit"), num(result.net_debit_or_credit.round_dp(2))]);
    table.add_row(vec![
        Cell::new("Max profit"),
        num(format!("{}{}", result.max_profit.round_dp(2), unbounded(result.max_profit_unbounded))),
    ]);
    table.add_row(vec![
        Cell::new("Max loss"),
        num(format!("{}{}", result.max_loss.round_dp(2), unbounded(result.max_loss_unbounded))),
    ]);
    table.add_row(vec![Cell::new("Risk/reward"), num(result.risk_reward_ratio.round_dp(3))]);
    table.add_row(vec![Cell::new("Breakevens"), Cell::new(breakevens)]);
    table.add_row(vec![
        Cell::new("Delta / Gamma / Theta / Vega"),
        Cell::new(format!("{:.2} / {:.4} / {:.2} / {:.2}", g.delta, g.gamma, g.theta, g.vega)),
    ]);
    table
}

/// Every `stride`-th sweep point with both P&L curves, plus the last point.
pub fn pnl_table(result: &StrategyEvaluationResult, stride: usize) -> Table {
    let mut table = new_table(["Underlying", "P&L at expiration", "P&L now"]);
    let last = result.pnl_at_expiration.len().saturating_sub(1);
    let stride = stride.max(1);
    for (i, (expiry, now)) in result.pnl_at_expiration.iter().zip(&result.pnl_current).enumerate() {
        if i % stride == 0 || i == last {
            table.add_row(vec![
                num(expiry.underlying_price.round_dp(2)),
                num(expiry.profit_or_loss.round_dp(2)),
                num(now.profit_or_loss.round_dp(2)),
            ]);
        }
    }
    table
}
