use crate::error::AnalyticsError;
use crate::report::StrategyEvaluationResult;
use crate::shape::StrategyShape;
use configuration::{Config, StrategySettings};
use core_types::{
    CONTRACT_MULTIPLIER, CoreError, Greeks, GreeksPoint, OptionAction, OptionType, PnLPoint, StrategyLeg,
    to_f64,
};
use market_data::PriceResolver;
use pricing::{GreeksEstimator, PricingInput, years_from_days};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Time value assumed for every leg before expiration, as a fraction of its premium.
///
/// A flat approximation, not a decay curve. Current-time P&L consumers rely on its shape.
pub const CURRENT_TIME_VALUE_FACTOR: Decimal = dec!(0.3);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEvaluationRequest {
    pub underlying_price: Decimal,
    pub legs: Vec<StrategyLeg>,
    /// Half-width of the sweep as a fraction of spot, in (0, 1).
    #[serde(default)]
    pub price_range_percent: Option<Decimal>,
    #[serde(default)]
    pub num_points: Option<usize>,
    /// Used to look up a volatility seed when `volatility` is absent.
    #[serde(default)]
    pub underlying_symbol: Option<String>,
    #[serde(default)]
    pub volatility: Option<f64>,
    /// Time left on the legs for the Greeks snapshot.
    #[serde(default)]
    pub days_to_expiration: Option<u32>,
}

impl StrategyEvaluationRequest {
    pub fn new(underlying_price: Decimal, legs: Vec<StrategyLeg>) -> Self {
        Self {
            underlying_price,
            legs,
            price_range_percent: None,
            num_points: None,
            underlying_symbol: None,
            volatility: None,
            days_to_expiration: None,
        }
    }
}

/// The volatility the Greeks snapshot is computed with, and whether it is made up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotVolatility {
    pub value: f64,
    pub synthetic: bool,
}

/// A stateless calculator for the payoff profile and risk of a multi-leg strategy.
#[derive(Debug, Clone)]
pub struct StrategyEvaluator {
    estimator: GreeksEstimator,
    settings: StrategySettings,
}

impl StrategyEvaluator {
    pub fn new(estimator: GreeksEstimator, settings: StrategySettings) -> Self {
        Self { estimator, settings }
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalyticsError> {
        Ok(Self::new(
            GreeksEstimator::new(config.engine.risk_free_rate)?,
            config.strategy.clone(),
        ))
    }

    /// Picks the snapshot volatility: the request's own, else the resolved underlying's
    /// seed, else the configured default.
    pub fn snapshot_volatility(
        &self,
        request: &StrategyEvaluationRequest,
        resolver: &PriceResolver,
    ) -> Result<SnapshotVolatility, AnalyticsError> {
        if let Some(value) = request.volatility {
            return Ok(SnapshotVolatility {
                value,
                synthetic: false,
            });
        }
        match &request.underlying_symbol {
            Some(symbol) => {
                let underlying = resolver.resolve(symbol)?;
                Ok(SnapshotVolatility {
                    value: underlying.iv_seed,
                    synthetic: underlying.origin.is_synthetic(),
                })
            }
            None => Ok(SnapshotVolatility {
                value: self.settings.default_volatility,
                synthetic: true,
            }),
        }
    }

    /// Sweeps the underlying price and derives the payoff curves, Greeks and summary risk.
    pub fn evaluate(
        &self,
        request: &StrategyEvaluationRequest,
        volatility: f64,
    ) -> Result<StrategyEvaluationResult, AnalyticsError> {
        let spot = request.underlying_price;
        let legs = &request.legs;
        if legs.is_empty() {
            return Err(CoreError::NoLegs.into());
        }
        if spot <= Decimal::ZERO {
            return Err(CoreError::non_positive("underlying price", spot).into());
        }
        for leg in legs {
            leg.validate()?;
        }
        let range = self.price_range(request)?;
        let num_points = self.num_points(request)?;
        let days = request
            .days_to_expiration
            .unwrap_or(self.settings.default_days_to_expiration);
        if days == 0 {
            return Err(CoreError::ZeroTimeToExpiration.into());
        }

        let grid = price_grid(spot, range, num_points)?;
        let pnl_at_expiration = grid
            .iter()
            .map(|price| -> Result<PnLPoint, CoreError> {
                Ok(PnLPoint {
                    underlying_price: *price,
                    profit_or_loss: pnl_at_expiration(legs, *price)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pnl_current = grid
            .iter()
            .map(|price| -> Result<PnLPoint, CoreError> {
                Ok(PnLPoint {
                    underlying_price: *price,
                    profit_or_loss: pnl_current(legs, *price)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (min, max) = pnl_at_expiration
            .iter()
            .map(|p| p.profit_or_loss)
            .fold((Decimal::MAX, Decimal::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let max_profit = max;
        let max_loss = (-min).max(Decimal::ZERO);
        let risk_reward_ratio = if max_loss.is_zero() {
            Decimal::ZERO
        } else {
            max_profit
                .checked_div(max_loss)
                .ok_or(CoreError::Overflow("risk/reward ratio"))?
        };
        let net_debit_or_credit = checked_sum(
            legs.iter().map(StrategyLeg::opening_cash_flow),
            "net debit or credit",
        )?;

        let net_calls: i64 = legs
            .iter()
            .filter(|l| l.option_type == OptionType::Call)
            .map(|l| match l.action {
                OptionAction::Buy => i64::from(l.quantity),
                OptionAction::Sell => -i64::from(l.quantity),
            })
            .sum();

        let t = years_from_days(days);
        let greeks_at_current_price = self.position_greeks(legs, to_f64(spot, "underlying price")?, t, volatility)?;
        let greeks_over_price_sweep = sample_indices(grid.len(), self.settings.greeks_sample_stride)
            .map(|i| -> Result<GreeksPoint, AnalyticsError> {
                let price = grid[i];
                Ok(GreeksPoint {
                    underlying_price: price,
                    greeks: self.position_greeks(legs, to_f64(price, "sweep price")?, t, volatility)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = StrategyEvaluationResult {
            breakeven_prices: breakevens(&pnl_at_expiration)?,
            pnl_at_expiration,
            pnl_current,
            greeks_at_current_price,
            greeks_over_price_sweep,
            max_profit,
            max_loss,
            max_profit_unbounded: net_calls > 0,
            max_loss_unbounded: net_calls < 0,
            risk_reward_ratio,
            net_debit_or_credit,
            strategy_label: StrategyShape::classify(legs),
        };

        tracing::debug!(
            legs = legs.len(),
            %spot,
            label = %result.strategy_label,
            max_profit = %result.max_profit,
            max_loss = %result.max_loss,
            breakevens = result.breakeven_prices.len(),
            "Strategy evaluated."
        );
        Ok(result)
    }

    fn price_range(&self, request: &StrategyEvaluationRequest) -> Result<Decimal, CoreError> {
        let range = request
            .price_range_percent
            .unwrap_or(self.settings.default_price_range_pct);
        if range <= Decimal::ZERO || range >= Decimal::ONE {
            return Err(CoreError::InvalidInput(
                "priceRangePercent".to_string(),
                format!("{} is not between 0 and 1", range),
            ));
        }
        Ok(range)
    }

    fn num_points(&self, request: &StrategyEvaluationRequest) -> Result<usize, CoreError> {
        let n = request.num_points.unwrap_or(self.settings.default_num_points);
        if n < 2 || n > self.settings.max_num_points {
            return Err(CoreError::InvalidInput(
                "numPoints".to_string(),
                format!("{} is not between 2 and {}", n, self.settings.max_num_points),
            ));
        }
        Ok(n)
    }

    /// Net position Greeks: buys add, sells subtract, each scaled by quantity x 100.
    fn position_greeks(
        &self,
        legs: &[StrategyLeg],
        spot: f64,
        time_to_expiration: f64,
        volatility: f64,
    ) -> Result<Greeks, AnalyticsError> {
        legs.iter().try_fold(Greeks::default(), |total, leg| -> Result<Greeks, AnalyticsError> {
            let output = self.estimator.estimate(&PricingInput {
                option_type: leg.option_type,
                spot,
                strike: to_f64(leg.strike_price, "leg strike price")?,
                time_to_expiration,
                volatility,
            })?;
            let sign = match leg.action {
                OptionAction::Buy => 1.0,
                OptionAction::Sell => -1.0,
            };
            let factor = sign * f64::from(leg.quantity) * f64::from(CONTRACT_MULTIPLIER);
            Ok(total.add(&output.greeks.scale(factor)))
        })
    }
}

/// `num_points + 1` ascending prices from `spot * (1 - range)` to `spot * (1 + range)`.
fn price_grid(spot: Decimal, range: Decimal, num_points: usize) -> Result<Vec<Decimal>, CoreError> {
    let overflow = || CoreError::Overflow("price sweep");
    let lo = spot.checked_mul(Decimal::ONE - range).ok_or_else(overflow)?;
    let hi = spot.checked_mul(Decimal::ONE + range).ok_or_else(overflow)?;
    let width = hi - lo;
    let n = Decimal::from(num_points);
    (0..=num_points)
        .map(|i| {
            width
                .checked_mul(Decimal::from(i))
                .and_then(|step| step.checked_div(n))
                .and_then(|offset| lo.checked_add(offset))
                .ok_or_else(overflow)
        })
        .collect()
}

/// Adds up leg values, failing instead of panicking past the decimal range.
fn checked_sum(
    values: impl Iterator<Item = Result<Decimal, CoreError>>,
    what: &'static str,
) -> Result<Decimal, CoreError> {
    values.fold(Ok(Decimal::ZERO), |total, value| {
        total?.checked_add(value?).ok_or(CoreError::Overflow(what))
    })
}

fn pnl_at_expiration(legs: &[StrategyLeg], price: Decimal) -> Result<Decimal, CoreError> {
    checked_sum(
        legs.iter()
            .map(|leg| leg.pnl_for_value(leg.option_type.intrinsic(price, leg.strike_price))),
        "profit or loss at expiration",
    )
}

fn pnl_current(legs: &[StrategyLeg], price: Decimal) -> Result<Decimal, CoreError> {
    checked_sum(
        legs.iter().map(|leg| {
            let value = leg
                .option_type
                .intrinsic(price, leg.strike_price)
                .checked_add(CURRENT_TIME_VALUE_FACTOR * leg.premium)
                .ok_or(CoreError::Overflow("current option value"))?;
            leg.pnl_for_value(value)
        }),
        "current profit or loss",
    )
}

/// Every `stride`-th index of a grid of `len` points, always ending on the last one.
fn sample_indices(len: usize, stride: usize) -> impl Iterator<Item = usize> {
    let last = len.saturating_sub(1);
    let stride = stride.max(1);
    (0..len)
        .step_by(stride)
        .chain((last % stride != 0).then_some(last))
}

/// Prices where the expiration curve crosses zero.
///
/// A sign change between adjacent samples is linearly interpolated. When the curve sits at
/// exactly zero between opposite-signed samples, the first zero sample is reported as is.
/// The sweep's end points never qualify.
fn breakevens(curve: &[PnLPoint]) -> Result<Vec<Decimal>, CoreError> {
    let mut found = Vec::new();
    let mut last_nonzero: Option<usize> = None;
    for (i, point) in curve.iter().enumerate() {
        if point.profit_or_loss.is_zero() {
            continue;
        }
        if let Some(j) = last_nonzero {
            let prev = &curve[j];
            if prev.profit_or_loss.is_sign_negative() != point.profit_or_loss.is_sign_negative() {
                if j + 1 == i {
                    found.push(interpolate_zero(prev, point)?);
                } else {
                    found.push(curve[j + 1].underlying_price);
                }
            }
        }
        last_nonzero = Some(i);
    }
    Ok(found)
}

fn interpolate_zero(a: &PnLPoint, b: &PnLPoint) -> Result<Decimal, CoreError> {
    let (x0, y0) = (a.underlying_price, a.profit_or_loss);
    let (x1, y1) = (b.underlying_price, b.profit_or_loss);
    (x1 - x0)
        .checked_mul(-y0)
        .zip(y1.checked_sub(y0))
        .and_then(|(rise, run)| rise.checked_div(run))
        .and_then(|offset| x0.checked_add(offset))
        .ok_or(CoreError::Overflow("breakeven price"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(price: Decimal, pnl: Decimal) -> PnLPoint {
        PnLPoint {
            underlying_price: price,
            profit_or_loss: pnl,
        }
    }

    #[test]
    fn grid_spans_the_range_inclusively() {
        let grid = price_grid(dec!(100), dec!(0.2), 100).unwrap();
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], dec!(80));
        assert_eq!(grid[50], dec!(100));
        assert_eq!(grid[100], dec!(120));
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sampling_always_includes_the_last_point() {
        assert_eq!(sample_indices(101, 10).collect::<Vec<_>>(), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert_eq!(sample_indices(8, 3).collect::<Vec<_>>(), vec![0, 3, 6, 7]);
        assert_eq!(sample_indices(3, 1).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn adjacent_sign_change_is_interpolated() {
        let curve = [point(dec!(1), dec!(-30)), point(dec!(2), dec!(10)), point(dec!(3), dec!(20))];
        assert_eq!(breakevens(&curve).unwrap(), vec![dec!(1.75)]);
    }

    #[test]
    fn exact_interior_zero_is_reported_once() {
        let curve = [
            point(dec!(1), dec!(-5)),
            point(dec!(2), dec!(0)),
            point(dec!(3), dec!(5)),
            point(dec!(4), dec!(0)),
            point(dec!(5), dec!(7)),
        ];
        assert_eq!(breakevens(&curve).unwrap(), vec![dec!(2)]);
    }

    #[test]
    fn end_points_are_never_breakevens() {
        let curve = [point(dec!(1), dec!(0)), point(dec!(2), dec!(5)), point(dec!(3), dec!(0))];
        assert!(breakevens(&curve).unwrap().is_empty());
    }

    #[test]
    fn grid_past_the_decimal_range_is_an_error() {
        let err = price_grid(Decimal::MAX, dec!(0.9), 10).unwrap_err();
        assert_eq!(err, CoreError::Overflow("price sweep"));
    }
}
