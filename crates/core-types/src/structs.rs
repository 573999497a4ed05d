use crate::enums::{Moneyness, OptionAction, OptionType};
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shares controlled by one listed equity option contract.
pub const CONTRACT_MULTIPLIER: u32 = 100;

/// A single synthesized option contract.
///
/// Contracts are created by the universe generator for one request and never mutated
/// afterwards; `moneyness` reflects the underlying price at that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub contract_symbol: String,
    pub underlying_symbol: String,
    pub option_type: OptionType,
    pub strike_price: Decimal,
    pub expiration_date: NaiveDate,
    pub days_to_expiration: u32,
    pub bid: Decimal,
    pub ask: Decimal,
    pub last_price: Decimal,
    pub bid_ask_spread: Decimal,
    pub volume: u64,
    pub open_interest: u64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub implied_volatility: f64,
    pub moneyness: Moneyness,
    pub underlying_price: Decimal,
}

impl OptionContract {
    /// The identity of a contract: (underlying, expiration, strike, type).
    pub fn key(&self) -> (&str, NaiveDate, Decimal, OptionType) {
        (
            &self.underlying_symbol,
            self.expiration_date,
            self.strike_price,
            self.option_type,
        )
    }

    /// Absolute distance between the strike and the underlying price.
    pub fn strike_distance(&self) -> Decimal {
        (self.strike_price - self.underlying_price).abs()
    }
}

/// Option sensitivities. Per share for a single contract, or aggregated for a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

impl Greeks {
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            delta: self.delta * factor,
            gamma: self.gamma * factor,
            theta: self.theta * factor,
            vega: self.vega * factor,
        }
    }

    pub fn add(&self, other: &Greeks) -> Self {
        Self {
            delta: self.delta + other.delta,
            gamma: self.gamma + other.gamma,
            theta: self.theta + other.theta,
            vega: self.vega + other.vega,
        }
    }
}

/// One position in a multi-leg strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyLeg {
    pub strike_price: Decimal,
    pub option_type: OptionType,
    pub action: OptionAction,
    pub quantity: u32,
    /// Paid (buy) or received (sell) per share.
    pub premium: Decimal,
}

impl StrategyLeg {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.strike_price <= Decimal::ZERO {
            return Err(CoreError::non_positive("leg strike price", self.strike_price));
        }
        if self.quantity == 0 {
            return Err(CoreError::non_positive("leg quantity", self.quantity));
        }
        if self.premium < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "leg premium".to_string(),
                format!("{} is negative", self.premium),
            ));
        }
        Ok(())
    }

    /// Number of shares the leg controls.
    pub fn shares(&self) -> Decimal {
        Decimal::from(self.quantity) * Decimal::from(CONTRACT_MULTIPLIER)
    }

    /// Cash exchanged when the leg is opened: negative when paid, positive when received.
    pub fn opening_cash_flow(&self) -> Result<Decimal, CoreError> {
        (-self.action.sign() * self.premium)
            .checked_mul(self.shares())
            .ok_or(CoreError::Overflow("leg cash flow"))
    }

    /// Profit or loss of the leg if the option is worth `value` per share.
    pub fn pnl_for_value(&self, value: Decimal) -> Result<Decimal, CoreError> {
        value
            .checked_sub(self.premium)
            .and_then(|per_share| (self.action.sign() * per_share).checked_mul(self.shares()))
            .ok_or(CoreError::Overflow("leg profit or loss"))
    }
}

/// One sample of a P&L curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnLPoint {
    pub underlying_price: Decimal,
    pub profit_or_loss: Decimal,
}

/// Position Greeks sampled at one underlying price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksPoint {
    pub underlying_price: Decimal,
    #[serde(flatten)]
    pub greeks: Greeks,
}

/// The criteria of a screening request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningFilters {
    pub underlying_symbols: Vec<String>,
    #[serde(default)]
    pub min_dte: u32,
    #[serde(default = "default_max_dte")]
    pub max_dte: u32,
    /// Raw signed delta; put screens need negative bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delta: Option<f64>,
    #[serde(default)]
    pub min_volume: u64,
    #[serde(default)]
    pub min_open_interest: u64,
    #[serde(default = "OptionType::all")]
    pub option_types: Vec<OptionType>,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Overrides the configured generator seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Overrides "today" for expiration and DTE arithmetic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

fn default_max_dte() -> u32 {
    60
}

fn default_result_limit() -> usize {
    50
}

impl ScreeningFilters {
    /// Filters for the given symbols with every other criterion at its default.
    pub fn for_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            underlying_symbols: symbols.into_iter().map(Into::into).collect(),
            min_dte: 0,
            max_dte: default_max_dte(),
            min_delta: None,
            max_delta: None,
            min_volume: 0,
            min_open_interest: 0,
            option_types: OptionType::all(),
            result_limit: default_result_limit(),
            seed: None,
            as_of: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.underlying_symbols.is_empty() {
            return Err(CoreError::EmptySymbols);
        }
        if self.underlying_symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidInput(
                "underlyingSymbols".to_string(),
                "symbols must not be blank".to_string(),
            ));
        }
        if self.min_dte > self.max_dte {
            return Err(CoreError::InvalidRange {
                field: "dte",
                min: self.min_dte.to_string(),
                max: self.max_dte.to_string(),
            });
        }
        if self.result_limit == 0 {
            return Err(CoreError::non_positive("resultLimit", self.result_limit));
        }
        if self.min_delta.is_some_and(|d| !d.is_finite()) {
            return Err(CoreError::NonFinite("minDelta"));
        }
        if self.max_delta.is_some_and(|d| !d.is_finite()) {
            return Err(CoreError::NonFinite("maxDelta"));
        }
        Ok(())
    }

    pub fn includes_type(&self, option_type: OptionType) -> bool {
        self.option_types.contains(&option_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn leg(action: OptionAction, premium: Decimal, quantity: u32) -> StrategyLeg {
        StrategyLeg {
            strike_price: dec!(100),
            option_type: OptionType::Call,
            action,
            quantity,
            premium,
        }
    }

    #[test]
    fn opening_cash_flow_sign_follows_action() {
        assert_eq!(leg(OptionAction::Buy, dec!(5), 1).opening_cash_flow(), Ok(dec!(-500)));
        assert_eq!(leg(OptionAction::Sell, dec!(2), 3).opening_cash_flow(), Ok(dec!(600)));
    }

    #[test]
    fn leg_pnl_for_value() {
        // Long call bought at 5, worth 12 -> +700 per contract.
        assert_eq!(leg(OptionAction::Buy, dec!(5), 1).pnl_for_value(dec!(12)), Ok(dec!(700)));
        // Short call sold at 5, worth 12 -> -700.
        assert_eq!(leg(OptionAction::Sell, dec!(5), 1).pnl_for_value(dec!(12)), Ok(dec!(-700)));
    }

    #[test]
    fn leg_pnl_past_the_decimal_range_is_an_error() {
        let err = leg(OptionAction::Buy, dec!(5), 1)
            .pnl_for_value(Decimal::MAX)
            .unwrap_err();
        assert_eq!(err.reason(), "numeric_overflow");
    }

    #[test]
    fn leg_validation() {
        assert!(leg(OptionAction::Buy, dec!(5), 1).validate().is_ok());
        assert_eq!(
            leg(OptionAction::Buy, dec!(5), 0).validate().unwrap_err().reason(),
            "non_positive_value"
        );
        assert!(leg(OptionAction::Buy, dec!(-1), 1).validate().is_err());
        let mut bad_strike = leg(OptionAction::Buy, dec!(5), 1);
        bad_strike.strike_price = Decimal::ZERO;
        assert_eq!(bad_strike.validate().unwrap_err().reason(), "non_positive_price");
    }

    #[test]
    fn screening_filters_defaults_from_json() {
        let filters: ScreeningFilters =
            serde_json::from_str(r#"{ "underlyingSymbols": ["SPY"] }"#).unwrap();
        assert_eq!(filters.option_types, vec![OptionType::Call, OptionType::Put]);
        assert_eq!(filters.max_dte, 60);
        assert_eq!(filters.result_limit, 50);
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn screening_filters_validation() {
        let empty = ScreeningFilters::for_symbols(Vec::<String>::new());
        assert_eq!(empty.validate(), Err(CoreError::EmptySymbols));

        let mut inverted = ScreeningFilters::for_symbols(["SPY"]);
        inverted.min_dte = 30;
        inverted.max_dte = 7;
        assert_eq!(inverted.validate().unwrap_err().reason(), "invalid_range");

        let mut zero_limit = ScreeningFilters::for_symbols(["SPY"]);
        zero_limit.result_limit = 0;
        assert!(zero_limit.validate().is_err());

        let mut nan_delta = ScreeningFilters::for_symbols(["SPY"]);
        nan_delta.min_delta = Some(f64::NAN);
        assert_eq!(nan_delta.validate(), Err(CoreError::NonFinite("minDelta")));
    }

    #[test]
    fn greeks_scale_and_add() {
        let g = Greeks { delta: 0.5, gamma: 0.02, theta: -0.05, vega: 0.1 };
        let short = g.scale(-100.0);
        assert_eq!(short.delta, -50.0);
        let flat = g.scale(100.0).add(&short);
        assert_eq!(flat, Greeks::default());
    }
}
