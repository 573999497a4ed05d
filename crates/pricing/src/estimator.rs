use crate::error::PricingError;
use crate::normal::{norm_cdf, norm_pdf};
use core_types::{CoreError, Greeks, OptionType};
use serde::{Deserialize, Serialize};

/// Calendar days per year used for time-to-expiration and per-day theta.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Delta never reaches 0 or 1 in magnitude; extreme strikes are pinned to this band.
pub const MIN_ABS_DELTA: f64 = 0.01;
pub const MAX_ABS_DELTA: f64 = 0.99;

/// Converts whole days to expiration into years.
pub fn years_from_days(days: u32) -> f64 {
    f64::from(days) / DAYS_PER_YEAR
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInput {
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    /// In years.
    pub time_to_expiration: f64,
    pub volatility: f64,
}

impl PricingInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_positive("spot price", self.spot)?;
        check_positive("strike price", self.strike)?;
        if self.time_to_expiration == 0.0 {
            return Err(CoreError::ZeroTimeToExpiration);
        }
        check_positive("time to expiration", self.time_to_expiration)?;
        check_positive("volatility", self.volatility)?;
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::NonFinite(field));
    }
    if value <= 0.0 {
        return Err(CoreError::non_positive(field, value));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOutput {
    pub theoretical_price: f64,
    #[serde(flatten)]
    pub greeks: Greeks,
    pub implied_volatility: f64,
}

/// A stateless Black-Scholes estimator with a fixed risk-free rate and no dividends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreeksEstimator {
    risk_free_rate: f64,
}

impl GreeksEstimator {
    pub fn new(risk_free_rate: f64) -> Result<Self, PricingError> {
        if !risk_free_rate.is_finite() {
            return Err(CoreError::NonFinite("risk-free rate").into());
        }
        Ok(Self { risk_free_rate })
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Theoretical price and Greeks for one contract.
    ///
    /// Delta is clamped to [0.01, 0.99] for calls and [-0.99, -0.01] for puts. Vega is per
    /// volatility point and theta per calendar day, capped at zero.
    pub fn estimate(&self, input: &PricingInput) -> Result<PricingOutput, PricingError> {
        input.validate()?;

        let PricingInput {
            option_type,
            spot,
            strike,
            time_to_expiration: t,
            volatility: vol,
        } = *input;
        let r = self.risk_free_rate;
        let sqrt_t = t.sqrt();
        let d1 = self.d1(spot, strike, t, vol);
        let d2 = d1 - vol * sqrt_t;
        let discounted_strike = strike * (-r * t).exp();
        let pdf_d1 = norm_pdf(d1);

        let (delta, annual_theta) = match option_type {
            OptionType::Call => (
                norm_cdf(d1).clamp(MIN_ABS_DELTA, MAX_ABS_DELTA),
                -spot * pdf_d1 * vol / (2.0 * sqrt_t) - r * discounted_strike * norm_cdf(d2),
            ),
            OptionType::Put => (
                (norm_cdf(d1) - 1.0).clamp(-MAX_ABS_DELTA, -MIN_ABS_DELTA),
                -spot * pdf_d1 * vol / (2.0 * sqrt_t) + r * discounted_strike * norm_cdf(-d2),
            ),
        };

        let output = PricingOutput {
            theoretical_price: self.price(option_type, spot, strike, t, vol),
            greeks: Greeks {
                delta,
                gamma: pdf_d1 / (spot * vol * sqrt_t),
                theta: (annual_theta / DAYS_PER_YEAR).min(0.0),
                vega: spot * pdf_d1 * sqrt_t / 100.0,
            },
            implied_volatility: vol,
        };

        let values = [
            output.theoretical_price,
            output.greeks.delta,
            output.greeks.gamma,
            output.greeks.theta,
            output.greeks.vega,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::NonFinite("greeks").into());
        }
        Ok(output)
    }

    /// `(ln(S/K) + (r + σ²/2)·t) / (σ·√t)`
    pub(crate) fn d1(&self, spot: f64, strike: f64, t: f64, vol: f64) -> f64 {
        ((spot / strike).ln() + (self.risk_free_rate + 0.5 * vol * vol) * t) / (vol * t.sqrt())
    }

    /// Unvalidated European price, floored at zero.
    pub(crate) fn price(&self, option_type: OptionType, spot: f64, strike: f64, t: f64, vol: f64) -> f64 {
        let d1 = self.d1(spot, strike, t, vol);
        let d2 = d1 - vol * t.sqrt();
        let discounted_strike = strike * (-self.risk_free_rate * t).exp();
        let price = match option_type {
            OptionType::Call => spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
            OptionType::Put => discounted_strike * norm_cdf(-d2) - spot * norm_cdf(-d1),
        };
        price.max(0.0)
    }
}

impl Default for GreeksEstimator {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
        }
    }
}
