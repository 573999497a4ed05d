use crate::error::PricingError;
use crate::estimator::{GreeksEstimator, PricingInput};
use crate::normal::norm_pdf;
use core_types::{CoreError, OptionType};

const VOL_FLOOR: f64 = 0.001;
const VOL_CEILING: f64 = 5.0;
const PRICE_TOLERANCE: f64 = 1e-8;
const NEWTON_ITERATIONS: usize = 50;
const BISECTION_ITERATIONS: usize = 200;

impl GreeksEstimator {
    /// Backs out the volatility that reproduces `target_price`.
    ///
    /// Newton-Raphson on vega from a 30% starting guess, falling back to bisection on
    /// [0.001, 5.0] when vega vanishes or an iterate leaves that interval.
    pub fn solve_implied_volatility(
        &self,
        target_price: f64,
        option_type: OptionType,
        spot: f64,
        strike: f64,
        time_to_expiration: f64,
    ) -> Result<f64, PricingError> {
        // Validate the market inputs with a placeholder volatility.
        PricingInput {
            option_type,
            spot,
            strike,
            time_to_expiration,
            volatility: 0.3,
        }
        .validate()?;
        if !target_price.is_finite() {
            return Err(CoreError::NonFinite("option price").into());
        }

        let t = time_to_expiration;
        let discounted_strike = strike * (-self.risk_free_rate() * t).exp();
        let (lower, upper) = match option_type {
            OptionType::Call => ((spot - discounted_strike).max(0.0), spot),
            OptionType::Put => ((discounted_strike - spot).max(0.0), discounted_strike),
        };
        if target_price <= lower || target_price >= upper {
            return Err(PricingError::OutsideArbitrageBounds {
                price: target_price,
                lower,
                upper,
            });
        }

        let mut vol = 0.3;
        for _ in 0..NEWTON_ITERATIONS {
            let diff = self.price(option_type, spot, strike, t, vol) - target_price;
            if diff.abs() < PRICE_TOLERANCE {
                return Ok(vol);
            }
            let raw_vega = spot * norm_pdf(self.d1(spot, strike, t, vol)) * t.sqrt();
            if raw_vega < 1e-10 {
                break;
            }
            vol -= diff / raw_vega;
            if !(VOL_FLOOR..=VOL_CEILING).contains(&vol) {
                break;
            }
        }

        tracing::debug!(target_price, spot, strike, t, "Newton did not converge, bisecting.");
        self.bisect(target_price, option_type, spot, strike, t)
    }

    fn bisect(
        &self,
        target_price: f64,
        option_type: OptionType,
        spot: f64,
        strike: f64,
        t: f64,
    ) -> Result<f64, PricingError> {
        let (mut lo, mut hi) = (VOL_FLOOR, VOL_CEILING);
        if self.price(option_type, spot, strike, t, lo) > target_price
            || self.price(option_type, spot, strike, t, hi) < target_price
        {
            return Err(PricingError::NotConverged(format!(
                "price {} is not attainable for volatility in [{}, {}]",
                target_price, VOL_FLOOR, VOL_CEILING
            )));
        }

        for _ in 0..BISECTION_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            let diff = self.price(option_type, spot, strike, t, mid) - target_price;
            if diff.abs() < PRICE_TOLERANCE || (hi - lo) < 1e-12 {
                return Ok(mid);
            }
            if diff > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Err(PricingError::NotConverged(format!(
            "bisection exhausted after {} iterations",
            BISECTION_ITERATIONS
        )))
    }
}
