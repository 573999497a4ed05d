use crate::error::ChainError;
use crate::expirations::days_to_expiration;
use chrono::NaiveDate;
use configuration::{ChainSettings, EngineSettings};
use core_types::{CoreError, Moneyness, OptionContract, OptionType, to_decimal, to_f64};
use itertools::iproduct;
use market_data::{ResolvedUnderlying, stream_id};
use pricing::{GreeksEstimator, PricingInput, years_from_days};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Strike spacing for an underlying price: $5 above $200, $1 from $50 to $200, $0.50 below.
pub fn strike_increment(price: Decimal) -> Decimal {
    if price > dec!(200) {
        dec!(5)
    } else if price >= dec!(50) {
        dec!(1)
    } else {
        dec!(0.5)
    }
}

/// A ladder of `2 * strikes_per_side + 1` strikes centred on the aligned strike nearest
/// to `price`, ascending. Non-positive strikes are dropped.
pub fn strike_ladder(price: Decimal, strikes_per_side: usize) -> Vec<Decimal> {
    let increment = strike_increment(price);
    let center = (price / increment)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * increment;
    let side = strikes_per_side as i64;
    (-side..=side)
        .map(|i| center + increment * Decimal::from(i))
        .filter(|strike| *strike > Decimal::ZERO)
        .collect()
}

/// OCC-style symbol: `{underlying}{YYMMDD}{C|P}{strike x 1000, 8 digits}`.
pub fn contract_symbol(
    underlying: &str,
    expiration: NaiveDate,
    option_type: OptionType,
    strike: Decimal,
) -> Result<String, ChainError> {
    let scaled = (strike * dec!(1000))
        .round()
        .to_u64()
        .filter(|v| *v < 100_000_000)
        .ok_or_else(|| CoreError::InvalidInput("strike".to_string(), strike.to_string()))?;
    Ok(format!(
        "{}{}{}{:08}",
        underlying,
        expiration.format("%y%m%d"),
        option_type.code(),
        scaled
    ))
}

/// Liquidity parameters shared by every strike of one (expiration, type) slice.
#[derive(Debug, Clone, Copy)]
struct SliceLiquidity {
    scale: f64,
    open_interest_ratio: f64,
}

impl SliceLiquidity {
    fn draw(seed: u64, underlying: &str, expiration: NaiveDate, option_type: OptionType) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream_id(&[
            underlying,
            &expiration.to_string(),
            &option_type.code().to_string(),
        ]));
        Self {
            scale: rng.gen_range(0.75..1.25),
            open_interest_ratio: rng.gen_range(2.0..5.0),
        }
    }
}

/// Synthesizes option contracts around a resolved underlying.
///
/// The generator is stateless; the only pseudo-randomness is the per-slice liquidity
/// draw, which is fully determined by the seed passed to [`UniverseGenerator::generate`].
#[derive(Debug, Clone)]
pub struct UniverseGenerator {
    settings: ChainSettings,
    atm_tolerance_pct: Decimal,
    estimator: GreeksEstimator,
}

impl UniverseGenerator {
    pub fn new(settings: ChainSettings, engine: &EngineSettings) -> Result<Self, ChainError> {
        if settings.strikes_per_side == 0 {
            return Err(ChainError::InvalidParameters(
                "strikes_per_side must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            settings,
            atm_tolerance_pct: engine.atm_tolerance_pct,
            estimator: GreeksEstimator::new(engine.risk_free_rate)?,
        })
    }

    /// One contract per (expiration, strike, type), ordered by expiration, then strike,
    /// calls before puts.
    pub fn generate(
        &self,
        underlying: &ResolvedUnderlying,
        expirations: &[NaiveDate],
        today: NaiveDate,
        option_types: &[OptionType],
        seed: u64,
    ) -> Result<Vec<OptionContract>, ChainError> {
        if underlying.price <= Decimal::ZERO {
            return Err(CoreError::non_positive("underlying price", underlying.price).into());
        }
        let mut types = option_types.to_vec();
        types.sort();
        types.dedup();

        let strikes = strike_ladder(underlying.price, self.settings.strikes_per_side);
        tracing::debug!(
            symbol = %underlying.symbol,
            spot = %underlying.price,
            strikes = strikes.len(),
            expirations = expirations.len(),
            "Generating contract universe."
        );

        let slices = expirations
            .par_iter()
            .map(|expiration| {
                self.generate_expiration(underlying, *expiration, today, &strikes, &types, seed)
            })
            .collect::<Result<Vec<_>, ChainError>>()?;

        Ok(slices.into_iter().flatten().collect())
    }

    fn generate_expiration(
        &self,
        underlying: &ResolvedUnderlying,
        expiration: NaiveDate,
        today: NaiveDate,
        strikes: &[Decimal],
        types: &[OptionType],
        seed: u64,
    ) -> Result<Vec<OptionContract>, ChainError> {
        let dte = days_to_expiration(today, expiration);
        if dte <= 0 {
            return Err(CoreError::ZeroTimeToExpiration.into());
        }
        let dte = u32::try_from(dte)
            .map_err(|_| CoreError::InvalidInput("expiration".to_string(), expiration.to_string()))?;

        let liquidity: Vec<(OptionType, SliceLiquidity)> = types
            .iter()
            .map(|t| (*t, SliceLiquidity::draw(seed, &underlying.symbol, expiration, *t)))
            .collect();

        iproduct!(strikes.iter(), liquidity.iter())
            .map(|(strike, (option_type, slice))| {
                self.price_contract(underlying, expiration, dte, *strike, *option_type, slice)
            })
            .collect()
    }

    fn price_contract(
        &self,
        underlying: &ResolvedUnderlying,
        expiration: NaiveDate,
        dte: u32,
        strike: Decimal,
        option_type: OptionType,
        slice: &SliceLiquidity,
    ) -> Result<OptionContract, ChainError> {
        let spot = to_f64(underlying.price, "underlying price")?;
        let strike_f = to_f64(strike, "strike price")?;
        let log_moneyness = (strike_f / spot).ln();
        let volatility = underlying.iv_seed * (1.0 + self.settings.smile_coefficient * log_moneyness.powi(2));

        let estimate = self.estimator.estimate(&PricingInput {
            option_type,
            spot,
            strike: strike_f,
            time_to_expiration: years_from_days(dte),
            volatility,
        })?;

        let theoretical = to_decimal(estimate.theoretical_price, "theoretical price")?;
        let spread = (theoretical * self.settings.spread_pct).max(self.settings.min_tick);
        let half_spread = spread / dec!(2);
        let bid = (theoretical - half_spread).max(Decimal::ZERO).round_dp(2);
        let ask = (theoretical + half_spread).round_dp(2).max(bid);

        let increment = to_f64(strike_increment(underlying.price), "strike increment")?;
        let steps_from_spot = (strike_f - spot).abs() / increment;
        let dte_factor = 1.0 / (1.0 + f64::from(dte) / 30.0);
        let volume = (self.settings.base_volume
            * slice.scale
            * dte_factor
            * (-self.settings.volume_decay * steps_from_spot).exp())
        .round();
        let open_interest = (volume * slice.open_interest_ratio).round();

        Ok(OptionContract {
            contract_symbol: contract_symbol(&underlying.symbol, expiration, option_type, strike)?,
            underlying_symbol: underlying.symbol.clone(),
            option_type,
            strike_price: strike,
            expiration_date: expiration,
            days_to_expiration: dte,
            bid,
            ask,
            last_price: (bid + ask) / dec!(2),
            bid_ask_spread: ask - bid,
            volume: volume as u64,
            open_interest: open_interest as u64,
            delta: estimate.greeks.delta,
            gamma: estimate.greeks.gamma,
            theta: estimate.greeks.theta,
            vega: estimate.greeks.vega,
            implied_volatility: volatility,
            moneyness: Moneyness::classify(option_type, strike, underlying.price, self.atm_tolerance_pct),
            underlying_price: underlying.price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strike_spacing_scales_with_price() {
        assert_eq!(strike_increment(dec!(450)), dec!(5));
        assert_eq!(strike_increment(dec!(200)), dec!(1));
        assert_eq!(strike_increment(dec!(50)), dec!(1));
        assert_eq!(strike_increment(dec!(49.99)), dec!(0.5));
    }

    #[test]
    fn ladder_is_centred_and_symmetric() {
        let ladder = strike_ladder(dec!(452.3), 10);
        assert_eq!(ladder.len(), 21);
        assert_eq!(ladder[10], dec!(450));
        assert_eq!(ladder[0], dec!(400));
        assert_eq!(ladder[20], dec!(500));

        let ladder = strike_ladder(dec!(152.6), 2);
        assert_eq!(ladder, vec![dec!(151), dec!(152), dec!(153), dec!(154), dec!(155)]);

        let ladder = strike_ladder(dec!(23.26), 1);
        assert_eq!(ladder, vec![dec!(23.0), dec!(23.5), dec!(24.0)]);
    }

    #[test]
    fn ladder_drops_non_positive_strikes() {
        let ladder = strike_ladder(dec!(1.2), 10);
        assert!(ladder.iter().all(|s| *s > Decimal::ZERO));
        assert_eq!(ladder.first(), Some(&dec!(0.5)));
        assert_eq!(ladder.len(), 12);
    }

    #[test]
    fn contract_symbols() {
        let expiry = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        assert_eq!(
            contract_symbol("SPY", expiry, OptionType::Call, dec!(450)).unwrap(),
            "SPY261120C00450000"
        );
        assert_eq!(
            contract_symbol("F", expiry, OptionType::Put, dec!(12.5)).unwrap(),
            "F261120P00012500"
        );
    }
}
