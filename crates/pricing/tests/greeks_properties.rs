//! Sign and range invariants of the estimator over random market inputs.

use core_types::OptionType;
use pricing::{GreeksEstimator, PricingInput};
use proptest::prelude::*;

fn option_type() -> impl Strategy<Value = OptionType> {
    prop_oneof![Just(OptionType::Call), Just(OptionType::Put)]
}

proptest! {
    #[test]
    fn greeks_respect_sign_conventions(
        option_type in option_type(),
        spot in 1.0f64..1_000.0,
        moneyness in 0.5f64..1.5,
        days in 1u32..730,
        vol in 0.05f64..1.5,
    ) {
        let estimator = GreeksEstimator::new(0.05).unwrap();
        let input = PricingInput {
            option_type,
            spot,
            strike: spot * moneyness,
            time_to_expiration: pricing::years_from_days(days),
            volatility: vol,
        };
        let out = estimator.estimate(&input).unwrap();

        prop_assert!(out.theoretical_price >= 0.0);
        prop_assert!(out.greeks.gamma >= 0.0);
        prop_assert!(out.greeks.vega >= 0.0);
        prop_assert!(out.greeks.theta <= 0.0);
        match option_type {
            OptionType::Call => prop_assert!((0.01..=0.99).contains(&out.greeks.delta)),
            OptionType::Put => prop_assert!((-0.99..=-0.01).contains(&out.greeks.delta)),
        }
    }

    #[test]
    fn call_price_never_exceeds_spot(
        spot in 1.0f64..1_000.0,
        moneyness in 0.5f64..1.5,
        days in 1u32..730,
        vol in 0.05f64..1.5,
    ) {
        let estimator = GreeksEstimator::default();
        let out = estimator.estimate(&PricingInput {
            option_type: OptionType::Call,
            spot,
            strike: spot * moneyness,
            time_to_expiration: pricing::years_from_days(days),
            volatility: vol,
        }).unwrap();
        prop_assert!(out.theoretical_price <= spot + 1e-9);
    }
}
