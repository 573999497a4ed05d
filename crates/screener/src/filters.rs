use core_types::{OptionContract, ScreeningFilters};
use serde::Serialize;
use std::cmp::Ordering;

/// Survivor counts after each stage of the filter pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub generated: usize,
    pub after_type: usize,
    pub after_delta: usize,
    pub after_dte: usize,
    pub after_volume: usize,
    pub after_open_interest: usize,
}

impl FilterStats {
    fn accumulate(&mut self, other: &FilterStats) {
        self.generated += other.generated;
        self.after_type += other.after_type;
        self.after_delta += other.after_delta;
        self.after_dte += other.after_dte;
        self.after_volume += other.after_volume;
        self.after_open_interest += other.after_open_interest;
    }
}

fn within_delta_band(contract: &OptionContract, filters: &ScreeningFilters) -> bool {
    filters.min_delta.is_none_or(|min| contract.delta >= min)
        && filters.max_delta.is_none_or(|max| contract.delta <= max)
}

/// Applies the conjunctive filter chain in its fixed order:
/// type, delta band, DTE window, volume floor, open-interest floor.
pub fn apply_filters(
    contracts: Vec<OptionContract>,
    filters: &ScreeningFilters,
) -> (Vec<OptionContract>, FilterStats) {
    let mut stats = FilterStats {
        generated: contracts.len(),
        ..Default::default()
    };

    let mut survivors: Vec<OptionContract> = contracts
        .into_iter()
        .filter(|c| filters.includes_type(c.option_type))
        .collect();
    stats.after_type = survivors.len();

    survivors.retain(|c| within_delta_band(c, filters));
    stats.after_delta = survivors.len();

    survivors.retain(|c| (filters.min_dte..=filters.max_dte).contains(&c.days_to_expiration));
    stats.after_dte = survivors.len();

    survivors.retain(|c| c.volume >= filters.min_volume);
    stats.after_volume = survivors.len();

    survivors.retain(|c| c.open_interest >= filters.min_open_interest);
    stats.after_open_interest = survivors.len();

    (survivors, stats)
}

/// Ranking order: volume descending, then distance from spot ascending, then identity.
pub fn rank_order(a: &OptionContract, b: &OptionContract) -> Ordering {
    b.volume
        .cmp(&a.volume)
        .then_with(|| a.strike_distance().cmp(&b.strike_distance()))
        .then_with(|| a.key().cmp(&b.key()))
}

/// Filters several universes and merges the survivors into one ranked list.
pub(crate) fn screen_universes<I>(universes: I, filters: &ScreeningFilters) -> (Vec<OptionContract>, FilterStats)
where
    I: IntoIterator<Item = Vec<OptionContract>>,
{
    let mut matches = Vec::new();
    let mut stats = FilterStats::default();
    for universe in universes {
        let (survivors, universe_stats) = apply_filters(universe, filters);
        stats.accumulate(&universe_stats);
        matches.extend(survivors);
    }
    matches.sort_by(rank_order);
    (matches, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Moneyness, OptionType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn contract(option_type: OptionType, strike: Decimal, delta: f64, dte: u32, volume: u64, oi: u64) -> OptionContract {
        OptionContract {
            contract_symbol: format!("TEST{strike}{}", option_type.code()),
            underlying_symbol: "TEST".to_string(),
            option_type,
            strike_price: strike,
            expiration_date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            days_to_expiration: dte,
            bid: dec!(1.00),
            ask: dec!(1.10),
            last_price: dec!(1.05),
            bid_ask_spread: dec!(0.10),
            volume,
            open_interest: oi,
            delta,
            gamma: 0.02,
            theta: -0.05,
            vega: 0.1,
            implied_volatility: 0.25,
            moneyness: Moneyness::Otm,
            underlying_price: dec!(100),
        }
    }

    fn sample() -> Vec<OptionContract> {
        vec![
            contract(OptionType::Call, dec!(100), 0.52, 30, 900, 2_000),
            contract(OptionType::Call, dec!(110), 0.25, 30, 400, 1_500),
            contract(OptionType::Put, dec!(95), -0.35, 30, 700, 900),
            contract(OptionType::Call, dec!(105), 0.38, 90, 300, 100),
            contract(OptionType::Put, dec!(100), -0.48, 30, 50, 10),
        ]
    }

    #[test]
    fn stages_run_in_order_and_count_survivors() {
        let mut filters = ScreeningFilters::for_symbols(["TEST"]);
        filters.option_types = vec![OptionType::Call];
        filters.min_delta = Some(0.3);
        filters.max_delta = Some(0.7);
        filters.max_dte = 60;
        filters.min_volume = 100;

        let (survivors, stats) = apply_filters(sample(), &filters);
        assert_eq!(
            stats,
            FilterStats {
                generated: 5,
                after_type: 3,
                after_delta: 2,
                after_dte: 1,
                after_volume: 1,
                after_open_interest: 1,
            }
        );
        assert_eq!(survivors[0].strike_price, dec!(100));
    }

    #[test]
    fn delta_band_uses_raw_signed_delta() {
        let mut filters = ScreeningFilters::for_symbols(["TEST"]);
        filters.min_delta = Some(-0.5);
        filters.max_delta = Some(-0.3);
        let (survivors, _) = apply_filters(sample(), &filters);
        assert_eq!(survivors.len(), 2);
        assert!(survivors.iter().all(|c| c.option_type == OptionType::Put));
    }

    #[test]
    fn inverted_delta_band_matches_nothing() {
        let mut filters = ScreeningFilters::for_symbols(["TEST"]);
        filters.min_delta = Some(0.7);
        filters.max_delta = Some(0.3);
        let (survivors, stats) = apply_filters(sample(), &filters);
        assert!(survivors.is_empty());
        assert_eq!(stats.after_type, 5);
        assert_eq!(stats.after_delta, 0);
    }

    #[test]
    fn ranking_prefers_volume_then_proximity() {
        let mut contracts = vec![
            contract(OptionType::Call, dec!(110), 0.3, 30, 500, 1),
            contract(OptionType::Call, dec!(95), 0.6, 30, 500, 1),
            contract(OptionType::Put, dec!(90), -0.2, 30, 800, 1),
        ];
        contracts.sort_by(rank_order);
        let strikes: Vec<_> = contracts.iter().map(|c| c.strike_price).collect();
        assert_eq!(strikes, vec![dec!(90), dec!(95), dec!(110)]);
    }
}
