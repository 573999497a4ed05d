//! Screening and chain queries over the synthetic contract universe.

pub mod error;
pub mod filters;

pub use error::ScreenerError;
pub use filters::{FilterStats, apply_filters, rank_order};

use chain::{ExpirationSlice, UniverseGenerator, expiration_schedule, group_by_expiration};
use chrono::{Local, NaiveDate};
use configuration::Config;
use core_types::{CoreError, OptionContract, OptionType, ScreeningFilters};
use market_data::{PriceResolver, ResolvedUnderlying};
use serde::{Deserialize, Serialize};

/// The result of a screen, before truncation bookkeeping is dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningOutcome {
    pub contracts: Vec<OptionContract>,
    /// Matches before `resultLimit` truncation.
    pub total_match_count: usize,
    pub stats: FilterStats,
    pub underlyings: Vec<ResolvedUnderlying>,
}

impl ScreeningOutcome {
    pub fn is_synthetic(&self) -> bool {
        self.underlyings.iter().any(|u| u.origin.is_synthetic())
    }
}

/// A full chain request for a single underlying.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainQuery {
    pub underlying_symbol: String,
    #[serde(default)]
    pub min_dte: u32,
    #[serde(default = "default_chain_max_dte")]
    pub max_dte: u32,
    #[serde(default = "OptionType::all")]
    pub option_types: Vec<OptionType>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_chain_max_dte() -> u32 {
    60
}

impl ChainQuery {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            underlying_symbol: symbol.into(),
            min_dte: 0,
            max_dte: default_chain_max_dte(),
            option_types: OptionType::all(),
            seed: None,
            as_of: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutcome {
    pub underlying: ResolvedUnderlying,
    pub expirations: Vec<ExpirationSlice>,
}

/// Runs the resolve, schedule, generate, filter and rank pipeline.
pub struct ScreeningService {
    resolver: PriceResolver,
    generator: UniverseGenerator,
    default_seed: u64,
    max_dte: u32,
    weekly_horizon_days: u32,
}

impl ScreeningService {
    pub fn new(config: &Config, resolver: PriceResolver) -> Result<Self, ScreenerError> {
        Ok(Self {
            resolver,
            generator: UniverseGenerator::new(config.chain.clone(), &config.engine)?,
            default_seed: config.engine.seed,
            max_dte: config.chain.max_dte,
            weekly_horizon_days: config.chain.weekly_horizon_days,
        })
    }

    pub fn screen(&self, filters: &ScreeningFilters) -> Result<ScreeningOutcome, ScreenerError> {
        filters.validate()?;
        self.check_dte_ceiling(filters.max_dte)?;

        let today = filters.as_of.unwrap_or_else(today);
        let seed = filters.seed.unwrap_or(self.default_seed);
        let underlyings = self.resolver.resolve_all(&filters.underlying_symbols)?;
        let expirations = expiration_schedule(today, filters.min_dte, filters.max_dte, self.weekly_horizon_days)?;

        let universes = underlyings
            .iter()
            .map(|u| self.generator.generate(u, &expirations, today, &OptionType::all(), seed))
            .collect::<Result<Vec<_>, _>>()?;

        let (mut contracts, stats) = filters::screen_universes(universes, filters);
        let total_match_count = contracts.len();
        contracts.truncate(filters.result_limit);

        tracing::info!(
            symbols = ?filters.underlying_symbols,
            expirations = expirations.len(),
            generated = stats.generated,
            after_type = stats.after_type,
            after_delta = stats.after_delta,
            after_dte = stats.after_dte,
            after_volume = stats.after_volume,
            after_open_interest = stats.after_open_interest,
            returned = contracts.len(),
            "Screen complete."
        );

        Ok(ScreeningOutcome {
            contracts,
            total_match_count,
            stats,
            underlyings,
        })
    }

    /// The unfiltered universe of one underlying, grouped by expiration.
    pub fn chain(&self, query: &ChainQuery) -> Result<ChainOutcome, ScreenerError> {
        if query.min_dte > query.max_dte {
            return Err(CoreError::InvalidRange {
                field: "dte",
                min: query.min_dte.to_string(),
                max: query.max_dte.to_string(),
            }
            .into());
        }
        self.check_dte_ceiling(query.max_dte)?;

        let today = query.as_of.unwrap_or_else(today);
        let underlying = self.resolver.resolve(&query.underlying_symbol)?;
        let expirations = expiration_schedule(today, query.min_dte, query.max_dte, self.weekly_horizon_days)?;
        let contracts = self.generator.generate(
            &underlying,
            &expirations,
            today,
            &query.option_types,
            query.seed.unwrap_or(self.default_seed),
        )?;

        tracing::info!(
            symbol = %underlying.symbol,
            expirations = expirations.len(),
            contracts = contracts.len(),
            "Chain generated."
        );

        Ok(ChainOutcome {
            underlying,
            expirations: group_by_expiration(contracts),
        })
    }

    fn check_dte_ceiling(&self, max_dte: u32) -> Result<(), CoreError> {
        if max_dte > self.max_dte {
            return Err(CoreError::InvalidInput(
                "maxDte".to_string(),
                format!("{} exceeds the supported maximum of {}", max_dte, self.max_dte),
            ));
        }
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
