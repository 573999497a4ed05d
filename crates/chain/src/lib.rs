//! Synthetic option chains: expiration calendars and the priced contract universe.

pub mod error;
pub mod expirations;
pub mod universe;

pub use error::ChainError;
pub use expirations::{days_to_expiration, expiration_schedule, third_friday};
pub use universe::{UniverseGenerator, contract_symbol, strike_increment, strike_ladder};

use chrono::NaiveDate;
use core_types::OptionContract;
use itertools::Itertools;
use serde::Serialize;

/// All contracts of one expiration, in strike order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationSlice {
    pub expiration_date: NaiveDate,
    pub days_to_expiration: u32,
    pub contracts: Vec<OptionContract>,
}

/// Groups an expiration-ordered universe into per-expiration slices.
pub fn group_by_expiration(contracts: Vec<OptionContract>) -> Vec<ExpirationSlice> {
    contracts
        .into_iter()
        .chunk_by(|c| (c.expiration_date, c.days_to_expiration))
        .into_iter()
        .map(|((expiration_date, days_to_expiration), group)| ExpirationSlice {
            expiration_date,
            days_to_expiration,
            contracts: group.collect(),
        })
        .collect()
}
