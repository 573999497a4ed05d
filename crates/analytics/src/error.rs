use core_types::CoreError;
use market_data::MarketDataError;
use pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Greeks calculation failed: {0}")]
    Pricing(#[from] PricingError),

    #[error("Volatility lookup failed: {0}")]
    MarketData(#[from] MarketDataError),
}

impl AnalyticsError {
    /// The validation failure behind this error, if the caller's input caused it.
    pub fn validation(&self) -> Option<&CoreError> {
        match self {
            AnalyticsError::Validation(e)
            | AnalyticsError::Pricing(PricingError::Validation(e))
            | AnalyticsError::MarketData(MarketDataError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}
