use chain::ChainError;
use core_types::CoreError;
use market_data::MarketDataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Underlying resolution failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Chain generation failed: {0}")]
    Chain(#[from] ChainError),
}

impl ScreenerError {
    /// The validation failure behind this error, if the caller's input caused it.
    pub fn validation(&self) -> Option<&CoreError> {
        match self {
            ScreenerError::Validation(e)
            | ScreenerError::MarketData(MarketDataError::Validation(e))
            | ScreenerError::Chain(ChainError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}
