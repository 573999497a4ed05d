use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Quote for {symbol} is unusable: {reason}")]
    InvalidQuote { symbol: String, reason: String },
}
