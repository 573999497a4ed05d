use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Price {price} is outside the no-arbitrage bounds [{lower}, {upper}]")]
    OutsideArbitrageBounds { price: f64, lower: f64, upper: f64 },

    #[error("Implied volatility solver did not converge: {0}")]
    NotConverged(String),
}
