use core_types::CoreError;
use pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("Pricing failed while generating contracts: {0}")]
    Pricing(#[from] PricingError),

    #[error("Generator parameters are invalid: {0}")]
    InvalidParameters(String),
}
