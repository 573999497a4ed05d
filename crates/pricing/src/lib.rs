//! # Optilab Pricing
//!
//! Black-Scholes style estimation of the theoretical price and Greeks of a single
//! European option, plus an implied-volatility solver.
//!
//! This is a pure logic crate: every function is deterministic, stateless and safe to
//! call from any number of threads. Inputs that would produce NaN or infinity are
//! rejected as validation errors before any value leaves the crate.

pub mod error;
pub mod estimator;
pub mod implied_vol;
pub mod normal;

pub use error::PricingError;
pub use estimator::{
    DAYS_PER_YEAR, GreeksEstimator, MAX_ABS_DELTA, MIN_ABS_DELTA, PricingInput, PricingOutput,
    years_from_days,
};
pub use normal::{erf, norm_cdf, norm_pdf};
