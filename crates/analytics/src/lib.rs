//! # Optilab Analytics
//!
//! Payoff analysis for multi-leg option strategies.
//!
//! - **Stateless Calculation:** `StrategyEvaluator` takes a leg list and a spot price and
//!   produces a `StrategyEvaluationResult`. The only inputs are the request and the
//!   configured limits, so equal requests yield identical curves.
//! - **Consistent Greeks:** per-leg Greeks come from the `pricing` estimator that also
//!   prices the generated contract universe.

pub mod error;
pub mod evaluator;
pub mod report;
pub mod shape;

pub use error::AnalyticsError;
pub use evaluator::{CURRENT_TIME_VALUE_FACTOR, SnapshotVolatility, StrategyEvaluationRequest, StrategyEvaluator};
pub use report::StrategyEvaluationResult;
pub use shape::StrategyShape;
