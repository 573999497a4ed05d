//! # Optilab Core Types
//!
//! The shared vocabulary of the workspace: option contracts, strategy legs, Greeks,
//! P&L samples and screening filters, together with the validation errors every
//! other crate reports through.
//!
//! This is a Layer 0 crate. It has no knowledge of pricing, generation or transport.

pub mod enums;
pub mod error;
pub mod num;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Moneyness, OptionAction, OptionType};
pub use error::CoreError;
pub use num::{to_decimal, to_f64};
pub use structs::{
    CONTRACT_MULTIPLIER, Greeks, GreeksPoint, OptionContract, PnLPoint, ScreeningFilters,
    StrategyLeg,
};
