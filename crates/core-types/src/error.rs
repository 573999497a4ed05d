use thiserror::Error;

/// Input validation failures shared by every engine component.
///
/// Each variant maps to a stable machine-readable code through [`CoreError::reason`],
/// which the transport layer forwards to clients next to the human-readable message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("At least one underlying symbol is required")]
    EmptySymbols,

    #[error("A strategy needs at least one leg")]
    NoLegs,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: String },

    #[error("Time to expiration must be greater than zero")]
    ZeroTimeToExpiration,

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),

    #[error("Invalid range for {field}: {min} is greater than {max}")]
    InvalidRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("{0} overflows the decimal range")]
    Overflow(&'static str),
}

impl CoreError {
    pub fn reason(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(..) => "invalid_input",
            CoreError::EmptySymbols => "empty_symbols",
            CoreError::NoLegs => "no_legs",
            CoreError::NonPositive { field, .. } if field.contains("price") => "non_positive_price",
            CoreError::NonPositive { .. } => "non_positive_value",
            CoreError::ZeroTimeToExpiration => "zero_time_to_expiration",
            CoreError::NonFinite(_) => "non_finite_value",
            CoreError::InvalidRange { .. } => "invalid_range",
            CoreError::Overflow(_) => "numeric_overflow",
        }
    }

    pub fn non_positive(field: &'static str, value: impl ToString) -> Self {
        CoreError::NonPositive {
            field,
            value: value.to_string(),
        }
    }
}
