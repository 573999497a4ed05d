//! Checked conversions between the f64 world of the pricing model and the Decimal
//! world of money. A NaN or infinity never becomes a price.

use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

pub fn to_decimal(value: f64, field: &'static str) -> Result<Decimal, CoreError> {
    if !value.is_finite() {
        return Err(CoreError::NonFinite(field));
    }
    Decimal::from_f64(value).ok_or(CoreError::NonFinite(field))
}

pub fn to_f64(value: Decimal, field: &'static str) -> Result<f64, CoreError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or(CoreError::NonFinite(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_nan_and_infinity() {
        assert_eq!(to_decimal(f64::NAN, "delta"), Err(CoreError::NonFinite("delta")));
        assert_eq!(to_decimal(f64::INFINITY, "price"), Err(CoreError::NonFinite("price")));
        assert_eq!(to_decimal(2.5, "price").unwrap(), dec!(2.5));
        assert_eq!(to_f64(dec!(101.25), "spot").unwrap(), 101.25);
    }
}
