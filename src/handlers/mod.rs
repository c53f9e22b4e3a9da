pub mod assets;
pub mod calculations;
pub mod categories;
pub mod family;
pub mod transactions;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::ApiError;

/// Display names (group names, asset names) are 1..=100 characters
pub(crate) fn validate_name(field: &str, name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() || name.chars().count() > 100 {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            field.to_string(),
            "Must be between 1 and 100 characters".to_string(),
        );
        return Err(ApiError::validation_error(
            "Invalid request",
            Some(field_errors),
        ));
    }
    Ok(())
}

/// Monetary amounts must be strictly positive; stored at 2-decimal precision
pub(crate) fn decimal_amount(amount: f64) -> Result<Decimal, ApiError> {
    let invalid = || {
        let mut field_errors = HashMap::new();
        field_errors.insert("amount".to_string(), "Must be a positive amount".to_string());
        ApiError::validation_error("Invalid request", Some(field_errors))
    };

    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid());
    }
    let amount = Decimal::from_f64(amount).ok_or_else(invalid)?;
    Ok(amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_short_and_non_empty() {
        assert!(validate_name("name", "Kim Family").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(101)).is_err());
        assert!(validate_name("name", &"x".repeat(100)).is_ok());
    }

    #[test]
    fn amounts_must_be_positive_and_finite() {
        assert!(decimal_amount(1000000.0).is_ok());
        assert!(decimal_amount(0.0).is_err());
        assert!(decimal_amount(-5.0).is_err());
        assert!(decimal_amount(f64::NAN).is_err());
        assert!(decimal_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn amounts_round_to_two_decimals() {
        let amount = decimal_amount(10.123456).unwrap();
        assert_eq!(amount, Decimal::new(1012, 2));
    }
}
