// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::calendars::PricingPeriodRequest;

/// Upper bound accepted for a single night's price
pub const MAX_NIGHTLY_PRICE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

static PROMO_CODE_FORMAT: OnceLock<Regex> = OnceLock::new();

fn promo_code_format() -> &'static Regex {
    PROMO_CODE_FORMAT.get_or_init(|| {
        // 2-10 uppercase latin letters followed by 1-4 digits
        Regex::new(r"^[A-Z]{2,10}\d{1,4}$").expect("promo code pattern is valid")
    })
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Validates that a nightly price lies within [0, 9 999 999.99]
pub fn validate_nightly_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(error_with_message(
            "price_must_be_non_negative",
            "Price must not be negative",
        ));
    }
    if *price > MAX_NIGHTLY_PRICE {
        return Err(error_with_message(
            "price_too_large",
            "Price must not exceed 9999999.99",
        ));
    }
    Ok(())
}

/// Validates that a decimal amount is not negative
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(error_with_message(
            "amount_must_be_non_negative",
            "Amount must not be negative",
        ))
    } else {
        Ok(())
    }
}

/// Validates the cross-field rules of a pricing period payload
///
/// - `start_date` must not be after `end_date`
/// - a discounted period needs a positive `discount_amount`
pub fn validate_period(period: &PricingPeriodRequest) -> Result<(), ValidationError> {
    if period.start_date > period.end_date {
        return Err(error_with_message(
            "invalid_period",
            "End date must not be earlier than start date",
        ));
    }

    if period.discount {
        match period.discount_amount {
            None => {
                return Err(error_with_message(
                    "discount_amount_required",
                    "discount_amount is required when discount is true",
                ))
            }
            Some(amount) if amount <= Decimal::ZERO => {
                return Err(error_with_message(
                    "discount_amount_must_be_positive",
                    "discount_amount must be a positive number",
                ))
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Whether a promo code has the accepted shape
pub fn is_well_formed_promo_code(code: &str) -> bool {
    promo_code_format().is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_nightly_price_bounds() {
        assert!(validate_nightly_price(&dec!(0)).is_ok());
        assert!(validate_nightly_price(&dec!(5000.00)).is_ok());
        assert!(validate_nightly_price(&dec!(9999999.99)).is_ok());
        assert!(validate_nightly_price(&dec!(10000000)).is_err());
        assert!(validate_nightly_price(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&dec!(0)).is_ok());
        assert!(validate_non_negative_amount(&dec!(0.17)).is_ok());
        assert!(validate_non_negative_amount(&dec!(-1)).is_err());
    }

    #[test]
    fn test_promo_code_format() {
        assert!(is_well_formed_promo_code("SUMMER10"));
        assert!(is_well_formed_promo_code("AB1"));
        assert!(is_well_formed_promo_code("ABCDEFGHIJ1234"));
        assert!(!is_well_formed_promo_code("summer10"));
        assert!(!is_well_formed_promo_code("SUMMER"));
        assert!(!is_well_formed_promo_code("A1"));
        assert!(!is_well_formed_promo_code("SUMMER12345"));
        assert!(!is_well_formed_promo_code("SUM-MER10"));
    }
}
