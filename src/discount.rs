// Discount arithmetic shared by nightly pricing and promo codes
//
// A single `discount_amount` value carries two meanings: amounts up to and
// including 1.00 are a fraction of the price, anything larger is a fixed sum.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest discount amount still interpreted as a fraction of the price
pub const FRACTIONAL_DISCOUNT_CEILING: Decimal = Decimal::ONE;

/// How a discount amount is applied to a price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// `0.17` means 17% off
    Fractional,
    /// Subtracted from the price as-is
    Fixed,
}

impl DiscountKind {
    /// Classify a discount amount
    pub fn of(discount_amount: Decimal) -> Self {
        if discount_amount <= FRACTIONAL_DISCOUNT_CEILING {
            DiscountKind::Fractional
        } else {
            DiscountKind::Fixed
        }
    }
}

/// Apply a discount to a base price
///
/// # Arguments
/// * `base_price` - Non-negative price before the discount
/// * `discount_amount` - Fraction (<= 1.00) or fixed amount (> 1.00)
///
/// # Returns
/// The discounted price, never below zero. The result is not rounded.
pub fn apply_discount(base_price: Decimal, discount_amount: Decimal) -> Decimal {
    let discounted = match DiscountKind::of(discount_amount) {
        DiscountKind::Fractional => base_price * (Decimal::ONE - discount_amount),
        DiscountKind::Fixed => base_price - discount_amount,
    };

    discounted.max(Decimal::ZERO)
}

/// Apply an optional discount; `None` passes the price through unchanged
pub fn apply_optional_discount(base_price: Decimal, discount_amount: Option<Decimal>) -> Decimal {
    match discount_amount {
        Some(amount) => apply_discount(base_price, amount),
        None => base_price,
    }
}

/// Round an amount of money to cents, halves away from zero
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
