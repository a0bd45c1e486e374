// Promo code redemption checks
//
// The check never writes: it tells the caller which discount applies and,
// when a base price is known, what the price becomes.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::discount::{apply_discount, round_to_cents};
use crate::promocodes::{
    PromoCode, PromoCodeCheckRequest, PromoCodeCheckResponse, PromoError, PromoRepository,
    PromoTarget,
};
use crate::validation::is_well_formed_promo_code;

#[derive(Clone)]
pub struct PromoService {
    promos: PromoRepository,
}

impl PromoService {
    pub fn new(promos: PromoRepository) -> Self {
        Self { promos }
    }

    /// Check a promo code against a tour or a hotel as of `today`
    pub async fn check(
        &self,
        request: &PromoCodeCheckRequest,
        today: NaiveDate,
    ) -> Result<PromoCodeCheckResponse, PromoError> {
        let target = request.target()?;
        let code = request.promo_code.trim();

        let promo = if is_well_formed_promo_code(code) {
            self.promos.find_by_code(code).await?
        } else {
            tracing::debug!("Malformed promo code {:?}", code);
            None
        };
        let promo = validate_redemption(promo.as_ref(), target, today)?;

        let response = match target {
            PromoTarget::Tour(tour_id) => {
                let tour_price = self
                    .promos
                    .tour_price(tour_id)
                    .await?
                    .ok_or(PromoError::TourNotFound(tour_id))?;
                PromoCodeCheckResponse {
                    discount_amount: promo.discount_amount,
                    tour_price: Some(tour_price),
                    total_price: Some(final_price(tour_price, promo.discount_amount)),
                }
            }
            PromoTarget::Hotel(_) => PromoCodeCheckResponse {
                discount_amount: promo.discount_amount,
                tour_price: None,
                total_price: request
                    .price
                    .map(|price| final_price(price, promo.discount_amount)),
            },
        };

        tracing::info!("Promo code {} accepted for {:?}", promo.code, target);
        Ok(response)
    }
}

/// Decide whether a looked-up promo code may be redeemed against `target`
pub fn validate_redemption(
    promo: Option<&PromoCode>,
    target: PromoTarget,
    today: NaiveDate,
) -> Result<&PromoCode, PromoError> {
    let promo = promo.ok_or(PromoError::NotFound)?;
    if !promo.is_valid_on(today) {
        return Err(PromoError::Expired);
    }
    if !promo.applies_to(target) {
        return Err(PromoError::NotEligible(target));
    }
    Ok(promo)
}

/// Price after a promo discount, rounded to cents
pub fn final_price(base_price: Decimal, discount_amount: Decimal) -> Decimal {
    round_to_cents(apply_discount(base_price, discount_amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summer10() -> PromoCode {
        PromoCode {
            id: 1,
            code: "SUMMER10".to_string(),
            description: Some("Summer sale".to_string()),
            start_date: date(2025, 6, 1),
            end_date: date(2025, 8, 31),
            discount_amount: dec!(0.10),
            is_active: true,
            tour_ids: vec![7],
            hotel_ids: vec![3],
        }
    }

    #[test]
    fn test_unknown_code() {
        let result = validate_redemption(None, PromoTarget::Tour(7), date(2025, 7, 1));
        assert!(matches!(result, Err(PromoError::NotFound)));
    }

    #[test]
    fn test_expired_code() {
        let promo = summer10();
        let result = validate_redemption(Some(&promo), PromoTarget::Tour(7), date(2025, 9, 1));
        assert!(matches!(result, Err(PromoError::Expired)));
    }

    #[test]
    fn test_expiry_checked_before_eligibility() {
        let promo = PromoCode {
            is_active: false,
            ..summer10()
        };
        let result = validate_redemption(Some(&promo), PromoTarget::Tour(8), date(2025, 7, 1));
        assert!(matches!(result, Err(PromoError::Expired)));
    }

    #[test]
    fn test_tour_not_eligible() {
        let promo = summer10();
        let result = validate_redemption(Some(&promo), PromoTarget::Tour(8), date(2025, 7, 1));
        assert!(matches!(
            result,
            Err(PromoError::NotEligible(PromoTarget::Tour(8)))
        ));
    }

    #[test]
    fn test_eligible_tour_gets_ten_percent_off() {
        let promo = summer10();
        let accepted = validate_redemption(Some(&promo), PromoTarget::Tour(7), date(2025, 7, 1)).unwrap();

        assert_eq!(final_price(dec!(100000), accepted.discount_amount), dec!(90000.00));
    }

    #[test]
    fn test_fixed_promo_discount() {
        assert_eq!(final_price(dec!(100000), dec!(5000)), dec!(95000.00));
        assert_eq!(final_price(dec!(3000), dec!(5000)), dec!(0));
    }

    #[test]
    fn test_one_is_still_a_fraction() {
        assert_eq!(final_price(dec!(100000), dec!(1.00)), dec!(0));
    }

    #[test]
    fn test_final_price_rounds_half_away_from_zero() {
        assert_eq!(final_price(dec!(10.05), dec!(0.5)), dec!(5.03));
        assert_eq!(final_price(dec!(99.99), dec!(0.15)), dec!(84.99));
    }

    proptest! {
        #[test]
        fn test_final_price_within_bounds(
            base in 0i64..10_000_000_00,
            amount in 1i64..1_000_000_00,
        ) {
            let base = Decimal::new(base, 2);
            let amount = Decimal::new(amount, 2);
            let price = final_price(base, amount);

            prop_assert!(price >= Decimal::ZERO);
            prop_assert!(price <= base);
            prop_assert!(price.scale() <= 2);
        }
    }
}
