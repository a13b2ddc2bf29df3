//! Pricing
//!
//! Pure three-stage pricing: discount on the subtotal first, then tax on the
//! discounted amount. Recomputed in full after every cart or field mutation.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::{Cart, CartLine};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total or running sum left the representable money range.
    #[error("cart total overflows the representable money range")]
    AmountOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A percentage field value in percent points, clamped to `0..=100`.
///
/// Raw field input that is blank or unparseable reads as zero; out-of-range
/// values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percent(Decimal);

impl Percent {
    /// Zero percent.
    #[must_use]
    pub const fn zero() -> Self {
        Percent(Decimal::ZERO)
    }

    /// Build from percent points, clamping into `0..=100`.
    #[must_use]
    pub fn from_points(points: Decimal) -> Self {
        Percent(points.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Parse a raw field value; blank or unparseable input reads as zero.
    #[must_use]
    pub fn parse_field(raw: &str) -> Self {
        raw.trim()
            .parse::<Decimal>()
            .map(Self::from_points)
            .unwrap_or_else(|_| Self::zero())
    }

    /// Percent points (e.g. `16` for 16%).
    #[must_use]
    pub fn points(self) -> Decimal {
        self.0
    }

    /// The fractional rate (e.g. `0.16` for 16%).
    #[must_use]
    pub fn fraction(self) -> Percentage {
        Percentage::from(self.0 / Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// Full pricing breakdown for a cart.
///
/// Invariant: `grand_total = (subtotal - discount_amount) + tax_amount`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    /// Sum of line price × quantity before any adjustment.
    pub subtotal: Money<'static, Currency>,

    /// Discount rate applied to the subtotal.
    pub discount_percent: Percent,

    /// Discount amount taken off the subtotal.
    pub discount_amount: Money<'static, Currency>,

    /// Subtotal minus discount.
    pub after_discount: Money<'static, Currency>,

    /// Tax rate applied to the discounted amount.
    pub tax_percent: Percent,

    /// Tax amount added to the discounted amount.
    pub tax_amount: Money<'static, Currency>,

    /// Final payable amount.
    pub grand_total: Money<'static, Currency>,
}

impl Pricing {
    /// An all-zero breakdown for an empty cart.
    #[must_use]
    pub fn zero(currency: &'static Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Pricing {
            subtotal: zero,
            discount_percent: Percent::zero(),
            discount_amount: zero,
            after_discount: zero,
            tax_percent: Percent::zero(),
            tax_amount: zero,
            grand_total: zero,
        }
    }
}

/// Total for one line: unit price × quantity.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] if the product leaves the
/// representable range.
pub fn line_total(line: &CartLine) -> Result<Money<'static, Currency>, PricingError> {
    Ok(Money::from_minor(
        line_total_minor(line)?,
        line.unit_price().currency(),
    ))
}

/// Price a cart with the given discount and tax rates.
///
/// `subtotal = Σ price×qty`, `discount = subtotal × d%`,
/// `tax = (subtotal − discount) × t%`, `grand = subtotal − discount + tax`.
/// Each percentage stage rounds to minor units, midpoint away from zero.
///
/// # Errors
///
/// Returns a [`PricingError`] if any stage overflows the representable money
/// range. An empty cart prices to all zeroes.
pub fn price_cart(cart: &Cart, discount: Percent, tax: Percent) -> Result<Pricing, PricingError> {
    let currency = cart.currency();

    let mut subtotal_minor = 0_i64;

    for line in cart.iter() {
        subtotal_minor = subtotal_minor
            .checked_add(line_total_minor(line)?)
            .ok_or(PricingError::AmountOverflow)?;
    }

    let discount_minor = percent_of_minor(discount, subtotal_minor)?;
    let after_minor = subtotal_minor
        .checked_sub(discount_minor)
        .ok_or(PricingError::AmountOverflow)?;
    let tax_minor = percent_of_minor(tax, after_minor)?;
    let grand_minor = after_minor
        .checked_add(tax_minor)
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Pricing {
        subtotal: Money::from_minor(subtotal_minor, currency),
        discount_percent: discount,
        discount_amount: Money::from_minor(discount_minor, currency),
        after_discount: Money::from_minor(after_minor, currency),
        tax_percent: tax,
        tax_amount: Money::from_minor(tax_minor, currency),
        grand_total: Money::from_minor(grand_minor, currency),
    })
}

fn line_total_minor(line: &CartLine) -> Result<i64, PricingError> {
    line.unit_price()
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(PricingError::AmountOverflow)
}

/// Apply a percentage to a minor-unit amount, rounding midpoint away from zero.
fn percent_of_minor(percent: Percent, minor: i64) -> Result<i64, PricingError> {
    let applied = percent.fraction() * Decimal::from(minor);
    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(PricingError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::KES;
    use testresult::TestResult;

    use crate::cart::ManualEntry;

    use super::*;

    fn cart_with(lines: &[(i64, u32)]) -> Result<Cart, crate::cart::CartError> {
        let mut cart = Cart::new(KES);

        for (i, (minor, qty)) in lines.iter().enumerate() {
            cart.add_manual_item(ManualEntry {
                name: format!("item-{i}"),
                price: Money::from_minor(*minor, KES),
                quantity: Some(*qty),
                description: None,
            })?;
        }

        Ok(cart)
    }

    #[test]
    fn worked_scenario_discount_then_tax() -> TestResult {
        // One line at 1,000.00 × 2, 10% discount, 16% tax.
        let cart = cart_with(&[(100_000, 2)])?;

        let pricing = price_cart(
            &cart,
            Percent::from_points(Decimal::TEN),
            Percent::from_points(Decimal::from(16)),
        )?;

        assert_eq!(pricing.subtotal, Money::from_minor(200_000, KES));
        assert_eq!(pricing.discount_amount, Money::from_minor(20_000, KES));
        assert_eq!(pricing.after_discount, Money::from_minor(180_000, KES));
        assert_eq!(pricing.tax_amount, Money::from_minor(28_800, KES));
        assert_eq!(pricing.grand_total, Money::from_minor(208_800, KES));

        Ok(())
    }

    #[test]
    fn empty_cart_prices_to_zero_amounts() -> TestResult {
        let cart = Cart::new(KES);

        let pricing = price_cart(
            &cart,
            Percent::from_points(Decimal::TEN),
            Percent::from_points(Decimal::from(16)),
        )?;

        assert_eq!(pricing.subtotal, Money::from_minor(0, KES));
        assert_eq!(pricing.discount_amount, Money::from_minor(0, KES));
        assert_eq!(pricing.after_discount, Money::from_minor(0, KES));
        assert_eq!(pricing.tax_amount, Money::from_minor(0, KES));
        assert_eq!(pricing.grand_total, Money::from_minor(0, KES));

        // The breakdown still records the rates that were applied.
        assert_eq!(pricing.discount_percent.points(), Decimal::TEN);
        assert_eq!(pricing.tax_percent.points(), Decimal::from(16));

        Ok(())
    }

    #[test]
    fn grand_total_invariant_holds() -> TestResult {
        let cart = cart_with(&[(333, 3), (1_999, 1), (50, 7)])?;

        for (d, t) in [(0, 0), (5, 16), (100, 16), (50, 100), (33, 7)] {
            let pricing = price_cart(
                &cart,
                Percent::from_points(Decimal::from(d)),
                Percent::from_points(Decimal::from(t)),
            )?;

            let reassembled = pricing
                .subtotal
                .sub(pricing.discount_amount)?
                .add(pricing.tax_amount)?;

            assert_eq!(pricing.grand_total, reassembled, "d={d} t={t}");
            assert!(
                pricing.discount_amount.to_minor_units() >= 0,
                "discount non-negative"
            );
            assert!(pricing.tax_amount.to_minor_units() >= 0, "tax non-negative");
        }

        Ok(())
    }

    #[test]
    fn percentage_stages_round_midpoint_away_from_zero() -> TestResult {
        // 15% of 150 minor units is 22.5, which rounds to 23.
        let cart = cart_with(&[(150, 1)])?;

        let pricing = price_cart(&cart, Percent::from_points(Decimal::from(15)), Percent::zero())?;

        assert_eq!(pricing.discount_amount, Money::from_minor(23, KES));

        Ok(())
    }

    #[test]
    fn full_discount_zeroes_the_total() -> TestResult {
        let cart = cart_with(&[(100_000, 2)])?;

        let pricing = price_cart(
            &cart,
            Percent::from_points(Decimal::ONE_HUNDRED),
            Percent::from_points(Decimal::from(16)),
        )?;

        assert_eq!(pricing.after_discount, Money::from_minor(0, KES));
        assert_eq!(pricing.grand_total, Money::from_minor(0, KES));

        Ok(())
    }

    #[test]
    fn parse_field_defaults_blank_and_junk_to_zero() {
        assert_eq!(Percent::parse_field(""), Percent::zero());
        assert_eq!(Percent::parse_field("   "), Percent::zero());
        assert_eq!(Percent::parse_field("ten"), Percent::zero());
    }

    #[test]
    fn parse_field_reads_decimal_points() {
        assert_eq!(Percent::parse_field("12.5").points(), Decimal::new(125, 1));
        assert_eq!(Percent::parse_field(" 16 ").points(), Decimal::from(16));
    }

    #[test]
    fn parse_field_clamps_out_of_range_values() {
        assert_eq!(Percent::parse_field("-5").points(), Decimal::ZERO);
        assert_eq!(Percent::parse_field("250").points(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn percent_displays_as_points() {
        assert_eq!(Percent::from_points(Decimal::new(1_650, 2)).to_string(), "16.5%");
        assert_eq!(Percent::zero().to_string(), "0%");
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() -> TestResult {
        let cart = cart_with(&[(2_500, 4)])?;
        let line = cart.lines().first().ok_or("missing line")?;

        assert_eq!(line_total(line)?, Money::from_minor(10_000, KES));

        Ok(())
    }
}
