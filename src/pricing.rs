//! Pricing utilities
//!
//! Shared money math for the rule variants and the result assembler. All
//! arithmetic happens in currency minor units, so every intermediate amount
//! is already rounded to the currency's two decimal places.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::units::Unit;

/// Errors specific to pricing calculations.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate a percentage of a minor-unit amount, rounded half away from zero.
///
/// Rule variants use this both for "pay this rate of the original" tier math
/// and for plain percentage discounts.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows
/// or cannot be safely represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Calculate the total unit price of a list of units.
///
/// This is the pre-promotion cart subtotal: every unit at the price it
/// resolved to during expansion.
///
/// # Errors
///
/// Returns a [`PricingError`] if money arithmetic fails (for example, due to
/// a currency mismatch between units).
pub fn unit_total<'a>(
    units: &[Unit<'a>],
    currency: &'static Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = units
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, unit| {
            acc.add(*unit.price())
        })?;

    Ok(total)
}
