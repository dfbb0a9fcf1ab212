//! Direct discount rule
//!
//! A per-unit special price on one SKU, either a fixed amount per unit or a
//! rate of the original price, optionally capped at a per-customer limit.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    pricing::{PricingError, percent_of_minor},
    rules::{RuleConfigError, RuleKey, candidates::Candidate},
    units::Unit,
};

/// How a direct discount prices each unit.
#[derive(Debug, Copy, Clone)]
pub enum DirectPricing<'a> {
    /// Each unit costs this fixed amount (e.g. "5.00 each")
    FixedPrice(Money<'a, Currency>),

    /// Each unit pays this rate of its original price (e.g. 0.9 for "10% off")
    RateOfOriginal(Percentage),
}

/// A direct per-unit discount on one SKU.
#[derive(Debug, Clone)]
pub struct DirectRule<'a> {
    key: RuleKey,
    name: String,
    sku: String,
    pricing: DirectPricing<'a>,
    limit: Option<u32>,
}

impl<'a> DirectRule<'a> {
    /// Create a new direct discount rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the fixed price or rate is negative.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        sku: impl Into<String>,
        pricing: DirectPricing<'a>,
        limit: Option<u32>,
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        match &pricing {
            DirectPricing::FixedPrice(price) if price.to_minor_units() < 0 => {
                return Err(RuleConfigError::NegativeFixedPrice {
                    rule: name,
                    minor_units: price.to_minor_units(),
                });
            }
            DirectPricing::RateOfOriginal(rate) if (*rate) * Decimal::ONE < Decimal::ZERO => {
                return Err(RuleConfigError::NegativeRate {
                    rule: name,
                    rate: (*rate) * Decimal::ONE,
                });
            }
            _ => {}
        }

        Ok(Self {
            key,
            name,
            sku: sku.into(),
            pricing,
            limit,
        })
    }

    /// Return the rule key.
    pub fn key(&self) -> RuleKey {
        self.key
    }

    /// Return the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the target SKU.
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Return the per-customer application limit.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Discounted minor-unit price for one unit.
    fn unit_pay(&self, unit: &Unit<'a>) -> Result<i64, PricingError> {
        match &self.pricing {
            DirectPricing::FixedPrice(price) => Ok(price.to_minor_units()),
            DirectPricing::RateOfOriginal(rate) => {
                percent_of_minor(rate, unit.price().to_minor_units())
            }
        }
    }

    /// Propose candidates for group sizes 1..=min(limit, available).
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a rate calculation overflows.
    pub fn find_applications(
        &self,
        available_units: &[Unit<'a>],
    ) -> Result<Vec<Candidate<'a>>, PricingError> {
        let eligible: Vec<&Unit<'a>> = available_units
            .iter()
            .filter(|unit| unit.sku() == self.sku)
            .collect();

        let cap = match self.limit {
            Some(limit) => usize::try_from(limit)
                .unwrap_or(usize::MAX)
                .min(eligible.len()),
            None => eligible.len(),
        };

        let mut candidates = Vec::with_capacity(cap);
        let mut consumed: SmallVec<[usize; 4]> = SmallVec::new();
        let mut total_minor = 0_i64;

        for (position, unit) in eligible.iter().take(cap).enumerate() {
            let pay = self.unit_pay(unit)?;

            total_minor = total_minor
                .checked_add(pay)
                .ok_or(PricingError::PercentConversion)?;

            consumed.push(unit.index());

            let price = Money::from_minor(total_minor, unit.price().currency());
            let trace = format!(
                "direct '{}': {} x{} for {}",
                self.name,
                self.sku,
                position + 1,
                price
            );

            candidates.push(Candidate::new(self.key, consumed.clone(), price, trace));
        }

        Ok(candidates)
    }
}
