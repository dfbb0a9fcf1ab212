//! Multi-tier same-SKU rule
//!
//! Per-position discount rates over a group of units of one SKU: the k-th
//! unit in the group pays `unit price x rates[k]`, with the last rate
//! repeating for positions beyond the list (e.g. full price, then 85%, then
//! 70% for every further unit). Units of one SKU are price-identical, so the
//! candidate price depends only on the group size.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::Money;
use smallvec::SmallVec;

use crate::{
    pricing::{PricingError, percent_of_minor},
    rules::{RuleConfigError, RuleKey, candidates::Candidate},
    units::Unit,
};

/// A tiered per-SKU discount rule.
#[derive(Debug, Clone)]
pub struct MultiTierRule {
    key: RuleKey,
    name: String,
    sku: String,
    rates: Vec<Percentage>,
}

impl MultiTierRule {
    /// Create a new multi-tier rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the rate list is empty or contains a
    /// negative rate.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        sku: impl Into<String>,
        rates: &[Percentage],
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        if rates.is_empty() {
            return Err(RuleConfigError::EmptyRates { rule: name });
        }

        for rate in rates {
            let value = (*rate) * Decimal::ONE;

            if value < Decimal::ZERO {
                return Err(RuleConfigError::NegativeRate {
                    rule: name,
                    rate: value,
                });
            }
        }

        Ok(Self {
            key,
            name,
            sku: sku.into(),
            rates: rates.to_vec(),
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

    /// Return the configured rates.
    pub fn rates(&self) -> &[Percentage] {
        &self.rates
    }

    /// Rate charged at the given group position; the last rate repeats.
    fn rate_for(&self, position: usize) -> Percentage {
        self.rates
            .get(position)
            .or_else(|| self.rates.last())
            .copied()
            .unwrap_or_else(|| Percentage::from(1.0))
    }

    /// Propose candidates for group sizes 1..=N over the target SKU.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a rate calculation overflows.
    pub fn find_applications<'a>(
        &self,
        available_units: &[Unit<'a>],
    ) -> Result<Vec<Candidate<'a>>, PricingError> {
        let eligible: Vec<&Unit<'a>> = available_units
            .iter()
            .filter(|unit| unit.sku() == self.sku)
            .collect();

        let mut candidates = Vec::with_capacity(eligible.len());
        let mut consumed: SmallVec<[usize; 4]> = SmallVec::new();
        let mut total_minor = 0_i64;

        for (position, unit) in eligible.iter().enumerate() {
            let rate = self.rate_for(position);
            let pay = percent_of_minor(&rate, unit.price().to_minor_units())?;

            total_minor = total_minor
                .checked_add(pay)
                .ok_or(PricingError::PercentConversion)?;

            consumed.push(unit.index());

            let price = Money::from_minor(total_minor, unit.price().currency());
            let trace = format!(
                "multi-tier '{}': {} x{} for {}",
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

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        catalog::{Catalog, Product},
        units::{Membership, expand},
    };

    use super::*;

    fn catalog() -> Catalog<'static> {
        let mut catalog = Catalog::new(USD);

        if let Err(err) = catalog.insert(Product::new("A", "Apples", Money::from_minor(3000, USD)))
        {
            panic!("failed to build test catalog: {err}");
        }

        catalog
    }

    #[test]
    fn new_rejects_empty_rates() {
        let result = MultiTierRule::new(RuleKey::default(), "empty", "A", &[]);

        assert!(matches!(
            result,
            Err(RuleConfigError::EmptyRates { rule }) if rule == "empty"
        ));
    }

    #[test]
    fn new_rejects_negative_rates() {
        let rates = [Percentage::from(1.0), Percentage::from(-0.5)];
        let result = MultiTierRule::new(RuleKey::default(), "negative", "A", &rates);

        assert!(matches!(result, Err(RuleConfigError::NegativeRate { .. })));
    }

    #[test]
    fn proposes_group_sizes_up_to_availability() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 3);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rates = [
            Percentage::from(1.0),
            Percentage::from(0.85),
            Percentage::from(0.7),
        ];
        let rule = MultiTierRule::new(RuleKey::default(), "stock up", "A", &rates)?;

        let candidates = rule.find_applications(&units)?;

        assert_eq!(candidates.len(), 3);

        // Group prices: 30.00, 30.00 + 25.50, 30.00 + 25.50 + 21.00.
        let prices: Vec<i64> = candidates
            .iter()
            .map(|c| c.price.to_minor_units())
            .collect();

        assert_eq!(prices, vec![3000, 5550, 7650]);

        Ok(())
    }

    #[test]
    fn last_rate_repeats_beyond_the_list() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 4);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rates = [Percentage::from(1.0), Percentage::from(0.5)];
        let rule = MultiTierRule::new(RuleKey::default(), "half after first", "A", &rates)?;

        let candidates = rule.find_applications(&units)?;
        let largest = candidates.last().ok_or("missing candidate")?;

        // 30.00 + 15.00 + 15.00 + 15.00 = 75.00
        assert_eq!(largest.price.to_minor_units(), 7500);
        assert_eq!(largest.consumed.len(), 4);

        Ok(())
    }

    #[test]
    fn other_skus_propose_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 2);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = MultiTierRule::new(
            RuleKey::default(),
            "other",
            "B",
            &[Percentage::from(0.5)],
        )?;

        assert!(rule.find_applications(&units)?.is_empty());

        Ok(())
    }
}
