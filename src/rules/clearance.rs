//! Clearance rule
//!
//! A fixed clearance price per unit of one SKU. Units of a clearance-flagged
//! product are exclusive to their own clearance rule: the allocator never
//! lets any other rule consume them, they either go through this rule or pay
//! plain unit price.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    pricing::PricingError,
    rules::{RuleConfigError, RuleKey, candidates::Candidate},
    units::Unit,
};

/// A clearance pricing rule for one SKU.
#[derive(Debug, Clone)]
pub struct ClearanceRule<'a> {
    key: RuleKey,
    name: String,
    sku: String,
    clearance_price: Money<'a, Currency>,
}

impl<'a> ClearanceRule<'a> {
    /// Create a new clearance rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the clearance price is not positive.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        sku: impl Into<String>,
        clearance_price: Money<'a, Currency>,
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        if clearance_price.to_minor_units() <= 0 {
            return Err(RuleConfigError::NonPositivePrice {
                rule: name,
                minor_units: clearance_price.to_minor_units(),
            });
        }

        Ok(Self {
            key,
            name,
            sku: sku.into(),
            clearance_price,
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

    /// Return the clearance price per unit.
    pub fn clearance_price(&self) -> &Money<'a, Currency> {
        &self.clearance_price
    }

    /// Propose candidates for group sizes 1..=N at the clearance price.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the group amount overflows.
    pub fn find_applications(
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
            total_minor = total_minor
                .checked_add(self.clearance_price.to_minor_units())
                .ok_or(PricingError::PercentConversion)?;

            consumed.push(unit.index());

            let price = Money::from_minor(total_minor, unit.price().currency());
            let trace = format!(
                "clearance '{}': {} x{} for {}",
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

        let mut x = Product::new("X", "Kettle", Money::from_minor(5000, USD));
        x.clearance = true;

        if let Err(err) = catalog.insert(x) {
            panic!("failed to build test catalog: {err}");
        }

        catalog
    }

    #[test]
    fn new_rejects_non_positive_price() {
        let result = ClearanceRule::new(
            RuleKey::default(),
            "free kettle",
            "X",
            Money::from_minor(0, USD),
        );

        assert!(matches!(
            result,
            Err(RuleConfigError::NonPositivePrice { minor_units: 0, .. })
        ));
    }

    #[test]
    fn proposes_group_sizes_at_clearance_price() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("X", 3);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = ClearanceRule::new(
            RuleKey::default(),
            "kettle clearout",
            "X",
            Money::from_minor(2000, USD),
        )?;

        let candidates = rule.find_applications(&units)?;
        let prices: Vec<i64> = candidates
            .iter()
            .map(|c| c.price.to_minor_units())
            .collect();

        assert_eq!(prices, vec![2000, 4000, 6000]);

        Ok(())
    }

    #[test]
    fn no_eligible_units_proposes_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("X", 1);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = ClearanceRule::new(
            RuleKey::default(),
            "other clearout",
            "Y",
            Money::from_minor(2000, USD),
        )?;

        assert!(rule.find_applications(&units)?.is_empty());

        Ok(())
    }
}
