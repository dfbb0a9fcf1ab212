//! Bundle rule
//!
//! A fixed price for one unit of each SKU in a required list (e.g. "A + B
//! for 40"). One candidate is one instantiation of the bundle; the allocator
//! applies it repeatedly for multiple disjoint copies, bounded by how many
//! units are actually available.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    pricing::PricingError,
    rules::{RuleConfigError, RuleKey, candidates::Candidate},
    units::Unit,
};

/// A combo / bundle pricing rule.
#[derive(Debug, Clone)]
pub struct BundleRule<'a> {
    key: RuleKey,
    name: String,
    required_skus: Vec<String>,
    bundle_price: Money<'a, Currency>,
}

impl<'a> BundleRule<'a> {
    /// Create a new bundle rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the required-SKU list is empty or the
    /// bundle price is not positive.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        required_skus: &[&str],
        bundle_price: Money<'a, Currency>,
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        if required_skus.is_empty() {
            return Err(RuleConfigError::EmptyRequiredSkus { rule: name });
        }

        if bundle_price.to_minor_units() <= 0 {
            return Err(RuleConfigError::NonPositivePrice {
                rule: name,
                minor_units: bundle_price.to_minor_units(),
            });
        }

        Ok(Self {
            key,
            name,
            required_skus: required_skus.iter().map(|&s| s.to_owned()).collect(),
            bundle_price,
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

    /// Return the required SKUs.
    pub fn required_skus(&self) -> &[String] {
        &self.required_skus
    }

    /// Return the bundle price.
    pub fn bundle_price(&self) -> &Money<'a, Currency> {
        &self.bundle_price
    }

    /// Propose one instantiation of the bundle against the given units.
    ///
    /// Picks the first available unit for each required SKU (duplicate SKUs
    /// in the required list claim distinct units). Units of one SKU are
    /// price-identical, so which specific indices are picked does not affect
    /// the price.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other variants.
    pub fn find_applications(
        &self,
        available_units: &[Unit<'a>],
    ) -> Result<Vec<Candidate<'a>>, PricingError> {
        let mut consumed: SmallVec<[usize; 4]> = SmallVec::new();
        let mut used: FxHashSet<usize> = FxHashSet::default();

        for sku in &self.required_skus {
            let Some(unit) = available_units
                .iter()
                .find(|unit| unit.sku() == sku.as_str() && !used.contains(&unit.index()))
            else {
                return Ok(Vec::new());
            };

            used.insert(unit.index());
            consumed.push(unit.index());
        }

        let trace = format!(
            "bundle '{}': {} for {}",
            self.name,
            self.required_skus.join(" + "),
            self.bundle_price
        );

        Ok(vec![Candidate::new(
            self.key,
            consumed,
            self.bundle_price,
            trace,
        )])
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

        for product in [
            Product::new("A", "Apples", Money::from_minor(3000, USD)),
            Product::new("B", "Bread", Money::from_minor(2500, USD)),
        ] {
            if let Err(err) = catalog.insert(product) {
                panic!("failed to build test catalog: {err}");
            }
        }

        catalog
    }

    #[test]
    fn new_rejects_empty_required_skus() {
        let result = BundleRule::new(
            RuleKey::default(),
            "empty",
            &[],
            Money::from_minor(4000, USD),
        );

        assert!(matches!(
            result,
            Err(RuleConfigError::EmptyRequiredSkus { rule }) if rule == "empty"
        ));
    }

    #[test]
    fn new_rejects_non_positive_price() {
        let result = BundleRule::new(
            RuleKey::default(),
            "free lunch",
            &["A", "B"],
            Money::from_minor(0, USD),
        );

        assert!(matches!(
            result,
            Err(RuleConfigError::NonPositivePrice { minor_units: 0, .. })
        ));
    }

    #[test]
    fn proposes_one_instantiation_when_all_skus_available() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 2).add("B", 1);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = BundleRule::new(
            RuleKey::default(),
            "lunch deal",
            &["A", "B"],
            Money::from_minor(4000, USD),
        )?;

        let candidates = rule.find_applications(&units)?;

        assert_eq!(candidates.len(), 1);

        let candidate = candidates.first().ok_or("missing candidate")?;

        assert_eq!(candidate.consumed.len(), 2);
        assert_eq!(candidate.price.to_minor_units(), 4000);
        assert!(candidate.trace.contains("lunch deal"));

        Ok(())
    }

    #[test]
    fn proposes_nothing_when_a_required_sku_is_missing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 3);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = BundleRule::new(
            RuleKey::default(),
            "lunch deal",
            &["A", "B"],
            Money::from_minor(4000, USD),
        )?;

        assert!(rule.find_applications(&units)?.is_empty());

        Ok(())
    }

    #[test]
    fn duplicate_required_skus_claim_distinct_units() -> TestResult {
        let catalog = catalog();

        let rule = BundleRule::new(
            RuleKey::default(),
            "double apples",
            &["A", "A"],
            Money::from_minor(5000, USD),
        )?;

        let mut one = Cart::new();
        one.add("A", 1);
        let single = expand(&one, &catalog, Membership::Standard)?;

        assert!(rule.find_applications(&single)?.is_empty());

        let mut two = Cart::new();
        two.add("A", 2);
        let pair = expand(&two, &catalog, Membership::Standard)?;

        let candidates = rule.find_applications(&pair)?;
        let candidate = candidates.first().ok_or("missing candidate")?;

        assert_eq!(candidate.consumed.as_slice(), &[0, 1]);

        Ok(())
    }
}
