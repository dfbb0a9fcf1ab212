//! Buy-one-get-one rule
//!
//! Pairs two eligible units; the higher-priced unit is charged and the lower
//! rides free. Every pairing of two distinct eligible units is a legal
//! candidate, and the allocator picks a disjoint matching among them.

use rustc_hash::FxHashSet;
use smallvec::smallvec;

use crate::{
    pricing::PricingError,
    rules::{RuleConfigError, RuleKey, candidates::Candidate},
    units::Unit,
};

/// A buy-one-get-one-free pairing rule over a set of eligible SKUs.
#[derive(Debug, Clone)]
pub struct BogoRule {
    key: RuleKey,
    name: String,
    eligible_skus: FxHashSet<String>,
}

impl BogoRule {
    /// Create a new BOGO rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the eligible SKU set is empty.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        eligible_skus: &[&str],
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        if eligible_skus.is_empty() {
            return Err(RuleConfigError::EmptyEligibleSkus { rule: name });
        }

        Ok(Self {
            key,
            name,
            eligible_skus: eligible_skus.iter().map(|&s| s.to_owned()).collect(),
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

    /// Whether the given SKU participates in this rule.
    pub fn is_eligible(&self, sku: &str) -> bool {
        self.eligible_skus.contains(sku)
    }

    /// Propose every pairing of two distinct eligible units.
    ///
    /// The pair price is the higher unit price; for equal prices either unit
    /// may be treated as the charged one, the price is identical.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other variants.
    pub fn find_applications<'a>(
        &self,
        available_units: &[Unit<'a>],
    ) -> Result<Vec<Candidate<'a>>, PricingError> {
        let eligible: Vec<&Unit<'a>> = available_units
            .iter()
            .filter(|unit| self.is_eligible(unit.sku()))
            .collect();

        let mut candidates = Vec::new();

        for (i, first) in eligible.iter().enumerate() {
            for second in eligible.iter().skip(i + 1) {
                let (high, low) =
                    if second.price().to_minor_units() > first.price().to_minor_units() {
                        (second, first)
                    } else {
                        (first, second)
                    };

                let trace = format!(
                    "bogo '{}': {} pays {}, {} free",
                    self.name,
                    high.sku(),
                    high.price(),
                    low.sku()
                );

                candidates.push(Candidate::new(
                    self.key,
                    smallvec![high.index(), low.index()],
                    *high.price(),
                    trace,
                ));
            }
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
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
            Product::new("E", "Eggs", Money::from_minor(5500, USD)),
            Product::new("C", "Coffee", Money::from_minor(10000, USD)),
        ] {
            if let Err(err) = catalog.insert(product) {
                panic!("failed to build test catalog: {err}");
            }
        }

        catalog
    }

    #[test]
    fn new_rejects_empty_eligible_set() {
        let result = BogoRule::new(RuleKey::default(), "empty", &[]);

        assert!(matches!(
            result,
            Err(RuleConfigError::EmptyEligibleSkus { rule }) if rule == "empty"
        ));
    }

    #[test]
    fn proposes_all_pairings_of_eligible_units() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 2).add("E", 1).add("C", 1);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = BogoRule::new(RuleKey::default(), "fruit pair", &["A", "E"])?;
        let candidates = rule.find_applications(&units)?;

        // 3 eligible units (A, A, E) give C(3,2) = 3 pairings; C is not eligible.
        assert_eq!(candidates.len(), 3);

        Ok(())
    }

    #[test]
    fn pair_price_is_the_higher_unit_price() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 1).add("E", 1);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = BogoRule::new(RuleKey::default(), "fruit pair", &["A", "E"])?;
        let candidates = rule.find_applications(&units)?;

        let candidate = candidates.first().ok_or("missing candidate")?;

        // E at 55.00 is charged, A at 30.00 rides free.
        assert_eq!(candidate.price.to_minor_units(), 5500);
        assert!(candidate.trace.contains("E pays"));
        assert!(candidate.trace.contains("A free"));

        Ok(())
    }

    #[test]
    fn fewer_than_two_eligible_units_proposes_nothing() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add("A", 1).add("C", 5);

        let units = expand(&cart, &catalog, Membership::Standard)?;

        let rule = BogoRule::new(RuleKey::default(), "fruit pair", &["A", "E"])?;

        assert!(rule.find_applications(&units)?.is_empty());

        Ok(())
    }
}
