//! Order-level threshold rule
//!
//! Spend-and-save tiers evaluated once against the post-allocation subtotal
//! (e.g. spend 100 save 10, spend 200 save 25). Tiers never stack: the single
//! best tier whose threshold is met wins. The rule consumes no units.

use rusty_money::{Money, iso::Currency};

use crate::rules::{RuleConfigError, RuleKey};

/// A single spend-and-save tier.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTier<'a> {
    threshold: Money<'a, Currency>,
    discount: Money<'a, Currency>,
}

impl<'a> ThresholdTier<'a> {
    /// Create a new tier.
    pub fn new(threshold: Money<'a, Currency>, discount: Money<'a, Currency>) -> Self {
        Self {
            threshold,
            discount,
        }
    }

    /// Return the spend threshold.
    pub fn threshold(&self) -> &Money<'a, Currency> {
        &self.threshold
    }

    /// Return the discount granted when the threshold is met.
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }
}

/// An order-level tiered reduction rule.
#[derive(Debug, Clone)]
pub struct ThresholdRule<'a> {
    key: RuleKey,
    name: String,
    tiers: Vec<ThresholdTier<'a>>,
}

impl<'a> ThresholdRule<'a> {
    /// Create a new threshold rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleConfigError`] if the tier list is empty or a tier
    /// carries a negative threshold or discount.
    pub fn new(
        key: RuleKey,
        name: impl Into<String>,
        tiers: Vec<ThresholdTier<'a>>,
    ) -> Result<Self, RuleConfigError> {
        let name = name.into();

        if tiers.is_empty() {
            return Err(RuleConfigError::EmptyTiers { rule: name });
        }

        if tiers
            .iter()
            .any(|t| t.threshold.to_minor_units() < 0 || t.discount.to_minor_units() < 0)
        {
            return Err(RuleConfigError::NegativeTierAmount { rule: name });
        }

        Ok(Self { key, name, tiers })
    }

    /// Return the rule key.
    pub fn key(&self) -> RuleKey {
        self.key
    }

    /// Return the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the tiers.
    pub fn tiers(&self) -> &[ThresholdTier<'a>] {
        &self.tiers
    }

    /// Compute the order-level discount for a subtotal.
    ///
    /// Picks the highest discount among tiers whose threshold is met. Tiers
    /// never stack. Returns a zero discount and a "no tier met" description
    /// when the subtotal reaches no tier.
    pub fn compute_discount(&self, subtotal: Money<'a, Currency>) -> (Money<'a, Currency>, String) {
        let best = self
            .tiers
            .iter()
            .filter(|tier| subtotal.to_minor_units() >= tier.threshold.to_minor_units())
            .max_by_key(|tier| tier.discount.to_minor_units());

        match best {
            Some(tier) => (
                tier.discount,
                format!(
                    "threshold '{}': spend {} reached, -{}",
                    self.name, tier.threshold, tier.discount
                ),
            ),
            None => (
                Money::from_minor(0, subtotal.currency()),
                String::from("no tier met"),
            ),
        }
    }
}
