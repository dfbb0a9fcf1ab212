//! Pricing rules

use rust_decimal::Decimal;
use slotmap::new_key_type;
use thiserror::Error;

use crate::{
    pricing::PricingError,
    rules::{
        bogo::BogoRule, bundle::BundleRule, candidates::Candidate, clearance::ClearanceRule,
        direct::DirectRule, multi_tier::MultiTierRule,
    },
    units::Unit,
};

pub mod bogo;
pub mod bundle;
pub mod candidates;
pub mod clearance;
pub mod direct;
pub mod multi_tier;
pub mod threshold;

new_key_type! {
    /// Rule Key
    pub struct RuleKey;
}

/// Errors raised when a rule is constructed with a malformed configuration.
///
/// Every variant names the offending rule; configuration is validated eagerly
/// so that a rule can never fail during search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleConfigError {
    /// A bundle was configured with no required SKUs.
    #[error("rule '{rule}': required SKU list is empty")]
    EmptyRequiredSkus {
        /// Name of the offending rule
        rule: String,
    },

    /// A BOGO rule was configured with no eligible SKUs.
    #[error("rule '{rule}': eligible SKU set is empty")]
    EmptyEligibleSkus {
        /// Name of the offending rule
        rule: String,
    },

    /// A bundle or clearance price must be positive.
    #[error("rule '{rule}': price must be positive, got {minor_units} minor units")]
    NonPositivePrice {
        /// Name of the offending rule
        rule: String,
        /// The rejected price in minor units
        minor_units: i64,
    },

    /// A multi-tier rule was configured with no rates.
    #[error("rule '{rule}': discount rate list is empty")]
    EmptyRates {
        /// Name of the offending rule
        rule: String,
    },

    /// A discount rate must not be negative.
    #[error("rule '{rule}': rate {rate} is negative")]
    NegativeRate {
        /// Name of the offending rule
        rule: String,
        /// The rejected rate
        rate: Decimal,
    },

    /// A direct discount's fixed price must not be negative.
    #[error("rule '{rule}': fixed price must not be negative, got {minor_units} minor units")]
    NegativeFixedPrice {
        /// Name of the offending rule
        rule: String,
        /// The rejected price in minor units
        minor_units: i64,
    },

    /// A threshold rule was configured with no tiers.
    #[error("rule '{rule}': threshold tier list is empty")]
    EmptyTiers {
        /// Name of the offending rule
        rule: String,
    },

    /// A threshold tier carried a negative threshold or discount.
    #[error("rule '{rule}': tier amounts must not be negative")]
    NegativeTierAmount {
        /// Name of the offending rule
        rule: String,
    },
}

/// The unit-consuming rule variants.
///
/// A closed enum dispatched through [`Rule::find_applications`] keeps the
/// allocator rule-agnostic. The order-level
/// [`ThresholdRule`](threshold::ThresholdRule) lives outside this enum
/// because it consumes no units and is evaluated once, after allocation.
#[derive(Debug, Clone)]
pub enum Rule<'a> {
    /// Fixed price for one unit of each SKU in a required list
    Bundle(BundleRule<'a>),

    /// Buy-one-get-one pairing over an eligible SKU set
    Bogo(BogoRule),

    /// Per-position tiered rates over units of one SKU
    MultiTier(MultiTierRule),

    /// Fixed or rated per-unit price on one SKU
    Direct(DirectRule<'a>),

    /// Clearance price on one SKU, exclusive for clearance-flagged units
    Clearance(ClearanceRule<'a>),
}

impl<'a> Rule<'a> {
    /// Return the rule key.
    pub fn key(&self) -> RuleKey {
        match self {
            Rule::Bundle(rule) => rule.key(),
            Rule::Bogo(rule) => rule.key(),
            Rule::MultiTier(rule) => rule.key(),
            Rule::Direct(rule) => rule.key(),
            Rule::Clearance(rule) => rule.key(),
        }
    }

    /// Return the rule name.
    pub fn name(&self) -> &str {
        match self {
            Rule::Bundle(rule) => rule.name(),
            Rule::Bogo(rule) => rule.name(),
            Rule::MultiTier(rule) => rule.name(),
            Rule::Direct(rule) => rule.name(),
            Rule::Clearance(rule) => rule.name(),
        }
    }

    /// The SKU this rule clears, if it is a clearance rule.
    pub fn clearance_sku(&self) -> Option<&str> {
        match self {
            Rule::Clearance(rule) => Some(rule.sku()),
            _ => None,
        }
    }

    /// Whether the allocator may choose several of this rule's candidates.
    ///
    /// Bundles fire once per disjoint copy and BOGO matchings are built from
    /// several disjoint pairs. The remaining variants propose whole groups,
    /// so exactly zero or one of their candidates may be chosen per
    /// allocation; a per-customer limit would otherwise be defeated by
    /// re-applying a small candidate.
    pub fn is_repeatable(&self) -> bool {
        match self {
            Rule::Bundle(_) | Rule::Bogo(_) => true,
            Rule::MultiTier(_) | Rule::Direct(_) | Rule::Clearance(_) => false,
        }
    }

    /// Enumerate candidate applications against a read-only unit snapshot.
    ///
    /// The snapshot is never mutated; consumption bookkeeping belongs to the
    /// allocator. No eligible units simply yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a rate calculation overflows.
    pub fn find_applications(
        &self,
        available_units: &[Unit<'a>],
    ) -> Result<Vec<Candidate<'a>>, PricingError> {
        match self {
            Rule::Bundle(rule) => rule.find_applications(available_units),
            Rule::Bogo(rule) => rule.find_applications(available_units),
            Rule::MultiTier(rule) => rule.find_applications(available_units),
            Rule::Direct(rule) => rule.find_applications(available_units),
            Rule::Clearance(rule) => rule.find_applications(available_units),
        }
    }
}
