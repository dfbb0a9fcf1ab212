//! Rule Fixtures

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
    rules::{
        Rule, RuleKey,
        bogo::BogoRule,
        bundle::BundleRule,
        clearance::ClearanceRule,
        direct::{DirectPricing, DirectRule},
        multi_tier::MultiTierRule,
        threshold::{ThresholdRule, ThresholdTier},
    },
};

/// Wrapper for rules in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Map of rule name -> rule fixture
    pub rules: FxHashMap<String, RuleFixture>,

    /// Optional order-level threshold rule
    #[serde(default)]
    pub threshold: Option<ThresholdFixture>,
}

/// One unit-consuming rule in YAML, tagged by type
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleFixture {
    /// Bundle rule (e.g. "A + B for 40.00 USD")
    Bundle {
        /// Required SKUs, one unit each
        skus: Vec<String>,
        /// Bundle price (e.g. "40.00 USD")
        price: String,
    },

    /// Buy-one-get-one rule over a SKU set
    Bogo {
        /// Eligible SKUs
        skus: Vec<String>,
    },

    /// Multi-tier same-SKU rule
    MultiTier {
        /// Target SKU
        sku: String,
        /// Per-position rates (e.g. ["100%", "85%", "70%"])
        rates: Vec<String>,
    },

    /// Direct per-unit discount
    Direct {
        /// Target SKU
        sku: String,
        /// Fixed per-unit price (e.g. "5.00 USD"); exclusive with `rate`
        #[serde(default)]
        price: Option<String>,
        /// Rate of the original price (e.g. "90%"); exclusive with `price`
        #[serde(default)]
        rate: Option<String>,
        /// Per-customer limit
        #[serde(default)]
        limit: Option<u32>,
    },

    /// Clearance rule
    Clearance {
        /// Target SKU
        sku: String,
        /// Clearance price per unit (e.g. "20.00 USD")
        price: String,
    },
}

impl RuleFixture {
    /// Build the configured rule.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a price or rate cannot be parsed, if the
    /// fixture data is incomplete, or if the rule rejects its configuration.
    pub fn try_into_rule(self, key: RuleKey, name: &str) -> Result<Rule<'static>, FixtureError> {
        match self {
            RuleFixture::Bundle { skus, price } => {
                let (minor, currency) = parse_price(&price)?;
                let refs: Vec<&str> = skus.iter().map(String::as_str).collect();

                Ok(Rule::Bundle(BundleRule::new(
                    key,
                    name,
                    &refs,
                    Money::from_minor(minor, currency),
                )?))
            }
            RuleFixture::Bogo { skus } => {
                let refs: Vec<&str> = skus.iter().map(String::as_str).collect();

                Ok(Rule::Bogo(BogoRule::new(key, name, &refs)?))
            }
            RuleFixture::MultiTier { sku, rates } => {
                let rates: Vec<Percentage> = rates
                    .iter()
                    .map(|rate| parse_percentage(rate))
                    .collect::<Result<_, _>>()?;

                Ok(Rule::MultiTier(MultiTierRule::new(key, name, sku, &rates)?))
            }
            RuleFixture::Direct {
                sku,
                price,
                rate,
                limit,
            } => {
                let pricing = match (price, rate) {
                    (Some(price), None) => {
                        let (minor, currency) = parse_price(&price)?;

                        DirectPricing::FixedPrice(Money::from_minor(minor, currency))
                    }
                    (None, Some(rate)) => DirectPricing::RateOfOriginal(parse_percentage(&rate)?),
                    _ => {
                        return Err(FixtureError::InvalidRuleData(format!(
                            "direct rule '{name}' needs exactly one of `price` or `rate`"
                        )));
                    }
                };

                Ok(Rule::Direct(DirectRule::new(key, name, sku, pricing, limit)?))
            }
            RuleFixture::Clearance { sku, price } => {
                let (minor, currency) = parse_price(&price)?;

                Ok(Rule::Clearance(ClearanceRule::new(
                    key,
                    name,
                    sku,
                    Money::from_minor(minor, currency),
                )?))
            }
        }
    }
}

/// Threshold rule in YAML
#[derive(Debug, Deserialize)]
pub struct ThresholdFixture {
    /// Rule name
    pub name: String,

    /// Spend-and-save tiers
    pub tiers: Vec<ThresholdTierFixture>,
}

/// One threshold tier in YAML
#[derive(Debug, Deserialize)]
pub struct ThresholdTierFixture {
    /// Spend threshold (e.g. "100.00 USD")
    pub threshold: String,

    /// Discount granted (e.g. "10.00 USD")
    pub discount: String,
}

impl ThresholdFixture {
    /// Build the configured threshold rule.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a tier amount cannot be parsed or the
    /// rule rejects its configuration.
    pub fn try_into_rule(self, key: RuleKey) -> Result<ThresholdRule<'static>, FixtureError> {
        let mut tiers = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            let (threshold_minor, threshold_currency) = parse_price(&tier.threshold)?;
            let (discount_minor, discount_currency) = parse_price(&tier.discount)?;

            tiers.push(ThresholdTier::new(
                Money::from_minor(threshold_minor, threshold_currency),
                Money::from_minor(discount_minor, discount_currency),
            ));
        }

        Ok(ThresholdRule::new(key, self.name, tiers)?)
    }
}
