//! Fixtures
//!
//! YAML-driven fixture sets for demos and tests: a product catalog, a cart
//! and a rule set with the same name, loaded from
//! `fixtures/{products,carts,rules}/<name>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::Money;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::{Catalog, CatalogError, Product},
    fixtures::{carts::CartFixture, products::ProductsFixture, rules::RulesFixture},
    rules::{Rule, RuleConfigError, RuleKey, threshold::ThresholdRule},
};

pub mod carts;
pub mod products;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Incomplete or contradictory rule data
    #[error("Invalid rule data: {0}")]
    InvalidRuleData(String),

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rule configuration error
    #[error(transparent)]
    Rule(#[from] RuleConfigError),
}

/// A loaded fixture set: catalog, cart, rules and optional threshold.
#[derive(Debug)]
pub struct Fixture {
    base_path: PathBuf,
    catalog: Catalog<'static>,
    cart: Cart,
    rules: Vec<Rule<'static>>,
    threshold: Option<ThresholdRule<'static>>,
    rule_keys: SlotMap<RuleKey, ()>,
}

impl Fixture {
    /// Create a new empty fixture with the default base path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(rusty_money::iso::USD),
            cart: Cart::new(),
            rules: Vec::new(),
            threshold: None,
            rule_keys: SlotMap::with_key(),
        }
    }

    /// Load products from a YAML fixture file into the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// catalog rejects a product.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (sku, product_fixture) in fixture.products {
            let (minor_units, currency) = products::parse_price(&product_fixture.price)?;

            // The first product pins the catalog currency.
            if self.catalog.is_empty() {
                self.catalog = Catalog::new(currency);
            }

            let member_price = match &product_fixture.member_price {
                Some(price) => {
                    let (member_minor, member_currency) = products::parse_price(price)?;

                    Some(Money::from_minor(member_minor, member_currency))
                }
                None => None,
            };

            let mut product = Product::new(
                sku,
                product_fixture.name,
                Money::from_minor(minor_units, currency),
            );

            product.member_price = member_price;
            product.clearance = product_fixture.clearance;
            product.purchase_limit = product_fixture.purchase_limit;

            self.catalog.insert(product)?;
        }

        Ok(self)
    }

    /// Load a cart from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        self.cart = Cart::from(fixture);

        Ok(self)
    }

    /// Load rules from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a rule
    /// rejects its configuration.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("rules").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: RulesFixture = serde_norway::from_str(&contents)?;

        for (rule_name, rule_fixture) in fixture.rules {
            let key = self.rule_keys.insert(());
            let rule = rule_fixture.try_into_rule(key, &rule_name)?;

            self.rules.push(rule);
        }

        if let Some(threshold_fixture) = fixture.threshold {
            let key = self.rule_keys.insert(());

            self.threshold = Some(threshold_fixture.try_into_rule(key)?);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, cart and rules with one name).
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_rules(name)?;

        Ok(fixture)
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<'static> {
        &self.catalog
    }

    /// The loaded cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The loaded unit-consuming rules.
    #[must_use]
    pub fn rules(&self) -> &[Rule<'static>] {
        &self.rules
    }

    /// The loaded threshold rule, if the fixture defines one.
    #[must_use]
    pub fn threshold(&self) -> Option<&ThresholdRule<'static>> {
        self.threshold.as_ref()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
