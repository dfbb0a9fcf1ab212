//! Products & catalog

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Immutable catalog entry.
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Stock keeping unit, unique within a catalog
    pub sku: String,

    /// Product name
    pub name: String,

    /// Base unit price
    pub price: Money<'a, Currency>,

    /// Member unit price, used instead of the base price for member carts
    pub member_price: Option<Money<'a, Currency>>,

    /// Whether this product is on clearance.
    ///
    /// Clearance units may only be billed by their own clearance rule or at
    /// plain unit price, never by any other rule.
    pub clearance: bool,

    /// Per-customer purchase cap, carried as catalog metadata for
    /// direct-discount configuration
    pub purchase_limit: Option<u32>,
}

impl<'a> Product<'a> {
    /// Create a plain product with just a SKU, name and base price.
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
            member_price: None,
            clearance: false,
            purchase_limit: None,
        }
    }
}

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency.
    #[error("product {sku} has currency {product}, but catalog has currency {catalog}")]
    CurrencyMismatch {
        /// SKU of the offending product
        sku: String,
        /// Currency of the product price
        product: &'static str,
        /// Currency of the catalog
        catalog: &'static str,
    },

    /// A product with this SKU is already in the catalog.
    #[error("product {sku} is already in the catalog")]
    DuplicateSku {
        /// The duplicated SKU
        sku: String,
    },
}

/// Product catalog: the read-only lookup table unit expansion works against.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    by_sku: FxHashMap<String, ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            by_sku: FxHashMap::default(),
            currency,
        }
    }

    /// Insert a product into the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the SKU is already present or if the
    /// base or member price is in a different currency than the catalog.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        self.ensure_currency(&product.sku, product.price.currency())?;

        if let Some(member_price) = &product.member_price {
            self.ensure_currency(&product.sku, member_price.currency())?;
        }

        if self.by_sku.contains_key(&product.sku) {
            return Err(CatalogError::DuplicateSku {
                sku: product.sku.clone(),
            });
        }

        let sku = product.sku.clone();
        let key = self.products.insert(product);
        self.by_sku.insert(sku, key);

        Ok(key)
    }

    /// Look up the key for a SKU.
    pub fn key_for(&self, sku: &str) -> Option<ProductKey> {
        self.by_sku.get(sku).copied()
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Get a product by SKU.
    pub fn product_for(&self, sku: &str) -> Option<&Product<'a>> {
        self.key_for(sku).and_then(|key| self.products.get(key))
    }

    /// Iterate over the products in the catalog.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn ensure_currency(&self, sku: &str, currency: &Currency) -> Result<(), CatalogError> {
        if currency == self.currency {
            Ok(())
        } else {
            Err(CatalogError::CurrencyMismatch {
                sku: sku.to_owned(),
                product: currency.iso_alpha_code,
                catalog: self.currency.iso_alpha_code,
            })
        }
    }
}
