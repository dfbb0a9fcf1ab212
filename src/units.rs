//! Unit expansion
//!
//! Turns a cart into the ordered list of indivisible purchasable units the
//! allocator works over. Each unit carries the price it resolved to at
//! expansion time (member or base); that price never changes afterwards.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::{Catalog, ProductKey},
};

/// Whether the cart is priced with member pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Base prices only
    Standard,

    /// Member prices where the product defines one
    Member,
}

/// One purchased instance of a SKU.
///
/// Units of the same SKU resolve to the same price within a single expansion,
/// which makes them interchangeable; the solver leans on that to collapse its
/// search state to remaining quantities per SKU.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit<'a> {
    sku: &'a str,
    price: Money<'a, Currency>,
    product: ProductKey,
    clearance: bool,
    index: usize,
}

impl<'a> Unit<'a> {
    /// Return the SKU of the unit.
    pub fn sku(&self) -> &'a str {
        self.sku
    }

    /// Return the resolved unit price.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Return the key of the owning product.
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Whether the owning product is on clearance.
    pub fn clearance(&self) -> bool {
        self.clearance
    }

    /// Return the unique index of the unit within its expansion.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Errors rejected during unit expansion, before any search begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// A cart line names a SKU that is not in the catalog.
    #[error("unknown SKU in cart: {sku}")]
    UnknownSku {
        /// The unknown SKU
        sku: String,
    },

    /// A cart line has a zero or negative quantity.
    #[error("invalid quantity {quantity} for SKU {sku}")]
    InvalidQuantity {
        /// SKU of the offending line
        sku: String,
        /// The rejected quantity
        quantity: i64,
    },
}

/// Expand a cart into units against a catalog.
///
/// Walks the cart in insertion order and emits one [`Unit`] per purchased
/// instance, indices strictly increasing from zero. Deterministic: the same
/// cart, catalog and membership always produce the same unit list.
///
/// # Errors
///
/// Returns an [`ExpandError`] if a line names an unknown SKU or carries a
/// zero or negative quantity.
pub fn expand<'a>(
    cart: &Cart,
    catalog: &'a Catalog<'a>,
    membership: Membership,
) -> Result<Vec<Unit<'a>>, ExpandError> {
    let mut units = Vec::new();

    for line in cart.iter() {
        if line.quantity() <= 0 {
            return Err(ExpandError::InvalidQuantity {
                sku: line.sku().to_owned(),
                quantity: line.quantity(),
            });
        }

        let key = catalog
            .key_for(line.sku())
            .ok_or_else(|| ExpandError::UnknownSku {
                sku: line.sku().to_owned(),
            })?;

        let Some(product) = catalog.get(key) else {
            return Err(ExpandError::UnknownSku {
                sku: line.sku().to_owned(),
            });
        };

        let price = match (membership, &product.member_price) {
            (Membership::Member, Some(member_price)) => *member_price,
            _ => product.price,
        };

        for _ in 0..line.quantity() {
            units.push(Unit {
                sku: &product.sku,
                price,
                product: key,
                clearance: product.clearance,
                index: units.len(),
            });
        }
    }

    Ok(units)
}
