//! Checkout
//!
//! The top-level call contract: expand the cart, solve the allocation, and
//! assemble the receipt. Input errors surface before the search begins; the
//! search itself is total for every valid cart.

use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::Catalog,
    receipt::{Receipt, ReceiptError},
    rules::{Rule, threshold::ThresholdRule},
    solvers::{Solver, SolverError, memo::MemoSolver},
    units::{ExpandError, Membership, expand},
};

/// Errors surfaced when pricing a cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Wrapped unit expansion error.
    #[error(transparent)]
    Expand(#[from] ExpandError),

    /// Wrapped solver error.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Wrapped receipt assembly error.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// Price a cart against a catalog and rule set.
///
/// Computes the minimum total the customer must pay: unit-level rules are
/// allocated optimally over the expanded units, then the optional order-level
/// threshold rule is applied once to the resulting subtotal.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the cart names an unknown SKU, carries an
/// invalid quantity, or an internal solver invariant is violated.
pub fn price_cart<'a>(
    catalog: &'a Catalog<'a>,
    cart: &Cart,
    rules: &[Rule<'a>],
    threshold: Option<&ThresholdRule<'a>>,
    membership: Membership,
) -> Result<Receipt<'a>, CheckoutError> {
    let units = expand(cart, catalog, membership)?;
    let allocation = MemoSolver::solve(rules, &units, catalog.currency())?;
    let receipt = Receipt::assemble(&units, allocation, threshold, catalog.currency())?;

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        catalog::Product,
        rules::{RuleKey, bundle::BundleRule},
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
    fn prices_a_cart_end_to_end() -> TestResult {
        let catalog = catalog();

        let mut cart = Cart::new();
        cart.add("A", 1).add("B", 1);

        let rules = [Rule::Bundle(BundleRule::new(
            RuleKey::default(),
            "lunch deal",
            &["A", "B"],
            Money::from_minor(4000, USD),
        )?)];

        let receipt = price_cart(&catalog, &cart, &rules, None, Membership::Standard)?;

        assert_eq!(receipt.total(), Money::from_minor(4000, USD));

        Ok(())
    }

    #[test]
    fn input_errors_surface_before_the_search() {
        let catalog = catalog();

        let mut unknown = Cart::new();
        unknown.add("missing", 1);

        let result = price_cart(&catalog, &unknown, &[], None, Membership::Standard);

        assert!(matches!(
            result,
            Err(CheckoutError::Expand(ExpandError::UnknownSku { .. }))
        ));

        let mut invalid = Cart::new();
        invalid.add("A", 0);

        let result = price_cart(&catalog, &invalid, &[], None, Membership::Standard);

        assert!(matches!(
            result,
            Err(CheckoutError::Expand(ExpandError::InvalidQuantity { .. }))
        ));
    }

    #[test]
    fn empty_cart_prices_to_zero() -> TestResult {
        let catalog = catalog();
        let cart = Cart::new();

        let receipt = price_cart(&catalog, &cart, &[], None, Membership::Standard)?;

        assert_eq!(receipt.total(), Money::from_minor(0, USD));
        assert!(receipt.trace().is_empty());

        Ok(())
    }
}
