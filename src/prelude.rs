//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine},
    catalog::{Catalog, CatalogError, Product, ProductKey},
    checkout::{CheckoutError, price_cart},
    pricing::{PricingError, percent_of_minor, unit_total},
    receipt::{Receipt, ReceiptError, SkuBreakdown},
    rules::{
        Rule, RuleConfigError, RuleKey,
        bogo::BogoRule,
        bundle::BundleRule,
        candidates::Candidate,
        clearance::ClearanceRule,
        direct::{DirectPricing, DirectRule},
        multi_tier::MultiTierRule,
        threshold::{ThresholdRule, ThresholdTier},
    },
    solvers::{Allocation, FullPriceLine, Selection, Solver, SolverError, memo::MemoSolver},
    units::{ExpandError, Membership, Unit, expand},
};
