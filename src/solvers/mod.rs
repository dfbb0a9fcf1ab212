//! Solvers for rule allocation
//!
//! A solver picks the minimum-cost disjoint set of candidate applications
//! over a unit list. Solving is a pure synchronous computation: each
//! invocation owns its own bookkeeping and memoization, so independent carts
//! may be solved concurrently without any shared state.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    pricing::PricingError,
    rules::{Rule, RuleKey},
    units::Unit,
};

pub mod memo;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// A candidate named a unit index outside the expansion (this is a bug
    /// in a rule, not a caller error).
    #[error("candidate consumed unknown unit index {index}")]
    UnknownUnitIndex {
        /// The out-of-range unit index
        index: usize,
    },

    /// Wrapped pricing calculation error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The usage bitmask tracks at most 64 single-application rules.
    #[error("rule set exceeds 64 single-application rules")]
    TooManyRules,

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// A count of units of one SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuUnits<'a> {
    /// The SKU
    pub sku: &'a str,

    /// How many units of it
    pub units: u32,
}

/// One chosen candidate application along the optimal path.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Key of the rule that fired
    pub rule: RuleKey,

    /// Name of the rule that fired
    pub rule_name: String,

    /// Units consumed, grouped per SKU
    pub consumed: SmallVec<[SkuUnits<'a>; 4]>,

    /// Price charged for the consumed set
    pub price: Money<'a, Currency>,

    /// Human-readable description of the application
    pub trace: String,
}

/// Units no rule covered, billed at plain unit price.
#[derive(Debug, Clone)]
pub struct FullPriceLine<'a> {
    /// The SKU
    pub sku: &'a str,

    /// How many units of it were left uncovered
    pub units: u32,

    /// Resolved unit price
    pub unit_price: Money<'a, Currency>,

    /// `units x unit_price`
    pub amount: Money<'a, Currency>,
}

/// The minimum-cost allocation of rules over a unit list.
///
/// Selections and full-price lines partition the unit multiset exactly: every
/// unit is billed once, either by exactly one selection or at unit price.
/// With no rules chosen the total reproduces the plain cart total.
#[derive(Debug, Clone)]
pub struct Allocation<'a> {
    /// Minimum unit-level total, before any order-level threshold
    pub total: Money<'a, Currency>,

    /// Chosen candidate applications, in optimal-path order
    pub selections: Vec<Selection<'a>>,

    /// Per-SKU uncovered units billed at unit price
    pub full_price: Vec<FullPriceLine<'a>>,
}

/// Trait for solving rule allocation over a set of units
pub trait Solver {
    /// Find the minimum-cost allocation of the rules over the units.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the solver encounters an error.
    fn solve<'a>(
        rules: &[Rule<'a>],
        units: &[Unit<'a>],
        currency: &'static Currency,
    ) -> Result<Allocation<'a>, SolverError>;
}
