//! Tally
//!
//! Tally is a promotion and discount allocation engine. Given a cart, a product
//! catalog and a set of competing pricing rules, it computes the minimum total
//! the customer must pay and a trace of which rule billed which units.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod rules;
pub mod solvers;
pub mod units;
pub mod utils;
