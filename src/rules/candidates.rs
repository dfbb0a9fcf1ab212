//! Candidate applications

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::rules::RuleKey;

/// A rule's proposal to bill a set of units.
///
/// A candidate names the unit indices it would consume, the price it would
/// charge for that whole set, and a human-readable trace message. Proposing a
/// candidate commits nothing; the allocator decides which candidates are
/// chosen, under the constraint that no unit is consumed twice.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Key of the proposing rule
    pub rule: RuleKey,

    /// Indices of the units this candidate would consume
    pub consumed: SmallVec<[usize; 4]>,

    /// Price charged for the consumed set as a whole
    pub price: Money<'a, Currency>,

    /// Human-readable description of the application
    pub trace: String,
}

impl<'a> Candidate<'a> {
    /// Create a new candidate application.
    pub fn new(
        rule: RuleKey,
        consumed: SmallVec<[usize; 4]>,
        price: Money<'a, Currency>,
        trace: String,
    ) -> Self {
        Self {
            rule,
            consumed,
            price,
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn new_keeps_consumed_indices_in_order() {
        let candidate = Candidate::new(
            RuleKey::default(),
            smallvec![2, 0, 1],
            Money::from_minor(4000, USD),
            String::from("bundle 'test': A + B for $40.00"),
        );

        assert_eq!(candidate.consumed.as_slice(), &[2, 0, 1]);
        assert_eq!(candidate.price.to_minor_units(), 4000);
    }
}
