//! Solver state
//!
//! Units of one SKU resolve to the same price within an expansion and are
//! therefore interchangeable, so the search state is not "which unit indices
//! remain" but "how many units of each SKU remain". The canonical state is a
//! fixed-order quantity vector over the distinct SKUs of the expansion,
//! extended with a usage bitmask over single-application rules, and doubles
//! as the memoization key.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{catalog::ProductKey, solvers::SolverError, units::Unit};

/// Remaining quantities, one entry per SKU slot.
pub(crate) type Quantities = SmallVec<[u32; 8]>;

/// Canonical search state: remaining quantities plus which
/// single-application rules have already fired.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SearchState {
    /// Remaining units per SKU slot
    pub(crate) quantities: Quantities,

    /// Bit per single-application rule that has already fired
    pub(crate) used_rules: u64,
}

impl SearchState {
    /// Whether every SKU has been fully consumed.
    pub(crate) fn is_settled(&self) -> bool {
        self.quantities.iter().all(|&quantity| quantity == 0)
    }
}

/// One distinct SKU within an expansion.
#[derive(Debug)]
pub(crate) struct SkuSlot<'a> {
    /// The SKU
    pub(crate) sku: &'a str,

    /// Key of the owning product
    pub(crate) product: ProductKey,

    /// Resolved unit price in minor units
    pub(crate) price_minor: i64,

    /// Whether the SKU is clearance-flagged
    pub(crate) clearance: bool,

    /// How many units of the SKU the expansion contains
    pub(crate) count: u32,
}

/// Dense per-SKU view of a unit list.
#[derive(Debug)]
pub(crate) struct SkuTable<'a> {
    slots: Vec<SkuSlot<'a>>,
    slot_of_unit: Vec<usize>,
}

impl<'a> SkuTable<'a> {
    /// Group units by SKU, preserving first-appearance order.
    pub(crate) fn from_units(units: &[Unit<'a>]) -> Result<Self, SolverError> {
        let mut slots: Vec<SkuSlot<'a>> = Vec::new();
        let mut index: FxHashMap<&'a str, usize> = FxHashMap::default();
        let mut slot_of_unit = Vec::with_capacity(units.len());

        for unit in units {
            let slot = match index.get(unit.sku()) {
                Some(&slot) => {
                    let entry =
                        slots
                            .get_mut(slot)
                            .ok_or(SolverError::InvariantViolation {
                                message: "SKU index points at a missing slot",
                            })?;

                    entry.count =
                        entry
                            .count
                            .checked_add(1)
                            .ok_or(SolverError::InvariantViolation {
                                message: "unit count overflow",
                            })?;

                    slot
                }
                None => {
                    let slot = slots.len();

                    slots.push(SkuSlot {
                        sku: unit.sku(),
                        product: unit.product(),
                        price_minor: unit.price().to_minor_units(),
                        clearance: unit.clearance(),
                        count: 1,
                    });

                    index.insert(unit.sku(), slot);

                    slot
                }
            };

            slot_of_unit.push(slot);
        }

        Ok(Self {
            slots,
            slot_of_unit,
        })
    }

    /// The full search state: every SKU at its expanded count, no rules used.
    pub(crate) fn initial_state(&self) -> SearchState {
        SearchState {
            quantities: self.slots.iter().map(|slot| slot.count).collect(),
            used_rules: 0,
        }
    }

    /// All SKU slots, in first-appearance order.
    pub(crate) fn slots(&self) -> &[SkuSlot<'a>] {
        &self.slots
    }

    /// Look up a slot by index.
    pub(crate) fn slot(&self, index: usize) -> Option<&SkuSlot<'a>> {
        self.slots.get(index)
    }

    /// Translate a unit index into its SKU slot.
    pub(crate) fn slot_of_unit(&self, unit_index: usize) -> Option<usize> {
        self.slot_of_unit.get(unit_index).copied()
    }

    /// Number of distinct SKUs.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Subtract a consumption delta from a quantity vector.
///
/// Returns `None` when there is not enough remaining quantity, i.e. the move
/// is infeasible from this state.
pub(crate) fn apply_delta(quantities: &Quantities, delta: &[(usize, u32)]) -> Option<Quantities> {
    let mut next = quantities.clone();

    for &(slot, take) in delta {
        let quantity = next.get_mut(slot)?;
        *quantity = quantity.checked_sub(take)?;
    }

    Some(next)
}
