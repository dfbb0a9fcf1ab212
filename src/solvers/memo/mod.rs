//! Memoized multiset-state solver
//!
//! Explores subsets of candidate rule applications under a no-double-
//! consumption constraint to find the minimum total. Candidates are
//! translated from unit indices into per-SKU quantity deltas, so sub-problems
//! reachable through different consumption orders collapse onto one cached
//! state. Repeatable rules (bundles, BOGO pairs) may fire again at deeper
//! recursion levels; single-application rules are tracked in a usage bitmask
//! carried in the state. A per-unit "pay full price" fallback move guarantees
//! a result for every valid cart, rules or no rules.

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    rules::{Rule, RuleKey},
    solvers::{
        Allocation, FullPriceLine, Selection, SkuUnits, Solver, SolverError,
        memo::state::{SearchState, SkuTable, apply_delta},
    },
    units::Unit,
};

pub(crate) mod state;

/// Sentinel cost for states no move chain has settled yet.
const UNREACHABLE: i64 = i64::MAX;

/// A candidate translated into quantity space.
#[derive(Debug)]
struct Move {
    /// Proposing rule; `None` marks the per-unit full-price fallback
    rule: Option<RuleKey>,

    /// Name of the proposing rule, empty for the fallback
    rule_name: String,

    /// Per-slot consumption, sorted by slot
    delta: SmallVec<[(usize, u32); 4]>,

    /// Price charged for the consumed set, in minor units
    price_minor: i64,

    /// Usage bit for single-application rules; `None` for repeatable rules
    /// and the fallback
    once_bit: Option<u64>,

    /// Trace message of the original candidate
    trace: String,
}

/// Minimum cost-to-finish and the move that achieves it.
#[derive(Debug, Clone, Copy)]
struct Outcome {
    cost: i64,
    chosen: Option<usize>,
}

/// Depth-first search over quantity states with memoization.
struct Search<'m> {
    moves: &'m [Move],
    memo: FxHashMap<SearchState, Outcome>,
}

impl Search<'_> {
    fn new(moves: &[Move]) -> Search<'_> {
        Search {
            moves,
            memo: FxHashMap::default(),
        }
    }

    /// Minimum cost to bill every remaining unit from this state.
    fn min_cost(&mut self, state: &SearchState) -> i64 {
        if state.is_settled() {
            return 0;
        }

        if let Some(outcome) = self.memo.get(state) {
            return outcome.cost;
        }

        let mut best = UNREACHABLE;
        let mut chosen = None;
        let moves = self.moves;

        for (index, candidate_move) in moves.iter().enumerate() {
            let Some(next) = next_state(state, candidate_move) else {
                continue;
            };

            let cost = candidate_move.price_minor.saturating_add(self.min_cost(&next));

            if cost < best {
                best = cost;
                chosen = Some(index);
            }
        }

        self.memo.insert(state.clone(), Outcome { cost: best, chosen });

        best
    }

    fn outcome_for(&self, state: &SearchState) -> Option<Outcome> {
        self.memo.get(state).copied()
    }
}

/// Apply a move to a state, or `None` if it is infeasible: not enough
/// remaining quantity, or a single-application rule firing twice.
fn next_state(state: &SearchState, candidate_move: &Move) -> Option<SearchState> {
    if let Some(bit) = candidate_move.once_bit {
        if state.used_rules & bit != 0 {
            return None;
        }
    }

    let quantities = apply_delta(&state.quantities, &candidate_move.delta)?;

    Some(SearchState {
        quantities,
        used_rules: state.used_rules | candidate_move.once_bit.unwrap_or(0),
    })
}

/// Solver using depth-first search with a remaining-quantity memo
#[derive(Debug)]
pub struct MemoSolver;

impl MemoSolver {
    /// Translate every rule's candidates into quantity-space moves and append
    /// the per-slot full-price fallbacks.
    fn build_moves<'a>(
        rules: &[Rule<'a>],
        units: &[Unit<'a>],
        table: &SkuTable<'a>,
    ) -> Result<Vec<Move>, SolverError> {
        let mut moves = Vec::new();
        let mut seen: FxHashSet<(RuleKey, SmallVec<[(usize, u32); 4]>, i64)> =
            FxHashSet::default();
        let mut once_bits = 0_u32;

        for rule in rules {
            let once_bit = if rule.is_repeatable() {
                None
            } else {
                if once_bits >= 64 {
                    return Err(SolverError::TooManyRules);
                }

                let bit = 1_u64 << once_bits;
                once_bits += 1;

                Some(bit)
            };

            for candidate in rule.find_applications(units)? {
                if candidate.consumed.is_empty() {
                    continue;
                }

                let mut delta: SmallVec<[(usize, u32); 4]> = SmallVec::new();

                for &index in &candidate.consumed {
                    let slot = table
                        .slot_of_unit(index)
                        .ok_or(SolverError::UnknownUnitIndex { index })?;

                    match delta.iter_mut().find(|(s, _)| *s == slot) {
                        Some((_, count)) => *count += 1,
                        None => delta.push((slot, 1)),
                    }
                }

                delta.sort_unstable_by_key(|&(slot, _)| slot);

                // Clearance-flagged SKUs route only through their own
                // clearance rule or the plain per-unit fallback.
                let violates_clearance = delta.iter().any(|&(slot, _)| {
                    table.slot(slot).is_some_and(|entry| {
                        entry.clearance && rule.clearance_sku() != Some(entry.sku)
                    })
                });

                if violates_clearance {
                    continue;
                }

                let price_minor = candidate.price.to_minor_units();
                let unit_value = Self::unit_value(table, &delta)?;

                // A set priced above its plain unit value can never appear in
                // an optimum; the fallback reaches the same state for less.
                if price_minor > unit_value {
                    continue;
                }

                if seen.insert((candidate.rule, delta.clone(), price_minor)) {
                    moves.push(Move {
                        rule: Some(candidate.rule),
                        rule_name: rule.name().to_owned(),
                        delta,
                        price_minor,
                        once_bit,
                        trace: candidate.trace,
                    });
                }
            }
        }

        for (slot, entry) in table.slots().iter().enumerate() {
            moves.push(Move {
                rule: None,
                rule_name: String::new(),
                delta: SmallVec::from_slice(&[(slot, 1)]),
                price_minor: entry.price_minor,
                once_bit: None,
                trace: String::new(),
            });
        }

        Ok(moves)
    }

    /// Plain unit-price value of a consumption delta, in minor units.
    fn unit_value(table: &SkuTable<'_>, delta: &[(usize, u32)]) -> Result<i64, SolverError> {
        let mut value = 0_i64;

        for &(slot, count) in delta {
            let entry = table.slot(slot).ok_or(SolverError::InvariantViolation {
                message: "delta names a missing slot",
            })?;

            let amount = entry
                .price_minor
                .checked_mul(i64::from(count))
                .ok_or(SolverError::InvariantViolation {
                    message: "amount overflow",
                })?;

            value = value
                .checked_add(amount)
                .ok_or(SolverError::InvariantViolation {
                    message: "amount overflow",
                })?;
        }

        Ok(value)
    }

    /// Replay the memoized best moves from the initial state into an ordered
    /// selection list and per-SKU full-price counts.
    fn reconstruct<'a>(
        search: &Search<'_>,
        moves: &[Move],
        table: &SkuTable<'a>,
        currency: &'static Currency,
    ) -> Result<(Vec<Selection<'a>>, Vec<FullPriceLine<'a>>), SolverError> {
        let mut selections = Vec::new();
        let mut full_price_counts = vec![0_u32; table.len()];
        let mut state = table.initial_state();

        while !state.is_settled() {
            let outcome = search
                .outcome_for(&state)
                .ok_or(SolverError::InvariantViolation {
                    message: "optimal path state missing from memo",
                })?;

            let chosen = outcome.chosen.ok_or(SolverError::InvariantViolation {
                message: "unsettled state has no feasible move",
            })?;

            let chosen_move = moves.get(chosen).ok_or(SolverError::InvariantViolation {
                message: "memo points at a missing move",
            })?;

            match chosen_move.rule {
                Some(rule) => {
                    let mut consumed: SmallVec<[SkuUnits<'a>; 4]> = SmallVec::new();

                    for &(slot, units) in &chosen_move.delta {
                        let entry = table.slot(slot).ok_or(SolverError::InvariantViolation {
                            message: "delta names a missing slot",
                        })?;

                        consumed.push(SkuUnits {
                            sku: entry.sku,
                            units,
                        });
                    }

                    selections.push(Selection {
                        rule,
                        rule_name: chosen_move.rule_name.clone(),
                        consumed,
                        price: Money::from_minor(chosen_move.price_minor, currency),
                        trace: chosen_move.trace.clone(),
                    });
                }
                None => {
                    for &(slot, units) in &chosen_move.delta {
                        if let Some(count) = full_price_counts.get_mut(slot) {
                            *count += units;
                        }
                    }
                }
            }

            state = next_state(&state, chosen_move).ok_or(SolverError::InvariantViolation {
                message: "optimal path applied an infeasible move",
            })?;
        }

        let mut full_price = Vec::new();

        for (slot, &count) in full_price_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }

            let entry = table.slot(slot).ok_or(SolverError::InvariantViolation {
                message: "full-price count names a missing slot",
            })?;

            let amount = entry
                .price_minor
                .checked_mul(i64::from(count))
                .ok_or(SolverError::InvariantViolation {
                    message: "amount overflow",
                })?;

            full_price.push(FullPriceLine {
                sku: entry.sku,
                units: count,
                unit_price: Money::from_minor(entry.price_minor, currency),
                amount: Money::from_minor(amount, currency),
            });
        }

        Ok((selections, full_price))
    }
}

impl Solver for MemoSolver {
    fn solve<'a>(
        rules: &[Rule<'a>],
        units: &[Unit<'a>],
        currency: &'static Currency,
    ) -> Result<Allocation<'a>, SolverError> {
        if units.is_empty() {
            return Ok(Allocation {
                total: Money::from_minor(0, currency),
                selections: Vec::new(),
                full_price: Vec::new(),
            });
        }

        let table = SkuTable::from_units(units)?;
        let moves = Self::build_moves(rules, units, &table)?;

        let mut search = Search::new(&moves);
        let total_minor = search.min_cost(&table.initial_state());

        if total_minor == UNREACHABLE {
            return Err(SolverError::InvariantViolation {
                message: "no move chain settles the cart",
            });
        }

        let (selections, full_price) = Self::reconstruct(&search, &moves, &table, currency)?;

        Ok(Allocation {
            total: Money::from_minor(total_minor, currency),
            selections,
            full_price,
        })
    }
}
