//! Receipt
//!
//! Combines an allocation with the order-level threshold into the final
//! payable amount, an ordered trace, and a per-SKU breakdown of which rule
//! billed which units. Assembly is side-effect-free.

use std::io;

use decimal_percentage::Percentage;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

use crate::{
    pricing::{PricingError, unit_total},
    rules::{RuleKey, threshold::ThresholdRule},
    solvers::{Allocation, FullPriceLine, Selection},
    units::Unit,
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapped pricing calculation error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error while writing the receipt.
    #[error("failed to write receipt")]
    Io(#[from] io::Error),
}

/// Units of one SKU billed by one rule.
#[derive(Debug, Clone)]
pub struct PromotedUnits {
    /// Key of the billing rule
    pub rule: RuleKey,

    /// Name of the billing rule
    pub rule_name: String,

    /// How many units it billed
    pub units: u32,
}

/// Per-SKU view of who billed what.
#[derive(Debug, Clone)]
pub struct SkuBreakdown<'a> {
    /// The SKU
    pub sku: &'a str,

    /// Units billed by each winning rule
    pub promoted: SmallVec<[PromotedUnits; 3]>,

    /// Units billed at plain unit price
    pub full_price: u32,
}

/// Final receipt for a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    selections: Vec<Selection<'a>>,
    full_price: Vec<FullPriceLine<'a>>,
    subtotal: Money<'a, Currency>,
    items_total: Money<'a, Currency>,
    order_discount: Money<'a, Currency>,
    tier_note: String,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Assemble a receipt from an allocation.
    ///
    /// Applies the threshold rule exactly once against the unit-level total
    /// and floors the payable amount at zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the pre-promotion subtotal cannot be
    /// calculated.
    pub fn assemble(
        units: &[Unit<'a>],
        allocation: Allocation<'a>,
        threshold: Option<&ThresholdRule<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, ReceiptError> {
        let subtotal = unit_total(units, currency)?;
        let items_total = allocation.total;

        let (order_discount, tier_note) = match threshold {
            Some(rule) => rule.compute_discount(items_total),
            None => (Money::from_minor(0, currency), String::from("no tier met")),
        };

        let payable_minor =
            (items_total.to_minor_units() - order_discount.to_minor_units()).max(0);

        Ok(Self {
            selections: allocation.selections,
            full_price: allocation.full_price,
            subtotal,
            items_total,
            order_discount,
            tier_note,
            total: Money::from_minor(payable_minor, currency),
            currency,
        })
    }

    /// Chosen rule applications, in optimal-path order.
    #[must_use]
    pub fn selections(&self) -> &[Selection<'a>] {
        &self.selections
    }

    /// Per-SKU uncovered units billed at unit price.
    #[must_use]
    pub fn full_price_lines(&self) -> &[FullPriceLine<'a>] {
        &self.full_price
    }

    /// Pre-promotion subtotal: every unit at its resolved unit price.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Unit-level total after allocation, before the order-level discount.
    #[must_use]
    pub fn items_total(&self) -> Money<'a, Currency> {
        self.items_total
    }

    /// Order-level threshold discount.
    #[must_use]
    pub fn order_discount(&self) -> Money<'a, Currency> {
        self.order_discount
    }

    /// Description of the threshold tier that fired, or "no tier met".
    #[must_use]
    pub fn tier_note(&self) -> &str {
        &self.tier_note
    }

    /// Final payable amount, floored at zero.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Ordered trace messages: rule applications along the optimal path,
    /// then a full-price marker per SKU with uncovered units.
    pub fn trace(&self) -> Vec<String> {
        let mut trace: Vec<String> =
            self.selections.iter().map(|s| s.trace.clone()).collect();

        for line in &self.full_price {
            trace.push(format!(
                "full price: {} x{} for {}",
                line.sku, line.units, line.amount
            ));
        }

        trace
    }

    /// Per-SKU breakdown of units billed by each winning rule vs. units
    /// billed at plain unit price.
    pub fn breakdown(&self) -> Vec<SkuBreakdown<'a>> {
        let mut rows: Vec<SkuBreakdown<'a>> = Vec::new();
        let mut index: FxHashMap<&'a str, usize> = FxHashMap::default();

        let mut row_for = |rows: &mut Vec<SkuBreakdown<'a>>, sku: &'a str| -> usize {
            if let Some(&row) = index.get(sku) {
                return row;
            }

            rows.push(SkuBreakdown {
                sku,
                promoted: SmallVec::new(),
                full_price: 0,
            });

            let row = rows.len() - 1;
            index.insert(sku, row);

            row
        };

        for selection in &self.selections {
            for consumed in &selection.consumed {
                let row = row_for(&mut rows, consumed.sku);

                let Some(entry) = rows.get_mut(row) else {
                    continue;
                };

                match entry
                    .promoted
                    .iter_mut()
                    .find(|p| p.rule == selection.rule)
                {
                    Some(promoted) => promoted.units += consumed.units,
                    None => entry.promoted.push(PromotedUnits {
                        rule: selection.rule,
                        rule_name: selection.rule_name.clone(),
                        units: consumed.units,
                    }),
                }
            }
        }

        for line in &self.full_price {
            let row = row_for(&mut rows, line.sku);

            if let Some(entry) = rows.get_mut(row) {
                entry.full_price += line.units;
            }
        }

        rows
    }

    /// Calculate the savings made by the winning rules and the threshold.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Calculates the savings as a percentage of the pre-promotion subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?;

        // Percent savings is relative to the original (pre-discount)
        // subtotal. Avoid integer division truncation by doing the ratio in
        // decimal space.
        let savings_minor = savings.to_minor_units();
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Render the receipt as a table followed by a totals summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Billed by", "Units", "Amount"]);

        for selection in &self.selections {
            let units: Vec<String> = selection
                .consumed
                .iter()
                .map(|c| format!("{} x{}", c.sku, c.units))
                .collect();

            builder.push_record([
                selection.rule_name.clone(),
                units.join(", "),
                format!("{}", selection.price),
            ]);
        }

        for line in &self.full_price {
            builder.push_record([
                String::from("full price"),
                format!("{} x{}", line.sku, line.units),
                format!("{}", line.amount),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());

        writeln!(out, "{table}")?;
        writeln!(out, " Subtotal:       {}", self.subtotal)?;
        writeln!(out, " Items total:    {}", self.items_total)?;
        writeln!(
            out,
            " Order discount: -{} ({})",
            self.order_discount, self.tier_note
        )?;
        writeln!(out, " Total:          {}", self.total)?;

        Ok(())
    }
}
