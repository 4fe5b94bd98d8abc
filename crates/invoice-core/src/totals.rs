//! Totals calculator
//!
//! Every derived field is rounded to cents on its own, half away from zero:
//!
//! ```text
//! amount_i       = quantity_i * unit_price_i          (exact)
//! subtotal       = round2(sum(amount_i))
//! tax_amount     = round2(subtotal * tax_rate / 100)
//! discount_amount= round2(subtotal * discount / 100)
//! total          = round2(subtotal + tax_amount - discount_amount)
//! ```
//!
//! Missing or non-numeric rates count as zero.

use crate::model::{Document, LineItem};
use crate::money::{checked_product, checked_sum, parse_lenient, Amount};
use rust_decimal::Decimal;

/// The four derived monetary fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Amount,
    pub tax_amount: Amount,
    pub discount_amount: Amount,
    pub total: Amount,
}

impl Totals {
    /// Compute totals from items and rate strings
    ///
    /// Item amounts are taken as `quantity * unit_price`, not from the stored
    /// `amount` field.
    pub fn compute(items: &[LineItem], tax_rate: Option<&str>, discount: Option<&str>) -> Self {
        let sum = items
            .iter()
            .map(|item| checked_product(item.quantity, item.unit_price))
            .fold(Decimal::ZERO, checked_sum);
        let subtotal = Amount::new(sum);

        let tax_amount = percent_of(subtotal, tax_rate);
        let discount_amount = percent_of(subtotal, discount);
        let total = Amount::new(checked_sum(
            checked_sum(subtotal.value(), tax_amount.value()),
            -discount_amount.value(),
        ));

        Self {
            subtotal,
            tax_amount,
            discount_amount,
            total,
        }
    }
}

fn percent_of(base: Amount, rate: Option<&str>) -> Amount {
    let rate = rate.map(parse_lenient).unwrap_or(Decimal::ZERO);
    Amount::new(checked_product(base.value(), rate) / Decimal::ONE_HUNDRED)
}

impl Document {
    /// Recompute item amounts and the derived totals in place
    pub fn recompute(&mut self) {
        for item in &mut self.items {
            item.amount = checked_product(item.quantity, item.unit_price);
        }

        let totals = self.totals();
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.discount_amount = totals.discount_amount;
        self.total = totals.total;
    }

    /// Totals implied by the current items and rates
    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.items,
            self.tax_rate_percent.as_deref(),
            self.discount_percent.as_deref(),
        )
    }

    /// Whether stored amounts match a fresh computation
    pub fn is_consistent(&self) -> bool {
        let totals = self.totals();
        self.subtotal == totals.subtotal
            && self.tax_amount == totals.tax_amount
            && self.discount_amount == totals.discount_amount
            && self.total == totals.total
            && self
                .items
                .iter()
                .all(|item| item.amount == checked_product(item.quantity, item.unit_price))
    }
}

/// Return a copy of `doc` with every derived field recomputed
///
/// Pure and idempotent: `recompute(&recompute(doc)) == recompute(doc)`.
pub fn recompute(doc: &Document) -> Document {
    let mut next = doc.clone();
    next.recompute();
    next
}
