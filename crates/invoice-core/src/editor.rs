//! Field-level edits made by the document form
//!
//! Each edit that touches items or rates leaves the document
//! totals-consistent. Description edits leave the totals alone.

use crate::model::{Document, DocumentKind, LineItem};
use crate::money::parse_lenient;

impl Document {
    /// Append a blank item and return its id
    ///
    /// The id is `item-N` where N is one past the highest numeric suffix
    /// in use, so ids stay unique after removals.
    pub fn add_item(&mut self) -> String {
        let next = self
            .items
            .iter()
            .filter_map(|item| item.id.strip_prefix("item-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("item-{next}");

        self.items.push(LineItem::blank(id.clone()));
        self.recompute();
        id
    }

    /// Remove an item; the last remaining item is never removed
    ///
    /// Returns whether an item was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        if self.items.len() <= 1 {
            return false;
        }
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    /// Change an item's description without touching any amount
    pub fn update_item_description(&mut self, id: &str, description: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.description = description.to_string();
                true
            }
            None => false,
        }
    }

    /// Set an item's quantity from form input; non-numeric input is zero
    pub fn update_item_quantity(&mut self, id: &str, raw: &str) -> bool {
        self.update_item_number(id, |item| item.quantity = parse_lenient(raw))
    }

    /// Set an item's unit price from form input; non-numeric input is zero
    pub fn update_item_unit_price(&mut self, id: &str, raw: &str) -> bool {
        self.update_item_number(id, |item| item.unit_price = parse_lenient(raw))
    }

    fn update_item_number(&mut self, id: &str, apply: impl FnOnce(&mut LineItem)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        apply(item);
        self.recompute();
        true
    }

    /// Set the tax rate string as typed
    pub fn set_tax_rate(&mut self, raw: &str) {
        self.tax_rate_percent = Some(raw.to_string());
        self.recompute();
    }

    /// Set the discount rate string as typed
    pub fn set_discount(&mut self, raw: &str) {
        self.discount_percent = Some(raw.to_string());
        self.recompute();
    }

    /// Switch between invoice and quotation
    ///
    /// Due date and payment fields stay on the value; rendering decides
    /// whether they are shown.
    pub fn set_kind(&mut self, kind: DocumentKind) {
        self.kind = kind;
    }
}
