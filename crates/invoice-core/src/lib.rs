//! Invoice Core - Invoice and quotation domain logic
//!
//! This crate provides:
//! - Fixed-point money with cent rounding and lenient parsing
//! - The totals calculator (subtotal, tax, discount, total)
//! - Currency, percent and date formatting for display
//! - The document model and its JSON shape
//! - Editor mutations that keep totals consistent
//! - Validation at the persistence boundary and an in-memory store
//!
//! # Example
//!
//! ```ignore
//! use chrono::NaiveDate;
//! use invoice_core::{Document, DocumentKind};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 1, 22).unwrap();
//! let mut doc = Document::new_default(DocumentKind::Invoice, today);
//! doc.update_item_quantity("item-1", "2");
//! doc.update_item_unit_price("item-1", "100");
//! doc.set_tax_rate("16");
//! assert_eq!(doc.total.to_string(), "232.00");
//! ```

mod editor;
mod format;
mod image;
mod model;
mod money;
mod naming;
mod store;
mod totals;
mod validation;

pub use format::{format_currency, format_date_long, format_percent, CurrencyFormat, NegativeStyle};
pub use image::{DecodedImage, ImageData, DEFAULT_MAX_IMAGE_BYTES};
pub use model::{Client, Document, DocumentKind, Issuer, LineItem, DEFAULT_PAYMENT_DAYS};
pub use money::{decimal_from_f64, parse_lenient, round2, serde_number, Amount};
pub use naming::{artifact_file_name, DocumentNumber};
pub use store::{DocumentStore, StoreError, StoredDocument};
pub use totals::{recompute, Totals};
pub use validation::{validate_document, validate_document_with_limit};

pub use rust_decimal::Decimal;

use thiserror::Error;

/// Why a document was rejected at the persistence boundary
///
/// Every variant names the offending field path, e.g. `items[2].quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field}: duplicate item id '{id}'")]
    DuplicateId { field: String, id: String },

    #[error("{field} {message}")]
    OutOfRange {
        field: String,
        message: &'static str,
    },

    #[error("{field} does not equal quantity * unitPrice")]
    AmountMismatch { field: String },

    #[error("{field} is {actual} but the items and rates give {expected}")]
    InconsistentTotal {
        field: String,
        expected: Amount,
        actual: Amount,
    },

    #[error("{field}: invalid image ({reason})")]
    InvalidImage { field: String, reason: String },

    #[error("{field}: unsupported media type '{mime}', expected image/*")]
    UnsupportedMediaType { field: String, mime: String },

    #[error("{field}: image is {size} bytes, limit is {limit}")]
    ImageTooLarge {
        field: String,
        size: usize,
        limit: usize,
    },
}

impl ValidationError {
    /// Path of the field that failed
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::DuplicateId { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::AmountMismatch { field }
            | ValidationError::InconsistentTotal { field, .. }
            | ValidationError::InvalidImage { field, .. }
            | ValidationError::UnsupportedMediaType { field, .. }
            | ValidationError::ImageTooLarge { field, .. } => field,
        }
    }
}

/// Result type for validation
pub type Result<T> = std::result::Result<T, ValidationError>;
