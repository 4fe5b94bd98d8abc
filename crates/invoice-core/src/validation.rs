//! Checks applied before a document is stored
//!
//! Validation stops at the first problem and reports it with the field path,
//! so the caller can point the user at one concrete input.

use crate::image::{ImageData, DEFAULT_MAX_IMAGE_BYTES};
use crate::model::Document;
use crate::money::{checked_product, round2, Amount};
use crate::{Result, ValidationError};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Validate with the default 2 MiB image limit
pub fn validate_document(doc: &Document) -> Result<()> {
    validate_document_with_limit(doc, DEFAULT_MAX_IMAGE_BYTES)
}

/// Validate a document for storage
///
/// # Arguments
/// * `doc` - Document to check
/// * `max_image_bytes` - Limit for each decoded embedded image
pub fn validate_document_with_limit(doc: &Document, max_image_bytes: usize) -> Result<()> {
    required("number", &doc.number)?;
    required("issuer.name", &doc.issuer.name)?;
    required("client.name", &doc.client.name)?;

    validate_items(doc)?;
    validate_totals(doc)?;

    if let Some(logo) = &doc.issuer.logo {
        validate_image("issuer.logo", logo, max_image_bytes)?;
    }
    if let Some(signature) = &doc.signature_image {
        validate_image("signatureImage", signature, max_image_bytes)?;
    }

    Ok(())
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_items(doc: &Document) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, item) in doc.items.iter().enumerate() {
        let path = |name: &str| format!("items[{index}].{name}");

        required(&path("id"), &item.id)?;
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                field: path("id"),
                id: item.id.clone(),
            });
        }

        if item.quantity <= Decimal::ZERO {
            return Err(ValidationError::OutOfRange {
                field: path("quantity"),
                message: "must be greater than 0",
            });
        }
        if item.unit_price.is_sign_negative() && !item.unit_price.is_zero() {
            return Err(ValidationError::OutOfRange {
                field: path("unitPrice"),
                message: "must not be negative",
            });
        }
        if item.amount.is_sign_negative() && !item.amount.is_zero() {
            return Err(ValidationError::OutOfRange {
                field: path("amount"),
                message: "must not be negative",
            });
        }

        // Stored amounts may have passed through a JSON float, so compare at cents
        if round2(item.amount) != round2(checked_product(item.quantity, item.unit_price)) {
            return Err(ValidationError::AmountMismatch {
                field: path("amount"),
            });
        }
    }

    Ok(())
}

fn validate_totals(doc: &Document) -> Result<()> {
    let expected = doc.totals();
    let fields: [(&str, Amount, Amount); 4] = [
        ("subtotal", expected.subtotal, doc.subtotal),
        ("taxAmount", expected.tax_amount, doc.tax_amount),
        ("discountAmount", expected.discount_amount, doc.discount_amount),
        ("total", expected.total, doc.total),
    ];

    for (field, expected, actual) in fields {
        if expected != actual {
            return Err(ValidationError::InconsistentTotal {
                field: field.to_string(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn validate_image(field: &str, image: &ImageData, max_bytes: usize) -> Result<()> {
    let decoded = image.decode_field(field)?;
    if decoded.bytes.len() > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            field: field.to_string(),
            size: decoded.bytes.len(),
            limit: max_bytes,
        });
    }
    Ok(())
}
