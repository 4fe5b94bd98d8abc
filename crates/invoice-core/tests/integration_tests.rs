//! Integration tests for invoice-core

use chrono::{DateTime, NaiveDate, Utc};
use invoice_core::{
    artifact_file_name, format_currency, recompute, validate_document, Amount, Decimal, Document,
    DocumentKind, DocumentNumber, DocumentStore, ImageData, LineItem, StoreError, StoredDocument,
    ValidationError,
};
use pretty_assertions::assert_eq;
use std::str::FromStr;

fn jan_22() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 22).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(id: &str, quantity: &str, unit_price: &str) -> LineItem {
    LineItem {
        id: id.to_string(),
        description: format!("Work {id}"),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        amount: Decimal::ZERO,
    }
}

fn billable(kind: DocumentKind) -> Document {
    let mut doc = Document::new_default(kind, jan_22());
    doc.issuer.name = "Acme Ltd".to_string();
    doc.client.name = "Globex".to_string();
    doc.items = vec![item("item-1", "2", "100.00"), item("item-2", "1", "50.50")];
    doc.tax_rate_percent = Some("10".to_string());
    doc.discount_percent = Some("5".to_string());
    doc.recompute();
    doc
}

fn sample_docs() -> Vec<Document> {
    let mut docs = vec![billable(DocumentKind::Invoice)];

    let mut odd = billable(DocumentKind::Quotation);
    odd.items = vec![
        item("a", "3", "0.333"),
        item("b", "-1", "19.99"),
        item("c", "0.5", "1234567.891"),
    ];
    odd.tax_rate_percent = Some("16.5%".to_string());
    odd.discount_percent = Some("abc".to_string());
    docs.push(odd);

    let mut empty = billable(DocumentKind::Invoice);
    empty.items.clear();
    empty.tax_rate_percent = None;
    docs.push(empty);

    docs
}

#[test]
fn test_recompute_is_idempotent() {
    for doc in sample_docs() {
        let once = recompute(&doc);
        let twice = recompute(&once);
        assert_eq!(once, twice);
        assert!(once.is_consistent());
    }
}

#[test]
fn test_subtotal_is_rounded_sum_of_products() {
    for doc in sample_docs() {
        let doc = recompute(&doc);
        let sum: Decimal = doc
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price)
            .sum();
        assert_eq!(doc.subtotal, Amount::new(sum));
    }
}

#[test]
fn test_missing_rate_equals_zero_rate() {
    for doc in sample_docs() {
        let mut missing = doc.clone();
        missing.tax_rate_percent = None;
        missing.discount_percent = None;
        let mut zero = doc;
        zero.tax_rate_percent = Some("0".to_string());
        zero.discount_percent = Some("0".to_string());

        assert_eq!(recompute(&missing).totals(), recompute(&zero).totals());
    }
}

#[test]
fn test_zero_items_total() {
    let mut doc = billable(DocumentKind::Invoice);
    doc.items.clear();
    let doc = recompute(&doc);
    assert_eq!(doc.subtotal.to_string(), "0.00");
    assert_eq!(doc.total.to_string(), "0.00");
}

#[test]
fn test_reference_totals_and_display() {
    let doc = billable(DocumentKind::Invoice);
    assert_eq!(doc.subtotal.to_string(), "250.50");
    assert_eq!(doc.tax_amount.to_string(), "25.05");
    assert_eq!(doc.discount_amount.to_string(), "12.53");
    assert_eq!(doc.total.to_string(), "263.02");
    assert_eq!(format_currency(doc.total.value()), "Ksh 263.02");
}

#[test]
fn test_editor_json_roundtrip_stays_valid() {
    let doc = billable(DocumentKind::Invoice);
    let json = doc.to_json().unwrap();
    let back = Document::from_json(&json).unwrap();

    assert_eq!(back, doc);
    assert_eq!(validate_document(&back), Ok(()));
}

#[test]
fn test_json_with_float_amounts_validates() {
    let json = r#"{
        "documentKind": "invoice",
        "number": "INV-2025-0003",
        "issueDate": "2025-01-22",
        "issuer": {"name": "Acme"},
        "client": {"name": "Globex"},
        "items": [{"id": "item-1", "description": "Hours", "quantity": 3, "unitPrice": 0.1, "amount": 0.30000000000000004}],
        "taxRatePercent": "0",
        "discountPercent": "0",
        "subtotal": "0.30",
        "taxAmount": "0.00",
        "discountAmount": "0.00",
        "total": "0.30"
    }"#;
    let doc = Document::from_json(json).unwrap();
    assert_eq!(validate_document(&doc), Ok(()));
}

#[test]
fn test_store_crud() {
    let mut store = DocumentStore::new();
    let created_at: DateTime<Utc> = "2025-01-22T08:00:00Z".parse().unwrap();

    let first = store
        .create_at(billable(DocumentKind::Invoice), created_at)
        .unwrap()
        .id;
    let second = store
        .create(billable(DocumentKind::Quotation))
        .unwrap()
        .id;
    assert_eq!((first, second), (1, 2));
    assert_eq!(store.len(), 2);

    let mut changed = store.get(first).unwrap().document.clone();
    changed.set_tax_rate("16");
    let updated = store.update(first, changed).unwrap();
    assert_eq!(updated.id, first);
    assert_eq!(updated.created_at, created_at);
    assert_eq!(updated.document.tax_amount.to_string(), "40.08");

    let ids: Vec<u64> = store.list().iter().map(|stored| stored.id).collect();
    assert_eq!(ids, vec![1, 2]);

    assert!(store.delete(first));
    assert!(!store.delete(first));
    assert_eq!(store.get(first).unwrap_err(), StoreError::NotFound(1));

    // Ids are never reused
    let third = store
        .create(billable(DocumentKind::Invoice))
        .unwrap()
        .id;
    assert_eq!(third, 3);
}

#[test]
fn test_store_rejects_invalid_documents() {
    let mut store = DocumentStore::new();
    let mut doc = billable(DocumentKind::Invoice);
    doc.issuer.name.clear();

    let err = store.create(doc).unwrap_err();
    assert_eq!(
        err,
        StoreError::Invalid(ValidationError::Required {
            field: "issuer.name".to_string()
        })
    );
    assert!(store.is_empty());

    let id = store.create(billable(DocumentKind::Invoice)).unwrap().id;
    let mut stale = billable(DocumentKind::Invoice);
    stale.items[0].unit_price = dec("1");
    assert!(matches!(
        store.update(id, stale),
        Err(StoreError::Invalid(ValidationError::AmountMismatch { .. }))
    ));
    assert_eq!(
        store.update(99, billable(DocumentKind::Invoice)).unwrap_err(),
        StoreError::NotFound(99)
    );
}

#[test]
fn test_store_image_limit() {
    let mut store = DocumentStore::with_image_limit(2);
    let mut doc = billable(DocumentKind::Invoice);
    doc.issuer.logo = Some(ImageData::from_upload("image/png", &[1, 2, 3], 10).unwrap());

    assert!(matches!(
        store.create(doc),
        Err(StoreError::Invalid(ValidationError::ImageTooLarge { .. }))
    ));
}

#[test]
fn test_store_next_number() {
    let mut store = DocumentStore::new();
    assert_eq!(
        store.next_number(DocumentKind::Invoice, 2025).to_string(),
        "INV-2025-0001"
    );

    for number in ["INV-2025-0004", "INV-2024-0009", "QUO-2025-0002", "custom-7"] {
        let mut doc = billable(DocumentKind::Invoice);
        doc.number = number.to_string();
        store.create(doc).unwrap();
    }

    assert_eq!(
        store.next_number(DocumentKind::Invoice, 2025),
        DocumentNumber::generate(DocumentKind::Invoice, 2025, 5)
    );
    assert_eq!(
        store.next_number_for(DocumentKind::Quotation, jan_22()).to_string(),
        "QUO-2025-0003"
    );
}

#[test]
fn test_stored_document_json_is_flat() {
    let stored = StoredDocument {
        id: 7,
        created_at: "2025-01-22T08:00:00Z".parse().unwrap(),
        document: billable(DocumentKind::Invoice),
    };
    let value = serde_json::to_value(&stored).unwrap();

    assert_eq!(value["id"], 7);
    assert_eq!(value["createdAt"], "2025-01-22T08:00:00Z");
    assert_eq!(value["number"], "INV-2025-0001");
    assert_eq!(value["total"], "263.02");

    let back: StoredDocument = serde_json::from_value(value).unwrap();
    assert_eq!(back, stored);
}

#[test]
fn test_artifact_name_for_default_documents() {
    let doc = Document::new_default(DocumentKind::Quotation, jan_22());
    assert_eq!(artifact_file_name(&doc), "Quotation_QUO-2025-0001.pdf");
}
