//! In-memory document store
//!
//! Backs the CRUD API. Nothing is persisted; dropping the store drops the
//! documents.

use crate::image::DEFAULT_MAX_IMAGE_BYTES;
use crate::model::{Document, DocumentKind};
use crate::naming::DocumentNumber;
use crate::validation::validate_document_with_limit;
use crate::ValidationError;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;
use thiserror::Error;

/// Errors returned by [`DocumentStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(u64),

    #[error("Invalid document: {0}")]
    Invalid(#[from] ValidationError),
}

/// A stored document with its record metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub document: Document,
}

/// Documents keyed by id, listed in id order
#[derive(Debug)]
pub struct DocumentStore {
    documents: BTreeMap<u64, StoredDocument>,
    next_id: u64,
    max_image_bytes: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::with_image_limit(DEFAULT_MAX_IMAGE_BYTES)
    }

    /// Store that rejects embedded images larger than `max_image_bytes`
    pub fn with_image_limit(max_image_bytes: usize) -> Self {
        Self {
            documents: BTreeMap::new(),
            next_id: 1,
            max_image_bytes,
        }
    }

    /// Validate and insert a document, stamped with the current time
    pub fn create(&mut self, document: Document) -> Result<&StoredDocument, StoreError> {
        self.create_at(document, DateTime::<Utc>::from(SystemTime::now()))
    }

    /// Validate and insert a document with an explicit creation time
    pub fn create_at(
        &mut self,
        document: Document,
        created_at: DateTime<Utc>,
    ) -> Result<&StoredDocument, StoreError> {
        validate_document_with_limit(&document, self.max_image_bytes)?;

        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(id, number = %document.number, "document created");

        let stored = self.documents.entry(id).or_insert(StoredDocument {
            id,
            created_at,
            document,
        });
        Ok(&*stored)
    }

    pub fn get(&self, id: u64) -> Result<&StoredDocument, StoreError> {
        self.documents.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// All documents in creation order
    pub fn list(&self) -> Vec<&StoredDocument> {
        self.documents.values().collect()
    }

    /// Replace a document, keeping its id and creation time
    pub fn update(&mut self, id: u64, document: Document) -> Result<&StoredDocument, StoreError> {
        let stored = self.documents.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        validate_document_with_limit(&document, self.max_image_bytes)?;

        stored.document = document;
        tracing::debug!(id, "document updated");
        Ok(&*stored)
    }

    /// Remove a document; returns whether it existed
    pub fn delete(&mut self, id: u64) -> bool {
        let removed = self.documents.remove(&id).is_some();
        if removed {
            tracing::debug!(id, "document deleted");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Next conventional number for `kind` in `year`
    ///
    /// One past the highest stored sequence of that kind and year; numbers
    /// that do not follow the convention are ignored.
    pub fn next_number(&self, kind: DocumentKind, year: i32) -> DocumentNumber {
        let highest = self
            .documents
            .values()
            .filter_map(|stored| DocumentNumber::parse(&stored.document.number))
            .filter(|number| number.kind == kind && number.year == year)
            .map(|number| number.sequence)
            .max()
            .unwrap_or(0);

        DocumentNumber::generate(kind, year, highest.saturating_add(1))
    }

    /// Next number for `kind` in the year of `today`
    pub fn next_number_for(&self, kind: DocumentKind, today: chrono::NaiveDate) -> DocumentNumber {
        self.next_number(kind, today.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn document(number: &str) -> Document {
        let mut doc = Document::new_default(
            DocumentKind::Invoice,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        doc.number = number.to_string();
        doc.issuer.name = "Acme Ltd".to_string();
        doc.client.name = "Globex".to_string();
        doc.update_item_unit_price("item-1", "80");
        doc
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let mut store = DocumentStore::new();
        let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let id = store
            .create_at(document("INV-2025-0001"), created_at)
            .unwrap()
            .id;

        let mut revised = document("INV-2025-0001");
        revised.set_tax_rate("16");
        let stored = store.update(id, revised).unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.created_at, created_at);
        assert_eq!(stored.document.total.to_string(), "92.80");
    }

    #[test]
    fn test_next_number_skips_other_kinds_and_years() {
        let mut store = DocumentStore::new();
        for number in ["INV-2025-0002", "INV-2025-0007", "INV-2026-0010", "QUO-2025-0003"] {
            store.create(document(number)).unwrap();
        }

        assert_eq!(
            store.next_number(DocumentKind::Invoice, 2025).to_string(),
            "INV-2025-0008"
        );
        assert_eq!(
            store
                .next_number_for(
                    DocumentKind::Quotation,
                    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
                )
                .to_string(),
            "QUO-2025-0004"
        );
        assert_eq!(
            store.next_number(DocumentKind::Quotation, 2024).to_string(),
            "QUO-2024-0001"
        );
    }

    #[test]
    fn test_delete_missing_document() {
        let mut store = DocumentStore::new();
        assert!(!store.delete(1));
        assert_eq!(store.get(1).unwrap_err(), StoreError::NotFound(1));
    }
}
