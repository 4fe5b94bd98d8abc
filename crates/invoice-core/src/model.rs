//! Invoice / quotation document model
//!
//! One tagged structure covers both kinds; [`DocumentKind`] only decides
//! which optional sections are shown and how the footer reads. Field names
//! serialize in camelCase to match the browser editor's JSON.

use crate::image::ImageData;
use crate::money::{serde_number, Amount};
use crate::naming::DocumentNumber;
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice or quotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Quotation,
}

impl DocumentKind {
    /// Heading printed on the document, e.g. `INVOICE`
    pub fn heading(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::Quotation => "QUOTATION",
        }
    }

    /// Title-case name used in file names, e.g. `Invoice`
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Quotation => "Quotation",
        }
    }

    /// Prefix of generated document numbers
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Quotation => "QUO",
        }
    }

    /// Due date and payment sections only exist on invoices
    pub fn shows_payment_sections(&self) -> bool {
        matches!(self, DocumentKind::Invoice)
    }
}

/// The company issuing the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageData>,
}

/// The billed client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One row of billable or quoted work
///
/// `amount` is derived: it always equals `quantity * unit_price` after
/// [`crate::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "serde_number")]
    pub quantity: Decimal,
    #[serde(with = "serde_number")]
    pub unit_price: Decimal,
    #[serde(default, with = "serde_number")]
    pub amount: Decimal,
}

impl LineItem {
    /// A blank row: quantity 1, price 0
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            quantity: Decimal::ONE,
            unit_price: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}

/// An invoice or quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "documentKind", default)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub number: String,
    #[serde(with = "date_format")]
    pub issue_date: NaiveDate,
    #[serde(default, with = "optional_date_format", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub issuer: Issuer,
    #[serde(default)]
    pub client: Client,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_percent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<String>,
    #[serde(default)]
    pub subtotal: Amount,
    #[serde(default)]
    pub tax_amount: Amount,
    #[serde(default)]
    pub discount_amount: Amount,
    #[serde(default)]
    pub total: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<ImageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signee_name: Option<String>,
}

/// Days between issue date and due date on a fresh invoice
pub const DEFAULT_PAYMENT_DAYS: u64 = 30;

impl Document {
    /// A fresh document as the editor opens it
    ///
    /// One blank line item, number sequence 1 of `today`'s year, due date
    /// 30 days out, "Bank Transfer" / "Net 30" payment defaults and zeroed
    /// totals.
    pub fn new_default(kind: DocumentKind, today: NaiveDate) -> Self {
        let mut doc = Self {
            kind,
            number: DocumentNumber::generate(kind, today.year(), 1).to_string(),
            issue_date: today,
            due_date: Some(
                today
                    .checked_add_days(Days::new(DEFAULT_PAYMENT_DAYS))
                    .unwrap_or(today),
            ),
            issuer: Issuer::default(),
            client: Client::default(),
            items: vec![LineItem::blank("item-1")],
            tax_rate_percent: Some("0".to_string()),
            discount_percent: Some("0".to_string()),
            subtotal: Amount::zero(),
            tax_amount: Amount::zero(),
            discount_amount: Amount::zero(),
            total: Amount::zero(),
            notes: None,
            payment_method: Some("Bank Transfer".to_string()),
            payment_terms: Some("Net 30".to_string()),
            payment_instructions: None,
            signature_image: None,
            signee_name: None,
        };
        doc.recompute();
        doc
    }

    /// Parse a document from the editor's JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to the editor's JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Look up an item by id
    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Accepts `YYYY-MM-DD` or a full ISO timestamp, writes `YYYY-MM-DD`
pub(crate) mod date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }

    /// Date part of `2025-01-22` or `2025-01-22T08:30:00.000Z`
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, FORMAT).ok()
    }
}

pub(crate) mod optional_date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::date_format::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Empty strings and null both mean "no date"
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::date_format::parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
        }
    }
}
