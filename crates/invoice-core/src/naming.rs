//! Document numbers and output file names

use crate::model::{Document, DocumentKind};
use std::fmt;

/// A conventional document number such as `INV-2025-0007`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentNumber {
    pub kind: DocumentKind,
    pub year: i32,
    pub sequence: u32,
}

impl DocumentNumber {
    /// Build the number for `sequence` within `year`
    pub fn generate(kind: DocumentKind, year: i32, sequence: u32) -> Self {
        Self {
            kind,
            year,
            sequence,
        }
    }

    /// Parse `PREFIX-YYYY-NNNN`; free-form numbers yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().splitn(3, '-');
        let kind = match parts.next()? {
            "INV" => DocumentKind::Invoice,
            "QUO" => DocumentKind::Quotation,
            _ => return None,
        };
        let year = parts.next()?;
        let sequence = parts.next()?;
        if year.len() != 4 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            kind,
            year: year.parse().ok()?,
            sequence: sequence.parse().ok()?,
        })
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{:04}",
            self.kind.number_prefix(),
            self.year,
            self.sequence
        )
    }
}

/// File name for the rendered artifact: `Invoice_INV-2025-0001.pdf`
///
/// Characters outside `[A-Za-z0-9._-]` in the number become `_`; an empty
/// number becomes `draft`.
pub fn artifact_file_name(doc: &Document) -> String {
    let number: String = doc
        .number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let number = if number.is_empty() {
        "draft".to_string()
    } else {
        number
    };

    format!("{}_{number}.pdf", doc.kind.title())
}
