//! Invoice PDF - Page layout for invoices and quotations
//!
//! This crate provides:
//! - Layout configuration with JSON overrides
//! - A vertical cursor that breaks pages when content runs long
//! - The block sequence shared by invoices and quotations
//! - Diagnostics for images that had to be skipped
//!
//! # Example
//!
//! ```ignore
//! use invoice_core::{recompute, Document};
//! use invoice_pdf::{render, RenderOptions};
//!
//! let doc = recompute(&Document::from_json(json)?);
//! let output = render(&doc, &RenderOptions::default())?;
//! std::fs::write(invoice_core::artifact_file_name(&doc), &output.bytes)?;
//! ```

mod config;
mod diagnostics;
mod layout;
mod renderer;

pub use config::{BoxSize, ColumnFractions, LayoutConfig, RenderOptions, Rgb};
pub use diagnostics::{Diagnostic, DiagnosticSource, DiagnosticsSink, TracingSink};
pub use layout::{is_monotonic, BlockKind, Cursor, Placement};

use invoice_core::Document;
use renderer::DocumentRenderer;
use thiserror::Error;

/// Errors that stop a render
///
/// Undecodable images are not errors; they are reported as diagnostics.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid layout configuration: {0}")]
    Config(String),
}

/// Result type for rendering
pub type Result<T> = std::result::Result<T, RenderError>;

/// A finished render
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The PDF file
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Where each block started, in emission order
    pub placements: Vec<Placement>,
    /// Elements skipped during the render
    pub diagnostics: Vec<Diagnostic>,
}

/// Render a document, logging skipped elements through `tracing`
///
/// The document is drawn as given; run [`invoice_core::recompute`] first if
/// its totals may be stale.
pub fn render(document: &Document, options: &RenderOptions) -> Result<RenderOutput> {
    render_with_sink(document, options, &mut TracingSink)
}

/// Render a document, reporting skipped elements to `sink`
///
/// # Arguments
/// * `document` - Document to draw
/// * `options` - Layout and currency settings
/// * `sink` - Receives a diagnostic for every skipped image
pub fn render_with_sink(
    document: &Document,
    options: &RenderOptions,
    sink: &mut dyn DiagnosticsSink,
) -> Result<RenderOutput> {
    DocumentRenderer::new(document, options, sink)?.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RenderError::Config("column fractions sum to 0.9, expected 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid layout configuration: column fractions sum to 0.9, expected 1"
        );
    }
}
