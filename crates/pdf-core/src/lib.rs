//! PDF Core - Low-level PDF generation
//!
//! This crate provides functionality for:
//! - Building new documents page by page
//! - Placing text with the standard Helvetica faces and measuring it
//! - Filling bands and stroking rules
//! - Inserting images (JPEG, PNG with transparency)
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontWeight, PdfDocument};
//!
//! let mut doc = PdfDocument::a4();
//! let page = doc.add_page()?;
//! doc.set_font(FontWeight::Bold, 24.0);
//! doc.insert_text("INVOICE", page, 40.0, 60.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use document::{Color, PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use font::{encode_win_ansi, FontWeight, StandardFont};
pub use image::{calculate_scaled_dimensions, detect_format, ImageFormat, ImageScaleMode, ImageXObject};
pub use text::{generate_text_operators, wrap_text_to_width, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
