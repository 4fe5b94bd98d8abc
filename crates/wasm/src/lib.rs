//! WASM bindings for the invoice editor
//!
//! This crate provides a JavaScript-friendly API for:
//! - Creating and recomputing documents as the form changes
//! - Formatting money the way the editor and PDF show it
//! - Rendering the PDF and naming the download
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { newDocument, recompute, render, fileName } from 'invoice-wasm';
//!
//! await init();
//!
//! let doc = newDocument('invoice', '2025-01-22');
//! doc.items[0].quantity = 2;
//! doc.items[0].unitPrice = 100;
//! doc = recompute(doc);
//!
//! const output = render(doc, { layout: { marginLeft: 50 } });
//! download(output.bytes, fileName(doc));
//! console.log(output.diagnostics);
//! ```

use chrono::NaiveDate;
use invoice_core::{Document, DocumentKind};
use invoice_pdf::{Diagnostic, DiagnosticsSink, RenderOptions};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn document_from_js(value: JsValue) -> Result<Document, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn document_to_js(doc: &Document) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(doc).map_err(to_js_error)
}

/// Create a fresh document as the editor opens it
///
/// @param kind - "invoice" or "quotation"
/// @param today - Issue date as YYYY-MM-DD
/// @returns Document object
#[wasm_bindgen(js_name = newDocument)]
pub fn new_document(kind: &str, today: &str) -> Result<JsValue, JsValue> {
    let kind = match kind {
        "invoice" => DocumentKind::Invoice,
        "quotation" => DocumentKind::Quotation,
        other => return Err(JsValue::from_str(&format!("Unknown document kind: {other}"))),
    };
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d").map_err(to_js_error)?;
    document_to_js(&Document::new_default(kind, today))
}

/// Recompute item amounts and totals
///
/// @param doc - Document object
/// @returns A copy with every derived field consistent
#[wasm_bindgen]
pub fn recompute(doc: JsValue) -> Result<JsValue, JsValue> {
    let doc = document_from_js(doc)?;
    document_to_js(&invoice_core::recompute(&doc))
}

/// Check a document before saving it
///
/// @param doc - Document object
/// @throws A message naming the offending field
#[wasm_bindgen]
pub fn validate(doc: JsValue) -> Result<(), JsValue> {
    let doc = document_from_js(doc)?;
    invoice_core::validate_document(&doc).map_err(to_js_error)
}

/// Format an amount with the default currency settings
///
/// @param amount - Amount as a number
/// @returns e.g. "Ksh 1,234.50"
#[wasm_bindgen(js_name = formatCurrency)]
pub fn format_currency(amount: f64) -> String {
    invoice_core::format_currency(invoice_core::decimal_from_f64(amount))
}

/// Download file name for a document
///
/// @param doc - Document object
/// @returns e.g. "Invoice_INV-2025-0001.pdf"
#[wasm_bindgen(js_name = fileName)]
pub fn file_name(doc: JsValue) -> Result<String, JsValue> {
    let doc = document_from_js(doc)?;
    Ok(invoice_core::artifact_file_name(&doc))
}

/// Writes skipped-element diagnostics to the browser console
struct ConsoleSink;

impl DiagnosticsSink for ConsoleSink {
    fn record(&mut self, diagnostic: Diagnostic) {
        web_sys::console::warn_1(&JsValue::from_str(&diagnostic.to_string()));
    }
}

/// Rendered PDF plus what was skipped
#[wasm_bindgen]
pub struct RenderResult {
    bytes: Vec<u8>,
    page_count: usize,
    file_name: String,
    diagnostics: Vec<Diagnostic>,
}

#[wasm_bindgen]
impl RenderResult {
    /// PDF bytes (Uint8Array)
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.bytes.as_slice())
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    /// Array of `{ source, message }` objects
    #[wasm_bindgen(getter)]
    pub fn diagnostics(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.diagnostics).map_err(to_js_error)
    }
}

/// Render a document to PDF
///
/// @param doc - Document object (totals should already be recomputed)
/// @param options - Optional partial RenderOptions object
/// @returns RenderResult
#[wasm_bindgen]
pub fn render(doc: JsValue, options: JsValue) -> Result<RenderResult, JsValue> {
    let doc = document_from_js(doc)?;
    let options: RenderOptions = if options.is_undefined() || options.is_null() {
        RenderOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
    };

    let output =
        invoice_pdf::render_with_sink(&doc, &options, &mut ConsoleSink).map_err(to_js_error)?;

    Ok(RenderResult {
        bytes: output.bytes,
        page_count: output.page_count,
        file_name: invoice_core::artifact_file_name(&doc),
        diagnostics: output.diagnostics,
    })
}
