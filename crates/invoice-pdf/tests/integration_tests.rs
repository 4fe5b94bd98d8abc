//! Integration tests for invoice-pdf
//!
//! Documents are rendered to bytes and read back with lopdf to inspect the
//! page content streams.

use chrono::NaiveDate;
use image::{DynamicImage, Rgba, RgbaImage};
use invoice_core::{Document, DocumentKind, ImageData};
use invoice_pdf::{
    is_monotonic, render, render_with_sink, BlockKind, ColumnFractions, Diagnostic,
    DiagnosticSource, LayoutConfig, RenderError, RenderOptions,
};
use lopdf::Document as PdfFile;
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn create_test_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(60, 30, Rgba([20, 80, 160, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn invoice() -> Document {
    let mut doc = Document::new_default(
        DocumentKind::Invoice,
        NaiveDate::from_ymd_opt(2025, 1, 22).unwrap(),
    );
    doc.issuer.name = "Acme Ltd".to_string();
    doc.issuer.address = Some("12 Main St\nNairobi".to_string());
    doc.issuer.email = Some("billing@acme.test".to_string());
    doc.client.name = "Globex".to_string();

    doc.update_item_description("item-1", "Consulting");
    doc.update_item_quantity("item-1", "2");
    doc.update_item_unit_price("item-1", "100");
    let second = doc.add_item();
    doc.update_item_description(&second, "Hosting");
    doc.update_item_unit_price(&second, "50.50");
    doc.set_tax_rate("10");
    doc.set_discount("5");
    doc
}

/// Decoded content stream of a page (1-indexed)
fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = PdfFile::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn shows(content: &str, text: &str) -> bool {
    content.contains(&format!("({text}) Tj"))
}

fn blocks(placements: &[invoice_pdf::Placement]) -> Vec<BlockKind> {
    placements.iter().map(|p| p.block).collect()
}

#[test]
fn test_invoice_renders_all_sections() {
    let mut doc = invoice();
    doc.notes = Some("Thanks for the quick turnaround.".to_string());
    doc.payment_instructions = Some("Account 0123456789".to_string());

    let output = render(&doc, &RenderOptions::default()).unwrap();
    assert!(output.bytes.starts_with(b"%PDF-1.5"));
    assert_eq!(output.page_count, 1);
    assert!(output.diagnostics.is_empty());

    let content = page_content(&output.bytes, 1);
    for text in [
        "Acme Ltd",
        "INVOICE",
        "# INV-2025-0001",
        "12 Main St",
        "Nairobi",
        "BILL TO",
        "Globex",
        "January 22, 2025",
        "Due Date:",
        "February 21, 2025",
        "Payment Terms:",
        "Net 30",
        "Consulting",
        "Ksh 200.00",
        "Ksh 50.50",
        "Ksh 250.50",
        "Ksh 25.05",
        "-Ksh 12.53",
        "Total",
        "Ksh 263.02",
        "NOTES",
        "PAYMENT INFORMATION",
        "Payment Method: Bank Transfer",
        "Account 0123456789",
        "Page 1 of 1",
    ] {
        assert!(shows(&content, text), "missing {text:?}");
    }
    assert!(shows(&content, "Discount \\(5%\\)"));
    assert!(shows(&content, "Tax \\(10%\\)"));
    assert!(content.contains("Payment is due by the date specified."));

    assert_eq!(
        blocks(&output.placements),
        vec![
            BlockKind::Title,
            BlockKind::Heading,
            BlockKind::Issuer,
            BlockKind::Client,
            BlockKind::Dates,
            BlockKind::PaymentTerms,
            BlockKind::TableHeader,
            BlockKind::ItemRow(0),
            BlockKind::ItemRow(1),
            BlockKind::Totals,
            BlockKind::Notes,
            BlockKind::PaymentInstructions,
        ]
    );
    assert!(is_monotonic(&output.placements));
}

#[test]
fn test_zero_rates_hide_tax_and_discount() {
    let mut doc = invoice();
    doc.set_tax_rate("0");
    doc.set_discount("");

    let output = render(&doc, &RenderOptions::default()).unwrap();
    let content = page_content(&output.bytes, 1);

    assert!(shows(&content, "Subtotal"));
    assert!(!content.contains("(Tax "));
    assert!(!content.contains("(Discount "));
    assert!(shows(&content, "Ksh 250.50"));
}

#[test]
fn test_quotation_hides_payment_sections() {
    let mut doc = invoice();
    doc.set_kind(DocumentKind::Quotation);
    doc.number = "QUO-2025-0042".to_string();
    doc.payment_instructions = Some("Account 0123456789".to_string());
    assert!(doc.due_date.is_some());

    let output = render(&doc, &RenderOptions::default()).unwrap();
    let content = page_content(&output.bytes, 1);

    assert!(shows(&content, "QUOTATION"));
    assert!(shows(&content, "January 22, 2025"));
    assert!(!content.contains("Due Date"));
    assert!(!content.contains("February 21, 2025"));
    assert!(!content.contains("Payment Terms"));
    assert!(!content.contains("PAYMENT INFORMATION"));
    assert!(!content.contains("0123456789"));
    assert!(content.contains("This quotation is valid for 30 days"));

    let kinds = blocks(&output.placements);
    assert!(!kinds.contains(&BlockKind::PaymentTerms));
    assert!(!kinds.contains(&BlockKind::PaymentInstructions));
    assert!(kinds.contains(&BlockKind::Totals));
}

#[test]
fn test_corrupt_logo_falls_back_to_title() {
    let mut doc = invoice();
    // Valid base64, but the bytes are not an image
    doc.issuer.logo = Some(ImageData::from_uri("data:image/png;base64,bm90IGFuIGltYWdlIGF0IGFsbA=="));

    let mut sink: Vec<Diagnostic> = Vec::new();
    let output = render_with_sink(&doc, &RenderOptions::default(), &mut sink).unwrap();

    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].source, DiagnosticSource::Logo);
    assert_eq!(sink, output.diagnostics);

    let kinds = blocks(&output.placements);
    assert_eq!(kinds[0], BlockKind::Title);
    assert!(!kinds.contains(&BlockKind::Logo));

    let content = page_content(&output.bytes, 1);
    assert!(shows(&content, "Acme Ltd"));
    assert!(!content.contains(" Do"));
    assert!(shows(&content, "Ksh 263.02"));
}

#[test]
fn test_undecodable_data_uri_is_a_diagnostic() {
    let mut doc = invoice();
    doc.issuer.logo = Some(ImageData::from_uri("https://example.com/logo.png"));

    let output = render(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.placements[0].block, BlockKind::Title);
}

#[test]
fn test_logo_is_embedded() {
    let mut doc = invoice();
    doc.issuer.logo = Some(ImageData::from_upload("image/png", &create_test_png(), 1 << 20).unwrap());

    let output = render(&doc, &RenderOptions::default()).unwrap();
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.placements[0].block, BlockKind::Logo);

    let content = page_content(&output.bytes, 1);
    // 60x30 fitted into the 140x60 logo box
    assert!(content.contains("120 0 0 60"));
    assert!(content.contains(" Do"));
    // Issuer block only; no text title next to the logo
    assert_eq!(content.matches("(Acme Ltd) Tj").count(), 1);
}

#[test]
fn test_signature_block() {
    let mut doc = invoice();
    doc.signature_image =
        Some(ImageData::from_upload("image/png", &create_test_png(), 1 << 20).unwrap());
    doc.signee_name = Some("Jane Wanjiku".to_string());

    let output = render(&doc, &RenderOptions::default()).unwrap();
    let content = page_content(&output.bytes, 1);

    assert!(shows(&content, "SIGNATURE"));
    assert!(shows(&content, "Jane Wanjiku"));
    assert!(content.contains(" Do"));
    assert_eq!(output.placements.last().unwrap().block, BlockKind::Signature);
}

#[test]
fn test_corrupt_signature_keeps_rule_and_label() {
    let mut doc = invoice();
    doc.signature_image = Some(ImageData::from_uri("data:image/jpeg;base64,/9j/AAAA"));

    let output = render(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].source, DiagnosticSource::Signature);

    let content = page_content(&output.bytes, 1);
    assert!(shows(&content, "Authorized Signature"));
    assert!(!content.contains(" Do"));
}

#[test]
fn test_long_documents_paginate() {
    let mut doc = invoice();
    for i in 0..80 {
        let id = doc.add_item();
        doc.update_item_description(&id, &format!("Line item number {i}"));
        doc.update_item_unit_price(&id, "10");
    }
    doc.notes = Some("Closing remarks. ".repeat(60));

    let output = render(&doc, &RenderOptions::default()).unwrap();
    assert!(output.page_count > 1);
    assert!(is_monotonic(&output.placements));

    let headers = blocks(&output.placements)
        .into_iter()
        .filter(|block| *block == BlockKind::TableHeader)
        .count();
    assert!(headers >= 2);

    let pdf = PdfFile::load_mem(&output.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), output.page_count);

    for page in 1..=output.page_count {
        let content = page_content(&output.bytes, page as u32);
        let marker = format!("Page {page} of {}", output.page_count);
        assert!(shows(&content, &marker), "page {page} lacks its marker");
        assert!(content.contains("Thank you for your business!"));
    }

    // Every row ends above the bottom margin
    let layout = LayoutConfig::default();
    for placement in &output.placements {
        assert!(placement.y >= layout.margin_top);
        assert!(placement.y < layout.content_bottom());
    }
}

#[test]
fn test_long_descriptions_wrap_inside_column() {
    let mut doc = invoice();
    doc.update_item_description(
        "item-1",
        "Design, build and deploy the customer portal including authentication and reporting",
    );

    let output = render(&doc, &RenderOptions::default()).unwrap();
    let rows: Vec<_> = output
        .placements
        .iter()
        .filter(|p| matches!(p.block, BlockKind::ItemRow(_)))
        .collect();

    let layout = LayoutConfig::default();
    let single_row = layout.line_height + 2.0 * layout.cell_padding;
    assert!(rows[1].y - rows[0].y > single_row);
}

#[test]
fn test_custom_currency() {
    let options =
        RenderOptions::from_json(r#"{"currency": {"prefix": "$", "negativeStyle": "parentheses"}}"#)
            .unwrap();

    let output = render(&invoice(), &options).unwrap();
    let content = page_content(&output.bytes, 1);
    assert!(shows(&content, "$263.02"));
    assert!(shows(&content, "\\($12.53\\)"));
}

#[test]
fn test_invalid_layout_is_fatal() {
    let options = RenderOptions {
        layout: LayoutConfig {
            columns: ColumnFractions {
                description: 0.6,
                ..ColumnFractions::default()
            },
            ..LayoutConfig::default()
        },
        ..RenderOptions::default()
    };

    assert!(matches!(
        render(&invoice(), &options),
        Err(RenderError::Config(_))
    ));
}

#[test]
fn test_layout_without_footer_room_is_fatal() {
    let options = RenderOptions::from_json(r#"{"layout": {"marginBottom": 0}}"#);
    assert!(matches!(options, Err(RenderError::Config(_))));

    let options = RenderOptions {
        layout: LayoutConfig {
            margin_bottom: 0.0,
            ..LayoutConfig::default()
        },
        ..RenderOptions::default()
    };
    assert!(matches!(
        render(&invoice(), &options),
        Err(RenderError::Config(_))
    ));
}

#[test]
fn test_renders_are_independent() {
    let doc = invoice();
    let options = RenderOptions::default();
    let first = render(&doc, &options).unwrap();
    let second = render(&doc, &options).unwrap();

    assert_eq!(first.page_count, second.page_count);
    assert_eq!(first.placements, second.placements);
}
