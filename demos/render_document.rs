//! Render a document JSON file to PDF
//!
//! Usage:
//!   cargo run -p invoice-pdf --example render_document -- invoice.json [options.json]
//!
//! The PDF is written next to the input, named after the document kind and
//! number. Set `RUST_LOG=debug` to follow the layout.

use invoice_core::{artifact_file_name, recompute, Document};
use invoice_pdf::{render, RenderOptions};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: render_document <document.json> [options.json]")?;
    let options = match args.next() {
        Some(path) => RenderOptions::from_json(&std::fs::read_to_string(path)?)?,
        None => RenderOptions::default(),
    };

    let document = Document::from_json(&std::fs::read_to_string(&input)?)?;
    let document = recompute(&document);

    let output = render(&document, &options)?;
    let target = Path::new(&input)
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(artifact_file_name(&document));
    std::fs::write(&target, &output.bytes)?;

    tracing::info!(
        path = %target.display(),
        pages = output.page_count,
        skipped = output.diagnostics.len(),
        "wrote document"
    );
    Ok(())
}
