//! Document renderer
//!
//! One renderer serves both document kinds. Blocks are emitted in a fixed
//! order and each is skipped when its data is missing or the kind hides it;
//! shared blocks such as the item table and totals take the same code path
//! for invoices and quotations.

use crate::config::{BoxSize, LayoutConfig, RenderOptions};
use crate::diagnostics::{Diagnostic, DiagnosticSource, DiagnosticsSink};
use crate::layout::{BlockKind, Cursor};
use crate::{RenderOutput, Result};
use invoice_core::{
    format_date_long, format_percent, parse_lenient, CurrencyFormat, Decimal, Document,
    DocumentKind, ImageData,
};
use pdf_core::{
    wrap_text_to_width, Align, Color, FontWeight, ImageScaleMode, PdfDocument, PdfError,
    StandardFont,
};

const INVOICE_FOOTER: &str =
    "Thank you for your business! Payment is due by the date specified.";
const QUOTATION_FOOTER: &str = "Thank you for considering our services. This quotation is valid for 30 days from the date of issue.";
const DEFAULT_SIGNEE: &str = "Authorized Signature";

/// Width reserved for labels in label/value rows
const LABEL_WIDTH: f64 = 90.0;
/// Gap between an image box and the signature rule
const RULE_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    weight: FontWeight,
    size: f32,
    color: Color,
}

impl TextStyle {
    fn font(&self) -> StandardFont {
        StandardFont::from_weight(self.weight)
    }

    fn width(&self, text: &str) -> f64 {
        self.font().text_width_points(text, self.size)
    }
}

/// A line of text in a stacked block
struct Line {
    text: String,
    style: TextStyle,
}

/// Lays out one document onto a fresh PDF
pub(crate) struct DocumentRenderer<'a, 's> {
    document: &'a Document,
    layout: &'a LayoutConfig,
    currency: &'a CurrencyFormat,
    pdf: PdfDocument,
    cursor: Cursor,
    diagnostics: Vec<Diagnostic>,
    sink: &'s mut dyn DiagnosticsSink,
}

impl<'a, 's> DocumentRenderer<'a, 's> {
    /// Validate the layout and open the first page
    pub fn new(
        document: &'a Document,
        options: &'a RenderOptions,
        sink: &'s mut dyn DiagnosticsSink,
    ) -> Result<Self> {
        let layout = &options.layout;
        layout.validate()?;

        let mut pdf = PdfDocument::new(layout.page_width, layout.page_height);
        pdf.set_title(&format!("{} {}", document.kind.title(), document.number));
        let page = pdf.add_page()?;

        Ok(Self {
            document,
            layout,
            currency: &options.currency,
            pdf,
            cursor: Cursor::new(page, layout.margin_top, layout.content_bottom()),
            diagnostics: Vec::new(),
            sink,
        })
    }

    /// Emit every block, draw the footers and serialize
    pub fn render(mut self) -> Result<RenderOutput> {
        tracing::debug!(
            number = %self.document.number,
            kind = ?self.document.kind,
            items = self.document.items.len(),
            "rendering document"
        );

        self.render_header()?;
        self.render_parties()?;
        self.render_dates()?;
        self.render_item_table()?;
        self.render_totals()?;
        self.render_notes()?;
        self.render_payment_instructions()?;
        self.render_signature()?;
        self.render_footers()?;

        let bytes = self.pdf.to_bytes()?;
        let page_count = self.pdf.page_count();
        tracing::debug!(pages = page_count, bytes = bytes.len(), "render complete");

        Ok(RenderOutput {
            bytes,
            page_count,
            placements: self.cursor.into_placements(),
            diagnostics: self.diagnostics,
        })
    }

    // Styles

    fn style(&self, weight: FontWeight, size: f32) -> TextStyle {
        TextStyle {
            weight,
            size,
            color: self.layout.text_color.to_color(),
        }
    }

    fn body(&self) -> TextStyle {
        self.style(FontWeight::Regular, self.layout.body_font_size)
    }

    fn strong(&self) -> TextStyle {
        self.style(FontWeight::Bold, self.layout.body_font_size)
    }

    fn muted(&self) -> TextStyle {
        TextStyle {
            color: self.layout.muted_color.to_color(),
            ..self.body()
        }
    }

    fn section_heading(&self) -> TextStyle {
        TextStyle {
            color: self.layout.muted_color.to_color(),
            ..self.style(FontWeight::Bold, self.layout.heading_font_size)
        }
    }

    // Drawing primitives

    fn draw_text_on(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        baseline: f64,
        align: Align,
        style: TextStyle,
    ) -> Result<()> {
        self.pdf.set_font(style.weight, style.size);
        self.pdf.set_text_color(style.color);
        self.pdf.insert_text(text, page, x, baseline, align)?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        baseline: f64,
        align: Align,
        style: TextStyle,
    ) -> Result<()> {
        self.draw_text_on(self.cursor.page(), text, x, baseline, align, style)
    }

    /// Draw stacked lines from `top`, one line height each
    fn draw_lines(&mut self, x: f64, top: f64, lines: &[Line], align: Align) -> Result<()> {
        let line_height = self.layout.line_height;
        for (i, line) in lines.iter().enumerate() {
            let baseline = top + i as f64 * line_height + line.style.size as f64;
            self.draw_text(&line.text, x, baseline, align, line.style)?;
        }
        Ok(())
    }

    fn lines_height(&self, count: usize) -> f64 {
        count as f64 * self.layout.line_height
    }

    /// Embed an image fitted into `size`, or report why it was skipped
    ///
    /// # Returns
    /// The drawn (width, height), or `None` when the image was skipped
    fn embed_image(
        &mut self,
        source: DiagnosticSource,
        image: &ImageData,
        x: f64,
        top: f64,
        size: BoxSize,
    ) -> Result<Option<(f64, f64)>> {
        let decoded = match image.decode() {
            Ok(decoded) => decoded,
            Err(err) => {
                self.report(source, err.to_string());
                return Ok(None);
            }
        };

        let page = self.cursor.page();
        match self.pdf.insert_image_scaled(
            &decoded.bytes,
            page,
            x,
            top,
            size.width,
            size.height,
            ImageScaleMode::FitBox,
        ) {
            Ok(drawn) => Ok(Some(drawn)),
            Err(PdfError::ImageError(reason)) => {
                self.report(source, reason);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn report(&mut self, source: DiagnosticSource, message: String) {
        let diagnostic = Diagnostic { source, message };
        self.sink.record(diagnostic.clone());
        self.diagnostics.push(diagnostic);
    }

    // Blocks

    /// Logo (or text title) on the left, kind label and number on the right
    fn render_header(&mut self) -> Result<()> {
        let top = self.cursor.y();
        let left = self.layout.content_left();
        let right = self.layout.content_right();

        let logo = match self.document.issuer.logo.clone() {
            Some(logo) => {
                let logo_box = self.layout.logo_box;
                self.embed_image(DiagnosticSource::Logo, &logo, left, top, logo_box)?
            }
            None => None,
        };

        let left_height = match logo {
            Some((_, height)) => {
                self.cursor.place(BlockKind::Logo);
                height
            }
            None => {
                self.cursor.place(BlockKind::Title);
                let title = if self.document.issuer.name.trim().is_empty() {
                    self.document.kind.title().to_string()
                } else {
                    self.document.issuer.name.clone()
                };
                let style = self.style(FontWeight::Bold, self.layout.title_font_size * 0.75);
                let baseline = top + style.size as f64;
                self.draw_text(&title, left, baseline, Align::Left, style)?;
                style.size as f64 + self.layout.line_height * 0.5
            }
        };

        self.cursor.place(BlockKind::Heading);
        let heading = Line {
            text: self.document.kind.heading().to_string(),
            style: self.style(FontWeight::Bold, self.layout.title_font_size),
        };
        let heading_baseline = top + heading.style.size as f64;
        self.draw_text(&heading.text, right, heading_baseline, Align::Right, heading.style)?;

        let number_baseline = heading_baseline + self.layout.line_height + 2.0;
        if !self.document.number.trim().is_empty() {
            let number = format!("# {}", self.document.number);
            let style = self.muted();
            self.draw_text(&number, right, number_baseline, Align::Right, style)?;
        }
        let right_height = number_baseline - top + self.layout.line_height * 0.5;

        self.cursor
            .advance(left_height.max(right_height) + self.layout.block_gap);
        Ok(())
    }

    fn party_lines(
        &self,
        heading: Option<&str>,
        name: &str,
        address: Option<&str>,
        email: Option<&str>,
    ) -> Vec<Line> {
        let mut lines = Vec::new();
        if let Some(heading) = heading {
            lines.push(Line {
                text: heading.to_string(),
                style: self.section_heading(),
            });
        }
        lines.push(Line {
            text: name.to_string(),
            style: self.strong(),
        });
        // Addresses break only where the user typed a newline
        if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
            for line in address.split('\n') {
                lines.push(Line {
                    text: line.trim_end_matches('\r').to_string(),
                    style: self.body(),
                });
            }
        }
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            lines.push(Line {
                text: email.to_string(),
                style: self.muted(),
            });
        }
        lines
    }

    /// Issuer in the left column, client in the right column
    fn render_parties(&mut self) -> Result<()> {
        let issuer = &self.document.issuer;
        let client = &self.document.client;
        let issuer_lines = self.party_lines(
            None,
            &issuer.name,
            issuer.address.as_deref(),
            issuer.email.as_deref(),
        );
        let client_lines = self.party_lines(
            Some("BILL TO"),
            &client.name,
            client.address.as_deref(),
            client.email.as_deref(),
        );

        let height = self.lines_height(issuer_lines.len().max(client_lines.len()));
        self.cursor.ensure(&mut self.pdf, height)?;
        let top = self.cursor.y();

        self.cursor.place(BlockKind::Issuer);
        self.draw_lines(self.layout.content_left(), top, &issuer_lines, Align::Left)?;
        self.cursor.place(BlockKind::Client);
        self.draw_lines(self.layout.right_column_x, top, &client_lines, Align::Left)?;

        self.cursor.advance(height + self.layout.block_gap);
        Ok(())
    }

    /// Draw `label` in bold with `value` beside it
    fn draw_label_value(&mut self, x: f64, top: f64, label: &str, value: &str) -> Result<()> {
        let strong = self.strong();
        let body = self.body();
        let baseline = top + strong.size as f64;
        self.draw_text(label, x, baseline, Align::Left, strong)?;
        self.draw_text(value, x + LABEL_WIDTH, baseline, Align::Left, body)
    }

    /// Dates on the left; payment terms and method on the right for invoices
    fn render_dates(&mut self) -> Result<()> {
        let doc = self.document;
        let invoice = doc.kind.shows_payment_sections();

        let mut dates = vec![("Issue Date:", format_date_long(doc.issue_date))];
        if invoice {
            if let Some(due) = doc.due_date {
                dates.push(("Due Date:", format_date_long(due)));
            }
        }

        let mut terms = Vec::new();
        if invoice {
            if let Some(value) = non_empty(doc.payment_terms.as_deref()) {
                terms.push(("Payment Terms:", value.to_string()));
            }
            if let Some(value) = non_empty(doc.payment_method.as_deref()) {
                terms.push(("Payment Method:", value.to_string()));
            }
        }

        let height = self.lines_height(dates.len().max(terms.len()));
        self.cursor.ensure(&mut self.pdf, height)?;
        let top = self.cursor.y();
        let line_height = self.layout.line_height;

        self.cursor.place(BlockKind::Dates);
        let left = self.layout.content_left();
        for (i, (label, value)) in dates.iter().enumerate() {
            self.draw_label_value(left, top + i as f64 * line_height, label, value)?;
        }

        if !terms.is_empty() {
            self.cursor.place(BlockKind::PaymentTerms);
            let right = self.layout.right_column_x;
            for (i, (label, value)) in terms.iter().enumerate() {
                self.draw_label_value(right, top + i as f64 * line_height, label, value)?;
            }
        }

        self.cursor.advance(height + self.layout.block_gap);
        Ok(())
    }

    fn draw_table_header(&mut self) -> Result<()> {
        let layout = self.layout;
        let top = self.cursor.y();
        let height = layout.table_header_height;
        let page = self.cursor.page();

        self.cursor.place(BlockKind::TableHeader);
        self.pdf.fill_rect(
            page,
            layout.content_left(),
            top,
            layout.content_width(),
            height,
            layout.header_fill.to_color(),
        )?;

        let style = TextStyle {
            color: layout.header_text_color.to_color(),
            ..self.strong()
        };
        let baseline = top + (height + style.size as f64 * 0.7) / 2.0;
        let [desc, qty, price, amount] = layout.column_bounds();
        let pad = layout.cell_padding;

        self.draw_text("Description", desc.0 + pad, baseline, Align::Left, style)?;
        self.draw_text("Qty", qty.0 + qty.1 / 2.0, baseline, Align::Center, style)?;
        self.draw_text("Unit Price", price.0 + price.1 - pad, baseline, Align::Right, style)?;
        self.draw_text("Amount", amount.0 + amount.1 - pad, baseline, Align::Right, style)?;

        self.cursor.advance(height);
        Ok(())
    }

    /// Header row, then one shaded-or-plain row per item
    ///
    /// The header is repeated at the top of every continuation page.
    fn render_item_table(&mut self) -> Result<()> {
        let layout = self.layout;
        let [desc, qty, price, amount] = layout.column_bounds();
        let pad = layout.cell_padding;
        let body = self.body();

        let rows: Vec<Vec<String>> = self
            .document
            .items
            .iter()
            .map(|item| {
                let lines =
                    wrap_text_to_width(&item.description, desc.1 - 2.0 * pad, |s| body.width(s));
                if lines.is_empty() {
                    vec![String::new()]
                } else {
                    lines
                }
            })
            .collect();
        let row_height = |lines: usize| lines as f64 * layout.line_height + 2.0 * pad;

        let first_row = rows.first().map(|r| row_height(r.len())).unwrap_or(0.0);
        self.cursor
            .ensure(&mut self.pdf, layout.table_header_height + first_row)?;
        self.draw_table_header()?;

        for (index, (item, description)) in self.document.items.iter().zip(&rows).enumerate() {
            let height = row_height(description.len());
            if self.cursor.ensure(&mut self.pdf, height)? {
                self.draw_table_header()?;
            }

            let top = self.cursor.y();
            self.cursor.place(BlockKind::ItemRow(index));
            if index % 2 == 1 {
                let page = self.cursor.page();
                self.pdf.fill_rect(
                    page,
                    layout.content_left(),
                    top,
                    layout.content_width(),
                    height,
                    layout.stripe_fill.to_color(),
                )?;
            }

            let baseline = top + pad + body.size as f64;
            for (i, line) in description.iter().enumerate() {
                let line_baseline = baseline + i as f64 * layout.line_height;
                self.draw_text(line, desc.0 + pad, line_baseline, Align::Left, body)?;
            }

            let quantity = item.quantity.normalize().to_string();
            let unit_price = self.currency.format(item.unit_price);
            let line_amount = self.currency.format(item.amount);
            self.draw_text(&quantity, qty.0 + qty.1 / 2.0, baseline, Align::Center, body)?;
            self.draw_text(&unit_price, price.0 + price.1 - pad, baseline, Align::Right, body)?;
            self.draw_text(&line_amount, amount.0 + amount.1 - pad, baseline, Align::Right, body)?;

            self.cursor.advance(height);
        }

        self.pdf.draw_hline(
            self.cursor.page(),
            layout.content_left(),
            layout.content_right(),
            self.cursor.y(),
            0.5,
            layout.rule_color.to_color(),
        )?;
        self.cursor.advance(layout.block_gap);
        Ok(())
    }

    /// Right-aligned label/value pairs ending in an emphasized total
    fn render_totals(&mut self) -> Result<()> {
        let doc = self.document;
        let layout = self.layout;

        let mut rows = vec![("Subtotal".to_string(), doc.subtotal.value())];
        if let Some(rate) = positive_rate(doc.discount_percent.as_deref()) {
            rows.push((
                format!("Discount ({}%)", format_percent(rate)),
                -doc.discount_amount.value(),
            ));
        }
        if let Some(rate) = positive_rate(doc.tax_rate_percent.as_deref()) {
            rows.push((
                format!("Tax ({}%)", format_percent(rate)),
                doc.tax_amount.value(),
            ));
        }

        let total_height = layout.line_height + 8.0;
        let height = self.lines_height(rows.len()) + total_height;
        self.cursor.ensure(&mut self.pdf, height)?;
        self.cursor.place(BlockKind::Totals);

        let value_x = layout.content_right() - layout.cell_padding;
        let label_x = layout.content_right() - layout.totals_width;
        let top = self.cursor.y();

        let body = self.body();
        let muted = self.muted();
        for (i, (label, value)) in rows.iter().enumerate() {
            let baseline = top + i as f64 * layout.line_height + body.size as f64;
            let value = self.currency.format(*value);
            self.draw_text(label, label_x, baseline, Align::Right, muted)?;
            self.draw_text(&value, value_x, baseline, Align::Right, body)?;
        }

        let band_top = top + self.lines_height(rows.len());
        let band_left = layout.content_right() - 2.0 * layout.totals_width;
        let page = self.cursor.page();
        self.pdf.fill_rect(
            page,
            band_left,
            band_top,
            layout.content_right() - band_left,
            total_height,
            layout.total_fill.to_color(),
        )?;

        let emphasis = self.style(FontWeight::Bold, layout.total_font_size);
        let baseline = band_top + (total_height + emphasis.size as f64 * 0.7) / 2.0;
        let total = self.currency.format(doc.total.value());
        self.draw_text("Total", label_x, baseline, Align::Right, emphasis)?;
        self.draw_text(&total, value_x, baseline, Align::Right, emphasis)?;

        self.cursor.advance(height + layout.block_gap);
        Ok(())
    }

    /// Section heading followed by body lines that may span pages
    ///
    /// The heading is kept together with the first body line.
    fn render_section(&mut self, block: BlockKind, heading: &str, lines: Vec<Line>) -> Result<()> {
        let line_height = self.layout.line_height;
        self.cursor.ensure(&mut self.pdf, 2.0 * line_height)?;
        self.cursor.place(block);

        let left = self.layout.content_left();
        let heading = Line {
            text: heading.to_string(),
            style: self.section_heading(),
        };
        self.draw_lines(left, self.cursor.y(), std::slice::from_ref(&heading), Align::Left)?;
        self.cursor.advance(line_height);

        for line in &lines {
            self.cursor.ensure(&mut self.pdf, line_height)?;
            self.draw_lines(left, self.cursor.y(), std::slice::from_ref(line), Align::Left)?;
            self.cursor.advance(line_height);
        }

        self.cursor.advance(self.layout.block_gap);
        Ok(())
    }

    /// Wrap free text to the content width
    fn wrapped(&self, text: &str, style: TextStyle) -> Vec<Line> {
        wrap_text_to_width(text, self.layout.content_width(), |s| style.width(s))
            .into_iter()
            .map(|text| Line { text, style })
            .collect()
    }

    fn render_notes(&mut self) -> Result<()> {
        let Some(notes) = non_empty(self.document.notes.as_deref()) else {
            return Ok(());
        };
        let lines = self.wrapped(notes, self.body());
        self.render_section(BlockKind::Notes, "NOTES", lines)
    }

    fn render_payment_instructions(&mut self) -> Result<()> {
        let doc = self.document;
        if !doc.kind.shows_payment_sections() {
            return Ok(());
        }
        let Some(method) = non_empty(doc.payment_method.as_deref()) else {
            return Ok(());
        };

        let mut lines = vec![Line {
            text: format!("Payment Method: {method}"),
            style: self.strong(),
        }];
        if let Some(instructions) = non_empty(doc.payment_instructions.as_deref()) {
            lines.extend(self.wrapped(instructions, self.body()));
        }
        self.render_section(BlockKind::PaymentInstructions, "PAYMENT INFORMATION", lines)
    }

    /// Signature image, a rule beneath it and the signee's name
    fn render_signature(&mut self) -> Result<()> {
        let Some(signature) = self.document.signature_image.clone() else {
            return Ok(());
        };
        let layout = self.layout;
        let sig_box = layout.signature_box;
        let height = 2.0 * layout.line_height + sig_box.height + RULE_GAP;

        self.cursor.ensure(&mut self.pdf, height)?;
        self.cursor.place(BlockKind::Signature);

        let left = layout.content_left();
        let heading = Line {
            text: "SIGNATURE".to_string(),
            style: self.section_heading(),
        };
        self.draw_lines(left, self.cursor.y(), std::slice::from_ref(&heading), Align::Left)?;
        self.cursor.advance(layout.line_height);

        let image_top = self.cursor.y();
        self.embed_image(DiagnosticSource::Signature, &signature, left, image_top, sig_box)?;

        let rule_y = image_top + sig_box.height + RULE_GAP;
        self.pdf.draw_hline(
            self.cursor.page(),
            left,
            left + sig_box.width,
            rule_y,
            0.75,
            layout.rule_color.to_color(),
        )?;

        let signee = non_empty(self.document.signee_name.as_deref()).unwrap_or(DEFAULT_SIGNEE);
        let style = self.body();
        self.draw_text(signee, left, rule_y + RULE_GAP + style.size as f64, Align::Left, style)?;

        self.cursor
            .advance(sig_box.height + RULE_GAP + layout.line_height + layout.block_gap);
        Ok(())
    }

    /// Footer message and page marker, anchored to the bottom of every page
    fn render_footers(&mut self) -> Result<()> {
        let layout = self.layout;
        let message = match self.document.kind {
            DocumentKind::Invoice => INVOICE_FOOTER,
            DocumentKind::Quotation => QUOTATION_FOOTER,
        };
        let style = TextStyle {
            size: layout.small_font_size,
            ..self.muted()
        };
        let baseline = layout.page_height - layout.footer_offset;
        let rule_y = layout.footer_top();
        let center = layout.page_width / 2.0;

        let pages = self.pdf.page_count();
        for page in 1..=pages {
            self.pdf.draw_hline(
                page,
                layout.content_left(),
                layout.content_right(),
                rule_y,
                0.5,
                layout.rule_color.to_color(),
            )?;
            self.draw_text_on(page, message, center, baseline, Align::Center, style)?;

            let marker = format!("Page {page} of {pages}");
            let marker_baseline = baseline + layout.line_height;
            self.draw_text_on(page, &marker, center, marker_baseline, Align::Center, style)?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The rate string when it parses to something above zero
fn positive_rate(rate: Option<&str>) -> Option<&str> {
    rate.filter(|r| parse_lenient(r) > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_positive_rate() {
        assert_eq!(positive_rate(Some("10")), Some("10"));
        assert_eq!(positive_rate(Some("0")), None);
        assert_eq!(positive_rate(Some("abc")), None);
        assert_eq!(positive_rate(Some("-5")), None);
        assert_eq!(positive_rate(None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some("Net 30")), Some("Net 30"));
    }

    #[test]
    fn test_text_style_width_uses_weight() {
        let regular = TextStyle {
            weight: FontWeight::Regular,
            size: 10.0,
            color: Color::black(),
        };
        let bold = TextStyle {
            weight: FontWeight::Bold,
            ..regular
        };
        assert!(bold.width("Total") > regular.width("Total"));
    }
}
