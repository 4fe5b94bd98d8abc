//! Layout configuration
//!
//! All measurements are in PDF points (1/72 inch). Every struct reads with
//! `#[serde(default)]`, so a partial JSON object only overrides the keys it
//! names.

use crate::{RenderError, Result};
use invoice_core::CurrencyFormat;
use pdf_core::{Color, A4_HEIGHT, A4_WIDTH};
use serde::{Deserialize, Serialize};

/// 8-bit RGB color, written as `[r, g, b]` in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_color(self) -> Color {
        Color::from_rgb(self.0, self.1, self.2)
    }
}

/// Share of the content width given to each item table column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnFractions {
    pub description: f64,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
}

impl Default for ColumnFractions {
    fn default() -> Self {
        Self {
            description: 0.45,
            quantity: 0.15,
            unit_price: 0.20,
            amount: 0.20,
        }
    }
}

impl ColumnFractions {
    fn as_array(&self) -> [f64; 4] {
        [self.description, self.quantity, self.unit_price, self.amount]
    }
}

/// Box an image is fitted into, preserving its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// Page geometry, typography and colors used by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// X offset of the right column in two-column blocks
    pub right_column_x: f64,

    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
    pub small_font_size: f32,
    pub total_font_size: f32,
    pub line_height: f64,
    /// Vertical space between blocks
    pub block_gap: f64,

    pub logo_box: BoxSize,
    pub signature_box: BoxSize,

    pub columns: ColumnFractions,
    pub table_header_height: f64,
    pub cell_padding: f64,
    /// Width of the value column in the totals block
    pub totals_width: f64,

    pub text_color: Rgb,
    pub muted_color: Rgb,
    pub header_fill: Rgb,
    pub header_text_color: Rgb,
    pub stripe_fill: Rgb,
    pub total_fill: Rgb,
    pub rule_color: Rgb,

    /// Baseline of the footer, measured up from the bottom edge
    pub footer_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin_top: 40.0,
            margin_bottom: 70.0,
            margin_left: 40.0,
            margin_right: 40.0,
            right_column_x: 320.0,

            title_font_size: 24.0,
            heading_font_size: 9.0,
            body_font_size: 10.0,
            small_font_size: 8.0,
            total_font_size: 12.0,
            line_height: 14.0,
            block_gap: 20.0,

            logo_box: BoxSize {
                width: 140.0,
                height: 60.0,
            },
            signature_box: BoxSize {
                width: 150.0,
                height: 50.0,
            },

            columns: ColumnFractions::default(),
            table_header_height: 22.0,
            cell_padding: 6.0,
            totals_width: 110.0,

            text_color: Rgb(31, 41, 55),
            muted_color: Rgb(107, 114, 128),
            header_fill: Rgb(31, 41, 55),
            header_text_color: Rgb(255, 255, 255),
            stripe_fill: Rgb(243, 244, 246),
            total_fill: Rgb(229, 231, 235),
            rule_color: Rgb(156, 163, 175),

            footer_offset: 30.0,
        }
    }
}

impl LayoutConfig {
    /// Left edge of the content area
    pub fn content_left(&self) -> f64 {
        self.margin_left
    }

    /// Right edge of the content area
    pub fn content_right(&self) -> f64 {
        self.page_width - self.margin_right
    }

    pub fn content_width(&self) -> f64 {
        self.content_right() - self.content_left()
    }

    /// Lowest y a block may reach before a page break
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.margin_bottom
    }

    /// y of the footer rule; content must end above it
    pub fn footer_top(&self) -> f64 {
        self.page_height - self.footer_offset - self.line_height
    }

    /// Left edge and width of each item table column
    pub fn column_bounds(&self) -> [(f64, f64); 4] {
        let mut x = self.content_left();
        self.columns.as_array().map(|fraction| {
            let width = self.content_width() * fraction;
            let bounds = (x, width);
            x += width;
            bounds
        })
    }

    /// Reject geometry the renderer cannot lay out
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pageWidth", self.page_width),
            ("pageHeight", self.page_height),
            ("titleFontSize", self.title_font_size as f64),
            ("headingFontSize", self.heading_font_size as f64),
            ("bodyFontSize", self.body_font_size as f64),
            ("smallFontSize", self.small_font_size as f64),
            ("totalFontSize", self.total_font_size as f64),
            ("lineHeight", self.line_height),
            ("tableHeaderHeight", self.table_header_height),
            ("logoBox.width", self.logo_box.width),
            ("logoBox.height", self.logo_box.height),
            ("signatureBox.width", self.signature_box.width),
            ("signatureBox.height", self.signature_box.height),
            ("totalsWidth", self.totals_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(config_error(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("marginLeft", self.margin_left),
            ("marginRight", self.margin_right),
            ("blockGap", self.block_gap),
            ("cellPadding", self.cell_padding),
            ("footerOffset", self.footer_offset),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(config_error(format!("{name} must not be negative, got {value}")));
            }
        }

        if self.content_width() <= 0.0 {
            return Err(config_error("margins leave no content width".to_string()));
        }
        if self.content_bottom() <= self.margin_top {
            return Err(config_error("margins leave no content height".to_string()));
        }
        if self.content_bottom() > self.footer_top() {
            return Err(config_error(format!(
                "marginBottom {} leaves content over the footer, which starts {} above the page bottom",
                self.margin_bottom,
                self.page_height - self.footer_top()
            )));
        }
        if self.right_column_x <= self.content_left() || self.right_column_x >= self.content_right() {
            return Err(config_error(format!(
                "rightColumnX must lie inside the content area, got {}",
                self.right_column_x
            )));
        }

        let fractions = self.columns.as_array();
        if fractions.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(config_error("column fractions must be positive".to_string()));
        }
        let sum: f64 = fractions.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(config_error(format!("column fractions sum to {sum}, expected 1")));
        }

        Ok(())
    }
}

fn config_error(message: String) -> RenderError {
    RenderError::Config(message)
}

/// Everything `render` needs besides the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub layout: LayoutConfig,
    pub currency: CurrencyFormat,
}

impl RenderOptions {
    /// Parse options from JSON, filling unspecified keys with defaults
    ///
    /// # Example
    /// ```ignore
    /// let options = RenderOptions::from_json(r#"{"layout": {"marginLeft": 50}}"#)?;
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.layout.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_column_bounds_cover_content_width() {
        let config = LayoutConfig::default();
        let bounds = config.column_bounds();

        assert_eq!(bounds[0].0, config.content_left());
        let (last_x, last_width) = bounds[3];
        assert!((last_x + last_width - config.content_right()).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_override() {
        let options = RenderOptions::from_json(
            r#"{"layout": {"marginLeft": 50, "headerFill": [0, 0, 128]}, "currency": {"prefix": "$"}}"#,
        )
        .unwrap();

        assert_eq!(options.layout.margin_left, 50.0);
        assert_eq!(options.layout.header_fill, Rgb(0, 0, 128));
        assert_eq!(options.layout.margin_right, 40.0);
        assert_eq!(options.currency.prefix, "$");
        assert_eq!(options.currency.grouping_separator, ",");
    }

    #[test]
    fn test_rejects_bad_fractions() {
        let err = RenderOptions::from_json(
            r#"{"layout": {"columns": {"description": 0.5, "quantity": 0.2, "unitPrice": 0.2, "amount": 0.2}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn test_rejects_non_positive_size() {
        let config = LayoutConfig {
            line_height: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::Config(_))));
    }

    #[test]
    fn test_rejects_margins_without_room() {
        let config = LayoutConfig {
            margin_top: 500.0,
            margin_bottom: 400.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_content_over_footer() {
        let config = LayoutConfig {
            margin_bottom: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(config.validate(), Err(RenderError::Config(_))));

        let config = LayoutConfig {
            margin_bottom: 50.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RenderOptions::from_json("{"),
            Err(RenderError::Json(_))
        ));
    }
}
