//! Vertical cursor and page breaks

use pdf_core::PdfDocument;
use serde::Serialize;

/// Blocks placed by the cursor, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "index")]
pub enum BlockKind {
    Logo,
    /// Text title drawn when there is no usable logo
    Title,
    Heading,
    Issuer,
    Client,
    Dates,
    PaymentTerms,
    TableHeader,
    ItemRow(usize),
    Totals,
    Notes,
    PaymentInstructions,
    Signature,
}

/// Where a block started: page (1-indexed) and top y in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub block: BlockKind,
    pub page: usize,
    pub y: f64,
}

/// Running position of the next block
///
/// `(page, y)` only ever moves forward. When a block does not fit above
/// the bottom limit a new page is appended and `y` resets to the top.
#[derive(Debug)]
pub struct Cursor {
    page: usize,
    y: f64,
    top: f64,
    bottom: f64,
    placements: Vec<Placement>,
}

impl Cursor {
    /// Cursor at the top of `page`
    ///
    /// # Arguments
    /// * `page` - Current page (1-indexed)
    /// * `top` - Y where content starts on every page
    /// * `bottom` - Lowest y content may reach
    pub fn new(page: usize, top: f64, bottom: f64) -> Self {
        Self {
            page,
            y: top,
            top,
            bottom,
            placements: Vec::new(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Whether `height` more points fit on the current page
    ///
    /// Anything fits at the top of a page, so an oversized block is placed
    /// and allowed to overflow rather than breaking forever.
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.bottom || self.y <= self.top
    }

    /// Make room for `height` points, appending a page if needed
    ///
    /// # Returns
    /// `true` when a page break happened
    pub fn ensure(&mut self, pdf: &mut PdfDocument, height: f64) -> pdf_core::Result<bool> {
        if self.fits(height) {
            return Ok(false);
        }

        self.page = pdf.add_page()?;
        self.y = self.top;
        tracing::debug!(page = self.page, "page break");
        Ok(true)
    }

    /// Move down by `dy`; negative values are ignored
    pub fn advance(&mut self, dy: f64) {
        if dy > 0.0 {
            self.y += dy;
        }
    }

    /// Move down to `y` if it is below the cursor
    pub fn advance_to(&mut self, y: f64) {
        if y > self.y {
            self.y = y;
        }
    }

    /// Record that `block` starts at the current position
    pub fn place(&mut self, block: BlockKind) {
        self.placements.push(Placement {
            block,
            page: self.page,
            y: self.y,
        });
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<Placement> {
        self.placements
    }
}

/// Whether placements never move backwards in `(page, y)` order
pub fn is_monotonic(placements: &[Placement]) -> bool {
    placements
        .windows(2)
        .all(|pair| (pair[0].page, pair[0].y) <= (pair[1].page, pair[1].y))
}
