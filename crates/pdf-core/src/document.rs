//! PDF Document builder

use crate::font::StandardFont;
use crate::graphics::{generate_line_operators, generate_rect_operators};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, FontWeight, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// A4 width in points
pub const A4_WIDTH: f64 = 595.28;
/// A4 height in points
pub const A4_HEIGHT: f64 = 841.89;

/// A buffered text operation
///
/// Text is buffered during rendering and appended after every other
/// operator of the page at save time, so it always paints above bands and
/// images drawn on the same page.
#[derive(Debug, Clone)]
struct BufferedTextOp {
    text: String,
    font: StandardFont,
    /// Page number (1-indexed)
    page: usize,
    /// X coordinate (in PDF coordinates, already aligned)
    x: f64,
    /// Y coordinate (in PDF coordinates, already converted)
    y: f64,
    font_size: f32,
    color: Color,
}

/// An image XObject already added to the document
#[derive(Debug, Clone, Copy)]
struct EmbeddedImage {
    object_id: ObjectId,
    width: u32,
    height: u32,
}

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Uniform gray (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF document builder
///
/// Coordinates passed to drawing methods are measured from the top-left
/// corner of the page; conversion to PDF's bottom-left origin happens here.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root Pages node
    pages_id: ObjectId,
    /// Page objects in order
    page_ids: Vec<ObjectId>,
    page_width: f64,
    page_height: f64,
    current_weight: FontWeight,
    current_font_size: f32,
    current_text_color: Color,
    /// Resource names per font, assigned on first use (F1, F2, ...)
    font_resources: BTreeMap<StandardFont, String>,
    /// Fonts used per page
    page_fonts: HashMap<usize, Vec<StandardFont>>,
    /// Embedded images (data hash -> XObject)
    embedded_images: HashMap<u64, EmbeddedImage>,
    /// Page image resources (page number -> image name -> object ID)
    page_image_resources: HashMap<usize, BTreeMap<String, ObjectId>>,
    next_image_resource: u32,
    /// Buffered content operators per page
    page_content_buffer: HashMap<usize, Vec<u8>>,
    buffered_text_ops: Vec<BufferedTextOp>,
}

impl PdfDocument {
    /// Create an empty document whose pages are `width` x `height` points
    ///
    /// The document starts with no pages; call [`PdfDocument::add_page`].
    ///
    /// # Example
    /// ```ignore
    /// let mut doc = PdfDocument::new(A4_WIDTH, A4_HEIGHT);
    /// let page = doc.add_page()?;
    /// doc.insert_text("Hello", page, 40.0, 60.0, Align::Left)?;
    /// let bytes = doc.to_bytes()?;
    /// ```
    pub fn new(width: f64, height: f64) -> Self {
        let mut inner = Document::with_version("1.5");

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Kids", Object::Array(vec![]));
        pages_dict.set("Count", Object::Integer(0));
        let pages_id = inner.add_object(Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = inner.add_object(Object::Dictionary(catalog));
        inner.trailer.set("Root", Object::Reference(catalog_id));

        Self {
            inner,
            pages_id,
            page_ids: Vec::new(),
            page_width: width,
            page_height: height,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: BTreeMap::new(),
            page_fonts: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
            buffered_text_ops: Vec::new(),
        }
    }

    /// Create an empty A4 document
    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page width in points
    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    /// Page height in points
    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    /// Set the document title in the Info dictionary
    pub fn set_title(&mut self, title: &str) {
        let mut info = Dictionary::new();
        info.set("Title", Object::string_literal(title));
        info.set("Producer", Object::string_literal("pdf-core"));
        let info_id = self.inner.add_object(Object::Dictionary(info));
        self.inner.trailer.set("Info", Object::Reference(info_id));
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self) -> Result<usize> {
        let contents_id = self
            .inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), vec![])));

        let mut page_dict = Dictionary::new();
        page_dict.set(b"Type", Object::Name(b"Page".to_vec()));
        page_dict.set(b"Parent", Object::Reference(self.pages_id));
        page_dict.set(
            b"MediaBox",
            Object::Array(vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(self.page_width as f32),
                Object::Real(self.page_height as f32),
            ]),
        );
        page_dict.set(b"Resources", Object::Dictionary(Dictionary::new()));
        page_dict.set(b"Contents", Object::Reference(contents_id));
        let new_page_id = self.inner.add_object(Object::Dictionary(page_dict));

        let pages_dict = self
            .inner
            .get_object(self.pages_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;

        let mut kids_array = pages_dict
            .get(b"Kids")
            .and_then(|kids| kids.as_array())
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?
            .clone();
        kids_array.push(Object::Reference(new_page_id));

        let mut new_pages_dict = pages_dict.clone();
        new_pages_dict.set(b"Kids", Object::Array(kids_array));
        new_pages_dict.set(b"Count", Object::Integer(self.page_ids.len() as i64 + 1));
        self.inner
            .objects
            .insert(self.pages_id, new_pages_dict.into());

        self.page_ids.push(new_page_id);
        Ok(self.page_ids.len())
    }

    /// Set weight and size in one call
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font(FontWeight::Bold, 24.0);
    /// doc.insert_text("INVOICE", 1, 40.0, 60.0, Align::Left)?;
    /// ```
    pub fn set_font(&mut self, weight: FontWeight, size: f32) {
        self.current_weight = weight;
        self.current_font_size = size;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// The face selected by the current weight
    pub fn current_font(&self) -> StandardFont {
        StandardFont::from_weight(self.current_weight)
    }

    /// Width of `text` in points at the current font and size
    pub fn text_width(&self, text: &str) -> f64 {
        self.current_font()
            .text_width_points(text, self.current_font_size)
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font = self.current_font();
        let width = self.text_width(text);
        let start_x = match align {
            Align::Left => x,
            Align::Center => x - (width / 2.0),
            Align::Right => x - width,
        };

        self.register_font(font, page);
        self.buffered_text_ops.push(BufferedTextOp {
            text: text.to_string(),
            font,
            page,
            x: start_x,
            y: self.page_height - y,
            font_size: self.current_font_size,
            color: self.current_text_color,
        });

        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at (`x`, `y`)
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        self.check_page(page)?;
        let pdf_y = self.page_height - y - height;
        let operators = generate_rect_operators(x, pdf_y, width, height, color);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Stroke a horizontal rule from `x1` to `x2` at `y` (from top)
    pub fn draw_hline(
        &mut self,
        page: usize,
        x1: f64,
        x2: f64,
        y: f64,
        line_width: f64,
        color: Color,
    ) -> Result<()> {
        self.check_page(page)?;
        let pdf_y = self.page_height - y;
        let operators = generate_line_operators((x1, pdf_y), (x2, pdf_y), line_width, color);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Insert an image stretched to the given box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the top edge in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(f64, f64)> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
    }

    /// Insert an image with scaling mode
    ///
    /// Image bytes are fully decoded before anything is written, so a
    /// corrupt image leaves the page untouched.
    ///
    /// # Returns
    /// The drawn (width, height) in points
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<(f64, f64)> {
        self.check_page(page)?;

        let (resource_name, orig_width, orig_height) = self.get_or_create_image_ref(data, page)?;

        let (actual_width, actual_height) =
            calculate_scaled_dimensions(orig_width, orig_height, width, height, mode);

        let pdf_y = self.page_height - y - actual_height;
        let operators =
            generate_image_operators(&resource_name, x, pdf_y, actual_width, actual_height);
        self.buffer_content(page, &operators);

        Ok((actual_width, actual_height))
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn finalize(&mut self) -> Result<()> {
        if self.page_ids.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        self.encode_buffered_text();
        self.flush_content_buffers()?;
        self.finalize_page_resources()
    }

    /// Remember that `font` is used on `page`, assigning a resource name
    fn register_font(&mut self, font: StandardFont, page: usize) {
        let next = self.font_resources.len() + 1;
        self.font_resources
            .entry(font)
            .or_insert_with(|| format!("F{next}"));

        let used = self.page_fonts.entry(page).or_default();
        if !used.contains(&font) {
            used.push(font);
        }
    }

    /// Encode buffered text operations into the page content buffers
    fn encode_buffered_text(&mut self) {
        let text_ops: Vec<BufferedTextOp> = std::mem::take(&mut self.buffered_text_ops);

        for op in text_ops {
            let font_name = self
                .font_resources
                .get(&op.font)
                .cloned()
                .unwrap_or_else(|| "F1".to_string());

            let ctx = TextRenderContext {
                font_name,
                font_size: op.font_size,
                text_width: op.font.text_width_points(&op.text, op.font_size),
                color: op.color,
            };

            // Position is already aligned in insert_text
            let operators = generate_text_operators(&op.text, op.x, op.y, Align::Left, &ctx);
            self.buffer_content(op.page, &operators);
        }
    }

    /// Write Font and XObject resources into every page dictionary
    fn finalize_page_resources(&mut self) -> Result<()> {
        let mut font_objects: HashMap<StandardFont, ObjectId> = HashMap::new();
        for font in self.font_resources.keys() {
            let id = self
                .inner
                .add_object(Object::Dictionary(font.to_pdf_dictionary()));
            font_objects.insert(*font, id);
        }

        for (index, page_id) in self.page_ids.clone().into_iter().enumerate() {
            let page = index + 1;

            let mut font_dict = Dictionary::new();
            for font in self.page_fonts.get(&page).into_iter().flatten() {
                if let (Some(name), Some(id)) =
                    (self.font_resources.get(font), font_objects.get(font))
                {
                    font_dict.set(name.as_bytes(), Object::Reference(*id));
                }
            }

            let mut xobject_dict = Dictionary::new();
            for (name, id) in self.page_image_resources.get(&page).into_iter().flatten() {
                xobject_dict.set(name.as_bytes(), Object::Reference(*id));
            }

            let mut resources = Dictionary::new();
            if !font_dict.is_empty() {
                resources.set(b"Font", Object::Dictionary(font_dict));
            }
            if !xobject_dict.is_empty() {
                resources.set(b"XObject", Object::Dictionary(xobject_dict));
            }

            let mut page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::SaveError("Page object is not a dictionary".to_string()))?
                .clone();
            page_dict.set(b"Resources", Object::Dictionary(resources));
            self.inner.objects.insert(page_id, page_dict.into());
        }

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = *self
            .page_ids
            .get(page.wrapping_sub(1))
            .ok_or(PdfError::InvalidPage(page, self.page_ids.len()))?;

        let (existing_content, page_dict_clone) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

            let existing_content = match page_dict.get(b"Contents") {
                Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                    Ok(Object::Stream(stream)) => stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone()),
                    _ => Vec::new(),
                },
                Ok(Object::Stream(stream)) => stream.content.clone(),
                _ => Vec::new(),
            };

            (existing_content, page_dict.clone())
        };

        let mut new_content = existing_content;
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let mut new_page_dict = page_dict_clone;
        new_page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1") and pixel dimensions.
    /// Images are deduplicated by hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<(String, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let embedded = match self.embedded_images.get(&data_hash) {
            Some(embedded) => *embedded,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;

                let mut stream = xobject.to_pdf_stream();
                if let Some(mask) = xobject.soft_mask_stream() {
                    let mask_id = self.inner.add_object(mask);
                    stream.dict.set("SMask", Object::Reference(mask_id));
                }
                let object_id = self.inner.add_object(stream);

                let embedded = EmbeddedImage {
                    object_id,
                    width: xobject.width,
                    height: xobject.height,
                };
                self.embedded_images.insert(data_hash, embedded);
                embedded
            }
        };

        let page_resources = self.page_image_resources.entry(page).or_default();
        if let Some((name, _)) = page_resources
            .iter()
            .find(|(_, id)| **id == embedded.object_id)
        {
            return Ok((name.clone(), embedded.width, embedded.height));
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        page_resources.insert(resource_name.clone(), embedded.object_id);

        Ok((resource_name, embedded.width, embedded.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_has_no_pages() {
        let doc = PdfDocument::a4();
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.page_width(), A4_WIDTH);
    }

    #[test]
    fn test_add_page_numbers() {
        let mut doc = PdfDocument::a4();
        assert_eq!(doc.add_page().unwrap(), 1);
        assert_eq!(doc.add_page().unwrap(), 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_insert_text_invalid_page() {
        let mut doc = PdfDocument::a4();
        doc.add_page().unwrap();
        let result = doc.insert_text("x", 2, 0.0, 0.0, Align::Left);
        assert!(matches!(result, Err(PdfError::InvalidPage(2, 1))));
    }

    #[test]
    fn test_save_without_pages_fails() {
        let mut doc = PdfDocument::a4();
        assert!(doc.to_bytes().is_err());
    }

    #[test]
    fn test_font_resource_names_follow_first_use() {
        let mut doc = PdfDocument::a4();
        doc.add_page().unwrap();
        doc.set_font(FontWeight::Bold, 20.0);
        doc.insert_text("A", 1, 0.0, 10.0, Align::Left).unwrap();
        doc.set_font(FontWeight::Regular, 10.0);
        doc.insert_text("b", 1, 0.0, 20.0, Align::Left).unwrap();

        assert_eq!(
            doc.font_resources.get(&StandardFont::HelveticaBold),
            Some(&"F1".to_string())
        );
        assert_eq!(
            doc.font_resources.get(&StandardFont::Helvetica),
            Some(&"F2".to_string())
        );
    }

    #[test]
    fn test_text_width_uses_current_font() {
        let mut doc = PdfDocument::a4();
        doc.set_font(FontWeight::Regular, 10.0);
        let regular = doc.text_width("Invoice");
        doc.set_font(FontWeight::Bold, 10.0);
        let bold = doc.text_width("Invoice");
        assert!(bold > regular);
    }
}
