//! Text rendering utilities

use crate::document::Color;
use crate::font::encode_win_ansi;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Encode text as a PDF literal string, e.g. `(Total \(KES\))`
///
/// Bytes are WinAnsi; parentheses and backslashes are escaped.
pub fn encode_literal_string(text: &str) -> Vec<u8> {
    let bytes = encode_win_ansi(text);
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(b'(');
    for b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
    out
}

/// Generate PDF operators for text insertion
///
/// Creates the text operators (BT, rg, Tf, Td, Tj, ET) to render text at a
/// specific position with alignment support.
///
/// # Arguments
/// * `text` - Text to show (encoded as a WinAnsi literal string)
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `align` - Text alignment relative to `x`
/// * `ctx` - Text rendering context
///
/// # Returns
/// Vector of bytes containing the PDF operators
pub fn generate_text_operators(
    text: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };
    let final_x = x + x_offset;

    let mut ops = Vec::new();
    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(
        format!("{} {} {} rg\n", ctx.color.r, ctx.color.g, ctx.color.b).as_bytes(),
    );
    ops.extend_from_slice(format!("/{} {} Tf\n", ctx.font_name, ctx.font_size).as_bytes());
    ops.extend_from_slice(format!("{final_x} {y} Td\n").as_bytes());
    ops.extend_from_slice(&encode_literal_string(text));
    ops.extend_from_slice(b" Tj\nET\n");
    ops
}

/// Split text into lines that fit `max_width`
///
/// Explicit newlines always break. Within a paragraph, words are packed
/// greedily; a single word wider than the line is broken between
/// characters. An empty paragraph yields an empty line so blank lines in
/// the input survive.
///
/// # Arguments
/// * `text` - Text to split
/// * `max_width` - Maximum line width in points
/// * `measure` - Width of a string in points at the intended font and size
pub fn wrap_text_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, &measure);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    lines
}

/// Break an over-long word into chunks that each fit `max_width`
fn break_word<F>(word: &str, max_width: f64, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut pieces = Vec::new();
    let mut chunk = String::new();

    for c in word.chars() {
        chunk.push(c);
        // A single character always stays, even if it alone overflows
        if measure(&chunk) > max_width && chunk.chars().count() > 1 {
            chunk.pop();
            pieces.push(std::mem::take(&mut chunk));
            chunk.push(c);
        }
    }
    if !chunk.is_empty() {
        pieces.push(chunk);
    }

    pieces
}
