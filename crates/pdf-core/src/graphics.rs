//! Path painting operators for rules and filled bands

use crate::document::Color;

/// Generate operators for a filled rectangle
///
/// # Arguments
/// * `x` - Left edge in points
/// * `y` - Bottom edge in points (PDF coordinates)
/// * `width` - Rectangle width in points
/// * `height` - Rectangle height in points
/// * `color` - Fill color
pub fn generate_rect_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{x} {y} {width} {height} re\nf\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Generate operators for a straight stroked line
///
/// Coordinates are PDF coordinates (origin bottom-left).
pub fn generate_line_operators(
    from: (f64, f64),
    to: (f64, f64),
    line_width: f64,
    color: Color,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{} {} m\n{} {} l\nS\nQ\n",
        color.r, color.g, color.b, from.0, from.1, to.0, to.1
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_operators() {
        let ops = generate_rect_operators(10.0, 20.0, 30.0, 40.0, Color::rgb(0.5, 0.5, 0.5));
        let ops = String::from_utf8(ops).unwrap();

        assert!(ops.starts_with("q\n"));
        assert!(ops.contains("0.5 0.5 0.5 rg"));
        assert!(ops.contains("10 20 30 40 re\nf"));
        assert!(ops.ends_with("Q\n"));
    }

    #[test]
    fn test_line_operators() {
        let ops = generate_line_operators((0.0, 5.0), (100.0, 5.0), 0.5, Color::black());
        let ops = String::from_utf8(ops).unwrap();

        assert!(ops.contains("0 0 0 RG"));
        assert!(ops.contains("0.5 w"));
        assert!(ops.contains("0 5 m\n100 5 l\nS"));
    }
}
