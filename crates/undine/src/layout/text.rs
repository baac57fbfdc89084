//! Deterministic label measurement.
//!
//! Sizes come from Unicode column widths and the configured metrics, never
//! from a font rasterizer, so layout and SVG output are byte-identical
//! across machines. The SVG renderer centers text with the same metrics.

use unicode_width::UnicodeWidthStr;

use undine_core::geometry::Size;

use crate::config::TextMetrics;

/// Splits a label into display lines. Literal `\n` sequences in the source
/// act as line breaks.
pub fn label_lines(label: &str) -> Vec<String> {
    label.split("\\n").map(|line| line.trim().to_owned()).collect()
}

/// Display width of one line in character cells.
pub fn line_cells(line: &str) -> usize {
    line.width()
}

/// Measured size of a multi-line label in user units.
pub fn measure(lines: &[String], metrics: &TextMetrics) -> Size {
    let cells = lines.iter().map(|line| line_cells(line)).max().unwrap_or(0);
    let height = lines.len().max(1) as f32 * metrics.cell_height();
    Size::new(cells as f32 * metrics.cell_width(), height)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_label_lines_split_on_escaped_newline() {
        assert_eq!(label_lines("one"), ["one"]);
        assert_eq!(label_lines("one\\ntwo"), ["one", "two"]);
        assert_eq!(label_lines("a \\n b"), ["a", "b"]);
    }

    #[test]
    fn test_wide_characters_take_two_cells() {
        assert_eq!(line_cells("abc"), 3);
        assert_eq!(line_cells("日本"), 4);
    }

    #[test]
    fn test_measure_uses_longest_line() {
        let metrics = TextMetrics::default();
        let lines = vec!["short".to_owned(), "a longer line".to_owned()];
        let size = measure(&lines, &metrics);
        assert_approx_eq!(f32, size.width(), 13.0 * metrics.cell_width());
        assert_approx_eq!(f32, size.height(), 2.0 * metrics.cell_height());
    }

    #[test]
    fn test_empty_label_still_has_height() {
        let metrics = TextMetrics::default();
        let size = measure(&[String::new()], &metrics);
        assert_approx_eq!(f32, size.height(), metrics.cell_height());
    }
}
