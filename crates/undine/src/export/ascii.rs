//! Text-grid rendering.
//!
//! Draws the laid-out diagram onto a character cell grid. Geometry is
//! re-derived on the integer grid from the layout's rank/order structure,
//! never by rounding the float coordinates, so boxes can never collide
//! through rounding.

use unicode_width::UnicodeWidthChar;

mod flowchart;
mod sequence;

pub(crate) use flowchart::render_flowchart;
pub(crate) use sequence::render_sequence;

/// Options for the text-grid renderer.
#[derive(Debug, Clone)]
pub struct AsciiOptions {
    /// Use the 7-bit ASCII glyph set instead of Unicode box drawing.
    pub use_ascii: bool,
    /// Horizontal padding inside node boxes, in cells.
    pub padding_x: u16,
    /// Vertical padding inside node boxes, in cells.
    pub padding_y: u16,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Self {
            use_ascii: false,
            padding_x: 1,
            padding_y: 0,
        }
    }
}

/// The characters one rendering run draws with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub dash: char,
    pub arrow_up: char,
    pub arrow_down: char,
    pub arrow_left: char,
    pub arrow_right: char,
}

impl Glyphs {
    pub fn unicode() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            dash: '╌',
            arrow_up: '▲',
            arrow_down: '▼',
            arrow_left: '◀',
            arrow_right: '▶',
        }
    }

    pub fn ascii() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
            dash: '.',
            arrow_up: '^',
            arrow_down: 'v',
            arrow_left: '<',
            arrow_right: '>',
        }
    }

    pub fn for_options(options: &AsciiOptions) -> Self {
        if options.use_ascii {
            Self::ascii()
        } else {
            Self::unicode()
        }
    }
}

/// Cell taken up by the trailing half of a double-width character.
const WIDE_TAIL: char = '\0';

/// A growable character cell grid.
#[derive(Debug, Default)]
pub(crate) struct CellGrid {
    rows: Vec<Vec<char>>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one cell, growing the grid as needed.
    pub fn put(&mut self, x: usize, y: usize, c: char) {
        if self.rows.len() <= y {
            self.rows.resize(y + 1, Vec::new());
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, ' ');
        }
        row[x] = c;
    }

    pub fn get(&self, x: usize, y: usize) -> char {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(' ')
    }

    /// Horizontal run of `c` from `x1` to `x2` inclusive, in either order.
    pub fn hline(&mut self, x1: usize, x2: usize, y: usize, c: char) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.put(x, y, c);
        }
    }

    /// Vertical run of `c` from `y1` to `y2` inclusive, in either order.
    pub fn vline(&mut self, x: usize, y1: usize, y2: usize, c: char) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.put(x, y, c);
        }
    }

    /// Writes text starting at `(x, y)`. Double-width characters occupy
    /// two cells.
    pub fn text(&mut self, x: usize, y: usize, text: &str) {
        let mut cursor = x;
        for c in text.chars() {
            let cells = c.width().unwrap_or(1).max(1);
            self.put(cursor, y, c);
            if cells == 2 {
                self.put(cursor + 1, y, WIDE_TAIL);
            }
            cursor += cells;
        }
    }

    /// An empty box outline with the given corner and side characters.
    #[allow(clippy::too_many_arguments)]
    pub fn frame(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        glyphs: &Glyphs,
        corners: [char; 4],
        sides: [char; 2],
    ) {
        let right = x + width - 1;
        let bottom = y + height - 1;
        self.hline(x + 1, right - 1, y, glyphs.horizontal);
        self.hline(x + 1, right - 1, bottom, glyphs.horizontal);
        self.vline(x, y + 1, bottom - 1, sides[0]);
        self.vline(right, y + 1, bottom - 1, sides[1]);
        self.put(x, y, corners[0]);
        self.put(right, y, corners[1]);
        self.put(x, bottom, corners[3]);
        self.put(right, bottom, corners[2]);
    }

    /// Renders the grid: trailing whitespace trimmed from every line, one
    /// trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let line: String = row.iter().filter(|&&c| c != WIDE_TAIL).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        if out.is_empty() {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_grows_the_grid() {
        let mut grid = CellGrid::new();
        grid.put(3, 1, 'x');
        assert_eq!(grid.get(3, 1), 'x');
        assert_eq!(grid.get(0, 0), ' ');
        assert_eq!(grid.render(), "\n   x\n");
    }

    #[test]
    fn test_lines_work_in_either_order() {
        let mut grid = CellGrid::new();
        grid.hline(4, 2, 0, '-');
        grid.vline(0, 2, 0, '|');
        assert_eq!(grid.get(3, 0), '-');
        assert_eq!(grid.get(0, 1), '|');
    }

    #[test]
    fn test_render_trims_trailing_whitespace() {
        let mut grid = CellGrid::new();
        grid.put(0, 0, 'a');
        grid.put(5, 0, ' ');
        grid.put(1, 1, 'b');
        assert_eq!(grid.render(), "a\n b\n");
    }

    #[test]
    fn test_frame_draws_a_box() {
        let mut grid = CellGrid::new();
        let glyphs = Glyphs::ascii();
        grid.frame(0, 0, 4, 3, &glyphs, ['+'; 4], ['|', '|']);
        assert_eq!(grid.render(), "+--+\n|  |\n+--+\n");
    }

    #[test]
    fn test_wide_characters_take_two_cells() {
        let mut grid = CellGrid::new();
        grid.text(0, 0, "日x");
        assert_eq!(grid.get(0, 0), '日');
        assert_eq!(grid.get(2, 0), 'x');
        assert_eq!(grid.render(), "日x\n");
    }
}
