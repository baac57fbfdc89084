//! Source positions and spans.
//!
//! The parser is line-oriented, so every span knows both its byte range in
//! the original source (for report rendering) and the one-based line/column
//! of its start (for the `ParseError` surface).

use std::fmt;
use std::ops::Range;

/// A one-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn line(self) -> u32 {
        self.line
    }

    pub fn column(self) -> u32 {
        self.column
    }

    /// Position shifted right on the same line.
    pub fn advanced(self, columns: u32) -> Self {
        Self {
            line: self.line,
            column: self.column + columns,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A byte range in the source plus the position of its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
    position: Position,
}

impl Span {
    pub fn new(range: Range<usize>, position: Position) -> Self {
        Self {
            start: range.start,
            end: range.end,
            position,
        }
    }

    /// Byte offset of the first spanned byte.
    pub fn start(self) -> usize {
        self.start
    }

    /// Byte offset one past the last spanned byte.
    pub fn end(self) -> usize {
        self.end
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn position(self) -> Position {
        self.position
    }

    pub fn line(self) -> u32 {
        self.position.line()
    }

    pub fn column(self) -> u32 {
        self.position.column()
    }
}
