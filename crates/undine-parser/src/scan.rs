//! A character cursor over a single statement.
//!
//! Statements never span lines (block constructs like `subgraph` are split
//! into per-line statements before this layer), so a cursor tracks one line
//! fragment plus enough bookkeeping to produce source-global [`Span`]s.

use std::ops::Range;

use crate::span::{Position, Span};

#[derive(Debug)]
pub struct Cursor<'src> {
    text: &'src str,
    pos: usize,
    base_offset: usize,
    base: Position,
}

impl<'src> Cursor<'src> {
    /// `base_offset` is the byte offset of `text` in the whole source and
    /// `base` the position of its first character.
    pub fn new(text: &'src str, base_offset: usize, base: Position) -> Self {
        Self {
            text,
            pos: 0,
            base_offset,
            base,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'src str {
        &self.text[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. `n` must land on a character boundary, which
    /// holds for offsets produced by `find` on `remaining()`.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
        debug_assert!(self.text.is_char_boundary(self.pos));
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes `prefix` if the remaining text starts with it.
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if self.remaining().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// Consumes characters while `pred` holds, returning the consumed slice.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    /// Position of the cursor's byte index `pos` within the source.
    pub fn position_at(&self, pos: usize) -> Position {
        let columns = self.text[..pos].chars().count() as u32;
        self.base.advanced(columns)
    }

    pub fn position(&self) -> Position {
        self.position_at(self.pos)
    }

    /// Source-global span for a local byte range.
    pub fn span(&self, range: Range<usize>) -> Span {
        Span::new(
            self.base_offset + range.start..self.base_offset + range.end,
            self.position_at(range.start),
        )
    }

    /// Span covering everything from the current position to end of text.
    pub fn span_to_end(&self) -> Span {
        self.span(self.pos..self.text.len().max(self.pos))
    }
}

/// True for characters that may start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scans an identifier at the cursor. Hyphens are allowed inside an
/// identifier only when followed by another identifier character, so
/// `my-node` is one token while `A-->B` stops before the arrow.
pub fn scan_identifier<'src>(cursor: &mut Cursor<'src>) -> &'src str {
    let start = cursor.pos();
    loop {
        match cursor.peek() {
            Some(c) if is_ident_start(c) => {
                cursor.bump();
            }
            Some('-') => {
                let mut ahead = cursor.remaining().chars();
                ahead.next();
                match ahead.next() {
                    Some(next) if is_ident_start(next) => {
                        cursor.bump();
                    }
                    _ => break,
                }
            }
            _ => break,
        }
    }
    &cursor.text[start..cursor.pos()]
}
