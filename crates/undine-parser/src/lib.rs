//! Parser for the Mermaid-dialect diagram language.
//!
//! This crate turns diagram source text into the semantic model defined in
//! `undine_core::semantic`. The grammar is line-oriented: comments and
//! directives are stripped first, the first meaningful line names the
//! diagram kind, and the matching sub-parser consumes the rest.
//!
//! ## Usage
//!
//! ```
//! # use undine_parser::{parse, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let diagram = parse("graph TD\n  A[Start] --> B{Choice}\n  B --> C\n")?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod flowchart;
#[cfg(test)]
mod parser_tests;
mod scan;
mod sequence;
mod span;

pub use error::{Diagnostic, ErrorCode, ParseError};
pub use span::{Position, Span};

use log::debug;
use undine_core::semantic::{Diagram, Direction};

use crate::scan::Cursor;

/// One statement fragment: a slice of a single source line together with
/// its byte offset and position in the whole source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Statement<'src> {
    text: &'src str,
    offset: usize,
    position: Position,
}

impl<'src> Statement<'src> {
    pub(crate) fn text(&self) -> &'src str {
        self.text
    }

    pub(crate) fn cursor(&self) -> Cursor<'src> {
        Cursor::new(self.text, self.offset, self.position)
    }

    /// Span covering the whole fragment.
    pub(crate) fn span(&self) -> Span {
        Span::new(self.offset..self.offset + self.text.len(), self.position)
    }
}

/// Parse diagram source text into a semantic [`Diagram`].
///
/// The first meaningful line must be a diagram header: `graph`/`flowchart`
/// with an optional direction, or `sequenceDiagram`. Errors carry one-based
/// line/column positions into the original source.
pub fn parse(source: &str) -> Result<Diagram, ParseError> {
    let lines = preprocess(source)?;

    let Some((first, rest)) = lines.split_first() else {
        return Err(Diagnostic::error("input contains no diagram")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(0..0, Position::new(1, 1)), "empty input")
            .with_help("start with `graph`, `flowchart` or `sequenceDiagram`")
            .into());
    };

    let mut cursor = first.cursor();
    cursor.skip_whitespace();
    let keyword_start = cursor.pos();
    let keyword = cursor.take_while(|c| c.is_alphanumeric());

    match keyword {
        "sequenceDiagram" => {
            cursor.skip_whitespace();
            if !cursor.at_end() {
                return Err(unexpected_after_header(&cursor));
            }
            debug!(lines = rest.len(); "parsing sequence diagram");
            let sequence = sequence::parse(rest)?;
            Ok(Diagram::Sequence(sequence))
        }
        "graph" | "flowchart" => {
            let direction = parse_direction(&mut cursor)?;
            debug!(direction:? = direction, lines = rest.len(); "parsing flowchart");

            // Anything after the header on the same line is regular
            // statements, as in `graph TD; A-->B;`.
            let mut statements = Vec::new();
            split_statements(first, cursor.pos(), &mut statements);
            for line in rest {
                split_statements(line, 0, &mut statements);
            }
            let chart = flowchart::parse(&statements, direction)?;
            Ok(Diagram::Flowchart(chart))
        }
        _ => {
            let span = if keyword.is_empty() {
                cursor.span_to_end()
            } else {
                cursor.span(keyword_start..cursor.pos())
            };
            Err(Diagnostic::error("expected a diagram header")
                .with_code(ErrorCode::E101)
                .with_label(span, "not a diagram header")
                .with_help("start with `graph`, `flowchart` or `sequenceDiagram`")
                .into())
        }
    }
}

fn unexpected_after_header(cursor: &Cursor<'_>) -> ParseError {
    Diagnostic::error("unexpected text after diagram header")
        .with_code(ErrorCode::E100)
        .with_label(cursor.span_to_end(), "not part of the header")
        .into()
}

fn parse_direction(cursor: &mut Cursor<'_>) -> Result<Direction, ParseError> {
    cursor.skip_whitespace();
    let start = cursor.pos();
    let token = cursor.take_while(|c| c.is_ascii_alphabetic());
    let direction = match token {
        "" => return Ok(Direction::TopDown),
        "TB" | "TD" => Direction::TopDown,
        "BT" => Direction::BottomUp,
        "LR" => Direction::LeftRight,
        "RL" => Direction::RightLeft,
        other => {
            return Err(Diagnostic::error(format!("unknown direction `{other}`"))
                .with_code(ErrorCode::E100)
                .with_label(cursor.span(start..cursor.pos()), "expected TB, TD, BT, LR or RL")
                .into());
        }
    };
    // A `;` right after the direction belongs to the statement splitter.
    Ok(direction)
}

/// Splits the part of `line` starting at `from` into `;`-separated
/// non-blank statement fragments.
fn split_statements<'src>(line: &Statement<'src>, from: usize, out: &mut Vec<Statement<'src>>) {
    let mut start = from;
    let bytes = line.text.as_bytes();
    for i in from..=line.text.len() {
        let boundary = i == line.text.len() || bytes[i] == b';';
        if !boundary {
            continue;
        }
        let fragment = &line.text[start..i];
        if !fragment.trim().is_empty() {
            let lead = fragment.len() - fragment.trim_start().len();
            let frag_start = start + lead;
            let trimmed = fragment.trim();
            out.push(Statement {
                text: trimmed,
                offset: line.offset + frag_start,
                position: line
                    .position
                    .advanced(line.text[..frag_start].chars().count() as u32),
            });
        }
        start = i + 1;
    }
}

/// Strips comments and `%%{...}%%` directives, returning the meaningful
/// lines with their offsets and one-based line numbers.
fn preprocess(source: &str) -> Result<Vec<Statement<'_>>, ParseError> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    let mut in_directive: Option<Span> = None;

    for (idx, raw) in source.split('\n').enumerate() {
        let number = idx as u32 + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = line.trim();

        if in_directive.is_some() {
            if trimmed.contains("}%%") {
                in_directive = None;
            }
        } else if trimmed.starts_with("%%{") {
            let col = line.find("%%{").unwrap_or(0);
            let span = Span::new(
                offset + col..offset + col + 3,
                Position::new(number, line[..col].chars().count() as u32 + 1),
            );
            if !trimmed.contains("}%%") {
                in_directive = Some(span);
            }
        } else if !trimmed.is_empty() && !trimmed.starts_with("%%") {
            let lead = line.len() - line.trim_start().len();
            lines.push(Statement {
                text: line.trim_end(),
                offset: offset + lead,
                position: Position::new(number, line[..lead].chars().count() as u32 + 1),
            });
        }

        offset += raw.len() + 1;
    }

    if let Some(open_span) = in_directive {
        return Err(unterminated_directive(open_span));
    }

    Ok(lines)
}

fn unterminated_directive(span: Span) -> ParseError {
    Diagnostic::error("unterminated `%%{ ... }%%` directive")
        .with_code(ErrorCode::E002)
        .with_label(span, "directive opened here")
        .with_help("close the directive with `}%%`")
        .into()
}
