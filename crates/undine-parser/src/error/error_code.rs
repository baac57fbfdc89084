//! Error codes for the parser diagnostic system.
//!
//! Codes are grouped by phase:
//! - `E0xx` - lexical errors
//! - `E1xx` - grammar errors
//! - `E2xx` - validation errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexical errors (E0xx)
    // =========================================================================
    /// Unterminated bracket.
    ///
    /// A node shape bracket (`[`, `(`, `{`, ...) or an edge label delimiter
    /// was opened but never closed on its line.
    E001,

    /// Unterminated directive.
    ///
    /// A `%%{` directive block was opened but `}%%` was never found.
    E002,

    // =========================================================================
    // Grammar errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// A statement starts with something the grammar does not recognize here.
    E100,

    /// Missing diagram header.
    ///
    /// The first meaningful line must name a diagram kind
    /// (`graph`, `flowchart`, or `sequenceDiagram`).
    E101,

    /// Incomplete edge.
    ///
    /// An edge arrow is missing its source or target node.
    E102,

    /// Missing `end`.
    ///
    /// A `subgraph` block was still open at the end of the input.
    E103,

    /// Stray `end`.
    ///
    /// An `end` keyword appeared with no open `subgraph` block.
    E104,

    /// Malformed message.
    ///
    /// A sequence diagram line looks like a message but has no valid arrow.
    E105,

    // =========================================================================
    // Validation errors (E2xx)
    // =========================================================================
    /// Duplicate subgraph.
    ///
    /// A subgraph with this id has already been declared.
    E200,

    /// Unknown class.
    ///
    /// A `class` statement references a name no `classDef` declared.
    E201,

    /// Invalid link index.
    ///
    /// A `linkStyle` index is not a number or does not name a declared edge.
    E202,
}

impl ErrorCode {
    /// The code as it appears in reports (e.g. "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Short description of what the code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated bracket",
            ErrorCode::E002 => "unterminated directive",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "missing diagram header",
            ErrorCode::E102 => "incomplete edge",
            ErrorCode::E103 => "missing `end`",
            ErrorCode::E104 => "stray `end`",
            ErrorCode::E105 => "malformed message",
            ErrorCode::E200 => "duplicate subgraph",
            ErrorCode::E201 => "unknown class",
            ErrorCode::E202 => "invalid link index",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
