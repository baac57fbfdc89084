//! The `ParseError` type wrapping parsing diagnostics.

use std::fmt;

use crate::error::Diagnostic;

/// Error type for the parsing lifecycle.
///
/// Wraps one or more diagnostics. The first error diagnostic drives the
/// `line()`/`column()`/`message()` surface and the `Display` form:
///
/// ```text
/// parse error at line 3, column 7: unexpected token (+1 more)
/// ```
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    /// One-based line of the first diagnostic's primary label, if located.
    pub fn line(&self) -> Option<u32> {
        self.first()
            .and_then(|d| d.primary_span())
            .map(|s| s.line())
    }

    /// One-based column of the first diagnostic's primary label, if located.
    pub fn column(&self) -> Option<u32> {
        self.first()
            .and_then(|d| d.primary_span())
            .map(|s| s.column())
    }

    /// Message of the first diagnostic.
    pub fn message(&self) -> &str {
        self.first().map(|d| d.message()).unwrap_or_default()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.first() else {
            return write!(f, "parse error");
        };
        match first.primary_span() {
            Some(span) => write!(f, "parse error at {}: {}", span.position(), first.message())?,
            None => write!(f, "parse error: {}", first.message())?,
        }
        if self.diagnostics.len() > 1 {
            write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        span::{Position, Span},
    };

    #[test]
    fn test_from_diagnostic() {
        let err: ParseError = Diagnostic::error("boom").with_code(ErrorCode::E100).into();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.message(), "boom");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_display_with_position() {
        let err: ParseError = Diagnostic::error("unexpected token")
            .with_label(Span::new(14..17, Position::new(3, 7)), "here")
            .into();
        assert_eq!(
            err.to_string(),
            "parse error at line 3, column 7: unexpected token"
        );
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
    }

    #[test]
    fn test_display_multiple() {
        let err: ParseError = vec![
            Diagnostic::error("first").with_label(Span::new(0..1, Position::new(1, 1)), "here"),
            Diagnostic::error("second"),
            Diagnostic::error("third"),
        ]
        .into();
        assert_eq!(
            err.to_string(),
            "parse error at line 1, column 1: first (+2 more)"
        );
    }
}
