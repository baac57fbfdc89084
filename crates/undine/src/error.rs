//! Error types for Undine operations.
//!
//! This module provides the main error type [`UndineError`] which wraps
//! the error conditions that can occur while turning diagram source text
//! into rendered output.

use std::io;

use thiserror::Error;

use undine_core::theme::ThemeError;
use undine_parser::ParseError;

use crate::layout::LayoutError;

/// The main error type for Undine operations.
///
/// The `Parse` variant keeps the original source text next to the
/// structured diagnostics so callers can produce rich reports with the
/// offending spans highlighted.
#[derive(Debug, Error)]
pub enum UndineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Theme(#[from] ThemeError),
}

impl UndineError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
