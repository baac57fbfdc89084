//! Error and diagnostic system for the diagram parser.
//!
//! The system is built around [`Diagnostic`]: a single error or warning
//! with an error code, labeled source spans, and optional help text.
//! Phases that can report several problems at once accumulate them in a
//! [`DiagnosticCollector`]; everything is ultimately wrapped in
//! [`ParseError`] for the caller.
//!
//! # Example
//!
//! ```
//! # use undine_parser::error::{Diagnostic, ErrorCode};
//! # use undine_parser::{Position, Span};
//! let span = Span::new(18..24, Position::new(2, 5));
//!
//! let diag = Diagnostic::error("subgraph `backend` is declared twice")
//!     .with_code(ErrorCode::E200)
//!     .with_label(span, "duplicate declaration")
//!     .with_help("rename one of the subgraphs");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
