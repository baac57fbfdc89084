//! Bridges [`UndineError`] into miette's diagnostic traits.
//!
//! A parse failure carries a batch of parser diagnostics; each one becomes
//! its own [`Report`] so miette renders a separate snippet per problem.
//! Everything else (I/O, layout, theme) renders as a plain one-line report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use undine::UndineError;
use undine_parser::Diagnostic;

/// One renderable unit of an [`UndineError`].
#[derive(Debug)]
pub enum Report<'e> {
    /// A parser diagnostic together with the source it points into.
    Parse {
        diagnostic: &'e Diagnostic,
        src: &'e str,
    },
    /// An error with no source location.
    Plain(&'e UndineError),
}

/// Splits an error into the reports the CLI renders, in source order.
pub fn reports(error: &UndineError) -> Vec<Report<'_>> {
    match error {
        UndineError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diagnostic| Report::Parse { diagnostic, src })
            .collect(),
        other => vec![Report::Plain(other)],
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Parse { diagnostic, .. } => f.write_str(diagnostic.message()),
            Report::Plain(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Report::Parse { .. } => None,
            Report::Plain(error) => std::error::Error::source(*error),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Parse { diagnostic, .. } => diagnostic
                .code()
                .map(|code| Box::new(code) as Box<dyn fmt::Display>),
            Report::Plain(error) => {
                let code = match error {
                    UndineError::Io(_) => "undine::io",
                    UndineError::Layout(_) => "undine::layout",
                    UndineError::Theme(_) => "undine::theme",
                    UndineError::Parse { .. } => return None,
                };
                Some(Box::new(code))
            }
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Report::Parse { diagnostic, .. } if diagnostic.severity().is_warning() => {
                Some(miette::Severity::Warning)
            }
            _ => Some(miette::Severity::Error),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Parse { diagnostic, .. } => diagnostic
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Report::Plain(_) => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Report::Parse { src, .. } => Some(src as &dyn miette::SourceCode),
            Report::Plain(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Parse { diagnostic, .. } = self else {
            return None;
        };
        let labels = diagnostic.labels();
        if labels.is_empty() {
            return None;
        }
        Some(Box::new(labels.iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_owned());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}
