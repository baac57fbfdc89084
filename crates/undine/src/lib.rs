//! Diagram rendering engine.
//!
//! Turns Mermaid-dialect source text into SVG documents or text-grid
//! drawings. The pipeline is parse, layout, render; every stage is
//! deterministic, so the same source and options always produce the
//! identical output bytes.
//!
//! ## Usage
//!
//! ```
//! # use undine::{SvgOptions, render_svg};
//! fn main() -> Result<(), undine::UndineError> {
//!     let svg = render_svg("graph TD\n  A[Start] --> B[Done]\n", &SvgOptions::default())?;
//!     assert!(svg.starts_with("<svg"));
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
mod export;
pub mod layout;

pub use error::UndineError;
pub use export::ascii::AsciiOptions;
pub use undine_core::theme::{Palette, PaletteOverrides, ThemeError};

use log::{debug, info};
use undine_core::{semantic::Diagram, theme};
use undine_parser::parse;

use crate::config::RenderConfig;

/// Options for one SVG render.
///
/// Colors layer as overrides over the named theme over the built-in
/// default; see [`undine_core::theme`] for the resolution rules.
#[derive(Debug, Clone, Default)]
pub struct SvgOptions {
    /// Named theme from the built-in registry.
    pub theme: Option<String>,
    /// Per-role color overrides, highest precedence.
    pub overrides: PaletteOverrides,
    /// Skip the background rectangle.
    pub transparent: bool,
    /// Spacing and text metrics.
    pub config: RenderConfig,
}

impl SvgOptions {
    pub fn with_theme(mut self, name: impl Into<String>) -> Self {
        self.theme = Some(name.into());
        self
    }

    pub fn with_overrides(mut self, overrides: PaletteOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }
}

/// Registered theme names, sorted lexicographically.
pub fn theme_names() -> Vec<&'static str> {
    theme::theme_names()
}

/// Renders diagram source text to a standalone SVG document.
pub fn render_svg(source: &str, options: &SvgOptions) -> Result<String, UndineError> {
    let palette = theme::resolve(options.theme.as_deref(), &options.overrides)?;
    let diagram = parse_source(source)?;

    match diagram {
        Diagram::Flowchart(chart) => {
            info!(
                nodes = chart.nodes.len(),
                edges = chart.edges.len();
                "rendering flowchart to SVG",
            );
            let laid_out = layout::flowchart::layout(&chart, &options.config)?;
            Ok(export::svg::render_flowchart(
                &chart,
                &laid_out,
                &palette,
                &options.config,
                options.transparent,
            ))
        }
        Diagram::Sequence(sequence) => {
            info!(
                participants = sequence.participants.len(),
                items = sequence.items.len();
                "rendering sequence diagram to SVG",
            );
            let laid_out = layout::sequence::layout(&sequence, &options.config)?;
            Ok(export::svg::render_sequence(
                &sequence,
                &laid_out,
                &palette,
                &options.config,
                options.transparent,
            ))
        }
    }
}

/// Renders diagram source text to a text-grid drawing.
pub fn render_ascii(source: &str, options: &AsciiOptions) -> Result<String, UndineError> {
    let diagram = parse_source(source)?;

    match diagram {
        Diagram::Flowchart(chart) => {
            info!(
                nodes = chart.nodes.len(),
                edges = chart.edges.len();
                "rendering flowchart to text",
            );
            // The grid renderer only reads the rank/order structure, so
            // the default spacing config is fine here.
            let laid_out = layout::flowchart::layout(&chart, &RenderConfig::default())?;
            Ok(export::ascii::render_flowchart(&chart, &laid_out, options))
        }
        Diagram::Sequence(sequence) => {
            info!(
                participants = sequence.participants.len(),
                items = sequence.items.len();
                "rendering sequence diagram to text",
            );
            Ok(export::ascii::render_sequence(&sequence, options))
        }
    }
}

fn parse_source(source: &str) -> Result<Diagram, UndineError> {
    debug!(bytes = source.len(); "parsing diagram source");
    parse(source).map_err(|err| UndineError::new_parse_error(err, source))
}
