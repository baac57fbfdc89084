//! Command-line argument definitions for the Undine CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! theming, configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use undine::PaletteOverrides;

/// Output formats the CLI can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// A standalone SVG document.
    Svg,
    /// A text-grid drawing for terminals.
    Ascii,
}

/// Command-line arguments for the Undine diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram file, or `-` for stdin
    #[arg(default_value = "-", help = "Path to the input file (`-` for stdin)")]
    pub input: String,

    /// Path to the output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Svg)]
    pub format: Format,

    /// Theme name (see --list-themes)
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Background color override
    #[arg(long)]
    pub bg: Option<String>,

    /// Foreground color override
    #[arg(long)]
    pub fg: Option<String>,

    /// Edge and lifeline color override
    #[arg(long)]
    pub line: Option<String>,

    /// Accent color override
    #[arg(long)]
    pub accent: Option<String>,

    /// Muted text color override
    #[arg(long)]
    pub muted: Option<String>,

    /// Node fill color override
    #[arg(long)]
    pub surface: Option<String>,

    /// Node border color override
    #[arg(long)]
    pub border: Option<String>,

    /// Font family override
    #[arg(long)]
    pub font: Option<String>,

    /// Omit the SVG background rectangle
    #[arg(long)]
    pub transparent: bool,

    /// Use 7-bit ASCII glyphs instead of Unicode box drawing
    #[arg(long)]
    pub use_ascii: bool,

    /// Horizontal padding inside text-grid boxes, in cells
    #[arg(long, default_value_t = 1)]
    pub padding_x: u16,

    /// Vertical padding inside text-grid boxes, in cells
    #[arg(long, default_value_t = 0)]
    pub padding_y: u16,

    /// List the registered theme names and exit
    #[arg(long)]
    pub list_themes: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Palette overrides assembled from the color flags.
    pub fn palette_overrides(&self) -> PaletteOverrides {
        PaletteOverrides {
            bg: self.bg.clone(),
            fg: self.fg.clone(),
            line: self.line.clone(),
            accent: self.accent.clone(),
            muted: self.muted.clone(),
            surface: self.surface.clone(),
            border: self.border.clone(),
            font: self.font.clone(),
        }
    }
}
