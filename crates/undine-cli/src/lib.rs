//! CLI logic for the Undine diagram tool.
//!
//! This module contains the core CLI logic: reading the input source,
//! assembling render options from flags and the configuration file, and
//! writing the rendered output.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Format};

use std::{
    fs,
    io::{Read, Write},
};

use log::info;

use undine::{AsciiOptions, SvgOptions, UndineError, render_ascii, render_svg, theme_names};

/// Run the Undine CLI application
///
/// This function processes the input source through the Undine pipeline
/// and writes the rendered diagram to the output file or stdout.
///
/// # Errors
///
/// Returns `UndineError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Layout errors
/// - Theme resolution errors
pub fn run(args: &Args) -> Result<(), UndineError> {
    if args.list_themes {
        let mut stdout = std::io::stdout().lock();
        for name in theme_names() {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing diagram"
    );

    let source = read_input(&args.input)?;

    let rendered = match args.format {
        Format::Svg => {
            let render_config = config::load_config(args.config.as_ref())?;
            let mut options = SvgOptions::default()
                .with_overrides(args.palette_overrides())
                .with_transparent(args.transparent)
                .with_config(render_config);
            options.theme = args.theme.clone();
            render_svg(&source, &options)?
        }
        Format::Ascii => {
            let options = AsciiOptions {
                use_ascii: args.use_ascii,
                padding_x: args.padding_x,
                padding_y: args.padding_y,
            };
            render_ascii(&source, &options)?
        }
    };

    write_output(args.output.as_deref(), &rendered)?;

    info!(output_path:? = args.output; "Diagram exported successfully");

    Ok(())
}

/// Reads the diagram source from a file, or stdin when the path is `-`.
fn read_input(path: &str) -> Result<String, UndineError> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().lock().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Writes the rendered output to a file, or stdout when no path was given.
fn write_output(path: Option<&str>, rendered: &str) -> Result<(), UndineError> {
    match path {
        Some(path) => fs::write(path, rendered)?,
        None => std::io::stdout().lock().write_all(rendered.as_bytes())?,
    }
    Ok(())
}
