//! Theme palettes and color-role resolution.
//!
//! A rendered diagram draws every element from a [`Palette`] of seven color
//! roles plus a font family. The palette is resolved once per render from
//! three layers, highest precedence first:
//!
//! 1. explicit per-call overrides (one option per role),
//! 2. a named theme from the built-in registry,
//! 3. the built-in default (white background, near-black foreground), with
//!    the secondary roles derived by mixing foreground into background.
//!
//! Asking for a theme name that is not registered is an error; there is no
//! silent fallback.

use thiserror::Error;

use crate::color::Color;

/// Color roles a renderer can ask for.
///
/// `bg` and `fg` are the anchor roles; the rest default to mixes of the two
/// when neither a theme nor an override supplies them.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub line: Color,
    pub accent: Color,
    pub muted: Color,
    pub surface: Color,
    pub border: Color,
    pub font_family: String,
}

/// Per-call palette overrides. `None` means "defer to the theme/default".
#[derive(Debug, Clone, Default)]
pub struct PaletteOverrides {
    pub bg: Option<String>,
    pub fg: Option<String>,
    pub line: Option<String>,
    pub accent: Option<String>,
    pub muted: Option<String>,
    pub surface: Option<String>,
    pub border: Option<String>,
    pub font: Option<String>,
}

/// Errors produced while resolving a palette.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("unknown theme `{name}` (known themes: {known})")]
    UnknownTheme { name: String, known: String },

    #[error("invalid color for `{role}`: {reason}")]
    InvalidColor { role: &'static str, reason: String },
}

/// Fallback anchors when nothing else is configured.
pub const DEFAULT_BG: &str = "#ffffff";
pub const DEFAULT_FG: &str = "#27272a";
pub const DEFAULT_FONT: &str = "Inter";

// Fraction of foreground mixed into background for each derived role.
const LINE_MIX: f32 = 0.62;
const MUTED_MIX: f32 = 0.55;
const BORDER_MIX: f32 = 0.18;
const SURFACE_MIX: f32 = 0.04;

struct ThemeSpec {
    name: &'static str,
    bg: &'static str,
    fg: &'static str,
    line: &'static str,
    accent: &'static str,
    muted: &'static str,
    surface: &'static str,
    border: &'static str,
}

// Kept in registration order; `theme_names` sorts on the way out.
static THEMES: &[ThemeSpec] = &[
    ThemeSpec {
        name: "tokyo-night",
        bg: "#1a1b26",
        fg: "#c0caf5",
        line: "#3b4261",
        accent: "#7aa2f7",
        muted: "#565f89",
        surface: "#24283b",
        border: "#414868",
    },
    ThemeSpec {
        name: "tokyo-night-light",
        bg: "#d5d6db",
        fg: "#343b58",
        line: "#9699a3",
        accent: "#34548a",
        muted: "#6c6e75",
        surface: "#cbccd1",
        border: "#a8aecb",
    },
    ThemeSpec {
        name: "dracula",
        bg: "#282a36",
        fg: "#f8f8f2",
        line: "#6272a4",
        accent: "#bd93f9",
        muted: "#6272a4",
        surface: "#44475a",
        border: "#6272a4",
    },
    ThemeSpec {
        name: "github-dark",
        bg: "#0d1117",
        fg: "#c9d1d9",
        line: "#30363d",
        accent: "#58a6ff",
        muted: "#8b949e",
        surface: "#161b22",
        border: "#30363d",
    },
    ThemeSpec {
        name: "github-light",
        bg: "#ffffff",
        fg: "#24292f",
        line: "#d0d7de",
        accent: "#0969da",
        muted: "#57606a",
        surface: "#f6f8fa",
        border: "#d0d7de",
    },
    ThemeSpec {
        name: "nord",
        bg: "#2e3440",
        fg: "#d8dee9",
        line: "#4c566a",
        accent: "#88c0d0",
        muted: "#616e88",
        surface: "#3b4252",
        border: "#4c566a",
    },
    ThemeSpec {
        name: "nord-light",
        bg: "#eceff4",
        fg: "#2e3440",
        line: "#d8dee9",
        accent: "#5e81ac",
        muted: "#4c566a",
        surface: "#e5e9f0",
        border: "#d8dee9",
    },
    ThemeSpec {
        name: "catppuccin-mocha",
        bg: "#1e1e2e",
        fg: "#cdd6f4",
        line: "#45475a",
        accent: "#cba6f7",
        muted: "#6c7086",
        surface: "#313244",
        border: "#45475a",
    },
    ThemeSpec {
        name: "catppuccin-latte",
        bg: "#eff1f5",
        fg: "#4c4f69",
        line: "#bcc0cc",
        accent: "#8839ef",
        muted: "#8c8fa1",
        surface: "#e6e9ef",
        border: "#bcc0cc",
    },
    ThemeSpec {
        name: "solarized-dark",
        bg: "#002b36",
        fg: "#839496",
        line: "#586e75",
        accent: "#268bd2",
        muted: "#586e75",
        surface: "#073642",
        border: "#586e75",
    },
    ThemeSpec {
        name: "solarized-light",
        bg: "#fdf6e3",
        fg: "#657b83",
        line: "#93a1a1",
        accent: "#268bd2",
        muted: "#93a1a1",
        surface: "#eee8d5",
        border: "#93a1a1",
    },
    ThemeSpec {
        name: "gruvbox-dark",
        bg: "#282828",
        fg: "#ebdbb2",
        line: "#504945",
        accent: "#fabd2f",
        muted: "#928374",
        surface: "#3c3836",
        border: "#504945",
    },
    ThemeSpec {
        name: "gruvbox-light",
        bg: "#fbf1c7",
        fg: "#3c3836",
        line: "#d5c4a1",
        accent: "#b57614",
        muted: "#7c6f64",
        surface: "#ebdbb2",
        border: "#d5c4a1",
    },
    ThemeSpec {
        name: "one-dark",
        bg: "#282c34",
        fg: "#abb2bf",
        line: "#3e4451",
        accent: "#61afef",
        muted: "#5c6370",
        surface: "#21252b",
        border: "#3e4451",
    },
    ThemeSpec {
        name: "monokai",
        bg: "#272822",
        fg: "#f8f8f2",
        line: "#49483e",
        accent: "#a6e22e",
        muted: "#75715e",
        surface: "#3e3d32",
        border: "#49483e",
    },
    ThemeSpec {
        name: "rose-pine",
        bg: "#191724",
        fg: "#e0def4",
        line: "#403d52",
        accent: "#c4a7e7",
        muted: "#6e6a86",
        surface: "#1f1d2e",
        border: "#26233a",
    },
];

/// Registered theme names, sorted lexicographically.
pub fn theme_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = THEMES.iter().map(|t| t.name).collect();
    names.sort_unstable();
    names
}

fn find_theme(name: &str) -> Result<&'static ThemeSpec, ThemeError> {
    THEMES
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| ThemeError::UnknownTheme {
            name: name.to_owned(),
            known: theme_names().join(", "),
        })
}

/// Resolves the full palette for a render call.
///
/// Every role is guaranteed to hold a valid color on success.
pub fn resolve(theme: Option<&str>, overrides: &PaletteOverrides) -> Result<Palette, ThemeError> {
    let theme = theme.map(find_theme).transpose()?;

    // Anchor strings for derivation; overrides beat the theme, which beats
    // the built-in default.
    let bg_base = overrides
        .bg
        .as_deref()
        .or(theme.map(|t| t.bg))
        .unwrap_or(DEFAULT_BG);
    let fg_base = overrides
        .fg
        .as_deref()
        .or(theme.map(|t| t.fg))
        .unwrap_or(DEFAULT_FG);

    let derived = |mix: f32, fallback: &str| -> String {
        mix_hex(fg_base, bg_base, mix).unwrap_or_else(|| fallback.to_owned())
    };

    let pick = |over: &Option<String>, themed: Option<&str>, mix: f32, fallback: &str| -> String {
        over.clone()
            .or_else(|| themed.map(str::to_owned))
            .unwrap_or_else(|| derived(mix, fallback))
    };

    let line = pick(&overrides.line, theme.map(|t| t.line), LINE_MIX, fg_base);
    let muted = pick(&overrides.muted, theme.map(|t| t.muted), MUTED_MIX, fg_base);
    let border = pick(
        &overrides.border,
        theme.map(|t| t.border),
        BORDER_MIX,
        fg_base,
    );
    let surface = pick(
        &overrides.surface,
        theme.map(|t| t.surface),
        SURFACE_MIX,
        bg_base,
    );
    let accent = overrides
        .accent
        .clone()
        .or_else(|| theme.map(|t| t.accent.to_owned()))
        .unwrap_or_else(|| fg_base.to_owned());

    let parse = |role: &'static str, value: &str| -> Result<Color, ThemeError> {
        Color::new(value).map_err(|reason| ThemeError::InvalidColor { role, reason })
    };

    Ok(Palette {
        bg: parse("bg", bg_base)?,
        fg: parse("fg", fg_base)?,
        line: parse("line", &line)?,
        accent: parse("accent", &accent)?,
        muted: parse("muted", &muted)?,
        surface: parse("surface", &surface)?,
        border: parse("border", &border)?,
        font_family: overrides
            .font
            .clone()
            .unwrap_or_else(|| DEFAULT_FONT.to_owned()),
    })
}

/// Linear sRGB-component mix of two hex colors; `t` is the fraction of `a`.
///
/// Returns `None` when either input is not a parseable hex triplet, in which
/// case the caller falls back to an anchor role directly.
fn mix_hex(a: &str, b: &str, t: f32) -> Option<String> {
    let (ar, ag, ab) = parse_hex_rgb(a)?;
    let (br, bg, bb) = parse_hex_rgb(b)?;
    let mix = |x: u8, y: u8| -> u8 {
        let v = f32::from(x) * t + f32::from(y) * (1.0 - t);
        v.round().clamp(0.0, 255.0) as u8
    };
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        mix(ar, br),
        mix(ag, bg),
        mix(ab, bb)
    ))
}

fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    let expand = |nibble: u8| nibble << 4 | nibble;
    match hex.len() {
        3 => {
            let v = u16::from_str_radix(hex, 16).ok()?;
            Some((
                expand(((v >> 8) & 0xf) as u8),
                expand(((v >> 4) & 0xf) as u8),
                expand((v & 0xf) as u8),
            ))
        }
        6 | 8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}
