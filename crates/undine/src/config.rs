//! Configuration types for diagram rendering.
//!
//! This module provides [`RenderConfig`], which controls layout spacing and
//! text metrics. All types implement [`serde::Deserialize`] so a config can
//! be loaded from an external TOML file; every field has a default and may
//! be omitted.
//!
//! # Example
//!
//! ```
//! # use undine::config::RenderConfig;
//! let config = RenderConfig::default();
//! assert!(config.rank_gap() > config.text().font_size());
//! ```

use serde::Deserialize;

use undine_core::geometry::Insets;

/// Spacing and text-metric configuration for the layout engines.
///
/// Distances are in SVG user units. The text-grid renderer derives its own
/// integer geometry and only consults the text metrics indirectly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Gap between adjacent nodes within one rank.
    node_gap: f32,

    /// Gap between consecutive ranks, which is also the routing channel.
    rank_gap: f32,

    /// Horizontal gap between participant boxes in a sequence diagram.
    participant_gap: f32,

    /// Vertical distance between consecutive message slots.
    message_gap: f32,

    /// Padding between a node's label and its outline.
    node_padding: f32,

    /// Text measurement settings shared by layout and the SVG renderer.
    text: TextMetrics,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_gap: 40.0,
            rank_gap: 60.0,
            participant_gap: 40.0,
            message_gap: 45.0,
            node_padding: 12.0,
            text: TextMetrics::default(),
        }
    }
}

impl RenderConfig {
    pub fn node_gap(&self) -> f32 {
        self.node_gap
    }

    pub fn rank_gap(&self) -> f32 {
        self.rank_gap
    }

    pub fn participant_gap(&self) -> f32 {
        self.participant_gap
    }

    pub fn message_gap(&self) -> f32 {
        self.message_gap
    }

    /// Uniform padding insets around node labels.
    pub fn node_padding(&self) -> Insets {
        Insets::uniform(self.node_padding)
    }

    pub fn text(&self) -> &TextMetrics {
        &self.text
    }
}

/// Deterministic text metrics.
///
/// Label sizes are computed from Unicode column widths, never from font
/// files, so the same input produces the same output on every machine.
/// `glyph_advance` is the width of one character cell as a fraction of the
/// font size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextMetrics {
    font_size: f32,
    glyph_advance: f32,
    line_height: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            glyph_advance: 0.6,
            line_height: 1.4,
        }
    }
}

impl TextMetrics {
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Horizontal advance of one character cell in user units.
    pub fn cell_width(&self) -> f32 {
        self.font_size * self.glyph_advance
    }

    /// Vertical advance of one text line in user units.
    pub fn cell_height(&self) -> f32 {
        self.font_size * self.line_height
    }
}
