//! SVG rendering.
//!
//! Produces a complete standalone SVG document string. Element order
//! follows model declaration order and floats are formatted with a fixed
//! precision, so the same layout always yields the identical document.

use svg::{
    Document,
    node::{Text as RawText, element as svg_element},
};

use undine_core::{
    geometry::{Bounds, Point},
    semantic::StyleOverride,
    theme::Palette,
};

use crate::config::RenderConfig;

mod flowchart;
mod sequence;

pub(crate) use flowchart::render_flowchart;
pub(crate) use sequence::render_sequence;

/// Margin around the diagram content in user units.
const MARGIN: f32 = 20.0;

/// Fixed-precision float formatting keeps the output byte-stable.
fn fmt(value: f32) -> String {
    format!("{value:.2}")
}

/// Escapes text for use inside an SVG text node.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shared drawing state for one document.
struct Canvas<'a> {
    palette: &'a Palette,
    config: &'a RenderConfig,
    markers: MarkerSet,
    transparent: bool,
}

impl<'a> Canvas<'a> {
    fn new(palette: &'a Palette, config: &'a RenderConfig, transparent: bool) -> Self {
        Self {
            palette,
            config,
            markers: MarkerSet::default(),
            transparent,
        }
    }

    /// Assembles the final document: viewBox from the content bounds plus
    /// margin, optional background, marker definitions, then the content
    /// group.
    fn into_document(self, bounds: Bounds, content: svg_element::Group) -> String {
        let min_x = bounds.min_x() - MARGIN;
        let min_y = bounds.min_y() - MARGIN;
        let width = bounds.width() + MARGIN * 2.0;
        let height = bounds.height() + MARGIN * 2.0;

        let mut document = Document::new()
            .set("width", fmt(width))
            .set("height", fmt(height))
            .set(
                "viewBox",
                format!("{} {} {} {}", fmt(min_x), fmt(min_y), fmt(width), fmt(height)),
            );

        if !self.transparent {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("x", fmt(min_x))
                    .set("y", fmt(min_y))
                    .set("width", fmt(width))
                    .set("height", fmt(height))
                    .set("fill", &self.palette.bg),
            );
        }

        document = document.add(self.markers.into_defs());
        document.add(content).to_string()
    }

    /// A multi-line text block centered on `center`.
    fn text_block(&self, lines: &[String], center: Point, color: &str) -> svg_element::Text {
        let cell_height = self.config.text().cell_height();
        let first_y = center.y() - cell_height * (lines.len().saturating_sub(1)) as f32 / 2.0;

        let mut text = svg_element::Text::new("")
            .set("x", fmt(center.x()))
            .set("y", fmt(first_y))
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", self.palette.font_family.as_str())
            .set("font-size", fmt(self.config.text().font_size()))
            .set("fill", color);

        if lines.len() == 1 {
            return text.add(RawText::new(escape(&lines[0])));
        }
        for (idx, line) in lines.iter().enumerate() {
            let tspan = svg_element::TSpan::new("")
                .set("x", fmt(center.x()))
                .set("dy", if idx == 0 { fmt(0.0) } else { fmt(cell_height) })
                .add(RawText::new(escape(line)));
            text = text.add(tspan);
        }
        text
    }

    /// Fill color for a node: style override when it parses, else the
    /// palette surface.
    fn fill_of(&self, style: Option<&StyleOverride>) -> String {
        style
            .and_then(StyleOverride::fill)
            .filter(|color| color_is_valid(color))
            .map(str::to_owned)
            .unwrap_or_else(|| self.palette.surface.to_string())
    }

    fn stroke_of(&self, style: Option<&StyleOverride>, default: &str) -> String {
        style
            .and_then(StyleOverride::stroke)
            .filter(|color| color_is_valid(color))
            .map(str::to_owned)
            .unwrap_or_else(|| default.to_owned())
    }

    fn text_color_of(&self, style: Option<&StyleOverride>, default: &str) -> String {
        style
            .and_then(StyleOverride::text_color)
            .filter(|color| color_is_valid(color))
            .map(str::to_owned)
            .unwrap_or_else(|| default.to_owned())
    }
}

/// A bad color in a source-level override renders as if absent.
fn color_is_valid(color: &str) -> bool {
    undine_core::color::Color::new(color).is_ok()
}

/// Path data for a polyline in draw order.
fn polyline_data(points: &[Point]) -> String {
    let mut data = String::new();
    for (idx, point) in points.iter().enumerate() {
        let op = if idx == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{op} {} {} ", fmt(point.x()), fmt(point.y())));
    }
    data.trim_end().to_owned()
}

/// Arrowhead kinds that render as `<marker>` definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Arrow,
    Circle,
    Cross,
    Open,
}

impl MarkerKind {
    fn name(self) -> &'static str {
        match self {
            MarkerKind::Arrow => "arrow",
            MarkerKind::Circle => "circle",
            MarkerKind::Cross => "cross",
            MarkerKind::Open => "open",
        }
    }
}

/// Collects the `(kind, color)` pairs actually used, in first-use order,
/// and emits one `<marker>` per pair.
#[derive(Debug, Default)]
struct MarkerSet {
    used: Vec<(MarkerKind, String)>,
}

impl MarkerSet {
    /// Marker reference (`url(#...)`) for the given kind and stroke color.
    fn reference(&mut self, kind: MarkerKind, color: &str) -> String {
        format!("url(#{})", self.id(kind, color))
    }

    fn id(&mut self, kind: MarkerKind, color: &str) -> String {
        let key = (kind, color.to_owned());
        if !self.used.contains(&key) {
            self.used.push(key);
        }
        format!("{}-{}", kind.name(), id_safe(color))
    }

    fn into_defs(self) -> svg_element::Definitions {
        let mut defs = svg_element::Definitions::new();
        for (kind, color) in self.used {
            defs = defs.add(marker_element(kind, &color));
        }
        defs
    }
}

fn id_safe(color: &str) -> String {
    color
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn marker_element(kind: MarkerKind, color: &str) -> svg_element::Marker {
    let marker = svg_element::Marker::new()
        .set("id", format!("{}-{}", kind.name(), id_safe(color)))
        .set("markerWidth", 12)
        .set("markerHeight", 12)
        .set("refX", 9)
        .set("refY", 5)
        .set("orient", "auto")
        .set("markerUnits", "userSpaceOnUse");

    match kind {
        MarkerKind::Arrow => marker.add(
            svg_element::Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10 z")
                .set("fill", color),
        ),
        MarkerKind::Open => marker.add(
            svg_element::Path::new()
                .set("d", "M 0 0 L 10 5 L 0 10")
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", 1.5),
        ),
        MarkerKind::Circle => marker.add(
            svg_element::Circle::new()
                .set("cx", 6)
                .set("cy", 5)
                .set("r", 3.5)
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", 1.5),
        ),
        MarkerKind::Cross => marker.add(
            svg_element::Path::new()
                .set("d", "M 2 1 L 10 9 M 10 1 L 2 9")
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-width", 1.5),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_covers_markup_characters() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_fmt_is_fixed_precision() {
        assert_eq!(fmt(1.0), "1.00");
        assert_eq!(fmt(2.345), "2.35");
        assert_eq!(fmt(-0.5), "-0.50");
    }

    #[test]
    fn test_polyline_data() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 5.0)];
        assert_eq!(
            polyline_data(&points),
            "M 0.00 0.00 L 10.00 0.00 L 10.00 5.00"
        );
    }

    #[test]
    fn test_marker_set_deduplicates() {
        let mut markers = MarkerSet::default();
        let a = markers.reference(MarkerKind::Arrow, "#ff0000");
        let b = markers.reference(MarkerKind::Arrow, "#ff0000");
        let c = markers.reference(MarkerKind::Cross, "#ff0000");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(markers.used.len(), 2);
    }

    #[test]
    fn test_id_safe_strips_punctuation() {
        assert_eq!(id_safe("#ff0000"), "-ff0000");
        assert_eq!(id_safe("rebeccapurple"), "rebeccapurple");
    }
}
