//! SVG rendering for flowcharts.

use svg::node::element as svg_element;

use undine_core::{
    geometry::{Bounds, Point},
    semantic::{ArrowHead, EdgeLine, Flowchart, NodeShape, StyleOverride},
    theme::Palette,
};

use crate::{
    config::RenderConfig,
    export::svg::{Canvas, MarkerKind, fmt, polyline_data},
    layout::FlowchartLayout,
};

/// Dash pattern for dotted edges without an explicit override.
const DOTTED_DASHES: &str = "5 5";

pub(crate) fn render_flowchart(
    chart: &Flowchart,
    layout: &FlowchartLayout,
    palette: &Palette,
    config: &RenderConfig,
    transparent: bool,
) -> String {
    let mut canvas = Canvas::new(palette, config, transparent);
    let mut content = svg_element::Group::new();

    // Frames sit behind everything, outermost first.
    for frame in &layout.frames {
        content = content.add(frame_group(&canvas, chart, frame));
    }

    for edge_layout in &layout.edges {
        let edge = &chart.edges[edge_layout.index];
        let style = edge.style.as_ref();
        let stroke = canvas.stroke_of(style, &palette.line.to_string());

        let mut path = svg_element::Path::new()
            .set("d", polyline_data(&edge_layout.points))
            .set("fill", "none")
            .set("stroke", stroke.as_str())
            .set("stroke-width", stroke_width(style, edge.line));

        let dasharray = style
            .and_then(StyleOverride::dasharray)
            .map(str::to_owned)
            .or_else(|| (edge.line == EdgeLine::Dotted).then(|| DOTTED_DASHES.to_owned()));
        if let Some(dashes) = dasharray {
            path = path.set("stroke-dasharray", dashes);
        }

        if let Some(kind) = head_marker(edge.head) {
            path = path.set("marker-end", canvas.markers.reference(kind, &stroke));
        }
        content = content.add(path);

        if let (Some(label), Some(at)) = (&edge.label, edge_layout.label_at) {
            let lines = vec![label.clone()];
            content = content.add(canvas.text_block(&lines, at, &palette.muted.to_string()));
        }
    }

    for node_layout in &layout.nodes {
        let node = &chart.nodes[&node_layout.id];
        let style = node.style.as_ref();
        let group = svg_element::Group::new()
            .set("id", format!("node-{}", node.id))
            .add(shape_element(&canvas, node.shape, node_layout.bounds, style))
            .add(canvas.text_block(
                &node_layout.lines,
                node_layout.bounds.center(),
                &canvas.text_color_of(style, &palette.fg.to_string()),
            ));
        content = content.add(group);
    }

    canvas.into_document(layout.bounds, content)
}

fn frame_group(canvas: &Canvas<'_>, chart: &Flowchart, frame: &crate::layout::FrameLayout) -> svg_element::Group {
    let bounds = frame.bounds;
    let palette = canvas.palette;
    let rect = svg_element::Rectangle::new()
        .set("x", fmt(bounds.min_x()))
        .set("y", fmt(bounds.min_y()))
        .set("width", fmt(bounds.width()))
        .set("height", fmt(bounds.height()))
        .set("fill", "none")
        .set("stroke", &palette.border)
        .set("stroke-width", 1.0)
        .set("rx", 4);

    let title = &chart.subgraphs[frame.subgraph].title;
    let title_at = Point::new(
        bounds.min_x() + bounds.width() / 2.0,
        bounds.min_y() + canvas.config.text().cell_height() / 2.0 + 2.0,
    );
    let lines = vec![title.clone()];
    svg_element::Group::new()
        .add(rect)
        .add(canvas.text_block(&lines, title_at, &palette.muted.to_string()))
}

fn stroke_width(style: Option<&StyleOverride>, line: EdgeLine) -> String {
    if let Some(width) = style.and_then(StyleOverride::stroke_width) {
        return width.to_owned();
    }
    match line {
        EdgeLine::Thick => fmt(3.0),
        _ => fmt(1.5),
    }
}

fn head_marker(head: ArrowHead) -> Option<MarkerKind> {
    match head {
        ArrowHead::None => None,
        ArrowHead::Arrow => Some(MarkerKind::Arrow),
        ArrowHead::Circle => Some(MarkerKind::Circle),
        ArrowHead::Cross => Some(MarkerKind::Cross),
    }
}

/// The outline for one node shape, with style overrides applied.
fn shape_element(
    canvas: &Canvas<'_>,
    shape: NodeShape,
    bounds: Bounds,
    style: Option<&StyleOverride>,
) -> Box<dyn svg::Node> {
    let fill = canvas.fill_of(style);
    let stroke = canvas.stroke_of(style, &canvas.palette.border.to_string());
    let stroke_width = style
        .and_then(StyleOverride::stroke_width)
        .map(str::to_owned)
        .unwrap_or_else(|| fmt(1.5));

    let rect = |rx: f32| {
        svg_element::Rectangle::new()
            .set("x", fmt(bounds.min_x()))
            .set("y", fmt(bounds.min_y()))
            .set("width", fmt(bounds.width()))
            .set("height", fmt(bounds.height()))
            .set("fill", fill.as_str())
            .set("stroke", stroke.as_str())
            .set("stroke-width", stroke_width.as_str())
            .set("rx", fmt(rx))
    };
    let polygon = |points: Vec<Point>| {
        let list: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", fmt(p.x()), fmt(p.y())))
            .collect();
        svg_element::Polygon::new()
            .set("points", list.join(" "))
            .set("fill", fill.as_str())
            .set("stroke", stroke.as_str())
            .set("stroke-width", stroke_width.as_str())
    };

    let center = bounds.center();
    match shape {
        NodeShape::Rectangle => Box::new(rect(0.0)),
        NodeShape::Rounded => Box::new(rect(6.0)),
        NodeShape::Stadium => Box::new(rect(bounds.height() / 2.0)),
        NodeShape::Subroutine => {
            let inset = 6.0;
            let side = |x: f32| {
                svg_element::Line::new()
                    .set("x1", fmt(x))
                    .set("y1", fmt(bounds.min_y()))
                    .set("x2", fmt(x))
                    .set("y2", fmt(bounds.max_y()))
                    .set("stroke", stroke.as_str())
                    .set("stroke-width", stroke_width.as_str())
            };
            Box::new(
                svg_element::Group::new()
                    .add(rect(0.0))
                    .add(side(bounds.min_x() + inset))
                    .add(side(bounds.max_x() - inset)),
            )
        }
        NodeShape::Circle => Box::new(
            svg_element::Circle::new()
                .set("cx", fmt(center.x()))
                .set("cy", fmt(center.y()))
                .set("r", fmt(bounds.width() / 2.0))
                .set("fill", fill.as_str())
                .set("stroke", stroke.as_str())
                .set("stroke-width", stroke_width.as_str()),
        ),
        NodeShape::Diamond => Box::new(polygon(vec![
            Point::new(center.x(), bounds.min_y()),
            Point::new(bounds.max_x(), center.y()),
            Point::new(center.x(), bounds.max_y()),
            Point::new(bounds.min_x(), center.y()),
        ])),
        NodeShape::Flag => {
            let notch = bounds.height() * 0.3;
            Box::new(polygon(vec![
                Point::new(bounds.min_x(), bounds.min_y()),
                Point::new(bounds.max_x(), bounds.min_y()),
                Point::new(bounds.max_x(), bounds.max_y()),
                Point::new(bounds.min_x(), bounds.max_y()),
                Point::new(bounds.min_x() + notch, center.y()),
            ]))
        }
    }
}
