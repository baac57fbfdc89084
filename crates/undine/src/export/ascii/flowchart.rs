//! Text-grid rendering for flowcharts.
//!
//! Boxes are sized from label cells and padding, ranks from the layout's
//! rank/order structure. Edges draw first, boxes second, arrowheads last,
//! so a run passing under a box disappears behind it while arrowheads
//! always stay visible.

use std::collections::HashMap;

use undine_core::semantic::{Flowchart, NodeShape};

use crate::{
    export::ascii::{AsciiOptions, CellGrid, Glyphs},
    layout::{FlowchartLayout, text},
};

/// Rows between ranks in vertical layouts: entry run, channel run, arrow.
const V_CHANNEL: usize = 3;

/// Columns between ranks in horizontal layouts.
const H_CHANNEL: usize = 5;

/// Cells between adjacent boxes within a rank.
const BOX_GAP: usize = 3;

/// Integer box geometry for one node.
#[derive(Debug, Clone, Copy)]
struct NodeBox {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl NodeBox {
    fn center_x(&self) -> usize {
        self.x + self.w / 2
    }

    fn center_y(&self) -> usize {
        self.y + self.h / 2
    }

    fn right(&self) -> usize {
        self.x + self.w - 1
    }

    fn bottom(&self) -> usize {
        self.y + self.h - 1
    }
}

pub(crate) fn render_flowchart(
    chart: &Flowchart,
    layout: &FlowchartLayout,
    options: &AsciiOptions,
) -> String {
    let glyphs = Glyphs::for_options(options);
    let horizontal = chart.direction.is_horizontal();

    let sizes: HashMap<&str, (usize, usize)> = layout
        .nodes
        .iter()
        .map(|node| {
            let cells = node
                .lines
                .iter()
                .map(|line| text::line_cells(line))
                .max()
                .unwrap_or(1)
                .max(1);
            let w = cells + 2 * options.padding_x as usize + 2;
            let h = node.lines.len() + 2 * options.padding_y as usize + 2;
            (node.id.as_str(), (w, h))
        })
        .collect();

    let boxes = place_boxes(layout, &sizes, horizontal, chart.direction.is_reversed());

    let mut grid = CellGrid::new();
    let mut arrows: Vec<(usize, usize, char)> = Vec::new();

    for edge_layout in &layout.edges {
        let edge = &chart.edges[edge_layout.index];
        let from = boxes[edge.from.as_str()];
        let to = boxes[edge.to.as_str()];
        let line = if edge.line == undine_core::semantic::EdgeLine::Dotted {
            (glyphs.dash, glyphs.dash)
        } else {
            (glyphs.horizontal, glyphs.vertical)
        };
        if edge.from == edge.to {
            draw_self_loop(&mut grid, &mut arrows, from, &glyphs, line);
        } else if horizontal {
            draw_horizontal(&mut grid, &mut arrows, from, to, &glyphs, line, edge.label.as_deref());
        } else {
            draw_vertical(&mut grid, &mut arrows, from, to, &glyphs, line, edge.label.as_deref());
        }
    }

    for node_layout in &layout.nodes {
        let node = &chart.nodes[&node_layout.id];
        let geometry = boxes[node_layout.id.as_str()];
        draw_box(&mut grid, geometry, node.shape, &node_layout.lines, &glyphs, options);
    }

    for (x, y, c) in arrows {
        grid.put(x, y, c);
    }

    grid.render()
}

/// Places every box on the integer grid: ranks advance along the flow
/// axis, each rank centered on the cross axis.
fn place_boxes<'a>(
    layout: &'a FlowchartLayout,
    sizes: &HashMap<&'a str, (usize, usize)>,
    horizontal: bool,
    reversed: bool,
) -> HashMap<&'a str, NodeBox> {
    let rank_count = layout.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0);
    let mut ranks: Vec<Vec<&str>> = vec![Vec::new(); rank_count];
    let mut ordered: Vec<&crate::layout::NodeLayout> = layout.nodes.iter().collect();
    ordered.sort_by_key(|node| (node.rank, node.order));
    for node in ordered {
        ranks[node.rank].push(node.id.as_str());
    }
    if reversed {
        ranks.reverse();
    }

    // In vertical layouts main = rows, cross = columns; horizontal swaps.
    let main_of = |id: &str| if horizontal { sizes[id].0 } else { sizes[id].1 };
    let cross_of = |id: &str| if horizontal { sizes[id].1 } else { sizes[id].0 };
    let channel = if horizontal { H_CHANNEL } else { V_CHANNEL };

    let cross_span = |rank: &[&str]| -> usize {
        rank.iter().map(|&id| cross_of(id)).sum::<usize>() + BOX_GAP * rank.len().saturating_sub(1)
    };
    let total_cross = ranks.iter().map(|rank| cross_span(rank)).max().unwrap_or(0);

    let mut boxes = HashMap::new();
    let mut main_cursor = 0usize;
    for rank in &ranks {
        let extent = rank.iter().map(|&id| main_of(id)).max().unwrap_or(0);
        let mut cross_cursor = (total_cross - cross_span(rank)) / 2;
        for &id in rank {
            let (w, h) = sizes[id];
            let (x, y) = if horizontal {
                (main_cursor + (extent - w) / 2, cross_cursor)
            } else {
                (cross_cursor, main_cursor + (extent - h) / 2)
            };
            boxes.insert(id, NodeBox { x, y, w, h });
            cross_cursor += cross_of(id) + BOX_GAP;
        }
        main_cursor += extent + channel;
    }
    boxes
}

/// Routes one edge in a vertical (TB/BT) layout.
fn draw_vertical(
    grid: &mut CellGrid,
    arrows: &mut Vec<(usize, usize, char)>,
    from: NodeBox,
    to: NodeBox,
    glyphs: &Glyphs,
    (h_char, v_char): (char, char),
    label: Option<&str>,
) {
    let (src_x, tgt_x) = (from.center_x(), to.center_x());
    if to.y > from.bottom() {
        // Downward: out the bottom, across the channel, arrow above the
        // target's top border.
        let mid = to.y - 2;
        grid.vline(src_x, from.bottom() + 1, mid, v_char);
        grid.hline(src_x, tgt_x, mid, h_char);
        grid.vline(tgt_x, mid, to.y - 1, v_char);
        arrows.push((tgt_x, to.y - 1, glyphs.arrow_down));
        place_label(grid, label, src_x, tgt_x, mid);
    } else if to.bottom() < from.y {
        // Upward back edge.
        let mid = to.bottom() + 2;
        grid.vline(src_x, mid, from.y.saturating_sub(1), v_char);
        grid.hline(src_x, tgt_x, mid, h_char);
        grid.vline(tgt_x, to.bottom() + 1, mid, v_char);
        arrows.push((tgt_x, to.bottom() + 1, glyphs.arrow_up));
        place_label(grid, label, src_x, tgt_x, mid);
    } else {
        // Same band: loop through the channel below both boxes.
        let mid = from.bottom().max(to.bottom()) + 2;
        grid.vline(src_x, from.bottom() + 1, mid, v_char);
        grid.hline(src_x, tgt_x, mid, h_char);
        grid.vline(tgt_x, to.bottom() + 1, mid, v_char);
        arrows.push((tgt_x, to.bottom() + 1, glyphs.arrow_up));
        place_label(grid, label, src_x, tgt_x, mid);
    }
}

/// Routes one edge in a horizontal (LR/RL) layout.
fn draw_horizontal(
    grid: &mut CellGrid,
    arrows: &mut Vec<(usize, usize, char)>,
    from: NodeBox,
    to: NodeBox,
    glyphs: &Glyphs,
    (h_char, v_char): (char, char),
    label: Option<&str>,
) {
    let (src_y, tgt_y) = (from.center_y(), to.center_y());
    if to.x > from.right() {
        let mid = to.x - 3;
        grid.hline(from.right() + 1, mid, src_y, h_char);
        grid.vline(mid, src_y, tgt_y, v_char);
        grid.hline(mid, to.x - 1, tgt_y, h_char);
        arrows.push((to.x - 1, tgt_y, glyphs.arrow_right));
        if let Some(text) = label {
            grid.text(mid.saturating_sub(text::line_cells(text) / 2), tgt_y.saturating_sub(1), text);
        }
    } else if to.right() < from.x {
        let mid = to.right() + 3;
        grid.hline(mid, from.x.saturating_sub(1), src_y, h_char);
        grid.vline(mid, src_y, tgt_y, v_char);
        grid.hline(to.right() + 1, mid, tgt_y, h_char);
        arrows.push((to.right() + 1, tgt_y, glyphs.arrow_left));
        if let Some(text) = label {
            grid.text(mid.saturating_sub(text::line_cells(text) / 2), tgt_y.saturating_sub(1), text);
        }
    } else {
        // Same band: loop through the channel right of both boxes.
        let mid = from.right().max(to.right()) + 2;
        grid.hline(from.right() + 1, mid, src_y, h_char);
        grid.vline(mid, src_y, tgt_y, v_char);
        grid.hline(to.right() + 1, mid, tgt_y, h_char);
        arrows.push((to.right() + 1, tgt_y, glyphs.arrow_left));
    }
}

/// A self-loop lobe on the node's right side.
fn draw_self_loop(
    grid: &mut CellGrid,
    arrows: &mut Vec<(usize, usize, char)>,
    node: NodeBox,
    glyphs: &Glyphs,
    (h_char, v_char): (char, char),
) {
    let top = node.center_y().saturating_sub(1);
    let bottom = node.center_y() + 1;
    let out = node.right() + 3;
    grid.hline(node.right() + 1, out, top, h_char);
    grid.vline(out, top, bottom, v_char);
    grid.hline(node.right() + 2, out, bottom, h_char);
    arrows.push((node.right() + 1, bottom, glyphs.arrow_left));
}

/// Centers an edge label on the channel run when there is room.
fn place_label(grid: &mut CellGrid, label: Option<&str>, src_x: usize, tgt_x: usize, row: usize) {
    let Some(text) = label else { return };
    let cells = text::line_cells(text);
    let center = src_x.midpoint(tgt_x);
    let start = center.saturating_sub(cells / 2);
    grid.text(start, row, text);
}

/// Draws one node box with its label, shape hinted by corner glyphs.
fn draw_box(
    grid: &mut CellGrid,
    geometry: NodeBox,
    shape: NodeShape,
    lines: &[String],
    glyphs: &Glyphs,
    options: &AsciiOptions,
) {
    let (corners, sides) = shape_glyphs(shape, glyphs, options.use_ascii);
    grid.frame(geometry.x, geometry.y, geometry.w, geometry.h, glyphs, corners, sides);

    if shape == NodeShape::Subroutine && geometry.w > 5 {
        grid.vline(geometry.x + 2, geometry.y + 1, geometry.bottom() - 1, sides[0]);
        grid.vline(geometry.right() - 2, geometry.y + 1, geometry.bottom() - 1, sides[1]);
    }

    let inner_w = geometry.w - 2;
    let top = geometry.y + 1 + options.padding_y as usize;
    for (idx, line) in lines.iter().enumerate() {
        let cells = text::line_cells(line);
        let x = geometry.x + 1 + (inner_w.saturating_sub(cells)) / 2;
        grid.text(x, top + idx, line);
    }
}

/// Corner and side characters per shape: rounded shapes soften their
/// corners, diamonds hint their slanted sides in ASCII mode.
fn shape_glyphs(shape: NodeShape, glyphs: &Glyphs, use_ascii: bool) -> ([char; 4], [char; 2]) {
    let standard = (
        [
            glyphs.top_left,
            glyphs.top_right,
            glyphs.bottom_right,
            glyphs.bottom_left,
        ],
        [glyphs.vertical, glyphs.vertical],
    );
    match shape {
        NodeShape::Rounded => {
            if use_ascii {
                (['.', '.', '\'', '\''], standard.1)
            } else {
                (['╭', '╮', '╯', '╰'], standard.1)
            }
        }
        NodeShape::Stadium | NodeShape::Circle => {
            if use_ascii {
                (['.', '.', '\'', '\''], ['(', ')'])
            } else {
                (['╭', '╮', '╯', '╰'], standard.1)
            }
        }
        NodeShape::Diamond if use_ascii => (['/', '\\', '/', '\\'], standard.1),
        _ => standard,
    }
}
