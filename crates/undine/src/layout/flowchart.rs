//! Layered flowchart layout.
//!
//! A Sugiyama-style pipeline: neutralize cycles, assign ranks by longest
//! path, reduce crossings with a fixed number of barycenter sweeps, then
//! assign coordinates and route edges orthogonally through the inter-rank
//! channels. Every step is deterministic; ties always keep declaration
//! order.

use std::collections::HashMap;

use log::debug;

use undine_core::{
    geometry::{Bounds, Point, Size},
    semantic::{Direction, Flowchart, NodeShape},
};

use crate::{
    config::RenderConfig,
    layout::{EdgeLayout, FlowchartLayout, FrameLayout, LayoutError, NodeLayout, text},
};

/// Barycenter sweeps are cheap; a fixed count keeps the output independent
/// of any convergence threshold.
const ORDERING_SWEEPS: usize = 4;

/// Cross-axis size of a self-loop lobe.
const LOBE_EXTENT: f32 = 24.0;

pub fn layout(chart: &Flowchart, config: &RenderConfig) -> Result<FlowchartLayout, LayoutError> {
    check_subgraph_forest(chart)?;

    let index_of: HashMap<&str, usize> = chart
        .nodes
        .keys()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    for edge in &chart.edges {
        for id in [&edge.from, &edge.to] {
            if !index_of.contains_key(id.as_str()) {
                return Err(LayoutError::UnknownNode { id: id.clone() });
            }
        }
    }

    let n = chart.nodes.len();
    if n == 0 {
        return Ok(FlowchartLayout::default());
    }

    let forward = forward_edges(chart, &index_of);
    let ranks = assign_ranks(n, &forward);
    let components = assign_components(chart, n, &index_of);
    let mut order = initial_order(&ranks);
    sweep_orders(&mut order, &ranks, &forward);
    group_ranks(&mut order, chart, &components);
    debug!(
        nodes = n,
        ranks = order.len(),
        components = components.iter().max().map_or(0, |c| c + 1);
        "flowchart ranked"
    );

    let sizes: Vec<Size> = chart
        .nodes
        .values()
        .map(|node| node_size(node, config))
        .collect();
    let label_lines: Vec<Vec<String>> = chart
        .nodes
        .values()
        .map(|node| text::label_lines(&node.label))
        .collect();

    let centers = place(&order, &ranks, &sizes, chart.direction, config);

    let mut nodes = Vec::with_capacity(n);
    let mut order_within = vec![0usize; n];
    for rank_nodes in &order {
        for (pos, &node) in rank_nodes.iter().enumerate() {
            order_within[node] = pos;
        }
    }
    for (idx, id) in chart.nodes.keys().enumerate() {
        nodes.push(NodeLayout {
            id: id.clone(),
            rank: ranks[idx],
            order: order_within[idx],
            bounds: Bounds::from_center(centers[idx], sizes[idx]),
            lines: label_lines[idx].clone(),
        });
    }

    let edges = route_edges(chart, &index_of, &nodes, config);
    let frames = build_frames(chart, &nodes, config);

    let mut bounds = nodes[0].bounds;
    for node in &nodes[1..] {
        bounds = bounds.merge(&node.bounds);
    }
    for edge in &edges {
        for point in &edge.points {
            bounds = bounds.merge(&Bounds::from_center(*point, Size::default()));
        }
    }
    for frame in &frames {
        bounds = bounds.merge(&frame.bounds);
    }

    Ok(FlowchartLayout {
        nodes,
        edges,
        frames,
        bounds,
    })
}

/// Subgraph membership must form a forest; a parent chain that loops is
/// unrepresentable in parsed input but possible in a hand-built model.
fn check_subgraph_forest(chart: &Flowchart) -> Result<(), LayoutError> {
    for (idx, subgraph) in chart.subgraphs.iter().enumerate() {
        let mut seen = vec![idx];
        let mut current = subgraph.parent;
        while let Some(parent) = current {
            if seen.contains(&parent) || parent >= chart.subgraphs.len() {
                return Err(LayoutError::SubgraphCycle {
                    id: subgraph.id.clone(),
                });
            }
            seen.push(parent);
            current = chart.subgraphs[parent].parent;
        }
    }
    Ok(())
}

/// Forward (non-back, non-self) edges as `(from, to)` node indices.
///
/// A DFS in declaration order marks edges that point back into the current
/// stack; those still get drawn but are ignored for ranking.
fn forward_edges(chart: &Flowchart, index_of: &HashMap<&str, usize>) -> Vec<(usize, usize)> {
    let n = chart.nodes.len();
    let mut out: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (edge_idx, edge) in chart.edges.iter().enumerate() {
        let from = index_of[edge.from.as_str()];
        let to = index_of[edge.to.as_str()];
        if from != to {
            out[from].push((edge_idx, to));
        }
    }

    let mut back = vec![false; chart.edges.len()];
    // 0 unvisited, 1 on stack, 2 done
    let mut state = vec![0u8; n];
    for root in 0..n {
        if state[root] != 0 {
            continue;
        }
        // Iterative DFS; the stack holds (node, next out-edge position).
        let mut stack = vec![(root, 0usize)];
        state[root] = 1;
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if next >= out[node].len() {
                state[node] = 2;
                stack.pop();
                continue;
            }
            top.1 += 1;
            let (edge_idx, target) = out[node][next];
            match state[target] {
                0 => {
                    state[target] = 1;
                    stack.push((target, 0));
                }
                1 => back[edge_idx] = true,
                _ => {}
            }
        }
    }

    chart
        .edges
        .iter()
        .enumerate()
        .filter(|(idx, edge)| !back[*idx] && edge.from != edge.to)
        .map(|(_, edge)| (index_of[edge.from.as_str()], index_of[edge.to.as_str()]))
        .collect()
}

/// Longest-path ranking: sources at rank 0, every other node one past its
/// furthest predecessor.
fn assign_ranks(n: usize, forward: &[(usize, usize)]) -> Vec<usize> {
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in forward {
        preds[to].push(from);
    }

    let mut ranks: Vec<Option<usize>> = vec![None; n];
    for node in 0..n {
        resolve_rank(node, &preds, &mut ranks);
    }
    ranks.into_iter().map(|r| r.unwrap_or(0)).collect()
}

fn resolve_rank(node: usize, preds: &[Vec<usize>], ranks: &mut Vec<Option<usize>>) -> usize {
    if let Some(rank) = ranks[node] {
        return rank;
    }
    // Mark before recursing so an unexpected cycle terminates at rank 0
    // instead of recursing forever.
    ranks[node] = Some(0);
    let rank = preds[node]
        .iter()
        .map(|&pred| resolve_rank(pred, preds, ranks) + 1)
        .max()
        .unwrap_or(0);
    ranks[node] = Some(rank);
    rank
}

/// Connected-component index per node, numbered in declaration order of
/// each component's first node. Components rank independently and sit side
/// by side.
fn assign_components(chart: &Flowchart, n: usize, index_of: &HashMap<&str, usize>) -> Vec<usize> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in &chart.edges {
        let from = index_of[edge.from.as_str()];
        let to = index_of[edge.to.as_str()];
        adjacency[from].push(to);
        adjacency[to].push(from);
    }

    let mut component = vec![usize::MAX; n];
    let mut next = 0;
    for root in 0..n {
        if component[root] != usize::MAX {
            continue;
        }
        let mut stack = vec![root];
        component[root] = next;
        while let Some(node) = stack.pop() {
            for &neighbor in &adjacency[node] {
                if component[neighbor] == usize::MAX {
                    component[neighbor] = next;
                    stack.push(neighbor);
                }
            }
        }
        next += 1;
    }
    component
}

/// Nodes per rank, initially in declaration order.
fn initial_order(ranks: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut order: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (node, &rank) in ranks.iter().enumerate() {
        order[rank].push(node);
    }
    order
}

/// A fixed number of alternating down/up barycenter sweeps. The sort is
/// stable, so nodes without neighbors in the fixed rank keep their slot.
fn sweep_orders(order: &mut [Vec<usize>], ranks: &[usize], forward: &[(usize, usize)]) {
    let n = ranks.len();
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(from, to) in forward {
        neighbors[from].push(to);
        neighbors[to].push(from);
    }

    for sweep in 0..ORDERING_SWEEPS {
        let down = sweep % 2 == 0;
        let rank_indices: Vec<usize> = if down {
            (1..order.len()).collect()
        } else {
            (0..order.len().saturating_sub(1)).rev().collect()
        };

        for rank in rank_indices {
            let fixed = if down { rank - 1 } else { rank + 1 };
            let mut slot_of = HashMap::new();
            for (slot, &node) in order[fixed].iter().enumerate() {
                slot_of.insert(node, slot);
            }

            let barycenters: Vec<(usize, f32)> = order[rank]
                .iter()
                .enumerate()
                .map(|(slot, &node)| {
                    let slots: Vec<f32> = neighbors[node]
                        .iter()
                        .filter_map(|other| slot_of.get(other))
                        .map(|&s| s as f32)
                        .collect();
                    let center = if slots.is_empty() {
                        slot as f32
                    } else {
                        slots.iter().sum::<f32>() / slots.len() as f32
                    };
                    (node, center)
                })
                .collect();

            let mut sorted = barycenters;
            sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
            order[rank] = sorted.into_iter().map(|(node, _)| node).collect();
        }
    }
}

/// Final grouping: stable sort each rank so components sit side by side
/// and members of one subgraph stay contiguous. Frames of sibling
/// subgraphs cannot overlap afterwards.
fn group_ranks(order: &mut [Vec<usize>], chart: &Flowchart, components: &[usize]) {
    let paths: Vec<Vec<usize>> = chart
        .nodes
        .keys()
        .map(|id| subgraph_path(chart, id))
        .collect();
    for rank_nodes in order.iter_mut() {
        rank_nodes.sort_by(|&a, &b| {
            (components[a], &paths[a]).cmp(&(components[b], &paths[b]))
        });
    }
}

/// Ancestry of a node's innermost subgraph, outermost first. Empty for
/// top-level nodes.
fn subgraph_path(chart: &Flowchart, id: &str) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = chart.subgraph_of(id);
    while let Some(idx) = current {
        path.push(idx);
        current = chart.subgraphs[idx].parent;
    }
    path.reverse();
    path
}

/// Outline size of a node around its measured label.
fn node_size(node: &undine_core::semantic::Node, config: &RenderConfig) -> Size {
    let lines = text::label_lines(&node.label);
    let label = text::measure(&lines, config.text());
    let padded = label.add_padding(config.node_padding());
    match node.shape {
        NodeShape::Circle => {
            let side = padded.width().max(padded.height());
            Size::new(side, side)
        }
        // A diamond's usable interior is half its bounding box.
        NodeShape::Diamond => Size::new(padded.width() * 1.6, padded.height() * 1.7),
        // Rounded end caps eat into the label area.
        NodeShape::Stadium => Size::new(padded.width() + padded.height() * 0.5, padded.height()),
        _ => padded,
    }
}

/// Assigns center coordinates: ranks advance along the flow axis, each
/// rank centered on the cross axis.
fn place(
    order: &[Vec<usize>],
    ranks: &[usize],
    sizes: &[Size],
    direction: Direction,
    config: &RenderConfig,
) -> Vec<Point> {
    let horizontal = direction.is_horizontal();
    let main_extent = |size: &Size| if horizontal { size.width() } else { size.height() };
    let cross_extent = |size: &Size| if horizontal { size.height() } else { size.width() };

    // Main-axis center of each rank.
    let mut rank_centers = Vec::with_capacity(order.len());
    let mut cursor = 0.0f32;
    for rank_nodes in order {
        let extent = rank_nodes
            .iter()
            .map(|&node| main_extent(&sizes[node]))
            .fold(0.0f32, f32::max);
        rank_centers.push(cursor + extent / 2.0);
        cursor += extent + config.rank_gap();
    }

    let mut centers = vec![Point::default(); ranks.len()];
    for rank_nodes in order {
        let span: f32 = rank_nodes
            .iter()
            .map(|&node| cross_extent(&sizes[node]))
            .sum::<f32>()
            + config.node_gap() * rank_nodes.len().saturating_sub(1) as f32;

        let mut cross = -span / 2.0;
        for &node in rank_nodes {
            let extent = cross_extent(&sizes[node]);
            let main = if direction.is_reversed() {
                -rank_centers[ranks[node]]
            } else {
                rank_centers[ranks[node]]
            };
            let center = cross + extent / 2.0;
            centers[node] = if horizontal {
                Point::new(main, center)
            } else {
                Point::new(center, main)
            };
            cross += extent + config.node_gap();
        }
    }
    centers
}

/// Routes every edge: boundary to boundary, orthogonal through the
/// inter-rank channel when the endpoints are offset, a lobe for
/// self-loops. Edges spanning more than one rank detour around the boxes
/// in between.
fn route_edges(
    chart: &Flowchart,
    index_of: &HashMap<&str, usize>,
    nodes: &[NodeLayout],
    config: &RenderConfig,
) -> Vec<EdgeLayout> {
    let horizontal = chart.direction.is_horizontal();
    chart
        .edges
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            let from = &nodes[index_of[edge.from.as_str()]];
            let to = &nodes[index_of[edge.to.as_str()]];
            let (points, label_at) = if from.id == to.id {
                self_loop(from, horizontal)
            } else {
                let others: Vec<Bounds> = nodes
                    .iter()
                    .filter(|n| n.id != from.id && n.id != to.id)
                    .map(|n| n.bounds)
                    .collect();
                route(from.bounds, to.bounds, horizontal, &others, config.node_gap())
            };
            EdgeLayout {
                index,
                points,
                label_at,
            }
        })
        .collect()
}

fn route(
    from: Bounds,
    to: Bounds,
    horizontal: bool,
    others: &[Bounds],
    gap: f32,
) -> (Vec<Point>, Option<Point>) {
    let (main_from, main_to, cross_from, cross_to) = if horizontal {
        (from.center().x(), to.center().x(), from.center().y(), to.center().y())
    } else {
        (from.center().y(), to.center().y(), from.center().x(), to.center().x())
    };

    // Leave the face looking at the target rank, enter the opposite face.
    let forward = main_to >= main_from;
    let exit_main = if horizontal {
        if forward { from.max_x() } else { from.min_x() }
    } else if forward {
        from.max_y()
    } else {
        from.min_y()
    };
    let enter_main = if horizontal {
        if forward { to.min_x() } else { to.max_x() }
    } else if forward {
        to.min_y()
    } else {
        to.max_y()
    };

    let assemble = |main: f32, cross: f32| {
        if horizontal {
            Point::new(main, cross)
        } else {
            Point::new(cross, main)
        }
    };

    let start = assemble(exit_main, cross_from);
    let end = assemble(enter_main, cross_to);

    let main_span = |b: &Bounds| if horizontal { (b.min_x(), b.max_x()) } else { (b.min_y(), b.max_y()) };
    let cross_span = |b: &Bounds| if horizontal { (b.min_y(), b.max_y()) } else { (b.min_x(), b.max_x()) };

    // Boxes whose main-axis extent lies strictly between the two faces sit
    // in the edge's path; anything else is in the endpoint ranks.
    let (corridor_lo, corridor_hi) = if forward {
        (exit_main, enter_main)
    } else {
        (enter_main, exit_main)
    };
    let blockers: Vec<Bounds> = others
        .iter()
        .filter(|b| {
            let (lo, hi) = main_span(b);
            lo > corridor_lo && hi < corridor_hi
        })
        .copied()
        .collect();

    if blockers.is_empty() {
        if (cross_from - cross_to).abs() < 0.5 {
            let mid = start.midpoint(end);
            return (vec![start, end], Some(mid));
        }
        let channel = (exit_main + enter_main) / 2.0;
        let bend_a = assemble(channel, cross_from);
        let bend_b = assemble(channel, cross_to);
        let label = bend_a.midpoint(bend_b);
        return (vec![start, bend_a, bend_b, end], Some(label));
    }

    // Slide the long middle segment across until it clears every blocker.
    let clearance = gap / 2.0;
    let mut lane = cross_to;
    while let Some(hit) = blockers.iter().find(|b| {
        let (lo, hi) = cross_span(b);
        lane > lo - clearance && lane < hi + clearance
    }) {
        lane = cross_span(hit).1 + clearance;
    }

    // Bend just past the exit rank and just before the entry rank.
    let (near, far) = if forward {
        (
            blockers.iter().map(|b| main_span(b).0).fold(f32::INFINITY, f32::min),
            blockers.iter().map(|b| main_span(b).1).fold(f32::NEG_INFINITY, f32::max),
        )
    } else {
        (
            blockers.iter().map(|b| main_span(b).1).fold(f32::NEG_INFINITY, f32::max),
            blockers.iter().map(|b| main_span(b).0).fold(f32::INFINITY, f32::min),
        )
    };
    let chan_a = (exit_main + near) / 2.0;
    let chan_b = (far + enter_main) / 2.0;

    let mut points = vec![
        start,
        assemble(chan_a, cross_from),
        assemble(chan_a, lane),
        assemble(chan_b, lane),
        assemble(chan_b, cross_to),
        end,
    ];
    points.dedup();
    let label = assemble((chan_a + chan_b) / 2.0, lane);
    (points, Some(label))
}

/// A self-loop leaves and re-enters on the node's trailing side.
fn self_loop(node: &NodeLayout, horizontal: bool) -> (Vec<Point>, Option<Point>) {
    let bounds = node.bounds;
    let center = bounds.center();
    let (points, label) = if horizontal {
        // Trailing side is the bottom for LR/RL layouts.
        let quarter = bounds.to_size().width() / 4.0;
        let out = bounds.max_y() + LOBE_EXTENT;
        (
            vec![
                Point::new(center.x() - quarter, bounds.max_y()),
                Point::new(center.x() - quarter, out),
                Point::new(center.x() + quarter, out),
                Point::new(center.x() + quarter, bounds.max_y()),
            ],
            Point::new(center.x(), out),
        )
    } else {
        let quarter = bounds.to_size().height() / 4.0;
        let out = bounds.max_x() + LOBE_EXTENT;
        (
            vec![
                Point::new(bounds.max_x(), center.y() - quarter),
                Point::new(out, center.y() - quarter),
                Point::new(out, center.y() + quarter),
                Point::new(bounds.max_x(), center.y() + quarter),
            ],
            Point::new(out, center.y()),
        )
    };
    (points, Some(label))
}

/// Frame bounds per subgraph: members plus nested frames, padded.
/// Subgraphs are declared parents-first, so one reverse pass settles the
/// nesting.
fn build_frames(chart: &Flowchart, nodes: &[NodeLayout], config: &RenderConfig) -> Vec<FrameLayout> {
    let mut frame_bounds: Vec<Option<Bounds>> = vec![None; chart.subgraphs.len()];
    for idx in (0..chart.subgraphs.len()).rev() {
        let subgraph = &chart.subgraphs[idx];
        let mut bounds: Option<Bounds> = None;
        for member in &subgraph.nodes {
            if let Some(node) = nodes.iter().find(|n| &n.id == member) {
                bounds = Some(match bounds {
                    Some(b) => b.merge(&node.bounds),
                    None => node.bounds,
                });
            }
        }
        for (child_idx, child) in chart.subgraphs.iter().enumerate() {
            if child.parent == Some(idx)
                && let Some(child_bounds) = frame_bounds[child_idx]
            {
                bounds = Some(match bounds {
                    Some(b) => b.merge(&child_bounds),
                    None => child_bounds,
                });
            }
        }
        frame_bounds[idx] = bounds.map(|b| b.add_padding(config.node_padding()));
    }

    frame_bounds
        .into_iter()
        .enumerate()
        .filter_map(|(subgraph, bounds)| bounds.map(|bounds| FrameLayout { subgraph, bounds }))
        .collect()
}

#[cfg(test)]
mod tests {
    use undine_core::semantic::Diagram;
    use undine_parser::parse;

    use super::*;

    fn layout_source(source: &str) -> FlowchartLayout {
        let Diagram::Flowchart(chart) = parse(source).unwrap() else {
            panic!("expected a flowchart");
        };
        layout(&chart, &RenderConfig::default()).unwrap()
    }

    fn rank_of(layout: &FlowchartLayout, id: &str) -> usize {
        layout.node(id).unwrap().rank
    }

    #[test]
    fn test_chain_ranks_increase() {
        let layout = layout_source("graph TD\nA --> B --> C\n");
        assert_eq!(rank_of(&layout, "A"), 0);
        assert_eq!(rank_of(&layout, "B"), 1);
        assert_eq!(rank_of(&layout, "C"), 2);
    }

    #[test]
    fn test_longest_path_wins() {
        // D is reachable directly and through B/C; it ranks below the
        // longer path.
        let layout = layout_source("graph TD\nA --> D\nA --> B --> C --> D\n");
        assert_eq!(rank_of(&layout, "D"), 3);
    }

    #[test]
    fn test_cycle_is_neutralized() {
        let layout = layout_source("graph TD\nA --> B --> C --> A\n");
        assert_eq!(rank_of(&layout, "A"), 0);
        assert_eq!(rank_of(&layout, "C"), 2);
        // The back edge is still routed.
        assert_eq!(layout.edges.len(), 3);
        assert!(!layout.edges[2].points.is_empty());
    }

    #[test]
    fn test_top_down_advances_downward() {
        let layout = layout_source("graph TD\nA --> B\n");
        let a = layout.node("A").unwrap().bounds.center();
        let b = layout.node("B").unwrap().bounds.center();
        assert!(b.y() > a.y());
        assert!((a.x() - b.x()).abs() < 0.5);
    }

    #[test]
    fn test_bottom_up_advances_upward() {
        let layout = layout_source("graph BT\nA --> B\n");
        let a = layout.node("A").unwrap().bounds.center();
        let b = layout.node("B").unwrap().bounds.center();
        assert!(b.y() < a.y());
    }

    #[test]
    fn test_left_right_advances_rightward() {
        let layout = layout_source("graph LR\nA --> B\n");
        let a = layout.node("A").unwrap().bounds.center();
        let b = layout.node("B").unwrap().bounds.center();
        assert!(b.x() > a.x());
    }

    #[test]
    fn test_no_node_overlap() {
        let layout = layout_source(concat!(
            "graph TD\n",
            "A --> B\nA --> C\nA --> D\n",
            "B --> E\nC --> E\nD --> E\n",
            "lonely\n",
        ));
        for (i, a) in layout.nodes.iter().enumerate() {
            for b in &layout.nodes[i + 1..] {
                assert!(
                    !a.bounds.intersects(&b.bounds),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_edge_endpoints_touch_node_boundaries() {
        let layout = layout_source("graph TD\nA --> B\nA --> C\n");
        for edge in &layout.edges {
            let first = edge.points.first().unwrap();
            let last = edge.points.last().unwrap();
            let a = layout.node("A").unwrap().bounds;
            assert!((first.y() - a.max_y()).abs() < 0.5);
            let target_top = layout
                .nodes
                .iter()
                .find(|n| (last.y() - n.bounds.min_y()).abs() < 0.5);
            assert!(target_top.is_some(), "endpoint {last:?} is not on a box top");
        }
    }

    fn segment_hits(a: Point, b: Point, bounds: Bounds) -> bool {
        let (lo_x, hi_x) = (a.x().min(b.x()), a.x().max(b.x()));
        let (lo_y, hi_y) = (a.y().min(b.y()), a.y().max(b.y()));
        lo_x < bounds.max_x() && hi_x > bounds.min_x() && lo_y < bounds.max_y() && hi_y > bounds.min_y()
    }

    #[test]
    fn test_skip_level_edge_clears_intermediate_boxes() {
        let layout = layout_source("graph TD\nA --> B\nB --> C\nA --> C\n");
        let b = layout.node("B").unwrap().bounds;
        let skip = &layout.edges[2];
        for pair in skip.points.windows(2) {
            assert!(
                !segment_hits(pair[0], pair[1], b),
                "segment {pair:?} crosses B"
            );
        }
    }

    #[test]
    fn test_back_edge_clears_intermediate_boxes() {
        let layout = layout_source("graph TD\nA --> B --> C --> A\n");
        let b = layout.node("B").unwrap().bounds;
        let back = &layout.edges[2];
        for pair in back.points.windows(2) {
            assert!(
                !segment_hits(pair[0], pair[1], b),
                "segment {pair:?} crosses B"
            );
        }
    }

    #[test]
    fn test_self_loop_routes_outside_the_box() {
        let layout = layout_source("graph TD\nA --> A\n");
        let bounds = layout.node("A").unwrap().bounds;
        let lobe = &layout.edges[0].points;
        assert!(lobe.iter().any(|p| p.x() > bounds.max_x()));
    }

    #[test]
    fn test_deterministic() {
        let source = "graph TD\nA --> B\nA --> C\nB --> D\nC --> D\n";
        assert_eq!(layout_source(source), layout_source(source));
    }

    fn frame_covers(frame: Bounds, inner: Bounds) -> bool {
        frame.contains(inner.min_point()) && frame.contains(Point::new(inner.max_x(), inner.max_y()))
    }

    #[test]
    fn test_subgraph_frame_contains_members() {
        let layout = layout_source("graph TD\nsubgraph s [S]\nA --> B\nend\nB --> C\n");
        let frame = layout.frames[0].bounds;
        assert!(frame_covers(frame, layout.node("A").unwrap().bounds));
        assert!(frame_covers(frame, layout.node("B").unwrap().bounds));
        assert!(!frame_covers(frame, layout.node("C").unwrap().bounds));
    }

    #[test]
    fn test_sibling_frames_do_not_overlap() {
        let layout = layout_source(concat!(
            "graph TD\n",
            "subgraph a\nA1 --> A2\nend\n",
            "subgraph b\nB1 --> B2\nend\n",
        ));
        assert!(!layout.frames[0].bounds.intersects(&layout.frames[1].bounds));
    }

    #[test]
    fn test_subgraph_cycle_is_rejected() {
        let mut chart = Flowchart::default();
        chart.subgraphs.push(undine_core::semantic::Subgraph {
            id: "s".into(),
            title: "s".into(),
            parent: Some(0),
            nodes: Vec::new(),
        });
        let err = layout(&chart, &RenderConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::SubgraphCycle { id: "s".into() });
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let mut chart = Flowchart::default();
        chart.edges.push(undine_core::semantic::Edge {
            from: "ghost".into(),
            to: "ghost".into(),
            label: None,
            line: undine_core::semantic::EdgeLine::Solid,
            head: undine_core::semantic::ArrowHead::Arrow,
            style: None,
        });
        let err = layout(&chart, &RenderConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::UnknownNode { id: "ghost".into() });
    }
}
