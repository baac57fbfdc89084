//! Layout engines.
//!
//! Layout is a pure function of the semantic model, the measured label
//! sizes, and the [`RenderConfig`](crate::config::RenderConfig): no
//! randomness, no iteration-order dependence. The same input always
//! produces the identical layout.

use thiserror::Error;

use undine_core::geometry::{Bounds, Point};

pub mod flowchart;
pub mod sequence;
pub mod text;

/// Layout failure on structurally impossible input.
///
/// The parser rejects most of these up front; the layout engine re-checks
/// the ones a hand-built model could still violate.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("subgraph `{id}` is contained in itself")]
    SubgraphCycle { id: String },

    #[error("edge references unknown node `{id}`")]
    UnknownNode { id: String },

    #[error("message references participant index {index} of {count}")]
    UnknownParticipant { index: usize, count: usize },
}

/// A laid-out flowchart node. `rank` and `order` describe the position in
/// the layer structure; `bounds` is the final box in user units.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub rank: usize,
    pub order: usize,
    pub bounds: Bounds,
    /// Label split into display lines.
    pub lines: Vec<String>,
}

/// A routed flowchart edge: a polyline in draw order plus an optional
/// label anchor. `index` refers back to the semantic edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub index: usize,
    pub points: Vec<Point>,
    pub label_at: Option<Point>,
}

/// A subgraph frame: the union of its members' bounds plus padding.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub subgraph: usize,
    pub bounds: Bounds,
}

/// The complete flowchart layout. Nodes appear in semantic declaration
/// order, edges in declaration order, frames outermost first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowchartLayout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub frames: Vec<FrameLayout>,
    pub bounds: Bounds,
}

impl FlowchartLayout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A laid-out sequence participant: header box plus lifeline extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantLayout {
    pub bounds: Bounds,
    pub lifeline_end: f32,
    pub lines: Vec<String>,
}

/// One vertical slot of a sequence diagram, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotLayout {
    Message {
        /// Index into the semantic item list.
        item: usize,
        y: f32,
        from_x: f32,
        to_x: f32,
        /// Self-messages render as a lobe to the right of the lifeline.
        self_loop: bool,
    },
    Note {
        item: usize,
        bounds: Bounds,
    },
}

/// The complete sequence layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceLayout {
    pub participants: Vec<ParticipantLayout>,
    pub slots: Vec<SlotLayout>,
    pub bounds: Bounds,
}
