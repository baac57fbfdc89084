//! The semantic diagram model produced by the parser and consumed by the
//! layout engines.
//!
//! Declaration order is meaningful everywhere: nodes iterate in the order
//! they first appeared in the source, edges and messages in the order they
//! were written. [`indexmap::IndexMap`] keeps node lookup cheap without
//! giving up that order.

use indexmap::IndexMap;

/// A parsed diagram. The set of variants is closed; downstream code matches
/// exhaustively and new diagram kinds are a breaking change by design.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    Flowchart(Flowchart),
    Sequence(Sequence),
}

/// Primary flow axis of a flowchart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    /// True for `LR`/`RL` layouts, where ranks advance horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }

    /// True for `BT`/`RL`, where ranks advance against the axis.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomUp | Direction::RightLeft)
    }
}

/// Outline drawn around a flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Rectangle,
    Rounded,
    Stadium,
    Subroutine,
    Circle,
    Diamond,
    Flag,
}

/// Line style of a flowchart edge shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeLine {
    #[default]
    Solid,
    Dotted,
    Thick,
}

/// Terminator drawn at the target end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowHead {
    /// An undirected link (`---`).
    None,
    #[default]
    Arrow,
    Circle,
    Cross,
}

/// A flowchart node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub style: Option<StyleOverride>,
}

impl Node {
    /// A plain rectangular node labeled with its own id.
    pub fn implicit(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: id.to_owned(),
            shape: NodeShape::Rectangle,
            style: None,
        }
    }
}

/// A directed link between two flowchart nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub line: EdgeLine,
    pub head: ArrowHead,
    pub style: Option<StyleOverride>,
}

/// A `subgraph ... end` block. `parent` indexes into the owning
/// [`Flowchart::subgraphs`] list; membership forms a forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub id: String,
    pub title: String,
    pub parent: Option<usize>,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: IndexMap<String, Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
}

impl Flowchart {
    /// The innermost subgraph a node belongs to, if any.
    pub fn subgraph_of(&self, node_id: &str) -> Option<usize> {
        // Inner blocks are declared later; take the last match.
        self.subgraphs
            .iter()
            .enumerate()
            .rev()
            .find(|(_, sg)| sg.nodes.iter().any(|n| n == node_id))
            .map(|(idx, _)| idx)
    }
}

/// Line style of a sequence message shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLine {
    #[default]
    Solid,
    Dashed,
}

/// Arrowhead of a sequence message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageHead {
    #[default]
    Filled,
    Open,
    Cross,
}

/// Where a note sits relative to its target lifelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePlacement {
    LeftOf,
    RightOf,
    Over,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub display: String,
    /// Declared with `actor` rather than `participant`.
    pub actor: bool,
}

/// A message between two participants, endpoints given as indices into
/// [`Sequence::participants`]. Self-messages have `from == to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: usize,
    pub to: usize,
    pub text: String,
    pub line: MessageLine,
    pub head: MessageHead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub placement: NotePlacement,
    pub first: usize,
    pub second: Option<usize>,
    pub text: String,
}

/// One vertical slot in a sequence diagram, in strict declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceItem {
    Message(Message),
    Note(Note),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub participants: Vec<Participant>,
    pub items: Vec<SequenceItem>,
}

/// Ordered `key:value` pairs from `style`/`classDef` statements.
///
/// Later entries win on duplicate keys. Unrecognized keys are preserved so
/// a renderer that understands more of them keeps working.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleOverride {
    entries: Vec<(String, String)>,
}

impl StyleOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_owned(), value.to_owned()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last value set for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fill(&self) -> Option<&str> {
        self.get("fill")
    }

    pub fn stroke(&self) -> Option<&str> {
        self.get("stroke")
    }

    pub fn stroke_width(&self) -> Option<&str> {
        self.get("stroke-width")
    }

    pub fn text_color(&self) -> Option<&str> {
        self.get("color")
    }

    pub fn dasharray(&self) -> Option<&str> {
        self.get("stroke-dasharray")
    }

    /// Layers `other` on top of `self` (class styles under inline styles).
    pub fn merged_under(&self, other: &StyleOverride) -> StyleOverride {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        StyleOverride { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_axes() {
        assert!(!Direction::TopDown.is_horizontal());
        assert!(Direction::LeftRight.is_horizontal());
        assert!(Direction::BottomUp.is_reversed());
        assert!(Direction::RightLeft.is_reversed());
        assert!(!Direction::TopDown.is_reversed());
    }

    #[test]
    fn test_style_override_last_wins() {
        let mut style = StyleOverride::new();
        style.insert("fill", "#f9f");
        style.insert("stroke", "#333");
        style.insert("fill", "#aaa");
        assert_eq!(style.fill(), Some("#aaa"));
        assert_eq!(style.stroke(), Some("#333"));
        assert_eq!(style.get("stroke-width"), None);
    }

    #[test]
    fn test_style_override_merge_precedence() {
        let mut class_style = StyleOverride::new();
        class_style.insert("fill", "#111");
        class_style.insert("color", "#eee");

        let mut inline = StyleOverride::new();
        inline.insert("fill", "#222");

        let merged = class_style.merged_under(&inline);
        assert_eq!(merged.fill(), Some("#222"));
        assert_eq!(merged.text_color(), Some("#eee"));
    }

    #[test]
    fn test_flowchart_subgraph_of_prefers_innermost() {
        let mut chart = Flowchart::default();
        chart.nodes.insert("a".into(), Node::implicit("a"));
        chart.subgraphs.push(Subgraph {
            id: "outer".into(),
            title: "outer".into(),
            parent: None,
            nodes: vec!["a".into()],
        });
        chart.subgraphs.push(Subgraph {
            id: "inner".into(),
            title: "inner".into(),
            parent: Some(0),
            nodes: vec!["a".into()],
        });
        assert_eq!(chart.subgraph_of("a"), Some(1));
        assert_eq!(chart.subgraph_of("missing"), None);
    }
}
