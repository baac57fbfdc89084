//! End-to-end tests for the parse entry point.
//!
//! These exercise the full pipeline: preprocessing, header dispatch, the
//! flowchart and sequence grammars, and diagnostic reporting.

use undine_core::semantic::{
    ArrowHead, Diagram, Direction, EdgeLine, Flowchart, MessageHead, MessageLine, NodeShape,
    NotePlacement, Sequence, SequenceItem,
};

use crate::{ErrorCode, ParseError, parse};

fn parse_flowchart(source: &str) -> Flowchart {
    match parse(source) {
        Ok(Diagram::Flowchart(chart)) => chart,
        Ok(other) => panic!("expected a flowchart, got {other:?}"),
        Err(err) => panic!("expected parsing to succeed, got: {err}"),
    }
}

fn parse_sequence(source: &str) -> Sequence {
    match parse(source) {
        Ok(Diagram::Sequence(sequence)) => sequence,
        Ok(other) => panic!("expected a sequence diagram, got {other:?}"),
        Err(err) => panic!("expected parsing to succeed, got: {err}"),
    }
}

fn parse_error(source: &str) -> ParseError {
    match parse(source) {
        Ok(diagram) => panic!("expected parsing to fail, got: {diagram:?}"),
        Err(err) => err,
    }
}

fn assert_error_code(source: &str, code: ErrorCode) {
    let err = parse_error(source);
    let found = err
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.code() == Some(code));
    assert!(found, "expected {code} in diagnostics, got: {err}");
}

mod headers {
    use super::*;

    #[test]
    fn test_graph_and_flowchart_headers() {
        for header in ["graph TD", "graph TB", "flowchart TD", "flowchart TB"] {
            let chart = parse_flowchart(&format!("{header}\nA --> B\n"));
            assert_eq!(chart.direction, Direction::TopDown, "header {header}");
        }
        assert_eq!(parse_flowchart("graph BT\nA-->B").direction, Direction::BottomUp);
        assert_eq!(parse_flowchart("graph LR\nA-->B").direction, Direction::LeftRight);
        assert_eq!(parse_flowchart("graph RL\nA-->B").direction, Direction::RightLeft);
    }

    #[test]
    fn test_direction_defaults_to_top_down() {
        assert_eq!(parse_flowchart("graph\nA-->B").direction, Direction::TopDown);
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        assert_error_code("graph XY\nA-->B", ErrorCode::E100);
    }

    #[test]
    fn test_missing_header() {
        assert_error_code("A --> B", ErrorCode::E101);
        assert_error_code("", ErrorCode::E101);
        assert_error_code("%% only a comment\n", ErrorCode::E101);
    }

    #[test]
    fn test_statements_on_the_header_line() {
        let chart = parse_flowchart("graph TD; A-->B; B-->C;");
        assert_eq!(chart.nodes.len(), 3);
        assert_eq!(chart.edges.len(), 2);
        assert_eq!(chart.edges[0].from, "A");
        assert_eq!(chart.edges[1].to, "C");
    }
}

mod preprocessing {
    use super::*;

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let chart = parse_flowchart("graph TD\n\n%% a comment\nA --> B\n  %% indented comment\n");
        assert_eq!(chart.nodes.len(), 2);
        assert_eq!(chart.edges.len(), 1);
    }

    #[test]
    fn test_directives_are_skipped() {
        let chart = parse_flowchart("%%{init: {\"theme\": \"dark\"}}%%\ngraph TD\nA-->B\n");
        assert_eq!(chart.edges.len(), 1);

        let multi = parse_flowchart("%%{init: {\n  \"theme\": \"dark\"\n}}%%\ngraph TD\nA-->B\n");
        assert_eq!(multi.edges.len(), 1);
    }

    #[test]
    fn test_unterminated_directive() {
        let err = parse_error("%%{init: {\ngraph TD\nA-->B\n");
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_crlf_input() {
        let chart = parse_flowchart("graph TD\r\nA --> B\r\n");
        assert_eq!(chart.edges.len(), 1);
    }
}

mod flowchart_nodes {
    use super::*;

    #[test]
    fn test_node_shapes() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "a[Rect]\n",
            "b(Rounded)\n",
            "c([Stadium])\n",
            "d[[Subroutine]]\n",
            "e((Circle))\n",
            "f{Diamond}\n",
            "g>Flag]\n",
        ));
        let shape = |id: &str| chart.nodes[id].shape;
        assert_eq!(shape("a"), NodeShape::Rectangle);
        assert_eq!(shape("b"), NodeShape::Rounded);
        assert_eq!(shape("c"), NodeShape::Stadium);
        assert_eq!(shape("d"), NodeShape::Subroutine);
        assert_eq!(shape("e"), NodeShape::Circle);
        assert_eq!(shape("f"), NodeShape::Diamond);
        assert_eq!(shape("g"), NodeShape::Flag);
        assert_eq!(chart.nodes["a"].label, "Rect");
        assert_eq!(chart.nodes["g"].label, "Flag");
    }

    #[test]
    fn test_bare_node_uses_id_as_label() {
        let chart = parse_flowchart("graph TD\nalpha\n");
        assert_eq!(chart.nodes["alpha"].label, "alpha");
        assert_eq!(chart.nodes["alpha"].shape, NodeShape::Rectangle);
    }

    #[test]
    fn test_quoted_labels_are_unquoted() {
        let chart = parse_flowchart("graph TD\nA[\"a; label [with] brackets\"]\n");
        assert_eq!(chart.nodes["A"].label, "a; label [with] brackets");
    }

    #[test]
    fn test_first_explicit_label_wins() {
        let chart = parse_flowchart("graph TD\nA --> B[First]\nB[Second] --> C\n");
        assert_eq!(chart.nodes["B"].label, "First");
    }

    #[test]
    fn test_implicit_then_explicit_declaration() {
        let chart = parse_flowchart("graph TD\nA --> B\nB{Decide}\n");
        assert_eq!(chart.nodes["B"].label, "Decide");
        assert_eq!(chart.nodes["B"].shape, NodeShape::Diamond);
    }

    #[test]
    fn test_nodes_keep_first_seen_order() {
        let chart = parse_flowchart("graph TD\nZ --> A\nA --> M\n");
        let ids: Vec<&str> = chart.nodes.keys().map(String::as_str).collect();
        assert_eq!(ids, ["Z", "A", "M"]);
    }

    #[test]
    fn test_hyphenated_node_ids() {
        let chart = parse_flowchart("graph TD\nmy-node --> other-node\n");
        assert!(chart.nodes.contains_key("my-node"));
        assert_eq!(chart.edges[0].to, "other-node");
    }

    #[test]
    fn test_unterminated_bracket() {
        assert_error_code("graph TD\nA[Oops --> B\n", ErrorCode::E001);
        assert_error_code("graph TD\nA((Oops) --> B\n", ErrorCode::E001);
    }
}

mod flowchart_edges {
    use super::*;

    #[test]
    fn test_edge_lines_and_heads() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "A --> B\n",
            "B --- C\n",
            "C -.-> D\n",
            "D ==> E\n",
            "E --o F\n",
            "F --x G\n",
        ));
        let edge = |i: usize| &chart.edges[i];
        assert_eq!((edge(0).line, edge(0).head), (EdgeLine::Solid, ArrowHead::Arrow));
        assert_eq!((edge(1).line, edge(1).head), (EdgeLine::Solid, ArrowHead::None));
        assert_eq!((edge(2).line, edge(2).head), (EdgeLine::Dotted, ArrowHead::Arrow));
        assert_eq!((edge(3).line, edge(3).head), (EdgeLine::Thick, ArrowHead::Arrow));
        assert_eq!((edge(4).line, edge(4).head), (EdgeLine::Solid, ArrowHead::Circle));
        assert_eq!((edge(5).line, edge(5).head), (EdgeLine::Solid, ArrowHead::Cross));
    }

    #[test]
    fn test_edge_labels_pipe_form() {
        let chart = parse_flowchart("graph TD\nA -->|yes| B\n");
        assert_eq!(chart.edges[0].label.as_deref(), Some("yes"));
    }

    #[test]
    fn test_edge_labels_inline_form() {
        let chart = parse_flowchart("graph TD\nA -- no --> B\nC -. maybe .-> D\n");
        assert_eq!(chart.edges[0].label.as_deref(), Some("no"));
        assert_eq!(chart.edges[0].line, EdgeLine::Solid);
        assert_eq!(chart.edges[1].label.as_deref(), Some("maybe"));
        assert_eq!(chart.edges[1].line, EdgeLine::Dotted);
    }

    #[test]
    fn test_edge_chains() {
        let chart = parse_flowchart("graph LR\nA --> B --> C --> D\n");
        assert_eq!(chart.edges.len(), 3);
        assert_eq!(chart.edges[1].from, "B");
        assert_eq!(chart.edges[1].to, "C");
    }

    #[test]
    fn test_chain_with_shapes_and_labels() {
        let chart = parse_flowchart("graph TD\nA[Start] -->|go| B{Choice} -.-> C((End))\n");
        assert_eq!(chart.edges.len(), 2);
        assert_eq!(chart.edges[0].label.as_deref(), Some("go"));
        assert_eq!(chart.nodes["B"].shape, NodeShape::Diamond);
        assert_eq!(chart.nodes["C"].shape, NodeShape::Circle);
    }

    #[test]
    fn test_self_loop() {
        let chart = parse_flowchart("graph TD\nA --> A\n");
        assert_eq!(chart.nodes.len(), 1);
        assert_eq!(chart.edges[0].from, chart.edges[0].to);
    }

    #[test]
    fn test_duplicate_edges_are_kept() {
        let chart = parse_flowchart("graph TD\nA --> B\nA --> B\n");
        assert_eq!(chart.edges.len(), 2);
    }

    #[test]
    fn test_incomplete_edge() {
        assert_error_code("graph TD\nA -->\n", ErrorCode::E102);
    }

    #[test]
    fn test_head_char_starting_an_id_is_not_a_head() {
        // `--oops` is an edge to the node `oops`, not a circle head.
        let chart = parse_flowchart("graph TD\nA --oops\n");
        assert_eq!(chart.edges[0].to, "oops");
        assert_eq!(chart.edges[0].head, ArrowHead::None);
    }
}

mod flowchart_subgraphs {
    use super::*;

    #[test]
    fn test_subgraph_membership() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "subgraph cluster [My Cluster]\n",
            "  A --> B\n",
            "end\n",
            "B --> C\n",
        ));
        assert_eq!(chart.subgraphs.len(), 1);
        let subgraph = &chart.subgraphs[0];
        assert_eq!(subgraph.id, "cluster");
        assert_eq!(subgraph.title, "My Cluster");
        assert_eq!(subgraph.nodes, ["A", "B"]);
        // C first appears outside the subgraph.
        assert_eq!(chart.subgraph_of("C"), None);
        assert_eq!(chart.subgraph_of("A"), Some(0));
    }

    #[test]
    fn test_subgraph_without_title_uses_id() {
        let chart = parse_flowchart("graph TD\nsubgraph inner\nA\nend\n");
        assert_eq!(chart.subgraphs[0].title, "inner");
    }

    #[test]
    fn test_nested_subgraphs() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "subgraph outer\n",
            "  A\n",
            "  subgraph inner\n",
            "    B\n",
            "  end\n",
            "end\n",
        ));
        assert_eq!(chart.subgraphs.len(), 2);
        assert_eq!(chart.subgraphs[1].parent, Some(0));
        assert_eq!(chart.subgraph_of("B"), Some(1));
        assert_eq!(chart.subgraph_of("A"), Some(0));
    }

    #[test]
    fn test_membership_is_first_reference() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "A --> B\n",
            "subgraph late\n",
            "  A --> C\n",
            "end\n",
        ));
        // A was first seen at top level; only C joins the subgraph.
        assert_eq!(chart.subgraphs[0].nodes, ["C"]);
    }

    #[test]
    fn test_duplicate_subgraph_id() {
        assert_error_code(
            "graph TD\nsubgraph s\nA\nend\nsubgraph s\nB\nend\n",
            ErrorCode::E200,
        );
    }

    #[test]
    fn test_missing_end() {
        assert_error_code("graph TD\nsubgraph s\nA --> B\n", ErrorCode::E103);
    }

    #[test]
    fn test_stray_end() {
        assert_error_code("graph TD\nA --> B\nend\n", ErrorCode::E104);
    }
}

mod flowchart_styles {
    use super::*;

    fn node_style<'a>(chart: &'a Flowchart, id: &str) -> &'a undine_core::semantic::StyleOverride {
        chart.nodes[id]
            .style
            .as_ref()
            .unwrap_or_else(|| panic!("node {id} has no style"))
    }

    #[test]
    fn test_style_statement() {
        let chart = parse_flowchart("graph TD\nA --> B\nstyle A fill:#f9f,stroke:#333,stroke-width:2px\n");
        let style = node_style(&chart, "A");
        assert_eq!(style.fill(), Some("#f9f"));
        assert_eq!(style.stroke(), Some("#333"));
        assert_eq!(style.stroke_width(), Some("2px"));
        assert!(chart.nodes["B"].style.is_none());
    }

    #[test]
    fn test_style_creates_missing_node() {
        let chart = parse_flowchart("graph TD\nstyle lone fill:#000\n");
        assert_eq!(chart.nodes["lone"].label, "lone");
    }

    #[test]
    fn test_class_def_and_class() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "A --> B\n",
            "classDef hot fill:#f00,color:#fff\n",
            "class A,B hot\n",
        ));
        assert_eq!(node_style(&chart, "A").fill(), Some("#f00"));
        assert_eq!(node_style(&chart, "B").text_color(), Some("#fff"));
    }

    #[test]
    fn test_inline_style_beats_class() {
        let chart = parse_flowchart(concat!(
            "graph TD\n",
            "A\n",
            "style A fill:#111\n",
            "classDef c fill:#222,stroke:#333\n",
            "class A c\n",
        ));
        assert_eq!(node_style(&chart, "A").fill(), Some("#111"));
        assert_eq!(node_style(&chart, "A").stroke(), Some("#333"));
    }

    #[test]
    fn test_unknown_class() {
        assert_error_code("graph TD\nA\nclass A missing\n", ErrorCode::E201);
    }

    #[test]
    fn test_link_style() {
        let chart = parse_flowchart("graph TD\nA --> B\nB --> C\nlinkStyle 1 stroke:#0f0\n");
        assert!(chart.edges[0].style.is_none());
        let style = chart.edges[1].style.as_ref().unwrap();
        assert_eq!(style.stroke(), Some("#0f0"));
    }

    #[test]
    fn test_link_style_out_of_range() {
        assert_error_code("graph TD\nA --> B\nlinkStyle 5 stroke:#0f0\n", ErrorCode::E202);
    }

    #[test]
    fn test_malformed_style_list() {
        assert_error_code("graph TD\nA\nstyle A fill\n", ErrorCode::E100);
    }
}

mod sequence_diagrams {
    use super::*;

    fn message(item: &SequenceItem) -> &undine_core::semantic::Message {
        match item {
            SequenceItem::Message(message) => message,
            other => panic!("expected a message, got {other:?}"),
        }
    }

    #[test]
    fn test_participants_and_messages() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "participant A as Alice\n",
            "actor B as Bob\n",
            "A->>B: Hello\n",
            "B-->>A: Hi back\n",
        ));
        assert_eq!(sequence.participants.len(), 2);
        assert_eq!(sequence.participants[0].display, "Alice");
        assert!(!sequence.participants[0].actor);
        assert!(sequence.participants[1].actor);

        let first = message(&sequence.items[0]);
        assert_eq!((first.from, first.to), (0, 1));
        assert_eq!(first.text, "Hello");
        assert_eq!(first.line, MessageLine::Solid);
        assert_eq!(first.head, MessageHead::Filled);

        let second = message(&sequence.items[1]);
        assert_eq!(second.line, MessageLine::Dashed);
    }

    #[test]
    fn test_arrow_varieties() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "A->B: open solid\n",
            "A-->B: open dashed\n",
            "A-xB: cross solid\n",
            "A--xB: cross dashed\n",
        ));
        let heads: Vec<_> = sequence
            .items
            .iter()
            .map(|item| (message(item).line, message(item).head))
            .collect();
        assert_eq!(
            heads,
            [
                (MessageLine::Solid, MessageHead::Open),
                (MessageLine::Dashed, MessageHead::Open),
                (MessageLine::Solid, MessageHead::Cross),
                (MessageLine::Dashed, MessageHead::Cross),
            ]
        );
    }

    #[test]
    fn test_implicit_participants_in_encounter_order() {
        let sequence = parse_sequence("sequenceDiagram\nCarol->>Dan: hi\nDan->>Erin: fwd\n");
        let ids: Vec<&str> = sequence
            .participants
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, ["Carol", "Dan", "Erin"]);
    }

    #[test]
    fn test_explicit_declaration_upgrades_implicit() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "A->>B: early\n",
            "participant B as Bobby\n",
        ));
        // B keeps its original slot but picks up the display name.
        assert_eq!(sequence.participants[1].id, "B");
        assert_eq!(sequence.participants[1].display, "Bobby");
    }

    #[test]
    fn test_first_declaration_wins() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "participant A as First\n",
            "participant A as Second\n",
        ));
        assert_eq!(sequence.participants.len(), 1);
        assert_eq!(sequence.participants[0].display, "First");
    }

    #[test]
    fn test_self_message() {
        let sequence = parse_sequence("sequenceDiagram\nA->>A: think\n");
        let msg = message(&sequence.items[0]);
        assert_eq!(msg.from, msg.to);
    }

    #[test]
    fn test_message_without_text() {
        let sequence = parse_sequence("sequenceDiagram\nA->>B\n");
        assert_eq!(message(&sequence.items[0]).text, "");
    }

    #[test]
    fn test_autonumber() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "A->>B: first\n",
            "autonumber\n",
            "B->>A: second\n",
            "A->>B: third\n",
        ));
        assert_eq!(message(&sequence.items[0]).text, "first");
        assert_eq!(message(&sequence.items[1]).text, "1. second");
        assert_eq!(message(&sequence.items[2]).text, "2. third");
    }

    #[test]
    fn test_notes() {
        let sequence = parse_sequence(concat!(
            "sequenceDiagram\n",
            "A->>B: hi\n",
            "Note left of A: thinking\n",
            "note right of B: replying\n",
            "Note over A,B: handshake\n",
        ));
        let note = |i: usize| match &sequence.items[i] {
            SequenceItem::Note(note) => note,
            other => panic!("expected a note, got {other:?}"),
        };
        assert_eq!(note(1).placement, NotePlacement::LeftOf);
        assert_eq!(note(1).text, "thinking");
        assert_eq!(note(2).placement, NotePlacement::RightOf);
        assert_eq!(note(3).placement, NotePlacement::Over);
        assert_eq!(note(3).second, Some(1));
    }

    #[test]
    fn test_malformed_message() {
        assert_error_code("sequenceDiagram\nnot a message\n", ErrorCode::E105);
        assert_error_code("sequenceDiagram\n->>B: no sender\n", ErrorCode::E105);
        assert_error_code("sequenceDiagram\nA->>: no receiver\n", ErrorCode::E105);
    }

    #[test]
    fn test_trailing_text_after_header() {
        assert_error_code("sequenceDiagram extra\nA->>B: hi\n", ErrorCode::E100);
    }
}

mod diagnostics {
    use super::*;

    #[test]
    fn test_error_positions_are_one_based() {
        let err = parse_error("graph TD\nA -->\n");
        // The missing target is reported at the end of `A -->` on line 2.
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.column(), Some(6));
    }

    #[test]
    fn test_multiple_errors_are_collected() {
        let err = parse_error("graph TD\nA -->\nend\nclass A nope\n");
        let codes: Vec<_> = err
            .diagnostics()
            .iter()
            .filter_map(|diagnostic| diagnostic.code())
            .collect();
        assert!(codes.contains(&ErrorCode::E102));
        assert!(codes.contains(&ErrorCode::E104));
        assert!(codes.contains(&ErrorCode::E201));
    }

    #[test]
    fn test_display_includes_position_and_count() {
        let err = parse_error("graph TD\nA -->\nend\n");
        let text = err.to_string();
        assert!(text.contains("line 2"), "got: {text}");
        assert!(text.contains("more"), "got: {text}");
    }
}
