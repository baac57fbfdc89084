//! Flowchart statement grammar.
//!
//! Statements arrive pre-split (one fragment per `;` or newline). Each is
//! either a keyword statement (`subgraph`, `end`, `style`, `classDef`,
//! `class`, `linkStyle`, `direction`) or a node/edge chain such as
//! `A[Start] --> B{Choice} -->|yes| C`.

use std::collections::{HashMap, HashSet};

use log::debug;
use undine_core::semantic::{
    ArrowHead, Direction, Edge, EdgeLine, Flowchart, Node, NodeShape, StyleOverride, Subgraph,
};

use crate::{
    Statement,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    scan::{Cursor, scan_identifier},
    span::Span,
};

type Result<T> = std::result::Result<T, Diagnostic>;

const SHAFT_CHARS: [char; 3] = ['-', '=', '.'];
const HEAD_CHARS: [char; 3] = ['>', 'o', 'x'];

pub(crate) fn parse(
    statements: &[Statement<'_>],
    direction: Direction,
) -> std::result::Result<Flowchart, ParseError> {
    let mut parser = FlowchartParser::new(direction);
    for statement in statements {
        if let Err(diagnostic) = parser.statement(statement) {
            parser.collector.emit(diagnostic);
        }
    }
    parser.finish()
}

struct FlowchartParser {
    chart: Flowchart,
    collector: DiagnosticCollector,
    /// Currently open blocks: index into `chart.subgraphs` plus the span of
    /// the opening statement.
    open_subgraphs: Vec<(usize, Span)>,
    /// Where each subgraph was declared, for duplicate reports.
    subgraph_spans: HashMap<String, Span>,
    /// Nodes declared with an explicit shape/label; first declaration wins.
    explicit_nodes: HashSet<String>,
    /// Nodes already assigned to a subgraph; first reference wins.
    assigned_nodes: HashSet<String>,
    class_defs: HashMap<String, StyleOverride>,
    class_uses: Vec<(Vec<String>, String, Span)>,
    link_styles: Vec<(usize, StyleOverride, Span)>,
}

impl FlowchartParser {
    fn new(direction: Direction) -> Self {
        Self {
            chart: Flowchart {
                direction,
                ..Flowchart::default()
            },
            collector: DiagnosticCollector::new(),
            open_subgraphs: Vec::new(),
            subgraph_spans: HashMap::new(),
            explicit_nodes: HashSet::new(),
            assigned_nodes: HashSet::new(),
            class_defs: HashMap::new(),
            class_uses: Vec::new(),
            link_styles: Vec::new(),
        }
    }

    fn finish(mut self) -> std::result::Result<Flowchart, ParseError> {
        if let Some(&(_, span)) = self.open_subgraphs.last() {
            self.collector.emit(
                Diagnostic::error("subgraph is never closed")
                    .with_code(ErrorCode::E103)
                    .with_label(span, "opened here")
                    .with_help("add a matching `end`"),
            );
        }

        self.apply_classes();
        self.apply_link_styles();

        self.collector.finish()?;
        debug!(
            nodes = self.chart.nodes.len(),
            edges = self.chart.edges.len(),
            subgraphs = self.chart.subgraphs.len();
            "flowchart parsed"
        );
        Ok(self.chart)
    }

    fn apply_classes(&mut self) {
        for (ids, name, span) in std::mem::take(&mut self.class_uses) {
            let Some(class_style) = self.class_defs.get(&name).cloned() else {
                self.collector.emit(
                    Diagnostic::error(format!("unknown class `{name}`"))
                        .with_code(ErrorCode::E201)
                        .with_label(span, "no `classDef` with this name")
                        .with_help("declare it first: `classDef name fill:...`"),
                );
                continue;
            };
            for id in ids {
                let node = self
                    .chart
                    .nodes
                    .entry(id.clone())
                    .or_insert_with(|| Node::implicit(&id));
                let inline = node.style.take().unwrap_or_default();
                node.style = Some(class_style.merged_under(&inline));
            }
        }
    }

    fn apply_link_styles(&mut self) {
        for (index, style, span) in std::mem::take(&mut self.link_styles) {
            let Some(edge) = self.chart.edges.get_mut(index) else {
                self.collector.emit(
                    Diagnostic::error(format!("linkStyle index {index} is out of range"))
                        .with_code(ErrorCode::E202)
                        .with_label(span, format!("only {} edges declared", self.chart.edges.len())),
                );
                continue;
            };
            let existing = edge.style.take().unwrap_or_default();
            edge.style = Some(existing.merged_under(&style));
        }
    }

    fn statement(&mut self, stmt: &Statement<'_>) -> Result<()> {
        let mut cur = stmt.cursor();
        let word = scan_identifier(&mut cur);

        match word {
            "subgraph" => self.subgraph_open(stmt, &mut cur),
            "end" if cur.remaining().trim().is_empty() => self.subgraph_close(stmt),
            "style" => self.style_statement(&mut cur),
            "classDef" => self.class_def_statement(&mut cur),
            "class" => self.class_statement(&mut cur),
            "linkStyle" => self.link_style_statement(&mut cur),
            "direction" => {
                self.collector.emit(
                    Diagnostic::warning("`direction` inside a flowchart body is ignored")
                        .with_label(stmt.span(), "set the direction on the header instead"),
                );
                Ok(())
            }
            _ => {
                // Not a keyword; re-parse from the start as a node/edge chain.
                let mut cur = stmt.cursor();
                self.chain_statement(&mut cur)
            }
        }
    }

    fn subgraph_open(&mut self, stmt: &Statement<'_>, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let id_start = cur.pos();
        let id = scan_identifier(cur);
        if id.is_empty() {
            return Err(Diagnostic::error("expected a subgraph id")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "after `subgraph`"));
        }
        let id_span = cur.span(id_start..cur.pos());

        cur.skip_whitespace();
        let title = if cur.starts_with("[") {
            Some(bracket_label(cur, "[", "]")?)
        } else if !cur.at_end() {
            return Err(Diagnostic::error("unexpected text after subgraph id")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "expected `[title]` or end of line"));
        } else {
            None
        };

        if let Some(first) = self.subgraph_spans.get(id) {
            return Err(Diagnostic::error(format!("subgraph `{id}` is declared twice"))
                .with_code(ErrorCode::E200)
                .with_label(id_span, "duplicate declaration")
                .with_secondary_label(*first, "first declared here")
                .with_help("rename one of the subgraphs"));
        }
        self.subgraph_spans.insert(id.to_owned(), id_span);

        let index = self.chart.subgraphs.len();
        self.chart.subgraphs.push(Subgraph {
            id: id.to_owned(),
            title: title.unwrap_or_else(|| id.to_owned()),
            parent: self.open_subgraphs.last().map(|&(idx, _)| idx),
            nodes: Vec::new(),
        });
        self.open_subgraphs.push((index, stmt.span()));
        Ok(())
    }

    fn subgraph_close(&mut self, stmt: &Statement<'_>) -> Result<()> {
        if self.open_subgraphs.pop().is_none() {
            return Err(Diagnostic::error("`end` without an open subgraph")
                .with_code(ErrorCode::E104)
                .with_label(stmt.span(), "nothing to close"));
        }
        Ok(())
    }

    fn style_statement(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let id = scan_identifier(cur);
        if id.is_empty() {
            return Err(Diagnostic::error("expected a node id after `style`")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "node id missing"));
        }
        let style = parse_style_list(cur)?;

        let id = id.to_owned();
        self.register_node(&id, None);
        let node = self
            .chart
            .nodes
            .get_mut(&id)
            .expect("node was just registered");
        let existing = node.style.take().unwrap_or_default();
        node.style = Some(existing.merged_under(&style));
        Ok(())
    }

    fn class_def_statement(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let name = scan_identifier(cur);
        if name.is_empty() {
            return Err(Diagnostic::error("expected a class name after `classDef`")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "class name missing"));
        }
        let style = parse_style_list(cur)?;
        self.class_defs.insert(name.to_owned(), style);
        Ok(())
    }

    fn class_statement(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let list_start = cur.pos();
        let mut ids = Vec::new();
        loop {
            cur.skip_whitespace();
            let id = scan_identifier(cur);
            if id.is_empty() {
                return Err(Diagnostic::error("expected node ids after `class`")
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span_to_end(), "node id missing"));
            }
            ids.push(id.to_owned());
            cur.skip_whitespace();
            if !cur.eat_str(",") {
                break;
            }
        }

        cur.skip_whitespace();
        let name = scan_identifier(cur);
        if name.is_empty() {
            return Err(Diagnostic::error("`class` needs node ids and a class name")
                .with_code(ErrorCode::E100)
                .with_label(
                    cur.span(list_start..cur.pos()),
                    "expected `class id1,id2 name`",
                ));
        }
        let span = cur.span(list_start..cur.pos());
        self.class_uses.push((ids, name.to_owned(), span));

        cur.skip_whitespace();
        if !cur.at_end() {
            return Err(Diagnostic::error("unexpected text after `class` statement")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "expected end of statement"));
        }
        Ok(())
    }

    fn link_style_statement(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let idx_start = cur.pos();
        let idx_token = cur.take_while(|c| c.is_ascii_digit());
        if idx_token.is_empty() {
            return Err(Diagnostic::error("expected an edge index after `linkStyle`")
                .with_code(ErrorCode::E202)
                .with_label(cur.span_to_end(), "edge index missing")
                .with_help("edges are numbered from 0 in declaration order"));
        }
        let span = cur.span(idx_start..cur.pos());
        let index: usize = idx_token.parse().map_err(|_| {
            Diagnostic::error(format!("invalid edge index `{idx_token}`"))
                .with_code(ErrorCode::E202)
                .with_label(span, "not a valid index")
        })?;
        let style = parse_style_list(cur)?;
        self.link_styles.push((index, style, span));
        Ok(())
    }

    /// Parses `A[Start] --> B{Choice} -->|yes| C` style chains, including a
    /// bare node declaration with no edges.
    fn chain_statement(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        let mut from = self.node_spec(cur, ErrorCode::E100)?;

        loop {
            cur.skip_whitespace();
            if cur.at_end() {
                return Ok(());
            }

            let (line, head, mut label) = parse_arrow(cur)?;

            cur.skip_whitespace();
            if cur.starts_with("|") {
                label = Some(bracket_label(cur, "|", "|")?);
            }

            cur.skip_whitespace();
            let to = self.node_spec(cur, ErrorCode::E102)?;

            self.chart.edges.push(Edge {
                from: from.clone(),
                to: to.clone(),
                label: label.filter(|l| !l.is_empty()),
                line,
                head,
                style: None,
            });
            from = to;
        }
    }

    /// Parses one node reference with optional shape brackets and registers
    /// it, returning its id.
    fn node_spec(&mut self, cur: &mut Cursor<'_>, code: ErrorCode) -> Result<String> {
        cur.skip_whitespace();
        let id = scan_identifier(cur);
        if id.is_empty() {
            let message = match code {
                ErrorCode::E102 => "edge is missing its target node",
                _ => "expected a node",
            };
            return Err(Diagnostic::error(message)
                .with_code(code)
                .with_label(cur.span_to_end(), "expected a node identifier"));
        }
        let id = id.to_owned();

        let decl = match () {
            _ if cur.starts_with("((") => Some((NodeShape::Circle, "((", "))")),
            _ if cur.starts_with("([") => Some((NodeShape::Stadium, "([", "])")),
            _ if cur.starts_with("[[") => Some((NodeShape::Subroutine, "[[", "]]")),
            _ if cur.starts_with("[") => Some((NodeShape::Rectangle, "[", "]")),
            _ if cur.starts_with("(") => Some((NodeShape::Rounded, "(", ")")),
            _ if cur.starts_with("{") => Some((NodeShape::Diamond, "{", "}")),
            _ if cur.starts_with(">") && !cur.remaining()[1..].trim().is_empty() => {
                Some((NodeShape::Flag, ">", "]"))
            }
            _ => None,
        };

        match decl {
            Some((shape, open, close)) => {
                let label = bracket_label(cur, open, close)?;
                self.register_node(&id, Some((shape, label)));
            }
            None => self.register_node(&id, None),
        }
        Ok(id)
    }

    /// Records a node reference. `declaration` carries an explicit shape and
    /// label; the first explicit declaration wins, bare references never
    /// downgrade one.
    fn register_node(&mut self, id: &str, declaration: Option<(NodeShape, String)>) {
        match declaration {
            Some((shape, label)) if !self.explicit_nodes.contains(id) => {
                self.explicit_nodes.insert(id.to_owned());
                let node = self
                    .chart
                    .nodes
                    .entry(id.to_owned())
                    .or_insert_with(|| Node::implicit(id));
                node.shape = shape;
                node.label = if label.is_empty() { id.to_owned() } else { label };
            }
            _ => {
                self.chart
                    .nodes
                    .entry(id.to_owned())
                    .or_insert_with(|| Node::implicit(id));
            }
        }

        if let Some(&(subgraph, _)) = self.open_subgraphs.last()
            && !self.assigned_nodes.contains(id)
        {
            self.assigned_nodes.insert(id.to_owned());
            self.chart.subgraphs[subgraph].nodes.push(id.to_owned());
        }
    }
}

/// Consumes `open`, scans to the matching `close`, and returns the trimmed,
/// unquoted label text.
fn bracket_label(cur: &mut Cursor<'_>, open: &str, close: &str) -> Result<String> {
    let open_start = cur.pos();
    let consumed = cur.eat_str(open);
    debug_assert!(consumed, "caller checked the opening bracket");
    let open_span = cur.span(open_start..cur.pos());

    match cur.remaining().find(close) {
        Some(idx) => {
            let label = cur.remaining()[..idx].trim();
            let label = label
                .strip_prefix('"')
                .and_then(|l| l.strip_suffix('"'))
                .unwrap_or(label)
                .to_owned();
            cur.advance(idx + close.len());
            Ok(label)
        }
        None => Err(Diagnostic::error(format!("`{open}` is never closed"))
            .with_code(ErrorCode::E001)
            .with_label(open_span, "opened here")
            .with_help(format!("close the label with `{close}`"))),
    }
}

/// Parses an edge arrow at the cursor: shaft, optional head, and the
/// `-- text -->` inline label form.
fn parse_arrow(cur: &mut Cursor<'_>) -> Result<(EdgeLine, ArrowHead, Option<String>)> {
    let start = cur.pos();
    let shaft = cur.take_while(|c| SHAFT_CHARS.contains(&c));
    if shaft.chars().count() < 2 {
        return Err(Diagnostic::error("expected an arrow")
            .with_code(ErrorCode::E100)
            .with_label(cur.span(start..cur.pos().max(start + 1)), "not an arrow")
            .with_help("use `-->`, `---`, `-.->`, `==>` or similar"));
    }

    if let Some(head) = take_head(cur) {
        return Ok((line_style(shaft), head, None));
    }

    // No head directly after the shaft: either a headless link (`A --- B`)
    // or the label form (`A -- text --> B`). Look ahead for a closing shaft.
    let rest = cur.remaining();
    if let Some((token_start, _)) = find_arrow_token(rest) {
        let label = rest[..token_start].trim().to_owned();
        cur.advance(token_start);
        let closing_shaft = cur.take_while(|c| SHAFT_CHARS.contains(&c));
        let head = take_head(cur).unwrap_or(ArrowHead::None);
        let combined = format!("{shaft}{closing_shaft}");
        return Ok((
            line_style(&combined),
            head,
            Some(label).filter(|l| !l.is_empty()),
        ));
    }

    Ok((line_style(shaft), ArrowHead::None, None))
}

fn line_style(shaft: &str) -> EdgeLine {
    if shaft.contains('.') {
        EdgeLine::Dotted
    } else if shaft.contains('=') {
        EdgeLine::Thick
    } else {
        EdgeLine::Solid
    }
}

/// Consumes a head character when one terminates the arrow here.
fn take_head(cur: &mut Cursor<'_>) -> Option<ArrowHead> {
    let c = cur.peek()?;
    let head = match c {
        '>' => ArrowHead::Arrow,
        // `o`/`x` are also identifier characters; they only count as heads
        // when nothing identifier-like follows (`A --o B`, not `A --oops`).
        'o' | 'x' => {
            let mut ahead = cur.remaining().chars();
            ahead.next();
            if ahead.next().is_some_and(crate::scan::is_ident_start) {
                return None;
            }
            if c == 'o' { ArrowHead::Circle } else { ArrowHead::Cross }
        }
        _ => return None,
    };
    cur.bump();
    Some(head)
}

fn take_head_char(token: &str) -> Option<char> {
    token.chars().last().filter(|c| HEAD_CHARS.contains(c))
}

/// Finds the next whitespace-delimited token that is a closing arrow
/// (shaft of 2+ characters, optional trailing head).
fn find_arrow_token(text: &str) -> Option<(usize, &str)> {
    let mut index = 0;
    for token in text.split_whitespace() {
        // split_whitespace loses offsets; recover them by searching forward.
        let found = text[index..].find(token)? + index;
        if is_arrow_token(token) {
            return Some((found, token));
        }
        index = found + token.len();
    }
    None
}

fn is_arrow_token(token: &str) -> bool {
    let shaft = match take_head_char(token) {
        Some(_) => &token[..token.len() - 1],
        None => token,
    };
    shaft.chars().count() >= 2 && shaft.chars().all(|c| SHAFT_CHARS.contains(&c))
}

/// Parses a trailing `key:value,key:value` list.
fn parse_style_list(cur: &mut Cursor<'_>) -> Result<StyleOverride> {
    cur.skip_whitespace();
    let start = cur.pos();
    let rest = cur.remaining().trim();
    if rest.is_empty() {
        return Err(Diagnostic::error("expected style properties")
            .with_code(ErrorCode::E100)
            .with_label(cur.span_to_end(), "style list missing")
            .with_help("write properties as `fill:#f9f,stroke:#333`"));
    }

    let mut style = StyleOverride::new();
    for entry in rest.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once(':') {
            Some((key, value)) => style.insert(key.trim(), value.trim()),
            None => {
                return Err(Diagnostic::error(format!("malformed style entry `{entry}`"))
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span(start..start + rest.len()), "expected `key:value`"));
            }
        }
    }
    Ok(style)
}
