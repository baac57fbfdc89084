//! Sequence diagram grammar.
//!
//! One statement per line: `participant`/`actor` declarations, messages
//! such as `A->>B: text`, `autonumber`, and notes. Messages keep strict
//! declaration order in the model; participants appear in first-seen order.

use std::collections::{HashMap, HashSet};

use log::debug;
use undine_core::semantic::{
    Message, MessageHead, MessageLine, Note, NotePlacement, Participant, Sequence, SequenceItem,
};

use crate::{
    Statement,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    scan::{Cursor, scan_identifier},
};

type Result<T> = std::result::Result<T, Diagnostic>;

/// Message arrows, longest first so ties at the same position prefer the
/// longer token.
const ARROWS: [&str; 6] = ["-->>", "->>", "--x", "-x", "-->", "->"];

pub(crate) fn parse(lines: &[Statement<'_>]) -> std::result::Result<Sequence, ParseError> {
    let mut parser = SequenceParser::default();
    for line in lines {
        if let Err(diagnostic) = parser.statement(line) {
            parser.collector.emit(diagnostic);
        }
    }
    parser.finish()
}

#[derive(Default)]
struct SequenceParser {
    sequence: Sequence,
    collector: DiagnosticCollector,
    indices: HashMap<String, usize>,
    /// Participants declared via `participant`/`actor`, not just referenced.
    explicit: HashSet<String>,
    /// `Some(next)` once `autonumber` has been seen.
    autonumber: Option<u32>,
}

impl SequenceParser {
    fn finish(self) -> std::result::Result<Sequence, ParseError> {
        self.collector.finish()?;
        debug!(
            participants = self.sequence.participants.len(),
            items = self.sequence.items.len();
            "sequence diagram parsed"
        );
        Ok(self.sequence)
    }

    fn statement(&mut self, stmt: &Statement<'_>) -> Result<()> {
        let mut cur = stmt.cursor();
        let word = scan_identifier(&mut cur);
        let keyword = cur.at_end() || cur.peek().is_some_and(char::is_whitespace);

        match word {
            "participant" if keyword => self.declaration(&mut cur, false),
            "actor" if keyword => self.declaration(&mut cur, true),
            "autonumber" if keyword => {
                self.autonumber = Some(1);
                Ok(())
            }
            w if w.eq_ignore_ascii_case("note") && keyword => self.note(&mut cur),
            _ => self.message(stmt),
        }
    }

    fn declaration(&mut self, cur: &mut Cursor<'_>, actor: bool) -> Result<()> {
        cur.skip_whitespace();
        let id = scan_identifier(cur);
        if id.is_empty() {
            return Err(Diagnostic::error("expected a participant id")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "participant id missing"));
        }
        let id = id.to_owned();

        cur.skip_whitespace();
        let display = if cur.at_end() {
            id.clone()
        } else if scan_identifier(cur) == "as" {
            let name = cur.remaining().trim();
            if name.is_empty() {
                return Err(Diagnostic::error("expected a display name after `as`")
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span_to_end(), "display name missing"));
            }
            name.to_owned()
        } else {
            return Err(Diagnostic::error("unexpected text after participant id")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "expected `as Display Name` or end of line"));
        };

        let index = self.intern(&id);
        // First explicit declaration wins; implicit references upgrade.
        if self.explicit.insert(id) {
            let participant = &mut self.sequence.participants[index];
            participant.display = display;
            participant.actor = actor;
        }
        Ok(())
    }

    fn note(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
        cur.skip_whitespace();
        let where_start = cur.pos();
        let word = scan_identifier(cur);
        let placement = if word.eq_ignore_ascii_case("over") {
            NotePlacement::Over
        } else {
            let side = if word.eq_ignore_ascii_case("left") {
                NotePlacement::LeftOf
            } else if word.eq_ignore_ascii_case("right") {
                NotePlacement::RightOf
            } else {
                return Err(Diagnostic::error("expected `left of`, `right of` or `over`")
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span(where_start..cur.pos()), "unknown note placement"));
            };
            cur.skip_whitespace();
            let of = scan_identifier(cur);
            if !of.eq_ignore_ascii_case("of") {
                return Err(Diagnostic::error("expected `of` after the note side")
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span_to_end(), "missing `of`"));
            }
            side
        };

        cur.skip_whitespace();
        let first = scan_identifier(cur);
        if first.is_empty() {
            return Err(Diagnostic::error("expected a participant for the note")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "participant missing"));
        }
        let first = self.intern(first);

        cur.skip_whitespace();
        let second = if placement == NotePlacement::Over && cur.eat_str(",") {
            cur.skip_whitespace();
            let id = scan_identifier(cur);
            if id.is_empty() {
                return Err(Diagnostic::error("expected a second participant after `,`")
                    .with_code(ErrorCode::E100)
                    .with_label(cur.span_to_end(), "participant missing"));
            }
            Some(self.intern(id))
        } else {
            None
        };

        cur.skip_whitespace();
        if !cur.eat_str(":") {
            return Err(Diagnostic::error("expected `:` before the note text")
                .with_code(ErrorCode::E100)
                .with_label(cur.span_to_end(), "note text missing"));
        }
        let text = cur.remaining().trim().to_owned();

        self.sequence.items.push(SequenceItem::Note(Note {
            placement,
            first,
            second,
            text,
        }));
        Ok(())
    }

    fn message(&mut self, stmt: &Statement<'_>) -> Result<()> {
        let text = stmt.text();
        let Some((arrow_pos, arrow)) = find_message_arrow(text) else {
            return Err(Diagnostic::error("expected a message, declaration or note")
                .with_code(ErrorCode::E105)
                .with_label(stmt.span(), "not a sequence statement")
                .with_help("messages look like `A->>B: text`"));
        };

        let from = text[..arrow_pos].trim();
        if from.is_empty() {
            return Err(Diagnostic::error("message is missing its sender")
                .with_code(ErrorCode::E105)
                .with_label(stmt.span(), "nothing before the arrow"));
        }

        let rest = &text[arrow_pos + arrow.len()..];
        let (to, body) = match rest.split_once(':') {
            Some((to, body)) => (to.trim(), body.trim()),
            None => (rest.trim(), ""),
        };
        if to.is_empty() {
            return Err(Diagnostic::error("message is missing its receiver")
                .with_code(ErrorCode::E105)
                .with_label(stmt.span(), "nothing after the arrow"));
        }

        let from = self.intern(from);
        let to = self.intern(to);

        let text = match self.autonumber.as_mut() {
            Some(next) => {
                let numbered = if body.is_empty() {
                    format!("{next}.")
                } else {
                    format!("{next}. {body}")
                };
                *next += 1;
                numbered
            }
            None => body.to_owned(),
        };

        self.sequence.items.push(SequenceItem::Message(Message {
            from,
            to,
            text,
            line: if arrow.starts_with("--") {
                MessageLine::Dashed
            } else {
                MessageLine::Solid
            },
            head: if arrow.ends_with(">>") {
                MessageHead::Filled
            } else if arrow.ends_with('x') {
                MessageHead::Cross
            } else {
                MessageHead::Open
            },
        }));
        Ok(())
    }

    /// Index of the participant with this id, declaring it on first use.
    fn intern(&mut self, id: &str) -> usize {
        if let Some(&index) = self.indices.get(id) {
            return index;
        }
        let index = self.sequence.participants.len();
        self.sequence.participants.push(Participant {
            id: id.to_owned(),
            display: id.to_owned(),
            actor: false,
        });
        self.indices.insert(id.to_owned(), index);
        index
    }
}

/// Finds the leftmost message arrow; ties at the same position take the
/// longest token (`-->>` over `-->`).
fn find_message_arrow(text: &str) -> Option<(usize, &'static str)> {
    let mut best: Option<(usize, &'static str)> = None;
    for arrow in ARROWS {
        if let Some(pos) = text.find(arrow) {
            let better = match best {
                Some((best_pos, best_arrow)) => {
                    pos < best_pos || (pos == best_pos && arrow.len() > best_arrow.len())
                }
                None => true,
            };
            if better {
                best = Some((pos, arrow));
            }
        }
    }
    best
}
