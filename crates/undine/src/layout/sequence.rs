//! Sequence diagram layout.
//!
//! Participants form one horizontal band at the top in first-appearance
//! order; every message or note occupies its own vertical slot below, in
//! strict declaration order. Nothing downstream may reorder slots.

use log::debug;

use undine_core::{
    geometry::{Bounds, Point, Size},
    semantic::{NotePlacement, Sequence, SequenceItem},
};

use crate::{
    config::RenderConfig,
    layout::{LayoutError, ParticipantLayout, SequenceLayout, SlotLayout, text},
};

/// Extra room a self-message lobe needs below its slot.
const SELF_LOOP_EXTRA: f32 = 0.5;

/// Horizontal clearance between a lifeline and a side note.
const NOTE_CLEARANCE: f32 = 10.0;

pub fn layout(sequence: &Sequence, config: &RenderConfig) -> Result<SequenceLayout, LayoutError> {
    let count = sequence.participants.len();
    for item in &sequence.items {
        let indices: Vec<usize> = match item {
            SequenceItem::Message(message) => vec![message.from, message.to],
            SequenceItem::Note(note) => {
                let mut targets = vec![note.first];
                targets.extend(note.second);
                targets
            }
        };
        for index in indices {
            if index >= count {
                return Err(LayoutError::UnknownParticipant { index, count });
            }
        }
    }

    if count == 0 {
        return Ok(SequenceLayout::default());
    }

    let padding = config.node_padding();
    let line_sets: Vec<Vec<String>> = sequence
        .participants
        .iter()
        .map(|p| text::label_lines(&p.display))
        .collect();
    let sizes: Vec<Size> = line_sets
        .iter()
        .map(|lines| text::measure(lines, config.text()).add_padding(padding))
        .collect();
    let band_height = sizes.iter().map(|size| size.height()).fold(0.0f32, f32::max);

    // Header boxes, x advancing by box width plus the configured gap.
    let mut participants = Vec::with_capacity(count);
    let mut cursor_x = 0.0f32;
    for (size, lines) in sizes.iter().zip(&line_sets) {
        let center = Point::new(cursor_x + size.width() / 2.0, band_height / 2.0);
        participants.push(ParticipantLayout {
            bounds: Bounds::from_center(center, *size),
            lifeline_end: band_height,
            lines: lines.clone(),
        });
        cursor_x += size.width() + config.participant_gap();
    }

    let lifeline_x: Vec<f32> = participants
        .iter()
        .map(|p| p.bounds.center().x())
        .collect();

    let mut slots = Vec::with_capacity(sequence.items.len());
    let mut cursor_y = band_height + config.message_gap();
    for (item_idx, item) in sequence.items.iter().enumerate() {
        match item {
            SequenceItem::Message(message) => {
                let self_loop = message.from == message.to;
                slots.push(SlotLayout::Message {
                    item: item_idx,
                    y: cursor_y,
                    from_x: lifeline_x[message.from],
                    to_x: lifeline_x[message.to],
                    self_loop,
                });
                cursor_y += config.message_gap();
                if self_loop {
                    cursor_y += config.message_gap() * SELF_LOOP_EXTRA;
                }
            }
            SequenceItem::Note(note) => {
                let lines = text::label_lines(&note.text);
                let size = text::measure(&lines, config.text()).add_padding(padding);
                let anchor = lifeline_x[note.first];
                let bounds = match note.placement {
                    NotePlacement::LeftOf => Bounds::from_top_left(
                        Point::new(anchor - NOTE_CLEARANCE - size.width(), cursor_y),
                        size,
                    ),
                    NotePlacement::RightOf => {
                        Bounds::from_top_left(Point::new(anchor + NOTE_CLEARANCE, cursor_y), size)
                    }
                    NotePlacement::Over => {
                        let far = note.second.map_or(anchor, |idx| lifeline_x[idx]);
                        let center_x = (anchor + far) / 2.0;
                        let span = (far - anchor).abs() + padding.horizontal_sum();
                        let width = size.width().max(span);
                        Bounds::from_center(
                            Point::new(center_x, cursor_y + size.height() / 2.0),
                            Size::new(width, size.height()),
                        )
                    }
                };
                cursor_y += size.height() + config.message_gap() / 2.0;
                slots.push(SlotLayout::Note {
                    item: item_idx,
                    bounds,
                });
            }
        }
    }

    let lifeline_end = cursor_y;
    for participant in &mut participants {
        participant.lifeline_end = lifeline_end;
    }

    let mut bounds = participants[0].bounds;
    for participant in &participants[1..] {
        bounds = bounds.merge(&participant.bounds);
    }
    bounds = bounds.merge(&Bounds::from_top_left(
        Point::new(bounds.min_x(), bounds.min_y()),
        Size::new(bounds.width(), lifeline_end - bounds.min_y()),
    ));
    for slot in &slots {
        if let SlotLayout::Note { bounds: note_bounds, .. } = slot {
            bounds = bounds.merge(note_bounds);
        }
    }

    debug!(
        participants = count,
        slots = slots.len(),
        lifeline_end = lifeline_end;
        "sequence laid out"
    );
    Ok(SequenceLayout {
        participants,
        slots,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use undine_core::semantic::Diagram;
    use undine_parser::parse;

    use super::*;

    fn layout_source(source: &str) -> SequenceLayout {
        let Diagram::Sequence(sequence) = parse(source).unwrap() else {
            panic!("expected a sequence diagram");
        };
        layout(&sequence, &RenderConfig::default()).unwrap()
    }

    fn message_ys(layout: &SequenceLayout) -> Vec<f32> {
        layout
            .slots
            .iter()
            .filter_map(|slot| match slot {
                SlotLayout::Message { y, .. } => Some(*y),
                SlotLayout::Note { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_participants_left_to_right() {
        let layout = layout_source("sequenceDiagram\nA->>B: one\nB->>C: two\n");
        let xs: Vec<f32> = layout
            .participants
            .iter()
            .map(|p| p.bounds.center().x())
            .collect();
        assert!(xs[0] < xs[1] && xs[1] < xs[2]);
    }

    #[test]
    fn test_message_ys_strictly_increase() {
        let layout = layout_source(concat!(
            "sequenceDiagram\n",
            "A->>B: one\n",
            "B->>A: two\n",
            "A->>A: think\n",
            "A->>B: three\n",
        ));
        let ys = message_ys(&layout);
        assert_eq!(ys.len(), 4);
        for pair in ys.windows(2) {
            assert!(pair[0] < pair[1], "message ys not increasing: {ys:?}");
        }
    }

    #[test]
    fn test_self_loop_consumes_extra_room() {
        let plain = layout_source("sequenceDiagram\nA->>B: x\nA->>B: y\n");
        let looped = layout_source("sequenceDiagram\nA->>A: x\nA->>B: y\n");
        let plain_ys = message_ys(&plain);
        let looped_ys = message_ys(&looped);
        assert!(looped_ys[1] - looped_ys[0] > plain_ys[1] - plain_ys[0]);
    }

    #[test]
    fn test_messages_span_the_right_lifelines() {
        let layout = layout_source("sequenceDiagram\nA->>B: hi\n");
        let SlotLayout::Message { from_x, to_x, .. } = layout.slots[0] else {
            panic!("expected a message slot");
        };
        assert_eq!(from_x, layout.participants[0].bounds.center().x());
        assert_eq!(to_x, layout.participants[1].bounds.center().x());
    }

    #[test]
    fn test_lifelines_reach_past_the_last_slot() {
        let layout = layout_source("sequenceDiagram\nA->>B: one\nB->>A: two\n");
        let last_y = *message_ys(&layout).last().unwrap();
        for participant in &layout.participants {
            assert!(participant.lifeline_end > last_y);
        }
    }

    #[test]
    fn test_note_placements() {
        let layout = layout_source(concat!(
            "sequenceDiagram\n",
            "A->>B: hi\n",
            "Note left of A: l\n",
            "Note right of B: r\n",
            "Note over A,B: o\n",
        ));
        let a_x = layout.participants[0].bounds.center().x();
        let b_x = layout.participants[1].bounds.center().x();

        let note_bounds: Vec<Bounds> = layout
            .slots
            .iter()
            .filter_map(|slot| match slot {
                SlotLayout::Note { bounds, .. } => Some(*bounds),
                SlotLayout::Message { .. } => None,
            })
            .collect();
        assert!(note_bounds[0].max_x() < a_x);
        assert!(note_bounds[1].min_x() > b_x);
        assert!(note_bounds[2].min_x() < a_x && note_bounds[2].max_x() > b_x);
    }

    #[test]
    fn test_deterministic() {
        let source = "sequenceDiagram\nA->>B: one\nNote over A: n\nB-->>A: two\n";
        assert_eq!(layout_source(source), layout_source(source));
    }

    #[test]
    fn test_out_of_range_participant_is_rejected() {
        let mut sequence = Sequence::default();
        sequence
            .items
            .push(SequenceItem::Message(undine_core::semantic::Message {
                from: 0,
                to: 0,
                text: String::new(),
                line: undine_core::semantic::MessageLine::Solid,
                head: undine_core::semantic::MessageHead::Filled,
            }));
        let err = layout(&sequence, &RenderConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::UnknownParticipant { index: 0, count: 0 });
    }
}
