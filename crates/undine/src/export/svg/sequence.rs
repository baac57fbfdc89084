//! SVG rendering for sequence diagrams.

use svg::node::element as svg_element;

use undine_core::{
    geometry::Point,
    semantic::{MessageHead, MessageLine, Sequence, SequenceItem},
    theme::Palette,
};

use crate::{
    config::RenderConfig,
    export::svg::{Canvas, MarkerKind, fmt, polyline_data},
    layout::{SequenceLayout, SlotLayout},
};

/// Dash pattern for lifelines and dashed messages.
const DASHES: &str = "6 4";

/// Horizontal reach of a self-message lobe.
const LOBE_REACH: f32 = 40.0;

pub(crate) fn render_sequence(
    sequence: &Sequence,
    layout: &SequenceLayout,
    palette: &Palette,
    config: &RenderConfig,
    transparent: bool,
) -> String {
    let mut canvas = Canvas::new(palette, config, transparent);
    let mut content = svg_element::Group::new();

    // Lifelines first so everything else draws over them.
    for participant_layout in &layout.participants {
        let x = participant_layout.bounds.center().x();
        content = content.add(
            svg_element::Line::new()
                .set("x1", fmt(x))
                .set("y1", fmt(participant_layout.bounds.max_y()))
                .set("x2", fmt(x))
                .set("y2", fmt(participant_layout.lifeline_end))
                .set("stroke", &palette.line)
                .set("stroke-width", fmt(1.0))
                .set("stroke-dasharray", DASHES),
        );
    }

    for (participant, participant_layout) in
        sequence.participants.iter().zip(&layout.participants)
    {
        let bounds = participant_layout.bounds;
        // Actors carry the accent color; plain participants the border.
        let stroke = if participant.actor {
            &palette.accent
        } else {
            &palette.border
        };
        let group = svg_element::Group::new()
            .set("id", format!("participant-{}", participant.id))
            .add(
                svg_element::Rectangle::new()
                    .set("x", fmt(bounds.min_x()))
                    .set("y", fmt(bounds.min_y()))
                    .set("width", fmt(bounds.width()))
                    .set("height", fmt(bounds.height()))
                    .set("fill", &palette.surface)
                    .set("stroke", stroke)
                    .set("stroke-width", fmt(1.5))
                    .set("rx", fmt(3.0)),
            )
            .add(canvas.text_block(
                &participant_layout.lines,
                bounds.center(),
                &palette.fg.to_string(),
            ));
        content = content.add(group);
    }

    for slot in &layout.slots {
        content = match slot {
            SlotLayout::Message {
                item,
                y,
                from_x,
                to_x,
                self_loop,
            } => {
                let SequenceItem::Message(message) = &sequence.items[*item] else {
                    continue;
                };
                let stroke = palette.line.to_string();
                let points = if *self_loop {
                    let drop = config.message_gap() / 2.0;
                    vec![
                        Point::new(*from_x, *y),
                        Point::new(from_x + LOBE_REACH, *y),
                        Point::new(from_x + LOBE_REACH, y + drop),
                        Point::new(*from_x, y + drop),
                    ]
                } else {
                    vec![Point::new(*from_x, *y), Point::new(*to_x, *y)]
                };

                let mut path = svg_element::Path::new()
                    .set("d", polyline_data(&points))
                    .set("fill", "none")
                    .set("stroke", stroke.as_str())
                    .set("stroke-width", fmt(1.5))
                    .set(
                        "marker-end",
                        canvas.markers.reference(head_marker(message.head), &stroke),
                    );
                if message.line == MessageLine::Dashed {
                    path = path.set("stroke-dasharray", DASHES);
                }

                let mut group = svg_element::Group::new().add(path);
                if !message.text.is_empty() {
                    let label_at = if *self_loop {
                        Point::new(
                            from_x + LOBE_REACH + 6.0,
                            y + config.message_gap() / 4.0,
                        )
                    } else {
                        Point::new(
                            (from_x + to_x) / 2.0,
                            y - config.text().cell_height() * 0.6,
                        )
                    };
                    let lines = vec![message.text.clone()];
                    let mut text =
                        canvas.text_block(&lines, label_at, &palette.muted.to_string());
                    if *self_loop {
                        text = text.set("text-anchor", "start");
                    }
                    group = group.add(text);
                }
                content.add(group)
            }
            SlotLayout::Note { item, bounds } => {
                let SequenceItem::Note(note) = &sequence.items[*item] else {
                    continue;
                };
                let lines = vec![note.text.clone()];
                content.add(
                    svg_element::Group::new()
                        .add(
                            svg_element::Rectangle::new()
                                .set("x", fmt(bounds.min_x()))
                                .set("y", fmt(bounds.min_y()))
                                .set("width", fmt(bounds.width()))
                                .set("height", fmt(bounds.height()))
                                .set("fill", &palette.surface)
                                .set("stroke", &palette.muted)
                                .set("stroke-width", fmt(1.0)),
                        )
                        .add(canvas.text_block(&lines, bounds.center(), &palette.fg.to_string())),
                )
            }
        };
    }

    canvas.into_document(layout.bounds, content)
}

fn head_marker(head: MessageHead) -> MarkerKind {
    match head {
        MessageHead::Filled => MarkerKind::Arrow,
        MessageHead::Open => MarkerKind::Open,
        MessageHead::Cross => MarkerKind::Cross,
    }
}
