//! Text-grid rendering for sequence diagrams.
//!
//! Participant boxes sit on the top rows, messages and notes stack
//! downward one slot at a time. Lifelines are filled in last, only into
//! cells nothing else claimed, so arrows stay readable where they cross.

use undine_core::semantic::{MessageHead, MessageLine, NotePlacement, Sequence, SequenceItem};

use crate::{
    export::ascii::{AsciiOptions, CellGrid, Glyphs},
    layout::text,
};

/// Cells between adjacent participant boxes.
const PARTICIPANT_GAP: usize = 3;

/// Horizontal reach of a self-message lobe.
const LOBE_REACH: usize = 4;

pub(crate) fn render_sequence(sequence: &Sequence, options: &AsciiOptions) -> String {
    let glyphs = Glyphs::for_options(options);
    let mut grid = CellGrid::new();

    let boxes: Vec<(usize, usize, Vec<String>)> = {
        let mut placed = Vec::new();
        let mut cursor = 0usize;
        for participant in &sequence.participants {
            let lines = text::label_lines(&participant.display);
            let cells = lines.iter().map(|l| text::line_cells(l)).max().unwrap_or(1);
            let width = cells.max(1) + 2 * options.padding_x as usize + 2;
            placed.push((cursor, width, lines));
            cursor += width + PARTICIPANT_GAP;
        }
        placed
    };
    let band_height = boxes
        .iter()
        .map(|(_, _, lines)| lines.len() + 2 * options.padding_y as usize + 2)
        .max()
        .unwrap_or(0);
    let lifelines: Vec<usize> = boxes.iter().map(|(x, w, _)| x + w / 2).collect();

    for ((x, width, lines), participant) in boxes.iter().zip(&sequence.participants) {
        let corners = if participant.actor && !options.use_ascii {
            ['╭', '╮', '╯', '╰']
        } else {
            [
                glyphs.top_left,
                glyphs.top_right,
                glyphs.bottom_right,
                glyphs.bottom_left,
            ]
        };
        grid.frame(*x, 0, *width, band_height, &glyphs, corners, [glyphs.vertical; 2]);
        let top = 1 + options.padding_y as usize;
        for (idx, line) in lines.iter().enumerate() {
            let cells = text::line_cells(line);
            grid.text(x + 1 + (width - 2 - cells) / 2, top + idx, line);
        }
    }

    let mut row = band_height + 1;
    for item in &sequence.items {
        row = match item {
            SequenceItem::Message(message) if message.from == message.to => {
                draw_self_message(&mut grid, &glyphs, lifelines[message.from], row, message)
            }
            SequenceItem::Message(message) => draw_message(
                &mut grid,
                &glyphs,
                lifelines[message.from],
                lifelines[message.to],
                row,
                message,
            ),
            SequenceItem::Note(note) => {
                let first = lifelines[note.first];
                let second = note.second.map(|idx| lifelines[idx]).unwrap_or(first);
                draw_note(&mut grid, &glyphs, first, second, row, note)
            }
        } + 1;
    }

    // Lifelines fill the leftover cells from the box bottoms to past the
    // last slot.
    let end = row;
    for &x in &lifelines {
        for y in band_height..end {
            if grid.get(x, y) == ' ' {
                grid.put(x, y, glyphs.vertical);
            }
        }
    }

    grid.render()
}

/// Draws one message: an optional label row, then the arrow row. Returns
/// the first free row below.
fn draw_message(
    grid: &mut CellGrid,
    glyphs: &Glyphs,
    from_x: usize,
    to_x: usize,
    mut row: usize,
    message: &undine_core::semantic::Message,
) -> usize {
    if !message.text.is_empty() {
        let cells = text::line_cells(&message.text);
        let start = from_x.midpoint(to_x).saturating_sub(cells / 2);
        grid.text(start, row, &message.text);
        row += 1;
    }

    let shaft = shaft_char(glyphs, message.line);
    grid.hline(from_x.min(to_x) + 1, from_x.max(to_x) - 1, row, shaft);
    if to_x > from_x {
        grid.put(to_x - 1, row, head_char(glyphs, message.head, true));
    } else {
        grid.put(to_x + 1, row, head_char(glyphs, message.head, false));
    }
    row + 1
}

/// A self-message lobe on the right of the lifeline, label beside it.
fn draw_self_message(
    grid: &mut CellGrid,
    glyphs: &Glyphs,
    x: usize,
    row: usize,
    message: &undine_core::semantic::Message,
) -> usize {
    let shaft = shaft_char(glyphs, message.line);
    let out = x + LOBE_REACH;
    grid.hline(x + 1, out, row, shaft);
    grid.vline(out, row, row + 2, glyphs.vertical);
    grid.hline(x + 2, out, row + 2, shaft);
    grid.put(x + 1, row + 2, head_char(glyphs, message.head, false));
    if !message.text.is_empty() {
        grid.text(out + 2, row + 1, &message.text);
    }
    row + 3
}

/// A note box beside or spanning the anchor lifelines.
fn draw_note(
    grid: &mut CellGrid,
    glyphs: &Glyphs,
    first: usize,
    second: usize,
    row: usize,
    note: &undine_core::semantic::Note,
) -> usize {
    let cells = text::line_cells(&note.text).max(1);
    let width = cells + 4;
    let x = match note.placement {
        NotePlacement::LeftOf => first.saturating_sub(width + 1),
        NotePlacement::RightOf => first + 2,
        NotePlacement::Over => {
            let (lo, hi) = (first.min(second), first.max(second));
            let span = hi - lo + 5;
            let center = lo.midpoint(hi);
            center.saturating_sub(span.max(width) / 2)
        }
    };
    let width = if note.placement == NotePlacement::Over {
        width.max(first.abs_diff(second) + 5)
    } else {
        width
    };

    let corners = [
        glyphs.top_left,
        glyphs.top_right,
        glyphs.bottom_right,
        glyphs.bottom_left,
    ];
    grid.frame(x, row, width, 3, glyphs, corners, [glyphs.vertical; 2]);
    grid.text(x + 1 + (width - 2 - cells) / 2, row + 1, &note.text);
    row + 3
}

fn shaft_char(glyphs: &Glyphs, line: MessageLine) -> char {
    match line {
        MessageLine::Solid => glyphs.horizontal,
        MessageLine::Dashed => glyphs.dash,
    }
}

fn head_char(glyphs: &Glyphs, head: MessageHead, rightward: bool) -> char {
    match (head, rightward) {
        (MessageHead::Cross, _) => 'x',
        (_, true) => glyphs.arrow_right,
        (_, false) => glyphs.arrow_left,
    }
}
