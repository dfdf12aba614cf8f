//! Rope mirror upkeep.
//!
//! The tracker keeps an `xi_rope::Rope` copy of the document text, advanced
//! by compiling each content-change batch into one delta. The mirror is read
//! for exactly one thing: the whitespace slice behind the line-of-sight
//! check. Positions are UTF-16 (line, character) coordinates, so reads go
//! through [`byte_of_position`].

use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::tracking::delta::ContentChange;
use crate::tracking::position::Position;

/// Byte offset of `pos` in `buffer`.
///
/// `pos.character` counts UTF-16 code units. Out-of-extent positions clamp
/// to the nearest valid offset (end of buffer, or end of line content before
/// its line break) rather than failing: the engine is fail-safe and a
/// clamped read can at worst report a false negative on line of sight.
pub(crate) fn byte_of_position(buffer: &Rope, pos: Position) -> usize {
    let max_line = buffer.line_of_offset(buffer.len());
    if pos.line > max_line {
        return buffer.len();
    }

    let line_start = buffer.offset_of_line(pos.line);
    let line_end = if pos.line == max_line {
        buffer.len()
    } else {
        buffer.offset_of_line(pos.line + 1)
    };
    let line = buffer.slice_to_cow(line_start..line_end);

    let mut units = 0;
    for (i, c) in line.char_indices() {
        if c == '\n' || c == '\r' || units >= pos.character {
            return line_start + i;
        }
        units += c.len_utf16();
    }
    line_start + line.len()
}

/// Apply a sorted batch to the mirror.
///
/// A range that overlaps a preceding change clamps to that change's end, so
/// even a malformed batch advances the mirror instead of stalling it.
pub(crate) fn apply_changes(buffer: &mut Rope, changes: &[ContentChange]) {
    if changes.is_empty() {
        return;
    }

    let mut builder = Builder::new(buffer.len());
    let mut previous_end = 0;
    for change in changes {
        let start = byte_of_position(buffer, change.start).max(previous_end);
        let end = byte_of_position(buffer, change.end).max(start);
        builder.replace(start..end, Rope::from(change.text.as_str()));
        previous_end = end;
    }
    *buffer = builder.build().apply(buffer);
}

/// Is the text in `range` (byte offsets) nothing but whitespace?
pub(crate) fn is_whitespace_between(buffer: &Rope, range: std::ops::Range<usize>) -> bool {
    if range.start >= range.end {
        return true;
    }
    buffer
        .slice_to_cow(range)
        .chars()
        .all(char::is_whitespace)
}
