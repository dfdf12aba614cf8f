use serde::{Deserialize, Serialize};

use crate::tracking::position::{Position, utf16_len};

/// One content change as reported by the host editor.
///
/// `start..end` is the overwritten range in **pre-edit** coordinates
/// (half-open, so a pure insertion has `start == end`), and `text` is the
/// replacement. Batches arrive ordered ascending and mutually non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    pub start: Position,
    pub end: Position,
    pub text: String,
}

impl ContentChange {
    pub fn new(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// A pure insertion at `at`.
    pub fn insertion(at: Position, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// A deletion of `start..end`.
    pub fn deletion(start: Position, end: Position) -> Self {
        Self::new(start, end, "")
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Number of line breaks in the replacement text.
    pub(crate) fn inserted_lines(&self) -> usize {
        self.text.matches('\n').count()
    }

    /// UTF-16 length of the replacement text after its last line break
    /// (the full text when there is none).
    pub(crate) fn last_line_len(&self) -> usize {
        utf16_len(self.text.rsplit('\n').next().unwrap_or(&self.text))
    }
}

/// Map `p` through a batch of content changes, or report it overwritten.
///
/// Changes are in pre-edit coordinates and ordered ascending, so they are
/// consumed back-to-front: applying a later change never moves an earlier
/// change's range, which keeps every range valid as the fold proceeds.
///
/// Returns `None` when `p` lies strictly inside an overwritten range — the
/// position no longer exists in the post-edit document.
pub fn map_position(p: Position, changes: &[ContentChange]) -> Option<Position> {
    changes
        .iter()
        .rev()
        .try_fold(p, |p, change| map_through(p, change))
}

/// Like [`map_position`], but an overwritten position collapses to the start
/// of the change that swallowed it instead of disappearing.
///
/// Used for cursor estimates: a real cursor inside a replaced range ends up
/// at the replacement boundary, not deleted.
pub fn map_position_lossy(p: Position, changes: &[ContentChange]) -> Position {
    changes
        .iter()
        .rev()
        .fold(p, |p, change| map_through(p, change).unwrap_or(change.start))
}

/// Map `p` through a single change.
fn map_through(p: Position, change: &ContentChange) -> Option<Position> {
    if p < change.start {
        // Entirely before the change; untouched.
        return Some(p);
    }
    if p < change.end {
        // start <= p < end: the change overwrote this position.
        return None;
    }

    // p >= end: compose the end-of-insertion position with the untouched gap
    // between the change's end and p.
    let inserted_lines = change.inserted_lines();
    let line = change.start.line + inserted_lines + (p.line - change.end.line);
    let character = if p.line > change.end.line {
        p.character
    } else if inserted_lines > 0 {
        change.last_line_len() + (p.character - change.end.character)
    } else {
        change.start.character + change.last_line_len() + (p.character - change.end.character)
    };
    Some(Position::new(line, character))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn pos(line: usize, character: usize) -> Position {
        Position::new(line, character)
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let p = pos(3, 14);
        assert_eq!(map_position(p, &[]), Some(p));
    }

    #[rstest]
    // Insertion before the position on the same line shifts it right.
    #[case(ContentChange::insertion(pos(0, 2), "ab"), pos(0, 5), Some(pos(0, 7)))]
    // Insertion after the position leaves it alone.
    #[case(ContentChange::insertion(pos(0, 8), "ab"), pos(0, 5), Some(pos(0, 5)))]
    // Insertion exactly at the position pushes it past the inserted text.
    #[case(ContentChange::insertion(pos(0, 5), "xy"), pos(0, 5), Some(pos(0, 7)))]
    // Single-line deletion before the position pulls it left.
    #[case(ContentChange::deletion(pos(0, 1), pos(0, 3)), pos(0, 6), Some(pos(0, 4)))]
    // Position strictly inside the overwritten range is gone.
    #[case(ContentChange::deletion(pos(0, 2), pos(0, 6)), pos(0, 4), None)]
    // ... including the inclusive start of the range.
    #[case(ContentChange::deletion(pos(0, 2), pos(0, 6)), pos(0, 2), None)]
    // The exclusive end survives and lands at the change start.
    #[case(ContentChange::deletion(pos(0, 2), pos(0, 6)), pos(0, 6), Some(pos(0, 2)))]
    // Multi-line insertion before the position's line shifts the line only.
    #[case(ContentChange::insertion(pos(0, 0), "x\ny\n"), pos(2, 3), Some(pos(4, 3)))]
    // Multi-line insertion on the position's own line rebases the character.
    #[case(ContentChange::insertion(pos(0, 2), "ab\ncd"), pos(0, 5), Some(pos(1, 5)))]
    // Multi-line deletion joins the position onto the change's start line.
    #[case(ContentChange::deletion(pos(0, 4), pos(2, 1)), pos(2, 5), Some(pos(0, 8)))]
    // Replacement spanning lines, position after it on the end line.
    #[case(ContentChange::new(pos(1, 0), pos(2, 2), "Z"), pos(2, 6), Some(pos(1, 5)))]
    fn test_single_change_mapping(
        #[case] change: ContentChange,
        #[case] p: Position,
        #[case] expected: Option<Position>,
    ) {
        assert_eq!(map_position(p, &[change]), expected);
    }

    #[test]
    fn test_crlf_counts_as_one_line_break() {
        let change = ContentChange::insertion(pos(0, 1), "\r\n");
        assert_eq!(map_position(pos(0, 3), &[change]), Some(pos(1, 2)));
    }

    #[test]
    fn test_surrogate_pairs_count_two_units() {
        // 😀 is two UTF-16 code units, so the position shifts by two.
        let change = ContentChange::insertion(pos(0, 0), "😀");
        assert_eq!(map_position(pos(0, 4), &[change]), Some(pos(0, 6)));
    }

    #[test]
    fn test_ascending_batch_applies_all_changes() {
        // "a(bc)d" with two independent single-character insertions before
        // the tracked position.
        let changes = vec![
            ContentChange::insertion(pos(0, 1), "x"),
            ContentChange::insertion(pos(0, 3), "y"),
        ];
        assert_eq!(map_position(pos(0, 5), &changes), Some(pos(0, 7)));
    }

    #[test]
    fn test_multiline_change_then_later_change() {
        // The later (second) change is consumed first, so the earlier
        // multi-line insertion still sees a valid coordinate frame.
        let changes = vec![
            ContentChange::insertion(pos(0, 0), "head\n"),
            ContentChange::insertion(pos(1, 2), "!"),
        ];
        assert_eq!(map_position(pos(1, 4), &changes), Some(pos(2, 5)));
    }

    #[test]
    fn test_lossy_collapses_to_change_start() {
        let change = ContentChange::new(pos(0, 2), pos(0, 8), "-");
        assert_eq!(map_position_lossy(pos(0, 5), &[change.clone()]), pos(0, 2));
        // Outside the range the lossy variant agrees with the exact one.
        assert_eq!(
            map_position_lossy(pos(0, 9), &[change.clone()]),
            map_position(pos(0, 9), &[change]).unwrap()
        );
    }

    fn arb_position() -> impl Strategy<Value = Position> {
        (0usize..6, 0usize..24).prop_map(|(l, c)| Position::new(l, c))
    }

    fn arb_change() -> impl Strategy<Value = ContentChange> {
        (
            arb_position(),
            0usize..3,
            0usize..8,
            prop::sample::select(vec!["", "x", "()", "ab\ncd", "\n", "longer text"]),
        )
            .prop_map(|(start, dl, dc, text)| {
                let end = if dl == 0 {
                    start.right(dc)
                } else {
                    Position::new(start.line + dl, dc)
                };
                ContentChange::new(start, end, text)
            })
    }

    proptest! {
        #[test]
        fn prop_empty_batch_round_trips(p in arb_position()) {
            prop_assert_eq!(map_position(p, &[]), Some(p));
        }

        #[test]
        fn prop_deleted_iff_inside_overwritten_range(
            p in arb_position(),
            change in arb_change(),
        ) {
            let inside = change.start <= p && p < change.end;
            let mapped = map_position(p, std::slice::from_ref(&change));
            prop_assert_eq!(mapped.is_none(), inside);
        }

        #[test]
        fn prop_lossy_never_deletes(p in arb_position(), change in arb_change()) {
            // The lossy variant always yields a position, and agrees with the
            // exact variant whenever the exact variant survives.
            let lossy = map_position_lossy(p, std::slice::from_ref(&change));
            if let Some(exact) = map_position(p, std::slice::from_ref(&change)) {
                prop_assert_eq!(lossy, exact);
            } else {
                prop_assert_eq!(lossy, change.start);
            }
        }
    }
}
