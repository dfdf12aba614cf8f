use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::tracking::delta::{ContentChange, map_position};
use crate::tracking::host::Decorator;
use crate::tracking::position::Position;
use crate::tracking::settings::DecorationStyle;

/// Stable identity for one tracked pair, handed to the decoration
/// collaborator so it can associate and later remove its marker.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct PairId(pub u64);

impl PairId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        PairId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One tracked open/close position pair.
///
/// Invariant: `open < close`, and both sides sit on the same line — a pair is
/// created as `close = open + 1` code unit and any edit that lands a line
/// break between the sides invalidates it rather than stretching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    id: PairId,
    open: Position,
    close: Position,
    is_decorated: bool,
}

impl Pair {
    /// A freshly observed pair: the two-character trigger insertion at `open`.
    pub(crate) fn new(open: Position) -> Self {
        Self {
            id: PairId::next(),
            open,
            close: open.right(1),
            is_decorated: false,
        }
    }

    pub fn id(&self) -> PairId {
        self.id
    }

    pub fn open(&self) -> Position {
        self.open
    }

    pub fn close(&self) -> Position {
        self.close
    }

    pub fn is_decorated(&self) -> bool {
        self.is_decorated
    }

    /// True iff `pos` sits between the sides, both endpoints inclusive.
    ///
    /// The close side must count as enclosed: a cursor parked immediately
    /// before the closing character is exactly the position a leap fires from.
    pub fn encloses(&self, pos: Position) -> bool {
        self.open <= pos && pos <= self.close
    }

    /// Carry both sides through a content-change batch.
    ///
    /// `None` when either side was overwritten or the sides ended up on
    /// different lines (a multi-line insertion landed between them).
    pub(crate) fn translate(&self, changes: &[ContentChange]) -> Option<Pair> {
        let open = map_position(self.open, changes)?;
        let close = map_position(self.close, changes)?;
        if open.line != close.line || open >= close {
            return None;
        }
        Some(Pair {
            id: self.id,
            open,
            close,
            is_decorated: self.is_decorated,
        })
    }

    /// Idempotent: only calls the renderer on a transition.
    pub(crate) fn decorate(&mut self, decorator: &mut dyn Decorator, style: &DecorationStyle) {
        if !self.is_decorated {
            decorator.decorate(self.id, self.close, style);
            self.is_decorated = true;
        }
    }

    /// Idempotent counterpart of [`Pair::decorate`].
    pub(crate) fn undecorate(&mut self, decorator: &mut dyn Decorator) {
        if self.is_decorated {
            decorator.undecorate(self.id);
            self.is_decorated = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::delta::ContentChange;

    fn pos(line: usize, character: usize) -> Position {
        Position::new(line, character)
    }

    #[test]
    fn test_new_pair_is_one_unit_wide() {
        let pair = Pair::new(pos(2, 7));
        assert_eq!(pair.open(), pos(2, 7));
        assert_eq!(pair.close(), pos(2, 8));
        assert!(!pair.is_decorated());
    }

    #[test]
    fn test_pair_ids_are_unique() {
        let a = Pair::new(pos(0, 0));
        let b = Pair::new(pos(0, 0));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_encloses_is_inclusive_on_both_ends() {
        let pair = Pair::new(pos(0, 3)); // open (0,3), close (0,4)
        assert!(pair.encloses(pos(0, 3)));
        assert!(pair.encloses(pos(0, 4)));
        assert!(!pair.encloses(pos(0, 2)));
        assert!(!pair.encloses(pos(0, 5)));
        assert!(!pair.encloses(pos(1, 3)));
    }

    #[test]
    fn test_translate_shifts_both_sides() {
        let pair = Pair::new(pos(0, 5));
        let changes = [ContentChange::insertion(pos(0, 0), "ab")];
        let moved = pair.translate(&changes).expect("pair should survive");
        assert_eq!(moved.open(), pos(0, 7));
        assert_eq!(moved.close(), pos(0, 8));
        assert_eq!(moved.id(), pair.id(), "identity survives translation");
    }

    #[test]
    fn test_translate_drops_pair_when_open_overwritten() {
        // Backspacing the open character deletes the pair.
        let pair = Pair::new(pos(0, 5));
        let changes = [ContentChange::deletion(pos(0, 5), pos(0, 6))];
        assert_eq!(pair.translate(&changes), None);
    }

    #[test]
    fn test_translate_drops_pair_on_line_split() {
        // A line break strictly between the sides separates them across
        // lines; the pair must go, never re-attach.
        let pair = Pair::new(pos(0, 5));
        let changes = [ContentChange::insertion(pos(0, 6), "\n")];
        assert_eq!(pair.translate(&changes), None);
    }

    #[test]
    fn test_translate_survives_multiline_insert_before_pair() {
        // Both sides move to the new line together; the pair stays intact.
        let pair = Pair::new(pos(0, 5));
        let changes = [ContentChange::insertion(pos(0, 0), "x\n")];
        let moved = pair.translate(&changes).expect("pair should survive");
        assert_eq!(moved.open(), pos(1, 5));
        assert_eq!(moved.close(), pos(1, 6));
    }
}
