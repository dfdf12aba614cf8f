use tracing::trace;
use xi_rope::Rope;

use crate::tracking::delta::{ContentChange, map_position, map_position_lossy};
use crate::tracking::host::Decorator;
use crate::tracking::mirror::{byte_of_position, is_whitespace_between};
use crate::tracking::pair::Pair;
use crate::tracking::position::Position;
use crate::tracking::settings::Settings;
use crate::tracking::snapshot::{ClusterSnapshot, PairSnapshot};

/// The pair stack of one cursor.
///
/// `pairs` is ordered outermost to innermost and properly nested: each pair
/// strictly contains its successor. The invariant is established at creation
/// (a new pair appears at the cursor, inside everything already tracked) and
/// preserved by updates, because every position moves through the same delta.
///
/// `rescued` holds pairs evicted by the most recent cursor-change cycle. The
/// host's delivery order between the content-change and selection-change of
/// one logical edit is not fixed (snippet expansion moves the cursor first),
/// so an evicted pair gets exactly one more content-change cycle to prove the
/// cursor is back inside it before it is gone for good.
#[derive(Debug)]
pub struct Cluster {
    cursor: Position,
    pairs: Vec<Pair>,
    rescued: Vec<Pair>,
}

impl Cluster {
    pub(crate) fn new(cursor: Position) -> Self {
        Self {
            cursor,
            pairs: Vec::new(),
            rescued: Vec::new(),
        }
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn innermost(&self) -> Option<&Pair> {
        self.pairs.last()
    }

    /// Run one content-change cycle over this cluster.
    ///
    /// `attributed` is the index of the change produced by this cluster's own
    /// cursor, when the tracker could establish the correspondence; only that
    /// change may mint a new pair. Returns true when the pair set changed.
    pub(crate) fn apply_content_changes(
        &mut self,
        changes: &[ContentChange],
        attributed: Option<usize>,
        settings: &Settings,
        decorator: &mut dyn Decorator,
    ) -> bool {
        // The rescue buffer never outlives the content-change cycle that
        // follows its creation.
        let rescued = std::mem::take(&mut self.rescued);
        let had_rescues = !rescued.is_empty();

        // A pending rescue means the host announced the cursor ahead of this
        // edit, already in post-edit coordinates; mapping it again would
        // double-apply the delta. Otherwise the record is pre-edit and the
        // mapped estimate holds until the selection event lands.
        if !had_rescues {
            self.cursor = map_position_lossy(self.cursor, changes);
        }

        let mut changed = false;
        let mut survivors = Vec::with_capacity(self.pairs.len() + rescued.len());
        for pair in self.pairs.drain(..) {
            match pair.translate(changes) {
                Some(moved) => survivors.push(moved),
                None => {
                    let mut casualty = pair;
                    casualty.undecorate(decorator);
                    changed = true;
                }
            }
        }

        // Re-offer last cycle's evictions: reinstated iff the edit put the
        // cursor back inside them, otherwise discarded for good.
        let mut reinstated = false;
        for pair in rescued {
            match pair.translate(changes) {
                Some(moved) if moved.encloses(self.cursor) => {
                    trace!(open = %moved.open(), close = %moved.close(), "pair rescued");
                    survivors.push(moved);
                    reinstated = true;
                }
                _ => {
                    let mut casualty = pair;
                    casualty.undecorate(decorator);
                }
            }
        }
        if reinstated {
            // Restore outermost-to-innermost order; nesting among survivors
            // of one properly-nested set is intact, only the order mixed.
            survivors.sort_by(|a, b| a.open().cmp(&b.open()).then(b.close().cmp(&a.close())));
        }
        changed |= reinstated || had_rescues;
        self.pairs = survivors;

        if let Some(new_pair) = attributed.and_then(|i| self.mint_pair(changes, i, settings)) {
            trace!(open = %new_pair.open(), "new pair tracked");
            self.pairs.push(new_pair);
            changed = true;
        }

        changed
    }

    /// A new pair from the cluster's own change, if it qualifies: a pure
    /// insertion whose text is exactly one configured trigger pair.
    fn mint_pair(
        &self,
        changes: &[ContentChange],
        attributed: usize,
        settings: &Settings,
    ) -> Option<Pair> {
        let change = changes.get(attributed)?;
        if !change.is_insertion() || !settings.is_trigger_text(&change.text) {
            return None;
        }
        // The insertion position seen after the whole batch: only changes
        // earlier in the document can move it, and the pair's own insertion
        // must not push it past the inserted text.
        let open = map_position(change.start, &changes[..attributed])?;
        Some(Pair::new(open))
    }

    /// Run one cursor-change cycle.
    ///
    /// Pairs no longer enclosing the cursor are parked in the rescue buffer
    /// rather than dropped; see the type-level comment. A rescue batch from a
    /// preceding cursor-change cycle has had its chance and is discarded
    /// first. Returns true when the pair set changed.
    pub(crate) fn apply_cursor_change(
        &mut self,
        cursor: Position,
        decorator: &mut dyn Decorator,
    ) -> bool {
        self.cursor = cursor;

        let mut changed = false;
        for mut stale in self.rescued.drain(..) {
            stale.undecorate(decorator);
            changed = true;
        }

        let mut kept = Vec::with_capacity(self.pairs.len());
        for pair in self.pairs.drain(..) {
            if pair.encloses(cursor) {
                kept.push(pair);
            } else {
                self.rescued.push(pair);
                changed = true;
            }
        }
        self.pairs = kept;
        changed
    }

    /// True iff only whitespace separates the cursor from the innermost
    /// pair's closing character.
    pub(crate) fn has_line_of_sight(&self, buffer: &Rope) -> bool {
        let Some(innermost) = self.innermost() else {
            return false;
        };
        if !innermost.encloses(self.cursor) {
            return false;
        }
        let from = byte_of_position(buffer, self.cursor);
        let to = byte_of_position(buffer, innermost.close());
        from <= to && is_whitespace_between(buffer, from..to)
    }

    /// Pop the innermost pair and report where the cursor belongs: one unit
    /// past its close. `None` means the precondition failed and the keypress
    /// falls through to default editor behavior.
    pub(crate) fn leap(&mut self, buffer: &Rope, decorator: &mut dyn Decorator) -> Option<Position> {
        if !self.has_line_of_sight(buffer) {
            return None;
        }
        let mut pair = self.pairs.pop()?;
        pair.undecorate(decorator);
        let target = pair.close().right(1);
        self.cursor = target;
        Some(target)
    }

    /// Undecorate and forget everything, rescue buffer included. Idempotent.
    /// Returns true when there was anything to clear.
    pub(crate) fn escape_all(&mut self, decorator: &mut dyn Decorator) -> bool {
        let had_any = !self.pairs.is_empty() || !self.rescued.is_empty();
        for mut pair in self.pairs.drain(..).chain(self.rescued.drain(..)) {
            pair.undecorate(decorator);
        }
        had_any
    }

    /// Reapply the decoration policy to this cluster's pairs.
    ///
    /// Undecorates first, then decorates the selected pairs, so repeated
    /// application cannot stack markers.
    pub(crate) fn refresh_decorations(&mut self, settings: &Settings, decorator: &mut dyn Decorator) {
        let wanted = |index: usize, count: usize| {
            if settings.decorate_all {
                true
            } else if settings.decorate_nearest_only {
                index + 1 == count
            } else {
                false
            }
        };

        let count = self.pairs.len();
        for (index, pair) in self.pairs.iter_mut().enumerate() {
            if !wanted(index, count) {
                pair.undecorate(decorator);
            }
        }
        for (index, pair) in self.pairs.iter_mut().enumerate() {
            if wanted(index, count) {
                pair.decorate(decorator, &settings.decoration_style);
            }
        }
    }

    pub(crate) fn snapshot(&self) -> ClusterSnapshot {
        ClusterSnapshot {
            cursor: self.cursor,
            pairs: self
                .pairs
                .iter()
                .map(|pair| PairSnapshot {
                    open: pair.open(),
                    close: pair.close(),
                    is_decorated: pair.is_decorated(),
                })
                .collect(),
        }
    }

    /// Nesting invariant check, used by tests.
    #[cfg(test)]
    pub(crate) fn is_properly_nested(&self) -> bool {
        self.pairs.windows(2).all(|w| {
            w[0].open() < w[1].open()
                && w[1].open() < w[1].close()
                && w[1].close() < w[0].close()
        })
    }
}
