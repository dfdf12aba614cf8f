use tracing::{debug, warn};
use xi_rope::Rope;

use crate::tracking::cluster::Cluster;
use crate::tracking::delta::ContentChange;
use crate::tracking::host::{ContextBroadcaster, Decorator};
use crate::tracking::mirror;
use crate::tracking::position::Position;
use crate::tracking::settings::Settings;
use crate::tracking::snapshot::TrackerSnapshot;

/// Per-editor pair tracking.
///
/// Owns one [`Cluster`] per cursor, index-aligned with the editor's cursor
/// list, and a rope mirror of the document text. Every host event is handled
/// synchronously to completion; the tracker performs no internal suspension
/// and never re-enters a handler.
///
/// Side effects go out through the injected [`Decorator`] and
/// [`ContextBroadcaster`]; the derived contexts are recomputed from cluster
/// state after every update and pushed only on change, so the broadcast value
/// can never drift from the model.
pub struct Tracker {
    buffer: Rope,
    clusters: Vec<Cluster>,
    settings: Settings,
    decorator: Box<dyn Decorator>,
    broadcaster: Box<dyn ContextBroadcaster>,
    in_leaper_mode: bool,
    has_line_of_sight: bool,
}

impl Tracker {
    /// Create a tracker for an editor that just became visible.
    ///
    /// `text` is the current document content (the mirror's starting state)
    /// and `cursors` the editor's cursor list, primary cursor first.
    pub fn new(
        text: &str,
        cursors: &[Position],
        settings: Settings,
        decorator: Box<dyn Decorator>,
        broadcaster: Box<dyn ContextBroadcaster>,
    ) -> Self {
        Self {
            buffer: Rope::from(text),
            clusters: cursors.iter().map(|&cursor| Cluster::new(cursor)).collect(),
            settings,
            decorator,
            broadcaster,
            in_leaper_mode: false,
            has_line_of_sight: false,
        }
    }

    pub fn in_leaper_mode(&self) -> bool {
        self.in_leaper_mode
    }

    pub fn has_line_of_sight(&self) -> bool {
        self.has_line_of_sight
    }

    /// Handle one content-change batch for the whole document.
    ///
    /// When the batch has exactly one change per cursor, change `i` is
    /// attributed to cluster `i` and may mint a new pair there. Any other
    /// shape (programmatic multi-range edit, snippet with several
    /// placeholders, edit from another editor) still moves every tracked
    /// position but never creates pairs.
    pub fn handle_content_changes(&mut self, changes: &[ContentChange]) {
        if changes.is_empty() {
            return;
        }

        let mut changes = changes.to_vec();
        changes.sort_by_key(|change| change.start);
        if !batch_is_well_formed(&changes) {
            // Fail closed: wrong tracking is worse than no tracking. The
            // mirror still advances (overlaps clamped) so later line-of-sight
            // reads see the real document, not a frozen copy of it.
            warn!("overlapping content-change batch; dropping all tracked pairs");
            let decorator = self.decorator.as_mut();
            for cluster in &mut self.clusters {
                cluster.escape_all(decorator);
            }
            mirror::apply_changes(&mut self.buffer, &changes);
            self.refresh_decorations();
            self.publish_contexts();
            return;
        }

        let attribute = changes.len() == self.clusters.len();
        let decorator = self.decorator.as_mut();
        for (index, cluster) in self.clusters.iter_mut().enumerate() {
            cluster.apply_content_changes(
                &changes,
                attribute.then_some(index),
                &self.settings,
                decorator,
            );
        }

        mirror::apply_changes(&mut self.buffer, &changes);
        self.refresh_decorations();
        self.publish_contexts();
    }

    /// Handle a selection-change event: one entry per current cursor, in the
    /// editor's own order.
    pub fn handle_selection_change(&mut self, cursors: &[Position]) {
        if cursors.len() == self.clusters.len() {
            let decorator = self.decorator.as_mut();
            for (cluster, &cursor) in self.clusters.iter_mut().zip(cursors) {
                cluster.apply_cursor_change(cursor, decorator);
            }
        } else {
            self.resynchronize(cursors);
        }
        self.refresh_decorations();
        self.publish_contexts();
    }

    /// Rebuild the cluster list after the cursor count changed.
    ///
    /// A cluster survives only when exactly one old cluster's cursor sits at
    /// the new cursor's position; anything ambiguous is cleared rather than
    /// guessed, because a pair attached to the wrong cursor would leap the
    /// cursor somewhere wrong.
    fn resynchronize(&mut self, cursors: &[Position]) {
        debug!(
            old = self.clusters.len(),
            new = cursors.len(),
            "cursor count changed; resynchronizing clusters"
        );

        let mut old: Vec<Option<Cluster>> = self.clusters.drain(..).map(Some).collect();
        let mut next = Vec::with_capacity(cursors.len());
        for &cursor in cursors {
            let matches = old
                .iter()
                .enumerate()
                .filter(|(_, slot)| {
                    slot.as_ref().is_some_and(|cluster| cluster.cursor() == cursor)
                })
                .map(|(index, _)| index)
                .collect::<Vec<_>>();
            match matches.as_slice() {
                [index] => next.push(old[*index].take().expect("slot was just matched")),
                _ => next.push(Cluster::new(cursor)),
            }
        }

        let decorator = self.decorator.as_mut();
        for mut leftover in old.into_iter().flatten() {
            leftover.escape_all(decorator);
        }
        self.clusters = next;
    }

    /// Adopt a fresh configuration snapshot.
    ///
    /// Pairs recorded under a stale trigger-pair set must never be
    /// interpreted under a new one, so a changed snapshot escapes everything
    /// first. A value-equal snapshot is a no-op.
    pub fn handle_configuration_change(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }
        debug!("configuration changed; escaping all clusters");
        let decorator = self.decorator.as_mut();
        for cluster in &mut self.clusters {
            cluster.escape_all(decorator);
        }
        self.settings = settings;
        self.publish_contexts();
    }

    /// Leap the primary cursor past the innermost pair's close.
    ///
    /// Returns the position the host should move the cursor to, or `None`
    /// when the precondition (non-empty cluster with line of sight) fails and
    /// the keypress should fall through to default editor behavior.
    pub fn leap(&mut self) -> Option<Position> {
        let target = self
            .clusters
            .first_mut()?
            .leap(&self.buffer, self.decorator.as_mut())?;
        debug!(target = %target, "leap");
        self.refresh_decorations();
        self.publish_contexts();
        Some(target)
    }

    /// Explicitly leave leaper mode: clear and undecorate every cluster.
    pub fn escape_leaper_mode(&mut self) {
        let decorator = self.decorator.as_mut();
        for cluster in &mut self.clusters {
            cluster.escape_all(decorator);
        }
        self.publish_contexts();
    }

    /// Read-only dump of all clusters, for inspection and tests.
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            clusters: self.clusters.iter().map(Cluster::snapshot).collect(),
        }
    }

    /// Undecorate everything and drop all clusters. The editor is going
    /// away; the tracker is unusable afterwards except for being dropped.
    pub fn dispose(&mut self) {
        let decorator = self.decorator.as_mut();
        for cluster in &mut self.clusters {
            cluster.escape_all(decorator);
        }
        self.clusters.clear();
        self.publish_contexts();
    }

    fn refresh_decorations(&mut self) {
        let decorator = self.decorator.as_mut();
        for cluster in &mut self.clusters {
            cluster.refresh_decorations(&self.settings, decorator);
        }
    }

    /// Recompute both derived contexts and broadcast the ones that changed.
    fn publish_contexts(&mut self) {
        let in_leaper_mode = self.clusters.iter().any(|cluster| !cluster.is_empty());
        if in_leaper_mode != self.in_leaper_mode {
            self.in_leaper_mode = in_leaper_mode;
            self.broadcaster.set_in_leaper_mode(in_leaper_mode);
        }

        let has_line_of_sight = self
            .clusters
            .first()
            .is_some_and(|cluster| cluster.has_line_of_sight(&self.buffer));
        if has_line_of_sight != self.has_line_of_sight {
            self.has_line_of_sight = has_line_of_sight;
            self.broadcaster.set_has_line_of_sight(has_line_of_sight);
        }
    }
}

/// Sorted batches must not overlap; equal empty ranges at one position are
/// tolerated.
fn batch_is_well_formed(changes: &[ContentChange]) -> bool {
    changes.windows(2).all(|w| w[0].end <= w[1].start)
}
