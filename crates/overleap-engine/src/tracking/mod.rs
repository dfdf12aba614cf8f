/*!
 * # Pair Tracking Core
 *
 * This module implements the tracking engine behind "leaping": skipping over
 * an autoclosed closing character with a single keypress instead of typing it.
 *
 * ## Architecture Overview
 *
 * ### 1. Track, Never Scan
 * - The engine only tracks pairs it observed being created by a qualifying
 *   two-character insertion (a configured **trigger pair** such as `"()"`)
 * - It never scans the document to discover brackets and never validates
 *   syntax against a grammar
 * - A rope mirror of the document text is kept for exactly one read-only
 *   purpose: the whitespace check behind **line of sight**
 *
 * ### 2. Position Transformation Instead of Reparsing
 * - Every tracked position is carried forward through each content-change
 *   batch by the position-delta algorithm in [`delta`]
 * - A position overwritten by an edit is reported as deleted, and a pair
 *   whose sides end up on different lines is dropped, never re-attached
 *
 * ### 3. Per-Cursor Clusters
 * - Each cursor owns a [`Cluster`](cluster::Cluster): a properly-nested
 *   outermost-to-innermost stack of [`Pair`](pair::Pair)s
 * - The [`Tracker`](tracker::Tracker) keeps clusters index-aligned with the
 *   editor's cursor list and resynchronizes when the cursor count changes
 *
 * ### 4. Tolerating Unstable Event Order
 * - The host does not guarantee an order between the content-change and
 *   selection-change notifications of one logical edit
 * - A pair evicted by a premature cursor move is parked in a one-cycle
 *   rescue buffer and re-offered to the next content-change cycle before
 *   being discarded for good
 *
 * ### 5. Side Effects as Injected Capabilities
 * - Decoration and context broadcasting go through the traits in [`host`],
 *   so the core is testable without a display surface
 * - `leap()` returns the target position rather than moving a cursor itself;
 *   the host applies the move and the selection event flows back in
 *
 * ## Module Structure
 *
 * - **`position`**: `(line, character)` coordinates in UTF-16 code units
 * - **`delta`**: the position-delta algorithm over content-change batches
 * - **`pair`**: one tracked open/close pair with its decoration flag
 * - **`cluster`**: the per-cursor pair stack, rescue buffer, leap and escape
 * - **`tracker`**: per-editor fan-out, decoration policy, derived contexts
 * - **`mirror`**: rope mirror upkeep and position-to-byte conversion
 * - **`settings`**: the immutable per-cycle configuration snapshot
 * - **`snapshot`**: read-only dumps for inspection and tests
 * - **`host`**: decoration and context-broadcast capabilities
 */

pub mod cluster;
pub mod delta;
pub mod host;
pub mod mirror;
pub mod pair;
pub mod position;
pub mod settings;
pub mod snapshot;
pub mod tracker;

pub use cluster::Cluster;
pub use delta::{ContentChange, map_position, map_position_lossy};
pub use host::{ContextBroadcaster, Decorator};
pub use pair::{Pair, PairId};
pub use position::Position;
pub use settings::{DecorationStyle, Settings, SettingsError, TriggerPair};
pub use snapshot::{ClusterSnapshot, PairSnapshot, TrackerSnapshot};
pub use tracker::Tracker;
