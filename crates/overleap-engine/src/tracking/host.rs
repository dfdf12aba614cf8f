use crate::tracking::pair::PairId;
use crate::tracking::position::Position;
use crate::tracking::settings::DecorationStyle;

/// Highlighting capability injected by the host.
///
/// The engine only ever asks for a marker on the closing character of a
/// tracked pair and for its removal; how (and whether) that renders is the
/// host's business, which keeps the core testable without a display surface.
pub trait Decorator {
    /// Place a marker on the closing character at `close`.
    fn decorate(&mut self, id: PairId, close: Position, style: &DecorationStyle);

    /// Remove the marker previously placed for `id`.
    fn undecorate(&mut self, id: PairId);
}

/// Sink for the two derived boolean contexts.
///
/// The tracker pushes a value only when it changes, so implementations can
/// forward calls straight to a host-wide flag (e.g. a keybinding activation
/// condition) without de-duplicating.
pub trait ContextBroadcaster {
    /// At least one cluster is tracking a pair.
    fn set_in_leaper_mode(&mut self, active: bool);

    /// Only whitespace separates the primary cursor from the innermost close.
    fn set_has_line_of_sight(&mut self, visible: bool);
}

/// Null host: no decorations, no context broadcast.
impl Decorator for () {
    fn decorate(&mut self, _id: PairId, _close: Position, _style: &DecorationStyle) {}
    fn undecorate(&mut self, _id: PairId) {}
}

impl ContextBroadcaster for () {
    fn set_in_leaper_mode(&mut self, _active: bool) {}
    fn set_has_line_of_sight(&mut self, _visible: bool) {}
}
