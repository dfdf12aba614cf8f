//! Read-only dumps of tracker state for inspection tooling and tests.

use serde::{Deserialize, Serialize};

use crate::tracking::position::Position;

/// One tracked pair as it appears to the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSnapshot {
    pub open: Position,
    pub close: Position,
    pub is_decorated: bool,
}

/// One cluster: its owning cursor and its pairs, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub cursor: Position,
    pub pairs: Vec<PairSnapshot>,
}

/// The full per-editor tracking state, one entry per cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub clusters: Vec<ClusterSnapshot>,
}
