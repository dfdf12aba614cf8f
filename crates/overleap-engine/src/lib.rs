pub mod tracking;

// Re-export key types for easier usage
pub use tracking::{
    cluster::Cluster,
    delta::{ContentChange, map_position, map_position_lossy},
    host::{ContextBroadcaster, Decorator},
    pair::{Pair, PairId},
    position::Position,
    settings::{DecorationStyle, Settings, SettingsError, TriggerPair},
    snapshot::{ClusterSnapshot, PairSnapshot, TrackerSnapshot},
    tracker::Tracker,
};
