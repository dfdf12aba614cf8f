use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracking::position::utf16_len;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("trigger pair `{0}` must be exactly two single-unit characters")]
    InvalidTriggerPair(String),
}

/// A configured two-character autoclose pair, e.g. `"()"`.
///
/// Validated on construction: exactly two characters, each one UTF-16 code
/// unit wide, so `close = open + 1` holds for every pair the engine creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerPair(String);

impl TriggerPair {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does `text` spell out exactly this pair?
    pub fn matches(&self, text: &str) -> bool {
        self.0 == text
    }
}

impl TryFrom<String> for TriggerPair {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        let ok = matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(open), Some(close), None) if open.len_utf16() == 1 && close.len_utf16() == 1
        );
        if !ok {
            return Err(SettingsError::InvalidTriggerPair(value));
        }
        debug_assert_eq!(utf16_len(&value), 2);
        Ok(Self(value))
    }
}

impl std::str::FromStr for TriggerPair {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<TriggerPair> for String {
    fn from(value: TriggerPair) -> Self {
        value.0
    }
}

/// Opaque decoration style, passed through to the host renderer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationStyle(pub String);

/// Immutable per-update-cycle configuration snapshot.
///
/// Shared read-only across all clusters of a tracker during one cycle;
/// compared by value when the host hands over a fresh snapshot, so a mere
/// re-fetch never disturbs tracked pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Two-character insertions that start tracking a pair, in match order.
    pub trigger_pairs: Vec<TriggerPair>,
    /// Decorate every tracked pair instead of only the innermost per cluster.
    pub decorate_all: bool,
    /// Decorate the innermost pair of each cluster (ignored under
    /// `decorate_all`; with both flags off nothing is decorated).
    pub decorate_nearest_only: bool,
    pub decoration_style: DecorationStyle,
}

impl Settings {
    /// The trigger set of a typical autoclosing editor.
    pub fn default_trigger_pairs() -> Vec<TriggerPair> {
        ["()", "[]", "{}", "<>", "''", "\"\"", "``"]
            .into_iter()
            .map(|p| p.parse().expect("built-in trigger pairs are valid"))
            .collect()
    }

    /// Does `text` match any configured trigger pair?
    pub fn is_trigger_text(&self, text: &str) -> bool {
        self.trigger_pairs.iter().any(|pair| pair.matches(text))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trigger_pairs: Self::default_trigger_pairs(),
            decorate_all: false,
            decorate_nearest_only: true,
            decoration_style: DecorationStyle::default(),
        }
    }
}
