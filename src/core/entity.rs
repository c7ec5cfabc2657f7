//! Entity identifiers.
//!
//! Cards and zones live in per-match arenas on [`Board`](super::Board); ids
//! are stable arena indices assigned at setup and never reused within a
//! match. The `Display` form (`"c3"`, `"z1"`) is the process-unique string
//! id that flows through the variable store, so rule data can reference
//! entities by text.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Get the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Parse the string id form (`"c3"`) back into an id.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.strip_prefix('c')?.parse().ok().map(Self)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Unique identifier for a zone within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// Get the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Parse the string id form (`"z1"`) back into an id.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.strip_prefix('z')?.parse().ok().map(Self)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "z{}", self.0)
    }
}
