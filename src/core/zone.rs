//! Zones - ordered containers of cards.
//!
//! A zone owns an ordered sequence of card ids (index 0 = bottom). Cards
//! move between zones only through [`Board`](super::Board) operations, which
//! keep the card's back-reference and the zone sequences consistent.

use serde::{Deserialize, Serialize};

use super::entity::{CardId, ZoneId};

/// Immutable template a zone is created from at match setup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneData {
    /// Display name, also the key for `CardData::start_zone`.
    pub name: String,
    /// Initial tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ZoneData {
    /// Create a template with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A zone in a running match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Zone {
    id: ZoneId,
    name: String,
    tags: Vec<String>,
    /// Contents in positional order, index 0 = bottom.
    pub(crate) cards: Vec<CardId>,
}

impl Zone {
    pub(crate) fn from_data(id: ZoneId, data: &ZoneData) -> Self {
        let mut tags = Vec::new();
        for tag in &data.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        Self {
            id,
            name: data.name.clone(),
            tags,
            cards: Vec::new(),
        }
    }

    /// The zone's match-unique id.
    #[must_use]
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the zone carries a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Contents in positional order (0 = bottom).
    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Number of cards in the zone.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    /// Position of a card in this zone.
    #[must_use]
    pub fn position_of(&self, card: CardId) -> Option<usize> {
        self.cards.iter().position(|c| *c == card)
    }
}
