//! Cards - tagged, fielded entities that occupy at most one zone.
//!
//! A [`Card`] is built from an immutable [`CardData`] template at match
//! setup. Tags, fields, visibility, and current zone mutate during play; the
//! card itself is destroyed only when the match context is dropped.
//!
//! ## Visibility
//!
//! Visibility is a bitmask over up to [`visibility::MAX_PLAYERS`] player
//! slots, with [`visibility::EVERYONE`] and [`visibility::NOBODY`] sentinel
//! masks. The engine does not interpret it beyond equality comparison in
//! filters; hosts decide what "visible" means for rendering.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entity::{CardId, ZoneId};
use super::field::{Field, FieldValue};

/// Tag applied to cards moved into a face-down zone.
pub const FACE_DOWN: &str = "FaceDown";

/// Visibility mask constants.
pub mod visibility {
    /// Maximum number of player slots a mask covers.
    pub const MAX_PLAYERS: u32 = 20;

    /// Visible to every player slot.
    pub const EVERYONE: u32 = (1 << MAX_PLAYERS) - 1;

    /// Visible to no one.
    pub const NOBODY: u32 = 0;

    /// Mask bit for a single player slot.
    #[must_use]
    pub const fn player(slot: u32) -> u32 {
        1 << (slot % MAX_PLAYERS)
    }
}

/// Immutable template a card is created from at match setup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    /// Display name.
    pub name: String,
    /// Initial tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Initial fields (unique names; later duplicates replace earlier ones).
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Name of the zone this card starts in, if any. Setup placement raises
    /// no triggers and applies no face-down tagging.
    #[serde(default)]
    pub start_zone: Option<String>,
}

impl CardData {
    /// Create a template with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a field.
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the starting zone by name.
    #[must_use]
    pub fn in_zone(mut self, zone_name: impl Into<String>) -> Self {
        self.start_zone = Some(zone_name.into());
        self
    }
}

/// A card in a running match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    name: String,
    tags: Vec<String>,
    fields: FxHashMap<String, Field>,
    /// Current zone as an arena key, maintained by `Board` moves.
    pub(crate) zone: Option<ZoneId>,
    /// Visibility bitmask over player slots.
    pub visibility: u32,
}

impl Card {
    pub(crate) fn from_data(id: CardId, data: &CardData) -> Self {
        let mut fields = FxHashMap::default();
        for field in &data.fields {
            fields.insert(field.name().to_string(), field.clone());
        }
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
            fields,
            zone: None,
            visibility: visibility::EVERYONE,
        }
    }

    /// The card's match-unique id.
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Display name, immutable after setup.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zone this card currently occupies.
    #[must_use]
    pub fn zone(&self) -> Option<ZoneId> {
        self.zone
    }

    /// Current tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether the card carries a tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag. Duplicates are ignored.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Remove a tag if present.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Whether a field with this name exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether the named field currently holds a number.
    #[must_use]
    pub fn is_field_numeric(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(Field::is_numeric)
    }

    /// Whether the named field currently holds text.
    #[must_use]
    pub fn is_field_text(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(Field::is_text)
    }

    /// Numeric value of a field. NaN when the field is absent or textual.
    #[must_use]
    pub fn numeric_field(&self, name: &str) -> f64 {
        self.fields
            .get(name)
            .and_then(|f| f.value().as_number())
            .unwrap_or(f64::NAN)
    }

    /// Text value of a field. `None` when the field is absent or numeric.
    #[must_use]
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|f| f.value().as_text())
    }

    /// Replace a field's payload, keeping its name. Absent fields warn and
    /// are left unset.
    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        match self.fields.get_mut(name) {
            Some(field) => field.set(value),
            None => tracing::warn!(card = %self.id, field = name, "set_field on absent field"),
        }
    }
}
