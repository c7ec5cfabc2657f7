//! Card selection.
//!
//! A [`CardGetter`] is an ordered chain of per-card predicates applied
//! conjunctively to the canonical card enumeration. Evaluation is two-phase:
//!
//! 1. **Prepare** - every filter resolves its nested getters exactly once
//!    per `get_cards` call. Nested selections may be expensive or draw from
//!    the match RNG, so they must not re-run per candidate.
//! 2. **Match** - the candidate list is reduced to cards for which every
//!    prepared filter holds.
//!
//! Filters compose with AND only; disjunction is expressed at the condition
//! level. Insertion order is preserved so any RNG draws inside nested
//! getters replay deterministically.

use serde::{Deserialize, Serialize};

use crate::core::{Board, CardId};
use crate::error::EngineError;

use super::evaluator::{resolve, Operator};
use super::getter::{Getter, QueryScope};
use super::number::NumberGetter;
use super::operand::Operand;
use super::text::StringGetter;
use super::zones::ZoneGetter;

/// One predicate in a card filter chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CardFilter {
    /// Compare the card against an id value (`"c3"`); the value is also
    /// tried as a variable name holding an id.
    Id { id: StringGetter, op: Operator },
    /// Tag membership on the card.
    Tag { tag: StringGetter, op: Operator },
    /// Tag membership on the card's current zone.
    ZoneTag { tag: StringGetter, op: Operator },
    /// The card's current zone is in a zone selection.
    InZone { selection: ZoneGetter, op: Operator },
    /// The card shares a zone with the first card of another selection.
    SameZoneAs { selection: Box<CardGetter>, op: Operator },
    /// Compare a field value against a getter of the matching kind.
    FieldValue {
        field: String,
        value: Box<Getter>,
        op: Operator,
    },
    /// The card is among the top `count` of its zone.
    TopOfZone { count: u32 },
    /// The card is among the bottom `count` of its zone.
    BottomOfZone { count: u32 },
    /// Compare the card's position within its zone (0 = bottom).
    ZoneIndex { index: NumberGetter, op: Operator },
    /// Compare the card's visibility mask numerically.
    Visibility { mask: u32, op: Operator },
}

/// An ordered, conjunctive card selection over live match state.
///
/// The chain is heap-allocated: filters embed nested selections (and
/// selections embed filters back), so the indirection is what keeps the
/// type finite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardGetter {
    filters: Vec<CardFilter>,
}

impl CardGetter {
    /// Selection matching every card.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Append an arbitrary filter.
    #[must_use]
    pub fn filter(mut self, filter: CardFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Card whose id equals `id` (a literal id or a variable name holding
    /// one).
    #[must_use]
    pub fn id(self, id: impl Into<StringGetter>) -> Self {
        self.filter(CardFilter::Id {
            id: id.into(),
            op: Operator::Equals,
        })
    }

    /// Cards carrying `tag`.
    #[must_use]
    pub fn tag(self, tag: impl Into<StringGetter>) -> Self {
        self.tag_op(tag, Operator::Equals)
    }

    /// Tag membership with an explicit operator.
    #[must_use]
    pub fn tag_op(self, tag: impl Into<StringGetter>, op: Operator) -> Self {
        self.filter(CardFilter::Tag { tag: tag.into(), op })
    }

    /// Cards whose current zone carries `tag`.
    #[must_use]
    pub fn zone_tag(self, tag: impl Into<StringGetter>) -> Self {
        self.filter(CardFilter::ZoneTag {
            tag: tag.into(),
            op: Operator::Equals,
        })
    }

    /// Cards inside a zone selection.
    #[must_use]
    pub fn in_zone(self, selection: ZoneGetter) -> Self {
        self.filter(CardFilter::InZone {
            selection,
            op: Operator::Equals,
        })
    }

    /// Cards sharing a zone with the first card of `selection`.
    #[must_use]
    pub fn same_zone_as(self, selection: CardGetter) -> Self {
        self.filter(CardFilter::SameZoneAs {
            selection: Box::new(selection),
            op: Operator::Equals,
        })
    }

    /// Cards whose field compares against a value.
    #[must_use]
    pub fn field(self, field: impl Into<String>, value: impl Into<Getter>, op: Operator) -> Self {
        self.filter(CardFilter::FieldValue {
            field: field.into(),
            value: Box::new(value.into()),
            op,
        })
    }

    /// The top `count` cards of their zone.
    #[must_use]
    pub fn top(self, count: u32) -> Self {
        self.filter(CardFilter::TopOfZone { count })
    }

    /// The bottom `count` cards of their zone.
    #[must_use]
    pub fn bottom(self, count: u32) -> Self {
        self.filter(CardFilter::BottomOfZone { count })
    }

    /// Cards at a position within their zone.
    #[must_use]
    pub fn index(self, index: impl Into<NumberGetter>, op: Operator) -> Self {
        self.filter(CardFilter::ZoneIndex {
            index: index.into(),
            op,
        })
    }

    /// Cards whose visibility mask compares against `mask`.
    #[must_use]
    pub fn visibility(self, mask: u32, op: Operator) -> Self {
        self.filter(CardFilter::Visibility { mask, op })
    }

    /// Snapshot the canonical card list and apply every filter.
    pub fn get_cards(&self, scope: &mut QueryScope) -> Result<Vec<CardId>, EngineError> {
        let candidates = scope.board.canonical_cards();
        if self.filters.is_empty() || candidates.is_empty() {
            return Ok(candidates);
        }
        let mut prepared = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            prepared.push(filter.prepare(scope)?);
        }
        let board = scope.board;
        let mut out = Vec::new();
        'candidates: for card in candidates {
            for filter in &prepared {
                if !filter.is_match(board, card)? {
                    continue 'candidates;
                }
            }
            out.push(card);
        }
        Ok(out)
    }
}

impl CardFilter {
    /// Resolve nested getters once for this `get_cards` call.
    fn prepare(&self, scope: &mut QueryScope) -> Result<PreparedCardFilter, EngineError> {
        Ok(match self {
            CardFilter::Id { id, op } => {
                let value = id.get_string(scope)?;
                let var_value = value
                    .as_deref()
                    .and_then(|v| scope.vars.get(v))
                    .map(str::to_string);
                PreparedCardFilter::Id {
                    value,
                    var_value,
                    op: *op,
                }
            }
            CardFilter::Tag { tag, op } => PreparedCardFilter::Tag {
                tag: tag.get_string(scope)?,
                op: *op,
            },
            CardFilter::ZoneTag { tag, op } => PreparedCardFilter::ZoneTag {
                tag: tag.get_string(scope)?,
                op: *op,
            },
            CardFilter::InZone { selection, op } => PreparedCardFilter::InZone {
                zones: Operand::Zones(selection.get_zones(scope)?),
                op: *op,
            },
            CardFilter::SameZoneAs { selection, op } => {
                let zone = match selection.get_cards(scope)?.first() {
                    Some(card) => scope.board.card(*card).zone(),
                    None => {
                        tracing::warn!("same-zone filter reference selection matched no card");
                        None
                    }
                };
                PreparedCardFilter::SameZone { zone, op: *op }
            }
            CardFilter::FieldValue { field, value, op } => PreparedCardFilter::FieldValue {
                field: field.clone(),
                value: value.get(scope)?,
                op: *op,
            },
            CardFilter::TopOfZone { count } => PreparedCardFilter::Top {
                count: *count as usize,
            },
            CardFilter::BottomOfZone { count } => PreparedCardFilter::Bottom {
                count: *count as usize,
            },
            CardFilter::ZoneIndex { index, op } => PreparedCardFilter::ZoneIndex {
                index: index.get_number(scope)?,
                op: *op,
            },
            CardFilter::Visibility { mask, op } => PreparedCardFilter::Visibility {
                mask: f64::from(*mask),
                op: *op,
            },
        })
    }
}

/// A card filter with its nested getters resolved.
enum PreparedCardFilter {
    Id {
        value: Option<String>,
        var_value: Option<String>,
        op: Operator,
    },
    Tag {
        tag: Option<String>,
        op: Operator,
    },
    ZoneTag {
        tag: Option<String>,
        op: Operator,
    },
    InZone {
        zones: Operand,
        op: Operator,
    },
    SameZone {
        zone: Option<crate::core::ZoneId>,
        op: Operator,
    },
    FieldValue {
        field: String,
        value: Operand,
        op: Operator,
    },
    Top {
        count: usize,
    },
    Bottom {
        count: usize,
    },
    ZoneIndex {
        index: f64,
        op: Operator,
    },
    Visibility {
        mask: f64,
        op: Operator,
    },
}

impl PreparedCardFilter {
    fn is_match(&self, board: &Board, card: CardId) -> Result<bool, EngineError> {
        match self {
            PreparedCardFilter::Id { value, var_value, op } => {
                // The value is tried as an id first, then as a variable
                // holding one; text that parses as no id matches nothing.
                let direct = match value.as_deref().and_then(CardId::parse) {
                    Some(target) => {
                        resolve(board, &Operand::Card(card), *op, &Operand::Card(target))?
                    }
                    None => false,
                };
                if direct {
                    return Ok(true);
                }
                match var_value.as_deref().and_then(CardId::parse) {
                    Some(target) => {
                        resolve(board, &Operand::Card(card), *op, &Operand::Card(target))
                    }
                    None => Ok(false),
                }
            }
            PreparedCardFilter::Tag { tag, op } => match tag {
                Some(tag) => resolve(board, &Operand::Card(card), *op, &Operand::Text(tag.clone())),
                None => Ok(false),
            },
            PreparedCardFilter::ZoneTag { tag, op } => {
                let (Some(zone), Some(tag)) = (board.card(card).zone(), tag) else {
                    return Ok(false);
                };
                resolve(board, &Operand::Zone(zone), *op, &Operand::Text(tag.clone()))
            }
            PreparedCardFilter::InZone { zones, op } => match board.card(card).zone() {
                Some(zone) => resolve(board, zones, *op, &Operand::Zone(zone)),
                None => Ok(false),
            },
            PreparedCardFilter::SameZone { zone, op } => {
                let (Some(card_zone), Some(reference)) = (board.card(card).zone(), zone) else {
                    return Ok(false);
                };
                resolve(board, &Operand::Zone(card_zone), *op, &Operand::Zone(*reference))
            }
            PreparedCardFilter::FieldValue { field, value, op } => {
                let card = board.card(card);
                if !card.has_field(field) {
                    return Ok(false);
                }
                let left = if card.is_field_numeric(field) {
                    Operand::Number(card.numeric_field(field))
                } else {
                    match card.text_field(field) {
                        Some(text) => Operand::Text(text.to_string()),
                        None => Operand::Undefined,
                    }
                };
                resolve(board, &left, *op, value)
            }
            PreparedCardFilter::Top { count } => Ok(zone_extent(board, card)
                .is_some_and(|(pos, len)| pos + count >= len)),
            PreparedCardFilter::Bottom { count } => {
                Ok(zone_extent(board, card).is_some_and(|(pos, _)| pos < *count))
            }
            PreparedCardFilter::ZoneIndex { index, op } => {
                let pos = board
                    .position_in_zone(card)
                    .map_or(f64::NAN, |p| p as f64);
                resolve(board, &Operand::Number(pos), *op, &Operand::Number(*index))
            }
            PreparedCardFilter::Visibility { mask, op } => resolve(
                board,
                &Operand::Number(f64::from(board.card(card).visibility)),
                *op,
                &Operand::Number(*mask),
            ),
        }
    }
}

fn zone_extent(board: &Board, card: CardId) -> Option<(usize, usize)> {
    let zone = board.card(card).zone()?;
    let pos = board.zone(zone).position_of(card)?;
    Some((pos, board.zone(zone).count()))
}
