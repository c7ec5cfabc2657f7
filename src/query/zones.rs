//! Zone selection.
//!
//! Same two-phase prepare/match protocol as card selection, over the zone
//! list in registration order.

use serde::{Deserialize, Serialize};

use crate::core::{Board, ZoneId};
use crate::error::EngineError;

use super::cards::CardGetter;
use super::evaluator::{resolve, Operator};
use super::getter::QueryScope;
use super::operand::Operand;
use super::text::StringGetter;

/// One predicate in a zone filter chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZoneFilter {
    /// Compare the zone against an id value (`"z1"`); the value is also
    /// tried as a variable name holding an id.
    Id { id: StringGetter, op: Operator },
    /// Tag membership on the zone.
    Tag { tag: StringGetter, op: Operator },
    /// The zone holding the first card of a selection.
    OfCard { selection: CardGetter, op: Operator },
}

/// An ordered, conjunctive zone selection over live match state.
///
/// Heap-allocated for the same reason as `CardGetter`: the filter and
/// getter types are mutually recursive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneGetter {
    filters: Vec<ZoneFilter>,
}

impl ZoneGetter {
    /// Selection matching every zone.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Append an arbitrary filter.
    #[must_use]
    pub fn filter(mut self, filter: ZoneFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Zone whose id equals `id` (a literal id or a variable name holding
    /// one).
    #[must_use]
    pub fn id(self, id: impl Into<StringGetter>) -> Self {
        self.filter(ZoneFilter::Id {
            id: id.into(),
            op: Operator::Equals,
        })
    }

    /// Zones carrying `tag`.
    #[must_use]
    pub fn tag(self, tag: impl Into<StringGetter>) -> Self {
        self.tag_op(tag, Operator::Equals)
    }

    /// Tag membership with an explicit operator.
    #[must_use]
    pub fn tag_op(self, tag: impl Into<StringGetter>, op: Operator) -> Self {
        self.filter(ZoneFilter::Tag { tag: tag.into(), op })
    }

    /// The zone holding the first card of `selection`.
    #[must_use]
    pub fn of_card(self, selection: CardGetter) -> Self {
        self.filter(ZoneFilter::OfCard {
            selection,
            op: Operator::Equals,
        })
    }

    /// Snapshot the zone list and apply every filter.
    pub fn get_zones(&self, scope: &mut QueryScope) -> Result<Vec<ZoneId>, EngineError> {
        let candidates = scope.board.all_zones();
        if self.filters.is_empty() || candidates.is_empty() {
            return Ok(candidates);
        }
        let mut prepared = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            prepared.push(filter.prepare(scope)?);
        }
        let board = scope.board;
        let mut out = Vec::new();
        'candidates: for zone in candidates {
            for filter in &prepared {
                if !filter.is_match(board, zone)? {
                    continue 'candidates;
                }
            }
            out.push(zone);
        }
        Ok(out)
    }
}

impl ZoneFilter {
    fn prepare(&self, scope: &mut QueryScope) -> Result<PreparedZoneFilter, EngineError> {
        Ok(match self {
            ZoneFilter::Id { id, op } => {
                let value = id.get_string(scope)?;
                let var_value = value
                    .as_deref()
                    .and_then(|v| scope.vars.get(v))
                    .map(str::to_string);
                PreparedZoneFilter::Id {
                    value,
                    var_value,
                    op: *op,
                }
            }
            ZoneFilter::Tag { tag, op } => PreparedZoneFilter::Tag {
                tag: tag.get_string(scope)?,
                op: *op,
            },
            ZoneFilter::OfCard { selection, op } => {
                let zone = match selection.get_cards(scope)?.first() {
                    Some(card) => scope.board.card(*card).zone(),
                    None => {
                        tracing::warn!("of-card zone filter reference selection matched no card");
                        None
                    }
                };
                PreparedZoneFilter::OfCard { zone, op: *op }
            }
        })
    }
}

enum PreparedZoneFilter {
    Id {
        value: Option<String>,
        var_value: Option<String>,
        op: Operator,
    },
    Tag {
        tag: Option<String>,
        op: Operator,
    },
    OfCard {
        zone: Option<ZoneId>,
        op: Operator,
    },
}

impl PreparedZoneFilter {
    fn is_match(&self, board: &Board, zone: ZoneId) -> Result<bool, EngineError> {
        match self {
            PreparedZoneFilter::Id { value, var_value, op } => {
                // Same dual check as the card id filter: literal id first,
                // then a variable holding one.
                let direct = match value.as_deref().and_then(ZoneId::parse) {
                    Some(target) => {
                        resolve(board, &Operand::Zone(zone), *op, &Operand::Zone(target))?
                    }
                    None => false,
                };
                if direct {
                    return Ok(true);
                }
                match var_value.as_deref().and_then(ZoneId::parse) {
                    Some(target) => {
                        resolve(board, &Operand::Zone(zone), *op, &Operand::Zone(target))
                    }
                    None => Ok(false),
                }
            }
            PreparedZoneFilter::Tag { tag, op } => match tag {
                Some(tag) => resolve(board, &Operand::Zone(zone), *op, &Operand::Text(tag.clone())),
                None => Ok(false),
            },
            PreparedZoneFilter::OfCard { zone: reference, op } => match reference {
                Some(reference) => {
                    resolve(board, &Operand::Zone(zone), *op, &Operand::Zone(*reference))
                }
                None => Ok(false),
            },
        }
    }
}
