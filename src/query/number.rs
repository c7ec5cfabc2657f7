//! Numeric getters.
//!
//! Lazy expressions that resolve to an `f64` against current match state.
//! Resolution misses (empty selection, missing variable or field) produce
//! NaN with a warning rather than failing, so one malformed reference
//! degrades the expression instead of aborting the surrounding rule.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::cards::CardGetter;
use super::getter::QueryScope;
use super::text::StringGetter;
use super::zones::ZoneGetter;

/// A lazy numeric expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NumberGetter {
    /// A literal number.
    Literal(f64),
    /// Size of a card selection.
    CardCount(CardGetter),
    /// Size of a zone selection.
    ZoneCount(ZoneGetter),
    /// Numeric field of the first card of a selection.
    NumericField {
        selection: CardGetter,
        field: Box<StringGetter>,
    },
    /// Numeric value of a variable.
    NumericVariable(Box<StringGetter>),
    /// Position of the first card of a selection within its zone
    /// (0 = bottom).
    CardIndex(CardGetter),
    /// Random integer in `[min, max)` from the match RNG. Bounds are
    /// themselves numeric expressions.
    RandomInt {
        min: Box<NumberGetter>,
        max: Box<NumberGetter>,
    },
    /// Random float in `[min, max]` from the match RNG.
    RandomFloat {
        min: Box<NumberGetter>,
        max: Box<NumberGetter>,
    },
    /// Sum of nested expressions. NaN from any term propagates.
    Sum(Vec<NumberGetter>),
}

impl NumberGetter {
    /// Numeric value of a named variable.
    pub fn variable(name: impl Into<String>) -> Self {
        NumberGetter::NumericVariable(Box::new(StringGetter::literal(name)))
    }

    /// Numeric field of the first card of `selection`.
    pub fn field(selection: CardGetter, field: impl Into<String>) -> Self {
        NumberGetter::NumericField {
            selection,
            field: Box::new(StringGetter::literal(field)),
        }
    }

    /// Random integer in `[min, max)`.
    pub fn random_int(min: impl Into<NumberGetter>, max: impl Into<NumberGetter>) -> Self {
        NumberGetter::RandomInt {
            min: Box::new(min.into()),
            max: Box::new(max.into()),
        }
    }

    /// Random float in `[min, max]`.
    pub fn random_float(min: impl Into<NumberGetter>, max: impl Into<NumberGetter>) -> Self {
        NumberGetter::RandomFloat {
            min: Box::new(min.into()),
            max: Box::new(max.into()),
        }
    }

    /// Sum of the two expressions.
    pub fn plus(self, other: impl Into<NumberGetter>) -> Self {
        NumberGetter::Sum(vec![self, other.into()])
    }

    /// Resolve against current state.
    pub fn get_number(&self, scope: &mut QueryScope) -> Result<f64, EngineError> {
        match self {
            NumberGetter::Literal(v) => Ok(*v),
            NumberGetter::CardCount(selection) => Ok(selection.get_cards(scope)?.len() as f64),
            NumberGetter::ZoneCount(selection) => Ok(selection.get_zones(scope)?.len() as f64),
            NumberGetter::NumericField { selection, field } => {
                let Some(name) = field.get_string(scope)? else {
                    tracing::warn!("numeric field getter has no field name");
                    return Ok(f64::NAN);
                };
                match selection.get_cards(scope)?.first() {
                    Some(card) => Ok(scope.board.card(*card).numeric_field(&name)),
                    None => {
                        tracing::warn!(field = %name, "numeric field getter matched no card");
                        Ok(f64::NAN)
                    }
                }
            }
            NumberGetter::NumericVariable(name) => match name.get_string(scope)? {
                Some(name) => Ok(scope.vars.numeric(&name)),
                None => Ok(f64::NAN),
            },
            NumberGetter::CardIndex(selection) => {
                match selection.get_cards(scope)?.first() {
                    Some(card) => Ok(scope
                        .board
                        .position_in_zone(*card)
                        .map_or(f64::NAN, |p| p as f64)),
                    None => {
                        tracing::warn!("card index getter matched no card");
                        Ok(f64::NAN)
                    }
                }
            }
            NumberGetter::RandomInt { min, max } => {
                let min = min.get_number(scope)? as i64;
                let max = max.get_number(scope)? as i64;
                Ok(scope.rng.int_in(min, max) as f64)
            }
            NumberGetter::RandomFloat { min, max } => {
                let min = min.get_number(scope)?;
                let max = max.get_number(scope)?;
                Ok(scope.rng.float_in(min, max))
            }
            NumberGetter::Sum(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += term.get_number(scope)?;
                }
                Ok(total)
            }
        }
    }
}

impl From<f64> for NumberGetter {
    fn from(v: f64) -> Self {
        NumberGetter::Literal(v)
    }
}

impl From<i64> for NumberGetter {
    fn from(v: i64) -> Self {
        NumberGetter::Literal(v as f64)
    }
}
