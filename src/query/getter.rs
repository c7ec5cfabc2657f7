//! Polymorphic getter union and evaluation scope.

use serde::{Deserialize, Serialize};

use crate::core::{Board, MatchRng, Variables};
use crate::error::EngineError;

use super::cards::CardGetter;
use super::number::NumberGetter;
use super::operand::Operand;
use super::text::StringGetter;
use super::zones::ZoneGetter;

/// Borrowed view of match state a getter evaluates against.
///
/// The board and variables are read-only during query evaluation; the RNG is
/// the match's single sequential source, threaded mutably so random getters
/// draw from the shared stream.
pub struct QueryScope<'a> {
    pub board: &'a Board,
    pub vars: &'a Variables,
    pub rng: &'a mut MatchRng,
}

/// A lazy expression producing one [`Operand`] from live state.
///
/// The variant determines the kind of the produced value; callers that need
/// a specific kind use the typed getter directly, while generic positions
/// (condition operands, effect values) accept any variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Getter {
    /// Produces a number.
    Number(NumberGetter),
    /// Produces text, or undefined on a resolution miss.
    Text(StringGetter),
    /// Produces an ordered card selection.
    Cards(CardGetter),
    /// Produces an ordered zone selection.
    Zones(ZoneGetter),
}

impl Getter {
    /// Resolve to an operand against current state.
    pub fn get(&self, scope: &mut QueryScope) -> Result<Operand, EngineError> {
        match self {
            Getter::Number(g) => Ok(Operand::Number(g.get_number(scope)?)),
            Getter::Text(g) => Ok(g
                .get_string(scope)?
                .map_or(Operand::Undefined, Operand::Text)),
            Getter::Cards(g) => Ok(Operand::Cards(g.get_cards(scope)?)),
            Getter::Zones(g) => Ok(Operand::Zones(g.get_zones(scope)?)),
        }
    }
}

impl From<NumberGetter> for Getter {
    fn from(g: NumberGetter) -> Self {
        Getter::Number(g)
    }
}

impl From<StringGetter> for Getter {
    fn from(g: StringGetter) -> Self {
        Getter::Text(g)
    }
}

impl From<CardGetter> for Getter {
    fn from(g: CardGetter) -> Self {
        Getter::Cards(g)
    }
}

impl From<ZoneGetter> for Getter {
    fn from(g: ZoneGetter) -> Self {
        Getter::Zones(g)
    }
}

impl From<f64> for Getter {
    fn from(v: f64) -> Self {
        Getter::Number(NumberGetter::Literal(v))
    }
}

impl From<&str> for Getter {
    fn from(v: &str) -> Self {
        Getter::Text(StringGetter::literal(v))
    }
}
