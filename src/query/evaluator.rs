//! Cross-kind comparison dispatch.
//!
//! One operator contract over heterogeneous operand pairs:
//!
//! - number vs number: all ordering operators
//! - text vs text: equality only
//! - card/zone vs text: tag membership (`Equals` = carries the tag)
//! - selection vs single entity: containment
//! - selection vs selection: superset
//! - selection vs text: every member carries the tag (empty = undefined)
//!
//! Pairs outside the table fail with
//! [`EngineError::IncomparableOperands`] - an authoring mistake, surfaced
//! loudly. Undefined operands instead resolve to `false` with a warning so
//! one malformed rule degrades rather than aborting the match.

use serde::{Deserialize, Serialize};

use crate::core::Board;
use crate::error::EngineError;

use super::operand::Operand;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    LessOrEquals,
    GreaterThan,
    GreaterOrEquals,
    Contains,
    NotContains,
    HasAll,
}

impl std::str::FromStr for Operator {
    type Err = EngineError;

    /// Parse the textual forms used by data-driven rule definitions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Equals),
            "!=" => Ok(Operator::NotEquals),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessOrEquals),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterOrEquals),
            "contains" => Ok(Operator::Contains),
            "!contains" => Ok(Operator::NotContains),
            "hasall" => Ok(Operator::HasAll),
            other => Err(EngineError::UnknownOperator(other.to_string())),
        }
    }
}

/// Resolve a comparison between two operands.
///
/// The board is consulted for tag membership. Undefined operands resolve to
/// `Ok(false)`; kind pairs outside the dispatch table are an error.
pub fn resolve(board: &Board, left: &Operand, op: Operator, right: &Operand) -> Result<bool, EngineError> {
    use Operand::*;

    if matches!(left, Undefined) || matches!(right, Undefined) {
        tracing::warn!(?op, "comparison against undefined operand resolves to false");
        return Ok(false);
    }

    match (left, right) {
        (Number(a), Number(b)) => numeric(*a, op, *b, right),
        (Text(a), Text(b)) => equality(a == b, op, left, right),
        (Card(c), Text(tag)) => equality(board.card(*c).has_tag(tag), op, left, right),
        (Zone(z), Text(tag)) => equality(board.zone(*z).has_tag(tag), op, left, right),
        (Card(a), Card(b)) => equality(a == b, op, left, right),
        (Zone(a), Zone(b)) => equality(a == b, op, left, right),
        (Cards(set), Card(c)) => containment(set.contains(c), op, left, right),
        (Zones(set), Zone(z)) => containment(set.contains(z), op, left, right),
        (Cards(a), Cards(b)) => superset(b.iter().all(|c| a.contains(c)), op, left, right),
        (Zones(a), Zones(b)) => superset(b.iter().all(|z| a.contains(z)), op, left, right),
        (Cards(set), Text(tag)) => set_tag(set, |c| board.card(*c).has_tag(tag), op, left, right),
        (Zones(set), Text(tag)) => set_tag(set, |z| board.zone(*z).has_tag(tag), op, left, right),
        _ => Err(incomparable(left, op, right)),
    }
}

fn incomparable(left: &Operand, op: Operator, right: &Operand) -> EngineError {
    EngineError::IncomparableOperands {
        left: left.kind(),
        op,
        right: right.kind(),
    }
}

fn numeric(a: f64, op: Operator, b: f64, right: &Operand) -> Result<bool, EngineError> {
    match op {
        Operator::Equals => Ok(a == b),
        Operator::NotEquals => Ok(a != b),
        Operator::LessThan => Ok(a < b),
        Operator::LessOrEquals => Ok(a <= b),
        Operator::GreaterThan => Ok(a > b),
        Operator::GreaterOrEquals => Ok(a >= b),
        Operator::Contains | Operator::NotContains | Operator::HasAll => {
            Err(incomparable(&Operand::Number(a), op, right))
        }
    }
}

fn equality(equal: bool, op: Operator, left: &Operand, right: &Operand) -> Result<bool, EngineError> {
    match op {
        Operator::Equals => Ok(equal),
        Operator::NotEquals => Ok(!equal),
        _ => Err(incomparable(left, op, right)),
    }
}

fn containment(contains: bool, op: Operator, left: &Operand, right: &Operand) -> Result<bool, EngineError> {
    match op {
        Operator::Equals | Operator::Contains => Ok(contains),
        Operator::NotEquals | Operator::NotContains => Ok(!contains),
        _ => Err(incomparable(left, op, right)),
    }
}

fn superset(is_superset: bool, op: Operator, left: &Operand, right: &Operand) -> Result<bool, EngineError> {
    match op {
        Operator::Equals | Operator::Contains | Operator::HasAll => Ok(is_superset),
        Operator::NotEquals | Operator::NotContains => Ok(!is_superset),
        _ => Err(incomparable(left, op, right)),
    }
}

fn set_tag<T>(
    set: &[T],
    has_tag: impl Fn(&T) -> bool,
    op: Operator,
    left: &Operand,
    right: &Operand,
) -> Result<bool, EngineError> {
    if set.is_empty() {
        tracing::warn!("empty selection compared against a tag resolves to false");
        return Ok(false);
    }
    equality(set.iter().all(has_tag), op, left, right)
}
