//! Operand values produced by getters.
//!
//! Every getter resolves to one of these closed variants; the evaluator
//! dispatches on the kind pair, so valid and invalid combinations are
//! covered exhaustively at compile time instead of by runtime type
//! inspection.

use crate::core::{CardId, ZoneId};

/// A resolved operand for comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Numeric value. NaN is the defined "missing number" sentinel.
    Number(f64),
    /// Text value.
    Text(String),
    /// A single card.
    Card(CardId),
    /// A single zone.
    Zone(ZoneId),
    /// An ordered card selection.
    Cards(Vec<CardId>),
    /// An ordered zone selection.
    Zones(Vec<ZoneId>),
    /// An unresolved value (missing variable or field). Comparisons against
    /// it resolve to false instead of failing.
    Undefined,
}

impl Operand {
    /// The kind tag, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Number(_) => OperandKind::Number,
            Operand::Text(_) => OperandKind::Text,
            Operand::Card(_) => OperandKind::Card,
            Operand::Zone(_) => OperandKind::Zone,
            Operand::Cards(_) => OperandKind::Cards,
            Operand::Zones(_) => OperandKind::Zones,
            Operand::Undefined => OperandKind::Undefined,
        }
    }
}

/// Operand kind tag for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    Number,
    Text,
    Card,
    Zone,
    Cards,
    Zones,
    Undefined,
}

impl std::fmt::Display for OperandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperandKind::Number => "number",
            OperandKind::Text => "text",
            OperandKind::Card => "card",
            OperandKind::Zone => "zone",
            OperandKind::Cards => "card selection",
            OperandKind::Zones => "zone selection",
            OperandKind::Undefined => "undefined",
        };
        f.write_str(name)
    }
}
