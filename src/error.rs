//! Engine error type.
//!
//! Errors here are configuration mistakes (bad operators, incomparable
//! operand kinds, misconfigured effects, unknown start zones) or the
//! cascade ceiling. Resolution misses inside getters are not errors; they
//! degrade to sentinel values with a warning.

use thiserror::Error;

use crate::query::{OperandKind, Operator};

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The operand kinds on either side of a comparison have no defined
    /// semantics for the operator.
    #[error("cannot compare {left} {op:?} {right}")]
    IncomparableOperands {
        left: OperandKind,
        op: Operator,
        right: OperandKind,
    },

    /// An operator symbol that parsing does not recognize.
    #[error("unknown operator: {0:?}")]
    UnknownOperator(String),

    /// An effect whose parameters cannot work, caught at setup.
    #[error("invalid {effect} effect: {reason}")]
    InvalidEffect {
        effect: &'static str,
        reason: &'static str,
    },

    /// A card template names a start zone no zone template declares.
    #[error("unknown start zone: {0:?}")]
    UnknownStartZone(String),

    /// One trigger cascade dispatched more events than the configured
    /// ceiling, which almost always means rules feeding each other forever.
    #[error("trigger cascade exceeded {limit} events")]
    CascadeOverflow { limit: usize },
}
