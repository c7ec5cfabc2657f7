//! Dynamic query system: getters, filters, conditions, and the comparison
//! evaluator.
//!
//! Getters are lazy expression nodes resolving numbers, text, or entity
//! selections against live match state; filters narrow selections through a
//! two-phase prepare/match protocol; conditions combine comparisons into
//! boolean chains. All comparison goes through one operator contract in
//! [`evaluator`].

pub mod cards;
pub mod condition;
pub mod evaluator;
pub mod getter;
pub mod number;
pub mod operand;
pub mod text;
pub mod zones;

pub use cards::{CardFilter, CardGetter};
pub use condition::Condition;
pub use evaluator::{resolve, Operator};
pub use getter::{Getter, QueryScope};
pub use number::NumberGetter;
pub use operand::{Operand, OperandKind};
pub use text::StringGetter;
pub use zones::{ZoneFilter, ZoneGetter};
