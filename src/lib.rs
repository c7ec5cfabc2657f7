//! # cardscript
//!
//! A deterministic, trigger-driven rules engine for turn-based card games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded zones, phases, or card types. A game
//!    is a [`MatchData`]: card and zone templates, rules, variables, and a
//!    phase cycle, all plain serializable data.
//!
//! 2. **Deterministic**: All randomness flows through one seeded
//!    [`MatchRng`]. Same data, same seed, same host calls - same match.
//!
//! 3. **Everything Is An Event**: State changes enqueue [`MatchEvent`]s on
//!    a FIFO queue; rules bound to each trigger run in registration order
//!    and their effects cascade through the same queue, bounded by a
//!    configurable ceiling.
//!
//! ## Modules
//!
//! - `core`: Cards, zones, board arena, RNG, variables, match state
//! - `query`: Getters, filters, conditions, and the comparison evaluator
//! - `rules`: Triggers, events, effects, and the match engine
//! - `error`: Engine error type

pub mod core;
pub mod error;
pub mod query;
pub mod rules;

pub use crate::core::{
    visibility, Board, Card, CardData, CardId, Field, FieldValue, MatchData, MatchRng,
    MatchRngState, MatchState, Variables, Zone, ZoneData, ZoneId, ZonePosition, reserved,
    DEFAULT_CASCADE_LIMIT, FACE_DOWN,
};

pub use crate::error::EngineError;

pub use crate::query::{
    CardFilter, CardGetter, Condition, Getter, NumberGetter, Operand, OperandKind, Operator,
    QueryScope, StringGetter, ZoneFilter, ZoneGetter,
};

pub use crate::rules::{Effect, MatchContext, MatchEvent, Observer, Rule, RuleId, TriggerKind};
