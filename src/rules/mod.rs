//! Rule system: triggers, events, effects, and the match engine.

pub mod effect;
pub mod engine;
pub mod event;
pub mod rule;

pub use effect::Effect;
pub use engine::{MatchContext, Observer};
pub use event::{MatchEvent, TriggerKind};
pub use rule::{Rule, RuleId};
