//! Rule definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Condition;

use super::effect::Effect;
use super::event::TriggerKind;

/// Stable identity assigned to a rule at match setup, in registration
/// order. Printed as `r3` so it can live in the variable store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub u32);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A trigger-bound reaction: when the trigger fires, the condition picks
/// which effect list runs.
///
/// A missing condition always passes. `false_effects` run when the
/// condition fails, so a single rule can express both branches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub trigger: TriggerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub true_effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub false_effects: Vec<Effect>,
    #[serde(skip)]
    pub(crate) id: RuleId,
}

impl Rule {
    pub fn new(name: impl Into<String>, trigger: TriggerKind) -> Self {
        Self {
            name: name.into(),
            trigger,
            condition: None,
            true_effects: Vec::new(),
            false_effects: Vec::new(),
            id: RuleId::default(),
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.true_effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_false_effect(mut self, effect: Effect) -> Self {
        self.false_effects.push(effect);
        self
    }

    /// The id assigned at setup; default until then.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.id
    }
}
