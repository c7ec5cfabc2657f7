//! Text getters.
//!
//! `None` is the defined "missing text" sentinel: an undefined variable or
//! an empty card selection yields `None` (later treated as an undefined
//! operand) rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::cards::CardGetter;
use super::getter::QueryScope;

/// A lazy text expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StringGetter {
    /// A literal string.
    Literal(String),
    /// Text value of a variable whose name is itself an expression.
    Variable(Box<StringGetter>),
    /// Text field of the first card of a selection.
    TextField {
        selection: CardGetter,
        field: Box<StringGetter>,
    },
}

impl StringGetter {
    /// A literal string.
    pub fn literal(value: impl Into<String>) -> Self {
        StringGetter::Literal(value.into())
    }

    /// Text value of a named variable.
    pub fn variable(name: impl Into<String>) -> Self {
        StringGetter::Variable(Box::new(StringGetter::literal(name)))
    }

    /// Text field of the first card of `selection`.
    pub fn field(selection: CardGetter, field: impl Into<String>) -> Self {
        StringGetter::TextField {
            selection,
            field: Box::new(StringGetter::literal(field)),
        }
    }

    /// Resolve against current state. `None` marks a resolution miss.
    pub fn get_string(&self, scope: &mut QueryScope) -> Result<Option<String>, EngineError> {
        match self {
            StringGetter::Literal(v) => Ok(Some(v.clone())),
            StringGetter::Variable(name) => {
                let Some(name) = name.get_string(scope)? else {
                    return Ok(None);
                };
                let value = scope.vars.get(&name).map(str::to_string);
                if value.is_none() {
                    tracing::warn!(variable = %name, "undefined variable");
                }
                Ok(value)
            }
            StringGetter::TextField { selection, field } => {
                let Some(name) = field.get_string(scope)? else {
                    return Ok(None);
                };
                match selection.get_cards(scope)?.first() {
                    Some(card) => Ok(scope.board.card(*card).text_field(&name).map(str::to_string)),
                    None => {
                        tracing::warn!(field = %name, "text field getter matched no card");
                        Ok(None)
                    }
                }
            }
        }
    }
}

impl From<&str> for StringGetter {
    fn from(v: &str) -> Self {
        StringGetter::literal(v)
    }
}

impl From<String> for StringGetter {
    fn from(v: String) -> Self {
        StringGetter::Literal(v)
    }
}
