//! Card fields - named slots holding a numeric or text value.
//!
//! A field holds exactly one of the two payload kinds at any time; replacing
//! the value keeps the name and discards the previous payload. The closed
//! enum makes the mutual-exclusivity invariant structural rather than a
//! runtime check.

use serde::{Deserialize, Serialize};

/// The typed payload of a [`Field`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Numeric payload.
    Number(f64),
    /// Text payload.
    Text(String),
}

impl FieldValue {
    /// Get as a number if this is a numeric payload.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Get as text if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

/// A named slot on a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    value: FieldValue,
}

impl Field {
    /// Create a numeric field.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Number(value),
        }
    }

    /// Create a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    /// The field's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's current payload.
    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Whether the payload is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, FieldValue::Number(_))
    }

    /// Whether the payload is text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.value, FieldValue::Text(_))
    }

    /// Replace the payload, keeping the name.
    pub fn set(&mut self, value: FieldValue) {
        self.value = value;
    }
}
