//! Match variable store.
//!
//! Variables are named string cells shared by one match. The engine
//! populates a fixed set of [`reserved`] names as event context before
//! dispatching each trigger; user-defined variables are registered at setup
//! and must not collide with reserved names.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Reserved variable names, written by the engine as event context.
pub mod reserved {
    pub const MATCH_NUMBER: &str = "matchNumber";
    pub const TURN_NUMBER: &str = "turnNumber";
    pub const PHASE: &str = "phase";
    pub const ACTION_NAME: &str = "actionName";
    pub const MESSAGE: &str = "message";
    pub const VARIABLE: &str = "variable";
    pub const NEW_VALUE: &str = "newValue";
    pub const OLD_VALUE: &str = "oldValue";
    pub const RULE: &str = "rule";
    pub const RULE_NAME: &str = "ruleName";
    pub const USED_CARD: &str = "usedCard";
    pub const USED_CARD_ZONE: &str = "usedCardZone";
    pub const MOVED_CARD: &str = "movedCard";
    pub const NEW_ZONE: &str = "newZone";
    pub const OLD_ZONE: &str = "oldZone";
    pub const USED_ZONE: &str = "usedZone";
    pub const ADDITIONAL_INFO: &str = "additionalInfo";
    pub const THIS: &str = "this";

    /// Every reserved name.
    pub const ALL: &[&str] = &[
        MATCH_NUMBER,
        TURN_NUMBER,
        PHASE,
        ACTION_NAME,
        MESSAGE,
        VARIABLE,
        NEW_VALUE,
        OLD_VALUE,
        RULE,
        RULE_NAME,
        USED_CARD,
        USED_CARD_ZONE,
        MOVED_CARD,
        NEW_ZONE,
        OLD_ZONE,
        USED_ZONE,
        ADDITIONAL_INFO,
        THIS,
    ];
}

/// String-valued variable cells for one match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variables {
    values: FxHashMap<String, String>,
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl Variables {
    /// Create a store pre-populated with empty reserved variables.
    #[must_use]
    pub fn new() -> Self {
        let mut values = FxHashMap::default();
        for name in reserved::ALL {
            values.insert((*name).to_string(), String::new());
        }
        Self { values }
    }

    /// Register a user variable at setup.
    ///
    /// Reserved names and duplicates are skipped with a warning - a
    /// non-fatal setup mistake.
    pub fn define(&mut self, name: &str, value: &str) {
        if reserved::ALL.contains(&name) {
            tracing::warn!(variable = name, "reserved match variable cannot be user-defined, skipped");
            return;
        }
        if self.values.contains_key(name) {
            tracing::warn!(variable = name, "duplicate variable name, skipped");
            return;
        }
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Whether a variable exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// String value of a variable. `None` on miss.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Numeric value of a variable. NaN on miss or parse failure.
    #[must_use]
    pub fn numeric(&self, name: &str) -> f64 {
        self.values
            .get(name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(f64::NAN)
    }

    /// Overwrite an existing variable, returning the previous value.
    /// Unknown names are left untouched and return `None`.
    pub fn set_existing(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let slot = self.values.get_mut(name)?;
        Some(std::mem::replace(slot, value.into()))
    }

    /// Write a reserved context variable unconditionally.
    pub(crate) fn set_context(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_present() {
        let vars = Variables::new();
        assert!(vars.contains(reserved::USED_CARD));
        assert_eq!(vars.get(reserved::PHASE), Some(""));
    }

    #[test]
    fn test_define_skips_reserved_and_duplicates() {
        let mut vars = Variables::new();
        vars.define("score", "0");
        vars.define("score", "99");
        vars.define(reserved::PHASE, "hijack");

        assert_eq!(vars.get("score"), Some("0"));
        assert_eq!(vars.get(reserved::PHASE), Some(""));
    }

    #[test]
    fn test_numeric_round_trip() {
        let mut vars = Variables::new();
        vars.define("score", "5");
        assert_eq!(vars.numeric("score"), 5.0);
        assert!(vars.numeric("missing").is_nan());

        vars.define("label", "north");
        assert!(vars.numeric("label").is_nan());
    }

    #[test]
    fn test_set_existing_only() {
        let mut vars = Variables::new();
        vars.define("score", "0");
        assert_eq!(vars.set_existing("score", "1"), Some("0".to_string()));
        assert_eq!(vars.set_existing("unknown", "1"), None);
        assert!(!vars.contains("unknown"));
    }
}
