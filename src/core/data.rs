//! Match setup definition.
//!
//! A [`MatchData`] is the fully-resolved, immutable input the engine needs
//! before `start()`: card and zone templates, rules, user variables, phase
//! ordering. Everything here is plain serializable data, so complete
//! rulesets can live in external files.

use serde::{Deserialize, Serialize};

use super::card::CardData;
use super::zone::ZoneData;
use crate::rules::Rule;

/// Default event ceiling for one trigger cascade.
pub const DEFAULT_CASCADE_LIMIT: usize = 1000;

/// Everything needed to set up one match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchData {
    /// Host-assigned match number, surfaced via the `matchNumber` variable.
    #[serde(default)]
    pub match_number: u32,
    /// Card templates, one card per entry.
    #[serde(default)]
    pub cards: Vec<CardData>,
    /// Zone templates in registration order.
    #[serde(default)]
    pub zones: Vec<ZoneData>,
    /// Rules in registration order (the tie-break order when several rules
    /// fire for one trigger).
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// User variables as (name, initial value) pairs. Reserved names and
    /// duplicates are skipped with a warning.
    #[serde(default)]
    pub variables: Vec<(String, String)>,
    /// Main phase cycle. Defaults to `["Main"]` when empty.
    #[serde(default)]
    pub phases: Vec<String>,
    /// Event ceiling per trigger cascade; `None` uses
    /// [`DEFAULT_CASCADE_LIMIT`].
    #[serde(default)]
    pub cascade_limit: Option<usize>,
}
