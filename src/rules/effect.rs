//! Effects: the closed set of state mutations rules and drivers can apply.
//!
//! Every way the match changes goes through one of these variants, so the
//! engine is the single place where follow-up events get queued. Effects
//! carry getters, not resolved entities; selections resolve against live
//! state at execution time.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::query::{CardGetter, Getter, StringGetter, ZoneGetter};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Close the current phase and open the next one, wrapping and
    /// advancing the turn at the end of the main sequence.
    EndCurrentPhase,
    /// End the match: no further rules run, only observers hear the final
    /// notification.
    EndTheMatch,
    /// Leave a subphase loop and restore the interrupted phase.
    EndSubphaseLoop,
    /// Announce a named action.
    UseAction { name: StringGetter },
    /// Suspend the phase sequence and cycle through `phases`
    /// (comma-separated) until the loop is ended.
    StartSubphaseLoop { phases: StringGetter },
    /// Shuffle each selected zone with the match RNG.
    Shuffle { zones: ZoneGetter },
    /// Announce use of the first card of a selection.
    UseCard { cards: CardGetter },
    /// Announce use of the first zone of a selection.
    UseZone { zones: ZoneGetter },
    /// Move a card selection into each selected zone in order.
    MoveCardToZone {
        cards: CardGetter,
        zones: ZoneGetter,
        #[serde(default)]
        to_bottom: bool,
        #[serde(default)]
        face_down: bool,
    },
    /// Write a field on every selected card that already has it.
    SetCardFieldValue {
        cards: CardGetter,
        field: StringGetter,
        value: Getter,
    },
    /// Overwrite a declared variable and announce the change.
    SetVariable { name: StringGetter, value: Getter },
    AddTagToCard {
        cards: CardGetter,
        tag: StringGetter,
    },
    RemoveTagFromCard {
        cards: CardGetter,
        tag: StringGetter,
    },
}

impl Effect {
    /// Effect name for logs and error reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Effect::EndCurrentPhase => "EndCurrentPhase",
            Effect::EndTheMatch => "EndTheMatch",
            Effect::EndSubphaseLoop => "EndSubphaseLoop",
            Effect::UseAction { .. } => "UseAction",
            Effect::StartSubphaseLoop { .. } => "StartSubphaseLoop",
            Effect::Shuffle { .. } => "Shuffle",
            Effect::UseCard { .. } => "UseCard",
            Effect::UseZone { .. } => "UseZone",
            Effect::MoveCardToZone { .. } => "MoveCardToZone",
            Effect::SetCardFieldValue { .. } => "SetCardFieldValue",
            Effect::SetVariable { .. } => "SetVariable",
            Effect::AddTagToCard { .. } => "AddTagToCard",
            Effect::RemoveTagFromCard { .. } => "RemoveTagFromCard",
        }
    }

    /// Setup-time shape check, so misconfigured rules fail before the
    /// match starts rather than mid-cascade.
    pub fn validate(&self) -> Result<(), EngineError> {
        match self {
            Effect::SetVariable { value, .. } | Effect::SetCardFieldValue { value, .. } => {
                match value {
                    Getter::Number(_) | Getter::Text(_) => Ok(()),
                    Getter::Cards(_) | Getter::Zones(_) => Err(EngineError::InvalidEffect {
                        effect: self.name(),
                        reason: "value must resolve to a number or text",
                    }),
                }
            }
            _ => Ok(()),
        }
    }
}
