//! Triggers and match events.
//!
//! A [`TriggerKind`] is the named moment rules are registered against; a
//! [`MatchEvent`] is one occurrence of that moment carrying its full
//! payload. Events travel through the engine's FIFO queue, and the payload
//! is what lets the engine install the correct reserved variables at
//! dispatch time rather than enqueue time.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, ZoneId};

use super::rule::RuleId;

/// Moments in match execution that rules can bind to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    OnMatchStarted,
    OnMatchEnded,
    OnTurnStarted,
    OnTurnEnded,
    OnPhaseStarted,
    OnPhaseEnded,
    OnCardUsed,
    OnZoneUsed,
    OnCardEnteredZone,
    OnCardLeftZone,
    OnActionUsed,
    OnVariableChanged,
    OnRuleActivated,
}

/// One occurrence of a trigger, with its event context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    MatchStarted {
        match_number: u32,
    },
    MatchEnded {
        match_number: u32,
    },
    TurnStarted {
        turn: u32,
    },
    TurnEnded {
        turn: u32,
    },
    PhaseStarted {
        phase: String,
    },
    PhaseEnded {
        phase: String,
    },
    CardUsed {
        card: CardId,
        zone: Option<ZoneId>,
    },
    ZoneUsed {
        zone: ZoneId,
    },
    CardEnteredZone {
        card: CardId,
        new_zone: ZoneId,
        old_zone: Option<ZoneId>,
    },
    CardLeftZone {
        card: CardId,
        old_zone: ZoneId,
    },
    ActionUsed {
        name: String,
    },
    VariableChanged {
        name: String,
        old_value: String,
        new_value: String,
    },
    RuleActivated {
        rule: RuleId,
        name: String,
    },
}

impl MatchEvent {
    /// The trigger kind this event activates.
    #[must_use]
    pub fn kind(&self) -> TriggerKind {
        match self {
            MatchEvent::MatchStarted { .. } => TriggerKind::OnMatchStarted,
            MatchEvent::MatchEnded { .. } => TriggerKind::OnMatchEnded,
            MatchEvent::TurnStarted { .. } => TriggerKind::OnTurnStarted,
            MatchEvent::TurnEnded { .. } => TriggerKind::OnTurnEnded,
            MatchEvent::PhaseStarted { .. } => TriggerKind::OnPhaseStarted,
            MatchEvent::PhaseEnded { .. } => TriggerKind::OnPhaseEnded,
            MatchEvent::CardUsed { .. } => TriggerKind::OnCardUsed,
            MatchEvent::ZoneUsed { .. } => TriggerKind::OnZoneUsed,
            MatchEvent::CardEnteredZone { .. } => TriggerKind::OnCardEnteredZone,
            MatchEvent::CardLeftZone { .. } => TriggerKind::OnCardLeftZone,
            MatchEvent::ActionUsed { .. } => TriggerKind::OnActionUsed,
            MatchEvent::VariableChanged { .. } => TriggerKind::OnVariableChanged,
            MatchEvent::RuleActivated { .. } => TriggerKind::OnRuleActivated,
        }
    }
}
