//! Match progression state.

use serde::{Deserialize, Serialize};

/// Progression counters and flags for one match.
///
/// The card/zone collections live on [`Board`](super::Board) and the
/// variable store on the engine; this struct tracks where the match is in
/// its phase/turn structure and whether it has ended.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchState {
    /// Current phase name.
    pub phase: String,
    /// Phase that was active when a subphase loop started, restored by
    /// EndSubphaseLoop.
    pub original_phase: String,
    /// Active subphase cycle; empty when no loop is running.
    pub subphases: Vec<String>,
    /// Turn counter, starts at 0 and increments when the main phase list
    /// wraps.
    pub turn: u32,
    /// Terminal flag. Once set, every mutation entry point is a no-op.
    pub is_ended: bool,
}

impl MatchState {
    /// Whether a subphase loop is currently running.
    #[must_use]
    pub fn in_subphase_loop(&self) -> bool {
        !self.subphases.is_empty()
    }
}
