//! Entity model and match-state primitives.
//!
//! Cards, fields, zones, the board arena that owns them, the deterministic
//! match RNG, progression state, and the immutable setup definition.

pub mod board;
pub mod card;
pub mod data;
pub mod entity;
pub mod field;
pub mod rng;
pub mod state;
pub mod vars;
pub mod zone;

pub use board::{Board, ZonePosition};
pub use card::{visibility, Card, CardData, FACE_DOWN};
pub use data::{MatchData, DEFAULT_CASCADE_LIMIT};
pub use entity::{CardId, ZoneId};
pub use field::{Field, FieldValue};
pub use rng::{MatchRng, MatchRngState};
pub use state::MatchState;
pub use vars::{reserved, Variables};
pub use zone::{Zone, ZoneData};
