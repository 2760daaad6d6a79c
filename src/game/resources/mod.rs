//! Per-session game state pieces
//!
//! - [`Selection`] and [`MovePhase`] - picked-up piece and gesture phase
//! - [`PendingPromotion`] - promotion choices awaiting the player
//! - [`GameClock`] - cosmetic countdown between authoritative corrections
//! - [`CapturedPieces`] - server-supplied capture tally

pub mod captured;
pub mod promotion;
pub mod selection;
pub mod timer;

pub use captured::*;
pub use promotion::*;
pub use selection::*;
pub use timer::*;
