//! Chess session logic
//!
//! Everything here is pure and synchronous: no sockets, no timers. The
//! networking layer owns transport and scheduling and drives these types.
//!
//! # Module Organization
//!
//! - `types` - squares, piece symbols, sparse board
//! - `board` - compact layout decoder and the optimistic board overlay
//! - `moves` - server-declared legal move candidates
//! - `status` - closed game and position status sets
//! - `resources` - selection, promotion buffer, clock, capture tally
//! - `session` - the per-game state machine tying it all together

pub mod board;
pub mod error;
pub mod moves;
pub mod resources;
pub mod session;
pub mod status;
pub mod types;

pub use error::{GameError, GameResult, ProtocolError, ProtocolResult};
pub use session::{GameUpdate, MoveOutcome, Session};
pub use status::{GameStatus, PositionStatus};
pub use types::{Board, PieceColor, PieceKind, PieceNotation, Square};
