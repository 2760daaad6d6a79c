//! Online chess session client
//!
//! Keeps local game state consistent with an authoritative game server:
//! decodes board snapshots, tracks legal-move candidates, resolves
//! promotions, drives per-side clocks and multiplexes many games over one
//! WebSocket.

pub mod core;
pub mod game;
pub mod networking;

pub use crate::core::ClientConfig;
pub use crate::game::{MoveOutcome, Session};
pub use crate::networking::{GameClient, SessionRegistry, SharedSession};
