//! Wire types shared between the chess session client and game servers.

pub mod protocol;

pub use protocol::{BroadcastPayload, ClientMessage, InboundFrame, MoveAck, Turn};
