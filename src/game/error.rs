//! Error types for game module
//!
//! Protocol errors describe authoritative data that failed validation and are
//! reported back to the server. Game errors describe gestures the session
//! refused to act on.

/// Authoritative server data that failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Payload did not match the expected shape
    #[error("Malformed broadcast: {message}")]
    MalformedPayload { message: String },

    /// Game status outside the closed set
    #[error("Incorrect game status: {value}")]
    UnknownGameStatus { value: String },

    /// Position status outside the closed set
    #[error("Incorrect position status: {value}")]
    UnknownPositionStatus { value: String },

    #[error("Invalid square: {value:?}")]
    InvalidSquare { value: String },

    #[error("Invalid piece symbol: {value:?}")]
    InvalidPiece { value: String },

    /// Legal move token that cannot be parsed into origin and destination
    #[error("Invalid move candidate: {value:?}")]
    InvalidMove { value: String },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::MalformedPayload {
            message: err.to_string(),
        }
    }
}

/// Errors that can occur while executing a move gesture
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Game has reached a terminal status
    #[error("Game is over ({status})")]
    GameOver { status: String },

    /// No piece on the picked square
    #[error("No piece at {square}")]
    EmptySquare { square: String },

    /// Picked piece does not belong to the side to move
    #[error("Not {color}'s turn")]
    NotYourTurn { color: String },

    /// Promotion token not among the offered choices
    #[error("Unknown promotion choice: {token}")]
    UnknownPromotion { token: String },

    /// A promotion choice must be made before picking another piece
    #[error("Promotion choice pending")]
    PromotionInProgress,

    /// Gesture for a game that was never subscribed
    #[error("Unknown game: {game_id}")]
    UnknownGame { game_id: String },

    /// No promotion is awaiting a choice
    #[error("No promotion pending")]
    NoPendingPromotion,
}

/// Result type alias for move gestures
pub type GameResult<T> = Result<T, GameError>;

/// Result type alias for protocol validation
pub type ProtocolResult<T> = Result<T, ProtocolError>;
