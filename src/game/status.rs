//! Game and position status enumerations
//!
//! Both sets are closed. Parsing an unknown value is a protocol error and is
//! never mapped onto a guessed status.

use std::fmt;
use std::str::FromStr;

use crate::game::error::ProtocolError;

/// Coarse lifecycle of a game
///
/// `Initializing → {Fm, Started} → {Tie, WhiteWon, BlackWon}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Initializing,
    /// First move armed; behaves like `Started` for move permission
    Fm,
    Started,
    Tie,
    WhiteWon,
    BlackWon,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Initializing => "INITIALIZING",
            GameStatus::Fm => "FM",
            GameStatus::Started => "STARTED",
            GameStatus::Tie => "TIE",
            GameStatus::WhiteWon => "WHITEWON",
            GameStatus::BlackWon => "BLACKWON",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Tie | GameStatus::WhiteWon | GameStatus::BlackWon
        )
    }

    /// Moves are permitted in every non-terminal status
    pub fn permits_moves(self) -> bool {
        !self.is_terminal()
    }

    /// The local countdown only runs while the game is `Started`
    pub fn clock_runs(self) -> bool {
        self == GameStatus::Started
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIALIZING" => Ok(GameStatus::Initializing),
            "FM" => Ok(GameStatus::Fm),
            "STARTED" => Ok(GameStatus::Started),
            "TIE" => Ok(GameStatus::Tie),
            "WHITEWON" => Ok(GameStatus::WhiteWon),
            "BLACKWON" => Ok(GameStatus::BlackWon),
            other => Err(ProtocolError::UnknownGameStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Situation on the board, used only for messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionStatus {
    #[default]
    Playable,
    Check,
    Stalemate,
    Checkmate,
    Dead,
    Forfeit,
    Error,
}

impl PositionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Playable => "PLAYABLE",
            PositionStatus::Check => "CHECK",
            PositionStatus::Stalemate => "STALEMATE",
            PositionStatus::Checkmate => "CHECKMATE",
            PositionStatus::Dead => "DEAD",
            PositionStatus::Forfeit => "FORFEIT",
            PositionStatus::Error => "ERROR",
        }
    }

    /// User-facing line for the status panel; `None` when nothing to say
    pub fn message(self) -> Option<&'static str> {
        match self {
            PositionStatus::Playable => None,
            PositionStatus::Check => Some("Check!"),
            PositionStatus::Stalemate => Some("Stalemate"),
            PositionStatus::Checkmate => Some("Checkmate"),
            PositionStatus::Dead => Some("Dead position, neither side can win"),
            PositionStatus::Forfeit => Some("Game forfeited"),
            PositionStatus::Error => Some("The server reported an error for this position"),
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYABLE" => Ok(PositionStatus::Playable),
            "CHECK" => Ok(PositionStatus::Check),
            "STALEMATE" => Ok(PositionStatus::Stalemate),
            "CHECKMATE" => Ok(PositionStatus::Checkmate),
            "DEAD" => Ok(PositionStatus::Dead),
            "FORFEIT" => Ok(PositionStatus::Forfeit),
            "ERROR" => Ok(PositionStatus::Error),
            other => Err(ProtocolError::UnknownPositionStatus {
                value: other.to_string(),
            }),
        }
    }
}
