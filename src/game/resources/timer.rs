//! Per-side countdown clock
//!
//! Local ticking only smooths the display between broadcasts. Every
//! broadcast overwrites both values with the server's figures, and move
//! permission never looks at the clock.

use crate::game::types::PieceColor;

/// Local tick period in milliseconds
pub const TICK_MS: u64 = 1000;

/// Remaining time for both sides, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameClock {
    pub white_ms: u64,
    pub black_ms: u64,
    /// Side whose clock is running
    pub white_turn: bool,
}

impl GameClock {
    pub fn active_side(&self) -> PieceColor {
        if self.white_turn {
            PieceColor::White
        } else {
            PieceColor::Black
        }
    }

    pub fn remaining(&self, color: PieceColor) -> u64 {
        match color {
            PieceColor::White => self.white_ms,
            PieceColor::Black => self.black_ms,
        }
    }

    /// Take `elapsed_ms` off the active side, stopping at zero
    pub fn tick(&mut self, elapsed_ms: u64) {
        match self.active_side() {
            PieceColor::White => self.white_ms = self.white_ms.saturating_sub(elapsed_ms),
            PieceColor::Black => self.black_ms = self.black_ms.saturating_sub(elapsed_ms),
        }
    }

    /// Replace all values with authoritative figures
    pub fn correct(&mut self, white_ms: u64, black_ms: u64, white_turn: bool) {
        self.white_ms = white_ms;
        self.black_ms = black_ms;
        self.white_turn = white_turn;
    }
}

/// Format milliseconds as `MM:SS`
///
/// Minutes wrap at one hour, matching the board's clock display.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", (total_secs / 60) % 60, total_secs % 60)
}
