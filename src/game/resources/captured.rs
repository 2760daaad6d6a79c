//! Captured pieces tally
//!
//! The server sends the full tally with every broadcast as `[symbol, count]`
//! pairs, so the client never increments it itself.
//!
//! # Material Advantage
//!
//! Standard piece values in pawns: pawn 1, knight/bishop 3, rook 5,
//! queen 9, king 0. Positive advantage means White is ahead.
//! Example: White took a rook and a pawn (`r`, `p`), Black took a knight
//! (`N`): White's advantage is (5+1) - 3 = +3.

use std::collections::BTreeMap;

use crate::game::error::ProtocolError;
use crate::game::types::{PieceColor, PieceNotation};

/// Count of captured pieces per symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    counts: BTreeMap<PieceNotation, u32>,
}

impl CapturedPieces {
    /// Build from wire pairs; any unknown symbol fails the whole tally
    pub fn from_pairs(pairs: &[(String, u32)]) -> Result<Self, ProtocolError> {
        let mut counts = BTreeMap::new();
        for (symbol, count) in pairs {
            let piece: PieceNotation = symbol.parse()?;
            if *count > 0 {
                let total: &mut u32 = counts.entry(piece).or_insert(0);
                *total = total
                    .checked_add(*count)
                    .ok_or_else(|| ProtocolError::MalformedPayload {
                        message: format!("captured count for {symbol:?} overflows"),
                    })?;
            }
        }
        Ok(Self { counts })
    }

    pub fn count(&self, piece: PieceNotation) -> u32 {
        self.counts.get(&piece).copied().unwrap_or(0)
    }

    /// Captured pieces of one color, for that side's panel
    pub fn by_color(&self, color: PieceColor) -> Vec<(PieceNotation, u32)> {
        self.counts
            .iter()
            .filter(|(piece, _)| piece.color() == color)
            .map(|(piece, count)| (*piece, *count))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Material difference in pawns; positive if White is ahead
    pub fn material_advantage(&self) -> i64 {
        self.counts.iter().fold(0i64, |total, (piece, count)| {
            let value = i64::from(piece.kind().value()).saturating_mul(i64::from(*count));
            // A captured black piece is White's gain
            match piece.color() {
                PieceColor::Black => total.saturating_add(value),
                PieceColor::White => total.saturating_sub(value),
            }
        })
    }
}
