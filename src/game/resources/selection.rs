//! Selection state for the move execution protocol

use crate::game::moves::MoveCandidate;
use crate::game::types::Square;

/// Where the player is within a move gesture
///
/// `Idle → OriginSelected → {Idle | PromotionPending} → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MovePhase {
    #[default]
    Idle,
    OriginSelected,
    PromotionPending,
}

/// Currently picked-up piece and the candidates departing from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub origin: Option<Square>,
    pub candidates: Vec<MoveCandidate>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.origin = None;
        self.candidates.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.origin.is_some()
    }

    /// Destinations to highlight
    pub fn targets(&self) -> Vec<Square> {
        self.candidates.iter().map(|m| m.destination).collect()
    }
}
