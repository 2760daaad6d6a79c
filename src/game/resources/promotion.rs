//! Pending promotion buffer
//!
//! When a dropped piece matches a promotion variant, every legal move sharing
//! that origin and destination becomes a choice. The buffer stays filled
//! until the player picks one or the next broadcast clears it.

use crate::game::moves::MoveCandidate;
use crate::game::types::{PieceNotation, Square};

/// One selectable promotion outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionChoice {
    /// Piece the pawn becomes; `None` if the server sent no piece symbol
    pub piece: Option<PieceNotation>,
    /// Token to send when this choice is picked
    pub literal: String,
}

/// Disambiguation set for `matched`: all moves with the same origin+destination
///
/// Order follows the server's legal-move list.
pub fn resolve_promotion(all_moves: &[MoveCandidate], matched: &MoveCandidate) -> Vec<PromotionChoice> {
    all_moves
        .iter()
        .filter(|m| m.origin == matched.origin && m.destination == matched.destination)
        .map(|m| PromotionChoice {
            piece: m.promotion,
            literal: m.literal.clone(),
        })
        .collect()
}

/// Promotion awaiting the player's choice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingPromotion {
    /// Square the pawn was dropped on
    pub position: Option<Square>,
    choices: Vec<PromotionChoice>,
}

impl PendingPromotion {
    pub fn start(&mut self, position: Square, choices: Vec<PromotionChoice>) {
        self.position = Some(position);
        self.choices = choices;
    }

    pub fn clear(&mut self) {
        self.position = None;
        self.choices.clear();
    }

    /// Whether the promotion menu should be shown
    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }

    pub fn choices(&self) -> &[PromotionChoice] {
        &self.choices
    }

    pub fn find(&self, literal: &str) -> Option<&PromotionChoice> {
        self.choices.iter().find(|c| c.literal == literal)
    }
}
