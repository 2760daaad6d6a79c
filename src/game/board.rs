//! Board layout codec and the provisional board overlay
//!
//! The server sends piece placement as a compact layout string: ranks 8 to 1
//! separated by `/`, digits for runs of empty squares. Anything after the
//! first space (side to move, castling rights, counters) is ignored.

use crate::game::types::{Board, PieceNotation, Square};

/// Result of decoding a layout string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedLayout {
    pub board: Board,
    /// Characters that were neither a piece, a digit nor a separator
    pub skipped: usize,
}

/// Decode a compact board layout into a sparse board
///
/// Never fails. Unrecognized symbols are skipped without advancing the file,
/// and pieces that would land off the board are dropped.
///
/// # Example
///
/// ```rust,ignore
/// let decoded = decode_layout("8/8/8/8/8/8/P7/8");
/// assert_eq!(decoded.board.len(), 1);
/// ```
pub fn decode_layout(layout: &str) -> DecodedLayout {
    let mut decoded = DecodedLayout::default();
    // Signed so that extra separators walk off the board instead of wrapping
    let mut rank: i32 = 7;
    let mut file: u32 = 0;

    for c in layout.chars() {
        match c {
            ' ' => break,
            '/' => {
                rank -= 1;
                file = 0;
            }
            '0'..='9' => {
                file = file.saturating_add(c.to_digit(10).unwrap_or(0));
            }
            _ => match PieceNotation::from_char(c) {
                Some(piece) => {
                    let square = u8::try_from(rank)
                        .ok()
                        .zip(u8::try_from(file).ok())
                        .and_then(|(r, f)| Square::new(f, r));
                    if let Some(square) = square {
                        decoded.board.set(square, piece);
                        file += 1;
                    }
                }
                None => decoded.skipped += 1,
            },
        }
    }

    decoded
}

/// Convenience wrapper returning only the board
pub fn decode(layout: &str) -> Board {
    decode_layout(layout).board
}

/// Board as last seen by the client
///
/// A move gesture produces an `Optimistic` copy; only an authoritative
/// broadcast produces `Authoritative`, which discards any speculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    Authoritative(Board),
    Optimistic(Board),
}

impl Default for BoardView {
    fn default() -> Self {
        BoardView::Authoritative(Board::default())
    }
}

impl BoardView {
    pub fn board(&self) -> &Board {
        match self {
            BoardView::Authoritative(board) | BoardView::Optimistic(board) => board,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, BoardView::Optimistic(_))
    }

    /// Speculatively move whatever stands on `from` to `to`
    ///
    /// The piece keeps its notation. An empty origin still yields an
    /// optimistic copy of the current board.
    pub fn relocate(&self, from: Square, to: Square) -> BoardView {
        let mut board = self.board().clone();
        if let Some(piece) = board.remove(from) {
            board.set(to, piece);
        }
        BoardView::Optimistic(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().expect("valid square")
    }

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_decode_single_pawn() {
        //! The sparse board only holds occupied squares
        let board = decode("8/8/8/8/8/8/P7/8");
        assert_eq!(board.len(), 1);
        assert_eq!(board.get(sq("a2")).map(|p| p.to_char()), Some('P'));
    }

    #[test]
    fn test_decode_starting_position() {
        let board = decode(START);
        assert_eq!(board.len(), 32);
        assert_eq!(board.get(sq("e1")).map(|p| p.to_char()), Some('K'));
        assert_eq!(board.get(sq("d8")).map(|p| p.to_char()), Some('q'));
        assert_eq!(board.get(sq("h7")).map(|p| p.to_char()), Some('p'));
        assert!(board.get(sq("e4")).is_none());
    }

    #[test]
    fn test_decode_ignores_trailing_metadata() {
        //! Side-to-move and castling letters after the space are not pieces
        let with_meta = decode("4k3/8/8/8/8/8/8/4K3 b KQkq - 12 40");
        let without = decode("4k3/8/8/8/8/8/8/4K3");
        assert_eq!(with_meta, without);
        assert_eq!(with_meta.len(), 2);
    }

    #[test]
    fn test_decode_is_deterministic() {
        assert_eq!(decode(START), decode(START));
    }

    #[test]
    fn test_occupied_count_matches_piece_symbols() {
        //! Occupied squares equal the piece symbols before the first space
        for layout in [
            START,
            "r3k2r/pp1n1ppp/2p1pn2/q7/1bPP4/2N2N2/PP1BQPPP/R3KB1R w KQkq - 4 10",
            "8/8/8/3k4/8/3K4/8/8",
        ] {
            let placement = layout.split(' ').next().unwrap_or("");
            let symbols = placement
                .chars()
                .filter(|c| !c.is_ascii_digit() && *c != '/')
                .count();
            assert_eq!(decode(layout).len(), symbols, "layout {layout}");
        }
    }

    #[test]
    fn test_decode_skips_unknown_symbols() {
        let decoded = decode_layout("8/8/8/8/8/8/PxP6/8");
        assert_eq!(decoded.skipped, 1);
        // 'x' does not advance the file, so the second pawn lands on b2
        assert!(decoded.board.is_occupied(sq("a2")));
        assert!(decoded.board.is_occupied(sq("b2")));
        assert!(!decoded.board.is_occupied(sq("c2")));
    }

    #[test]
    fn test_decode_drops_pieces_off_board() {
        //! Overlong ranks and extra separators never panic
        let decoded = decode_layout("9P/8/8/8/8/8/8/8/8/K7");
        assert!(decoded.board.is_empty());
        assert_eq!(decode("").len(), 0);
    }

    #[test]
    fn test_relocate_is_optimistic() {
        let view = BoardView::Authoritative(decode("8/8/8/8/8/8/P7/8"));
        let moved = view.relocate(sq("a2"), sq("a4"));

        assert!(moved.is_provisional());
        assert!(!view.is_provisional());
        assert!(moved.board().get(sq("a2")).is_none());
        assert_eq!(moved.board().get(sq("a4")).map(|p| p.to_char()), Some('P'));
    }

    #[test]
    fn test_relocate_capture_replaces_target() {
        let view = BoardView::Authoritative(decode("8/8/8/8/3p4/4P3/8/8"));
        let moved = view.relocate(sq("e3"), sq("d4"));
        assert_eq!(moved.board().len(), 1);
        assert_eq!(moved.board().get(sq("d4")).map(|p| p.to_char()), Some('P'));
    }
}
