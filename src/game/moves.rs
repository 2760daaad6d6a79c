//! Legal move candidates declared by the server
//!
//! Each legal move arrives as slash-separated tokens, for example
//! `"a7a8Q/Promotion/a7a8Q"`. The first token packs origin, destination and
//! an optional promotion piece; a `Promotion` token marks one of several
//! same-square moves that differ only by the resulting piece; the last token
//! is sent back verbatim to play the move. Tokens are parsed once here so no
//! caller has to slice strings.

use std::str::FromStr;

use crate::game::error::ProtocolError;
use crate::game::types::{Board, PieceKind, PieceNotation, Square};

/// Marker token for promotion variants
pub const PROMOTION_SENTINEL: &str = "Promotion";

/// One server-declared legal move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCandidate {
    pub origin: Square,
    pub destination: Square,
    pub promotion: Option<PieceNotation>,
    /// Token to send back to the server
    pub literal: String,
    pub is_promotion_variant: bool,
}

impl FromStr for MoveCandidate {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidMove {
            value: raw.to_string(),
        };

        let tokens: Vec<&str> = raw.split('/').collect();
        let head = tokens.first().copied().unwrap_or_default();
        let literal = tokens.last().copied().unwrap_or_default();
        if literal.is_empty() {
            return Err(invalid());
        }

        let chars: Vec<char> = head.chars().collect();
        if chars.len() < 4 {
            return Err(invalid());
        }
        let origin = Square::from_chars(chars[0], chars[1]).ok_or_else(invalid)?;
        let destination = Square::from_chars(chars[2], chars[3]).ok_or_else(invalid)?;
        let promotion = chars.get(4).copied().and_then(PieceNotation::from_char);

        Ok(MoveCandidate {
            origin,
            destination,
            promotion,
            literal: literal.to_string(),
            is_promotion_variant: tokens.iter().any(|t| *t == PROMOTION_SENTINEL),
        })
    }
}

/// Parse the full legal-move list, failing on the first bad entry
pub fn parse_candidates<S: AsRef<str>>(raw: &[S]) -> Result<Vec<MoveCandidate>, ProtocolError> {
    raw.iter().map(|m| m.as_ref().parse()).collect()
}

/// Candidates departing from `origin`, in server order
pub fn candidates_from(all_moves: &[MoveCandidate], origin: Square) -> Vec<MoveCandidate> {
    all_moves
        .iter()
        .filter(|m| m.origin == origin)
        .cloned()
        .collect()
}

/// A destination matched among the selected candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalTarget {
    /// Index into the selected candidates
    pub move_index: usize,
    /// Square holding the piece this move captures, if any
    ///
    /// The destination for an ordinary capture; beside it for en passant.
    pub capture_origin: Option<Square>,
}

/// First selected candidate landing on `destination`
pub fn is_legal_target(
    selected: &[MoveCandidate],
    destination: Square,
    board: &Board,
) -> Option<LegalTarget> {
    selected
        .iter()
        .position(|m| m.destination == destination)
        .map(|move_index| LegalTarget {
            move_index,
            capture_origin: captured_square(&selected[move_index], board),
        })
}

fn captured_square(candidate: &MoveCandidate, board: &Board) -> Option<Square> {
    if board.is_occupied(candidate.destination) {
        return Some(candidate.destination);
    }
    // A pawn moving diagonally onto an empty square takes en passant
    let mover = board.get(candidate.origin)?;
    if mover.kind() != PieceKind::Pawn
        || candidate.origin.file() == candidate.destination.file()
    {
        return None;
    }
    let passed = Square::new(candidate.destination.file(), candidate.origin.rank())?;
    board
        .get(passed)
        .filter(|piece| piece.kind() == PieceKind::Pawn && piece.color() != mover.color())
        .map(|_| passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::decode;

    fn sq(s: &str) -> Square {
        s.parse().expect("valid square")
    }

    fn parse(list: &[&str]) -> Vec<MoveCandidate> {
        parse_candidates(list).expect("valid candidates")
    }

    #[test]
    fn test_parse_plain_move() {
        let m: MoveCandidate = "e2e4".parse().expect("valid");
        assert_eq!(m.origin, sq("e2"));
        assert_eq!(m.destination, sq("e4"));
        assert_eq!(m.promotion, None);
        assert_eq!(m.literal, "e2e4");
        assert!(!m.is_promotion_variant);
    }

    #[test]
    fn test_parse_promotion_variant() {
        //! Literal token is the last segment, sentinel flags the variant
        let m: MoveCandidate = "a7a8N/Promotion/a7a8n".parse().expect("valid");
        assert_eq!(m.promotion.map(|p| p.to_char()), Some('N'));
        assert_eq!(m.literal, "a7a8n");
        assert!(m.is_promotion_variant);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<MoveCandidate>().is_err());
        assert!("e2".parse::<MoveCandidate>().is_err());
        assert!("z9e4".parse::<MoveCandidate>().is_err());
        assert!("e2e4/".parse::<MoveCandidate>().is_err());
        assert!(parse_candidates(&["e2e4", "oops"]).is_err());
    }

    #[test]
    fn test_candidates_from_filters_and_keeps_order() {
        let all = parse(&["g1f3", "e2e4", "g1h3", "e2e3", "b1c3"]);
        let from_g1 = candidates_from(&all, sq("g1"));
        let literals: Vec<&str> = from_g1.iter().map(|m| m.literal.as_str()).collect();

        assert_eq!(literals, vec!["g1f3", "g1h3"]);
        assert!(from_g1.iter().all(|m| m.origin == sq("g1")));
        assert!(candidates_from(&all, sq("d4")).is_empty());
    }

    #[test]
    fn test_legal_target_first_match_wins() {
        let selected = parse(&["a7a8Q/Promotion/a7a8Q", "a7a8R/Promotion/a7a8R"]);
        let board = decode("8/P7/8/8/8/8/8/8");
        let target = is_legal_target(&selected, sq("a8"), &board).expect("legal");

        assert_eq!(target.move_index, 0);
        assert_eq!(target.capture_origin, None);
        assert!(is_legal_target(&selected, sq("b8"), &board).is_none());
    }

    #[test]
    fn test_legal_target_reports_capture() {
        //! Occupied destination marks the captured piece's square
        let selected = parse(&["e4d5", "e4e5"]);
        let board = decode("8/8/8/3p4/4P3/8/8/8");

        let capture = is_legal_target(&selected, sq("d5"), &board).expect("legal");
        assert_eq!(capture.capture_origin, Some(sq("d5")));

        let push = is_legal_target(&selected, sq("e5"), &board).expect("legal");
        assert_eq!(push.move_index, 1);
        assert_eq!(push.capture_origin, None);
    }

    #[test]
    fn test_legal_target_reports_en_passant_victim() {
        //! White pawn e5 takes d6 while the black pawn sits on d5
        let selected = parse(&["e5d6", "e5e6"]);
        let board = decode("8/8/8/3pP3/8/8/8/8");

        let en_passant = is_legal_target(&selected, sq("d6"), &board).expect("legal");
        assert_eq!(en_passant.capture_origin, Some(sq("d5")));

        let push = is_legal_target(&selected, sq("e6"), &board).expect("legal");
        assert_eq!(push.capture_origin, None);
    }
}
