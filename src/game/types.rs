//! Type definitions for board coordinates and pieces
//!
//! Provides newtype patterns for squares and the closed set of piece
//! symbols so that malformed server data is rejected at the edge instead of
//! being sliced apart by every caller.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::error::ProtocolError;

/// A board coordinate with canonical string form `{file}{rank}`
///
/// File index 0 is 'a', rank index 0 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Create a square from zero-based file and rank indices
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    /// Parse a square from its two characters ('a'..='h', '1'..='8')
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let sq = Square::from_chars('e', '4').unwrap();
    /// assert_eq!(sq.to_string(), "e4");
    /// ```
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return None,
        };
        let rank = match rank {
            '1'..='8' => rank as u8 - b'1',
            _ => return None,
        };
        Some(Square { file, rank })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Square::from_chars(file, rank),
            _ => None,
        }
        .ok_or_else(|| ProtocolError::InvalidSquare {
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for Square {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// Side a piece belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PieceColor {
    #[default]
    White,
    Black,
}

impl PieceColor {
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }
}

impl From<shared::Turn> for PieceColor {
    fn from(turn: shared::Turn) -> Self {
        match turn {
            shared::Turn::White => PieceColor::White,
            shared::Turn::Black => PieceColor::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in pawns; the king is never counted
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 0,
        }
    }
}

/// One of the twelve piece symbols: upper-case white, lower-case black
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct PieceNotation(char);

impl PieceNotation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' | 'N' | 'B' | 'R' | 'Q' | 'K' | 'p' | 'n' | 'b' | 'r' | 'q' | 'k' => {
                Some(PieceNotation(c))
            }
            _ => None,
        }
    }

    pub fn new(kind: PieceKind, color: PieceColor) -> Self {
        let upper = match kind {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        };
        match color {
            PieceColor::White => PieceNotation(upper),
            PieceColor::Black => PieceNotation(upper.to_ascii_lowercase()),
        }
    }

    pub fn to_char(self) -> char {
        self.0
    }

    pub fn color(self) -> PieceColor {
        if self.0.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        }
    }

    pub fn kind(self) -> PieceKind {
        match self.0.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }
}

impl fmt::Display for PieceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for PieceNotation {
    type Error = ProtocolError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        PieceNotation::from_char(value).ok_or_else(|| ProtocolError::InvalidPiece {
            value: value.to_string(),
        })
    }
}

impl FromStr for PieceNotation {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => PieceNotation::try_from(c),
            _ => Err(ProtocolError::InvalidPiece {
                value: s.to_string(),
            }),
        }
    }
}

impl From<PieceNotation> for char {
    fn from(piece: PieceNotation) -> Self {
        piece.0
    }
}

/// Sparse square → piece mapping; only occupied squares are present
///
/// A map key can hold one value, so a square never carries two pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    squares: BTreeMap<Square, PieceNotation>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, square: Square) -> Option<PieceNotation> {
        self.squares.get(&square).copied()
    }

    /// Place a piece, returning whatever previously stood on the square
    pub fn set(&mut self, square: Square, piece: PieceNotation) -> Option<PieceNotation> {
        self.squares.insert(square, piece)
    }

    pub fn remove(&mut self, square: Square) -> Option<PieceNotation> {
        self.squares.remove(&square)
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.squares.contains_key(&square)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, PieceNotation)> + '_ {
        self.squares.iter().map(|(sq, piece)| (*sq, *piece))
    }

    /// Render as an 8x8 text grid, rank 8 first, '.' for empty squares
    pub fn to_grid(&self) -> String {
        let mut out = String::with_capacity(8 * 11);
        for rank in (0..8u8).rev() {
            out.push((b'1' + rank) as char);
            out.push(' ');
            for file in 0..8u8 {
                let cell = Square::new(file, rank)
                    .and_then(|sq| self.get(sq))
                    .map(PieceNotation::to_char)
                    .unwrap_or('.');
                out.push(cell);
            }
            out.push('\n');
        }
        out.push_str("  abcdefgh");
        out
    }
}
