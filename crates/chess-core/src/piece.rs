//! Chess piece representation.

use crate::Color;
use std::fmt;

/// The six types of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Promotion targets in the order they are generated.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Returns the index of this piece type (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase letter of this piece type.
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// Returns the SAN letter, which is uppercase and empty for pawns.
    pub const fn san_letter(self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            other => Some(other.to_char().to_ascii_uppercase()),
        }
    }

    /// Parses a piece letter in either case.
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Returns true if this piece is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        };
        f.write_str(name)
    }
}

/// A colored piece.
///
/// `promoted` marks a piece that reached its type through pawn promotion.
/// In drop variants such a piece returns to the capturer's pool as a pawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub promoted: bool,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece {
            kind,
            color,
            promoted: false,
        }
    }

    /// Creates a promotion-derived piece.
    #[inline]
    pub const fn promoted(kind: PieceType, color: Color) -> Self {
        Piece {
            kind,
            color,
            promoted: true,
        }
    }

    /// Returns the piece type that goes to a drop pool when this piece is
    /// captured.
    #[inline]
    pub const fn pool_kind(self) -> PieceType {
        if self.promoted {
            PieceType::Pawn
        } else {
            self.kind
        }
    }

    /// Returns the FEN letter: uppercase for White, lowercase for Black.
    pub const fn to_fen_char(self) -> char {
        let c = self.kind.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN letter. The result is never marked as promoted.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceType::from_char(c) {
            Some(kind) => Some(Piece::new(kind, color)),
            None => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen_char())?;
        if self.promoted {
            f.write_str("~")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_to_fen() {
        assert_eq!(Piece::new(PieceType::Pawn, Color::White).to_fen_char(), 'P');
        assert_eq!(Piece::new(PieceType::Pawn, Color::Black).to_fen_char(), 'p');
        assert_eq!(Piece::new(PieceType::King, Color::White).to_fen_char(), 'K');
        assert_eq!(
            Piece::new(PieceType::Knight, Color::Black).to_fen_char(),
            'n'
        );
    }

    #[test]
    fn piece_from_fen() {
        assert_eq!(
            Piece::from_fen_char('Q'),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert_eq!(
            Piece::from_fen_char('r'),
            Some(Piece::new(PieceType::Rook, Color::Black))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
        assert_eq!(Piece::from_fen_char('~'), None);
    }

    #[test]
    fn promoted_piece_pools_as_pawn() {
        let native = Piece::new(PieceType::Queen, Color::White);
        let promoted = Piece::promoted(PieceType::Queen, Color::White);
        assert_ne!(native, promoted);
        assert_eq!(native.pool_kind(), PieceType::Queen);
        assert_eq!(promoted.pool_kind(), PieceType::Pawn);
        assert_eq!(promoted.to_string(), "Q~");
    }

    #[test]
    fn san_letters() {
        assert_eq!(PieceType::Pawn.san_letter(), None);
        assert_eq!(PieceType::Knight.san_letter(), Some('N'));
        assert_eq!(PieceType::King.san_letter(), Some('K'));
        assert_eq!(PieceType::from_char('B'), Some(PieceType::Bishop));
        assert_eq!(PieceType::from_char('b'), Some(PieceType::Bishop));
    }

    #[test]
    fn is_slider() {
        assert!(!PieceType::Pawn.is_slider());
        assert!(!PieceType::Knight.is_slider());
        assert!(PieceType::Bishop.is_slider());
        assert!(PieceType::Rook.is_slider());
        assert!(PieceType::Queen.is_slider());
        assert!(!PieceType::King.is_slider());
    }
}
