//! Move representation.

use crate::{Color, Piece, PieceType, Square};
use std::fmt;

/// The side of the board a castling move goes toward.
///
/// `Short` is the side the king reaches in fewer steps on a standard setup
/// (the h-file side); `Long` is the a-file side. Wild setups with the king on
/// the d-file mirror this geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Short,
    Long,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Short, CastleSide::Long];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            CastleSide::Short => 0,
            CastleSide::Long => 1,
        }
    }

    /// Returns the SAN text of a castling move on this side.
    pub const fn san(self) -> &'static str {
        match self {
            CastleSide::Short => "O-O",
            CastleSide::Long => "O-O-O",
        }
    }
}

/// What a move does beyond relocating a piece.
///
/// Each variant carries exactly the data needed to apply it. State needed only
/// to undo a move lives in the engine's history record, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// A non-capturing move.
    Quiet,
    /// A pawn advancing two squares from its starting rank.
    DoublePush,
    /// A capture of the given piece on the destination square.
    Capture(Piece),
    /// A pawn reaching the last rank, optionally capturing.
    Promotion {
        piece: PieceType,
        capture: Option<Piece>,
    },
    /// An en passant capture. The captured pawn sits beside the origin square.
    EnPassant,
    /// A castling move. `from`/`to` are the king's squares.
    Castle(CastleSide),
    /// A piece placed from the mover's pool. `from` equals `to`.
    Drop,
}

/// A chess move.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The piece being moved or dropped, as it stands before the move.
    pub piece: Piece,
    pub kind: MoveKind,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square, piece: Piece, kind: MoveKind) -> Self {
        Move {
            from,
            to,
            piece,
            kind,
        }
    }

    #[inline]
    pub const fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Self::new(from, to, piece, MoveKind::Quiet)
    }

    #[inline]
    pub const fn capture(from: Square, to: Square, piece: Piece, captured: Piece) -> Self {
        Self::new(from, to, piece, MoveKind::Capture(captured))
    }

    /// Creates a drop of `kind` onto `to` for `color`.
    #[inline]
    pub const fn drop(kind: PieceType, color: Color, to: Square) -> Self {
        Self::new(to, to, Piece::new(kind, color), MoveKind::Drop)
    }

    /// Returns the side making the move.
    #[inline]
    pub const fn color(&self) -> Color {
        self.piece.color
    }

    /// Returns the piece removed from the board by this move, if any.
    ///
    /// Atomic explosions are not included; only the directly captured piece.
    pub const fn captured(&self) -> Option<Piece> {
        match self.kind {
            MoveKind::Capture(p) => Some(p),
            MoveKind::Promotion { capture, .. } => capture,
            MoveKind::EnPassant => Some(Piece::new(PieceType::Pawn, self.piece.color.opposite())),
            _ => None,
        }
    }

    /// Returns the square of the directly captured piece, if any.
    pub const fn capture_square(&self) -> Option<Square> {
        match self.kind {
            MoveKind::EnPassant => Some(Square::from_index_unchecked(
                self.from.rank_index() * 8 + self.to.file_index(),
            )),
            _ => {
                if self.captured().is_some() {
                    Some(self.to)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured().is_some()
    }

    #[inline]
    pub const fn promotion(&self) -> Option<PieceType> {
        match self.kind {
            MoveKind::Promotion { piece, .. } => Some(piece),
            _ => None,
        }
    }

    #[inline]
    pub const fn castle_side(&self) -> Option<CastleSide> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_drop(&self) -> bool {
        matches!(self.kind, MoveKind::Drop)
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// Returns true for captures, promotions and en passant.
    #[inline]
    pub const fn is_high_priority(&self) -> bool {
        self.is_capture() || self.promotion().is_some()
    }

    /// Returns the en passant target square a double push creates.
    pub const fn ep_target(&self) -> Option<Square> {
        match self.kind {
            MoveKind::DoublePush => Some(Square::from_index_unchecked(
                (self.from.index() + self.to.index()) / 2,
            )),
            _ => None,
        }
    }

    /// Returns the long algebraic (coordinate) notation.
    ///
    /// Ordinary moves are written `e2e4`, promotions `e7e8q`, drops `N@f3`.
    /// Castling is written with the king's origin and destination squares.
    pub fn to_lan(&self) -> String {
        match self.kind {
            MoveKind::Drop => format!(
                "{}@{}",
                self.piece.kind.to_char().to_ascii_uppercase(),
                self.to
            ),
            MoveKind::Promotion { piece, .. } => {
                format!("{}{}{}", self.from, self.to, piece.to_char())
            }
            _ => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {:?})", self.to_lan(), self.kind)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lan())
    }
}
