//! Classic chess and the two variants that only move the back rank around.

use super::{back_rank_layout, VariantRules};
use crate::castling::CastleGeometry;
use crate::Variant;
use chess_core::{Color, Piece};

/// Standard chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classic;

impl VariantRules for Classic {
    fn variant(&self) -> Variant {
        Variant::Classic
    }
}

/// Fischer Random (Chess960). Castling destinations are the classic ones;
/// king and rook files come from the position being loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct FischerRandom;

impl VariantRules for FischerRandom {
    fn variant(&self) -> Variant {
        Variant::FischerRandom
    }

    fn starting_fen(&self) -> Option<&'static str> {
        None
    }

    fn castle_geometry(&self, board: &[Option<Piece>; 64], color: Color) -> CastleGeometry {
        let (king_file, h_rook, a_rook) = back_rank_layout(board, color);
        CastleGeometry::chess960(king_file, h_rook, a_rook)
    }
}

/// Wild: the king may start on the d-file. Short castling moves toward the
/// nearer corner and the king always travels two squares.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wild;

/// Black's king and queen swap places.
pub(crate) const WILD_STARTPOS: &str = "rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl VariantRules for Wild {
    fn variant(&self) -> Variant {
        Variant::Wild
    }

    fn starting_fen(&self) -> Option<&'static str> {
        Some(WILD_STARTPOS)
    }

    fn castle_geometry(&self, board: &[Option<Piece>; 64], color: Color) -> CastleGeometry {
        let (king_file, h_rook, a_rook) = back_rank_layout(board, color);
        CastleGeometry::wild(king_file, h_rook, a_rook)
    }
}
