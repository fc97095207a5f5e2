//! Variant rule overlays.
//!
//! Every variant shares one [`Game`] representation and one make/rollback
//! path. What differs is supplied by a [`VariantRules`] object: castling
//! geometry, drops, where captured pieces go, explosions, promotion choices,
//! the legality test applied after each trial move, and how a game ends.
//! The trait's defaults are the classic rules.

mod atomic;
mod classic;
mod crazyhouse;
mod suicide;

pub use atomic::Atomic;
pub use classic::{Classic, FischerRandom, Wild};
pub use crazyhouse::{Bughouse, Crazyhouse};
pub use suicide::{Losers, Suicide};

use crate::castling::CastleGeometry;
use crate::{Bitboard, Game, GameFlags, MoveList, Variant};
use chess_core::{Color, Fen, Piece, PieceType, Square};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw(DrawReason),
}

impl GameResult {
    /// A win for `color`.
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// The PGN result token.
    pub const fn pgn_token(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// No legal moves and not in check.
    Stalemate,
    /// 100 half-moves without a pawn move, capture or drop.
    FiftyMoveRule,
    /// Neither side can mate.
    InsufficientMaterial,
}

/// Where a captured piece goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRouting {
    /// Off the board for good.
    Discard,
    /// Into the capturing side's drop pool.
    Capturer,
    /// To the partner board's pool of the captured piece's color.
    Partner,
}

/// The per-variant half of the rules.
pub trait VariantRules: Send + Sync {
    fn variant(&self) -> Variant;

    /// FEN of the fixed starting array, or `None` when the variant has none.
    fn starting_fen(&self) -> Option<&'static str> {
        Some(Fen::STARTPOS)
    }

    /// Castling geometry for `color` given the position being loaded.
    fn castle_geometry(&self, _board: &[Option<Piece>; 64], _color: Color) -> CastleGeometry {
        CastleGeometry::STANDARD
    }

    /// Whether pieces can be dropped from pools.
    fn drops(&self) -> bool {
        false
    }

    fn capture_routing(&self) -> CaptureRouting {
        CaptureRouting::Discard
    }

    /// Whether captures explode.
    fn explodes(&self) -> bool {
        false
    }

    /// Pieces a pawn may promote to, in generation order.
    fn promotion_pieces(&self) -> &'static [PieceType] {
        &PieceType::PROMOTIONS
    }

    /// Whether check exists. When false, SAN carries no `+`/`#` and castling
    /// ignores attacked squares.
    fn checks_matter(&self) -> bool {
        true
    }

    fn is_in_check(&self, game: &Game, color: Color) -> bool {
        game.is_king_attacked(color)
    }

    /// Tested after every trial move: both kings are on the board and the
    /// side that just moved is not in check.
    fn is_legal_position(&self, game: &Game) -> bool {
        let mover = game.side_to_move().opposite();
        game.has_king(Color::White)
            && game.has_king(Color::Black)
            && !self.is_in_check(game, mover)
    }

    /// Whether `color`'s king may stand on or cross `sq` while castling.
    fn king_path_safe(&self, game: &Game, sq: Square, color: Color, occupied: Bitboard) -> bool {
        !game.is_square_attacked(sq, color.opposite(), occupied)
    }

    /// Final narrowing of the legal move set.
    fn restrict_legal(&self, moves: MoveList) -> MoveList {
        moves
    }

    /// Whether SAN decoding may settle an ambiguity by discarding candidates
    /// that are illegal.
    fn check_disambiguation(&self) -> bool {
        true
    }

    fn outcome(&self, game: &mut Game) -> Option<GameResult> {
        standard_outcome(game)
    }
}

/// Checkmate, stalemate, the fifty-move rule and insufficient material.
pub fn standard_outcome(game: &mut Game) -> Option<GameResult> {
    let to_move = game.side_to_move();
    if game.legal_moves().is_empty() {
        return Some(if game.is_in_check() {
            GameResult::win_for(to_move.opposite())
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        });
    }
    if game.fifty_move_count() >= 100 {
        return Some(GameResult::Draw(DrawReason::FiftyMoveRule));
    }
    if !game.flags().contains(GameFlags::DROPPABLE) && is_insufficient_material(game) {
        return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
    }
    None
}

/// Bare kings, or kings plus a single minor piece.
fn is_insufficient_material(game: &Game) -> bool {
    let mut minors = 0;
    for color in Color::ALL {
        for kind in [PieceType::Pawn, PieceType::Rook, PieceType::Queen] {
            if game.piece_count(color, kind) > 0 {
                return false;
            }
        }
        minors += game.piece_count(color, PieceType::Knight)
            + game.piece_count(color, PieceType::Bishop);
    }
    minors <= 1
}

/// Keeps only captures when any capture is available.
fn forced_capture(mut moves: MoveList) -> MoveList {
    if moves.iter().any(|m| m.is_capture()) {
        moves.retain(|m| m.is_capture());
    }
    moves
}

/// King file and the outermost rook files on either side of it, read from
/// `color`'s back rank.
fn back_rank_layout(board: &[Option<Piece>; 64], color: Color) -> (u8, Option<u8>, Option<u8>) {
    let rank = color.back_rank() * 8;
    let holds = |file: u8, kind: PieceType| {
        board[(rank + file) as usize].is_some_and(|p| p.color == color && p.kind == kind)
    };
    let Some(king_file) = (0..8).find(|&f| holds(f, PieceType::King)) else {
        return (4, Some(7), Some(0));
    };
    let h_rook = (king_file + 1..8).rev().find(|&f| holds(f, PieceType::Rook));
    let a_rook = (0..king_file).find(|&f| holds(f, PieceType::Rook));
    (king_file, h_rook, a_rook)
}
