//! Atomic chess: every capture explodes.
//!
//! The capturing piece, the captured piece and every non-pawn on the eight
//! surrounding squares leave the board. A king that disappears loses the
//! game, so kings may stand next to each other: neither can capture the
//! other without blowing itself up.

use super::{standard_outcome, GameResult, VariantRules};
use crate::movegen::king_attacks;
use crate::{Bitboard, Game, Variant};
use chess_core::{Color, PieceType, Square};

#[derive(Debug, Clone, Copy, Default)]
pub struct Atomic;

fn kings_touch(game: &Game) -> bool {
    game.pieces(Color::White, PieceType::King)
        .into_iter()
        .any(|sq| (king_attacks(sq) & game.pieces(Color::Black, PieceType::King)).any())
}

impl VariantRules for Atomic {
    fn variant(&self) -> Variant {
        Variant::Atomic
    }

    fn explodes(&self) -> bool {
        true
    }

    /// A missing king counts as check so that a blown-up side has no
    /// escape; touching kings are never in check.
    fn is_in_check(&self, game: &Game, color: Color) -> bool {
        if !game.has_king(color) {
            return true;
        }
        if kings_touch(game) {
            return false;
        }
        game.is_king_attacked(color)
    }

    /// The mover must keep its king. Exploding the opponent's king ends the
    /// game and overrides any check against the mover.
    fn is_legal_position(&self, game: &Game) -> bool {
        let mover = game.side_to_move().opposite();
        if !game.has_king(mover) {
            return false;
        }
        if !game.has_king(mover.opposite()) {
            return true;
        }
        !self.is_in_check(game, mover)
    }

    fn king_path_safe(&self, game: &Game, sq: Square, color: Color, occupied: Bitboard) -> bool {
        let enemy_kings = game.pieces(color.opposite(), PieceType::King);
        (king_attacks(sq) & enemy_kings).any()
            || !game.is_square_attacked(sq, color.opposite(), occupied)
    }

    fn outcome(&self, game: &mut Game) -> Option<GameResult> {
        let to_move = game.side_to_move();
        if !game.has_king(to_move) {
            return Some(GameResult::win_for(to_move.opposite()));
        }
        standard_outcome(game)
    }
}
