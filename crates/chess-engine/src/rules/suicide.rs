//! Capture-forcing variants.
//!
//! Neither variant knows check: any pseudo-legal move is legal, kings are
//! ordinary pieces that may be captured or multiplied by promotion, and a
//! capture must be made whenever one is available. The player who runs out
//! of moves, or sheds their material, wins.

use super::{forced_capture, DrawReason, GameResult, VariantRules};
use crate::{Bitboard, Game, MoveList, Variant};
use chess_core::{Color, PieceType, Square};

/// Pawns may also promote to a king.
const PROMOTIONS: [PieceType; 5] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::King,
];

const SUICIDE_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

/// The side to move wins once it is bare or out of moves.
fn capture_forcing_outcome(
    game: &mut Game,
    is_bare: fn(&Game, Color) -> bool,
) -> Option<GameResult> {
    let to_move = game.side_to_move();
    if is_bare(game, to_move) || game.legal_moves().is_empty() {
        return Some(GameResult::win_for(to_move));
    }
    if game.fifty_move_count() >= 100 {
        return Some(GameResult::Draw(DrawReason::FiftyMoveRule));
    }
    None
}

/// No pieces left at all.
fn no_pieces(game: &Game, color: Color) -> bool {
    game.color_bitboard(color).is_empty()
}

/// Nothing but kings left.
fn only_kings(game: &Game, color: Color) -> bool {
    game.color_bitboard(color) == game.pieces(color, PieceType::King)
}

macro_rules! capture_forcing_rules {
    ($is_bare:expr) => {
        fn promotion_pieces(&self) -> &'static [PieceType] {
            &PROMOTIONS
        }

        fn checks_matter(&self) -> bool {
            false
        }

        fn is_in_check(&self, _game: &Game, _color: Color) -> bool {
            false
        }

        fn is_legal_position(&self, _game: &Game) -> bool {
            true
        }

        fn king_path_safe(&self, _: &Game, _: Square, _: Color, _: Bitboard) -> bool {
            true
        }

        fn restrict_legal(&self, moves: MoveList) -> MoveList {
            forced_capture(moves)
        }

        fn check_disambiguation(&self) -> bool {
            false
        }

        fn outcome(&self, game: &mut Game) -> Option<GameResult> {
            capture_forcing_outcome(game, $is_bare)
        }
    };
}

/// Suicide (giveaway). Starts without castling rights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suicide;

impl VariantRules for Suicide {
    fn variant(&self) -> Variant {
        Variant::Suicide
    }

    fn starting_fen(&self) -> Option<&'static str> {
        Some(SUICIDE_STARTPOS)
    }

    capture_forcing_rules!(no_pieces);
}

/// Losers. Shedding everything but the king wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Losers;

impl VariantRules for Losers {
    fn variant(&self) -> Variant {
        Variant::Losers
    }

    capture_forcing_rules!(only_kings);
}
