//! Drop variants.
//!
//! Crazyhouse hands every captured piece to the capturer, demoted to a pawn
//! if it was promoted. Bughouse sends it across to the partner board
//! instead, where it lands in the pool of its own color.

use super::{CaptureRouting, VariantRules};
use crate::Variant;

#[derive(Debug, Clone, Copy, Default)]
pub struct Crazyhouse;

impl VariantRules for Crazyhouse {
    fn variant(&self) -> Variant {
        Variant::Crazyhouse
    }

    fn drops(&self) -> bool {
        true
    }

    fn capture_routing(&self) -> CaptureRouting {
        CaptureRouting::Capturer
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bughouse;

impl VariantRules for Bughouse {
    fn variant(&self) -> Variant {
        Variant::Bughouse
    }

    fn drops(&self) -> bool {
        true
    }

    fn capture_routing(&self) -> CaptureRouting {
        CaptureRouting::Partner
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::{create_from_fen, create_starting_position};
    use crate::{BughouseLink, Variant};
    use chess_core::{Color, PieceType, Square};

    fn total_material(game: &crate::Game) -> i32 {
        let mut total = 0;
        for color in Color::ALL {
            for kind in PieceType::ALL {
                total += game.piece_count(color, kind) as i32 + game.drop_count(color, kind);
            }
        }
        total
    }

    #[test]
    fn captured_piece_joins_capturer_pool() {
        let mut game = create_starting_position(Variant::Crazyhouse).unwrap();
        for san in ["e4", "d5", "exd5", "Qxd5"] {
            game.make_san_move(san).unwrap();
        }
        assert_eq!(game.drop_count(Color::White, PieceType::Pawn), 1);
        assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 1);
        assert_eq!(total_material(&game), 32);

        game.make_san_move("Nc3").unwrap();
        game.make_san_move("P@e4").unwrap();
        assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 0);
        assert_eq!(game.piece_at(Square::E4).map(|p| p.kind), Some(PieceType::Pawn));
        assert_eq!(total_material(&game), 32);
    }

    #[test]
    fn promoted_piece_returns_as_pawn() {
        let mut game =
            create_from_fen("1r2k3/P7/8/8/8/8/8/4K3[] w - - 0 1", Variant::Crazyhouse).unwrap();
        game.make_san_move("a8=Q").unwrap();
        game.make_san_move("Rxa8").unwrap();
        assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 1);
        assert_eq!(game.drop_count(Color::Black, PieceType::Queen), 0);
        assert_eq!(game.to_fen(), "r3k3/8/8/8/8/8/8/4K3[p] w - - 0 2");
        assert_eq!(total_material(&game), 4);
    }

    #[test]
    fn drop_gives_check_but_not_pawn_on_back_rank() {
        let mut game =
            create_from_fen("4k3/8/8/8/8/8/8/4K3[Pq] w - - 0 1", Variant::Crazyhouse).unwrap();
        assert!(game.make_san_move("P@a8").is_err());
        game.make_san_move("P@d7+").unwrap();
        assert!(game.is_in_check());
    }

    #[test]
    fn bughouse_capture_crosses_to_partner() {
        let mut board_a = create_starting_position(Variant::Bughouse).unwrap();
        let mut board_b = create_starting_position(Variant::Bughouse).unwrap();
        let (a, b) = BughouseLink::pair();
        board_a.link_partner(a);
        board_b.link_partner(b);

        for san in ["e4", "d5", "exd5"] {
            board_a.make_san_move(san).unwrap();
        }
        // Nothing lands in board A's own pools.
        assert_eq!(board_a.drop_count(Color::White, PieceType::Pawn), 0);
        assert_eq!(board_b.drop_count(Color::Black, PieceType::Pawn), 0);

        assert_eq!(board_b.sync_partner_drops(), 1);
        assert_eq!(board_b.drop_count(Color::Black, PieceType::Pawn), 1);
        assert_eq!(board_a.sync_partner_drops(), 0);

        // Legality probing on A never sends anything.
        board_a.legal_moves();
        assert_eq!(board_b.sync_partner_drops(), 0);
    }

    #[test]
    fn bughouse_rollback_keeps_sent_piece() {
        let mut board_a = create_starting_position(Variant::Bughouse).unwrap();
        let (a, b) = BughouseLink::pair();
        board_a.link_partner(a);
        let mut board_b = create_starting_position(Variant::Bughouse).unwrap();
        board_b.link_partner(b);

        for san in ["e4", "d5", "exd5"] {
            board_a.make_san_move(san).unwrap();
        }
        board_a.rollback().unwrap();
        assert_eq!(board_b.sync_partner_drops(), 1);
    }
}
