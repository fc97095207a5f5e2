//! Making and unmaking moves.

use super::Game;
use crate::castling::CastlingRights;
use crate::eco::ECO_MAX_FULL_MOVES;
use crate::movegen::king_attacks;
use crate::rules::CaptureRouting;
use crate::{GameError, GameFlags};
use chess_core::{CastleSide, Color, Move, MoveKind, Piece, PieceType, Square};
use tracing::trace;

/// Everything needed to undo one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) mv: Move,
    castling: CastlingRights,
    ep_square: Option<Square>,
    fifty_move_count: u32,
    game_hash: u64,
    /// Pieces removed by an atomic explosion, in removal order.
    exploded: Vec<(Square, Piece)>,
    /// Pool credited with the captured piece.
    pooled: Option<(Color, PieceType)>,
    /// Headers replaced by the ECO classifier: (ECO, Opening).
    eco_headers: Option<(Option<String>, Option<String>)>,
}

impl Game {
    /// Applies `mv` without checking legality.
    ///
    /// The move must be pseudo-legal in the current position; anything else
    /// corrupts the game state. Use [`Game::make_checked`] for untrusted input.
    pub fn force_move(&mut self, mv: Move) {
        let move_number = self.fullmove_number();
        self.apply(mv, false);
        trace!(mv = %mv, fen = %self.to_fen(), "move made");

        if self.flags.contains(GameFlags::UPDATING_ECO_HEADERS)
            && move_number <= ECO_MAX_FULL_MOVES
        {
            self.update_eco_headers();
        }
    }

    /// Undoes the last move.
    pub fn rollback(&mut self) -> Result<Move, GameError> {
        if self.history.is_empty() {
            return Err(GameError::EmptyHistory);
        }
        let mv = self.undo();
        trace!(mv = %mv, "move rolled back");
        Ok(mv)
    }

    /// The make half of make/test/rollback. A trial move does not route captures
    /// to a bughouse partner.
    pub(crate) fn apply(&mut self, mv: Move, trial: bool) {
        let color = mv.color();
        debug_assert_eq!(color, self.side_to_move, "{} is not to move", color);

        let mut entry = HistoryEntry {
            mv,
            castling: self.castling,
            ep_square: self.ep_square,
            fifty_move_count: self.fifty_move_count,
            game_hash: self.game_hash,
            exploded: Vec::new(),
            pooled: None,
            eco_headers: None,
        };

        match mv.kind {
            MoveKind::Drop => {
                self.add_to_pool(color, mv.piece.kind, -1);
                self.put_piece(mv.to, mv.piece);
            }
            MoveKind::Castle(side) => self.castle(color, side, mv.from, mv.to),
            MoveKind::EnPassant => {
                if let Some(cap) = mv.capture_square() {
                    self.remove_piece(cap);
                }
                self.relocate(mv.from, mv.to);
            }
            MoveKind::Quiet
            | MoveKind::DoublePush
            | MoveKind::Capture(_)
            | MoveKind::Promotion { .. } => {
                if mv.is_capture() {
                    self.remove_piece(mv.to);
                }
                self.remove_piece(mv.from);
                let landed = match mv.promotion() {
                    Some(kind) => Piece::promoted(kind, color),
                    None => mv.piece,
                };
                self.put_piece(mv.to, landed);
            }
        }

        let rules = self.rules();
        if let Some(captured) = mv.captured() {
            match rules.capture_routing() {
                CaptureRouting::Discard => {}
                CaptureRouting::Capturer => {
                    let kind = captured.pool_kind();
                    self.add_to_pool(color, kind, 1);
                    entry.pooled = Some((color, kind));
                }
                CaptureRouting::Partner => {
                    if let (false, Some(link)) = (trial, &self.partner) {
                        link.send(captured.color, captured.pool_kind());
                    }
                }
            }
            if rules.explodes() {
                self.explode(mv.to, &mut entry.exploded);
            }
        }

        let mut lost = self.castle_masks[mv.from.index() as usize]
            | self.castle_masks[mv.to.index() as usize];
        for (sq, _) in &entry.exploded {
            lost |= self.castle_masks[sq.index() as usize];
        }
        self.castling.revoke_mask(lost);
        if mv.piece.kind == PieceType::King && !mv.is_drop() {
            self.castling.revoke_color(color);
        }

        self.ep_square = mv.ep_target();
        if mv.piece.kind == PieceType::Pawn || mv.is_capture() || mv.is_drop() {
            self.fifty_move_count = 0;
        } else {
            self.fifty_move_count += 1;
        }

        self.half_move_count += 1;
        self.side_to_move = color.opposite();
        self.refresh_game_hash();
        let slot = self.rep_slot();
        self.rep_counts[slot] = self.rep_counts[slot].saturating_add(1);
        self.history.push(entry);
    }

    /// The rollback half of make/test/rollback. Panics on empty history.
    pub(crate) fn undo(&mut self) -> Move {
        let slot = self.rep_slot();
        self.rep_counts[slot] = self.rep_counts[slot].saturating_sub(1);

        let Some(entry) = self.history.pop() else {
            panic!("undo with empty history");
        };
        let mv = entry.mv;
        let color = mv.color();

        self.side_to_move = color;
        self.half_move_count -= 1;
        self.castling = entry.castling;
        self.ep_square = entry.ep_square;
        self.fifty_move_count = entry.fifty_move_count;

        for &(sq, piece) in entry.exploded.iter().rev() {
            self.put_piece(sq, piece);
        }
        if let Some((pool_color, kind)) = entry.pooled {
            self.add_to_pool(pool_color, kind, -1);
        }

        match mv.kind {
            MoveKind::Drop => {
                self.remove_piece(mv.to);
                self.add_to_pool(color, mv.piece.kind, 1);
            }
            MoveKind::Castle(side) => self.uncastle(color, side, mv.from, mv.to),
            MoveKind::EnPassant => {
                self.relocate(mv.to, mv.from);
                if let (Some(cap), Some(pawn)) = (mv.capture_square(), mv.captured()) {
                    self.put_piece(cap, pawn);
                }
            }
            MoveKind::Quiet
            | MoveKind::DoublePush
            | MoveKind::Capture(_)
            | MoveKind::Promotion { .. } => {
                self.remove_piece(mv.to);
                self.put_piece(mv.from, mv.piece);
                if let Some(captured) = mv.captured() {
                    self.put_piece(mv.to, captured);
                }
            }
        }

        if let Some((eco, opening)) = entry.eco_headers {
            self.restore_header("ECO", eco);
            self.restore_header("Opening", opening);
        }

        self.game_hash = entry.game_hash;
        mv
    }

    fn relocate(&mut self, from: Square, to: Square) {
        if let Some(piece) = self.remove_piece(from) {
            self.put_piece(to, piece);
        }
    }

    fn castle_squares(&self, color: Color, side: CastleSide) -> Option<(Square, Square)> {
        let path = self.castle_geometry[color.index()].path(side)?;
        let rank = color.back_rank() * 8;
        Some((
            Square::from_index_unchecked(rank + path.rook_from),
            Square::from_index_unchecked(rank + path.rook_to),
        ))
    }

    fn castle(&mut self, color: Color, side: CastleSide, king_from: Square, king_to: Square) {
        let Some((rook_from, rook_to)) = self.castle_squares(color, side) else {
            debug_assert!(false, "castle without geometry");
            return;
        };
        let king = self.remove_piece(king_from);
        let rook = self.remove_piece(rook_from);
        if let Some(king) = king {
            self.put_piece(king_to, king);
        }
        if let Some(rook) = rook {
            self.put_piece(rook_to, rook);
        }
    }

    fn uncastle(&mut self, color: Color, side: CastleSide, king_from: Square, king_to: Square) {
        let Some((rook_from, rook_to)) = self.castle_squares(color, side) else {
            return;
        };
        let king = self.remove_piece(king_to);
        let rook = self.remove_piece(rook_to);
        if let Some(king) = king {
            self.put_piece(king_from, king);
        }
        if let Some(rook) = rook {
            self.put_piece(rook_from, rook);
        }
    }

    /// Removes the piece that landed on `center` and every non-pawn around it.
    fn explode(&mut self, center: Square, removed: &mut Vec<(Square, Piece)>) {
        if let Some(piece) = self.remove_piece(center) {
            removed.push((center, piece));
        }
        for sq in king_attacks(center) & self.occupied {
            if self.piece_at(sq).is_some_and(|p| p.kind != PieceType::Pawn) {
                if let Some(piece) = self.remove_piece(sq) {
                    removed.push((sq, piece));
                }
            }
        }
    }

    fn update_eco_headers(&mut self) {
        let Some(classifier) = self.eco.clone() else {
            return;
        };
        let Some(entry) = classifier.classify(self) else {
            return;
        };
        let previous = (
            self.headers.get("ECO").map(str::to_string),
            self.headers.get("Opening").map(str::to_string),
        );
        self.headers.set("ECO", entry.code);
        self.headers.set("Opening", entry.name);
        if let Some(top) = self.history.last_mut() {
            top.eco_headers = Some(previous);
        }
    }

    fn restore_header(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(v) => self.headers.set(name, v),
            None => {
                self.headers.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::create_from_fen;
    use crate::{Game, Variant};
    use chess_core::{CastleSide, Color, PieceType, Square};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn check_roundtrip(game: &mut Game) {
        let before = game.clone();
        let moves = game.legal_moves();
        assert!(!moves.is_empty());
        for mv in &moves {
            game.force_move(*mv);
            assert_eq!(game.position_hash(), game.full_position_hash(), "{}", mv);
            game.rollback().unwrap();
            assert_eq!(*game, before, "rollback of {} diverged", mv);
        }
    }

    #[test]
    fn rollback_restores_every_move_kiwipete() {
        let mut game = create_from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            Variant::Classic,
        )
        .unwrap();
        check_roundtrip(&mut game);
    }

    #[test]
    fn rollback_restores_promotions_and_en_passant() {
        let mut game = create_from_fen(
            "r3k3/1P6/8/3pP3/8/8/8/4K3 w q d6 0 1",
            Variant::Classic,
        )
        .unwrap();
        check_roundtrip(&mut game);
    }

    #[test]
    fn rollback_restores_atomic_explosions() {
        let mut game = create_from_fen(
            "rnbqkbnr/ppp2ppp/8/3pp3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 3",
            Variant::Atomic,
        )
        .unwrap();
        check_roundtrip(&mut game);
    }

    #[test]
    fn rollback_restores_drops() {
        let mut game = create_from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R[Nb] w KQkq - 2 3",
            Variant::Crazyhouse,
        )
        .unwrap();
        check_roundtrip(&mut game);
    }

    #[test]
    fn castling_moves_both_pieces() {
        let mut game =
            create_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Variant::Classic).unwrap();
        game.make_san_move("O-O").unwrap();
        assert_eq!(game.piece_at(sq("g1")).map(|p| p.kind), Some(PieceType::King));
        assert_eq!(game.piece_at(sq("f1")).map(|p| p.kind), Some(PieceType::Rook));
        assert!(game.piece_at(Square::H1).is_none());
        assert!(!game.castling().has(Color::White, CastleSide::Long));
        assert!(game.castling().has(Color::Black, CastleSide::Short));

        game.make_san_move("Rxa1").unwrap();
        assert!(!game.castling().has(Color::Black, CastleSide::Long));
    }

    #[test]
    fn rook_capture_revokes_opponent_right() {
        let mut game =
            create_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Variant::Classic).unwrap();
        game.make_san_move("Rxa8+").unwrap();
        assert!(!game.castling().has(Color::Black, CastleSide::Long));
        assert!(!game.castling().has(Color::White, CastleSide::Long));
        assert!(game.castling().has(Color::Black, CastleSide::Short));
    }

    #[test]
    fn crazyhouse_capture_pools_demoted_piece() {
        let mut game =
            create_from_fen("r3k3/8/8/8/8/8/8/Q~3K3[] b - - 0 1", Variant::Crazyhouse).unwrap();
        game.make_san_move("Rxa1+").unwrap();
        assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 1);
        assert_eq!(game.drop_count(Color::Black, PieceType::Queen), 0);
        game.rollback().unwrap();
        assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 0);
        assert!(game.piece_at(Square::A1).is_some_and(|p| p.promoted));
    }

    #[test]
    fn fifty_move_counter() {
        let mut game =
            create_from_fen("4k3/8/8/8/8/8/4P3/4K1N1 w - - 7 20", Variant::Classic).unwrap();
        game.make_san_move("Nf3").unwrap();
        assert_eq!(game.fifty_move_count(), 8);
        game.make_san_move("Kd7").unwrap();
        assert_eq!(game.fifty_move_count(), 9);
        game.make_san_move("e4").unwrap();
        assert_eq!(game.fifty_move_count(), 0);
        game.rollback().unwrap();
        assert_eq!(game.fifty_move_count(), 9);
    }
}
