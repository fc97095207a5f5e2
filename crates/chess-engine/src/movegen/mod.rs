//! Move generation.
//!
//! Generation is pseudo-legal: moves obey piece movement, castling structure
//! and drop placement, but may leave the mover's king attacked. The legal
//! filter in [`Game::legal_moves`] makes each candidate and asks the variant's
//! rules about the result.

mod attacks;
pub mod perft;
mod rays;

pub use attacks::{
    bishop_attacks, en_passant_attackers, king_attacks, knight_attacks, pawn_attacks,
    pawn_double_pushes, pawn_pushes, queen_attacks, rook_attacks,
};
pub use rays::between;

use crate::{Bitboard, Game, GameFlags};
use chess_core::{CastleSide, Color, Move, MoveKind, Piece, PieceType, Square};
use std::fmt;

/// Moves split into a high-priority bucket (captures and promotions) and a
/// low-priority bucket (everything else).
///
/// Iteration yields the high bucket first. The split is an ordering hint
/// only; both buckets hold moves of equal standing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    high: Vec<Move>,
    low: Vec<Move>,
}

impl MoveList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a move to the bucket its kind belongs in.
    #[inline]
    pub fn push(&mut self, m: Move) {
        if m.is_high_priority() {
            self.high.push(m);
        } else {
            self.low.push(m);
        }
    }

    #[inline]
    pub fn push_high(&mut self, m: Move) {
        self.high.push(m);
    }

    #[inline]
    pub fn push_low(&mut self, m: Move) {
        self.low.push(m);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }

    pub fn high(&self) -> &[Move] {
        &self.high
    }

    pub fn low(&self) -> &[Move] {
        &self.low
    }

    pub fn iter(&self) -> MoveListIter<'_> {
        self.high.iter().chain(self.low.iter())
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.high.contains(m) || self.low.contains(m)
    }

    pub fn clear(&mut self) {
        self.high.clear();
        self.low.clear();
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.high.retain(&mut f);
        self.low.retain(&mut f);
    }
}

pub type MoveListIter<'a> =
    std::iter::Chain<std::slice::Iter<'a, Move>, std::slice::Iter<'a, Move>>;

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        match index.checked_sub(self.high.len()) {
            None => &self.high[index],
            Some(i) => &self.low[i],
        }
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = MoveListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Chain<std::vec::IntoIter<Move>, std::vec::IntoIter<Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.high.into_iter().chain(self.low)
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut list = MoveList::new();
        for m in iter {
            list.push(m);
        }
        list
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// The square `ranks` steps behind `sq` from `color`'s point of view.
#[inline]
fn behind(sq: Square, color: Color, ranks: i8) -> Square {
    Square::from_index_unchecked((sq.index() as i8 - 8 * ranks * color.pawn_direction()) as u8)
}

#[inline]
fn back_rank_square(color: Color, file: u8) -> Square {
    Square::from_index_unchecked(color.back_rank() * 8 + file)
}

impl Game {
    /// All pseudo-legal moves for the side to move.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let us = self.side_to_move;
        let mut moves = MoveList::new();
        self.generate_pawn_moves(us, &mut moves);
        for kind in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            self.generate_piece_moves(us, kind, &mut moves);
        }
        self.generate_castling_moves(us, &mut moves);
        if self.flags.contains(GameFlags::DROPPABLE) {
            self.generate_drops(us, &mut moves);
        }
        moves
    }

    /// Returns true if any piece of `by` attacks `sq` given `occupied`.
    pub fn is_square_attacked(&self, sq: Square, by: Color, occupied: Bitboard) -> bool {
        let pieces = |kind| self.pieces(by, kind);
        let diagonal = pieces(PieceType::Bishop) | pieces(PieceType::Queen);
        let straight = pieces(PieceType::Rook) | pieces(PieceType::Queen);

        (pawn_attacks(sq, by.opposite()) & pieces(PieceType::Pawn)).any()
            || (knight_attacks(sq) & pieces(PieceType::Knight)).any()
            || (king_attacks(sq) & pieces(PieceType::King)).any()
            || (bishop_attacks(sq, occupied) & diagonal).any()
            || (rook_attacks(sq, occupied) & straight).any()
    }

    fn generate_pawn_moves(&self, us: Color, moves: &mut MoveList) {
        let pawns = self.pieces(us, PieceType::Pawn);
        let empty = self.empty_squares();
        let theirs = self.color_bitboard(us.opposite());
        let pawn = Piece::new(PieceType::Pawn, us);

        for to in pawn_pushes(pawns, us, empty) {
            self.push_pawn_move(behind(to, us, 1), to, None, moves);
        }
        for to in pawn_double_pushes(pawns, us, empty) {
            moves.push_low(Move::new(behind(to, us, 2), to, pawn, MoveKind::DoublePush));
        }
        for from in pawns {
            for to in pawn_attacks(from, us) & theirs {
                self.push_pawn_move(from, to, self.piece_at(to), moves);
            }
        }

        if let Some(ep) = self.ep_square {
            let victim = behind(ep, us, 1);
            let victim_is_pawn = self.piece_at(victim).is_some_and(|p| {
                p.color == us.opposite() && p.kind == PieceType::Pawn
            });
            if victim_is_pawn && !self.occupied.contains(ep) {
                for from in en_passant_attackers(ep, us, pawns) {
                    moves.push_high(Move::new(from, ep, pawn, MoveKind::EnPassant));
                }
            }
        }
    }

    fn push_pawn_move(
        &self,
        from: Square,
        to: Square,
        captured: Option<Piece>,
        moves: &mut MoveList,
    ) {
        let us = self.side_to_move;
        let pawn = Piece::new(PieceType::Pawn, us);
        if to.rank_index() == us.promotion_rank() {
            for &piece in self.rules().promotion_pieces() {
                moves.push_high(Move::new(
                    from,
                    to,
                    pawn,
                    MoveKind::Promotion {
                        piece,
                        capture: captured,
                    },
                ));
            }
        } else {
            moves.push(match captured {
                Some(victim) => Move::capture(from, to, pawn, victim),
                None => Move::quiet(from, to, pawn),
            });
        }
    }

    /// Knight, slider and king moves. Every king of `us` is generated, so
    /// variants with several kings need nothing special.
    fn generate_piece_moves(&self, us: Color, kind: PieceType, moves: &mut MoveList) {
        let own = self.color_bitboard(us);
        for from in self.pieces(us, kind) {
            let Some(piece) = self.piece_at(from) else {
                debug_assert!(false, "bitboard and board disagree at {}", from);
                continue;
            };
            let targets = match kind {
                PieceType::Knight => knight_attacks(from),
                PieceType::Bishop => bishop_attacks(from, self.occupied),
                PieceType::Rook => rook_attacks(from, self.occupied),
                PieceType::Queen => queen_attacks(from, self.occupied),
                PieceType::King => king_attacks(from),
                PieceType::Pawn => Bitboard::EMPTY,
            } & !own;
            for to in targets {
                moves.push(match self.piece_at(to) {
                    Some(victim) => Move::capture(from, to, piece, victim),
                    None => Move::quiet(from, to, piece),
                });
            }
        }
    }

    /// Castling moves whose rights are held, whose king and rook stand on
    /// their home squares and whose span is clear. When checks matter the
    /// king may not start on, cross or land on an unsafe square.
    fn generate_castling_moves(&self, us: Color, moves: &mut MoveList) {
        if self.castling.is_empty() {
            return;
        }
        let geometry = &self.castle_geometry[us.index()];
        let king_from = geometry.king_square(us);
        let king = Piece::new(PieceType::King, us);
        if self.piece_at(king_from).map(|p| (p.kind, p.color)) != Some((PieceType::King, us)) {
            return;
        }
        let rules = self.rules();

        for side in CastleSide::ALL {
            if !self.castling.has(us, side) {
                continue;
            }
            let Some(path) = geometry.path(side) else {
                continue;
            };
            let rook_from = back_rank_square(us, path.rook_from);
            let rook_here = self
                .piece_at(rook_from)
                .is_some_and(|p| p.kind == PieceType::Rook && p.color == us);
            if !rook_here {
                continue;
            }

            let files = [geometry.king_file, path.rook_from, path.king_to, path.rook_to];
            let lo = back_rank_square(us, files.into_iter().min().unwrap_or(0));
            let hi = back_rank_square(us, files.into_iter().max().unwrap_or(7));
            let span = between(lo, hi) | Bitboard::from_square(lo) | Bitboard::from_square(hi);
            let movers = Bitboard::from_square(king_from) | Bitboard::from_square(rook_from);
            if (self.occupied & span & !movers).any() {
                continue;
            }

            if rules.checks_matter() {
                let occupied = self.occupied & !movers;
                let (a, b) = if geometry.king_file <= path.king_to {
                    (geometry.king_file, path.king_to)
                } else {
                    (path.king_to, geometry.king_file)
                };
                let safe = (a..=b)
                    .all(|file| rules.king_path_safe(self, back_rank_square(us, file), us, occupied));
                if !safe {
                    continue;
                }
            }

            let king_to = back_rank_square(us, path.king_to);
            moves.push_low(Move::new(king_from, king_to, king, MoveKind::Castle(side)));
        }
    }

    /// Drops onto every empty square; pawns never onto the first or last rank.
    fn generate_drops(&self, us: Color, moves: &mut MoveList) {
        let empty = self.empty_squares();
        for kind in PieceType::ALL {
            if kind == PieceType::King || self.drop_count(us, kind) <= 0 {
                continue;
            }
            let targets = if kind == PieceType::Pawn {
                empty & !Bitboard::BACK_RANKS
            } else {
                empty
            };
            for to in targets {
                moves.push_low(Move::drop(kind, us, to));
            }
        }
    }
}
