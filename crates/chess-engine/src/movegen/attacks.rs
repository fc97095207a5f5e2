//! Attack table generation and lookup for all piece types.

use super::rays::{ray_attacks, Direction};
use crate::Bitboard;
use chess_core::{Color, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_OFFSETS);
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];

/// Builds a per-square table of the squares reachable by one (file, rank) jump.
const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let from = Square::from_index_unchecked(sq);
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            if let Some(to) = from.offset(offsets[i].0, offsets[i].1) {
                bits |= to.bitboard();
            }
            i += 1;
        }
        table[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Diagonal slider attacks, stopping at and including the first blocker.
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, Direction::NorthEast)
        | ray_attacks(sq, occupied, Direction::SouthEast)
        | ray_attacks(sq, occupied, Direction::SouthWest)
        | ray_attacks(sq, occupied, Direction::NorthWest)
}

/// Orthogonal slider attacks, stopping at and including the first blocker.
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, Direction::North)
        | ray_attacks(sq, occupied, Direction::East)
        | ray_attacks(sq, occupied, Direction::South)
        | ray_attacks(sq, occupied, Direction::West)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Single-step push targets for `pawns` of `color` onto `empty` squares.
#[inline]
pub fn pawn_pushes(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    pawns.forward(color) & empty
}

/// Double-step push targets for pawns of `color` still on their start rank.
pub fn pawn_double_pushes(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    let start = pawns & Bitboard::rank(color.pawn_rank());
    pawn_pushes(pawn_pushes(start, color, empty), color, empty)
}

/// Pawns of `color` that can capture en passant onto `ep`.
#[inline]
pub fn en_passant_attackers(ep: Square, color: Color, pawns: Bitboard) -> Bitboard {
    pawn_attacks(ep, color.opposite()) & pawns
}
