//! Direction and ray tables for sliding pieces.
//!
//! A ray from a square runs to the board edge in one direction. Slider attacks
//! are the ray cut at the nearest blocker: the lowest set bit for directions
//! that increase the square index and the highest set bit otherwise.

use crate::Bitboard;
use chess_core::Square;

/// The eight compass directions, white's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// (file, rank) step of this direction.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    /// True when stepping in this direction increases the square index.
    const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }
}

const RAYS: [[Bitboard; 64]; 8] = build_rays();

const fn build_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut d = 0;
    while d < 8 {
        let (df, dr) = Direction::ALL[d].delta();
        let mut sq = 0u8;
        while sq < 64 {
            let mut bits = 0u64;
            let mut cur = Square::from_index_unchecked(sq);
            while let Some(next) = cur.offset(df, dr) {
                bits |= next.bitboard();
                cur = next;
            }
            rays[d][sq as usize] = Bitboard(bits);
            sq += 1;
        }
        d += 1;
    }
    rays
}

/// The full ray from `sq` in `dir`, excluding `sq`.
#[inline]
pub fn ray(sq: Square, dir: Direction) -> Bitboard {
    RAYS[dir as usize][sq.index() as usize]
}

/// The ray from `sq` in `dir` up to and including the first occupied square.
pub fn ray_attacks(sq: Square, occupied: Bitboard, dir: Direction) -> Bitboard {
    let full = ray(sq, dir);
    let blockers = full & occupied;
    let nearest = if dir.is_positive() {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match nearest {
        Some(blocker) => full ^ ray(blocker, dir),
        None => full,
    }
}

/// Squares strictly between `a` and `b` when they share a line, else empty.
pub fn between(a: Square, b: Square) -> Bitboard {
    for dir in Direction::ALL {
        let r = ray(a, dir);
        if r.contains(b) {
            return r & !ray(b, dir) & !Bitboard::from_square(b);
        }
    }
    Bitboard::EMPTY
}
