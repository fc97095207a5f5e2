//! Castling rights and castling geometry.
//!
//! Geometry records, per color, where the king and each castling rook start and
//! where they land. Standard chess uses e/h/a with g/f and c/d destinations.
//! Fischer Random keeps those destinations but reads the start files from the
//! position. Wild setups with a d-file king castle toward the nearer rook: the
//! king moves two squares and the rook lands on the square the king crossed.

use chess_core::{CastleSide, Color, Square};

/// Castling right flags, two per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Bit index of a right; also the Zobrist key index.
    #[inline]
    pub const fn index(color: Color, side: CastleSide) -> usize {
        color.index() * 2 + side.index()
    }

    #[inline]
    const fn bit(color: Color, side: CastleSide) -> u8 {
        1 << Self::index(color, side)
    }

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::bit(color, side) != 0
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::bit(color, side);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::bit(color, side);
    }

    #[inline]
    pub fn revoke_color(&mut self, color: Color) {
        self.0 &= !(0b11 << (color.index() * 2));
    }

    /// Clears every bit set in `mask`.
    #[inline]
    pub fn revoke_mask(&mut self, mask: u8) {
        self.0 &= !mask;
    }

    /// Indices of the rights currently held.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..4).filter(move |i| self.0 & (1 << i) != 0)
    }
}

/// Start and landing files for one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlePath {
    pub rook_from: u8,
    pub king_to: u8,
    pub rook_to: u8,
    /// Set when the FEN named the rook file explicitly (X-FEN letter).
    pub explicit: bool,
}

/// Castling geometry for one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleGeometry {
    pub king_file: u8,
    paths: [Option<CastlePath>; 2],
}

impl CastleGeometry {
    /// e-file king with h/a rooks.
    pub const STANDARD: CastleGeometry = CastleGeometry {
        king_file: 4,
        paths: [
            Some(CastlePath {
                rook_from: 7,
                king_to: 6,
                rook_to: 5,
                explicit: false,
            }),
            Some(CastlePath {
                rook_from: 0,
                king_to: 2,
                rook_to: 3,
                explicit: false,
            }),
        ],
    };

    /// Fischer Random geometry for a king on `king_file` with the given rook
    /// files. Destinations match standard chess.
    pub fn chess960(king_file: u8, h_rook: Option<u8>, a_rook: Option<u8>) -> Self {
        let path = |rook_from: u8, king_to: u8, rook_to: u8| CastlePath {
            rook_from,
            king_to,
            rook_to,
            explicit: false,
        };
        CastleGeometry {
            king_file,
            paths: [
                h_rook.map(|f| path(f, 6, 5)),
                a_rook.map(|f| path(f, 2, 3)),
            ],
        }
    }

    /// Wild geometry: short castling goes toward the nearer corner.
    pub fn wild(king_file: u8, h_rook: Option<u8>, a_rook: Option<u8>) -> Self {
        let toward = |rook_from: u8| {
            let (king_to, rook_to) = if rook_from > king_file {
                (king_file + 2, king_file + 1)
            } else {
                (king_file.saturating_sub(2), king_file.saturating_sub(1))
            };
            CastlePath {
                rook_from,
                king_to,
                rook_to,
                explicit: false,
            }
        };
        let (short, long) = if king_file >= 4 {
            (h_rook, a_rook)
        } else {
            (a_rook, h_rook)
        };
        CastleGeometry {
            king_file,
            paths: [short.map(toward), long.map(toward)],
        }
    }

    #[inline]
    pub fn path(&self, side: CastleSide) -> Option<&CastlePath> {
        self.paths[side.index()].as_ref()
    }

    /// Marks a path as named by an explicit file letter.
    pub fn mark_explicit(&mut self, side: CastleSide) {
        if let Some(path) = self.paths[side.index()].as_mut() {
            path.explicit = true;
        }
    }

    /// Replaces the rook file of an existing path.
    pub fn set_rook_file(&mut self, side: CastleSide, file: u8) {
        if let Some(path) = self.paths[side.index()].as_mut() {
            path.rook_from = file;
            path.explicit = true;
        }
    }

    /// The side whose rook starts on `file`, if any.
    pub fn side_for_rook_file(&self, file: u8) -> Option<CastleSide> {
        CastleSide::ALL
            .into_iter()
            .find(|&side| self.path(side).is_some_and(|p| p.rook_from == file))
    }

    /// The side whose rook starts toward the h-file (true) or a-file (false).
    pub fn side_toward(&self, h_side: bool) -> Option<CastleSide> {
        CastleSide::ALL.into_iter().find(|&side| {
            self.path(side)
                .is_some_and(|p| (p.rook_from > self.king_file) == h_side)
        })
    }

    /// King square for `color`.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        Square::from_index_unchecked(color.back_rank() * 8 + self.king_file)
    }
}

/// Per-square masks of rights lost when a piece leaves or arrives there.
pub fn rights_masks(geometry: &[CastleGeometry; 2]) -> [u8; 64] {
    let mut masks = [0u8; 64];
    for color in Color::ALL {
        let geo = &geometry[color.index()];
        let rank = color.back_rank() * 8;
        let mut both = 0;
        for side in CastleSide::ALL {
            if let Some(path) = geo.path(side) {
                let bit = 1u8 << CastlingRights::index(color, side);
                masks[(rank + path.rook_from) as usize] |= bit;
                both |= bit;
            }
        }
        masks[(rank + geo.king_file) as usize] |= both;
    }
    masks
}
