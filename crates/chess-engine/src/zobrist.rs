//! Zobrist keys.
//!
//! The position hash XORs one key per (color, piece type, square) occupied and
//! one key per (color, piece type, pool size) for drop pools. The game hash
//! folds in side to move, castling rights and the en passant file on top of it.

use chess_core::{Color, Piece, PieceType, Square};

/// Largest drop pool size with a distinct key; larger pools share the last one.
pub const MAX_POOL_KEY: usize = 32;

pub struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    drops: [[[u64; MAX_POOL_KEY + 1]; 6]; 2],
    black_to_move: u64,
    castling: [u64; 4],
    en_passant: [u64; 8],
}

/// xorshift64 stream for compile-time key generation.
struct KeyStream(u64);

impl KeyStream {
    const fn next(mut self) -> (Self, u64) {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (self, x)
    }
}

impl ZobristKeys {
    const fn generate() -> Self {
        let mut stream = KeyStream(0x9E37_79B9_7F4A_7C15);
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut drops = [[[0u64; MAX_POOL_KEY + 1]; 6]; 2];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];
        let mut key;

        let mut c = 0;
        while c < 2 {
            let mut p = 0;
            while p < 6 {
                let mut s = 0;
                while s < 64 {
                    (stream, key) = stream.next();
                    pieces[c][p][s] = key;
                    s += 1;
                }
                // Pool size zero hashes to nothing so an empty pool is neutral.
                let mut n = 1;
                while n <= MAX_POOL_KEY {
                    (stream, key) = stream.next();
                    drops[c][p][n] = key;
                    n += 1;
                }
                p += 1;
            }
            c += 1;
        }

        (stream, key) = stream.next();
        let black_to_move = key;

        let mut i = 0;
        while i < 4 {
            (stream, key) = stream.next();
            castling[i] = key;
            i += 1;
        }
        let mut i = 0;
        while i < 8 {
            (stream, key) = stream.next();
            en_passant[i] = key;
            i += 1;
        }

        ZobristKeys {
            pieces,
            drops,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[piece.color.index()][piece.kind.index()][sq.index() as usize]
    }

    /// Key for a drop pool of `count` pieces. Negative counts hash like zero.
    #[inline]
    pub fn drop_pool(&self, color: Color, kind: PieceType, count: i32) -> u64 {
        let n = count.clamp(0, MAX_POOL_KEY as i32) as usize;
        self.drops[color.index()][kind.index()][n]
    }

    #[inline]
    pub fn black_to_move(&self) -> u64 {
        self.black_to_move
    }

    /// Key for castling right `index` (white short, white long, black short, black long).
    #[inline]
    pub fn castling(&self, index: usize) -> u64 {
        self.castling[index]
    }

    #[inline]
    pub fn en_passant(&self, file: u8) -> u64 {
        self.en_passant[(file & 7) as usize]
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::generate();
