//! Variant chess rules engine with bitboard representation.
//!
//! This crate provides:
//! - [`Game`] - Board state, move history and exact make/rollback
//! - [`VariantRules`] - Per-variant hooks for Classic, Atomic, Crazyhouse,
//!   Bughouse, Suicide, Losers, Fischer Random and Wild
//! - [`GameCursor`] - Browsing a game's history, with branch/commit/revert
//! - Pseudo-legal move generation with a make-and-test legality filter
//! - SAN and LAN parsing and generation
//! - FEN import/export, including crazyhouse holdings
//!
//! # Architecture
//!
//! Pieces live both in a 64-entry array and in per-color/per-type bitboards.
//! Rules that differ between variants are answered by a `&'static dyn
//! VariantRules` chosen from the [`Variant`]; everything else is shared.
//!
//! # Example
//!
//! ```
//! use chess_engine::{create_starting_position, Variant};
//!
//! let mut game = create_starting_position(Variant::Classic).unwrap();
//! game.make_san_move("e4").unwrap();
//! game.make_san_move("e5").unwrap();
//! assert_eq!(game.legal_moves().len(), 29);
//! println!("Position after 1.e4 e5: {}", game.to_fen());
//!
//! game.rollback().unwrap();
//! assert_eq!(game.moves().len(), 1);
//! ```

mod bitboard;
mod bughouse;
mod castling;
mod cursor;
mod eco;
mod error;
pub mod factory;
mod flags;
mod game;
pub mod movegen;
pub mod rules;
pub mod san;
mod variant;
mod zobrist;

pub use bitboard::{Bitboard, BitboardIter};
pub use bughouse::BughouseLink;
pub use castling::{CastleGeometry, CastlePath, CastlingRights};
pub use cursor::{CursorMode, GameCursor};
pub use eco::{EcoClassifier, EcoEntry, ECO_MAX_FULL_MOVES};
pub use error::GameError;
pub use factory::{create_from_config, create_from_fen, create_starting_position, GameConfig};
pub use flags::GameFlags;
pub use game::{Game, PgnHeaders, REPETITION_TABLE_SIZE};
pub use movegen::MoveList;
pub use rules::{CaptureRouting, DrawReason, GameResult, VariantRules};
pub use san::{lan_to_move, move_to_san, san_to_move, SanError};
pub use variant::{UnknownVariant, Variant};
