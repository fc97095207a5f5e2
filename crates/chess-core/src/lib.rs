//! Core types for variant chess.
//!
//! This crate provides the fundamental types shared by the rules engine:
//! - [`PieceType`], [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], [`MoveKind`] and [`CastleSide`] for move descriptors
//! - Syntactic FEN parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{CastleSide, Move, MoveKind};
pub use piece::{Piece, PieceType};
pub use square::{File, Rank, Square};
