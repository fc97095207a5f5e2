//! Caller-facing errors.

use crate::Variant;
use chess_core::FenError;
use thiserror::Error;

/// Error type for game operations.
///
/// Move errors carry the input that was tried and a dump of the position it
/// was tried in. A failed operation never leaves the game partially changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("illegal position: {fen}")]
    IllegalPosition { fen: String },

    #[error("illegal move '{input}'\n{position}")]
    IllegalMove { input: String, position: String },

    #[error("ambiguous move '{input}', candidates: {}\n{position}", candidates.join(", "))]
    AmbiguousMove {
        input: String,
        candidates: Vec<String>,
        position: String,
    },

    #[error("no moves to roll back")]
    EmptyHistory,

    #[error("{0} has no fixed starting position")]
    NoStartingPosition(Variant),

    #[error("cursor holds an uncommitted branch")]
    CursorBranched,

    #[error("cursor index {index} is past the last move ({len})")]
    CursorOutOfRange { index: usize, len: usize },
}
