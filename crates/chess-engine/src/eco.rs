//! Opening classification boundary.
//!
//! The engine ships no opening database. A caller that has one implements
//! [`EcoClassifier`] and attaches it with
//! [`Game::set_eco_classifier`](crate::Game::set_eco_classifier). Committed
//! moves within the first [`ECO_MAX_FULL_MOVES`] full moves then update the
//! `ECO` and `Opening` headers while
//! [`GameFlags::UPDATING_ECO_HEADERS`](crate::GameFlags::UPDATING_ECO_HEADERS)
//! is set. Rolling a move back restores the headers it replaced.

use crate::Game;

/// Classification is only consulted up to this full move number.
pub const ECO_MAX_FULL_MOVES: u32 = 18;

/// An ECO code and opening name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcoEntry {
    pub code: String,
    pub name: String,
}

impl EcoEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        EcoEntry {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Looks up the opening reached by a game.
pub trait EcoClassifier: Send + Sync {
    /// Returns the classification of the current position, or `None` when the
    /// position is not in the book.
    fn classify(&self, game: &Game) -> Option<EcoEntry>;
}
