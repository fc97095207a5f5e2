//! Game construction.
//!
//! Every game starts from a FEN string. The starting-position shortcut looks
//! the FEN up from the variant's rules; Fischer Random has none and must be
//! given an explicit position.

use crate::{Game, GameError, GameFlags, Variant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a game of `variant` from a FEN string.
///
/// Crazyhouse and bughouse FENs may carry bracketed holdings
/// (`.../RNBQKBNR[Qp] w ...`); without them the pools are derived from the
/// material missing from the board. Fails on malformed text or when the side
/// that just moved is left in an illegal position.
pub fn create_from_fen(fen: &str, variant: Variant) -> Result<Game, GameError> {
    let game = Game::from_fen(fen, variant)?;
    debug!(%variant, fen = %game.initial_fen(), "game created");
    Ok(game)
}

/// Builds a game of `variant` from its fixed starting array.
pub fn create_starting_position(variant: Variant) -> Result<Game, GameError> {
    let fen = variant
        .rules()
        .starting_fen()
        .ok_or(GameError::NoStartingPosition(variant))?;
    create_from_fen(fen, variant)
}

/// Declarative game setup, typically read from a TOML file.
///
/// ```toml
/// variant = "crazyhouse"
/// fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
/// update_eco_headers = true
///
/// [headers]
/// White = "Alice"
/// Black = "Bob"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Starting FEN. Defaults to the variant's starting position.
    #[serde(default)]
    pub fen: Option<String>,
    /// Whether committed opening moves consult the ECO classifier.
    #[serde(default)]
    pub update_eco_headers: bool,
    /// Extra PGN tags, applied after the setup tags.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Builds a game from a [`GameConfig`].
pub fn create_from_config(config: &GameConfig) -> Result<Game, GameError> {
    let mut game = match &config.fen {
        Some(fen) => create_from_fen(fen, config.variant)?,
        None => create_starting_position(config.variant)?,
    };
    game.set_flag(GameFlags::UPDATING_ECO_HEADERS, config.update_eco_headers);
    for (name, value) in &config.headers {
        game.set_header(name.as_str(), value.as_str());
    }
    Ok(game)
}
