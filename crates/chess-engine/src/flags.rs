//! Game state flags.

use bitflags::bitflags;

bitflags! {
    /// A bitmask of game state flags.
    ///
    /// The rules engine reads the first three. The rest are bookkeeping for
    /// connectors that track what a session is doing with the game.
    #[derive(Default)]
    pub struct GameFlags: u32 {
        /// Pieces can be dropped from pools (crazyhouse, bughouse).
        const DROPPABLE = 1 << 0;
        /// Castling files come from the starting setup.
        const FISCHER_RANDOM = 1 << 1;
        /// Committed moves in the opening consult the ECO classifier.
        const UPDATING_ECO_HEADERS = 1 << 2;
        const ACTIVE = 1 << 3;
        const EXAMINING = 1 << 4;
        const SETUP = 1 << 5;
        const PLAYING = 1 << 6;
        const OBSERVING = 1 << 7;
        const IS_CLOCK_TICKING = 1 << 8;
    }
}
