//! History navigation over a game.
//!
//! A [`GameCursor`] owns a master [`Game`] and a cursor into its move
//! history. Navigating never touches the master: the cursor views a detached
//! copy rolled back to the requested ply. Depending on the [`CursorMode`],
//! new moves go to the master or to a branch that is later committed or
//! reverted.
//!
//! The cursor dereferences to the game it currently shows, read-only. Board
//! edits (`set_piece` and friends) are not reachable through it.

use crate::{Game, GameError, GameResult, MoveList};
use chess_core::{Move, PieceType, Square};
use std::ops::Deref;
use tracing::debug;

/// Where moves made through the cursor are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Moves go to the master. A cursor browsing history stays where it is;
    /// a cursor at the last position follows the game.
    #[default]
    MakeMovesOnMaster,
    /// Moves go to the master and the cursor jumps to the last position.
    MakeMovesOnMasterSetCursorToLast,
    /// Moves go to a branch cut from the cursor position. The master is left
    /// alone until [`GameCursor::commit`] or [`GameCursor::revert`].
    MakeMovesOnCursor,
}

/// A rolled-back copy of the master.
#[derive(Debug, Clone)]
struct View {
    index: usize,
    game: Game,
}

#[derive(Debug, Clone)]
enum State {
    /// The master is authoritative. `view` is `None` when the cursor is at
    /// the last position.
    Live { master: Game, view: Option<View> },
    /// Moves were made on a copy. `backup` is the untouched master.
    Branched {
        backup: Game,
        cursor: Game,
        branched_at: usize,
    },
}

/// Read/navigate/branch wrapper over a game's history.
#[derive(Debug, Clone)]
pub struct GameCursor {
    mode: CursorMode,
    state: State,
}

impl GameCursor {
    /// Wraps `master` with the cursor at its last position.
    pub fn new(master: Game, mode: CursorMode) -> Self {
        GameCursor {
            mode,
            state: State::Live { master, view: None },
        }
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Changes the mode. A pending branch keeps receiving moves until it is
    /// committed or reverted.
    pub fn set_mode(&mut self, mode: CursorMode) {
        self.mode = mode;
    }

    /// The master game. While branched this is the game as it was before
    /// the branch.
    pub fn master(&self) -> &Game {
        match &self.state {
            State::Live { master, .. } => master,
            State::Branched { backup, .. } => backup,
        }
    }

    /// The game at the cursor.
    pub fn current(&self) -> &Game {
        match &self.state {
            State::Live {
                view: Some(view), ..
            } => &view.game,
            State::Live { master, .. } => master,
            State::Branched { cursor, .. } => cursor,
        }
    }

    pub fn is_branched(&self) -> bool {
        matches!(self.state, State::Branched { .. })
    }

    /// Half-move index of the cursor, counted from the start of the game.
    pub fn index(&self) -> usize {
        match &self.state {
            State::Live {
                view: Some(view), ..
            } => view.index,
            State::Live { master, .. } => master.moves().len(),
            State::Branched { cursor, .. } => cursor.moves().len(),
        }
    }

    /// Number of half-moves in the game being shown.
    pub fn len(&self) -> usize {
        match &self.state {
            State::Live { master, .. } => master.moves().len(),
            State::Branched { cursor, .. } => cursor.moves().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- queries at the cursor -----------------------------------------
    //
    // Legality is tested by making and unmaking moves, so these work on a
    // scratch copy of the game at the cursor.

    /// Legal moves at the cursor position.
    pub fn legal_moves(&self) -> MoveList {
        self.current().detached().legal_moves()
    }

    pub fn is_checkmate(&self) -> bool {
        self.current().detached().is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.current().detached().is_stalemate()
    }

    /// The result of the game if the cursor position ends it.
    pub fn outcome(&self) -> Option<GameResult> {
        self.current().detached().outcome()
    }

    /// SAN for `mv` at the cursor position.
    pub fn san(&self, mv: &Move) -> String {
        self.current().detached().san(mv)
    }

    /// Unwraps the master, discarding any uncommitted branch.
    pub fn into_master(self) -> Game {
        match self.state {
            State::Live { master, .. } => master,
            State::Branched { backup, .. } => backup,
        }
    }

    // ---- navigation ----------------------------------------------------

    /// Moves the cursor to half-move `index`.
    pub fn set_cursor(&mut self, index: usize) -> Result<(), GameError> {
        let State::Live { master, view } = &mut self.state else {
            return Err(GameError::CursorBranched);
        };
        let len = master.moves().len();
        if index > len {
            return Err(GameError::CursorOutOfRange { index, len });
        }
        if index == len {
            *view = None;
            return Ok(());
        }
        if view.as_ref().is_some_and(|v| v.index == index) {
            return Ok(());
        }
        let mut game = master.detached();
        for _ in index..len {
            game.rollback()?;
        }
        *view = Some(View { index, game });
        Ok(())
    }

    pub fn first(&mut self) -> Result<(), GameError> {
        self.set_cursor(0)
    }

    pub fn last(&mut self) -> Result<(), GameError> {
        let len = self.len();
        self.set_cursor(len)
    }

    /// Steps one half-move back. Returns false at the start of the game.
    pub fn back(&mut self) -> Result<bool, GameError> {
        if self.is_branched() {
            return Err(GameError::CursorBranched);
        }
        match self.index().checked_sub(1) {
            Some(index) => self.set_cursor(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Steps one half-move forward. Returns false at the last position.
    pub fn forward(&mut self) -> Result<bool, GameError> {
        if self.is_branched() {
            return Err(GameError::CursorBranched);
        }
        let index = self.index();
        if index >= self.len() {
            return Ok(false);
        }
        self.set_cursor(index + 1).map(|_| true)
    }

    // ---- branch lifecycle ----------------------------------------------

    /// Promotes the branch to master. Returns false if there was no branch.
    pub fn commit(&mut self) -> bool {
        if !self.is_branched() {
            return false;
        }
        self.transition(|state| match state {
            State::Branched {
                backup, mut cursor, ..
            } => {
                cursor.eco = backup.eco;
                cursor.partner = backup.partner;
                debug!(moves = cursor.moves().len(), "cursor branch committed");
                State::Live {
                    master: cursor,
                    view: None,
                }
            }
            live => live,
        });
        true
    }

    /// Drops the branch and restores the master, with the cursor back where
    /// the branch started. Returns false if there was no branch.
    pub fn revert(&mut self) -> bool {
        let State::Branched { branched_at, .. } = self.state else {
            return false;
        };
        self.transition(|state| match state {
            State::Branched { backup, .. } => State::Live {
                master: backup,
                view: None,
            },
            live => live,
        });
        debug!(branched_at, "cursor branch reverted");
        // The backup still holds every move up to `branched_at`.
        let restored = self.set_cursor(branched_at);
        debug_assert!(restored.is_ok(), "revert lost the branch point: {:?}", restored);
        true
    }

    // ---- moves -----------------------------------------------------------

    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<Move, GameError> {
        self.apply_with(|game| game.make_move(from, to, promotion))
    }

    pub fn make_san_move(&mut self, text: &str) -> Result<Move, GameError> {
        self.apply_with(|game| game.make_san_move(text))
    }

    pub fn make_lan_move(&mut self, text: &str) -> Result<Move, GameError> {
        self.apply_with(|game| game.make_lan_move(text))
    }

    pub fn make_drop(&mut self, kind: PieceType, to: Square) -> Result<Move, GameError> {
        self.apply_with(|game| game.make_drop(kind, to))
    }

    /// Makes `mv` without a legality check.
    pub fn force_move(&mut self, mv: Move) {
        let _ = self.apply_with(|game| {
            game.force_move(mv);
            Ok(mv)
        });
    }

    /// Takes back the last move of the game being played.
    pub fn rollback(&mut self) -> Result<Move, GameError> {
        self.apply_with(|game| game.rollback())
    }

    /// Runs a move operation on the game this mode targets. A failed
    /// operation leaves the cursor as it was.
    fn apply_with(
        &mut self,
        op: impl FnOnce(&mut Game) -> Result<Move, GameError>,
    ) -> Result<Move, GameError> {
        let mode = self.mode;
        match &mut self.state {
            State::Branched { cursor, .. } => op(cursor),
            State::Live { .. } if mode == CursorMode::MakeMovesOnCursor => {
                let branched_at = self.index();
                // The branch classifies openings but sends nothing to a
                // bughouse partner until it is committed.
                let mut cursor = self.current().detached();
                cursor.eco = self.master().eco.clone();
                let mv = op(&mut cursor)?;
                self.transition(|state| match state {
                    State::Live { master, .. } => State::Branched {
                        backup: master,
                        cursor,
                        branched_at,
                    },
                    branched => branched,
                });
                debug!(branched_at, "cursor branched");
                Ok(mv)
            }
            State::Live { master, view } => {
                let mv = op(master)?;
                let len = master.moves().len();
                let stale = view.as_ref().is_some_and(|v| v.index >= len);
                if mode == CursorMode::MakeMovesOnMasterSetCursorToLast || stale {
                    *view = None;
                }
                Ok(mv)
            }
        }
    }

    fn transition(&mut self, change: impl FnOnce(State) -> State) {
        let variant = self.master().variant();
        let placeholder = State::Live {
            master: Game::empty(variant),
            view: None,
        };
        let state = std::mem::replace(&mut self.state, placeholder);
        self.state = change(state);
    }
}

impl Deref for GameCursor {
    type Target = Game;

    fn deref(&self) -> &Game {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::create_starting_position;
    use crate::{BughouseLink, EcoClassifier, EcoEntry, GameFlags, Variant};
    use chess_core::{Color, Fen, PieceType};
    use std::sync::Arc;

    fn played(sans: &[&str]) -> Game {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        for san in sans {
            game.make_san_move(san).unwrap();
        }
        game
    }

    const OPENING: [&str; 4] = ["e4", "e5", "Nf3", "Nc6"];

    #[test]
    fn starts_at_last_position() {
        let cursor = GameCursor::new(played(&OPENING), CursorMode::default());
        assert_eq!(cursor.index(), 4);
        assert_eq!(cursor.len(), 4);
        assert_eq!(cursor.to_fen(), played(&OPENING).to_fen());
    }

    #[test]
    fn navigation_leaves_master_alone() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::default());
        cursor.set_cursor(2).unwrap();
        assert_eq!(cursor.to_fen(), played(&OPENING[..2]).to_fen());
        assert_eq!(cursor.master().moves().len(), 4);

        cursor.first().unwrap();
        assert_eq!(cursor.to_fen(), Fen::STARTPOS);
        assert!(!cursor.back().unwrap());
        assert!(cursor.forward().unwrap());
        assert_eq!(cursor.index(), 1);

        cursor.last().unwrap();
        assert!(!cursor.forward().unwrap());
        assert_eq!(
            cursor.set_cursor(5),
            Err(GameError::CursorOutOfRange { index: 5, len: 4 })
        );
    }

    #[test]
    fn master_mode_keeps_a_browsing_cursor_in_place() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnMaster);
        cursor.set_cursor(2).unwrap();
        cursor.make_san_move("Bb5").unwrap();
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.master().moves().len(), 5);

        cursor.last().unwrap();
        cursor.make_san_move("a6").unwrap();
        assert_eq!(cursor.index(), 6);
    }

    #[test]
    fn set_cursor_to_last_mode_follows_the_game() {
        let mut cursor =
            GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnMasterSetCursorToLast);
        cursor.set_cursor(1).unwrap();
        cursor.make_san_move("Bb5").unwrap();
        assert_eq!(cursor.index(), 5);
        assert_eq!(cursor.last_move().map(|m| m.piece.kind), Some(PieceType::Bishop));
    }

    #[test]
    fn rollback_on_master_clamps_a_stale_view() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnMaster);
        cursor.set_cursor(3).unwrap();
        cursor.rollback().unwrap();
        assert_eq!(cursor.index(), 3);
        assert_eq!(cursor.to_fen(), played(&OPENING[..3]).to_fen());
    }

    #[test]
    fn branch_then_revert() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnCursor);
        cursor.set_cursor(2).unwrap();
        cursor.make_san_move("Nc3").unwrap();
        assert!(cursor.is_branched());
        assert_eq!(cursor.index(), 3);
        assert_eq!(cursor.master().moves().len(), 4);
        assert_eq!(cursor.first(), Err(GameError::CursorBranched));
        assert_eq!(cursor.back(), Err(GameError::CursorBranched));

        assert!(cursor.revert());
        assert!(!cursor.is_branched());
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.master().to_fen(), played(&OPENING).to_fen());
        assert!(!cursor.revert());
    }

    #[test]
    fn branch_then_commit() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnCursor);
        cursor.set_cursor(2).unwrap();
        cursor.make_san_move("Nc3").unwrap();
        cursor.make_san_move("Nf6").unwrap();
        assert!(cursor.commit());
        assert_eq!(cursor.master().moves().len(), 4);
        assert_eq!(
            cursor.master().to_fen(),
            played(&["e4", "e5", "Nc3", "Nf6"]).to_fen()
        );
        assert_eq!(cursor.index(), 4);
        assert!(!cursor.commit());
    }

    #[test]
    fn failed_move_does_not_branch() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnCursor);
        assert!(cursor.make_san_move("Ke3").is_err());
        assert!(!cursor.is_branched());
        assert_eq!(cursor.len(), 4);
    }

    #[test]
    fn into_master_discards_branch() {
        let mut cursor = GameCursor::new(played(&OPENING), CursorMode::MakeMovesOnCursor);
        cursor.make_san_move("Bc4").unwrap();
        let master = cursor.into_master();
        assert_eq!(master.moves().len(), 4);
    }

    #[test]
    fn queries_at_a_browsed_position() {
        let fools_mate = played(&["f3", "e5", "g4", "Qh4"]);
        let mut cursor = GameCursor::new(fools_mate, CursorMode::default());
        assert!(cursor.is_checkmate());
        assert_eq!(cursor.outcome(), Some(GameResult::BlackWins));

        cursor.set_cursor(3).unwrap();
        assert!(!cursor.is_checkmate());
        assert!(!cursor.is_stalemate());
        assert_eq!(cursor.outcome(), None);
        let legal = cursor.legal_moves();
        assert!(legal.iter().any(|m| cursor.san(m) == "Qh4#"));
        assert_eq!(cursor.master().moves().len(), 4);
    }

    struct KingsPawn;

    impl EcoClassifier for KingsPawn {
        fn classify(&self, game: &Game) -> Option<EcoEntry> {
            match game.last_move()?.to_lan().as_str() {
                "e2e4" => Some(EcoEntry::new("B00", "King's Pawn")),
                "e7e5" => Some(EcoEntry::new("C20", "King's Pawn Game")),
                _ => None,
            }
        }
    }

    #[test]
    fn commit_keeps_classifier_and_partner() {
        let (a, b) = BughouseLink::pair();
        let mut game = create_starting_position(Variant::Bughouse).unwrap();
        game.link_partner(a);
        game.set_eco_classifier(Arc::new(KingsPawn));
        game.set_flag(GameFlags::UPDATING_ECO_HEADERS, true);
        let mut partner = create_starting_position(Variant::Bughouse).unwrap();
        partner.link_partner(b);

        let mut cursor = GameCursor::new(game, CursorMode::MakeMovesOnCursor);
        cursor.make_san_move("e4").unwrap();
        assert_eq!(cursor.header("ECO"), Some("B00"));
        assert!(cursor.commit());
        assert!(cursor.master().partner().is_some());
        assert_eq!(cursor.master().header("ECO"), Some("B00"));

        cursor.set_mode(CursorMode::MakeMovesOnMaster);
        cursor.make_san_move("e5").unwrap();
        assert_eq!(cursor.master().header("ECO"), Some("C20"));

        cursor.make_san_move("d4").unwrap();
        cursor.make_san_move("exd4").unwrap();
        assert_eq!(partner.sync_partner_drops(), 1);
        assert_eq!(partner.drop_count(Color::White, PieceType::Pawn), 1);
    }

    #[test]
    fn reverted_branch_sends_nothing() {
        let (a, b) = BughouseLink::pair();
        let mut game = create_starting_position(Variant::Bughouse).unwrap();
        game.link_partner(a);
        let mut partner = create_starting_position(Variant::Bughouse).unwrap();
        partner.link_partner(b);

        let mut cursor = GameCursor::new(game, CursorMode::MakeMovesOnCursor);
        for san in ["e4", "d5", "exd5"] {
            cursor.make_san_move(san).unwrap();
        }
        assert!(cursor.revert());
        assert_eq!(partner.sync_partner_drops(), 0);
        assert!(cursor.master().partner().is_some());
    }
}
