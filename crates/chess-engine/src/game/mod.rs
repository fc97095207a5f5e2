//! The game aggregate.
//!
//! A [`Game`] owns the board in two redundant forms, a dense 64-entry piece
//! array and per-color/per-type bitboards, and keeps them in lockstep through
//! [`Game::put_piece`] and [`Game::remove_piece`]. Every move goes through
//! [`Game::force_move`] and is undone by [`Game::rollback`]; the pair is
//! exactly reversible, including both Zobrist hashes, the repetition table,
//! castling rights, drop pools and ECO headers.
//!
//! Legal moves are found by making each pseudo-legal candidate, asking the
//! variant's rules whether the result is a legal position, and rolling back.

mod fen;
mod make;
mod pgn;

pub use pgn::PgnHeaders;

pub(crate) use make::HistoryEntry;

use crate::bughouse::BughouseLink;
use crate::castling::{CastleGeometry, CastlingRights};
use crate::eco::EcoClassifier;
use crate::rules::{GameResult, VariantRules};
use crate::san::{self, SanError};
use crate::zobrist::ZOBRIST;
use crate::{Bitboard, GameError, GameFlags, MoveList, Variant};
use chess_core::{Color, Move, Piece, PieceType, Square};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of slots in the repetition table.
pub const REPETITION_TABLE_SIZE: usize = 4096;

/// A game of chess in one of the supported variants.
#[derive(Clone)]
pub struct Game {
    pub(crate) variant: Variant,
    pub(crate) board: [Option<Piece>; 64],
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) occupied: Bitboard,
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) castle_geometry: [CastleGeometry; 2],
    pub(crate) castle_masks: [u8; 64],
    pub(crate) ep_square: Option<Square>,
    pub(crate) initial_ep_square: Option<Square>,
    pub(crate) fifty_move_count: u32,
    pub(crate) half_move_count: u32,
    pub(crate) start_fullmove: u32,
    pub(crate) start_side: Color,
    pub(crate) drop_counts: [[i32; 6]; 2],
    pub(crate) piece_counts: [[u32; 6]; 2],
    pub(crate) position_hash: u64,
    pub(crate) game_hash: u64,
    pub(crate) rep_counts: Box<[u8; REPETITION_TABLE_SIZE]>,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) headers: PgnHeaders,
    pub(crate) flags: GameFlags,
    pub(crate) initial_fen: String,
    pub(crate) eco: Option<Arc<dyn EcoClassifier>>,
    pub(crate) partner: Option<BughouseLink>,
}

impl Game {
    /// An empty board for `variant` with no history.
    pub(crate) fn empty(variant: Variant) -> Self {
        let mut flags = GameFlags::empty();
        let rules = variant.rules();
        flags.set(GameFlags::DROPPABLE, rules.drops());
        flags.set(
            GameFlags::FISCHER_RANDOM,
            matches!(variant, Variant::FischerRandom | Variant::Wild),
        );
        Game {
            variant,
            board: [None; 64],
            pieces: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            castle_geometry: [CastleGeometry::STANDARD; 2],
            castle_masks: [0; 64],
            ep_square: None,
            initial_ep_square: None,
            fifty_move_count: 0,
            half_move_count: 0,
            start_fullmove: 1,
            start_side: Color::White,
            drop_counts: [[0; 6]; 2],
            piece_counts: [[0; 6]; 2],
            position_hash: 0,
            game_hash: 0,
            rep_counts: Box::new([0; REPETITION_TABLE_SIZE]),
            history: Vec::new(),
            headers: PgnHeaders::default(),
            flags,
            initial_fen: String::new(),
            eco: None,
            partner: None,
        }
    }

    // ---- queries -------------------------------------------------------

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn rules(&self) -> &'static dyn VariantRules {
        self.variant.rules()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index() as usize]
    }

    /// The dense board array, indexed by square (a1 = 0).
    #[inline]
    pub fn board(&self) -> &[Option<Piece>; 64] {
        &self.board
    }

    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceType) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn color_bitboard(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn castle_geometry(&self, color: Color) -> &CastleGeometry {
        &self.castle_geometry[color.index()]
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// The en passant square the game started with.
    #[inline]
    pub fn initial_ep_square(&self) -> Option<Square> {
        self.initial_ep_square
    }

    /// Half-moves since the last pawn move, capture or drop.
    #[inline]
    pub fn fifty_move_count(&self) -> u32 {
        self.fifty_move_count
    }

    /// Half-moves made since the game was set up.
    #[inline]
    pub fn half_move_count(&self) -> u32 {
        self.half_move_count
    }

    pub fn fullmove_number(&self) -> u32 {
        let offset = u32::from(self.start_side == Color::Black);
        self.start_fullmove + (self.half_move_count + offset) / 2
    }

    #[inline]
    pub fn drop_count(&self, color: Color, kind: PieceType) -> i32 {
        self.drop_counts[color.index()][kind.index()]
    }

    #[inline]
    pub fn piece_count(&self, color: Color, kind: PieceType) -> u32 {
        self.piece_counts[color.index()][kind.index()]
    }

    /// Hash of piece placement and drop pools.
    #[inline]
    pub fn position_hash(&self) -> u64 {
        self.position_hash
    }

    /// Position hash folded with side to move, castling rights and en passant file.
    #[inline]
    pub fn game_hash(&self) -> u64 {
        self.game_hash
    }

    /// How often the current position hash (masked to the table size) has
    /// occurred among positions on the move stack, including this one.
    ///
    /// Distinct positions can share a slot, so this is an upper bound.
    #[inline]
    pub fn repetition_count(&self) -> u8 {
        self.rep_counts[self.rep_slot()]
    }

    #[inline]
    pub(crate) fn rep_slot(&self) -> usize {
        (self.position_hash as usize) & (REPETITION_TABLE_SIZE - 1)
    }

    /// Moves made so far, oldest first.
    pub fn moves(&self) -> impl DoubleEndedIterator<Item = &Move> + ExactSizeIterator {
        self.history.iter().map(|entry| &entry.mv)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last().map(|entry| &entry.mv)
    }

    #[inline]
    pub fn flags(&self) -> GameFlags {
        self.flags
    }

    pub fn set_flag(&mut self, flag: GameFlags, on: bool) {
        self.flags.set(flag, on);
    }

    #[inline]
    pub fn headers(&self) -> &PgnHeaders {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(name)
    }

    /// FEN of the position the game was set up from.
    pub fn initial_fen(&self) -> &str {
        &self.initial_fen
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.pieces(color, PieceType::King).any()
    }

    /// Returns true if any king of `color` is attacked by the other side.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.pieces(color, PieceType::King)
            .into_iter()
            .any(|sq| self.is_square_attacked(sq, color.opposite(), self.occupied))
    }

    /// Whether the side to move is in check under this variant's rules.
    pub fn is_in_check(&self) -> bool {
        self.rules().is_in_check(self, self.side_to_move)
    }

    /// Whether the side that just moved left the position legal.
    pub fn is_legal_position(&self) -> bool {
        self.rules().is_legal_position(self)
    }

    /// All legal moves for the side to move.
    ///
    /// Each pseudo-legal candidate is made, checked and rolled back, so the
    /// game is borrowed mutably but left unchanged.
    pub fn legal_moves(&mut self) -> MoveList {
        let rules = self.rules();
        let candidates = self.pseudo_legal_moves();
        let mut legal = MoveList::new();
        for mv in &candidates {
            self.apply(*mv, true);
            if rules.is_legal_position(self) {
                legal.push(*mv);
            }
            self.undo();
        }
        rules.restrict_legal(legal)
    }

    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check() && self.legal_moves().is_empty()
    }

    /// The result of the game if the current position ends it.
    pub fn outcome(&mut self) -> Option<GameResult> {
        self.rules().outcome(self)
    }

    // ---- move input ----------------------------------------------------

    /// Finds the legal move from `from` to `to`.
    ///
    /// A missing promotion piece defaults to a queen. In Fischer Random and
    /// Wild, a king moving onto its own castling rook selects that castle.
    pub fn find_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Option<Move> {
        let legal = self.legal_moves();
        let promotion = promotion.unwrap_or(PieceType::Queen);
        let matches_promo = |mv: &Move| mv.promotion().map_or(true, |p| p == promotion);

        let ordinary = legal.iter().find(|mv| {
            mv.from == from
                && mv.to == to
                && !mv.is_drop()
                && mv.castle_side().is_none()
                && matches_promo(mv)
        });
        if let Some(mv) = ordinary {
            return Some(*mv);
        }
        let castle = legal
            .iter()
            .find(|mv| mv.from == from && mv.to == to && mv.castle_side().is_some());
        if let Some(mv) = castle {
            return Some(*mv);
        }

        // King takes own rook.
        let color = self.side_to_move;
        let geometry = self.castle_geometry[color.index()];
        let own_rook = self
            .piece_at(to)
            .filter(|p| p.color == color && p.kind == PieceType::Rook);
        if own_rook.is_some() && to.rank_index() == color.back_rank() {
            let side = geometry.side_for_rook_file(to.file_index())?;
            return legal
                .iter()
                .find(|mv| mv.from == from && mv.castle_side() == Some(side))
                .copied();
        }
        None
    }

    /// Makes a legal move given by its squares.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<Move, GameError> {
        match self.find_move(from, to, promotion) {
            Some(mv) => {
                self.force_move(mv);
                Ok(mv)
            }
            None => {
                let mut input = format!("{}{}", from, to);
                if let Some(p) = promotion {
                    input.push(p.to_char());
                }
                Err(self.illegal(input))
            }
        }
    }

    /// Makes a move given in SAN (`Nf3`, `exd5`, `O-O`, `e8=Q`, `N@f3`).
    pub fn make_san_move(&mut self, text: &str) -> Result<Move, GameError> {
        let mv = san::san_to_move(self, text).map_err(|e| self.notation_error(text, e))?;
        self.force_move(mv);
        Ok(mv)
    }

    /// Makes a move given in coordinate notation (`e2e4`, `e7e8q`, `e2-e4`, `N@f3`).
    pub fn make_lan_move(&mut self, text: &str) -> Result<Move, GameError> {
        let mv = san::lan_to_move(self, text).map_err(|e| self.notation_error(text, e))?;
        self.force_move(mv);
        Ok(mv)
    }

    /// Drops a piece from the side to move's pool.
    pub fn make_drop(&mut self, kind: PieceType, to: Square) -> Result<Move, GameError> {
        let mv = Move::drop(kind, self.side_to_move, to);
        self.make_checked(mv)
    }

    /// Makes `mv` if it is legal in the current position.
    pub fn make_checked(&mut self, mv: Move) -> Result<Move, GameError> {
        if self.legal_moves().contains(&mv) {
            self.force_move(mv);
            Ok(mv)
        } else {
            Err(self.illegal(mv.to_lan()))
        }
    }

    /// SAN of a legal move in the current position.
    pub fn san(&mut self, mv: &Move) -> String {
        san::move_to_san(self, mv)
    }

    pub(crate) fn illegal(&self, input: impl Into<String>) -> GameError {
        GameError::IllegalMove {
            input: input.into(),
            position: self.to_string(),
        }
    }

    fn notation_error(&self, text: &str, err: SanError) -> GameError {
        match err {
            SanError::AmbiguousMove { candidates, .. } => GameError::AmbiguousMove {
                input: text.to_string(),
                candidates,
                position: self.to_string(),
            },
            _ => self.illegal(text),
        }
    }

    // ---- board primitives ----------------------------------------------

    /// Places `piece` on an empty square, updating bitboards, counts and the
    /// position hash.
    pub(crate) fn put_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.board[sq.index() as usize].is_none(), "{} occupied", sq);
        let (c, k) = (piece.color.index(), piece.kind.index());
        self.board[sq.index() as usize] = Some(piece);
        self.pieces[c][k].set(sq);
        self.colors[c].set(sq);
        self.occupied.set(sq);
        self.piece_counts[c][k] += 1;
        self.position_hash ^= ZOBRIST.piece(piece, sq);
    }

    /// Removes and returns the piece on `sq`.
    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.board[sq.index() as usize].take()?;
        let (c, k) = (piece.color.index(), piece.kind.index());
        self.pieces[c][k].clear(sq);
        self.colors[c].clear(sq);
        self.occupied.clear(sq);
        self.piece_counts[c][k] -= 1;
        self.position_hash ^= ZOBRIST.piece(piece, sq);
        Some(piece)
    }

    /// Sets a drop pool size, keeping the position hash in step.
    pub(crate) fn set_pool(&mut self, color: Color, kind: PieceType, count: i32) {
        let slot = &mut self.drop_counts[color.index()][kind.index()];
        self.position_hash ^= ZOBRIST.drop_pool(color, kind, *slot);
        *slot = count;
        self.position_hash ^= ZOBRIST.drop_pool(color, kind, count);
    }

    pub(crate) fn add_to_pool(&mut self, color: Color, kind: PieceType, delta: i32) {
        let count = self.drop_count(color, kind) + delta;
        if count < 0 {
            warn!(%color, %kind, count, "drop pool went negative");
        }
        self.set_pool(color, kind, count);
    }

    /// Recomputes the game hash from the position hash.
    pub(crate) fn refresh_game_hash(&mut self) {
        let mut hash = self.position_hash;
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move();
        }
        for index in self.castling.indices() {
            hash ^= ZOBRIST.castling(index);
        }
        if let Some(ep) = self.ep_square {
            hash ^= ZOBRIST.en_passant(ep.file_index());
        }
        self.game_hash = hash;
    }

    /// Position hash computed from scratch.
    pub(crate) fn full_position_hash(&self) -> u64 {
        let mut hash = 0;
        for sq in Square::all() {
            if let Some(piece) = self.piece_at(sq) {
                hash ^= ZOBRIST.piece(piece, sq);
            }
        }
        for color in Color::ALL {
            for kind in PieceType::ALL {
                hash ^= ZOBRIST.drop_pool(color, kind, self.drop_count(color, kind));
            }
        }
        hash
    }

    // ---- direct mutators -----------------------------------------------
    //
    // These edit the position outside of move history. Board edits start a
    // fresh history from the edited position.

    /// Puts `piece` on `sq`, replacing whatever stood there.
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.edit(|game| {
            game.remove_piece(sq);
            if let Some(piece) = piece {
                game.put_piece(sq, piece);
            }
        });
    }

    pub fn clear_square(&mut self, sq: Square) {
        self.set_piece(sq, None);
    }

    pub fn set_castling(&mut self, rights: CastlingRights) {
        self.edit(|game| game.castling = rights);
    }

    pub fn set_ep_square(&mut self, ep: Option<Square>) {
        self.edit(|game| game.ep_square = ep);
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.edit(|game| game.side_to_move = color);
    }

    /// Sets a drop pool size without touching move history.
    pub fn set_drop_count(&mut self, color: Color, kind: PieceType, count: i32) {
        let before = self.rep_slot();
        self.set_pool(color, kind, count);
        self.move_rep_slot(before);
        self.refresh_game_hash();
    }

    fn edit(&mut self, change: impl FnOnce(&mut Game)) {
        change(self);
        let fullmove = self.fullmove_number();
        self.history.clear();
        self.rep_counts.fill(0);
        self.half_move_count = 0;
        self.start_fullmove = fullmove;
        self.start_side = self.side_to_move;
        self.initial_ep_square = self.ep_square;
        self.refresh_game_hash();
        let slot = self.rep_slot();
        self.rep_counts[slot] = 1;
        self.initial_fen = self.to_fen();
        debug!(fen = %self.initial_fen, "position edited");
    }

    fn move_rep_slot(&mut self, before: usize) {
        let after = self.rep_slot();
        if before != after {
            self.rep_counts[before] = self.rep_counts[before].saturating_sub(1);
            self.rep_counts[after] = self.rep_counts[after].saturating_add(1);
        }
    }

    // ---- collaborators -------------------------------------------------

    pub fn set_eco_classifier(&mut self, classifier: Arc<dyn EcoClassifier>) {
        self.eco = Some(classifier);
    }

    pub fn clear_eco_classifier(&mut self) {
        self.eco = None;
    }

    /// Attaches a bughouse partner endpoint.
    pub fn link_partner(&mut self, link: BughouseLink) {
        self.partner = Some(link);
    }

    pub fn unlink_partner(&mut self) -> Option<BughouseLink> {
        self.partner.take()
    }

    pub fn partner(&self) -> Option<&BughouseLink> {
        self.partner.as_ref()
    }

    /// Adds pieces the partner board has sent to this board's pools.
    /// Returns the number of pieces received.
    pub fn sync_partner_drops(&mut self) -> i32 {
        let Some(link) = &self.partner else {
            return 0;
        };
        let incoming = link.take();
        let before = self.rep_slot();
        let mut received = 0;
        for color in Color::ALL {
            for kind in PieceType::ALL {
                let n = incoming[color.index()][kind.index()];
                if n != 0 {
                    self.add_to_pool(color, kind, n);
                    received += n;
                }
            }
        }
        if received != 0 {
            self.move_rep_slot(before);
            self.refresh_game_hash();
            debug!(received, "partner drops applied");
        }
        received
    }

    /// A copy with the same state but no collaborators attached.
    pub(crate) fn detached(&self) -> Game {
        let mut copy = self.clone();
        copy.eco = None;
        copy.partner = None;
        copy
    }
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && self.board == other.board
            && self.pieces == other.pieces
            && self.colors == other.colors
            && self.occupied == other.occupied
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.castle_geometry == other.castle_geometry
            && self.ep_square == other.ep_square
            && self.initial_ep_square == other.initial_ep_square
            && self.fifty_move_count == other.fifty_move_count
            && self.half_move_count == other.half_move_count
            && self.start_fullmove == other.start_fullmove
            && self.start_side == other.start_side
            && self.drop_counts == other.drop_counts
            && self.piece_counts == other.piece_counts
            && self.position_hash == other.position_hash
            && self.game_hash == other.game_hash
            && self.rep_counts == other.rep_counts
            && self.history == other.history
            && self.headers == other.headers
            && self.flags == other.flags
            && self.initial_fen == other.initial_fen
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("variant", &self.variant)
            .field("fen", &self.to_fen())
            .field("moves", &self.history.len())
            .field("flags", &self.flags)
            .field("eco", &self.eco.is_some())
            .field("partner", &self.partner.is_some())
            .finish()
    }
}

/// ASCII board, FEN and drop pools.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = self.board[(rank * 8 + file) as usize].map_or('.', |p| p.to_fen_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{} ({})", self.to_fen(), self.variant)?;
        if self.flags.contains(GameFlags::DROPPABLE) {
            for color in Color::ALL {
                write!(f, "\n{} pool:", color)?;
                for kind in PieceType::ALL {
                    let n = self.drop_count(color, kind);
                    if n != 0 {
                        write!(f, " {}x{}", n, kind.to_char().to_ascii_uppercase())?;
                    }
                }
            }
        }
        Ok(())
    }
}
