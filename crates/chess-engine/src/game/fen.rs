//! Loading and printing positions as FEN.

use super::Game;
use crate::castling::rights_masks;
use crate::{GameError, GameFlags, Variant};
use chess_core::{CastleSide, Color, Fen, Piece, PieceType, Square};
use tracing::debug;

/// Non-king material of one side in the opening array.
const fn standard_count(kind: PieceType) -> i32 {
    match kind {
        PieceType::Pawn => 8,
        PieceType::Knight | PieceType::Bishop | PieceType::Rook => 2,
        PieceType::Queen => 1,
        PieceType::King => 0,
    }
}

/// Pool letter order when printing holdings.
const HOLDINGS_ORDER: [PieceType; 5] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Pawn,
];

impl Game {
    /// Sets up a game from `text` under `variant`'s rules.
    pub(crate) fn from_fen(text: &str, variant: Variant) -> Result<Game, GameError> {
        let fen = Fen::parse(text)?;
        let rules = variant.rules();
        let mut game = Game::empty(variant);

        for sq in Square::all() {
            if let Some(piece) = fen.board[sq.index() as usize] {
                game.put_piece(sq, piece);
            }
        }
        game.side_to_move = fen.side_to_move;

        if game.flags.contains(GameFlags::DROPPABLE) {
            match &fen.holdings {
                Some(holdings) => {
                    for piece in holdings {
                        game.add_to_pool(piece.color, piece.kind, 1);
                    }
                }
                None => game.derive_pools(),
            }
        }

        for color in Color::ALL {
            game.castle_geometry[color.index()] = rules.castle_geometry(&fen.board, color);
        }
        for &letter in &fen.castling {
            game.grant_castling_letter(letter);
        }
        game.castle_masks = rights_masks(&game.castle_geometry);

        game.ep_square = fen.en_passant;
        game.initial_ep_square = fen.en_passant;
        game.fifty_move_count = fen.halfmove_clock;
        game.start_fullmove = fen.fullmove_number.max(1);
        game.start_side = fen.side_to_move;

        game.refresh_game_hash();
        let slot = game.rep_slot();
        game.rep_counts[slot] = 1;
        game.initial_fen = game.to_fen();

        if rules.starting_fen() != Some(text.trim()) {
            game.headers.set("FEN", game.initial_fen.clone());
            game.headers.set("SetUp", "1");
        }
        if variant != Variant::Classic {
            game.headers.set("Variant", variant.name());
        }

        if !rules.is_legal_position(&game) {
            return Err(GameError::IllegalPosition {
                fen: text.to_string(),
            });
        }
        Ok(game)
    }

    /// FEN of the current position.
    ///
    /// Drop variants mark promoted pieces with `~` and append the pools in
    /// brackets, white first.
    pub fn to_fen(&self) -> String {
        let holdings = self.flags.contains(GameFlags::DROPPABLE).then(|| {
            let mut pieces = Vec::new();
            for color in Color::ALL {
                for kind in HOLDINGS_ORDER {
                    let n = self.drop_count(color, kind).max(0);
                    pieces.extend((0..n).map(|_| Piece::new(kind, color)));
                }
            }
            pieces
        });

        Fen {
            board: self.board,
            side_to_move: self.side_to_move,
            castling: self.castling_letters(),
            en_passant: self.ep_square,
            holdings,
            halfmove_clock: self.fifty_move_count,
            fullmove_number: self.fullmove_number(),
        }
        .to_string()
    }

    fn castling_letters(&self) -> Vec<char> {
        let mut letters = Vec::with_capacity(4);
        for color in Color::ALL {
            let geometry = &self.castle_geometry[color.index()];
            for h_side in [true, false] {
                let Some(side) = geometry.side_toward(h_side) else {
                    continue;
                };
                if !self.castling.has(color, side) {
                    continue;
                }
                let letter = match geometry.path(side) {
                    Some(path) if path.explicit => char::from(b'a' + path.rook_from),
                    _ if h_side => 'k',
                    _ => 'q',
                };
                letters.push(match color {
                    Color::White => letter.to_ascii_uppercase(),
                    Color::Black => letter,
                });
            }
        }
        letters
    }

    /// Grants the right named by one FEN castling letter, if the king and
    /// rook stand where the geometry needs them.
    fn grant_castling_letter(&mut self, letter: char) {
        let color = if letter.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let geometry = &mut self.castle_geometry[color.index()];
        let side = match letter.to_ascii_lowercase() {
            'k' => geometry.side_toward(true),
            'q' => geometry.side_toward(false),
            f => {
                let file = f as u8 - b'a';
                match geometry.side_for_rook_file(file) {
                    Some(side) => {
                        geometry.mark_explicit(side);
                        Some(side)
                    }
                    None => {
                        let side = geometry.side_toward(file > geometry.king_file);
                        if let Some(side) = side {
                            geometry.set_rook_file(side, file);
                        }
                        side
                    }
                }
            }
        };

        match side {
            Some(side) if self.castle_pieces_in_place(color, side) => {
                self.castling.grant(color, side);
            }
            _ => debug!(%letter, %color, "dropping castling right without king or rook"),
        }
    }

    fn castle_pieces_in_place(&self, color: Color, side: CastleSide) -> bool {
        let geometry = &self.castle_geometry[color.index()];
        let Some(path) = geometry.path(side) else {
            return false;
        };
        let rank = color.back_rank() * 8;
        let king = self.piece_at(geometry.king_square(color));
        let rook = self.piece_at(Square::from_index_unchecked(rank + path.rook_from));
        king == Some(Piece::new(PieceType::King, color))
            && rook.is_some_and(|p| p.color == color && p.kind == PieceType::Rook)
    }

    /// Fills empty pools from material missing off the board.
    ///
    /// Promoted pieces count as pawns, and extra pieces of a type are taken
    /// to be promotions too. What one side is missing sits in the other
    /// side's pool.
    fn derive_pools(&mut self) {
        for color in Color::ALL {
            let mut present = [0i32; 6];
            for sq in self.color_bitboard(color) {
                if let Some(piece) = self.piece_at(sq) {
                    present[piece.pool_kind().index()] += 1;
                }
            }

            let mut missing = [0i32; 6];
            let mut excess = 0;
            for kind in PieceType::ALL {
                let diff = standard_count(kind) - present[kind.index()];
                if diff >= 0 {
                    missing[kind.index()] = diff;
                } else if kind != PieceType::King {
                    excess -= diff;
                }
            }
            missing[PieceType::Pawn.index()] = (missing[PieceType::Pawn.index()] - excess).max(0);

            for kind in PieceType::ALL {
                let n = missing[kind.index()];
                if n > 0 {
                    self.set_pool(color.opposite(), kind, n);
                }
            }
        }
    }
}
