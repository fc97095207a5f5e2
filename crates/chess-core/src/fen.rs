//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! This module is purely syntactic. It accepts the six standard fields plus two
//! extensions used by drop variants:
//! - a `~` after a piece letter marks a promotion-derived piece
//! - holdings in brackets after the placement (`.../RNBQKBNR[Qp]`) or as a
//!   ninth placement rank (`.../RNBQKBNR/Qp`)
//!
//! Castling letters may be `KQkq` or Shredder/X-FEN file letters (`HAha`).
//! Whether the result describes a legal position is the engine's concern.

use crate::{Color, Piece, PieceType, Square};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid holdings: {0}")]
    InvalidHoldings(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A parsed FEN record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Board contents indexed by square (a1 = 0).
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    /// Castling letters in input order. Empty for `-`.
    pub castling: Vec<char>,
    pub en_passant: Option<Square>,
    /// Explicit drop pools, if the FEN carried them.
    pub holdings: Option<Vec<Piece>>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let (board, holdings) = parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = parse_castling(parts[2])?;
        let en_passant = parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(Fen {
            board,
            side_to_move,
            castling,
            en_passant,
            holdings,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Writes the placement field, marking promoted pieces with `~` when
    /// `mark_promoted` is set.
    pub fn placement(board: &[Option<Piece>; 64], mark_promoted: bool) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match board[(rank * 8 + file) as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.to_fen_char());
                        if mark_promoted && piece.promoted {
                            out.push('~');
                        }
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl Default for Fen {
    fn default() -> Self {
        let mut board = [None; 64];
        let back = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, kind) in back.into_iter().enumerate() {
            board[file] = Some(Piece::new(kind, Color::White));
            board[8 + file] = Some(Piece::new(PieceType::Pawn, Color::White));
            board[48 + file] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board[56 + file] = Some(Piece::new(kind, Color::Black));
        }
        Fen {
            board,
            side_to_move: Color::White,
            castling: vec!['K', 'Q', 'k', 'q'],
            en_passant: None,
            holdings: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let drops = self.holdings.is_some();
        f.write_str(&Fen::placement(&self.board, drops))?;
        if let Some(holdings) = &self.holdings {
            f.write_str("[")?;
            for piece in holdings {
                write!(f, "{}", piece.to_fen_char())?;
            }
            f.write_str("]")?;
        }
        write!(f, " {} ", self.side_to_move.fen_char())?;
        if self.castling.is_empty() {
            f.write_str("-")?;
        } else {
            for c in &self.castling {
                write!(f, "{}", c)?;
            }
        }
        match self.en_passant {
            Some(sq) => write!(f, " {}", sq)?,
            None => f.write_str(" -")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

fn parse_placement(field: &str) -> Result<([Option<Piece>; 64], Option<Vec<Piece>>), FenError> {
    let (placement, bracketed) = match field.find('[') {
        Some(open) => {
            let inner = field[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| FenError::InvalidHoldings(field[open..].to_string()))?;
            (&field[..open], Some(inner))
        }
        None => (field, None),
    };

    let mut ranks: Vec<&str> = placement.split('/').collect();
    let mut holdings_text = bracketed;
    if ranks.len() == 9 && holdings_text.is_none() {
        holdings_text = ranks.pop();
    }
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut board: [Option<Piece>; 64] = [None; 64];
    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file: u8 = 0;
        let mut last: Option<usize> = None;
        for c in rank_text.chars() {
            if let Some(n) = c.to_digit(10).filter(|n| (1..=8).contains(n)) {
                file += n as u8;
                last = None;
            } else if c == '~' {
                let idx = last.take().ok_or_else(|| {
                    FenError::InvalidPiecePlacement(format!(
                        "'~' without a piece in rank {}",
                        rank + 1
                    ))
                })?;
                if let Some(piece) = board[idx].as_mut() {
                    piece.promoted = true;
                }
            } else if let Some(piece) = Piece::from_fen_char(c) {
                if file >= 8 {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "rank {} has more than 8 squares",
                        rank + 1
                    )));
                }
                let idx = (rank * 8 + file) as usize;
                board[idx] = Some(piece);
                last = Some(idx);
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                rank + 1,
                file
            )));
        }
    }

    let holdings = match holdings_text {
        Some(text) => Some(parse_holdings(text)?),
        None => None,
    };
    Ok((board, holdings))
}

fn parse_holdings(text: &str) -> Result<Vec<Piece>, FenError> {
    if text == "-" {
        return Ok(Vec::new());
    }
    text.chars()
        .map(|c| match Piece::from_fen_char(c) {
            Some(p) if p.kind != PieceType::King => Ok(p),
            _ => Err(FenError::InvalidHoldings(format!(
                "invalid character '{}'",
                c
            ))),
        })
        .collect()
}

fn parse_castling(field: &str) -> Result<Vec<char>, FenError> {
    if field == "-" {
        return Ok(Vec::new());
    }
    let mut letters = Vec::with_capacity(4);
    for c in field.chars() {
        let valid = matches!(c, 'K' | 'Q' | 'k' | 'q' | 'A'..='H' | 'a'..='h');
        if !valid {
            return Err(FenError::InvalidCastlingRights(format!(
                "invalid character '{}'",
                c
            )));
        }
        if letters.contains(&c) {
            return Err(FenError::InvalidCastlingRights(format!(
                "duplicate character '{}'",
                c
            )));
        }
        letters.push(c);
    }
    Ok(letters)
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(field) {
        Some(sq) if sq.rank_index() == 2 || sq.rank_index() == 5 => Ok(Some(sq)),
        _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
    }
}
