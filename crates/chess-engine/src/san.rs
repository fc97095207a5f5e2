//! Standard Algebraic Notation (SAN) and coordinate notation.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "N@f3".
//! Coordinate (LAN) input accepts "e2e4", "e2-e4", "e7e8q" and drops.
//!
//! Variants that ignore check (suicide, losers) write no `+`/`#` and do not
//! settle ambiguity by discarding illegal candidates: two pieces that can
//! both reach a square must always be told apart.

use crate::{Game, MoveList};
use chess_core::{CastleSide, File, Move, PieceType, Rank, Square};
use thiserror::Error;

/// Error type for SAN and LAN parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty move string")]
    Empty,

    #[error("invalid move format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move {san}, candidates: {}", candidates.join(", "))]
    AmbiguousMove { san: String, candidates: Vec<String> },
}

/// Converts a move to SAN given the position it is made from.
///
/// The move must be legal in the current position. The game is borrowed
/// mutably to try the move for the check suffix, and is left unchanged.
pub fn move_to_san(game: &mut Game, m: &Move) -> String {
    if let Some(side) = m.castle_side() {
        return add_check_suffix(game, m, side.san().to_string());
    }
    if m.is_drop() {
        let letter = m.piece.kind.to_char().to_ascii_uppercase();
        return add_check_suffix(game, m, format!("{}@{}", letter, m.to));
    }

    let mut san = String::new();
    let kind = m.piece.kind;

    if let Some(letter) = kind.san_letter() {
        san.push(letter);
        san.push_str(&get_disambiguation(game, m));
    }

    if m.is_capture() {
        if kind == PieceType::Pawn {
            san.push(m.from.file().to_char());
        }
        san.push('x');
    }

    san.push_str(&m.to.to_algebraic());

    if let Some(promo) = m.promotion() {
        san.push('=');
        san.push(promo.to_char().to_ascii_uppercase());
    }

    add_check_suffix(game, m, san)
}

/// Parses SAN and returns the matching legal move.
pub fn san_to_move(game: &mut Game, san: &str) -> Result<Move, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    // Check, mate and annotation suffixes carry no information.
    let body = san.trim_end_matches(['+', '#', '!', '?']);

    match body {
        "O-O" | "0-0" => return find_castling_move(game, san, CastleSide::Short),
        "O-O-O" | "0-0-0" => return find_castling_move(game, san, CastleSide::Long),
        _ => {}
    }
    if body.contains('@') {
        return find_drop(game, body);
    }

    let parsed = parse_san_components(body)?;
    find_matching_move(game, body, &parsed)
}

/// Parses coordinate notation and returns the matching legal move.
///
/// A missing promotion letter selects a queen. In Fischer Random and Wild the
/// king may be moved onto its own rook to castle.
pub fn lan_to_move(game: &mut Game, lan: &str) -> Result<Move, SanError> {
    let lan = lan.trim();
    if lan.is_empty() {
        return Err(SanError::Empty);
    }
    if lan.contains('@') {
        return find_drop(game, lan);
    }

    let text: String = lan.chars().filter(|&c| c != '-' && c != 'x').collect();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(SanError::InvalidFormat(lan.to_string()));
    }
    let from = Square::from_algebraic(&text[0..2])
        .ok_or_else(|| SanError::InvalidFormat(lan.to_string()))?;
    let to = Square::from_algebraic(&text[2..4])
        .ok_or_else(|| SanError::InvalidFormat(lan.to_string()))?;
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(
            PieceType::from_char(c)
                .ok_or_else(|| SanError::InvalidFormat(format!("invalid promotion: {}", lan)))?,
        ),
        None => None,
    };

    game.find_move(from, to, promotion)
        .ok_or_else(|| SanError::NoMatchingMove(lan.to_string()))
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    piece: PieceType,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to_square: Square,
    promotion: Option<PieceType>,
}

fn parse_san_components(san: &str) -> Result<ParsedSan, SanError> {
    let mut chars = san.chars().peekable();

    let piece = match chars.peek().copied() {
        Some(c) if c.is_ascii_uppercase() => {
            chars.next();
            PieceType::from_char(c).ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid piece character: {}", c))
            })?
        }
        Some(_) => PieceType::Pawn,
        None => return Err(SanError::Empty),
    };

    let remaining: String = chars.filter(|&c| c != 'x').collect();

    let (remaining, promotion) = match remaining.split_once('=') {
        Some((head, promo)) => {
            let mut promo_chars = promo.chars();
            let piece = match (promo_chars.next(), promo_chars.next()) {
                (Some(c), None) => PieceType::from_char(c),
                _ => None,
            };
            let piece = piece.ok_or_else(|| {
                SanError::InvalidFormat(format!("invalid promotion piece: {}", san))
            })?;
            (head.to_string(), Some(piece))
        }
        None => (remaining, None),
    };

    let chars: Vec<char> = remaining.chars().collect();
    if chars.len() < 2 {
        return Err(SanError::InvalidFormat(format!("too short: {}", san)));
    }

    let to_file = File::from_char(chars[chars.len() - 2])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid file: {}", san)))?;
    let to_rank = Rank::from_char(chars[chars.len() - 1])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid rank: {}", san)))?;
    let to_square = Square::new(to_file, to_rank);

    let (from_file, from_rank) = parse_disambiguation(&chars[..chars.len() - 2], san)?;

    Ok(ParsedSan {
        piece,
        from_file,
        from_rank,
        to_square,
        promotion,
    })
}

fn parse_disambiguation(
    chars: &[char],
    san: &str,
) -> Result<(Option<File>, Option<Rank>), SanError> {
    let invalid = || SanError::InvalidFormat(format!("invalid disambiguation: {}", san));
    match *chars {
        [] => Ok((None, None)),
        [c] => {
            if let Some(f) = File::from_char(c) {
                Ok((Some(f), None))
            } else if let Some(r) = Rank::from_char(c) {
                Ok((None, Some(r)))
            } else {
                Err(invalid())
            }
        }
        [f, r] => {
            let file = File::from_char(f).ok_or_else(invalid)?;
            let rank = Rank::from_char(r).ok_or_else(invalid)?;
            Ok((Some(file), Some(rank)))
        }
        _ => Err(invalid()),
    }
}

fn find_castling_move(game: &mut Game, san: &str, side: CastleSide) -> Result<Move, SanError> {
    game.legal_moves()
        .iter()
        .find(|m| m.castle_side() == Some(side))
        .copied()
        .ok_or_else(|| SanError::NoMatchingMove(san.to_string()))
}

/// Drops are written `N@f3`; a bare `@e4` drops a pawn.
fn find_drop(game: &mut Game, text: &str) -> Result<Move, SanError> {
    let invalid = || SanError::InvalidFormat(text.to_string());
    let (letter, square) = text.split_once('@').ok_or_else(invalid)?;
    let kind = match letter {
        "" => PieceType::Pawn,
        _ => {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => PieceType::from_char(c).ok_or_else(invalid)?,
                _ => return Err(invalid()),
            }
        }
    };
    let to = Square::from_algebraic(square).ok_or_else(invalid)?;

    game.legal_moves()
        .iter()
        .find(|m| m.is_drop() && m.piece.kind == kind && m.to == to)
        .copied()
        .ok_or_else(|| SanError::NoMatchingMove(text.to_string()))
}

fn find_matching_move(game: &mut Game, san: &str, parsed: &ParsedSan) -> Result<Move, SanError> {
    let mut matching: Vec<Move> = game
        .pseudo_legal_moves()
        .iter()
        .filter(|m| !m.is_drop() && m.castle_side().is_none())
        .filter(|m| m.to == parsed.to_square && m.piece.kind == parsed.piece)
        .filter(|m| parsed.from_file.map_or(true, |f| m.from.file() == f))
        .filter(|m| parsed.from_rank.map_or(true, |r| m.from.rank() == r))
        .filter(|m| m.promotion() == parsed.promotion)
        .copied()
        .collect();

    let legal = game.legal_moves();
    if matching.len() > 1 && game.rules().check_disambiguation() {
        matching.retain(|m| legal.contains(m));
    }

    match matching.as_slice() {
        [] => Err(SanError::NoMatchingMove(san.to_string())),
        [m] if legal.contains(m) => Ok(*m),
        [_] => Err(SanError::NoMatchingMove(san.to_string())),
        _ => Err(SanError::AmbiguousMove {
            san: san.to_string(),
            candidates: matching.iter().map(Move::to_lan).collect(),
        }),
    }
}

/// Moves a SAN reader has to tell apart: the legal ones, or every
/// pseudo-legal one when illegal candidates cannot be discarded.
fn rivals(game: &mut Game) -> MoveList {
    if game.rules().check_disambiguation() {
        game.legal_moves()
    } else {
        game.pseudo_legal_moves()
    }
}

fn get_disambiguation(game: &mut Game, m: &Move) -> String {
    let from = m.from;
    let same_dest: Vec<Move> = rivals(game)
        .iter()
        .filter(|o| o.to == m.to && o.piece.kind == m.piece.kind)
        .filter(|o| !o.is_drop() && o.castle_side().is_none() && o.from != from)
        .copied()
        .collect();

    if same_dest.is_empty() {
        return String::new();
    }
    if same_dest.iter().all(|o| o.from.file() != from.file()) {
        return from.file().to_char().to_string();
    }
    if same_dest.iter().all(|o| o.from.rank() != from.rank()) {
        return from.rank().to_char().to_string();
    }
    from.to_algebraic()
}

fn add_check_suffix(game: &mut Game, m: &Move, mut san: String) -> String {
    let rules = game.rules();
    if !rules.checks_matter() {
        return san;
    }
    game.apply(*m, true);
    if rules.is_in_check(game, game.side_to_move()) {
        if game.legal_moves().is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    game.undo();
    san
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{create_from_fen, create_starting_position};
    use crate::Variant;

    fn load(fen: &str, variant: Variant) -> Game {
        create_from_fen(fen, variant).unwrap()
    }

    fn classic(fen: &str) -> Game {
        load(fen, Variant::Classic)
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn san_of(game: &mut Game, from: &str, to: &str) -> String {
        let m = game.find_move(sq(from), sq(to), None).unwrap();
        move_to_san(game, &m)
    }

    #[test]
    fn san_pawn_push_and_knight_move() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(san_of(&mut game, "e2", "e4"), "e4");
        assert_eq!(san_of(&mut game, "g1", "f3"), "Nf3");
    }

    #[test]
    fn san_pawn_capture() {
        let mut game =
            classic("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(san_of(&mut game, "e4", "d5"), "exd5");
    }

    #[test]
    fn san_castling() {
        let mut game = classic("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(san_of(&mut game, "e1", "g1"), "O-O");
        assert_eq!(san_of(&mut game, "e1", "c1"), "O-O-O");
    }

    #[test]
    fn san_promotion() {
        let mut game = classic("8/P7/8/8/8/8/8/4K1k1 w - - 0 1");
        assert_eq!(san_of(&mut game, "a7", "a8"), "a8=Q");
    }

    #[test]
    fn san_disambiguation() {
        let mut game = classic("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1");
        assert_eq!(san_of(&mut game, "b1", "d2"), "Nbd2");

        let mut game = classic("8/8/8/R7/8/8/8/R3K2k w - - 0 1");
        assert_eq!(san_of(&mut game, "a1", "a3"), "R1a3");

        let mut game = classic("8/8/8/8/8/Q7/8/Q1Q1K2k w - - 0 1");
        assert_eq!(san_of(&mut game, "a1", "b2"), "Qa1b2");
        assert_eq!(san_of(&mut game, "c1", "b2"), "Qcb2");
    }

    #[test]
    fn pinned_piece_needs_no_disambiguation() {
        const FEN: &str = "4r2k/8/8/8/1N6/4N3/8/4K3 w - - 0 1";
        let mut game = classic(FEN);
        let m = san_to_move(&mut game, "Nd5").unwrap();
        assert_eq!(m.from, sq("b4"));
        assert_eq!(move_to_san(&mut game, &m), "Nd5");

        // Without check there is nothing to discard.
        let mut game = load(FEN, Variant::Suicide);
        match san_to_move(&mut game, "Nd5") {
            Err(SanError::AmbiguousMove { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        let m = san_to_move(&mut game, "Nbd5").unwrap();
        assert_eq!(move_to_san(&mut game, &m), "Nbd5");
    }

    #[test]
    fn san_check_and_mate() {
        let mut game = classic("7k/8/8/8/8/8/8/4K1Q1 w - - 0 1");
        assert_eq!(san_of(&mut game, "g1", "h2"), "Qh2+");

        let mut game = classic("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1");
        assert_eq!(san_of(&mut game, "a1", "a8"), "Ra8#");
    }

    #[test]
    fn no_check_suffix_without_check() {
        let mut game = load("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Variant::Suicide);
        assert_eq!(san_of(&mut game, "a1", "a8"), "Ra8");
    }

    #[test]
    fn explosion_of_the_king_is_mate() {
        let mut game = load("4k3/3p4/8/4N3/8/8/8/4K3 w - - 0 1", Variant::Atomic);
        assert_eq!(san_of(&mut game, "e5", "d7"), "Nxd7#");
    }

    #[test]
    fn drops() {
        let mut game = load("4k3/8/8/8/8/8/8/4K3[NP] w - - 0 1", Variant::Crazyhouse);
        let m = san_to_move(&mut game, "N@f3").unwrap();
        assert!(m.is_drop());
        assert_eq!(move_to_san(&mut game, &m), "N@f3");

        let m = san_to_move(&mut game, "N@d6+").unwrap();
        assert_eq!(move_to_san(&mut game, &m), "N@d6+");

        let m = san_to_move(&mut game, "@e4").unwrap();
        assert_eq!(m.piece.kind, PieceType::Pawn);
        assert_eq!(move_to_san(&mut game, &m), "P@e4");

        assert!(matches!(
            san_to_move(&mut game, "Q@e4"),
            Err(SanError::NoMatchingMove(_))
        ));
    }

    #[test]
    fn parse_san() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        let m = san_to_move(&mut game, "Nf3").unwrap();
        assert_eq!((m.from, m.to), (sq("g1"), sq("f3")));

        let mut game = classic("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let m = san_to_move(&mut game, "O-O").unwrap();
        assert_eq!(m.castle_side(), Some(CastleSide::Short));
        let m = san_to_move(&mut game, "0-0-0").unwrap();
        assert_eq!(m.castle_side(), Some(CastleSide::Long));

        let mut game = classic("7k/8/8/8/8/8/8/4K1Q1 w - - 0 1");
        let m = san_to_move(&mut game, "Qh2+!").unwrap();
        assert_eq!(m.to, sq("h2"));
    }

    #[test]
    fn parse_san_invalid() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(san_to_move(&mut game, "  "), Err(SanError::Empty));
        assert!(matches!(
            san_to_move(&mut game, "Ke4"),
            Err(SanError::NoMatchingMove(_))
        ));
        assert!(matches!(
            san_to_move(&mut game, "xyz"),
            Err(SanError::InvalidFormat(_))
        ));
        assert!(matches!(
            san_to_move(&mut game, "Zf3"),
            Err(SanError::InvalidFormat(_))
        ));
        assert!(san_to_move(&mut game, "e8=Q").is_err());
    }

    #[test]
    fn promotion_needs_a_piece_in_san_but_not_in_lan() {
        let mut game = classic("8/P7/8/8/8/8/8/4K1k1 w - - 0 1");
        assert!(san_to_move(&mut game, "a8").is_err());
        assert_eq!(san_to_move(&mut game, "a8=N").unwrap().promotion(), Some(PieceType::Knight));
        assert_eq!(lan_to_move(&mut game, "a7a8").unwrap().promotion(), Some(PieceType::Queen));
        assert_eq!(lan_to_move(&mut game, "a7a8r").unwrap().promotion(), Some(PieceType::Rook));
    }

    #[test]
    fn parse_lan() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(lan_to_move(&mut game, "e2e4").unwrap().to, sq("e4"));
        assert_eq!(lan_to_move(&mut game, "g1-f3").unwrap().to, sq("f3"));
        assert!(matches!(
            lan_to_move(&mut game, "e2e5"),
            Err(SanError::NoMatchingMove(_))
        ));
        assert!(matches!(
            lan_to_move(&mut game, "e2"),
            Err(SanError::InvalidFormat(_))
        ));

        let mut game = classic("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let m = lan_to_move(&mut game, "e1g1").unwrap();
        assert_eq!(m.castle_side(), Some(CastleSide::Short));
    }

    #[test]
    fn lan_king_takes_own_rook_castles() {
        let mut game = load(
            "bnrkqbnr/pppppppp/8/8/8/8/PPPPPPPP/BNRKQBNR w KQkq - 0 1",
            Variant::FischerRandom,
        );
        let m = lan_to_move(&mut game, "d1c1").unwrap();
        assert_eq!(m.castle_side(), Some(CastleSide::Long));
    }

    #[test]
    fn san_roundtrip() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ];
        for fen in fens {
            let mut game = classic(fen);
            for m in game.legal_moves() {
                let san = move_to_san(&mut game, &m);
                let parsed = san_to_move(&mut game, &san).unwrap();
                assert_eq!(m, parsed, "roundtrip failed for {} in {}", san, fen);
            }
        }
    }
}
