//! Integration tests for chess-engine.
//!
//! These drive the public API only: games are built through the factory,
//! moved through SAN/LAN or raw moves, and inspected through FEN output.

use chess_core::{Color, PieceType, Square};
use chess_engine::{
    create_from_config, create_from_fen, create_starting_position, BughouseLink, CursorMode,
    san_to_move, Game, GameConfig, GameCursor, GameError, GameResult, Variant,
};
use proptest::prelude::*;

/// Plays up to `picks.len()` moves chosen by index from the legal list,
/// stopping early once the game is decided.
fn random_playout(game: &mut Game, picks: &[usize]) -> Vec<String> {
    let mut before = Vec::new();
    for &pick in picks {
        if game.outcome().is_some() {
            break;
        }
        let legal = game.legal_moves();
        if legal.is_empty() {
            break;
        }
        before.push(game.to_fen());
        game.force_move(legal[pick % legal.len()]);
    }
    before
}

fn total_material(game: &Game) -> i32 {
    let mut total = 0;
    for color in Color::ALL {
        for kind in PieceType::ALL {
            total += game.piece_count(color, kind) as i32 + game.drop_count(color, kind);
        }
    }
    total
}

fn variant_strategy() -> impl Strategy<Value = Variant> {
    prop_oneof![
        Just(Variant::Classic),
        Just(Variant::Atomic),
        Just(Variant::Crazyhouse),
        Just(Variant::Bughouse),
        Just(Variant::Suicide),
        Just(Variant::Losers),
        Just(Variant::Wild),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn rollback_restores_every_position(
        variant in variant_strategy(),
        picks in prop::collection::vec(0usize..64, 0..40),
    ) {
        let mut game = create_starting_position(variant).unwrap();
        let start_hash = game.position_hash();
        let start_game_hash = game.game_hash();
        let before = random_playout(&mut game, &picks);

        for fen in before.iter().rev() {
            game.rollback().unwrap();
            prop_assert_eq!(&game.to_fen(), fen);
        }
        prop_assert_eq!(game.moves().len(), 0);
        prop_assert_eq!(game.position_hash(), start_hash);
        prop_assert_eq!(game.game_hash(), start_game_hash);
        prop_assert_eq!(game.rollback().unwrap_err(), GameError::EmptyHistory);
    }

    #[test]
    fn fen_output_reloads_to_the_same_position(
        variant in prop_oneof![
            Just(Variant::Classic),
            Just(Variant::Atomic),
            Just(Variant::Crazyhouse),
            Just(Variant::Suicide),
            Just(Variant::Losers),
        ],
        picks in prop::collection::vec(0usize..64, 0..30),
    ) {
        let mut game = create_starting_position(variant).unwrap();
        random_playout(&mut game, &picks);
        let fen = game.to_fen();

        let mut reloaded = create_from_fen(&fen, variant).unwrap();
        prop_assert_eq!(reloaded.to_fen(), fen);
        prop_assert_eq!(reloaded.position_hash(), game.position_hash());
        prop_assert_eq!(reloaded.legal_moves().len(), game.legal_moves().len());
    }

    #[test]
    fn crazyhouse_conserves_material(picks in prop::collection::vec(0usize..256, 0..60)) {
        let mut game = create_starting_position(Variant::Crazyhouse).unwrap();
        for &pick in &picks {
            let legal = game.legal_moves();
            if legal.is_empty() {
                break;
            }
            game.force_move(legal[pick % legal.len()]);
            prop_assert_eq!(total_material(&game), 32);
        }
    }

    #[test]
    fn san_of_every_legal_move_parses_back(picks in prop::collection::vec(0usize..64, 0..20)) {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        random_playout(&mut game, &picks);
        for mv in game.legal_moves().iter() {
            let san = game.san(mv);
            let parsed = san_to_move(&mut game, &san).unwrap();
            prop_assert_eq!(&parsed, mv);
        }
    }
}

#[test]
fn opening_moves_produce_expected_fen() {
    // Exercise the trace-level move logging.
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();

    let mut game = create_starting_position(Variant::Classic).unwrap();
    game.make_san_move("e4").unwrap();
    game.make_lan_move("e7e5").unwrap();
    game.make_move(
        Square::from_algebraic("g1").unwrap(),
        Square::from_algebraic("f3").unwrap(),
        None,
    )
    .unwrap();
    assert_eq!(
        game.to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
    assert_eq!(game.moves().len(), 3);
    assert_eq!(game.outcome(), None);
}

#[test]
fn scholars_mate() {
    let mut game = create_starting_position(Variant::Classic).unwrap();
    for san in ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6"] {
        game.make_san_move(san).unwrap();
    }
    let mate = san_to_move(&mut game, "Qxf7").unwrap();
    assert_eq!(game.san(&mate), "Qxf7#");
    game.make_san_move("Qxf7#").unwrap();
    assert!(game.is_checkmate());
    assert_eq!(game.outcome(), Some(GameResult::WhiteWins));
    assert!(game.make_san_move("Ke7").is_err());
}

#[test]
fn atomic_game_ends_when_king_explodes() {
    let mut game = create_starting_position(Variant::Atomic).unwrap();
    for san in ["e4", "d5", "Qh5", "Nf6"] {
        game.make_san_move(san).unwrap();
    }
    // Qxf7 blows up the black king on e8 along with the surrounding pieces.
    game.make_san_move("Qxf7").unwrap();
    assert!(!game.has_king(Color::Black));
    assert_eq!(game.piece_at(Square::F7), None);
    assert_eq!(game.piece_at(Square::E8), None);
    assert_eq!(game.outcome(), Some(GameResult::WhiteWins));
}

#[test]
fn suicide_forced_capture_chain() {
    let mut game = create_starting_position(Variant::Suicide).unwrap();
    game.make_san_move("e4").unwrap();
    game.make_san_move("b5").unwrap();
    assert_eq!(game.legal_moves().len(), 1);
    game.make_san_move("Bxb5").unwrap();

    // Nothing reaches b5, so black is free to move.
    assert!(game.legal_moves().iter().all(|m| !m.is_capture()));
    game.make_san_move("c6").unwrap();
    assert_eq!(game.legal_moves().len(), 1);
    game.make_san_move("Bxc6").unwrap();

    let replies = game.legal_moves();
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|m| m.is_capture()));
    assert!(game.make_san_move("e6").is_err());
}

#[test]
fn config_driven_crazyhouse_game() {
    let config: GameConfig = toml::from_str(
        r#"
        variant = "zh"

        [headers]
        White = "Alice"
        Black = "Bob"
        "#,
    )
    .unwrap();
    let mut game = create_from_config(&config).unwrap();
    for san in ["e4", "d5", "exd5", "Nf6", "Nc3", "Nxd5", "Nxd5", "Qxd5"] {
        game.make_san_move(san).unwrap();
    }
    assert_eq!(game.drop_count(Color::White, PieceType::Pawn), 1);
    assert_eq!(game.drop_count(Color::White, PieceType::Knight), 1);
    assert_eq!(game.drop_count(Color::Black, PieceType::Pawn), 1);
    assert_eq!(game.drop_count(Color::Black, PieceType::Knight), 1);
    assert_eq!(total_material(&game), 32);

    game.make_san_move("N@e3").unwrap();
    assert_eq!(game.drop_count(Color::White, PieceType::Knight), 0);
    assert_eq!(game.header("White"), Some("Alice"));
    assert!(game.to_fen().contains("[Pnp]"));
}

#[test]
fn bughouse_boards_exchange_pieces() {
    let mut board_a = create_starting_position(Variant::Bughouse).unwrap();
    let mut board_b = create_starting_position(Variant::Bughouse).unwrap();
    let (a, b) = BughouseLink::pair();
    board_a.link_partner(a);
    board_b.link_partner(b);

    for san in ["e4", "d5", "exd5"] {
        board_a.make_san_move(san).unwrap();
    }
    assert_eq!(board_b.sync_partner_drops(), 1);
    board_b.make_san_move("e4").unwrap();
    // The black pawn captured on board A is now black's to drop on board B.
    board_b.make_san_move("P@d5").unwrap();
    assert_eq!(
        board_b.piece_at(Square::D5).map(|p| (p.color, p.kind)),
        Some((Color::Black, PieceType::Pawn))
    );
}

#[test]
fn cursor_browses_and_branches() {
    let mut game = create_starting_position(Variant::Classic).unwrap();
    for san in ["d4", "d5", "c4", "e6", "Nc3"] {
        game.make_san_move(san).unwrap();
    }
    let final_fen = game.to_fen();

    let mut cursor = GameCursor::new(game, CursorMode::MakeMovesOnCursor);
    cursor.set_cursor(3).unwrap();
    assert_eq!(cursor.side_to_move(), Color::Black);
    assert_eq!(cursor.master().to_fen(), final_fen);

    // Try 3...dxc4 instead of 3...e6.
    cursor.make_san_move("dxc4").unwrap();
    assert!(cursor.is_branched());
    assert_eq!(cursor.moves().len(), 4);
    assert_eq!(cursor.set_cursor(0).unwrap_err(), GameError::CursorBranched);

    assert!(cursor.revert());
    assert_eq!(cursor.index(), 3);
    assert_eq!(cursor.master().to_fen(), final_fen);

    cursor.make_san_move("dxc4").unwrap();
    assert!(cursor.commit());
    assert_eq!(cursor.len(), 4);
    let master = cursor.into_master();
    assert_eq!(master.last_move().map(|m| m.to), Some(Square::C4));
}

#[test]
fn fischer_random_castling_round_trip() {
    let mut game = create_from_fen(
        "rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKQBNR w KQkq - 0 1",
        Variant::FischerRandom,
    )
    .unwrap();
    for san in ["Nf3", "Nf6", "g3", "g6", "Bg2", "Bg7", "e4", "e5", "Qe2", "Qe7"] {
        game.make_san_move(san).unwrap();
    }
    let castle = san_to_move(&mut game, "O-O").unwrap();
    assert_eq!(game.san(&castle), "O-O");
    assert_eq!(castle.to_lan(), "d1g1");

    game.make_lan_move("d1g1").unwrap();
    assert_eq!(game.piece_at(Square::G1).map(|p| p.kind), Some(PieceType::King));
    assert_eq!(game.piece_at(Square::F1).map(|p| p.kind), Some(PieceType::Rook));
    assert_eq!(game.piece_at(Square::H1), None);

    game.rollback().unwrap();
    assert_eq!(game.piece_at(Square::D1).map(|p| p.kind), Some(PieceType::King));
    assert_eq!(game.piece_at(Square::H1).map(|p| p.kind), Some(PieceType::Rook));
    assert_eq!(game.find_move(castle.from, castle.to, None), Some(castle));
}
