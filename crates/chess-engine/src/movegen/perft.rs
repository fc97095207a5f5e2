//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a given depth.
//! It walks the same make/test/rollback path as [`Game::legal_moves`], so a
//! match against published counts validates generation, make and rollback
//! together.

use crate::Game;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(game: &mut Game, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in &moves {
        game.apply(*m, true);
        nodes += perft(game, depth - 1);
        game.undo();
    }
    nodes
}

/// Perft with divide: node counts below each root move, sorted by move text.
/// Useful for locating the move whose subtree count is wrong.
pub fn perft_divide(game: &mut Game, depth: u32) -> Vec<(String, u64)> {
    let moves = game.legal_moves();
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        game.apply(*m, true);
        let nodes = if depth > 1 { perft(game, depth - 1) } else { 1 };
        game.undo();
        results.push((m.to_lan(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{create_from_fen, create_starting_position};
    use crate::Variant;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn classic(fen: &str) -> Game {
        create_from_fen(fen, Variant::Classic).unwrap()
    }

    #[test]
    fn perft_startpos_depth_1() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(perft(&mut game, 1), 20);
    }

    #[test]
    fn perft_startpos_depth_2() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(perft(&mut game, 2), 400);
    }

    #[test]
    fn perft_startpos_depth_3() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        let before = game.clone();
        assert_eq!(perft(&mut game, 3), 8902);
        assert_eq!(game, before);
    }

    #[test]
    #[ignore]
    fn perft_startpos_depth_4() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        assert_eq!(perft(&mut game, 4), 197281);
    }

    #[test]
    fn perft_kiwipete() {
        let mut game = classic(KIWIPETE);
        assert_eq!(perft(&mut game, 1), 48);
        assert_eq!(perft(&mut game, 2), 2039);
    }

    #[test]
    #[ignore]
    fn perft_kiwipete_depth_3() {
        let mut game = classic(KIWIPETE);
        assert_eq!(perft(&mut game, 3), 97862);
    }

    // Check evasion, en passant, promotion
    #[test]
    fn perft_position3() {
        let mut game = classic("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&mut game, 1), 14);
        assert_eq!(perft(&mut game, 2), 191);
        assert_eq!(perft(&mut game, 3), 2812);
    }

    // Lots of promotions and captures
    #[test]
    fn perft_position4() {
        let mut game = classic("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
        assert_eq!(perft(&mut game, 1), 6);
        assert_eq!(perft(&mut game, 2), 264);
    }

    #[test]
    fn perft_position5() {
        let mut game = classic("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
        assert_eq!(perft(&mut game, 1), 44);
        assert_eq!(perft(&mut game, 2), 1486);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let mut game = create_starting_position(Variant::Classic).unwrap();
        let results = perft_divide(&mut game, 2);
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|(_, n)| *n == 20));
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 400);
        assert_eq!(results[0].0, "a2a3");
    }
}
