//! 走法生成计数（perft）测试
//!
//! 节点数与公开的 perft 结果对比。所选局面和深度内不会出现易位。

use chess_rules::{GameState, MoveOutcome, PieceKind, INITIAL_FEN};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// 统计 `depth` 层后的叶子节点数，升变按四种棋子分别计数
fn perft(game: &GameState, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for (from, targets) in game.legal_moves(game.turn()) {
        for to in targets {
            let mut next = game.clone();
            match next.try_make_move(from, to) {
                Ok(MoveOutcome::Moved { .. }) => nodes += perft(&next, depth - 1),
                Ok(MoveOutcome::PromotionRequired { .. }) => {
                    for kind in PROMOTION_KINDS {
                        let mut promoted = next.clone();
                        assert!(promoted.complete_promotion(kind));
                        nodes += perft(&promoted, depth - 1);
                    }
                }
                Err(e) => panic!("legal move {}{} rejected: {}", from, to, e),
            }
        }
    }
    nodes
}

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let game = GameState::from_fen(fen).unwrap();
    assert_eq!(perft(&game, depth), expected, "perft({}) failed on {}", depth, fen);
}

#[test]
fn test_perft_initial_position() {
    test_perft_fen_nodes(1, INITIAL_FEN, 20);
    test_perft_fen_nodes(2, INITIAL_FEN, 400);
    test_perft_fen_nodes(3, INITIAL_FEN, 8902);
}

#[test]
fn test_perft_en_passant_and_pins() {
    // 包含带闪将的吃过路兵
    let fen = "8/2p5/3p4/KP5r/1R3p2/6k1/8/4P1P1 w - - 0 1";
    test_perft_fen_nodes(1, fen, 14);
    test_perft_fen_nodes(2, fen, 191);
    test_perft_fen_nodes(3, fen, 2812);
}

#[test]
fn test_perft_promotions() {
    let fen = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";
    test_perft_fen_nodes(1, fen, 24);
    test_perft_fen_nodes(2, fen, 496);
    test_perft_fen_nodes(3, fen, 9483);
}
