//! 走法生成和验证

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::castling::{CastleSide, CastlingState};
use crate::piece::{Color, Piece, PieceKind, Square};

/// 合法走法表：起点 -> 终点集合
pub type MoveMap = BTreeMap<Square, BTreeSet<Square>>;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始格
    pub from: Square,
    /// 目标格
    pub to: Square,
    /// 升变棋子（如果有）
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建带升变的走法
    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

/// 坐标记号，如 `e2e4`、`e7e8q`
impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_fen_char(Color::Black))?;
        }
        Ok(())
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定格子上棋子的伪合法走法（不考虑己方王是否被将）
    ///
    /// `castling` 为 `None` 时不生成易位走法；将军检测必须这样调用，
    /// 否则易位判断会反过来依赖将军检测。
    pub fn moves_for(
        board: &Board,
        from: Square,
        en_passant: Option<Square>,
        castling: Option<&CastlingState>,
    ) -> BTreeSet<Square> {
        let mut moves = BTreeSet::new();
        let Some(piece) = board.get(from) else {
            return moves;
        };

        match piece.kind {
            PieceKind::Pawn => {
                Self::pawn_moves(board, from, piece.color, en_passant, &mut moves);
            }
            PieceKind::Knight => {
                Self::step_moves(board, from, piece.color, &KNIGHT_OFFSETS, &mut moves);
            }
            PieceKind::Bishop => {
                Self::ray_moves(board, from, piece.color, &BISHOP_DIRECTIONS, &mut moves);
            }
            PieceKind::Rook => {
                Self::ray_moves(board, from, piece.color, &ROOK_DIRECTIONS, &mut moves);
            }
            PieceKind::Queen => {
                Self::ray_moves(board, from, piece.color, &ROOK_DIRECTIONS, &mut moves);
                Self::ray_moves(board, from, piece.color, &BISHOP_DIRECTIONS, &mut moves);
            }
            PieceKind::King => {
                Self::step_moves(board, from, piece.color, &KING_OFFSETS, &mut moves);
                if let Some(castling) = castling {
                    Self::castling_moves(board, from, piece.color, castling, &mut moves);
                }
            }
        }

        moves
    }

    /// 生成兵的走法
    fn pawn_moves(
        board: &Board,
        from: Square,
        color: Color,
        en_passant: Option<Square>,
        moves: &mut BTreeSet<Square>,
    ) {
        let dir = color.pawn_direction();

        // 前进一格，起始行且两格皆空时可前进两格
        if let Some(one) = from.offset(dir, 0) {
            if board.is_empty(one) {
                moves.insert(one);
                if from.row == color.pawn_home_row() {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if board.is_empty(two) {
                            moves.insert(two);
                        }
                    }
                }
            }
        }

        // 斜吃，以及吃过路兵
        for dc in [-1i8, 1i8] {
            if let Some(to) = from.offset(dir, dc) {
                match board.get(to) {
                    Some(target) if target.color != color => {
                        moves.insert(to);
                    }
                    None if en_passant == Some(to) => {
                        moves.insert(to);
                    }
                    _ => {}
                }
            }
        }
    }

    /// 马和王的固定步
    fn step_moves(
        board: &Board,
        from: Square,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut BTreeSet<Square>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                if Self::not_own(board, to, color) {
                    moves.insert(to);
                }
            }
        }
    }

    /// 车、象、后的射线
    fn ray_moves(
        board: &Board,
        from: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut BTreeSet<Square>,
    ) {
        for &(dr, dc) in directions {
            let mut current = from;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    // 遇到棋子：对方可吃，己方止步
                    if target.color != color {
                        moves.insert(to);
                    }
                    break;
                }
                moves.insert(to);
                current = to;
            }
        }
    }

    /// 易位目标格（王横移两格）
    fn castling_moves(
        board: &Board,
        from: Square,
        color: Color,
        castling: &CastlingState,
        moves: &mut BTreeSet<Square>,
    ) {
        if castling.king_moved(color) {
            return;
        }
        for side in CastleSide::BOTH {
            if castling.can_castle(color, side, board) {
                moves.insert(Square::new_unchecked(from.row, side.king_target_col()));
            }
        }
    }

    fn not_own(board: &Board, to: Square, color: Color) -> bool {
        board.get(to).map_or(true, |target| target.color != color)
    }

    /// 检查指定阵营是否被将军
    pub fn is_in_check(board: &Board, color: Color) -> bool {
        let king = match board.find_king(color) {
            Some(sq) => sq,
            None => return false, // 没有王，视为不被将军
        };

        board
            .pieces(color.opponent())
            .into_iter()
            .any(|(from, _)| Self::moves_for(board, from, None, None).contains(&king))
    }

    /// 在棋盘副本上模拟走法，原棋盘不变
    ///
    /// 处理吃过路兵、易位时的车和升变（一律按后计算，仅用于将军检测）。
    pub fn simulate(
        board: &Board,
        from: Square,
        to: Square,
        en_passant: Option<Square>,
    ) -> Board {
        let mut next = *board;
        let Some(piece) = next.get(from) else {
            return next;
        };
        next.move_piece(from, to);
        Self::apply_side_effects(&mut next, piece, from, to, en_passant);

        if piece.kind == PieceKind::Pawn && to.row == piece.color.promotion_row() {
            next.set(to, Some(Piece::new(PieceKind::Queen, piece.color)));
        }
        next
    }

    /// 吃过路兵时移除被吃的兵，易位时移动车
    ///
    /// 返回是否吃过路兵。棋子已经被移到 `to`。
    pub(crate) fn apply_side_effects(
        board: &mut Board,
        piece: Piece,
        from: Square,
        to: Square,
        en_passant: Option<Square>,
    ) -> bool {
        let mut en_passant_capture = false;

        if piece.kind == PieceKind::Pawn && en_passant == Some(to) {
            // 被吃的兵在目标格后方一行
            if let Some(victim) = to.offset(-piece.color.pawn_direction(), 0) {
                board.set(victim, None);
                en_passant_capture = true;
            }
        }

        if piece.kind == PieceKind::King && from.col.abs_diff(to.col) == 2 {
            let (rook_from, rook_to) = CastleSide::rook_squares(from, to);
            board.move_piece(rook_from, rook_to);
        }

        en_passant_capture
    }

    /// 生成指定阵营的全部合法走法
    ///
    /// 对每个伪合法走法模拟一次，过滤掉走后己方王被将军的走法；
    /// 没有合法走法的起点不出现在结果中。
    pub fn legal_moves(
        board: &Board,
        color: Color,
        en_passant: Option<Square>,
        castling: &CastlingState,
    ) -> MoveMap {
        let mut result = MoveMap::new();

        for (from, _) in board.pieces(color) {
            let targets: BTreeSet<Square> = Self::moves_for(board, from, en_passant, Some(castling))
                .into_iter()
                .filter(|&to| {
                    let next = Self::simulate(board, from, to, en_passant);
                    !Self::is_in_check(&next, color)
                })
                .collect();

            if !targets.is_empty() {
                result.insert(from, targets);
            }
        }

        result
    }

    /// 合法走法总数
    pub fn count(moves: &MoveMap) -> usize {
        moves.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn squares(list: &[&str]) -> BTreeSet<Square> {
        list.iter().map(|s| sq(s)).collect()
    }

    fn place(board: &mut Board, s: &str, kind: PieceKind, color: Color) {
        board.set(sq(s), Some(Piece::new(kind, color)));
    }

    #[test]
    fn test_initial_moves() {
        let board = Board::initial();
        let castling = CastlingState::default();

        let white = MoveGenerator::legal_moves(&board, Color::White, None, &castling);
        assert_eq!(MoveGenerator::count(&white), 20);
        assert_eq!(white.len(), 10);

        let black = MoveGenerator::legal_moves(&board, Color::Black, None, &castling);
        assert_eq!(MoveGenerator::count(&black), 20);
    }

    #[test]
    fn test_empty_square_has_no_moves() {
        let board = Board::initial();
        assert!(MoveGenerator::moves_for(&board, sq("e4"), None, None).is_empty());
    }

    #[test]
    fn test_pawn_moves() {
        let board = Board::initial();
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("e2"), None, None),
            squares(&["e3", "e4"])
        );
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("d7"), None, None),
            squares(&["d6", "d5"])
        );
    }

    #[test]
    fn test_pawn_blocked() {
        let mut board = Board::initial();
        place(&mut board, "e3", PieceKind::Knight, Color::Black);
        // 前方被挡，不能前进，但可以斜吃不到任何子
        assert!(MoveGenerator::moves_for(&board, sq("e2"), None, None).is_empty());

        let mut board = Board::initial();
        place(&mut board, "e4", PieceKind::Knight, Color::Black);
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("e2"), None, None),
            squares(&["e3"])
        );
    }

    #[test]
    fn test_pawn_capture_and_en_passant() {
        let mut board = Board::empty();
        place(&mut board, "e5", PieceKind::Pawn, Color::White);
        place(&mut board, "d5", PieceKind::Pawn, Color::Black);
        place(&mut board, "f6", PieceKind::Rook, Color::Black);

        assert_eq!(
            MoveGenerator::moves_for(&board, sq("e5"), None, None),
            squares(&["e6", "f6"])
        );
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("e5"), Some(sq("d6")), None),
            squares(&["d6", "e6", "f6"])
        );
    }

    #[test]
    fn test_knight_moves() {
        let board = Board::initial();
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("g1"), None, None),
            squares(&["f3", "h3"])
        );

        let mut board = Board::empty();
        place(&mut board, "a1", PieceKind::Knight, Color::White);
        place(&mut board, "b3", PieceKind::Pawn, Color::White);
        assert_eq!(
            MoveGenerator::moves_for(&board, sq("a1"), None, None),
            squares(&["c2"])
        );
    }

    #[test]
    fn test_rook_rays() {
        let mut board = Board::empty();
        place(&mut board, "d4", PieceKind::Rook, Color::White);
        place(&mut board, "d6", PieceKind::Pawn, Color::Black);
        place(&mut board, "f4", PieceKind::Pawn, Color::White);

        let moves = MoveGenerator::moves_for(&board, sq("d4"), None, None);
        assert!(moves.contains(&sq("d5")));
        assert!(moves.contains(&sq("d6")));
        assert!(!moves.contains(&sq("d7")));
        assert!(moves.contains(&sq("e4")));
        assert!(!moves.contains(&sq("f4")));
        assert!(moves.contains(&sq("a4")));
        assert!(moves.contains(&sq("d1")));
        assert_eq!(moves.len(), 2 + 1 + 3 + 3);
    }

    #[test]
    fn test_queen_in_center() {
        let mut board = Board::empty();
        place(&mut board, "d4", PieceKind::Queen, Color::White);
        assert_eq!(MoveGenerator::moves_for(&board, sq("d4"), None, None).len(), 27);
    }

    #[test]
    fn test_bishop_blocked_in_initial_position() {
        let board = Board::initial();
        assert!(MoveGenerator::moves_for(&board, sq("c1"), None, None).is_empty());
    }

    #[test]
    fn test_king_castling_generation_flag() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "h1", PieceKind::Rook, Color::White);
        place(&mut board, "a1", PieceKind::Rook, Color::White);
        let castling = CastlingState::default();

        let without = MoveGenerator::moves_for(&board, sq("e1"), None, None);
        assert!(!without.contains(&sq("g1")));
        assert!(!without.contains(&sq("c1")));

        let with = MoveGenerator::moves_for(&board, sq("e1"), None, Some(&castling));
        assert!(with.contains(&sq("g1")));
        assert!(with.contains(&sq("c1")));
    }

    #[test]
    fn test_check_detection() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "e8", PieceKind::Rook, Color::Black);
        assert!(MoveGenerator::is_in_check(&board, Color::White));

        place(&mut board, "e4", PieceKind::Pawn, Color::White);
        assert!(!MoveGenerator::is_in_check(&board, Color::White));
    }

    #[test]
    fn test_check_by_knight_and_pawn() {
        let mut board = Board::empty();
        place(&mut board, "e4", PieceKind::King, Color::White);
        place(&mut board, "f6", PieceKind::Knight, Color::Black);
        assert!(MoveGenerator::is_in_check(&board, Color::White));

        let mut board = Board::empty();
        place(&mut board, "e4", PieceKind::King, Color::White);
        place(&mut board, "d5", PieceKind::Pawn, Color::Black);
        assert!(MoveGenerator::is_in_check(&board, Color::White));

        // 兵正前方不构成将军
        let mut board = Board::empty();
        place(&mut board, "e4", PieceKind::King, Color::White);
        place(&mut board, "e5", PieceKind::Pawn, Color::Black);
        assert!(!MoveGenerator::is_in_check(&board, Color::White));
    }

    #[test]
    fn test_missing_king_is_not_check() {
        let mut board = Board::empty();
        place(&mut board, "e8", PieceKind::Queen, Color::Black);
        assert!(!MoveGenerator::is_in_check(&board, Color::White));
    }

    #[test]
    fn test_simulate_does_not_touch_input() {
        let board = Board::initial();
        let next = MoveGenerator::simulate(&board, sq("e2"), sq("e4"), None);
        assert_eq!(board, Board::initial());
        assert!(next.is_empty(sq("e2")));
        assert_eq!(next.get(sq("e4")), Some(Piece::new(PieceKind::Pawn, Color::White)));
    }

    #[test]
    fn test_simulate_en_passant() {
        let mut board = Board::empty();
        place(&mut board, "e5", PieceKind::Pawn, Color::White);
        place(&mut board, "d5", PieceKind::Pawn, Color::Black);

        let next = MoveGenerator::simulate(&board, sq("e5"), sq("d6"), Some(sq("d6")));
        assert!(next.is_empty(sq("d5")));
        assert!(next.is_empty(sq("e5")));
        assert_eq!(next.get(sq("d6")), Some(Piece::new(PieceKind::Pawn, Color::White)));
    }

    #[test]
    fn test_simulate_castling_and_promotion() {
        let mut board = Board::empty();
        place(&mut board, "e8", PieceKind::King, Color::Black);
        place(&mut board, "a8", PieceKind::Rook, Color::Black);
        let next = MoveGenerator::simulate(&board, sq("e8"), sq("c8"), None);
        assert_eq!(next.get(sq("c8")), Some(Piece::new(PieceKind::King, Color::Black)));
        assert_eq!(next.get(sq("d8")), Some(Piece::new(PieceKind::Rook, Color::Black)));
        assert!(next.is_empty(sq("a8")));

        let mut board = Board::empty();
        place(&mut board, "b2", PieceKind::Pawn, Color::Black);
        let next = MoveGenerator::simulate(&board, sq("b2"), sq("b1"), None);
        assert_eq!(next.get(sq("b1")), Some(Piece::new(PieceKind::Queen, Color::Black)));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let mut board = Board::empty();
        place(&mut board, "e1", PieceKind::King, Color::White);
        place(&mut board, "e2", PieceKind::Bishop, Color::White);
        place(&mut board, "e8", PieceKind::Rook, Color::Black);
        place(&mut board, "a8", PieceKind::King, Color::Black);

        let moves = MoveGenerator::legal_moves(&board, Color::White, None, &CastlingState::new(
            crate::castling::CastlingRights::NONE,
        ));
        assert!(!moves.contains_key(&sq("e2")));
        assert!(moves.contains_key(&sq("e1")));
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(sq("e2"), sq("e4")).to_string(), "e2e4");
        assert_eq!(
            Move::with_promotion(sq("e7"), sq("e8"), PieceKind::Knight).to_string(),
            "e7e8n"
        );
    }
}
