//! 棋盘

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::piece::{Color, Piece, PieceKind, Square};

/// 底线棋子排列（a 列到 h 列）
const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// 棋盘
///
/// `squares[row][col]`，`None` 为空格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        for (col, kind) in BACK_RANK.iter().enumerate() {
            let col = col as u8;
            // 黑方在上方（row 0-1）
            board.set(
                Square::new_unchecked(Color::Black.back_row(), col),
                Some(Piece::new(*kind, Color::Black)),
            );
            board.set(
                Square::new_unchecked(Color::Black.pawn_home_row(), col),
                Some(Piece::new(PieceKind::Pawn, Color::Black)),
            );
            // 白方在下方（row 6-7）
            board.set(
                Square::new_unchecked(Color::White.pawn_home_row(), col),
                Some(Piece::new(PieceKind::Pawn, Color::White)),
            );
            board.set(
                Square::new_unchecked(Color::White.back_row(), col),
                Some(Piece::new(*kind, Color::White)),
            );
        }

        board
    }

    /// 获取指定格子的棋子
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.row as usize][sq.col as usize]
        } else {
            None
        }
    }

    /// 设置指定格子的棋子
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.row as usize][sq.col as usize] = piece;
        }
    }

    /// 格子是否为空
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// 移动棋子（不检查规则），返回原先在目标格的棋子
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            self.get(sq)
                .is_some_and(|piece| piece.is(PieceKind::King, color))
        })
    }

    /// 获取指定阵营的所有棋子
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|piece| (sq, piece)))
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 统计指定棋子的数量
    pub fn count(&self, kind: PieceKind, color: Color) -> usize {
        Square::all()
            .filter(|&sq| self.get(sq).is_some_and(|p| p.is(kind, color)))
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_SIZE as u8 {
            write!(f, "{} ", BOARD_SIZE as u8 - row)?;
            for col in 0..BOARD_SIZE as u8 {
                let c = self
                    .get(Square::new_unchecked(row, col))
                    .map_or('.', |p| p.to_fen_char());
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}
