//! 错误类型定义

use thiserror::Error;

use crate::piece::Square;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的坐标
    #[error("Invalid square: ({row}, {col})")]
    InvalidSquare { row: i32, col: i32 },

    /// 没有棋子
    #[error("No piece at {square}")]
    NoPiece { square: Square },

    /// 不是该方的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,

    /// 正在等待升变选择
    #[error("Pawn promotion is pending")]
    PromotionPending,

    /// 没有待完成的升变
    #[error("No promotion is pending")]
    NoPromotionPending,

    /// 非法走法
    #[error("Illegal move: {from} to {to}")]
    IllegalMove { from: Square, to: Square },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
