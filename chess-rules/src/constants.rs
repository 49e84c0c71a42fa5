//! 规则常量定义

/// 棋盘边长
pub const BOARD_SIZE: usize = 8;

/// 王的初始列（e 列）
pub const KING_HOME_COL: u8 = 4;

/// 后翼车的初始列（a 列）
pub const QUEENSIDE_ROOK_COL: u8 = 0;

/// 王翼车的初始列（h 列）
pub const KINGSIDE_ROOK_COL: u8 = 7;

/// 新对局的状态提示
pub const NEW_GAME_MESSAGE: &str = "New game started.";

/// 非法走子的状态提示
pub const ILLEGAL_MOVE_MESSAGE: &str = "Illegal move.";

/// 等待升变选择的状态提示
pub const PROMOTION_REQUIRED_MESSAGE: &str = "Pawn promotion required!";

/// 逼和的状态提示
pub const STALEMATE_MESSAGE: &str = "Stalemate! The game is a draw.";
