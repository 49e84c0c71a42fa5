//! FEN 格式解析和生成
//!
//! 标准六字段格式：
//! `<棋盘> <走子方> <易位权> <过路兵格> <半回合数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1`

use crate::board::Board;
use crate::castling::CastlingRights;
use crate::constants::BOARD_SIZE;
use crate::error::ChessError;
use crate::game::GameState;
use crate::piece::{Color, Piece, PieceKind, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为对局状态
    ///
    /// 后四个字段可省略，默认为 `- - 0 1`。解析后立即计算一次状态，
    /// 因此将死或逼和的局面会直接处于结束状态。
    pub fn parse(fen: &str) -> Result<GameState, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.is_empty() {
            return Err(invalid("Empty FEN string"));
        }
        if parts.len() > 6 {
            return Err(invalid(format!("Expected at most 6 fields, got {}", parts.len())));
        }

        let board = Self::parse_board(parts[0])?;

        let turn = match parts.get(1) {
            Some(field) => {
                let mut chars = field.chars();
                match (chars.next().and_then(Color::from_fen_char), chars.next()) {
                    (Some(color), None) => color,
                    _ => return Err(invalid(format!("Invalid side to move: {}", field))),
                }
            }
            None => Color::White,
        };

        let rights = match parts.get(2) {
            Some(field) => CastlingRights::from_fen(field)
                .ok_or_else(|| invalid(format!("Invalid castling field: {}", field)))?,
            None => CastlingRights::NONE,
        };

        let en_passant = match parts.get(3) {
            Some(&"-") | None => None,
            Some(field) => Some(
                Square::from_algebraic(field)
                    .ok_or_else(|| invalid(format!("Invalid en passant square: {}", field)))?,
            ),
        };

        let halfmove_clock = match parts.get(4) {
            Some(field) => field
                .parse()
                .map_err(|_| invalid(format!("Invalid halfmove clock: {}", field)))?,
            None => 0,
        };

        let fullmove_number = match parts.get(5) {
            Some(field) => field
                .parse()
                .map_err(|_| invalid(format!("Invalid fullmove number: {}", field)))?,
            None => 1,
        };

        Ok(GameState::from_parts(
            board,
            turn,
            rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
        ))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_SIZE {
            return Err(invalid(format!("Expected 8 ranks, got {}", rows.len())));
        }

        // FEN 从第 8 横线开始，正好对应 row 0
        for (row_idx, row) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in row.chars() {
                if col >= BOARD_SIZE {
                    return Err(invalid(format!("Rank {} has too many squares", 8 - row_idx)));
                }

                if let Some(empty_count) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    col += empty_count as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Square::new_unchecked(row_idx as u8, col as u8), Some(piece));
                    col += 1;
                } else {
                    return Err(invalid(format!("Invalid piece character: {}", c)));
                }
            }

            if col != BOARD_SIZE {
                return Err(invalid(format!(
                    "Rank {} has {} squares, expected 8",
                    8 - row_idx,
                    col
                )));
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = board.count(PieceKind::King, color);
            if kings != 1 {
                return Err(invalid(format!("{} has {} kings, expected 1", color, kings)));
            }
        }

        Ok(board)
    }

    /// 将对局状态转换为 FEN 字符串
    pub fn to_string(state: &GameState) -> String {
        format!(
            "{} {} {} {} {} {}",
            Self::board_to_string(&state.board),
            state.turn.to_fen_char(),
            state.castling.rights.to_fen(),
            state
                .en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic()),
            state.halfmove_clock,
            state.fullmove_number
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_SIZE);

        for row in 0..BOARD_SIZE as u8 {
            let mut rank = String::new();
            let mut empty_count = 0;

            for col in 0..BOARD_SIZE as u8 {
                if let Some(piece) = board.get(Square::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        rank.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    rank.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                rank.push_str(&empty_count.to_string());
            }

            rows.push(rank);
        }

        rows.join("/")
    }
}

impl GameState {
    /// 导出当前局面的 FEN
    pub fn to_fen(&self) -> String {
        Fen::to_string(self)
    }

    /// 从 FEN 建立局面
    pub fn from_fen(fen: &str) -> Result<GameState, ChessError> {
        Fen::parse(fen)
    }
}

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        reason: reason.into(),
    }
}
