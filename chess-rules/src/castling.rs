//! 王车易位
//!
//! 易位权只会被清除，不会恢复。是否经过被攻击的格子不在这里检查，
//! 落点安全由合法性过滤保证。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::constants::{KINGSIDE_ROOK_COL, KING_HOME_COL, QUEENSIDE_ROOK_COL};
use crate::piece::{Color, PieceKind, Square};

/// 易位方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    /// 王翼（短易位）
    Kingside,
    /// 后翼（长易位）
    Queenside,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    fn index(&self) -> usize {
        match self {
            CastleSide::Kingside => 0,
            CastleSide::Queenside => 1,
        }
    }

    /// 车的初始列
    pub fn rook_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => KINGSIDE_ROOK_COL,
            CastleSide::Queenside => QUEENSIDE_ROOK_COL,
        }
    }

    /// 易位后王所在列
    pub fn king_target_col(&self) -> u8 {
        match self {
            CastleSide::Kingside => KING_HOME_COL + 2,
            CastleSide::Queenside => KING_HOME_COL - 2,
        }
    }

    /// 车的初始格
    pub fn rook_home(&self, color: Color) -> Square {
        Square::new_unchecked(color.back_row(), self.rook_col())
    }

    /// 根据王横移的方向判断易位方向
    pub fn from_king_step(from: Square, to: Square) -> CastleSide {
        if to.col > from.col {
            CastleSide::Kingside
        } else {
            CastleSide::Queenside
        }
    }

    /// 王横移两格时，车的起点与终点
    pub fn rook_squares(king_from: Square, king_to: Square) -> (Square, Square) {
        let side = Self::from_king_step(king_from, king_to);
        let rook_to_col = match side {
            CastleSide::Kingside => king_to.col - 1,
            CastleSide::Queenside => king_to.col + 1,
        };
        (
            Square::new_unchecked(king_from.row, side.rook_col()),
            Square::new_unchecked(king_from.row, rook_to_col),
        )
    }

    /// 王和车之间的列（不含两端）
    fn between_cols(&self) -> std::ops::Range<u8> {
        match self {
            CastleSide::Kingside => (KING_HOME_COL + 1)..KINGSIDE_ROOK_COL,
            CastleSide::Queenside => (QUEENSIDE_ROOK_COL + 1)..KING_HOME_COL,
        }
    }
}

/// 易位权（KQkq）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    /// 全部保留
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    /// 全部失去
    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn get(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => self.white_kingside,
            (Color::White, CastleSide::Queenside) => self.white_queenside,
            (Color::Black, CastleSide::Kingside) => self.black_kingside,
            (Color::Black, CastleSide::Queenside) => self.black_queenside,
        }
    }

    /// 清除一项易位权
    pub fn clear(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::Kingside) => self.white_kingside = false,
            (Color::White, CastleSide::Queenside) => self.white_queenside = false,
            (Color::Black, CastleSide::Kingside) => self.black_kingside = false,
            (Color::Black, CastleSide::Queenside) => self.black_queenside = false,
        }
    }

    /// FEN 易位字段
    pub fn to_fen(&self) -> String {
        let mut s = String::new();
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// 解析 FEN 易位字段
    pub fn from_fen(field: &str) -> Option<CastlingRights> {
        let mut rights = CastlingRights::NONE;
        if field == "-" {
            return Some(rights);
        }
        for c in field.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return None,
            }
        }
        Some(rights)
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}

/// 易位相关的全部记录：易位权、王是否动过、各初始车是否动过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastlingState {
    pub rights: CastlingRights,
    king_moved: [bool; 2],
    /// `rook_moved[color][side]`
    rook_moved: [[bool; 2]; 2],
}

impl CastlingState {
    pub fn new(rights: CastlingRights) -> Self {
        Self {
            rights,
            king_moved: [false; 2],
            rook_moved: [[false; 2]; 2],
        }
    }

    /// 按棋盘上的实际位置推断王和车是否动过（用于从 FEN 建立局面）
    pub fn from_board(rights: CastlingRights, board: &Board) -> Self {
        let mut state = Self::new(rights);
        for color in [Color::White, Color::Black] {
            let king_home = Square::new_unchecked(color.back_row(), KING_HOME_COL);
            state.king_moved[color.index()] =
                !board.get(king_home).is_some_and(|p| p.is(PieceKind::King, color));
            for side in CastleSide::BOTH {
                state.rook_moved[color.index()][side.index()] = !board
                    .get(side.rook_home(color))
                    .is_some_and(|p| p.is(PieceKind::Rook, color));
            }
        }
        state
    }

    pub fn king_moved(&self, color: Color) -> bool {
        self.king_moved[color.index()]
    }

    pub fn rook_moved(&self, color: Color, side: CastleSide) -> bool {
        self.rook_moved[color.index()][side.index()]
    }

    /// 检查易位的基本条件：王车均未动过、车仍在原位、中间无子、易位权仍在
    pub fn can_castle(&self, color: Color, side: CastleSide, board: &Board) -> bool {
        if self.king_moved(color) || !self.rights.get(color, side) {
            return false;
        }
        if self.rook_moved(color, side) {
            return false;
        }
        let rook_home = side.rook_home(color);
        if !board.get(rook_home).is_some_and(|p| p.is(PieceKind::Rook, color)) {
            return false;
        }
        side.between_cols()
            .all(|col| board.is_empty(Square::new_unchecked(rook_home.row, col)))
    }

    /// 王走动后，该方失去全部易位权
    pub fn on_king_moved(&mut self, color: Color) {
        self.king_moved[color.index()] = true;
        for side in CastleSide::BOTH {
            self.rights.clear(color, side);
        }
    }

    /// 己方车离开初始格
    pub fn on_rook_left(&mut self, color: Color, from: Square) {
        if let Some(side) = Self::home_side(color, from) {
            self.rights.clear(color, side);
            self.rook_moved[color.index()][side.index()] = true;
        }
    }

    /// 对方车在初始格上被吃
    pub fn on_rook_captured(&mut self, captured_color: Color, at: Square) {
        if let Some(side) = Self::home_side(captured_color, at) {
            self.rights.clear(captured_color, side);
        }
    }

    fn home_side(color: Color, sq: Square) -> Option<CastleSide> {
        CastleSide::BOTH
            .into_iter()
            .find(|side| side.rook_home(color) == sq)
    }
}
