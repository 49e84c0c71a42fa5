//! 坐标记号
//!
//! 代数格名（`e4`）与 `(row, col)` 的互相转换，以及外部引擎使用的
//! 坐标走法（`e2e4`、`e7e8q`）。row 0 为第 8 横线，col 0 为 a 列。

use crate::moves::Move;
use crate::piece::{PieceKind, Square};

/// 代数格名转 `(row, col)`，非法输入返回 None
pub fn algebraic_to_coords(s: &str) -> Option<(u8, u8)> {
    Square::from_algebraic(s).map(|sq| (sq.row, sq.col))
}

/// `(row, col)` 转代数格名，越界返回 None
pub fn coords_to_algebraic(row: i32, col: i32) -> Option<String> {
    Square::new(row, col).map(|sq| sq.to_algebraic())
}

/// 解析坐标走法
///
/// 接受 4 个字符（`e2e4`），或带升变字母的 5 个字符（`e7e8q`）。
pub fn parse_coordinate_move(s: &str) -> Option<Move> {
    let s = s.trim();
    if !s.is_ascii() {
        return None;
    }
    let promotion = match s.len() {
        4 => None,
        5 => match s.as_bytes()[4].to_ascii_lowercase() {
            b'q' => Some(PieceKind::Queen),
            b'r' => Some(PieceKind::Rook),
            b'b' => Some(PieceKind::Bishop),
            b'n' => Some(PieceKind::Knight),
            _ => return None,
        },
        _ => return None,
    };
    let from = Square::from_algebraic(&s[0..2])?;
    let to = Square::from_algebraic(&s[2..4])?;
    Some(Move {
        from,
        to,
        promotion,
    })
}
