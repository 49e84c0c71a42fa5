//! 国际象棋规则引擎
//!
//! 包含:
//! - 棋子、棋盘、格子等核心数据结构
//! - 伪合法走法生成与合法性过滤
//! - 王车易位、吃过路兵、升变
//! - 将军、将死、逼和判定
//! - FEN 导入导出与坐标记号

mod board;
mod castling;
mod constants;
mod error;
mod fen;
mod game;
mod moves;
mod notation;
mod piece;

pub use board::Board;
pub use castling::{CastleSide, CastlingRights, CastlingState};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use game::{GameState, MoveOutcome, Phase, Status, StatusKind};
pub use moves::{Move, MoveGenerator, MoveMap};
pub use notation::{algebraic_to_coords, coords_to_algebraic, parse_coordinate_move};
pub use piece::{Color, Piece, PieceKind, Square};
