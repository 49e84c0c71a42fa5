//! 外部国际象棋引擎接入
//!
//! 包含:
//! - 走法来源抽象（`MoveSource`）
//! - UCI 引擎进程句柄
//! - 引擎配置

mod config;
mod error;
mod source;
mod uci;

pub use config::{EngineConfig, ENGINE_PATH_ENV};
pub use error::{EngineError, Result};
pub use source::{request_move, MoveSource};
pub use uci::{parse_bestmove, UciEngine};
