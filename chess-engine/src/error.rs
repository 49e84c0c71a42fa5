//! 引擎错误类型定义

use std::path::PathBuf;

use thiserror::Error;

/// 外部引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// 无法启动引擎进程
    #[error("Failed to spawn engine {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 等待引擎回复超时
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    /// 引擎输出不符合 UCI 协议
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// 配置文件格式错误
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// 引擎操作结果类型
pub type Result<T> = std::result::Result<T, EngineError>;
