//! 引擎配置
//!
//! 配置文件为 `<配置目录>/chess-engine/engine.json`，缺失或无效时使用默认值。
//! 环境变量 `CHESS_ENGINE_PATH` 可覆盖引擎路径。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 覆盖引擎路径的环境变量
pub const ENGINE_PATH_ENV: &str = "CHESS_ENGINE_PATH";

/// 外部 UCI 引擎配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 引擎可执行文件
    pub path: PathBuf,
    /// 启动参数
    pub args: Vec<String>,
    /// 每步思考时间（毫秒）
    pub think_time_ms: u64,
    /// 等待引擎回复的超时（毫秒），思考时间另计
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            think_time_ms: 500,
            timeout_ms: 5000,
        }
    }
}

impl EngineConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("chess-engine");
            path.push("engine.json");
            path
        })
    }

    /// 从默认位置加载配置，并应用环境变量覆盖
    pub fn load() -> Self {
        let config = match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    tracing::info!("已加载引擎配置: {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("引擎配置无效: {}，使用默认配置", e);
                    Self::default()
                }
            },
            Some(_) => {
                tracing::info!("引擎配置文件不存在，使用默认配置");
                Self::default()
            }
            None => {
                tracing::warn!("无法获取配置目录，使用默认配置");
                Self::default()
            }
        };
        config.with_path_override(std::env::var_os(ENGINE_PATH_ENV))
    }

    /// 从指定文件加载配置
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存到指定文件
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("引擎配置已保存: {:?}", path);
        Ok(())
    }

    /// 用给定值覆盖引擎路径（空值忽略）
    pub fn with_path_override(mut self, path: Option<OsString>) -> Self {
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            self.path = PathBuf::from(path);
        }
        self
    }
}
