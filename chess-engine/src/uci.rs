//! UCI 引擎进程
//!
//! 启动外部引擎，完成 `uci`/`isready` 握手后，每次请求发送
//! `position fen` 和 `go movetime`，读取 `bestmove`。
//! 引擎输出由后台线程逐行转发，读取时带超时。
//! 超时的搜索会补发 `stop`，它迟到的 `bestmove` 在之后的请求中被丢弃。

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chess_rules::{parse_coordinate_move, Move};
use tracing::{debug, info, warn};
use uci_parser::{UciCommand, UciSearchOptions};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::source::MoveSource;

/// 发送 quit 后等待引擎退出的时间
const QUIT_GRACE: Duration = Duration::from_millis(200);

/// 外部 UCI 引擎句柄
///
/// 句柄拥有引擎子进程，析构时发送 `quit` 并回收进程。
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    config: EngineConfig,
    /// 已超时但尚未收到 `bestmove` 的搜索数
    stale_searches: usize,
}

impl UciEngine {
    /// 启动引擎并完成握手
    pub fn spawn(config: EngineConfig) -> Result<Self> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine stdout unavailable".to_string()))?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut engine = Self {
            child,
            stdin,
            lines,
            config,
            stale_searches: 0,
        };
        engine.handshake()?;
        info!("引擎已启动: {:?}", engine.config.path);
        Ok(engine)
    }

    fn handshake(&mut self) -> Result<()> {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        self.send(UciCommand::Uci)?;
        self.wait_for("uciok", Instant::now() + timeout)?;
        self.send(UciCommand::IsReady)?;
        self.wait_for("readyok", Instant::now() + timeout)?;
        Ok(())
    }

    fn send(&mut self, command: UciCommand) -> Result<()> {
        let line = command.to_string();
        debug!(command = %line, "-> engine");
        writeln!(self.stdin, "{}", line)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// 读取引擎输出，直到某行以 `prefix` 开头
    fn wait_for(&mut self, prefix: &'static str, deadline: Instant) -> Result<String> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    debug!(line = %line, "<- engine");
                    if line.trim_start().starts_with(prefix) {
                        return Ok(line);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(EngineError::Timeout(prefix)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::Protocol(format!(
                        "engine exited before sending {}",
                        prefix
                    )))
                }
            }
        }
    }

    /// 等待本次搜索的 `bestmove`，跳过之前超时搜索的回复
    fn wait_for_bestmove(&mut self, deadline: Instant) -> Result<String> {
        loop {
            let line = self.wait_for("bestmove", deadline)?;
            if self.stale_searches == 0 {
                return Ok(line);
            }
            self.stale_searches -= 1;
            debug!(line = %line, "discarding late bestmove");
        }
    }

    /// 丢弃请求之间积压的输出
    fn drain_pending(&mut self) {
        while let Ok(line) = self.lines.try_recv() {
            if self.stale_searches > 0 && line.trim_start().starts_with("bestmove") {
                self.stale_searches -= 1;
                debug!(line = %line, "discarding late bestmove");
            }
        }
    }

    /// 请求指定局面的最佳走法，引擎认输或无棋可走时为 `None`
    pub fn go(&mut self, fen: &str) -> Result<Option<Move>> {
        self.drain_pending();
        self.send(UciCommand::Position {
            fen: Some(fen.to_string()),
            moves: Vec::new(),
        })?;
        self.send(UciCommand::Go(UciSearchOptions {
            movetime: Some(Duration::from_millis(self.config.think_time_ms)),
            ..Default::default()
        }))?;

        let timeout = Duration::from_millis(self.config.think_time_ms + self.config.timeout_ms);
        match self.wait_for_bestmove(Instant::now() + timeout) {
            Ok(line) => Ok(parse_bestmove(&line)),
            Err(e @ EngineError::Timeout(_)) => {
                // 搜索仍在进行，它的 bestmove 迟早会到
                self.stale_searches += 1;
                let _ = self.send(UciCommand::Stop);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

impl MoveSource for UciEngine {
    fn best_move(&mut self, fen: &str) -> Option<Move> {
        match self.go(fen) {
            Ok(Some(mv)) => {
                info!(%mv, "engine suggests");
                Some(mv)
            }
            Ok(None) => {
                warn!("engine returned no move");
                None
            }
            Err(e) => {
                warn!("engine request failed: {}", e);
                None
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send(UciCommand::Quit);
        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => break,
            }
        }
        // 引擎没有响应 quit
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// 解析 `bestmove <move> [ponder <move>]` 行
pub fn parse_bestmove(line: &str) -> Option<Move> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    tokens.next().and_then(parse_coordinate_move)
}
