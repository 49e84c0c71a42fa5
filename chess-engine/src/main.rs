//! 向外部引擎请求一步走法
//!
//! 用法：`bestmove [FEN]`，不给 FEN 时使用初始局面。

use anyhow::{Context, Result};
use chess_engine::{request_move, EngineConfig, UciEngine};
use chess_rules::{GameState, INITIAL_FEN};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chess_engine=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let fen = if args.is_empty() {
        INITIAL_FEN.to_string()
    } else {
        args.join(" ")
    };

    let mut game = GameState::from_fen(&fen).with_context(|| format!("无效的 FEN: {}", fen))?;
    if game.is_game_over() {
        println!("{}", game.status_message());
        return Ok(());
    }

    let config = EngineConfig::load();
    info!("使用引擎: {:?}", config.path);
    let mut engine = UciEngine::spawn(config).context("无法启动引擎")?;

    match request_move(&mut game, &mut engine) {
        Some(mv) => {
            println!("{}", mv);
            println!("{}", game.to_fen());
            if !game.status_message().is_empty() {
                println!("{}", game.status_message());
            }
        }
        None => println!("(none)"),
    }

    Ok(())
}
