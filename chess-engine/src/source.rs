//! 走法来源
//!
//! 外部引擎只读取 FEN、返回坐标走法。无论是没有引擎、引擎不回复
//! 还是回复无法解析，在这里都只表现为“没有走法”。

use chess_rules::{GameState, Move, MoveOutcome, PieceKind};
use tracing::{debug, warn};

/// 能为给定局面给出一步走法的对象
pub trait MoveSource {
    /// 返回 FEN 局面下的走法，无法给出时为 `None`
    fn best_move(&mut self, fen: &str) -> Option<Move>;
}

/// 向走法来源请求一步并在对局中执行
///
/// 对局已结束或正在等待升变时不请求。引擎的升变字母用于完成升变，
/// 没有给出时升变为后。返回实际执行的走法。
pub fn request_move(game: &mut GameState, source: &mut dyn MoveSource) -> Option<Move> {
    if game.is_game_over() || game.needs_promotion().is_some() {
        return None;
    }

    let fen = game.to_fen();
    let mut mv = source.best_move(&fen)?;

    match game.try_make_move(mv.from, mv.to) {
        Ok(MoveOutcome::Moved { .. }) => {
            mv.promotion = None;
        }
        Ok(MoveOutcome::PromotionRequired { .. }) => {
            let kind = mv.promotion.unwrap_or(PieceKind::Queen);
            if !game.complete_promotion(kind) {
                warn!(%mv, "promotion could not be completed");
                return None;
            }
            mv.promotion = Some(kind.promotion_or_queen());
        }
        Err(e) => {
            warn!(%mv, "engine move rejected: {}", e);
            return None;
        }
    }

    debug!(%mv, fen = %game.to_fen(), "engine move played");
    Some(mv)
}
