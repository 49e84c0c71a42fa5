//! 对局状态
//!
//! `GameState` 是一局棋的全部可变状态。只有 [`GameState::make_move`] 和
//! [`GameState::complete_promotion`] 会改变局面，每次改变后重新计算状态提示。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::castling::{CastleSide, CastlingRights, CastlingState};
use crate::constants::{
    ILLEGAL_MOVE_MESSAGE, NEW_GAME_MESSAGE, PROMOTION_REQUIRED_MESSAGE, STALEMATE_MESSAGE,
};
use crate::error::{ChessError, Result};
use crate::moves::{Move, MoveGenerator, MoveMap};
use crate::piece::{Color, Piece, PieceKind, Square};

/// 对局阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// 等待走子
    AwaitingMove,
    /// 兵到达底线，等待选择升变棋子
    AwaitingPromotion { square: Square },
    /// 对局结束，`winner` 为 `None` 表示和棋
    GameOver { winner: Option<Color> },
}

/// 状态提示的类别
///
/// 只有 `Check` 和 `PromotionRequired` 会在局面恢复正常后被清除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusKind {
    #[default]
    Empty,
    /// 外部设置的提示
    Info,
    Illegal,
    PromotionRequired,
    Promoted,
    Check,
    Checkmate,
    Stalemate,
}

/// 状态提示
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn clearable(&self) -> bool {
        matches!(self.kind, StatusKind::Check | StatusKind::PromotionRequired)
    }
}

/// 走子结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 走子完成，已轮到对方
    Moved { capture: bool },
    /// 兵到达底线，需要调用 `complete_promotion`
    PromotionRequired { square: Square, capture: bool },
}

/// 一局棋的完整状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castling: CastlingState,
    pub(crate) en_passant: Option<Square>,
    pub(crate) phase: Phase,
    /// 无吃子且无兵走动的半回合数（只记录，不用于判和）
    pub(crate) halfmove_clock: u32,
    /// 完整回合数，黑方走完后 +1
    pub(crate) fullmove_number: u32,
    pub(crate) status: Status,
    pub(crate) last_move: Option<Move>,
    pub(crate) last_move_was_capture: bool,
    /// 升变时吃掉的对方初始车，易位权待升变完成后再清除
    pending_rook_capture: Option<Square>,
}

impl GameState {
    /// 创建标准初始局面
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            turn: Color::White,
            castling: CastlingState::default(),
            en_passant: None,
            phase: Phase::AwaitingMove,
            halfmove_clock: 0,
            fullmove_number: 1,
            status: Status::new(StatusKind::Info, NEW_GAME_MESSAGE),
            last_move: None,
            last_move_was_capture: false,
            pending_rook_capture: None,
        }
    }

    /// 由已解析的各字段组装局面（FEN 导入使用）
    pub(crate) fn from_parts(
        board: Board,
        turn: Color,
        rights: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        let mut state = Self {
            board,
            turn,
            castling: CastlingState::from_board(rights, &board),
            en_passant,
            phase: Phase::AwaitingMove,
            halfmove_clock,
            fullmove_number,
            status: Status::default(),
            last_move: None,
            last_move_was_capture: false,
            pending_rook_capture: None,
        };
        state.update_status();
        state
    }

    /// 重置为初始局面
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 获取格子上的棋子，越界返回 None
    pub fn piece_at(&self, row: i32, col: i32) -> Option<Piece> {
        Square::new(row, col).and_then(|sq| self.board.get(sq))
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling.rights
    }

    pub fn king_moved(&self, color: Color) -> bool {
        self.castling.king_moved(color)
    }

    pub fn rook_moved(&self, color: Color, side: CastleSide) -> bool {
        self.castling.rook_moved(color, side)
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    /// 等待升变的格子
    pub fn needs_promotion(&self) -> Option<Square> {
        match self.phase {
            Phase::AwaitingPromotion { square } => Some(square),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// 胜方，和棋或未结束时为 None
    pub fn winner(&self) -> Option<Color> {
        match self.phase {
            Phase::GameOver { winner } => winner,
            _ => None,
        }
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status.message
    }

    /// 由调用方设置提示，`update_status` 不会清除它
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status = Status::new(StatusKind::Info, message);
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn last_move_was_capture(&self) -> bool {
        self.last_move_was_capture
    }

    /// 伪合法走法，`allow_castling` 为 false 时不生成易位
    pub fn moves_for(
        &self,
        square: Square,
        board: &Board,
        allow_castling: bool,
    ) -> BTreeSet<Square> {
        let castling = allow_castling.then_some(&self.castling);
        MoveGenerator::moves_for(board, square, self.en_passant, castling)
    }

    /// 指定阵营的全部合法走法
    pub fn legal_moves(&self, color: Color) -> MoveMap {
        MoveGenerator::legal_moves(&self.board, color, self.en_passant, &self.castling)
    }

    /// 某个格子上棋子的合法目标格
    pub fn legal_targets(&self, from: Square) -> BTreeSet<Square> {
        match self.board.get(from) {
            Some(piece) => self
                .legal_moves(piece.color)
                .remove(&from)
                .unwrap_or_default(),
            None => BTreeSet::new(),
        }
    }

    /// 在给定棋盘上检查指定阵营是否被将军
    pub fn in_check(&self, color: Color, board: &Board) -> bool {
        MoveGenerator::is_in_check(board, color)
    }

    /// 当前棋盘上指定阵营是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        MoveGenerator::is_in_check(&self.board, color)
    }

    pub fn can_castle(&self, color: Color, side: CastleSide, board: &Board) -> bool {
        self.castling.can_castle(color, side, board)
    }

    /// 模拟走法，返回新棋盘，当前局面不变
    pub fn simulate(&self, board: &Board, from: Square, to: Square) -> Board {
        MoveGenerator::simulate(board, from, to, self.en_passant)
    }

    /// 按坐标走子，失败返回 false
    pub fn make_move(&mut self, from: (i32, i32), to: (i32, i32)) -> bool {
        match (Square::new(from.0, from.1), Square::new(to.0, to.1)) {
            (Some(from), Some(to)) => self.try_make_move(from, to).is_ok(),
            _ => false,
        }
    }

    /// 走子
    ///
    /// 只有走法不在合法走法表中时才设置 "Illegal move." 提示，
    /// 其他失败情况不改变任何状态。
    pub fn try_make_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome> {
        match self.phase {
            Phase::GameOver { .. } => return Err(ChessError::GameOver),
            Phase::AwaitingPromotion { .. } => return Err(ChessError::PromotionPending),
            Phase::AwaitingMove => {}
        }
        if !from.is_valid() || !to.is_valid() {
            let bad = if from.is_valid() { to } else { from };
            return Err(ChessError::InvalidSquare {
                row: bad.row as i32,
                col: bad.col as i32,
            });
        }
        let piece = self.board.get(from).ok_or(ChessError::NoPiece { square: from })?;
        if piece.color != self.turn {
            return Err(ChessError::NotYourTurn);
        }

        let is_legal = self
            .legal_moves(piece.color)
            .get(&from)
            .is_some_and(|targets| targets.contains(&to));
        if !is_legal {
            debug!(%from, %to, "rejected illegal move");
            self.status = Status::new(StatusKind::Illegal, ILLEGAL_MOVE_MESSAGE);
            return Err(ChessError::IllegalMove { from, to });
        }

        self.status = Status::default();
        let previous_en_passant = self.en_passant.take();
        let captured = self.board.move_piece(from, to);
        let is_pawn = piece.kind == PieceKind::Pawn;

        // 兵走两格，记录越过的格子
        if is_pawn && from.row.abs_diff(to.row) == 2 {
            self.en_passant = from.offset(piece.color.pawn_direction(), 0);
        }

        let en_passant_capture = MoveGenerator::apply_side_effects(
            &mut self.board,
            piece,
            from,
            to,
            previous_en_passant,
        );
        let capture = captured.is_some() || en_passant_capture;

        if capture || is_pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        self.last_move = Some(Move::new(from, to));
        self.last_move_was_capture = capture;

        let rook_captured_on_home = captured
            .filter(|p| p.kind == PieceKind::Rook && p.color != piece.color)
            .map(|_| to);

        // 兵到达底线：等待升变，不换手也不更新易位权
        if is_pawn && to.row == piece.color.promotion_row() {
            debug!(%from, %to, "pawn promotion pending");
            self.pending_rook_capture = rook_captured_on_home;
            self.phase = Phase::AwaitingPromotion { square: to };
            self.status = Status::new(StatusKind::PromotionRequired, PROMOTION_REQUIRED_MESSAGE);
            return Ok(MoveOutcome::PromotionRequired { square: to, capture });
        }

        if piece.kind == PieceKind::King {
            self.castling.on_king_moved(piece.color);
        }
        if piece.kind == PieceKind::Rook {
            self.castling.on_rook_left(piece.color, from);
        }
        if let Some(at) = rook_captured_on_home {
            self.castling.on_rook_captured(piece.color.opponent(), at);
        }

        debug!(%from, %to, capture, "move played");
        self.switch_turn();
        self.update_status();
        Ok(MoveOutcome::Moved { capture })
    }

    /// 完成升变，失败返回 false
    pub fn complete_promotion(&mut self, kind: PieceKind) -> bool {
        self.try_complete_promotion(kind).is_ok()
    }

    /// 按字符完成升变（q/r/b/n），其他字符按后处理
    pub fn complete_promotion_char(&mut self, c: char) -> bool {
        self.complete_promotion(PieceKind::from_promotion_char(c))
    }

    /// 完成升变
    ///
    /// 升变棋子的颜色由所在行决定：row 0 为白方，row 7 为黑方。
    /// 这依赖于白方在下方的棋盘朝向。
    pub fn try_complete_promotion(&mut self, kind: PieceKind) -> Result<PieceKind> {
        let Phase::AwaitingPromotion { square } = self.phase else {
            return Err(ChessError::NoPromotionPending);
        };
        let kind = kind.promotion_or_queen();
        let color = if square.row == 0 {
            Color::White
        } else {
            Color::Black
        };

        let piece = Piece::new(kind, color);
        self.board.set(square, Some(piece));
        self.phase = Phase::AwaitingMove;
        self.halfmove_clock = 0;
        if let Some(at) = self.pending_rook_capture.take() {
            self.castling.on_rook_captured(color.opponent(), at);
        }
        self.last_move = self
            .last_move
            .map(|last| Move::with_promotion(last.from, last.to, kind));

        debug!(%square, kind = kind.name(), "pawn promoted");
        self.switch_turn();
        self.update_status();

        // 升变提示覆盖将军提示，只有对局结束时保留结果
        if !self.is_game_over() {
            self.status = Status::new(
                StatusKind::Promoted,
                format!("Pawn promoted to {}.", piece.to_fen_char()),
            );
        }
        Ok(kind)
    }

    /// 切换走子方
    fn switch_turn(&mut self) {
        if self.turn == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.turn = self.turn.opponent();
    }

    /// 为当前走子方计算将军、将死和逼和
    ///
    /// 局面正常时只清除将军和待升变提示，其他提示保持不变。
    pub fn update_status(&mut self) {
        let color = self.turn;
        let in_check = self.is_in_check(color);
        let has_moves = !self.legal_moves(color).is_empty();

        match (has_moves, in_check) {
            (false, true) => {
                let winner = color.opponent();
                self.phase = Phase::GameOver {
                    winner: Some(winner),
                };
                self.status = Status::new(
                    StatusKind::Checkmate,
                    format!("Checkmate! {} wins.", winner),
                );
                info!(%winner, "checkmate");
            }
            (false, false) => {
                self.phase = Phase::GameOver { winner: None };
                self.status = Status::new(StatusKind::Stalemate, STALEMATE_MESSAGE);
                info!("stalemate");
            }
            (true, true) => {
                self.status = Status::new(StatusKind::Check, format!("{} is in Check!", color));
            }
            (true, false) => {
                if self.status.clearable() {
                    self.status = Status::default();
                }
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn play(game: &mut GameState, from: &str, to: &str) {
        let outcome = game.try_make_move(sq(from), sq(to));
        assert!(outcome.is_ok(), "{}{} rejected: {:?}", from, to, outcome);
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.phase(), Phase::AwaitingMove);
        assert_eq!(game.status_message(), NEW_GAME_MESSAGE);
        assert_eq!(game.castling_rights(), CastlingRights::ALL);
        assert_eq!(game.en_passant_target(), None);
        assert_eq!(game.fullmove_number(), 1);
        assert_eq!(game.halfmove_clock(), 0);
    }

    #[test]
    fn test_wrong_turn_rejected_without_mutation() {
        let mut game = GameState::new();
        let before = game.clone();
        assert_eq!(
            game.try_make_move(sq("e7"), sq("e5")),
            Err(ChessError::NotYourTurn)
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_off_board_rejected() {
        let mut game = GameState::new();
        let before = game.clone();
        assert!(!game.make_move((6, 4), (8, 4)));
        assert!(!game.make_move((-1, 0), (4, 4)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_empty_square_rejected() {
        let mut game = GameState::new();
        assert_eq!(
            game.try_make_move(sq("e4"), sq("e5")),
            Err(ChessError::NoPiece { square: sq("e4") })
        );
    }

    #[test]
    fn test_illegal_move_sets_message() {
        let mut game = GameState::new();
        assert!(!game.make_move((6, 4), (3, 4)));
        assert_eq!(game.status_message(), ILLEGAL_MOVE_MESSAGE);
        assert_eq!(game.status().kind, StatusKind::Illegal);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(*game.board(), Board::initial());
    }

    #[test]
    fn test_counters() {
        let mut game = GameState::new();
        play(&mut game, "g1", "f3");
        assert_eq!(game.halfmove_clock(), 1);
        assert_eq!(game.fullmove_number(), 1);
        play(&mut game, "b8", "c6");
        assert_eq!(game.halfmove_clock(), 2);
        assert_eq!(game.fullmove_number(), 2);
        play(&mut game, "e2", "e4");
        assert_eq!(game.halfmove_clock(), 0);
        assert_eq!(game.last_move(), Some(Move::new(sq("e2"), sq("e4"))));
        assert!(!game.last_move_was_capture());
    }

    #[test]
    fn test_counters_saturate_at_max() {
        let mut game =
            GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 4294967295 4294967295").unwrap();
        assert!(game.make_move((0, 4), (0, 3)));
        assert_eq!(game.halfmove_clock(), u32::MAX);
        assert_eq!(game.fullmove_number(), u32::MAX);
        assert!(game.make_move((7, 4), (7, 3)));
        assert_eq!(game.halfmove_clock(), u32::MAX);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn test_en_passant_target_lifetime() {
        let mut game = GameState::new();
        play(&mut game, "e2", "e4");
        assert_eq!(game.en_passant_target(), Some(sq("e3")));
        play(&mut game, "g8", "f6");
        assert_eq!(game.en_passant_target(), None);
        play(&mut game, "e4", "e5");
        assert_eq!(game.en_passant_target(), None);
    }

    #[test]
    fn test_en_passant_capture() {
        let mut game = GameState::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "a7", "a6");
        play(&mut game, "e4", "e5");
        play(&mut game, "d7", "d5");
        assert_eq!(game.en_passant_target(), Some(sq("d6")));

        play(&mut game, "e5", "d6");
        assert!(game.board().is_empty(sq("d5")));
        assert_eq!(
            game.board().get(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        assert!(game.last_move_was_capture());
        assert_eq!(game.halfmove_clock(), 0);
    }

    #[test]
    fn test_en_passant_expires() {
        let mut game = GameState::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "a7", "a6");
        play(&mut game, "e4", "e5");
        play(&mut game, "d7", "d5");
        play(&mut game, "h2", "h3");
        play(&mut game, "h7", "h6");
        assert!(!game.legal_targets(sq("e5")).contains(&sq("d6")));
    }

    #[test]
    fn test_moves_after_game_over_rejected() {
        let mut game = GameState::new();
        play(&mut game, "f2", "f3");
        play(&mut game, "e7", "e5");
        play(&mut game, "g2", "g4");
        play(&mut game, "d8", "h4");
        assert!(game.is_game_over());
        assert_eq!(
            game.try_make_move(sq("a2"), sq("a3")),
            Err(ChessError::GameOver)
        );
    }

    #[test]
    fn test_promotion_blocks_moves() {
        let mut game = GameState::new();
        game.phase = Phase::AwaitingPromotion { square: sq("a8") };
        assert_eq!(
            game.try_make_move(sq("e2"), sq("e4")),
            Err(ChessError::PromotionPending)
        );
        assert!(!GameState::new().complete_promotion(PieceKind::Queen));
    }

    #[test]
    fn test_status_idempotent_keeps_external_message() {
        let mut game = GameState::new();
        game.set_status_message("Human vs Human game started.");
        game.update_status();
        game.update_status();
        assert_eq!(game.status_message(), "Human vs Human game started.");
        assert!(!game.is_game_over());
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_check_message_cleared() {
        let mut game = GameState::new();
        play(&mut game, "e2", "e4");
        play(&mut game, "f7", "f6");
        play(&mut game, "d1", "h5");
        assert_eq!(game.status_message(), "Black is in Check!");
        play(&mut game, "g7", "g6");
        assert_eq!(game.status_message(), "");
        assert_eq!(game.status().kind, StatusKind::Empty);
    }

    #[test]
    fn test_reset() {
        let mut game = GameState::new();
        play(&mut game, "e2", "e4");
        game.reset();
        assert_eq!(game, GameState::new());
    }
}
