//! Per-game session state machine
//!
//! A [`Session`] aggregates everything the board needs for one game id.
//! It changes through two entry points only:
//!
//! - user gestures: [`Session::select_origin`], [`Session::attempt_move`],
//!   [`Session::choose_promotion`]
//! - authoritative broadcasts: [`Session::apply_broadcast`]
//!
//! Gestures may patch the board optimistically; the next broadcast replaces
//! the board, legal moves, clocks, statuses and markers in one step and closes
//! any promotion menu.
//!
//! Outbound messages are returned to the caller rather than sent from here,
//! so the session stays free of transport concerns.

use shared::{BroadcastPayload, ClientMessage};
use tracing::{debug, warn};

use crate::game::board::{decode_layout, BoardView};
use crate::game::error::{GameError, GameResult, ProtocolError, ProtocolResult};
use crate::game::moves::{candidates_from, is_legal_target, parse_candidates, MoveCandidate};
use crate::game::resources::{
    resolve_promotion, CapturedPieces, GameClock, MovePhase, PendingPromotion, PromotionChoice,
    Selection,
};
use crate::game::status::{GameStatus, PositionStatus};
use crate::game::types::{Board, PieceColor, PieceNotation, Square};

/// Fully validated contents of one broadcast
///
/// Built before the session is touched, so a bad payload mutates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameUpdate {
    pub board: Board,
    /// Unrecognized layout symbols the decoder skipped
    pub skipped_symbols: usize,
    pub legal_moves: Vec<MoveCandidate>,
    pub white_turn: bool,
    pub status: GameStatus,
    pub position_status: PositionStatus,
    pub white_ms: u64,
    pub black_ms: u64,
    pub last_move_from: Option<Square>,
    pub last_move_to: Option<Square>,
    pub captured: CapturedPieces,
    pub player_white: String,
    pub player_black: String,
}

impl TryFrom<BroadcastPayload> for GameUpdate {
    type Error = ProtocolError;

    fn try_from(payload: BroadcastPayload) -> Result<Self, Self::Error> {
        let position_status: PositionStatus = payload.position_status.parse()?;
        let status: GameStatus = payload.game_status.parse()?;
        let legal_moves = parse_candidates(&payload.legal_moves)?;
        let captured = CapturedPieces::from_pairs(&payload.captured_pieces)?;
        let last_move_from = parse_marker(&payload.last_move_from)?;
        let last_move_to = parse_marker(&payload.last_move_to)?;
        let decoded = decode_layout(&payload.position);

        Ok(GameUpdate {
            board: decoded.board,
            skipped_symbols: decoded.skipped,
            legal_moves,
            white_turn: PieceColor::from(payload.turn) == PieceColor::White,
            status,
            position_status,
            white_ms: payload.remaining_white_time,
            black_ms: payload.remaining_black_time,
            last_move_from,
            last_move_to,
            captured,
            player_white: payload.player_white,
            player_black: payload.player_black,
        })
    }
}

impl GameUpdate {
    /// Validate a raw JSON payload
    pub fn from_value(value: serde_json::Value) -> ProtocolResult<Self> {
        let payload: BroadcastPayload = serde_json::from_value(value)?;
        GameUpdate::try_from(payload)
    }
}

/// Empty marker means no move has been played yet
fn parse_marker(raw: &str) -> ProtocolResult<Option<Square>> {
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

/// Result of dropping a piece on a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing matched; selection cleared, nothing to send
    Rejected,
    /// A single move; the message must be sent to the server
    Submitted(ClientMessage),
    /// Several promotion variants; the player has to pick one
    PromotionPending(Vec<PromotionChoice>),
}

/// Aggregate state for one game id
#[derive(Debug, Clone)]
pub struct Session {
    game_id: String,
    board: BoardView,
    legal_moves: Vec<MoveCandidate>,
    selection: Selection,
    phase: MovePhase,
    promotion: PendingPromotion,
    clock: GameClock,
    status: GameStatus,
    position_status: PositionStatus,
    last_move_from: Option<Square>,
    last_move_to: Option<Square>,
    captured: CapturedPieces,
    player_white: String,
    player_black: String,
    /// Number of broadcasts applied
    revision: u64,
}

impl Session {
    pub fn new(game_id: impl Into<String>) -> Self {
        Session {
            game_id: game_id.into(),
            board: BoardView::default(),
            legal_moves: Vec::new(),
            selection: Selection::default(),
            phase: MovePhase::Idle,
            promotion: PendingPromotion::default(),
            clock: GameClock::default(),
            status: GameStatus::Initializing,
            position_status: PositionStatus::Playable,
            last_move_from: None,
            last_move_to: None,
            captured: CapturedPieces::default(),
            player_white: String::new(),
            player_black: String::new(),
            revision: 0,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn board(&self) -> &Board {
        self.board.board()
    }

    pub fn board_view(&self) -> &BoardView {
        &self.board
    }

    pub fn legal_moves(&self) -> &[MoveCandidate] {
        &self.legal_moves
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> MovePhase {
        self.phase
    }

    pub fn promotion(&self) -> &PendingPromotion {
        &self.promotion
    }

    pub fn show_promotion_menu(&self) -> bool {
        self.promotion.is_active()
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn position_status(&self) -> PositionStatus {
        self.position_status
    }

    pub fn last_move(&self) -> (Option<Square>, Option<Square>) {
        (self.last_move_from, self.last_move_to)
    }

    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    pub fn player_white(&self) -> &str {
        &self.player_white
    }

    pub fn player_black(&self) -> &str {
        &self.player_black
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the game status still permits moves
    pub fn can_move(&self) -> bool {
        self.status.permits_moves()
    }

    /// Single guard for every gesture entry point
    ///
    /// With `origin`, also requires the piece there to belong to the side
    /// whose clock is running.
    fn ensure_can_move(&self, origin: Option<Square>) -> GameResult<()> {
        if !self.can_move() {
            return Err(GameError::GameOver {
                status: self.status.to_string(),
            });
        }
        if let Some(square) = origin {
            let piece = self
                .board()
                .get(square)
                .ok_or_else(|| GameError::EmptySquare {
                    square: square.to_string(),
                })?;
            if piece.color() != self.clock.active_side() {
                return Err(GameError::NotYourTurn {
                    color: color_name(piece.color()).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Pick up the piece on `square`
    ///
    /// Replaces any previous selection. The returned candidates may be empty,
    /// in which case no destination will ever be accepted.
    pub fn select_origin(&mut self, square: Square) -> GameResult<&[MoveCandidate]> {
        if self.phase == MovePhase::PromotionPending {
            return Err(GameError::PromotionInProgress);
        }
        if let Err(err) = self.ensure_can_move(Some(square)) {
            self.clear_selection();
            return Err(err);
        }

        self.selection.origin = Some(square);
        self.selection.candidates = candidates_from(&self.legal_moves, square);
        self.phase = MovePhase::OriginSelected;
        debug!(
            "[SESSION] {} picked {} ({} candidates)",
            self.game_id,
            square,
            self.selection.candidates.len()
        );
        Ok(&self.selection.candidates)
    }

    /// Drop the picked-up piece on `destination`
    pub fn attempt_move(&mut self, destination: Square, actor: &str) -> MoveOutcome {
        let origin = match (self.phase, self.selection.origin) {
            (MovePhase::OriginSelected, Some(origin)) => origin,
            _ => return MoveOutcome::Rejected,
        };
        if self.ensure_can_move(None).is_err() {
            self.clear_selection();
            return MoveOutcome::Rejected;
        }

        let Some(target) = is_legal_target(&self.selection.candidates, destination, self.board())
        else {
            debug!("[SESSION] {} {}→{} is not legal", self.game_id, origin, destination);
            self.clear_selection();
            return MoveOutcome::Rejected;
        };
        let matched = self.selection.candidates[target.move_index].clone();

        // Speculative until the next broadcast replaces it
        self.board = self.board.relocate(origin, destination);
        self.clear_selection();

        if matched.is_promotion_variant {
            let choices = resolve_promotion(&self.legal_moves, &matched);
            debug!(
                "[SESSION] {} promotion on {} with {} choices",
                self.game_id,
                destination,
                choices.len()
            );
            self.promotion.start(destination, choices.clone());
            self.phase = MovePhase::PromotionPending;
            return MoveOutcome::PromotionPending(choices);
        }

        MoveOutcome::Submitted(ClientMessage::Move {
            game_id: self.game_id.clone(),
            token: matched.literal,
            actor: actor.to_string(),
        })
    }

    /// Resolve a pending promotion with the chosen literal token
    pub fn choose_promotion(&mut self, literal: &str, actor: &str) -> GameResult<ClientMessage> {
        if !self.promotion.is_active() {
            return Err(GameError::NoPendingPromotion);
        }
        self.ensure_can_move(None)?;
        let choice = self
            .promotion
            .find(literal)
            .cloned()
            .ok_or_else(|| GameError::UnknownPromotion {
                token: literal.to_string(),
            })?;
        let message = ClientMessage::Move {
            game_id: self.game_id.clone(),
            token: choice.literal,
            actor: actor.to_string(),
        };

        // Show the chosen piece until the broadcast arrives
        if let (Some(square), Some(piece)) = (self.promotion.position, choice.piece) {
            let mut board = self.board().clone();
            board.set(square, promoted_for(piece, self.clock.active_side()));
            self.board = BoardView::Optimistic(board);
        }

        self.promotion.clear();
        self.phase = MovePhase::Idle;
        Ok(message)
    }

    /// Validate and apply an authoritative broadcast
    ///
    /// On error the session is left exactly as it was.
    pub fn apply_broadcast(&mut self, payload: BroadcastPayload) -> ProtocolResult<()> {
        let update = GameUpdate::try_from(payload)?;
        self.apply_update(update);
        Ok(())
    }

    /// Replace all authoritative fields and discard local speculation
    pub fn apply_update(&mut self, update: GameUpdate) {
        if update.skipped_symbols > 0 {
            warn!(
                "[SESSION] {} layout had {} unrecognized symbols",
                self.game_id, update.skipped_symbols
            );
        }

        self.board = BoardView::Authoritative(update.board);
        self.legal_moves = update.legal_moves;
        self.clock
            .correct(update.white_ms, update.black_ms, update.white_turn);
        self.status = update.status;
        self.position_status = update.position_status;
        self.last_move_from = update.last_move_from;
        self.last_move_to = update.last_move_to;
        self.captured = update.captured;
        self.player_white = update.player_white;
        self.player_black = update.player_black;

        self.promotion.clear();
        self.clear_selection();
        self.revision += 1;

        debug!(
            "[SESSION] {} revision {} status={} position={}",
            self.game_id, self.revision, self.status, self.position_status
        );
    }

    /// Advance the local countdown; returns false once the clock should stop
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        if !self.status.clock_runs() {
            return false;
        }
        self.clock.tick(elapsed_ms);
        true
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.phase = if self.promotion.is_active() {
            MovePhase::PromotionPending
        } else {
            MovePhase::Idle
        };
    }
}

/// Promotion symbols may arrive in either case; the mover's color wins
fn promoted_for(piece: PieceNotation, mover: PieceColor) -> PieceNotation {
    PieceNotation::new(piece.kind(), mover)
}

fn color_name(color: PieceColor) -> &'static str {
    match color {
        PieceColor::White => "white",
        PieceColor::Black => "black",
    }
}
