use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared::protocol::InboundFrame;
use shared::{ClientMessage, MoveAck};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::game::error::{GameError, GameResult, ProtocolError, ProtocolResult};
use crate::game::{GameUpdate, MoveOutcome, Square};
use crate::networking::clock::ClockDriver;
use crate::networking::registry::{SessionRegistry, SharedSession};

/// Fire-and-forget sink for messages to the game server
pub trait Outbound: Send + Sync {
    fn send(&self, message: ClientMessage);
}

impl Outbound for mpsc::UnboundedSender<ClientMessage> {
    fn send(&self, message: ClientMessage) {
        if mpsc::UnboundedSender::send(self, message).is_err() {
            warn!("[NETWORK] Outbound channel closed, dropping message");
        }
    }
}

/// Receives move acknowledgments so the resulting snapshot can be persisted
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, ack: &MoveAck);
}

/// Default sink that only records acknowledgments in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSnapshotSink;

impl SnapshotSink for LogSnapshotSink {
    fn persist(&self, ack: &MoveAck) {
        info!(
            "[SNAPSHOT] {} status={} white={}ms black={}ms",
            ack.game_id, ack.status, ack.updated_time_white, ack.updated_time_black
        );
    }
}

/// Notifications for views that render sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A broadcast was applied
    Updated { game_id: String, revision: u64 },
    /// A broadcast was rejected; the session kept its previous state
    ProtocolError { game_id: Option<String>, message: String },
}

/// Subscription lifecycle and message routing for all sessions
pub struct GameClient {
    registry: Arc<SessionRegistry>,
    outbound: Arc<dyn Outbound>,
    snapshots: Arc<dyn SnapshotSink>,
    clocks: ClockDriver,
    listening: Mutex<HashSet<String>>,
    actor: String,
    events: broadcast::Sender<SessionEvent>,
}

impl GameClient {
    pub fn new(
        registry: Arc<SessionRegistry>,
        outbound: Arc<dyn Outbound>,
        actor: impl Into<String>,
        tick_period: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        GameClient {
            registry,
            outbound,
            snapshots: Arc::new(LogSnapshotSink),
            clocks: ClockDriver::new(tick_period),
            listening: Mutex::new(HashSet::new()),
            actor: actor.into(),
            events,
        }
    }

    pub fn with_snapshot_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.snapshots = sink;
        self
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn clocks(&self) -> &ClockDriver {
        &self.clocks
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Join a game and start listening for its broadcasts
    ///
    /// Resubscribing reuses the existing session, so its last known state
    /// is shown until the server replays the current one.
    pub fn subscribe(&self, game_id: &str) -> SharedSession {
        let session = self.registry.subscribe(game_id);
        if self.listening.lock().insert(game_id.to_string()) {
            info!("[NETWORK] Joining game {}", game_id);
            self.outbound.send(ClientMessage::JoinGame {
                game_id: game_id.to_string(),
            });
        }
        self.clocks.sync(game_id, &session);
        session
    }

    /// Leave a game; its session stays in the registry
    pub fn unsubscribe(&self, game_id: &str) {
        if self.listening.lock().remove(game_id) {
            info!("[NETWORK] Leaving game {}", game_id);
            self.outbound.send(ClientMessage::LeaveGame {
                game_id: game_id.to_string(),
            });
        }
        self.clocks.stop(game_id);
    }

    pub fn is_listening(&self, game_id: &str) -> bool {
        self.listening.lock().contains(game_id)
    }

    pub fn listening(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.listening.lock().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Route one inbound text frame
    pub fn handle_frame(&self, text: &str) -> ProtocolResult<()> {
        let frame: InboundFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(err) => {
                let err = ProtocolError::from(err);
                self.report(None, &err);
                return Err(err);
            }
        };

        if let Some(game_id) = frame.broadcast_game_id() {
            let game_id = game_id.to_string();
            return self.handle_broadcast(&game_id, frame.data);
        }
        if frame.is_move_ack() {
            return self.handle_ack(frame.data);
        }
        debug!("[NETWORK] Ignoring event {:?}", frame.event);
        Ok(())
    }

    /// Validate and apply a broadcast for `game_id`
    ///
    /// Validation completes before the session lock is taken, and the update
    /// is applied under a single write lock.
    pub fn handle_broadcast(&self, game_id: &str, data: serde_json::Value) -> ProtocolResult<()> {
        if !self.is_listening(game_id) {
            debug!("[NETWORK] Broadcast for detached game {}", game_id);
            return Ok(());
        }

        let update = match GameUpdate::from_value(data) {
            Ok(update) => update,
            Err(err) => {
                self.report(Some(game_id), &err);
                return Err(err);
            }
        };

        let session = self.registry.subscribe(game_id);
        let revision = {
            let mut guard = session.write();
            guard.apply_update(update);
            guard.revision()
        };
        self.clocks.reset(game_id, &session);
        let _ = self.events.send(SessionEvent::Updated {
            game_id: game_id.to_string(),
            revision,
        });
        Ok(())
    }

    fn handle_ack(&self, data: serde_json::Value) -> ProtocolResult<()> {
        match serde_json::from_value::<MoveAck>(data) {
            Ok(ack) => {
                self.snapshots.persist(&ack);
                Ok(())
            }
            Err(err) => {
                let err = ProtocolError::from(err);
                self.report(None, &err);
                Err(err)
            }
        }
    }

    /// Send a protocol error back to the server and notify views
    fn report(&self, game_id: Option<&str>, err: &ProtocolError) {
        warn!("[NETWORK] Protocol error for {:?}: {}", game_id, err);
        let message = err.to_string();
        self.outbound.send(ClientMessage::Error {
            message: message.clone(),
        });
        let _ = self.events.send(SessionEvent::ProtocolError {
            game_id: game_id.map(str::to_string),
            message,
        });
    }

    /// Piece picked up at `square`; returns the destinations to highlight
    pub fn pick_up(&self, game_id: &str, square: Square) -> GameResult<Vec<Square>> {
        let session = self.session(game_id)?;
        let mut guard = session.write();
        guard.select_origin(square)?;
        Ok(guard.selection().targets())
    }

    /// Piece dropped at `square`; sends the move if one matched
    pub fn drop_on(&self, game_id: &str, square: Square) -> MoveOutcome {
        let Ok(session) = self.session(game_id) else {
            return MoveOutcome::Rejected;
        };
        let outcome = session.write().attempt_move(square, &self.actor);
        if let MoveOutcome::Submitted(message) = &outcome {
            self.outbound.send(message.clone());
        }
        outcome
    }

    pub fn choose_promotion(&self, game_id: &str, literal: &str) -> GameResult<()> {
        let session = self.session(game_id)?;
        let message = session.write().choose_promotion(literal, &self.actor)?;
        self.outbound.send(message);
        Ok(())
    }

    /// Existing session for a gesture; gestures never create sessions
    fn session(&self, game_id: &str) -> GameResult<SharedSession> {
        self.registry.get(game_id).ok_or_else(|| GameError::UnknownGame {
            game_id: game_id.to_string(),
        })
    }

    pub fn forfeit(&self, game_id: &str) {
        self.outbound.send(ClientMessage::Forfeit {
            game_id: game_id.to_string(),
            actor: self.actor.clone(),
        });
    }

    pub fn suggest_tie(&self, game_id: &str) {
        self.outbound.send(ClientMessage::SuggestTie {
            game_id: game_id.to_string(),
            actor: self.actor.clone(),
        });
    }

    pub fn accept_tie(&self, game_id: &str) {
        self.outbound.send(ClientMessage::AcceptTie {
            game_id: game_id.to_string(),
            actor: self.actor.clone(),
        });
    }

    pub fn rematch(&self, game_id: &str) {
        self.outbound.send(ClientMessage::Rematch {
            game_id: game_id.to_string(),
            actor: self.actor.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;
    use serde_json::json;

    fn client() -> (GameClient, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = GameClient::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(tx),
            "alice",
            Duration::from_millis(1000),
        );
        (client, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ClientMessage>) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn frame(game_id: &str, status: &str) -> String {
        json!({
            "event": format!("{game_id} success"),
            "data": {
                "legalMoves": ["e2e4"],
                "turn": "w",
                "position": "8/8/8/8/8/8/4P3/8 w - - 0 1",
                "gameStatus": status,
                "positionStatus": "PLAYABLE",
                "lastMoveFrom": "",
                "lastMoveTo": "",
                "remainingWhiteTime": 5000,
                "remainingBlackTime": 5000,
                "capturedPieces": [],
                "playerWhite": "alice",
                "playerBlack": "bob"
            }
        })
        .to_string()
    }

    #[test]
    fn test_subscribe_sends_join_once() {
        let (client, mut rx) = client();
        client.subscribe("g1");
        client.subscribe("g1");

        assert_eq!(
            drain(&mut rx),
            vec![ClientMessage::JoinGame {
                game_id: "g1".to_string()
            }]
        );
        assert!(client.is_listening("g1"));
    }

    #[test]
    fn test_unsubscribe_keeps_session() {
        let (client, mut rx) = client();
        client.subscribe("g1");
        client.handle_frame(&frame("g1", "FM")).expect("valid frame");
        client.unsubscribe("g1");

        let sent = drain(&mut rx);
        assert_eq!(
            sent.last(),
            Some(&ClientMessage::LeaveGame {
                game_id: "g1".to_string()
            })
        );
        assert!(!client.is_listening("g1"));
        let session = client.registry().get("g1").expect("session kept");
        assert_eq!(session.read().status(), GameStatus::Fm);
    }

    #[test]
    fn test_detached_broadcast_is_ignored() {
        let (client, mut rx) = client();
        client.subscribe("g1");
        client.unsubscribe("g1");
        drain(&mut rx);

        client.handle_frame(&frame("g1", "FM")).expect("ignored");
        let session = client.registry().get("g1").expect("session kept");
        assert_eq!(session.read().revision(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_bad_status_reports_error() {
        //! Unknown status is sent back as an error frame and changes nothing
        let (client, mut rx) = client();
        client.subscribe("g1");
        drain(&mut rx);
        let mut events = client.events();

        assert!(client.handle_frame(&frame("g1", "BOGUS")).is_err());
        assert_eq!(
            drain(&mut rx),
            vec![ClientMessage::Error {
                message: "Incorrect game status: BOGUS".to_string()
            }]
        );
        assert!(matches!(
            events.try_recv(),
            Ok(SessionEvent::ProtocolError { .. })
        ));
        let session = client.registry().get("g1").expect("session");
        assert_eq!(session.read().status(), GameStatus::Initializing);
    }

    #[test]
    fn test_unparseable_frame_reports_error() {
        let (client, mut rx) = client();
        assert!(client.handle_frame("not json").is_err());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ClientMessage::Error { .. }]
        ));
    }

    #[test]
    fn test_drop_sends_single_move() {
        let (client, mut rx) = client();
        client.subscribe("g1");
        client.handle_frame(&frame("g1", "FM")).expect("valid frame");
        drain(&mut rx);

        let targets = client
            .pick_up("g1", "e2".parse().expect("square"))
            .expect("selectable");
        assert_eq!(targets, vec!["e4".parse::<Square>().expect("square")]);

        let outcome = client.drop_on("g1", "e4".parse().expect("square"));
        assert!(matches!(outcome, MoveOutcome::Submitted(_)));
        assert_eq!(
            drain(&mut rx),
            vec![ClientMessage::Move {
                game_id: "g1".to_string(),
                token: "e2e4".to_string(),
                actor: "alice".to_string(),
            }]
        );
    }

    #[test]
    fn test_social_actions_carry_actor() {
        let (client, mut rx) = client();
        client.forfeit("g1");
        client.suggest_tie("g1");
        client.accept_tie("g1");
        client.rematch("g1");

        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 4);
        assert_eq!(
            sent[0],
            ClientMessage::Forfeit {
                game_id: "g1".to_string(),
                actor: "alice".to_string()
            }
        );
        assert!(sent.iter().all(|m| m.game_id() == Some("g1")));
    }

    #[test]
    fn test_move_ack_reaches_sink() {
        struct Recording(Mutex<Vec<MoveAck>>);
        impl SnapshotSink for Recording {
            fn persist(&self, ack: &MoveAck) {
                self.0.lock().push(ack.clone());
            }
        }

        let (client, _rx) = client();
        let sink = Arc::new(Recording(Mutex::new(Vec::new())));
        let client = client.with_snapshot_sink(sink.clone());
        let ack = json!({
            "event": "move ack",
            "data": {
                "updatedTimeWhite": 1, "updatedTimeBlack": 2, "historyLog": "e4",
                "status": "STARTED", "positionLayout": "8/8/8/8 w", "gameId": "g1"
            }
        })
        .to_string();

        client.handle_frame(&ack).expect("valid ack");
        assert_eq!(sink.0.lock().len(), 1);
        assert_eq!(sink.0.lock()[0].game_id, "g1");
    }

    #[test]
    fn test_gestures_on_unknown_game_create_nothing() {
        let (client, mut rx) = client();
        let square: Square = "e2".parse().expect("square");

        assert!(matches!(
            client.pick_up("ghost", square),
            Err(GameError::UnknownGame { .. })
        ));
        assert_eq!(client.drop_on("ghost", square), MoveOutcome::Rejected);
        assert!(matches!(
            client.choose_promotion("ghost", "e7e8Q"),
            Err(GameError::UnknownGame { .. })
        ));
        assert!(!client.registry().contains("ghost"));
        assert!(drain(&mut rx).is_empty());
    }
}
