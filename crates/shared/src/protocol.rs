use serde::{Deserialize, Serialize};

/// Event suffix of authoritative per-game broadcasts (`"<gameId> success"`)
pub const BROADCAST_SUFFIX: &str = " success";

/// Event name of the transport-level move acknowledgment
pub const MOVE_ACK_EVENT: &str = "move ack";

/// Messages sent from the client to the game server
///
/// Serialized as `{"event": <name>, "data": {...}}` frames.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "join game", rename_all = "camelCase")]
    JoinGame { game_id: String },
    #[serde(rename = "leave game", rename_all = "camelCase")]
    LeaveGame { game_id: String },
    #[serde(rename = "move", rename_all = "camelCase")]
    Move {
        game_id: String,
        #[serde(rename = "move")]
        token: String,
        actor: String,
    },
    #[serde(rename = "forfeit", rename_all = "camelCase")]
    Forfeit { game_id: String, actor: String },
    #[serde(rename = "suggest tie", rename_all = "camelCase")]
    SuggestTie { game_id: String, actor: String },
    #[serde(rename = "accept tie", rename_all = "camelCase")]
    AcceptTie { game_id: String, actor: String },
    #[serde(rename = "rematch", rename_all = "camelCase")]
    Rematch { game_id: String, actor: String },

    // Protocol violations reported back to the server
    #[serde(rename = "error")]
    Error { message: String },
}

impl ClientMessage {
    /// Game this message targets, if any
    pub fn game_id(&self) -> Option<&str> {
        match self {
            ClientMessage::JoinGame { game_id }
            | ClientMessage::LeaveGame { game_id }
            | ClientMessage::Move { game_id, .. }
            | ClientMessage::Forfeit { game_id, .. }
            | ClientMessage::SuggestTie { game_id, .. }
            | ClientMessage::AcceptTie { game_id, .. }
            | ClientMessage::Rematch { game_id, .. } => Some(game_id),
            ClientMessage::Error { .. } => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Raw inbound frame before its event name is interpreted
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl InboundFrame {
    /// Game id of a `"<gameId> success"` broadcast event
    pub fn broadcast_game_id(&self) -> Option<&str> {
        self.event
            .strip_suffix(BROADCAST_SUFFIX)
            .filter(|id| !id.is_empty())
    }

    pub fn is_move_ack(&self) -> bool {
        self.event == MOVE_ACK_EVENT
    }
}

/// Side to move as sent by the server
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

/// Authoritative game snapshot pushed after every move
///
/// Shape only. Status strings and move tokens are validated by the client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPayload {
    pub legal_moves: Vec<String>,
    pub turn: Turn,
    pub position: String,
    pub game_status: String,
    pub position_status: String,
    pub last_move_from: String,
    pub last_move_to: String,
    pub remaining_white_time: u64,
    pub remaining_black_time: u64,
    pub captured_pieces: Vec<(String, u32)>,
    pub player_white: String,
    pub player_black: String,
}

/// Transport acknowledgment for a submitted move
///
/// Arrives before the broadcast; used only to persist the resulting snapshot.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveAck {
    pub updated_time_white: u64,
    pub updated_time_black: u64,
    pub history_log: String,
    pub status: String,
    pub position_layout: String,
    pub game_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "legalMoves": ["e2e4", "a7a8Q/Promotion/a7a8Q"],
            "turn": "w",
            "position": "8/8/8/8/8/8/P7/8 w - - 0 1",
            "gameStatus": "STARTED",
            "positionStatus": "PLAYABLE",
            "lastMoveFrom": "e7",
            "lastMoveTo": "e5",
            "remainingWhiteTime": 300000,
            "remainingBlackTime": 298000,
            "capturedPieces": [["p", 2], ["N", 1]],
            "playerWhite": "alice",
            "playerBlack": "bob"
        })
    }

    #[test]
    fn test_move_message_wire_shape() {
        let msg = ClientMessage::Move {
            game_id: "g1".to_string(),
            token: "e2e4".to_string(),
            actor: "alice".to_string(),
        };
        let value = serde_json::to_value(&msg).expect("Should serialize");
        assert_eq!(
            value,
            json!({"event": "move", "data": {"gameId": "g1", "move": "e2e4", "actor": "alice"}})
        );
    }

    #[test]
    fn test_join_and_leave_event_names() {
        let join = serde_json::to_value(ClientMessage::JoinGame {
            game_id: "g7".to_string(),
        })
        .expect("Should serialize");
        let leave = serde_json::to_value(ClientMessage::LeaveGame {
            game_id: "g7".to_string(),
        })
        .expect("Should serialize");

        assert_eq!(join["event"], "join game");
        assert_eq!(join["data"]["gameId"], "g7");
        assert_eq!(leave["event"], "leave game");
    }

    #[test]
    fn test_client_messages_dedupe_in_sets() {
        //! Full equality lets outcomes holding a message derive `Eq`
        let mut seen = std::collections::HashSet::new();
        let join = ClientMessage::JoinGame {
            game_id: "g1".to_string(),
        };
        assert!(seen.insert(join.clone()));
        assert!(!seen.insert(join));
    }

    #[test]
    fn test_error_message_has_no_game() {
        let msg = ClientMessage::Error {
            message: "Incorrect game status".to_string(),
        };
        assert_eq!(msg.game_id(), None);
        assert_eq!(
            serde_json::to_value(&msg).expect("Should serialize"),
            json!({"event": "error", "data": {"message": "Incorrect game status"}})
        );
    }

    #[test]
    fn test_broadcast_payload_parses() {
        let payload: BroadcastPayload =
            serde_json::from_value(sample_payload()).expect("Should deserialize");

        assert_eq!(payload.turn, Turn::White);
        assert_eq!(payload.legal_moves.len(), 2);
        assert_eq!(payload.captured_pieces[0], ("p".to_string(), 2));
        assert_eq!(payload.player_black, "bob");
    }

    #[test]
    fn test_broadcast_payload_rejects_missing_field() {
        let mut value = sample_payload();
        value
            .as_object_mut()
            .expect("object")
            .remove("remainingBlackTime");
        assert!(serde_json::from_value::<BroadcastPayload>(value).is_err());
    }

    #[test]
    fn test_broadcast_payload_rejects_bad_turn() {
        let mut value = sample_payload();
        value["turn"] = json!("white");
        assert!(serde_json::from_value::<BroadcastPayload>(value).is_err());
    }

    #[test]
    fn test_frame_event_routing() {
        let broadcast = InboundFrame {
            event: "abc123 success".to_string(),
            data: serde_json::Value::Null,
        };
        let ack = InboundFrame {
            event: MOVE_ACK_EVENT.to_string(),
            data: serde_json::Value::Null,
        };
        let bare = InboundFrame {
            event: " success".to_string(),
            data: serde_json::Value::Null,
        };

        assert_eq!(broadcast.broadcast_game_id(), Some("abc123"));
        assert!(ack.is_move_ack());
        assert_eq!(ack.broadcast_game_id(), None);
        assert_eq!(bare.broadcast_game_id(), None);
    }

    #[test]
    fn test_move_ack_parses() {
        let ack: MoveAck = serde_json::from_value(json!({
            "updatedTimeWhite": 1000,
            "updatedTimeBlack": 2000,
            "historyLog": "e4",
            "status": "STARTED",
            "positionLayout": "8/8/8/8/4P3/8/8/8 b - - 0 1",
            "gameId": "g1"
        }))
        .expect("Should deserialize");
        assert_eq!(ack.game_id, "g1");
        assert_eq!(ack.updated_time_black, 2000);
    }
}
