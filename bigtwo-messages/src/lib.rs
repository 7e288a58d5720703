//! Wire-level message types exchanged between a transport layer and the
//! rule engine. Every inbound action is a tagged variant with a fixed
//! schema; the transport validates the shape here before the engine ever
//! sees it.

use bigtwo_core::log::LogItem;
use bigtwo_core::{Card, GameError, PlayerId, RoomError, RoomId, SeqNum};
use serde::{Deserialize, Serialize};

/// Inbound player actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    JoinRoom {
        room_id: RoomId,
        player_id: PlayerId,
    },
    Play {
        room_id: RoomId,
        player_id: PlayerId,
        cards: Vec<Card>,
    },
    Pass {
        room_id: RoomId,
        player_id: PlayerId,
    },
    LeaveRoom {
        room_id: RoomId,
        player_id: PlayerId,
    },
    Rematch {
        room_id: RoomId,
    },
}

/// Flat error codes for the wire. The engine's two error enums collapse
/// into one client-facing namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrCode {
    NotYourTurn,
    CardsNotInHand,
    IllegalHandShape,
    DoesNotBeat,
    MustOpenWithThreeOfDiamonds,
    CannotPassOpeningTrick,
    GameNotStarted,
    GameOver,
    GameNotOver,
    RoomNotFound,
    RoomFull,
    AlreadyJoined,
    GameAlreadyStarted,
    PlayerNotInRoom,
}

impl From<GameError> for ErrCode {
    fn from(e: GameError) -> Self {
        match e {
            GameError::NotYourTurn => ErrCode::NotYourTurn,
            GameError::CardsNotInHand => ErrCode::CardsNotInHand,
            GameError::IllegalHandShape => ErrCode::IllegalHandShape,
            GameError::DoesNotBeat => ErrCode::DoesNotBeat,
            GameError::MustOpenWithThreeOfDiamonds => ErrCode::MustOpenWithThreeOfDiamonds,
            GameError::CannotPassOpeningTrick => ErrCode::CannotPassOpeningTrick,
            GameError::GameNotStarted => ErrCode::GameNotStarted,
            GameError::GameOver => ErrCode::GameOver,
            GameError::GameNotOver => ErrCode::GameNotOver,
        }
    }
}

impl From<RoomError> for ErrCode {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::RoomNotFound => ErrCode::RoomNotFound,
            RoomError::RoomFull => ErrCode::RoomFull,
            RoomError::AlreadyJoined => ErrCode::AlreadyJoined,
            RoomError::GameAlreadyStarted => ErrCode::GameAlreadyStarted,
            RoomError::PlayerNotInRoom => ErrCode::PlayerNotInRoom,
        }
    }
}

/// Per-action reply: the echoed action plus an error code if it was
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResp {
    pub action: Action,
    pub error: Option<ErrCode>,
}

impl ActionResp {
    pub fn ok(action: Action) -> Self {
        Self {
            action,
            error: None,
        }
    }

    pub fn err<E: Into<ErrCode>>(action: Action, error: E) -> Self {
        Self {
            action,
            error: Some(error.into()),
        }
    }
}

/// One broadcast room event, tagged with its log sequence number so
/// clients can request everything they missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub seq: SeqNum,
    pub item: LogItem,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// More of a demonstration of how to use these messages than an actual
    /// test. We should assume serde can serialize/deserialize correctly.
    #[test]
    fn demonstrate_usage() {
        let a = Action::JoinRoom {
            room_id: "t1".to_string(),
            player_id: "alice".to_string(),
        };
        let s = serde_json::to_string(&a).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["type"], "join_room");
        let b: Action = serde_json::from_str(&s).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejections_carry_flat_codes() {
        let action = Action::Pass {
            room_id: "t1".to_string(),
            player_id: "alice".to_string(),
        };
        let resp = ActionResp::err(action, GameError::NotYourTurn);
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["error"], "not_your_turn");
    }
}
