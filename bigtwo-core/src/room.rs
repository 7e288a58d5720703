//! Multi-room bookkeeping. One process hosts many rooms; each room's state
//! sits behind its own mutex so actions within a room serialize while
//! different rooms proceed independently.

use crate::cards::Card;
use crate::log::LogItem;
use crate::state::{RoomState, State};
use crate::{GameError, PlayerId, RoomError, RoomId, SeqNum};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Everything that can go wrong when acting on a room through the manager.
#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum ActionError {
    Room(RoomError),
    Game(GameError),
}

impl std::error::Error for ActionError {}

/// Lobby-level view of one room.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub player_count: usize,
    pub state: State,
}

#[derive(Default)]
pub struct RoomManager {
    rooms: Mutex<HashMap<RoomId, Arc<Mutex<RoomState>>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room if it does not exist. Returns whether a room was
    /// actually created.
    pub fn create_room(&self, room_id: &str) -> bool {
        let mut rooms = self.rooms.lock();
        if rooms.contains_key(room_id) {
            return false;
        }
        info!(room = %room_id, "room created");
        rooms.insert(room_id.to_string(), Arc::new(Mutex::new(RoomState::new())));
        true
    }

    fn room(&self, room_id: &str) -> Result<Arc<Mutex<RoomState>>, RoomError> {
        self.rooms
            .lock()
            .get(room_id)
            .cloned()
            .ok_or(RoomError::RoomNotFound)
    }

    /// Seat a player in a room. Creates the room on first use so that
    /// joining a fresh room id just works.
    pub fn join_room(&self, room_id: &str, player_id: PlayerId) -> Result<(), RoomError> {
        self.create_room(room_id);
        let room = self.room(room_id)?;
        let mut state = room.lock();
        state.join(player_id)
    }

    pub fn submit_play(
        &self,
        room_id: &str,
        player_id: &str,
        cards: &[Card],
    ) -> Result<(), ActionError> {
        let room = self.room(room_id)?;
        let mut state = room.lock();
        if state.seat_idx(player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom.into());
        }
        state.play(player_id, cards)?;
        Ok(())
    }

    pub fn submit_pass(&self, room_id: &str, player_id: &str) -> Result<(), ActionError> {
        let room = self.room(room_id)?;
        let mut state = room.lock();
        if state.seat_idx(player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom.into());
        }
        state.pass(player_id)?;
        Ok(())
    }

    /// Take a player out of a room. Before the deal and after the game the
    /// seat is simply removed; mid-game the seat is forfeited instead so
    /// the card count stays whole. An emptied waiting room is destroyed.
    pub fn leave_room(&self, room_id: &str, player_id: &str) -> Result<(), RoomError> {
        let room = self.room(room_id)?;
        let mut state = room.lock();
        let idx = state.seat_idx(player_id).ok_or(RoomError::PlayerNotInRoom)?;
        if matches!(state.state(), State::InProgress) {
            state.forfeit_seat(idx);
        } else {
            state.remove_seat(idx);
        }
        let empty = state.player_count() == 0;
        drop(state);
        if empty {
            self.destroy_room(room_id);
        }
        Ok(())
    }

    pub fn rematch(&self, room_id: &str) -> Result<(), ActionError> {
        let room = self.room(room_id)?;
        let mut state = room.lock();
        state.rematch()?;
        Ok(())
    }

    pub fn destroy_room(&self, room_id: &str) -> bool {
        let removed = self.rooms.lock().remove(room_id).is_some();
        if removed {
            info!(room = %room_id, "room destroyed");
        }
        removed
    }

    pub fn summary(&self, room_id: &str) -> Result<RoomSummary, RoomError> {
        let room = self.room(room_id)?;
        let state = room.lock();
        Ok(RoomSummary {
            room_id: room_id.to_string(),
            player_count: state.player_count(),
            state: state.state(),
        })
    }

    /// Summaries of every live room, for the lobby listing.
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.lock();
        let mut out: Vec<RoomSummary> = rooms
            .iter()
            .map(|(id, room)| {
                let state = room.lock();
                RoomSummary {
                    room_id: id.clone(),
                    player_count: state.player_count(),
                    state: state.state(),
                }
            })
            .collect();
        out.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        out
    }

    /// Room events newer than `oldest_seq`, redacted for `player_id`.
    pub fn events_since(
        &self,
        room_id: &str,
        player_id: &str,
        oldest_seq: SeqNum,
    ) -> Result<Vec<(SeqNum, LogItem)>, RoomError> {
        let room = self.room(room_id)?;
        let state = room.lock();
        if state.seat_idx(player_id).is_none() {
            return Err(RoomError::PlayerNotInRoom);
        }
        Ok(state.events_since(oldest_seq, player_id).collect())
    }
}
