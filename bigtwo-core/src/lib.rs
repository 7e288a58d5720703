pub mod cards;
pub mod log;
pub mod room;
pub mod score;
pub mod state;

pub use cards::{card, deck, play};
pub use cards::{Card, Deck, Play, PlayClass};

/// A game always seats exactly four players.
pub const NUM_SEATS: usize = 4;
/// Every seat is dealt a quarter of the deck.
pub const HAND_SIZE: usize = 13;

pub type PlayerId = String;
pub type RoomId = String;
pub type SeqNum = usize;
pub type SeatIdx = usize;

/// A rule violation: the acting player's move is rejected and the room state
/// is left untouched. All of these are recoverable by retrying with a
/// corrected action.
#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GameError {
    NotYourTurn,
    CardsNotInHand,
    IllegalHandShape,
    DoesNotBeat,
    MustOpenWithThreeOfDiamonds,
    CannotPassOpeningTrick,
    GameNotStarted,
    GameOver,
    GameNotOver,
}

/// Rejections raised at the room boundary, before any card logic runs.
#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RoomError {
    RoomNotFound,
    RoomFull,
    AlreadyJoined,
    GameAlreadyStarted,
    PlayerNotInRoom,
}
