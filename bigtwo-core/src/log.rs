use crate::cards::{Card, PlayClass};
use crate::state::State;
use crate::{PlayerId, SeqNum};
use serde::{Deserialize, Serialize};

/// One outbound room event. The transport layer broadcasts these to room
/// members; `HandDealt` payloads are redacted for everyone but their owner
/// (see [`crate::state::RoomState::events_since`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogItem {
    PlayerJoined(PlayerId),
    /// Private per-player deal. `None` is the redacted form other players see.
    HandDealt(PlayerId, Option<Vec<Card>>),
    CardsPlayed(PlayerId, Vec<Card>, PlayClass),
    PlayerPassed(PlayerId),
    TurnChanged(PlayerId),
    TrickWon(PlayerId),
    PlayerForfeited(PlayerId),
    PlayerLeft(PlayerId),
    StateChange(State, State),
    /// Finish order plus cards left per seat at the end.
    GameEnded(Vec<PlayerId>, Vec<(PlayerId, usize)>),
}

fn write_cards(f: &mut std::fmt::Formatter<'_>, cards: &[Card]) -> std::fmt::Result {
    for (i, c) in cards.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

impl std::fmt::Display for LogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogItem::PlayerJoined(p) => write!(f, "Player {p} joined"),
            LogItem::HandDealt(p, hand) => match hand {
                None => write!(f, "Player {p} dealt a hand"),
                Some(cards) => {
                    write!(f, "Player {p} dealt ")?;
                    write_cards(f, cards)
                }
            },
            LogItem::CardsPlayed(p, cards, class) => {
                write!(f, "Player {p} played {class}: ")?;
                write_cards(f, cards)
            }
            LogItem::PlayerPassed(p) => write!(f, "Player {p} passed"),
            LogItem::TurnChanged(p) => write!(f, "Next to act is {p}"),
            LogItem::TrickWon(p) => write!(f, "Player {p} won the trick"),
            LogItem::PlayerForfeited(p) => write!(f, "Player {p} forfeited their seat"),
            LogItem::PlayerLeft(p) => write!(f, "Player {p} left the room"),
            LogItem::StateChange(old, new) => write!(f, "State changed from {old} to {new}"),
            LogItem::GameEnded(order, _scores) => {
                write!(f, "Game over; finish order ")?;
                for (i, p) in order.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
        }
    }
}

/// Sequence-numbered event log for one room: events since the start of the
/// current game plus an archive of earlier games.
#[derive(Debug, PartialEq, Eq, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Log {
    active: Vec<(SeqNum, LogItem)>,
    archive: Vec<(SeqNum, LogItem)>,
    last_seq_num: SeqNum,
}

impl Log {
    pub(crate) fn push(&mut self, item: LogItem) {
        let seq = self.last_seq_num + 1;
        self.active.push((seq, item));
        self.last_seq_num = seq;
    }

    /// Move the current game's events to the archive; seq numbers keep
    /// counting up.
    pub(crate) fn rotate(&mut self) {
        self.archive.append(&mut self.active);
    }

    pub(crate) fn items_since(
        &self,
        oldest_seq: SeqNum,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + '_ {
        let iter1 = self
            .archive
            .iter()
            .skip_while(move |(seq, _item)| *seq <= oldest_seq)
            .cloned();
        let iter2 = self
            .active
            .iter()
            .skip_while(move |(seq, _item)| *seq <= oldest_seq)
            .cloned();
        iter1.chain(iter2)
    }
}
