use crate::cards::deck::{Deck, DECK_LEN};
use crate::cards::{Card, Play};
use crate::log::{Log, LogItem};
use crate::{GameError, PlayerId, RoomError, SeatIdx, SeqNum, NUM_SEATS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// States a room can be in. Dealing and trick conclusion are instantaneous
/// and happen inside the `join`/`pass` handlers, so they have no state of
/// their own.
#[derive(Debug, PartialEq, Eq, Clone, Copy, derive_more::Display, Serialize, Deserialize)]
pub enum State {
    WaitingForPlayers,
    InProgress,
    Ended,
}

impl Default for State {
    fn default() -> Self {
        Self::WaitingForPlayers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    hand: Vec<Card>,
    /// Set when the player leaves mid-game. The seat keeps its cards but is
    /// skipped in rotation and not counted for the all-pass check.
    pub forfeited: bool,
}

impl Seat {
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// Still holds cards and still acts in rotation.
    fn is_active(&self) -> bool {
        !self.hand.is_empty() && !self.forfeited
    }
}

/// The play currently defending the trick and the seat that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePlay {
    pub owner: SeatIdx,
    pub play: Play,
}

/// All the state constituting one room's game. Mutated exclusively through
/// `join`/`play`/`pass`/`forfeit_seat`/`rematch`; every rejected action
/// leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    /// The state this room is in. Only `change_state` writes this.
    __state_dont_change_directly: State,
    seats: Vec<Seat>,
    current_turn: Option<SeatIdx>,
    last_played: Option<TablePlay>,
    /// Seats that passed since `last_played` was set.
    passed: Vec<SeatIdx>,
    round_starter: Option<SeatIdx>,
    /// True from the deal until the very first play, which must include 3d.
    opening_trick: bool,
    /// Cards played out of hands so far this game.
    discarded: usize,
    finish_order: Vec<PlayerId>,
    logs: Log,
}

impl Default for RoomState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomState {
    pub fn new() -> Self {
        Self {
            __state_dont_change_directly: State::default(),
            seats: Vec::with_capacity(NUM_SEATS),
            current_turn: None,
            last_played: None,
            passed: Vec::with_capacity(NUM_SEATS),
            round_starter: None,
            opening_trick: false,
            discarded: 0,
            finish_order: Vec::with_capacity(NUM_SEATS),
            logs: Log::default(),
        }
    }

    pub const fn state(&self) -> State {
        self.__state_dont_change_directly
    }

    pub fn started(&self) -> bool {
        !matches!(self.state(), State::WaitingForPlayers)
    }

    pub fn ended(&self) -> bool {
        matches!(self.state(), State::Ended)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat_idx(&self, player_id: &str) -> Option<SeatIdx> {
        self.seats.iter().position(|s| s.id == player_id)
    }

    pub fn hand_of(&self, player_id: &str) -> Option<&[Card]> {
        self.seat_idx(player_id).map(|i| self.seats[i].hand())
    }

    pub fn current_player(&self) -> Option<&PlayerId> {
        self.current_turn.map(|i| &self.seats[i].id)
    }

    pub fn last_played(&self) -> Option<&TablePlay> {
        self.last_played.as_ref()
    }

    pub fn finish_order(&self) -> &[PlayerId] {
        &self.finish_order
    }

    /// Events since `oldest_seq`, with other players' `HandDealt` payloads
    /// redacted. This is the only view the transport layer should hand to a
    /// client.
    pub fn events_since<'a>(
        &'a self,
        oldest_seq: SeqNum,
        player_id: &'a str,
    ) -> impl Iterator<Item = (SeqNum, LogItem)> + 'a {
        self.logs
            .items_since(oldest_seq)
            .map(move |(idx, item)| match item {
                LogItem::HandDealt(pid, hand) => {
                    if pid == player_id {
                        (idx, LogItem::HandDealt(pid, hand))
                    } else {
                        (idx, LogItem::HandDealt(pid, None))
                    }
                }
                other => (idx, other),
            })
    }

    fn change_state(&mut self, new: State) {
        debug!(old = %self.__state_dont_change_directly, %new, "room state change");
        self.logs
            .push(LogItem::StateChange(self.__state_dont_change_directly, new));
        // this is the only place the state should ever be changed directly
        self.__state_dont_change_directly = new;
    }

    /// Seat a player. The fourth join deals the game.
    pub fn join(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.started() {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.seats.iter().any(|s| s.id == player_id) {
            return Err(RoomError::AlreadyJoined);
        }
        if self.seats.len() == NUM_SEATS {
            return Err(RoomError::RoomFull);
        }
        info!(player = %player_id, "player joined");
        self.logs.push(LogItem::PlayerJoined(player_id.clone()));
        self.seats.push(Seat {
            id: player_id,
            hand: Vec::new(),
            forfeited: false,
        });
        if self.seats.len() == NUM_SEATS {
            self.deal();
        }
        Ok(())
    }

    fn deal(&mut self) {
        let mut deck = Deck::default();
        let hands = deck.deal_hands();
        for (seat, hand) in self.seats.iter_mut().zip(hands) {
            seat.hand = hand;
        }
        self.discarded = 0;
        self.opening_trick = true;
        self.last_played = None;
        self.passed.clear();
        self.finish_order.clear();
        for seat in &self.seats {
            self.logs
                .push(LogItem::HandDealt(seat.id.clone(), Some(seat.hand.clone())));
        }
        let starter = self
            .seats
            .iter()
            .position(|s| s.hand.contains(&Card::THREE_OF_DIAMONDS))
            .expect("one seat holds the 3d after dealing");
        self.round_starter = Some(starter);
        self.change_state(State::InProgress);
        self.set_turn(starter);
        info!(starter = %self.seats[starter].id, "hands dealt");
        self.check_invariants();
    }

    /// Common gate for `play` and `pass`: the game must be running and it
    /// must be this player's turn.
    fn turn_checked(&self, player_id: &str) -> Result<SeatIdx, GameError> {
        match self.state() {
            State::WaitingForPlayers => return Err(GameError::GameNotStarted),
            State::Ended => return Err(GameError::GameOver),
            State::InProgress => {}
        }
        let turn = self
            .current_turn
            .expect("an in-progress game always has a current turn");
        if self.seats[turn].id != player_id {
            return Err(GameError::NotYourTurn);
        }
        Ok(turn)
    }

    /// Submit a play for the acting player. All checks run before any
    /// mutation; a rejection leaves the room untouched.
    pub fn play(&mut self, player_id: &str, cards: &[Card]) -> Result<(), GameError> {
        let idx = self.turn_checked(player_id)?;
        if !cards.iter().all(|c| self.seats[idx].hand.contains(c)) {
            return Err(GameError::CardsNotInHand);
        }
        let play = Play::classify(cards).ok_or(GameError::IllegalHandShape)?;
        if self.opening_trick && !cards.contains(&Card::THREE_OF_DIAMONDS) {
            return Err(GameError::MustOpenWithThreeOfDiamonds);
        }
        if !play.beats(self.last_played.as_ref().map(|tp| &tp.play)) {
            return Err(GameError::DoesNotBeat);
        }

        let class = play.class();
        let played = play.cards().to_vec();
        self.seats[idx].hand.retain(|c| !cards.contains(c));
        self.discarded += played.len();
        self.opening_trick = false;
        self.passed.clear();
        self.last_played = Some(TablePlay { owner: idx, play });
        debug!(player = %self.seats[idx].id, %class, "cards played");
        self.logs
            .push(LogItem::CardsPlayed(self.seats[idx].id.clone(), played, class));
        if self.seats[idx].hand.is_empty() {
            self.finish_order.push(self.seats[idx].id.clone());
        }
        self.advance_or_finish(idx);
        self.check_invariants();
        Ok(())
    }

    /// Pass on the current trick. Disallowed when there is nothing to pass
    /// on: the opener of a trick must play.
    pub fn pass(&mut self, player_id: &str) -> Result<(), GameError> {
        let idx = self.turn_checked(player_id)?;
        let owner = match &self.last_played {
            None => return Err(GameError::CannotPassOpeningTrick),
            Some(tp) => tp.owner,
        };
        if !self.passed.contains(&idx) {
            self.passed.push(idx);
        }
        debug!(player = %self.seats[idx].id, "player passed");
        self.logs
            .push(LogItem::PlayerPassed(self.seats[idx].id.clone()));
        if self.trick_concluded(owner) {
            self.conclude_trick(owner);
        } else {
            let next = self.next_active_after(idx);
            self.set_turn(next);
        }
        self.check_invariants();
        Ok(())
    }

    /// Mark a seat forfeited (player left mid-game). The seat's cards stay
    /// where they are; the rotation and the all-pass check skip it from now
    /// on. May end the game or conclude the open trick.
    pub fn forfeit_seat(&mut self, idx: SeatIdx) {
        if self.seats[idx].forfeited || self.ended() {
            return;
        }
        self.seats[idx].forfeited = true;
        info!(player = %self.seats[idx].id, "seat forfeited");
        self.logs
            .push(LogItem::PlayerForfeited(self.seats[idx].id.clone()));
        if !matches!(self.state(), State::InProgress) {
            return;
        }
        self.passed.retain(|i| *i != idx);
        if self.active_count() <= 1 {
            self.finish_game();
            self.check_invariants();
            return;
        }
        if self.current_turn == Some(idx) {
            let next = self.next_active_after(idx);
            self.set_turn(next);
        }
        if let Some(owner) = self.last_played.as_ref().map(|tp| tp.owner) {
            if self.trick_concluded(owner) {
                self.conclude_trick(owner);
            }
        }
        self.check_invariants();
    }

    /// Remove a seat entirely. Only legal while no game is running.
    pub fn remove_seat(&mut self, idx: SeatIdx) {
        assert!(
            !matches!(self.state(), State::InProgress),
            "cannot unseat a player mid-game"
        );
        let seat = self.seats.remove(idx);
        info!(player = %seat.id, "player left");
        self.logs.push(LogItem::PlayerLeft(seat.id));
    }

    /// Reset a concluded room for another game with the same roster.
    /// Forfeited seats are dropped; everyone else stays. Deals immediately
    /// if the table is still full.
    pub fn rematch(&mut self) -> Result<(), GameError> {
        if !self.ended() {
            return Err(GameError::GameNotOver);
        }
        self.logs.rotate();
        self.seats.retain(|s| !s.forfeited);
        for seat in self.seats.iter_mut() {
            seat.hand.clear();
        }
        self.current_turn = None;
        self.round_starter = None;
        self.last_played = None;
        self.passed.clear();
        self.finish_order.clear();
        self.discarded = 0;
        self.opening_trick = false;
        self.change_state(State::WaitingForPlayers);
        if self.seats.len() == NUM_SEATS {
            self.deal();
        }
        Ok(())
    }

    fn active_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_active()).count()
    }

    /// Every active seat other than the play's owner has passed since the
    /// play was made. When the owner is no longer active (they went out on
    /// that play, or forfeited), every active seat must have passed.
    fn trick_concluded(&self, owner: SeatIdx) -> bool {
        self.seats
            .iter()
            .enumerate()
            .filter(|(i, s)| s.is_active() && *i != owner)
            .all(|(i, _)| self.passed.contains(&i))
    }

    /// The trick is won: the owner leads the next one, unless they are out
    /// of the game, in which case the lead moves to the next active seat.
    fn conclude_trick(&mut self, owner: SeatIdx) {
        let lead = if self.seats[owner].is_active() {
            owner
        } else {
            self.next_active_after(owner)
        };
        debug!(winner = %self.seats[owner].id, "trick concluded");
        self.logs.push(LogItem::TrickWon(self.seats[owner].id.clone()));
        self.last_played = None;
        self.passed.clear();
        self.round_starter = Some(lead);
        self.set_turn(lead);
    }

    fn next_active_after(&self, idx: SeatIdx) -> SeatIdx {
        (1..=self.seats.len())
            .map(|offset| (idx + offset) % self.seats.len())
            .find(|i| self.seats[*i].is_active())
            .expect("next_active_after called with no active seats")
    }

    fn set_turn(&mut self, idx: SeatIdx) {
        self.current_turn = Some(idx);
        self.logs
            .push(LogItem::TurnChanged(self.seats[idx].id.clone()));
    }

    /// Either hand the turn on, or detect the end of the game: once at most
    /// one seat still holds cards (the rest emptied their hands or
    /// forfeited), the game is over.
    fn advance_or_finish(&mut self, from: SeatIdx) {
        if self.active_count() <= 1 {
            self.finish_game();
        } else {
            let next = self.next_active_after(from);
            self.set_turn(next);
        }
    }

    fn finish_game(&mut self) {
        // Seats that never went out are appended to the finish order:
        // still-active ones first, forfeited ones last.
        let mut stragglers: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|s| !s.forfeited && !self.finish_order.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();
        stragglers.extend(
            self.seats
                .iter()
                .filter(|s| s.forfeited && !self.finish_order.contains(&s.id))
                .map(|s| s.id.clone()),
        );
        self.finish_order.append(&mut stragglers);
        self.current_turn = None;
        self.last_played = None;
        self.passed.clear();
        let remaining: Vec<(PlayerId, usize)> = self
            .seats
            .iter()
            .map(|s| (s.id.clone(), s.hand.len()))
            .collect();
        info!(?remaining, "game over");
        self.logs
            .push(LogItem::GameEnded(self.finish_order.clone(), remaining));
        self.change_state(State::Ended);
    }

    /// Card conservation and turn sanity. A violation here is a programming
    /// defect, not a player error, so it takes the room down loudly.
    fn check_invariants(&self) {
        if !self.started() {
            return;
        }
        let held: usize = self.seats.iter().map(|s| s.hand.len()).sum();
        assert_eq!(
            held + self.discarded,
            DECK_LEN,
            "card conservation violated"
        );
        if let Some(turn) = self.current_turn {
            assert!(
                self.seats[turn].is_active(),
                "turn assigned to an inactive seat"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::cards_from_str;
    use crate::cards::PlayClass;

    fn full_room() -> RoomState {
        let mut rs = RoomState::new();
        for p in ["alice", "bob", "carol", "dave"] {
            rs.join(p.to_string()).unwrap();
        }
        rs
    }

    /// Build an in-progress room with known hands, turn on seat 0, trick
    /// open, opening-card rule already satisfied.
    fn rigged(hands: [&'static str; 4]) -> RoomState {
        let mut rs = RoomState::new();
        rs.seats = hands
            .iter()
            .enumerate()
            .map(|(i, s)| Seat {
                id: format!("p{i}"),
                hand: cards_from_str(s),
                forfeited: false,
            })
            .collect();
        let held: usize = rs.seats.iter().map(|s| s.hand.len()).sum();
        rs.discarded = DECK_LEN - held;
        rs.__state_dont_change_directly = State::InProgress;
        rs.opening_trick = false;
        rs.current_turn = Some(0);
        rs.round_starter = Some(0);
        rs
    }

    /// Scenario: after the 4th join the deal happens and the holder of the
    /// 3d is first to act.
    #[test]
    fn fourth_join_deals_and_3d_holder_starts() {
        let rs = full_room();
        assert_eq!(rs.state(), State::InProgress);
        let starter = rs.current_player().unwrap().clone();
        assert!(rs
            .hand_of(&starter)
            .unwrap()
            .contains(&Card::THREE_OF_DIAMONDS));
        let held: usize = rs.seats().iter().map(|s| s.hand().len()).sum();
        assert_eq!(held, DECK_LEN);
        for seat in rs.seats() {
            assert_eq!(seat.hand().len(), 13);
            assert!(seat.hand().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn join_rejections() {
        let mut rs = RoomState::new();
        rs.join("alice".to_string()).unwrap();
        assert_eq!(
            rs.join("alice".to_string()).unwrap_err(),
            RoomError::AlreadyJoined
        );
        for p in ["bob", "carol", "dave"] {
            rs.join(p.to_string()).unwrap();
        }
        assert_eq!(
            rs.join("eve".to_string()).unwrap_err(),
            RoomError::GameAlreadyStarted
        );
    }

    #[test]
    fn opening_play_must_include_3d() {
        let mut rs = rigged(["3d5h", "4d4c", "7d8d", "9dTd"]);
        rs.opening_trick = true;
        assert_eq!(
            rs.play("p0", &cards_from_str("5h")).unwrap_err(),
            GameError::MustOpenWithThreeOfDiamonds
        );
        rs.play("p0", &cards_from_str("3d")).unwrap();
        assert_eq!(rs.last_played().unwrap().play.class(), PlayClass::Single);
        assert_eq!(rs.current_player().unwrap(), "p1");
    }

    /// Scenario: a pair cannot answer a single.
    #[test]
    fn pair_cannot_answer_single() {
        let mut rs = rigged(["3d5h", "4d4c", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        assert_eq!(
            rs.play("p1", &cards_from_str("4d4c")).unwrap_err(),
            GameError::DoesNotBeat
        );
        // and the rejection changed nothing
        assert_eq!(rs.current_player().unwrap(), "p1");
        assert_eq!(rs.hand_of("p1").unwrap().len(), 2);
    }

    /// Scenario: a bomb answers a single despite the count mismatch.
    #[test]
    fn bomb_answers_single() {
        let mut rs = rigged(["5sKh", "2d2c2h2s7d", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("5s")).unwrap();
        rs.play("p1", &cards_from_str("2d2c2h2s7d")).unwrap();
        assert_eq!(
            rs.last_played().unwrap().play.class(),
            PlayClass::FourOfAKind
        );
        assert_eq!(rs.current_player().unwrap(), "p2");
    }

    #[test]
    fn rule_rejections_leave_state_unchanged() {
        let mut rs = rigged(["3d5h", "4d4c", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("5h")).unwrap();
        let snapshot = rs.clone();
        assert_eq!(
            rs.play("p0", &cards_from_str("3d")).unwrap_err(),
            GameError::NotYourTurn
        );
        assert_eq!(
            rs.play("p1", &cards_from_str("Ks")).unwrap_err(),
            GameError::CardsNotInHand
        );
        assert_eq!(
            rs.play("p1", &cards_from_str("4d7d")).unwrap_err(),
            GameError::CardsNotInHand
        );
        assert_eq!(rs, snapshot);
    }

    #[test]
    fn shape_checked_before_beat() {
        let mut rs = rigged(["3d5h", "4d7h", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        assert_eq!(
            rs.play("p1", &cards_from_str("4d7h")).unwrap_err(),
            GameError::IllegalHandShape
        );
    }

    #[test]
    fn cannot_pass_an_open_trick() {
        let mut rs = rigged(["3d5h", "4d4c", "7d8d", "9dTd"]);
        assert_eq!(
            rs.pass("p0").unwrap_err(),
            GameError::CannotPassOpeningTrick
        );
        rs.play("p0", &cards_from_str("3d")).unwrap();
        rs.pass("p1").unwrap();
        rs.pass("p2").unwrap();
        rs.pass("p3").unwrap();
        // trick concluded back to p0, who again may not pass
        assert_eq!(
            rs.pass("p0").unwrap_err(),
            GameError::CannotPassOpeningTrick
        );
    }

    /// Scenario: three passes in sequence conclude the trick; the owner
    /// leads the next one on a cleared table.
    #[test]
    fn all_pass_concludes_trick() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("4h")).unwrap();
        rs.pass("p1").unwrap();
        rs.pass("p2").unwrap();
        assert_eq!(rs.current_player().unwrap(), "p3");
        assert!(rs.last_played().is_some());
        rs.pass("p3").unwrap();
        assert_eq!(rs.current_player().unwrap(), "p0");
        assert!(rs.last_played().is_none());
        assert!(rs.passed.is_empty());
        assert_eq!(rs.round_starter, Some(0));
    }

    /// An intervening play restarts the pass count.
    #[test]
    fn new_play_resets_passes() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("4h")).unwrap();
        rs.pass("p1").unwrap();
        rs.play("p2", &cards_from_str("7d")).unwrap();
        assert!(rs.passed.is_empty());
        rs.pass("p3").unwrap();
        rs.pass("p0").unwrap();
        assert!(rs.last_played().is_some());
        rs.pass("p1").unwrap();
        // now the trick is p2's
        assert_eq!(rs.current_player().unwrap(), "p2");
        assert!(rs.last_played().is_none());
    }

    /// Scenario: emptied hands leave the rotation; when only one seat still
    /// holds cards the game ends and that seat finishes last.
    #[test]
    fn finish_order_and_game_end() {
        let mut rs = rigged(["3d", "4d", "5d", "6d7d"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        assert_eq!(rs.finish_order(), ["p0".to_string()]);
        assert_eq!(rs.current_player().unwrap(), "p1");
        rs.play("p1", &cards_from_str("4d")).unwrap();
        rs.play("p2", &cards_from_str("5d")).unwrap();
        assert!(rs.ended());
        assert_eq!(
            rs.finish_order(),
            ["p0", "p1", "p2", "p3"].map(String::from)
        );
        assert_eq!(rs.current_player(), None);
        assert_eq!(rs.play("p3", &cards_from_str("6d")), Err(GameError::GameOver));
    }

    /// A player who goes out on a play is skipped by later turn advances,
    /// and the lead after their winning trick moves to the next active seat.
    #[test]
    fn finished_player_is_skipped() {
        let mut rs = rigged(["2s", "4d5d", "6d7d", "8d9d"]);
        rs.play("p0", &cards_from_str("2s")).unwrap();
        assert_eq!(rs.finish_order(), ["p0".to_string()]);
        assert_eq!(rs.current_player().unwrap(), "p1");
        rs.pass("p1").unwrap();
        rs.pass("p2").unwrap();
        rs.pass("p3").unwrap();
        // p0 won the trick but is out; p1 leads instead
        assert_eq!(rs.current_player().unwrap(), "p1");
        assert!(rs.last_played().is_none());
    }

    #[test]
    fn forfeited_seat_leaves_rotation() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        rs.forfeit_seat(1);
        assert_eq!(rs.current_player().unwrap(), "p2");
        rs.pass("p2").unwrap();
        rs.pass("p3").unwrap();
        // p1 is not required to pass for the trick to conclude
        assert_eq!(rs.current_player().unwrap(), "p0");
        assert!(rs.last_played().is_none());
    }

    #[test]
    fn forfeit_can_conclude_trick() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        rs.pass("p1").unwrap();
        rs.pass("p2").unwrap();
        rs.forfeit_seat(3);
        assert_eq!(rs.current_player().unwrap(), "p0");
        assert!(rs.last_played().is_none());
    }

    #[test]
    fn forfeits_can_end_game() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.forfeit_seat(1);
        rs.forfeit_seat(2);
        rs.forfeit_seat(3);
        assert!(rs.ended());
        // the surviving player finishes first, leavers after them
        assert_eq!(rs.finish_order()[0], "p0");
        assert_eq!(rs.finish_order().len(), 4);
    }

    #[test]
    fn rematch_keeps_roster_and_redeals() {
        let mut rs = rigged(["3d", "4d", "5d", "6d7d"]);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        rs.play("p1", &cards_from_str("4d")).unwrap();
        assert_eq!(rs.rematch().unwrap_err(), GameError::GameNotOver);
        rs.play("p2", &cards_from_str("5d")).unwrap();
        assert!(rs.ended());
        rs.rematch().unwrap();
        assert_eq!(rs.state(), State::InProgress);
        assert_eq!(rs.player_count(), 4);
        for seat in rs.seats() {
            assert_eq!(seat.hand().len(), 13);
        }
        assert!(rs.finish_order().is_empty());
    }

    #[test]
    fn rematch_drops_forfeited_seats() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        rs.forfeit_seat(3);
        rs.forfeit_seat(2);
        rs.forfeit_seat(1);
        assert!(rs.ended());
        rs.rematch().unwrap();
        assert_eq!(rs.state(), State::WaitingForPlayers);
        assert_eq!(rs.player_count(), 1);
        assert_eq!(rs.seats()[0].id, "p0");
    }

    #[test]
    fn deal_events_are_redacted_per_player() {
        let rs = full_room();
        let for_alice: Vec<LogItem> =
            rs.events_since(0, "alice").map(|(_, item)| item).collect();
        let mut own = 0;
        let mut redacted = 0;
        for item in for_alice {
            if let LogItem::HandDealt(pid, hand) = item {
                if pid == "alice" {
                    assert!(hand.is_some());
                    own += 1;
                } else {
                    assert!(hand.is_none());
                    redacted += 1;
                }
            }
        }
        assert_eq!(own, 1);
        assert_eq!(redacted, 3);
    }

    /// Card conservation holds at every step of a scripted game.
    #[test]
    fn card_conservation() {
        let mut rs = rigged(["3d4h", "5d6d", "7d8d", "9dTd"]);
        let total = |rs: &RoomState| {
            rs.seats().iter().map(|s| s.hand().len()).sum::<usize>() + rs.discarded
        };
        assert_eq!(total(&rs), DECK_LEN);
        rs.play("p0", &cards_from_str("3d")).unwrap();
        assert_eq!(total(&rs), DECK_LEN);
        rs.play("p1", &cards_from_str("5d")).unwrap();
        rs.pass("p2").unwrap();
        rs.pass("p3").unwrap();
        rs.pass("p0").unwrap();
        assert_eq!(total(&rs), DECK_LEN);
    }
}
