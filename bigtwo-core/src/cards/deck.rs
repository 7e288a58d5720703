use super::card::{Card, ALL_RANKS, ALL_SUITS};
use crate::{HAND_SIZE, NUM_SEATS};
use base64ct::{Base64, Encoding};
use rand::prelude::*;
use rand_chacha::ChaChaRng;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub const DECK_LEN: usize = 52;
const SEED_LEN: usize = 32;
const ENCODED_SEED_LEN: usize = 4 * ((SEED_LEN + 3 - 1) / 3); // 4 * ceil(SEED_LEN / 3)

#[derive(Debug, PartialEq)]
pub enum DeckError {
    InsufficientCards,
    SeedDecodeError(base64ct::Error),
}

impl Error for DeckError {}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::InsufficientCards => write!(f, "Not enough cards left in deck"),
            DeckError::SeedDecodeError(e) => write!(f, "{}", e),
        }
    }
}

impl From<base64ct::Error> for DeckError {
    fn from(e: base64ct::Error) -> Self {
        Self::SeedDecodeError(e)
    }
}

#[derive(Debug, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        use itertools::Itertools;
        let c: Vec<Card> = ALL_RANKS
            .iter()
            .cartesian_product(ALL_SUITS.iter())
            .map(|x| Card::new(*x.0, *x.1))
            .collect();
        assert_eq!(c.len(), DECK_LEN);
        let mut d = Deck { cards: c };
        d.shuffle();
        d
    }
}

impl Deck {
    /// Generate a new single deck of cards, shuffled with the given seed.
    pub fn new(seed: &DeckSeed) -> Self {
        let mut d = Self::default();
        d.seeded_shuffle(seed);
        d
    }

    pub fn deck_and_seed() -> (Deck, DeckSeed) {
        let ds = DeckSeed::default();
        let d = Deck::new(&ds);
        (d, ds)
    }

    /// Shuffle the deck in-place with a fresh random seed.
    pub fn shuffle(&mut self) {
        self.seeded_shuffle(&DeckSeed::default());
    }

    pub fn seeded_shuffle(&mut self, seed: &DeckSeed) {
        let mut rng = ChaChaRng::from_seed(seed.0);
        // For determinism given the same seed, the cards need to be in a known order before shuffling.
        self.cards.sort_unstable();
        self.cards.shuffle(&mut rng)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remove and return the top `n` cards.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::InsufficientCards);
        }
        Ok(self.cards.split_off(self.cards.len() - n))
    }

    /// Deal the entire deck out as four 13-card hands, each sorted ascending
    /// by scalar value for client display. Consumes a full deck; anything
    /// else is a programming defect.
    pub fn deal_hands(&mut self) -> [Vec<Card>; NUM_SEATS] {
        assert_eq!(self.cards.len(), DECK_LEN, "dealing takes a fresh deck");
        let mut hands: [Vec<Card>; NUM_SEATS] = Default::default();
        for hand in hands.iter_mut() {
            *hand = self
                .deal(HAND_SIZE)
                .expect("a fresh deck holds four full hands");
            hand.sort_unstable();
        }
        hands
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckSeed([u8; SEED_LEN]);

impl DeckSeed {
    pub fn new(b: [u8; SEED_LEN]) -> Self {
        Self(b)
    }
}

impl Default for DeckSeed {
    fn default() -> Self {
        let mut b = [0u8; SEED_LEN];
        thread_rng().fill_bytes(&mut b);
        Self(b)
    }
}

impl fmt::Display for DeckSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = [0u8; ENCODED_SEED_LEN];
        Base64::encode(&self.0, &mut b).unwrap();
        write!(f, "{}", String::from_utf8_lossy(&b))
    }
}

impl FromStr for DeckSeed {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b: [u8; SEED_LEN] = [0; SEED_LEN];
        Base64::decode(s, &mut b)?;
        Ok(DeckSeed(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SEED1: DeckSeed = DeckSeed([1; SEED_LEN]);

    #[test]
    fn right_len() {
        let d = Deck::default();
        assert_eq!(d.len(), DECK_LEN);
    }

    #[test]
    fn no_duplicates() {
        let d = Deck::default();
        let mut counts: HashMap<Card, u16> = HashMap::new();
        for card in d.cards.iter() {
            *counts.entry(*card).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), DECK_LEN);
        for count in counts.values() {
            assert_eq!(*count, 1);
        }
    }

    #[test]
    fn deal_too_many() {
        let mut d = Deck::default();
        assert!(d.deal(50).is_ok());
        assert_eq!(d.deal(3).unwrap_err(), DeckError::InsufficientCards);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn deal_hands_covers_deck() {
        let mut d = Deck::default();
        let hands = d.deal_hands();
        assert!(d.is_empty());
        let mut all: Vec<Card> = hands.iter().flatten().copied().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), DECK_LEN);
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            assert!(hand.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn is_shuffled() {
        let mut d = Deck::default();
        let top = d.deal(4).unwrap();
        if top.iter().all(|c| c.rank() == top[0].rank()) {
            panic!("Top four cards shared a rank! This indicates the deck was not shuffled. There is a *very* small chance this is a false positive.")
        }
    }

    /// Given a specific seed, the order of the cards should always be the same.
    #[test]
    fn deck_is_seedable() {
        let mut d1 = Deck::new(&SEED1);
        let mut d2 = Deck::new(&SEED1);
        assert_eq!(d1.deal(52).unwrap(), d2.deal(52).unwrap());
    }

    #[test]
    fn seed_to_from_string() {
        let d = DeckSeed::default();
        let s = d.to_string();
        let d2: DeckSeed = s.parse().unwrap();
        assert_eq!(d, d2);
    }
}
