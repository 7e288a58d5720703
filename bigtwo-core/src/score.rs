//! Scoring for the 13-card arrangement variant: each player splits their
//! deal into a 3-card front, 5-card middle, and 5-card back, and segments
//! are compared pairwise across players. Shares the card primitives with
//! the trick game but uses a fuller poker-style ladder, since any 5 cards
//! form a rankable segment here.

use crate::cards::card::{Rank, Suit};
use crate::cards::Card;
use crate::PlayerId;
use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ladder for a 5-card segment, weakest to strongest. Declaration order is
/// the comparison order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, Serialize, Deserialize,
)]
pub enum FiveClass {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Ladder for the 3-card front.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, Serialize, Deserialize,
)]
pub enum FrontClass {
    HighCard,
    Pair,
    Triple,
    ThreeCardStraight,
}

impl FrontClass {
    /// Position of this class on the 5-card ladder, for the front-vs-middle
    /// validity comparison.
    const fn tier(self) -> u8 {
        match self {
            FrontClass::HighCard => FiveClass::HighCard as u8,
            FrontClass::Pair => FiveClass::Pair as u8,
            FrontClass::Triple => FiveClass::ThreeOfAKind as u8,
            FrontClass::ThreeCardStraight => FiveClass::Straight as u8,
        }
    }
}

/// Highest scalar value among the cards of the given rank.
fn group_max(cards: &[Card], rank: Rank) -> u8 {
    cards
        .iter()
        .filter(|c| c.rank() == rank)
        .map(|c| c.value())
        .max()
        .expect("rank group came from these cards")
}

/// Classify any 5 distinct cards. Unlike the trick-play classifier there is
/// no invalid outcome; everything bottoms out at a high card.
pub fn classify_five(cards: &[Card; 5]) -> (FiveClass, u8) {
    let mut sorted = *cards;
    sorted.sort_unstable();
    let mut ranks: EnumMap<Rank, usize> = EnumMap::from_array([0usize; 13]);
    for c in &sorted {
        ranks[c.rank()] += 1;
    }
    let flush = sorted.iter().all(|c| c.suit() == sorted[0].suit());
    let straight = sorted
        .windows(2)
        .all(|w| w[1].rank().index() == w[0].rank().index() + 1);
    let top = sorted[4].value();
    if straight && flush {
        return (FiveClass::StraightFlush, top);
    }
    if let Some((rank, _)) = ranks.iter().find(|(_, n)| **n == 4) {
        return (FiveClass::FourOfAKind, group_max(&sorted, rank));
    }
    let trip = ranks.iter().find(|(_, n)| **n == 3).map(|(r, _)| r);
    let pairs: Vec<Rank> = ranks
        .iter()
        .filter(|(_, n)| **n == 2)
        .map(|(r, _)| r)
        .collect();
    if let Some(rank) = trip {
        if !pairs.is_empty() {
            return (FiveClass::FullHouse, group_max(&sorted, rank));
        }
    }
    if flush {
        return (FiveClass::Flush, top);
    }
    if straight {
        return (FiveClass::Straight, top);
    }
    if let Some(rank) = trip {
        return (FiveClass::ThreeOfAKind, group_max(&sorted, rank));
    }
    match pairs.as_slice() {
        [] => (FiveClass::HighCard, top),
        [rank] => (FiveClass::Pair, group_max(&sorted, *rank)),
        // ranks iterate low to high, so the last pair is the higher one
        many => (FiveClass::TwoPair, group_max(&sorted, many[many.len() - 1])),
    }
}

pub fn classify_front(cards: &[Card; 3]) -> (FrontClass, u8) {
    let mut sorted = *cards;
    sorted.sort_unstable();
    let top = sorted[2].value();
    if sorted[0].rank() == sorted[2].rank() {
        return (FrontClass::Triple, top);
    }
    let straight = sorted
        .windows(2)
        .all(|w| w[1].rank().index() == w[0].rank().index() + 1);
    if straight {
        return (FrontClass::ThreeCardStraight, top);
    }
    if let Some(pair) = sorted.windows(2).filter(|w| w[0].rank() == w[1].rank()).last() {
        return (FrontClass::Pair, pair[1].value());
    }
    (FrontClass::HighCard, top)
}

#[derive(Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ArrangeError {
    /// The 13 cards of front, middle, and back must all be distinct.
    DuplicateCard,
}

/// One player's finished 3/5/5 split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    front: [Card; 3],
    middle: [Card; 5],
    back: [Card; 5],
}

impl Arrangement {
    pub fn new(front: [Card; 3], middle: [Card; 5], back: [Card; 5]) -> Result<Self, ArrangeError> {
        let arr = Self {
            front,
            middle,
            back,
        };
        let mut all = arr.cards();
        all.sort_unstable();
        if all.windows(2).any(|w| w[0] == w[1]) {
            return Err(ArrangeError::DuplicateCard);
        }
        Ok(arr)
    }

    pub fn cards(&self) -> [Card; 13] {
        let mut out = [self.front[0]; 13];
        out[..3].copy_from_slice(&self.front);
        out[3..8].copy_from_slice(&self.middle);
        out[8..].copy_from_slice(&self.back);
        out
    }

    /// Comparison keys for the three segments, front to back. The front's
    /// class is mapped onto the 5-card ladder so keys compare uniformly.
    fn segment_keys(&self) -> [(u8, u8); 3] {
        let (fc, fs) = classify_front(&self.front);
        let (mc, ms) = classify_five(&self.middle);
        let (bc, bs) = classify_five(&self.back);
        [(fc.tier(), fs), (mc as u8, ms), (bc as u8, bs)]
    }

    /// The ordering invariant: front must not outrank middle, middle must
    /// not outrank back. A violating arrangement forfeits every segment.
    pub fn is_valid(&self) -> bool {
        let [front, middle, back] = self.segment_keys();
        front <= middle && middle <= back
    }
}

/// Whole-hand combinations detected on the 13 cards regardless of the
/// front/middle/back split.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
pub enum Special {
    /// One card of every rank.
    Dragon,
    /// One card of every rank, all the same suit.
    FlushDragon,
    /// Six pairs plus a lone card.
    SixPairs,
    /// Every card jack or higher.
    AllFaces,
    /// All red or all black.
    OneColor,
}

pub fn detect_specials(cards: &[Card; 13]) -> Vec<Special> {
    let mut ranks: EnumMap<Rank, usize> = EnumMap::from_array([0usize; 13]);
    for c in cards {
        ranks[c.rank()] += 1;
    }
    let mut found = Vec::new();
    if ranks.values().all(|n| *n == 1) {
        if cards.iter().all(|c| c.suit() == cards[0].suit()) {
            found.push(Special::FlushDragon);
        } else {
            found.push(Special::Dragon);
        }
    }
    if ranks.values().filter(|n| **n == 2).count() == 6 {
        found.push(Special::SixPairs);
    }
    if cards.iter().all(|c| c.rank() >= Rank::Jack) {
        found.push(Special::AllFaces);
    }
    let red = |c: &Card| matches!(c.suit(), Suit::Diamond | Suit::Heart);
    if cards.iter().all(red) || !cards.iter().any(red) {
        found.push(Special::OneColor);
    }
    found
}

/// Point payouts. The exact numbers are table policy, not rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    pub front_win: i32,
    pub middle_win: i32,
    pub back_win: i32,
    /// Winning all three segments against one opponent.
    pub sweep_bonus: i32,
    pub dragon: i32,
    pub flush_dragon: i32,
    pub six_pairs: i32,
    pub all_faces: i32,
    pub one_color: i32,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            front_win: 1,
            middle_win: 2,
            back_win: 3,
            sweep_bonus: 3,
            dragon: 13,
            flush_dragon: 26,
            six_pairs: 3,
            all_faces: 6,
            one_color: 3,
        }
    }
}

impl ScorePolicy {
    fn special_value(&self, special: Special) -> i32 {
        match special {
            Special::Dragon => self.dragon,
            Special::FlushDragon => self.flush_dragon,
            Special::SixPairs => self.six_pairs,
            Special::AllFaces => self.all_faces,
            Special::OneColor => self.one_color,
        }
    }
}

/// Score one finished round. Every unordered pair of players compares
/// same-position segments; an invalid arrangement loses all three segments
/// and the sweep to each valid opponent, and two invalid arrangements owe
/// each other nothing. Specials are awarded once per player on top.
pub fn score_round(
    arrangements: &[(PlayerId, Arrangement)],
    policy: &ScorePolicy,
) -> HashMap<PlayerId, i32> {
    let mut totals: HashMap<PlayerId, i32> = arrangements
        .iter()
        .map(|(pid, _)| (pid.clone(), 0))
        .collect();
    let segment_pts = [policy.front_win, policy.middle_win, policy.back_win];
    let sweep_total: i32 = segment_pts.iter().sum::<i32>() + policy.sweep_bonus;
    for (i, (pid_a, arr_a)) in arrangements.iter().enumerate() {
        for (pid_b, arr_b) in &arrangements[i + 1..] {
            let delta = match (arr_a.is_valid(), arr_b.is_valid()) {
                (false, false) => 0,
                (true, false) => sweep_total,
                (false, true) => -sweep_total,
                (true, true) => {
                    let keys_a = arr_a.segment_keys();
                    let keys_b = arr_b.segment_keys();
                    let mut delta = 0;
                    let mut wins_a = 0;
                    let mut wins_b = 0;
                    for seg in 0..3 {
                        // scalar values are unique within a deal, so there
                        // are no ties
                        if keys_a[seg] > keys_b[seg] {
                            delta += segment_pts[seg];
                            wins_a += 1;
                        } else {
                            delta -= segment_pts[seg];
                            wins_b += 1;
                        }
                    }
                    if wins_a == 3 {
                        delta += policy.sweep_bonus;
                    } else if wins_b == 3 {
                        delta -= policy.sweep_bonus;
                    }
                    delta
                }
            };
            *totals.get_mut(pid_a).expect("player seeded above") += delta;
            *totals.get_mut(pid_b).expect("player seeded above") -= delta;
        }
    }
    for (pid, arr) in arrangements {
        for special in detect_specials(&arr.cards()) {
            *totals.get_mut(pid).expect("player seeded above") += policy.special_value(special);
        }
    }
    totals
}
