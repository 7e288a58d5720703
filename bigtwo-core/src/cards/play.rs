use super::card::{Card, Rank};
use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

/// Every legal shape a submitted group of cards can classify to. The
/// declaration order is the comparison tier order, so the derived `Ord`
/// encodes both the 5-card hierarchy (straight < flush < full house) and
/// the bomb hierarchy (four of a kind < straight flush).
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, derive_more::Display, Serialize, Deserialize,
)]
pub enum PlayClass {
    Single,
    Pair,
    Triple,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl PlayClass {
    /// Bombs beat any non-bomb play regardless of card count.
    pub const fn is_bomb(self) -> bool {
        matches!(self, PlayClass::FourOfAKind | PlayClass::StraightFlush)
    }
}

/// A classified group of 1, 2, 3, or 5 cards. Construction is only possible
/// through [`Play::classify`], so a `Play` is always a legal shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    cards: Vec<Card>,
    class: PlayClass,
    strength: u8,
}

impl std::fmt::Display for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [", self.class)?;
        for (i, c) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}

impl Play {
    /// Classify an ordered group of cards into a play, or `None` if the
    /// group is not a legal shape. Deterministic and independent of input
    /// order; duplicate cards are never a legal shape.
    pub fn classify(cards: &[Card]) -> Option<Play> {
        let mut sorted = cards.to_vec();
        sorted.sort_unstable();
        let before = sorted.len();
        sorted.dedup();
        if sorted.len() != before {
            return None;
        }
        let (class, strength) = match sorted.len() {
            1 => (PlayClass::Single, sorted[0].value()),
            2 => {
                if sorted[0].rank() != sorted[1].rank() {
                    return None;
                }
                (PlayClass::Pair, sorted[1].value())
            }
            3 => {
                if sorted[0].rank() != sorted[2].rank() {
                    return None;
                }
                (PlayClass::Triple, sorted[2].value())
            }
            5 => classify_five(&sorted)?,
            _ => return None,
        };
        Some(Play {
            cards: sorted,
            class,
            strength,
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub const fn class(&self) -> PlayClass {
        self.class
    }

    /// The scalar value of the play's highest relevant card.
    pub const fn strength(&self) -> u8 {
        self.strength
    }

    /// Whether this play legally beats the incumbent. A `None` incumbent is
    /// an open trick, which any play may lead; the opening-3d constraint is
    /// the state machine's responsibility.
    pub fn beats(&self, incumbent: Option<&Play>) -> bool {
        let inc = match incumbent {
            None => return true,
            Some(inc) => inc,
        };
        if self.class.is_bomb() || inc.class.is_bomb() {
            if !self.class.is_bomb() {
                return false;
            }
            if !inc.class.is_bomb() {
                return true;
            }
            return (self.class, self.strength) > (inc.class, inc.strength);
        }
        // Non-bomb plays must match card counts; for equal counts the class
        // tier and then the strength decide. Equal 1-3 card counts force
        // equal classes, so this is also the exact-type-match rule.
        if self.cards.len() != inc.cards.len() {
            return false;
        }
        (self.class, self.strength) > (inc.class, inc.strength)
    }
}

/// Classify five sorted, distinct cards. Priority order: straight flush,
/// four of a kind, full house, flush, straight.
fn classify_five(cards: &[Card]) -> Option<(PlayClass, u8)> {
    debug_assert_eq!(cards.len(), 5);
    let mut ranks: EnumMap<Rank, usize> = EnumMap::from_array([0usize; 13]);
    for c in cards {
        ranks[c.rank()] += 1;
    }
    let flush = cards.iter().all(|c| c.suit() == cards[0].suit());
    // A run is 5 contiguous ascending rank indices; 2 is always the top rank
    // and never wraps back to 3.
    let straight = cards
        .windows(2)
        .all(|w| w[1].rank().index() == w[0].rank().index() + 1);
    let top = cards[4].value();
    if straight && flush {
        return Some((PlayClass::StraightFlush, top));
    }
    if let Some((rank, _)) = ranks.iter().find(|(_, n)| **n == 4) {
        return Some((PlayClass::FourOfAKind, group_max(cards, rank)));
    }
    let trip = ranks.iter().find(|(_, n)| **n == 3).map(|(r, _)| r);
    let pair = ranks.iter().any(|(_, n)| *n == 2);
    if let Some(rank) = trip {
        if pair {
            return Some((PlayClass::FullHouse, group_max(cards, rank)));
        }
    }
    if flush {
        return Some((PlayClass::Flush, top));
    }
    if straight {
        return Some((PlayClass::Straight, top));
    }
    None
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

#[cfg(test)]
mod test_classify {
    use super::*;
    use crate::cards::card::cards_from_str;

    fn class_of(s: &'static str) -> Option<PlayClass> {
        Play::classify(&cards_from_str(s)).map(|p| p.class())
    }

    #[test]
    fn singles_pairs_triples() {
        assert_eq!(class_of("3d"), Some(PlayClass::Single));
        assert_eq!(class_of("4d4c"), Some(PlayClass::Pair));
        assert_eq!(class_of("4d5c"), None);
        assert_eq!(class_of("9d9c9h"), Some(PlayClass::Triple));
        assert_eq!(class_of("9d9c8h"), None);
    }

    #[test]
    fn bad_sizes() {
        assert_eq!(class_of(""), None);
        assert_eq!(class_of("3d4d5d6d"), None);
        assert_eq!(class_of("3d4d5d6d7d8d"), None);
    }

    #[test]
    fn duplicates_are_invalid() {
        assert_eq!(class_of("4d4d"), None);
        assert_eq!(class_of("4d4d4c4h5s"), None);
    }

    #[test]
    fn five_card_shapes() {
        assert_eq!(class_of("3d4c5h6s7d"), Some(PlayClass::Straight));
        assert_eq!(class_of("3d5d8dJdKd"), Some(PlayClass::Flush));
        assert_eq!(class_of("7d7c7h9s9d"), Some(PlayClass::FullHouse));
        assert_eq!(class_of("7d7c7h7s9d"), Some(PlayClass::FourOfAKind));
        assert_eq!(class_of("5h6h7h8h9h"), Some(PlayClass::StraightFlush));
        assert_eq!(class_of("3d4c5h6s8d"), None);
        assert_eq!(class_of("7d7c9h9sJd"), None);
    }

    /// 2 sits on top of the rank ladder: runs may end at 2 but never wrap
    /// through it back to 3.
    #[test]
    fn two_never_wraps() {
        assert_eq!(class_of("JdQcKhAs2d"), Some(PlayClass::Straight));
        assert_eq!(class_of("2d3c4h5s6d"), None);
        assert_eq!(class_of("Ad2c3h4s5d"), None);
    }

    #[test]
    fn strength_keys() {
        // Pair strength uses the higher suit of the pair.
        let low = Play::classify(&cards_from_str("9d9c")).unwrap();
        let high = Play::classify(&cards_from_str("9h9s")).unwrap();
        assert!(high.strength() > low.strength());
        // Full house and quads key off the big rank group, not the kicker.
        let fh = Play::classify(&cards_from_str("7d7c7h9s9d")).unwrap();
        assert_eq!(fh.strength(), cards_from_str("7h")[0].value());
        let quad = Play::classify(&cards_from_str("7d7c7h7s9d")).unwrap();
        assert_eq!(quad.strength(), cards_from_str("7s")[0].value());
    }

    /// classify must not care about the order cards were submitted in.
    #[test]
    fn input_order_irrelevant() {
        let a = Play::classify(&cards_from_str("7d7c7h9s9d")).unwrap();
        let b = Play::classify(&cards_from_str("9d9s7h7c7d")).unwrap();
        assert_eq!(a, b);
    }
}
