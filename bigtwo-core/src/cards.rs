pub mod card;
pub mod deck;
pub mod play;

pub use card::Card;
pub use deck::{Deck, DeckSeed};
pub use play::{Play, PlayClass};
