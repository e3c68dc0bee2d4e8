//! Card types, the strength ladder, and card id parsing.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CardParseError;

/// Card suit. Jokers carry the dedicated [`Suit::Joker`] suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Clubs.
    Clubs,
    /// Diamonds.
    Diamonds,
    /// Hearts.
    Hearts,
    /// Spades.
    Spades,
    /// The joker's pseudo-suit.
    Joker,
}

impl Suit {
    /// The four real suits, in deck-building order.
    pub const STANDARD: [Self; 4] = [Self::Clubs, Self::Diamonds, Self::Hearts, Self::Spades];

    /// Wire name of the suit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clubs => "clubs",
            Self::Diamonds => "diamonds",
            Self::Hearts => "hearts",
            Self::Spades => "spades",
            Self::Joker => "joker",
        }
    }

    /// Display symbol used in table logs.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
            Self::Joker => "",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Suit {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clubs" => Ok(Self::Clubs),
            "diamonds" => Ok(Self::Diamonds),
            "hearts" => Ok(Self::Hearts),
            "spades" => Ok(Self::Spades),
            "joker" => Ok(Self::Joker),
            _ => Err(CardParseError::UnknownSuit),
        }
    }
}

/// Card rank, declared in ascending ladder order (3 is weakest, 2 is the
/// strongest regular rank, the joker sits above the ladder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    /// 3.
    #[serde(rename = "3")]
    Three,
    /// 4.
    #[serde(rename = "4")]
    Four,
    /// 5.
    #[serde(rename = "5")]
    Five,
    /// 6.
    #[serde(rename = "6")]
    Six,
    /// 7.
    #[serde(rename = "7")]
    Seven,
    /// 8.
    #[serde(rename = "8")]
    Eight,
    /// 9.
    #[serde(rename = "9")]
    Nine,
    /// 10.
    #[serde(rename = "10")]
    Ten,
    /// Jack.
    #[serde(rename = "J")]
    Jack,
    /// Queen.
    #[serde(rename = "Q")]
    Queen,
    /// King.
    #[serde(rename = "K")]
    King,
    /// Ace.
    #[serde(rename = "A")]
    Ace,
    /// 2.
    #[serde(rename = "2")]
    Two,
    /// Joker.
    Joker,
}

impl Rank {
    /// The 13 regular ranks from weakest to strongest under the normal order.
    pub const LADDER: [Self; 13] = [
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
        Self::Two,
    ];

    /// Position on the normal ladder. The joker is placed one past the top.
    #[must_use]
    pub const fn ladder_index(self) -> u8 {
        self as u8
    }

    /// Strength under the active order.
    ///
    /// A reversed order flips the 13-rank ladder; the joker is always maximal.
    #[must_use]
    pub const fn strength(self, reversed: bool) -> u8 {
        match self {
            Self::Joker => 13,
            rank if reversed => 12 - rank.ladder_index(),
            rank => rank.ladder_index(),
        }
    }

    /// Wire name of the rank.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
            Self::Two => "2",
            Self::Joker => "Joker",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("joker") {
            return Ok(Self::Joker);
        }
        Self::LADDER
            .into_iter()
            .find(|rank| rank.as_str() == s)
            .ok_or(CardParseError::UnknownRank)
    }
}

/// A playing card.
///
/// Every card in the 53-card deck is unique, so a card doubles as its own
/// identifier; [`Card::id`] renders the stable wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "CardRepr", try_from = "CardRepr")]
pub struct Card {
    /// The suit of the card.
    pub suit: Suit,
    /// The rank of the card.
    pub rank: Rank,
}

impl Card {
    /// Creates a new card.
    ///
    /// Note: This function does not check that jokers and the joker suit are
    /// paired; use [`Card::joker`] for the joker.
    #[must_use]
    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// The joker.
    #[must_use]
    pub const fn joker() -> Self {
        Self::new(Suit::Joker, Rank::Joker)
    }

    /// Returns true for the joker.
    #[must_use]
    pub const fn is_joker(&self) -> bool {
        matches!(self.rank, Rank::Joker)
    }

    /// Returns true for the spade 3, the only card that counters a joker.
    #[must_use]
    pub const fn is_spade_three(&self) -> bool {
        matches!((self.suit, self.rank), (Suit::Spades, Rank::Three))
    }

    /// Stable wire id, e.g. `spades-3` or `joker-joker`.
    #[must_use]
    pub fn id(&self) -> String {
        if self.is_joker() {
            return String::from("joker-joker");
        }
        format!("{}-{}", self.suit.as_str(), self.rank.as_str())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            return f.write_str("Joker");
        }
        write!(f, "{}{}", self.suit, self.rank)
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Parses a card id such as `hearts-10` or `joker-joker`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (suit, rank) = s.split_once('-').ok_or(CardParseError::MalformedId)?;
        let suit: Suit = suit.parse()?;
        let rank: Rank = rank.parse()?;
        match (suit, rank) {
            (Suit::Joker, Rank::Joker) => Ok(Self::joker()),
            (Suit::Joker, _) | (_, Rank::Joker) => Err(CardParseError::MalformedId),
            (suit, rank) => Ok(Self::new(suit, rank)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CardRepr {
    #[serde(default)]
    id: String,
    suit: Suit,
    rank: Rank,
}

impl From<Card> for CardRepr {
    fn from(card: Card) -> Self {
        Self {
            id: card.id(),
            suit: card.suit,
            rank: card.rank,
        }
    }
}

impl TryFrom<CardRepr> for Card {
    type Error = CardParseError;

    fn try_from(repr: CardRepr) -> Result<Self, Self::Error> {
        match (repr.suit, repr.rank) {
            (Suit::Joker, Rank::Joker) => Ok(Self::joker()),
            (Suit::Joker, _) | (_, Rank::Joker) => Err(CardParseError::MalformedId),
            (suit, rank) => Ok(Self::new(suit, rank)),
        }
    }
}

/// Number of cards per deck (52 ranked cards plus one joker).
pub const DECK_SIZE: usize = 53;

/// Returns the cards of `cards` that are not jokers.
pub fn non_jokers(cards: &[Card]) -> impl Iterator<Item = &Card> {
    cards.iter().filter(|card| !card.is_joker())
}

/// Returns true when every non-joker card shares one rank.
#[must_use]
pub fn has_uniform_rank(cards: &[Card]) -> bool {
    let mut ranks = non_jokers(cards).map(|card| card.rank);
    ranks
        .next()
        .is_none_or(|first| ranks.all(|rank| rank == first))
}

/// Representative rank of a combination: the shared non-joker rank, or
/// [`Rank::Joker`] for a jokers-only combination.
#[must_use]
pub fn combination_rank(cards: &[Card]) -> Rank {
    non_jokers(cards).next().map_or(Rank::Joker, |card| card.rank)
}

/// Renders cards for table logs.
#[must_use]
pub fn describe(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
