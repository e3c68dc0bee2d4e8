//! Display ordering for hands.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};

/// How a hand is ordered for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSortMode {
    /// Keep the dealt order.
    #[default]
    None,
    /// Strongest first under the active strength order.
    Strength,
    /// Grouped by suit (spades, hearts, diamonds, clubs, joker), strongest
    /// first inside each suit.
    Suit,
}

const fn suit_position(suit: Suit) -> u8 {
    match suit {
        Suit::Spades => 0,
        Suit::Hearts => 1,
        Suit::Diamonds => 2,
        Suit::Clubs => 3,
        Suit::Joker => 4,
    }
}

fn by_strength(a: &Card, b: &Card, reversed: bool) -> Ordering {
    b.rank.strength(reversed).cmp(&a.rank.strength(reversed))
}

fn by_id(a: &Card, b: &Card) -> Ordering {
    a.id().cmp(&b.id())
}

/// Returns a sorted copy of `cards`.
///
/// `strength_reversed` should be [`crate::game::Flags::strength_reversed`]
/// for the table the hand belongs to.
#[must_use]
pub fn sort_hand(cards: &[Card], mode: HandSortMode, strength_reversed: bool) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    match mode {
        HandSortMode::None => {}
        HandSortMode::Strength => sorted.sort_by(|a, b| {
            by_strength(a, b, strength_reversed)
                .then_with(|| suit_position(b.suit).cmp(&suit_position(a.suit)))
                .then_with(|| by_id(a, b))
        }),
        HandSortMode::Suit => sorted.sort_by(|a, b| {
            suit_position(a.suit)
                .cmp(&suit_position(b.suit))
                .then_with(|| by_strength(a, b, strength_reversed))
                .then_with(|| by_id(a, b))
        }),
    }
    sorted
}
