//! Deck construction, shuffling and dealing.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::card::{Card, DECK_SIZE, Rank, Suit};
use crate::game::PlayerId;

/// Builds the 53-card deck: 13 ranks in each of 4 suits, then the joker.
#[must_use]
pub fn create_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::STANDARD {
        for rank in Rank::LADDER {
            cards.push(Card::new(suit, rank));
        }
    }
    cards.push(Card::joker());
    cards
}

/// Returns a uniformly shuffled copy of `cards` (Fisher–Yates).
#[must_use]
pub fn shuffle_deck<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Vec<Card> {
    let mut deck = cards.to_vec();
    deck.shuffle(rng);
    deck
}

/// Outcome of a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealResult {
    /// Hands in the order of the player ids passed to [`deal_cards`].
    pub hands: Vec<(PlayerId, Vec<Card>)>,
    /// Holder of the lowest-ranked non-joker card.
    pub starter: Option<PlayerId>,
}

/// Shuffles a fresh deck and deals it round-robin: card `i` goes to
/// `player_ids[i % n]`, so hand sizes differ by at most one.
///
/// `player_ids` should be ordered by seat.
pub fn deal_cards<R: Rng + ?Sized>(player_ids: &[PlayerId], rng: &mut R) -> DealResult {
    if player_ids.is_empty() {
        return DealResult {
            hands: Vec::new(),
            starter: None,
        };
    }

    let deck = shuffle_deck(&create_deck(), rng);
    let mut hands: Vec<(PlayerId, Vec<Card>)> = player_ids
        .iter()
        .map(|id| (id.clone(), Vec::with_capacity(DECK_SIZE / player_ids.len() + 1)))
        .collect();

    for (index, card) in deck.into_iter().enumerate() {
        hands[index % player_ids.len()].1.push(card);
    }

    let starter = find_starter(&hands);
    DealResult { hands, starter }
}

/// Finds the holder of the globally lowest-ranked non-joker card.
///
/// Only the rank is compared; among equal ranks the first holder in seat
/// order (then hand order) wins.
fn find_starter(hands: &[(PlayerId, Vec<Card>)]) -> Option<PlayerId> {
    let mut lowest: Option<(Rank, &PlayerId)> = None;
    for (player_id, cards) in hands {
        for card in cards.iter().filter(|card| !card.is_joker()) {
            if lowest.is_none_or(|(rank, _)| card.rank < rank) {
                lowest = Some((card.rank, player_id));
            }
        }
    }
    lowest.map(|(_, player_id)| player_id.clone())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn ids(n: usize) -> Vec<PlayerId> {
        (1..=n).map(|i| PlayerId::from(format!("p{i}"))).collect()
    }

    #[test]
    fn deck_has_unique_cards_and_one_joker() {
        let deck = create_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<String> = deck.iter().map(Card::id).collect();
        assert_eq!(unique.len(), DECK_SIZE);
        assert_eq!(deck.iter().filter(|card| card.is_joker()).count(), 1);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let deck = create_deck();
        let shuffled = shuffle_deck(&deck, &mut rng);
        assert_ne!(deck, shuffled);
        let a: HashSet<Card> = deck.into_iter().collect();
        let b: HashSet<Card> = shuffled.into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn deal_balances_hands() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let result = deal_cards(&ids(4), &mut rng);
        let sizes: Vec<usize> = result.hands.iter().map(|(_, hand)| hand.len()).collect();
        assert_eq!(sizes, vec![14, 13, 13, 13]);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let sizes: Vec<usize> = deal_cards(&ids(5), &mut rng)
            .hands
            .iter()
            .map(|(_, hand)| hand.len())
            .collect();
        assert_eq!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap(), 1);
    }

    #[test]
    fn starter_holds_lowest_rank() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let result = deal_cards(&ids(4), &mut rng);
        let starter = result.starter.unwrap();
        let (_, hand) = result.hands.iter().find(|(id, _)| *id == starter).unwrap();
        assert!(hand.iter().any(|card| card.rank == Rank::Three));
        let first_with_three = result
            .hands
            .iter()
            .find(|(_, hand)| hand.iter().any(|card| card.rank == Rank::Three))
            .map(|(id, _)| id.clone());
        assert_eq!(Some(starter), first_with_three);
    }

    #[test]
    fn empty_table_deals_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = deal_cards(&[], &mut rng);
        assert!(result.hands.is_empty());
        assert_eq!(result.starter, None);
    }
}
