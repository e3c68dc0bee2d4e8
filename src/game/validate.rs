//! Combination validation.

use crate::card::{self, Card};
use crate::error::PlayError;

use super::{GameState, PlayerId};

fn is_single_spade_three(cards: &[Card]) -> bool {
    matches!(cards, [card] if card.is_spade_three())
}

fn has_duplicates(cards: &[Card]) -> bool {
    cards
        .iter()
        .enumerate()
        .any(|(index, card)| cards[..index].contains(card))
}

impl GameState {
    /// Decides whether `player_id` may lay `cards` on the table.
    ///
    /// Checks run in a fixed order and the first failure is reported. The
    /// state is never modified.
    ///
    /// # Errors
    ///
    /// Returns the first rule the selection breaks.
    pub fn can_play(&self, player_id: &PlayerId, cards: &[Card]) -> Result<(), PlayError> {
        if self.finished {
            return Err(PlayError::MatchFinished);
        }
        if self.current_turn.as_ref() != Some(player_id) {
            return Err(PlayError::NotYourTurn);
        }
        let player = self.player(player_id).ok_or(PlayError::PlayerNotFound)?;
        if player.finished {
            return Err(PlayError::AlreadyFinished);
        }
        if self.has_blocking_effect(player_id) {
            return Err(PlayError::EffectPending);
        }
        if cards.is_empty() {
            return Err(PlayError::NoCardsSelected);
        }
        if has_duplicates(cards) {
            return Err(PlayError::DuplicateCard);
        }
        if !player.holds_all(cards) {
            return Err(PlayError::CardNotInHand);
        }
        if !card::has_uniform_rank(cards) {
            return Err(PlayError::MixedRanks);
        }
        if let Some(required) = self.table.required_count {
            if required != cards.len() {
                return Err(PlayError::WrongCount { required });
            }
        }
        if let Some(suit) = self.flags.lock_suit {
            if card::non_jokers(cards).any(|card| card.suit != suit) {
                return Err(PlayError::SuitLocked { suit });
            }
        }
        if self.flags.awaiting_spade3 {
            if is_single_spade_three(cards) {
                return Ok(());
            }
            return Err(PlayError::SpadeThreeRequired);
        }

        let Some(last_play) = &self.table.last_play else {
            return Ok(());
        };

        if last_play.has_joker() {
            if is_single_spade_three(cards) {
                return Ok(());
            }
            return Err(PlayError::JokerOnTable);
        }

        if cards.len() != last_play.cards.len() {
            return Err(PlayError::WrongCount {
                required: last_play.cards.len(),
            });
        }

        let reversed = self.flags.strength_reversed();
        let challenger = card::combination_rank(cards).strength(reversed);
        let current = card::combination_rank(&last_play.cards).strength(reversed);
        if challenger <= current {
            return Err(PlayError::TooWeak);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::game::{Play, Player};

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    fn table(hand: Vec<Card>) -> GameState {
        let mut state = GameState::new("room");
        let mut alice = Player::new("alice".into(), "Alice", 1);
        alice.hand = hand;
        let mut bob = Player::new("bob".into(), "Bob", 2);
        bob.hand = vec![c(Suit::Clubs, Rank::Four)];
        state.players = vec![alice, bob];
        state.current_turn = Some("alice".into());
        state
    }

    fn lay(state: &mut GameState, cards: Vec<Card>) {
        state.table.required_count = Some(cards.len());
        state.table.last_play = Some(Play {
            player_id: "bob".into(),
            cards,
            timestamp: String::new(),
        });
    }

    #[test]
    fn opening_lead_accepts_any_uniform_set() {
        let hand = vec![
            c(Suit::Clubs, Rank::Nine),
            c(Suit::Hearts, Rank::Nine),
            Card::joker(),
        ];
        let state = table(hand.clone());
        assert_eq!(state.can_play(&"alice".into(), &hand), Ok(()));
        assert_eq!(state.can_play(&"alice".into(), &[Card::joker()]), Ok(()));
    }

    #[test]
    fn turn_and_ownership_checks_come_first() {
        let state = table(vec![c(Suit::Clubs, Rank::Nine)]);
        assert_eq!(
            state.can_play(&"bob".into(), &[c(Suit::Clubs, Rank::Four)]),
            Err(PlayError::NotYourTurn)
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[]),
            Err(PlayError::NoCardsSelected)
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Four)]),
            Err(PlayError::CardNotInHand)
        );
        assert_eq!(
            state.can_play(
                &"alice".into(),
                &[c(Suit::Clubs, Rank::Nine), c(Suit::Clubs, Rank::Nine)]
            ),
            Err(PlayError::DuplicateCard)
        );
        assert_eq!(PlayError::DuplicateCard.to_string(), "duplicate card selected");
    }

    #[test]
    fn mixed_ranks_are_rejected() {
        let hand = vec![c(Suit::Clubs, Rank::Nine), c(Suit::Clubs, Rank::Ten)];
        let state = table(hand.clone());
        assert_eq!(
            state.can_play(&"alice".into(), &hand),
            Err(PlayError::MixedRanks)
        );
        assert_eq!(PlayError::MixedRanks.to_string(), "uniform rank only");
    }

    #[test]
    fn must_beat_and_match_count() {
        let mut state = table(vec![
            c(Suit::Clubs, Rank::Nine),
            c(Suit::Hearts, Rank::Nine),
            c(Suit::Clubs, Rank::Five),
        ]);
        lay(&mut state, vec![c(Suit::Spades, Rank::Seven)]);

        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Nine)]),
            Ok(())
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Five)]),
            Err(PlayError::TooWeak)
        );
        assert_eq!(
            state.can_play(
                &"alice".into(),
                &[c(Suit::Clubs, Rank::Nine), c(Suit::Hearts, Rank::Nine)]
            ),
            Err(PlayError::WrongCount { required: 1 })
        );

        state.flags.revolution_active = true;
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Five)]),
            Ok(())
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Nine)]),
            Err(PlayError::TooWeak)
        );
    }

    #[test]
    fn ties_are_illegal() {
        let mut state = table(vec![c(Suit::Clubs, Rank::Seven)]);
        lay(&mut state, vec![c(Suit::Spades, Rank::Seven)]);
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Seven)]),
            Err(PlayError::TooWeak)
        );
    }

    #[test]
    fn suit_lock_allows_joker_substitution() {
        let mut state = table(vec![
            c(Suit::Hearts, Rank::Nine),
            c(Suit::Clubs, Rank::Ten),
            c(Suit::Hearts, Rank::Jack),
            Card::joker(),
        ]);
        lay(&mut state, vec![c(Suit::Hearts, Rank::Eight)]);
        state.flags.lock_suit = Some(Suit::Hearts);

        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Ten)]),
            Err(PlayError::SuitLocked { suit: Suit::Hearts })
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Hearts, Rank::Nine)]),
            Ok(())
        );
        state.table.required_count = None;
        lay(&mut state, vec![c(Suit::Hearts, Rank::Four), c(Suit::Spades, Rank::Four)]);
        assert_eq!(
            state.can_play(
                &"alice".into(),
                &[c(Suit::Hearts, Rank::Jack), Card::joker()]
            ),
            Ok(())
        );
    }

    #[test]
    fn lone_joker_only_falls_to_spade_three() {
        let mut state = table(vec![c(Suit::Spades, Rank::Three), c(Suit::Clubs, Rank::Two)]);
        lay(&mut state, vec![Card::joker()]);
        state.flags.awaiting_spade3 = true;

        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Two)]),
            Err(PlayError::SpadeThreeRequired)
        );
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Spades, Rank::Three)]),
            Ok(())
        );

        state.flags.awaiting_spade3 = false;
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Two)]),
            Err(PlayError::JokerOnTable)
        );
    }

    #[test]
    fn blocking_effect_holds_the_actor() {
        let mut state = table(vec![c(Suit::Clubs, Rank::Nine)]);
        state
            .pending_effects
            .push(crate::game::PendingEffect::TenDiscard(crate::game::Allowance {
                player_id: "alice".into(),
                count: 1,
                optional: true,
                remaining: 1,
            }));
        assert_eq!(
            state.can_play(&"alice".into(), &[c(Suit::Clubs, Rank::Nine)]),
            Err(PlayError::EffectPending)
        );
    }
}
