//! Special-card effects.
//!
//! After a play is laid on the table the resolver looks at how many cards of
//! each special rank it contained and applies, in order: jack reversal,
//! eight-cut, ten discard, queen purge, seven give, nine rotation and
//! revolution. Suit binding and the joker/spade-3 counter run afterwards.

use tracing::debug;

use crate::card::{self, Card, Rank};

use super::{Allowance, GameState, Marker, PendingEffect, Play, PlayerId, Purge};

/// Ranks a single joker can complete for effect purposes.
const WILD_ELIGIBLE: [Rank; 6] = [
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
];

/// Minimum strength a joker lifts an effect to.
const WILD_MINIMUM: u8 = 3;

/// Number of `rank` cards a play counts as when triggering effects.
///
/// A single joker alongside an eligible rank counts as at least three of
/// that rank. A play without the rank never triggers it.
#[must_use]
pub fn effective_count(cards: &[Card], rank: Rank) -> u8 {
    let rank_count = cards.iter().filter(|card| card.rank == rank).count() as u8;
    if rank_count == 0 {
        return 0;
    }
    let jokers = cards.iter().filter(|card| card.is_joker()).count();
    if jokers == 1 && WILD_ELIGIBLE.contains(&rank) {
        return rank_count.max(WILD_MINIMUM);
    }
    rank_count
}

/// Four of a rank without jokers, or four of a rank plus exactly one joker.
#[must_use]
pub fn is_revolution(cards: &[Card]) -> bool {
    let jokers = cards.iter().filter(|card| card.is_joker()).count();
    let uniform = card::has_uniform_rank(cards);
    match (cards.len(), jokers) {
        (4, 0) | (5, 1) => uniform,
        _ => false,
    }
}

impl GameState {
    /// Applies the effect table for a play by `actor`.
    ///
    /// Returns true when the play cut the table and the actor keeps the turn.
    pub(super) fn resolve_play_effects(&mut self, actor: &PlayerId, cards: &[Card]) -> bool {
        let mut keep_turn = false;

        if effective_count(cards, Rank::Jack) > 0 {
            self.toggle_jack_reversal(actor);
        }

        if effective_count(cards, Rank::Eight) > 0 {
            self.clear_table();
            self.log("Eight-cut! The table is cleared");
            keep_turn = true;
        }

        let tens = effective_count(cards, Rank::Ten);
        if tens > 0 {
            self.pending_effects
                .push(PendingEffect::TenDiscard(Allowance {
                    player_id: actor.clone(),
                    count: tens,
                    optional: true,
                    remaining: tens,
                }));
            self.log(&format!("Ten discard: up to {tens} cards may be discarded"));
        }

        let queens = effective_count(cards, Rank::Queen);
        if queens > 0 {
            self.pending_effects.push(PendingEffect::QueenPurge(Purge {
                player_id: actor.clone(),
                count: queens,
                remaining: queens,
                declared_ranks: Vec::new(),
            }));
            self.log(&format!("Queen purge: declare {queens} ranks"));
        }

        let sevens = effective_count(cards, Rank::Seven);
        if sevens > 0 {
            self.pending_effects
                .push(PendingEffect::SevenGive(Allowance {
                    player_id: actor.clone(),
                    count: sevens,
                    optional: true,
                    remaining: sevens,
                }));
            self.log(&format!("Seven give: up to {sevens} cards may be passed on"));
        }

        if effective_count(cards, Rank::Nine) > 0 {
            self.flags.rotation_reversed = !self.flags.rotation_reversed;
            let direction = if self.flags.rotation_reversed {
                "reversed"
            } else {
                "normal"
            };
            self.log(&format!("Nine: turn order is now {direction}"));
        }

        if is_revolution(cards) {
            self.toggle_revolution(actor);
        }

        debug!(
            room = %self.room_code,
            player = %actor,
            keep_turn,
            strength_reversed = self.flags.strength_reversed(),
            pending = self.pending_effects.len(),
            "play effects resolved"
        );
        keep_turn
    }

    /// Clears the trick and every trick-scoped flag: pass marks, the pass
    /// streak, the suit lock, the joker wait and the jack reversal.
    pub(super) fn clear_table(&mut self) {
        self.table.clear_trick();
        self.pass_streak = 0;
        for player in &mut self.players {
            player.has_passed = false;
        }
        self.flags.awaiting_spade3 = false;
        self.flags.lock_suit = None;
        self.clear_jack_reversal();
    }

    fn clear_jack_reversal(&mut self) {
        let was_active = self.flags.jack_reversal_active;
        self.flags.jack_reversal_active = false;
        self.pending_effects
            .retain(|effect| !matches!(effect, PendingEffect::JackReverse(_)));
        if !was_active {
            return;
        }
        if self.flags.revolution_active {
            self.log("Jack reversal ends; the revolution order is back");
        } else {
            self.log("Jack reversal ends; strength order is normal again");
        }
    }

    fn toggle_jack_reversal(&mut self, actor: &PlayerId) {
        self.flags.jack_reversal_active = !self.flags.jack_reversal_active;
        self.pending_effects
            .retain(|effect| !matches!(effect, PendingEffect::JackReverse(_)));
        if self.flags.jack_reversal_active {
            self.pending_effects.push(PendingEffect::JackReverse(Marker {
                player_id: Some(actor.clone()),
            }));
        }
        let order = strength_label(self.flags.strength_reversed());
        self.log(&format!("Jack: strength order is now {order}"));
    }

    fn toggle_revolution(&mut self, actor: &PlayerId) {
        self.flags.revolution_active = !self.flags.revolution_active;
        let name = self.name_of(actor);
        let order = strength_label(self.flags.strength_reversed());
        if self.flags.revolution_active {
            self.log(&format!("{name} starts a revolution! Strength order is now {order}"));
        } else {
            self.log(&format!(
                "{name} ends the revolution; strength order is now {order}"
            ));
        }
    }

    /// Binds the suit when a play shares a suit with the play it beat.
    pub(super) fn update_suit_lock(&mut self, cards: &[Card], previous: Option<&Play>) {
        let Some(previous) = previous else {
            return;
        };
        if cards.iter().any(|card| card.rank == Rank::Eight) {
            return;
        }
        let shared = card::non_jokers(cards)
            .map(|card| card.suit)
            .find(|suit| card::non_jokers(&previous.cards).any(|card| card.suit == *suit));
        let Some(suit) = shared else {
            return;
        };
        if self.flags.lock_suit != Some(suit) {
            self.flags.lock_suit = Some(suit);
            self.log(&format!("Suit lock: {suit} only"));
        }
    }

    /// Tracks the lone joker and its spade-3 counter.
    ///
    /// Returns true when the spade 3 countered a joker; the table is then
    /// cleared and the countering player keeps the turn.
    pub(super) fn update_joker_counter(&mut self, cards: &[Card], previous: Option<&Play>) -> bool {
        if matches!(cards, [card] if card.is_joker()) {
            self.flags.awaiting_spade3 = true;
            self.log("A joker is on the table; only the spade 3 can answer it");
            return false;
        }

        let was_awaiting = self.flags.awaiting_spade3;
        self.flags.awaiting_spade3 = false;
        let countered = matches!(cards, [card] if card.is_spade_three())
            && previous.is_some_and(|play| was_awaiting || play.has_joker());
        if countered {
            self.clear_table();
            self.log("The spade 3 counters the joker");
        }
        countered
    }
}

const fn strength_label(reversed: bool) -> &'static str {
    if reversed { "reversed" } else { "normal" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn joker_completes_eligible_ranks_to_three() {
        let sevens = [
            c(Suit::Clubs, Rank::Seven),
            c(Suit::Hearts, Rank::Seven),
            c(Suit::Spades, Rank::Seven),
            Card::joker(),
        ];
        assert_eq!(effective_count(&sevens, Rank::Seven), 3);
        assert_eq!(
            effective_count(&[c(Suit::Clubs, Rank::Ten), Card::joker()], Rank::Ten),
            3
        );
        assert_eq!(effective_count(&[c(Suit::Clubs, Rank::Ten)], Rank::Ten), 1);
        assert_eq!(
            effective_count(&[c(Suit::Clubs, Rank::King), Card::joker()], Rank::King),
            1
        );
        assert_eq!(effective_count(&[Card::joker()], Rank::Eight), 0);
    }

    #[test]
    fn revolution_shapes() {
        let kings: Vec<Card> = Suit::STANDARD
            .into_iter()
            .map(|suit| c(suit, Rank::King))
            .collect();
        assert!(is_revolution(&kings));

        let mut with_joker = kings.clone();
        with_joker.push(Card::joker());
        assert!(is_revolution(&with_joker));

        let three_and_joker = [kings[0], kings[1], kings[2], Card::joker()];
        assert!(!is_revolution(&three_and_joker));
        assert!(!is_revolution(&kings[..3]));
    }

    #[test]
    fn suit_lock_needs_a_shared_suit() {
        let mut state = GameState::new("room");
        let previous = Play {
            player_id: "a".into(),
            cards: vec![c(Suit::Hearts, Rank::Four), c(Suit::Clubs, Rank::Four)],
            timestamp: String::new(),
        };
        state.update_suit_lock(
            &[c(Suit::Spades, Rank::Six), c(Suit::Diamonds, Rank::Six)],
            Some(&previous),
        );
        assert_eq!(state.flags.lock_suit, None);

        state.update_suit_lock(
            &[c(Suit::Spades, Rank::Six), c(Suit::Clubs, Rank::Six)],
            Some(&previous),
        );
        assert_eq!(state.flags.lock_suit, Some(Suit::Clubs));

        state.flags.lock_suit = None;
        state.update_suit_lock(
            &[c(Suit::Hearts, Rank::Eight), c(Suit::Clubs, Rank::Eight)],
            Some(&previous),
        );
        assert_eq!(state.flags.lock_suit, None);
    }

    #[test]
    fn clearing_the_table_ends_jack_reversal() {
        let mut state = GameState::new("room");
        state.toggle_jack_reversal(&"a".into());
        state.flags.revolution_active = true;
        assert!(!state.flags.strength_reversed());
        assert_eq!(state.pending_effects.len(), 1);

        state.clear_table();
        assert!(!state.flags.jack_reversal_active);
        assert!(state.flags.strength_reversed());
        assert!(state.pending_effects.is_empty());
    }
}
