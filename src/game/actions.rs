use tracing::{debug, info};

use crate::card::{self, Card, Rank};
use crate::error::{EffectError, PlayError};

use super::state::{LAST_PLACE_LABEL, RESULT_LABELS};
use super::{EffectAction, GameState, PendingEffect, Play, PlayerId};

impl GameState {
    /// Lays `cards` from `player_id`'s hand on the table.
    ///
    /// Runs [`GameState::can_play`] first, then moves the cards, applies the
    /// special-card effects, checks for completion and match end and
    /// advances the turn. The receiver is left untouched; the new state is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the validation failure if the play is illegal.
    pub fn apply_play(&self, player_id: &PlayerId, cards: &[Card]) -> Result<Self, PlayError> {
        self.can_play(player_id, cards)?;

        let mut next = self.clone();
        let previous = next.table.last_play.clone();
        let player = next
            .player_mut(player_id)
            .ok_or(PlayError::PlayerNotFound)?;
        player.remove_cards(cards);
        let name = player.name.clone();

        let play = Play::now(player_id.clone(), cards.to_vec());
        next.table.last_play = Some(play.clone());
        next.table.required_count = Some(cards.len());
        next.table.pile.extend_from_slice(cards);
        next.turn_history.push(play);
        next.pass_streak = 0;
        for player in &mut next.players {
            player.has_passed = false;
        }
        next.log(&format!("{name} plays {}", card::describe(cards)));

        let cut = next.resolve_play_effects(player_id, cards);
        next.update_suit_lock(cards, previous.as_ref());
        let countered = next.update_joker_counter(cards, previous.as_ref());

        next.complete_if_out_of_cards(player_id);
        next.check_match_end();
        next.finalize_turn(player_id, cut || countered);

        debug!(
            room = %next.room_code,
            player = %player_id,
            cards = cards.len(),
            next_turn = ?next.current_turn,
            "play applied"
        );
        Ok(next)
    }

    /// Passes on the current trick.
    ///
    /// Ignored (an unchanged copy is returned) when the match is over, the
    /// player does not hold the turn, or a blocking effect still waits on
    /// them. When everybody else has passed on the lead the table clears and
    /// the player who made the last play leads again.
    #[must_use]
    pub fn apply_pass(&self, player_id: &PlayerId) -> Self {
        let mut next = self.clone();
        if next.finished
            || next.current_turn.as_ref() != Some(player_id)
            || next.has_blocking_effect(player_id)
        {
            debug!(room = %next.room_code, player = %player_id, "pass ignored");
            return next;
        }
        let Some(player) = next.player_mut(player_id) else {
            return next;
        };
        if player.finished {
            return next;
        }
        player.has_passed = true;
        let name = player.name.clone();
        next.log(&format!("{name} passes"));
        next.pass_streak += 1;

        let threshold = next.active_count().saturating_sub(1).max(1);
        if next.pass_streak >= threshold {
            let leader = self
                .table
                .last_play
                .as_ref()
                .map_or_else(|| player_id.clone(), |play| play.player_id.clone());
            next.clear_table();
            next.current_turn = next.lead_from(&leader);
            next.log("Everyone passed; the table is cleared");
            debug!(room = %next.room_code, leader = %leader, "trick closed by passes");
            return next;
        }

        next.current_turn = next.next_active_player(player_id);
        next
    }

    /// Resolves one step of a blocking effect owned by the acting player.
    ///
    /// Sevens and tens accept up to the granted number of cards; an empty
    /// selection skips. A queen declaration purges the declared rank from
    /// every hand and holds the turn until every declaration is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is over, the player does not hold the
    /// turn, no matching effect is pending, or the selection breaks the
    /// effect's limits.
    pub fn apply_effect_action(&self, action: &EffectAction) -> Result<Self, EffectError> {
        if self.finished {
            return Err(EffectError::MatchFinished);
        }
        let actor = action.player_id();
        if self.current_turn.as_ref() != Some(actor) {
            return Err(EffectError::NotYourTurn);
        }
        let player = self.player(actor).ok_or(EffectError::PlayerNotFound)?;
        let index = self
            .pending_effects
            .iter()
            .position(|effect| effect.kind() == action.kind() && effect.owner() == Some(actor))
            .ok_or(EffectError::NoPendingEffect)?;

        let mut next = match (action, &self.pending_effects[index]) {
            (
                EffectAction::SevenGive { cards, .. } | EffectAction::TenDiscard { cards, .. },
                PendingEffect::SevenGive(allowance) | PendingEffect::TenDiscard(allowance),
            ) => {
                let give = matches!(action, EffectAction::SevenGive { .. });
                if cards
                    .iter()
                    .enumerate()
                    .any(|(i, card)| cards[..i].contains(card))
                {
                    return Err(EffectError::DuplicateCard);
                }
                if cards.len() > usize::from(allowance.count) {
                    return Err(EffectError::TooManyCards {
                        limit: allowance.count,
                    });
                }
                if !player.holds_all(cards) {
                    return Err(EffectError::CardNotInHand);
                }
                let recipient = if give && !cards.is_empty() {
                    Some(
                        self.next_active_player(actor)
                            .ok_or(EffectError::NoRecipient)?,
                    )
                } else {
                    None
                };
                self.transfer_cards(actor, cards, recipient, index)
            }
            (EffectAction::QueenPurge { rank, .. }, PendingEffect::QueenPurge(purge)) => {
                if purge.remaining == 0 {
                    return Err(EffectError::AlreadyResolved);
                }
                if *rank == Rank::Joker || purge.declared_ranks.contains(rank) {
                    return Err(EffectError::RankNotEligible { rank: *rank });
                }
                self.purge_rank(actor, *rank, index)
            }
            _ => return Err(EffectError::NoPendingEffect),
        };

        next.check_match_end();
        next.finalize_turn(actor, false);
        debug!(
            room = %next.room_code,
            player = %actor,
            effect = ?action.kind(),
            next_turn = ?next.current_turn,
            "effect resolved"
        );
        Ok(next)
    }

    fn transfer_cards(
        &self,
        actor: &PlayerId,
        cards: &[Card],
        recipient: Option<PlayerId>,
        effect_index: usize,
    ) -> Self {
        let mut next = self.clone();
        let give = matches!(next.pending_effects[effect_index], PendingEffect::SevenGive(_));
        next.pending_effects.remove(effect_index);

        if let Some(player) = next.player_mut(actor) {
            player.remove_cards(cards);
            player.has_passed = false;
        }
        let name = next.name_of(actor);

        match recipient {
            Some(recipient) => {
                if let Some(receiver) = next.player_mut(&recipient) {
                    receiver.hand.extend_from_slice(cards);
                }
                let receiver_name = next.name_of(&recipient);
                next.log(&format!(
                    "{name} gives {} cards to {receiver_name}",
                    cards.len()
                ));
                next.complete_if_out_of_cards(actor);
                next.complete_if_out_of_cards(&recipient);
            }
            None if give => {
                next.log(&format!("{name} gives no cards"));
                next.complete_if_out_of_cards(actor);
            }
            None => {
                next.table.discard.extend_from_slice(cards);
                if cards.is_empty() {
                    next.log(&format!("{name} discards no cards"));
                } else {
                    next.log(&format!("{name} discards {} cards", cards.len()));
                }
                next.complete_if_out_of_cards(actor);
            }
        }
        next
    }

    fn purge_rank(&self, actor: &PlayerId, rank: Rank, effect_index: usize) -> Self {
        let mut next = self.clone();
        let mut removed = 0;
        let mut emptied = Vec::new();
        for player in &mut next.players {
            let before = player.hand.len();
            let (purged, kept): (Vec<Card>, Vec<Card>) =
                player.hand.iter().partition(|card| card.rank == rank);
            if purged.is_empty() {
                continue;
            }
            player.hand = kept;
            removed += purged.len();
            next.table.discard.extend(purged);
            if before > 0 && player.hand.is_empty() {
                emptied.push(player.id.clone());
            }
        }

        let mut resolved = false;
        if let Some(PendingEffect::QueenPurge(purge)) = next.pending_effects.get_mut(effect_index) {
            purge.remaining = purge.remaining.saturating_sub(1);
            purge.declared_ranks.push(rank);
            resolved = purge.remaining == 0;
        }
        if resolved {
            next.pending_effects.remove(effect_index);
        }

        let name = next.name_of(actor);
        next.log(&format!(
            "{name} declares {rank} for the queen purge; {removed} cards are discarded"
        ));
        for player_id in &emptied {
            next.complete_if_out_of_cards(player_id);
        }
        next
    }

    /// Marks a player finished once their hand is empty and hands out the
    /// next result label. Effects the player still owed are dropped.
    pub(super) fn complete_if_out_of_cards(&mut self, player_id: &PlayerId) {
        let already_placed = self
            .players
            .iter()
            .filter(|player| player.result.is_some() && player.id != *player_id)
            .count();
        let Some(player) = self.player_mut(player_id) else {
            return;
        };
        if player.finished || !player.hand.is_empty() {
            return;
        }
        let label = RESULT_LABELS
            .get(already_placed)
            .copied()
            .unwrap_or(RESULT_LABELS[2]);
        player.finished = true;
        player.result = Some(label.to_owned());
        let name = player.name.clone();

        self.pending_effects.retain(|effect| {
            !matches!(
                effect,
                PendingEffect::TenDiscard(_)
                    | PendingEffect::SevenGive(_)
                    | PendingEffect::QueenPurge(_)
            ) || effect.owner() != Some(player_id)
        });
        self.log(&format!("{name} is out! ({label})"));
        info!(room = %self.room_code, player = %player_id, result = label, "player finished");
    }

    /// Ends the match once at most one player still holds cards.
    pub(super) fn check_match_end(&mut self) {
        if self.finished {
            return;
        }
        let mut remaining = self.players.iter_mut().filter(|player| !player.finished);
        let survivor = remaining.next();
        if remaining.next().is_some() {
            return;
        }
        if let Some(survivor) = survivor {
            survivor.result = Some(LAST_PLACE_LABEL.to_owned());
        }
        self.finished = true;
        self.current_turn = None;
        self.log("The match is over");
        info!(room = %self.room_code, "match finished");
    }

    /// Hands the turn on after `actor` acted.
    ///
    /// The actor keeps the turn while a blocking effect waits on them, or
    /// when `keep_turn` is set and they still hold cards.
    pub(super) fn finalize_turn(&mut self, actor: &PlayerId, keep_turn: bool) {
        if self.finished {
            self.current_turn = None;
            return;
        }
        if self.has_blocking_effect(actor) {
            self.current_turn = Some(actor.clone());
            return;
        }
        self.current_turn = if keep_turn {
            self.lead_from(actor)
        } else {
            self.next_active_player(actor)
        };
    }

    /// `player_id` if they still hold cards, otherwise the next active seat.
    pub(super) fn lead_from(&self, player_id: &PlayerId) -> Option<PlayerId> {
        match self.player(player_id) {
            Some(player) if !player.finished => Some(player_id.clone()),
            _ => self.next_active_player(player_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;
    use crate::game::{Allowance, Player, Purge};

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    fn four_seats(hands: [Vec<Card>; 4]) -> GameState {
        let mut state = GameState::new("room");
        for (index, hand) in hands.into_iter().enumerate() {
            let id = format!("p{}", index + 1);
            let mut player = Player::new(id.as_str().into(), id.clone(), index as u8 + 1);
            player.hand = hand;
            state.players.push(player);
        }
        state.current_turn = Some("p1".into());
        state
    }

    #[test]
    fn finishing_assigns_labels_in_order() {
        let mut state = four_seats([
            vec![],
            vec![],
            vec![c(Suit::Clubs, Rank::Five)],
            vec![c(Suit::Clubs, Rank::Six)],
        ]);
        state.complete_if_out_of_cards(&"p2".into());
        state.complete_if_out_of_cards(&"p1".into());
        assert_eq!(state.players[1].result.as_deref(), Some("大富豪"));
        assert_eq!(state.players[0].result.as_deref(), Some("富豪"));
        state.check_match_end();
        assert!(!state.finished);

        state.players[2].hand.clear();
        state.complete_if_out_of_cards(&"p3".into());
        state.check_match_end();
        assert!(state.finished);
        assert_eq!(state.current_turn, None);
        assert_eq!(state.players[2].result.as_deref(), Some("平民"));
        assert_eq!(state.players[3].result.as_deref(), Some("大貧民"));
    }

    #[test]
    fn finishing_drops_owed_effects() {
        let mut state = four_seats([vec![], vec![c(Suit::Clubs, Rank::Five)], vec![], vec![]]);
        state.pending_effects.push(PendingEffect::TenDiscard(Allowance {
            player_id: "p1".into(),
            count: 1,
            optional: true,
            remaining: 1,
        }));
        state.complete_if_out_of_cards(&"p1".into());
        assert!(state.pending_effects.is_empty());
    }

    #[test]
    fn queen_purge_rejects_repeat_and_joker() {
        let mut state = four_seats([
            vec![c(Suit::Clubs, Rank::Five), c(Suit::Clubs, Rank::Nine)],
            vec![c(Suit::Hearts, Rank::Five), c(Suit::Hearts, Rank::Nine)],
            vec![c(Suit::Spades, Rank::Nine)],
            vec![c(Suit::Diamonds, Rank::Four)],
        ]);
        state.pending_effects.push(PendingEffect::QueenPurge(Purge {
            player_id: "p1".into(),
            count: 2,
            remaining: 2,
            declared_ranks: vec![Rank::Six],
        }));
        let declare = |rank| EffectAction::QueenPurge {
            player_id: "p1".into(),
            rank,
        };
        assert_eq!(
            state.apply_effect_action(&declare(Rank::Six)).unwrap_err(),
            EffectError::RankNotEligible { rank: Rank::Six }
        );
        assert_eq!(
            state.apply_effect_action(&declare(Rank::Joker)).unwrap_err(),
            EffectError::RankNotEligible { rank: Rank::Joker }
        );

        let next = state.apply_effect_action(&declare(Rank::Nine)).unwrap();
        assert_eq!(next.players[2].result.as_deref(), Some("大富豪"));
        assert_eq!(next.current_turn, Some("p1".into()));
        assert_eq!(next.table.discard.len(), 3);
    }

    #[test]
    fn effect_action_requires_a_matching_effect() {
        let state = four_seats([vec![c(Suit::Clubs, Rank::Five)], vec![], vec![], vec![]]);
        let action = EffectAction::TenDiscard {
            player_id: "p1".into(),
            cards: vec![],
        };
        assert_eq!(
            state.apply_effect_action(&action).unwrap_err(),
            EffectError::NoPendingEffect
        );
        let action = EffectAction::TenDiscard {
            player_id: "p2".into(),
            cards: vec![],
        };
        assert_eq!(
            state.apply_effect_action(&action).unwrap_err(),
            EffectError::NotYourTurn
        );
    }

    #[test]
    fn keep_turn_skips_a_finished_actor() {
        let mut state = four_seats([
            vec![],
            vec![c(Suit::Clubs, Rank::Five)],
            vec![c(Suit::Clubs, Rank::Six)],
            vec![c(Suit::Clubs, Rank::Seven)],
        ]);
        state.players[0].finished = true;
        state.finalize_turn(&"p1".into(), true);
        assert_eq!(state.current_turn, Some("p2".into()));
    }
}
