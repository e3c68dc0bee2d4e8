//! Seating, readiness, the deal and leaving.

use rand::Rng;
use tracing::{debug, info};

use crate::deck;
use crate::error::LobbyError;
use crate::options::GameOptions;

use super::state::LEFT_LABEL;
use super::{Flags, GameState, PendingEffect, Player, PlayerId, Table};

/// Options for [`GameState::remove_player`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Result recorded for a player leaving mid-match. Falls back to the
    /// player's existing result, then to `"退室"`.
    pub result_label: Option<String>,
}

impl RemoveOptions {
    /// Records `label` as the leaving player's result.
    #[must_use]
    pub fn with_result_label(mut self, label: impl Into<String>) -> Self {
        self.result_label = Some(label.into());
        self
    }
}

impl GameState {
    /// Seats a new player in the smallest free seat.
    ///
    /// Returns the new state and the assigned seat number.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is full, the id is already seated, or
    /// cards have been dealt.
    pub fn join(
        &self,
        options: &GameOptions,
        player_id: PlayerId,
        name: impl Into<String>,
    ) -> Result<(Self, u8), LobbyError> {
        if self.player(&player_id).is_some() {
            return Err(LobbyError::AlreadySeated);
        }
        if self.has_dealt() {
            return Err(LobbyError::AlreadyDealt);
        }
        if self.players.len() >= options.max_players {
            return Err(LobbyError::RoomFull {
                max: options.max_players,
            });
        }

        let seat = (1..=u8::MAX)
            .find(|seat| self.players.iter().all(|player| player.seat != *seat))
            .ok_or(LobbyError::RoomFull {
                max: options.max_players,
            })?;

        let mut next = self.clone();
        let player = Player::new(player_id.clone(), name, seat);
        next.log(&format!("{} takes seat {seat}", player.name));
        next.players.push(player);
        debug!(room = %next.room_code, player = %player_id, seat, "player joined");
        Ok((next, seat))
    }

    /// Marks a player ready and deals once everyone is.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown players, a table already dealt, or a
    /// room below the minimum number of players.
    pub fn set_ready<R: Rng + ?Sized>(
        &self,
        options: &GameOptions,
        player_id: &PlayerId,
        rng: &mut R,
    ) -> Result<Self, LobbyError> {
        if self.player(player_id).is_none() {
            return Err(LobbyError::PlayerNotFound);
        }
        if self.has_dealt() {
            return Err(LobbyError::AlreadyDealt);
        }
        if self.players.len() < options.min_players {
            return Err(LobbyError::NotEnoughPlayers {
                min: options.min_players,
            });
        }

        let mut next = self.clone();
        if let Some(player) = next.player_mut(player_id) {
            if !player.ready {
                player.ready = true;
                let name = player.name.clone();
                next.log(&format!("{name} is ready"));
            }
        }
        Ok(next.start_game_if_ready(options, rng))
    }

    /// Deals a new match when enough players are seated, nobody holds cards
    /// and everyone is ready. Otherwise returns an unchanged copy.
    #[must_use]
    pub fn start_game_if_ready<R: Rng + ?Sized>(&self, options: &GameOptions, rng: &mut R) -> Self {
        let mut next = self.clone();
        if next.players.len() < options.min_players.max(1)
            || next.has_dealt()
            || !next.players.iter().all(|player| player.ready)
        {
            return next;
        }

        let seat_ids: Vec<PlayerId> = next
            .seat_order()
            .into_iter()
            .map(|player| player.id.clone())
            .collect();
        let deal = deck::deal_cards(&seat_ids, rng);

        let logs = core::mem::take(&mut next.table.logs);
        next.flags = Flags::default();
        next.table = Table {
            logs,
            ..Table::default()
        };
        next.pending_effects.clear();
        next.turn_history.clear();
        next.pass_streak = 0;
        next.finished = false;
        next.match_id = Some(format!("{:016x}", rng.next_u64()));

        for (player_id, hand) in deal.hands {
            if let Some(player) = next.player_mut(&player_id) {
                player.hand = hand;
                player.finished = false;
                player.has_passed = false;
                player.result = None;
                player.ready = false;
            }
        }

        let opener = deal.starter.or_else(|| seat_ids.first().cloned());
        next.current_turn.clone_from(&opener);
        next.starting_player = opener;
        let opener_name = next
            .starting_player
            .as_ref()
            .map(|id| next.name_of(id))
            .unwrap_or_default();
        next.log(&format!("Cards are dealt; {opener_name} leads"));
        info!(
            room = %next.room_code,
            players = seat_ids.len(),
            starter = ?next.starting_player,
            "match dealt"
        );
        next
    }

    /// Takes a player out of the room.
    ///
    /// Before the deal the seat is freed. After the deal the player stays
    /// listed as finished and disconnected; their hand goes to the discard
    /// and anything they still owed is dropped.
    #[must_use]
    pub fn remove_player(&self, player_id: &PlayerId, options: RemoveOptions) -> Self {
        let mut next = self.clone();
        if next.player(player_id).is_none() {
            return next;
        }
        let name = next.name_of(player_id);

        if !next.has_dealt() {
            next.players.retain(|player| player.id != *player_id);
            if next.current_turn.as_ref() == Some(player_id) {
                next.current_turn = next.seat_order().first().map(|player| player.id.clone());
                next.starting_player.clone_from(&next.current_turn);
            }
            next.log(&format!("{name} leaves the room"));
            debug!(room = %next.room_code, player = %player_id, "player left lobby");
            return next;
        }

        let was_finished = next.player(player_id).is_some_and(|player| player.finished);
        let mut hand = Vec::new();
        if let Some(player) = next.player_mut(player_id) {
            hand = core::mem::take(&mut player.hand);
            player.connected = false;
            player.finished = true;
            player.has_passed = true;
            player.ready = false;
            let label = options
                .result_label
                .or_else(|| player.result.clone())
                .unwrap_or_else(|| LEFT_LABEL.to_owned());
            player.result = Some(label);
        }
        next.table.discard.extend(hand);
        next.pending_effects.retain(|effect| {
            matches!(effect, PendingEffect::JackReverse(_)) || effect.owner() != Some(player_id)
        });
        next.log(&format!("{name} leaves the match"));

        if !next.finished && !was_finished {
            next.check_match_end();
            if next.current_turn.as_ref() == Some(player_id) {
                next.current_turn = next.next_active_player(player_id);
            }
        }
        info!(room = %next.room_code, player = %player_id, "player left match");
        next
    }
}
