//! Per-viewer projection of a room.
//!
//! [`sync_for_client`] is the only way state should leave the engine. Call it
//! once per recipient: the projection carries the viewer's own hand.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::game::{Flags, GameState, PendingEffect, Play, Player, PlayerId};

/// A player as seen by someone at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Seat number.
    pub seat: u8,
    /// Always exposed, even when the hand is not.
    pub hand_count: usize,
    /// Whether the player is connected.
    pub connected: bool,
    /// Whether the player is out of cards.
    pub finished: bool,
    /// Finishing rank label.
    pub result: Option<String>,
    /// Whether this entry is the viewer.
    pub is_self: bool,
    /// Present only for the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
    /// Whether the player asked for the deal.
    pub ready: bool,
}

impl PublicPlayer {
    fn project(player: &Player, viewer: &PlayerId) -> Self {
        let is_self = player.id == *viewer;
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            seat: player.seat,
            hand_count: player.hand.len(),
            connected: player.connected,
            finished: player.finished,
            result: player.result.clone(),
            is_self,
            hand: is_self.then(|| player.hand.clone()),
            ready: player.ready,
        }
    }
}

/// The visible part of the table. The discard stays hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTable {
    /// Play to beat.
    pub last_play: Option<Play>,
    /// Card count pinned for the trick.
    pub required_count: Option<usize>,
    /// Cards of the current trick.
    pub pile: Vec<Card>,
    /// Table log.
    pub logs: Vec<String>,
}

/// Read-only view of a room for one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicState {
    /// Room code.
    pub room_code: String,
    /// Players in join order.
    pub players: Vec<PublicPlayer>,
    /// Player to act.
    pub current_turn: Option<PlayerId>,
    /// Rule flags.
    pub flags: Flags,
    /// Visible table.
    pub table: PublicTable,
    /// Queued effects.
    pub pending_effects: Vec<PendingEffect>,
    /// Whether the match has ended.
    pub finished: bool,
}

impl PublicState {
    /// The viewer's own entry, if seated.
    #[must_use]
    pub fn viewer(&self) -> Option<&PublicPlayer> {
        self.players.iter().find(|player| player.is_self)
    }
}

/// Projects `state` for `viewer`, hiding every other player's hand.
///
/// An id that is not seated (an empty string, say) sees no hands at all.
#[must_use]
pub fn sync_for_client(state: &GameState, viewer: &PlayerId) -> PublicState {
    PublicState {
        room_code: state.room_code.clone(),
        players: state
            .players
            .iter()
            .map(|player| PublicPlayer::project(player, viewer))
            .collect(),
        current_turn: state.current_turn.clone(),
        flags: state.flags,
        table: PublicTable {
            last_play: state.table.last_play.clone(),
            required_count: state.table.required_count,
            pile: state.table.pile.clone(),
            logs: state.table.logs.clone(),
        },
        pending_effects: state.pending_effects.clone(),
        finished: state.finished,
    }
}
