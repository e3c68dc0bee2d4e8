//! Game state types.
//!
//! [`GameState`] is the authoritative record of a room. It is serialized as
//! camelCase JSON (see [`crate::persist`]) and never sent to clients
//! verbatim; use [`crate::view::sync_for_client`] for that.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::card::{Card, DECK_SIZE, Rank, Suit};

/// Stable identifier of a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finishing ranks, handed out in the order players empty their hands.
pub const RESULT_LABELS: [&str; 5] = ["大富豪", "富豪", "平民", "貧民", "大貧民"];

/// Label given to the last player still holding cards.
pub const LAST_PLACE_LABEL: &str = "大貧民";

/// Label given to a player who leaves after the deal.
pub const LEFT_LABEL: &str = "退室";

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Seat number, unique within the room and starting at 1.
    #[serde(default)]
    pub seat: u8,
    /// Cards held.
    #[serde(default)]
    pub hand: Vec<Card>,
    /// Whether the player is connected.
    #[serde(default)]
    pub connected: bool,
    /// Set once, when the hand becomes empty.
    #[serde(default)]
    pub finished: bool,
    /// Finishing rank label, assigned together with `finished`.
    #[serde(default)]
    pub result: Option<String>,
    /// Whether the player passed on the current trick.
    #[serde(default)]
    pub has_passed: bool,
    /// Whether the player asked for the deal.
    #[serde(default)]
    pub ready: bool,
}

impl Player {
    /// Creates a connected player with an empty hand.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, seat: u8) -> Self {
        Self {
            id,
            name: name.into(),
            seat,
            hand: Vec::new(),
            connected: true,
            finished: false,
            result: None,
            has_passed: false,
            ready: false,
        }
    }

    /// Returns true if the player holds every card in `cards`.
    #[must_use]
    pub fn holds_all(&self, cards: &[Card]) -> bool {
        cards.iter().all(|card| self.hand.contains(card))
    }

    /// Removes `cards` from the hand.
    pub(crate) fn remove_cards(&mut self, cards: &[Card]) {
        self.hand.retain(|card| !cards.contains(card));
    }
}

/// A combination laid on the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    /// Who played.
    pub player_id: PlayerId,
    /// The cards played.
    pub cards: Vec<Card>,
    /// RFC 3339 wall-clock time of the play.
    #[serde(default)]
    pub timestamp: String,
}

impl Play {
    pub(crate) fn now(player_id: PlayerId, cards: Vec<Card>) -> Self {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        Self {
            player_id,
            cards,
            timestamp,
        }
    }

    /// Returns true if the play contains a joker.
    #[must_use]
    pub fn has_joker(&self) -> bool {
        self.cards.iter().any(Card::is_joker)
    }
}

/// Cards in play and the table log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    /// The combination to beat, if any.
    pub last_play: Option<Play>,
    /// Card count pinned for the current trick; `None` lets any size lead.
    pub required_count: Option<usize>,
    /// Cards played into the current trick.
    pub pile: Vec<Card>,
    /// Cards out of play: cleared tricks, discards and purges.
    pub discard: Vec<Card>,
    /// Player-facing log lines, oldest first.
    pub logs: Vec<String>,
}

impl Table {
    /// Number of log lines kept.
    pub const LOG_CAPACITY: usize = 50;

    /// Clears the trick. Pile cards move to the discard.
    pub(crate) fn clear_trick(&mut self) {
        self.last_play = None;
        self.required_count = None;
        self.discard.append(&mut self.pile);
    }

    pub(crate) fn push_log(&mut self, message: &str) {
        let clock = OffsetDateTime::now_utc()
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default();
        self.logs.push(format!("{clock} {message}"));
        if self.logs.len() > Self::LOG_CAPACITY {
            let excess = self.logs.len() - Self::LOG_CAPACITY;
            self.logs.drain(..excess);
        }
    }
}

/// Table-wide rule flags.
///
/// The strength order is not stored: [`Flags::strength_reversed`] derives it
/// from the revolution and jack-reversal flags every time it is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FlagsRepr", into = "FlagsRepr")]
pub struct Flags {
    /// A revolution is in force.
    pub revolution_active: bool,
    /// A jack reversal is in force until the table clears.
    pub jack_reversal_active: bool,
    /// Turn order runs against seat order.
    pub rotation_reversed: bool,
    /// Suit every following play must match.
    pub lock_suit: Option<Suit>,
    /// A lone joker waits for the spade 3.
    pub awaiting_spade3: bool,
}

impl Flags {
    /// Whether the 13-rank ladder is currently flipped.
    #[must_use]
    pub const fn strength_reversed(&self) -> bool {
        self.revolution_active ^ self.jack_reversal_active
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct FlagsRepr {
    strength_reversed: bool,
    revolution_active: bool,
    jack_reversal_active: bool,
    rotation_reversed: bool,
    lock_suit: Option<Suit>,
    awaiting_spade3: bool,
}

impl Default for FlagsRepr {
    fn default() -> Self {
        Flags::default().into()
    }
}

impl From<Flags> for FlagsRepr {
    fn from(flags: Flags) -> Self {
        Self {
            strength_reversed: flags.strength_reversed(),
            revolution_active: flags.revolution_active,
            jack_reversal_active: flags.jack_reversal_active,
            rotation_reversed: flags.rotation_reversed,
            lock_suit: flags.lock_suit,
            awaiting_spade3: flags.awaiting_spade3,
        }
    }
}

impl From<FlagsRepr> for Flags {
    fn from(repr: FlagsRepr) -> Self {
        Self {
            revolution_active: repr.revolution_active,
            jack_reversal_active: repr.jack_reversal_active,
            rotation_reversed: repr.rotation_reversed,
            lock_suit: repr.lock_suit,
            awaiting_spade3: repr.awaiting_spade3,
        }
    }
}

/// Kind of a pending effect, matching the wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Eight-cut.
    EightCut,
    /// Ten discard.
    TenDiscard,
    /// Queen purge.
    QueenPurge,
    /// Seven give.
    SevenGive,
    /// Jack reversal marker.
    JackReverse,
    /// Joker counter marker.
    JokerCounter,
    /// Nine rotation marker.
    NineReverse,
}

/// Optional card transfer owed by a player (tens and sevens).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allowance {
    /// The player who must decide.
    pub player_id: PlayerId,
    /// Maximum number of cards.
    pub count: u8,
    /// Whether zero cards is acceptable.
    #[serde(default = "default_true")]
    pub optional: bool,
    /// Copy of `count` kept in the stored payload. Resolution is a single
    /// step, so the engine never reads or decrements it.
    #[serde(default)]
    pub remaining: u8,
}

const fn default_true() -> bool {
    true
}

/// Rank declarations owed by a player after a queen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purge {
    /// The player who must declare.
    pub player_id: PlayerId,
    /// Declarations granted by the play.
    pub count: u8,
    /// Declarations still owed.
    pub remaining: u8,
    /// Ranks already declared in this activation.
    #[serde(default)]
    pub declared_ranks: Vec<Rank>,
}

/// Non-blocking record of who triggered an effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Marker {
    /// The triggering player.
    pub player_id: Option<PlayerId>,
}

/// A queued special-card effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum PendingEffect {
    /// Eight-cut. Resolved immediately, never queued by the engine.
    EightCut,
    /// Blocking: discard up to `count` cards.
    TenDiscard(Allowance),
    /// Blocking while `remaining > 0`: declare ranks to purge.
    QueenPurge(Purge),
    /// Blocking: give up to `count` cards to the next seat.
    SevenGive(Allowance),
    /// Jack reversal in force until the table clears.
    JackReverse(Marker),
    /// Joker countered by the spade 3.
    JokerCounter(Marker),
    /// Rotation flipped by a nine.
    NineReverse(Marker),
}

impl PendingEffect {
    /// Returns the kind of the effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::EightCut => EffectKind::EightCut,
            Self::TenDiscard(_) => EffectKind::TenDiscard,
            Self::QueenPurge(_) => EffectKind::QueenPurge,
            Self::SevenGive(_) => EffectKind::SevenGive,
            Self::JackReverse(_) => EffectKind::JackReverse,
            Self::JokerCounter(_) => EffectKind::JokerCounter,
            Self::NineReverse(_) => EffectKind::NineReverse,
        }
    }

    /// The player the effect belongs to.
    #[must_use]
    pub const fn owner(&self) -> Option<&PlayerId> {
        match self {
            Self::EightCut => None,
            Self::TenDiscard(allowance) | Self::SevenGive(allowance) => Some(&allowance.player_id),
            Self::QueenPurge(purge) => Some(&purge.player_id),
            Self::JackReverse(marker) | Self::JokerCounter(marker) | Self::NineReverse(marker) => {
                marker.player_id.as_ref()
            }
        }
    }

    /// Returns true if the effect holds the turn on `player_id`.
    #[must_use]
    pub fn blocks(&self, player_id: &PlayerId) -> bool {
        match self {
            Self::TenDiscard(allowance) | Self::SevenGive(allowance) => {
                allowance.player_id == *player_id
            }
            Self::QueenPurge(purge) => purge.player_id == *player_id && purge.remaining > 0,
            _ => false,
        }
    }
}

/// A player's answer to a blocking effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EffectAction {
    /// Give up to the allowed number of cards to the next seat. Empty skips.
    SevenGive {
        /// The deciding player.
        player_id: PlayerId,
        /// Cards to give.
        cards: Vec<Card>,
    },
    /// Discard up to the allowed number of cards. Empty skips.
    TenDiscard {
        /// The deciding player.
        player_id: PlayerId,
        /// Cards to discard.
        cards: Vec<Card>,
    },
    /// Declare a rank to purge from every hand.
    QueenPurge {
        /// The deciding player.
        player_id: PlayerId,
        /// Declared rank.
        rank: Rank,
    },
}

impl EffectAction {
    /// The acting player.
    #[must_use]
    pub const fn player_id(&self) -> &PlayerId {
        match self {
            Self::SevenGive { player_id, .. }
            | Self::TenDiscard { player_id, .. }
            | Self::QueenPurge { player_id, .. } => player_id,
        }
    }

    /// The effect kind this action resolves.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::SevenGive { .. } => EffectKind::SevenGive,
            Self::TenDiscard { .. } => EffectKind::TenDiscard,
            Self::QueenPurge { .. } => EffectKind::QueenPurge,
        }
    }
}

/// Authoritative state of one room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Room code.
    pub room_code: String,
    /// Seated players, including finished ones.
    pub players: Vec<Player>,
    /// Player to act; `None` before the deal and after the match.
    pub current_turn: Option<PlayerId>,
    /// Opening player of the current deal.
    pub starting_player: Option<PlayerId>,
    /// Rule flags.
    pub flags: Flags,
    /// Table.
    pub table: Table,
    /// Queued effects.
    pub pending_effects: Vec<PendingEffect>,
    /// Every play of the current deal.
    pub turn_history: Vec<Play>,
    /// Whether the match has ended.
    pub finished: bool,
    /// Consecutive passes on the current lead.
    pub pass_streak: usize,
    /// Identifier of the match record held by the host.
    pub match_id: Option<String>,
}

impl GameState {
    /// Creates an empty room.
    #[must_use]
    pub fn new(room_code: impl Into<String>) -> Self {
        Self {
            room_code: room_code.into(),
            ..Self::default()
        }
    }

    /// Returns the player with the given id.
    #[must_use]
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == *player_id)
    }

    pub(crate) fn player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == *player_id)
    }

    /// Players sorted by seat.
    #[must_use]
    pub fn seat_order(&self) -> Vec<&Player> {
        let mut ordered: Vec<&Player> = self.players.iter().collect();
        ordered.sort_by_key(|player| player.seat);
        ordered
    }

    /// Number of players still holding cards.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|player| !player.finished).count()
    }

    /// Returns true once any player holds cards.
    #[must_use]
    pub fn has_dealt(&self) -> bool {
        self.players.iter().any(|player| !player.hand.is_empty())
    }

    /// Returns true if a blocking effect holds the turn on `player_id`.
    #[must_use]
    pub fn has_blocking_effect(&self, player_id: &PlayerId) -> bool {
        self.pending_effects
            .iter()
            .any(|effect| effect.blocks(player_id))
    }

    /// Total cards across hands, the trick pile and the discard.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.players
            .iter()
            .map(|player| player.hand.len())
            .sum::<usize>()
            + self.table.pile.len()
            + self.table.discard.len()
    }

    /// Returns true when every card of the deck is accounted for.
    #[must_use]
    pub fn cards_conserved(&self) -> bool {
        matches!(self.card_count(), 0 | DECK_SIZE)
    }

    /// The next unfinished player after `from`, following the rotation.
    ///
    /// Returns `None` if `from` is not seated or nobody else is active.
    #[must_use]
    pub fn next_active_player(&self, from: &PlayerId) -> Option<PlayerId> {
        let ordered = self.seat_order();
        let total = ordered.len();
        let start = ordered.iter().position(|player| player.id == *from)?;
        let step = if self.flags.rotation_reversed {
            total - 1
        } else {
            1
        };
        let mut index = start;
        for _ in 0..total {
            index = (index + step) % total;
            let candidate = ordered[index];
            if !candidate.finished {
                return Some(candidate.id.clone());
            }
        }
        None
    }

    pub(crate) fn log(&mut self, message: &str) {
        self.table.push_log(message);
    }

    pub(crate) fn name_of(&self, player_id: &PlayerId) -> String {
        self.player(player_id)
            .map_or_else(|| player_id.to_string(), |player| player.name.clone())
    }
}
