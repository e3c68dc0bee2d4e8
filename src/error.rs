//! Error types for game operations.
//!
//! Every rule violation is reported as a typed error whose `Display` text is
//! the reason shown to the player. Engine operations validate before they
//! mutate, so an `Err` always leaves the caller's state untouched.

use thiserror::Error;

use crate::card::{Rank, Suit};

/// Broad category of a rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The match or lobby is in the wrong phase for the request.
    State,
    /// The actor does not hold the turn.
    TurnOrder,
    /// The actor does not own the selected cards (or does not exist).
    Ownership,
    /// Wrong number of cards, a repeated card or mixed ranks.
    Shape,
    /// A table rule forbids the selection.
    Rule,
    /// The pending-effect protocol was not followed.
    EffectProtocol,
}

/// Errors that can occur when playing cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    /// The match has already finished.
    #[error("match already finished")]
    MatchFinished,
    /// Not this player's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// Player not found.
    #[error("player not found")]
    PlayerNotFound,
    /// Player has already emptied their hand.
    #[error("player already finished")]
    AlreadyFinished,
    /// The player still owes a decision on a blocking effect.
    #[error("resolve the pending effect first")]
    EffectPending,
    /// No cards were selected.
    #[error("select at least one card")]
    NoCardsSelected,
    /// The same card was selected twice.
    #[error("duplicate card selected")]
    DuplicateCard,
    /// A selected card is not in the player's hand.
    #[error("card not in hand")]
    CardNotInHand,
    /// Selected cards do not share one rank.
    #[error("uniform rank only")]
    MixedRanks,
    /// The trick pins a card count.
    #[error("must play {required} cards")]
    WrongCount {
        /// Number of cards the trick requires.
        required: usize,
    },
    /// A suit lock is active.
    #[error("suit lock: only {suit} may be played")]
    SuitLocked {
        /// The locked suit.
        suit: Suit,
    },
    /// A lone joker is waiting for the spade 3.
    #[error("must counter with spade 3")]
    SpadeThreeRequired,
    /// The table holds a joker.
    #[error("only spade 3 beats a joker")]
    JokerOnTable,
    /// The selection is not stronger than the table.
    #[error("must beat the previous play")]
    TooWeak,
}

impl PlayError {
    /// Returns the category of this violation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MatchFinished => ErrorKind::State,
            Self::NotYourTurn | Self::EffectPending => ErrorKind::TurnOrder,
            Self::PlayerNotFound | Self::AlreadyFinished | Self::CardNotInHand => {
                ErrorKind::Ownership
            }
            Self::NoCardsSelected
            | Self::DuplicateCard
            | Self::MixedRanks
            | Self::WrongCount { .. } => ErrorKind::Shape,
            Self::SuitLocked { .. }
            | Self::SpadeThreeRequired
            | Self::JokerOnTable
            | Self::TooWeak => ErrorKind::Rule,
        }
    }
}

/// Errors that can occur while resolving a pending effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The match has already finished.
    #[error("match already finished")]
    MatchFinished,
    /// Not this player's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// Player not found.
    #[error("player not found")]
    PlayerNotFound,
    /// No pending effect of this kind targets the player.
    #[error("no pending effect to resolve")]
    NoPendingEffect,
    /// The effect has nothing left to resolve.
    #[error("effect already resolved")]
    AlreadyResolved,
    /// The same card was selected twice.
    #[error("duplicate card selected")]
    DuplicateCard,
    /// More cards were selected than the effect allows.
    #[error("at most {limit} cards may be selected")]
    TooManyCards {
        /// Maximum number of cards.
        limit: u8,
    },
    /// A selected card is not in the player's hand.
    #[error("card not in hand")]
    CardNotInHand,
    /// Nobody can receive the given cards.
    #[error("no eligible recipient")]
    NoRecipient,
    /// The declared rank was already declared in this activation, or is the joker.
    #[error("not eligible to decide {rank}")]
    RankNotEligible {
        /// The rejected rank.
        rank: Rank,
    },
}

impl EffectError {
    /// Returns the category of this violation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MatchFinished => ErrorKind::State,
            Self::NotYourTurn => ErrorKind::TurnOrder,
            Self::PlayerNotFound | Self::CardNotInHand => ErrorKind::Ownership,
            Self::NoRecipient => ErrorKind::Rule,
            Self::NoPendingEffect
            | Self::AlreadyResolved
            | Self::DuplicateCard
            | Self::TooManyCards { .. }
            | Self::RankNotEligible { .. } => ErrorKind::EffectProtocol,
        }
    }
}

/// Errors that can occur in the lobby before the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// The room already seats the maximum number of players.
    #[error("room is full (at most {max} players)")]
    RoomFull {
        /// Maximum number of players.
        max: usize,
    },
    /// The player id is already seated.
    #[error("player already seated")]
    AlreadySeated,
    /// Player not found.
    #[error("player not found")]
    PlayerNotFound,
    /// Cards have already been dealt.
    #[error("game already started")]
    AlreadyDealt,
    /// Not enough players to start.
    #[error("at least {min} players are needed")]
    NotEnoughPlayers {
        /// Minimum number of players.
        min: usize,
    },
}

impl LobbyError {
    /// Returns the category of this violation.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound => ErrorKind::Ownership,
            Self::RoomFull { .. }
            | Self::AlreadySeated
            | Self::AlreadyDealt
            | Self::NotEnoughPlayers { .. } => ErrorKind::State,
        }
    }
}

/// Errors that can occur when parsing a card id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardParseError {
    /// The id is not of the form `suit-rank`.
    #[error("malformed card id")]
    MalformedId,
    /// Unknown suit name.
    #[error("unknown suit")]
    UnknownSuit,
    /// Unknown rank name.
    #[error("unknown rank")]
    UnknownRank,
}

/// Errors that can occur when encoding state for storage.
#[derive(Debug, Error)]
pub enum PersistError {
    /// JSON encoding failed.
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}
