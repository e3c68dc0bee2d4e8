//! A rule engine for daifugo, the Japanese "tycoon" shedding card game.
//!
//! [`GameState`] is the authoritative record of a room. Its operations
//! ([`GameState::apply_play`], [`GameState::apply_pass`],
//! [`GameState::apply_effect_action`] and the lobby calls) borrow the
//! current state and return the next one, leaving the input untouched when
//! an action is rejected. [`Room`] serializes those operations for a host
//! serving concurrent requests.
//!
//! State leaves the engine through [`sync_for_client`], which hides every
//! hand except the viewer's, and is stored with [`serialize_state`] /
//! [`parse_state`].
//!
//! # Example
//!
//! ```
//! use daifugo::{GameOptions, Room, legal_plays};
//!
//! let room = Room::new(GameOptions::default().with_seed(42), "ROOM");
//! for id in ["a", "b", "c", "d"] {
//!     room.join(id.into(), id).unwrap();
//! }
//! for id in ["a", "b", "c", "d"] {
//!     room.ready(&id.into()).unwrap();
//! }
//!
//! let state = room.snapshot();
//! let opener = state.current_turn.clone().unwrap();
//! let weakest = legal_plays(&state, &opener).remove(0);
//! room.play(&opener, &weakest).unwrap();
//! assert_eq!(room.snapshot().table.required_count, Some(weakest.len()));
//! ```

pub mod card;
pub mod deck;
pub mod error;
pub mod game;
pub mod hints;
pub mod options;
pub mod persist;
pub mod sort;
mod sync;
pub mod view;

// Re-export main types
pub use card::{Card, DECK_SIZE, Rank, Suit};
pub use deck::{DealResult, create_deck, deal_cards, shuffle_deck};
pub use error::{CardParseError, EffectError, ErrorKind, LobbyError, PersistError, PlayError};
pub use game::{
    EffectAction, EffectKind, Flags, GameState, PendingEffect, Play, Player, PlayerId,
    RemoveOptions, Room, Table,
};
pub use hints::legal_plays;
pub use options::GameOptions;
pub use persist::{parse_state, serialize_state};
pub use sort::{HandSortMode, sort_hand};
pub use view::{PublicPlayer, PublicState, PublicTable, sync_for_client};
