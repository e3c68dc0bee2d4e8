//! Game engine and room hosting.
//!
//! The rules live on [`GameState`]: every operation borrows the current state
//! and returns the next one. [`Room`] wraps a state for a host that serves
//! many requests, applying one operation at a time.

use core::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::card::Card;
use crate::error::{EffectError, LobbyError, PersistError, PlayError};
use crate::options::GameOptions;
use crate::persist;
use crate::sync::Mutex;
use crate::view::{self, PublicState};

mod actions;
mod effects;
mod lobby;
pub mod state;
mod validate;

pub use effects::{effective_count, is_revolution};
pub use lobby::RemoveOptions;
pub use state::{
    Allowance, EffectAction, EffectKind, Flags, GameState, LAST_PLACE_LABEL, LEFT_LABEL, Marker,
    PendingEffect, Play, Player, PlayerId, Purge, RESULT_LABELS, Table,
};

/// One room served to many clients.
///
/// Every mutating call locks the room, applies exactly one engine operation
/// to the current state and stores the result. The version counter moves
/// only when the state actually changed, so a host can use it for
/// optimistic writes to its own storage.
pub struct Room {
    /// Room options.
    pub options: GameOptions,
    state: Mutex<GameState>,
    rng: Mutex<ChaCha8Rng>,
    version: AtomicU64,
}

impl Room {
    /// Creates an empty room.
    ///
    /// # Example
    ///
    /// ```
    /// use daifugo::{GameOptions, Room};
    ///
    /// let room = Room::new(GameOptions::default().with_seed(42), "ABCD");
    /// assert_eq!(room.snapshot().room_code, "ABCD");
    /// assert_eq!(room.version(), 0);
    /// ```
    #[must_use]
    pub fn new(options: GameOptions, room_code: impl Into<String>) -> Self {
        Self::from_state(options, GameState::new(room_code))
    }

    /// Hosts an existing state.
    #[must_use]
    pub fn from_state(options: GameOptions, state: GameState) -> Self {
        let rng = options.seed.map_or_else(
            || ChaCha8Rng::from_rng(&mut rand::rng()),
            ChaCha8Rng::seed_from_u64,
        );
        Self {
            options,
            state: Mutex::new(state),
            rng: Mutex::new(rng),
            version: AtomicU64::new(0),
        }
    }

    /// Restores a room from stored JSON, repairing what cannot be read.
    #[must_use]
    pub fn load(options: GameOptions, input: Option<&str>, room_code: &str) -> Self {
        Self::from_state(options, persist::parse_state(input, room_code))
    }

    /// Encodes the current state for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn save(&self) -> Result<String, PersistError> {
        persist::serialize_state(&self.state.lock())
    }

    /// Returns a copy of the authoritative state.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.lock().clone()
    }

    /// Number of state changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Projects the current state for `viewer`.
    #[must_use]
    pub fn view(&self, viewer: &PlayerId) -> PublicState {
        view::sync_for_client(&self.state.lock(), viewer)
    }

    fn commit(&self, state: &mut GameState, next: GameState) {
        if *state != next {
            *state = next;
            let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(room = %state.room_code, version, "room updated");
        }
    }

    /// Seats a player and returns their seat number.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is full, the player is already seated,
    /// or cards have been dealt.
    pub fn join(&self, player_id: PlayerId, name: impl Into<String>) -> Result<u8, LobbyError> {
        let mut state = self.state.lock();
        let (next, seat) = state.join(&self.options, player_id, name)?;
        self.commit(&mut state, next);
        Ok(seat)
    }

    /// Marks a player ready, dealing once everyone is.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown players, a dealt table, or too few
    /// players.
    pub fn ready(&self, player_id: &PlayerId) -> Result<(), LobbyError> {
        let mut state = self.state.lock();
        let next = {
            let mut rng = self.rng.lock();
            state.set_ready(&self.options, player_id, &mut *rng)?
        };
        self.commit(&mut state, next);
        Ok(())
    }

    /// Plays cards for a player.
    ///
    /// # Errors
    ///
    /// Returns the rule the play breaks.
    pub fn play(&self, player_id: &PlayerId, cards: &[Card]) -> Result<(), PlayError> {
        let mut state = self.state.lock();
        let next = state.apply_play(player_id, cards)?;
        self.commit(&mut state, next);
        Ok(())
    }

    /// Passes for a player. Returns false when the pass was ignored.
    #[must_use]
    pub fn pass(&self, player_id: &PlayerId) -> bool {
        let mut state = self.state.lock();
        let next = state.apply_pass(player_id);
        let changed = *state != next;
        self.commit(&mut state, next);
        changed
    }

    /// Resolves one step of a pending effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the action does not fit a pending effect.
    pub fn resolve_effect(&self, action: &EffectAction) -> Result<(), EffectError> {
        let mut state = self.state.lock();
        let next = state.apply_effect_action(action)?;
        self.commit(&mut state, next);
        Ok(())
    }

    /// Removes a player from the room.
    pub fn leave(&self, player_id: &PlayerId, options: RemoveOptions) {
        let mut state = self.state.lock();
        let next = state.remove_player(player_id, options);
        self.commit(&mut state, next);
    }
}
