//! Storage encoding for [`GameState`].
//!
//! Writing is plain serde JSON. Reading never fails: anything missing,
//! ill-typed or unreadable falls back to the value a fresh room would hold.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::PersistError;
use crate::game::{Flags, GameState, Player, PlayerId, Table};

/// Encodes `state` as camelCase JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_state(state: &GameState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(state)?)
}

/// Decodes a stored room, repairing what it cannot read.
///
/// `room_code` always replaces the stored code. A missing or non-JSON input
/// yields an empty room.
#[must_use]
pub fn parse_state(input: Option<&str>, room_code: &str) -> GameState {
    let mut state = GameState::new(room_code);
    let Some(input) = input.filter(|input| !input.trim().is_empty()) else {
        return state;
    };
    let object = match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            warn!(room = room_code, "stored state is not an object; starting fresh");
            return state;
        }
        Err(error) => {
            warn!(room = room_code, %error, "stored state is not JSON; starting fresh");
            return state;
        }
    };

    state.players = players(&object, room_code);
    if let Some(current_turn) = field(&object, "currentTurn", room_code) {
        state.current_turn = current_turn;
    }
    if let Some(starting_player) = field(&object, "startingPlayer", room_code) {
        state.starting_player = starting_player;
    }
    if let Some(flags) = present(&object, "flags") {
        state.flags = merge(Flags::default(), flags, room_code, "flags");
    }
    if let Some(table) = present(&object, "table") {
        state.table = merge(Table::default(), table, room_code, "table");
    }
    state.pending_effects = entries(&object, "pendingEffects", room_code);
    state.turn_history = entries(&object, "turnHistory", room_code);
    if let Some(finished) = field(&object, "finished", room_code) {
        state.finished = finished;
    }
    if let Some(pass_streak) = field(&object, "passStreak", room_code) {
        state.pass_streak = pass_streak;
    }
    if let Some(match_id) = field(&object, "matchId", room_code) {
        state.match_id = match_id;
    }

    let jack_flag_stored = object
        .get("flags")
        .and_then(|flags| flags.get("jackReversalActive"))
        .is_some_and(Value::is_boolean);
    if !jack_flag_stored {
        state.flags.jack_reversal_active = has_jack_marker(&object);
    }
    state
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str, room: &str) -> Option<T> {
    let value = present(object, key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            warn!(room, field = key, %error, "ill-typed field replaced by its default");
            None
        }
    }
}

fn list<'a>(object: &'a Map<String, Value>, key: &str, room: &str) -> &'a [Value] {
    let Some(value) = present(object, key) else {
        return &[];
    };
    match value.as_array() {
        Some(items) => items.as_slice(),
        None => {
            warn!(room, field = key, "expected a list; using an empty one");
            &[]
        }
    }
}

fn entries<T: DeserializeOwned>(object: &Map<String, Value>, key: &str, room: &str) -> Vec<T> {
    list(object, key, room)
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                warn!(room, field = key, %error, "dropping unreadable entry");
                None
            }
        })
        .collect()
}

/// Players are merged key by key over a fresh seat. Only entries without a
/// readable id are dropped.
fn players(object: &Map<String, Value>, room: &str) -> Vec<Player> {
    list(object, "players", room)
        .iter()
        .filter_map(|item| {
            let id = item
                .get("id")
                .and_then(|id| serde_json::from_value::<PlayerId>(id.clone()).ok());
            let Some(id) = id else {
                warn!(room, field = "players", "dropping player without an id");
                return None;
            };
            Some(merge(Player::new(id, "", 0), item, room, "players"))
        })
        .collect()
}

/// Overlays the keys of `stored` on `base` one at a time.
///
/// A key that is null, unknown or does not decode keeps the value from
/// `base`; every other key is taken from `stored`.
fn merge<T>(base: T, stored: &Value, room: &str, name: &str) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(stored) = stored.as_object() else {
        warn!(room, field = name, "expected an object; using defaults");
        return base;
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&base) else {
        return base;
    };
    let mut current = base;
    for (key, value) in stored {
        if value.is_null() || !merged.contains_key(key) {
            continue;
        }
        let previous = merged.insert(key.clone(), value.clone());
        match serde_json::from_value(Value::Object(merged.clone())) {
            Ok(parsed) => current = parsed,
            Err(error) => {
                warn!(
                    room,
                    field = name,
                    key = key.as_str(),
                    %error,
                    "ill-typed value replaced by its default"
                );
                if let Some(previous) = previous {
                    merged.insert(key.clone(), previous);
                }
            }
        }
    }
    current
}

fn has_jack_marker(object: &Map<String, Value>) -> bool {
    present(object, "pendingEffects")
        .and_then(Value::as_array)
        .is_some_and(|effects| {
            effects
                .iter()
                .any(|effect| effect.get("type").and_then(Value::as_str) == Some("jackReverse"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use crate::game::{Allowance, PendingEffect, Play, Player};

    fn mid_trick() -> GameState {
        let mut state = GameState::new("room");
        let mut alice = Player::new("a".into(), "Alice", 1);
        alice.hand = vec![Card::new(Suit::Spades, Rank::Three)];
        let mut bob = Player::new("b".into(), "Bob", 2);
        bob.hand = vec![Card::new(Suit::Hearts, Rank::Nine), Card::joker()];
        state.players = vec![alice, bob];
        state.current_turn = Some("b".into());
        state.flags.revolution_active = true;
        state.flags.lock_suit = Some(Suit::Clubs);
        let played = vec![Card::new(Suit::Clubs, Rank::Five)];
        state.table.last_play = Some(Play {
            player_id: "a".into(),
            cards: played.clone(),
            timestamp: String::new(),
        });
        state.table.required_count = Some(1);
        state.table.pile = played;
        state.table.logs = vec!["ok".to_owned()];
        state
    }

    fn damaged(state: &GameState, damage: impl FnOnce(&mut Value)) -> GameState {
        let mut json = serde_json::to_value(state).unwrap();
        damage(&mut json);
        parse_state(Some(json.to_string().as_str()), "room")
    }

    #[test]
    fn round_trip_forces_room_code() {
        let mut state = GameState::new("old");
        let mut player = Player::new("a".into(), "Alice", 1);
        player.hand = vec![Card::new(Suit::Spades, Rank::Three), Card::joker()];
        state.players.push(player);
        state.flags.revolution_active = true;
        state.pending_effects.push(PendingEffect::TenDiscard(Allowance {
            player_id: "a".into(),
            count: 2,
            optional: true,
            remaining: 2,
        }));

        let json = serialize_state(&state).unwrap();
        let restored = parse_state(Some(json.as_str()), "new");
        assert_eq!(restored.room_code, "new");
        assert_eq!(restored.players, state.players);
        assert_eq!(restored.pending_effects, state.pending_effects);
        assert!(restored.flags.strength_reversed());
    }

    #[test]
    fn garbage_yields_an_empty_room() {
        assert_eq!(parse_state(None, "r"), GameState::new("r"));
        assert_eq!(parse_state(Some(""), "r"), GameState::new("r"));
        assert_eq!(parse_state(Some("{not json"), "r"), GameState::new("r"));
        assert_eq!(parse_state(Some("[1, 2]"), "r"), GameState::new("r"));
    }

    #[test]
    fn partial_payloads_are_repaired() {
        let json = r#"{
            "roomCode": "stale",
            "players": [
                {"id": "a", "name": "Alice", "seat": 1, "hand": [], "connected": true,
                 "finished": false, "hasPassed": false},
                {"id": 42},
                "nonsense"
            ],
            "finished": "yes",
            "passStreak": 2,
            "flags": {"revolutionActive": true, "strengthReversed": false},
            "pendingEffects": [{"type": "jackReverse", "payload": {"playerId": "a"}}]
        }"#;
        let state = parse_state(Some(json), "fresh");
        assert_eq!(state.room_code, "fresh");
        assert_eq!(state.players.len(), 1);
        assert!(!state.players[0].ready);
        assert!(!state.finished);
        assert_eq!(state.pass_streak, 2);
        assert!(state.flags.jack_reversal_active);
        assert!(!state.flags.strength_reversed());
        assert!(state.table.logs.is_empty());
    }

    #[test]
    fn stored_jack_flag_wins_over_marker() {
        let json = r#"{
            "flags": {"jackReversalActive": false},
            "pendingEffects": [{"type": "jackReverse", "payload": {}}]
        }"#;
        let state = parse_state(Some(json), "r");
        assert!(!state.flags.jack_reversal_active);
        assert_eq!(state.pending_effects.len(), 1);
    }

    #[test]
    fn null_player_field_keeps_the_player() {
        let state = mid_trick();
        let restored = damaged(&state, |json| json["players"][0]["connected"] = Value::Null);
        assert_eq!(restored.players.len(), 2);
        assert!(restored.players[0].connected);
        assert_eq!(restored.players[0].hand, state.players[0].hand);
        assert_eq!(restored.card_count(), state.card_count());

        let restored = damaged(&state, |json| json["players"][1]["seat"] = "two".into());
        assert_eq!(restored.players[1].seat, 0);
        assert_eq!(restored.players[1].hand, state.players[1].hand);
    }

    #[test]
    fn bad_log_line_keeps_the_trick() {
        let state = mid_trick();
        let restored = damaged(&state, |json| {
            json["table"]["logs"] = serde_json::json!(["ok", 5]);
        });
        assert!(restored.table.logs.is_empty());
        assert_eq!(restored.table.last_play, state.table.last_play);
        assert_eq!(restored.table.required_count, Some(1));
        assert_eq!(restored.table.pile, state.table.pile);
    }

    #[test]
    fn bad_lock_suit_keeps_the_revolution() {
        let state = mid_trick();
        let restored = damaged(&state, |json| json["flags"]["lockSuit"] = "Hearts".into());
        assert_eq!(restored.flags.lock_suit, None);
        assert!(restored.flags.revolution_active);
        assert!(restored.flags.strength_reversed());
    }
}
