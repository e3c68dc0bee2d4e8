//! Legal-move enumeration for automated players.

use std::collections::{BTreeMap, BTreeSet};

use crate::card::{self, Card, Rank};
use crate::game::{GameState, PlayerId};

/// Largest combination ever considered.
const MAX_COMBINATION: usize = 5;

/// Every `k`-card subset of `cards`, in index order.
fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if cards.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (index, card) in cards.iter().enumerate() {
        for mut rest in combinations(&cards[index + 1..], k - 1) {
            rest.insert(0, *card);
            out.push(rest);
        }
    }
    out
}

fn candidate_lengths(state: &GameState, largest: usize) -> Vec<usize> {
    match state.table.required_count {
        Some(required) => vec![required],
        None => (1..=largest.min(MAX_COMBINATION)).collect(),
    }
}

/// Lists every selection `player_id` could legally play right now.
///
/// Each selection passes [`GameState::can_play`]. Results are unique by card
/// set and ordered weakest first under the active strength order. The list
/// is empty when it is not the player's turn.
#[must_use]
pub fn legal_plays(state: &GameState, player_id: &PlayerId) -> Vec<Vec<Card>> {
    let Some(player) = state.player(player_id) else {
        return Vec::new();
    };

    let mut groups: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
    for card in card::non_jokers(&player.hand) {
        groups.entry(card.rank).or_default().push(*card);
    }
    let jokers: Vec<Card> = player.hand.iter().copied().filter(Card::is_joker).collect();
    let largest = groups.values().map(Vec::len).max().unwrap_or(0) + jokers.len();

    let mut candidates = Vec::new();
    for length in candidate_lengths(state, largest) {
        for group in groups.values() {
            for wild in 0..=jokers.len().min(length.saturating_sub(1)) {
                let natural = length - wild;
                for mut selection in combinations(group, natural) {
                    selection.extend_from_slice(&jokers[..wild]);
                    candidates.push(selection);
                }
            }
        }
        if length <= jokers.len() {
            candidates.push(jokers[..length].to_vec());
        }
    }

    let mut seen = BTreeSet::new();
    let mut legal: Vec<Vec<Card>> = candidates
        .into_iter()
        .filter(|selection| {
            let mut ids: Vec<String> = selection.iter().map(Card::id).collect();
            ids.sort();
            seen.insert(ids)
        })
        .filter(|selection| state.can_play(player_id, selection).is_ok())
        .collect();

    let reversed = state.flags.strength_reversed();
    legal.sort_by_cached_key(|selection| {
        (
            card::combination_rank(selection).strength(reversed),
            selection.len(),
            selection.iter().map(Card::id).collect::<Vec<_>>(),
        )
    });
    legal
}
