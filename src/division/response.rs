//! Wire-ready projection of division state.
//!
//! A [`DivisionResponse`] is a pure, side-effect-free snapshot of the
//! full state tree, shaped for transmission to clients: round controls,
//! the flattened round x player pairing matrix, removed flags, and the
//! current round.

use serde::{Deserialize, Serialize};

use super::Division;
use super::entities::{
    PlayerId, RoundControls, TournamentGame, TournamentGameResult,
};

/// One pairing as seen from a matrix cell. Both cells of a paired pair
/// carry identical copies.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PairingResponse {
    pub players: [PlayerId; 2],
    pub games: Vec<TournamentGame>,
    pub outcomes: [TournamentGameResult; 2],
}

/// One round: its controls plus a pairing per player slot, in roster
/// order. `None` marks an unpaired slot.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundResponse {
    pub controls: RoundControls,
    pub pairings: Vec<Option<PairingResponse>>,
}

/// Snapshot of a division for clients.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DivisionResponse {
    pub players: Vec<PlayerId>,
    pub removed: Vec<bool>,
    pub rounds: Vec<RoundResponse>,
    pub current_round: usize,
}

impl Division {
    /// Project the full state into a wire-ready snapshot.
    #[must_use]
    pub fn response(&self) -> DivisionResponse {
        let rounds = (0..self.round_count())
            .map(|round| RoundResponse {
                controls: self.round_controls[round].clone(),
                pairings: self.matrix[round]
                    .iter()
                    .map(|cell| {
                        cell.map(|handle| {
                            let pairing = &self.pairings[round][handle];
                            PairingResponse {
                                players: pairing.players.clone(),
                                games: pairing.games.clone(),
                                outcomes: pairing.outcomes,
                            }
                        })
                    })
                    .collect(),
            })
            .collect();

        DivisionResponse {
            players: self.players.to_vec(),
            removed: self.properties.iter().map(|p| p.removed).collect(),
            rounds,
            current_round: self.current_round,
        }
    }
}
