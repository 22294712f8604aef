//! Tournament division engine.
//!
//! A [`Division`] is one self-contained bracket of players with its own
//! round schedule and pairing state. It owns a rounds x players matrix of
//! pairing handles and every per-round control, and it is mutated in place
//! for the life of the tournament: pairing rounds, recording results,
//! and absorbing roster changes. Callers serialize all mutating operations
//! on a division; the engine itself has no internal concurrency.

pub mod entities;
pub mod errors;
pub mod response;

mod pairing;
mod results;
mod roster;
mod standings;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::solver::{GreedyPairer, PairingSolver};
use entities::{
    Pairing, PairingMethod, PlayerId, PlayerProperties, RoundControls, TournamentGameResult,
};
use errors::{DivisionError, DivisionResult};

/// Division configuration: the initial roster, the per-round controls,
/// and the seed for the division's random source. Coin flips (random
/// first-mover, random pairing shuffles) are reproducible given the seed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DivisionConfig {
    pub players: Vec<PlayerId>,
    pub rounds: Vec<RoundControls>,
    pub seed: u64,
}

impl DivisionConfig {
    pub fn new(players: Vec<PlayerId>, rounds: Vec<RoundControls>) -> Self {
        Self {
            players,
            rounds,
            seed: rand::rng().random(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn default_solver() -> Box<dyn PairingSolver> {
    Box::new(GreedyPairer)
}

/// A division's full state tree. Serializes losslessly with serde; the
/// pairing solver is an ambient collaborator and is restored to the
/// default on deserialization (callers that injected a custom solver
/// re-inject it).
#[derive(Debug, Deserialize, Serialize)]
pub struct Division {
    /// Ordered roster. Players are appended, never deleted; removal only
    /// flips the removed flag in `properties`.
    players: Vec<PlayerId>,
    properties: Vec<PlayerProperties>,
    player_index: HashMap<PlayerId, usize>,
    round_controls: Vec<RoundControls>,
    /// rounds x players. Cells hold handles into the same round's arena;
    /// paired players share one handle, so a pairing has exactly one copy.
    matrix: Vec<Vec<Option<usize>>>,
    /// Per-round pairing arena. Re-pairing a round clears its arena;
    /// individually re-paired cells may leave unreferenced entries behind,
    /// which are inert.
    pairings: Vec<Vec<Pairing>>,
    current_round: usize,
    rng: ChaCha8Rng,
    #[serde(skip, default = "default_solver")]
    solver: Box<dyn PairingSolver>,
}

impl Division {
    pub fn new(config: DivisionConfig) -> DivisionResult<Self> {
        let DivisionConfig {
            players,
            mut rounds,
            seed,
        } = config;

        if players.len() < 2 {
            return Err(DivisionError::InvalidConfig(
                "a division must have at least 2 players".into(),
            ));
        }
        if rounds.is_empty() {
            return Err(DivisionError::InvalidConfig(
                "a division must have at least 1 round".into(),
            ));
        }
        if rounds.iter().any(|c| c.games_per_round == 0) {
            return Err(DivisionError::InvalidConfig(
                "every round must play at least 1 game".into(),
            ));
        }

        let mut player_index = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if player_index.insert(player.clone(), idx).is_some() {
                return Err(DivisionError::PlayerAlreadyExists {
                    player: player.clone(),
                });
            }
        }

        let is_elimination = rounds
            .iter()
            .any(|c| c.pairing_method == PairingMethod::Elimination);
        if is_elimination {
            if !rounds
                .iter()
                .all(|c| c.pairing_method == PairingMethod::Elimination)
            {
                return Err(DivisionError::PairingMethodConflict(
                    "elimination pairings cannot be mixed with any other pairing method".into(),
                ));
            }
            let expected = 1usize
                .checked_shl(rounds.len() as u32)
                .ok_or_else(|| DivisionError::InvalidConfig("too many rounds".into()))?;
            if expected != players.len() {
                return Err(DivisionError::PlayerCountMismatch {
                    expected,
                    actual: players.len(),
                });
            }
            let games = rounds[0].games_per_round;
            if rounds.iter().any(|c| c.games_per_round != games) {
                return Err(DivisionError::InvalidConfig(
                    "elimination rounds must all play the same number of games".into(),
                ));
            }
        }

        let fontes_span = rounds
            .iter()
            .take_while(|c| c.pairing_method == PairingMethod::InitialFontes)
            .count();
        if rounds
            .iter()
            .skip(fontes_span)
            .any(|c| c.pairing_method == PairingMethod::InitialFontes)
        {
            return Err(DivisionError::PairingMethodConflict(
                "initial fontes rounds must be a contiguous prefix of the schedule".into(),
            ));
        }
        if fontes_span > 0 && fontes_span % 2 == 0 {
            return Err(DivisionError::PairingMethodConflict(
                "the initial fontes prefix must have odd length".into(),
            ));
        }
        for controls in &mut rounds {
            controls.initial_fontes = fontes_span as u32;
        }

        let matrix = vec![vec![None; players.len()]; rounds.len()];
        let pairings = vec![Vec::new(); rounds.len()];
        let properties = vec![PlayerProperties::default(); players.len()];

        let mut division = Self {
            players,
            properties,
            player_index,
            round_controls: rounds,
            matrix,
            pairings,
            current_round: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            solver: default_solver(),
        };

        division.pair_round(0)?;
        for round in 1..division.round_controls.len() {
            if division.round_controls[round].pairing_method.pairs_up_front() {
                division.pair_round(round)?;
            }
        }
        Ok(division)
    }

    /// Swap in the external pairing solver.
    pub fn set_solver(&mut self, solver: Box<dyn PairingSolver>) {
        self.solver = solver;
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[must_use]
    pub fn round_count(&self) -> usize {
        self.round_controls.len()
    }

    #[must_use]
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn round_controls(&self, round: usize) -> DivisionResult<&RoundControls> {
        self.check_round(round)?;
        Ok(&self.round_controls[round])
    }

    pub fn is_removed(&self, player: &PlayerId) -> DivisionResult<bool> {
        Ok(self.properties[self.player_idx(player)?].removed)
    }

    /// The player's pairing for a round, or None when not yet paired.
    pub fn pairing(&self, player: &PlayerId, round: usize) -> DivisionResult<Option<&Pairing>> {
        self.check_round(round)?;
        let idx = self.player_idx(player)?;
        Ok(self.matrix[round][idx].map(|handle| &self.pairings[round][handle]))
    }

    /// The player's opponent for a round. A bye or forfeit self-pairing
    /// reports the player themselves.
    pub fn opponent_of(&self, player: &PlayerId, round: usize) -> DivisionResult<Option<PlayerId>> {
        let pairing = self.pairing(player, round)?;
        Ok(pairing.map(|p| {
            if p.players[0] == *player {
                p.players[1].clone()
            } else {
                p.players[0].clone()
            }
        }))
    }

    /// Flip a player's start-handshake flag. Returns whether both slots of
    /// the pairing are now ready.
    pub fn set_ready(&mut self, round: usize, player: &PlayerId, ready: bool) -> DivisionResult<bool> {
        self.check_round(round)?;
        let idx = self.player_idx(player)?;
        let handle = self.matrix[round][idx].ok_or_else(|| {
            DivisionError::PairingMissingOrMismatched {
                p1: player.clone(),
                p2: player.clone(),
                round,
            }
        })?;
        let pairing = &mut self.pairings[round][handle];
        let slot = pairing.slot_of(player).unwrap_or(0);
        pairing.ready[slot] = ready;
        Ok(pairing.ready[0] && pairing.ready[1])
    }

    /// Whether every player is paired and every pairing resolved for the
    /// round.
    pub fn is_round_complete(&self, round: usize) -> DivisionResult<bool> {
        self.check_round(round)?;
        Ok((0..self.players.len()).all(|idx| {
            self.matrix[round][idx]
                .map(|handle| self.pairings[round][handle].is_complete())
                .unwrap_or(false)
        }))
    }

    pub fn is_finished(&self) -> DivisionResult<bool> {
        self.is_round_complete(self.round_controls.len() - 1)
    }

    /// The opaque structured blob handed to the store after every
    /// mutation. The store reconstructs bit-identical tournament state by
    /// deserializing it back into a [`Division`].
    pub fn serialize(&self) -> DivisionResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| DivisionError::Serialization(e.to_string()))
    }

    pub(crate) fn check_round(&self, round: usize) -> DivisionResult<()> {
        if round >= self.round_controls.len() {
            return Err(DivisionError::RoundOutOfRange { round });
        }
        Ok(())
    }

    pub(crate) fn player_idx(&self, player: &PlayerId) -> DivisionResult<usize> {
        self.player_index
            .get(player)
            .copied()
            .ok_or_else(|| DivisionError::PlayerNotFound {
                player: player.clone(),
            })
    }

    /// Whether any game in the round already has a recorded result.
    pub(crate) fn round_has_results(&self, round: usize) -> bool {
        self.pairings[round].iter().any(|pairing| {
            pairing.is_complete()
                || pairing.games.iter().any(|game| {
                    game.results[0] != TournamentGameResult::NoResult
                        || game.results[1] != TournamentGameResult::NoResult
                })
        })
    }

    /// Drop a player's pairing for a round, unpairing the stale opponent
    /// with it.
    pub(crate) fn unpair(&mut self, round: usize, player_idx: usize) {
        if let Some(handle) = self.matrix[round][player_idx].take() {
            let opponent = {
                let pairing = &self.pairings[round][handle];
                let player = &self.players[player_idx];
                if pairing.players[0] == *player {
                    pairing.players[1].clone()
                } else {
                    pairing.players[0].clone()
                }
            };
            if let Some(&opponent_idx) = self.player_index.get(&opponent) {
                if self.matrix[round][opponent_idx] == Some(handle) {
                    self.matrix[round][opponent_idx] = None;
                }
            }
            debug!("unpaired {} in round {round}", self.players[player_idx]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::entities::FirstMethod;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::from(*n)).collect()
    }

    fn controls(method: PairingMethod, rounds: usize) -> Vec<RoundControls> {
        (0..rounds)
            .map(|_| RoundControls::new(method, FirstMethod::Manual, 1))
            .collect()
    }

    #[test]
    fn rejects_single_player() {
        let config = DivisionConfig::new(ids(&["a"]), controls(PairingMethod::Manual, 1));
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_rounds() {
        let config = DivisionConfig::new(ids(&["a", "b"]), vec![]);
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_duplicate_players() {
        let config = DivisionConfig::new(ids(&["a", "a"]), controls(PairingMethod::Manual, 1));
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::PlayerAlreadyExists { .. })
        ));
    }

    #[test]
    fn rejects_mixed_elimination() {
        let mut rounds = controls(PairingMethod::Elimination, 2);
        rounds[1].pairing_method = PairingMethod::KingOfTheHill;
        let config = DivisionConfig::new(ids(&["a", "b", "c", "d"]), rounds);
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::PairingMethodConflict(_))
        ));
    }

    #[test]
    fn elimination_requires_power_of_two_players() {
        for n in [3, 5] {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let players = names.iter().map(|n| PlayerId::from(n.as_str())).collect();
            let config = DivisionConfig::new(players, controls(PairingMethod::Elimination, 2));
            assert_eq!(
                Division::new(config).unwrap_err(),
                DivisionError::PlayerCountMismatch {
                    expected: 4,
                    actual: n
                }
            );
        }
    }

    #[test]
    fn initial_fontes_must_lead_the_schedule() {
        let mut rounds = controls(PairingMethod::KingOfTheHill, 3);
        rounds[1].pairing_method = PairingMethod::InitialFontes;
        let config = DivisionConfig::new(ids(&["a", "b", "c", "d"]), rounds);
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::PairingMethodConflict(_))
        ));
    }

    #[test]
    fn initial_fontes_span_must_be_odd() {
        let mut rounds = controls(PairingMethod::KingOfTheHill, 4);
        rounds[0].pairing_method = PairingMethod::InitialFontes;
        rounds[1].pairing_method = PairingMethod::InitialFontes;
        let config = DivisionConfig::new(ids(&["a", "b", "c", "d"]), rounds);
        assert!(matches!(
            Division::new(config),
            Err(DivisionError::PairingMethodConflict(_))
        ));
    }

    #[test]
    fn fontes_span_is_recorded_on_every_round() {
        let mut rounds = controls(PairingMethod::KingOfTheHill, 5);
        for controls in rounds.iter_mut().take(3) {
            controls.pairing_method = PairingMethod::InitialFontes;
        }
        let config = DivisionConfig::new(ids(&["a", "b", "c", "d"]), rounds).with_seed(7);
        let division = Division::new(config).unwrap();
        for round in 0..division.round_count() {
            assert_eq!(division.round_controls(round).unwrap().initial_fontes, 3);
        }
    }

    #[test]
    fn round_out_of_range() {
        let config =
            DivisionConfig::new(ids(&["a", "b"]), controls(PairingMethod::Manual, 2)).with_seed(1);
        let division = Division::new(config).unwrap();
        assert_eq!(
            division.pairing(&PlayerId::from("a"), 2).unwrap_err(),
            DivisionError::RoundOutOfRange { round: 2 }
        );
    }

    #[test]
    fn serialization_round_trips() {
        let config = DivisionConfig::new(ids(&["a", "b", "c", "d"]), {
            let mut rounds = controls(PairingMethod::RoundRobin, 3);
            rounds[2].pairing_method = PairingMethod::KingOfTheHill;
            rounds
        })
        .with_seed(42);
        let division = Division::new(config).unwrap();
        let blob = division.serialize().unwrap();
        let restored: Division = serde_json::from_value(blob.clone()).unwrap();
        assert_eq!(restored.serialize().unwrap(), blob);
    }
}
