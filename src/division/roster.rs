//! Mid-tournament roster changes: adding and removing players while
//! keeping already-played rounds consistent.

use log::info;

use super::Division;
use super::entities::{PairingMethod, PlayerId, PlayerProperties};
use super::errors::{DivisionError, DivisionResult};

impl Division {
    /// Appends players to the division. Rounds that are already complete,
    /// and the current round once it has recorded results, charge the new
    /// players an immediate forfeit; every other reachable round is
    /// re-paired to include them.
    pub fn add_players(&mut self, new_players: &[PlayerId]) -> DivisionResult<()> {
        self.reject_elimination("players cannot be added to an elimination bracket")?;
        for (i, player) in new_players.iter().enumerate() {
            if self.player_index.contains_key(player) || new_players[..i].contains(player) {
                return Err(DivisionError::PlayerAlreadyExists {
                    player: player.clone(),
                });
            }
        }

        for player in new_players {
            let idx = self.players.len();
            self.players.push(player.clone());
            self.properties.push(PlayerProperties::default());
            self.player_index.insert(player.clone(), idx);
            for row in &mut self.matrix {
                row.push(None);
            }
        }
        info!("added {} players to the division", new_players.len());

        for round in 0..self.round_count() {
            let started =
                round < self.current_round || self.round_has_results(round);
            if started {
                for player in new_players {
                    self.set_pairing(player, player, round, true)?;
                }
            } else if self.repairable(round) {
                self.pair_round(round)?;
            }
        }
        Ok(())
    }

    /// Flags players as removed. Players are never deleted from the
    /// matrix; their column survives so played rounds stay intact. The
    /// current round is re-paired without them if it has no results yet,
    /// as is every future round whose discipline does not depend on
    /// standings.
    pub fn remove_players(&mut self, players: &[PlayerId]) -> DivisionResult<()> {
        self.reject_elimination("players cannot be removed from an elimination bracket")?;

        let mut active = self.properties.iter().filter(|p| !p.removed).count();
        for player in players {
            let idx = self.player_idx(player)?;
            if !self.properties[idx].removed {
                active -= 1;
            }
        }
        if active == 0 {
            return Err(DivisionError::EmptyTournamentAfterRemoval);
        }

        for player in players {
            let idx = self.player_idx(player)?;
            self.properties[idx].removed = true;
        }
        info!("removed {} players from the division", players.len());

        for round in self.current_round..self.round_count() {
            if self.repairable(round) {
                self.pair_round(round)?;
            }
        }
        Ok(())
    }

    /// Whether a roster change may safely re-pair the round: the current
    /// round only while it has no results, future rounds only when their
    /// discipline ignores standings. Manual rounds are never re-paired.
    fn repairable(&self, round: usize) -> bool {
        if round < self.current_round || self.round_has_results(round) {
            return false;
        }
        let method = self.round_controls[round].pairing_method;
        if round == self.current_round {
            method != PairingMethod::Manual
        } else {
            method.pairs_up_front()
        }
    }

    fn reject_elimination(&self, reason: &str) -> DivisionResult<()> {
        if self.round_controls[0].pairing_method == PairingMethod::Elimination {
            return Err(DivisionError::PairingMethodConflict(reason.into()));
        }
        Ok(())
    }
}
