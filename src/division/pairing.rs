//! Round pairing: discipline dispatch, the round-robin rotation, and
//! first-mover assignment.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use super::Division;
use super::entities::{
    FirstMethod, Pairing, PairingMethod, PlayerId, TournamentGame, TournamentGameResult,
};
use super::errors::DivisionResult;
use crate::solver::{PoolMember, RepeatKey, repeat_key, validate_assignments};

/// A matchup the planner wants installed, by player index.
enum PlannedPairing {
    Game(usize, usize),
    Eliminated(usize, usize),
}

impl Division {
    /// Clears and recomputes every pairing for `round` using the round's
    /// configured discipline. Manual rounds are left untouched; they are
    /// only ever paired through `set_pairing`.
    pub fn pair_round(&mut self, round: usize) -> DivisionResult<()> {
        self.check_round(round)?;
        let method = self.round_controls[round].pairing_method;
        if method == PairingMethod::Manual {
            return Ok(());
        }
        debug!("pairing round {round} ({method})");

        // Plan before touching anything: a failure (a misbehaving solver,
        // mostly) must leave the round's existing pairings intact.
        let plan = match method {
            PairingMethod::Manual => Vec::new(),
            PairingMethod::RoundRobin => self.plan_round_robin(round),
            PairingMethod::KingOfTheHill | PairingMethod::Elimination => {
                self.plan_by_standings(round)?
            }
            PairingMethod::Random | PairingMethod::InitialFontes => self.plan_with_solver(round)?,
        };

        // Re-pairing may be the result of an amendment or roster change;
        // drop everything so byes can be reassigned from scratch.
        self.matrix[round].iter_mut().for_each(|cell| *cell = None);
        self.pairings[round].clear();

        for planned in plan {
            match planned {
                PlannedPairing::Game(a, b) => self.create_pairing(round, a, b)?,
                PlannedPairing::Eliminated(a, b) => self.create_eliminated_pairing(round, a, b),
            }
        }

        // Anyone left unpaired plays themselves: a bye for active players,
        // a forfeit for removed ones.
        for idx in 0..self.players.len() {
            if self.matrix[round][idx].is_none() {
                let player = self.players[idx].clone();
                let forfeit = self.properties[idx].removed;
                self.set_pairing(&player, &player, round, forfeit)?;
            }
        }
        Ok(())
    }

    /// Adjacent-rank pairing for KingOfTheHill and Elimination. Past the
    /// first elimination round only the surviving top fraction of the
    /// bracket keeps playing; everyone below the line is resolved as
    /// eliminated with no games.
    fn plan_by_standings(&self, round: usize) -> DivisionResult<Vec<PlannedPairing>> {
        let order = self.pool_order(round)?;
        let elimination =
            self.round_controls[round].pairing_method == PairingMethod::Elimination;
        let cutoff = if elimination && round > 0 {
            order.len() >> round
        } else {
            usize::MAX
        };

        let mut plan = Vec::with_capacity(order.len() / 2);
        for (pair_idx, chunk) in order.chunks(2).enumerate() {
            if let &[a, b] = chunk {
                if 2 * pair_idx >= cutoff {
                    plan.push(PlannedPairing::Eliminated(a, b));
                } else {
                    plan.push(PlannedPairing::Game(a, b));
                }
            }
        }
        Ok(plan)
    }

    /// Circle-method pairings over the fixed player order. A player drawn
    /// against the padding bye slot is left out of the plan and picked up
    /// by the backfill.
    fn plan_round_robin(&self, round: usize) -> Vec<PlannedPairing> {
        let mut order: Vec<Option<usize>> = (0..self.players.len())
            .filter(|&idx| !self.properties[idx].removed)
            .map(Some)
            .collect();
        if order.len() % 2 == 1 {
            order.push(None);
        }
        round_robin_pairs(&order, round)
            .into_iter()
            .filter_map(|slots| match slots {
                (Some(a), Some(b)) => Some(PlannedPairing::Game(a, b)),
                _ => None,
            })
            .collect()
    }

    /// Solver-assigned pairings for Random and InitialFontes. Random
    /// shuffles the pool with the division RNG first, which keeps the
    /// solver itself deterministic.
    fn plan_with_solver(&mut self, round: usize) -> DivisionResult<Vec<PlannedPairing>> {
        let controls = self.round_controls[round].clone();
        let order = self.pool_order(round)?;
        let records: HashMap<PlayerId, (u32, u32, i32)> = if round == 0 {
            HashMap::new()
        } else {
            self.standings(round - 1)?
                .into_iter()
                .map(|s| (s.player, (s.wins, s.draws, s.spread)))
                .collect()
        };

        let mut pool: Vec<PoolMember> = order
            .iter()
            .map(|&idx| {
                let id = self.players[idx].clone();
                let (wins, draws, spread) = records.get(&id).copied().unwrap_or_default();
                PoolMember {
                    id,
                    wins,
                    draws,
                    spread,
                }
            })
            .collect();
        if controls.pairing_method == PairingMethod::Random {
            pool.shuffle(&mut self.rng);
        }

        let repeats = self.repeat_counts(round);
        let assignments = self.solver.pair(&pool, &controls, &repeats);
        validate_assignments(pool.len(), &assignments)?;

        let mut plan = Vec::with_capacity(pool.len() / 2);
        for (i, assignment) in assignments.iter().enumerate() {
            if let Some(j) = *assignment {
                if i < j {
                    let a = self.player_idx(&pool[i].id)?;
                    let b = self.player_idx(&pool[j].id)?;
                    plan.push(PlannedPairing::Game(a, b));
                }
            }
        }
        Ok(plan)
    }

    /// Candidate order for a round's pool: the previous round's standings,
    /// or the roster order for round 0, where no games exist yet. Removed
    /// players never enter a pool.
    fn pool_order(&self, round: usize) -> DivisionResult<Vec<usize>> {
        if round == 0 {
            return Ok((0..self.players.len())
                .filter(|&idx| !self.properties[idx].removed)
                .collect());
        }
        let standings = self.standings(round - 1)?;
        standings
            .iter()
            .filter(|s| !s.removed)
            .map(|s| self.player_idx(&s.player))
            .collect()
    }

    /// Times each unordered pair has met in rounds before `round`. Each
    /// meeting is seen from both matrix cells, so counts are halved.
    pub(super) fn repeat_counts(&self, round: usize) -> HashMap<RepeatKey, u32> {
        let mut counts: HashMap<RepeatKey, u32> = HashMap::new();
        for r in 0..round {
            for idx in 0..self.players.len() {
                if let Some(handle) = self.matrix[r][idx] {
                    let pairing = &self.pairings[r][handle];
                    if !pairing.is_bye() {
                        *counts
                            .entry(repeat_key(&pairing.players[0], &pairing.players[1]))
                            .or_insert(0) += 1;
                    }
                }
            }
        }
        counts.values_mut().for_each(|count| *count /= 2);
        counts
    }

    /// Creates a live pairing between two player indexes, assigning the
    /// first-mover per the round's first method, and installs it in both
    /// matrix cells.
    pub(super) fn create_pairing(
        &mut self,
        round: usize,
        a_idx: usize,
        b_idx: usize,
    ) -> DivisionResult<()> {
        let controls = &self.round_controls[round];
        let games_per_round = controls.games_per_round;
        let first_method = controls.first_method;

        let mut first = a_idx;
        let mut second = b_idx;
        let switch = match first_method {
            FirstMethod::Manual => false,
            FirstMethod::Random => self.rng.random_bool(0.5),
            FirstMethod::Automatic => {
                let (a_firsts, a_seconds) = self.firsts_and_seconds(a_idx, round);
                let (b_firsts, b_seconds) = self.firsts_and_seconds(b_idx, round);
                if a_firsts != b_firsts {
                    a_firsts > b_firsts
                } else if a_seconds != b_seconds {
                    a_seconds < b_seconds
                } else {
                    self.rng.random_bool(0.5)
                }
            }
        };
        if switch {
            std::mem::swap(&mut first, &mut second);
        }

        let pairing = Pairing {
            players: [self.players[first].clone(), self.players[second].clone()],
            games: vec![TournamentGame::default(); games_per_round],
            outcomes: [TournamentGameResult::NoResult; 2],
            ready: [false; 2],
        };
        self.install_pairing(round, a_idx, b_idx, pairing);
        Ok(())
    }

    /// Placeholder for bracket positions below the elimination line: no
    /// games, both outcomes already Eliminated.
    fn create_eliminated_pairing(&mut self, round: usize, a_idx: usize, b_idx: usize) {
        let pairing = Pairing {
            players: [self.players[a_idx].clone(), self.players[b_idx].clone()],
            games: Vec::new(),
            outcomes: [TournamentGameResult::Eliminated; 2],
            ready: [false; 2],
        };
        self.install_pairing(round, a_idx, b_idx, pairing);
    }

    fn install_pairing(&mut self, round: usize, a_idx: usize, b_idx: usize, pairing: Pairing) {
        let handle = self.pairings[round].len();
        self.pairings[round].push(pairing);
        self.matrix[round][a_idx] = Some(handle);
        self.matrix[round][b_idx] = Some(handle);
    }

    /// How often the player has gone first and second in rounds before
    /// `round`.
    fn firsts_and_seconds(&self, player_idx: usize, round: usize) -> (u32, u32) {
        let player = &self.players[player_idx];
        let mut firsts = 0;
        let mut seconds = 0;
        for r in 0..round {
            if let Some(handle) = self.matrix[r][player_idx] {
                if self.pairings[r][handle].players[0] == *player {
                    firsts += 1;
                } else {
                    seconds += 1;
                }
            }
        }
        (firsts, seconds)
    }
}

/// Circle-method round-robin rotation. Slot 0 stays fixed; the remaining
/// n-1 slots rotate left by `(n-1) - (round mod (n-1))`. The rotated list
/// splits into a top half and a reversed bottom half, and matching
/// positions pair up. Across n-1 rounds this produces every unordered
/// pair exactly once. `None` is the padding bye slot for odd rosters.
fn round_robin_pairs(
    players: &[Option<usize>],
    round: usize,
) -> Vec<(Option<usize>, Option<usize>)> {
    debug_assert!(players.len() % 2 == 0, "round robin input must be even");
    let rest = &players[1..];
    let n = rest.len();
    let rotation = n - (round % n);

    let mut rotated = Vec::with_capacity(players.len());
    rotated.push(players[0]);
    rotated.extend_from_slice(&rest[rotation..]);
    rotated.extend_from_slice(&rest[..rotation]);

    let (top, bottom) = rotated.split_at(rotated.len() / 2);
    top.iter()
        .zip(bottom.iter().rev())
        .map(|(a, b)| {
            debug_assert!(
                a.is_some() || b.is_some(),
                "two byes paired in round {round}"
            );
            (*a, *b)
        })
        .collect()
}
