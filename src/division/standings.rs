//! Standings derivation: per-player records accumulated from the pairing
//! matrix, with a pairing-method-dependent ordering.

use std::cmp::Ordering;

use super::Division;
use super::entities::{PairingMethod, Standing, TournamentGameResult};
use super::errors::DivisionResult;

impl Division {
    /// Ranked records through `round` (inclusive). Only pairings with a
    /// resolved outcome for the player count; in-progress pairings
    /// contribute nothing.
    ///
    /// Elimination divisions sort by wins with the original matrix index
    /// as the tie-break, which is what keeps bracket groupings stable
    /// from round to round. Everything else sorts removed players last,
    /// then wins, draws, spread, and finally the player identifier so the
    /// order is deterministic.
    pub fn standings(&self, round: usize) -> DivisionResult<Vec<Standing>> {
        self.check_round(round)?;

        let mut records: Vec<(usize, Standing)> = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| {
                (
                    idx,
                    Standing {
                        player: player.clone(),
                        wins: 0,
                        losses: 0,
                        draws: 0,
                        spread: 0,
                        removed: self.properties[idx].removed,
                    },
                )
            })
            .collect();

        for r in 0..=round {
            for (idx, standing) in records.iter_mut() {
                let Some(handle) = self.matrix[r][*idx] else {
                    continue;
                };
                let pairing = &self.pairings[r][handle];
                // A self-pairing occupies both slots; read slot 0 so the
                // bye counts once.
                let Some(slot) = pairing.slot_of(&standing.player) else {
                    continue;
                };
                match pairing.outcomes[slot] {
                    TournamentGameResult::NoResult => continue,
                    TournamentGameResult::Win
                    | TournamentGameResult::Bye
                    | TournamentGameResult::ForfeitWin => standing.wins += 1,
                    TournamentGameResult::Loss
                    | TournamentGameResult::ForfeitLoss
                    | TournamentGameResult::Eliminated => standing.losses += 1,
                    TournamentGameResult::Draw => standing.draws += 1,
                }
                for game in &pairing.games {
                    standing.spread += game.scores[slot] - game.scores[1 - slot];
                }
            }
        }

        let method = self.round_controls[round].pairing_method;
        if method == PairingMethod::Elimination {
            records.sort_by(|(ia, a), (ib, b)| b.wins.cmp(&a.wins).then(ia.cmp(ib)));
        } else {
            records.sort_by(|(_, a), (_, b)| compare_standings(a, b));
        }
        Ok(records.into_iter().map(|(_, standing)| standing).collect())
    }
}

fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    a.removed
        .cmp(&b.removed)
        .then(b.wins.cmp(&a.wins))
        .then(b.draws.cmp(&a.draws))
        .then(b.spread.cmp(&a.spread))
        .then(b.player.cmp(&a.player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::entities::PlayerId;

    fn standing(id: &str, wins: u32, draws: u32, spread: i32, removed: bool) -> Standing {
        Standing {
            player: PlayerId::from(id),
            wins,
            losses: 0,
            draws,
            spread,
            removed,
        }
    }

    #[test]
    fn wins_rank_first() {
        let a = standing("a", 2, 0, -100, false);
        let b = standing("b", 1, 3, 500, false);
        assert_eq!(compare_standings(&a, &b), Ordering::Less);
    }

    #[test]
    fn draws_break_equal_wins() {
        let a = standing("a", 2, 1, 0, false);
        let b = standing("b", 2, 0, 300, false);
        assert_eq!(compare_standings(&a, &b), Ordering::Less);
    }

    #[test]
    fn spread_breaks_equal_records() {
        let a = standing("a", 2, 1, 120, false);
        let b = standing("b", 2, 1, 80, false);
        assert_eq!(compare_standings(&a, &b), Ordering::Less);
    }

    #[test]
    fn identifier_makes_the_order_total() {
        let a = standing("alice", 1, 0, 50, false);
        let b = standing("bob", 1, 0, 50, false);
        // Identifier comparison is descending, so "bob" ranks first.
        assert_eq!(compare_standings(&b, &a), Ordering::Less);
        assert_eq!(compare_standings(&a, &a), Ordering::Equal);
    }

    #[test]
    fn removed_players_sort_strictly_last() {
        let a = standing("a", 0, 0, -400, false);
        let b = standing("b", 5, 0, 900, true);
        assert_eq!(compare_standings(&a, &b), Ordering::Less);
    }
}
