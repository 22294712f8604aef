//! Result recording: pairing assignment, submission validation, outcome
//! resolution, and round advancement.

use log::{debug, info};

use super::Division;
use super::entities::{
    BYE_SCORE, FORFEIT_SCORE, GameEndReason, PairingMethod, PlayerId, ResultSubmission,
    TournamentGame, TournamentGameResult,
};
use super::errors::{DivisionError, DivisionResult};

impl Division {
    /// Pairs two players for a round, unpairing any stale opponents
    /// first. A self-pairing, or a pairing involving a removed player, is
    /// terminal and resolves immediately: a bye, or a forfeit when
    /// `is_forfeit` is set or a removed player is involved.
    pub fn set_pairing(
        &mut self,
        p1: &PlayerId,
        p2: &PlayerId,
        round: usize,
        is_forfeit: bool,
    ) -> DivisionResult<()> {
        self.check_round(round)?;
        let i1 = self.player_idx(p1)?;
        let i2 = self.player_idx(p2)?;

        self.unpair(round, i1);
        self.unpair(round, i2);
        self.create_pairing(round, i1, i2)?;

        let p1_removed = self.properties[i1].removed;
        let p2_removed = self.properties[i2].removed;

        if i1 == i2 {
            // Forfeit results may retroactively land on past rounds, so
            // they go in as amendments; byes are plain submissions.
            let sub = if is_forfeit || p1_removed {
                ResultSubmission::new(
                    round,
                    p1.clone(),
                    p1.clone(),
                    FORFEIT_SCORE,
                    0,
                    TournamentGameResult::ForfeitLoss,
                    TournamentGameResult::ForfeitLoss,
                )
                .amended()
            } else {
                ResultSubmission::new(
                    round,
                    p1.clone(),
                    p1.clone(),
                    BYE_SCORE,
                    0,
                    TournamentGameResult::Bye,
                    TournamentGameResult::Bye,
                )
            };
            self.submit_result(sub.with_end_reason(GameEndReason::None))?;
        } else if p1_removed || p2_removed {
            let result_of = |removed: bool| {
                if removed {
                    (FORFEIT_SCORE, TournamentGameResult::ForfeitLoss)
                } else {
                    (0, TournamentGameResult::ForfeitWin)
                }
            };
            let (s1, r1) = result_of(p1_removed);
            let (s2, r2) = result_of(p2_removed);
            self.submit_result(
                ResultSubmission::new(round, p1.clone(), p2.clone(), s1, s2, r1, r2)
                    .with_end_reason(GameEndReason::ForceForfeit)
                    .amended(),
            )?;
        }
        Ok(())
    }

    /// Validates and applies a submitted or amended game result. On a
    /// successful non-amended submission that completes the current round,
    /// advances the round and pairs the next one if its discipline needs
    /// standings.
    ///
    /// Validation happens up front; the division is unmodified on any
    /// error.
    pub fn submit_result(&mut self, sub: ResultSubmission) -> DivisionResult<()> {
        self.check_round(sub.round)?;
        if sub.round < self.current_round && !sub.amend {
            return Err(DivisionError::DuplicateSubmission {
                p1: sub.p1.clone(),
                p2: sub.p2.clone(),
                round: sub.round,
            });
        }

        let i1 = self.player_idx(&sub.p1)?;
        let i2 = self.player_idx(&sub.p2)?;
        let mismatch = || DivisionError::PairingMissingOrMismatched {
            p1: sub.p1.clone(),
            p2: sub.p2.clone(),
            round: sub.round,
        };
        let h1 = self.matrix[sub.round][i1].ok_or_else(mismatch)?;
        let h2 = self.matrix[sub.round][i2].ok_or_else(mismatch)?;
        if h1 != h2 {
            return Err(mismatch());
        }

        let method = self.round_controls[sub.round].pairing_method;
        let games_per_round = self.round_controls[sub.round].games_per_round;
        let pairing = &self.pairings[sub.round][h1];
        if pairing.games.is_empty() {
            // An eliminated-bracket placeholder; there is nothing to play.
            return Err(DivisionError::GameIndexOutOfRange {
                game_index: sub.game_index,
                round: sub.round,
            });
        }

        let s1 = pairing.slot_of(&sub.p1).ok_or_else(mismatch)?;
        let s2 = 1 - s1;
        if pairing.players[s2] != sub.p2 {
            return Err(mismatch());
        }

        // A game index at or past the regulation count is a tie-break
        // submission, valid only for elimination rounds and only for the
        // next sequential slot.
        let append_tiebreak = method == PairingMethod::Elimination
            && sub.game_index >= games_per_round;
        if append_tiebreak {
            if sub.game_index != pairing.games.len() {
                return Err(DivisionError::GameIndexOutOfRange {
                    game_index: sub.game_index,
                    round: sub.round,
                });
            }
        } else if sub.game_index >= pairing.games.len() {
            return Err(DivisionError::GameIndexOutOfRange {
                game_index: sub.game_index,
                round: sub.round,
            });
        }

        let slot_resolved = !append_tiebreak
            && pairing.games[sub.game_index].results[0] != TournamentGameResult::NoResult
            && pairing.games[sub.game_index].results[1] != TournamentGameResult::NoResult;
        if !sub.amend && (pairing.is_complete() || slot_resolved) {
            return Err(DivisionError::DuplicateSubmission {
                p1: sub.p1.clone(),
                p2: sub.p2.clone(),
                round: sub.round,
            });
        }
        let forfeit_override = sub.p1_result == TournamentGameResult::ForfeitLoss
            || sub.p2_result == TournamentGameResult::ForfeitLoss;
        if sub.amend && !slot_resolved && !pairing.is_complete() && !forfeit_override {
            return Err(DivisionError::InvalidAmendment {
                p1: sub.p1.clone(),
                p2: sub.p2.clone(),
                round: sub.round,
                game_index: sub.game_index,
            });
        }

        // All validation has passed; mutate.
        let pairing = &mut self.pairings[sub.round][h1];
        if append_tiebreak {
            pairing.games.push(TournamentGame::default());
        }
        let game = &mut pairing.games[sub.game_index];
        game.scores[s1] = sub.p1_score;
        game.scores[s2] = sub.p2_score;
        game.results[s1] = sub.p1_result;
        game.results[s2] = sub.p2_result;
        game.end_reason = sub.end_reason;

        if pairing.is_bye() {
            // Administrative self-pairing results stand as submitted,
            // whatever the discipline.
            pairing.outcomes[s1] = sub.p1_result;
            pairing.outcomes[s2] = sub.p2_result;
        } else if method == PairingMethod::Elimination {
            pairing.outcomes = elimination_outcomes(&pairing.games, games_per_round);
        } else {
            pairing.outcomes[s1] = sub.p1_result;
            pairing.outcomes[s2] = sub.p2_result;
        }
        debug!(
            "recorded result for {} vs {} in round {} game {}",
            sub.p1, sub.p2, sub.round, sub.game_index
        );

        let complete = self.is_round_complete(sub.round)?;
        if complete
            && !sub.amend
            && sub.round == self.current_round
            && sub.round + 1 < self.round_count()
        {
            self.current_round = sub.round + 1;
            info!("round {} complete; advancing to {}", sub.round, self.current_round);
            let next = self.round_controls[self.current_round].pairing_method;
            if next.is_standings_dependent() && !self.round_has_results(self.current_round) {
                self.pair_round(self.current_round)?;
            }
        }
        Ok(())
    }
}

/// Outcome of an elimination pairing from its full game list. Win counts
/// score 2 per win-equivalent and 1 per draw. With tie-break games
/// present, more wins (or equal wins and better spread) takes the
/// pairing; at exactly the regulation count, a side clears it by
/// exceeding `games_per_round` points, or by spread when both sides sit
/// at exactly that count. Anything else stays open.
///
/// Pure and idempotent: amendments recompute from the whole list.
pub(super) fn elimination_outcomes(
    games: &[TournamentGame],
    games_per_round: usize,
) -> [TournamentGameResult; 2] {
    let mut wins = [0u32; 2];
    let mut spread = [0i32; 2];
    for game in games {
        wins[0] += game.results[0].win_value();
        wins[1] += game.results[1].win_value();
        spread[0] += game.scores[0] - game.scores[1];
        spread[1] += game.scores[1] - game.scores[0];
    }

    let regulation = games_per_round as u32;
    let (first_wins, second_wins) = if games.len() > games_per_round {
        // Tie-break games are in progress or complete.
        (
            wins[0] > wins[1] || (wins[0] == wins[1] && spread[0] > spread[1]),
            wins[1] > wins[0] || (wins[1] == wins[0] && spread[1] > spread[0]),
        )
    } else {
        let both_at_regulation = wins[0] == regulation && wins[1] == regulation;
        (
            wins[0] > regulation || (both_at_regulation && spread[0] > spread[1]),
            wins[1] > regulation || (both_at_regulation && spread[1] > spread[0]),
        )
    };

    if first_wins {
        [TournamentGameResult::Win, TournamentGameResult::Eliminated]
    } else if second_wins {
        [TournamentGameResult::Eliminated, TournamentGameResult::Win]
    } else {
        [TournamentGameResult::NoResult; 2]
    }
}
