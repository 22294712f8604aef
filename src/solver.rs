//! External pairing-solver boundary.
//!
//! Standings-independent disciplines hand a ranked pool of candidates to a
//! [`PairingSolver`] and get back a concrete assignment. The real Swiss
//! optimizer lives outside this crate; [`GreedyPairer`] is the built-in
//! default so a division works out of the box.

use std::collections::HashMap;
use std::fmt;

use crate::division::entities::{PlayerId, RoundControls, Score};
use crate::division::errors::{DivisionError, DivisionResult};

/// A candidate in the pairing pool, ranked by the standings of the
/// previous round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolMember {
    pub id: PlayerId,
    pub wins: u32,
    pub draws: u32,
    pub spread: Score,
}

/// Unordered player pair used to key repeat counts.
pub type RepeatKey = (PlayerId, PlayerId);

/// Canonical key for an unordered pair.
#[must_use]
pub fn repeat_key(a: &PlayerId, b: &PlayerId) -> RepeatKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Strategy interface for computing a pairing assignment from a pool of
/// weighted players.
pub trait PairingSolver: fmt::Debug + Send {
    /// For each pool member, either no assignment (a bye) or the pool
    /// index of its opponent.
    ///
    /// Contract: the output length equals the pool length, and every
    /// non-bye assignment is mutual and within range. The engine rejects
    /// anything else with `SolverContractViolation`.
    fn pair(
        &mut self,
        pool: &[PoolMember],
        controls: &RoundControls,
        repeats: &HashMap<RepeatKey, u32>,
    ) -> Vec<Option<usize>>;
}

/// Rank-adjacent greedy matcher. Walks the pool in order and pairs each
/// unassigned member with the remaining candidate of least weight, where
/// weight combines prior meetings and win-count difference using the
/// round's relative weights. Matchups at or past `max_repeats` are skipped
/// entirely unless the controls allow exceeding the cap.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPairer;

impl PairingSolver for GreedyPairer {
    fn pair(
        &mut self,
        pool: &[PoolMember],
        controls: &RoundControls,
        repeats: &HashMap<RepeatKey, u32>,
    ) -> Vec<Option<usize>> {
        let mut assignments: Vec<Option<usize>> = vec![None; pool.len()];
        for i in 0..pool.len() {
            if assignments[i].is_some() {
                continue;
            }
            let mut best: Option<(u64, usize)> = None;
            for j in i + 1..pool.len() {
                if assignments[j].is_some() {
                    continue;
                }
                let met = repeats
                    .get(&repeat_key(&pool[i].id, &pool[j].id))
                    .copied()
                    .unwrap_or(0);
                if met >= controls.max_repeats && !controls.allow_over_max_repeats {
                    continue;
                }
                let win_gap = u64::from(pool[i].wins.abs_diff(pool[j].wins));
                let weight = u64::from(met) * u64::from(controls.repeat_relative_weight)
                    + win_gap * u64::from(controls.win_difference_relative_weight);
                if best.is_none_or(|(w, _)| weight < w) {
                    best = Some((weight, j));
                }
            }
            if let Some((_, j)) = best {
                assignments[i] = Some(j);
                assignments[j] = Some(i);
            }
        }
        assignments
    }
}

/// Engine-side enforcement of the solver contract.
pub(crate) fn validate_assignments(
    pool_len: usize,
    assignments: &[Option<usize>],
) -> DivisionResult<()> {
    if assignments.len() != pool_len {
        return Err(DivisionError::SolverContractViolation(format!(
            "expected {pool_len} assignments, got {}",
            assignments.len()
        )));
    }
    for (i, assignment) in assignments.iter().enumerate() {
        if let Some(j) = *assignment {
            if j >= pool_len {
                return Err(DivisionError::SolverContractViolation(format!(
                    "assignment {i} -> {j} is out of range"
                )));
            }
            if j == i {
                return Err(DivisionError::SolverContractViolation(format!(
                    "member {i} was assigned to itself"
                )));
            }
            if assignments[j] != Some(i) {
                return Err(DivisionError::SolverContractViolation(format!(
                    "assignment {i} -> {j} is not mutual"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::entities::{FirstMethod, PairingMethod};

    fn member(id: &str, wins: u32) -> PoolMember {
        PoolMember {
            id: PlayerId::from(id),
            wins,
            draws: 0,
            spread: 0,
        }
    }

    fn controls() -> RoundControls {
        RoundControls::new(PairingMethod::Random, FirstMethod::Manual, 1)
    }

    #[test]
    fn greedy_pairs_everyone_when_even() {
        let pool = vec![member("a", 0), member("b", 0), member("c", 0), member("d", 0)];
        let assignments = GreedyPairer.pair(&pool, &controls(), &HashMap::new());
        assert_eq!(assignments, vec![Some(1), Some(0), Some(3), Some(2)]);
        validate_assignments(pool.len(), &assignments).unwrap();
    }

    #[test]
    fn greedy_leaves_one_bye_when_odd() {
        let pool = vec![member("a", 0), member("b", 0), member("c", 0)];
        let assignments = GreedyPairer.pair(&pool, &controls(), &HashMap::new());
        assert_eq!(assignments.iter().filter(|a| a.is_none()).count(), 1);
        validate_assignments(pool.len(), &assignments).unwrap();
    }

    #[test]
    fn greedy_avoids_rematch_when_possible() {
        let pool = vec![member("a", 1), member("b", 1), member("c", 0), member("d", 0)];
        let mut repeats = HashMap::new();
        repeats.insert(
            repeat_key(&PlayerId::from("a"), &PlayerId::from("b")),
            1,
        );
        let controls = controls().with_weights(2, 1);
        let assignments = GreedyPairer.pair(&pool, &controls, &repeats);
        // A rematch of a-b costs more than crossing the win gap.
        assert_ne!(assignments[0], Some(1));
        validate_assignments(pool.len(), &assignments).unwrap();
    }

    #[test]
    fn greedy_honors_hard_repeat_cap() {
        let pool = vec![member("a", 0), member("b", 0)];
        let mut repeats = HashMap::new();
        repeats.insert(
            repeat_key(&PlayerId::from("a"), &PlayerId::from("b")),
            1,
        );
        let controls = controls().with_repeats(1, false);
        let assignments = GreedyPairer.pair(&pool, &controls, &repeats);
        assert_eq!(assignments, vec![None, None]);
    }

    #[test]
    fn contract_rejects_length_mismatch() {
        let err = validate_assignments(2, &[Some(1)]).unwrap_err();
        assert!(matches!(err, DivisionError::SolverContractViolation(_)));
    }

    #[test]
    fn contract_rejects_non_mutual_assignment() {
        let err = validate_assignments(3, &[Some(1), Some(2), Some(1)]).unwrap_err();
        assert!(matches!(err, DivisionError::SolverContractViolation(_)));
    }

    #[test]
    fn contract_rejects_self_assignment() {
        let err = validate_assignments(2, &[Some(0), None]).unwrap_err();
        assert!(matches!(err, DivisionError::SolverContractViolation(_)));
    }
}
