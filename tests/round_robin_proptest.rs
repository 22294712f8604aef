/// Property-based tests for round-robin pairing using proptest
///
/// These verify the rotation's coverage guarantee through the public
/// division API: across n-1 rounds of an n-player round robin, every
/// unordered pair of players meets exactly once.
use proptest::prelude::*;
use std::collections::HashMap;

use tourney_core::{
    Division, DivisionConfig, FirstMethod, PairingMethod, PlayerId, RoundControls,
};

fn round_robin_division(player_count: usize, seed: u64) -> Division {
    let players: Vec<PlayerId> = (0..player_count)
        .map(|i| PlayerId::from(format!("p{i:02}")))
        .collect();
    let rounds = (0..player_count.saturating_sub(1).max(1))
        .map(|_| RoundControls::new(PairingMethod::RoundRobin, FirstMethod::Manual, 1))
        .collect();
    Division::new(DivisionConfig::new(players, rounds).with_seed(seed)).unwrap()
}

proptest! {
    #[test]
    fn every_pair_meets_exactly_once(half in 1usize..=6, seed in any::<u64>()) {
        let n = 2 * half;
        let division = round_robin_division(n, seed);

        let mut meetings: HashMap<(PlayerId, PlayerId), usize> = HashMap::new();
        for round in 0..n - 1 {
            for player in division.players().to_vec() {
                let opponent = division
                    .opponent_of(&player, round)
                    .unwrap()
                    .expect("round robin pairs everyone");
                prop_assert_ne!(&opponent, &player, "even rosters have no byes");
                if player < opponent {
                    *meetings.entry((player, opponent)).or_insert(0) += 1;
                }
            }
        }

        prop_assert_eq!(meetings.len(), n * (n - 1) / 2);
        prop_assert!(meetings.values().all(|&count| count == 1));
    }

    #[test]
    fn odd_rosters_give_every_player_at_most_one_bye(half in 1usize..=6, seed in any::<u64>()) {
        let n = 2 * half + 1;
        let division = round_robin_division(n, seed);

        let mut byes: HashMap<PlayerId, usize> = HashMap::new();
        for round in 0..n - 1 {
            for player in division.players().to_vec() {
                let opponent = division
                    .opponent_of(&player, round)
                    .unwrap()
                    .expect("round robin pairs everyone");
                if opponent == player {
                    *byes.entry(player).or_insert(0) += 1;
                }
            }
        }

        prop_assert!(byes.values().all(|&count| count == 1));
        prop_assert_eq!(byes.len(), n - 1);
    }
}
