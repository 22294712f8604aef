//! # Tourney Core
//!
//! A multi-round tournament pairing and results engine. Given a roster of
//! players and per-round controls, a [`Division`] computes who plays whom
//! each round, records game outcomes (amendments, forfeits, byes, and
//! elimination tie-breaks included), derives ranked standings, and
//! absorbs mid-tournament roster changes without disturbing rounds that
//! have already been played.
//!
//! ## Architecture
//!
//! The division is a synchronous state machine mutated in place:
//!
//! - **Pairing planner**: six disciplines (Manual, Random, RoundRobin,
//!   KingOfTheHill, Elimination, InitialFontes) behind one dispatch
//! - **Result recorder**: validated submissions and amendments, with
//!   automatic round advancement
//! - **Standings calculator**: records derived on demand from the round
//!   matrix, never stored
//! - **Roster manager**: mid-tournament adds and removals with forfeit
//!   synthesis
//! - **Solver boundary**: standings-independent disciplines delegate to a
//!   pluggable [`PairingSolver`]
//!
//! Callers are expected to serialize all mutating operations on a
//! division and to persist the blob from [`Division::serialize`] after
//! every mutation.
//!
//! ## Example
//!
//! ```
//! use tourney_core::{
//!     Division, DivisionConfig, FirstMethod, PairingMethod, PlayerId, RoundControls,
//! };
//!
//! let players = vec![
//!     PlayerId::from("alice"),
//!     PlayerId::from("bob"),
//!     PlayerId::from("carol"),
//!     PlayerId::from("dan"),
//! ];
//! let rounds = vec![
//!     RoundControls::new(PairingMethod::RoundRobin, FirstMethod::Automatic, 1);
//!     3
//! ];
//! let division = Division::new(DivisionConfig::new(players, rounds)).unwrap();
//! assert_eq!(division.current_round(), 0);
//! ```

/// Division state machine: pairing, results, standings, and roster
/// management.
pub mod division;

/// External pairing-solver boundary.
pub mod solver;

pub use division::{
    Division, DivisionConfig,
    entities::{
        BYE_SCORE, FORFEIT_SCORE, FirstMethod, GameEndReason, Pairing, PairingMethod, PlayerId,
        ResultSubmission, RoundControls, Score, Standing, TournamentGame, TournamentGameResult,
    },
    errors::{DivisionError, DivisionResult},
    response::{DivisionResponse, PairingResponse, RoundResponse},
};
pub use solver::{GreedyPairer, PairingSolver, PoolMember, RepeatKey};
