//! Division error types.
//!
//! Every error is a synchronous, caller-recoverable validation failure.
//! The division's state is left unmodified whenever one of these is
//! returned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::PlayerId;

/// Division errors
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum DivisionError {
    #[error("round number out of range: {round}")]
    RoundOutOfRange { round: usize },

    #[error("player does not exist in the tournament: {player}")]
    PlayerNotFound { player: PlayerId },

    #[error("players {p1} and {p2} are not paired with each other in round {round}")]
    PairingMissingOrMismatched {
        p1: PlayerId,
        p2: PlayerId,
        round: usize,
    },

    #[error("result already submitted for {p1} and {p2} in round {round}")]
    DuplicateSubmission {
        p1: PlayerId,
        p2: PlayerId,
        round: usize,
    },

    #[error("cannot amend game {game_index} for {p1} and {p2} in round {round}: no result was ever submitted")]
    InvalidAmendment {
        p1: PlayerId,
        p2: PlayerId,
        round: usize,
        game_index: usize,
    },

    #[error("game index {game_index} out of range for round {round}")]
    GameIndexOutOfRange { game_index: usize, round: usize },

    #[error("{0}")]
    PairingMethodConflict(String),

    #[error("invalid number of players for an elimination bracket: have {actual}, expected {expected}")]
    PlayerCountMismatch { expected: usize, actual: usize },

    #[error("removal would leave the tournament with no active players")]
    EmptyTournamentAfterRemoval,

    #[error("pairing solver violated its contract: {0}")]
    SolverContractViolation(String),

    #[error("invalid division config: {0}")]
    InvalidConfig(String),

    #[error("player already exists in the tournament: {player}")]
    PlayerAlreadyExists { player: PlayerId },

    #[error("failed to serialize division state: {0}")]
    Serialization(String),
}

/// Result type for division operations
pub type DivisionResult<T> = Result<T, DivisionError>;
