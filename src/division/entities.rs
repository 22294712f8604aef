//! Core entities for a tournament division: players, round controls,
//! games, pairings, and standings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Type alias for game scores and spreads. Spreads are cumulative score
/// differentials, so they can go negative.
pub type Score = i32;

/// Score credited to a player receiving a bye.
pub const BYE_SCORE: Score = 50;

/// Score charged to a player forfeiting a round.
pub const FORFEIT_SCORE: Score = -50;

/// A player identifier. Identifiers are issued by the surrounding service;
/// the engine only requires them to be unique within a division.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Per-player result of a single tournament game or of a whole
/// round-pairing.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TournamentGameResult {
    #[default]
    NoResult,
    Win,
    Loss,
    Draw,
    Bye,
    ForfeitWin,
    ForfeitLoss,
    Eliminated,
}

impl TournamentGameResult {
    /// Win-equivalence used by the elimination resolver: 2 for any
    /// win-like result, 1 for a draw, 0 otherwise.
    pub(crate) fn win_value(self) -> u32 {
        match self {
            Self::Win | Self::Bye | Self::ForfeitWin => 2,
            Self::Draw => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for TournamentGameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NoResult => "no result",
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
            Self::Bye => "bye",
            Self::ForfeitWin => "forfeit win",
            Self::ForfeitLoss => "forfeit loss",
            Self::Eliminated => "eliminated",
        };
        write!(f, "{repr}")
    }
}

/// Why a game ended. The engine stores this verbatim for the record and
/// never branches on it.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEndReason {
    #[default]
    None,
    Standard,
    Time,
    Resigned,
    Abandoned,
    Cancelled,
    ForceForfeit,
}

/// The discipline used to pair a single round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PairingMethod {
    /// No automatic pairing; the director pairs via `set_pairing`.
    Manual,
    /// Solver-assigned pairings over a shuffled pool.
    Random,
    /// Circle-method rotation over the fixed player order.
    RoundRobin,
    /// Adjacent ranks from the previous round's standings.
    KingOfTheHill,
    /// Bracket play; losers are eliminated each round.
    Elimination,
    /// Solver-assigned pairings for a fixed odd-length prefix of early
    /// rounds.
    InitialFontes,
}

impl PairingMethod {
    /// Disciplines that consult standings cannot be paired until the
    /// previous round has finished.
    #[must_use]
    pub fn is_standings_dependent(self) -> bool {
        matches!(self, Self::KingOfTheHill | Self::Elimination)
    }

    /// Disciplines paired up front, at construction or after a roster
    /// change. Manual is excluded: those rounds are only ever paired
    /// explicitly.
    pub(crate) fn pairs_up_front(self) -> bool {
        matches!(self, Self::Random | Self::RoundRobin | Self::InitialFontes)
    }
}

impl fmt::Display for PairingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Manual => "manual",
            Self::Random => "random",
            Self::RoundRobin => "round robin",
            Self::KingOfTheHill => "king of the hill",
            Self::Elimination => "elimination",
            Self::InitialFontes => "initial fontes",
        };
        write!(f, "{repr}")
    }
}

/// How the first-mover of a new pairing is chosen.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FirstMethod {
    /// Keep the order the pairing was created with.
    Manual,
    /// Flip a coin.
    Random,
    /// Whoever has gone first less often goes first.
    Automatic,
}

/// Per-round configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundControls {
    pub pairing_method: PairingMethod,
    pub first_method: FirstMethod,
    /// Games each pairing must play this round. Elimination pairings may
    /// grow beyond this for tie-breaks.
    pub games_per_round: usize,
    /// How many times two players may meet before the solver treats the
    /// matchup as saturated.
    pub max_repeats: u32,
    /// Whether the solver may exceed `max_repeats` when it has no other
    /// option.
    pub allow_over_max_repeats: bool,
    /// Relative weight the solver places on avoiding repeats.
    pub repeat_relative_weight: u32,
    /// Relative weight the solver places on pairing equal records.
    pub win_difference_relative_weight: u32,
    /// Number of leading rounds using the Initial Fontes discipline.
    /// Derived at construction; identical for every round.
    pub initial_fontes: u32,
}

impl RoundControls {
    pub fn new(
        pairing_method: PairingMethod,
        first_method: FirstMethod,
        games_per_round: usize,
    ) -> Self {
        Self {
            pairing_method,
            first_method,
            games_per_round,
            max_repeats: 1,
            allow_over_max_repeats: true,
            repeat_relative_weight: 1,
            win_difference_relative_weight: 1,
            initial_fontes: 0,
        }
    }

    pub fn with_repeats(mut self, max_repeats: u32, allow_over_max_repeats: bool) -> Self {
        self.max_repeats = max_repeats;
        self.allow_over_max_repeats = allow_over_max_repeats;
        self
    }

    pub fn with_weights(mut self, repeat: u32, win_difference: u32) -> Self {
        self.repeat_relative_weight = repeat;
        self.win_difference_relative_weight = win_difference;
        self
    }
}

/// One game inside a pairing. Scores and results are written only by the
/// result recorder.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TournamentGame {
    pub scores: [Score; 2],
    pub results: [TournamentGameResult; 2],
    pub end_reason: GameEndReason,
}

/// A matchup assigned to two round slots. Both paired players' matrix
/// cells hold the same arena handle, so there is a single copy of this
/// struct per matchup. A self-pairing (both slots the same player)
/// represents a bye or a forfeit.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pairing {
    /// The paired players, first-mover at slot 0.
    pub players: [PlayerId; 2],
    /// At least `games_per_round` games; elimination tie-breaks append
    /// more. Empty for eliminated-bracket placeholders.
    pub games: Vec<TournamentGame>,
    /// One terminal result per player slot. The round-pairing is complete
    /// once both slots are non-`NoResult`.
    pub outcomes: [TournamentGameResult; 2],
    /// Start-handshake flags, one per slot.
    pub ready: [bool; 2],
}

impl Pairing {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes[0] != TournamentGameResult::NoResult
            && self.outcomes[1] != TournamentGameResult::NoResult
    }

    /// Whether this is a self-pairing (bye or forfeit).
    #[must_use]
    pub fn is_bye(&self) -> bool {
        self.players[0] == self.players[1]
    }

    pub(crate) fn slot_of(&self, player: &PlayerId) -> Option<usize> {
        if self.players[0] == *player {
            Some(0)
        } else if self.players[1] == *player {
            Some(1)
        } else {
            None
        }
    }
}

/// Mutable per-player properties, parallel to the player list.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerProperties {
    pub removed: bool,
}

/// A player's derived record through some round. Never stored; recomputed
/// on demand from the pairing matrix.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub spread: Score,
    pub removed: bool,
}

/// A submitted or amended game result.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResultSubmission {
    pub round: usize,
    pub p1: PlayerId,
    pub p2: PlayerId,
    pub p1_score: Score,
    pub p2_score: Score,
    pub p1_result: TournamentGameResult,
    pub p2_result: TournamentGameResult,
    pub end_reason: GameEndReason,
    /// Whether this overwrites an already-recorded result.
    pub amend: bool,
    /// Game slot within the pairing. For elimination rounds, the next
    /// index past the end appends a tie-break game.
    pub game_index: usize,
}

impl ResultSubmission {
    pub fn new(
        round: usize,
        p1: PlayerId,
        p2: PlayerId,
        p1_score: Score,
        p2_score: Score,
        p1_result: TournamentGameResult,
        p2_result: TournamentGameResult,
    ) -> Self {
        Self {
            round,
            p1,
            p2,
            p1_score,
            p2_score,
            p1_result,
            p2_result,
            end_reason: GameEndReason::Standard,
            amend: false,
            game_index: 0,
        }
    }

    pub fn with_end_reason(mut self, end_reason: GameEndReason) -> Self {
        self.end_reason = end_reason;
        self
    }

    pub fn amended(mut self) -> Self {
        self.amend = true;
        self
    }

    pub fn for_game(mut self, game_index: usize) -> Self {
        self.game_index = game_index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_trims_whitespace() {
        assert_eq!(PlayerId::new("  alice "), PlayerId::from("alice"));
    }

    #[test]
    fn win_values() {
        assert_eq!(TournamentGameResult::Win.win_value(), 2);
        assert_eq!(TournamentGameResult::Bye.win_value(), 2);
        assert_eq!(TournamentGameResult::ForfeitWin.win_value(), 2);
        assert_eq!(TournamentGameResult::Draw.win_value(), 1);
        assert_eq!(TournamentGameResult::Loss.win_value(), 0);
        assert_eq!(TournamentGameResult::Eliminated.win_value(), 0);
        assert_eq!(TournamentGameResult::NoResult.win_value(), 0);
    }

    #[test]
    fn self_pairing_is_bye() {
        let p = PlayerId::from("alice");
        let pairing = Pairing {
            players: [p.clone(), p],
            games: vec![TournamentGame::default()],
            outcomes: [TournamentGameResult::NoResult; 2],
            ready: [false; 2],
        };
        assert!(pairing.is_bye());
        assert!(!pairing.is_complete());
    }
}
