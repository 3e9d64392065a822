//! Error types for movement strategies and the movement engine.

use thiserror::Error;

use crate::model::{ModelError, PairId, RoundNumber, TableId};

/// Movement construction and lookup errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MovementError {
    /// Invalid model value
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Rounds are numbered from 1
    #[error("Strategy rule claims round 0")]
    InvalidRound,

    /// Two rules claim the same round
    #[error("Round {0} is claimed by more than one strategy rule")]
    OverlappingRounds(RoundNumber),

    /// Lookup of a round no rule covers
    #[error("No movement rule for round {0}")]
    NoRuleForRound(RoundNumber),

    /// Table is not part of the engine
    #[error("Unknown table: {0}")]
    UnknownTable(TableId),

    /// Pair is not part of the engine
    #[error("Unknown pair: {0}")]
    UnknownPair(PairId),

    /// Same pair placed on two seats
    #[error("Pair {0} is seated more than once")]
    PairSeatedTwice(PairId),

    /// More pairs than playable seats
    #[error("{pairs} pairs do not fit into {seats} playable seats")]
    TooManyPairs { pairs: usize, seats: usize },

    /// Board groups and tables don't match up and no relay can take the slack
    #[error("No relay table available for {groups} board groups on {tables} tables")]
    NoRelayTable { groups: usize, tables: usize },

    /// Initial state can't change once rounds have been computed
    #[error("Rounds have already been constructed")]
    AlreadyConstructed,

    /// Query beyond the computed horizon
    #[error("Round {round} not computed (computed up to {computed})")]
    RoundNotComputed {
        round: RoundNumber,
        computed: RoundNumber,
    },

    /// Board group movement needs at least one board
    #[error("Number of boards must be positive")]
    ZeroBoards,

    /// Board group movement needs at least one table
    #[error("Number of tables must be positive")]
    ZeroTables,
}

/// Result type for movement operations
pub type MovementResult<T> = Result<T, MovementError>;
