//! Error types for rotation generators and the rotation registry.

use thiserror::Error;

use crate::model::RoundNumber;
use crate::movement::MovementError;

/// Rotation generator errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RotationError {
    /// Both rotations seat every pair against another
    #[error("Pair count must be even, got {0}")]
    OddPairCount(u32),

    /// Not enough pairs to fill a table
    #[error("Too few pairs: {0}")]
    TooFewPairs(u32),

    /// Switch round past the end of a plain Mitchell
    #[error("Switch round {round} out of range 0..={max}")]
    SwitchRoundOutOfRange { round: u32, max: u32 },

    /// Round outside the generated schedule
    #[error("Round {round} out of range (schedule has {rounds} rounds)")]
    RoundOutOfRange {
        round: RoundNumber,
        rounds: RoundNumber,
    },

    /// Concrete table list doesn't match the rotation's table count
    #[error("Expected {expected} tables, got {actual}")]
    TableCountMismatch { expected: usize, actual: usize },

    /// No way to deal the board groups so that every pair sees each once
    #[error("No board plan for a {0}-table Howell")]
    NoBoardPlan(u32),

    /// Fewer board groups than the rotation circulates
    #[error("Rotation needs {needed} board groups, got {actual}")]
    TooFewBoardGroups { needed: usize, actual: usize },

    /// Name not present in the registry
    #[error("Unknown rotation: {0}")]
    UnknownRotation(String),

    /// Name registered twice
    #[error("Rotation already registered: {0}")]
    DuplicateRotation(String),

    /// Error building the movement engine
    #[error(transparent)]
    Movement(#[from] MovementError),
}

/// Result type for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;
