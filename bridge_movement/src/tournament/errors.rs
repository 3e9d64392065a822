//! Error types for validation and tournament orchestration.

use thiserror::Error;

use crate::model::{BoardNumber, ModelError, PairId, TableId};
use crate::movement::MovementError;
use crate::rotation::RotationError;

/// Violations found by the validation engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A pair was dealt a board it already played
    #[error("Pair {pair} would replay board {board}")]
    BoardReplayed { pair: PairId, board: BoardNumber },

    /// Two pairs meet for the second time
    #[error("Pair {pair} would meet pair {opponent} again")]
    RepeatOpponent { pair: PairId, opponent: PairId },

    /// Both pairs seated but nothing to play
    #[error("Table {0} has both pairs seated but no boards")]
    MissingBoards(TableId),
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Tournament and sector errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TournamentError {
    /// Invalid model value
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Movement construction or lookup failed
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Rotation generator failed
    #[error(transparent)]
    Rotation(#[from] RotationError),

    /// Round rejected by validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Relay tables only hold boards
    #[error("Table {0} is not playable")]
    NonPlayableTable(TableId),

    /// Table id already present
    #[error("Duplicate table: {0}")]
    DuplicateTable(TableId),

    /// Table id not present
    #[error("Unknown table: {0}")]
    UnknownTable(TableId),

    /// Table is referenced by the bound movement
    #[error("Table {0} is used by the sector movement")]
    TableInUse(TableId),

    /// Sector name already present
    #[error("Duplicate sector: {0}")]
    DuplicateSector(String),

    /// Sector name not present
    #[error("Unknown sector: {0}")]
    UnknownSector(String),

    /// Sector was started without a movement
    #[error("Sector {0} has no movement")]
    NoMovement(String),

    /// Tournament must be started first
    #[error("Tournament has not started")]
    NotStarted,

    /// Tournament can only be started once
    #[error("Tournament already started")]
    AlreadyStarted,

    /// Operation not allowed in the current status
    #[error("Sector {sector} is {status}")]
    InvalidStatus { sector: String, status: String },

    /// Board number outside the tournament's board set
    #[error("Board {board} in sector {sector} is outside 1..={total}")]
    BoardOutOfRange {
        sector: String,
        board: BoardNumber,
        total: BoardNumber,
    },

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
