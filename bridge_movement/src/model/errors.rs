//! Error types for the data model.

use thiserror::Error;

use super::entities::BoardGroupId;

/// Model construction errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A board group must hold at least one board
    #[error("Board group {0} has no boards")]
    EmptyBoardGroup(BoardGroupId),

    /// Group size of zero can't partition any boards
    #[error("Board group size must be positive")]
    ZeroGroupSize,
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
