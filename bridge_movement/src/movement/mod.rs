//! Explicit, change-list driven movements.
//!
//! A [`MovementStrategy`] lists which seats and board groups move before
//! each round; the [`MovementEngine`] applies it to an initial sitting and
//! board placement to materialize every round. [`BoardGroupMovement`] is the
//! closed-form board rotation used by simple sectors.

pub mod board_groups;
pub mod engine;
pub mod errors;
pub mod strategy;

pub use board_groups::BoardGroupMovement;
pub use engine::{MovementEngine, OverflowPolicy, RoundState};
pub use errors::{MovementError, MovementResult};
pub use strategy::{BoardMove, MovementStrategy, SeatMove, StrategyRule};
