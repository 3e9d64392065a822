//! # Bridge Movement
//!
//! Generation and validation of duplicate-bridge movements: which pairs sit
//! at which table and which boards they play, round after round.
//!
//! ## Architecture
//!
//! The crate is layered bottom-up:
//!
//! - [`model`]: Seats, pairs, board groups and the per-round seat and board maps
//! - [`movement`]: Change-list strategies and the engine that applies them
//! - [`rotation`]: Closed-form Mitchell and Howell generators and their registry
//! - [`tournament`]: Tables, sectors, validation and the tournament driver
//!
//! Rotation generators produce a [`MovementStrategy`]; a [`MovementEngine`]
//! materializes it round by round; a [`Sector`] plays the rounds deal by deal
//! and feeds each table to its [`ValidationEngine`].
//!
//! ## Example
//!
//! ```
//! use bridge_movement::{MitchellRotation, Rotation, RotationSchedule, Seat};
//!
//! let mut schedule = RotationSchedule::new(Rotation::from(MitchellRotation::new(6)?));
//! let round_two = schedule.get_round_sitting(2, None)?;
//! assert_eq!(round_two[&Seat::ns(1)], 1);
//! assert_eq!(round_two[&Seat::ew(1)], 6);
//! # Ok::<(), bridge_movement::rotation::RotationError>(())
//! ```

/// Shared value types.
pub mod model;
pub use model::{
    BoardGroup, BoardGroupId, BoardMap, BoardNumber, Pair, PairId, Player, Position, RoundNumber,
    Seat, SeatMap, TableId,
};

/// Strategies and the movement engine.
pub mod movement;
pub use movement::{BoardGroupMovement, MovementEngine, MovementStrategy, OverflowPolicy};

/// Mitchell and Howell generators.
pub mod rotation;
pub use rotation::{
    HowellRotation, MitchellRotation, Rotation, RotationGenerator, RotationKind,
    RotationRegistry, RotationSchedule,
};

/// Sectors, validation and tournament play.
pub mod tournament;
pub use tournament::{Sector, SectorConfig, Tournament, ValidationEngine};
