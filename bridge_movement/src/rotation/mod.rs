//! Closed-form rotation generators.
//!
//! A generator derives the whole seating schedule from the pair count: an
//! initial seat map and a pure step function, repeated until a seat map
//! comes round again. Each generator also deals its board groups over those
//! rounds, and a [`RotationSchedule`] turns the deal into board moves
//! through the relay tables. Built-in generators are the [`MitchellRotation`] and
//! the [`HowellRotation`], dispatched through the [`Rotation`] enum and
//! discoverable through the [`RotationRegistry`].
//!
//! ## Example
//!
//! ```
//! use bridge_movement::rotation::{MitchellRotation, Rotation, RotationSchedule};
//!
//! let mut schedule = RotationSchedule::new(Rotation::from(MitchellRotation::new(8)?));
//! assert_eq!(schedule.round_count(), 7);
//!
//! let strategy = schedule.movement_strategy(&[1, 2, 3, 4], &[], 4)?;
//! assert!(strategy.covers(4));
//! # Ok::<(), bridge_movement::rotation::RotationError>(())
//! ```

pub mod errors;
pub mod generator;
pub mod howell;
pub mod mitchell;
pub mod registry;
pub mod schedule;

pub use errors::{RotationError, RotationResult};
pub use generator::{BoardPlan, Rotation, RotationGenerator, RotationKind, RotationParams};
pub use howell::HowellRotation;
pub use mitchell::{BoardsOnSwitch, MitchellRotation};
pub use registry::{RegisteredRotation, RotationQuery, RotationRegistry};
pub use schedule::RotationSchedule;
