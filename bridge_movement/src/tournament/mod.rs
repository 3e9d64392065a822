//! Tournament play on top of a movement.
//!
//! This module provides:
//! - Physical tables, playable or relay, with per-deal progress
//! - Sectors binding tables to one movement and a validator
//! - Cumulative validation of board replays and repeat opponents
//! - A tournament driving several sectors over one board set
//!
//! ## Example
//!
//! ```
//! use bridge_movement::tournament::{SectorConfig, Sector, Tournament};
//!
//! let config = SectorConfig {
//!     num_pairs: 6,
//!     boards_per_group: 2,
//!     mitchell_switch_round: Some(0),
//!     ..Default::default()
//! };
//!
//! let mut tournament = Tournament::new(6);
//! tournament.add_sector(Sector::from_config(&config)?)?;
//! tournament.start()?;
//! assert_eq!(tournament.run_to_completion()?, 3);
//! # Ok::<(), bridge_movement::tournament::TournamentError>(())
//! ```

pub mod config;
pub mod errors;
pub mod manager;
pub mod sector;
pub mod table;
pub mod validator;

pub use config::SectorConfig;
pub use errors::{TournamentError, TournamentResult, ValidationError, ValidationResult};
pub use manager::{Tournament, TournamentProgress};
pub use sector::{Sector, SectorStatus};
pub use table::{Table, TableStatus};
pub use validator::ValidationEngine;
