//! Value types shared by every other module: positions, seats, pairs,
//! players and board groups, plus the per-round seat and board maps.

pub mod entities;
pub mod errors;

pub use entities::{
    BoardGroup, BoardGroupId, BoardMap, BoardNumber, Pair, PairId, Player, Position, RoundNumber,
    Seat, SeatMap, TableId,
};
pub use errors::{ModelError, ModelResult};
