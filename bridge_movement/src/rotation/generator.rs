use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

use super::{
    errors::{RotationError, RotationResult},
    howell::HowellRotation,
    mitchell::MitchellRotation,
};
use crate::model::{BoardGroupId, SeatMap};

/// Board group per table, round by round.
pub type BoardPlan = Vec<Vec<BoardGroupId>>;

/// Shape of one candidate rotation: how many tables, how many board groups
/// and how many boards in each group.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RotationParams {
    pub num_tables: u32,
    pub num_board_groups: u32,
    pub boards_per_board_group: u32,
}

impl RotationParams {
    #[must_use]
    pub const fn total_boards(&self) -> u32 {
        self.num_board_groups * self.boards_per_board_group
    }
}

impl fmt::Display for RotationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tables, {} groups x {} boards",
            self.num_tables, self.num_board_groups, self.boards_per_board_group
        )
    }
}

/// Closed-form movement: a starting seat map plus a pure step function.
///
/// Generator seat maps number tables `1..=num_tables` and pairs
/// `1..=num_pairs`.
#[enum_dispatch]
pub trait RotationGenerator {
    fn name(&self) -> &'static str;

    fn num_pairs(&self) -> u32;

    fn num_tables(&self) -> u32;

    fn initial_round(&self) -> SeatMap;

    /// Seat map of the round following `previous`.
    #[must_use]
    fn step(&self, previous: &SeatMap) -> SeatMap;

    /// Board groups in circulation.
    fn num_board_groups(&self) -> u32;

    /// Board group played at each table, for every round in `rounds` (the
    /// output of [`pair_rounds`](Self::pair_rounds)). Entry `[r][t]` is the
    /// group at table `t + 1` in round `r + 1`; groups are numbered
    /// `1..=num_board_groups` and round 1 plays group `t` at table `t`.
    ///
    /// No group is at two tables in the same round. Over the first
    /// `num_board_groups` rounds no pair meets a group twice, unless a
    /// Mitchell holds its boards on the switch round.
    fn board_plan(&self, rounds: &[SeatMap]) -> RotationResult<BoardPlan>;

    /// Every distinct round, stepping from the initial round until a seat
    /// map repeats.
    fn pair_rounds(&self) -> Vec<SeatMap> {
        let mut seen = HashSet::new();
        let mut rounds = Vec::new();
        let mut current = self.initial_round();
        while seen.insert(current.clone()) {
            let next = self.step(&current);
            rounds.push(current);
            current = next;
        }
        rounds
    }
}

/// Closed set of built-in rotations.
#[enum_dispatch(RotationGenerator)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    Mitchell(MitchellRotation),
    Howell(HowellRotation),
}

impl Rotation {
    #[must_use]
    pub fn kind(&self) -> RotationKind {
        match self {
            Self::Mitchell(_) => RotationKind::Mitchell,
            Self::Howell(_) => RotationKind::Howell,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} pairs, {} tables)",
            self.name(),
            self.num_pairs(),
            self.num_tables()
        )
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationKind {
    #[default]
    Mitchell,
    Howell,
}

impl RotationKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mitchell => "mitchell",
            Self::Howell => "howell",
        }
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RotationKind {
    type Err = RotationError;

    fn from_str(s: &str) -> RotationResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mitchell" => Ok(Self::Mitchell),
            "howell" => Ok(Self::Howell),
            _ => Err(RotationError::UnknownRotation(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Seat;

    #[test]
    fn test_pair_rounds_stops_at_first_repeat() {
        let rotation = Rotation::from(MitchellRotation::new(6).unwrap());
        let rounds = rotation.pair_rounds();
        assert_eq!(rounds.len(), 5);
        assert_eq!(rounds[0], rotation.initial_round());

        // One more step lands on an already produced map.
        let next = rotation.step(&rounds[4]);
        assert!(rounds.contains(&next));
    }

    #[test]
    fn test_dispatch_to_variants() {
        let howell = Rotation::from(HowellRotation::new(8).unwrap());
        assert_eq!(howell.name(), "howell");
        assert_eq!(howell.kind(), RotationKind::Howell);
        assert_eq!(howell.num_tables(), 4);
        assert_eq!(howell.initial_round()[&Seat::ns(1)], 8);
        assert_eq!(howell.to_string(), "howell (8 pairs, 4 tables)");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Mitchell".parse::<RotationKind>().unwrap(), RotationKind::Mitchell);
        assert_eq!("howell".parse::<RotationKind>().unwrap(), RotationKind::Howell);
        assert!(matches!(
            "swiss".parse::<RotationKind>(),
            Err(RotationError::UnknownRotation(_))
        ));
        assert_eq!(
            serde_json::to_string(&RotationKind::Howell).unwrap(),
            "\"howell\""
        );
    }

    #[test]
    fn test_params_total() {
        let params = RotationParams {
            num_tables: 5,
            num_board_groups: 5,
            boards_per_board_group: 3,
        };
        assert_eq!(params.total_boards(), 15);
    }
}
