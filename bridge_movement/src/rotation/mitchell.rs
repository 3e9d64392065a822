//! Mitchell movement.
//!
//! North-South pairs `1..=n` keep their table while East-West pairs
//! `n+1..=2n` move one table up each round and board groups move one table
//! down. A single switch round swaps the two lines so every pair can meet
//! both halves of the field:
//!
//! - before the switch: table t EW goes to table t+1 EW;
//! - on the switch: table t NS goes to table t EW, table t EW goes to table t+1 NS;
//! - after the switch: table t NS goes to table t+1 NS.

use serde::{Deserialize, Serialize};

use super::{
    errors::{RotationError, RotationResult},
    generator::{BoardPlan, RotationGenerator},
};
use crate::model::{RoundNumber, Seat, SeatMap, TableId};

/// What board groups do on the switch round.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardsOnSwitch {
    #[default]
    Advance,
    Hold,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MitchellRotation {
    num_pairs: u32,
    num_tables: u32,
    /// 0 disables the switch, 1 starts in swapped orientation.
    switch_round: RoundNumber,
    boards_on_switch: BoardsOnSwitch,
}

impl MitchellRotation {
    pub fn new(num_pairs: u32) -> RotationResult<Self> {
        if num_pairs == 0 {
            return Err(RotationError::TooFewPairs(num_pairs));
        }
        if num_pairs % 2 != 0 {
            return Err(RotationError::OddPairCount(num_pairs));
        }
        let num_tables = num_pairs / 2;
        Ok(Self {
            num_pairs,
            num_tables,
            switch_round: if num_tables > 1 { num_tables } else { 0 },
            boards_on_switch: BoardsOnSwitch::default(),
        })
    }

    pub fn with_switch_round(mut self, switch_round: RoundNumber) -> RotationResult<Self> {
        if switch_round > self.num_tables {
            return Err(RotationError::SwitchRoundOutOfRange {
                round: switch_round,
                max: self.num_tables,
            });
        }
        self.switch_round = switch_round;
        Ok(self)
    }

    #[must_use]
    pub fn with_boards_on_switch(mut self, boards_on_switch: BoardsOnSwitch) -> Self {
        self.boards_on_switch = boards_on_switch;
        self
    }

    #[must_use]
    pub fn switch_round(&self) -> RoundNumber {
        self.switch_round
    }

    #[must_use]
    pub fn boards_on_switch(&self) -> BoardsOnSwitch {
        self.boards_on_switch
    }

    fn next_table(&self, table: TableId) -> TableId {
        table % self.num_tables + 1
    }

    /// Rounds already played in standard orientation, recovered from which
    /// East-West pair sits at table 1.
    fn standard_offset(&self, map: &SeatMap) -> u32 {
        let n = self.num_tables;
        let ew_index = map
            .get(&Seat::ew(1))
            .map_or(0, |&pair| pair.saturating_sub(n + 1) % n);
        (n - ew_index) % n
    }
}

impl RotationGenerator for MitchellRotation {
    fn name(&self) -> &'static str {
        "mitchell"
    }

    fn num_pairs(&self) -> u32 {
        self.num_pairs
    }

    fn num_tables(&self) -> u32 {
        self.num_tables
    }

    fn initial_round(&self) -> SeatMap {
        let n = self.num_tables;
        let swapped = self.switch_round == 1;
        (1..=n)
            .flat_map(|table| {
                let (ns, ew) = if swapped {
                    (n + table, table)
                } else {
                    (table, n + table)
                };
                [(Seat::ns(table), ns), (Seat::ew(table), ew)]
            })
            .collect()
    }

    fn step(&self, previous: &SeatMap) -> SeatMap {
        let n = self.num_tables;
        let standard = previous.get(&Seat::ns(1)).is_some_and(|&pair| pair <= n);
        let switching = standard
            && self.switch_round >= 2
            && self.standard_offset(previous) + 2 == self.switch_round;

        let mut next = SeatMap::new();
        for table in 1..=n {
            let up = self.next_table(table);
            let ns = previous.get(&Seat::ns(table)).copied();
            let ew = previous.get(&Seat::ew(table)).copied();
            let moves = if switching {
                [(Seat::ew(table), ns), (Seat::ns(up), ew)]
            } else if standard {
                [(Seat::ns(table), ns), (Seat::ew(up), ew)]
            } else {
                [(Seat::ns(up), ns), (Seat::ew(table), ew)]
            };
            for (seat, pair) in moves {
                if let Some(pair) = pair {
                    next.insert(seat, pair);
                }
            }
        }
        next
    }

    fn num_board_groups(&self) -> u32 {
        self.num_tables
    }

    /// Groups move one table down every round, the last table feeding the
    /// first. With [`BoardsOnSwitch::Hold`] they skip the switch round.
    fn board_plan(&self, rounds: &[SeatMap]) -> RotationResult<BoardPlan> {
        let n = self.num_tables;
        let held = self.boards_on_switch == BoardsOnSwitch::Hold && self.switch_round >= 2;
        Ok((1..=rounds.len() as RoundNumber)
            .map(|round| {
                let shift = if held && round >= self.switch_round {
                    round - 2
                } else {
                    round - 1
                };
                (1..=n).map(|table| (table - 1 + shift) % n + 1).collect()
            })
            .collect())
    }
}
