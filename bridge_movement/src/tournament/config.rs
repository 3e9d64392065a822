//! Sector configuration.

use serde::{Deserialize, Serialize};

use crate::movement::OverflowPolicy;
use crate::rotation::{BoardsOnSwitch, RotationKind};

/// Description of a generated sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorConfig {
    /// Sector name, used as the table display prefix
    pub name: String,

    /// Rotation driving the sector (default: mitchell)
    pub movement: RotationKind,

    /// Number of competing pairs; an odd count adds a bye
    pub num_pairs: u32,

    /// Boards in each board group
    pub boards_per_group: u32,

    /// Number of relay tables added after the playable ones
    pub relay_tables: u32,

    /// Rounds to play (default: the full rotation schedule)
    pub rounds: Option<u32>,

    /// Where surplus board groups go
    pub overflow_policy: OverflowPolicy,

    /// Mitchell switch round (default: last plain round, 0 disables)
    pub mitchell_switch_round: Option<u32>,

    /// Mitchell board movement on the switch round
    pub boards_on_switch: BoardsOnSwitch,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            name: "A".to_string(),
            movement: RotationKind::Mitchell,
            num_pairs: 10,
            boards_per_group: 3,
            relay_tables: 0,
            rounds: None,
            overflow_policy: OverflowPolicy::LastRelay,
            mitchell_switch_round: None,
            boards_on_switch: BoardsOnSwitch::Advance,
        }
    }
}

impl SectorConfig {
    /// Playable tables, one per two pairs rounded up
    #[must_use]
    pub fn num_tables(&self) -> u32 {
        self.num_pairs.div_ceil(2)
    }

    /// Board groups the rotation needs
    #[must_use]
    pub fn num_board_groups(&self) -> u32 {
        match self.movement {
            RotationKind::Mitchell => self.num_tables(),
            RotationKind::Howell => (2 * self.num_tables()).saturating_sub(1),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Sector name must not be empty".to_string());
        }

        if self.num_pairs < 2 || self.num_pairs > 200 {
            return Err("Number of pairs must be between 2 and 200".to_string());
        }

        if self.boards_per_group == 0 || self.boards_per_group > 36 {
            return Err("Boards per group must be between 1 and 36".to_string());
        }

        if self.rounds == Some(0) {
            return Err("Rounds must be positive".to_string());
        }

        let tables = self.num_tables();
        let groups = self.num_board_groups();
        match self.movement {
            RotationKind::Mitchell => {
                if tables < 3 || tables % 2 == 0 {
                    return Err(format!(
                        "Mitchell movement needs an odd number of tables, at least 3 (got {tables})"
                    ));
                }
                let switch_round = self.mitchell_switch_round.unwrap_or(tables);
                if switch_round > tables {
                    return Err(format!("Switch round must be between 0 and {tables}"));
                }
                // Held boards are replayed by the pairs that just moved.
                let last_round = self.rounds.unwrap_or(groups);
                if self.boards_on_switch == BoardsOnSwitch::Hold
                    && (2..=last_round).contains(&switch_round)
                {
                    return Err(format!(
                        "Boards can't be held on switch round {switch_round} within {last_round} rounds"
                    ));
                }
            }
            RotationKind::Howell => {
                if tables < 4 {
                    return Err(format!("Howell movement needs at least 4 tables (got {tables})"));
                }
                if self.relay_tables == 0 {
                    return Err("Howell movement needs at least one relay table".to_string());
                }
            }
        }

        if self.rounds.is_some_and(|rounds| rounds > groups) {
            return Err(format!("Rounds must not exceed the {groups} board groups"));
        }

        Ok(())
    }
}
