use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::errors::{TournamentError, TournamentResult};
use crate::model::{BoardGroup, BoardNumber, PairId, Position, RoundNumber, TableId};

/// Table run-time status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Nothing to do this round
    #[default]
    Idle,
    /// Pairs seated and playing the current group
    Playing,
    /// Storing board groups without play
    Holding,
    /// Every board of the current group has been played
    Done,
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Idle => write!(f, "idle"),
            TableStatus::Playing => write!(f, "playing"),
            TableStatus::Holding => write!(f, "holding"),
            TableStatus::Done => write!(f, "done"),
        }
    }
}

/// A physical table. Relay tables (not playable) only store board groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    id: TableId,
    /// Number shown to players; may differ from `id` after renumbering
    pub display_id: u32,
    playable: bool,
    /// Sector currently owning the table
    pub sector: Option<String>,
    /// Sector the table was first added to
    pub origin_sector: Option<String>,
    pub status: TableStatus,
    pub current_round: RoundNumber,
    seats: BTreeMap<Position, PairId>,
    boards: VecDeque<BoardGroup>,
    deal_index: usize,
}

impl Table {
    /// Create a playable table
    #[must_use]
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            display_id: id,
            playable: true,
            sector: None,
            origin_sector: None,
            status: TableStatus::Idle,
            current_round: 0,
            seats: BTreeMap::new(),
            boards: VecDeque::new(),
            deal_index: 0,
        }
    }

    /// Create a relay table
    #[must_use]
    pub fn relay(id: TableId) -> Self {
        Self {
            playable: false,
            ..Self::new(id)
        }
    }

    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.playable
    }

    /// Seat two pairs and put `group` on the table for `round`.
    pub fn start_round(
        &mut self,
        round: RoundNumber,
        ns: PairId,
        ew: PairId,
        group: BoardGroup,
    ) -> TournamentResult<()> {
        if !self.playable {
            return Err(TournamentError::NonPlayableTable(self.id));
        }
        self.current_round = round;
        self.seats = BTreeMap::from([(Position::NorthSouth, ns), (Position::EastWest, ew)]);
        self.boards = VecDeque::from([group]);
        self.deal_index = 0;
        self.status = TableStatus::Playing;
        Ok(())
    }

    /// Keep `groups` on the table for `round` without play.
    pub fn hold(&mut self, round: RoundNumber, groups: impl IntoIterator<Item = BoardGroup>) {
        self.current_round = round;
        self.seats.clear();
        self.boards = groups.into_iter().collect();
        self.deal_index = 0;
        self.status = if self.boards.is_empty() {
            TableStatus::Idle
        } else {
            TableStatus::Holding
        };
    }

    /// Finish the current deal. Returns the next board of the group, or
    /// `None` once the group is exhausted.
    pub fn next_deal(&mut self) -> Option<BoardNumber> {
        if self.status != TableStatus::Playing {
            return None;
        }
        self.deal_index += 1;
        let next = self.current_board();
        if next.is_none() {
            self.status = TableStatus::Done;
        }
        next
    }

    /// Board being played right now.
    #[must_use]
    pub fn current_board(&self) -> Option<BoardNumber> {
        self.boards
            .front()
            .and_then(|group| group.boards().get(self.deal_index))
            .copied()
    }

    #[must_use]
    pub fn pair_at(&self, position: Position) -> Option<PairId> {
        self.seats.get(&position).copied()
    }

    #[must_use]
    pub fn boards(&self) -> &VecDeque<BoardGroup> {
        &self.boards
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.playable { "" } else { "_" };
        let sector = self.sector.as_deref().unwrap_or("");
        write!(f, "{prefix}{sector}{}", self.display_id)
    }
}
