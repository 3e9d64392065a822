//! Tournament driving one or more sectors through deals and rounds.

use log::info;

use super::{
    errors::{TournamentError, TournamentResult},
    sector::{Sector, SectorStatus},
};
use crate::model::{BoardNumber, RoundNumber, TableId};

/// Outcome of advancing the tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentProgress {
    /// At least one sector still has rounds to play
    Advanced,
    /// Every sector has finished
    Finished,
}

/// Tournament over a shared set of boards
#[derive(Debug, Clone)]
pub struct Tournament {
    total_boards: BoardNumber,
    sectors: Vec<Sector>,
    started: bool,
}

impl Tournament {
    /// Create a tournament playing boards `1..=total_boards`
    pub fn new(total_boards: BoardNumber) -> Self {
        Self {
            total_boards,
            sectors: Vec::new(),
            started: false,
        }
    }

    pub fn total_boards(&self) -> BoardNumber {
        self.total_boards
    }

    /// Add a sector; names must be unique
    pub fn add_sector(&mut self, sector: Sector) -> TournamentResult<()> {
        if self.started {
            return Err(TournamentError::AlreadyStarted);
        }
        if self.sector(sector.name()).is_some() {
            return Err(TournamentError::DuplicateSector(sector.name().to_string()));
        }
        self.sectors.push(sector);
        Ok(())
    }

    pub fn sector(&self, name: &str) -> Option<&Sector> {
        self.sectors.iter().find(|sector| sector.name() == name)
    }

    pub fn sector_mut(&mut self, name: &str) -> Option<&mut Sector> {
        self.sectors.iter_mut().find(|sector| sector.name() == name)
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    fn index_of(&self, name: &str) -> TournamentResult<usize> {
        self.sectors
            .iter()
            .position(|sector| sector.name() == name)
            .ok_or_else(|| TournamentError::UnknownSector(name.to_string()))
    }

    /// Check board numbers and start every sector
    pub fn start(&mut self) -> TournamentResult<()> {
        if self.started {
            return Err(TournamentError::AlreadyStarted);
        }

        // Check boards before touching any sector
        for sector in &self.sectors {
            if let Some(board) = sector
                .board_numbers()
                .find(|board| !(1..=self.total_boards).contains(board))
            {
                return Err(TournamentError::BoardOutOfRange {
                    sector: sector.name().to_string(),
                    board,
                    total: self.total_boards,
                });
            }
        }

        for sector in &mut self.sectors {
            sector.start()?;
        }
        self.started = true;
        info!(
            "Tournament started with {} sectors on {} boards",
            self.sectors.len(),
            self.total_boards
        );
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.sectors
            .iter()
            .all(|sector| sector.status() == SectorStatus::Finished)
    }

    fn progress(&self) -> TournamentProgress {
        if self.is_finished() {
            TournamentProgress::Finished
        } else {
            TournamentProgress::Advanced
        }
    }

    fn active_sectors(&mut self) -> TournamentResult<impl Iterator<Item = &mut Sector>> {
        if !self.started {
            return Err(TournamentError::NotStarted);
        }
        Ok(self
            .sectors
            .iter_mut()
            .filter(|sector| sector.status() == SectorStatus::Active))
    }

    /// Play one deal in every active sector. A sector whose round runs out
    /// of boards completes the round.
    pub fn next_deal(&mut self) -> TournamentResult<TournamentProgress> {
        for sector in self.active_sectors()? {
            if !sector.play_deal()? {
                sector.complete_round()?;
            }
        }
        Ok(self.progress())
    }

    /// Play the rest of the current round in every active sector
    pub fn next_round(&mut self) -> TournamentResult<TournamentProgress> {
        for sector in self.active_sectors()? {
            sector.play_round()?;
        }
        Ok(self.progress())
    }

    /// Play rounds until every sector has finished. Returns the number of
    /// rounds played by the longest sector.
    pub fn run_to_completion(&mut self) -> TournamentResult<RoundNumber> {
        let mut rounds = 0;
        while !self.is_finished() {
            self.next_round()?;
            rounds += 1;
        }
        info!("Tournament finished after {rounds} rounds");
        Ok(rounds)
    }

    /// Move a table between two sectors
    pub fn transfer_table(&mut self, from: &str, id: TableId, to: &str) -> TournamentResult<()> {
        let source = self.index_of(from)?;
        let target = self.index_of(to)?;
        if source == target {
            return Ok(());
        }
        if self.sectors[target].table(id).is_some() {
            return Err(TournamentError::DuplicateTable(id));
        }

        let table = self.sectors[source].remove_table(id)?;
        self.sectors[target].insert_table(table)?;
        info!("Table {id} moved from sector {from} to sector {to}");
        Ok(())
    }
}
