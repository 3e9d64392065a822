//! A sector: a set of tables bound to one movement, with its own validator.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{
    config::SectorConfig,
    errors::{TournamentError, TournamentResult},
    table::{Table, TableStatus},
    validator::ValidationEngine,
};
use crate::model::{BoardGroup, BoardNumber, Pair, PairId, Position, RoundNumber, Seat, TableId};
use crate::movement::MovementEngine;
use crate::rotation::{HowellRotation, MitchellRotation, Rotation, RotationKind, RotationSchedule};

/// Sector lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectorStatus {
    /// Set up, not started
    #[default]
    Inactive,
    /// Playing rounds
    Active,
    /// All planned rounds played
    Finished,
}

impl fmt::Display for SectorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorStatus::Inactive => write!(f, "inactive"),
            SectorStatus::Active => write!(f, "active"),
            SectorStatus::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sector {
    name: String,
    tables: BTreeMap<TableId, Table>,
    movement: Option<MovementEngine>,
    planned_rounds: RoundNumber,
    validator: ValidationEngine,
    status: SectorStatus,
    current_round: RoundNumber,
    deals_played: usize,
    /// Tables already validated in the current round
    validated: BTreeSet<TableId>,
}

impl Sector {
    /// Create an empty sector
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
            movement: None,
            planned_rounds: 0,
            validator: ValidationEngine::new(),
            status: SectorStatus::Inactive,
            current_round: 0,
            deals_played: 0,
            validated: BTreeSet::new(),
        }
    }

    /// Build tables, pairs, board groups and the movement described by
    /// `config`.
    pub fn from_config(config: &SectorConfig) -> TournamentResult<Self> {
        config.validate().map_err(TournamentError::InvalidConfig)?;

        let mut sector = Self::new(config.name.clone());
        let num_tables = config.num_tables();
        sector.add_tables(num_tables);
        sector.add_relay_tables(config.relay_tables);

        // A bye pair fills the last seat when the pair count is odd.
        let rotation: Rotation = match config.movement {
            RotationKind::Mitchell => {
                let mut mitchell = MitchellRotation::new(num_tables * 2)?
                    .with_boards_on_switch(config.boards_on_switch);
                if let Some(switch_round) = config.mitchell_switch_round {
                    mitchell = mitchell.with_switch_round(switch_round)?;
                }
                mitchell.into()
            }
            RotationKind::Howell => HowellRotation::new(num_tables * 2)?.into(),
        };
        let mut schedule = RotationSchedule::new(rotation).with_overflow_policy(config.overflow_policy);
        // Past the last board group every round would replay boards.
        let rounds = config
            .rounds
            .unwrap_or_else(|| schedule.round_count().min(config.num_board_groups()));

        let pairs: Vec<Pair> = (1..=config.num_pairs).map(Pair::anonymous).collect();
        let groups = BoardGroup::contiguous(
            config.num_board_groups() as usize,
            config.boards_per_group as usize,
        )?;
        let tables: Vec<Table> = sector.tables.values().cloned().collect();

        let engine = schedule.movement_engine(&tables, pairs, groups, rounds)?;
        sector.set_movement(engine, rounds)?;

        info!(
            "Sector {} built: {} over {rounds} rounds",
            sector.name,
            schedule.rotation()
        );
        Ok(sector)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn status(&self) -> SectorStatus {
        self.status
    }

    #[must_use]
    pub fn current_round(&self) -> RoundNumber {
        self.current_round
    }

    #[must_use]
    pub fn planned_rounds(&self) -> RoundNumber {
        self.planned_rounds
    }

    #[must_use]
    pub fn movement(&self) -> Option<&MovementEngine> {
        self.movement.as_ref()
    }

    #[must_use]
    pub fn validator(&self) -> &ValidationEngine {
        &self.validator
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.movement.iter().flat_map(MovementEngine::pairs)
    }

    #[must_use]
    pub fn board_groups(&self) -> &[BoardGroup] {
        self.movement
            .as_ref()
            .map(MovementEngine::board_groups)
            .unwrap_or_default()
    }

    /// Every board number used by the sector
    pub fn board_numbers(&self) -> impl Iterator<Item = BoardNumber> + '_ {
        self.board_groups()
            .iter()
            .flat_map(|group| group.boards().iter().copied())
    }

    fn next_table_id(&self) -> TableId {
        self.tables.keys().next_back().map_or(1, |id| id + 1)
    }

    fn add_new_tables(&mut self, count: u32, make: fn(TableId) -> Table) -> Vec<TableId> {
        let first = self.next_table_id();
        let ids: Vec<TableId> = (first..first + count).collect();
        for &id in &ids {
            let mut table = make(id);
            table.sector = Some(self.name.clone());
            table.origin_sector = Some(self.name.clone());
            self.tables.insert(id, table);
        }
        ids
    }

    /// Add `count` playable tables after the existing ones
    pub fn add_tables(&mut self, count: u32) -> Vec<TableId> {
        self.add_new_tables(count, Table::new)
    }

    /// Add `count` relay tables after the existing ones
    pub fn add_relay_tables(&mut self, count: u32) -> Vec<TableId> {
        self.add_new_tables(count, Table::relay)
    }

    /// Take ownership of a table coming from elsewhere
    pub fn insert_table(&mut self, mut table: Table) -> TournamentResult<()> {
        if self.tables.contains_key(&table.id()) {
            return Err(TournamentError::DuplicateTable(table.id()));
        }
        table.sector = Some(self.name.clone());
        table.origin_sector.get_or_insert_with(|| self.name.clone());
        debug!("Sector {} takes table {}", self.name, table.id());
        self.tables.insert(table.id(), table);
        Ok(())
    }

    /// Give up a table. Tables the bound movement uses can't be removed.
    pub fn remove_table(&mut self, id: TableId) -> TournamentResult<Table> {
        if self
            .movement
            .as_ref()
            .is_some_and(|movement| movement.uses_table(id))
        {
            return Err(TournamentError::TableInUse(id));
        }
        let mut table = self
            .tables
            .remove(&id)
            .ok_or(TournamentError::UnknownTable(id))?;
        table.sector = None;
        Ok(table)
    }

    /// Number playable tables 1.. and relays 1.. separately, so relays
    /// don't leave gaps in the visible numbering.
    pub fn exclude_relay_tables_from_numbering(&mut self) {
        let mut playable = 0;
        let mut relays = 0;
        for table in self.tables.values_mut() {
            let counter = if table.is_playable() {
                &mut playable
            } else {
                &mut relays
            };
            *counter += 1;
            table.display_id = *counter;
        }
    }

    /// Display ids back to table ids
    pub fn restore_numbering(&mut self) {
        for table in self.tables.values_mut() {
            table.display_id = table.id();
        }
    }

    /// Bind a movement and compute its first `rounds` rounds
    pub fn set_movement(
        &mut self,
        mut movement: MovementEngine,
        rounds: RoundNumber,
    ) -> TournamentResult<()> {
        self.ensure_status(SectorStatus::Inactive)?;
        let missing = movement
            .playable_tables()
            .iter()
            .chain(movement.relay_tables())
            .find(|id| !self.tables.contains_key(*id))
            .copied();
        if let Some(missing) = missing {
            return Err(TournamentError::UnknownTable(missing));
        }

        movement.construct(rounds)?;
        self.movement = Some(movement);
        self.planned_rounds = rounds;
        Ok(())
    }

    fn ensure_status(&self, expected: SectorStatus) -> TournamentResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TournamentError::InvalidStatus {
                sector: self.name.clone(),
                status: self.status.to_string(),
            })
        }
    }

    /// Seat round 1
    pub fn start(&mut self) -> TournamentResult<()> {
        self.ensure_status(SectorStatus::Inactive)?;
        if self.movement.is_none() {
            return Err(TournamentError::NoMovement(self.name.clone()));
        }
        if self.planned_rounds == 0 {
            self.status = SectorStatus::Finished;
            return Ok(());
        }
        self.status = SectorStatus::Active;
        self.load_round(1)?;
        info!("Sector {} started", self.name);
        Ok(())
    }

    fn load_round(&mut self, round: RoundNumber) -> TournamentResult<()> {
        let movement = self
            .movement
            .as_ref()
            .ok_or_else(|| TournamentError::NoMovement(self.name.clone()))?;
        let state = movement.round_state(round)?;

        for (id, table) in &mut self.tables {
            let ns = state.pair_at(Seat::ns(*id));
            let ew = state.pair_at(Seat::ew(*id));
            let queue = state.boards.get(id);
            match (ns, ew, queue.and_then(|q| q.front())) {
                (Some(ns), Some(ew), Some(group)) if table.is_playable() => {
                    table.start_round(round, ns, ew, group.clone())?;
                }
                _ => table.hold(round, queue.into_iter().flatten().cloned()),
            }
        }

        self.current_round = round;
        self.deals_played = 0;
        self.validated.clear();
        info!("Sector {} entering round {round}", self.name);
        Ok(())
    }

    fn validate_tables(&mut self, tables: &BTreeSet<TableId>) -> TournamentResult<()> {
        if tables.is_empty() {
            return Ok(());
        }
        let movement = self
            .movement
            .as_ref()
            .ok_or_else(|| TournamentError::NoMovement(self.name.clone()))?;
        let state = movement
            .round_state(self.current_round)?
            .restricted_to(tables);
        self.validator.validate_round(&state.seats, &state.boards)?;
        self.validated.extend(tables);
        Ok(())
    }

    /// Finish one deal at every playing table. Tables that run out of
    /// boards are validated at once. Returns whether any table still has
    /// boards to play this round.
    pub fn play_deal(&mut self) -> TournamentResult<bool> {
        self.ensure_status(SectorStatus::Active)?;

        let mut finished = BTreeSet::new();
        for (id, table) in &mut self.tables {
            if table.status == TableStatus::Playing && table.next_deal().is_none() {
                finished.insert(*id);
            }
        }
        self.deals_played += 1;
        self.validate_tables(&finished)?;

        Ok(self.has_deals_left())
    }

    #[must_use]
    pub fn has_deals_left(&self) -> bool {
        self.tables
            .values()
            .any(|table| table.status == TableStatus::Playing)
    }

    /// Validate whatever the deals didn't, then move to the next round.
    pub fn complete_round(&mut self) -> TournamentResult<SectorStatus> {
        self.ensure_status(SectorStatus::Active)?;

        let pending: BTreeSet<TableId> = self
            .tables
            .keys()
            .filter(|id| !self.validated.contains(id))
            .copied()
            .collect();
        self.validate_tables(&pending)?;
        debug!(
            "Sector {} round {} complete after {} deals",
            self.name, self.current_round, self.deals_played
        );

        if self.current_round >= self.planned_rounds {
            self.status = SectorStatus::Finished;
            info!("Sector {} finished", self.name);
        } else {
            self.load_round(self.current_round + 1)?;
        }
        Ok(self.status)
    }

    /// Play out the current round and advance
    pub fn play_round(&mut self) -> TournamentResult<SectorStatus> {
        while self.play_deal()? {}
        self.complete_round()
    }

    /// Pairs seated at each playing table
    #[must_use]
    pub fn current_pairs(&self) -> BTreeMap<TableId, (PairId, PairId)> {
        self.tables
            .iter()
            .filter_map(|(id, table)| {
                let ns = table.pair_at(Position::NorthSouth)?;
                let ew = table.pair_at(Position::EastWest)?;
                Some((*id, (ns, ew)))
            })
            .collect()
    }

    /// Board in play at each playing table
    #[must_use]
    pub fn current_boards(&self) -> BTreeMap<TableId, BoardNumber> {
        self.tables
            .iter()
            .filter(|(_, table)| table.status == TableStatus::Playing)
            .filter_map(|(id, table)| table.current_board().map(|board| (*id, board)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mitchell_config(pairs: u32) -> SectorConfig {
        SectorConfig {
            num_pairs: pairs,
            boards_per_group: 2,
            mitchell_switch_round: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_sector_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Sector>();
    }

    #[test]
    fn test_from_config_builds_tables() {
        let sector = Sector::from_config(&SectorConfig {
            relay_tables: 2,
            ..mitchell_config(10)
        })
        .unwrap();
        assert_eq!(sector.tables().count(), 7);
        assert_eq!(sector.tables().filter(|t| !t.is_playable()).count(), 2);
        assert_eq!(sector.planned_rounds(), 5);
        assert_eq!(sector.pairs().count(), 10);
        assert_eq!(sector.board_numbers().count(), 10);
        assert_eq!(sector.table(6).unwrap().to_string(), "_A6");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Sector::from_config(&mitchell_config(1)).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidConfig(_)));
    }

    #[test]
    fn test_plays_clean_mitchell() {
        let mut sector = Sector::from_config(&mitchell_config(10)).unwrap();
        sector.start().unwrap();
        assert_eq!(sector.current_pairs()[&1], (1, 6));
        assert_eq!(sector.current_boards()[&1], 1);

        // Two boards per group: the first deal leaves one more to play.
        assert!(sector.play_deal().unwrap());
        assert_eq!(sector.current_boards()[&1], 2);
        assert!(!sector.play_deal().unwrap());

        assert_eq!(sector.complete_round().unwrap(), SectorStatus::Active);
        assert_eq!(sector.current_round(), 2);
        assert_eq!(sector.current_pairs()[&1], (1, 10));

        while sector.play_round().unwrap() == SectorStatus::Active {}
        assert_eq!(sector.status(), SectorStatus::Finished);
        assert_eq!(sector.validator().opponents(1).unwrap().len(), 5);
        assert_eq!(sector.validator().boards_played(1).unwrap().len(), 10);
    }

    fn play_out(sector: &mut Sector) {
        sector.start().unwrap();
        while sector.play_round().unwrap() == SectorStatus::Active {}
        assert_eq!(sector.status(), SectorStatus::Finished);
    }

    #[test]
    fn test_default_config_plays_clean() {
        let mut sector = Sector::from_config(&SectorConfig::default()).unwrap();
        assert_eq!(sector.planned_rounds(), 5);
        play_out(&mut sector);
        for pair in 1..=10 {
            assert_eq!(sector.validator().opponents(pair).unwrap().len(), 5);
            assert_eq!(sector.validator().boards_played(pair).unwrap().len(), 15);
        }
    }

    #[test]
    fn test_howell_sectors_finish() {
        for (num_pairs, relay_tables) in [(8, 1), (10, 1), (10, 2)] {
            let config = SectorConfig {
                movement: RotationKind::Howell,
                num_pairs,
                relay_tables,
                boards_per_group: 2,
                ..Default::default()
            };
            let mut sector = Sector::from_config(&config).unwrap();
            assert_eq!(sector.planned_rounds(), num_pairs - 1);
            play_out(&mut sector);
            for pair in 1..=num_pairs {
                let validator = sector.validator();
                assert_eq!(validator.opponents(pair).unwrap().len(), num_pairs as usize - 1);
                assert_eq!(
                    validator.boards_played(pair).unwrap().len(),
                    2 * (num_pairs as usize - 1)
                );
            }
        }
    }

    #[test]
    fn test_rounds_past_board_groups_rejected() {
        let config = SectorConfig {
            rounds: Some(6),
            ..mitchell_config(10)
        };
        let err = Sector::from_config(&config).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidConfig(_)));
    }

    #[test]
    fn test_table_in_use_cannot_leave() {
        let mut sector = Sector::from_config(&mitchell_config(6)).unwrap();
        assert_eq!(
            sector.remove_table(1).unwrap_err(),
            TournamentError::TableInUse(1)
        );

        let spare = sector.add_tables(1)[0];
        let table = sector.remove_table(spare).unwrap();
        assert_eq!(table.sector, None);
        assert_eq!(table.origin_sector.as_deref(), Some("A"));
        assert_eq!(
            sector.remove_table(spare).unwrap_err(),
            TournamentError::UnknownTable(spare)
        );
    }

    #[test]
    fn test_insert_duplicate_table() {
        let mut sector = Sector::new("B");
        sector.add_tables(2);
        assert_eq!(
            sector.insert_table(Table::new(2)).unwrap_err(),
            TournamentError::DuplicateTable(2)
        );
        sector.insert_table(Table::new(7)).unwrap();
        assert_eq!(sector.table(7).unwrap().sector.as_deref(), Some("B"));
    }

    #[test]
    fn test_relay_numbering() {
        let mut sector = Sector::new("C");
        sector.add_tables(2);
        sector.add_relay_tables(1);
        sector.add_tables(1);

        sector.exclude_relay_tables_from_numbering();
        let names: Vec<String> = sector.tables().map(ToString::to_string).collect();
        assert_eq!(names, ["C1", "C2", "_C1", "C3"]);

        sector.restore_numbering();
        let names: Vec<String> = sector.tables().map(ToString::to_string).collect();
        assert_eq!(names, ["C1", "C2", "_C3", "C4"]);
    }

    #[test]
    fn test_start_requires_movement() {
        let mut sector = Sector::new("D");
        assert_eq!(
            sector.start().unwrap_err(),
            TournamentError::NoMovement("D".to_string())
        );
        assert!(matches!(
            sector.play_deal(),
            Err(TournamentError::InvalidStatus { .. })
        ));
    }
}
