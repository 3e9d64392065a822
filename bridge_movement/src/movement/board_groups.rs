//! Closed-form board group rotation for simple sectors.
//!
//! Boards `1..=num_boards` are split into consecutive groups and every round
//! each group travels one table down (table 1 wraps to the last slot). When
//! there are more tables than groups, some tables sit out a round without
//! boards.

use std::collections::{BTreeMap, VecDeque};

use super::errors::{MovementError, MovementResult};
use crate::model::{
    BoardGroup, BoardGroupId, BoardMap, BoardNumber, ModelError, RoundNumber, TableId,
};

#[derive(Clone, Debug)]
pub struct BoardGroupMovement {
    num_boards: usize,
    num_tables: usize,
    groups: Vec<BoardGroup>,
}

impl BoardGroupMovement {
    /// Without a `group_size` the boards are split evenly across the tables,
    /// earlier groups taking one extra board each until the remainder runs out.
    pub fn new(
        num_boards: usize,
        num_tables: usize,
        group_size: Option<usize>,
    ) -> MovementResult<Self> {
        if num_tables == 0 {
            return Err(MovementError::ZeroTables);
        }
        if num_boards == 0 {
            return Err(MovementError::ZeroBoards);
        }

        let sizes: Vec<usize> = match group_size {
            None => {
                let base = num_boards / num_tables;
                let rem = num_boards % num_tables;
                (0..num_tables)
                    .map(|i| base + usize::from(i < rem))
                    .filter(|&size| size > 0)
                    .collect()
            }
            Some(0) => return Err(ModelError::ZeroGroupSize.into()),
            Some(size) => {
                let mut sizes = vec![size; num_boards / size];
                if num_boards % size > 0 {
                    sizes.push(num_boards % size);
                }
                sizes
            }
        };

        let mut groups = Vec::with_capacity(sizes.len());
        let mut next: BoardNumber = 1;
        for (idx, size) in sizes.into_iter().enumerate() {
            let boards: Vec<BoardNumber> = (next..next + size as BoardNumber).collect();
            next += size as BoardNumber;
            groups.push(BoardGroup::new(idx as BoardGroupId + 1, boards)?);
        }

        Ok(Self {
            num_boards,
            num_tables,
            groups,
        })
    }

    #[must_use]
    pub fn groups(&self) -> &[BoardGroup] {
        &self.groups
    }

    #[must_use]
    pub fn num_boards(&self) -> usize {
        self.num_boards
    }

    #[must_use]
    pub fn num_tables(&self) -> usize {
        self.num_tables
    }

    /// Group held by each table in `round`. Tables whose slot has no group
    /// are left out.
    pub fn groups_for_round(
        &self,
        round: RoundNumber,
    ) -> MovementResult<BTreeMap<TableId, &BoardGroup>> {
        if round == 0 {
            return Err(MovementError::InvalidRound);
        }
        let modulus = self.num_tables.max(self.groups.len());
        let shift = (round as usize - 1) % modulus;

        Ok((0..self.num_tables)
            .filter_map(|i| {
                let slot = (i + modulus - shift) % modulus;
                self.groups
                    .get(slot)
                    .map(|group| (i as TableId + 1, group))
            })
            .collect())
    }

    pub fn boards_for_round(
        &self,
        round: RoundNumber,
    ) -> MovementResult<BTreeMap<TableId, &[BoardNumber]>> {
        Ok(self
            .groups_for_round(round)?
            .into_iter()
            .map(|(table, group)| (table, group.boards()))
            .collect())
    }

    pub fn first_board_for_round(
        &self,
        round: RoundNumber,
    ) -> MovementResult<BTreeMap<TableId, BoardNumber>> {
        Ok(self
            .groups_for_round(round)?
            .into_iter()
            .map(|(table, group)| (table, group.first_board()))
            .collect())
    }

    pub fn board_group_id_for_round(
        &self,
        round: RoundNumber,
    ) -> MovementResult<BTreeMap<TableId, BoardGroupId>> {
        Ok(self
            .groups_for_round(round)?
            .into_iter()
            .map(|(table, group)| (table, group.id()))
            .collect())
    }

    /// Round state in the shape the validation engine consumes.
    pub fn board_map_for_round(&self, round: RoundNumber) -> MovementResult<BoardMap> {
        Ok(self
            .groups_for_round(round)?
            .into_iter()
            .map(|(table, group)| (table, VecDeque::from([group.clone()])))
            .collect())
    }

    /// Where each group travels between rounds `a` and `b`. Groups missing
    /// from either round are omitted.
    pub fn board_group_movement_between(
        &self,
        a: RoundNumber,
        b: RoundNumber,
    ) -> MovementResult<BTreeMap<BoardGroupId, (TableId, TableId)>> {
        let to: BTreeMap<BoardGroupId, TableId> = self
            .board_group_id_for_round(b)?
            .into_iter()
            .map(|(table, group)| (group, table))
            .collect();

        Ok(self
            .board_group_id_for_round(a)?
            .into_iter()
            .filter_map(|(from, group)| to.get(&group).map(|&to| (group, (from, to))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let movement = BoardGroupMovement::new(16, 4, None).unwrap();
        assert_eq!(movement.groups().len(), 4);
        assert!(movement.groups().iter().all(|g| g.len() == 4));
        assert_eq!(movement.groups()[3].boards(), &[13, 14, 15, 16]);
    }

    #[test]
    fn test_groups_rotate_down() {
        let movement = BoardGroupMovement::new(16, 4, None).unwrap();

        let round1 = movement.board_group_id_for_round(1).unwrap();
        assert_eq!(round1[&1], 1);
        assert_eq!(round1[&4], 4);

        let round2 = movement.board_group_id_for_round(2).unwrap();
        assert_eq!(round2[&1], 4);
        assert_eq!(round2[&2], 1);

        let first = movement.first_board_for_round(2).unwrap();
        assert_eq!(first[&1], 13);

        // Full cycle returns to the start.
        assert_eq!(movement.board_group_id_for_round(5).unwrap(), round1);
    }

    #[test]
    fn test_remainder_goes_to_first_groups() {
        let movement = BoardGroupMovement::new(10, 4, None).unwrap();
        let sizes: Vec<usize> = movement.groups().iter().map(BoardGroup::len).collect();
        assert_eq!(sizes, [3, 3, 2, 2]);
        assert_eq!(movement.groups()[2].boards(), &[7, 8]);
    }

    #[test]
    fn test_explicit_group_size() {
        let movement = BoardGroupMovement::new(7, 5, Some(3)).unwrap();
        let sizes: Vec<usize> = movement.groups().iter().map(BoardGroup::len).collect();
        assert_eq!(sizes, [3, 3, 1]);

        // Five slots, three groups: tables 4 and 5 sit out round 1.
        let round1 = movement.boards_for_round(1).unwrap();
        assert_eq!(round1.len(), 3);
        assert!(!round1.contains_key(&4));

        let round2 = movement.board_group_id_for_round(2).unwrap();
        assert_eq!(round2.get(&1), None);
        assert_eq!(round2[&2], 1);
    }

    #[test]
    fn test_more_tables_than_boards() {
        let movement = BoardGroupMovement::new(2, 4, None).unwrap();
        assert_eq!(movement.groups().len(), 2);
        assert_eq!(movement.boards_for_round(1).unwrap().len(), 2);
    }

    #[test]
    fn test_movement_between_rounds() {
        let movement = BoardGroupMovement::new(12, 3, None).unwrap();
        let moves = movement.board_group_movement_between(1, 2).unwrap();
        assert_eq!(moves[&1], (1, 2));
        assert_eq!(moves[&3], (3, 1));
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            BoardGroupMovement::new(0, 4, None).unwrap_err(),
            MovementError::ZeroBoards
        );
        assert_eq!(
            BoardGroupMovement::new(8, 0, None).unwrap_err(),
            MovementError::ZeroTables
        );
        assert_eq!(
            BoardGroupMovement::new(8, 2, Some(0)).unwrap_err(),
            MovementError::Model(ModelError::ZeroGroupSize)
        );

        let movement = BoardGroupMovement::new(8, 2, None).unwrap();
        assert_eq!(
            movement.boards_for_round(0).unwrap_err(),
            MovementError::InvalidRound
        );
    }
}
