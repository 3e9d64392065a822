//! Cumulative pairing and board checks.
//!
//! The validator remembers, for every pair, the boards it has played and the
//! pairs it has faced. A round is rejected as soon as a table would make a
//! pair replay a board or meet an old opponent again. State after an error
//! may be partially updated, so a failed tournament must stop rather than
//! retry the round.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::errors::{ValidationError, ValidationResult};
use crate::model::{BoardMap, BoardNumber, PairId, Position, SeatMap, TableId};

#[derive(Clone, Debug, Default)]
pub struct ValidationEngine {
    boards_played: HashMap<PairId, HashSet<BoardNumber>>,
    opponents: HashMap<PairId, HashSet<PairId>>,
}

impl ValidationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and record one round (or the part of it at some tables).
    ///
    /// Tables with fewer than two seated pairs are skipped. The board group
    /// played at a table is the head of its queue.
    pub fn validate_round(&mut self, seats: &SeatMap, boards: &BoardMap) -> ValidationResult<()> {
        let mut tables: BTreeMap<TableId, (Option<PairId>, Option<PairId>)> = BTreeMap::new();
        for (seat, pair) in seats {
            let entry = tables.entry(seat.table).or_default();
            match seat.position {
                Position::NorthSouth => entry.0 = Some(*pair),
                Position::EastWest => entry.1 = Some(*pair),
            }
        }

        for (table, pairs) in tables {
            let (Some(ns), Some(ew)) = pairs else {
                continue;
            };
            let group = boards
                .get(&table)
                .and_then(|queue| queue.front())
                .ok_or(ValidationError::MissingBoards(table))?;

            for &board in group.boards() {
                for pair in [ns, ew] {
                    if self.has_played(pair, board) {
                        return Err(ValidationError::BoardReplayed { pair, board });
                    }
                }
                self.boards_played.entry(ns).or_default().insert(board);
                self.boards_played.entry(ew).or_default().insert(board);
            }

            if self.has_met(ns, ew) {
                return Err(ValidationError::RepeatOpponent {
                    pair: ns,
                    opponent: ew,
                });
            }
            self.opponents.entry(ns).or_default().insert(ew);
            self.opponents.entry(ew).or_default().insert(ns);

            debug!("Table {table}: {ns} v {ew} on {group}");
        }
        Ok(())
    }

    #[must_use]
    pub fn has_played(&self, pair: PairId, board: BoardNumber) -> bool {
        self.boards_played
            .get(&pair)
            .is_some_and(|boards| boards.contains(&board))
    }

    #[must_use]
    pub fn has_met(&self, pair: PairId, opponent: PairId) -> bool {
        self.opponents
            .get(&pair)
            .is_some_and(|opponents| opponents.contains(&opponent))
    }

    /// Boards `pair` has played so far.
    #[must_use]
    pub fn boards_played(&self, pair: PairId) -> Option<&HashSet<BoardNumber>> {
        self.boards_played.get(&pair)
    }

    /// Pairs `pair` has faced so far.
    #[must_use]
    pub fn opponents(&self, pair: PairId) -> Option<&HashSet<PairId>> {
        self.opponents.get(&pair)
    }
}
