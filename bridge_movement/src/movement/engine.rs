//! Strategy-driven movement engine.
//!
//! Round 1 comes from an explicit or generated initial sitting and board
//! placement. Every later round applies the [`MovementStrategy`] rule for
//! that round to the previous round:
//!
//! - seats are read from the frozen previous round and written into a fresh
//!   map, so moves within a round never observe each other;
//! - board groups are FIFO queues mutated in place, so board moves touching
//!   the same table compose in the order they are listed.

use log::{debug, info, warn};
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use super::{
    errors::{MovementError, MovementResult},
    strategy::MovementStrategy,
};
use crate::model::{
    BoardGroup, BoardMap, Pair, PairId, RoundNumber, Seat, SeatMap, TableId, entities::seat_entries,
};
use crate::tournament::Table;

/// Where board groups that outnumber the tables are parked.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Every surplus group goes to the last relay table.
    #[default]
    LastRelay,
    /// Every surplus group goes to the first relay table.
    FirstRelay,
    /// Surplus groups are dealt across the relay tables in order.
    RoundRobin,
}

/// Seats and board queues of a single round.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundState {
    #[serde(with = "seat_entries")]
    pub seats: SeatMap,
    pub boards: BoardMap,
}

impl RoundState {
    #[must_use]
    pub fn pair_at(&self, seat: Seat) -> Option<PairId> {
        self.seats.get(&seat).copied()
    }

    /// Group played at `table` this round.
    #[must_use]
    pub fn playing_group(&self, table: TableId) -> Option<&BoardGroup> {
        self.boards.get(&table).and_then(VecDeque::front)
    }

    /// The part of this round that concerns only `tables`.
    #[must_use]
    pub fn restricted_to(&self, tables: &BTreeSet<TableId>) -> Self {
        Self {
            seats: self
                .seats
                .iter()
                .filter(|(seat, _)| tables.contains(&seat.table))
                .map(|(seat, pair)| (*seat, *pair))
                .collect(),
            boards: self
                .boards
                .iter()
                .filter(|(table, _)| tables.contains(table))
                .map(|(table, queue)| (*table, queue.clone()))
                .collect(),
        }
    }

    fn board_group_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.boards.values().flatten().map(BoardGroup::id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Deal `items` one per table, playable tables first and then relays, and
/// park the rest on relays according to `policy`.
pub(crate) fn initial_placement<T: Clone>(
    playable: &[TableId],
    relays: &[TableId],
    items: &[T],
    policy: OverflowPolicy,
) -> MovementResult<BTreeMap<TableId, VecDeque<T>>> {
    let tables: Vec<TableId> = playable.iter().chain(relays).copied().collect();
    if items.len() != tables.len() && relays.is_empty() {
        return Err(MovementError::NoRelayTable {
            groups: items.len(),
            tables: tables.len(),
        });
    }

    let mut placement: BTreeMap<TableId, VecDeque<T>> = BTreeMap::new();
    for (table, item) in tables.iter().zip(items) {
        placement.entry(*table).or_default().push_back(item.clone());
    }
    for (idx, item) in items.iter().skip(tables.len()).enumerate() {
        let relay = match policy {
            OverflowPolicy::LastRelay => relays[relays.len() - 1],
            OverflowPolicy::FirstRelay => relays[0],
            OverflowPolicy::RoundRobin => relays[idx % relays.len()],
        };
        placement.entry(relay).or_default().push_back(item.clone());
    }
    Ok(placement)
}

#[derive(Clone, Debug)]
pub struct MovementEngine {
    playable: Vec<TableId>,
    relays: Vec<TableId>,
    pairs: BTreeMap<PairId, Pair>,
    board_groups: Vec<BoardGroup>,
    strategy: MovementStrategy,
    initial_sitting: Option<SeatMap>,
    initial_placement: Option<BoardMap>,
    rounds: Vec<RoundState>,
}

impl MovementEngine {
    /// Fails when the strategy mentions a table that is not in `tables`.
    pub fn new(
        tables: &[Table],
        pairs: Vec<Pair>,
        board_groups: Vec<BoardGroup>,
        strategy: MovementStrategy,
    ) -> MovementResult<Self> {
        let known: BTreeSet<TableId> = tables.iter().map(Table::id).collect();
        if let Some(unknown) = strategy.tables().into_iter().find(|t| !known.contains(t)) {
            return Err(MovementError::UnknownTable(unknown));
        }

        let (playable, relays): (Vec<&Table>, Vec<&Table>) =
            tables.iter().partition(|table| table.is_playable());

        Ok(Self {
            playable: playable.into_iter().map(Table::id).collect(),
            relays: relays.into_iter().map(Table::id).collect(),
            pairs: pairs.into_iter().map(|pair| (pair.id, pair)).collect(),
            board_groups,
            strategy,
            initial_sitting: None,
            initial_placement: None,
            rounds: Vec::new(),
        })
    }

    fn ensure_not_constructed(&self) -> MovementResult<()> {
        if self.rounds.is_empty() {
            Ok(())
        } else {
            Err(MovementError::AlreadyConstructed)
        }
    }

    fn ensure_known_table(&self, table: TableId) -> MovementResult<()> {
        if self.playable.contains(&table) || self.relays.contains(&table) {
            Ok(())
        } else {
            Err(MovementError::UnknownTable(table))
        }
    }

    pub fn set_initial_sitting(&mut self, sitting: SeatMap) -> MovementResult<()> {
        self.ensure_not_constructed()?;
        let mut seated = HashSet::new();
        for (seat, pair) in &sitting {
            self.ensure_known_table(seat.table)?;
            if !self.pairs.contains_key(pair) {
                return Err(MovementError::UnknownPair(*pair));
            }
            if !seated.insert(*pair) {
                return Err(MovementError::PairSeatedTwice(*pair));
            }
        }
        self.initial_sitting = Some(sitting);
        Ok(())
    }

    pub fn set_initial_placement(&mut self, placement: BoardMap) -> MovementResult<()> {
        self.ensure_not_constructed()?;
        for table in placement.keys() {
            self.ensure_known_table(*table)?;
        }
        self.initial_placement = Some(placement);
        Ok(())
    }

    /// Seats pairs in id order, two per playable table.
    pub fn autogenerate_initial_sitting(&mut self) -> MovementResult<()> {
        let order: Vec<PairId> = self.pairs.keys().copied().collect();
        self.fill_seats(&order)
    }

    /// Same fill as [`autogenerate_initial_sitting`](Self::autogenerate_initial_sitting)
    /// over a random draw of the pairs.
    pub fn shuffled_initial_sitting<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MovementResult<()> {
        let mut order: Vec<PairId> = self.pairs.keys().copied().collect();
        order.shuffle(rng);
        self.fill_seats(&order)
    }

    fn fill_seats(&mut self, order: &[PairId]) -> MovementResult<()> {
        self.ensure_not_constructed()?;
        let seats = self.playable.len() * 2;
        if order.len() > seats {
            return Err(MovementError::TooManyPairs {
                pairs: order.len(),
                seats,
            });
        }

        let mut sitting = SeatMap::new();
        for (table, chunk) in self.playable.iter().zip(order.chunks(2)) {
            sitting.insert(Seat::ns(*table), chunk[0]);
            if let Some(&ew) = chunk.get(1) {
                sitting.insert(Seat::ew(*table), ew);
            }
        }
        self.initial_sitting = Some(sitting);
        Ok(())
    }

    /// One group per table in table order (playable tables first, then
    /// relays). Surplus groups are parked on relays according to `policy`.
    pub fn autogenerate_initial_placement(&mut self, policy: OverflowPolicy) -> MovementResult<()> {
        self.ensure_not_constructed()?;
        let placement = initial_placement(&self.playable, &self.relays, &self.board_groups, policy)?;
        let tables = self.playable.len() + self.relays.len();
        for group in self.board_groups.iter().skip(tables) {
            warn!("Board group {} overflows to a relay table", group.id());
        }
        self.initial_placement = Some(placement);
        Ok(())
    }

    /// Compute rounds up to `rounds`. Already computed rounds are kept as
    /// they are, so repeated calls only extend the horizon.
    pub fn construct(&mut self, rounds: RoundNumber) -> MovementResult<()> {
        if rounds == 0 || self.rounds_computed() >= rounds {
            return Ok(());
        }

        if self.rounds.is_empty() {
            if self.initial_sitting.is_none() {
                self.autogenerate_initial_sitting()?;
            }
            if self.initial_placement.is_none() {
                self.autogenerate_initial_placement(OverflowPolicy::default())?;
            }
            self.rounds.push(RoundState {
                seats: self.initial_sitting.clone().unwrap_or_default(),
                boards: self.initial_placement.clone().unwrap_or_default(),
            });
        }

        while self.rounds_computed() < rounds {
            let round = self.rounds_computed() + 1;
            let next = match self.rounds.last() {
                Some(previous) => self.advance(previous, round)?,
                None => break,
            };
            self.rounds.push(next);
        }

        info!("Movement constructed through round {rounds}");
        Ok(())
    }

    fn advance(&self, previous: &RoundState, round: RoundNumber) -> MovementResult<RoundState> {
        let (seat_moves, board_moves) = self.strategy.lookup(round)?;
        debug!(
            "Round {round}: {} seat moves, {} board moves",
            seat_moves.len(),
            board_moves.len()
        );

        let targeted: BTreeSet<Seat> = seat_moves.iter().map(|m| m.to).collect();
        let mut seats: SeatMap = previous
            .seats
            .iter()
            .filter(|(seat, _)| !targeted.contains(seat))
            .map(|(seat, pair)| (*seat, *pair))
            .collect();
        for seat_move in seat_moves {
            match previous.seats.get(&seat_move.from) {
                Some(&pair) => {
                    seats.insert(seat_move.to, pair);
                }
                None => debug!("Round {round}: seat {} is empty", seat_move.from),
            }
        }

        let mut boards = previous.boards.clone();
        for board_move in board_moves {
            let Some(group) = boards
                .get_mut(&board_move.from)
                .and_then(VecDeque::pop_front)
            else {
                warn!(
                    "Round {round}: no board group at table {} to move to table {}",
                    board_move.from, board_move.to
                );
                continue;
            };
            boards.entry(board_move.to).or_default().push_back(group);
        }
        boards.retain(|_, queue| !queue.is_empty());

        Ok(RoundState { seats, boards })
    }

    pub fn round_state(&self, round: RoundNumber) -> MovementResult<&RoundState> {
        round
            .checked_sub(1)
            .and_then(|idx| self.rounds.get(idx as usize))
            .ok_or(MovementError::RoundNotComputed {
                round,
                computed: self.rounds_computed(),
            })
    }

    pub fn sitting_for_round(&self, round: RoundNumber) -> MovementResult<&SeatMap> {
        self.round_state(round).map(|state| &state.seats)
    }

    pub fn boards_for_round(&self, round: RoundNumber) -> MovementResult<&BoardMap> {
        self.round_state(round).map(|state| &state.boards)
    }

    #[must_use]
    pub fn rounds_computed(&self) -> RoundNumber {
        self.rounds.len() as RoundNumber
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundState] {
        &self.rounds
    }

    #[must_use]
    pub fn playable_tables(&self) -> &[TableId] {
        &self.playable
    }

    #[must_use]
    pub fn relay_tables(&self) -> &[TableId] {
        &self.relays
    }

    #[must_use]
    pub fn uses_table(&self, table: TableId) -> bool {
        self.playable.contains(&table) || self.relays.contains(&table)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }

    #[must_use]
    pub fn board_groups(&self) -> &[BoardGroup] {
        &self.board_groups
    }

    #[must_use]
    pub fn strategy(&self) -> &MovementStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn initial_sitting(&self) -> Option<&SeatMap> {
        self.initial_sitting.as_ref()
    }

    /// True when every computed round holds the same multiset of board
    /// groups as round 1.
    #[must_use]
    pub fn boards_conserved(&self) -> bool {
        let Some(first) = self.rounds.first() else {
            return true;
        };
        let expected = first.board_group_ids();
        self.rounds
            .iter()
            .all(|state| state.board_group_ids() == expected)
    }
}
