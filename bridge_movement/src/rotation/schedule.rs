use log::debug;
use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    sync::Arc,
};

use super::{
    errors::{RotationError, RotationResult},
    generator::{Rotation, RotationGenerator},
};
use crate::model::{BoardGroup, BoardGroupId, Pair, PairId, RoundNumber, Seat, SeatMap, TableId};
use crate::movement::{
    BoardMove, MovementEngine, MovementError, MovementStrategy, OverflowPolicy, SeatMove,
    StrategyRule, engine::initial_placement,
};
use crate::tournament::Table;

/// Board queues keyed by table, holding group numbers.
type GroupQueues = BTreeMap<TableId, VecDeque<BoardGroupId>>;

/// A rotation together with its memoized round schedule and board plan.
///
/// Parameters never change after construction, so each is computed at most
/// once and shared afterwards.
#[derive(Clone, Debug)]
pub struct RotationSchedule {
    rotation: Rotation,
    overflow_policy: OverflowPolicy,
    rounds: Option<Arc<[SeatMap]>>,
    board_plan: Option<Arc<[Vec<BoardGroupId>]>>,
}

impl RotationSchedule {
    #[must_use]
    pub fn new(rotation: Rotation) -> Self {
        Self {
            rotation,
            overflow_policy: OverflowPolicy::default(),
            rounds: None,
            board_plan: None,
        }
    }

    /// Where surplus board groups start out.
    #[must_use]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    #[must_use]
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    /// Full schedule, computed on first use.
    pub fn compute(&mut self) -> Arc<[SeatMap]> {
        if let Some(rounds) = &self.rounds {
            return Arc::clone(rounds);
        }
        let rounds: Arc<[SeatMap]> = self.rotation.pair_rounds().into();
        debug!("{} schedule has {} rounds", self.rotation, rounds.len());
        self.rounds = Some(Arc::clone(&rounds));
        rounds
    }

    /// Board group per generator table for every round of the schedule,
    /// computed on first use.
    pub fn board_plan(&mut self) -> RotationResult<Arc<[Vec<BoardGroupId>]>> {
        if let Some(plan) = &self.board_plan {
            return Ok(Arc::clone(plan));
        }
        let rounds = self.compute();
        let plan: Arc<[Vec<BoardGroupId>]> = self.rotation.board_plan(&rounds)?.into();
        debug!(
            "{} board plan deals {} groups",
            self.rotation,
            self.rotation.num_board_groups()
        );
        self.board_plan = Some(Arc::clone(&plan));
        Ok(plan)
    }

    pub fn round_count(&mut self) -> RoundNumber {
        self.compute().len() as RoundNumber
    }

    /// Seat map of `round`. With `tables`, generator table `i` is renamed
    /// to `tables[i - 1]`.
    pub fn get_round_sitting(
        &mut self,
        round: RoundNumber,
        tables: Option<&[TableId]>,
    ) -> RotationResult<SeatMap> {
        let rounds = self.compute();
        let sitting = round
            .checked_sub(1)
            .and_then(|idx| rounds.get(idx as usize))
            .ok_or(RotationError::RoundOutOfRange {
                round,
                rounds: rounds.len() as RoundNumber,
            })?;

        let Some(tables) = tables else {
            return Ok(sitting.clone());
        };
        self.check_table_count(tables)?;
        Ok(sitting
            .iter()
            .map(|(seat, pair)| {
                let table = tables[seat.table as usize - 1];
                (Seat::new(table, seat.position), *pair)
            })
            .collect())
    }

    fn check_table_count(&self, tables: &[TableId]) -> RotationResult<()> {
        let expected = self.rotation.num_tables() as usize;
        if tables.len() == expected {
            Ok(())
        } else {
            Err(RotationError::TableCountMismatch {
                expected,
                actual: tables.len(),
            })
        }
    }

    /// Strategy replaying rounds `1..=rounds` of the schedule on concrete
    /// tables, with the rotation's board groups dealt as the engine deals
    /// them. Rounds sharing the same moves share one rule.
    pub fn movement_strategy(
        &mut self,
        playable: &[TableId],
        relays: &[TableId],
        rounds: RoundNumber,
    ) -> RotationResult<MovementStrategy> {
        let groups = self.rotation.num_board_groups() as usize;
        self.strategy_for(playable, relays, groups, rounds)
    }

    fn strategy_for(
        &mut self,
        playable: &[TableId],
        relays: &[TableId],
        groups: usize,
        rounds: RoundNumber,
    ) -> RotationResult<MovementStrategy> {
        self.check_table_count(playable)?;
        let available = self.round_count();
        if rounds > available {
            return Err(RotationError::RoundOutOfRange {
                round: rounds,
                rounds: available,
            });
        }

        let mut rules: Vec<StrategyRule> = Vec::new();
        if rounds >= 2 {
            let plan = self.board_plan()?;
            let slots: Vec<BoardGroupId> = (1..=groups as BoardGroupId).collect();
            let mut queues = initial_placement(playable, relays, &slots, self.overflow_policy)?;

            for round in 2..=rounds {
                let previous = self.get_round_sitting(round - 1, Some(playable))?;
                let current = self.get_round_sitting(round, Some(playable))?;
                let seat_of: BTreeMap<PairId, Seat> =
                    previous.iter().map(|(seat, pair)| (*pair, *seat)).collect();

                let seat_changes: Vec<SeatMove> = current
                    .iter()
                    .filter(|(seat, pair)| previous.get(*seat) != Some(*pair))
                    .filter_map(|(seat, pair)| seat_of.get(pair).map(|from| SeatMove::new(*from, *seat)))
                    .collect();
                let wanted = &plan[round as usize - 1];
                let board_changes = route_board_groups(&mut queues, playable, relays, wanted)?;

                match rules.iter_mut().find(|rule| {
                    rule.seat_changes == seat_changes && rule.board_changes == board_changes
                }) {
                    Some(rule) => {
                        rule.rounds.insert(round);
                    }
                    None => rules.push(StrategyRule::new(seat_changes, board_changes, [round])),
                }
            }
        }

        debug!(
            "{} strategy: {} rules over {rounds} rounds",
            self.rotation,
            rules.len()
        );
        Ok(MovementStrategy::new(rules)?)
    }

    /// Engine seated with round 1 of the schedule on the playable tables, in
    /// the order given. Seats of pairs missing from `pairs` (a bye) stay
    /// empty. Board groups are placed by the schedule's overflow policy.
    pub fn movement_engine(
        &mut self,
        tables: &[Table],
        pairs: Vec<Pair>,
        board_groups: Vec<BoardGroup>,
        rounds: RoundNumber,
    ) -> RotationResult<MovementEngine> {
        let needed = self.rotation.num_board_groups() as usize;
        if board_groups.len() < needed {
            return Err(RotationError::TooFewBoardGroups {
                needed,
                actual: board_groups.len(),
            });
        }

        let (playable, relays): (Vec<&Table>, Vec<&Table>) =
            tables.iter().partition(|table| table.is_playable());
        let playable: Vec<TableId> = playable.into_iter().map(Table::id).collect();
        let relays: Vec<TableId> = relays.into_iter().map(Table::id).collect();

        let strategy = self.strategy_for(&playable, &relays, board_groups.len(), rounds)?;
        let known: HashSet<PairId> = pairs.iter().map(|pair| pair.id).collect();

        let mut sitting = self.get_round_sitting(1, Some(&playable))?;
        sitting.retain(|_, pair| known.contains(pair));

        let mut engine = MovementEngine::new(tables, pairs, board_groups, strategy)?;
        engine.set_initial_sitting(sitting)?;
        engine.autogenerate_initial_placement(self.overflow_policy)?;
        Ok(engine)
    }
}

/// Board moves that leave `wanted[i]` alone at `playable[i]`.
///
/// Every playable table first passes its group to the table that plays it
/// next, keeps it, or parks it on the least loaded relay. Each relay then
/// cycles its queue, sending wanted groups on and putting the rest back.
fn route_board_groups(
    queues: &mut GroupQueues,
    playable: &[TableId],
    relays: &[TableId],
    wanted: &[BoardGroupId],
) -> RotationResult<Vec<BoardMove>> {
    let target: BTreeMap<BoardGroupId, TableId> =
        wanted.iter().copied().zip(playable.iter().copied()).collect();
    let mut moves = Vec::new();

    for &table in playable {
        let Some(&head) = queues.get(&table).and_then(VecDeque::front) else {
            continue;
        };
        let to = match target.get(&head) {
            Some(&to) if to == table => continue,
            Some(&to) => to,
            None => relays
                .iter()
                .copied()
                .min_by_key(|relay| queues.get(relay).map_or(0, VecDeque::len))
                .ok_or_else(|| MovementError::NoRelayTable {
                    groups: queues.values().map(VecDeque::len).sum(),
                    tables: playable.len(),
                })?,
        };
        move_head(queues, table, to, &mut moves);
    }

    for &relay in relays {
        while queues
            .get(&relay)
            .is_some_and(|queue| queue.iter().any(|group| target.contains_key(group)))
        {
            let Some(&head) = queues.get(&relay).and_then(VecDeque::front) else {
                break;
            };
            let to = target.get(&head).copied().unwrap_or(relay);
            move_head(queues, relay, to, &mut moves);
        }
    }
    Ok(moves)
}

fn move_head(queues: &mut GroupQueues, from: TableId, to: TableId, moves: &mut Vec<BoardMove>) {
    if let Some(group) = queues.get_mut(&from).and_then(VecDeque::pop_front) {
        queues.entry(to).or_default().push_back(group);
        moves.push(BoardMove::new(from, to));
    }
}

impl From<Rotation> for RotationSchedule {
    fn from(rotation: Rotation) -> Self {
        Self::new(rotation)
    }
}
