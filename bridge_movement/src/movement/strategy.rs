use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::errors::{MovementError, MovementResult};
use crate::model::{RoundNumber, Seat, TableId};

/// A pair moving from one seat to another between two rounds.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SeatMove {
    pub from: Seat,
    pub to: Seat,
}

impl SeatMove {
    #[must_use]
    pub const fn new(from: Seat, to: Seat) -> Self {
        Self { from, to }
    }
}

/// The head board group of `from` travelling to the back of `to`'s queue.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BoardMove {
    pub from: TableId,
    pub to: TableId,
}

impl BoardMove {
    #[must_use]
    pub const fn new(from: TableId, to: TableId) -> Self {
        Self { from, to }
    }
}

/// One transition shared by a set of rounds.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StrategyRule {
    pub seat_changes: Vec<SeatMove>,
    /// Applied in order; moves touching the same table compose.
    pub board_changes: Vec<BoardMove>,
    pub rounds: BTreeSet<RoundNumber>,
}

impl StrategyRule {
    pub fn new(
        seat_changes: Vec<SeatMove>,
        board_changes: Vec<BoardMove>,
        rounds: impl IntoIterator<Item = RoundNumber>,
    ) -> Self {
        Self {
            seat_changes,
            board_changes,
            rounds: rounds.into_iter().collect(),
        }
    }

    /// Tables named by any seat or board move of this rule.
    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.seat_changes
            .iter()
            .flat_map(|m| [m.from.table, m.to.table])
            .chain(self.board_changes.iter().flat_map(|m| [m.from, m.to]))
    }
}

/// Round-indexed transition table driving a [`MovementEngine`].
///
/// Every round is governed by at most one rule. A round that no rule
/// covers is a lookup error rather than an implicit "nothing moves".
///
/// [`MovementEngine`]: super::MovementEngine
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StrategyRule>", into = "Vec<StrategyRule>")]
pub struct MovementStrategy {
    rules: Vec<StrategyRule>,
    by_round: BTreeMap<RoundNumber, usize>,
}

impl MovementStrategy {
    pub fn new(rules: Vec<StrategyRule>) -> MovementResult<Self> {
        let mut by_round = BTreeMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            for &round in &rule.rounds {
                if round == 0 {
                    return Err(MovementError::InvalidRound);
                }
                if by_round.insert(round, idx).is_some() {
                    return Err(MovementError::OverlappingRounds(round));
                }
            }
        }
        Ok(Self { rules, by_round })
    }

    /// Seat and board moves that produce `round` from the round before it.
    pub fn lookup(&self, round: RoundNumber) -> MovementResult<(&[SeatMove], &[BoardMove])> {
        let idx = self
            .by_round
            .get(&round)
            .ok_or(MovementError::NoRuleForRound(round))?;
        let rule = &self.rules[*idx];
        Ok((&rule.seat_changes, &rule.board_changes))
    }

    #[must_use]
    pub fn rules(&self) -> &[StrategyRule] {
        &self.rules
    }

    #[must_use]
    pub fn covers(&self, round: RoundNumber) -> bool {
        self.by_round.contains_key(&round)
    }

    /// Highest round governed by any rule.
    #[must_use]
    pub fn last_round(&self) -> Option<RoundNumber> {
        self.by_round.keys().next_back().copied()
    }

    /// Every table referenced by the strategy.
    #[must_use]
    pub fn tables(&self) -> BTreeSet<TableId> {
        self.rules.iter().flat_map(StrategyRule::tables).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<StrategyRule>> for MovementStrategy {
    type Error = MovementError;

    fn try_from(rules: Vec<StrategyRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<MovementStrategy> for Vec<StrategyRule> {
    fn from(strategy: MovementStrategy) -> Self {
        strategy.rules
    }
}
