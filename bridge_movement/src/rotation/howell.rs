//! Howell movement.
//!
//! The highest numbered pair stays at table 1 North-South. Everyone else
//! walks a loop around the room: up the North-South seats of tables 2..n,
//! then back down the East-West seats of tables n..1, one seat per round.

use super::{
    errors::{RotationError, RotationResult},
    generator::{BoardPlan, RotationGenerator},
};
use crate::model::{PairId, Seat, SeatMap};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HowellRotation {
    num_pairs: u32,
    num_tables: u32,
}

impl HowellRotation {
    pub fn new(num_pairs: u32) -> RotationResult<Self> {
        if num_pairs == 0 {
            return Err(RotationError::TooFewPairs(num_pairs));
        }
        if num_pairs % 2 != 0 {
            return Err(RotationError::OddPairCount(num_pairs));
        }
        Ok(Self {
            num_pairs,
            num_tables: num_pairs / 2,
        })
    }

    #[must_use]
    pub fn stationary_pair(&self) -> PairId {
        self.num_pairs
    }

    /// Seat at loop position `pos`. Position 0 is the stationary seat.
    fn seat_at(&self, pos: u32) -> Seat {
        let n = self.num_tables;
        if pos < n {
            Seat::ns(pos + 1)
        } else {
            Seat::ew(2 * n - pos)
        }
    }
}

impl RotationGenerator for HowellRotation {
    fn name(&self) -> &'static str {
        "howell"
    }

    fn num_pairs(&self) -> u32 {
        self.num_pairs
    }

    fn num_tables(&self) -> u32 {
        self.num_tables
    }

    fn initial_round(&self) -> SeatMap {
        // Wheel is [2, 3, .., N-1, 1] so pair 1 faces the stationary pair.
        let wheel = (2..self.num_pairs).chain([1]);
        std::iter::once(self.stationary_pair())
            .chain(wheel)
            .enumerate()
            .map(|(pos, pair)| (self.seat_at(pos as u32), pair))
            .collect()
    }

    fn step(&self, previous: &SeatMap) -> SeatMap {
        let wheel_len = self.num_pairs - 1;
        let mut next = SeatMap::new();
        if let Some(&stationary) = previous.get(&self.seat_at(0)) {
            next.insert(self.seat_at(0), stationary);
        }
        for pos in 1..=wheel_len {
            let from = pos % wheel_len + 1;
            if let Some(&pair) = previous.get(&self.seat_at(from)) {
                next.insert(self.seat_at(pos), pair);
            }
        }
        next
    }

    fn num_board_groups(&self) -> u32 {
        self.num_pairs - 1
    }

    /// Every pair meets every group exactly once, which is a Room square
    /// over the rounds. None exists for 2 or 3 tables.
    fn board_plan(&self, rounds: &[SeatMap]) -> RotationResult<BoardPlan> {
        let columns = self
            .cyclic_columns(rounds)
            .or_else(|| self.searched_columns(rounds))
            .ok_or(RotationError::NoBoardPlan(self.num_tables))?;
        Ok(number_groups(&columns, self.num_board_groups()))
    }
}

/// Upper bound on search nodes before a plan is given up.
const SEARCH_BUDGET: u32 = 200_000;

impl HowellRotation {
    fn matches(&self, round: &SeatMap) -> Vec<(PairId, PairId)> {
        (1..=self.num_tables)
            .filter_map(|t| Some((*round.get(&Seat::ns(t))?, *round.get(&Seat::ew(t))?)))
            .collect()
    }

    /// Wheel pairs as residues mod `2n - 1`, numbered by their starting
    /// seat on the wheel.
    fn residue(&self, pair: PairId) -> u32 {
        if pair == 1 { self.num_pairs - 2 } else { pair - 2 }
    }

    /// Round `g` of the wheel seats `{g + x, g - x}` against each other and
    /// `g` against the stationary pair. Given an adder `a` for that
    /// pattern, match `{g + x, g - x}` plays group `g + a[x]` and the
    /// stationary match plays group `g`.
    fn cyclic_columns(&self, rounds: &[SeatMap]) -> Option<BoardPlan> {
        let l = self.num_board_groups();
        let half = l / 2;
        let adder = AdderSearch::new(l).solve()?;
        let stationary = self.stationary_pair();

        let mut columns = Vec::with_capacity(rounds.len());
        for round in rounds {
            let matches = self.matches(round);
            let g = matches.iter().find_map(|&(ns, ew)| {
                (ns == stationary).then(|| self.residue(ew))
            })?;
            let mut row = Vec::with_capacity(matches.len());
            for (ns, ew) in matches {
                if ns == stationary {
                    row.push(g);
                    continue;
                }
                let mut x = (self.residue(ns) + l - g) % l;
                if x > half {
                    x = (self.residue(ew) + l - g) % l;
                }
                row.push((g + adder.get(x as usize).copied()?) % l);
            }
            columns.push(row);
        }
        Some(columns)
    }

    /// Group by group search over the matches, used where no adder exists.
    fn searched_columns(&self, rounds: &[SeatMap]) -> Option<BoardPlan> {
        let l = self.num_board_groups() as usize;
        let stationary = self.stationary_pair();
        let mut search = MatchSearch::new(l, self.num_pairs as usize);
        let mut columns: BoardPlan = Vec::with_capacity(rounds.len());

        for (idx, round) in rounds.iter().enumerate() {
            let mut row = Vec::new();
            for (table, (ns, ew)) in self.matches(round).into_iter().enumerate() {
                // The stationary pair sees group r in round r.
                if ns == stationary {
                    search.assign(idx, ns as usize, ew as usize, idx % l);
                    row.push((idx % l) as u32);
                } else {
                    search.open.push(OpenMatch {
                        round: idx,
                        table,
                        pairs: (ns as usize, ew as usize),
                    });
                    row.push(0);
                }
            }
            columns.push(row);
        }

        for (found, column) in search.solve()? {
            columns[found.round][found.table] = column as u32;
        }
        Some(columns)
    }
}

/// Renumber columns so round 1 plays group `t` at table `t`; the rest
/// follow in column order.
fn number_groups(columns: &BoardPlan, groups: u32) -> BoardPlan {
    let mut group_of = vec![0; groups as usize];
    let mut next = 1;
    for &column in columns.first().into_iter().flatten() {
        group_of[column as usize] = next;
        next += 1;
    }
    for group in group_of.iter_mut().filter(|group| **group == 0) {
        *group = next;
        next += 1;
    }
    columns
        .iter()
        .map(|row| row.iter().map(|&column| group_of[column as usize]).collect())
        .collect()
}

/// Backtracking search for an adder of the patterned starter in `Z_l`:
/// distinct non-zero `a[x]` for `x` in `1..=l/2` such that every `x - a[x]`
/// and `-x - a[x]` is non-zero and distinct.
struct AdderSearch {
    l: u32,
    adder: Vec<u32>,
    adder_used: Vec<bool>,
    residue_used: Vec<bool>,
    nodes: u32,
}

impl AdderSearch {
    fn new(l: u32) -> Self {
        let size = l as usize;
        Self {
            l,
            adder: vec![0; size / 2 + 1],
            adder_used: vec![false; size],
            residue_used: vec![false; size],
            nodes: 0,
        }
    }

    fn solve(mut self) -> Option<Vec<u32>> {
        let mut open: Vec<u32> = (1..=self.l / 2).collect();
        self.extend(&mut open).then_some(self.adder)
    }

    fn residues(&self, x: u32, a: u32) -> (usize, usize) {
        let l = self.l;
        (((x + l - a) % l) as usize, ((2 * l - x - a) % l) as usize)
    }

    fn options(&self, x: u32) -> Vec<u32> {
        (1..self.l)
            .filter(|&a| {
                let (up, down) = self.residues(x, a);
                !self.adder_used[a as usize]
                    && up != 0
                    && down != 0
                    && !self.residue_used[up]
                    && !self.residue_used[down]
            })
            .collect()
    }

    fn mark(&mut self, x: u32, a: u32, used: bool) {
        let (up, down) = self.residues(x, a);
        self.adder_used[a as usize] = used;
        self.residue_used[up] = used;
        self.residue_used[down] = used;
        self.adder[x as usize] = a;
    }

    fn extend(&mut self, open: &mut Vec<u32>) -> bool {
        self.nodes += 1;
        if self.nodes > SEARCH_BUDGET {
            return false;
        }
        let mut best: Option<(usize, Vec<u32>)> = None;
        for (idx, &x) in open.iter().enumerate() {
            let options = self.options(x);
            if options.is_empty() {
                return false;
            }
            if best.as_ref().is_none_or(|(_, fewest)| options.len() < fewest.len()) {
                best = Some((idx, options));
            }
        }
        let Some((idx, options)) = best else {
            return true;
        };

        let x = open.remove(idx);
        for a in options {
            self.mark(x, a, true);
            if self.extend(open) {
                return true;
            }
            self.mark(x, a, false);
        }
        open.insert(idx, x);
        false
    }
}

#[derive(Clone, Copy)]
struct OpenMatch {
    round: usize,
    table: usize,
    pairs: (usize, usize),
}

/// Backtracking search giving each open match a column unused by its round
/// and by both of its pairs.
struct MatchSearch {
    l: usize,
    open: Vec<OpenMatch>,
    round_used: Vec<bool>,
    pair_used: Vec<bool>,
    found: Vec<(OpenMatch, usize)>,
    nodes: u32,
}

impl MatchSearch {
    fn new(l: usize, pairs: usize) -> Self {
        Self {
            l,
            open: Vec::new(),
            round_used: vec![false; l * l],
            pair_used: vec![false; (pairs + 1) * l],
            found: Vec::new(),
            nodes: 0,
        }
    }

    fn assign(&mut self, round: usize, a: usize, b: usize, column: usize) {
        self.set(round, (a, b), column, true);
    }

    fn set(&mut self, round: usize, (a, b): (usize, usize), column: usize, used: bool) {
        let l = self.l;
        self.round_used[round * l + column] = used;
        self.pair_used[a * l + column] = used;
        self.pair_used[b * l + column] = used;
    }

    fn options(&self, open: &OpenMatch) -> Vec<usize> {
        let l = self.l;
        let (a, b) = open.pairs;
        (0..l)
            .filter(|&c| {
                !self.round_used[open.round * l + c]
                    && !self.pair_used[a * l + c]
                    && !self.pair_used[b * l + c]
            })
            .collect()
    }

    fn solve(mut self) -> Option<Vec<(OpenMatch, usize)>> {
        let mut open = std::mem::take(&mut self.open);
        self.extend(&mut open).then_some(self.found)
    }

    fn extend(&mut self, open: &mut Vec<OpenMatch>) -> bool {
        self.nodes += 1;
        if self.nodes > SEARCH_BUDGET {
            return false;
        }
        let mut best: Option<(usize, Vec<usize>)> = None;
        for (idx, candidate) in open.iter().enumerate() {
            let options = self.options(candidate);
            if options.is_empty() {
                return false;
            }
            if best.as_ref().is_none_or(|(_, fewest)| options.len() < fewest.len()) {
                best = Some((idx, options));
            }
        }
        let Some((idx, options)) = best else {
            return true;
        };

        let chosen = open.remove(idx);
        for column in options {
            self.set(chosen.round, chosen.pairs, column, true);
            self.found.push((chosen, column));
            if self.extend(open) {
                return true;
            }
            self.found.pop();
            self.set(chosen.round, chosen.pairs, column, false);
        }
        open.insert(idx, chosen);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn matches(map: &SeatMap, tables: u32) -> Vec<(PairId, PairId)> {
        (1..=tables)
            .map(|t| (map[&Seat::ns(t)], map[&Seat::ew(t)]))
            .collect()
    }

    #[test]
    fn test_eight_pairs_first_round() {
        let howell = HowellRotation::new(8).unwrap();
        let first = howell.initial_round();
        assert_eq!(matches(&first, 4), [(8, 1), (2, 7), (3, 6), (4, 5)]);
    }

    #[test]
    fn test_wheel_rotates_one_seat() {
        let howell = HowellRotation::new(8).unwrap();
        let second = howell.step(&howell.initial_round());
        assert_eq!(matches(&second, 4), [(8, 2), (3, 1), (4, 7), (5, 6)]);
    }

    #[test]
    fn test_stationary_pair_never_moves() {
        let howell = HowellRotation::new(10).unwrap();
        let rounds = howell.pair_rounds();
        assert_eq!(rounds.len(), 9);
        assert!(rounds.iter().all(|r| r[&Seat::ns(1)] == 10));
    }

    #[test]
    fn test_every_pair_meets_every_other_once() {
        let howell = HowellRotation::new(8).unwrap();
        let mut met: HashMap<PairId, BTreeSet<PairId>> = HashMap::new();
        for round in howell.pair_rounds() {
            for (ns, ew) in matches(&round, 4) {
                assert!(met.entry(ns).or_default().insert(ew));
                assert!(met.entry(ew).or_default().insert(ns));
            }
        }
        assert!(met.values().all(|opponents| opponents.len() == 7));
    }

    #[test]
    fn test_two_pairs() {
        let howell = HowellRotation::new(2).unwrap();
        let rounds = howell.pair_rounds();
        assert_eq!(rounds.len(), 1);
        assert_eq!(matches(&rounds[0], 1), [(2, 1)]);
    }

    #[test]
    fn test_invalid_pair_counts() {
        assert_eq!(
            HowellRotation::new(9).unwrap_err(),
            RotationError::OddPairCount(9)
        );
        assert_eq!(
            HowellRotation::new(0).unwrap_err(),
            RotationError::TooFewPairs(0)
        );
    }

    fn assert_plan_deals_each_group_once(num_pairs: u32) {
        let howell = HowellRotation::new(num_pairs).unwrap();
        let tables = howell.num_tables();
        let rounds = howell.pair_rounds();
        let plan = howell.board_plan(&rounds).unwrap();
        assert_eq!(plan.len(), rounds.len());
        assert_eq!(plan[0], (1..=tables).collect::<Vec<_>>());

        let mut seen: HashMap<PairId, BTreeSet<u32>> = HashMap::new();
        for (round, groups) in rounds.iter().zip(&plan) {
            let distinct: BTreeSet<_> = groups.iter().copied().collect();
            assert_eq!(distinct.len(), tables as usize);
            assert!(groups.iter().all(|g| (1..=howell.num_board_groups()).contains(g)));
            for ((ns, ew), group) in matches(round, tables).into_iter().zip(groups) {
                assert!(seen.entry(ns).or_default().insert(*group));
                assert!(seen.entry(ew).or_default().insert(*group));
            }
        }
        assert!(seen.values().all(|groups| groups.len() == num_pairs as usize - 1));
    }

    #[test]
    fn test_board_plan_covers_every_group() {
        for num_pairs in [8, 10, 12, 14, 20] {
            assert_plan_deals_each_group_once(num_pairs);
        }
    }

    #[test]
    fn test_board_plan_two_pairs() {
        let howell = HowellRotation::new(2).unwrap();
        let plan = howell.board_plan(&howell.pair_rounds()).unwrap();
        assert_eq!(plan, [[1]]);
    }

    #[test]
    fn test_no_board_plan_for_small_rooms() {
        for (num_pairs, tables) in [(4, 2), (6, 3)] {
            let howell = HowellRotation::new(num_pairs).unwrap();
            assert_eq!(
                howell.board_plan(&howell.pair_rounds()).unwrap_err(),
                RotationError::NoBoardPlan(tables)
            );
        }
    }
}
