/// Property-based tests for the rotation generators using proptest
///
/// These tests check schedule shape for a wide range of table counts:
/// round counts, complete seatings, table renaming and the engine built
/// from a schedule, including Howell boards reaching every pair once.
use bridge_movement::{
    BoardGroup, HowellRotation, MitchellRotation, Pair, Position, Rotation, RotationGenerator,
    RotationSchedule, Seat, TableId, tournament::Table,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Strategy for a Mitchell or Howell rotation over `2..=12` tables
fn rotation_strategy() -> impl Strategy<Value = Rotation> {
    (2u32..=12, any::<bool>()).prop_map(|(tables, howell)| {
        if howell {
            HowellRotation::new(tables * 2).unwrap().into()
        } else {
            MitchellRotation::new(tables * 2).unwrap().into()
        }
    })
}

// Same over the table counts that can carry boards: a Howell needs 4
fn engine_rotation_strategy() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        (2u32..=12).prop_map(|tables| Rotation::from(MitchellRotation::new(tables * 2).unwrap())),
        (4u32..=12).prop_map(|tables| Rotation::from(HowellRotation::new(tables * 2).unwrap())),
    ]
}

fn playable_tables(rotation: &Rotation, offset: TableId) -> Vec<Table> {
    (1..=rotation.num_tables())
        .map(|t| Table::new(offset + t))
        .collect()
}

proptest! {
    #[test]
    fn test_round_count_is_two_n_minus_one(rotation in rotation_strategy()) {
        let n = rotation.num_tables();
        let mut schedule = RotationSchedule::new(rotation);

        // Both built-in movements use 2n-1 rounds with the default switch
        prop_assert_eq!(schedule.round_count(), 2 * n - 1);
    }

    #[test]
    fn test_every_round_seats_every_pair_once(rotation in rotation_strategy()) {
        let pairs = rotation.num_pairs();
        for (idx, round) in rotation.pair_rounds().iter().enumerate() {
            prop_assert_eq!(round.len(), pairs as usize, "round {} has empty seats", idx + 1);
            let seated: BTreeSet<u32> = round.values().copied().collect();
            prop_assert_eq!(seated, (1..=pairs).collect::<BTreeSet<_>>());
        }
    }

    #[test]
    fn test_round_sitting_renames_tables(
        rotation in rotation_strategy(),
        offset in 0u32..100,
        round_seed in any::<u32>(),
    ) {
        let n = rotation.num_tables();
        let mut schedule = RotationSchedule::new(rotation);
        let round = round_seed % schedule.round_count() + 1;

        let tables: Vec<TableId> = (1..=n).map(|t| offset + t).collect();
        let generic = schedule.get_round_sitting(round, None).unwrap();
        let concrete = schedule.get_round_sitting(round, Some(&tables)).unwrap();

        prop_assert_eq!(generic.len(), concrete.len());
        for (seat, pair) in &generic {
            let renamed = Seat::new(offset + seat.table, seat.position);
            prop_assert_eq!(concrete.get(&renamed), Some(pair));
        }
    }

    #[test]
    fn test_engine_matches_schedule(rotation in engine_rotation_strategy()) {
        let n = rotation.num_tables();
        let mut schedule = RotationSchedule::new(rotation);
        let rounds = schedule.round_count();

        let mut tables = playable_tables(schedule.rotation(), 0);
        tables.push(Table::relay(n + 1));
        let pairs = (1..=2 * n).map(Pair::anonymous).collect();
        let groups = BoardGroup::contiguous(2 * n as usize - 1, 2).unwrap();

        let mut engine = schedule.movement_engine(&tables, pairs, groups, rounds).unwrap();
        engine.construct(rounds).unwrap();

        let ids: Vec<TableId> = (1..=n).collect();
        for round in 1..=rounds {
            let expected = schedule.get_round_sitting(round, Some(&ids)).unwrap();
            prop_assert_eq!(engine.sitting_for_round(round).unwrap(), &expected);
        }
        prop_assert!(engine.boards_conserved());
    }

    #[test]
    fn test_construct_is_idempotent(rotation in engine_rotation_strategy(), split in 1u32..=23) {
        let n = rotation.num_tables();
        let mut schedule = RotationSchedule::new(rotation);
        let rounds = schedule.round_count();
        let partial = split.min(rounds);

        let mut tables = playable_tables(schedule.rotation(), 10);
        tables.push(Table::relay(100));
        let pairs: Vec<Pair> = (1..=2 * n).map(Pair::anonymous).collect();
        let groups = BoardGroup::contiguous(2 * n as usize - 1, 3).unwrap();

        let mut all_at_once = schedule
            .movement_engine(&tables, pairs.clone(), groups.clone(), rounds)
            .unwrap();
        all_at_once.construct(rounds).unwrap();

        let mut stepwise = schedule.movement_engine(&tables, pairs, groups, rounds).unwrap();
        stepwise.construct(partial).unwrap();
        prop_assert_eq!(stepwise.rounds_computed(), partial);
        stepwise.construct(partial).unwrap();
        prop_assert_eq!(stepwise.rounds_computed(), partial);
        stepwise.construct(rounds).unwrap();
        stepwise.construct(1).unwrap();

        prop_assert_eq!(stepwise.rounds(), all_at_once.rounds());
    }

    #[test]
    fn test_howell_meets_everyone_once(tables in 2u32..=10) {
        let howell = HowellRotation::new(tables * 2).unwrap();
        let mut met: HashMap<(u32, u32), u32> = HashMap::new();

        for round in howell.pair_rounds() {
            for t in 1..=tables {
                let ns = round[&Seat::new(t, Position::NorthSouth)];
                let ew = round[&Seat::new(t, Position::EastWest)];
                *met.entry((ns.min(ew), ns.max(ew))).or_default() += 1;
            }
        }

        let pairs = tables * 2;
        prop_assert_eq!(met.len() as u32, pairs * (pairs - 1) / 2);
        prop_assert!(met.values().all(|&count| count == 1));
    }

    #[test]
    fn test_howell_engine_never_replays(tables in 4u32..=12, relays in 1u32..=3) {
        let mut schedule = RotationSchedule::new(HowellRotation::new(tables * 2).unwrap().into());
        let rounds = schedule.round_count();

        let relay_tables = (1..=relays).map(|r| Table::relay(tables + r));
        let all: Vec<Table> = (1..=tables).map(Table::new).chain(relay_tables).collect();
        let pairs = (1..=2 * tables).map(Pair::anonymous).collect();
        let groups = BoardGroup::contiguous(2 * tables as usize - 1, 2).unwrap();

        let mut engine = schedule.movement_engine(&all, pairs, groups, rounds).unwrap();
        engine.construct(rounds).unwrap();

        let mut played: HashMap<u32, BTreeSet<u32>> = HashMap::new();
        for state in engine.rounds() {
            for t in 1..=tables {
                prop_assert_eq!(state.boards[&t].len(), 1);
            }
            for (seat, pair) in &state.seats {
                let group = state.playing_group(seat.table).unwrap().id();
                prop_assert!(played.entry(*pair).or_default().insert(group));
            }
        }
        prop_assert!(played.values().all(|groups| groups.len() == 2 * tables as usize - 1));
    }
}
