use bridge_movement::{
    BoardGroup, HowellRotation, MitchellRotation, Pair, Rotation, RotationGenerator,
    RotationSchedule, Sector, SectorConfig, ValidationEngine,
    tournament::{SectorStatus, Table},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Helper to build a Howell schedule with its engine inputs for N tables
fn howell_inputs(n_tables: u32) -> (RotationSchedule, Vec<Table>, Vec<Pair>, Vec<BoardGroup>) {
    let schedule = RotationSchedule::new(HowellRotation::new(n_tables * 2).unwrap().into());
    let tables = (1..=n_tables)
        .map(Table::new)
        .chain([Table::relay(n_tables + 1)])
        .collect();
    let pairs = (1..=n_tables * 2).map(Pair::anonymous).collect();
    let groups = BoardGroup::contiguous(2 * n_tables as usize - 1, 2).unwrap();
    (schedule, tables, pairs, groups)
}

/// Benchmark full schedule generation for both rotations
fn bench_pair_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_rounds");

    for n_tables in [5, 9, 15].iter() {
        let mitchell = Rotation::from(MitchellRotation::new(n_tables * 2).unwrap());
        let howell = Rotation::from(HowellRotation::new(n_tables * 2).unwrap());

        group.bench_with_input(
            BenchmarkId::new("mitchell", format!("{}_tables", n_tables)),
            &mitchell,
            |b, rotation| b.iter(|| rotation.pair_rounds()),
        );
        group.bench_with_input(
            BenchmarkId::new("howell", format!("{}_tables", n_tables)),
            &howell,
            |b, rotation| b.iter(|| rotation.pair_rounds()),
        );
    }

    group.finish();
}

/// Benchmark strategy derivation from a memoized schedule
fn bench_movement_strategy(c: &mut Criterion) {
    let mut schedule = RotationSchedule::new(HowellRotation::new(20).unwrap().into());
    let playable: Vec<u32> = (1..=10).collect();
    let rounds = schedule.round_count();

    c.bench_function("movement_strategy_howell_10_tables", |b| {
        b.iter(|| schedule.movement_strategy(&playable, &[11], rounds).unwrap());
    });
}

/// Benchmark engine construction over every round
fn bench_engine_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_construct");

    for n_tables in [4, 8, 12].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_tables", n_tables)),
            n_tables,
            |b, &n| {
                let (mut schedule, tables, pairs, groups) = howell_inputs(n);
                let rounds = schedule.round_count();
                b.iter_batched(
                    || {
                        schedule
                            .movement_engine(&tables, pairs.clone(), groups.clone(), rounds)
                            .unwrap()
                    },
                    |mut engine| {
                        engine.construct(rounds).unwrap();
                        engine
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark validation of a full Mitchell movement
fn bench_validate_rounds(c: &mut Criterion) {
    let config = SectorConfig {
        num_pairs: 30,
        mitchell_switch_round: Some(0),
        ..Default::default()
    };
    let sector = Sector::from_config(&config).unwrap();
    let Some(engine) = sector.movement() else {
        return;
    };

    c.bench_function("validate_mitchell_15_tables", |b| {
        b.iter(|| {
            let mut validator = ValidationEngine::new();
            for state in engine.rounds() {
                validator
                    .validate_round(&state.seats, &state.boards)
                    .unwrap();
            }
            validator
        });
    });
}

/// Benchmark a whole sector played deal by deal
fn bench_sector_play(c: &mut Criterion) {
    let config = SectorConfig {
        num_pairs: 18,
        mitchell_switch_round: Some(0),
        ..Default::default()
    };

    c.bench_function("sector_play_9_tables", |b| {
        b.iter_batched(
            || Sector::from_config(&config).unwrap(),
            |mut sector| {
                sector.start().unwrap();
                while sector.play_round().unwrap() == SectorStatus::Active {}
                sector
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(rotations, bench_pair_rounds, bench_movement_strategy);

criterion_group!(
    engine_operations,
    bench_engine_construct,
    bench_validate_rounds,
    bench_sector_play,
);

criterion_main!(rotations, engine_operations);
