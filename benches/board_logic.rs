use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fruit_cascade::adapter::{build_observation, state_hash};
use fruit_cascade::core::{find_match_groups, find_move, Board, BoardConfig, PhaseDelays};

fn config(seed: u32) -> BoardConfig {
    BoardConfig::default()
        .with_seed(seed)
        .with_delays(PhaseDelays::instant())
}

fn bench_detect(c: &mut Criterion) {
    // Freshly generated grid, before any cascade has run.
    let mut board = Board::plain(config(12345));
    board.init(None);
    let grid = board.grid().clone();

    c.bench_function("find_match_groups", |b| {
        b.iter(|| find_match_groups(black_box(&grid)))
    });
}

fn bench_find_move(c: &mut Criterion) {
    let mut board = Board::plain(config(12345));
    board.init(None);
    board.step();
    let grid = board.grid().clone();

    c.bench_function("find_move", |b| b.iter(|| find_move(black_box(&grid))));
}

fn bench_settle(c: &mut Criterion) {
    let mut seed = 0u32;
    c.bench_function("init_and_settle", |b| {
        b.iter_batched(
            || {
                seed = seed.wrapping_add(1);
                Board::plain(config(seed))
            },
            |mut board| {
                board.init(None);
                board.step();
                board.score()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_swap_cascade(c: &mut Criterion) {
    let mut board = Board::plain(config(777));
    board.init(None);
    board.step();

    c.bench_function("hinted_swap_cascade", |b| {
        b.iter_batched(
            || board.clone(),
            |mut board| {
                if let Some((a, b)) = board.hint() {
                    board.request_swap(a, b);
                    board.step();
                }
                board.score()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_observation(c: &mut Criterion) {
    let mut board = Board::plain(config(42));
    board.init(None);
    board.step();
    let snapshot = board.snapshot();

    c.bench_function("build_observation", |b| {
        b.iter(|| build_observation(black_box(&snapshot), 1))
    });
    c.bench_function("state_hash", |b| b.iter(|| state_hash(black_box(&snapshot))));
}

criterion_group!(
    benches,
    bench_detect,
    bench_find_move,
    bench_settle,
    bench_swap_cascade,
    bench_observation
);
criterion_main!(benches);
