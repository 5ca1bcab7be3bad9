//! Criterion benchmarks measure time of the clearly separated pieces of code.

use connect4::board::{Board, Player};
use connect4::evaluation::evaluate;
use connect4::mcts::{self, Tree};
use connect4::search::{self, find_best_move};
use connect4::SearchConfig;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rayon::ThreadPoolBuilder;

/// Opening, middlegame and late middlegame positions with Red to move.
const POSITIONS: [&str; 3] = ["", "33424155", "3342415514412435"];

fn positions() -> Vec<(&'static str, Board)> {
    POSITIONS
        .iter()
        .map(|&moves| (moves, Board::from_moves(moves, Player::Red).unwrap()))
        .collect()
}

fn evaluation(c: &mut Criterion) {
    let boards: Vec<Board> = positions().into_iter().map(|(_, board)| board).collect();
    let _ = c.bench_with_input(
        BenchmarkId::new("evaluate", format!("{} positions", boards.len())),
        &boards,
        |b, boards| {
            b.iter(|| {
                for board in boards {
                    let _ = criterion::black_box(evaluate(board, Player::Red));
                }
            });
        },
    );
}

criterion_group! {
    name = heuristic;
    config = Criterion::default().sample_size(100);
    targets = evaluation
}

fn mcts_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("MCTS");
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let config = SearchConfig {
        simulations: 2_000,
        threads: 4,
        ..SearchConfig::default()
    };
    for strategy in [
        mcts::Strategy::Serial,
        mcts::Strategy::LeafParallel,
        mcts::Strategy::RootParallel,
    ] {
        for (moves, board) in positions() {
            let _ = group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), format!("{moves:?}")),
                &board,
                |b, board| {
                    b.iter(|| {
                        let mut tree = Tree::new(*board, Player::Red);
                        criterion::black_box(mcts::search(&mut tree, &config, strategy, &pool))
                    });
                },
            );
        }
    }
    group.finish();
}

fn minimax_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Minimax");
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    for strategy in [search::Strategy::Serial, search::Strategy::Parallel] {
        for (moves, board) in positions() {
            let _ = group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), format!("{moves:?}")),
                &board,
                |b, board| {
                    b.iter(|| {
                        criterion::black_box(find_best_move(board, Player::Red, 6, strategy, &pool))
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group! {
    name = engines;
    config = Criterion::default().sample_size(10);
    targets = mcts_bench, minimax_bench
}

criterion_main!(heuristic, engines);
