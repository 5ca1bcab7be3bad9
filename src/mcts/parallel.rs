//! Parallel simulation schedules. Both run inside the caller's worker pool.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::trace;

use super::{rollout_reward, simulate, terminal_reward, Tree};
use crate::config::SearchConfig;

/// Leaf parallelization: all workers share one tree.
///
/// Selection runs under the shared lock, expansion and backpropagation under
/// the exclusive one and rollouts without any lock. A worker may select from
/// statistics that do not include rollouts still in flight on other workers.
pub(super) fn leaf_parallel(tree: &mut Tree, config: &SearchConfig) {
    let shared = RwLock::new(tree.take());
    let simulated: u32 = for_each_share(config, |budget, rng| {
        for _ in 0..budget {
            simulate_shared(&shared, config, rng);
        }
        budget
    })
    .into_iter()
    .sum();
    trace!(simulated, "leaf workers finished");
    *tree = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
}

fn simulate_shared(tree: &RwLock<Tree>, config: &SearchConfig, rng: &mut ChaCha20Rng) {
    let leaf = read(tree).select_leaf(config.exploration, config.unvisited_score);
    let mut guard = write(tree);
    // Another worker might have expanded the leaf since it was selected, in
    // which case this is a no-op.
    let _ = guard.expand(leaf);
    let (index, reward) = match guard.select_child(leaf, config.exploration, config.unvisited_score)
    {
        Some(child) => {
            let node = guard.node(child).clone();
            drop(guard);
            (child, rollout_reward(&node, rng))
        },
        None => {
            let reward = terminal_reward(guard.node(leaf));
            drop(guard);
            (leaf, reward)
        },
    };
    let _ = write(tree).backpropagate(index, reward);
}

fn read(tree: &RwLock<Tree>) -> RwLockReadGuard<'_, Tree> {
    tree.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(tree: &RwLock<Tree>) -> RwLockWriteGuard<'_, Tree> {
    tree.write().unwrap_or_else(PoisonError::into_inner)
}

/// Root parallelization: every worker grows a private tree from the root
/// position with its share of the budget. The trees are merged into the
/// caller's tree once all workers are done, so no node is ever shared during
/// the search.
///
/// Workers deliberately do not divide the root's children among themselves.
/// An equal budget per child gives every child the same visit count, and the
/// most visited column would then always be the first one.
pub(super) fn root_parallel(tree: &mut Tree, config: &SearchConfig) {
    let root = tree.root();
    let (board, to_move) = (*root.board(), root.to_move());
    let searched = for_each_share(config, |budget, rng| {
        let mut private = Tree::new(board, to_move);
        for _ in 0..budget {
            let _ = simulate(&mut private, config, rng);
        }
        private
    });
    for private in &searched {
        tree.merge(private);
    }
}

/// Runs `work` on the pool once per share of the simulation budget. Each share
/// owns one generator, seeded from the worker index, for all of its
/// simulations.
fn for_each_share<T, F>(config: &SearchConfig, work: F) -> Vec<T>
where
    T: Send,
    F: Fn(u32, &mut ChaCha20Rng) -> T + Sync,
{
    split_budget(config.simulations, rayon::current_num_threads())
        .into_par_iter()
        .enumerate()
        .map(|(worker, budget)| {
            let mut rng = ChaCha20Rng::seed_from_u64(config.seed.wrapping_add(worker as u64));
            let result = work(budget, &mut rng);
            trace!(worker, budget, "worker finished");
            result
        })
        .collect()
}

/// Splits the budget into `parts` shares that differ by at most one, larger
/// shares first.
fn split_budget(total: u32, parts: usize) -> Vec<u32> {
    let parts = u32::try_from(parts.max(1)).unwrap_or(u32::MAX);
    let (share, remainder) = (total / parts, total % parts);
    (0..parts)
        .map(|part| share + u32::from(part < remainder))
        .filter(|&budget| budget > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rand::RngCore;
    use rayon::ThreadPoolBuilder;

    use super::*;

    #[test]
    fn budget_split() {
        assert_eq!(split_budget(10, 3), vec![4, 3, 3]);
        assert_eq!(split_budget(12, 4), vec![3, 3, 3, 3]);
        assert_eq!(split_budget(2, 6), vec![1, 1]);
        assert_eq!(split_budget(5, 0), vec![5]);
        for (total, parts) in [(10_000, 6), (1, 1), (999, 7)] {
            assert_eq!(split_budget(total, parts).iter().sum::<u32>(), total);
        }
    }

    #[test]
    fn every_share_draws_from_one_generator() {
        let config = SearchConfig {
            simulations: 10_000,
            ..SearchConfig::default()
        };
        let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let draws = pool.install(|| {
            for_each_share(&config, |budget, rng| {
                (0..budget).map(|_| rng.next_u64()).collect::<Vec<_>>()
            })
        });
        assert_eq!(draws.len(), 4);
        assert_eq!(draws.iter().map(Vec::len).sum::<usize>(), 10_000);
        // A generator seeded again mid-search would repeat its earlier values.
        let distinct: HashSet<u64> = draws.iter().flatten().copied().collect();
        assert_eq!(distinct.len(), 10_000);
    }
}
