//! [Monte Carlo Tree Search] engine.
//!
//! Every simulation goes through the four classic phases: selection of a leaf
//! by the UCT score, expansion of all legal columns, a uniformly random
//! rollout and backpropagation of the outcome towards the root. The
//! [`Strategy`] decides how simulations are distributed across the worker
//! pool.
//!
//! [Monte Carlo Tree Search]: https://www.chessprogramming.org/Monte-Carlo_Tree_Search

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::ThreadPool;
use tracing::debug;

use crate::board::{Board, GameStatus, Player};
use crate::config::SearchConfig;
use crate::evaluation::evaluate;

mod parallel;
mod tree;

pub use tree::{Node, NodeIndex, Tree, ROOT};

/// Distribution of simulations over the worker pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// All simulations run on the calling thread.
    Serial,
    /// Simulations run concurrently on one shared tree.
    LeafParallel,
    /// Every worker grows a private tree, the trees are merged afterwards.
    RootParallel,
}

impl FromStr for Strategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serial" => Ok(Self::Serial),
            "leaf" | "leaf-parallel" => Ok(Self::LeafParallel),
            "root" | "root-parallel" => Ok(Self::RootParallel),
            _ => Err(crate::Error::InvalidConfig(format!(
                "unknown MCTS strategy: {s}"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::LeafParallel => write!(f, "leaf-parallel"),
            Self::RootParallel => write!(f, "root-parallel"),
        }
    }
}

/// Runs `config.simulations` simulations on the tree and returns the most
/// visited column of the root, `None` if the root can not be expanded.
///
/// The tree keeps all statistics afterwards, so consecutive searches on the
/// same tree accumulate.
pub fn search(
    tree: &mut Tree,
    config: &SearchConfig,
    strategy: Strategy,
    pool: &ThreadPool,
) -> Option<usize> {
    let timer = Instant::now();
    let visits_before = tree.root().visits();
    match strategy {
        Strategy::Serial => serial(tree, config),
        Strategy::LeafParallel => pool.install(|| parallel::leaf_parallel(tree, config)),
        Strategy::RootParallel => pool.install(|| parallel::root_parallel(tree, config)),
    }
    let column = tree.best_column();
    debug!(
        %strategy,
        simulations = tree.root().visits() - visits_before,
        nodes = tree.len(),
        visits = ?tree.visit_distribution(),
        ?column,
        elapsed_ms = timer.elapsed().as_millis(),
        "MCTS search finished"
    );
    column
}

fn serial(tree: &mut Tree, config: &SearchConfig) {
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    for _ in 0..config.simulations {
        let _ = simulate(tree, config, &mut rng);
    }
}

/// One full simulation on an exclusively owned tree. Returns the reward
/// recorded at the tree's root.
fn simulate(tree: &mut Tree, config: &SearchConfig, rng: &mut impl Rng) -> f64 {
    let leaf = tree.select_leaf(config.exploration, config.unvisited_score);
    let _ = tree.expand(leaf);
    let (index, reward) = match tree.select_child(leaf, config.exploration, config.unvisited_score)
    {
        Some(child) => (child, rollout_reward(tree.node(child), rng)),
        None => (leaf, terminal_reward(tree.node(leaf))),
    };
    tree.backpropagate(index, reward)
}

/// Reward of a random playout from the node, from the perspective of the
/// player who moved into it.
fn rollout_reward(node: &Node, rng: &mut impl Rng) -> f64 {
    let outcome = rollout(node.board(), node.to_move(), rng);
    match node.mover() {
        Player::Red => outcome,
        Player::Yellow => -outcome,
    }
}

/// Reward of a node that can not be expanded.
fn terminal_reward(node: &Node) -> f64 {
    evaluate(node.board(), node.mover()).to_reward()
}

/// Plays uniformly random legal moves until the game is decided. The outcome
/// is `1` if Red wins, `-1` if Yellow wins and `0` for a draw.
pub fn rollout(board: &Board, to_move: Player, rng: &mut impl Rng) -> f64 {
    let mut board = *board;
    let mut player = to_move;
    loop {
        match board.status() {
            GameStatus::Win(Player::Red) => return 1.0,
            GameStatus::Win(Player::Yellow) => return -1.0,
            GameStatus::Draw => return 0.0,
            GameStatus::Ongoing => (),
        }
        let moves = board.legal_moves();
        let Some(&column) = moves.choose(rng) else {
            return 0.0;
        };
        let _ = board.drop_piece(column, player);
        player = !player;
    }
}
