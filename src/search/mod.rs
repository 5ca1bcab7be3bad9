//! [Search] is a "dynamic" position evaluation: it looks ahead into possible
//! continuations and combines their static [`evaluation`] into the score of
//! the current position.
//!
//! This module implements [Minimax] with [Alpha-Beta pruning] in a serial and
//! a branch-parallel flavor plus the tactical helpers used before searching.
//!
//! [Search]: https://www.chessprogramming.org/Search
//! [`evaluation`]: crate::evaluation
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rayon::ThreadPool;
use tracing::debug;

use crate::board::{Board, Player};
use crate::evaluation::{evaluate, Score};

mod minimax;
mod parallel;
mod tactics;

pub use tactics::immediate_move;

/// Search depth in plies.
pub type Depth = u8;

/// Outcome of a minimax search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Score from the perspective of the player to move at the root.
    pub score: Score,
    /// Column achieving the score, `None` for leaves.
    pub column: Option<usize>,
    /// Number of positions visited, the root included.
    pub nodes: u64,
}

impl SearchResult {
    const fn leaf(score: Score) -> Self {
        Self {
            score,
            column: None,
            nodes: 1,
        }
    }

    /// Worst possible result for the side choosing at this ply.
    fn worst(maximizing: bool) -> Self {
        Self::leaf(if maximizing {
            -Score::INFINITY
        } else {
            Score::INFINITY
        })
    }

    /// Takes the child's score if it is an improvement for the side choosing
    /// at this ply (the first column always is) and narrows the window.
    /// Returns `true` if the remaining siblings can be pruned.
    fn consider(
        &mut self,
        column: usize,
        score: Score,
        maximizing: bool,
        window: &mut Window,
    ) -> bool {
        let improves = if maximizing {
            score > self.score
        } else {
            score < self.score
        };
        if improves || self.column.is_none() {
            self.score = score;
            self.column = Some(column);
        }
        if maximizing {
            window.alpha = window.alpha.max(self.score);
        } else {
            window.beta = window.beta.min(self.score);
        }
        window.alpha >= window.beta
    }
}

/// Alpha-beta bounds: `alpha` is the score the maximizer is already assured
/// of and `beta` the one the minimizer is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Window {
    alpha: Score,
    beta: Score,
}

impl Window {
    fn full() -> Self {
        Self {
            alpha: -Score::INFINITY,
            beta: Score::INFINITY,
        }
    }
}

/// Handles the positions that are not expanded: returns the result for a
/// leaf or `None` if the children have to be searched.
fn leaf_result(
    board: &Board,
    depth: Depth,
    maximizing: bool,
    maximizer: Player,
) -> Option<SearchResult> {
    if depth == 0 || usize::from(depth) > board.empty_cells() {
        return Some(SearchResult::leaf(evaluate(board, maximizer)));
    }
    // The side that just moved might have completed four in a row already.
    let previous = if maximizing { !maximizer } else { maximizer };
    if board.check_win(previous) {
        return Some(SearchResult::worst(maximizing));
    }
    None
}

/// Side to move at the ply.
fn mover(maximizing: bool, maximizer: Player) -> Player {
    if maximizing {
        maximizer
    } else {
        !maximizer
    }
}

/// Algorithm used to explore the minimax tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Depth-first search on the calling thread.
    Serial,
    /// Children of every ply are searched concurrently on the worker pool.
    Parallel,
}

impl FromStr for Strategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serial" => Ok(Self::Serial),
            "parallel" => Ok(Self::Parallel),
            _ => Err(crate::Error::InvalidConfig(format!(
                "unknown minimax strategy: {s}"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Searches the position `depth` plies deep for the player to move and
/// returns the best column with its score.
///
/// Lines where the opponent has already won score [`Score::INFINITY`] against
/// the player, so a column is returned even when every move loses.
pub fn find_best_move(
    board: &Board,
    player: Player,
    depth: Depth,
    strategy: Strategy,
    pool: &ThreadPool,
) -> SearchResult {
    let timer = Instant::now();
    let result = match strategy {
        Strategy::Serial => minimax::alpha_beta(board, depth, Window::full(), true, player),
        Strategy::Parallel => {
            pool.install(|| parallel::alpha_beta(board, depth, Window::full(), true, player))
        },
    };
    let elapsed = timer.elapsed();
    debug!(
        %strategy,
        depth,
        score = %result.score,
        column = ?result.column,
        nodes = result.nodes,
        elapsed_ms = elapsed.as_millis(),
        "minimax search finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rayon::ThreadPoolBuilder;

    use super::*;
    use crate::board::WIDTH;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    #[test]
    fn parse_strategy() {
        assert_eq!("serial".parse::<Strategy>().unwrap(), Strategy::Serial);
        assert_eq!("parallel".parse::<Strategy>().unwrap(), Strategy::Parallel);
        assert!("leaf".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Parallel.to_string(), "parallel");
    }

    #[test]
    fn consider_updates_window() {
        let mut window = Window::full();
        let mut best = SearchResult::worst(true);
        assert!(!best.consider(2, Score::new(5), true, &mut window));
        assert_eq!(best.column, Some(2));
        assert_eq!(window.alpha, Score::new(5));
        // Equal scores keep the earlier column.
        assert!(!best.consider(4, Score::new(5), true, &mut window));
        assert_eq!(best.column, Some(2));

        window.beta = Score::new(7);
        assert!(best.consider(5, Score::new(9), true, &mut window));
        assert_eq!(best.column, Some(5));
    }

    #[test]
    fn first_column_when_everything_loses() {
        let mut window = Window::full();
        let mut best = SearchResult::worst(true);
        let _ = best.consider(1, -Score::INFINITY, true, &mut window);
        assert_eq!(best.column, Some(1));
    }

    #[test]
    fn depth_one_prefers_center() {
        for strategy in [Strategy::Serial, Strategy::Parallel] {
            let result = find_best_move(&Board::empty(), Player::Red, 1, strategy, &pool());
            assert_eq!(result.column, Some(3));
            assert_eq!(result.score, Score::new(71));
            assert_eq!(result.nodes, 1 + WIDTH as u64);
        }
    }

    #[test]
    fn depth_beyond_empty_cells_is_a_leaf() {
        let result = find_best_move(&Board::empty(), Player::Red, 43, Strategy::Serial, &pool());
        assert_eq!(result.column, None);
        assert_eq!(result.nodes, 1);
    }

    #[test]
    fn proven_loss_is_infinite() {
        // Yellow already completed the column.
        let board = Board::from_moves("06162656", Player::Red).unwrap();
        assert!(board.check_win(Player::Yellow));
        let result = find_best_move(&board, Player::Red, 3, Strategy::Serial, &pool());
        assert_eq!(result.score, -Score::INFINITY);
        assert_eq!(result.column, None);
    }
}
