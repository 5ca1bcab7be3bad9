//! Parameters recognized by every engine.

use crate::error::{Error, Result};
use crate::search::Depth;

/// Search parameters shared by MCTS and minimax. Each engine reads the fields
/// it needs and ignores the rest.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Number of MCTS simulations per search.
    pub simulations: u32,
    /// Minimax search depth in plies.
    pub depth: Depth,
    /// Exploration constant `C` of the UCT formula.
    pub exploration: f64,
    /// Both the exploitation and the exploration term of an unvisited child.
    pub unvisited_score: f64,
    /// Size of the worker pool used by the parallel strategies.
    pub threads: usize,
    /// Seed of the rollout random number generators.
    pub seed: u64,
    /// Play immediate wins and block immediate losses without searching.
    pub tactical: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            depth: 4,
            exploration: 1.0,
            unvisited_score: 1e-5,
            threads: 6,
            seed: 0x5eed,
            tactical: false,
        }
    }
}

impl SearchConfig {
    /// Checks that the parameters can produce a move.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(Error::InvalidConfig(
                "at least one simulation is required".into(),
            ));
        }
        if self.depth == 0 {
            return Err(Error::InvalidConfig("depth must be positive".into()));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig(
                "the worker pool needs at least one thread".into(),
            ));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "exploration constant must be a non-negative number, got {}",
                self.exploration
            )));
        }
        if !self.unvisited_score.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "unvisited score must be finite, got {}",
                self.unvisited_score
            )));
        }
        Ok(())
    }
}
