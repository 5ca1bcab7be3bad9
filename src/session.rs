//! Search orchestration: one [`Session`] per game.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::board::{Board, GameStatus, Player, CELLS, WIDTH};
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::evaluation::Score;
use crate::mcts::{self, Tree};
use crate::search::{self, immediate_move, Depth};

/// Search algorithm and the way it uses the worker pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
    #[allow(missing_docs)]
    Mcts(mcts::Strategy),
    #[allow(missing_docs)]
    Minimax(search::Strategy),
}

impl Default for EngineKind {
    fn default() -> Self {
        Self::Mcts(mcts::Strategy::Serial)
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    /// Parses `mcts` or `minimax`, optionally followed by a dash and the
    /// strategy (e.g. `mcts-root`, `minimax-parallel`).
    fn from_str(s: &str) -> Result<Self> {
        let (engine, strategy) = s.split_once('-').unwrap_or((s, "serial"));
        match engine {
            "mcts" => Ok(Self::Mcts(strategy.parse()?)),
            "minimax" => Ok(Self::Minimax(strategy.parse()?)),
            _ => Err(Error::InvalidConfig(format!("unknown engine: {s}"))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mcts(strategy) => write!(f, "mcts-{strategy}"),
            Self::Minimax(strategy) => write!(f, "minimax-{strategy}"),
        }
    }
}

/// Everything known about a finished search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReport {
    /// Legal column to play.
    pub column: usize,
    /// Engine that produced the column.
    pub engine: EngineKind,
    /// Minimax score of the column, `None` for MCTS and tactical moves.
    pub score: Option<Score>,
    /// Minimax: visited positions. MCTS: size of the tree after the search.
    pub nodes: u64,
    /// Root visit counts per column, MCTS only.
    pub visits: Option<[u32; WIDTH]>,
    /// The column was an immediate win or block found without searching.
    pub tactical: bool,
    #[allow(missing_docs)]
    pub elapsed: Duration,
}

/// Owns the current position, the search configuration, the worker pool and
/// the MCTS tree that is carried over between moves.
///
/// ```
/// use connect4::board::{Board, GameStatus, Player};
/// use connect4::{EngineKind, SearchConfig, Session};
///
/// let config = SearchConfig {
///     depth: 1,
///     ..SearchConfig::default()
/// };
/// let mut session = Session::new(Board::empty(), Player::Red, config).unwrap();
/// let engine: EngineKind = "minimax-serial".parse().unwrap();
/// let column = session.search_move(engine).unwrap();
/// assert_eq!(column, 3);
/// assert_eq!(session.commit(column).unwrap(), GameStatus::Ongoing);
/// assert_eq!(session.to_move(), Player::Yellow);
/// ```
#[derive(Debug)]
pub struct Session {
    board: Board,
    to_move: Player,
    config: SearchConfig,
    tree: Tree,
    pool: ThreadPool,
}

impl Session {
    /// Starts a session from the position with `player` to move.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBoard`] for positions that can not occur in a game,
    /// [`Error::InvalidConfig`] and [`Error::WorkerPool`] for the
    /// configuration.
    pub fn new(board: Board, player: Player, config: SearchConfig) -> Result<Self> {
        board.validate()?;
        config.validate()?;
        let pool = build_pool(config.threads)?;
        Ok(Self {
            board,
            to_move: player,
            config,
            tree: Tree::new(board, player),
            pool,
        })
    }

    /// Replaces the position and drops the search tree. The configuration and
    /// the worker pool stay.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBoard`].
    pub fn reset(&mut self, board: Board, player: Player) -> Result<()> {
        board.validate()?;
        self.board = board;
        self.to_move = player;
        self.tree = Tree::new(board, player);
        Ok(())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Player whose move is searched next.
    #[must_use]
    pub const fn to_move(&self) -> Player {
        self.to_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// MCTS tree rooted at the current position.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Replaces the configuration. The worker pool is rebuilt if the number
    /// of threads changes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] and [`Error::WorkerPool`]; the previous
    /// configuration stays in place.
    pub fn set_config(&mut self, config: SearchConfig) -> Result<()> {
        config.validate()?;
        if config.threads != self.config.threads {
            self.pool = build_pool(config.threads)?;
        }
        self.config = config;
        Ok(())
    }

    /// Runs the engine on the current position. The position does not change
    /// until the column is [committed](Session::commit).
    ///
    /// # Errors
    ///
    /// [`Error::GameOver`] if a player already has four in a row and
    /// [`Error::NoLegalMove`] if the board is full.
    pub fn search(&mut self, engine: EngineKind) -> Result<SearchReport> {
        if let GameStatus::Win(winner) = self.board.status() {
            return Err(Error::GameOver(winner));
        }
        let fallback = *self.board.legal_moves().first().ok_or(Error::NoLegalMove)?;
        let timer = Instant::now();

        if self.config.tactical {
            if let Some(column) = immediate_move(&self.board, self.to_move) {
                info!(column, player = %self.to_move, "playing tactical move");
                return Ok(SearchReport {
                    column,
                    engine,
                    score: None,
                    nodes: 1,
                    visits: None,
                    tactical: true,
                    elapsed: timer.elapsed(),
                });
            }
        }

        let (column, score, nodes, visits) = match engine {
            EngineKind::Mcts(strategy) => {
                // Different rollouts on every move of the game.
                let config = SearchConfig {
                    seed: self
                        .config
                        .seed
                        .wrapping_add((CELLS - self.board.empty_cells()) as u64),
                    ..self.config.clone()
                };
                let column = mcts::search(&mut self.tree, &config, strategy, &self.pool);
                let visits = self.tree.visit_distribution();
                (column, None, self.tree.len() as u64, Some(visits))
            },
            EngineKind::Minimax(strategy) => {
                let empty = Depth::try_from(self.board.empty_cells()).unwrap_or(Depth::MAX);
                let depth = self.config.depth.min(empty);
                let result =
                    search::find_best_move(&self.board, self.to_move, depth, strategy, &self.pool);
                (result.column, Some(result.score), result.nodes, None)
            },
        };

        let column = match column {
            Some(column) if self.board.is_legal(column) => column,
            _ => {
                warn!(%engine, ?column, fallback, "engine did not produce a legal column");
                fallback
            },
        };
        let elapsed = timer.elapsed();
        info!(
            %engine,
            column,
            player = %self.to_move,
            nodes,
            elapsed_ms = elapsed.as_millis(),
            "search finished"
        );
        Ok(SearchReport {
            column,
            engine,
            score,
            nodes,
            visits,
            tactical: false,
            elapsed,
        })
    }

    /// Searches and returns the column only.
    ///
    /// # Errors
    ///
    /// See [`Session::search`].
    pub fn search_move(&mut self, engine: EngineKind) -> Result<usize> {
        self.search(engine).map(|report| report.column)
    }

    /// Plays the column for the player to move, keeps the MCTS statistics of
    /// the resulting position and passes the turn.
    ///
    /// # Errors
    ///
    /// [`Error::GameOver`] if the game is already decided,
    /// [`Error::InvalidColumn`] and [`Error::ColumnFull`] for illegal
    /// columns. The position is unchanged in that case.
    pub fn commit(&mut self, column: usize) -> Result<GameStatus> {
        if let GameStatus::Win(winner) = self.board.status() {
            return Err(Error::GameOver(winner));
        }
        let _ = self.board.play(column, self.to_move)?;
        self.to_move = !self.to_move;
        self.tree = match self.tree.reroot(column) {
            Some(subtree) => subtree,
            None => Tree::new(self.board, self.to_move),
        };
        debug!(
            column,
            reused_nodes = self.tree.len(),
            reused_visits = self.tree.root().visits(),
            "move committed"
        );
        Ok(self.board.status())
    }
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|index| format!("search-{index}"))
        .build()?)
}
