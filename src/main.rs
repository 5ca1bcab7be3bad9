use std::io;

use anyhow::Result;
use clap::Parser;
use connect4::{Engine, EngineKind, SearchConfig};

/// Connect-4 engine speaking a line-oriented text protocol on stdin/stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Engine used by `go` without an argument: mcts[-serial|-leaf|-root] or
    /// minimax[-serial|-parallel].
    #[arg(long, default_value = "mcts-serial")]
    engine: EngineKind,
    /// MCTS simulations per move.
    #[arg(long, default_value_t = SearchConfig::default().simulations)]
    simulations: u32,
    /// Minimax depth in plies.
    #[arg(long, default_value_t = SearchConfig::default().depth)]
    depth: u8,
    /// UCT exploration constant.
    #[arg(long, default_value_t = SearchConfig::default().exploration)]
    exploration: f64,
    /// Worker threads of the parallel strategies.
    #[arg(long, default_value_t = SearchConfig::default().threads)]
    threads: usize,
    /// Seed of the rollout generators.
    #[arg(long, default_value_t = SearchConfig::default().seed)]
    seed: u64,
    /// Play immediate wins and blocks without searching.
    #[arg(long)]
    tactical: bool,
    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            simulations: self.simulations,
            depth: self.depth,
            exploration: self.exploration,
            threads: self.threads,
            seed: self.seed,
            tactical: self.tactical,
            ..SearchConfig::default()
        }
    }
}

/// Logs go to stderr, stdout belongs to the protocol.
fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut engine = Engine::new(args.engine, args.search_config(), &mut input, &mut output)?;
    engine.run()
}
