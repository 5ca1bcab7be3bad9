use anyhow::{bail, Context};
use clap::Parser;
use connect4::board::{Board, GameStatus, Player};
use connect4::{EngineKind, SearchConfig, Session};
use rayon::prelude::*;

/// Plays a match between two engines. Games run in parallel and the engines
/// swap colors after every game.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Engine that plays Red in even games.
    #[arg(long, default_value = "mcts-serial")]
    first: EngineKind,
    /// Engine that plays Red in odd games.
    #[arg(long, default_value = "minimax-serial")]
    second: EngineKind,
    #[arg(long, default_value_t = 20)]
    games: u32,
    #[arg(long, default_value_t = SearchConfig::default().simulations)]
    simulations: u32,
    #[arg(long, default_value_t = SearchConfig::default().depth)]
    depth: u8,
    /// Worker threads of every session. Games are already played in
    /// parallel.
    #[arg(long, default_value_t = 1)]
    threads: usize,
    #[arg(long, default_value_t = SearchConfig::default().seed)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    first: u32,
    second: u32,
    draws: u32,
}

impl Tally {
    fn merge(self, other: Self) -> Self {
        Self {
            first: self.first + other.first,
            second: self.second + other.second,
            draws: self.draws + other.draws,
        }
    }
}

fn play_game(args: &Args, game: u32) -> anyhow::Result<Tally> {
    let config = SearchConfig {
        simulations: args.simulations,
        depth: args.depth,
        threads: args.threads,
        seed: args.seed.wrapping_add(u64::from(game)),
        ..SearchConfig::default()
    };
    let first_is_red = game % 2 == 0;
    let (red, yellow) = if first_is_red {
        (args.first, args.second)
    } else {
        (args.second, args.first)
    };
    let mut session = Session::new(Board::empty(), Player::Red, config)?;
    loop {
        let engine = match session.to_move() {
            Player::Red => red,
            Player::Yellow => yellow,
        };
        let column = session
            .search_move(engine)
            .with_context(|| format!("{engine} failed in game {game}"))?;
        match session.commit(column)? {
            GameStatus::Ongoing => continue,
            GameStatus::Draw => {
                return Ok(Tally {
                    draws: 1,
                    ..Tally::default()
                })
            },
            GameStatus::Win(winner) => {
                let first_won = (winner == Player::Red) == first_is_red;
                println!("game {game}: {winner} ({engine}) wins\n{}", session.board());
                return Ok(Tally {
                    first: u32::from(first_won),
                    second: u32::from(!first_won),
                    draws: 0,
                });
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.games == 0 {
        bail!("at least one game is required");
    }

    println!(
        "{} vs {}: {} games, {} simulations, depth {}",
        args.first, args.second, args.games, args.simulations, args.depth
    );

    let tally = (0..args.games)
        .into_par_iter()
        .map(|game| play_game(&args, game))
        .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?;

    println!(
        "{}: {} wins, {}: {} wins, {} draws",
        args.first, tally.first, args.second, tally.second, tally.draws
    );

    Ok(())
}
