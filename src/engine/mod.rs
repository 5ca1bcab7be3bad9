//! The engine puts all pieces together: it keeps a [`Session`] for the game
//! in progress and drives it through the text [protocol] read from the input
//! stream.
//!
//! [`Engine::run`] is the "main loop" of the engine which communicates with
//! the environment and executes commands from the input stream.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use itertools::Itertools;
use tracing::debug;

use crate::board::{Board, GameStatus, Player};
use crate::config::SearchConfig;
use crate::engine::protocol::{Command, EngineOption};
use crate::session::{EngineKind, SearchReport, Session};

mod protocol;

/// The Engine connects everything together and handles commands sent by the
/// client, including I/O.
pub struct Engine<'a, R: BufRead, W: Write> {
    session: Session,
    /// Player that moves first in new games and on boards with equal piece
    /// counts.
    first: Player,
    /// Used by `go` without an explicit engine.
    engine: EngineKind,
    input: &'a mut R,
    output: &'a mut W,
}

impl<'a, R: BufRead, W: Write> Engine<'a, R, W> {
    /// Creates a new instance of the engine with an empty board and provided
    /// I/O.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(
        engine: EngineKind,
        config: SearchConfig,
        input: &'a mut R,
        output: &'a mut W,
    ) -> anyhow::Result<Self> {
        let session = Session::new(Board::empty(), Player::Red, config)
            .context("failed to start the search session")?;
        Ok(Self {
            session,
            first: Player::Red,
            engine,
            input,
            output,
        })
    }

    /// Continuously reads the input stream and executes the commands until
    /// `quit` is sent or the stream ends.
    ///
    /// Invalid commands and arguments are reported as `info string` lines and
    /// do not stop the loop.
    ///
    /// # Errors
    ///
    /// Only reading from the input and writing to the output fail the loop.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            if self
                .input
                .read_line(&mut line)
                .context("failed to read from input")?
                == 0
            {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let command = Command::parse(&line);
            debug!(?command, "received");
            let result = match command {
                Command::Id => crate::write_engine_info(&mut *self.output).map_err(Into::into),
                Command::IsReady => self.handle_isready(),
                Command::NewGame { first } => self.handle_new(first),
                Command::SetPosition { board, moves } => {
                    self.handle_position(board.as_deref(), &moves)
                },
                Command::Move { column } => self.handle_move(&column),
                Command::Go { engine } => self.handle_go(engine.as_deref()),
                Command::SetOption { option, value } => self.handle_setoption(&option, &value),
                Command::Display => self.handle_display(),
                Command::Quit => break,
                Command::Unknown(command) => {
                    writeln!(self.output, "info string Unsupported command: {command}")
                        .map_err(Into::into)
                },
            };
            if let Err(e) = result {
                writeln!(self.output, "info string {e:#}")?;
            }
            self.output.flush()?;
        }
        Ok(())
    }

    /// Syncs with the client by responding with `readyok`.
    fn handle_isready(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "readyok")?;
        Ok(())
    }

    fn handle_new(&mut self, first: Player) -> anyhow::Result<()> {
        self.first = first;
        self.session.reset(Board::empty(), first)?;
        Ok(())
    }

    /// Changes the position to the serialized board (or the empty one) and
    /// plays the moves on top of it. The position is left untouched if any
    /// part is invalid.
    fn handle_position(&mut self, board: Option<&str>, moves: &[String]) -> anyhow::Result<()> {
        let mut board = match board {
            Some(board) => Board::try_from(board)?,
            None => Board::empty(),
        };
        let mut player = side_to_move(&board, self.first);
        for token in moves {
            let column = parse_column(token)?;
            let _ = board
                .play(column, player)
                .with_context(|| format!("illegal move {column} for {player}"))?;
            player = !player;
        }
        self.session.reset(board, player)?;
        Ok(())
    }

    fn handle_move(&mut self, column: &str) -> anyhow::Result<()> {
        let status = self.session.commit(parse_column(column)?)?;
        self.report_status(status)
    }

    /// Searches the current position, plays the chosen column and reports it
    /// as `bestmove`.
    fn handle_go(&mut self, engine: Option<&str>) -> anyhow::Result<()> {
        let engine = match engine {
            Some(engine) => engine.parse()?,
            None => self.engine,
        };
        let report = self.session.search(engine)?;
        self.write_report(&report)?;
        let status = self.session.commit(report.column)?;
        writeln!(self.output, "bestmove {}", report.column)?;
        self.report_status(status)
    }

    fn write_report(&mut self, report: &SearchReport) -> anyhow::Result<()> {
        write!(
            self.output,
            "info engine {} nodes {} time {}",
            report.engine,
            report.nodes,
            report.elapsed.as_millis()
        )?;
        if let Some(score) = report.score {
            write!(self.output, " score {score}")?;
        }
        if let Some(visits) = report.visits {
            write!(self.output, " visits {}", visits.iter().join(" "))?;
        }
        if report.tactical {
            write!(self.output, " tactical")?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn report_status(&mut self, status: GameStatus) -> anyhow::Result<()> {
        if status.is_terminal() {
            writeln!(self.output, "info string game over: {status}")?;
        }
        Ok(())
    }

    /// Sets one of the search parameters. Changes apply to the next `go`.
    fn handle_setoption(&mut self, option: &EngineOption, value: &str) -> anyhow::Result<()> {
        let mut config = self.session.config().clone();
        let invalid = || format!("invalid value for {option:?}: {value}");
        match option {
            EngineOption::Simulations => config.simulations = value.parse().with_context(invalid)?,
            EngineOption::Depth => config.depth = value.parse().with_context(invalid)?,
            EngineOption::Exploration => config.exploration = value.parse().with_context(invalid)?,
            EngineOption::Threads => config.threads = value.parse().with_context(invalid)?,
            EngineOption::Seed => config.seed = value.parse().with_context(invalid)?,
            EngineOption::Tactical => config.tactical = value.parse().with_context(invalid)?,
        }
        self.session.set_config(config)?;
        Ok(())
    }

    fn handle_display(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{}", self.session.board().render())?;
        writeln!(self.output, "board {}", self.session.board())?;
        writeln!(
            self.output,
            "to move {} status {}",
            self.session.to_move(),
            self.session.status()
        )?;
        Ok(())
    }
}

fn parse_column(token: &str) -> anyhow::Result<usize> {
    match token.parse() {
        Ok(column) => Ok(column),
        Err(_) => bail!("expected a column number, got {token:?}"),
    }
}

/// The player with fewer pieces moves, `first` breaks the tie.
fn side_to_move(board: &Board, first: Player) -> Player {
    let other = !first;
    if board.pieces(first) > board.pieces(other) {
        other
    } else {
        first
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(script: &str) -> String {
        let config = SearchConfig {
            simulations: 200,
            depth: 2,
            threads: 2,
            ..SearchConfig::default()
        };
        let mut input = script.as_bytes();
        let mut output = Vec::new();
        Engine::new(EngineKind::default(), config, &mut input, &mut output)
            .unwrap()
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn side_to_move_follows_piece_counts() {
        let board = Board::from_moves("3", Player::Red).unwrap();
        assert_eq!(side_to_move(&board, Player::Red), Player::Yellow);
        assert_eq!(side_to_move(&Board::empty(), Player::Yellow), Player::Yellow);
        let board = Board::from_moves("3", Player::Yellow).unwrap();
        assert_eq!(side_to_move(&board, Player::Yellow), Player::Red);
    }

    #[test]
    fn isready_and_quit() {
        assert_eq!(run("isready\nquit\nisready\n"), "readyok\n");
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(run("\n   \nisready\n\t\n"), "readyok\n");
    }

    #[test]
    fn unsupported_commands() {
        assert_eq!(
            run("uci\nsetoption name Hash value 1\n"),
            "info string Unsupported command: uci\n\
             info string Unsupported command: setoption name Hash value 1\n"
        );
    }

    #[test]
    fn position_and_display() {
        let output = run("position startpos moves 3 3 4\nd\n");
        assert!(output.contains("board ......./......./......./......./...y.../...rr.."));
        assert!(output.contains("to move yellow status ongoing"), "{output}");
    }

    #[test]
    fn invalid_input_keeps_the_position() {
        let output = run("position startpos moves 3 9\nmove x\nmove 3\nd\n");
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("info string illegal move 9"), "{output}");
        assert!(lines[1].starts_with("info string expected a column number"), "{output}");
        assert!(output.contains("board ......./......./......./......./......./...r..."));
    }

    #[test]
    fn go_plays_a_move() {
        let output = run("setoption name depth value 1\ngo minimax\nd\n");
        assert!(output.contains("info engine minimax-serial nodes 8"), "{output}");
        assert!(output.contains("bestmove 3\n"), "{output}");
        assert!(output.contains("to move yellow"), "{output}");
    }

    #[test]
    fn go_reports_errors() {
        let output = run("go alphazero\nsetoption name threads value 0\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "{output}");
        assert!(lines[0].contains("unknown engine"));
        assert!(lines[1].contains("invalid search configuration"));
    }

    #[test]
    fn game_over_is_reported() {
        let output = run("position startpos moves 0 1 0 1 0 1\ngo minimax\ngo\n");
        assert!(output.contains("bestmove 0\n"), "{output}");
        assert!(output.contains("info string game over: red wins"), "{output}");
        assert!(output.ends_with("info string the game is over: red has four in a row\n"), "{output}");
    }
}
