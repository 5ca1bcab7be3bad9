//! Line-oriented text protocol, loosely modeled after [UCI].
//!
//! [UCI]: https://www.chessprogramming.org/UCI

use crate::board::Player;

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    /// Identify the engine and its build.
    Id,
    IsReady,
    /// Empty board, `first` moves first.
    NewGame {
        first: Player,
    },
    /// `board` is either `None` (start position) or the serialized board.
    SetPosition {
        board: Option<String>,
        moves: Vec<String>,
    },
    /// Opponent's move.
    Move {
        column: String,
    },
    Go {
        engine: Option<String>,
    },
    SetOption {
        option: EngineOption,
        value: String,
    },
    Display,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum EngineOption {
    Simulations,
    Depth,
    Exploration,
    Threads,
    Seed,
    Tactical,
}

impl TryFrom<&str> for EngineOption {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name.to_ascii_lowercase().as_str() {
            "simulations" => Ok(Self::Simulations),
            "depth" => Ok(Self::Depth),
            "exploration" => Ok(Self::Exploration),
            "threads" => Ok(Self::Threads),
            "seed" => Ok(Self::Seed),
            "tactical" => Ok(Self::Tactical),
            _ => Err(()),
        }
    }
}

fn parse_setoption(parts: &[&str], input: &str) -> Command {
    match parts {
        [_, "name", name, "value", value] => match EngineOption::try_from(*name) {
            Ok(option) => Command::SetOption {
                option,
                value: (*value).to_string(),
            },
            Err(()) => Command::Unknown(input.to_string()),
        },
        _ => Command::Unknown(input.to_string()),
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let moves_index = parts.iter().position(|&x| x == "moves");
    let board = parts[1..moves_index.unwrap_or(parts.len())]
        .first()
        .filter(|&&board| board != "startpos")
        .map(|&board| board.to_string());
    let moves = moves_index.map_or_else(Vec::new, |index| {
        parts[index + 1..].iter().map(|s| (*s).to_string()).collect()
    });
    Command::SetPosition { board, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let input = input.trim();
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(&command) = parts.first() else {
            return Self::Unknown(input.to_string());
        };

        match command {
            "id" => Self::Id,
            "isready" => Self::IsReady,
            "new" => match parts.get(1).map(|&player| Player::try_from(player)) {
                None => Self::NewGame { first: Player::Red },
                Some(Ok(first)) => Self::NewGame { first },
                Some(Err(_)) => Self::Unknown(input.to_string()),
            },
            "position" => parse_setposition(&parts),
            "move" if parts.len() == 2 => Self::Move {
                column: parts[1].to_string(),
            },
            "go" => Self::Go {
                engine: parts.get(1).map(|&engine| engine.to_string()),
            },
            "setoption" => parse_setoption(&parts, input),
            "d" => Self::Display,
            "quit" => Self::Quit,
            _ => Self::Unknown(input.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_simple() {
        assert_eq!(Command::parse("id"), Command::Id);
        assert_eq!(Command::parse("isready\n"), Command::IsReady);
        assert_eq!(Command::parse("  d "), Command::Display);
        assert_eq!(Command::parse("quit"), Command::Quit);
    }

    #[test]
    fn parse_new_game() {
        assert_eq!(
            Command::parse("new"),
            Command::NewGame { first: Player::Red }
        );
        assert_eq!(
            Command::parse("new y"),
            Command::NewGame {
                first: Player::Yellow
            }
        );
        assert_eq!(
            Command::parse("new blue"),
            Command::Unknown("new blue".to_string())
        );
    }

    #[test]
    fn parse_setposition() {
        assert_eq!(
            Command::parse("position startpos"),
            Command::SetPosition {
                board: None,
                moves: vec![]
            }
        );
        assert_eq!(
            Command::parse("position startpos moves 3 3 4"),
            Command::SetPosition {
                board: None,
                moves: vec!["3".to_string(), "3".to_string(), "4".to_string()]
            }
        );
        let board = "......./......./......./......./......./...r...";
        assert_eq!(
            Command::parse(&format!("position {board} moves 2")),
            Command::SetPosition {
                board: Some(board.to_string()),
                moves: vec!["2".to_string()]
            }
        );
        assert_eq!(
            Command::parse("position"),
            Command::SetPosition {
                board: None,
                moves: vec![]
            }
        );
    }

    #[test]
    fn parse_move_and_go() {
        assert_eq!(
            Command::parse("move 4"),
            Command::Move {
                column: "4".to_string()
            }
        );
        assert_eq!(
            Command::parse("move"),
            Command::Unknown("move".to_string())
        );
        assert_eq!(Command::parse("go"), Command::Go { engine: None });
        assert_eq!(
            Command::parse("go minimax-parallel"),
            Command::Go {
                engine: Some("minimax-parallel".to_string())
            }
        );
    }

    #[test]
    fn parse_setoption() {
        assert_eq!(
            Command::parse("setoption name Simulations value 500"),
            Command::SetOption {
                option: EngineOption::Simulations,
                value: "500".to_string()
            }
        );
        assert_eq!(
            Command::parse("setoption name tactical value true"),
            Command::SetOption {
                option: EngineOption::Tactical,
                value: "true".to_string()
            }
        );
        assert_eq!(
            Command::parse("setoption name Hash value 128"),
            Command::Unknown("setoption name Hash value 128".to_string())
        );
        assert_eq!(
            Command::parse("setoption depth 3"),
            Command::Unknown("setoption depth 3".to_string())
        );
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
        assert_eq!(
            Command::parse("uci"),
            Command::Unknown("uci".to_string())
        );
    }
}
