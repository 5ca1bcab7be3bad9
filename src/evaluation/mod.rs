//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position without [`crate::search`].
//!
//! The same evaluator scores minimax leaves and terminal MCTS leaves.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use crate::board::{Board, Player};

mod score;

pub use score::Score;

/// Weight of a line of four that is still winnable.
pub const LINE_WEIGHT: i32 = 10;
/// Weight of a piece in the center column.
pub const CENTER_WEIGHT: i32 = 1;

/// Scores the position from the player's perspective.
///
/// Four in a row on the board dominates everything else ([`Score::WIN`] or
/// [`Score::LOSS`]). Otherwise the score combines the difference in open lines
/// (see [`Board::count_open_lines`]) with the difference in center column
/// pieces, weighting the lines more heavily.
///
/// ```
/// use connect4::board::{Board, Player};
/// use connect4::evaluation::{evaluate, Score};
///
/// assert_eq!(evaluate(&Board::empty(), Player::Red), Score::EVEN);
/// let board = Board::from_moves("60616253", Player::Red).unwrap();
/// assert_eq!(evaluate(&board, Player::Red), Score::LOSS);
/// ```
#[must_use]
pub fn evaluate(board: &Board, player: Player) -> Score {
    let opponent = !player;
    if board.check_win(player) {
        return Score::WIN;
    }
    if board.check_win(opponent) {
        return Score::LOSS;
    }
    let lines = difference(
        board.count_open_lines(player),
        board.count_open_lines(opponent),
    );
    let center = difference(board.count_center(player), board.count_center(opponent));
    Score::new(LINE_WEIGHT * lines + CENTER_WEIGHT * center)
}

// Both counts are bounded by the number of lines on the board.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn difference(ours: usize, theirs: usize) -> i32 {
    ours as i32 - theirs as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetry() {
        for moves in ["3", "34", "3344", "01234", "3332221"] {
            let board = Board::from_moves(moves, Player::Red).unwrap();
            assert_eq!(evaluate(&board, Player::Red), -evaluate(&board, Player::Yellow));
        }
    }

    #[test]
    fn center_is_preferred() {
        let center = Board::empty().apply_move(3, Player::Red).unwrap();
        let edge = Board::empty().apply_move(0, Player::Red).unwrap();
        assert!(evaluate(&center, Player::Red) > evaluate(&edge, Player::Red));
        // 7 lines blocked for the opponent plus the center piece.
        assert_eq!(evaluate(&center, Player::Red), Score::new(7 * LINE_WEIGHT + 1));
    }

    #[test]
    fn more_pieces_never_hurt() {
        for moves in ["", "3", "34", "3344", "012345", "3332221"] {
            let board = Board::from_moves(moves, Player::Red).unwrap();
            let before = evaluate(&board, Player::Red);
            for column in board.legal_moves() {
                let after = board.apply_move(column, Player::Red).unwrap();
                assert!(evaluate(&after, Player::Red) >= before, "{moves} + {column}");
            }
        }
    }

    #[test]
    fn decided_positions() {
        let red_wins = Board::from_moves("0101010", Player::Red).unwrap();
        assert_eq!(evaluate(&red_wins, Player::Red), Score::WIN);
        assert_eq!(evaluate(&red_wins, Player::Yellow), Score::LOSS);
    }

    #[test]
    fn heuristic_is_bounded() {
        // The maximum possible heuristic magnitude stays below the sentinel.
        let bound = 69 * LINE_WEIGHT + 6 * CENTER_WEIGHT;
        assert!(bound < Score::WIN.value());
    }
}
