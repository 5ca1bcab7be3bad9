use crate::board::{Board, Player};

/// Column that wins on the spot for the player or, failing that, the one
/// that stops the opponent from winning on the next move. The lowest column
/// is returned when there are several.
///
/// ```
/// use connect4::board::{Board, Player};
/// use connect4::search::immediate_move;
///
/// // Yellow threatens to complete column 6.
/// let board = Board::from_moves("060616", Player::Red).unwrap();
/// assert_eq!(immediate_move(&board, Player::Red), Some(6));
/// assert_eq!(immediate_move(&Board::empty(), Player::Red), None);
/// ```
#[must_use]
pub fn immediate_move(board: &Board, player: Player) -> Option<usize> {
    winning_column(board, player).or_else(|| winning_column(board, !player))
}

fn winning_column(board: &Board, player: Player) -> Option<usize> {
    board.legal_moves().into_iter().find(|&column| {
        board
            .apply_move(column, player)
            .is_ok_and(|next| next.check_win(player))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_beats_block() {
        // Both sides have three on the bottom row, Red to move.
        let board = Board::from_moves("041526", Player::Red).unwrap();
        assert_eq!(immediate_move(&board, Player::Red), Some(3));
        assert_eq!(winning_column(&board, Player::Yellow), Some(3));
    }

    #[test]
    fn blocks_vertical_threat() {
        let board = Board::from_moves("060616", Player::Red).unwrap();
        assert_eq!(winning_column(&board, Player::Red), None);
        assert_eq!(immediate_move(&board, Player::Red), Some(6));
    }

    #[test]
    fn quiet_positions() {
        for moves in ["", "3", "3344", "0123"] {
            let board = Board::from_moves(moves, Player::Red).unwrap();
            assert_eq!(immediate_move(&board, Player::Red), None, "{moves}");
        }
    }
}
