//! Depth-first [Alpha-Beta] search on the calling thread.
//!
//! [Alpha-Beta]: https://www.chessprogramming.org/Alpha-Beta

use super::{leaf_result, mover, Depth, SearchResult, Window};
use crate::board::{Board, Player};

/// Fail-soft alpha-beta. Children are searched in column order and a cutoff
/// skips the remaining ones.
///
/// Cutoffs happen at maximizing plies too, not only at minimizing ones. This
/// changes node counts but never the root score or column: the root window is
/// full and ties keep the lowest column.
pub(super) fn alpha_beta(
    board: &Board,
    depth: Depth,
    mut window: Window,
    maximizing: bool,
    maximizer: Player,
) -> SearchResult {
    if let Some(leaf) = leaf_result(board, depth, maximizing, maximizer) {
        return leaf;
    }
    let player = mover(maximizing, maximizer);
    let mut best = SearchResult::worst(maximizing);
    for column in board.legal_moves() {
        let mut child = *board;
        let _ = child.drop_piece(column, player);
        let result = alpha_beta(&child, depth - 1, window, !maximizing, maximizer);
        best.nodes += result.nodes;
        if best.consider(column, result.score, maximizing, &mut window) {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::evaluation::Score;

    fn search(moves: &str, depth: Depth) -> SearchResult {
        let board = Board::from_moves(moves, Player::Red).unwrap();
        let to_move = if moves.len() % 2 == 0 {
            Player::Red
        } else {
            Player::Yellow
        };
        alpha_beta(&board, depth, Window::full(), true, to_move)
    }

    /// Plain minimax with the same leaf rules and tie-breaking but no pruning.
    fn exhaustive(
        board: &Board,
        depth: Depth,
        maximizing: bool,
        maximizer: Player,
    ) -> SearchResult {
        if let Some(leaf) = leaf_result(board, depth, maximizing, maximizer) {
            return leaf;
        }
        let player = mover(maximizing, maximizer);
        let mut best = SearchResult::worst(maximizing);
        for column in board.legal_moves() {
            let mut child = *board;
            let _ = child.drop_piece(column, player);
            let result = exhaustive(&child, depth - 1, !maximizing, maximizer);
            best.nodes += result.nodes;
            let _ = best.consider(column, result.score, maximizing, &mut Window::full());
        }
        best
    }

    #[test]
    fn pruning_keeps_the_root_decision() {
        let mut pruned_any = false;
        for moves in ["", "3", "3342", "012345", "2345432", "4433555"] {
            let board = Board::from_moves(moves, Player::Red).unwrap();
            let to_move = if moves.len() % 2 == 0 {
                Player::Red
            } else {
                Player::Yellow
            };
            for depth in 1..=4 {
                let pruned = alpha_beta(&board, depth, Window::full(), true, to_move);
                let full = exhaustive(&board, depth, true, to_move);
                assert_eq!(pruned.column, full.column, "{moves} depth {depth}");
                assert_eq!(pruned.score, full.score, "{moves} depth {depth}");
                assert!(pruned.nodes <= full.nodes, "{moves} depth {depth}");
                pruned_any |= pruned.nodes < full.nodes;
            }
        }
        assert!(pruned_any);
    }

    #[test]
    fn takes_the_win() {
        // Red has three on the bottom row.
        for depth in 1..=4 {
            let result = search("061626", depth);
            assert_eq!(result.column, Some(3), "depth {depth}");
        }
        assert_eq!(search("061626", 1).score, Score::WIN);
        assert_eq!(search("061626", 2).score, Score::INFINITY);
    }

    #[test]
    fn blocks_the_loss() {
        // Yellow has three in column 6, Red has no threat of its own.
        for depth in 2..=4 {
            assert_eq!(search("060616", depth).column, Some(6), "depth {depth}");
        }
    }

    #[test]
    fn yellow_searches_too() {
        // Same threat, mirrored colors: Yellow completes the bottom row.
        assert_eq!(search("6051625", 2).column, Some(3));
    }

    #[test]
    fn pruning_saves_nodes() {
        // Without pruning a depth 3 search from the empty board visits
        // 1 + 7 + 49 + 343 positions.
        let result = search("", 3);
        assert!(result.column.is_some());
        assert!(result.nodes < 1 + 7 + 49 + 343);
    }
}
