//! Branch-parallel alpha-beta.
//!
//! All children of a ply are searched at once on the worker pool with the
//! window the ply was entered with. The results are then folded in column
//! order with the same update and cutoff rules as the serial search, so both
//! pick the same column. Work that a cutoff would have skipped is already done
//! by then and only its result is ignored.

use rayon::prelude::*;

use super::{leaf_result, mover, Depth, SearchResult, Window};
use crate::board::{Board, Player};

pub(super) fn alpha_beta(
    board: &Board,
    depth: Depth,
    window: Window,
    maximizing: bool,
    maximizer: Player,
) -> SearchResult {
    if let Some(leaf) = leaf_result(board, depth, maximizing, maximizer) {
        return leaf;
    }
    let player = mover(maximizing, maximizer);
    let children: Vec<(usize, SearchResult)> = board
        .legal_moves()
        .as_slice()
        .par_iter()
        .map(|&column| {
            let mut child = *board;
            let _ = child.drop_piece(column, player);
            (
                column,
                alpha_beta(&child, depth - 1, window, !maximizing, maximizer),
            )
        })
        .collect();

    let mut best = SearchResult::worst(maximizing);
    best.nodes += children.iter().map(|(_, result)| result.nodes).sum::<u64>();
    let mut window = window;
    for (column, result) in children {
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
    use crate::search::minimax;

    #[test]
    fn visits_at_least_as_many_nodes() {
        let board = Board::from_moves("3342", Player::Red).unwrap();
        let serial = minimax::alpha_beta(&board, 4, Window::full(), true, Player::Red);
        let parallel = alpha_beta(&board, 4, Window::full(), true, Player::Red);
        assert_eq!(parallel.column, serial.column);
        assert!(parallel.nodes >= serial.nodes);
    }
}
