#![no_main]
use connect4::board::{Board, Player, HEIGHT, WIDTH};
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    let mut board = Board::empty();
    let mut player = Player::Red;
    for &byte in data {
        if board.status().is_terminal() {
            break;
        }
        let column = usize::from(byte) % (WIDTH + 1);
        let expected = (0..WIDTH)
            .filter(|&column| board.at(HEIGHT - 1, column).is_none())
            .collect_vec();
        assert_eq!(board.legal_moves().to_vec(), expected);
        match board.play(column, player) {
            Ok(_) => player = !player,
            Err(_) => assert!(!expected.contains(&column)),
        }
        assert!(board.validate().is_ok(), "{board}");
    }
});
