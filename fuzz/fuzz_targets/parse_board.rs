#![no_main]
use connect4::board::Board;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(board) = Board::try_from(s) {
            let serialized = board.to_string();
            assert_eq!(Board::try_from(serialized.as_str()).ok(), Some(board));
        }
    }
});
