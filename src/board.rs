//! Connect-4 board: a 7×6 grid filled from the bottom.
//!
//! Cells are stored in row-major order with row 0 at the bottom:
//!
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! [`Board`] is a small `Copy` value: every search branch works on its own
//! copy and never mutates a board visible to anyone else.

use std::fmt;
use std::ops::Not;

use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::error::{Error, Result};

/// Number of columns.
pub const WIDTH: usize = 7;
/// Number of rows.
pub const HEIGHT: usize = 6;
/// Total number of cells.
pub const CELLS: usize = WIDTH * HEIGHT;
/// Number of pieces in a row needed to win.
pub const CONNECT: usize = 4;
/// Column in the middle of the board, the most valuable one.
pub const CENTER_COLUMN: usize = WIDTH / 2;

/// Number of distinct 4-cell lines on the board: 24 horizontal, 21 vertical
/// and 12 for each diagonal direction.
const WINDOW_COUNT: usize = 69;

/// Every line of [`CONNECT`] cells (as cell indices) a player can win with.
static WINDOWS: [[usize; CONNECT]; WINDOW_COUNT] = build_windows();

const fn build_windows() -> [[usize; CONNECT]; WINDOW_COUNT] {
    // (row step, column step): horizontal, vertical, rising and falling
    // diagonals.
    const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];
    let mut windows = [[0; CONNECT]; WINDOW_COUNT];
    let mut next = 0;
    let mut direction = 0;
    while direction < DIRECTIONS.len() {
        let (row_step, column_step) = DIRECTIONS[direction];
        let mut row = 0;
        while row < HEIGHT {
            let mut column = 0;
            while column < WIDTH {
                let last_row = row as isize + row_step * (CONNECT as isize - 1);
                let last_column = column as isize + column_step * (CONNECT as isize - 1);
                if last_row >= 0 && last_row < HEIGHT as isize && last_column < WIDTH as isize {
                    let mut offset = 0;
                    while offset < CONNECT {
                        let r = (row as isize + row_step * offset as isize) as usize;
                        let c = (column as isize + column_step * offset as isize) as usize;
                        windows[next][offset] = r * WIDTH + c;
                        offset += 1;
                    }
                    next += 1;
                }
                column += 1;
            }
            row += 1;
        }
        direction += 1;
    }
    assert!(next == WINDOW_COUNT);
    windows
}

const fn index(row: usize, column: usize) -> usize {
    row * WIDTH + column
}

/// The two sides. Red conventionally moves first.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Red,
    Yellow,
}

impl Player {
    const fn symbol(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Yellow => 'y',
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Red => Self::Yellow,
            Self::Yellow => Self::Red,
        }
    }
}

impl TryFrom<char> for Player {
    type Error = Error;

    fn try_from(symbol: char) -> Result<Self> {
        match symbol {
            'r' | 'R' => Ok(Self::Red),
            'y' | 'Y' => Ok(Self::Yellow),
            _ => Err(Error::MalformedBoard(format!(
                "player should be 'r' or 'y', got '{symbol}'"
            ))),
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = Error;

    fn try_from(input: &str) -> Result<Self> {
        match input.trim() {
            "r" | "red" => Ok(Self::Red),
            "y" | "yellow" => Ok(Self::Yellow),
            other => Err(Error::MalformedBoard(format!(
                "player should be 'r' or 'y', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Yellow => write!(f, "yellow"),
        }
    }
}

/// Whether the game goes on and who won otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// At least one column is open and nobody has four in a row.
    Ongoing,
    /// The player has four in a row.
    Win(Player),
    /// The board is full and nobody won.
    Draw,
}

impl GameStatus {
    /// Returns `true` if no more moves can be played.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ongoing => write!(f, "ongoing"),
            Self::Win(player) => write!(f, "{player} wins"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// Fixed 7×6 grid. `None` is an empty cell.
///
/// The serialized form lists the rows from top to bottom, separated by `/`,
/// using `.` for empty cells and the [`Player`] symbols for the pieces:
///
/// ```
/// use connect4::board::{Board, Player};
///
/// let board = Board::try_from("......./......./......./......./......./...r...").unwrap();
/// assert_eq!(board.at(0, 3), Some(Player::Red));
/// assert_eq!(board.first_empty_row(3), Some(1));
/// assert_eq!(
///     board.to_string(),
///     "......./......./......./......./......./...r..."
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Player>; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// Creates a board without any pieces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    /// Builds a board from row-major cells (row 0 first) and checks that it
    /// could be reached in a real game.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBoard`] if the number of cells is not [`CELLS`] or
    /// the position violates [`Board::validate`].
    pub fn from_cells(cells: &[Option<Player>]) -> Result<Self> {
        let cells: [Option<Player>; CELLS] = cells.try_into().map_err(|_| {
            Error::MalformedBoard(format!("expected {CELLS} cells, got {}", cells.len()))
        })?;
        let board = Self { cells };
        board.validate()?;
        Ok(board)
    }

    /// Plays a sequence of columns (one digit per move) with alternating
    /// players, starting with `first`.
    ///
    /// ```
    /// use connect4::board::{Board, Player};
    ///
    /// let board = Board::from_moves("3324", Player::Red).unwrap();
    /// assert_eq!(board.at(0, 3), Some(Player::Red));
    /// assert_eq!(board.at(1, 3), Some(Player::Yellow));
    /// assert_eq!(board.at(0, 4), Some(Player::Yellow));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on non-digit characters and on illegal columns.
    pub fn from_moves(moves: &str, first: Player) -> Result<Self> {
        let mut board = Self::empty();
        let mut player = first;
        for symbol in moves.trim().chars() {
            let column = symbol.to_digit(10).ok_or_else(|| {
                Error::MalformedBoard(format!("expected a column digit, got '{symbol}'"))
            })? as usize;
            let _ = board.play(column, player)?;
            player = !player;
        }
        Ok(board)
    }

    /// Returns the piece at the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside of the board.
    #[must_use]
    pub fn at(&self, row: usize, column: usize) -> Option<Player> {
        assert!(row < HEIGHT && column < WIDTH);
        self.cells[index(row, column)]
    }

    /// Lowest unfilled row of the column, `None` if the column is full or does
    /// not exist.
    #[must_use]
    pub fn first_empty_row(&self, column: usize) -> Option<usize> {
        if column >= WIDTH {
            return None;
        }
        (0..HEIGHT).find(|&row| self.cells[index(row, column)].is_none())
    }

    /// Returns `true` if a piece can be dropped into the column.
    #[must_use]
    pub fn is_legal(&self, column: usize) -> bool {
        column < WIDTH && self.cells[index(HEIGHT - 1, column)].is_none()
    }

    /// Columns that are not full, in ascending order.
    #[must_use]
    pub fn legal_moves(&self) -> ArrayVec<usize, WIDTH> {
        (0..WIDTH).filter(|&column| self.is_legal(column)).collect()
    }

    /// Returns a copy of the board with the player's piece dropped into the
    /// column.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidColumn`] or [`Error::ColumnFull`].
    pub fn apply_move(&self, column: usize, player: Player) -> Result<Self> {
        let mut board = *self;
        let _ = board.play(column, player)?;
        Ok(board)
    }

    /// Drops the player's piece into the column and returns the row it landed
    /// on.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidColumn`] or [`Error::ColumnFull`].
    pub fn play(&mut self, column: usize, player: Player) -> Result<usize> {
        if column >= WIDTH {
            return Err(Error::InvalidColumn(column));
        }
        self.drop_piece(column, player)
            .ok_or(Error::ColumnFull(column))
    }

    /// Unchecked flavor of [`Board::play`] for the hot paths which already
    /// know the column is legal.
    pub(crate) fn drop_piece(&mut self, column: usize, player: Player) -> Option<usize> {
        let row = self.first_empty_row(column)?;
        self.cells[index(row, column)] = Some(player);
        Some(row)
    }

    /// Returns `true` if the player owns all cells of a horizontal, vertical
    /// or diagonal line of four.
    #[must_use]
    pub fn check_win(&self, player: Player) -> bool {
        WINDOWS
            .iter()
            .any(|window| window.iter().all(|&cell| self.cells[cell] == Some(player)))
    }

    /// Returns `true` if every column is full and neither player has four in a
    /// row.
    #[must_use]
    pub fn check_draw(&self) -> bool {
        self.is_full() && !self.check_win(Player::Red) && !self.check_win(Player::Yellow)
    }

    /// Counts lines of four that are still winnable by the player: those
    /// without any opponent pieces (empty lines included).
    #[must_use]
    pub fn count_open_lines(&self, player: Player) -> usize {
        let opponent = Some(!player);
        WINDOWS
            .iter()
            .filter(|window| window.iter().all(|&cell| self.cells[cell] != opponent))
            .count()
    }

    /// Counts the player's pieces in [`CENTER_COLUMN`].
    #[must_use]
    pub fn count_center(&self, player: Player) -> usize {
        (0..HEIGHT)
            .filter(|&row| self.cells[index(row, CENTER_COLUMN)] == Some(player))
            .count()
    }

    /// Counts the player's pieces on the board.
    #[must_use]
    pub fn pieces(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == Some(player))
            .count()
    }

    /// Number of cells that can still be filled.
    #[must_use]
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Returns `true` if no column can take another piece.
    #[must_use]
    pub fn is_full(&self) -> bool {
        (0..WIDTH).all(|column| !self.is_legal(column))
    }

    /// Classifies the position. A win is reported even if the board is also
    /// full.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        if self.check_win(Player::Red) {
            GameStatus::Win(Player::Red)
        } else if self.check_win(Player::Yellow) {
            GameStatus::Win(Player::Yellow)
        } else if self.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::Ongoing
        }
    }

    /// Checks that the position is reachable: no piece floats above an empty
    /// cell and the players' piece counts differ by at most one.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBoard`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for column in 0..WIDTH {
            let mut found_empty = false;
            for row in 0..HEIGHT {
                match self.cells[index(row, column)] {
                    None => found_empty = true,
                    Some(_) if found_empty => {
                        return Err(Error::MalformedBoard(format!(
                            "piece at row {row}, column {column} has no support"
                        )));
                    },
                    Some(_) => {},
                }
            }
        }
        let red = self.pieces(Player::Red);
        let yellow = self.pieces(Player::Yellow);
        if red.abs_diff(yellow) > 1 {
            return Err(Error::MalformedBoard(format!(
                "piece counts differ by more than one: {red} red, {yellow} yellow"
            )));
        }
        Ok(())
    }

    /// Human-readable grid with column labels, top row first.
    #[must_use]
    pub fn render(&self) -> String {
        let separator = "-".repeat(2 * WIDTH + 1);
        let header = (0..WIDTH).map(|column| format!(" {column}")).join("");
        let rows = (0..HEIGHT)
            .rev()
            .map(|row| {
                let cells = (0..WIDTH)
                    .map(|column| self.at(row, column).map_or('.', Player::symbol))
                    .join("|");
                format!("|{cells}|")
            })
            .join("\n");
        format!("{header}\n{separator}\n{rows}\n{separator}")
    }
}

impl TryFrom<&str> for Board {
    type Error = Error;

    /// Parses the `/`-separated serialized form (top row first) and validates
    /// the result.
    fn try_from(input: &str) -> Result<Self> {
        let rows: Vec<&str> = input.trim().split('/').collect();
        if rows.len() != HEIGHT {
            return Err(Error::MalformedBoard(format!(
                "expected {HEIGHT} rows, got {}",
                rows.len()
            )));
        }
        let mut cells = [None; CELLS];
        for (offset, line) in rows.iter().enumerate() {
            let row = HEIGHT - 1 - offset;
            let symbols: Vec<char> = line.chars().collect();
            if symbols.len() != WIDTH {
                return Err(Error::MalformedBoard(format!(
                    "expected {WIDTH} cells in row {row}, got '{line}'"
                )));
            }
            for (column, &symbol) in symbols.iter().enumerate() {
                cells[index(row, column)] = match symbol {
                    '.' => None,
                    _ => Some(Player::try_from(symbol)?),
                };
            }
        }
        Self::from_cells(&cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let serialized = (0..HEIGHT)
            .rev()
            .map(|row| {
                (0..WIDTH)
                    .map(|column| self.at(row, column).map_or('.', Player::symbol))
                    .collect::<String>()
            })
            .join("/");
        write!(f, "{serialized}")
    }
}
