//! Line-indexed Othello board
//!
//! The 8x8 grid is stored as 46 base-3 line codes: 8 rows, 8 columns and the 15 diagonals
//! of each orientation. Every question the engine asks of a position (is this move legal,
//! what does it flip, what are the pattern features, how mobile is each side) is answered
//! by table lookups on those codes:
//! - [`line_table`]: per-line transition tables, built once and shared
//! - [`geometry`]: which cells make up each line and which lines cross each cell
//! - [`board`]: move legality, incremental move application, snapshot/restore
//! - [`pattern`]: the 46 evaluation features read from the line codes
//! - [`game`]: side to move, passes, game end and undo on top of a [`Board`]

pub mod board;
pub mod game;
pub mod geometry;
pub mod line_table;
pub mod pattern;

pub use board::{Board, CellBits, Snapshot};
pub use game::{Game, TurnCommand, TurnOutcome};
pub use geometry::{Geometry, LINE_COUNT};
pub use line_table::{LineTable, LineTables, MoveEntry};
pub use pattern::{Features, FEATURE_COUNT, FEATURE_GROUP, GROUP_COUNT, GROUP_SIZES};

use thiserror::Error;

/// Cells along one side of the board.
pub const BOARD_SIZE: u8 = 8;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 64;

/// Plies in a game that never passes: one per initially empty cell.
pub const MAX_PLY: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{player:?} cannot play at cell {cell}")]
    IllegalMove { cell: u8, player: Player },

    #[error("cell index {cell} is out of range (must be 0-63)")]
    OutOfRange { cell: usize },

    #[error("the game is already over")]
    GameOver,

    #[error("there is no move to undo")]
    NothingToUndo,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(&self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Convert player to cell representation
    pub fn to_cell(&self) -> Cell {
        match self {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }

    /// Sign convention shared by every aggregate: Black counts positive, White negative.
    #[inline]
    pub fn sign(&self) -> i32 {
        match self {
            Player::Black => 1,
            Player::White => -1,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// Base-3 digit used in line and pattern codes.
    #[inline]
    pub fn digit(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => 2,
        }
    }

    #[inline]
    pub fn from_digit(digit: u8) -> Cell {
        match digit {
            0 => Cell::Empty,
            1 => Cell::Black,
            _ => Cell::White,
        }
    }

    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }
}

/// Cell index for 0-based `(col, row)`.
#[inline]
pub fn cell_index(col: u8, row: u8) -> u8 {
    debug_assert!(col < BOARD_SIZE && row < BOARD_SIZE);
    row * BOARD_SIZE + col
}

/// 0-based `(col, row)` of a cell index.
#[inline]
pub fn cell_coords(cell: u8) -> (u8, u8) {
    (cell % BOARD_SIZE, cell / BOARD_SIZE)
}

/// Parse an algebraic square such as `"D3"` (file letter = column, rank digit = row + 1).
pub fn parse_square(square: &str) -> Option<u8> {
    let mut chars = square.chars();
    let file = chars.next()?.to_ascii_uppercase();
    let rank = chars.next()?;
    if chars.next().is_some() || !('A'..='H').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some(cell_index(file as u8 - b'A', rank as u8 - b'1'))
}

/// Algebraic name of a cell, the inverse of [`parse_square`].
pub fn square_name(cell: u8) -> String {
    let (col, row) = cell_coords(cell);
    format!("{}{}", (b'A' + col) as char, row + 1)
}
