//! Line decomposition of the board
//!
//! Line ids:
//! - `0..8`: rows, cells ordered by column
//! - `8..16`: columns, cells ordered by row
//! - `16..31`: down-right diagonals (`col - row` constant), ordered by row
//! - `31..46`: up-right diagonals (`col + row` constant), ordered by column
//!
//! Every cell sits in exactly one line of each family, so each cell has four memberships.

use std::sync::OnceLock;

use crate::{cell_index, BOARD_SIZE, CELL_COUNT};

pub const LINE_COUNT: usize = 46;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
    DiagDown,
    DiagUp,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Row,
        Direction::Column,
        Direction::DiagDown,
        Direction::DiagUp,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub direction: Direction,
    pub len: u8,
    cells: [u8; BOARD_SIZE as usize],
}

impl Line {
    fn from_cells(direction: Direction, cells: impl Iterator<Item = u8>) -> Self {
        let mut line = Line {
            direction,
            len: 0,
            cells: [0; BOARD_SIZE as usize],
        };
        for cell in cells {
            line.cells[line.len as usize] = cell;
            line.len += 1;
        }
        line
    }

    /// Cells of the line in offset order.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells[..self.len as usize]
    }
}

/// A line crossing a cell, and the cell's offset within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    pub line: u8,
    pub offset: u8,
}

#[derive(Debug)]
pub struct Geometry {
    lines: Vec<Line>,
    members: [[Membership; 4]; CELL_COUNT],
}

/// Line id of row `row`.
pub fn row_line(row: u8) -> usize {
    row as usize
}

/// Line id of column `col`.
pub fn column_line(col: u8) -> usize {
    8 + col as usize
}

/// Line id of the down-right diagonal with `col - row == diff`.
pub fn diag_down_line(diff: i8) -> usize {
    (23 + diff) as usize
}

/// Line id of the up-right diagonal with `col + row == sum`.
pub fn diag_up_line(sum: u8) -> usize {
    31 + sum as usize
}

impl Geometry {
    pub fn build() -> Self {
        let n = BOARD_SIZE as i8;
        let mut lines = Vec::with_capacity(LINE_COUNT);
        for row in 0..BOARD_SIZE {
            lines.push(Line::from_cells(
                Direction::Row,
                (0..BOARD_SIZE).map(|col| cell_index(col, row)),
            ));
        }
        for col in 0..BOARD_SIZE {
            lines.push(Line::from_cells(
                Direction::Column,
                (0..BOARD_SIZE).map(|row| cell_index(col, row)),
            ));
        }
        for diff in -(n - 1)..n {
            lines.push(Line::from_cells(
                Direction::DiagDown,
                (0..n)
                    .map(move |row| (row + diff, row))
                    .filter(|&(col, _)| (0..n).contains(&col))
                    .map(|(col, row)| cell_index(col as u8, row as u8)),
            ));
        }
        for sum in 0..(2 * n - 1) {
            lines.push(Line::from_cells(
                Direction::DiagUp,
                (0..n)
                    .map(move |col| (col, sum - col))
                    .filter(|&(_, row)| (0..n).contains(&row))
                    .map(|(col, row)| cell_index(col as u8, row as u8)),
            ));
        }
        debug_assert_eq!(lines.len(), LINE_COUNT);

        let mut members = [[Membership::default(); 4]; CELL_COUNT];
        for (id, line) in lines.iter().enumerate() {
            for (offset, &cell) in line.cells().iter().enumerate() {
                members[cell as usize][line.direction.index()] = Membership {
                    line: id as u8,
                    offset: offset as u8,
                };
            }
        }

        tracing::debug!(lines = lines.len(), "board geometry built");
        Geometry { lines, members }
    }

    /// Process-wide geometry, built on first use.
    pub fn shared() -> &'static Geometry {
        static GEOMETRY: OnceLock<Geometry> = OnceLock::new();
        GEOMETRY.get_or_init(Geometry::build)
    }

    #[inline]
    pub fn line(&self, id: usize) -> &Line {
        &self.lines[id]
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The four lines through `cell`, in [`Direction::ALL`] order.
    #[inline]
    pub fn memberships(&self, cell: u8) -> &[Membership; 4] {
        &self.members[cell as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_coords;

    #[test]
    fn test_every_cell_once_per_direction() {
        let geometry = Geometry::build();
        for direction in Direction::ALL {
            let mut seen = [0u8; CELL_COUNT];
            for line in geometry.lines().iter().filter(|l| l.direction == direction) {
                for &cell in line.cells() {
                    seen[cell as usize] += 1;
                }
            }
            assert!(seen.iter().all(|&n| n == 1), "{direction:?}");
        }
    }

    #[test]
    fn test_memberships_point_back_at_the_cell() {
        let geometry = Geometry::build();
        for cell in 0..CELL_COUNT as u8 {
            for (m, direction) in geometry.memberships(cell).iter().zip(Direction::ALL) {
                let line = geometry.line(m.line as usize);
                assert_eq!(line.direction, direction);
                assert_eq!(line.cells()[m.offset as usize], cell);
            }
        }
    }

    #[test]
    fn test_line_ids() {
        let geometry = Geometry::build();
        assert_eq!(geometry.line(row_line(3)).cells()[5], cell_index(5, 3));
        assert_eq!(geometry.line(column_line(2)).cells()[7], cell_index(2, 7));

        let main = geometry.line(diag_down_line(0));
        assert_eq!(main.len, 8);
        assert!(main.cells().iter().all(|&c| {
            let (col, row) = cell_coords(c);
            col == row
        }));

        let anti = geometry.line(diag_up_line(7));
        assert_eq!(anti.len, 8);
        assert_eq!(anti.cells()[0], cell_index(0, 7));
        assert_eq!(anti.cells()[7], cell_index(7, 0));

        assert_eq!(geometry.line(diag_down_line(-7)).cells(), &[cell_index(0, 7)]);
        assert_eq!(geometry.line(diag_up_line(0)).cells(), &[cell_index(0, 0)]);
        assert_eq!(geometry.line(diag_up_line(14)).cells(), &[cell_index(7, 7)]);
    }
}
