//! The board as 46 line codes
//!
//! A [`Board`] never stores cells directly. Each of the 46 lines from [`Geometry`] holds its
//! base-3 code, and every cell read, legality test and move is answered through the shared
//! [`LineTables`]. Playing a move:
//! - replaces the code of each line through the played cell with the table's post-move code
//! - toggles every captured disc in the other three lines crossing it
//!
//! The empty-cell set is a bitmask that only ever loses bits.

use std::fmt;

use crate::geometry::{Geometry, LINE_COUNT};
use crate::line_table::{digit, encode, LineTable, LineTables, MAX_LINE_LEN};
use crate::pattern::{self, Features};
use crate::{cell_index, Cell, GameError, Player, BOARD_SIZE, CELL_COUNT};

/// Copy of a board's mutable state, taken before a move and handed back to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    lines: [u16; LINE_COUNT],
    empties: u64,
}

#[derive(Clone)]
pub struct Board {
    tables: &'static LineTables,
    geometry: &'static Geometry,
    lines: [u16; LINE_COUNT],
    empties: u64,
}

/// Iterator over the set bits of a cell mask, lowest cell first.
#[derive(Debug, Clone, Copy)]
pub struct CellBits(u64);

impl Iterator for CellBits {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let cell = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl Board {
    /// Standard starting position: D4/E5 white, E4/D5 black.
    pub fn new() -> Self {
        let mut cells = [Cell::Empty; CELL_COUNT];
        cells[cell_index(3, 3) as usize] = Cell::White;
        cells[cell_index(4, 3) as usize] = Cell::Black;
        cells[cell_index(3, 4) as usize] = Cell::Black;
        cells[cell_index(4, 4) as usize] = Cell::White;
        Self::from_cells(&cells)
    }

    /// Board with no discs at all.
    pub fn empty() -> Self {
        Self::from_cells(&[Cell::Empty; CELL_COUNT])
    }

    /// Build the line codes for an arbitrary cell layout.
    pub fn from_cells(cells: &[Cell; CELL_COUNT]) -> Self {
        let geometry = Geometry::shared();
        let mut lines = [0u16; LINE_COUNT];
        let mut buf = [Cell::Empty; MAX_LINE_LEN];
        for (id, line) in geometry.lines().iter().enumerate() {
            let run = &mut buf[..line.len as usize];
            for (slot, &cell) in run.iter_mut().zip(line.cells()) {
                *slot = cells[cell as usize];
            }
            lines[id] = encode(run);
        }

        let empties = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .fold(0u64, |mask, (i, _)| mask | 1u64 << i);

        Board {
            tables: LineTables::shared(),
            geometry,
            lines,
            empties,
        }
    }

    #[inline]
    fn table(&self, line: usize) -> &'static LineTable {
        self.tables.for_len(self.geometry.line(line).len as usize)
    }

    /// Contents of `cell`, read from its row code.
    #[inline]
    pub fn cell(&self, cell: u8) -> Cell {
        let row = cell / BOARD_SIZE;
        Cell::from_digit(digit(self.lines[row as usize], (cell % BOARD_SIZE) as usize))
    }

    pub fn cells(&self) -> [Cell; CELL_COUNT] {
        let mut cells = [Cell::Empty; CELL_COUNT];
        for (i, slot) in cells.iter_mut().enumerate() {
            *slot = self.cell(i as u8);
        }
        cells
    }

    /// Flat state `[0=empty, 1=black, 2=white]`, indexed `row * 8 + col`.
    pub fn to_state(&self) -> [u8; CELL_COUNT] {
        self.cells().map(Cell::digit)
    }

    /// False for cells off the board.
    #[inline]
    pub fn is_empty(&self, cell: u8) -> bool {
        (cell as usize) < CELL_COUNT && self.empties >> cell & 1 == 1
    }

    #[inline]
    pub fn empty_count(&self) -> u32 {
        self.empties.count_ones()
    }

    pub fn empty_cells(&self) -> CellBits {
        CellBits(self.empties)
    }

    /// `(black, white)` disc counts.
    pub fn disc_counts(&self) -> (u8, u8) {
        let filled = CELL_COUNT as i32 - self.empty_count() as i32;
        let diff = self.material_diff(Player::Black);
        (((filled + diff) / 2) as u8, ((filled - diff) / 2) as u8)
    }

    /// Discs `player` would capture by playing `cell`, zero if the move is illegal or off the
    /// board.
    pub fn flips(&self, cell: u8, player: Player) -> u8 {
        if !self.is_empty(cell) {
            return 0;
        }
        self.geometry
            .memberships(cell)
            .iter()
            .map(|m| {
                let line = m.line as usize;
                self.table(line)
                    .entry(self.lines[line], m.offset as usize, player)
                    .flips()
            })
            .sum()
    }

    /// Off-board cells are never placeable.
    #[inline]
    pub fn placeable(&self, cell: u8, player: Player) -> bool {
        self.is_empty(cell)
            && self.geometry.memberships(cell).iter().any(|m| {
                let line = m.line as usize;
                self.table(line)
                    .entry(self.lines[line], m.offset as usize, player)
                    .flips()
                    > 0
            })
    }

    /// Legal cells for `player`, ascending.
    pub fn placeable_cells(&self, player: Player) -> Vec<u8> {
        self.empty_cells()
            .filter(|&cell| self.placeable(cell, player))
            .collect()
    }

    pub fn placeable_count(&self, player: Player) -> usize {
        self.empty_cells()
            .filter(|&cell| self.placeable(cell, player))
            .count()
    }

    pub fn has_moves(&self, player: Player) -> bool {
        self.empty_cells().any(|cell| self.placeable(cell, player))
    }

    /// Checked move: returns the number of discs flipped.
    pub fn apply_move(&mut self, cell: u8, player: Player) -> Result<u8, GameError> {
        if cell as usize >= CELL_COUNT {
            return Err(GameError::OutOfRange {
                cell: cell as usize,
            });
        }
        if !self.placeable(cell, player) {
            return Err(GameError::IllegalMove { cell, player });
        }
        Ok(self.apply_legal(cell, player))
    }

    /// Play a move already known to be legal and return the number of discs flipped.
    pub fn apply_legal(&mut self, cell: u8, player: Player) -> u8 {
        debug_assert!(self.placeable(cell, player), "illegal move {cell} for {player:?}");
        let geometry = self.geometry;
        let mut flipped = 0;

        for (direction, m) in geometry.memberships(cell).iter().enumerate() {
            let line = m.line as usize;
            let offset = m.offset as usize;
            let entry = self.table(line).entry(self.lines[line], offset, player);
            self.lines[line] = entry.next;

            let cells = geometry.line(line).cells();
            let captured = cells[offset - entry.flips_lo as usize..offset]
                .iter()
                .chain(&cells[offset + 1..=offset + entry.flips_hi as usize]);
            for &other in captured {
                self.toggle_crossing(other, direction);
            }
            flipped += entry.flips();
        }

        self.empties &= !(1u64 << cell);
        flipped
    }

    /// Toggle a flipped disc in every line through it except the one in `skip` direction.
    fn toggle_crossing(&mut self, cell: u8, skip: usize) {
        for (direction, m) in self.geometry.memberships(cell).iter().enumerate() {
            if direction == skip {
                continue;
            }
            let line = m.line as usize;
            self.lines[line] = self.table(line).toggle(self.lines[line], m.offset as usize);
        }
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines,
            empties: self.empties,
        }
    }

    #[inline]
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.lines = snapshot.lines;
        self.empties = snapshot.empties;
    }

    pub fn features(&self) -> Features {
        pattern::extract(self)
    }

    /// Legal-move balance summed over every line, positive when it favours `player`.
    pub fn mobility_score(&self, player: Player) -> i32 {
        player.sign() * self.sum_lines(0..LINE_COUNT, LineTable::mobility)
    }

    /// Settled-disc balance summed over every line, positive when it favours `player`.
    pub fn settled_score(&self, player: Player) -> i32 {
        player.sign() * self.sum_lines(0..LINE_COUNT, LineTable::settled)
    }

    /// Disc difference from `player`'s side. Rows cover each cell once.
    pub fn material_diff(&self, player: Player) -> i32 {
        player.sign() * self.sum_lines(0..BOARD_SIZE as usize, LineTable::material)
    }

    fn sum_lines(
        &self,
        lines: std::ops::Range<usize>,
        stat: impl Fn(&LineTable, u16) -> i32,
    ) -> i32 {
        lines.map(|line| stat(self.table(line), self.lines[line])).sum()
    }

    #[inline]
    pub fn line_code(&self, line: usize) -> u16 {
        self.lines[line]
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines && self.empties == other.empties
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("state", &self.to_state())
            .field("empties", &format_args!("{:#018x}", self.empties))
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  A B C D E F G H")?;
        for row in 0..BOARD_SIZE {
            write!(f, "{}", row + 1)?;
            for col in 0..BOARD_SIZE {
                let symbol = match self.cell(cell_index(col, row)) {
                    Cell::Empty => '.',
                    Cell::Black => 'X',
                    Cell::White => 'O',
                };
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Plain 8x8 board that scans the eight directions cell by cell.
    #[derive(Clone)]
    struct ReferenceBoard {
        cells: [[Cell; 8]; 8],
    }

    const DIRECTIONS: [(i8, i8); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];

    impl ReferenceBoard {
        fn from_board(board: &Board) -> Self {
            let mut cells = [[Cell::Empty; 8]; 8];
            for (i, cell) in board.cells().iter().enumerate() {
                cells[i / 8][i % 8] = *cell;
            }
            ReferenceBoard { cells }
        }

        fn run_in_direction(&self, row: usize, col: usize, dr: i8, dc: i8, player: Player) -> usize {
            let opponent = player.opponent().to_cell();
            let mut r = row as i8 + dr;
            let mut c = col as i8 + dc;
            let mut run = 0;
            while (0..8).contains(&r) && (0..8).contains(&c) {
                match self.cells[r as usize][c as usize] {
                    cell if cell == opponent => run += 1,
                    cell if cell == player.to_cell() => return run,
                    _ => return 0,
                }
                r += dr;
                c += dc;
            }
            0
        }

        fn flips(&self, cell: u8, player: Player) -> usize {
            let (row, col) = (cell as usize / 8, cell as usize % 8);
            if self.cells[row][col] != Cell::Empty {
                return 0;
            }
            DIRECTIONS
                .iter()
                .map(|&(dr, dc)| self.run_in_direction(row, col, dr, dc, player))
                .sum()
        }

        fn apply(&mut self, cell: u8, player: Player) {
            let (row, col) = (cell as usize / 8, cell as usize % 8);
            for (dr, dc) in DIRECTIONS {
                let run = self.run_in_direction(row, col, dr, dc, player);
                for step in 1..=run as i8 {
                    let r = (row as i8 + dr * step) as usize;
                    let c = (col as i8 + dc * step) as usize;
                    self.cells[r][c] = player.to_cell();
                }
            }
            self.cells[row][col] = player.to_cell();
        }

        fn flat(&self) -> [Cell; CELL_COUNT] {
            let mut flat = [Cell::Empty; CELL_COUNT];
            for (i, slot) in flat.iter_mut().enumerate() {
                *slot = self.cells[i / 8][i % 8];
            }
            flat
        }
    }

    /// Play `choices` as move picks (modulo the legal-move count), passing when needed.
    fn play_out(choices: &[usize]) -> (Board, Player) {
        let mut board = Board::new();
        let mut player = Player::Black;
        for &choice in choices {
            let moves = board.placeable_cells(player);
            if moves.is_empty() {
                player = player.opponent();
                if !board.has_moves(player) {
                    break;
                }
                continue;
            }
            board.apply_legal(moves[choice % moves.len()], player);
            player = player.opponent();
        }
        (board, player)
    }

    proptest! {
        /// Legality and flip counts match a direction-scanning board on reachable positions.
        #[test]
        fn prop_legality_matches_reference(choices in prop::collection::vec(0usize..64, 0..60)) {
            let (board, _) = play_out(&choices);
            let reference = ReferenceBoard::from_board(&board);
            for cell in 0..64u8 {
                for player in [Player::Black, Player::White] {
                    let expected = reference.flips(cell, player);
                    prop_assert_eq!(
                        board.flips(cell, player) as usize,
                        expected,
                        "Flip count mismatch at cell {} for {:?}", cell, player
                    );
                    prop_assert_eq!(board.placeable(cell, player), expected > 0);
                }
            }
        }

        /// Every move changes exactly 1 + flips cells and keeps all 46 codes consistent.
        #[test]
        fn prop_move_conservation(choices in prop::collection::vec(0usize..64, 1..60)) {
            let mut board = Board::new();
            let mut player = Player::Black;
            for choice in choices {
                let moves = board.placeable_cells(player);
                if moves.is_empty() {
                    player = player.opponent();
                    if !board.has_moves(player) {
                        break;
                    }
                    continue;
                }
                let cell = moves[choice % moves.len()];
                let before = board.cells();
                let (black, white) = board.disc_counts();

                let mut reference = ReferenceBoard::from_board(&board);
                reference.apply(cell, player);
                let flipped = board.apply_legal(cell, player);

                let after = board.cells();
                let changed = before.iter().zip(after.iter()).filter(|(a, b)| a != b).count();
                prop_assert_eq!(changed, 1 + flipped as usize);
                prop_assert_eq!(after, reference.flat());

                let (black2, white2) = board.disc_counts();
                prop_assert_eq!(u32::from(black2) + u32::from(white2), u32::from(black) + u32::from(white) + 1);

                prop_assert_eq!(&board, &Board::from_cells(&after), "Line codes drifted from cells");
                player = player.opponent();
            }
        }

        /// Restoring a fresh snapshot is a no-op; restoring after a move undoes it.
        #[test]
        fn prop_snapshot_idempotence(choices in prop::collection::vec(0usize..64, 0..40)) {
            let (mut board, player) = play_out(&choices);
            let original = board.clone();
            let snapshot = board.snapshot();
            board.restore(&snapshot);
            prop_assert_eq!(&board, &original);

            if let Some(&cell) = board.placeable_cells(player).first() {
                board.apply_legal(cell, player);
                board.restore(&snapshot);
                prop_assert_eq!(&board, &original);
            }
        }

        /// Aggregates are antisymmetric between the two players.
        #[test]
        fn prop_aggregates_antisymmetric(choices in prop::collection::vec(0usize..64, 0..60)) {
            let (board, _) = play_out(&choices);
            prop_assert_eq!(board.material_diff(Player::Black), -board.material_diff(Player::White));
            prop_assert_eq!(board.settled_score(Player::Black), -board.settled_score(Player::White));
            prop_assert_eq!(board.mobility_score(Player::Black), -board.mobility_score(Player::White));

            let (black, white) = board.disc_counts();
            prop_assert_eq!(board.material_diff(Player::Black), i32::from(black) - i32::from(white));
        }
    }
}
