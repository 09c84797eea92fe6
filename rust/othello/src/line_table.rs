//! Per-line transition tables
//!
//! A line is a run of 1 to 8 cells along a row, column or diagonal. Its contents are packed
//! into a base-3 code: cell `k` contributes `digit * 3^k` with EMPTY = 0, BLACK = 1,
//! WHITE = 2. For every code, every offset and both players the table records what a move
//! at that offset does to the line in isolation:
//! - how many discs it captures toward lower and toward higher offsets
//! - the resulting code (placed disc plus this line's captures)
//!
//! and for every code a few signed aggregates (mobility, settled discs, material) that the
//! board sums over its lines. All of it is computed once; play only ever looks codes up.

use std::sync::OnceLock;
use std::time::Instant;

use crate::{Cell, Player};

/// Longest line on the board.
pub const MAX_LINE_LEN: usize = 8;

/// Powers of three up to the longest pattern (10 cells).
pub const POW3: [u32; 11] = [1, 3, 9, 27, 81, 243, 729, 2187, 6561, 19683, 59049];

/// Effect of placing a disc at one offset of one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveEntry {
    /// Line code after the disc is placed and this line's captures are flipped.
    /// Holds the placed disc even when the line captures nothing.
    pub next: u16,
    /// Discs captured toward lower offsets.
    pub flips_lo: u8,
    /// Discs captured toward higher offsets.
    pub flips_hi: u8,
}

impl MoveEntry {
    #[inline]
    pub fn flips(&self) -> u8 {
        self.flips_lo + self.flips_hi
    }
}

/// Pack cells into a line code.
pub fn encode(cells: &[Cell]) -> u16 {
    cells
        .iter()
        .rev()
        .fold(0u16, |code, &cell| code * 3 + u16::from(cell.digit()))
}

/// Unpack a line code of `len` cells.
pub fn decode(code: u16, len: usize) -> Vec<Cell> {
    let mut cells = vec![Cell::Empty; len];
    unpack(code, &mut cells);
    cells
}

/// Base-3 digit at `offset` of a code.
#[inline]
pub fn digit(code: u16, offset: usize) -> u8 {
    ((u32::from(code) / POW3[offset]) % 3) as u8
}

fn unpack(mut code: u16, cells: &mut [Cell]) {
    for cell in cells.iter_mut() {
        *cell = Cell::from_digit((code % 3) as u8);
        code /= 3;
    }
}

/// Length of the opponent run starting next to the move that ends on an own disc.
fn captured<'a>(ray: impl Iterator<Item = &'a Cell>, own: Cell, opp: Cell) -> usize {
    let mut run = 0;
    for &cell in ray {
        if cell == opp {
            run += 1;
        } else if cell == own {
            return run;
        } else {
            return 0;
        }
    }
    0
}

fn scan_move(line: &[Cell], offset: usize, player: Player) -> MoveEntry {
    let own = player.to_cell();
    let opp = player.opponent().to_cell();
    let flips_lo = captured(line[..offset].iter().rev(), own, opp);
    let flips_hi = captured(line[offset + 1..].iter(), own, opp);

    let mut after = [Cell::Empty; MAX_LINE_LEN];
    let after = &mut after[..line.len()];
    after.copy_from_slice(line);
    after[offset - flips_lo..=offset + flips_hi].fill(own);

    MoveEntry {
        next: encode(after),
        flips_lo: flips_lo as u8,
        flips_hi: flips_hi as u8,
    }
}

/// Colour and length of the single-colour run at the start of `cells`.
fn edge_run<'a>(mut cells: impl Iterator<Item = &'a Cell>) -> (Cell, usize) {
    match cells.next() {
        Some(&first) if first != Cell::Empty => {
            (first, 1 + cells.take_while(|&&cell| cell == first).count())
        }
        _ => (Cell::Empty, 0),
    }
}

fn signed_count(cell: Cell, count: usize) -> i8 {
    match cell.owner() {
        Some(player) => (player.sign() * count as i32) as i8,
        None => 0,
    }
}

fn settled(line: &[Cell]) -> i8 {
    let (head, head_len) = edge_run(line.iter());
    if head_len == line.len() {
        return signed_count(head, head_len);
    }
    let (tail, tail_len) = edge_run(line.iter().rev());
    signed_count(head, head_len) + signed_count(tail, tail_len)
}

fn material(line: &[Cell]) -> i8 {
    line.iter()
        .filter_map(|cell| cell.owner())
        .map(|player| player.sign() as i8)
        .sum()
}

/// Tables for every code of one line length.
#[derive(Debug, Clone)]
pub struct LineTable {
    len: usize,
    moves: Vec<MoveEntry>,
    toggles: Vec<u16>,
    mobility: Vec<i8>,
    settled: Vec<i8>,
    material: Vec<i8>,
}

impl LineTable {
    pub fn new(len: usize) -> Self {
        assert!(len <= MAX_LINE_LEN, "line length {len} exceeds {MAX_LINE_LEN}");
        let codes = POW3[len] as usize;
        let mut table = LineTable {
            len,
            moves: vec![MoveEntry::default(); codes * len * 2],
            toggles: vec![0; codes * len],
            mobility: vec![0; codes],
            settled: vec![0; codes],
            material: vec![0; codes],
        };

        let mut cells = [Cell::Empty; MAX_LINE_LEN];
        for code in 0..codes as u16 {
            let line = &mut cells[..len];
            unpack(code, line);

            let mut mobility = 0i32;
            for offset in 0..len {
                let weight = POW3[offset] as u16;
                table.toggles[code as usize * len + offset] = match line[offset] {
                    Cell::Empty => code,
                    Cell::Black => code + weight,
                    Cell::White => code - weight,
                };

                for player in [Player::Black, Player::White] {
                    let slot = table.slot(code, offset, player);
                    if line[offset] != Cell::Empty {
                        table.moves[slot].next = code;
                        continue;
                    }
                    let entry = scan_move(line, offset, player);
                    if entry.flips() > 0 {
                        mobility += player.sign();
                    }
                    table.moves[slot] = entry;
                }
            }

            table.mobility[code as usize] = mobility as i8;
            table.settled[code as usize] = settled(line);
            table.material[code as usize] = material(line);
        }
        table
    }

    #[inline]
    fn slot(&self, code: u16, offset: usize, player: Player) -> usize {
        (code as usize * self.len + offset) * 2 + player.index()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct codes, `3^len`.
    pub fn codes(&self) -> usize {
        self.mobility.len()
    }

    /// Move entry for `player` placing at `offset`. Occupied offsets report no flips and
    /// leave the code unchanged.
    #[inline]
    pub fn entry(&self, code: u16, offset: usize, player: Player) -> MoveEntry {
        self.moves[self.slot(code, offset, player)]
    }

    /// Code with the disc at `offset` switched to the other colour.
    #[inline]
    pub fn toggle(&self, code: u16, offset: usize) -> u16 {
        self.toggles[code as usize * self.len + offset]
    }

    /// Black-legal offsets minus White-legal offsets.
    #[inline]
    pub fn mobility(&self, code: u16) -> i32 {
        i32::from(self.mobility[code as usize])
    }

    /// Black minus White discs in single-colour runs anchored at either end.
    #[inline]
    pub fn settled(&self, code: u16) -> i32 {
        i32::from(self.settled[code as usize])
    }

    /// Black minus White discs.
    #[inline]
    pub fn material(&self, code: u16) -> i32 {
        i32::from(self.material[code as usize])
    }
}

/// One [`LineTable`] per line length 0..=8, indexed by length.
#[derive(Debug)]
pub struct LineTables {
    by_len: Vec<LineTable>,
}

impl LineTables {
    pub fn build() -> Self {
        let start = Instant::now();
        let by_len: Vec<LineTable> = (0..=MAX_LINE_LEN).map(LineTable::new).collect();
        tracing::debug!(
            lengths = by_len.len(),
            move_entries = by_len.iter().map(|t| t.moves.len()).sum::<usize>(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "line tables built"
        );
        LineTables { by_len }
    }

    /// Process-wide tables, built on first use.
    pub fn shared() -> &'static LineTables {
        static TABLES: OnceLock<LineTables> = OnceLock::new();
        TABLES.get_or_init(LineTables::build)
    }

    #[inline]
    pub fn for_len(&self, len: usize) -> &LineTable {
        &self.by_len[len]
    }
}
