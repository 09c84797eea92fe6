//! Evaluation features
//!
//! 46 pattern instances in 11 groups. Line-shaped groups read a line code straight off the
//! board; block-shaped groups (edge + X squares, 2x5 and 3x3 corners) are composed from cell
//! digits, each instance being one dihedral image of a base shape so that every instance of
//! a group shares one weight table.

use std::sync::OnceLock;

use crate::board::Board;
use crate::geometry::{column_line, diag_down_line, diag_up_line, row_line};
use crate::line_table::POW3;
use crate::{cell_index, BOARD_SIZE};

pub const FEATURE_COUNT: usize = 46;
pub const GROUP_COUNT: usize = 11;

/// Number of distinct codes per feature group, in weight-file order.
pub const GROUP_SIZES: [usize; GROUP_COUNT] = [
    6561, 6561, 6561, 81, 243, 729, 2187, 6561, 59049, 59049, 19683,
];

/// Group of each feature.
#[rustfmt::skip]
pub const FEATURE_GROUP: [usize; FEATURE_COUNT] = [
    0, 0, 0, 0,
    1, 1, 1, 1,
    2, 2, 2, 2,
    3, 3, 3, 3,
    4, 4, 4, 4,
    5, 5, 5, 5,
    6, 6, 6, 6,
    7, 7,
    8, 8, 8, 8,
    9, 9, 9, 9, 9, 9, 9, 9,
    10, 10, 10, 10,
];

/// Pattern codes, one per feature.
pub type Features = [u32; FEATURE_COUNT];

#[derive(Debug, Clone)]
enum Shape {
    Line(usize),
    Cells(Vec<u8>),
}

/// Image of `(col, row)` under one of the eight board symmetries.
pub fn transform(kind: u8, col: u8, row: u8) -> (u8, u8) {
    let last = BOARD_SIZE - 1;
    match kind {
        0 => (col, row),
        1 => (last - col, row),
        2 => (col, last - row),
        3 => (last - col, last - row),
        4 => (row, col),
        5 => (last - row, col),
        6 => (row, last - col),
        _ => (last - row, last - col),
    }
}

fn images<'a>(base: &'a [(u8, u8)], kinds: &'a [u8]) -> impl Iterator<Item = Shape> + 'a {
    kinds.iter().map(move |&kind| {
        Shape::Cells(
            base.iter()
                .map(|&(col, row)| {
                    let (col, row) = transform(kind, col, row);
                    cell_index(col, row)
                })
                .collect(),
        )
    })
}

fn layout() -> &'static [Shape] {
    static LAYOUT: OnceLock<Vec<Shape>> = OnceLock::new();
    LAYOUT.get_or_init(|| {
        let mut shapes = Vec::with_capacity(FEATURE_COUNT);

        for k in 1..=3u8 {
            let far = BOARD_SIZE - 1 - k;
            shapes.extend(
                [row_line(k), row_line(far), column_line(k), column_line(far)].map(Shape::Line),
            );
        }

        for len in 4..=7i8 {
            let off = 8 - len;
            shapes.extend(
                [
                    diag_down_line(-off),
                    diag_down_line(off),
                    diag_up_line((len - 1) as u8),
                    diag_up_line((14 - (len - 1)) as u8),
                ]
                .map(Shape::Line),
            );
        }

        shapes.push(Shape::Line(diag_down_line(0)));
        shapes.push(Shape::Line(diag_up_line(7)));

        let edge: Vec<(u8, u8)> = std::iter::once((1, 1))
            .chain((0..BOARD_SIZE).map(|col| (col, 0)))
            .chain(std::iter::once((6, 1)))
            .collect();
        shapes.extend(images(&edge, &[0, 2, 4, 5]));

        let corner_2x5: Vec<(u8, u8)> = (0..2u8)
            .flat_map(|row| (0..5u8).map(move |col| (col, row)))
            .collect();
        shapes.extend(images(&corner_2x5, &[0, 1, 2, 3, 4, 5, 6, 7]));

        let corner_3x3: Vec<(u8, u8)> = (0..3u8)
            .flat_map(|row| (0..3u8).map(move |col| (col, row)))
            .collect();
        shapes.extend(images(&corner_3x3, &[0, 1, 2, 3]));

        debug_assert_eq!(shapes.len(), FEATURE_COUNT);
        shapes
    })
}

/// Cells read by feature `index`, in digit order.
pub fn feature_cells(index: usize) -> Vec<u8> {
    match &layout()[index] {
        Shape::Line(line) => crate::Geometry::shared().line(*line).cells().to_vec(),
        Shape::Cells(cells) => cells.clone(),
    }
}

/// Read all 46 pattern codes from a board.
pub fn extract(board: &Board) -> Features {
    let mut features = [0u32; FEATURE_COUNT];
    for (slot, shape) in features.iter_mut().zip(layout()) {
        *slot = match shape {
            Shape::Line(line) => u32::from(board.line_code(*line)),
            Shape::Cells(cells) => cells
                .iter()
                .enumerate()
                .map(|(k, &cell)| u32::from(board.cell(cell).digit()) * POW3[k])
                .sum(),
        };
    }
    features
}
