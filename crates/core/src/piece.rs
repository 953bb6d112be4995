//! Pieces module - tetromino shape matrices and rotation with wall kicks
//!
//! A shape is a small rectangular 0/1 matrix (at most 4x4). Rotation is a plain
//! matrix transform (transpose, then reverse rows: 90° clockwise), and wall kicks
//! are horizontal-only offsets tried in a fixed order:
//!
//! - a shape whose rotated form is a single row (the I piece laid flat):
//!   `0, -1, +1, -2, +2`
//! - every other shape: `0, -1, +1, +2`
//!
//! Offsets are relative to the pre-rotation column. The first offset that does not
//! collide wins; if none fits the rotation is abandoned and the caller keeps the
//! original piece.

use crate::types::{PieceKind, Rgb, BOARD_WIDTH};

/// Max side length of a shape matrix.
pub const MAX_SHAPE_SIDE: usize = 4;

/// Wall kick column offsets for a shape that becomes a single row.
pub const I_KICKS: [i8; 5] = [0, -1, 1, -2, 2];

/// Wall kick column offsets for all other shapes.
pub const KICKS: [i8; 4] = [0, -1, 1, 2];

/// Rectangular occupancy matrix of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    bits: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    /// Build a shape from rows of 0/1 values.
    ///
    /// Rows must be non-empty, equally long and at most 4x4.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        debug_assert!(!rows.is_empty() && rows.len() <= MAX_SHAPE_SIDE);
        let cols = rows.first().map_or(0, |r| r.len());
        debug_assert!(cols > 0 && cols <= MAX_SHAPE_SIDE);

        let mut bits = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (y, row) in rows.iter().enumerate().take(MAX_SHAPE_SIDE) {
            debug_assert_eq!(row.len(), cols);
            for (x, &v) in row.iter().enumerate().take(MAX_SHAPE_SIDE) {
                bits[y][x] = v != 0;
            }
        }
        Self {
            rows: rows.len().min(MAX_SHAPE_SIDE) as u8,
            cols: cols.min(MAX_SHAPE_SIDE) as u8,
            bits,
        }
    }

    /// Spawn orientation of a piece kind.
    pub fn of(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => Self::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::O => Self::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::T => Self::from_rows(&[&[1, 1, 1], &[0, 1, 0]]),
            PieceKind::L => Self::from_rows(&[&[1, 1, 1], &[1, 0, 0]]),
            PieceKind::J => Self::from_rows(&[&[1, 1, 1], &[0, 0, 1]]),
            PieceKind::S => Self::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::Z => Self::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Whether the matrix cell at (`col`, `row`) is occupied. Out of range is empty.
    pub fn is_filled(&self, col: i8, row: i8) -> bool {
        if col < 0 || row < 0 || col as u8 >= self.cols || row as u8 >= self.rows {
            return false;
        }
        self.bits[row as usize][col as usize]
    }

    /// Occupied cells as `(dx, dy)` offsets from the shape origin, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        (0..self.rows as i8).flat_map(move |dy| {
            (0..self.cols as i8)
                .filter(move |&dx| self.bits[dy as usize][dx as usize])
                .map(move |dx| (dx, dy))
        })
    }

    /// Rotate 90° clockwise: transpose, then reverse the rows.
    pub fn rotated_cw(&self) -> Self {
        let rows = self.rows as usize;
        let cols = self.cols as usize;
        let mut bits = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (i, out_row) in bits.iter_mut().enumerate().take(cols) {
            for (j, out) in out_row.iter_mut().enumerate().take(rows) {
                *out = self.bits[rows - 1 - j][i];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            bits,
        }
    }

    /// Column a shape spawns at: centered, rounding left.
    pub fn spawn_x(&self) -> i8 {
        (BOARD_WIDTH / 2) as i8 - (self.cols / 2) as i8
    }
}

/// A piece: kind, current shape orientation and its palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    color: Rgb,
}

impl Piece {
    /// New piece in spawn orientation.
    pub fn new(kind: PieceKind, color: Rgb) -> Self {
        Self {
            kind,
            shape: Shape::of(kind),
            color,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Same piece rotated 90° clockwise.
    pub fn rotated_cw(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..*self
        }
    }

    /// Same piece back in spawn orientation.
    pub fn reset_orientation(&self) -> Self {
        Self::new(self.kind, self.color)
    }
}

/// Kick offsets to try for a shape after it has been rotated.
pub fn kick_offsets(rotated: &Shape) -> &'static [i8] {
    if rotated.rows() == 1 {
        &I_KICKS
    } else {
        &KICKS
    }
}

/// Successful rotation: the rotated piece, its column and the kick used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated {
    pub piece: Piece,
    pub x: i8,
    pub kick: i8,
}

/// Try to rotate a piece with wall kicks
///
/// `collides(shape, x, y)` must answer for hypothetical positions without side effects.
/// Returns `None` if all kicks fail; the caller then keeps the original piece and column.
pub fn try_rotate(
    piece: &Piece,
    x: i8,
    y: i8,
    collides: impl Fn(&Shape, i8, i8) -> bool,
) -> Option<Rotated> {
    let rotated = piece.rotated_cw();
    kick_offsets(rotated.shape())
        .iter()
        .find(|&&kick| !collides(rotated.shape(), x + kick, y))
        .map(|&kick| Rotated {
            piece: rotated,
            x: x + kick,
            kick,
        })
}
