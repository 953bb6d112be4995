//! Collision resolver - pure predicates over (board, shape, position).
//!
//! Nothing here mutates state, so every function can be asked about hypothetical
//! positions (ghost piece, kicks, spawn checks).

use crate::board::Board;
use crate::piece::Shape;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// True iff any occupied shape cell at offset (x, y) lands left of column 0,
/// right of the last column, below the last row, or on a settled cell.
///
/// Rows above the board are not checked: pieces spawn at row >= 0 and only move
/// down or sideways.
pub fn collides(board: &Board, shape: &Shape, x: i8, y: i8) -> bool {
    shape.cells().any(|(dx, dy)| {
        let cx = x + dx;
        let cy = y + dy;
        if cx < 0 || cx >= BOARD_WIDTH as i8 || cy >= BOARD_HEIGHT as i8 {
            return true;
        }
        cy >= 0 && board.is_occupied(cx, cy)
    })
}

/// Whether a piece at (x, y) cannot move one row down.
pub fn is_resting(board: &Board, shape: &Shape, x: i8, y: i8) -> bool {
    collides(board, shape, x, y + 1)
}

/// Lowest row the shape can fall to from (x, y).
pub fn landing_y(board: &Board, shape: &Shape, x: i8, y: i8) -> i8 {
    let mut landing = y;
    while !collides(board, shape, x, landing + 1) {
        landing += 1;
    }
    landing
}
