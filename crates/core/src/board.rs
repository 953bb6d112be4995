//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty or holds the color it was
//! settled with. Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use arrayvec::ArrayVec;

use crate::piece::Piece;
use crate::types::{Cell, Rgb, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
pub const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices removed by one clear, bottom to top.
pub type ClearedRows = ArrayVec<usize, { BOARD_HEIGHT as usize }>;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is within bounds and empty
    pub fn is_empty_at(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|cell| cell.is_some())
    }

    /// Indices of all currently full rows, bottom to top.
    pub fn full_rows(&self) -> ClearedRows {
        (0..BOARD_HEIGHT as usize)
            .rev()
            .filter(|&y| self.is_row_full(y))
            .collect()
    }

    /// Remove every full row and compact the rest downwards.
    ///
    /// Surviving rows keep their relative order and empty rows are inserted at the
    /// top, so the board always keeps exactly `BOARD_HEIGHT` rows. Uses a two-pointer
    /// pass (equivalent to re-checking the same index after each removal).
    /// Returns the removed row indices (pre-clear positions), bottom to top.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src_start = read_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, write_y * width);
                }
            }
        }

        self.cells[..write_y * width].fill(None);
        cleared_rows
    }

    /// Write a piece's color into every occupied cell at offset (x, y).
    ///
    /// Callers check the position with the collision resolver first; an out-of-range
    /// cell here is a programming error (asserted in debug builds, skipped otherwise).
    pub fn merge(&mut self, piece: &Piece, x: i8, y: i8) {
        let color = piece.color();
        for (dx, dy) in piece.shape().cells() {
            let placed = self.set(x + dx, y + dy, Some(color));
            debug_assert!(placed, "merge out of range at ({}, {})", x + dx, y + dy);
        }
    }

    /// Count occupied orthogonal neighbours of (x, y).
    pub fn occupied_neighbors(&self, x: i8, y: i8) -> u32 {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .filter(|&&(dx, dy)| self.is_occupied(x + dx, y + dy))
            .count() as u32
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells as `(x, y, color)`, row-major.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i8, i8, Rgb)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.map(|color| {
                (
                    (i % BOARD_WIDTH as usize) as i8,
                    (i / BOARD_WIDTH as usize) as i8,
                    color,
                )
            })
        })
    }

    /// Empty the given rows (top rows rescue after a re-seed).
    pub fn clear_rows(&mut self, rows: std::ops::Range<usize>) {
        let width = BOARD_WIDTH as usize;
        let end = rows.end.min(BOARD_HEIGHT as usize);
        let start = rows.start.min(end);
        self.cells[start * width..end * width].fill(None);
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Copy the board into a row-major 2D grid.
    pub fn write_grid(&self, out: &mut [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for (y, row) in out.iter_mut().enumerate() {
            let start = y * BOARD_WIDTH as usize;
            row.copy_from_slice(&self.cells[start..start + BOARD_WIDTH as usize]);
        }
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a board from text rows (`.` empty, anything else filled with `color`).
    ///
    /// Rows are aligned to the bottom of the board; shorter rows are padded with empty cells.
    pub fn from_ascii(rows: &[&str], color: Rgb) -> Self {
        let mut board = Self::new();
        let offset = (BOARD_HEIGHT as usize).saturating_sub(rows.len());
        for (i, row) in rows.iter().enumerate().take(BOARD_HEIGHT as usize) {
            for (x, ch) in row.chars().enumerate().take(BOARD_WIDTH as usize) {
                if ch != '.' && ch != ' ' {
                    board.set(x as i8, (offset + i) as i8, Some(color));
                }
            }
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
