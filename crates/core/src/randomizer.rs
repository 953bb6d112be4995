//! Randomizer - periodic board disruption
//!
//! Two phases, split by the board-shake animation:
//!
//! 1. [`lift_cells`]: snapshot every settled cell and empty the board.
//! 2. [`reseed`]: put the snapshot back at new positions. Cells are shuffled, then each
//!    one samples up to `RANDOMIZER_MAX_ATTEMPTS` candidates below the reserved top rows
//!    (60% of draws from rows 10..15, the rest from rows 5..20) and keeps the free candidate
//!    with the fewest occupied neighbours plus a small jitter. If no candidate was free
//!    the last one tried is written anyway.
//!
//! Cells already on the board when the reseed starts (a piece that locked during the
//! shake) are kept as they are. After placement the top rows are wiped if the falling
//! piece no longer fits, and the count of re-placed cells is checked against the snapshot.
//! On a mismatch the board goes back to its kept cells and a repair pass places the
//! snapshot again: random probing first, then an ordered scan of every free slot below
//! the reserved rows, so nothing is lost while the snapshot fits in that area.

use arrayvec::ArrayVec;

use crate::board::{Board, BOARD_SIZE};
use crate::rng::SimpleRng;
use crate::types::{
    Rgb, BOARD_HEIGHT, BOARD_WIDTH, RANDOMIZER_MAX_ATTEMPTS, RANDOMIZER_RESERVED_ROWS,
    SPAWN_RESCUE_ROWS,
};

/// Chance that a candidate is drawn from the lower band.
const LOWER_BAND_CHANCE: f32 = 0.6;
/// Jitter added to the neighbour count of a candidate.
const PLACEMENT_JITTER: f32 = 0.5;

/// One settled cell lifted off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftedCell {
    pub x: i8,
    pub y: i8,
    pub color: Rgb,
}

pub type LiftedCells = ArrayVec<LiftedCell, BOARD_SIZE>;

/// Outcome of a reseed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReseedReport {
    /// Cells lifted before the shake.
    pub expected: usize,
    /// Lifted cells on the board after the reseed finished.
    pub placed: usize,
    /// Lifted cells on the board right after the heuristic pass (before any repair).
    pub first_pass: usize,
    /// The repair pass ran.
    pub repaired: bool,
    /// The top rows were wiped to free the falling piece.
    pub rescued_spawn: bool,
}

impl ReseedReport {
    /// Cells that could not be put back.
    pub fn lost(&self) -> usize {
        self.expected.saturating_sub(self.placed)
    }
}

/// Snapshot every settled cell (row-major) and empty the board.
pub fn lift_cells(board: &mut Board) -> LiftedCells {
    let cells: LiftedCells = board
        .occupied_cells()
        .map(|(x, y, color)| LiftedCell { x, y, color })
        .collect();
    board.clear();
    cells
}

/// Rows the heuristic pass may draw from for one candidate.
fn candidate_row(rng: &mut SimpleRng) -> i8 {
    let half = (BOARD_HEIGHT / 2) as u32;
    let reserved = RANDOMIZER_RESERVED_ROWS as u32;
    if rng.next_unit() < LOWER_BAND_CHANCE {
        (rng.next_range(half - reserved) + half) as i8
    } else {
        (rng.next_range(BOARD_HEIGHT as u32 - reserved) + reserved) as i8
    }
}

/// Best free candidate for one cell, or the last one tried.
fn pick_position(
    board: &Board,
    rng: &mut SimpleRng,
    reserved: &impl Fn(i8, i8) -> bool,
) -> (i8, i8) {
    let mut best: Option<((i8, i8), f32)> = None;
    let mut last = (0, RANDOMIZER_RESERVED_ROWS as i8);

    for _ in 0..RANDOMIZER_MAX_ATTEMPTS {
        let x = rng.next_range(BOARD_WIDTH as u32) as i8;
        let y = candidate_row(rng);
        last = (x, y);

        if board.is_occupied(x, y) || reserved(x, y) {
            continue;
        }
        let score = board.occupied_neighbors(x, y) as f32 + rng.next_unit() * PLACEMENT_JITTER;
        if best.map_or(true, |(_, s)| score < s) {
            best = Some(((x, y), score));
        }
    }

    best.map_or(last, |(pos, _)| pos)
}

/// Re-place the lifted cells around whatever is already on the board.
///
/// `reserved(x, y)` marks cells a candidate may not use (the falling piece's footprint).
/// `piece_blocked(board)` answers whether the falling piece collides at its current or
/// spawn position; if so the top `SPAWN_RESCUE_ROWS` rows are wiped.
pub fn reseed(
    board: &mut Board,
    cells: &mut [LiftedCell],
    rng: &mut SimpleRng,
    reserved: impl Fn(i8, i8) -> bool,
    piece_blocked: impl Fn(&Board) -> bool,
) -> ReseedReport {
    let expected = cells.len();
    let mut kept = board.clone();
    rng.shuffle(cells);

    for cell in cells.iter() {
        let (x, y) = pick_position(board, rng, &reserved);
        board.set(x, y, Some(cell.color));
    }

    let mut rescued_spawn = false;
    if piece_blocked(board) {
        board.clear_rows(0..SPAWN_RESCUE_ROWS as usize);
        kept.clear_rows(0..SPAWN_RESCUE_ROWS as usize);
        rescued_spawn = true;
    }

    let kept_count = kept.occupied_count();
    let first_pass = board.occupied_count().saturating_sub(kept_count);
    let repaired = first_pass != expected;
    if repaired {
        *board = kept;
        for cell in cells.iter() {
            place_anywhere(board, rng, &reserved, cell.color);
        }
    }

    ReseedReport {
        expected,
        placed: board.occupied_count().saturating_sub(kept_count),
        first_pass,
        repaired,
        rescued_spawn,
    }
}

/// Repair placement: random probing, then a scan of every slot below the reserved rows.
fn place_anywhere(
    board: &mut Board,
    rng: &mut SimpleRng,
    reserved: &impl Fn(i8, i8) -> bool,
    color: Rgb,
) -> bool {
    let free = |board: &Board, x: i8, y: i8| !board.is_occupied(x, y) && !reserved(x, y);
    let top = RANDOMIZER_RESERVED_ROWS as u32;

    for _ in 0..RANDOMIZER_MAX_ATTEMPTS {
        let x = rng.next_range(BOARD_WIDTH as u32) as i8;
        let y = (rng.next_range(BOARD_HEIGHT as u32 - top) + top) as i8;
        if free(board, x, y) {
            return board.set(x, y, Some(color));
        }
    }

    // Bottom-up so leftovers pile like settled blocks.
    for y in (top as i8..BOARD_HEIGHT as i8).rev() {
        for x in 0..BOARD_WIDTH as i8 {
            if free(board, x, y) {
                return board.set(x, y, Some(color));
            }
        }
    }
    false
}
