//! Scoring module - points, combo, back-to-back, stack bonus and level policy
//!
//! Per clear event (1+ lines):
//! 1. base points from the line table (T-spin table for T-spins), times level
//! 2. x3/2 if this and the previous clear were both "difficult" (Tetris or T-spin)
//! 3. stack clears (gapped multi-line clears) bump the stack counter and multiply by
//!    `1 + stack/5`; any other clear resets the stack counter
//! 4. combo counter increments, then `50 * combo * level` is added
//!
//! Multipliers are applied in integer arithmetic and round down at each step.
//! A placement that clears nothing resets combo and stack. The level goes up by
//! at most one per clear event, once score reaches `level * 1000`.

use crate::board::Board;
use crate::piece::{Piece, Shape};
use crate::types::{
    ClearEvent, PieceKind, B2B_DENOMINATOR, B2B_NUMERATOR, BOARD_HEIGHT, BOARD_WIDTH, COMBO_BASE,
    HARD_DROP_POINTS_PER_ROW, LEVEL_SCORE_STEP, LINE_SCORES, SOFT_DROP_POINTS_PER_ROW,
    STACK_BONUS_DIVISOR, TSPIN_LINE_SCORES,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Table points times level, before any multiplier.
    pub base: u32,
    /// Points after back-to-back and stack multipliers (excludes combo bonus).
    pub line_clear_score: u32,
    /// Combo bonus added on top of `line_clear_score`.
    pub combo_bonus: u32,
    pub total: u32,
    pub difficult: bool,
    /// Whether a B2B multiplier was applied to this clear.
    pub b2b_applied: bool,
}

/// Table points for a clear. Lines beyond 4 score no table points.
pub fn base_points(lines: usize, tspin: bool) -> u32 {
    let table = if tspin { &TSPIN_LINE_SCORES } else { &LINE_SCORES };
    table.get(lines).copied().unwrap_or(0)
}

/// Tetris or T-spin.
pub fn is_difficult(lines: usize, tspin: bool) -> bool {
    tspin || lines == 4
}

/// Apply the B2B multiplier (3/2) to a point value.
pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// Multiply by `1 + stack * 0.2`.
pub fn apply_stack_multiplier(points: u32, stack: u32) -> u32 {
    points.saturating_mul(STACK_BONUS_DIVISOR.saturating_add(stack)) / STACK_BONUS_DIVISOR
}

pub fn calculate_combo_bonus(combo: u32, level: u32) -> u32 {
    COMBO_BASE.saturating_mul(combo).saturating_mul(level)
}

/// A clear is a stack clear when at least two rows went and two consecutive
/// cleared rows (in clear order) are more than one index apart.
pub fn is_stack_clear(cleared_rows: &[usize]) -> bool {
    cleared_rows.len() >= 2 && cleared_rows.windows(2).any(|w| w[0].abs_diff(w[1]) > 1)
}

/// Calculate complete score for a clear, given the counters as they are *after*
/// this clear bumped them (`combo` already incremented, `stack` already updated).
pub fn calculate_score(
    lines: usize,
    level: u32,
    tspin: bool,
    previous_difficult: bool,
    stack: Option<u32>,
    combo: u32,
) -> ScoreResult {
    let difficult = is_difficult(lines, tspin);
    let base = base_points(lines, tspin).saturating_mul(level);

    let b2b_applied = previous_difficult && difficult;
    let mut points = if b2b_applied {
        apply_b2b_multiplier(base)
    } else {
        base
    };
    if let Some(stack) = stack {
        points = apply_stack_multiplier(points, stack);
    }

    let combo_bonus = calculate_combo_bonus(combo, level);
    ScoreResult {
        base,
        line_clear_score: points,
        combo_bonus,
        total: points.saturating_add(combo_bonus),
        difficult,
        b2b_applied,
    }
}

/// Calculate drop score
pub fn calculate_drop_score(cells: u32, is_hard_drop: bool) -> u32 {
    if is_hard_drop {
        cells * HARD_DROP_POINTS_PER_ROW
    } else {
        cells * SOFT_DROP_POINTS_PER_ROW
    }
}

/// Level after a clear event: one step up once `score >= level * 1000`.
pub fn next_level(score: u32, level: u32) -> u32 {
    if score >= level.saturating_mul(LEVEL_SCORE_STEP) {
        level + 1
    } else {
        level
    }
}

/// T-spin check, evaluated before the piece is merged.
///
/// The piece must be a T whose last successful action was a rotation. Of the four
/// diagonal neighbours of the T's center cell, at least three must be blocked
/// (settled cell, side wall or floor). Works for any orientation.
pub fn is_tspin(board: &Board, piece: &Piece, x: i8, y: i8, last_action_was_rotate: bool) -> bool {
    if piece.kind() != PieceKind::T || !last_action_was_rotate {
        return false;
    }
    let Some((cx, cy)) = t_center(piece.shape()) else {
        return false;
    };
    let (cx, cy) = (x + cx, y + cy);
    let blocked = [(-1, -1), (1, -1), (-1, 1), (1, 1)]
        .iter()
        .filter(|&&(dx, dy)| {
            let (px, py) = (cx + dx, cy + dy);
            px < 0
                || px >= BOARD_WIDTH as i8
                || py >= BOARD_HEIGHT as i8
                || (py >= 0 && board.is_occupied(px, py))
        })
        .count();
    blocked >= 3
}

/// The occupied cell with three occupied orthogonal neighbours.
fn t_center(shape: &Shape) -> Option<(i8, i8)> {
    shape.cells().find(|&(x, y)| {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .filter(|&&(dx, dy)| shape.is_filled(x + dx, y + dy))
            .count()
            == 3
    })
}

/// Running score state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBoard {
    pub score: u32,
    pub level: u32,
    pub combo: u32,
    pub stack: u32,
    pub last_clear_difficult: bool,
    pub last_clear_tspin: bool,
    pub last_clear_tetris: bool,
    pub last_clear_stack: bool,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            combo: 0,
            stack: 0,
            last_clear_difficult: false,
            last_clear_tspin: false,
            last_clear_tetris: false,
            last_clear_stack: false,
        }
    }

    /// Apply one clear event. Returns the event and whether the level went up.
    pub fn record_clear(&mut self, cleared_rows: &[usize], tspin: bool) -> (ClearEvent, bool) {
        let lines = cleared_rows.len();
        let stack_clear = is_stack_clear(cleared_rows);

        if stack_clear {
            self.stack += 1;
        } else {
            self.stack = 0;
        }
        self.combo += 1;

        let result = calculate_score(
            lines,
            self.level,
            tspin,
            self.last_clear_difficult,
            stack_clear.then_some(self.stack),
            self.combo,
        );
        self.score = self.score.saturating_add(result.total);

        self.last_clear_difficult = result.difficult;
        self.last_clear_tspin = tspin;
        self.last_clear_tetris = lines == 4;
        self.last_clear_stack = stack_clear;

        let previous_level = self.level;
        self.level = next_level(self.score, self.level);

        let event = ClearEvent {
            lines_cleared: lines as u32,
            points: result.total,
            tspin,
            tetris: lines == 4,
            difficult: result.difficult,
            back_to_back: result.b2b_applied,
            stack_clear,
            combo: self.combo,
            stack: self.stack,
        };
        (event, self.level > previous_level)
    }

    /// A placement that cleared nothing.
    pub fn record_no_clear(&mut self) {
        self.combo = 0;
        self.stack = 0;
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_PALETTE;

    #[test]
    fn test_line_tables() {
        assert_eq!(base_points(1, false), 100);
        assert_eq!(base_points(2, false), 300);
        assert_eq!(base_points(3, false), 500);
        assert_eq!(base_points(4, false), 800);
        assert_eq!(base_points(1, true), 800);
        assert_eq!(base_points(2, true), 1200);
        assert_eq!(base_points(3, true), 1600);
        assert_eq!(base_points(4, true), 800);
        assert_eq!(base_points(5, false), 0);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(apply_b2b_multiplier(800), 1200);
        assert_eq!(apply_stack_multiplier(300, 1), 360);
        assert_eq!(apply_stack_multiplier(300, 3), 480);
        assert_eq!(calculate_combo_bonus(3, 2), 300);
    }

    #[test]
    fn test_stack_detection() {
        assert!(!is_stack_clear(&[19]));
        assert!(!is_stack_clear(&[19, 18]));
        assert!(is_stack_clear(&[19, 17]));
        assert!(is_stack_clear(&[19, 18, 16]));
    }

    #[test]
    fn test_full_score_calculation() {
        // Single at level 2, first in combo.
        let r = calculate_score(1, 2, false, false, None, 1);
        assert_eq!(r.base, 200);
        assert_eq!(r.total, 200 + 100);

        // Back-to-back Tetris with a stack step.
        let r = calculate_score(4, 1, false, true, Some(1), 2);
        assert!(r.b2b_applied);
        assert_eq!(r.line_clear_score, 1440);
        assert_eq!(r.total, 1540);
    }

    #[test]
    fn test_level_is_single_step() {
        assert_eq!(next_level(999, 1), 1);
        assert_eq!(next_level(1000, 1), 2);
        assert_eq!(next_level(5000, 1), 2);
    }

    #[test]
    fn test_tspin_needs_three_blocked_corners_and_rotation() {
        // T pointing down (spawn orientation) tucked under an overhang.
        let board = Board::from_ascii(
            &["..x.......", "xx...xxxxx", "xxx.xxxxxx"],
            DEFAULT_PALETTE[0],
        );
        let t = Piece::new(PieceKind::T, DEFAULT_PALETTE[3]);
        // Center of the T is (1, 0) in shape space -> (3, 18) on the board at x=2,y=18.
        assert!(is_tspin(&board, &t, 2, 18, true));
        assert!(!is_tspin(&board, &t, 2, 18, false));

        let open = Board::new();
        assert!(!is_tspin(&open, &t, 2, 10, true));

        let i = Piece::new(PieceKind::I, DEFAULT_PALETTE[3]);
        assert!(!is_tspin(&board, &i, 2, 18, true));
    }

    #[test]
    fn test_scoreboard_combo_and_reset() {
        let mut sb = ScoreBoard::new();
        let (ev, _) = sb.record_clear(&[19], false);
        assert_eq!(ev.combo, 1);
        assert_eq!(ev.points, 100 + 50);
        let (ev, _) = sb.record_clear(&[19], false);
        assert_eq!(ev.combo, 2);
        assert_eq!(ev.points, 100 + 100);
        sb.record_no_clear();
        assert_eq!(sb.combo, 0);
        let (ev, _) = sb.record_clear(&[19], false);
        assert_eq!(ev.combo, 1);
    }
}
