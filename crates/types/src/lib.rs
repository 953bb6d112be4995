//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, configuration).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: column `BOARD_WIDTH / 2 - shape_width / 2`, row 0
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frame timestep (~60 FPS) |
//! | `GRAVITY_INTERVAL_MS` | 1000 | Forced descent period |
//! | `LOCK_DELAY_FRAMES` | 30 | Lock countdown while soft-dropping |
//! | `MOVE_RESET_GRACE_MS` | 500 | Quiet time before the countdown runs |
//! | `RANDOMIZE_INTERVAL_MS` | 30000 | Board disruption period |
//! | `SHAKE_DURATION_MS` | 1000 | Delay between disruption trigger and settle |
//! | `KEY_REPEAT_DELAY_MS` | 170 | Time before a held key repeats |
//! | `KEY_REPEAT_INTERVAL_MS` | 50 | Interval between repeats |
//!
//! # Examples
//!
//! ```
//! use tremor_tetris_types::{GameAction, PieceKind, PieceStyle, Rgb, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! assert_eq!(PieceStyle::from_str("neon"), Some(PieceStyle::Glow));
//! assert_eq!(Rgb::from_hex("#FF0D72"), Ok(Rgb::new(0xFF, 0x0D, 0x72)));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use std::fmt;

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Fixed frame timestep in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Period of the forced descent timer.
pub const GRAVITY_INTERVAL_MS: u32 = 1000;

/// Lock countdown length, in frames, once a soft-dropped piece rests on something.
pub const LOCK_DELAY_FRAMES: u32 = 30;

/// The lock countdown only runs once this long has passed since the last movement.
pub const MOVE_RESET_GRACE_MS: u32 = 500;

/// Period of the board randomizer.
pub const RANDOMIZE_INTERVAL_MS: u32 = 30_000;

/// Delay between lifting the settled cells and re-seeding them.
pub const SHAKE_DURATION_MS: u32 = 1000;

/// Board shake intensity right after a randomize trigger.
pub const MAX_SHAKE_INTENSITY: f32 = 20.0;

/// Screen shake length (frames) after a line clear.
pub const CLEAR_SHAKE_FRAMES: u32 = 5;

/// Held-key repeat delay in milliseconds.
pub const KEY_REPEAT_DELAY_MS: u32 = 170;

/// Held-key repeat interval in milliseconds.
pub const KEY_REPEAT_INTERVAL_MS: u32 = 50;

/// Rows at the top of the board the randomizer never seeds into.
pub const RANDOMIZER_RESERVED_ROWS: u8 = 5;

/// Candidate positions tried per cell by the randomizer.
pub const RANDOMIZER_MAX_ATTEMPTS: u32 = 100;

/// Rows force-cleared when the falling piece is buried by a re-seed.
pub const SPAWN_RESCUE_ROWS: u8 = 4;

/// Pixel size of one cell in field space (particle coordinates).
pub const BLOCK_SIZE_PX: f32 = 30.0;

/// Width of the playfield in pixel space.
pub const FIELD_WIDTH_PX: f32 = BLOCK_SIZE_PX * BOARD_WIDTH as f32;

/// Height of the playfield in pixel space.
pub const FIELD_HEIGHT_PX: f32 = BLOCK_SIZE_PX * BOARD_HEIGHT as f32;

/// Line clear base points, indexed by lines cleared.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// T-spin clear base points, indexed by lines cleared (4 lines is scored as a plain Tetris).
pub const TSPIN_LINE_SCORES: [u32; 5] = [0, 800, 1200, 1600, 800];

/// Combo bonus per combo step, multiplied by level.
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// Stack bonus: each stack step adds 1/`STACK_BONUS_DIVISOR` (20%).
pub const STACK_BONUS_DIVISOR: u32 = 5;

/// Points needed per level: the level goes up once score reaches `level * LEVEL_SCORE_STEP`.
pub const LEVEL_SCORE_STEP: u32 = 1000;

/// Hard drop points per row travelled.
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Soft drop points per player step.
pub const SOFT_DROP_POINTS_PER_ROW: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        assert_eq!(GRAVITY_INTERVAL_MS, 1000);
        assert_eq!(LOCK_DELAY_FRAMES, 30);
        assert_eq!(MOVE_RESET_GRACE_MS, 500);
        assert_eq!(RANDOMIZE_INTERVAL_MS, 30_000);
        assert_eq!(SHAKE_DURATION_MS, 1000);
        assert_eq!(KEY_REPEAT_DELAY_MS, 170);
        assert_eq!(KEY_REPEAT_INTERVAL_MS, 50);
    }

    #[test]
    fn hex_colors_parse_both_cases() {
        assert_eq!(Rgb::from_hex("#0dc2ff"), Ok(Rgb::new(0x0D, 0xC2, 0xFF)));
        assert_eq!(Rgb::from_hex("3877FF"), Ok(Rgb::new(0x38, 0x77, 0xFF)));
        assert_eq!(Rgb::from_hex("#12345"), Err(ColorParseError::BadLength));
        assert_eq!(Rgb::from_hex("#12345G"), Err(ColorParseError::BadDigit));
        assert_eq!(Rgb::new(0xFF, 0x8E, 0x0D).to_hex(), "#FF8E0D");
    }

    #[test]
    fn style_aliases() {
        assert_eq!(PieceStyle::from_str("classic"), Some(PieceStyle::Flat));
        assert_eq!(PieceStyle::from_str("Gradient"), Some(PieceStyle::Gradient));
        assert_eq!(PieceStyle::from_str("modern"), Some(PieceStyle::Gradient));
        assert_eq!(PieceStyle::from_str("glow"), Some(PieceStyle::Glow));
        assert_eq!(PieceStyle::from_str("sparkly"), None);
    }
}

/// The seven tetromino piece kinds
///
/// Shape and color are independent: color comes from the palette, not the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// All kinds in factory order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tremor_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("L"), Some(PieceKind::L));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "l" => Some(PieceKind::L),
            "j" => Some(PieceKind::J),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Uppercase letter, as shown in previews.
    pub fn letter(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
        }
    }
}

/// 24-bit RGB color token stored in board cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError::BadLength);
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError::BadDigit)
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Scale each channel by `num / den` (saturating).
    pub fn scaled(&self, num: u16, den: u16) -> Self {
        let f = |c: u8| ((c as u16 * num) / den.max(1)).min(255) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

/// Hex color parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    BadLength,
    BadDigit,
}

impl ColorParseError {
    pub fn code(self) -> &'static str {
        match self {
            ColorParseError::BadLength => "bad_length",
            ColorParseError::BadDigit => "bad_digit",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ColorParseError::BadLength => "expected six hex digits (#RRGGBB)",
            ColorParseError::BadDigit => "color contains a non-hex digit",
        }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ColorParseError {}

/// Number of palette slots.
pub const PALETTE_SIZE: usize = 7;

/// Default piece palette.
pub const DEFAULT_PALETTE: [Rgb; PALETTE_SIZE] = [
    Rgb::new(0xFF, 0x0D, 0x72),
    Rgb::new(0x0D, 0xC2, 0xFF),
    Rgb::new(0x0D, 0xFF, 0x72),
    Rgb::new(0xF5, 0x38, 0xFF),
    Rgb::new(0xFF, 0x8E, 0x0D),
    Rgb::new(0xFF, 0xE1, 0x38),
    Rgb::new(0x38, 0x77, 0xFF),
];

/// Cosmetic block style. Has no effect on game rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PieceStyle {
    #[default]
    Flat,
    Gradient,
    Glow,
}

impl PieceStyle {
    /// Parse a style name; the classic/modern/neon aliases are accepted too.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flat" | "classic" => Some(PieceStyle::Flat),
            "gradient" | "modern" => Some(PieceStyle::Gradient),
            "glow" | "neon" => Some(PieceStyle::Glow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceStyle::Flat => "flat",
            PieceStyle::Gradient => "gradient",
            PieceStyle::Glow => "glow",
        }
    }
}

/// Discrete intents forwarded by input collaborators.
///
/// Each action is exactly one game action, however many raw key events produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// One soft-drop step; also marks soft-drop as held
    SoftDrop,
    /// Soft-drop input released (commits a piece that is waiting to lock)
    SoftDropRelease,
    /// Rotate piece 90° clockwise
    Rotate,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Swap with the held piece (once per placement)
    Hold,
    /// Start a fresh session
    Restart,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive).
    ///
    /// ```
    /// use tremor_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("softdroprelease"), Some(GameAction::SoftDropRelease));
    /// assert_eq!(GameAction::from_str("pause"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "softdroprelease" => Some(GameAction::SoftDropRelease),
            "rotate" => Some(GameAction::Rotate),
            "harddrop" => Some(GameAction::HardDrop),
            "hold" => Some(GameAction::Hold),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::SoftDropRelease => "softDropRelease",
            GameAction::Rotate => "rotate",
            GameAction::HardDrop => "hardDrop",
            GameAction::Hold => "hold",
            GameAction::Restart => "restart",
        }
    }
}

/// Summary of one line-clear evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearEvent {
    pub lines_cleared: u32,
    /// Points awarded by this clear (bonuses included).
    pub points: u32,
    pub tspin: bool,
    pub tetris: bool,
    /// Tetris or T-spin.
    pub difficult: bool,
    /// Whether the back-to-back multiplier was applied.
    pub back_to_back: bool,
    pub stack_clear: bool,
    /// Combo counter after this clear.
    pub combo: u32,
    /// Stack counter after this clear.
    pub stack: u32,
}

/// Events emitted by the session for display/audio collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece was merged into the board.
    PieceLocked { lines_cleared: u32 },
    LineClear(ClearEvent),
    ScoreChanged {
        score: u32,
        level: u32,
        combo: u32,
        stack: u32,
    },
    LevelUp { level: u32 },
    GameOver { score: u32, level: u32 },
    /// Settled cells were lifted off the board.
    RandomizeStarted { cells: u32 },
    /// Lifted cells were put back.
    RandomizeSettled {
        expected: u32,
        placed: u32,
        /// The fallback re-placement pass ran.
        repaired: bool,
        /// The top rows were cleared to free the falling piece.
        rescued_spawn: bool,
    },
    Restarted { episode_id: u32 },
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Rgb)`: Settled cell with the color it was merged with
pub type Cell = Option<Rgb>;
