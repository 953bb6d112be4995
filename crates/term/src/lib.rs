//! Terminal rendering for the game.
//!
//! Rendering is split in two: [`GameView`] turns a `core::GameSnapshot` into a
//! [`FrameBuffer`] (pure, unit-tested), and [`TerminalRenderer`] flushes frames to
//! the terminal through crossterm, re-emitting only the cells that changed.
//!
//! Each board cell is drawn two columns wide to offset the usual terminal glyph
//! aspect ratio.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tremor_tetris_core as core;
pub use tremor_tetris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, FrameLayout, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, DrawStats, TerminalRenderer};
