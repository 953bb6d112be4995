//! Tremor Tetris (workspace facade crate).
//!
//! The game lives in dedicated crates under `crates/`; this package re-exports them as
//! `tremor_tetris::{core, input, term, types}` and hosts the pieces only the binary
//! needs: configuration loading ([`config`]) and the buffered session log ([`log`]).

pub use tremor_tetris_core as core;
pub use tremor_tetris_input as input;
pub use tremor_tetris_term as term;
pub use tremor_tetris_types as types;

pub mod config;
pub mod log;
