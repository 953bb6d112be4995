//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and provides a
//! polled key-repeat handler that works in terminals with or without key-release
//! events. The session only ever sees discrete actions.

pub mod handler;
pub mod map;

pub use tremor_tetris_types as types;

pub use handler::{HorizontalDirection, InputHandler};
pub use map::{handle_key_event, repeat_key, should_quit, RepeatKey};
