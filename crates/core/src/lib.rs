//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every game rule and all mutable game state. It has **no
//! dependencies** on terminals, input devices or wall-clock time: the session is
//! driven by explicit intents and by [`GameSession::tick`] advancing a logical clock.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of settled colors, merge and row compaction
//! - [`piece`]: shape matrices, clockwise rotation and horizontal wall kicks
//! - [`collision`]: pure placement predicates (also used for ghost and kicks)
//! - [`lock`]: lock-delay state machine for soft-dropped pieces
//! - [`scoring`]: line table, back-to-back, stack and combo bonuses, T-spin check
//! - [`randomizer`]: periodic lift-and-reseed of settled cells
//! - [`effects`]: particles and shakes (cosmetic)
//! - [`schedule`]: gravity, randomize and settle timers on the logical clock
//! - [`session`]: [`GameSession`], the owner of all of the above
//! - [`rng`]: seeded LCG, palette and piece factory
//!
//! # Example
//!
//! ```
//! use tremor_tetris_core::GameSession;
//! use tremor_tetris_types::{GameAction, TICK_MS};
//!
//! let mut game = GameSession::new(12345);
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::HardDrop);
//! game.tick(TICK_MS);
//!
//! assert!(game.score() > 0); // hard drop awards points
//! ```

pub mod board;
pub mod collision;
pub mod effects;
pub mod lock;
pub mod piece;
pub mod randomizer;
pub mod rng;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use tremor_tetris_types as types;

pub use board::Board;
pub use collision::{collides, is_resting, landing_y};
pub use effects::{Effects, Particle};
pub use lock::{LockController, LockDecision, LockState};
pub use piece::{try_rotate, Piece, Shape};
pub use randomizer::{lift_cells, reseed, LiftedCell, ReseedReport};
pub use rng::{Palette, PieceFactory, SimpleRng};
pub use schedule::{Schedule, ScheduledEvent};
pub use scoring::{calculate_drop_score, calculate_score, is_tspin, ScoreBoard, ScoreResult};
pub use session::{ActivePiece, GameSession};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
