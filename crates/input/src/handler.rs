//! Polled key-repeat handler for terminal environments.
//!
//! A press acts once immediately. While the key stays held, repeats start after the
//! repeat delay and then fire every repeat interval, all computed from the elapsed
//! time handed to [`InputHandler::update`]. Left and right share one slot (the last
//! pressed direction wins); soft drop and rotate repeat independently.
//!
//! Terminals that never report key releases are covered by an auto-release timeout:
//! when no repeating-key press has been seen for that long, every held key is dropped.

use crossterm::event::KeyCode;

use arrayvec::ArrayVec;

use crate::map::{repeat_key, RepeatKey};
use crate::types::{GameAction, KEY_REPEAT_DELAY_MS, KEY_REPEAT_INTERVAL_MS};

pub type Actions = ArrayVec<GameAction, 32>;

/// Direction for horizontal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    None,
}

/// Held time and repeat accumulator for one key slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RepeatTimer {
    held_ms: u32,
    accumulator: u32,
}

impl RepeatTimer {
    /// Advance by `elapsed_ms`; returns how many repeats are due.
    fn advance(&mut self, elapsed_ms: u32, delay: u32, interval: u32) -> u32 {
        let prev = self.held_ms;
        self.held_ms = self.held_ms.saturating_add(elapsed_ms);
        if self.held_ms < delay {
            return 0;
        }
        let excess = if prev < delay {
            self.held_ms - delay
        } else {
            elapsed_ms
        };
        self.accumulator += excess;

        let interval = interval.max(1);
        let repeats = self.accumulator / interval;
        self.accumulator %= interval;
        repeats
    }
}

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers repeats.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Tracks input state for key repeat.
#[derive(Debug, Clone)]
pub struct InputHandler {
    horizontal: HorizontalDirection,
    horizontal_timer: RepeatTimer,
    down_held: bool,
    down_timer: RepeatTimer,
    rotate_held: bool,
    rotate_timer: RepeatTimer,
    repeat_delay: u32,
    repeat_interval: u32,
    since_last_key_ms: u32,
    key_release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::with_config(KEY_REPEAT_DELAY_MS, KEY_REPEAT_INTERVAL_MS)
    }

    pub fn with_config(repeat_delay: u32, repeat_interval: u32) -> Self {
        Self {
            horizontal: HorizontalDirection::None,
            horizontal_timer: RepeatTimer::default(),
            down_held: false,
            down_timer: RepeatTimer::default(),
            rotate_held: false,
            rotate_timer: RepeatTimer::default(),
            repeat_delay,
            repeat_interval,
            since_last_key_ms: 0,
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn horizontal(&self) -> HorizontalDirection {
        self.horizontal
    }

    pub fn down_held(&self) -> bool {
        self.down_held
    }

    /// Press (or terminal-generated repeat) of a key. Non-repeating keys are ignored here.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<GameAction> {
        let key = repeat_key(code)?;
        self.since_last_key_ms = 0;

        match key {
            RepeatKey::Left | RepeatKey::Right => {
                let dir = if key == RepeatKey::Left {
                    HorizontalDirection::Left
                } else {
                    HorizontalDirection::Right
                };
                if self.horizontal == dir {
                    return None;
                }
                self.horizontal = dir;
                self.horizontal_timer = RepeatTimer::default();
            }
            RepeatKey::Down => {
                if self.down_held {
                    return None;
                }
                self.down_held = true;
                self.down_timer = RepeatTimer::default();
            }
            RepeatKey::Rotate => {
                if self.rotate_held {
                    return None;
                }
                self.rotate_held = true;
                self.rotate_timer = RepeatTimer::default();
            }
        }
        Some(key.action())
    }

    /// Release of a key. Releasing soft drop yields `SoftDropRelease`.
    pub fn handle_key_release(&mut self, code: KeyCode) -> Option<GameAction> {
        match repeat_key(code)? {
            RepeatKey::Left => {
                if self.horizontal == HorizontalDirection::Left {
                    self.release_horizontal();
                }
                None
            }
            RepeatKey::Right => {
                if self.horizontal == HorizontalDirection::Right {
                    self.release_horizontal();
                }
                None
            }
            RepeatKey::Down => self.release_down(),
            RepeatKey::Rotate => {
                self.rotate_held = false;
                self.rotate_timer = RepeatTimer::default();
                None
            }
        }
    }

    fn release_horizontal(&mut self) {
        self.horizontal = HorizontalDirection::None;
        self.horizontal_timer = RepeatTimer::default();
    }

    fn release_down(&mut self) -> Option<GameAction> {
        if !self.down_held {
            return None;
        }
        self.down_held = false;
        self.down_timer = RepeatTimer::default();
        Some(GameAction::SoftDropRelease)
    }

    /// Advance held keys by one frame and collect due repeats.
    pub fn update(&mut self, elapsed_ms: u32) -> Actions {
        let mut actions = Actions::new();

        // Auto-release when terminal does not emit release events.
        self.since_last_key_ms = self.since_last_key_ms.saturating_add(elapsed_ms);
        if self.since_last_key_ms > self.key_release_timeout_ms {
            if self.horizontal != HorizontalDirection::None {
                self.release_horizontal();
            }
            self.rotate_held = false;
            if let Some(release) = self.release_down() {
                let _ = actions.try_push(release);
            }
        }

        let (delay, interval) = (self.repeat_delay, self.repeat_interval);

        let action = match self.horizontal {
            HorizontalDirection::Left => Some(GameAction::MoveLeft),
            HorizontalDirection::Right => Some(GameAction::MoveRight),
            HorizontalDirection::None => None,
        };
        if let Some(action) = action {
            for _ in 0..self.horizontal_timer.advance(elapsed_ms, delay, interval) {
                let _ = actions.try_push(action);
            }
        }

        if self.down_held {
            for _ in 0..self.down_timer.advance(elapsed_ms, delay, interval) {
                let _ = actions.try_push(GameAction::SoftDrop);
            }
        }

        if self.rotate_held {
            for _ in 0..self.rotate_timer.advance(elapsed_ms, delay, interval) {
                let _ = actions.try_push(GameAction::Rotate);
            }
        }

        actions
    }

    /// Drop all held keys without emitting anything.
    pub fn reset(&mut self) {
        self.release_horizontal();
        self.down_held = false;
        self.down_timer = RepeatTimer::default();
        self.rotate_held = false;
        self.rotate_timer = RepeatTimer::default();
        self.since_last_key_ms = 0;
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
