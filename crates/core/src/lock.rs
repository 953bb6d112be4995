//! Lock controller - decides when the falling piece commits to the board.
//!
//! ```text
//!   Free --descent ok--> Free
//!   Free --blocked, soft-drop held--> Locking(LOCK_DELAY_FRAMES)
//!   Free --blocked, soft-drop not held--> Locked
//!   Locking --move/rotate, still resting--> Locking(full), watching
//!   Locking --move/rotate, no longer resting--> Free
//!   Locking --countdown hits 0 (grace elapsed, soft-drop held)--> Locked
//!   Locking --soft-drop released--> Locked
//! ```
//!
//! `Locked` is not stored: the controller answers [`LockDecision::Commit`] and the
//! session merges the piece, spawns the next one and calls [`LockController::reset`].
//! The countdown runs once per frame, and only after `MOVE_RESET_GRACE_MS` has passed
//! since the last movement; inside the grace window it is held at full.

use crate::types::{LOCK_DELAY_FRAMES, MOVE_RESET_GRACE_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Free,
    Locking { frames_left: u32 },
}

/// What the session should do after feeding the controller an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockDecision {
    Continue,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockController {
    state: LockState,
    last_move_ms: u64,
}

impl LockController {
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: LockState::Free,
            last_move_ms: now_ms,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locking(&self) -> bool {
        matches!(self.state, LockState::Locking { .. })
    }

    pub fn last_move_ms(&self) -> u64 {
        self.last_move_ms
    }

    /// Fresh piece: back to `Free` with a full countdown.
    pub fn reset(&mut self, now_ms: u64) {
        self.state = LockState::Free;
        self.last_move_ms = now_ms;
    }

    /// A lateral move or rotation succeeded. `resting` is whether the piece
    /// still cannot move down at its new position.
    pub fn note_movement(&mut self, now_ms: u64, resting: bool) {
        self.last_move_ms = now_ms;
        if let LockState::Locking { .. } = self.state {
            self.state = if resting {
                LockState::Locking {
                    frames_left: LOCK_DELAY_FRAMES,
                }
            } else {
                LockState::Free
            };
        }
    }

    /// Outcome of a one-row descent attempt (gravity or soft drop).
    pub fn on_descent(&mut self, now_ms: u64, blocked: bool, soft_drop_held: bool) -> LockDecision {
        if !blocked {
            self.last_move_ms = now_ms;
            self.state = LockState::Free;
            return LockDecision::Continue;
        }
        if !soft_drop_held {
            return LockDecision::Commit;
        }
        if self.state == LockState::Free {
            self.state = LockState::Locking {
                frames_left: LOCK_DELAY_FRAMES,
            };
        }
        LockDecision::Continue
    }

    /// The obstruction under a locking piece went away (board rewritten under it).
    pub fn on_support_lost(&mut self) {
        self.state = LockState::Free;
    }

    /// Soft-drop input released: a piece waiting to lock commits immediately.
    pub fn on_soft_drop_release(&mut self) -> LockDecision {
        if self.is_locking() {
            LockDecision::Commit
        } else {
            LockDecision::Continue
        }
    }

    /// Per-frame countdown.
    pub fn on_frame(&mut self, now_ms: u64, soft_drop_held: bool) -> LockDecision {
        let LockState::Locking { frames_left } = self.state else {
            return LockDecision::Continue;
        };
        if !soft_drop_held {
            return LockDecision::Commit;
        }

        if now_ms.saturating_sub(self.last_move_ms) > MOVE_RESET_GRACE_MS as u64 {
            let frames_left = frames_left.saturating_sub(1);
            if frames_left == 0 {
                return LockDecision::Commit;
            }
            self.state = LockState::Locking { frames_left };
        } else {
            self.state = LockState::Locking {
                frames_left: LOCK_DELAY_FRAMES,
            };
        }
        LockDecision::Continue
    }
}

impl Default for LockController {
    fn default() -> Self {
        Self::new(0)
    }
}
