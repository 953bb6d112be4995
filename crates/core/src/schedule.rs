//! Scheduled events on the session's logical clock.
//!
//! Gravity and the randomizer are fixed-period timers; the randomizer settle is a
//! one-shot deferred action tagged with the episode it was scheduled in. `due` hands
//! back everything that has come due, always in the order gravity, settle, randomize,
//! so a tick produces the same result no matter how the periods line up.

use arrayvec::ArrayVec;

use crate::types::{GRAVITY_INTERVAL_MS, RANDOMIZE_INTERVAL_MS, SHAKE_DURATION_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    Gravity,
    Settle { episode_id: u32 },
    Randomize,
}

pub type DueEvents = ArrayVec<ScheduledEvent, 3>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    gravity_due: u64,
    randomize_due: u64,
    settle: Option<(u64, u32)>,
}

impl Schedule {
    pub fn new(now_ms: u64) -> Self {
        Self {
            gravity_due: now_ms + GRAVITY_INTERVAL_MS as u64,
            randomize_due: now_ms + RANDOMIZE_INTERVAL_MS as u64,
            settle: None,
        }
    }

    /// Re-arm both periodic timers from `now_ms`. A pending settle is kept; the
    /// session discards it by episode id.
    pub fn restart(&mut self, now_ms: u64) {
        self.gravity_due = now_ms + GRAVITY_INTERVAL_MS as u64;
        self.randomize_due = now_ms + RANDOMIZE_INTERVAL_MS as u64;
    }

    pub fn defer_settle(&mut self, now_ms: u64, episode_id: u32) {
        self.settle = Some((now_ms + SHAKE_DURATION_MS as u64, episode_id));
    }

    pub fn settle_pending(&self) -> bool {
        self.settle.is_some()
    }

    pub fn gravity_due(&self) -> u64 {
        self.gravity_due
    }

    pub fn randomize_due(&self) -> u64 {
        self.randomize_due
    }

    /// Pop everything due at `now_ms`. Each timer fires at most once per call; a timer
    /// that fell more than one period behind skips the missed firings.
    pub fn due(&mut self, now_ms: u64) -> DueEvents {
        let mut events = DueEvents::new();

        if now_ms >= self.gravity_due {
            events.push(ScheduledEvent::Gravity);
            self.gravity_due += GRAVITY_INTERVAL_MS as u64;
            if self.gravity_due <= now_ms {
                self.gravity_due = now_ms + GRAVITY_INTERVAL_MS as u64;
            }
        }

        if let Some((due, episode_id)) = self.settle {
            if now_ms >= due {
                events.push(ScheduledEvent::Settle { episode_id });
                self.settle = None;
            }
        }

        if now_ms >= self.randomize_due {
            events.push(ScheduledEvent::Randomize);
            self.randomize_due = now_ms + RANDOMIZE_INTERVAL_MS as u64;
        }

        events
    }
}
