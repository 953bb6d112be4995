//! Buffered session log.
//!
//! The terminal is in raw alternate-screen mode while the game runs, so lines are kept
//! in memory and written out once the terminal has been restored.

use std::io::{self, Write};

use crate::core::{GameSession, ReseedReport};
use crate::types::GameEvent;

#[derive(Debug, Default)]
pub struct SessionLog {
    lines: Vec<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: &str, message: impl AsRef<str>) {
        self.lines.push(format!("[{tag}] {}", message.as_ref()));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drain the session's pending events into log lines.
    pub fn record_session(&mut self, session: &mut GameSession) {
        let reseed = session.last_reseed();
        for event in session.drain_events() {
            self.record_event(&event, reseed.as_ref());
        }
    }

    /// One event; `reseed` supplies the detail behind a settle event.
    pub fn record_event(&mut self, event: &GameEvent, reseed: Option<&ReseedReport>) {
        match *event {
            GameEvent::Restarted { episode_id } => {
                self.push("Session", format!("restarted (episode {episode_id})"));
            }
            GameEvent::GameOver { score, level } => {
                self.push("Session", format!("game over: score {score}, level {level}"));
            }
            GameEvent::LevelUp { level } => {
                self.push("Session", format!("level {level}"));
            }
            GameEvent::LineClear(clear) if clear.tetris || clear.tspin || clear.stack_clear => {
                let kind = if clear.tspin {
                    "t-spin"
                } else if clear.tetris {
                    "tetris"
                } else {
                    "stack clear"
                };
                let b2b = if clear.back_to_back { " (back-to-back)" } else { "" };
                self.push(
                    "Session",
                    format!("{kind}: {} lines, +{}{b2b}", clear.lines_cleared, clear.points),
                );
            }
            GameEvent::RandomizeStarted { cells } => {
                self.push("Randomizer", format!("lifted {cells} cells"));
            }
            GameEvent::RandomizeSettled {
                expected,
                placed,
                repaired,
                rescued_spawn,
            } => {
                if repaired {
                    let found = reseed.map_or(placed as usize, |r| r.first_pass);
                    self.push(
                        "Randomizer",
                        format!("cell count mismatch: expected {expected}, found {found}; re-placed"),
                    );
                    let lost = expected.saturating_sub(placed);
                    if lost > 0 {
                        self.push("Randomizer", format!("{lost} cells could not be re-placed"));
                    }
                }
                if rescued_spawn {
                    self.push("Randomizer", "cleared top rows to free the falling piece");
                }
            }
            _ => {}
        }
    }

    pub fn flush_to(&mut self, out: &mut impl Write) -> io::Result<()> {
        for line in self.lines.drain(..) {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }

    pub fn flush_stderr(&mut self) -> io::Result<()> {
        self.flush_to(&mut io::stderr().lock())
    }
}
