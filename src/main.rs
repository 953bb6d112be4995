//! Terminal Tetris runner (default binary).
//!
//! Reads the configuration, then drives the session at a fixed 16 ms timestep from
//! wall-clock time, feeding it crossterm key events and presenting snapshots through
//! the framebuffer renderer.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use tremor_tetris::config::GameConfig;
use tremor_tetris::core::{GameSession, GameSnapshot};
use tremor_tetris::input::{handle_key_event, repeat_key, should_quit, InputHandler};
use tremor_tetris::log::SessionLog;
use tremor_tetris::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tremor_tetris::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    let config = GameConfig::load().context("failed to load configuration")?;
    let mut game = config.build_session(clock_seed())?;

    let mut log = SessionLog::new();
    log.push(
        "Config",
        format!("style {}, seed {}", game.style().as_str(), game.seed()),
    );

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, &mut log);

    // Always try to restore terminal state.
    let _ = term.exit();
    log.record_session(&mut game);
    let _ = log.flush_stderr();
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, game: &mut GameSession, log: &mut SessionLog) -> Result<()> {
    let view = GameView::default();
    let mut input = InputHandler::new();
    let mut snapshot = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game.snapshot_into(&mut snapshot);
        view.render_into(&snapshot, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && should_quit(key) {
                        return Ok(());
                    }
                    handle_key(game, &mut input, key);
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            for action in input.update(TICK_MS) {
                game.apply_action(action);
            }
            game.tick(TICK_MS);
            log.record_session(game);
        }
    }
}

fn handle_key(game: &mut GameSession, input: &mut InputHandler, key: KeyEvent) {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat if repeat_key(key.code).is_some() => {
            // Terminal auto-repeat only keeps the key held; repeats come from `update`.
            if let Some(action) = input.handle_key_press(key.code) {
                game.apply_action(action);
            }
        }
        KeyEventKind::Press => {
            if let Some(action) = handle_key_event(key) {
                if game.apply_action(action) && action == GameAction::Restart {
                    input.reset();
                }
            }
        }
        KeyEventKind::Repeat => {}
        KeyEventKind::Release => {
            if let Some(action) = input.handle_key_release(key.code) {
                game.apply_action(action);
            }
        }
    }
}
