//! Game session - owns all mutable game state and applies intents.
//!
//! Collaborators only talk to [`GameSession`]: input forwards one [`GameAction`] at a
//! time, the frame loop calls [`GameSession::tick`], and renderers read a
//! [`GameSnapshot`]. Everything notable is queued as a [`GameEvent`].

use crate::board::{Board, ClearedRows};
use crate::collision::{collides, is_resting, landing_y};
use crate::effects::Effects;
use crate::lock::{LockController, LockDecision, LockState};
use crate::piece::{try_rotate, Piece};
use crate::randomizer::{lift_cells, reseed, LiftedCells, ReseedReport};
use crate::rng::{Palette, PieceFactory, SimpleRng};
use crate::schedule::{Schedule, ScheduledEvent};
use crate::scoring::{calculate_drop_score, is_tspin, ScoreBoard};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{GameAction, GameEvent, PieceStyle, Rgb};

/// Salt for the cosmetic RNG stream, so effects never shift gameplay draws.
const EFFECTS_SEED_SALT: u32 = 0x9E37_79B9;

/// The falling piece and its board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub piece: Piece,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Whether the piece covers board cell (x, y).
    pub fn covers(&self, x: i8, y: i8) -> bool {
        self.piece.shape().is_filled(x - self.x, y - self.y)
    }
}

#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    active: Option<ActivePiece>,
    hold: Option<Piece>,
    next: Piece,
    can_hold: bool,
    factory: PieceFactory,
    rng: SimpleRng,
    fx_rng: SimpleRng,
    seed: u32,
    scores: ScoreBoard,
    /// Last (score, level, combo, stack) published as `ScoreChanged`.
    reported: (u32, u32, u32, u32),
    lines: u32,
    lock: LockController,
    schedule: Schedule,
    effects: Effects,
    /// Cells lifted by the randomizer, waiting for the settle.
    lifted: Option<LiftedCells>,
    last_reseed: Option<ReseedReport>,
    style: PieceStyle,
    now_ms: u64,
    episode_id: u32,
    game_over: bool,
    soft_drop_held: bool,
    last_action_was_rotate: bool,
    soft_drop_cells: u32,
    hard_drop_cells: u32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// New session with the default palette; the first piece is already falling.
    pub fn new(seed: u32) -> Self {
        Self::with_palette(seed, Palette::default())
    }

    pub fn with_palette(seed: u32, palette: Palette) -> Self {
        let factory = PieceFactory::new(palette);
        let mut rng = SimpleRng::new(seed);
        let next = factory.create(&mut rng);

        let mut session = Self {
            board: Board::new(),
            active: None,
            hold: None,
            next,
            can_hold: true,
            factory,
            rng,
            fx_rng: SimpleRng::new(seed ^ EFFECTS_SEED_SALT),
            seed,
            scores: ScoreBoard::new(),
            reported: (0, 1, 0, 0),
            lines: 0,
            lock: LockController::new(0),
            schedule: Schedule::new(0),
            effects: Effects::new(),
            lifted: None,
            last_reseed: None,
            style: PieceStyle::default(),
            now_ms: 0,
            episode_id: 0,
            game_over: false,
            soft_drop_held: false,
            last_action_was_rotate: false,
            soft_drop_cells: 0,
            hard_drop_cells: 0,
            events: Vec::new(),
        };
        session.spawn_next();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for tests and tools. Bypasses scoring and events.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn hold_piece(&self) -> Option<Piece> {
        self.hold
    }

    pub fn next_piece(&self) -> Piece {
        self.next
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.scores.score
    }

    pub fn level(&self) -> u32 {
        self.scores.level
    }

    pub fn combo(&self) -> u32 {
        self.scores.combo
    }

    pub fn stack(&self) -> u32 {
        self.scores.stack
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn soft_drop_held(&self) -> bool {
        self.soft_drop_held
    }

    pub fn last_action_was_rotate(&self) -> bool {
        self.last_action_was_rotate
    }

    /// Rows moved by player soft-drop steps this episode.
    pub fn soft_drop_cells(&self) -> u32 {
        self.soft_drop_cells
    }

    /// Rows travelled by hard drops this episode.
    pub fn hard_drop_cells(&self) -> u32 {
        self.hard_drop_cells
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn is_randomizing(&self) -> bool {
        self.lifted.is_some()
    }

    pub fn last_reseed(&self) -> Option<ReseedReport> {
        self.last_reseed
    }

    pub fn style(&self) -> PieceStyle {
        self.style
    }

    pub fn palette(&self) -> &Palette {
        self.factory.palette()
    }

    /// Cosmetic only.
    pub fn set_style(&mut self, style: PieceStyle) {
        self.style = style;
    }

    /// Override one palette slot. Pieces created from now on may use it; settled cells
    /// and already-created pieces keep their color.
    pub fn set_palette_slot(&mut self, index: usize, color: Rgb) -> bool {
        self.factory.palette_mut().set_slot(index, color)
    }

    /// Drain queued events.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Landing row of the falling piece.
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        Some(landing_y(
            &self.board,
            active.piece.shape(),
            active.x,
            active.y,
        ))
    }

    /// Replace the falling piece, if it fits at (x, y). Used by tests and replays.
    pub fn place_active(&mut self, piece: Piece, x: i8, y: i8) -> bool {
        if self.game_over || collides(&self.board, piece.shape(), x, y) {
            return false;
        }
        self.active = Some(ActivePiece { piece, x, y });
        self.lock.reset(self.now_ms);
        self.last_action_was_rotate = false;
        true
    }

    /// Replace the on-deck piece.
    pub fn set_next_piece(&mut self, piece: Piece) {
        self.next = piece;
    }

    /// Apply one action atomically. Returns whether it had any effect.
    ///
    /// While the game is over only `Restart` is accepted.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if self.game_over && action != GameAction::Restart {
            return false;
        }
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop_step(),
            GameAction::SoftDropRelease => self.release_soft_drop(),
            GameAction::Rotate => self.rotate(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::Hold => self.hold(),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Advance the logical clock by one frame.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;
        self.effects.update(elapsed_ms, &mut self.fx_rng);

        if self.game_over {
            return;
        }

        for event in self.schedule.due(self.now_ms) {
            match event {
                ScheduledEvent::Gravity => {
                    self.descend(false);
                }
                ScheduledEvent::Settle { episode_id } => {
                    if episode_id == self.episode_id {
                        self.settle();
                    }
                }
                ScheduledEvent::Randomize => self.randomize(),
            }
            if self.game_over {
                return;
            }
        }

        if let Some(active) = self.active {
            if self.lock.is_locking()
                && !is_resting(&self.board, active.piece.shape(), active.x, active.y)
            {
                self.lock.on_support_lost();
            }
        }
        if self.lock.on_frame(self.now_ms, self.soft_drop_held) == LockDecision::Commit {
            self.commit();
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, dx: i8) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };
        if self.game_over || collides(&self.board, active.piece.shape(), active.x + dx, active.y)
        {
            return false;
        }
        active.x += dx;
        self.active = Some(active);
        self.last_action_was_rotate = false;

        let resting = is_resting(&self.board, active.piece.shape(), active.x, active.y);
        self.lock.note_movement(self.now_ms, resting);
        true
    }

    pub fn rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        if self.game_over {
            return false;
        }
        let board = &self.board;
        let Some(rotated) = try_rotate(&active.piece, active.x, active.y, |shape, x, y| {
            collides(board, shape, x, y)
        }) else {
            return false;
        };

        let active = ActivePiece {
            piece: rotated.piece,
            x: rotated.x,
            y: active.y,
        };
        self.active = Some(active);
        self.last_action_was_rotate = true;

        let resting = is_resting(&self.board, active.piece.shape(), active.x, active.y);
        self.lock.note_movement(self.now_ms, resting);
        true
    }

    /// One player soft-drop step. Marks soft drop as held until released.
    pub fn soft_drop_step(&mut self) -> bool {
        if self.game_over || self.active.is_none() {
            return false;
        }
        self.soft_drop_held = true;
        self.descend(true)
    }

    /// Soft-drop input released. A piece waiting to lock commits now.
    pub fn release_soft_drop(&mut self) -> bool {
        let was_held = std::mem::replace(&mut self.soft_drop_held, false);
        if self.lock.on_soft_drop_release() == LockDecision::Commit {
            self.commit();
            return true;
        }
        was_held
    }

    /// One-row descent attempt. Returns whether the piece moved.
    fn descend(&mut self, by_player: bool) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };
        let blocked = is_resting(&self.board, active.piece.shape(), active.x, active.y);
        if !blocked {
            active.y += 1;
            self.active = Some(active);
            self.last_action_was_rotate = false;
            if by_player {
                self.soft_drop_cells += 1;
                self.scores.add_points(calculate_drop_score(1, false));
            }
        }

        if self.lock.on_descent(self.now_ms, blocked, self.soft_drop_held) == LockDecision::Commit
        {
            self.commit();
        }
        !blocked
    }

    pub fn hard_drop(&mut self) -> bool {
        let Some(mut active) = self.active else {
            return false;
        };
        if self.game_over {
            return false;
        }
        let landing = landing_y(&self.board, active.piece.shape(), active.x, active.y);
        let distance = (landing - active.y).max(0) as u32;
        active.y = landing;
        self.active = Some(active);
        if distance > 0 {
            self.last_action_was_rotate = false;
        }

        self.hard_drop_cells += distance;
        self.scores.add_points(calculate_drop_score(distance, true));
        self.commit();
        true
    }

    /// Swap the falling piece into hold. Once per placement.
    pub fn hold(&mut self) -> bool {
        if !self.can_hold || self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let current = active.piece.reset_orientation();
        match self.hold.replace(current) {
            Some(held) => {
                self.spawn(held.reset_orientation());
            }
            None => {
                self.spawn_next();
            }
        }

        self.can_hold = false;
        true
    }

    /// Start a new episode. Any randomizer still in flight is dropped.
    pub fn restart(&mut self) {
        self.episode_id = self.episode_id.wrapping_add(1);
        self.board.clear();
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.scores = ScoreBoard::new();
        self.reported = (0, 1, 0, 0);
        self.lines = 0;
        self.effects.clear();
        self.lifted = None;
        self.last_reseed = None;
        self.game_over = false;
        self.soft_drop_held = false;
        self.last_action_was_rotate = false;
        self.soft_drop_cells = 0;
        self.hard_drop_cells = 0;
        self.schedule.restart(self.now_ms);
        self.next = self.factory.create(&mut self.rng);

        self.events.push(GameEvent::Restarted {
            episode_id: self.episode_id,
        });
        self.spawn_next();
    }

    /// Lift all settled cells now; they come back after the shake.
    pub fn randomize(&mut self) {
        if self.game_over || self.lifted.is_some() {
            return;
        }
        let cells = lift_cells(&mut self.board);
        self.effects.on_randomize(&cells, &mut self.fx_rng);
        self.events.push(GameEvent::RandomizeStarted {
            cells: cells.len() as u32,
        });
        self.schedule.defer_settle(self.now_ms, self.episode_id);
        self.lifted = Some(cells);
    }

    fn settle(&mut self) {
        let Some(mut cells) = self.lifted.take() else {
            return;
        };
        let active = self.active;

        let report = reseed(
            &mut self.board,
            &mut cells,
            &mut self.rng,
            |x, y| active.is_some_and(|a| a.covers(x, y)),
            |board| {
                active.is_some_and(|a| {
                    let shape = a.piece.shape();
                    collides(board, shape, a.x, a.y) || collides(board, shape, shape.spawn_x(), 0)
                })
            },
        );
        self.effects.end_board_shake();
        self.last_reseed = Some(report);
        self.events.push(GameEvent::RandomizeSettled {
            expected: report.expected as u32,
            placed: report.placed as u32,
            repaired: report.repaired,
            rescued_spawn: report.rescued_spawn,
        });
    }

    /// Merge the falling piece, clear rows, score, and bring in the next piece.
    fn commit(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let tspin = is_tspin(
            &self.board,
            &active.piece,
            active.x,
            active.y,
            self.last_action_was_rotate,
        );
        self.board.merge(&active.piece, active.x, active.y);
        self.can_hold = true;

        // Rows left full by a reseed go too, but only rows the piece completed score.
        let piece_rows = active.y as usize..(active.y + active.piece.shape().rows() as i8) as usize;
        let cleared: ClearedRows = self
            .board
            .clear_full_rows()
            .into_iter()
            .filter(|row| piece_rows.contains(row))
            .collect();
        let lines = cleared.len() as u32;
        self.events.push(GameEvent::PieceLocked {
            lines_cleared: lines,
        });

        if cleared.is_empty() {
            self.scores.record_no_clear();
        } else {
            let (event, leveled_up) = self.scores.record_clear(&cleared, tspin);
            self.lines += lines;
            let palette = *self.factory.palette().colors();
            self.effects.on_line_clear(lines, &palette, &mut self.fx_rng);
            self.events.push(GameEvent::LineClear(event));
            if leveled_up {
                self.events.push(GameEvent::LevelUp {
                    level: self.scores.level,
                });
            }
        }
        self.report_score();

        self.last_action_was_rotate = false;
        self.spawn_next();
    }

    fn report_score(&mut self) {
        let current = (
            self.scores.score,
            self.scores.level,
            self.scores.combo,
            self.scores.stack,
        );
        if current != self.reported {
            self.reported = current;
            self.events.push(GameEvent::ScoreChanged {
                score: current.0,
                level: current.1,
                combo: current.2,
                stack: current.3,
            });
        }
    }

    /// Promote the on-deck piece and create a new one.
    fn spawn_next(&mut self) -> bool {
        let next = self.factory.create(&mut self.rng);
        let piece = std::mem::replace(&mut self.next, next);
        self.spawn(piece)
    }

    /// Put `piece` at the spawn position, or end the game if it does not fit.
    fn spawn(&mut self, piece: Piece) -> bool {
        self.lock.reset(self.now_ms);
        self.last_action_was_rotate = false;

        let x = piece.shape().spawn_x();
        if collides(&self.board, piece.shape(), x, 0) {
            self.active = None;
            self.set_game_over();
            return false;
        }
        self.active = Some(ActivePiece { piece, x, y: 0 });
        true
    }

    fn set_game_over(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.soft_drop_held = false;
        self.report_score();
        self.events.push(GameEvent::GameOver {
            score: self.scores.score,
            level: self.scores.level,
        });
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_grid(&mut out.board);
        out.active = self.active.map(|a| ActiveSnapshot {
            piece: a.piece,
            x: a.x,
            y: a.y,
        });
        out.ghost_y = self.ghost_y();
        out.hold = self.hold;
        out.next = Some(self.next);
        out.can_hold = self.can_hold;
        out.particles.clear();
        out.particles.extend_from_slice(self.effects.particles());
        out.screen_shake = self.effects.screen_shake();
        out.shake_intensity = self.effects.shake_intensity();
        out.shake_offset = self.effects.shake_offset();
        out.randomizing = self.lifted.is_some();
        out.style = self.style;
        out.game_over = self.game_over;
        out.score = self.scores.score;
        out.level = self.scores.level;
        out.combo = self.scores.combo;
        out.stack = self.scores.stack;
        out.lines = self.lines;
        out.locking = self.lock.is_locking();
        out.episode_id = self.episode_id;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
