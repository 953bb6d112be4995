use crate::effects::Particle;
use crate::piece::Piece;
use crate::types::{Cell, PieceStyle, BOARD_HEIGHT, BOARD_WIDTH};

pub type BoardGrid = [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

/// The falling piece and where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub piece: Piece,
    pub x: i8,
    pub y: i8,
}

/// Read-only view of a session for one frame.
///
/// Reuse one value with `GameSession::snapshot_into` to avoid per-frame allocation;
/// the particle buffer keeps its capacity between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: BoardGrid,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hold: Option<Piece>,
    pub next: Option<Piece>,
    pub can_hold: bool,
    pub particles: Vec<Particle>,
    /// Frames of line-clear shake left.
    pub screen_shake: u32,
    pub shake_intensity: f32,
    /// Board offset in field pixels for this frame.
    pub shake_offset: (f32, f32),
    /// Cells are lifted and waiting to be re-placed.
    pub randomizing: bool,
    pub style: PieceStyle,
    pub game_over: bool,
    pub score: u32,
    pub level: u32,
    pub combo: u32,
    pub stack: u32,
    pub lines: u32,
    pub locking: bool,
    pub episode_id: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.ghost_y = None;
        self.hold = None;
        self.next = None;
        self.can_hold = true;
        self.particles.clear();
        self.screen_shake = 0;
        self.shake_intensity = 0.0;
        self.shake_offset = (0.0, 0.0);
        self.randomizing = false;
        self.style = PieceStyle::default();
        self.game_over = false;
        self.score = 0;
        self.level = 1;
        self.combo = 0;
        self.stack = 0;
        self.lines = 0;
        self.locking = false;
        self.episode_id = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            ghost_y: None,
            hold: None,
            next: None,
            can_hold: true,
            particles: Vec::new(),
            screen_shake: 0,
            shake_intensity: 0.0,
            shake_offset: (0.0, 0.0),
            randomizing: false,
            style: PieceStyle::default(),
            game_over: false,
            score: 0,
            level: 1,
            combo: 0,
            stack: 0,
            lines: 0,
            locking: false,
            episode_id: 0,
        }
    }
}
