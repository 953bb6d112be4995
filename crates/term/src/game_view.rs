//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Particle, Piece};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceStyle, BLOCK_SIZE_PX, BOARD_HEIGHT, BOARD_WIDTH};

const FIELD_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board frame landed in the framebuffer for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Glyphs and styles for one settled or falling block.
fn block_cells(style: PieceStyle, color: Rgb) -> [(char, CellStyle); 2] {
    match style {
        PieceStyle::Flat => {
            let s = CellStyle::new(color, FIELD_BG);
            [('█', s), ('█', s)]
        }
        PieceStyle::Gradient => [
            ('█', CellStyle::new(color, FIELD_BG)),
            ('▓', CellStyle::new(color.scaled(7, 10), FIELD_BG)),
        ],
        PieceStyle::Glow => {
            let s = CellStyle::new(color, color.scaled(1, 3)).bold();
            [('▐', s), ('▌', s)]
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Terminal columns covered by one field pixel column group.
    fn px_per_col(&self) -> f32 {
        BLOCK_SIZE_PX / self.cell_w as f32
    }

    /// Board frame position for a viewport, before any shake.
    pub fn layout(&self, viewport: Viewport) -> FrameLayout {
        let w = (BOARD_WIDTH as u16) * self.cell_w + 2;
        let h = (BOARD_HEIGHT as u16) * self.cell_h + 2;
        let x = viewport.width.saturating_sub(w + PANEL_WIDTH) / 2;
        let y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(h) / 2,
            AnchorY::Top => 0,
        };
        FrameLayout { x, y, w, h }
    }

    /// Render a snapshot into an existing framebuffer.
    ///
    /// This is the allocation-free hot path. Callers can reuse a framebuffer
    /// across frames and only resize when the terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).cell(' '));

        let base = self.layout(viewport);
        let (dx, dy) = self.shake_cells(snap.shake_offset);
        let frame = FrameLayout {
            x: offset(base.x, dx),
            y: offset(base.y, dy),
            ..base
        };

        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            frame.w - 2,
            frame.h - 2,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), FIELD_BG),
        );
        let border = if snap.screen_shake > 0 {
            CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold()
        } else {
            CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG)
        };
        self.draw_border(fb, frame, border);

        for y in 0..BOARD_HEIGHT as u16 {
            for x in 0..BOARD_WIDTH as u16 {
                match snap.board[y as usize][x as usize] {
                    Some(color) => self.draw_block(fb, frame, x, y, snap.style, color),
                    None => self.draw_empty_cell(fb, frame, x, y),
                }
            }
        }

        if let (Some(active), Some(ghost_y)) = (snap.active, snap.ghost_y) {
            if ghost_y > active.y {
                let style = CellStyle::new(active.piece.color().scaled(1, 2), FIELD_BG).dim();
                for (cx, cy) in active.piece.shape().cells() {
                    if let Some((x, y)) = on_board(active.x + cx, ghost_y + cy) {
                        self.fill_cell_rect(fb, frame, x, y, '░', style);
                    }
                }
            }
        }

        if let Some(active) = snap.active {
            for (cx, cy) in active.piece.shape().cells() {
                if let Some((x, y)) = on_board(active.x + cx, active.y + cy) {
                    self.draw_block(fb, frame, x, y, snap.style, active.piece.color());
                }
            }
        }

        for p in &snap.particles {
            self.draw_particle(fb, frame, p);
        }

        self.draw_side_panel(fb, snap, viewport, base);

        if snap.game_over {
            self.draw_game_over(fb, frame, snap.score);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Board-shake offset in whole terminal cells.
    fn shake_cells(&self, (ox, oy): (f32, f32)) -> (i16, i16) {
        let dx = (ox / self.px_per_col()).round() as i16;
        let dy = (oy / (BLOCK_SIZE_PX / self.cell_h as f32)).round() as i16;
        (dx, dy)
    }

    fn draw_border(&self, fb: &mut FrameBuffer, f: FrameLayout, style: CellStyle) {
        if f.w < 2 || f.h < 2 {
            return;
        }

        fb.put_char(f.x, f.y, '┌', style);
        fb.put_char(f.x + f.w - 1, f.y, '┐', style);
        fb.put_char(f.x, f.y + f.h - 1, '└', style);
        fb.put_char(f.x + f.w - 1, f.y + f.h - 1, '┘', style);

        for dx in 1..f.w - 1 {
            fb.put_char(f.x + dx, f.y, '─', style);
            fb.put_char(f.x + dx, f.y + f.h - 1, '─', style);
        }
        for dy in 1..f.h - 1 {
            fb.put_char(f.x, f.y + dy, '│', style);
            fb.put_char(f.x + f.w - 1, f.y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, f: FrameLayout, x: u16, y: u16) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), FIELD_BG).dim();
        self.fill_cell_rect(fb, f, x, y, '·', style);
    }

    fn draw_block(
        &self,
        fb: &mut FrameBuffer,
        f: FrameLayout,
        x: u16,
        y: u16,
        style: PieceStyle,
        color: Rgb,
    ) {
        let glyphs = block_cells(style, color);
        let px = f.x + 1 + x * self.cell_w;
        let py = f.y + 1 + y * self.cell_h;
        for row in 0..self.cell_h {
            for col in 0..self.cell_w {
                // Left glyph on the first column, right glyph on the rest.
                let (ch, s) = glyphs[(col > 0) as usize];
                fb.put_char(px + col, py + row, ch, s);
            }
        }
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        f: FrameLayout,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = f.x + 1 + cell_x * self.cell_w;
        let py = f.y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    /// Particles live in field pixel space; anything outside the field is clipped.
    fn draw_particle(&self, fb: &mut FrameBuffer, f: FrameLayout, p: &Particle) {
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let col = (p.x / self.px_per_col()) as u16;
        let row = (p.y / (BLOCK_SIZE_PX / self.cell_h as f32)) as u16;
        if col >= f.w - 2 || row >= f.h - 2 {
            return;
        }
        let ch = if p.size >= 3.5 { '•' } else { '·' };
        let mut style = CellStyle::new(p.color, FIELD_BG).bold();
        if p.life < 0.5 {
            style = style.dim();
        }
        fb.put_char(f.x + 1 + col, f.y + 1 + row, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        viewport: Viewport,
        frame: FrameLayout,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);

        let mut y = frame.y;
        for (name, v) in [
            ("SCORE", snap.score),
            ("LEVEL", snap.level),
            ("COMBO", snap.combo),
            ("STACK", snap.stack),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y.saturating_add(1), v, value);
            y = y.saturating_add(3);
        }

        fb.put_str(panel_x, y, "HOLD", label);
        if let Some(piece) = snap.hold {
            self.draw_preview(fb, panel_x, y.saturating_add(1), &piece, snap.style, !snap.can_hold);
        }
        y = y.saturating_add(4);

        fb.put_str(panel_x, y, "NEXT", label);
        if let Some(piece) = snap.next {
            self.draw_preview(fb, panel_x, y.saturating_add(1), &piece, snap.style, false);
        }
        y = y.saturating_add(6);

        if snap.randomizing {
            fb.put_str(panel_x, y, "SHUFFLE!", label);
        }
    }

    /// Small piece preview in the panel (spawn orientation as given).
    fn draw_preview(
        &self,
        fb: &mut FrameBuffer,
        x: u16,
        y: u16,
        piece: &Piece,
        style: PieceStyle,
        dimmed: bool,
    ) {
        let glyphs = block_cells(style, piece.color());
        for (cx, cy) in piece.shape().cells() {
            let px = x + cx as u16 * 2;
            let py = y + cy as u16;
            for (i, (ch, s)) in glyphs.iter().enumerate() {
                let s = if dimmed { s.dim() } else { *s };
                fb.put_char(px + i as u16, py, *ch, s);
            }
        }
    }

    fn draw_game_over(&self, fb: &mut FrameBuffer, f: FrameLayout, score: u32) {
        let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
        let hint = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let mid_y = f.y.saturating_add(f.h / 2);

        let center = |text_w: u16| f.x.saturating_add(f.w.saturating_sub(text_w) / 2);

        fb.put_str(center(9), mid_y.saturating_sub(1), "GAME OVER", style);
        let digits = decimal_width(score);
        let score_x = center(6 + digits);
        fb.put_str(score_x, mid_y, "SCORE ", hint);
        fb.put_u32(score_x + 6, mid_y, score, hint);
        fb.put_str(center(11), mid_y.saturating_add(1), "R: restart", hint);
    }
}

const PANEL_WIDTH: u16 = 14;

fn decimal_width(v: u32) -> u16 {
    let mut n = v;
    let mut w = 1;
    while n >= 10 {
        n /= 10;
        w += 1;
    }
    w
}

fn offset(base: u16, delta: i16) -> u16 {
    if delta < 0 {
        base.saturating_sub(delta.unsigned_abs())
    } else {
        base.saturating_add(delta as u16)
    }
}

fn on_board(x: i8, y: i8) -> Option<(u16, u16)> {
    if x >= 0 && x < BOARD_WIDTH as i8 && y >= 0 && y < BOARD_HEIGHT as i8 {
        Some((x as u16, y as u16))
    } else {
        None
    }
}
