//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Frames are diffed against the previously drawn buffer; only changed runs of
//! cells are re-emitted. A size change (or [`TerminalRenderer::invalidate`]) forces
//! a full redraw.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

/// What one `draw_swap` call sent to the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub full_redraw: bool,
    pub runs: u32,
    pub bytes: usize,
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        self.last = None;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw (terminal resize).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers keep one `FrameBuffer` and pass it in every frame. After the call
    /// `fb` holds the previous frame, ready to be overwritten by the next render.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<DrawStats> {
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => prev,
            stale => {
                let mut prev = stale.unwrap_or_else(|| FrameBuffer::new(0, 0));
                self.buf.clear();
                encode_full_into(fb, &mut self.buf)?;
                self.flush_buf()?;
                prev.resize(fb.width(), fb.height());
                std::mem::swap(&mut prev, fb);
                self.last = Some(prev);
                return Ok(DrawStats {
                    full_redraw: true,
                    runs: fb.height() as u32,
                    bytes: self.buf.len(),
                });
            }
        };

        self.buf.clear();
        let runs = encode_diff_into(&prev, fb, &mut self.buf)?;
        if runs > 0 {
            self.flush_buf()?;
        }

        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(DrawStats {
            full_redraw: false,
            runs,
            bytes: if runs > 0 { self.buf.len() } else { 0 },
        })
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a full-frame redraw into `out` without touching stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut current: Option<CellStyle> = None;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            queue_style_change(out, &mut current, cell.style)?;
            out.queue(Print(cell.ch))?;
        }
        if y + 1 < fb.height() {
            out.queue(Print("\r\n"))?;
        }
    }

    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Encode only the changed runs between two same-sized frames. Returns the run count;
/// nothing is written when the frames are identical.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<u32> {
    let mut current: Option<CellStyle> = None;
    let mut runs = 0;

    for_each_changed_run(prev, next, |x, y, len| {
        runs += 1;
        out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            queue_style_change(out, &mut current, cell.style)?;
            out.queue(Print(cell.ch))?;
        }
        Ok(())
    })?;

    if runs > 0 {
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
    }
    Ok(runs)
}

fn queue_style_change(
    out: &mut Vec<u8>,
    current: &mut Option<CellStyle>,
    style: CellStyle,
) -> Result<()> {
    if *current == Some(style) {
        return Ok(());
    }
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    *current = Some(style);
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        for y in 0..next.height() {
            f(0, y, next.width())?;
        }
        return Ok(());
    }

    let w = next.width() as usize;
    let (a, b) = (prev.cells(), next.cells());
    for y in 0..next.height() {
        let row = y as usize * w;
        let mut x = 0;
        while x < w {
            if a[row + x] == b[row + x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && a[row + x] != b[row + x] {
                x += 1;
            }
            f(start as u16, y, (x - start) as u16)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn changed_runs_are_coalesced() {
        let style = CellStyle::default();
        let a = FrameBuffer::new(6, 2);
        let mut b = FrameBuffer::new(6, 2);
        for x in 1..=3 {
            b.put_char(x, 0, 'X', style);
        }
        b.put_char(5, 1, 'Y', style);

        let mut runs = Vec::new();
        for_each_changed_run(&a, &b, |x, y, len| {
            runs.push((x, y, len));
            Ok(())
        })
        .unwrap();
        assert_eq!(runs, vec![(1, 0, 3), (5, 1, 1)]);
    }

    #[test]
    fn identical_frames_encode_nothing() {
        let fb = FrameBuffer::new(8, 3);
        let mut out = Vec::new();
        assert_eq!(encode_diff_into(&fb, &fb.clone(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn diff_only_prints_changed_cells() {
        let a = FrameBuffer::new(10, 1);
        let mut b = a.clone();
        b.put_str(4, 0, "ok", CellStyle::default().bold());

        let mut out = Vec::new();
        assert_eq!(encode_diff_into(&a, &b, &mut out).unwrap(), 1);
        let s = text(&out);
        assert!(s.contains("ok"));
        assert_eq!(s.matches(' ').count(), 0);
    }

    #[test]
    fn full_redraw_prints_every_row() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.put_str(0, 0, "AB", CellStyle::default());
        fb.put_str(0, 1, "CD", CellStyle::default());

        let mut out = Vec::new();
        encode_full_into(&fb, &mut out).unwrap();
        assert!(text(&out).contains("AB\r\nCD"));
    }

    #[test]
    fn style_changes_are_only_emitted_once_per_run() {
        let mut current = None;
        let mut out = Vec::new();
        let style = CellStyle::new(Rgb::new(1, 2, 3), Rgb::new(0, 0, 0));
        queue_style_change(&mut out, &mut current, style).unwrap();
        let len = out.len();
        queue_style_change(&mut out, &mut current, style).unwrap();
        assert_eq!(out.len(), len);
        assert_eq!(current, Some(style));
    }
}
