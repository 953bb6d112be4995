//! RNG module - deterministic randomness for the whole session
//!
//! Every random draw in the engine (piece shape, piece color, randomizer
//! candidates, particle spawns, shake offsets) goes through [`SimpleRng`], so a
//! seed fully determines a session. [`PieceFactory`] draws shape and color as two
//! independent uniform picks.

use crate::piece::Piece;
use crate::types::{PieceKind, Rgb, PALETTE_SIZE};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Multiply-shift keeps the high bits; the low bits of an LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform float in [lo, hi).
    pub fn next_between(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.next_unit() * (hi - lo)
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Pick a uniform element, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        slice.get(self.next_range(slice.len() as u32) as usize)
    }

    /// Current internal state (for re-seeding a restarted session)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Active palette: one color per slot, overridable slot by slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    /// Override one slot. Returns false for an out-of-range slot.
    pub fn set_slot(&mut self, index: usize, color: Rgb) -> bool {
        match self.colors.get_mut(index) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_PALETTE)
    }
}

/// Creates pieces with a uniform shape and an independent uniform palette color.
#[derive(Debug, Clone, Default)]
pub struct PieceFactory {
    palette: Palette,
}

impl PieceFactory {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn create(&self, rng: &mut SimpleRng) -> Piece {
        let kind = PieceKind::ALL[rng.next_range(PieceKind::ALL.len() as u32) as usize];
        let color = self.palette.colors()[rng.next_range(PALETTE_SIZE as u32) as usize];
        Piece::new(kind, color)
    }
}
