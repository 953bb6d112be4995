//! Cosmetic effects: particles, clear shake and the randomizer board shake.
//!
//! Positions live in field pixel space (`BLOCK_SIZE_PX` per cell). None of this feeds
//! back into gameplay; it advances once per frame, also while the game is over.

use crate::randomizer::LiftedCell;
use crate::rng::SimpleRng;
use crate::types::{
    Rgb, CLEAR_SHAKE_FRAMES, FIELD_HEIGHT_PX, FIELD_WIDTH_PX, MAX_SHAKE_INTENSITY,
    SHAKE_DURATION_MS,
};

pub const PARTICLES_PER_LINE: usize = 50;
pub const RANDOMIZE_PARTICLES: usize = 100;
pub const PARTICLE_LIFE_DECAY: f32 = 0.02;
pub const PARTICLE_SIZE_DECAY: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Rgb,
    pub size: f32,
    /// 1.0 at spawn, removed at <= 0.
    pub life: f32,
}

impl Particle {
    pub fn spawn(rng: &mut SimpleRng, color: Rgb) -> Self {
        Self {
            x: rng.next_between(0.0, FIELD_WIDTH_PX),
            y: rng.next_between(0.0, FIELD_HEIGHT_PX),
            size: rng.next_between(2.0, 5.0),
            vx: rng.next_between(-3.0, 3.0),
            vy: rng.next_between(-3.0, 3.0),
            color,
            life: 1.0,
        }
    }

    fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.life -= PARTICLE_LIFE_DECAY;
        self.size *= PARTICLE_SIZE_DECAY;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    particles: Vec<Particle>,
    /// Frames of line-clear shake left.
    screen_shake: u32,
    /// Remaining board-shake time.
    shake_ms: u32,
    shake_intensity: f32,
    shake_offset: (f32, f32),
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn screen_shake(&self) -> u32 {
        self.screen_shake
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_ms > 0
    }

    pub fn shake_intensity(&self) -> f32 {
        self.shake_intensity
    }

    /// Board offset in pixels for the current frame.
    pub fn shake_offset(&self) -> (f32, f32) {
        self.shake_offset
    }

    /// Line clear: `50 * lines` particles with palette colors and a short shake.
    pub fn on_line_clear(&mut self, lines: u32, palette: &[Rgb], rng: &mut SimpleRng) {
        for _ in 0..PARTICLES_PER_LINE * lines as usize {
            if let Some(&color) = rng.pick(palette) {
                self.particles.push(Particle::spawn(rng, color));
            }
        }
        self.screen_shake = CLEAR_SHAKE_FRAMES;
    }

    /// Randomizer trigger: burst colored from the lifted cells, then a decaying shake.
    pub fn on_randomize(&mut self, lifted: &[LiftedCell], rng: &mut SimpleRng) {
        if !lifted.is_empty() {
            for _ in 0..RANDOMIZE_PARTICLES {
                if let Some(cell) = rng.pick(lifted) {
                    self.particles.push(Particle::spawn(rng, cell.color));
                }
            }
        }
        self.shake_ms = SHAKE_DURATION_MS;
        self.shake_intensity = MAX_SHAKE_INTENSITY;
    }

    /// The deferred reseed ran.
    pub fn end_board_shake(&mut self) {
        self.shake_ms = 0;
        self.shake_intensity = 0.0;
        self.shake_offset = (0.0, 0.0);
    }

    /// One frame.
    pub fn update(&mut self, elapsed_ms: u32, rng: &mut SimpleRng) {
        self.particles.retain_mut(|p| {
            p.update();
            p.life > 0.0
        });

        self.screen_shake = self.screen_shake.saturating_sub(1);

        if self.shake_ms > 0 {
            self.shake_ms = self.shake_ms.saturating_sub(elapsed_ms);
            self.shake_intensity =
                self.shake_ms as f32 / SHAKE_DURATION_MS as f32 * MAX_SHAKE_INTENSITY;
            self.shake_offset = (
                (rng.next_unit() - 0.5) * self.shake_intensity,
                (rng.next_unit() - 0.5) * self.shake_intensity,
            );
            if self.shake_ms == 0 {
                self.end_board_shake();
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.end_board_shake();
        self.screen_shake = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_PALETTE, TICK_MS};

    #[test]
    fn test_clear_spawns_particles_in_field() {
        let mut fx = Effects::new();
        let mut rng = SimpleRng::new(1);
        fx.on_line_clear(2, &DEFAULT_PALETTE, &mut rng);

        assert_eq!(fx.particles().len(), 100);
        assert_eq!(fx.screen_shake(), CLEAR_SHAKE_FRAMES);
        for p in fx.particles() {
            assert!((0.0..FIELD_WIDTH_PX).contains(&p.x));
            assert!((0.0..FIELD_HEIGHT_PX).contains(&p.y));
            assert!((2.0..5.0).contains(&p.size));
            assert!((-3.0..3.0).contains(&p.vx));
            assert!(DEFAULT_PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn test_particles_fade_out() {
        let mut fx = Effects::new();
        let mut rng = SimpleRng::new(2);
        fx.on_line_clear(1, &DEFAULT_PALETTE, &mut rng);

        for _ in 0..45 {
            fx.update(TICK_MS, &mut rng);
        }
        assert_eq!(fx.particles().len(), 50);
        for _ in 0..10 {
            fx.update(TICK_MS, &mut rng);
        }
        assert!(fx.particles().is_empty());
        assert_eq!(fx.screen_shake(), 0);
    }

    #[test]
    fn test_board_shake_decays() {
        let mut fx = Effects::new();
        let mut rng = SimpleRng::new(3);
        fx.on_randomize(&[], &mut rng);
        assert!(fx.particles().is_empty());
        assert!(fx.is_shaking());
        assert_eq!(fx.shake_intensity(), MAX_SHAKE_INTENSITY);

        fx.update(500, &mut rng);
        assert!((fx.shake_intensity() - MAX_SHAKE_INTENSITY / 2.0).abs() < 1e-4);
        let (dx, dy) = fx.shake_offset();
        assert!(dx.abs() <= MAX_SHAKE_INTENSITY / 4.0);
        assert!(dy.abs() <= MAX_SHAKE_INTENSITY / 4.0);

        fx.update(500, &mut rng);
        assert!(!fx.is_shaking());
        assert_eq!(fx.shake_offset(), (0.0, 0.0));
    }

    #[test]
    fn test_randomize_particles_use_lifted_colors() {
        let mut fx = Effects::new();
        let mut rng = SimpleRng::new(4);
        let lifted = [LiftedCell {
            x: 0,
            y: 19,
            color: DEFAULT_PALETTE[6],
        }];
        fx.on_randomize(&lifted, &mut rng);
        assert_eq!(fx.particles().len(), RANDOMIZE_PARTICLES);
        assert!(fx.particles().iter().all(|p| p.color == DEFAULT_PALETTE[6]));
    }
}
