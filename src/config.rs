//! Game configuration: piece style, palette overrides and RNG seed.
//!
//! Sources are layered, later wins:
//! 1. built-in defaults
//! 2. a JSON file named by `TREMOR_TETRIS_CONFIG`
//! 3. `TREMOR_TETRIS_STYLE` / `TREMOR_TETRIS_SEED`
//!
//! ```json
//! { "style": "glow", "palette": ["#FF0000", "#00FF00"], "seed": 42 }
//! ```
//!
//! Nothing here touches scoring or collision; the values are purely cosmetic except the
//! seed, which only picks the piece sequence.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::core::{GameSession, Palette};
use crate::types::{PieceStyle, Rgb, PALETTE_SIZE};

pub const CONFIG_PATH_ENV: &str = "TREMOR_TETRIS_CONFIG";
pub const STYLE_ENV: &str = "TREMOR_TETRIS_STYLE";
pub const SEED_ENV: &str = "TREMOR_TETRIS_SEED";

/// Raw configuration as read from JSON. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub style: Option<String>,
    /// Slot-wise overrides, `#RRGGBB`. Slots past the list keep their default color.
    pub palette: Vec<String>,
    pub seed: Option<u32>,
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid config JSON")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config file {}", path.display()))
    }

    /// Defaults, then the config file, then environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| env::var(key).ok())
    }

    /// Same as [`GameConfig::load`] with an injectable environment lookup.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = match lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(path.trim()))?,
            None => Self::default(),
        };
        base.with_env_overrides(lookup)
    }

    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(style) = lookup(STYLE_ENV).filter(|s| !s.trim().is_empty()) {
            self.style = Some(style.trim().to_string());
        }
        if let Some(seed) = lookup(SEED_ENV).filter(|s| !s.trim().is_empty()) {
            let seed = seed
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow!("{SEED_ENV}: invalid seed value: {seed}"))?;
            self.seed = Some(seed);
        }
        Ok(self)
    }

    pub fn piece_style(&self) -> Result<PieceStyle> {
        match self.style.as_deref() {
            None => Ok(PieceStyle::default()),
            Some(name) => {
                PieceStyle::from_str(name).ok_or_else(|| anyhow!("unknown piece style: {name}"))
            }
        }
    }

    pub fn palette(&self) -> Result<Palette> {
        if self.palette.len() > PALETTE_SIZE {
            return Err(anyhow!(
                "palette has {} colors, at most {PALETTE_SIZE} are allowed",
                self.palette.len()
            ));
        }
        let mut palette = Palette::default();
        for (slot, hex) in self.palette.iter().enumerate() {
            let color = Rgb::from_hex(hex)
                .with_context(|| format!("palette slot {slot}: {hex:?}"))?;
            palette.set_slot(slot, color);
        }
        Ok(palette)
    }

    /// Build a session; `fallback_seed` is used when no seed is configured.
    pub fn build_session(&self, fallback_seed: u32) -> Result<GameSession> {
        let mut session =
            GameSession::with_palette(self.seed.unwrap_or(fallback_seed), self.palette()?);
        session.set_style(self.piece_style()?);
        Ok(session)
    }
}
