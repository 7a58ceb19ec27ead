// Tunables for one effect instance. Everything here can come from a TOML
// file; anything missing falls back to the defaults below.
//
// Visual cheat sheet:
// - block_size: how chunky the particles look
// - max_radius / radius_growth / radius_decay: how big the "push" bubble gets
//   while you move, and how fast it shrinks when you stop
// - friction / ease: how quickly scattered particles settle back
// - switch_threshold / switch_cooldown_ms: how much you must scatter before
//   the next picture takes over, and how long it rests after

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Largest accepted particle edge length, in pixels.
pub const MAX_BLOCK_SIZE: u32 = 1024;
/// Largest accepted canvas margin, in pixels.
pub const MAX_MARGIN: u32 = 4096;

/// How a particle's position is integrated each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionModel {
    /// Velocity plus a continuous pull toward the origin.
    #[default]
    SpringReturn,
    /// Velocity only; origin is restored by an explicit reset.
    FreeDrift,
}

/// Which particles count toward the switch fraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplacedPredicate {
    /// Being inside the pointer radius (outside cooldown) is enough.
    #[default]
    InteractionFlag,
    /// Touched at least once and currently farther than `pixel_threshold`
    /// from origin on either axis.
    PixelDistance,
}

/// How slot indices line up across images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotAlignment {
    /// Slot i is the i-th non-transparent block of every image.
    #[default]
    Sequence,
    /// Slots are grid cells; a cell missing from an image is invisible there.
    GridCell,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectConfig {
    /// Particle edge length in pixels (B).
    pub block_size: u32,
    /// Transparent border added around every image, in pixels.
    pub margin: u32,
    /// Pointer influence radius cap (not squared).
    pub max_radius: f32,
    pub radius_growth: f32,
    pub radius_decay: f32,
    /// Per-tick velocity multiplier.
    pub friction: f32,
    /// Per-tick pull toward origin (spring-return only).
    pub ease: f32,
    /// Displaced fraction that triggers a switch.
    pub switch_threshold: f32,
    pub switch_cooldown_ms: u64,
    pub motion_model: MotionModel,
    pub displaced_predicate: DisplacedPredicate,
    /// Distance on either axis that counts as displaced (pixel-distance only).
    pub pixel_threshold: f32,
    pub slot_alignment: SlotAlignment,
    /// Hold a "complete" state for the cooldown, then snap particles home.
    pub reset_after_switch: bool,
    /// Window background behind transparent pixels, 0x00RRGGBB.
    pub background: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            block_size: 5,
            margin: 10,
            max_radius: 50.0,
            radius_growth: 5.0,
            radius_decay: 2.0,
            friction: 0.8,
            ease: 0.05,
            switch_threshold: 0.85,
            switch_cooldown_ms: 1500,
            motion_model: MotionModel::SpringReturn,
            displaced_predicate: DisplacedPredicate::InteractionFlag,
            pixel_threshold: 5.0,
            slot_alignment: SlotAlignment::Sequence,
            reset_after_switch: false,
            background: 0x00_00_00_00,
        }
    }
}

impl EffectConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "block_size must be in 1..={MAX_BLOCK_SIZE}, got {}",
                self.block_size
            )));
        }
        if self.margin > MAX_MARGIN {
            return Err(Error::InvalidConfig(format!(
                "margin must be at most {MAX_MARGIN}, got {}",
                self.margin
            )));
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "friction must be in (0, 1), got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.ease) {
            return Err(Error::InvalidConfig(format!("ease must be in [0, 1], got {}", self.ease)));
        }
        if !(self.switch_threshold > 0.0 && self.switch_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "switch_threshold must be in (0, 1], got {}",
                self.switch_threshold
            )));
        }
        if !(self.max_radius >= 1.0) || !self.max_radius.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "max_radius must be finite and at least 1, got {}",
                self.max_radius
            )));
        }
        for (name, v) in [
            ("radius_growth", self.radius_growth),
            ("radius_decay", self.radius_decay),
            ("pixel_threshold", self.pixel_threshold),
        ] {
            if !(v >= 0.0) || !v.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be >= 0, got {v}")));
            }
        }
        Ok(())
    }

    /// Free drift with no reset after a switch: scattered particles only come
    /// home through an explicit reset.
    pub fn drifts_without_reset(&self) -> bool {
        self.motion_model == MotionModel::FreeDrift && !self.reset_after_switch
    }

    #[inline]
    pub fn max_radius_sq(&self) -> f32 {
        self.max_radius * self.max_radius
    }

    #[inline]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.switch_cooldown_ms)
    }
}
