//! Scene and output configuration.
//!
//! Every field has a default reproducing the classic tree, so an empty JSON
//! object is a valid config. Unknown fields are rejected to catch typos.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::FrameTiming;
use crate::color::Rgba8;
use crate::dash::LineStyleKind;
use crate::error::{Error, Result};
use crate::marker::MarkerShape;
use crate::projection::{Point3, View};

/// Top-level configuration shared by the still and animated renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Pixels per inch; line widths and marker sizes are given in points.
    pub dpi: f64,
    pub background: Rgba8,
    /// Color of the first strand.
    pub primary_color: Rgba8,
    /// Color of the mirrored strand.
    pub secondary_color: Rgba8,
    /// Width of the main strands in points.
    pub line_width_pt: f64,
    pub line_style: LineStyleKind,
    pub still: StillConfig,
    pub glow: GlowConfig,
    pub animation: AnimationConfig,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1500,
            dpi: 100.0,
            background: Rgba8::BLACK,
            primary_color: Rgba8::new_opaque(0xff, 0x00, 0x00),
            secondary_color: Rgba8::new_opaque(0x00, 0xff, 0xcc),
            line_width_pt: 1.5,
            line_style: LineStyleKind::Dashed,
            still: StillConfig::default(),
            glow: GlowConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// A fainter copy of a strand squeezed along x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shadow {
    pub scale_x: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StillConfig {
    pub view: View,
    pub samples: usize,
    pub shadows: Vec<Shadow>,
}

impl Default for StillConfig {
    fn default() -> Self {
        Self {
            view: View::new(10.0, 0.2),
            samples: 100,
            shadows: vec![
                Shadow {
                    scale_x: 0.95,
                    alpha: 0.4,
                },
                Shadow {
                    scale_x: 0.9,
                    alpha: 0.2,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlowConfig {
    pub view: View,
    pub samples: usize,
    /// Number of wide translucent copies drawn per strand.
    pub passes: usize,
    pub alpha: f64,
    /// Width of the first pass in points; pass `i` is
    /// `base_width_pt + width_step_pt * i`.
    pub base_width_pt: f64,
    pub width_step_pt: f64,
    pub star: StarConfig,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            view: View::default(),
            samples: 200,
            passes: 10,
            alpha: 0.05,
            base_width_pt: 1.0,
            width_step_pt: 1.01,
            star: StarConfig::default(),
        }
    }
}

impl GlowConfig {
    pub fn pass_width_pt(&self, pass: usize) -> f64 {
        self.base_width_pt + self.width_step_pt * pass as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarConfig {
    /// Data-space position `[x, y, z]`.
    pub position: [f64; 3],
    /// Marker area in points².
    pub size: f64,
    pub color: Rgba8,
    pub shape: MarkerShape,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.5],
            size: 100.0,
            color: Rgba8::new_opaque(255, 215, 0),
            shape: MarkerShape::Star,
        }
    }
}

impl StarConfig {
    pub fn point(&self) -> Point3 {
        let [x, y, z] = self.position;
        Point3::new(x, y, z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub frames: usize,
    pub timing: FrameTiming,
    /// GIF quantization speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: 200,
            timing: FrameTiming::default(),
            gif_speed: 10,
        }
    }
}

impl TreeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no render can be produced from.
    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(Error::InvalidConfig(msg))
        }
        fn check_alpha(name: &str, a: f64) -> Result<()> {
            if (0.0..=1.0).contains(&a) {
                Ok(())
            } else {
                invalid(format!("{name} must be within [0, 1], got {a}"))
            }
        }
        fn check_width(name: &str, w: f64) -> Result<()> {
            if w.is_finite() && w >= 0.0 {
                Ok(())
            } else {
                invalid(format!("{name} must be a non-negative number, got {w}"))
            }
        }

        if self.width == 0 || self.height == 0 {
            return invalid(format!("image size {}x{} is empty", self.width, self.height));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return invalid(format!("dpi must be positive, got {}", self.dpi));
        }
        check_width("line_width_pt", self.line_width_pt)?;
        for (i, s) in self.still.shadows.iter().enumerate() {
            check_alpha(&format!("still.shadows[{i}].alpha"), s.alpha)?;
            if !s.scale_x.is_finite() {
                return invalid(format!("still.shadows[{i}].scale_x is not finite"));
            }
        }
        check_alpha("glow.alpha", self.glow.alpha)?;
        check_width("glow.base_width_pt", self.glow.base_width_pt)?;
        check_width("glow.width_step_pt", self.glow.width_step_pt)?;
        check_width("glow.star.size", self.glow.star.size)?;
        for view in [&self.still.view, &self.glow.view] {
            if !(view.elevation_deg.is_finite() && view.azimuth_deg.is_finite()) {
                return invalid("view angles must be finite".into());
            }
            if !(view.distance.is_finite() && view.distance > 1.0) {
                return invalid(format!("view distance must exceed 1, got {}", view.distance));
            }
        }
        if self.animation.frames == 0 {
            return invalid("animation needs at least one frame".into());
        }
        if !(1..=30).contains(&self.animation.gif_speed) {
            return invalid(format!(
                "gif_speed must be within 1..=30, got {}",
                self.animation.gif_speed
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
