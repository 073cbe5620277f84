//! # glow-tree
//!
//! Renders a "Christmas tree" made of two counter-wound conical spirals,
//! either as a still PNG or as a looping GIF where the spirals rotate and
//! glow.
//!
//! ## Architecture
//!
//! Drawing runs through a small anti-aliased vector pipeline:
//!
//! 1. **Curves** sample parametric spirals in 3D
//! 2. **Projection** maps them through a perspective camera to pixels
//! 3. **Dash / stroke** turn each projected polyline into closed contours
//! 4. **Rasterizer** converts contours into per-pixel coverage
//! 5. **Canvas** blends coverage into an RGBA8 buffer
//!
//! Frames are captured by an `animation::FrameRecorder` and streamed to a
//! `FrameSink`, such as the GIF encoder in `export`.

// Foundation types
pub mod basics;
pub mod color;
pub mod error;

// Rasterization
pub mod canvas;
pub mod cells;
pub mod rasterizer;
pub mod renderer;
pub mod scanline;

// Geometry
pub mod dash;
pub mod ellipse;
pub mod marker;
pub mod stroke;

// Scene
pub mod curve;
pub mod projection;
pub mod scene;

// Output
pub mod animation;
pub mod config;
pub mod export;

pub use animation::{Animation, FrameRecorder, FrameSink, FrameTiming, MemorySink};
pub use canvas::Canvas;
pub use color::Rgba8;
pub use config::TreeConfig;
pub use error::{Error, Result};
pub use export::{save_gif, save_png, GifWriter, OutputFormat};
pub use scene::Scene;

/// Render the still tree described by `config`.
pub fn render_still(config: &TreeConfig) -> Canvas {
    Scene::basic_tree(config).render_image(config.width, config.height)
}

/// Render the glow animation described by `config` into `sink`.
pub fn render_animation<S: FrameSink>(config: &TreeConfig, sink: S) -> Result<S> {
    Animation::from_config(config).record(config, sink)
}
