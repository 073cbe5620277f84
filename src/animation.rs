//! Frame loop and capture.
//!
//! `Animation::record` renders one glow frame per phase and hands each
//! finished canvas to a `FrameRecorder`, which forwards it to a
//! `FrameSink` together with its display delay. The recorder keeps a
//! single frame back so the last one can carry the loop pause; sinks can
//! therefore stream frames without knowing the frame count up front.

use std::f64::consts::PI;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::config::TreeConfig;
use crate::curve::linspace;
use crate::error::Result;
use crate::projection::{Bounds3, Projector};
use crate::scene::Scene;

// ============================================================================
// FrameTiming
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameTiming {
    /// Display time of every frame.
    pub interval_ms: u32,
    /// Extra pause on the last frame before the loop restarts.
    pub repeat_delay_ms: u32,
    /// Number of loops; `None` loops forever.
    pub repeat: Option<u16>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            repeat_delay_ms: 3000,
            repeat: None,
        }
    }
}

impl FrameTiming {
    pub fn delay_ms(&self, is_last: bool) -> u32 {
        if is_last {
            self.interval_ms.saturating_add(self.repeat_delay_ms)
        } else {
            self.interval_ms
        }
    }

    /// Total playback time of one loop of `frames` frames.
    pub fn loop_duration_ms(&self, frames: usize) -> u64 {
        if frames == 0 {
            return 0;
        }
        frames as u64 * self.interval_ms as u64 + self.repeat_delay_ms as u64
    }
}

// ============================================================================
// FrameSink
// ============================================================================

/// Destination for captured frames.
pub trait FrameSink {
    fn push_frame(&mut self, canvas: &Canvas, delay_ms: u32) -> Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A captured frame held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub image: image::RgbaImage,
    pub delay_ms: u32,
}

/// Collects every frame into a `Vec`.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<RecordedFrame>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_frames(self) -> Vec<RecordedFrame> {
        self.frames
    }
}

impl FrameSink for MemorySink {
    fn push_frame(&mut self, canvas: &Canvas, delay_ms: u32) -> Result<()> {
        self.frames.push(RecordedFrame {
            image: canvas.to_image(),
            delay_ms,
        });
        Ok(())
    }
}

// ============================================================================
// FrameRecorder
// ============================================================================

/// Snapshots rendered canvases into a sink.
pub struct FrameRecorder<S: FrameSink> {
    sink: S,
    timing: FrameTiming,
    pending: Option<Canvas>,
    frames: usize,
}

impl<S: FrameSink> FrameRecorder<S> {
    pub fn new(sink: S, timing: FrameTiming) -> Self {
        Self {
            sink,
            timing,
            pending: None,
            frames: 0,
        }
    }

    /// Capture the current contents of `canvas`.
    pub fn snap(&mut self, canvas: &Canvas) -> Result<()> {
        if let Some(prev) = self.pending.as_mut() {
            self.sink.push_frame(prev, self.timing.delay_ms(false))?;
            prev.clone_from(canvas);
        } else {
            self.pending = Some(canvas.clone());
        }
        self.frames += 1;
        Ok(())
    }

    /// Frames captured so far.
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Flush the last frame with the loop pause and close the sink.
    pub fn finish(mut self) -> Result<S> {
        if let Some(last) = self.pending.take() {
            self.sink.push_frame(&last, self.timing.delay_ms(true))?;
        }
        self.sink.finish()?;
        Ok(self.sink)
    }
}

// ============================================================================
// Animation
// ============================================================================

/// The rotating glow tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub frame_count: usize,
    pub timing: FrameTiming,
}

impl Animation {
    pub fn from_config(config: &TreeConfig) -> Self {
        Self {
            frame_count: config.animation.frames,
            timing: config.animation.timing,
        }
    }

    /// Phase offset of each frame: one full sweep over four turns.
    pub fn phases(&self) -> Vec<f64> {
        linspace(0.0, 8.0 * PI, self.frame_count)
    }

    /// Axis limits shared by every frame, so the box does not move.
    pub fn bounds(&self, config: &TreeConfig) -> Bounds3 {
        self.phases()
            .into_iter()
            .map(|phase| Scene::glow_frame(config, phase).bounds())
            .fold(Bounds3::empty(), |acc, b| acc.union(&b))
    }

    /// Render every frame into `sink` and return it once finished.
    pub fn record<S: FrameSink>(&self, config: &TreeConfig, sink: S) -> Result<S> {
        let bounds = self.bounds(config);
        let projector = Projector::new(&config.glow.view, &bounds, config.width, config.height);
        let mut canvas = Canvas::new(config.width, config.height);
        let mut recorder = FrameRecorder::new(sink, self.timing);

        let phases = self.phases();
        for (i, phase) in phases.iter().enumerate() {
            Scene::glow_frame(config, *phase).render(&projector, &mut canvas);
            recorder.snap(&canvas)?;
            debug!("frame {}/{} (phase {:.3})", i + 1, phases.len(), phase);
        }

        let frames = recorder.frame_count();
        let sink = recorder.finish()?;
        info!(
            "recorded {} frames at {}x{}, {:.1}s per loop",
            frames,
            config.width,
            config.height,
            self.timing.loop_duration_ms(frames) as f64 / 1000.0
        );
        Ok(sink)
    }
}

// ============================================================================
// Tests
// ============================================================================
