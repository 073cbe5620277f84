//! PNG and GIF output.
//!
//! Encoding is delegated to the `image` crate. `GifWriter` is a streaming
//! `FrameSink`: each frame is quantized and written as soon as it arrives.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat};
use log::{debug, info};

use crate::animation::{FrameSink, FrameTiming, RecordedFrame};
use crate::canvas::Canvas;
use crate::error::{Error, Result};

/// Output kinds recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Gif,
}

impl OutputFormat {
    /// Pick the format from the extension of `path` (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("gif") => Ok(OutputFormat::Gif),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Write `canvas` as a PNG file.
pub fn save_png(canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let img = canvas.to_image();
    img.save_with_format(path, ImageFormat::Png)?;
    info!("wrote {}x{} PNG to {}", img.width(), img.height(), path.display());
    Ok(())
}

// ============================================================================
// GifWriter
// ============================================================================

fn gif_repeat(repeat: Option<u16>) -> Repeat {
    match repeat {
        Some(n) => Repeat::Finite(n),
        None => Repeat::Infinite,
    }
}

/// Output shared between `GifWriter` and its encoder. The encoder writes the
/// GIF trailer from its destructor and discards any error there, so the first
/// write error is kept here for `finish` to report.
struct SharedOutput<W> {
    writer: W,
    error: Option<io::Error>,
}

struct SharedWriter<W>(Rc<RefCell<SharedOutput<W>>>);

impl<W> SharedWriter<W> {
    fn record(out: &mut SharedOutput<W>, e: io::Error) -> io::Error {
        let kind = e.kind();
        if out.error.is_none() {
            out.error = Some(e);
        }
        io::Error::from(kind)
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self.0.borrow_mut();
        match out.writer.write(buf) {
            Ok(n) => Ok(n),
            Err(e) => Err(Self::record(&mut out, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut out = self.0.borrow_mut();
        match out.writer.flush() {
            Ok(()) => Ok(()),
            Err(e) => Err(Self::record(&mut out, e)),
        }
    }
}

/// Streaming animated GIF encoder.
///
/// The stream is only complete once `finish` has returned `Ok`; it writes
/// the trailer and flushes the underlying writer.
pub struct GifWriter<W: Write> {
    encoder: Option<GifEncoder<SharedWriter<W>>>,
    output: Rc<RefCell<SharedOutput<W>>>,
    frames: usize,
    path: Option<PathBuf>,
}

impl GifWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and start a GIF stream.
    pub fn create(path: impl AsRef<Path>, speed: i32, repeat: Option<u16>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        let mut writer = Self::new(file, speed, repeat)?;
        writer.path = Some(path.to_path_buf());
        Ok(writer)
    }
}

impl<W: Write> GifWriter<W> {
    /// `speed` trades quantization quality for time, 1 (best) to 30.
    pub fn new(w: W, speed: i32, repeat: Option<u16>) -> Result<Self> {
        let output = Rc::new(RefCell::new(SharedOutput {
            writer: w,
            error: None,
        }));
        let mut encoder =
            GifEncoder::new_with_speed(SharedWriter(Rc::clone(&output)), speed.clamp(1, 30));
        encoder.set_repeat(gif_repeat(repeat))?;
        Ok(Self {
            encoder: Some(encoder),
            output,
            frames: 0,
            path: None,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Finish the stream if needed and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        if self.encoder.is_some() {
            self.finish()?;
        }
        match Rc::try_unwrap(self.output) {
            Ok(cell) => Ok(cell.into_inner().writer),
            Err(_) => Err(io::Error::other("GIF output still shared").into()),
        }
    }

    fn encode(&mut self, image: image::RgbaImage, delay_ms: u32) -> Result<()> {
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| io::Error::other("GIF stream already finished"))?;
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        encoder.encode_frame(Frame::from_parts(image, 0, 0, delay))?;
        self.frames += 1;
        debug!("encoded GIF frame {}", self.frames);
        Ok(())
    }
}

impl<W: Write> FrameSink for GifWriter<W> {
    fn push_frame(&mut self, canvas: &Canvas, delay_ms: u32) -> Result<()> {
        self.encode(canvas.to_image(), delay_ms)
    }

    /// Write the trailer and flush. Calling it again is a no-op.
    fn finish(&mut self) -> Result<()> {
        let Some(encoder) = self.encoder.take() else {
            return Ok(());
        };
        drop(encoder);
        let mut out = self.output.borrow_mut();
        if let Some(e) = out.error.take() {
            return Err(e.into());
        }
        out.writer.flush()?;
        match &self.path {
            Some(p) => info!("wrote {} GIF frames to {}", self.frames, p.display()),
            None => info!("wrote {} GIF frames", self.frames),
        }
        Ok(())
    }
}

/// Encode frames already held in memory.
pub fn save_gif(
    frames: &[RecordedFrame],
    timing: &FrameTiming,
    speed: i32,
    path: impl AsRef<Path>,
) -> Result<()> {
    let mut writer = GifWriter::create(path, speed, timing.repeat)?;
    for f in frames {
        writer.encode(f.image.clone(), f.delay_ms)?;
    }
    writer.finish()
}

// ============================================================================
// Tests
// ============================================================================
