//! Scanline renderer: blends rasterized coverage into a pixel format.

use crate::basics::Contour;
use crate::canvas::PixelFormat;
use crate::rasterizer::{Rasterizer, Scanline};
use crate::scanline::ScanlineU8;

/// Sweep every row of `ras` and blend it into `ren` with a solid color.
pub fn render_scanlines_aa_solid<PF: PixelFormat>(
    ras: &mut Rasterizer,
    sl: &mut ScanlineU8,
    ren: &mut PF,
    color: &PF::ColorType,
) {
    if !ras.rewind_scanlines() {
        return;
    }
    while ras.sweep_scanline(sl) {
        let y = sl.y();
        for (x, covers) in sl.iter() {
            ren.blend_solid_hspan(x, y, color, covers);
        }
    }
}

/// Reusable rasterizer + scanline pair for filling shapes.
///
/// All contours passed to one `fill` call are rasterized together, so the
/// color is blended exactly once per pixel even where they overlap.
#[derive(Default)]
pub struct ShapeRenderer {
    ras: Rasterizer,
    sl: ScanlineU8,
}

impl ShapeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the union of `contours` with `color`.
    pub fn fill<PF: PixelFormat>(&mut self, ren: &mut PF, contours: &[Contour], color: &PF::ColorType) {
        self.ras.reset();
        for c in contours {
            self.ras.add_contour(c);
        }
        render_scanlines_aa_solid(&mut self.ras, &mut self.sl, ren, color);
    }
}

// ============================================================================
// Tests
// ============================================================================
