//! RGBA canvas with clipped alpha blending.
//!
//! Owns the pixel memory for one frame (4 bytes per pixel, non-premultiplied,
//! row-major, top-to-bottom) and implements `PixelFormat`, the interface the
//! scanline renderer blends coverage through. Every operation is clipped to
//! the canvas bounds, so callers may hand in spans that run off the edge.

use crate::basics::{CoverType, RectI};
use crate::color::Rgba8;

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Pixel storage that can blend colors with anti-aliasing coverage.
pub trait PixelFormat {
    type ColorType;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Blend a single pixel at (x, y) with color `c` and coverage `cover`.
    fn blend_pixel(&mut self, x: i32, y: i32, c: &Self::ColorType, cover: CoverType);

    /// Blend a horizontal line of `len` pixels with uniform coverage.
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::ColorType, cover: CoverType);

    /// Blend a horizontal span with per-pixel coverage values.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Self::ColorType, covers: &[CoverType]);

    /// Get the pixel color at (x, y).
    fn pixel(&self, x: i32, y: i32) -> Self::ColorType;
}

// ============================================================================
// Canvas
// ============================================================================

const BPP: usize = 4;

/// An owned RGBA8 frame buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    clip_box: RectI,
    data: Vec<u8>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Canvas {
    /// Create a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clip_box: RectI::new(0, 0, width as i32 - 1, height as i32 - 1),
            data: vec![0u8; width as usize * height as usize * BPP],
        }
    }

    /// Create a canvas filled with `c`.
    pub fn with_background(width: u32, height: u32, c: &Rgba8) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.clear(c);
        canvas
    }

    /// Raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Fill every pixel with `c`, ignoring the previous contents.
    pub fn clear(&mut self, c: &Rgba8) {
        for px in self.data.chunks_exact_mut(BPP) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    #[inline]
    fn inbox(&self, x: i32, y: i32) -> bool {
        self.clip_box.hit_test(x, y)
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        (y as usize * self.width as usize + x as usize) * BPP
    }

    #[inline]
    fn blend_pix(p: &mut [u8], c: &Rgba8, alpha: u8) {
        if alpha == 255 {
            p.copy_from_slice(&[c.r, c.g, c.b, 255]);
        } else if alpha > 0 {
            p[0] = Rgba8::lerp(p[0], c.r, alpha);
            p[1] = Rgba8::lerp(p[1], c.g, alpha);
            p[2] = Rgba8::lerp(p[2], c.b, alpha);
            p[3] = Rgba8::lerp(p[3], 255, alpha);
        }
    }

    /// Consume the canvas into an `image` buffer for encoding.
    pub fn into_image(self) -> image::RgbaImage {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.data)
            .unwrap_or_else(|| image::RgbaImage::new(w, h))
    }

    /// Copy the canvas into an `image` buffer.
    pub fn to_image(&self) -> image::RgbaImage {
        self.clone().into_image()
    }
}

impl PixelFormat for Canvas {
    type ColorType = Rgba8;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        if !self.inbox(x, y) {
            return Rgba8::default();
        }
        let off = self.offset(x, y);
        let p = &self.data[off..off + BPP];
        Rgba8::new(p[0], p[1], p[2], p[3])
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: &Rgba8, cover: CoverType) {
        if self.inbox(x, y) {
            let off = self.offset(x, y);
            let alpha = Rgba8::mult_cover(c.a, cover);
            Self::blend_pix(&mut self.data[off..off + BPP], c, alpha);
        }
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Rgba8, cover: CoverType) {
        if y < self.clip_box.y1 || y > self.clip_box.y2 || len == 0 {
            return;
        }
        let x1 = x.max(self.clip_box.x1);
        let x2 = (x + len as i32 - 1).min(self.clip_box.x2);
        if x1 > x2 {
            return;
        }
        let alpha = Rgba8::mult_cover(c.a, cover);
        let start = self.offset(x1, y);
        let end = self.offset(x2, y) + BPP;
        for px in self.data[start..end].chunks_exact_mut(BPP) {
            Self::blend_pix(px, c, alpha);
        }
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Rgba8, covers: &[CoverType]) {
        if y < self.clip_box.y1 || y > self.clip_box.y2 {
            return;
        }
        for (i, &cov) in covers.iter().enumerate() {
            let px = x + i as i32;
            if px < self.clip_box.x1 {
                continue;
            }
            if px > self.clip_box.x2 {
                break;
            }
            let off = self.offset(px, y);
            let alpha = Rgba8::mult_cover(c.a, cov);
            Self::blend_pix(&mut self.data[off..off + BPP], c, alpha);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let c = Canvas::new(100, 50);
        assert_eq!(c.width(), 100);
        assert_eq!(c.height(), 50);
        assert_eq!(c.data().len(), 100 * 50 * 4);
        assert_eq!(c.pixel(0, 0), Rgba8::new(0, 0, 0, 0));
    }

    #[test]
    fn test_clear() {
        let c = Canvas::with_background(10, 10, &Rgba8::WHITE);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(c.pixel(x, y), Rgba8::WHITE);
            }
        }
    }

    #[test]
    fn test_blend_pixel_opaque() {
        let mut c = Canvas::with_background(10, 10, &Rgba8::BLACK);
        let blue = Rgba8::new_opaque(0, 0, 255);
        c.blend_pixel(3, 3, &blue, 255);
        assert_eq!(c.pixel(3, 3), blue);
        assert_eq!(c.pixel(4, 3), Rgba8::BLACK);
    }

    #[test]
    fn test_blend_pixel_half_cover_on_black() {
        let mut c = Canvas::with_background(10, 10, &Rgba8::BLACK);
        c.blend_pixel(0, 0, &Rgba8::WHITE, 128);
        let p = c.pixel(0, 0);
        assert!((p.r as i32 - 128).abs() <= 2);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_color_alpha_and_cover_combine() {
        let mut c = Canvas::with_background(4, 4, &Rgba8::BLACK);
        let red = Rgba8::new(255, 0, 0, 128);
        c.blend_pixel(1, 1, &red, 128);
        // 0.5 * 0.5 of full red
        let p = c.pixel(1, 1);
        assert!((p.r as i32 - 64).abs() <= 2, "got {}", p.r);
    }

    #[test]
    fn test_blend_hline_clipped() {
        let mut c = Canvas::with_background(10, 4, &Rgba8::BLACK);
        let green = Rgba8::new_opaque(0, 255, 0);
        c.blend_hline(-5, 1, 8, &green, 255);
        for x in 0..3 {
            assert_eq!(c.pixel(x, 1).g, 255);
        }
        assert_eq!(c.pixel(3, 1).g, 0);
        // Entirely outside vertically or horizontally is a no-op.
        c.blend_hline(0, 7, 10, &green, 255);
        c.blend_hline(20, 1, 10, &green, 255);
        assert_eq!(c.pixel(9, 1).g, 0);
    }

    #[test]
    fn test_blend_solid_hspan() {
        let mut c = Canvas::with_background(20, 10, &Rgba8::BLACK);
        let green = Rgba8::new_opaque(0, 255, 0);
        let covers = [255u8, 128, 64, 0, 255];
        c.blend_solid_hspan(5, 3, &green, &covers);
        assert_eq!(c.pixel(5, 3).g, 255);
        assert!(c.pixel(6, 3).g > c.pixel(7, 3).g);
        assert_eq!(c.pixel(8, 3).g, 0);
        assert_eq!(c.pixel(9, 3).g, 255);
    }

    #[test]
    fn test_blend_solid_hspan_clipped_left_and_right() {
        let mut c = Canvas::with_background(4, 2, &Rgba8::BLACK);
        let red = Rgba8::new_opaque(255, 0, 0);
        c.blend_solid_hspan(-2, 0, &red, &[255; 8]);
        for x in 0..4 {
            assert_eq!(c.pixel(x, 0).r, 255);
        }
        assert_eq!(c.pixel(0, 1).r, 0);
    }

    #[test]
    fn test_transparent_canvas_becomes_opaque_where_painted() {
        let mut c = Canvas::new(2, 1);
        c.blend_pixel(0, 0, &Rgba8::new_opaque(255, 0, 0), 255);
        assert_eq!(c.pixel(0, 0).a, 255);
        assert_eq!(c.pixel(1, 0).a, 0);
    }

    #[test]
    fn test_into_image() {
        let mut c = Canvas::with_background(3, 2, &Rgba8::BLACK);
        c.blend_pixel(2, 1, &Rgba8::WHITE, 255);
        let img = c.into_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
