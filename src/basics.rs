//! Foundation types, constants, and small geometry helpers.
//!
//! Everything else in the crate builds on these: rounding that matches the
//! rasterizer's fixed-point conventions, coverage and subpixel constants,
//! and the 2D point / contour types that flow between the stroke, dash and
//! rasterizer stages.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer, half away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a non-negative value to the nearest unsigned integer (half up).
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

// ============================================================================
// Coverage
// ============================================================================

/// Per-pixel anti-aliasing coverage, 255 meaning fully covered.
pub type CoverType = u8;

// ============================================================================
// Subpixel constants
// ============================================================================

/// Number of fractional bits in rasterizer coordinates (24.8 fixed point).
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

/// Convert a device coordinate to 24.8 fixed point.
#[inline]
pub fn poly_coord(v: f64) -> i32 {
    iround(v * POLY_SUBPIXEL_SCALE as f64)
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

/// Convert degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Points smaller than this apart are treated as coincident.
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

// ============================================================================
// Rect
// ============================================================================

/// Rectangle defined by two inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

pub type RectI = Rect<i32>;

// ============================================================================
// Points and contours
// ============================================================================

/// A 2D point in device (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &PointD) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `other` by `k` in `[0, 1]`.
    #[inline]
    pub fn lerp(&self, other: &PointD, k: f64) -> PointD {
        PointD::new(
            self.x + (other.x - self.x) * k,
            self.y + (other.y - self.y) * k,
        )
    }
}

/// A closed polygon outline. The closing edge back to the first point is
/// implicit.
pub type Contour = Vec<PointD>;

/// Twice the signed area of a closed contour (shoelace formula). Positive
/// for counter-clockwise winding in a y-up frame.
pub fn signed_area2(contour: &[PointD]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = contour[contour.len() - 1];
    for p in contour {
        sum += prev.x * p.y - p.x * prev.y;
        prev = *p;
    }
    sum
}

/// Reorder `contour` in place so its signed area is non-negative.
///
/// The rasterizer unions contours under the non-zero rule, which only
/// works if every contour of one layer winds the same way.
pub fn orient_positive(contour: &mut Contour) {
    if signed_area2(contour) < 0.0 {
        contour.reverse();
    }
}

/// Remove consecutive points closer than `VERTEX_DIST_EPSILON`.
pub fn dedup_points(points: &[PointD]) -> Vec<PointD> {
    let mut out: Vec<PointD> = Vec::with_capacity(points.len());
    for p in points {
        match out.last() {
            Some(last) if last.distance(p) <= VERTEX_DIST_EPSILON => {}
            _ => out.push(*p),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
