//! 3D camera projection.
//!
//! Maps data-space points onto the image plane the way a 3D plot axes does:
//! the data limits are normalized into a box with aspect 4:4:3, the box is
//! rotated by the view's azimuth and elevation, a perspective divide is
//! applied and the result is fitted ("meet") into the pixel viewport.

use serde::{Deserialize, Serialize};

use crate::basics::{deg2rad, PointD};

/// Relative extents of the normalized axes box.
const BOX_ASPECT: [f64; 3] = [4.0, 4.0, 3.0];

// ============================================================================
// Point3 / Bounds3
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    fn dot(&self, o: &Point3) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }
}

/// Axis-aligned data limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Point3,
    pub max: Point3,
}

impl Bounds3 {
    /// Bounds containing nothing; `include` grows them.
    pub const fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.include(p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z)
    }

    pub fn include(&mut self, p: &Point3) {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return;
        }
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut b = *self;
        b.include(&other.min);
        b.include(&other.max);
        b
    }

    /// Limits usable as axes: empty bounds become the unit cube around the
    /// origin and zero-width axes are widened by 0.5 on each side.
    pub fn widened(&self) -> Bounds3 {
        if self.is_empty() {
            return Bounds3 {
                min: Point3::new(-0.5, -0.5, -0.5),
                max: Point3::new(0.5, 0.5, 0.5),
            };
        }
        fn widen(lo: f64, hi: f64) -> (f64, f64) {
            if hi - lo > 0.0 {
                (lo, hi)
            } else {
                (lo - 0.5, hi + 0.5)
            }
        }
        let (x0, x1) = widen(self.min.x, self.max.x);
        let (y0, y1) = widen(self.min.y, self.max.y);
        let (z0, z1) = widen(self.min.z, self.max.z);
        Bounds3 {
            min: Point3::new(x0, y0, z0),
            max: Point3::new(x1, y1, z1),
        }
    }

    pub fn center(&self) -> Point3 {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

// ============================================================================
// View
// ============================================================================

/// Camera orientation in degrees, plus the eye distance in normalized box
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct View {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub distance: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            elevation_deg: 10.0,
            azimuth_deg: -60.0,
            distance: 10.0,
        }
    }
}

impl View {
    pub fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            elevation_deg,
            azimuth_deg,
            ..Self::default()
        }
    }
}

// ============================================================================
// Projector
// ============================================================================

/// Projects data points for one view, data box and viewport.
#[derive(Debug, Clone)]
pub struct Projector {
    bounds: Bounds3,
    center: Point3,
    // Data units to normalized box units, per axis.
    norm: Point3,
    right: Point3,
    up: Point3,
    eye: Point3,
    distance: f64,
    // Viewport fit.
    dev_cx: f64,
    dev_cy: f64,
    scale: f64,
    width: u32,
    height: u32,
}

impl Projector {
    /// Default margin is 6% of the shorter viewport side.
    pub fn new(view: &View, bounds: &Bounds3, width: u32, height: u32) -> Self {
        let margin = width.min(height) as f64 * 0.06;
        Self::with_margin(view, bounds, width, height, margin)
    }

    pub fn with_margin(view: &View, bounds: &Bounds3, width: u32, height: u32, margin: f64) -> Self {
        let bounds = bounds.widened();
        let max_aspect = BOX_ASPECT.iter().cloned().fold(f64::MIN, f64::max);
        let norm = Point3::new(
            BOX_ASPECT[0] / max_aspect / (bounds.max.x - bounds.min.x),
            BOX_ASPECT[1] / max_aspect / (bounds.max.y - bounds.min.y),
            BOX_ASPECT[2] / max_aspect / (bounds.max.z - bounds.min.z),
        );

        let (el, az) = (deg2rad(view.elevation_deg), deg2rad(view.azimuth_deg));
        let eye = Point3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin());
        let right = Point3::new(-az.sin(), az.cos(), 0.0);
        let up = Point3::new(-el.sin() * az.cos(), -el.sin() * az.sin(), el.cos());

        let mut p = Self {
            bounds,
            center: bounds.center(),
            norm,
            right,
            up,
            eye,
            distance: view.distance.max(1.0),
            dev_cx: width as f64 / 2.0,
            dev_cy: height as f64 / 2.0,
            scale: 1.0,
            width,
            height,
        };

        // Fit the projected box corners into the viewport.
        let mut extent: f64 = 0.0;
        for c in bounds.corners() {
            let (u, v) = p.project_plane(&c);
            extent = extent.max(u.abs()).max(v.abs());
        }
        let avail = ((width.min(height) as f64) / 2.0 - margin).max(1.0);
        p.scale = if extent > 0.0 { avail / extent } else { 1.0 };
        p
    }

    /// Limits actually used, after widening.
    pub fn bounds(&self) -> &Bounds3 {
        &self.bounds
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn normalize(&self, p: &Point3) -> Point3 {
        Point3::new(
            (p.x - self.center.x) * self.norm.x,
            (p.y - self.center.y) * self.norm.y,
            (p.z - self.center.z) * self.norm.z,
        )
    }

    /// Signed distance toward the camera in normalized units.
    pub fn depth(&self, p: &Point3) -> f64 {
        self.normalize(p).dot(&self.eye)
    }

    // Image-plane coordinates before the viewport fit (y up).
    fn project_plane(&self, p: &Point3) -> (f64, f64) {
        let n = self.normalize(p);
        let depth = n.dot(&self.eye);
        let s = self.distance / (self.distance - depth);
        (n.dot(&self.right) * s, n.dot(&self.up) * s)
    }

    /// Device coordinates in pixels, y pointing down.
    pub fn project(&self, p: &Point3) -> PointD {
        let (u, v) = self.project_plane(p);
        PointD::new(self.dev_cx + u * self.scale, self.dev_cy - v * self.scale)
    }

    pub fn project_all(&self, points: &[Point3]) -> Vec<PointD> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> Bounds3 {
        Bounds3 {
            min: Point3::new(-1.0, -1.0, -1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn test_default_view() {
        let v = View::default();
        assert_eq!(v.elevation_deg, 10.0);
        assert_eq!(v.azimuth_deg, -60.0);
        assert_eq!(v.distance, 10.0);
        assert_eq!(View::new(10.0, 0.2).azimuth_deg, 0.2);
    }

    #[test]
    fn test_bounds_include_and_union() {
        let b = Bounds3::from_points(&[Point3::new(1.0, 2.0, 3.0), Point3::new(-1.0, 5.0, 0.0)]);
        assert_eq!(b.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(b.max, Point3::new(1.0, 5.0, 3.0));
        let u = b.union(&Bounds3::empty());
        assert_eq!(u, b);
        assert!(Bounds3::empty().is_empty());
        assert!(!b.is_empty());
    }

    #[test]
    fn test_non_finite_points_are_ignored() {
        let b = Bounds3::from_points(&[Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]);
        assert_eq!(b.min, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_degenerate_axes_are_widened() {
        let b = Bounds3::from_points(&[Point3::new(0.0, 0.0, 2.0)]).widened();
        assert_eq!(b.min, Point3::new(-0.5, -0.5, 1.5));
        assert_eq!(b.max, Point3::new(0.5, 0.5, 2.5));
        let e = Bounds3::empty().widened();
        assert_eq!(e.max, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_center_projects_to_viewport_center() {
        let p = Projector::new(&View::default(), &unit_bounds(), 200, 100);
        let c = p.project(&Point3::new(0.0, 0.0, 0.0));
        assert!((c.x - 100.0).abs() < 1e-9);
        assert!((c.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_higher_z_is_higher_on_screen() {
        let p = Projector::new(&View::new(10.0, 0.2), &unit_bounds(), 100, 100);
        let top = p.project(&Point3::new(0.0, 0.0, 1.0));
        let bottom = p.project(&Point3::new(0.0, 0.0, -1.0));
        assert!(top.y < bottom.y);
    }

    #[test]
    fn test_azimuth_zero_puts_y_to_the_right() {
        let p = Projector::new(&View::new(0.0, 0.0), &unit_bounds(), 100, 100);
        let right = p.project(&Point3::new(0.0, 1.0, 0.0));
        let left = p.project(&Point3::new(0.0, -1.0, 0.0));
        assert!(right.x > 50.0 && left.x < 50.0);
        // Looking along -x, the x axis collapses onto the center.
        let front = p.project(&Point3::new(1.0, 0.0, 0.0));
        assert!((front.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_perspective_enlarges_near_points() {
        let p = Projector::new(&View::new(0.0, 0.0), &unit_bounds(), 100, 100);
        assert!(p.depth(&Point3::new(1.0, 0.0, 0.0)) > 0.0);
        let near = p.project(&Point3::new(1.0, 1.0, 0.0));
        let far = p.project(&Point3::new(-1.0, 1.0, 0.0));
        assert!(near.x - 50.0 > far.x - 50.0);
    }

    #[test]
    fn test_box_fits_inside_margin() {
        for azim in [-60.0, 0.2, 45.0, 130.0] {
            let b = unit_bounds();
            let p = Projector::with_margin(&View::new(10.0, azim), &b, 300, 200, 10.0);
            for c in b.corners() {
                let d = p.project(&c);
                assert!(d.x >= 10.0 - 1e-9 && d.x <= 290.0 + 1e-9, "{d:?}");
                assert!(d.y >= 10.0 - 1e-9 && d.y <= 190.0 + 1e-9, "{d:?}");
            }
        }
    }

    #[test]
    fn test_box_aspect_shrinks_z() {
        // Equal data ranges, but z gets 3/4 of the on-screen extent.
        let p = Projector::new(&View::new(0.0, 0.0), &unit_bounds(), 100, 100);
        let zspan = p.project(&Point3::new(0.0, 0.0, -1.0)).y - p.project(&Point3::new(0.0, 0.0, 1.0)).y;
        let yspan = p.project(&Point3::new(0.0, 1.0, 0.0)).x - p.project(&Point3::new(0.0, -1.0, 0.0)).x;
        assert!((zspan / yspan - 0.75).abs() < 1e-9);
    }
}
