//! Parametric spirals.

use std::f64::consts::PI;

use crate::projection::{Bounds3, Point3};

/// `n` evenly spaced values from `start` to `stop`, both ends included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            v[n - 1] = stop;
            v
        }
    }
}

// ============================================================================
// Spiral
// ============================================================================

/// Conical spiral `(t·cos(t + phase), t·sin(t + phase), t)` for
/// `t ∈ [0, t_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spiral {
    pub samples: usize,
    pub t_max: f64,
    pub phase: f64,
}

impl Spiral {
    /// Four full turns.
    pub const DEFAULT_T_MAX: f64 = 8.0 * PI;

    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            t_max: Self::DEFAULT_T_MAX,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn evaluate(&self) -> Curve3 {
        linspace(0.0, self.t_max, self.samples)
            .into_iter()
            .map(|t| {
                let a = t + self.phase;
                Point3::new(t * a.cos(), t * a.sin(), t)
            })
            .collect()
    }
}

// ============================================================================
// Curve3
// ============================================================================

/// Ordered 3D polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve3 {
    points: Vec<Point3>,
}

impl Curve3 {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn map(&self, f: impl Fn(&Point3) -> Point3) -> Curve3 {
        Curve3::new(self.points.iter().map(f).collect())
    }

    /// Negate z, so a spiral starting at the apex grows downward.
    pub fn flip_z(&self) -> Curve3 {
        self.map(|p| Point3::new(p.x, p.y, -p.z))
    }

    /// Point reflection through the z axis.
    pub fn mirrored(&self) -> Curve3 {
        self.map(|p| Point3::new(-p.x, -p.y, p.z))
    }

    pub fn scale_x(&self, k: f64) -> Curve3 {
        self.map(|p| Point3::new(p.x * k, p.y, p.z))
    }

    pub fn bounds(&self) -> Bounds3 {
        Bounds3::from_points(&self.points)
    }
}

impl FromIterator<Point3> for Curve3 {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Curve3::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let v = linspace(0.0, 8.0 * PI, 200);
        assert_eq!(v.len(), 200);
        assert_eq!(v[199], 8.0 * PI);
    }

    #[test]
    fn test_spiral_points() {
        let c = Spiral::new(100).evaluate();
        assert_eq!(c.len(), 100);
        assert_eq!(c.points()[0], Point3::new(0.0, 0.0, 0.0));
        let last = c.points()[99];
        let t = 8.0 * PI;
        assert!((last.x - t).abs() < 1e-9);
        assert!(last.y.abs() < 1e-9);
        assert_eq!(last.z, t);
        // Radius equals t everywhere.
        for p in c.points() {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - p.z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_phase_rotates_the_spiral() {
        let c = Spiral::new(3).with_phase(PI / 2.0).evaluate();
        let p = c.points()[2];
        let t = 8.0 * PI;
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - t).abs() < 1e-9);
    }

    #[test]
    fn test_transforms() {
        let c = Curve3::new(vec![Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(c.flip_z().points()[0], Point3::new(1.0, 2.0, -3.0));
        assert_eq!(c.mirrored().points()[0], Point3::new(-1.0, -2.0, 3.0));
        assert_eq!(c.scale_x(0.5).points()[0], Point3::new(0.5, 2.0, 3.0));
    }

    #[test]
    fn test_empty_and_single_sample() {
        assert!(Spiral::new(0).evaluate().is_empty());
        assert!(Spiral::new(0).evaluate().bounds().is_empty());
        assert_eq!(Spiral::new(1).evaluate().len(), 1);
    }

    #[test]
    fn test_bounds_of_flipped_tree() {
        let b = Spiral::new(100).evaluate().flip_z().bounds();
        assert_eq!(b.max.z, 0.0);
        assert!((b.min.z + 8.0 * PI).abs() < 1e-9);
    }
}
