//! Ellipse outlines.
//!
//! Approximates an ellipse by a regular polygon. The number of steps is
//! either given explicitly or derived from the radius so the chord error
//! stays below 1/8 pixel.

use crate::basics::{uround, Contour, PointD, PI};

/// An axis-aligned ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    num: u32,
}

impl Ellipse {
    /// Ellipse with an explicit step count; `0` picks one automatically.
    pub fn new(x: f64, y: f64, rx: f64, ry: f64, num_steps: u32) -> Self {
        let mut e = Self {
            x,
            y,
            rx,
            ry,
            num: num_steps,
        };
        if e.num == 0 {
            e.num = Self::auto_steps(rx, ry);
        }
        e
    }

    /// Circle with an automatically chosen step count.
    pub fn circle(center: PointD, r: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            rx: r,
            ry: r,
            num: Self::auto_steps(r, r),
        }
    }

    fn auto_steps(rx: f64, ry: f64) -> u32 {
        let ra = (rx.abs() + ry.abs()) / 2.0;
        if ra <= 0.0 {
            return 4;
        }
        let da = (ra / (ra + 0.125)).acos() * 2.0;
        uround(2.0 * PI / da).max(4)
    }

    pub fn num_steps(&self) -> u32 {
        self.num
    }

    /// Polygon vertices, counter-clockwise in a y-up frame.
    pub fn contour(&self) -> Contour {
        (0..self.num)
            .map(|i| {
                let angle = i as f64 / self.num as f64 * 2.0 * PI;
                PointD::new(self.x + angle.cos() * self.rx, self.y + angle.sin() * self.ry)
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
