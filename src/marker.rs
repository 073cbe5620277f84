//! Scatter markers.
//!
//! Marker size follows scatter conventions: `size` is the marker area in
//! points², so the outer diameter is `sqrt(size)` points.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::basics::{orient_positive, Contour, PointD, PI};
use crate::ellipse::Ellipse;
use crate::error::{Error, Result};

/// Inner radius of a regular five-pointed star relative to its outer radius.
const STAR_INNER_RATIO: f64 = 0.381966;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MarkerShape {
    #[default]
    Star,
    Circle,
}

impl MarkerShape {
    /// Outline centred at `center` (device pixels) with the given outer
    /// diameter in pixels.
    pub fn contour(&self, center: PointD, diameter: f64) -> Contour {
        let r = diameter.max(0.0) / 2.0;
        let mut c = match self {
            MarkerShape::Star => star(center, r, r * STAR_INNER_RATIO, 5),
            MarkerShape::Circle => Ellipse::circle(center, r).contour(),
        };
        orient_positive(&mut c);
        c
    }
}

impl FromStr for MarkerShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "*" | "star" => Ok(MarkerShape::Star),
            "o" | "circle" => Ok(MarkerShape::Circle),
            other => Err(Error::InvalidConfig(format!("unknown marker '{other}'"))),
        }
    }
}

impl TryFrom<String> for MarkerShape {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MarkerShape> for String {
    fn from(m: MarkerShape) -> Self {
        m.to_string()
    }
}

impl fmt::Display for MarkerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerShape::Star => "star",
            MarkerShape::Circle => "circle",
        })
    }
}

/// Outer diameter in pixels of a marker of area `size` points².
pub fn marker_diameter(size: f64, dpi: f64) -> f64 {
    size.max(0.0).sqrt() * dpi / 72.0
}

/// Star with `points` tips, the first pointing straight up on screen.
fn star(center: PointD, outer: f64, inner: f64, points: usize) -> Contour {
    let n = points * 2;
    (0..n)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = PI / 2.0 + i as f64 * PI / points as f64;
            // Device y grows downward.
            PointD::new(center.x + a.cos() * r, center.y - a.sin() * r)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::signed_area2;

    #[test]
    fn test_diameter_from_area() {
        assert!((marker_diameter(100.0, 72.0) - 10.0).abs() < 1e-12);
        assert!((marker_diameter(100.0, 100.0) - 13.888_888_888_888_89).abs() < 1e-9);
        assert_eq!(marker_diameter(-4.0, 72.0), 0.0);
    }

    #[test]
    fn test_star_geometry() {
        let c = MarkerShape::Star.contour(PointD::new(50.0, 50.0), 20.0);
        assert_eq!(c.len(), 10);
        assert!(signed_area2(&c) > 0.0);
        let top = c.iter().fold(f64::MAX, |m, p| m.min(p.y));
        assert!((top - 40.0).abs() < 1e-9);
        for p in &c {
            let d = p.distance(&PointD::new(50.0, 50.0));
            assert!((d - 10.0).abs() < 1e-9 || (d - 3.81966).abs() < 1e-9);
        }
    }

    #[test]
    fn test_circle_marker() {
        let c = MarkerShape::Circle.contour(PointD::new(0.0, 0.0), 10.0);
        assert!(c.len() >= 8);
        assert!(signed_area2(&c) > 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("*".parse::<MarkerShape>().unwrap(), MarkerShape::Star);
        assert_eq!("Circle".parse::<MarkerShape>().unwrap(), MarkerShape::Circle);
        assert!("x".parse::<MarkerShape>().is_err());
    }

    #[test]
    fn test_serde_accepts_symbols_and_names() {
        let m: MarkerShape = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(m, MarkerShape::Star);
        let m: MarkerShape = serde_json::from_str("\"o\"").unwrap();
        assert_eq!(m, MarkerShape::Circle);
        assert_eq!(serde_json::to_string(&MarkerShape::Star).unwrap(), "\"star\"");
        assert!(serde_json::from_str::<MarkerShape>("\"x\"").is_err());
    }
}
