//! Dash generation.
//!
//! Splits a continuous center-line polyline into the "on" pieces of a dash
//! pattern. The pattern phase carries across vertices, so a dash that
//! starts near the end of one segment continues along the next.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::basics::{PointD, VERTEX_DIST_EPSILON};
use crate::error::{Error, Result};

const DASHED: [f64; 2] = [3.7, 1.6];
const DOTTED: [f64; 2] = [1.0, 1.65];
const DASH_DOT: [f64; 4] = [6.4, 1.6, 1.0, 1.6];

// ============================================================================
// LineStyleKind
// ============================================================================

/// Named line styles, written the way plotting libraries spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineStyleKind {
    /// `"-"`
    #[default]
    Solid,
    /// `"--"`
    Dashed,
    /// `":"`
    Dotted,
    /// `"-."`
    DashDot,
}

impl LineStyleKind {
    /// Dash pattern for a line of `line_width` pixels; `None` for solid
    /// lines. Lengths are multiples of the line width so thick lines get
    /// proportionally long dashes.
    pub fn pattern(&self, line_width: f64) -> Option<DashPattern> {
        let base: &[f64] = match self {
            LineStyleKind::Solid => return None,
            LineStyleKind::Dashed => &DASHED,
            LineStyleKind::Dotted => &DOTTED,
            LineStyleKind::DashDot => &DASH_DOT,
        };
        let scale = line_width.max(f64::MIN_POSITIVE);
        DashPattern::new(base.iter().map(|d| d * scale).collect(), 0.0).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyleKind::Solid => "-",
            LineStyleKind::Dashed => "--",
            LineStyleKind::Dotted => ":",
            LineStyleKind::DashDot => "-.",
        }
    }
}

impl FromStr for LineStyleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "-" | "solid" => Ok(LineStyleKind::Solid),
            "--" | "dashed" => Ok(LineStyleKind::Dashed),
            ":" | "dotted" => Ok(LineStyleKind::Dotted),
            "-." | "dashdot" => Ok(LineStyleKind::DashDot),
            other => Err(Error::InvalidLineStyle(other.to_string())),
        }
    }
}

impl TryFrom<String> for LineStyleKind {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<LineStyleKind> for String {
    fn from(k: LineStyleKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for LineStyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DashPattern
// ============================================================================

/// Alternating on/off lengths in pixels, starting with "on".
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    dashes: Vec<f64>,
    offset: f64,
}

impl DashPattern {
    /// An odd number of lengths is repeated once to make the pattern even,
    /// so `[2, 1, 1]` behaves like `[2, 1, 1, 2, 1, 1]`.
    pub fn new(mut dashes: Vec<f64>, offset: f64) -> Result<Self> {
        if dashes.is_empty() {
            return Err(Error::InvalidDashPattern("no dash lengths".into()));
        }
        if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(Error::InvalidDashPattern(format!(
                "lengths must be finite and non-negative: {dashes:?}"
            )));
        }
        if dashes.iter().sum::<f64>() <= 0.0 {
            return Err(Error::InvalidDashPattern("total length is zero".into()));
        }
        if dashes.len() % 2 == 1 {
            dashes.extend_from_within(..);
        }
        Ok(Self { dashes, offset })
    }

    pub fn dashes(&self) -> &[f64] {
        &self.dashes
    }

    pub fn period(&self) -> f64 {
        self.dashes.iter().sum()
    }

    /// Index into the pattern and distance already consumed of that entry
    /// after advancing `offset` from the start.
    fn start_state(&self) -> (usize, f64) {
        let mut rest = self.offset.rem_euclid(self.period());
        let mut idx = 0;
        while rest > 0.0 && rest >= self.dashes[idx] {
            rest -= self.dashes[idx];
            idx = (idx + 1) % self.dashes.len();
        }
        (idx, rest)
    }

    /// Split `polyline` into the visible dash pieces.
    pub fn split(&self, polyline: &[PointD]) -> Vec<Vec<PointD>> {
        let mut pieces = Vec::new();
        if polyline.len() < 2 {
            return pieces;
        }

        let (mut idx, mut consumed) = self.start_state();
        let mut current: Vec<PointD> = Vec::new();
        if idx % 2 == 0 {
            current.push(polyline[0]);
        }

        for seg in polyline.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            let seg_len = a.distance(&b);
            if seg_len <= VERTEX_DIST_EPSILON {
                continue;
            }
            let mut pos = 0.0;
            loop {
                let left_in_dash = self.dashes[idx] - consumed;
                if pos + left_in_dash > seg_len {
                    consumed += seg_len - pos;
                    if idx % 2 == 0 {
                        current.push(b);
                    }
                    break;
                }
                pos += left_in_dash;
                let p = a.lerp(&b, pos / seg_len);
                if idx % 2 == 0 {
                    current.push(p);
                    push_piece(&mut pieces, std::mem::take(&mut current));
                } else {
                    current.push(p);
                }
                idx = (idx + 1) % self.dashes.len();
                consumed = 0.0;
            }
        }

        if idx % 2 == 0 {
            push_piece(&mut pieces, current);
        }
        pieces
    }
}

/// Keep `piece` only if it has non-zero length. A gap ending exactly on a
/// vertex leaves a dash that starts and stops at the same point.
fn push_piece(pieces: &mut Vec<Vec<PointD>>, piece: Vec<PointD>) {
    let len: f64 = piece.windows(2).map(|w| w[0].distance(&w[1])).sum();
    if len > VERTEX_DIST_EPSILON {
        pieces.push(piece);
    }
}

// ============================================================================
// Tests
// ============================================================================
