//! Polyline stroking.
//!
//! Turns a center-line polyline into a set of contours whose non-zero union
//! is the stroked outline: one quad per segment, a join fill at every
//! interior vertex and a cap at each end. Every contour is oriented the
//! same way so the pieces reinforce instead of cancelling when rasterized
//! together.

use serde::{Deserialize, Serialize};

use crate::basics::{dedup_points, orient_positive, Contour, PointD};
use crate::ellipse::Ellipse;

/// Line cap style at the two ends of an open polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Ends exactly at the end point.
    Butt,
    /// Half-disc around the end point.
    Round,
    /// Square extending half a line width past the end point.
    Projecting,
}

/// Join style at interior vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Round,
    Bevel,
    Miter,
}

/// Stroke geometry generator.
#[derive(Debug, Clone)]
pub struct Stroker {
    width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
}

impl Stroker {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Round,
            miter_limit: 4.0,
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn half_width(&self) -> f64 {
        self.width.abs() * 0.5
    }

    /// Stroke an open polyline.
    pub fn stroke(&self, polyline: &[PointD]) -> Vec<Contour> {
        let hw = self.half_width();
        if hw <= 0.0 {
            return Vec::new();
        }
        let pts = dedup_points(polyline);
        let mut out = Vec::with_capacity(pts.len() * 2);

        match pts.len() {
            0 => {}
            1 => self.dot(pts[0], &mut out),
            n => {
                for i in 0..n - 1 {
                    let (mut a, mut b) = (pts[i], pts[i + 1]);
                    if self.line_cap == LineCap::Projecting {
                        if i == 0 {
                            a = extend(b, a, hw);
                        }
                        if i == n - 2 {
                            b = extend(a, b, hw);
                        }
                    }
                    out.push(segment_quad(a, b, hw));
                }
                for i in 1..n - 1 {
                    if let Some(join) = self.join(pts[i - 1], pts[i], pts[i + 1]) {
                        out.push(join);
                    }
                }
                if self.line_cap == LineCap::Round {
                    out.push(Ellipse::circle(pts[0], hw).contour());
                    out.push(Ellipse::circle(pts[n - 1], hw).contour());
                }
            }
        }

        for c in &mut out {
            orient_positive(c);
        }
        out
    }

    /// A lone point only shows up with caps that extend past it.
    fn dot(&self, p: PointD, out: &mut Vec<Contour>) {
        let hw = self.half_width();
        match self.line_cap {
            LineCap::Butt => {}
            LineCap::Round => out.push(Ellipse::circle(p, hw).contour()),
            LineCap::Projecting => out.push(vec![
                PointD::new(p.x - hw, p.y - hw),
                PointD::new(p.x + hw, p.y - hw),
                PointD::new(p.x + hw, p.y + hw),
                PointD::new(p.x - hw, p.y + hw),
            ]),
        }
    }

    /// Fill for the wedge on the outer side of the corner at `v1`.
    fn join(&self, v0: PointD, v1: PointD, v2: PointD) -> Option<Contour> {
        let hw = self.half_width();
        if self.line_join == LineJoin::Round {
            return Some(Ellipse::circle(v1, hw).contour());
        }

        let turn = cross(v0, v1, v2);
        if turn.abs() < 1e-12 {
            // Collinear: the segment quads already meet flush.
            return None;
        }
        // The outer side is opposite the turn direction.
        let side = if turn > 0.0 { -1.0 } else { 1.0 };
        let n1 = normal(v0, v1);
        let n2 = normal(v1, v2);
        let p1 = PointD::new(v1.x + n1.x * hw * side, v1.y + n1.y * hw * side);
        let p2 = PointD::new(v1.x + n2.x * hw * side, v1.y + n2.y * hw * side);

        if self.line_join == LineJoin::Miter {
            let mx = n1.x + n2.x;
            let my = n1.y + n2.y;
            let mlen2 = mx * mx + my * my;
            if mlen2 > 1e-12 {
                // Distance from the vertex to the miter tip is hw / cos(θ/2).
                let k = 2.0 * hw * side / mlen2;
                let tip = PointD::new(v1.x + mx * k, v1.y + my * k);
                if v1.distance(&tip) <= self.miter_limit * hw {
                    return Some(vec![v1, p1, tip, p2]);
                }
            }
        }
        Some(vec![v1, p1, p2])
    }
}

/// Unit normal (left-hand in a y-up frame) of the segment a→b.
fn normal(a: PointD, b: PointD) -> PointD {
    let len = a.distance(&b);
    PointD::new(-(b.y - a.y) / len, (b.x - a.x) / len)
}

fn cross(a: PointD, b: PointD, c: PointD) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

/// Move `to` further away from `from` by `d`.
fn extend(from: PointD, to: PointD, d: f64) -> PointD {
    let len = from.distance(&to);
    PointD::new(to.x + (to.x - from.x) / len * d, to.y + (to.y - from.y) / len * d)
}

fn segment_quad(a: PointD, b: PointD, hw: f64) -> Contour {
    let n = normal(a, b);
    let (dx, dy) = (n.x * hw, n.y * hw);
    vec![
        PointD::new(a.x + dx, a.y + dy),
        PointD::new(b.x + dx, b.y + dy),
        PointD::new(b.x - dx, b.y - dy),
        PointD::new(a.x - dx, a.y - dy),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::signed_area2;
    use crate::canvas::{Canvas, PixelFormat};
    use crate::color::Rgba8;
    use crate::renderer::ShapeRenderer;

    fn pts(v: &[(f64, f64)]) -> Vec<PointD> {
        v.iter().map(|&(x, y)| PointD::new(x, y)).collect()
    }

    fn render(contours: &[Contour], w: u32, h: u32) -> Canvas {
        let mut canvas = Canvas::with_background(w, h, &Rgba8::BLACK);
        ShapeRenderer::new().fill(&mut canvas, contours, &Rgba8::WHITE);
        canvas
    }

    #[test]
    fn test_empty_and_zero_width() {
        assert!(Stroker::new(2.0).stroke(&[]).is_empty());
        let line = pts(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(Stroker::new(0.0).stroke(&line).is_empty());
    }

    #[test]
    fn test_single_point_depends_on_cap() {
        let p = pts(&[(5.0, 5.0)]);
        assert!(Stroker::new(4.0).stroke(&p).is_empty());
        assert_eq!(Stroker::new(4.0).with_cap(LineCap::Round).stroke(&p).len(), 1);
        let sq = Stroker::new(4.0).with_cap(LineCap::Projecting).stroke(&p);
        assert!((signed_area2(&sq[0]) / 2.0 - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_points_collapse() {
        let line = pts(&[(0.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.0, 0.0)]);
        let contours = Stroker::new(2.0).with_join(LineJoin::Bevel).stroke(&line);
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn test_butt_segment_geometry() {
        let line = pts(&[(2.0, 5.0), (12.0, 5.0)]);
        let contours = Stroker::new(4.0).stroke(&line);
        assert_eq!(contours.len(), 1);
        assert!((signed_area2(&contours[0]) / 2.0 - 40.0).abs() < 1e-9);

        let canvas = render(&contours, 16, 10);
        assert_eq!(canvas.pixel(2, 3).r, 255);
        assert_eq!(canvas.pixel(11, 6).r, 255);
        assert_eq!(canvas.pixel(1, 5).r, 0);
        assert_eq!(canvas.pixel(12, 5).r, 0);
        assert_eq!(canvas.pixel(6, 2).r, 0);
    }

    #[test]
    fn test_projecting_cap_extends_ends() {
        let line = pts(&[(4.0, 5.0), (10.0, 5.0)]);
        let contours = Stroker::new(4.0).with_cap(LineCap::Projecting).stroke(&line);
        let canvas = render(&contours, 16, 10);
        assert_eq!(canvas.pixel(2, 5).r, 255);
        assert_eq!(canvas.pixel(11, 5).r, 255);
        assert_eq!(canvas.pixel(1, 5).r, 0);
        assert_eq!(canvas.pixel(12, 5).r, 0);
    }

    #[test]
    fn test_all_contours_share_orientation() {
        let zigzag = pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0)]);
        for join in [LineJoin::Round, LineJoin::Bevel, LineJoin::Miter] {
            let contours = Stroker::new(3.0)
                .with_join(join)
                .with_cap(LineCap::Round)
                .stroke(&zigzag);
            assert!(contours.iter().all(|c| signed_area2(c) >= 0.0), "{join:?}");
        }
    }

    #[test]
    fn test_round_join_fills_corner() {
        let corner = pts(&[(5.0, 5.0), (25.0, 5.0), (25.0, 25.0)]);
        let butt_only = Stroker::new(6.0).with_join(LineJoin::Bevel).stroke(&corner);
        let round = Stroker::new(6.0).with_join(LineJoin::Round).stroke(&corner);
        let miter = Stroker::new(6.0).with_join(LineJoin::Miter).stroke(&corner);
        // The outer corner pixel (just inside 28, 2) is only covered by a miter.
        assert_eq!(render(&miter, 32, 32).pixel(27, 2).r, 255);
        assert!(render(&round, 32, 32).pixel(27, 2).r < 255);
        assert!(render(&butt_only, 32, 32).pixel(27, 2).r < 255);
        // Inside the corner every join style is solid.
        assert_eq!(render(&butt_only, 32, 32).pixel(25, 5).r, 255);
    }

    #[test]
    fn test_miter_limit_falls_back_to_bevel() {
        let spike = pts(&[(0.0, 0.0), (50.0, 1.0), (0.0, 2.0)]);
        let contours = Stroker::new(2.0)
            .with_join(LineJoin::Miter)
            .with_miter_limit(4.0)
            .stroke(&spike);
        let join = &contours[2];
        assert_eq!(join.len(), 3);
        for p in join {
            assert!(p.x < 52.0);
        }
    }

    #[test]
    fn test_self_overlap_blends_once() {
        let cross_path = pts(&[(2.0, 10.0), (18.0, 10.0), (10.0, 2.0), (10.0, 18.0)]);
        let contours = Stroker::new(3.0).stroke(&cross_path);
        let mut canvas = Canvas::with_background(20, 20, &Rgba8::BLACK);
        let half = Rgba8::new(255, 255, 255, 128);
        ShapeRenderer::new().fill(&mut canvas, &contours, &half);
        assert_eq!(canvas.pixel(10, 10), canvas.pixel(4, 10));
    }
}
