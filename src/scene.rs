//! Layered tree scenes.
//!
//! A `Scene` is an ordered list of line and marker layers drawn back to
//! front in insertion order. Each line layer is projected, dashed and
//! stroked, and all of its pieces are rasterized together so the layer's
//! alpha is applied once per pixel.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::color::Rgba8;
use crate::config::TreeConfig;
use crate::curve::{Curve3, Spiral};
use crate::dash::LineStyleKind;
use crate::marker::{marker_diameter, MarkerShape};
use crate::projection::{Bounds3, Point3, Projector, View};
use crate::renderer::ShapeRenderer;
use crate::stroke::{LineCap, LineJoin, Stroker};

// ============================================================================
// LineStyle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineStyle {
    pub color: Rgba8,
    /// Opacity multiplied into `color`.
    pub alpha: f64,
    pub width_pt: f64,
    pub dash: LineStyleKind,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::solid(Rgba8::WHITE, 1.5)
    }
}

impl LineStyle {
    /// Solid lines get projecting caps, matching plot defaults.
    pub fn solid(color: Rgba8, width_pt: f64) -> Self {
        Self {
            color,
            alpha: 1.0,
            width_pt,
            dash: LineStyleKind::Solid,
            cap: LineCap::Projecting,
            join: LineJoin::Round,
        }
    }

    /// Dashed lines get butt caps on every dash.
    pub fn dashed(color: Rgba8, width_pt: f64, kind: LineStyleKind) -> Self {
        Self {
            dash: kind,
            cap: if kind == LineStyleKind::Solid {
                LineCap::Projecting
            } else {
                LineCap::Butt
            },
            ..Self::solid(color, width_pt)
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn effective_color(&self) -> Rgba8 {
        self.color.with_alpha(self.alpha.clamp(0.0, 1.0))
    }
}

// ============================================================================
// Layers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub curve: Curve3,
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLayer {
    pub position: Point3,
    pub marker: MarkerShape,
    pub color: Rgba8,
    /// Area in points².
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Line(LineLayer),
    Marker(MarkerLayer),
}

impl Layer {
    pub fn bounds(&self) -> Bounds3 {
        match self {
            Layer::Line(l) => l.curve.bounds(),
            Layer::Marker(m) => Bounds3::from_points([&m.position]),
        }
    }
}

// ============================================================================
// Scene
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgba8,
    pub view: View,
    pub dpi: f64,
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn new(background: Rgba8, view: View, dpi: f64) -> Self {
        Self {
            background,
            view,
            dpi,
            layers: Vec::new(),
        }
    }

    pub fn add_line(&mut self, curve: Curve3, style: LineStyle) {
        self.layers.push(Layer::Line(LineLayer { curve, style }));
    }

    pub fn add_marker(&mut self, marker: MarkerLayer) {
        self.layers.push(Layer::Marker(marker));
    }

    /// The static tree: two counter-wound dashed spirals, each followed by
    /// its fading shadows.
    pub fn basic_tree(config: &TreeConfig) -> Scene {
        let mut scene = Scene::new(config.background, config.still.view, config.dpi);
        let strand = Spiral::new(config.still.samples).evaluate().flip_z();
        let mirrored = strand.mirrored();

        for (curve, color) in [
            (&strand, config.primary_color),
            (&mirrored, config.secondary_color),
        ] {
            let style = LineStyle::dashed(color, config.line_width_pt, config.line_style);
            scene.add_line(curve.clone(), style);
            for shadow in &config.still.shadows {
                scene.add_line(curve.scale_x(shadow.scale_x), style.with_alpha(shadow.alpha));
            }
        }
        scene
    }

    /// One animation frame: both strands rotated by `phase`, the star on
    /// top, then the glow passes alternating between the strands.
    pub fn glow_frame(config: &TreeConfig, phase: f64) -> Scene {
        let glow = &config.glow;
        let mut scene = Scene::new(config.background, glow.view, config.dpi);
        let strand = Spiral::new(glow.samples).with_phase(phase).evaluate().flip_z();
        let mirrored = strand.mirrored();

        scene.add_line(
            strand.clone(),
            LineStyle::dashed(config.primary_color, config.line_width_pt, config.line_style),
        );
        scene.add_line(
            mirrored.clone(),
            LineStyle::dashed(config.secondary_color, config.line_width_pt, config.line_style),
        );
        scene.add_marker(MarkerLayer {
            position: glow.star.point(),
            marker: glow.star.shape,
            color: glow.star.color,
            size: glow.star.size,
        });

        for pass in 0..glow.passes {
            let width = glow.pass_width_pt(pass);
            scene.add_line(
                strand.clone(),
                LineStyle::solid(config.primary_color, width).with_alpha(glow.alpha),
            );
            scene.add_line(
                mirrored.clone(),
                LineStyle::solid(config.secondary_color, width).with_alpha(glow.alpha),
            );
        }
        scene
    }

    /// Union of every layer's data bounds.
    pub fn bounds(&self) -> Bounds3 {
        self.layers
            .iter()
            .fold(Bounds3::empty(), |acc, l| acc.union(&l.bounds()))
    }

    /// Projector fitting this scene's own bounds into `width × height`.
    pub fn projector(&self, width: u32, height: u32) -> Projector {
        Projector::new(&self.view, &self.bounds(), width, height)
    }

    #[inline]
    fn points_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    /// Clear `canvas` to the background and draw every layer in order.
    pub fn render(&self, projector: &Projector, canvas: &mut Canvas) {
        canvas.clear(&self.background);
        let mut shapes = ShapeRenderer::new();

        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Line(line) => self.render_line(i, line, projector, canvas, &mut shapes),
                Layer::Marker(m) => {
                    let center = projector.project(&m.position);
                    let diameter = marker_diameter(m.size, self.dpi);
                    let contour = m.marker.contour(center, diameter);
                    shapes.fill(canvas, std::slice::from_ref(&contour), &m.color);
                }
            }
        }
    }

    /// Render into a new canvas sized `width × height`, fitted to the
    /// scene's own bounds.
    pub fn render_image(&self, width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        self.render(&self.projector(width, height), &mut canvas);
        canvas
    }

    fn render_line(
        &self,
        index: usize,
        line: &LineLayer,
        projector: &Projector,
        canvas: &mut Canvas,
        shapes: &mut ShapeRenderer,
    ) {
        if line.curve.len() < 2 {
            warn!(
                "skipping layer {index}: a line needs at least 2 points, got {}",
                line.curve.len()
            );
            return;
        }
        let style = &line.style;
        let color = style.effective_color();
        if style.width_pt <= 0.0 || color.is_transparent() {
            debug!("skipping invisible layer {index}");
            return;
        }

        let width = self.points_to_px(style.width_pt);
        let points = projector.project_all(line.curve.points());
        let pieces = match style.dash.pattern(width) {
            Some(pattern) => pattern.split(&points),
            None => vec![points],
        };
        let stroker = Stroker::new(width)
            .with_cap(style.cap)
            .with_join(style.join);
        let contours: Vec<_> = pieces.iter().flat_map(|p| stroker.stroke(p)).collect();
        shapes.fill(canvas, &contours, &color);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PixelFormat;

    fn small_config() -> TreeConfig {
        TreeConfig {
            width: 120,
            height: 120,
            dpi: 72.0,
            ..TreeConfig::default()
        }
    }

    fn lit_pixels(canvas: &Canvas, bg: Rgba8) -> usize {
        let mut n = 0;
        for y in 0..canvas.height() as i32 {
            for x in 0..canvas.width() as i32 {
                if canvas.pixel(x, y) != bg {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_basic_tree_layers() {
        let scene = Scene::basic_tree(&TreeConfig::default());
        assert_eq!(scene.layers.len(), 6);
        assert_eq!(scene.view, View::new(10.0, 0.2));
        let alphas: Vec<f64> = scene
            .layers
            .iter()
            .map(|l| match l {
                Layer::Line(l) => l.style.alpha,
                Layer::Marker(_) => panic!("unexpected marker"),
            })
            .collect();
        assert_eq!(alphas, vec![1.0, 0.4, 0.2, 1.0, 0.4, 0.2]);
        match (&scene.layers[1], &scene.layers[3]) {
            (Layer::Line(shadow), Layer::Line(cyan)) => {
                assert_eq!(shadow.curve.len(), 100);
                assert_eq!(shadow.style.dash, LineStyleKind::Dashed);
                assert_eq!(cyan.style.color, Rgba8::new_opaque(0, 255, 204));
            }
            _ => panic!("expected line layers"),
        }
    }

    #[test]
    fn test_basic_tree_strands_are_mirrored() {
        let scene = Scene::basic_tree(&TreeConfig::default());
        if let (Layer::Line(red), Layer::Line(cyan)) = (&scene.layers[0], &scene.layers[3]) {
            for (a, b) in red.curve.points().iter().zip(cyan.curve.points()) {
                assert_eq!(a.x, -b.x);
                assert_eq!(a.y, -b.y);
                assert_eq!(a.z, b.z);
                assert!(a.z <= 0.0);
            }
        } else {
            panic!("expected line layers");
        }
    }

    #[test]
    fn test_glow_frame_layer_order() {
        let config = TreeConfig::default();
        let scene = Scene::glow_frame(&config, 0.3);
        assert_eq!(scene.layers.len(), 3 + 2 * 10);
        assert!(matches!(scene.layers[2], Layer::Marker(_)));
        if let Layer::Marker(m) = &scene.layers[2] {
            assert_eq!(m.position, Point3::new(0.0, 0.0, 0.5));
            assert_eq!(m.size, 100.0);
            assert_eq!(m.color, Rgba8::new_opaque(255, 215, 0));
        }
        if let (Layer::Line(first), Layer::Line(second), Layer::Line(last)) =
            (&scene.layers[3], &scene.layers[4], &scene.layers[22])
        {
            assert_eq!(first.style.dash, LineStyleKind::Solid);
            assert_eq!(first.style.alpha, 0.05);
            assert_eq!(first.style.width_pt, 1.0);
            assert_eq!(first.style.color, config.primary_color);
            assert_eq!(second.style.color, config.secondary_color);
            assert!((last.style.width_pt - 10.09).abs() < 1e-12);
        } else {
            panic!("expected glow passes");
        }
    }

    #[test]
    fn test_bounds_cover_star_and_strands() {
        let scene = Scene::glow_frame(&TreeConfig::default(), 0.0);
        let b = scene.bounds();
        assert_eq!(b.max.z, 0.5);
        assert!(b.min.z < -25.0);
    }

    #[test]
    fn test_render_draws_on_background() {
        let config = small_config();
        let scene = Scene::basic_tree(&config);
        let canvas = scene.render_image(config.width, config.height);
        assert_eq!(canvas.pixel(0, 0), Rgba8::BLACK);
        assert!(lit_pixels(&canvas, Rgba8::BLACK) > 100);
    }

    #[test]
    fn test_star_is_gold_at_apex() {
        let mut config = small_config();
        config.glow.passes = 0;
        config.glow.star.size = 400.0;
        let scene = Scene::glow_frame(&config, 0.0);
        let projector = scene.projector(config.width, config.height);
        let mut canvas = Canvas::new(config.width, config.height);
        scene.render(&projector, &mut canvas);
        let c = projector.project(&Point3::new(0.0, 0.0, 0.5));
        assert_eq!(canvas.pixel(c.x as i32, c.y as i32), Rgba8::new_opaque(255, 215, 0));
    }

    #[test]
    fn test_degenerate_layers_are_skipped() {
        let mut scene = Scene::new(Rgba8::BLACK, View::default(), 72.0);
        scene.add_line(Spiral::new(1).evaluate(), LineStyle::solid(Rgba8::WHITE, 3.0));
        scene.add_line(Spiral::new(0).evaluate(), LineStyle::solid(Rgba8::WHITE, 3.0));
        let canvas = scene.render_image(32, 32);
        assert_eq!(lit_pixels(&canvas, Rgba8::BLACK), 0);
    }

    #[test]
    fn test_transparent_layer_draws_nothing() {
        let mut scene = Scene::new(Rgba8::BLACK, View::default(), 72.0);
        scene.add_line(
            Spiral::new(50).evaluate(),
            LineStyle::solid(Rgba8::WHITE, 3.0).with_alpha(0.0),
        );
        let canvas = scene.render_image(32, 32);
        assert_eq!(lit_pixels(&canvas, Rgba8::BLACK), 0);
    }

    #[test]
    fn test_layer_alpha_blends_once() {
        // A tight spiral drawn thick overlaps itself heavily; every covered
        // pixel still receives at most one alpha application.
        let mut scene = Scene::new(Rgba8::BLACK, View::new(90.0, 0.0), 72.0);
        scene.add_line(
            Spiral::new(200).evaluate(),
            LineStyle::solid(Rgba8::WHITE, 8.0).with_alpha(0.5),
        );
        let canvas = scene.render_image(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                assert!(canvas.pixel(x, y).r <= 129, "({x},{y})");
            }
        }
        assert!(lit_pixels(&canvas, Rgba8::BLACK) > 0);
    }

    #[test]
    fn test_dashed_line_covers_less_than_solid() {
        let curve = Curve3::new(vec![Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0)]);
        let render = |style: LineStyle| {
            let mut scene = Scene::new(Rgba8::BLACK, View::new(0.0, 0.0), 72.0);
            scene.add_line(curve.clone(), style);
            lit_pixels(&scene.render_image(100, 100), Rgba8::BLACK)
        };
        let solid = render(LineStyle::solid(Rgba8::WHITE, 2.0));
        let dashed = render(LineStyle::dashed(Rgba8::WHITE, 2.0, LineStyleKind::Dashed));
        assert!(dashed > 0);
        assert!(dashed < solid);
    }
}
