//! Polygon scanline rasterizer with anti-aliasing.
//!
//! Accepts closed contours (move_to / line_to / close), accumulates them in a
//! `CellRasterizer`, and sweeps the result row by row into a `Scanline`.
//! Coverage uses the non-zero winding rule and saturates at full, so several
//! overlapping contours of the same orientation rasterize as their union.

use crate::basics::{poly_coord, PointD, POLY_SUBPIXEL_SHIFT};
use crate::cells::CellRasterizer;

const AA_SHIFT: u32 = 8;
const AA_MASK: i32 = (1 << AA_SHIFT) - 1;

// ============================================================================
// Scanline trait
// ============================================================================

/// Receiver of one row of coverage data from `sweep_scanline`.
pub trait Scanline {
    /// Prepare for a new row, clearing all span data.
    fn reset_spans(&mut self);

    /// Add a single pixel at `x` with coverage `cover`.
    fn add_cell(&mut self, x: i32, cover: u32);

    /// Add `len` pixels starting at `x`, all with coverage `cover`.
    fn add_span(&mut self, x: i32, len: u32, cover: u32);

    /// Mark the row as complete at `y`.
    fn finalize(&mut self, y: i32);

    /// Number of spans in this row.
    fn num_spans(&self) -> u32;

    fn y(&self) -> i32;
}

// ============================================================================
// Rasterizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Anti-aliased polygon rasterizer.
///
/// 1. Add contours with `move_to_d()` / `line_to_d()` or `add_contour()`.
/// 2. Call `rewind_scanlines()`, then `sweep_scanline()` until it returns
///    `false`.
///
/// Adding geometry after a sweep starts a new, empty shape.
pub struct Rasterizer {
    outline: CellRasterizer,
    start_x: i32,
    start_y: i32,
    last_x: i32,
    last_y: i32,
    status: Status,
    scan_y: i32,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            outline: CellRasterizer::new(),
            start_x: 0,
            start_y: 0,
            last_x: 0,
            last_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Discard all polygon data.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = Status::Initial;
    }

    /// Close the current contour back to its starting point.
    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.outline
                .line(self.last_x, self.last_y, self.start_x, self.start_y);
            self.last_x = self.start_x;
            self.last_y = self.start_y;
            self.status = Status::Closed;
        }
    }

    /// Start a new contour at (x, y) in device coordinates. The previous
    /// contour is closed automatically.
    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.outline.sorted() {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.last_x = self.start_x;
        self.last_y = self.start_y;
        self.status = Status::MoveTo;
    }

    /// Add an edge from the current point to (x, y).
    pub fn line_to_d(&mut self, x: f64, y: f64) {
        if self.status == Status::Initial {
            self.move_to_d(x, y);
            return;
        }
        let (nx, ny) = (poly_coord(x), poly_coord(y));
        self.outline.line(self.last_x, self.last_y, nx, ny);
        self.last_x = nx;
        self.last_y = ny;
        self.status = Status::LineTo;
    }

    /// Add a closed contour. Contours with fewer than three points enclose
    /// no area and are ignored.
    pub fn add_contour(&mut self, contour: &[PointD]) {
        if contour.len() < 3 {
            return;
        }
        self.move_to_d(contour[0].x, contour[0].y);
        for p in &contour[1..] {
            self.line_to_d(p.x, p.y);
        }
        self.close_polygon();
    }

    pub fn min_x(&self) -> i32 {
        self.outline.min_x()
    }
    pub fn min_y(&self) -> i32 {
        self.outline.min_y()
    }
    pub fn max_x(&self) -> i32 {
        self.outline.max_x()
    }
    pub fn max_y(&self) -> i32 {
        self.outline.max_y()
    }

    /// Sort cells and prepare for sweeping. Returns `false` if there is
    /// nothing to render.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.outline.sort_cells();
        if self.outline.total_cells() == 0 {
            return false;
        }
        self.scan_y = self.outline.min_y();
        true
    }

    /// Map an accumulated area to 8-bit coverage (non-zero rule).
    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        let cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
        cover.min(AA_MASK) as u32
    }

    /// Emit the next non-empty row of coverage into `sl`. Returns `false`
    /// once every row has been consumed.
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        loop {
            if self.scan_y > self.outline.max_y() {
                return false;
            }
            sl.reset_spans();

            let cells = self.outline.row(self.scan_y);
            let mut cover: i32 = 0;
            let mut i = 0;

            while i < cells.len() {
                let x = cells[i].x;
                let mut area = 0;

                // Merge every cell at the same x.
                while i < cells.len() && cells[i].x == x {
                    area += cells[i].area;
                    cover += cells[i].cover;
                    i += 1;
                }

                let mut span_start = x;
                if area != 0 {
                    let alpha = self.calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                    if alpha != 0 {
                        sl.add_cell(x, alpha);
                    }
                    span_start = x + 1;
                }

                // Interior run up to the next cell carries the full winding.
                if let Some(next) = cells.get(i) {
                    if next.x > span_start {
                        let alpha = self.calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                        if alpha != 0 {
                            sl.add_span(span_start, (next.x - span_start) as u32, alpha);
                        }
                    }
                }
            }

            if sl.num_spans() > 0 {
                break;
            }
            self.scan_y += 1;
        }

        sl.finalize(self.scan_y);
        self.scan_y += 1;
        true
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
