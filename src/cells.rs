//! Anti-aliased cell accumulation.
//!
//! Converts edges in 24.8 fixed-point coordinates into pixel cells. Each
//! cell keeps two accumulators:
//! - `cover`: net winding contribution (sum of dy crossing the cell)
//! - `area`: twice the signed area of the edge fragments inside the cell,
//!   which yields the partial coverage at the cell's left boundary
//!
//! After `sort_cells()` the cells are ordered by (y, x) and can be read one
//! scanline row at a time by the polygon rasterizer.

use std::ops::Range;

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

/// Edges wider than this are split before walking cells, keeping the
/// intermediate products inside `i64`.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

const SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// A pixel cell with accumulated coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    const EMPTY: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };

    #[inline]
    fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }

    #[inline]
    fn is_blank(&self) -> bool {
        self.cover == 0 && self.area == 0
    }
}

/// Edge-to-cell engine behind `Rasterizer`.
pub struct CellRasterizer {
    cells: Vec<Cell>,
    rows: Vec<Range<usize>>,
    current: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl CellRasterizer {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            rows: Vec::new(),
            current: Cell::EMPTY,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    /// Discard all cells, keeping allocations.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.rows.clear();
        self.current = Cell::EMPTY;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    #[inline]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Cells of scanline `y`, sorted by x. Only valid after `sort_cells()`;
    /// rows outside the bounding box are empty.
    pub fn row(&self, y: i32) -> &[Cell] {
        if !self.sorted || y < self.min_y || y > self.max_y {
            return &[];
        }
        let range = self.rows[(y - self.min_y) as usize].clone();
        &self.cells[range]
    }

    #[inline]
    fn flush_current(&mut self) {
        if !self.current.is_blank() {
            self.cells.push(self.current);
        }
    }

    #[inline]
    fn move_current(&mut self, x: i32, y: i32) {
        if !self.current.is_at(x, y) {
            self.flush_current();
            self.current = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    #[inline]
    fn grow_bounds(&mut self, ex: i32, ey: i32) {
        self.min_x = self.min_x.min(ex);
        self.max_x = self.max_x.max(ex);
        self.min_y = self.min_y.min(ey);
        self.max_y = self.max_y.max(ey);
    }

    /// Walk one edge fragment confined to scanline row `ey`. `x1`/`x2` are
    /// 24.8 fixed-point, `y1`/`y2` the fractional y inside the row.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & MASK;
        let fx2 = x2 & MASK;

        if y1 == y2 {
            self.move_current(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let dy = y2 - y1;
            self.current.cover += dy;
            self.current.area += (fx1 + fx2) * dy;
            return;
        }

        // The fragment crosses several cells in this row: distribute dy
        // across them proportionally to the x distance travelled.
        let (mut p, first, incr, dx) = if x2 < x1 {
            (fx1 as i64 * (y2 - y1) as i64, 0, -1, x1 as i64 - x2 as i64)
        } else {
            (
                (SCALE - fx1) as i64 * (y2 - y1) as i64,
                SCALE,
                1,
                x2 as i64 - x1 as i64,
            )
        };

        let mut delta = p.div_euclid(dx) as i32;
        let mut modulo = p.rem_euclid(dx);

        self.current.cover += delta;
        self.current.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.move_current(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            p = SCALE as i64 * (y2 - y + delta) as i64;
            let lift = p.div_euclid(dx) as i32;
            let rem = p.rem_euclid(dx);
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.current.cover += delta;
                self.current.area += SCALE * delta;
                y += delta;
                ex += incr;
                self.move_current(ex, ey);
            }
        }

        delta = y2 - y;
        self.current.cover += delta;
        self.current.area += (fx2 + SCALE - first) * delta;
    }

    /// Add an edge in 24.8 fixed-point coordinates.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        self.sorted = false;

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & MASK;
        let fy2 = y2 & MASK;

        self.grow_bounds(ex1, ey1);
        self.grow_bounds(ex2, ey2);

        self.move_current(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let (first, incr) = if dy < 0 { (0, -1) } else { (SCALE, 1) };

        // Vertical edge: one cell per row, constant area factor.
        if dx == 0 {
            let two_fx = (x1 - (ex1 << POLY_SUBPIXEL_SHIFT)) << 1;

            let mut delta = first - fy1;
            self.current.cover += delta;
            self.current.area += two_fx * delta;

            ey1 += incr;
            self.move_current(ex1, ey1);

            delta = first + first - SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.current.cover = delta;
                self.current.area = area;
                ey1 += incr;
                self.move_current(ex1, ey1);
            }
            delta = fy2 - SCALE + first;
            self.current.cover += delta;
            self.current.area += two_fx * delta;
            return;
        }

        // General case: split the edge at every row boundary.
        let dy_abs = dy.abs();
        let p = if dy < 0 {
            fy1 as i64 * dx
        } else {
            (SCALE - fy1) as i64 * dx
        };

        let mut delta = p.div_euclid(dy_abs) as i32;
        let mut modulo = p.rem_euclid(dy_abs);

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);

        ey1 += incr;
        self.move_current(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            let p = SCALE as i64 * dx;
            let lift = p.div_euclid(dy_abs) as i32;
            let rem = p.rem_euclid(dy_abs);
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }

                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SCALE - first, x_to, first);
                x_from = x_to;

                ey1 += incr;
                self.move_current(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, SCALE - first, x2, fy2);
    }

    /// Flush the open cell and order all cells by row, then by x.
    pub fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }
        self.flush_current();
        self.current = Cell::EMPTY;
        self.rows.clear();

        if self.cells.is_empty() {
            return;
        }

        self.cells.sort_unstable_by_key(|c| (c.y, c.x));

        let num_rows = (self.max_y - self.min_y + 1) as usize;
        self.rows.resize(num_rows, 0..0);
        let mut start = 0;
        while start < self.cells.len() {
            let y = self.cells[start].y;
            let end = start
                + self.cells[start..]
                    .iter()
                    .take_while(|c| c.y == y)
                    .count();
            self.rows[(y - self.min_y) as usize] = start..end;
            start = end;
        }

        self.sorted = true;
    }
}

impl Default for CellRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
