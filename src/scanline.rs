//! Scanline container with per-pixel coverage.
//!
//! Receives the cells and spans emitted by `Rasterizer::sweep_scanline` for
//! one row and stores them as runs of contiguous pixels, each pixel with
//! its own coverage byte. Adjacent additions are merged into one span.

use crate::basics::CoverType;
use crate::rasterizer::Scanline;

/// A horizontal run of pixels within a scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: i32,
    pub len: u32,
    cover_offset: usize,
}

/// Unpacked scanline: coverage stored per pixel.
#[derive(Debug, Default)]
pub struct ScanlineU8 {
    y: i32,
    spans: Vec<Span>,
    covers: Vec<CoverType>,
}

impl ScanlineU8 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spans of the current row, ordered by x.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Coverage values of `span`.
    pub fn covers(&self, span: &Span) -> &[CoverType] {
        &self.covers[span.cover_offset..span.cover_offset + span.len as usize]
    }

    /// Iterate `(x, covers)` pairs for the current row.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[CoverType])> + '_ {
        self.spans.iter().map(move |s| (s.x, self.covers(s)))
    }

    fn push(&mut self, x: i32, len: u32, cover: CoverType) {
        let contiguous = self
            .spans
            .last()
            .map_or(false, |last| last.x + last.len as i32 == x);
        if contiguous {
            if let Some(last) = self.spans.last_mut() {
                last.len += len;
            }
        } else {
            self.spans.push(Span {
                x,
                len,
                cover_offset: self.covers.len(),
            });
        }
        self.covers
            .extend(std::iter::repeat(cover).take(len as usize));
    }
}

impl Scanline for ScanlineU8 {
    fn reset_spans(&mut self) {
        self.spans.clear();
        self.covers.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        self.push(x, 1, cover.min(255) as CoverType);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        if len > 0 {
            self.push(x, len, cover.min(255) as CoverType);
        }
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn num_spans(&self) -> u32 {
        self.spans.len() as u32
    }

    fn y(&self) -> i32 {
        self.y
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let sl = ScanlineU8::new();
        assert_eq!(sl.num_spans(), 0);
        assert_eq!(sl.iter().count(), 0);
    }

    #[test]
    fn test_adjacent_cells_merge() {
        let mut sl = ScanlineU8::new();
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_span(12, 3, 255);
        sl.finalize(7);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.y(), 7);
        let (x, covers) = sl.iter().next().unwrap();
        assert_eq!(x, 10);
        assert_eq!(covers, &[100, 200, 255, 255, 255]);
    }

    #[test]
    fn test_gap_starts_new_span() {
        let mut sl = ScanlineU8::new();
        sl.add_cell(0, 50);
        sl.add_cell(5, 60);
        assert_eq!(sl.num_spans(), 2);
        let spans: Vec<_> = sl.iter().map(|(x, c)| (x, c.to_vec())).collect();
        assert_eq!(spans, vec![(0, vec![50]), (5, vec![60])]);
    }

    #[test]
    fn test_reset_spans() {
        let mut sl = ScanlineU8::new();
        sl.add_span(-4, 2, 255);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        sl.add_cell(3, 9);
        assert_eq!(sl.covers(&sl.spans()[0]), &[9]);
    }

    #[test]
    fn test_zero_length_span_ignored() {
        let mut sl = ScanlineU8::new();
        sl.add_span(0, 0, 255);
        assert_eq!(sl.num_spans(), 0);
    }
}
