//! Uniform bucket grid.
//!
//! # Layout
//!
//! A grid of `width × height` square cells of side `cell_size`, stored
//! row-major in one `Vec<Vec<T>>`.  The grid is centred on the bounds it was
//! built for, so it overhangs them by the same margin on both sides:
//!
//! ```text
//! width   = floor(bounds.width / cell_size + 1)
//! min_x   = (bounds.max_x + bounds.min_x - width * cell_size) / 2
//! cell(p) = floor((p - min) / cell_size)
//! ```
//!
//! Payloads are inserted by box: a payload is cloned into every in-grid cell
//! of the inclusive cell range between the box's min and max corners, so a
//! segment that crosses cells is found from all of them.  Once built the grid
//! is only read.

use lr_core::Point2;

use crate::{Bounds, SpatialError, SpatialResult};

pub struct BucketGrid<T> {
    min_x: f64,
    min_y: f64,
    cell_size: f64,
    width: usize,
    height: usize,
    cells: Vec<Vec<T>>,
}

impl<T> BucketGrid<T> {
    /// Build an empty grid covering `bounds`.
    pub fn build(bounds: Bounds, cell_size: f64) -> SpatialResult<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        if !bounds.is_finite() {
            return Err(SpatialError::InvalidBounds);
        }
        let width = (bounds.width() / cell_size + 1.0).floor() as usize;
        let height = (bounds.height() / cell_size + 1.0).floor() as usize;

        let min_x = (bounds.max_x + bounds.min_x - width as f64 * cell_size) / 2.0;
        let min_y = (bounds.max_y + bounds.min_y - height as f64 * cell_size) / 2.0;

        let mut cells = Vec::with_capacity(width * height);
        cells.resize_with(width * height, Vec::new);

        Ok(Self { min_x, min_y, cell_size, width, height, cells })
    }

    /// Cell size giving roughly `cells_per_axis` cells along the longer side
    /// of `bounds`.
    pub fn cell_size_for(bounds: Bounds, cells_per_axis: usize) -> f64 {
        let longest = bounds.width().max(bounds.height());
        if longest > 0.0 && cells_per_axis > 0 {
            longest / cells_per_axis as f64
        } else {
            1.0
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Lower-left corner of cell `(0, 0)`.
    pub fn origin(&self) -> Point2 {
        Point2::new(self.min_x, self.min_y)
    }

    /// Total number of stored payload copies across all cells.
    pub fn entry_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    // ── Cell addressing ───────────────────────────────────────────────────

    /// Cell coordinates of `p`; may lie outside the grid.
    #[inline]
    pub fn cell_of(&self, p: Point2) -> (i64, i64) {
        (
            ((p.x - self.min_x) / self.cell_size).floor() as i64,
            ((p.y - self.min_y) / self.cell_size).floor() as i64,
        )
    }

    #[inline]
    fn slot(&self, x: i64, y: i64) -> Option<usize> {
        let inside = x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height;
        inside.then(|| y as usize * self.width + x as usize)
    }

    /// Contents of cell `(x, y)`; empty outside the grid.
    pub fn cell(&self, x: i64, y: i64) -> &[T] {
        match self.slot(x, y) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// In-grid cell range covered by `bounds`, clamped to the grid.
    fn covered(&self, bounds: &Bounds) -> Option<(i64, i64, i64, i64)> {
        let (x0, y0) = self.cell_of(bounds.min());
        let (x1, y1) = self.cell_of(bounds.max());
        let (x0, y0) = (x0.max(0), y0.max(0));
        let x1 = x1.min(self.width as i64 - 1);
        let y1 = y1.min(self.height as i64 - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Payloads of the cell containing `p`.  Empty when `p` is outside the
    /// grid or the cell holds nothing.
    pub fn query_point(&self, p: Point2) -> &[T] {
        let (x, y) = self.cell_of(p);
        self.cell(x, y)
    }

    /// Every in-grid cell overlapped by `bounds`, row by row.
    pub fn query_cells_covering(&self, bounds: Bounds) -> impl Iterator<Item = &[T]> + '_ {
        let range = self.covered(&bounds);
        range
            .into_iter()
            .flat_map(|(x0, y0, x1, y1)| (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y))))
            .map(move |(x, y)| self.cell(x, y))
    }
}

impl<T: Clone> BucketGrid<T> {
    /// Add `payload` to every cell overlapped by `bounds` (inclusive range).
    /// Returns how many cells received it.
    pub fn insert(&mut self, bounds: Bounds, payload: T) -> usize {
        let Some((x0, y0, x1, y1)) = self.covered(&bounds) else {
            return 0;
        };
        let mut count = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let i = y as usize * self.width + x as usize;
                self.cells[i].push(payload.clone());
                count += 1;
            }
        }
        count
    }
}
