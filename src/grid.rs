use crate::types::ShapeMask;

/// Mutable cell grid for one region, flattened row-major. A cell holds 0
/// when free and the placement tag otherwise. The free-cell count is kept
/// incrementally so the solver's area pruning is O(1).
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    free: usize,
}

impl OccupancyGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
            free: width * height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn free_cells(&self) -> usize {
        self.free
    }

    pub fn is_free(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x] == 0
    }

    /// True iff `variant` placed with its top-left corner at `(x, y)` stays
    /// inside the grid and covers only free cells. Pure query.
    pub fn fits(&self, variant: &ShapeMask, x: usize, y: usize) -> bool {
        if x + variant.width() > self.width || y + variant.height() > self.height {
            return false;
        }
        for vy in 0..variant.height() {
            let row = (y + vy) * self.width + x;
            for vx in 0..variant.width() {
                if variant.get(vx, vy) && self.cells[row + vx] != 0 {
                    return false;
                }
            }
        }
        true
    }

    /// Marks every filled cell of `variant` at `(x, y)` occupied with `tag`.
    /// Caller must have checked `fits` with the same arguments.
    pub fn place(&mut self, variant: &ShapeMask, x: usize, y: usize, tag: u8) {
        debug_assert!(tag != 0);
        for vy in 0..variant.height() {
            let row = (y + vy) * self.width + x;
            for vx in 0..variant.width() {
                if variant.get(vx, vy) {
                    debug_assert_eq!(self.cells[row + vx], 0);
                    self.cells[row + vx] = tag;
                    self.free -= 1;
                }
            }
        }
    }

    /// Reverses a prior `place` with identical `(variant, x, y)`.
    pub fn unplace(&mut self, variant: &ShapeMask, x: usize, y: usize) {
        for vy in 0..variant.height() {
            let row = (y + vy) * self.width + x;
            for vx in 0..variant.width() {
                if variant.get(vx, vy) {
                    debug_assert_ne!(self.cells[row + vx], 0);
                    self.cells[row + vx] = 0;
                    self.free += 1;
                }
            }
        }
    }
}
