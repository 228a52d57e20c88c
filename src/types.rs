use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A shape's filled/empty cells, stored row-major with an explicit width.
/// Two masks with identical dimensions and cell content are the same
/// variant, so equality and hashing go by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeMask {
    width: usize,
    cells: Vec<bool>,
}

impl ShapeMask {
    pub fn new(width: usize, cells: Vec<bool>) -> Self {
        debug_assert!(width > 0);
        debug_assert!(cells.len() % width == 0);
        Self { width, cells }
    }

    /// Builds a mask from `#`/`.` rows. All rows must have the same length.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, String> {
        if rows.is_empty() {
            return Err("shape has no rows".to_string());
        }
        let width = rows[0].as_ref().len();
        if width == 0 {
            return Err("shape has an empty row".to_string());
        }
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(format!(
                    "shape rows have unequal lengths ({} vs {})",
                    row.len(),
                    width
                ));
            }
            for ch in row.chars() {
                match ch {
                    '#' => cells.push(true),
                    '.' => cells.push(false),
                    _ => return Err(format!("invalid shape character '{}'", ch)),
                }
            }
        }
        Ok(Self { width, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len() / self.width
    }

    /// Number of filled cells.
    pub fn area(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Rotated 90 degrees clockwise. Four applications return the original
    /// exactly, so repeated rotation stays inside the dihedral group.
    pub fn rotated(&self) -> Self {
        let (w, h) = (self.width, self.height());
        let mut cells = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                // (x, y) -> (h - 1 - y, x) in the h-wide result
                cells[x * h + (h - 1 - y)] = self.get(x, y);
            }
        }
        Self { width: h, cells }
    }

    /// Mirrored left-to-right.
    pub fn flipped_horizontal(&self) -> Self {
        let (w, h) = (self.width, self.height());
        let mut cells = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                cells[y * w + (w - 1 - x)] = self.get(x, y);
            }
        }
        Self { width: w, cells }
    }

    /// Mirrored top-to-bottom.
    pub fn flipped_vertical(&self) -> Self {
        let (w, h) = (self.width, self.height());
        let mut cells = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                cells[(h - 1 - y) * w + x] = self.get(x, y);
            }
        }
        Self { width: w, cells }
    }
}

impl std::fmt::Display for ShapeMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width {
                write!(f, "{}", if self.get(x, y) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Shape id -> base mask. Populated once by the ingestion boundary,
/// read-only afterwards. Ids need not be contiguous.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: HashMap<usize, ShapeMask>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize, mask: ShapeMask) {
        self.shapes.insert(id, mask);
    }

    pub fn get(&self, id: usize) -> Option<&ShapeMask> {
        self.shapes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// One required shape within a region: `qty` copies of shape `shape`.
/// A quantity of zero means "not required", not an error.
#[derive(Debug, Clone, Copy)]
pub struct Demand {
    pub shape: usize,
    pub qty: u64,
}

/// A rectangular target area and the multiset of shapes to pack into it.
/// Dimensions are kept signed as parsed; non-positive values make the
/// region unsolvable rather than being an ingestion error.
#[derive(Debug, Clone)]
pub struct RegionSpec {
    pub width: i64,
    pub height: i64,
    pub demands: Vec<Demand>,
}

/// Outcome of evaluating one region. `Unknown` means the node budget ran
/// out before the search proved either answer; it is never counted as
/// solvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Solvable,
    Unsolvable,
    Unknown,
}
