//! Uniform-grid spatial index for neighbor queries.
//!
//! Links are drawn between every pair closer than a threshold. A full
//! pairwise pass is O(n²), which is fine for the hundred-odd particles of the
//! dashboard effects but not beyond. Larger fields bucket particles into
//! square cells the size of the query radius, so only particles in the same
//! or an adjacent cell need a distance check.
//!
//! Buckets are built with a counting sort (count, prefix sum, scatter), so a
//! rebuild is two passes over the particles and allocation-free once warm.

use glam::Vec2;

/// Largest grid extent per axis. Sparse, far-flung fields grow the cell
/// size instead of the cell count.
const MAX_CELLS_PER_AXIS: usize = 512;

/// Forward half of the 3x3 neighborhood. Together with "later in the same
/// cell" this visits every unordered pair exactly once.
const FORWARD: [(isize, isize); 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

/// Bucketed particle indices.
#[derive(Debug, Default, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    origin: Vec2,
    cols: usize,
    rows: usize,
    /// `cell_start[c]..cell_start[c + 1]` indexes `entries` for cell `c`.
    cell_start: Vec<u32>,
    entries: Vec<u32>,
    cell_of: Vec<u32>,
    /// Scatter write heads, kept between rebuilds.
    cursor: Vec<u32>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Bucket `positions` into cells at least `radius` wide.
    ///
    /// Non-finite positions are left out of every bucket.
    pub fn rebuild(&mut self, positions: &[Vec2], radius: f32) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in positions.iter().filter(|p| p.is_finite()) {
            min = min.min(*p);
            max = max.max(*p);
        }
        if !min.is_finite() {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }

        let extent = (max - min).max(Vec2::splat(f32::EPSILON));
        let mut cell_size = radius.max(f32::EPSILON);
        let longest = extent.x.max(extent.y);
        if longest / cell_size >= MAX_CELLS_PER_AXIS as f32 {
            cell_size = longest / (MAX_CELLS_PER_AXIS as f32 - 1.0);
        }

        self.cell_size = cell_size;
        self.origin = min;
        self.cols = (extent.x / cell_size) as usize + 1;
        self.rows = (extent.y / cell_size) as usize + 1;

        let cell_count = self.cols * self.rows;
        self.cell_start.clear();
        self.cell_start.resize(cell_count + 1, 0);
        self.cell_of.clear();
        self.cell_of.reserve(positions.len());

        // Count
        for p in positions {
            let cell = self.cell_index(*p);
            self.cell_of.push(cell);
            if (cell as usize) < cell_count {
                self.cell_start[cell as usize + 1] += 1;
            }
        }

        // Prefix sum
        for c in 0..cell_count {
            self.cell_start[c + 1] += self.cell_start[c];
        }

        // Scatter
        self.entries.clear();
        self.entries.resize(self.cell_start[cell_count] as usize, 0);
        self.cursor.clear();
        self.cursor.extend_from_slice(&self.cell_start[..cell_count]);
        for (i, &cell) in self.cell_of.iter().enumerate() {
            if (cell as usize) < cell_count {
                let slot = &mut self.cursor[cell as usize];
                self.entries[*slot as usize] = i as u32;
                *slot += 1;
            }
        }
    }

    /// Indices bucketed in cell `(col, row)`.
    pub fn cell(&self, col: usize, row: usize) -> &[u32] {
        if col >= self.cols || row >= self.rows {
            return &[];
        }
        let c = row * self.cols + col;
        let start = self.cell_start[c] as usize;
        let end = self.cell_start[c + 1] as usize;
        &self.entries[start..end]
    }

    /// Call `f(i, j, distance)` once for every unordered pair with
    /// `distance < radius`, `i < j`.
    ///
    /// `positions` must be the slice the grid was last rebuilt from and
    /// `radius` must not exceed the rebuild radius.
    pub fn for_each_pair_within<F>(&self, positions: &[Vec2], radius: f32, mut f: F)
    where
        F: FnMut(usize, usize, f32),
    {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let here = self.cell(col, row);
                for (k, &a) in here.iter().enumerate() {
                    for &b in &here[k + 1..] {
                        visit(positions, a, b, radius, &mut f);
                    }
                    for (dc, dr) in FORWARD {
                        let (Some(nc), Some(nr)) =
                            (col.checked_add_signed(dc), row.checked_add_signed(dr))
                        else {
                            continue;
                        };
                        for &b in self.cell(nc, nr) {
                            visit(positions, a, b, radius, &mut f);
                        }
                    }
                }
            }
        }
    }

    fn cell_index(&self, p: Vec2) -> u32 {
        if !p.is_finite() {
            return u32::MAX;
        }
        let rel = ((p - self.origin) / self.cell_size).max(Vec2::ZERO);
        let col = (rel.x as usize).min(self.cols - 1);
        let row = (rel.y as usize).min(self.rows - 1);
        (row * self.cols + col) as u32
    }
}

#[inline]
fn visit<F: FnMut(usize, usize, f32)>(positions: &[Vec2], a: u32, b: u32, radius: f32, f: &mut F) {
    let (i, j) = if a < b { (a as usize, b as usize) } else { (b as usize, a as usize) };
    let d = positions[i].distance(positions[j]);
    if d < radius {
        f(i, j, d);
    }
}
