//! Spatial hashing for pair searches within a fixed range.
//!
//! Particles are binned into cells whose edge is at least the search range, so every
//! partner of a particle lies in the 3x3x3 block of cells around it.

use super::geometry::{PeriodicBox, displacement};
use itertools::Itertools;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

type CellIndex = (i64, i64, i64);

/// Smallest number of cells per periodic dimension for which the 27 neighbor cells are
/// all distinct.
pub const MIN_PERIODIC_CELLS: i64 = 3;

/// Largest number of cells spanned along one axis. Cell indices stay far from the `i64`
/// limits, so neighbor offsets cannot overflow.
pub const MAX_CELLS_PER_AXIS: i64 = 1 << 40;

#[inline]
fn cells_spanned(extent: f64, edge: f64) -> Option<i64> {
    let cells = (extent / edge).floor();
    (cells.is_finite() && cells < MAX_CELLS_PER_AXIS as f64).then_some(cells as i64)
}

#[derive(Debug, Clone)]
enum Grid {
    Open {
        origin: Point3<f64>,
        edge: f64,
    },
    Periodic {
        pbc: PeriodicBox,
        counts: [i64; 3],
        edges: Vector3<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct CellList {
    grid: Grid,
    cells: HashMap<CellIndex, Vec<usize>>,
}

impl CellList {
    /// Bins `positions` into cells of edge `>= range`.
    ///
    /// Returns `None` when `range` is not positive, when a periodic box is too small to
    /// hold [`MIN_PERIODIC_CELLS`] cells along some axis, or when the positions span more
    /// than [`MAX_CELLS_PER_AXIS`] cells.
    pub fn new(
        positions: &[Point3<f64>],
        range: f64,
        periodic_box: Option<&PeriodicBox>,
    ) -> Option<Self> {
        if !(range.is_finite() && range > 0.0) {
            return None;
        }

        let grid = match periodic_box {
            Some(pbc) => {
                let lengths = pbc.lengths();
                let mut counts = [0; 3];
                for (axis, count) in counts.iter_mut().enumerate() {
                    *count = cells_spanned(lengths[axis], range)?;
                }
                if counts.iter().any(|&n| n < MIN_PERIODIC_CELLS) {
                    return None;
                }
                let edges = Vector3::new(
                    lengths.x / counts[0] as f64,
                    lengths.y / counts[1] as f64,
                    lengths.z / counts[2] as f64,
                );
                Grid::Periodic {
                    pbc: *pbc,
                    counts,
                    edges,
                }
            }
            None => {
                let origin = positions
                    .iter()
                    .fold(Point3::from(Vector3::repeat(f64::MAX)), |min, p| {
                        Point3::from(min.coords.inf(&p.coords))
                    });
                let upper = positions
                    .iter()
                    .fold(Vector3::repeat(f64::MIN), |max, p| max.sup(&p.coords));
                if !positions.is_empty() {
                    for axis in 0..3 {
                        cells_spanned(upper[axis] - origin[axis], range)?;
                    }
                }
                Grid::Open {
                    origin,
                    edge: range,
                }
            }
        };

        let mut cells: HashMap<CellIndex, Vec<usize>> = HashMap::new();
        for (idx, position) in positions.iter().enumerate() {
            cells.entry(grid.cell_of(position)).or_default().push(idx);
        }
        Some(Self { grid, cells })
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All pairs `(i, j)`, `i < j`, separated by at most `range`, sorted ascending.
    ///
    /// `range` must not exceed the range the list was built with.
    pub fn pairs_within(&self, positions: &[Point3<f64>], range: f64) -> Vec<(usize, usize)> {
        let range_sq = range * range;
        let periodic_box = self.grid.periodic_box();
        let mut pairs = Vec::new();

        for (&cell, members) in &self.cells {
            for neighbor_cell in self.grid.neighbor_cells(cell) {
                let Some(neighbors) = self.cells.get(&neighbor_cell) else {
                    continue;
                };
                for &i in members {
                    for &j in neighbors.iter().filter(|&&j| i < j) {
                        let delta = displacement(&positions[i], &positions[j], periodic_box);
                        if delta.norm_squared() <= range_sq {
                            pairs.push((i, j));
                        }
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }
}

impl Grid {
    fn periodic_box(&self) -> Option<&PeriodicBox> {
        match self {
            Grid::Open { .. } => None,
            Grid::Periodic { pbc, .. } => Some(pbc),
        }
    }

    fn cell_of(&self, position: &Point3<f64>) -> CellIndex {
        match self {
            Grid::Open { origin, edge } => (
                ((position.x - origin.x) / edge).floor() as i64,
                ((position.y - origin.y) / edge).floor() as i64,
                ((position.z - origin.z) / edge).floor() as i64,
            ),
            Grid::Periodic { pbc, counts, edges } => {
                let wrapped = pbc.wrap(position);
                let axis = |a: usize| ((wrapped[a] / edges[a]).floor() as i64).clamp(0, counts[a] - 1);
                (axis(0), axis(1), axis(2))
            }
        }
    }

    /// The 3x3x3 block around `cell`, wrapped in periodic dimensions. Entries are distinct.
    fn neighbor_cells(&self, cell: CellIndex) -> Vec<CellIndex> {
        let mut neighbors = Vec::with_capacity(27);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let shifted = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    neighbors.push(match self {
                        Grid::Open { .. } => shifted,
                        Grid::Periodic { counts, .. } => (
                            shifted.0.rem_euclid(counts[0]),
                            shifted.1.rem_euclid(counts[1]),
                            shifted.2.rem_euclid(counts[2]),
                        ),
                    });
                }
            }
        }
        neighbors
    }
}

/// Brute-force reference: every pair `(i, j)`, `i < j`, separated by at most `range`.
pub fn all_pairs_within(
    positions: &[Point3<f64>],
    range: f64,
    periodic_box: Option<&PeriodicBox>,
) -> Vec<(usize, usize)> {
    let range_sq = range * range;
    (0..positions.len())
        .tuple_combinations()
        .filter(|&(i, j)| {
            displacement(&positions[i], &positions[j], periodic_box).norm_squared() <= range_sq
        })
        .collect()
}
