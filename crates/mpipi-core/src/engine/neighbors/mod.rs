pub mod verlet;

use crate::core::topology::exclusions::ExclusionSet;
use crate::core::utils::cell_list::{CellList, all_pairs_within};
use crate::core::utils::geometry::PeriodicBox;
use nalgebra::Point3;
use serde::Deserialize;
use tracing::{debug, warn};

/// Particle count from which [`NeighborStrategy::Auto`] switches to a cell list.
pub const AUTO_CELL_LIST_THRESHOLD: usize = 256;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NeighborStrategy {
    AllPairs,
    CellList,
    #[default]
    Auto,
}

/// Every unexcluded pair `(i, j)`, `i < j`, whose minimum-image separation is at most
/// `range`, in ascending order. The result does not depend on `strategy`.
pub fn enumerate_pairs(
    positions: &[Point3<f64>],
    periodic_box: Option<&PeriodicBox>,
    range: f64,
    exclusions: &ExclusionSet,
    strategy: NeighborStrategy,
) -> Vec<(usize, usize)> {
    let use_cells = match strategy {
        NeighborStrategy::AllPairs => false,
        NeighborStrategy::CellList => true,
        NeighborStrategy::Auto => positions.len() >= AUTO_CELL_LIST_THRESHOLD,
    };

    let candidates = if use_cells {
        match CellList::new(positions, range, periodic_box) {
            Some(cells) => cells.pairs_within(positions, range),
            None => {
                if strategy == NeighborStrategy::CellList {
                    warn!(
                        range,
                        periodic = periodic_box.is_some(),
                        "Cell list needs at least three cells per periodic axis and a bounded extent; using all-pairs search."
                    );
                } else {
                    debug!(range, "Cell list unavailable; using all-pairs search.");
                }
                all_pairs_within(positions, range, periodic_box)
            }
        }
    } else {
        all_pairs_within(positions, range, periodic_box)
    };

    if exclusions.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|&(i, j)| !exclusions.is_excluded(i, j))
        .collect()
}
