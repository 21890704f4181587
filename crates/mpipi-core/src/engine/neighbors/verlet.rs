use super::{NeighborStrategy, enumerate_pairs};
use crate::core::topology::exclusions::ExclusionSet;
use crate::core::utils::geometry::{PeriodicBox, displacement};
use nalgebra::Point3;

/// Pair list built with a skin around the interaction range, valid until some particle
/// has moved more than half the skin.
#[derive(Debug, Clone)]
pub struct NeighborList {
    pairs: Vec<(usize, usize)>,
    reference: Vec<Point3<f64>>,
    periodic_box: Option<PeriodicBox>,
    range: f64,
    skin: f64,
}

impl NeighborList {
    pub fn build(
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
        range: f64,
        skin: f64,
        exclusions: &ExclusionSet,
        strategy: NeighborStrategy,
    ) -> Self {
        let pairs = enumerate_pairs(positions, periodic_box, range + skin, exclusions, strategy);
        Self {
            pairs,
            reference: positions.to_vec(),
            periodic_box: periodic_box.copied(),
            range,
            skin,
        }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn skin(&self) -> f64 {
        self.skin
    }

    /// Largest displacement a particle may have before the list becomes stale.
    pub fn drift_threshold(&self) -> f64 {
        0.5 * self.skin
    }

    /// Whether the list can no longer be trusted for `positions` in `periodic_box`.
    pub fn needs_rebuild(
        &self,
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
    ) -> bool {
        if positions.len() != self.reference.len() || periodic_box != self.periodic_box.as_ref() {
            return true;
        }
        let threshold_sq = self.drift_threshold().powi(2);
        positions
            .iter()
            .zip(&self.reference)
            .any(|(now, then)| displacement(now, then, periodic_box).norm_squared() > threshold_sq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn lattice() -> Vec<Point3<f64>> {
        (0..4)
            .flat_map(|x| (0..4).map(move |y| Point3::new(x as f64, y as f64, 0.0)))
            .collect()
    }

    #[test]
    fn list_includes_pairs_within_the_skin() {
        let positions = lattice();
        let list = NeighborList::build(
            &positions,
            None,
            1.0,
            0.5,
            &ExclusionSet::new(),
            NeighborStrategy::AllPairs,
        );
        // Diagonal neighbors sit at sqrt(2) nm, inside 1.5 nm.
        assert!(list.pairs().contains(&(0, 5)));
        assert!(!list.pairs().contains(&(0, 2)));
        assert_eq!(list.drift_threshold(), 0.25);
    }

    #[test]
    fn small_moves_keep_the_list() {
        let positions = lattice();
        let list = NeighborList::build(
            &positions,
            None,
            1.0,
            0.5,
            &ExclusionSet::new(),
            NeighborStrategy::AllPairs,
        );
        let mut moved = positions.clone();
        moved[3] += Vector3::new(0.2, 0.0, 0.0);
        assert!(!list.needs_rebuild(&moved, None));
        moved[7] += Vector3::new(0.0, 0.0, 0.26);
        assert!(list.needs_rebuild(&moved, None));
    }

    #[test]
    fn count_and_box_changes_force_a_rebuild() {
        let positions = lattice();
        let pbc = PeriodicBox::cubic(10.0).unwrap();
        let list = NeighborList::build(
            &positions,
            Some(&pbc),
            1.0,
            0.5,
            &ExclusionSet::new(),
            NeighborStrategy::AllPairs,
        );
        assert!(!list.needs_rebuild(&positions, Some(&pbc)));
        assert!(list.needs_rebuild(&positions, None));
        assert!(list.needs_rebuild(&positions, PeriodicBox::cubic(11.0).as_ref()));
        assert!(list.needs_rebuild(&positions[..15], Some(&pbc)));
    }

    #[test]
    fn wrapping_across_the_box_is_not_drift() {
        let positions = vec![Point3::new(0.05, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0)];
        let pbc = PeriodicBox::cubic(10.0).unwrap();
        let list = NeighborList::build(
            &positions,
            Some(&pbc),
            1.0,
            0.5,
            &ExclusionSet::new(),
            NeighborStrategy::AllPairs,
        );
        let wrapped = vec![Point3::new(9.95, 1.0, 1.0), Point3::new(3.0, 3.0, 3.0)];
        assert!(!list.needs_rebuild(&wrapped, Some(&pbc)));
    }
}
