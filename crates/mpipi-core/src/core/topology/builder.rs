use super::TopologyError;
use super::bonds::{
    BOND_FORCE_CONSTANT, ENM_CUTOFF, HarmonicBond, PROTEIN_BOND_LENGTH, RNA_BOND_LENGTH,
};
use super::exclusions::ExclusionSet;
use crate::core::models::particle::Particle;
use crate::core::models::residue::ResidueType;
use crate::core::utils::cell_list::{CellList, all_pairs_within};
use nalgebra::Point3;
use std::ops::Range;

/// Particles with their bonded connectivity and nonbonded exclusions.
#[derive(Debug, Clone, Default)]
pub struct ParticleTopology {
    particles: Vec<Particle>,
    bonds: Vec<HarmonicBond>,
    exclusions: ExclusionSet,
}

impl ParticleTopology {
    pub fn new(
        particles: Vec<Particle>,
        bonds: Vec<HarmonicBond>,
        exclusions: ExclusionSet,
    ) -> Result<Self, TopologyError> {
        let count = particles.len();
        let out_of_range = bonds
            .iter()
            .map(|bond| bond.j)
            .chain(exclusions.max_index())
            .find(|&index| index >= count);
        if let Some(index) = out_of_range {
            return Err(TopologyError::IndexOutOfRange { index, count });
        }
        Ok(Self {
            particles,
            bonds,
            exclusions,
        })
    }

    /// Unbonded, disordered particles of the given types.
    pub fn from_residue_types<I>(types: I) -> Self
    where
        I: IntoIterator<Item = ResidueType>,
    {
        Self {
            particles: types.into_iter().map(Particle::new).collect(),
            bonds: Vec::new(),
            exclusions: ExclusionSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bonds(&self) -> &[HarmonicBond] {
        &self.bonds
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn residue_types(&self) -> impl Iterator<Item = ResidueType> + '_ {
        self.particles.iter().map(|p| p.residue_type)
    }

    /// Adds exclusions for every pair within `depth` bonds of each other. Existing
    /// exclusions are kept.
    pub fn exclude_bonded(&mut self, depth: usize) -> Result<(), TopologyError> {
        let bonded = ExclusionSet::from_bonds(
            self.bonds.iter().map(|b| (b.i, b.j)),
            self.particles.len(),
            depth,
        )?;
        self.exclusions.extend(&bonded);
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<Particle>, Vec<HarmonicBond>, ExclusionSet) {
        (self.particles, self.bonds, self.exclusions)
    }
}

#[derive(Debug, Clone)]
struct ChainRecord {
    range: Range<usize>,
    bond_length: f64,
    domains: Vec<Vec<usize>>,
}

/// Assembles a [`ParticleTopology`] chain by chain.
///
/// Consecutive residues are bonded unless both lie in a globular domain; residues of the
/// same domain are joined by elastic-network bonds at their reference separation.
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    particles: Vec<Particle>,
    chains: Vec<ChainRecord>,
    extra_exclusions: Vec<(usize, usize)>,
    force_constant: f64,
    enm_cutoff: f64,
    exclusion_depth: usize,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            chains: Vec::new(),
            extra_exclusions: Vec::new(),
            force_constant: BOND_FORCE_CONSTANT,
            enm_cutoff: ENM_CUTOFF,
            exclusion_depth: 1,
        }
    }

    pub fn force_constant(&mut self, k: f64) -> &mut Self {
        self.force_constant = k;
        self
    }

    pub fn enm_cutoff(&mut self, cutoff: f64) -> &mut Self {
        self.enm_cutoff = cutoff;
        self
    }

    pub fn exclusion_depth(&mut self, depth: usize) -> &mut Self {
        self.exclusion_depth = depth;
        self
    }

    /// Appends a chain. `globular_domains` holds chain-local residue indices, one list per
    /// domain. Returns the global particle indices of the chain.
    pub fn add_chain(
        &mut self,
        residues: &[ResidueType],
        globular_domains: &[Vec<usize>],
    ) -> Result<Range<usize>, TopologyError> {
        let chain = self.chains.len();
        let is_rna = residues.first().is_some_and(|r| r.is_nucleotide());
        if residues.iter().any(|r| r.is_nucleotide() != is_rna) {
            return Err(TopologyError::MixedChain { chain });
        }

        let mut globular = vec![false; residues.len()];
        for domain in globular_domains {
            for &index in domain {
                match globular.get_mut(index) {
                    None => {
                        return Err(TopologyError::IndexOutOfRange {
                            index,
                            count: residues.len(),
                        });
                    }
                    Some(true) => return Err(TopologyError::OverlappingDomains { chain, index }),
                    Some(flag) => *flag = true,
                }
            }
        }

        let start = self.particles.len();
        self.particles.extend(
            residues
                .iter()
                .zip(&globular)
                .map(|(&residue_type, &globular)| Particle {
                    residue_type,
                    globular,
                }),
        );
        let range = start..self.particles.len();
        self.chains.push(ChainRecord {
            range: range.clone(),
            bond_length: if is_rna {
                RNA_BOND_LENGTH
            } else {
                PROTEIN_BOND_LENGTH
            },
            domains: globular_domains
                .iter()
                .map(|domain| domain.iter().map(|&i| start + i).collect())
                .collect(),
        });
        Ok(range)
    }

    /// Excludes an extra pair (global indices) on top of the bond-derived exclusions.
    pub fn add_exclusion(&mut self, i: usize, j: usize) -> &mut Self {
        self.extra_exclusions.push((i, j));
        self
    }

    /// Builds the topology. Reference positions are required when any chain has a
    /// globular domain.
    pub fn build(
        self,
        reference_positions: Option<&[Point3<f64>]>,
    ) -> Result<ParticleTopology, TopologyError> {
        let count = self.particles.len();
        let mut bonds = Vec::new();

        for chain in &self.chains {
            for i in chain.range.start..chain.range.end.saturating_sub(1) {
                if !(self.particles[i].globular && self.particles[i + 1].globular) {
                    bonds.push(HarmonicBond::new(
                        i,
                        i + 1,
                        chain.bond_length,
                        self.force_constant,
                    )?);
                }
            }

            for domain in &chain.domains {
                let positions = match reference_positions {
                    Some(positions) if positions.len() == count => positions,
                    other => {
                        return Err(TopologyError::MissingReferencePositions {
                            expected: count,
                            found: other.map_or(0, <[_]>::len),
                        });
                    }
                };
                bonds.extend(self.elastic_network(domain, positions)?);
            }
        }

        let mut exclusions =
            ExclusionSet::from_bonds(bonds.iter().map(|b| (b.i, b.j)), count, self.exclusion_depth)?;
        exclusions.extend(&ExclusionSet::from_pairs(
            self.extra_exclusions.iter().copied(),
            count,
        )?);

        ParticleTopology::new(self.particles, bonds, exclusions)
    }

    fn elastic_network(
        &self,
        domain: &[usize],
        positions: &[Point3<f64>],
    ) -> Result<Vec<HarmonicBond>, TopologyError> {
        let local: Vec<Point3<f64>> = domain.iter().map(|&i| positions[i]).collect();
        let pairs = match CellList::new(&local, self.enm_cutoff, None) {
            Some(cells) => cells.pairs_within(&local, self.enm_cutoff),
            None => all_pairs_within(&local, self.enm_cutoff, None),
        };
        pairs
            .into_iter()
            .map(|(a, b)| {
                let (i, j) = (domain[a], domain[b]);
                HarmonicBond::new(i, j, (positions[i] - positions[j]).norm(), self.force_constant)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResidueType::*;

    fn straight_line(n: usize, spacing: f64) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64 * spacing, 0.0, 0.0)).collect()
    }

    #[test]
    fn disordered_protein_chain_is_bonded_consecutively() {
        let mut builder = TopologyBuilder::new();
        let range = builder.add_chain(&[Lysine, Glycine, Serine, Tyrosine], &[]).unwrap();
        assert_eq!(range, 0..4);
        let topology = builder.build(None).unwrap();

        assert_eq!(topology.bonds().len(), 3);
        for (n, bond) in topology.bonds().iter().enumerate() {
            assert_eq!((bond.i, bond.j), (n, n + 1));
            assert_eq!(bond.length, PROTEIN_BOND_LENGTH);
            assert_eq!(bond.k, BOND_FORCE_CONSTANT);
        }
        assert_eq!(topology.exclusions().sorted_pairs(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn rna_chain_uses_longer_bonds_and_chains_are_not_linked() {
        let mut builder = TopologyBuilder::new();
        builder.add_chain(&[Arginine, Arginine], &[]).unwrap();
        let range = builder.add_chain(&[Uracil, Adenine, Uracil], &[]).unwrap();
        assert_eq!(range, 2..5);
        let topology = builder.build(None).unwrap();

        let lengths: Vec<_> = topology.bonds().iter().map(|b| (b.i, b.j, b.length)).collect();
        assert_eq!(
            lengths,
            vec![(0, 1, 0.381), (2, 3, 0.5), (3, 4, 0.5)]
        );
        assert!(!topology.exclusions().is_excluded(1, 2));
    }

    #[test]
    fn mixed_chain_is_rejected() {
        let mut builder = TopologyBuilder::new();
        assert_eq!(
            builder.add_chain(&[Lysine, Uracil], &[]),
            Err(TopologyError::MixedChain { chain: 0 })
        );
    }

    #[test]
    fn globular_domain_uses_elastic_network_instead_of_chain_bonds() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_chain(&[Serine, Alanine, Valine, Leucine, Glycine], &[vec![1, 2, 3]])
            .unwrap();
        let positions = straight_line(5, 0.38);
        let topology = builder.build(Some(&positions[..])).unwrap();

        let globular: Vec<_> = topology.particles().iter().map(|p| p.globular).collect();
        assert_eq!(globular, vec![false, true, true, true, false]);

        let mut pairs: Vec<_> = topology.bonds().iter().map(|b| (b.i, b.j)).collect();
        pairs.sort_unstable();
        // Chain bonds 0-1 and 3-4; elastic bonds 1-2 and 2-3. Residues 1 and 3 sit
        // 0.76 nm apart, past the elastic-network cutoff.
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);

        let enm = topology.bonds().iter().find(|b| (b.i, b.j) == (1, 2)).unwrap();
        assert!((enm.length - 0.38).abs() < 1e-12);
    }

    #[test]
    fn elastic_network_links_all_close_pairs_once() {
        let mut builder = TopologyBuilder::new();
        builder
            .add_chain(&[Alanine, Alanine, Alanine], &[vec![0, 1, 2]])
            .unwrap();
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.4, 0.0, 0.0),
            Point3::new(0.2, 0.3, 0.0),
        ];
        let topology = builder.build(Some(&positions[..])).unwrap();
        let mut pairs: Vec<_> = topology.bonds().iter().map(|b| (b.i, b.j)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn globular_domain_requires_reference_positions() {
        let mut builder = TopologyBuilder::new();
        builder.add_chain(&[Alanine, Alanine], &[vec![0, 1]]).unwrap();
        assert_eq!(
            builder.build(None).unwrap_err(),
            TopologyError::MissingReferencePositions {
                expected: 2,
                found: 0
            }
        );
    }

    #[test]
    fn overlapping_domains_are_rejected() {
        let mut builder = TopologyBuilder::new();
        assert_eq!(
            builder.add_chain(&[Alanine, Alanine, Alanine], &[vec![0, 1], vec![1, 2]]),
            Err(TopologyError::OverlappingDomains { chain: 0, index: 1 })
        );
        assert!(matches!(
            builder.add_chain(&[Alanine], &[vec![3]]),
            Err(TopologyError::IndexOutOfRange { index: 3, count: 1 })
        ));
    }

    #[test]
    fn exclusion_depth_and_extra_exclusions_are_applied() {
        let mut builder = TopologyBuilder::new();
        builder.add_chain(&[Lysine, Lysine, Lysine, Lysine], &[]).unwrap();
        builder.exclusion_depth(2).add_exclusion(3, 0);
        let topology = builder.build(None).unwrap();
        assert!(topology.exclusions().is_excluded(0, 2));
        assert!(topology.exclusions().is_excluded(0, 3));
        assert_eq!(topology.exclusions().len(), 6);
    }

    #[test]
    fn exclude_bonded_widens_but_never_narrows_exclusions() {
        let mut builder = TopologyBuilder::new();
        builder.add_chain(&[Lysine, Lysine, Lysine, Lysine], &[]).unwrap();
        builder.add_exclusion(0, 3);
        let mut topology = builder.build(None).unwrap();
        assert!(!topology.exclusions().is_excluded(0, 2));

        topology.exclude_bonded(2).unwrap();
        assert_eq!(
            topology.exclusions().sorted_pairs(),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );

        topology.exclude_bonded(0).unwrap();
        assert_eq!(topology.exclusions().len(), 6);
    }

    #[test]
    fn new_rejects_bonds_beyond_particle_count() {
        let particles = vec![Particle::new(Lysine); 2];
        let bond = HarmonicBond::new(0, 2, 0.381, 1.0).unwrap();
        assert_eq!(
            ParticleTopology::new(particles, vec![bond], ExclusionSet::new()).unwrap_err(),
            TopologyError::IndexOutOfRange { index: 2, count: 2 }
        );
    }
}
