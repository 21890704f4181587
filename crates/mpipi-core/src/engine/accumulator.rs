use super::backend::PairContribution;
use crate::core::forcefield::term::EnergyTerm;
use nalgebra::Vector3;

/// Total energy broken down by term, and the force on every particle (kJ/mol/nm).
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyForceResult {
    pub energy: EnergyTerm,
    pub forces: Vec<Vector3<f64>>,
}

impl EnergyForceResult {
    pub fn zeroed(particle_count: usize) -> Self {
        Self {
            energy: EnergyTerm::default(),
            forces: vec![Vector3::zeros(); particle_count],
        }
    }

    pub fn total(&self) -> f64 {
        self.energy.total()
    }

    /// Sum of all forces; zero up to rounding for an isolated system.
    pub fn net_force(&self) -> Vector3<f64> {
        self.forces.iter().sum()
    }
}

/// Sums pair contributions in the order they are added. The same sequence of
/// contributions always produces bit-identical results.
#[derive(Debug, Clone)]
pub struct Accumulator {
    result: EnergyForceResult,
}

impl Accumulator {
    pub fn new(particle_count: usize) -> Self {
        Self {
            result: EnergyForceResult::zeroed(particle_count),
        }
    }

    #[inline]
    pub fn add(&mut self, contribution: &PairContribution) {
        let PairContribution { i, j, interaction } = contribution;
        self.result.energy += interaction.energy;
        self.result.forces[*i] += interaction.force;
        self.result.forces[*j] -= interaction.force;
    }

    pub fn extend<'a, I>(&mut self, contributions: I)
    where
        I: IntoIterator<Item = &'a PairContribution>,
    {
        for contribution in contributions {
            self.add(contribution);
        }
    }

    pub fn finish(self) -> EnergyForceResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::energy::PairInteraction;

    fn contribution(i: usize, j: usize, energy: f64, force: [f64; 3]) -> PairContribution {
        PairContribution {
            i,
            j,
            interaction: PairInteraction {
                energy: EnergyTerm::new(energy, 0.5 * energy, 0.0),
                force: Vector3::from(force),
            },
        }
    }

    #[test]
    fn forces_obey_newtons_third_law() {
        let mut accumulator = Accumulator::new(3);
        accumulator.add(&contribution(0, 2, 1.0, [1.0, -2.0, 0.5]));
        let result = accumulator.finish();
        assert_eq!(result.forces[0], Vector3::new(1.0, -2.0, 0.5));
        assert_eq!(result.forces[2], -result.forces[0]);
        assert_eq!(result.forces[1], Vector3::zeros());
        assert_eq!(result.total(), 1.5);
    }

    #[test]
    fn contributions_sum_per_particle_and_term() {
        let mut accumulator = Accumulator::new(3);
        accumulator.extend(&[
            contribution(0, 1, 1.0, [1.0, 0.0, 0.0]),
            contribution(1, 2, -3.0, [0.0, 2.0, 0.0]),
            contribution(0, 2, 0.5, [0.0, 0.0, -1.0]),
        ]);
        let result = accumulator.finish();
        assert_eq!(result.energy.dispersion, -1.5);
        assert_eq!(result.energy.electrostatic, -0.75);
        assert_eq!(result.forces[1], Vector3::new(-1.0, 2.0, 0.0));
        assert_eq!(result.net_force(), Vector3::zeros());
    }

    #[test]
    fn zeroed_result_has_no_energy() {
        let result = EnergyForceResult::zeroed(4);
        assert_eq!(result.total(), 0.0);
        assert_eq!(result.forces.len(), 4);
    }
}
