use super::TopologyError;
use crate::core::forcefield::energy::{EnergyCalculationError, PairInteraction};
use crate::core::forcefield::potentials;
use crate::core::forcefield::term::EnergyTerm;
use nalgebra::Vector3;

/// Force constant of chain and elastic-network bonds (kJ/mol/nm²).
pub const BOND_FORCE_CONSTANT: f64 = 8031.0;
/// Rest length of a bond between consecutive amino acids (nm).
pub const PROTEIN_BOND_LENGTH: f64 = 0.381;
/// Rest length of a bond between consecutive nucleotides (nm).
pub const RNA_BOND_LENGTH: f64 = 0.5;
/// Largest reference separation of two globular residues joined by an elastic bond (nm).
pub const ENM_CUTOFF: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicBond {
    pub i: usize,
    pub j: usize,
    pub length: f64,
    pub k: f64,
}

impl HarmonicBond {
    /// Creates a bond with `i < j`.
    pub fn new(i: usize, j: usize, length: f64, k: f64) -> Result<Self, TopologyError> {
        if i == j {
            return Err(TopologyError::SelfPair(i));
        }
        if !(length.is_finite() && length >= 0.0 && k.is_finite() && k >= 0.0) {
            return Err(TopologyError::InvalidBond {
                i,
                j,
                message: format!("length {length} nm and k {k} must be finite and non-negative"),
            });
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        Ok(Self { i, j, length, k })
    }

    /// Energy and force on particle `i`, where `delta = r_i - r_j`.
    #[inline]
    pub fn evaluate(&self, delta: &Vector3<f64>) -> Result<PairInteraction, EnergyCalculationError> {
        let dist = delta.norm();
        if dist == 0.0 {
            return Err(EnergyCalculationError::ParticleOverlap {
                i: self.i,
                j: self.j,
                distance: dist,
            });
        }
        let term = potentials::harmonic(dist, self.length, self.k);
        Ok(PairInteraction {
            energy: EnergyTerm::new(0.0, 0.0, term.energy),
            force: PairInteraction::radial_force(term.derivative, dist, delta),
        })
    }
}
