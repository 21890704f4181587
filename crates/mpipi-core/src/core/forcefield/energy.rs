use super::cutoff::CutoffConfiguration;
use super::params::{ParameterError, PairTable};
use super::potentials::{self, RadialTerm};
use super::screening::Screening;
use super::term::EnergyTerm;
use crate::core::models::particle::{GlobularScaling, Particle};
use nalgebra::Vector3;
use thiserror::Error;

/// Separation below which two nonbonded particles are considered overlapping (nm).
pub const DEFAULT_MIN_DISTANCE: f64 = 0.05;

#[derive(Debug, Error)]
pub enum EnergyCalculationError {
    #[error("Particles {i} and {j} overlap at distance {distance} nm")]
    ParticleOverlap { i: usize, j: usize, distance: f64 },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Energy breakdown of one pair and the force it exerts on the first particle.
/// The second particle receives exactly `-force`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairInteraction {
    pub energy: EnergyTerm,
    pub force: Vector3<f64>,
}

impl PairInteraction {
    pub const ZERO: Self = Self {
        energy: EnergyTerm {
            dispersion: 0.0,
            electrostatic: 0.0,
            bonded: 0.0,
        },
        force: Vector3::new(0.0, 0.0, 0.0),
    };

    /// Turns a radial term evaluated at `dist` into a force along `delta`.
    #[inline]
    pub(crate) fn radial_force(derivative: f64, dist: f64, delta: &Vector3<f64>) -> Vector3<f64> {
        delta * (-derivative / dist)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PairEvaluator<'a> {
    table: &'a PairTable,
    cutoffs: CutoffConfiguration,
    screening: Screening,
    scaling: GlobularScaling,
    min_distance: f64,
}

impl<'a> PairEvaluator<'a> {
    pub fn new(table: &'a PairTable, cutoffs: CutoffConfiguration, screening: Screening) -> Self {
        Self {
            table,
            cutoffs,
            screening,
            scaling: GlobularScaling::default(),
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }

    pub fn with_scaling(mut self, scaling: GlobularScaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn cutoffs(&self) -> &CutoffConfiguration {
        &self.cutoffs
    }

    pub fn screening(&self) -> &Screening {
        &self.screening
    }

    /// Evaluates the nonbonded interaction of particles `i` and `j`, where `delta` is the
    /// (minimum-image) displacement `r_i - r_j`.
    pub fn evaluate(
        &self,
        i: usize,
        j: usize,
        a: &Particle,
        b: &Particle,
        delta: &Vector3<f64>,
    ) -> Result<PairInteraction, EnergyCalculationError> {
        let dist = delta.norm();
        if dist < self.min_distance || dist == 0.0 {
            return Err(EnergyCalculationError::ParticleOverlap {
                i,
                j,
                distance: dist,
            });
        }
        let params = self.table.get(a.residue_type, b.residue_type)?;

        let dispersion = if self.cutoffs.dispersion.contains(dist) && params.epsilon != 0.0 {
            let wf = potentials::wang_frenkel(dist, params.sigma, params.epsilon, params.mu)
                .scaled(self.scaling.factor(a, b));
            self.cutoffs.dispersion.apply(wf, dist)
        } else {
            RadialTerm::ZERO
        };

        let electrostatic =
            if self.cutoffs.electrostatic.contains(dist) && params.charge_product != 0.0 {
                let coulomb = self.screening.screened_coulomb(dist, params.charge_product);
                self.cutoffs.electrostatic.apply(coulomb, dist)
            } else {
                RadialTerm::ZERO
            };

        Ok(PairInteraction {
            energy: EnergyTerm::new(dispersion.energy, electrostatic.energy, 0.0),
            force: PairInteraction::radial_force(
                dispersion.derivative + electrostatic.derivative,
                dist,
                delta,
            ),
        })
    }
}
