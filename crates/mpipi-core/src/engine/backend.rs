use super::config::{BackendKind, ConfigError};
use crate::core::forcefield::energy::{EnergyCalculationError, PairEvaluator, PairInteraction};
use crate::core::models::particle::Particle;
use crate::core::topology::bonds::HarmonicBond;
use crate::core::utils::geometry::{PeriodicBox, displacement};
use nalgebra::Point3;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything a backend needs to evaluate pairs for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub evaluator: PairEvaluator<'a>,
    pub particles: &'a [Particle],
    pub positions: &'a [Point3<f64>],
    pub periodic_box: Option<&'a PeriodicBox>,
}

impl EvaluationContext<'_> {
    #[inline]
    pub fn evaluate_pair(&self, i: usize, j: usize) -> Result<PairContribution, EnergyCalculationError> {
        let delta = displacement(&self.positions[i], &self.positions[j], self.periodic_box);
        let interaction =
            self.evaluator
                .evaluate(i, j, &self.particles[i], &self.particles[j], &delta)?;
        Ok(PairContribution { i, j, interaction })
    }

    #[inline]
    pub fn evaluate_bond(&self, bond: &HarmonicBond) -> Result<PairContribution, EnergyCalculationError> {
        let delta = displacement(
            &self.positions[bond.i],
            &self.positions[bond.j],
            self.periodic_box,
        );
        Ok(PairContribution {
            i: bond.i,
            j: bond.j,
            interaction: bond.evaluate(&delta)?,
        })
    }
}

/// Interaction of one pair; `interaction.force` acts on `i`, its negation on `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContribution {
    pub i: usize,
    pub j: usize,
    pub interaction: PairInteraction,
}

/// Strategy for evaluating a batch of independent pair interactions.
///
/// Implementations must return one contribution per input pair, in input order, so that
/// the accumulated result does not depend on the backend.
pub trait ComputeBackend: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        pairs: &[(usize, usize)],
        context: &EvaluationContext<'_>,
    ) -> Result<Vec<PairContribution>, EnergyCalculationError>;

    fn evaluate_bonds(
        &self,
        bonds: &[HarmonicBond],
        context: &EvaluationContext<'_>,
    ) -> Result<Vec<PairContribution>, EnergyCalculationError> {
        bonds.iter().map(|bond| context.evaluate_bond(bond)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn evaluate(
        &self,
        pairs: &[(usize, usize)],
        context: &EvaluationContext<'_>,
    ) -> Result<Vec<PairContribution>, EnergyCalculationError> {
        pairs
            .iter()
            .map(|&(i, j)| context.evaluate_pair(i, j))
            .collect()
    }
}

#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

#[cfg(feature = "parallel")]
impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn evaluate(
        &self,
        pairs: &[(usize, usize)],
        context: &EvaluationContext<'_>,
    ) -> Result<Vec<PairContribution>, EnergyCalculationError> {
        pairs
            .par_iter()
            .map(|&(i, j)| context.evaluate_pair(i, j))
            .collect()
    }

    fn evaluate_bonds(
        &self,
        bonds: &[HarmonicBond],
        context: &EvaluationContext<'_>,
    ) -> Result<Vec<PairContribution>, EnergyCalculationError> {
        bonds
            .par_iter()
            .map(|bond| context.evaluate_bond(bond))
            .collect()
    }
}

pub fn select_backend(kind: BackendKind) -> Result<Box<dyn ComputeBackend>, ConfigError> {
    match kind {
        BackendKind::Serial => Ok(Box::new(SerialBackend)),
        #[cfg(feature = "parallel")]
        BackendKind::Parallel => Ok(Box::new(ParallelBackend)),
        #[cfg(not(feature = "parallel"))]
        BackendKind::Parallel => Err(ConfigError::BackendUnavailable(kind)),
    }
}
