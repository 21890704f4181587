use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::energy::EnergyCalculationError;
use crate::core::forcefield::params::ParameterError;
use crate::core::models::residue::ResidueType;
use crate::core::topology::TopologyError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Residue type {0} has no registered parameters")]
    UnknownResidueType(ResidueType),

    #[error("Particles {i} and {j} overlap at distance {distance} nm")]
    ParticleOverlap { i: usize, j: usize, distance: f64 },

    #[error("Inconsistent input: {0}")]
    InconsistentInput(String),

    #[error("Periodic box edge {min_length} nm is shorter than twice the interaction range {range} nm")]
    BoxTooSmall { min_length: f64, range: f64 },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Parameter table error: {0}")]
    Parameter(ParameterError),

    #[error("Invalid topology: {source}")]
    Topology {
        #[from]
        source: TopologyError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<ParameterError> for EngineError {
    fn from(error: ParameterError) -> Self {
        match error {
            ParameterError::UnknownResidueType(residue_type) => {
                Self::UnknownResidueType(residue_type)
            }
            other => Self::Parameter(other),
        }
    }
}

impl From<EnergyCalculationError> for EngineError {
    fn from(error: EnergyCalculationError) -> Self {
        match error {
            EnergyCalculationError::ParticleOverlap { i, j, distance } => {
                Self::ParticleOverlap { i, j, distance }
            }
            EnergyCalculationError::Parameter(source) => source.into(),
        }
    }
}
