use crate::core::forcefield::cutoff::{CutoffConfiguration, CutoffError};
use crate::core::forcefield::energy::DEFAULT_MIN_DISTANCE;
use crate::core::forcefield::screening::{
    DEFAULT_RELATIVE_PERMITTIVITY, Screening, ScreeningError, debye_length,
};
use crate::core::models::particle::{DEFAULT_GLOBULAR_FACTOR, GlobularScaling};
use crate::core::topology::builder::TopologyBuilder;
use crate::engine::neighbors::NeighborStrategy;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {message}")]
    InvalidValue {
        parameter: &'static str,
        message: String,
    },
    #[error(transparent)]
    Cutoff(#[from] CutoffError),
    #[error(transparent)]
    Screening(#[from] ScreeningError),
    #[error(
        "Dispersion cutoff {cutoff} nm truncates the Wang-Frenkel range {required} nm of pair {pair} without a switching zone"
    )]
    DispersionCutoffTooShort {
        pair: String,
        required: f64,
        cutoff: f64,
    },
    #[error("Compute backend '{0:?}' is not available in this build")]
    BackendUnavailable(BackendKind),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// How the Debye screening length is obtained.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScreeningConfig {
    /// Derived from temperature (K) and ionic strength (mM). The permittivity of the
    /// Coulomb amplitude defaults to 80 and does not follow `temperature`.
    Conditions {
        temperature: f64,
        ionic_strength: f64,
        #[serde(default)]
        relative_permittivity: Option<f64>,
    },
    /// Given directly in nm.
    DebyeLength {
        length: f64,
        #[serde(default = "default_relative_permittivity")]
        relative_permittivity: f64,
    },
}

fn default_relative_permittivity() -> f64 {
    DEFAULT_RELATIVE_PERMITTIVITY
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self::Conditions {
            temperature: 280.0,
            ionic_strength: 150.0,
            relative_permittivity: None,
        }
    }
}

impl ScreeningConfig {
    pub fn screening(&self) -> Result<Screening, ScreeningError> {
        match *self {
            Self::Conditions {
                temperature,
                ionic_strength,
                relative_permittivity: None,
            } => Screening::from_conditions(temperature, ionic_strength),
            Self::Conditions {
                temperature,
                ionic_strength,
                relative_permittivity: Some(permittivity),
            } => Screening::new(debye_length(temperature, ionic_strength)?, permittivity),
            Self::DebyeLength {
                length,
                relative_permittivity,
            } => Screening::new(length, relative_permittivity),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NeighborListConfig {
    pub strategy: NeighborStrategy,
    /// Extra range (nm) added to the interaction range when the list is built.
    pub skin: f64,
}

impl Default for NeighborListConfig {
    fn default() -> Self {
        Self {
            strategy: NeighborStrategy::Auto,
            skin: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    #[default]
    Serial,
    Parallel,
}

/// Immutable settings of an Mpipi force, fixed at construction.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub cutoffs: CutoffConfiguration,
    pub screening: ScreeningConfig,
    pub neighbor_list: NeighborListConfig,
    pub backend: BackendKind,
    /// Nonbonded separation (nm) below which evaluation fails with an overlap error.
    pub min_distance: f64,
    /// Bond separation up to which pairs are excluded from nonbonded terms.
    pub exclusion_depth: usize,
    /// Wang-Frenkel scale factor between two globular residues.
    pub globular_factor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            cutoffs: CutoffConfiguration::default(),
            screening: ScreeningConfig::default(),
            neighbor_list: NeighborListConfig::default(),
            backend: BackendKind::default(),
            min_distance: DEFAULT_MIN_DISTANCE,
            exclusion_depth: 1,
            globular_factor: DEFAULT_GLOBULAR_FACTOR,
        }
    }
}

fn check_non_negative(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            message: format!("must be finite and non-negative, got {value}"),
        })
    }
}

impl ModelConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cutoffs.validate()?;
        self.screening.screening()?;
        check_non_negative("neighbor_list.skin", self.neighbor_list.skin)?;
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "min_distance",
                message: format!("must be positive, got {}", self.min_distance),
            });
        }
        if !(self.globular_factor.is_finite() && self.globular_factor > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "globular_factor",
                message: format!("must be positive, got {}", self.globular_factor),
            });
        }
        Ok(())
    }

    pub fn globular_scaling(&self) -> GlobularScaling {
        GlobularScaling::from_factor(self.globular_factor)
    }

    /// A topology builder that excludes pairs up to [`Self::exclusion_depth`] bonds apart.
    pub fn topology_builder(&self) -> TopologyBuilder {
        let mut builder = TopologyBuilder::new();
        builder.exclusion_depth(self.exclusion_depth);
        builder
    }

    /// Largest distance at which any nonbonded term is non-zero.
    pub fn interaction_range(&self) -> f64 {
        self.cutoffs.max_distance()
    }
}

#[derive(Default)]
pub struct ModelConfigBuilder {
    cutoffs: Option<CutoffConfiguration>,
    screening: Option<ScreeningConfig>,
    neighbor_list: Option<NeighborListConfig>,
    backend: Option<BackendKind>,
    min_distance: Option<f64>,
    exclusion_depth: Option<usize>,
    globular_factor: Option<f64>,
}

impl ModelConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cutoffs(mut self, cutoffs: CutoffConfiguration) -> Self {
        self.cutoffs = Some(cutoffs);
        self
    }
    pub fn screening(mut self, screening: ScreeningConfig) -> Self {
        self.screening = Some(screening);
        self
    }
    pub fn conditions(self, temperature: f64, ionic_strength: f64) -> Self {
        self.screening(ScreeningConfig::Conditions {
            temperature,
            ionic_strength,
            relative_permittivity: None,
        })
    }
    pub fn neighbor_list(mut self, neighbor_list: NeighborListConfig) -> Self {
        self.neighbor_list = Some(neighbor_list);
        self
    }
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }
    pub fn min_distance(mut self, distance: f64) -> Self {
        self.min_distance = Some(distance);
        self
    }
    pub fn exclusion_depth(mut self, depth: usize) -> Self {
        self.exclusion_depth = Some(depth);
        self
    }
    pub fn globular_factor(mut self, factor: f64) -> Self {
        self.globular_factor = Some(factor);
        self
    }

    /// Fills unset values from [`ModelConfig::default`] and validates the result.
    pub fn build(self) -> Result<ModelConfig, ConfigError> {
        let defaults = ModelConfig::default();
        let config = ModelConfig {
            cutoffs: self.cutoffs.unwrap_or(defaults.cutoffs),
            screening: self.screening.unwrap_or(defaults.screening),
            neighbor_list: self.neighbor_list.unwrap_or(defaults.neighbor_list),
            backend: self.backend.unwrap_or(defaults.backend),
            min_distance: self.min_distance.unwrap_or(defaults.min_distance),
            exclusion_depth: self.exclusion_depth.unwrap_or(defaults.exclusion_depth),
            globular_factor: self.globular_factor.unwrap_or(defaults.globular_factor),
        };
        config.validate()?;
        Ok(config)
    }
}
