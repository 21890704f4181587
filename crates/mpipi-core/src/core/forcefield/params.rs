use super::potentials::WF_CUTOFF_RATIO;
use super::screening::{DEFAULT_RELATIVE_PERMITTIVITY, ELECTRIC_PREFACTOR};
use crate::core::models::residue::{ParseResidueTypeError, ResidueType};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const PLACEHOLDER_TABLE: &str = include_str!("../../../data/placeholder_params.toml");

/// Row order of the 21x21 tabulated pair files.
pub const TABULATED_ORDER: [ResidueType; 21] = [
    ResidueType::Methionine,
    ResidueType::Glycine,
    ResidueType::Lysine,
    ResidueType::Threonine,
    ResidueType::Arginine,
    ResidueType::Alanine,
    ResidueType::AsparticAcid,
    ResidueType::GlutamicAcid,
    ResidueType::Tyrosine,
    ResidueType::Valine,
    ResidueType::Leucine,
    ResidueType::Glutamine,
    ResidueType::Tryptophan,
    ResidueType::Phenylalanine,
    ResidueType::Serine,
    ResidueType::Histidine,
    ResidueType::Asparagine,
    ResidueType::Proline,
    ResidueType::Cysteine,
    ResidueType::Isoleucine,
    ResidueType::Uracil,
];

fn default_mu() -> u32 {
    2
}

fn default_calibrated() -> bool {
    true
}

/// Single-residue constants: Wang-Frenkel size `sigma` (nm), well depth `epsilon`
/// (kJ/mol), exponent `mu`, partial `charge` (e) and `mass` (Da).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SingleParams {
    pub sigma: f64,
    pub epsilon: f64,
    #[serde(default = "default_mu")]
    pub mu: u32,
    #[serde(default)]
    pub charge: f64,
    #[serde(default)]
    pub mass: f64,
}

/// Calibrated constants for one specific type pair, taking precedence over the
/// combining rule. A missing `charge_product` falls back to `q_a * q_b`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PairOverride {
    pub epsilon: f64,
    pub sigma: f64,
    #[serde(default = "default_mu")]
    pub mu: u32,
    #[serde(default)]
    pub charge_product: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairParameters {
    pub epsilon: f64,
    pub sigma: f64,
    pub mu: u32,
    pub charge_product: f64,
}

impl PairParameters {
    /// Distance at which the Wang-Frenkel term reaches zero with zero slope.
    #[inline]
    pub fn wf_cutoff(&self) -> f64 {
        WF_CUTOFF_RATIO * self.sigma
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningRule {
    /// Arithmetic mean of sizes, geometric mean of well depths.
    #[default]
    LorentzBerthelot,
    /// Geometric mean of both sizes and well depths.
    Geometric,
}

impl CombiningRule {
    pub fn combine(&self, a: &SingleParams, b: &SingleParams) -> PairParameters {
        let sigma = match self {
            CombiningRule::LorentzBerthelot => 0.5 * (a.sigma + b.sigma),
            CombiningRule::Geometric => (a.sigma * b.sigma).sqrt(),
        };
        PairParameters {
            epsilon: (a.epsilon * b.epsilon).sqrt(),
            sigma,
            mu: a.mu.max(b.mu),
            charge_product: a.charge * b.charge,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub combining_rule: CombiningRule,
    /// `false` for tables whose values are illustrative rather than fitted.
    #[serde(default = "default_calibrated")]
    pub calibrated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PairEntry {
    a: ResidueType,
    b: ResidueType,
    epsilon: f64,
    sigma: f64,
    #[serde(default = "default_mu")]
    mu: u32,
    #[serde(default)]
    charge_product: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterFile {
    metadata: TableMetadata,
    residues: HashMap<ResidueType, SingleParams>,
    #[serde(default)]
    pairs: Vec<PairEntry>,
}

#[derive(Debug, Deserialize)]
struct PairRecord {
    type_a: ResidueType,
    type_b: ResidueType,
    epsilon: f64,
    sigma: f64,
    mu: u32,
    charge_product: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Residue type {0} is not registered in the parameter table")]
    UnknownResidueType(ResidueType),
    #[error(transparent)]
    UnknownResidueCode(#[from] ParseResidueTypeError),
    #[error("Invalid parameters for {residue}: {message}")]
    InvalidValue { residue: String, message: String },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Malformed tabulated parameters in '{path}': {message}")]
    Tabulated { path: String, message: String },
}

#[inline]
fn ordered(a: ResidueType, b: ResidueType) -> (ResidueType, ResidueType) {
    if a <= b { (a, b) } else { (b, a) }
}

fn check_wf_values(
    residue: impl FnOnce() -> String,
    sigma: f64,
    epsilon: f64,
    mu: u32,
) -> Result<(), ParameterError> {
    let message = if !(sigma.is_finite() && sigma > 0.0) {
        Some(format!("sigma must be positive, got {sigma}"))
    } else if !(epsilon.is_finite() && epsilon >= 0.0) {
        Some(format!("epsilon must be non-negative, got {epsilon}"))
    } else if mu == 0 {
        Some("mu must be at least 1".to_string())
    } else {
        None
    };
    match message {
        Some(message) => Err(ParameterError::InvalidValue {
            residue: residue(),
            message,
        }),
        None => Ok(()),
    }
}

/// Registry of per-residue constants and calibrated pair entries.
///
/// Populated once at model construction and only read afterwards; the hot path works on
/// the dense [`PairTable`] produced by [`ParameterTable::resolved`].
#[derive(Debug, Clone)]
pub struct ParameterTable {
    metadata: TableMetadata,
    singles: HashMap<ResidueType, SingleParams>,
    pairs: HashMap<(ResidueType, ResidueType), PairOverride>,
}

impl ParameterTable {
    pub fn new(name: &str, version: &str, combining_rule: CombiningRule) -> Self {
        Self {
            metadata: TableMetadata {
                name: name.to_string(),
                version: version.to_string(),
                combining_rule,
                calibrated: true,
            },
            singles: HashMap::new(),
            pairs: HashMap::new(),
        }
    }

    /// Illustrative, uncalibrated constants for every residue type.
    ///
    /// Enough to exercise the model end to end. Production runs load a fitted table
    /// with [`ParameterTable::load`] or merge one with [`ParameterTable::load_tabulated`].
    pub fn placeholder() -> Result<Self, ParameterError> {
        Self::parse(PLACEHOLDER_TABLE, "<bundled placeholder_params.toml>")
    }

    pub fn load(path: &Path) -> Result<Self, ParameterError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParameterError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ParameterError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ParameterError> {
        let file: ParameterFile = toml::from_str(content).map_err(|e| ParameterError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let mut table = Self {
            metadata: file.metadata,
            singles: HashMap::new(),
            pairs: HashMap::new(),
        };
        for (residue_type, params) in file.residues {
            table.register(residue_type, params)?;
        }
        for entry in file.pairs {
            table.register_pair(
                entry.a,
                entry.b,
                PairOverride {
                    epsilon: entry.epsilon,
                    sigma: entry.sigma,
                    mu: entry.mu,
                    charge_product: entry.charge_product,
                },
            )?;
        }
        Ok(table)
    }

    /// Merges a pair-specific CSV table (`type_a,type_b,epsilon,sigma,mu,charge_product`)
    /// into the registered pair entries.
    pub fn load_pair_csv(&mut self, path: &Path) -> Result<usize, ParameterError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ParameterError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut count = 0;
        for result in reader.deserialize::<PairRecord>() {
            let record = result.map_err(|e| ParameterError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            self.register_pair(
                record.type_a,
                record.type_b,
                PairOverride {
                    epsilon: record.epsilon,
                    sigma: record.sigma,
                    mu: record.mu,
                    charge_product: record.charge_product,
                },
            )?;
            count += 1;
        }
        Ok(count)
    }

    /// Merges a tabulated pair file: whitespace-separated values holding the 21x21x3
    /// Wang-Frenkel block (`epsilon`, `sigma`, then `mu` planes) followed by the 21x21
    /// Yukawa amplitudes in kJ/mol nm. Entry `(x, y)` of a plane sits at `x + 21 y`, with
    /// rows ordered as [`TABULATED_ORDER`]. `#` starts a comment.
    ///
    /// Amplitudes are stored as the charge product that reproduces them at the default
    /// relative permittivity. Marks the table as calibrated and returns the number of
    /// pairs registered.
    pub fn load_tabulated(&mut self, path: &Path) -> Result<usize, ParameterError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParameterError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.merge_tabulated(&content, &path.to_string_lossy())
    }

    fn merge_tabulated(&mut self, content: &str, origin: &str) -> Result<usize, ParameterError> {
        let malformed = |message: String| ParameterError::Tabulated {
            path: origin.to_string(),
            message,
        };
        let values = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default())
            .flat_map(str::split_whitespace)
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|e| malformed(format!("'{token}': {e}")))
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let n = TABULATED_ORDER.len();
        let plane = n * n;
        if values.len() != 4 * plane {
            return Err(malformed(format!(
                "expected {} values, found {}",
                4 * plane,
                values.len()
            )));
        }

        let at = |layer: usize, x: usize, y: usize| values[layer * plane + x + n * y];
        for layer in 0..4 {
            for x in 0..n {
                for y in (x + 1)..n {
                    let (forward, backward) = (at(layer, x, y), at(layer, y, x));
                    if (forward - backward).abs() > 1e-9 * forward.abs().max(1.0) {
                        let (a, b) = (TABULATED_ORDER[x], TABULATED_ORDER[y]);
                        return Err(malformed(format!(
                            "{a}-{b} and {b}-{a} differ in block {layer}"
                        )));
                    }
                }
            }
        }

        let mut count = 0;
        for x in 0..n {
            for y in x..n {
                let amplitude = at(3, x, y);
                self.register_pair(
                    TABULATED_ORDER[x],
                    TABULATED_ORDER[y],
                    PairOverride {
                        epsilon: at(0, x, y),
                        sigma: at(1, x, y),
                        mu: at(2, x, y).floor() as u32,
                        charge_product: Some(
                            amplitude * DEFAULT_RELATIVE_PERMITTIVITY / ELECTRIC_PREFACTOR,
                        ),
                    },
                )?;
                count += 1;
            }
        }
        self.metadata.calibrated = true;
        Ok(count)
    }

    pub fn register(
        &mut self,
        residue_type: ResidueType,
        params: SingleParams,
    ) -> Result<(), ParameterError> {
        check_wf_values(
            || residue_type.to_string(),
            params.sigma,
            params.epsilon,
            params.mu,
        )?;
        if !params.charge.is_finite() || !params.mass.is_finite() || params.mass < 0.0 {
            return Err(ParameterError::InvalidValue {
                residue: residue_type.to_string(),
                message: "charge and mass must be finite, mass non-negative".to_string(),
            });
        }
        self.singles.insert(residue_type, params);
        Ok(())
    }

    pub fn register_pair(
        &mut self,
        a: ResidueType,
        b: ResidueType,
        params: PairOverride,
    ) -> Result<(), ParameterError> {
        check_wf_values(|| format!("{a}-{b}"), params.sigma, params.epsilon, params.mu)?;
        if params.charge_product.is_some_and(|q| !q.is_finite()) {
            return Err(ParameterError::InvalidValue {
                residue: format!("{a}-{b}"),
                message: "charge_product must be finite".to_string(),
            });
        }
        self.pairs.insert(ordered(a, b), params);
        Ok(())
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    pub fn contains(&self, residue_type: ResidueType) -> bool {
        self.singles.contains_key(&residue_type)
    }

    pub fn single(&self, residue_type: ResidueType) -> Result<&SingleParams, ParameterError> {
        self.singles
            .get(&residue_type)
            .ok_or(ParameterError::UnknownResidueType(residue_type))
    }

    pub fn mass(&self, residue_type: ResidueType) -> Result<f64, ParameterError> {
        self.single(residue_type).map(|p| p.mass)
    }

    pub fn resolve(&self, a: ResidueType, b: ResidueType) -> Result<PairParameters, ParameterError> {
        let single_a = self.single(a)?;
        let single_b = self.single(b)?;

        match self.pairs.get(&ordered(a, b)) {
            Some(pair) => Ok(PairParameters {
                epsilon: pair.epsilon,
                sigma: pair.sigma,
                mu: pair.mu,
                charge_product: pair
                    .charge_product
                    .unwrap_or(single_a.charge * single_b.charge),
            }),
            None => Ok(self.metadata.combining_rule.combine(single_a, single_b)),
        }
    }

    /// Pre-resolves every pair among `types` into a dense lookup table.
    pub fn resolved<I>(&self, types: I) -> Result<PairTable, ParameterError>
    where
        I: IntoIterator<Item = ResidueType>,
    {
        let mut present = [false; ResidueType::COUNT];
        for residue_type in types {
            if !self.contains(residue_type) {
                return Err(ParameterError::UnknownResidueType(residue_type));
            }
            present[residue_type.index()] = true;
        }

        let mut entries = vec![None; ResidueType::COUNT * ResidueType::COUNT];
        for a in ResidueType::ALL.into_iter().filter(|t| present[t.index()]) {
            for b in ResidueType::ALL.into_iter().filter(|t| present[t.index()]) {
                entries[a.index() * ResidueType::COUNT + b.index()] = Some(self.resolve(a, b)?);
            }
        }
        Ok(PairTable { entries })
    }
}

/// Dense, read-only matrix of resolved pair parameters.
#[derive(Debug, Clone)]
pub struct PairTable {
    entries: Vec<Option<PairParameters>>,
}

impl PairTable {
    #[inline]
    pub fn get(&self, a: ResidueType, b: ResidueType) -> Result<&PairParameters, ParameterError> {
        for residue_type in [a, b] {
            if self.entries[residue_type.index() * (ResidueType::COUNT + 1)].is_none() {
                return Err(ParameterError::UnknownResidueType(residue_type));
            }
        }
        self.entries[a.index() * ResidueType::COUNT + b.index()]
            .as_ref()
            .ok_or(ParameterError::UnknownResidueType(b))
    }

    /// Largest Wang-Frenkel range among all resolved pairs.
    pub fn max_wf_cutoff(&self) -> f64 {
        self.entries
            .iter()
            .flatten()
            .map(PairParameters::wf_cutoff)
            .fold(0.0, f64::max)
    }
}
