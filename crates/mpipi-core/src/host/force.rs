use crate::core::forcefield::energy::PairEvaluator;
use crate::core::forcefield::params::{PairTable, ParameterTable};
use crate::core::forcefield::screening::Screening;
use crate::core::models::residue::ResidueType;
use crate::core::topology::builder::ParticleTopology;
use crate::core::utils::geometry::PeriodicBox;
use crate::engine::accumulator::{Accumulator, EnergyForceResult};
use crate::engine::backend::{ComputeBackend, EvaluationContext, select_backend};
use crate::engine::config::{ConfigError, ModelConfig};
use crate::engine::error::EngineError;
use crate::engine::neighbors::verlet::NeighborList;
use nalgebra::Point3;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};

/// The call contract a host simulation engine consumes.
pub trait ForceProvider {
    fn particle_count(&self) -> usize;

    /// Energy and forces for one snapshot. `residue_types` must match the assignment the
    /// provider was configured with.
    fn compute(
        &self,
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
        residue_types: &[ResidueType],
    ) -> Result<EnergyForceResult, EngineError>;
}

/// The Mpipi-Recharged nonbonded and bonded potential for a fixed set of particles.
#[derive(Debug)]
pub struct MpipiForce {
    pair_table: PairTable,
    topology: ParticleTopology,
    config: ModelConfig,
    screening: Screening,
    backend: Box<dyn ComputeBackend>,
    neighbor_cache: RwLock<Option<Arc<NeighborList>>>,
    rebuilds: AtomicUsize,
}

impl MpipiForce {
    #[instrument(skip_all, name = "mpipi_force_setup")]
    pub fn new(
        table: &ParameterTable,
        mut topology: ParticleTopology,
        config: ModelConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        topology.exclude_bonded(config.exclusion_depth)?;
        let screening = config.screening.screening().map_err(ConfigError::from)?;
        let pair_table = table.resolved(topology.residue_types())?;

        let dispersion = config.cutoffs.dispersion;
        let required = pair_table.max_wf_cutoff();
        if dispersion.switch_width.is_none() && required > dispersion.distance {
            return Err(ConfigError::DispersionCutoffTooShort {
                pair: longest_range_pair(table, &topology)?,
                required,
                cutoff: dispersion.distance,
            }
            .into());
        }
        if !table.metadata().calibrated {
            warn!(
                table = %table.metadata().name,
                "Parameter table is marked uncalibrated; energies are not Mpipi-Recharged values."
            );
        }
        if config.cutoffs.electrostatic.switch_width.is_none() {
            warn!(
                cutoff = config.cutoffs.electrostatic.distance,
                "Electrostatics are truncated without a switching zone; forces jump at the cutoff."
            );
        }

        let backend = select_backend(config.backend)?;

        info!(
            particles = topology.len(),
            bonds = topology.bonds().len(),
            exclusions = topology.exclusions().len(),
            table = %table.metadata().name,
            debye_length = screening.debye_length(),
            relative_permittivity = screening.relative_permittivity(),
            backend = backend.name(),
            "Mpipi force initialized."
        );

        Ok(Self {
            pair_table,
            topology,
            config,
            screening,
            backend,
            neighbor_cache: RwLock::new(None),
            rebuilds: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn topology(&self) -> &ParticleTopology {
        &self.topology
    }

    pub fn pair_table(&self) -> &PairTable {
        &self.pair_table
    }

    pub fn screening(&self) -> &Screening {
        &self.screening
    }

    /// How many times the neighbor list has been (re)built.
    pub fn neighbor_list_rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }

    fn check_input(
        &self,
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
        residue_types: &[ResidueType],
    ) -> Result<(), EngineError> {
        let expected = self.topology.len();
        if positions.len() != expected || residue_types.len() != expected {
            return Err(EngineError::InconsistentInput(format!(
                "expected {expected} particles, got {} positions and {} residue types",
                positions.len(),
                residue_types.len()
            )));
        }
        if let Some((index, registered)) = self
            .topology
            .residue_types()
            .zip(residue_types)
            .enumerate()
            .find_map(|(index, (registered, given))| {
                (registered != *given).then_some((index, registered))
            })
        {
            return Err(EngineError::InconsistentInput(format!(
                "particle {index} was registered as {registered} but is now {}",
                residue_types[index]
            )));
        }
        if let Some(index) = positions
            .iter()
            .position(|p| !p.coords.iter().all(|x| x.is_finite()))
        {
            return Err(EngineError::InconsistentInput(format!(
                "position of particle {index} is not finite"
            )));
        }
        if let Some(pbc) = periodic_box {
            let range = self.config.interaction_range();
            if pbc.min_length() < 2.0 * range {
                return Err(EngineError::BoxTooSmall {
                    min_length: pbc.min_length(),
                    range,
                });
            }
        }
        Ok(())
    }

    fn neighbor_list(
        &self,
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
    ) -> Result<Arc<NeighborList>, EngineError> {
        let poisoned = || EngineError::Internal("neighbor list lock poisoned".to_string());
        {
            let cache = self.neighbor_cache.read().map_err(|_| poisoned())?;
            if let Some(list) = cache.as_ref().filter(|l| !l.needs_rebuild(positions, periodic_box)) {
                return Ok(Arc::clone(list));
            }
        }

        let mut cache = self.neighbor_cache.write().map_err(|_| poisoned())?;
        if let Some(list) = cache.as_ref().filter(|l| !l.needs_rebuild(positions, periodic_box)) {
            return Ok(Arc::clone(list));
        }
        let list = Arc::new(NeighborList::build(
            positions,
            periodic_box,
            self.config.interaction_range(),
            self.config.neighbor_list.skin,
            self.topology.exclusions(),
            self.config.neighbor_list.strategy,
        ));
        let rebuilds = self.rebuilds.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(pairs = list.pairs().len(), rebuilds, "Neighbor list rebuilt.");
        *cache = Some(Arc::clone(&list));
        Ok(list)
    }
}

impl ForceProvider for MpipiForce {
    fn particle_count(&self) -> usize {
        self.topology.len()
    }

    #[instrument(skip_all, name = "mpipi_force_compute")]
    fn compute(
        &self,
        positions: &[Point3<f64>],
        periodic_box: Option<&PeriodicBox>,
        residue_types: &[ResidueType],
    ) -> Result<EnergyForceResult, EngineError> {
        self.check_input(positions, periodic_box, residue_types)?;
        let neighbors = self.neighbor_list(positions, periodic_box)?;

        let evaluator = PairEvaluator::new(&self.pair_table, self.config.cutoffs, self.screening)
            .with_scaling(self.config.globular_scaling())
            .with_min_distance(self.config.min_distance);
        let context = EvaluationContext {
            evaluator,
            particles: self.topology.particles(),
            positions,
            periodic_box,
        };

        let nonbonded = self.backend.evaluate(neighbors.pairs(), &context)?;
        let bonded = self.backend.evaluate_bonds(self.topology.bonds(), &context)?;

        let mut accumulator = Accumulator::new(positions.len());
        accumulator.extend(&nonbonded);
        accumulator.extend(&bonded);
        Ok(accumulator.finish())
    }
}

/// Names the pair with the widest Wang-Frenkel range, for error reporting.
fn longest_range_pair(
    table: &ParameterTable,
    topology: &ParticleTopology,
) -> Result<String, EngineError> {
    let mut types: Vec<ResidueType> = topology.residue_types().collect();
    types.sort_unstable();
    types.dedup();

    let mut widest = None;
    for (n, &a) in types.iter().enumerate() {
        for &b in &types[n..] {
            let range = table.resolve(a, b)?.wf_cutoff();
            if widest.is_none_or(|(_, _, best)| range > best) {
                widest = Some((a, b, range));
            }
        }
    }
    Ok(widest.map_or_else(String::new, |(a, b, _)| format!("{a}-{b}")))
}
