//! C ABI for the Mpipi-Recharged force.
//!
//! Every fallible entry point returns an [`MpipiStatus`], runs inside
//! `catch_unwind` so panics never cross the boundary, and stores a
//! human-readable message retrievable with [`mpipi_last_error`] on failure.
//! Output buffers are only written on success.

pub mod logging;
pub mod status;
pub mod topology;

use mpipi::core::forcefield::params::ParameterTable;
use mpipi::core::models::residue::ResidueType;
use mpipi::core::utils::geometry::PeriodicBox;
use mpipi::engine::config::ModelConfig;
use mpipi::engine::error::EngineError;
use mpipi::host::force::{ForceProvider, MpipiForce};
use nalgebra::{Point3, Vector3};
use status::{MpipiStatus, catch_unwind, clear_last_error, invalid_argument, report};
use std::ffi::{CStr, c_char};
use std::path::{Path, PathBuf};
use std::slice;
use topology::MpipiTopology;
use tracing::debug;

/// Opaque handle owning a configured force and its residue assignment.
pub struct MpipiForceHandle {
    force: MpipiForce,
    residue_types: Vec<ResidueType>,
}

/// Energy decomposition written by [`mpipi_force_compute`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MpipiEnergyTerms {
    pub dispersion: f64,
    pub electrostatic: f64,
    pub bonded: f64,
}

unsafe fn optional_path(ptr: *const c_char, name: &str) -> Result<Option<PathBuf>, MpipiStatus> {
    if ptr.is_null() {
        return Ok(None);
    }
    let path = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| invalid_argument(format!("{name} is not valid UTF-8")))?;
    Ok(Some(PathBuf::from(path)))
}

fn load_inputs(
    params_path: &Path,
    pair_table_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(ParameterTable, ModelConfig), EngineError> {
    let mut table = ParameterTable::load(params_path)?;
    if let Some(path) = pair_table_path {
        let pairs = table.load_tabulated(path)?;
        debug!(pairs, path = %path.display(), "Tabulated pair parameters merged.");
    }
    let config = match config_path {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::default(),
    };
    Ok((table, config))
}

/// Creates a force for the particles described by `topology`.
///
/// `params_path` names the TOML parameter table and is required. `pair_table_path` may
/// name a tabulated 21x21 pair file merged on top of it. `config_path` may be null for
/// the default configuration; its `exclusion_depth` applies to the chains in
/// `topology`.
///
/// # Safety
///
/// Strings must be null or NUL-terminated, `topology` must point to a valid
/// [`MpipiTopology`] whose pointers are valid for their documented lengths, and
/// `out_handle` must be writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_force_create(
    params_path: *const c_char,
    pair_table_path: *const c_char,
    config_path: *const c_char,
    topology: *const MpipiTopology,
    out_handle: *mut *mut MpipiForceHandle,
) -> MpipiStatus {
    catch_unwind(|| {
        clear_last_error();
        if out_handle.is_null() {
            return invalid_argument("out_handle is null");
        }
        let setup = || -> Result<MpipiForceHandle, MpipiStatus> {
            let Some(params_path) = (unsafe { optional_path(params_path, "params_path") })?
            else {
                return Err(invalid_argument(
                    "params_path is null; a parameter table file is required",
                ));
            };
            let pair_table_path = unsafe { optional_path(pair_table_path, "pair_table_path") }?;
            let config_path = unsafe { optional_path(config_path, "config_path") }?;
            let Some(description) = (unsafe { topology.as_ref() }) else {
                return Err(invalid_argument("topology is null"));
            };

            let (table, config) = load_inputs(
                &params_path,
                pair_table_path.as_deref(),
                config_path.as_deref(),
            )
            .map_err(|e| report(&e))?;
            let topology = unsafe { description.decode(config.topology_builder()) }?;
            let residue_types = topology.residue_types().collect();
            let force = MpipiForce::new(&table, topology, config).map_err(|e| report(&e))?;
            Ok(MpipiForceHandle {
                force,
                residue_types,
            })
        };
        match setup() {
            Ok(handle) => {
                debug!(
                    particles = handle.residue_types.len(),
                    bonds = handle.force.topology().bonds().len(),
                    "Force handle created."
                );
                unsafe { *out_handle = Box::into_raw(Box::new(handle)) };
                MpipiStatus::Success
            }
            Err(status) => status,
        }
    })
}

/// Evaluates energy and forces for one snapshot.
///
/// `positions` and `out_forces` hold `3 * particle_count` values (x, y, z per particle,
/// nm and kJ/mol/nm). `box_lengths` is null for an open system or three edge lengths.
/// `out_terms` may be null.
///
/// # Safety
///
/// `handle` must come from [`mpipi_force_create`] and not have been freed; every
/// non-null pointer must be valid for the documented number of elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_force_compute(
    handle: *const MpipiForceHandle,
    positions: *const f64,
    particle_count: usize,
    box_lengths: *const f64,
    out_energy: *mut f64,
    out_forces: *mut f64,
    out_terms: *mut MpipiEnergyTerms,
) -> MpipiStatus {
    catch_unwind(|| {
        clear_last_error();
        let Some(handle) = (unsafe { handle.as_ref() }) else {
            return invalid_argument("handle is null");
        };
        if out_energy.is_null() || out_forces.is_null() {
            return invalid_argument("output pointers must not be null");
        }
        if particle_count > 0 && positions.is_null() {
            return invalid_argument("positions is null");
        }
        if particle_count != handle.residue_types.len() {
            return report(&EngineError::InconsistentInput(format!(
                "force was created for {} particles, got {particle_count}",
                handle.residue_types.len()
            )));
        }

        let coords: &[f64] = if particle_count == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(positions, 3 * particle_count) }
        };
        let points: Vec<Point3<f64>> = coords
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let periodic_box = if box_lengths.is_null() {
            None
        } else {
            let l = unsafe { slice::from_raw_parts(box_lengths, 3) };
            match PeriodicBox::new(Vector3::new(l[0], l[1], l[2])) {
                Some(pbc) => Some(pbc),
                None => return invalid_argument("box lengths must be positive and finite"),
            }
        };

        let result = match handle
            .force
            .compute(&points, periodic_box.as_ref(), &handle.residue_types)
        {
            Ok(result) => result,
            Err(e) => return report(&e),
        };

        unsafe {
            *out_energy = result.total();
            let forces = slice::from_raw_parts_mut(out_forces, 3 * particle_count);
            for (out, force) in forces.chunks_exact_mut(3).zip(&result.forces) {
                out.copy_from_slice(force.as_slice());
            }
            if let Some(terms) = out_terms.as_mut() {
                *terms = MpipiEnergyTerms {
                    dispersion: result.energy.dispersion,
                    electrostatic: result.energy.electrostatic,
                    bonded: result.energy.bonded,
                };
            }
        }
        MpipiStatus::Success
    })
}

/// Number of particles the force was created for, or 0 for a null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle from [`mpipi_force_create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_force_particle_count(handle: *const MpipiForceHandle) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |h| h.force.particle_count())
}

/// Number of chain and elastic-network bonds, or 0 for a null handle.
///
/// # Safety
///
/// `handle` must be null or a live handle from [`mpipi_force_create`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_force_bond_count(handle: *const MpipiForceHandle) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |h| h.force.topology().bonds().len())
}

/// Releases a handle. Null is ignored.
///
/// # Safety
///
/// `handle` must be null or a handle from [`mpipi_force_create`] that has not been
/// freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_force_free(handle: *mut MpipiForceHandle) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle) });
    }
}

/// Last error message of the calling thread, or null if the last call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn mpipi_last_error() -> *const c_char {
    status::last_error_ptr()
}

/// Installs the global logger. `verbosity` below 0 silences output; 0 warns, 1 info,
/// 2 debug, 3 and above trace. `log_file` may be null.
///
/// # Safety
///
/// `log_file` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn mpipi_init_logging(verbosity: i32, log_file: *const c_char) -> MpipiStatus {
    catch_unwind(|| {
        clear_last_error();
        let path = match unsafe { optional_path(log_file, "log_file") } {
            Ok(path) => path,
            Err(status) => return status,
        };
        match logging::setup_logging(verbosity, path.as_deref()) {
            Ok(()) => MpipiStatus::Success,
            Err(e) => {
                status::set_last_error(e.to_string());
                MpipiStatus::Configuration
            }
        }
    })
}
