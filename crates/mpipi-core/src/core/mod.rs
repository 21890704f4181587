//! # Core Module
//!
//! The stateless foundation of the Mpipi engine: residue identities, the calibrated
//! parameter table, the analytic pair potentials and the bonded topology of a
//! coarse-grained system.
//!
//! - **Molecular Representation** ([`models`]) - Residue types and particles
//! - **Potential Model** ([`forcefield`]) - Parameters, pair potentials, screening
//! - **Connectivity** ([`topology`]) - Chain bonds, elastic networks and exclusions
//! - **Geometry** ([`utils`]) - Periodic boxes and minimum-image displacements

pub mod forcefield;
pub mod models;
pub mod topology;
pub mod utils;
