//! # Host Binding Layer
//!
//! The surface a molecular dynamics engine calls once per integration step. An
//! [`force::MpipiForce`] is configured once with a parameter table, a particle topology and
//! a [`ModelConfig`](crate::engine::config::ModelConfig); afterwards every call hands in
//! positions and gets back the total energy and per-particle forces.
//!
//! ```ignore
//! use mpipi::host::force::{ForceProvider, MpipiForce};
//!
//! let force = MpipiForce::new(&table, topology, ModelConfig::default())?;
//! let result = force.compute(&positions, Some(&periodic_box), &residue_types)?;
//! ```

pub mod force;
