//! # Mpipi Core Library
//!
//! A high-performance implementation of the Mpipi-Recharged residue-level coarse-grained
//! potential, used to drive molecular dynamics of intrinsically disordered proteins and
//! nucleic acids (for example in studies of liquid-liquid phase separation).
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ResidueType`, `Particle`),
//!   the parameter table, and the pure mathematical forms of the potential
//!   (`potentials`, `screening`).
//!
//! - **[`engine`]: The Logic Core.** Configuration, neighbor enumeration (all-pairs,
//!   cell lists and the cached Verlet list), interchangeable compute backends and the
//!   deterministic force accumulator.
//!
//! - **[`host`]: The Public API.** The host binding layer a simulation driver calls once
//!   per integration step: positions in, total energy and per-particle forces out.
//!
//! Units follow the OpenMM conventions: nm, kJ/mol, e, K and mM.

pub mod core;
pub mod engine;
pub mod host;
