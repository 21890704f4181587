//! # Force Field Module
//!
//! The Mpipi-Recharged potential: per-residue and per-pair parameters, the analytic pair
//! potentials and the Debye-Hückel screening of electrostatics.
//!
//! ## Overview
//!
//! Every nonbonded pair interacts through two radial terms:
//!
//! - **Dispersion**: a Wang-Frenkel potential whose minimum equals `-ε` and which
//!   vanishes with zero slope at `rc = 3σ`
//! - **Electrostatics**: a screened Coulomb term `A·exp(-κr)/r` truncated at its own
//!   cutoff, optionally smoothed by a polynomial switch
//!
//! Bonded pairs contribute a harmonic term instead.
//!
//! ## Key Components
//!
//! - [`params`] - Parameter table, combining rules and the dense resolved pair table
//! - [`potentials`] - Closed-form energies and their radial derivatives
//! - [`screening`] - Debye length and screening factor
//! - [`cutoff`] - Per-term cutoffs and switching zones
//! - [`energy`] - Pair evaluator combining all of the above into energies and forces
//! - [`term`] - Per-term energy breakdown
//!
//! ```ignore
//! use mpipi::core::forcefield::energy::PairEvaluator;
//!
//! let evaluator = PairEvaluator::new(&pair_table, cutoffs, screening);
//! let interaction = evaluator.evaluate(i, j, &particles[i], &particles[j], delta)?;
//! ```

pub mod cutoff;
pub mod energy;
pub mod params;
pub mod potentials;
pub mod screening;
pub mod term;
