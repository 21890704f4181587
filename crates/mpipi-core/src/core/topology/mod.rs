//! # Topology Module
//!
//! Connectivity of a coarse-grained system: which particles are bonded and which pairs
//! are removed from the nonbonded interaction.
//!
//! ## Overview
//!
//! Disordered regions are held together by harmonic chain bonds between consecutive
//! residues. Folded (globular) domains are instead held in their reference shape by an
//! elastic network of harmonic bonds between every pair of domain residues closer than
//! [`bonds::ENM_CUTOFF`]. Bonded pairs, and optionally pairs a few bonds apart, are
//! excluded from the Wang-Frenkel and Yukawa terms.
//!
//! ## Key Components
//!
//! - [`exclusions`] - The immutable set of excluded particle pairs
//! - [`bonds`] - Harmonic bonds and their energy
//! - [`builder`] - Chain-by-chain assembly of a [`builder::ParticleTopology`]
//!
//! ```ignore
//! use mpipi::core::topology::builder::TopologyBuilder;
//!
//! let mut builder = TopologyBuilder::new();
//! builder.add_chain(&sequence, &[(10..60).collect()])?;
//! let topology = builder.build(Some(&reference_positions))?;
//! ```

pub mod bonds;
pub mod builder;
pub mod exclusions;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Particle index {index} is out of range for {count} particles")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Particle {0} cannot be paired with itself")]
    SelfPair(usize),
    #[error("Chain {chain} mixes protein residues and nucleotides")]
    MixedChain { chain: usize },
    #[error("Residue {index} of chain {chain} belongs to more than one globular domain")]
    OverlappingDomains { chain: usize, index: usize },
    #[error("Globular domains require reference positions for all {expected} particles, got {found}")]
    MissingReferencePositions { expected: usize, found: usize },
    #[error("Invalid bond between {i} and {j}: {message}")]
    InvalidBond { i: usize, j: usize, message: String },
}
