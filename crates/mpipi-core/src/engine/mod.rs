//! # Engine Module
//!
//! Turns a snapshot of particle positions into energies and forces: configuration,
//! neighbor enumeration, pair evaluation backends and accumulation.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Cutoffs, screening, neighbor-list and backend settings
//! - **Error Handling** ([`error`]) - Engine-level error type returned to hosts
//! - **Neighbor Enumeration** ([`neighbors`]) - All-pairs, cell-list and cached Verlet lists
//! - **Backends** ([`backend`]) - Serial and rayon-parallel pair evaluation
//! - **Accumulation** ([`accumulator`]) - Deterministic, order-preserving summation
//!
//! Backends may evaluate pairs in any order internally, but hand their contributions to
//! the accumulator in pair order, so results are reproducible bit for bit regardless of
//! the backend or thread count.

pub mod accumulator;
pub mod backend;
pub mod config;
pub mod error;
pub mod neighbors;
