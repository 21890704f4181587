//! Residue-level particle models.
//!
//! One simulation particle represents a whole amino acid or nucleotide. The
//! [`residue::ResidueType`] enumeration is closed: every particle must map onto one of
//! its variants, and unknown codes are rejected while parsing.

pub mod particle;
pub mod residue;
