use phf::{Map, phf_map};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResidueType {
    // --- Aliphatic, Nonpolar ---
    Alanine,
    Glycine,
    Isoleucine,
    Leucine,
    Proline,
    Valine,

    // --- Aromatic ---
    Phenylalanine,
    Tryptophan,
    Tyrosine,

    // --- Polar, Uncharged ---
    Asparagine,
    Cysteine,
    Glutamine,
    Serine,
    Threonine,
    Methionine,

    // --- Charged ---
    Arginine,
    Lysine,
    AsparticAcid,
    GlutamicAcid,
    Histidine,

    // --- RNA Nucleotides ---
    Adenine,
    Cytosine,
    Guanine,
    Uracil,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown residue code '{0}'")]
pub struct ParseResidueTypeError(pub String);

static RESIDUE_CODES: Map<&'static str, ResidueType> = phf_map! {
    // Mpipi particle names, as they appear in coarse-grained topologies.
    "pA" => ResidueType::Alanine, "pG" => ResidueType::Glycine,
    "pI" => ResidueType::Isoleucine, "pL" => ResidueType::Leucine,
    "pP" => ResidueType::Proline, "pV" => ResidueType::Valine,
    "pF" => ResidueType::Phenylalanine, "pW" => ResidueType::Tryptophan,
    "pY" => ResidueType::Tyrosine, "pN" => ResidueType::Asparagine,
    "pC" => ResidueType::Cysteine, "pQ" => ResidueType::Glutamine,
    "pS" => ResidueType::Serine, "pT" => ResidueType::Threonine,
    "pM" => ResidueType::Methionine, "pR" => ResidueType::Arginine,
    "pK" => ResidueType::Lysine, "pD" => ResidueType::AsparticAcid,
    "pE" => ResidueType::GlutamicAcid, "pH" => ResidueType::Histidine,
    "rA" => ResidueType::Adenine, "rC" => ResidueType::Cytosine,
    "rG" => ResidueType::Guanine, "rU" => ResidueType::Uracil,
    // Three-letter residue names.
    "ALA" => ResidueType::Alanine, "GLY" => ResidueType::Glycine,
    "ILE" => ResidueType::Isoleucine, "LEU" => ResidueType::Leucine,
    "PRO" => ResidueType::Proline, "VAL" => ResidueType::Valine,
    "PHE" => ResidueType::Phenylalanine, "TRP" => ResidueType::Tryptophan,
    "TYR" => ResidueType::Tyrosine, "ASN" => ResidueType::Asparagine,
    "CYS" => ResidueType::Cysteine, "GLN" => ResidueType::Glutamine,
    "SER" => ResidueType::Serine, "THR" => ResidueType::Threonine,
    "MET" => ResidueType::Methionine, "ARG" => ResidueType::Arginine,
    "LYS" => ResidueType::Lysine, "ASP" => ResidueType::AsparticAcid,
    "GLU" => ResidueType::GlutamicAcid, "HIS" => ResidueType::Histidine,
    "HSE" => ResidueType::Histidine, "HSD" => ResidueType::Histidine,
};

impl ResidueType {
    pub const COUNT: usize = 24;

    pub const ALL: [ResidueType; Self::COUNT] = [
        Self::Alanine,
        Self::Glycine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Proline,
        Self::Valine,
        Self::Phenylalanine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Asparagine,
        Self::Cysteine,
        Self::Glutamine,
        Self::Serine,
        Self::Threonine,
        Self::Methionine,
        Self::Arginine,
        Self::Lysine,
        Self::AsparticAcid,
        Self::GlutamicAcid,
        Self::Histidine,
        Self::Adenine,
        Self::Cytosine,
        Self::Guanine,
        Self::Uracil,
    ];

    /// Dense index in `0..COUNT`, stable across runs.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The Mpipi particle name (`pK`, `rU`, ...).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Alanine => "pA",
            Self::Glycine => "pG",
            Self::Isoleucine => "pI",
            Self::Leucine => "pL",
            Self::Proline => "pP",
            Self::Valine => "pV",
            Self::Phenylalanine => "pF",
            Self::Tryptophan => "pW",
            Self::Tyrosine => "pY",
            Self::Asparagine => "pN",
            Self::Cysteine => "pC",
            Self::Glutamine => "pQ",
            Self::Serine => "pS",
            Self::Threonine => "pT",
            Self::Methionine => "pM",
            Self::Arginine => "pR",
            Self::Lysine => "pK",
            Self::AsparticAcid => "pD",
            Self::GlutamicAcid => "pE",
            Self::Histidine => "pH",
            Self::Adenine => "rA",
            Self::Cytosine => "rC",
            Self::Guanine => "rG",
            Self::Uracil => "rU",
        }
    }

    pub const fn is_nucleotide(self) -> bool {
        matches!(
            self,
            Self::Adenine | Self::Cytosine | Self::Guanine | Self::Uracil
        )
    }
}

impl FromStr for ResidueType {
    type Err = ParseResidueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RESIDUE_CODES
            .get(trimmed)
            .or_else(|| RESIDUE_CODES.get(trimmed.to_ascii_uppercase().as_str()))
            .copied()
            .ok_or_else(|| ParseResidueTypeError(trimmed.to_string()))
    }
}

impl fmt::Display for ResidueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ResidueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}
