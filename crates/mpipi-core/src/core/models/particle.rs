use super::residue::ResidueType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Particle {
    pub residue_type: ResidueType,
    /// Whether the residue belongs to a folded (globular) domain. Dispersion between
    /// globular residues is scaled down, see [`GlobularScaling`].
    pub globular: bool,
}

impl Particle {
    pub fn new(residue_type: ResidueType) -> Self {
        Self {
            residue_type,
            globular: false,
        }
    }

    pub fn globular(residue_type: ResidueType) -> Self {
        Self {
            residue_type,
            globular: true,
        }
    }
}

pub const DEFAULT_GLOBULAR_FACTOR: f64 = 0.7;

/// Scale factor on the Wang-Frenkel term for pairs involving folded domains:
/// `both` when both residues are globular, `one` when exactly one is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobularScaling {
    pub both: f64,
    pub one: f64,
}

impl Default for GlobularScaling {
    fn default() -> Self {
        Self::from_factor(DEFAULT_GLOBULAR_FACTOR)
    }
}

impl GlobularScaling {
    /// Scaling with factor `both` for two globular residues and `sqrt(both)` for one.
    pub fn from_factor(both: f64) -> Self {
        Self {
            both,
            one: both.sqrt(),
        }
    }

    #[inline]
    pub fn factor(&self, a: &Particle, b: &Particle) -> f64 {
        match (a.globular, b.globular) {
            (true, true) => self.both,
            (true, false) | (false, true) => self.one,
            (false, false) => 1.0,
        }
    }
}
