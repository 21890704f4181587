/// Ratio between the Wang-Frenkel cutoff and the size parameter, `rc = 3σ`.
pub const WF_CUTOFF_RATIO: f64 = 3.0;

/// Energy of a radial term and its derivative with respect to the separation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RadialTerm {
    pub energy: f64,
    pub derivative: f64,
}

impl RadialTerm {
    pub const ZERO: Self = Self {
        energy: 0.0,
        derivative: 0.0,
    };

    #[inline]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            energy: self.energy * factor,
            derivative: self.derivative * factor,
        }
    }

    /// Product rule: `(U·S)' = U'·S + U·S'`.
    #[inline]
    pub fn modulated_by(self, modifier: RadialTerm) -> Self {
        Self {
            energy: self.energy * modifier.energy,
            derivative: self.derivative * modifier.energy + self.energy * modifier.derivative,
        }
    }
}

/// Normalisation that makes the Wang-Frenkel minimum equal `-ε` for `rc = 3σ`, `ν = 1`.
#[inline]
pub fn wang_frenkel_alpha(mu: u32) -> f64 {
    let ratio_2mu = WF_CUTOFF_RATIO.powi(2 * mu as i32);
    2.0 * ratio_2mu * (3.0 / (2.0 * (ratio_2mu - 1.0))).powi(3)
}

/// Position of the Wang-Frenkel minimum.
#[inline]
pub fn wang_frenkel_minimum(sigma: f64, mu: u32) -> f64 {
    let rc = WF_CUTOFF_RATIO * sigma;
    let ratio_2mu = WF_CUTOFF_RATIO.powi(2 * mu as i32);
    rc * (3.0 / (1.0 + 2.0 * ratio_2mu)).powf(1.0 / (2.0 * mu as f64))
}

/// `U = ε·α·((σ/r)^2μ - 1)·((rc/r)^2μ - 1)²` for `r < rc`, zero beyond.
///
/// Both the energy and its slope vanish at `rc`, so no switching is needed.
#[inline]
pub fn wang_frenkel(dist: f64, sigma: f64, epsilon: f64, mu: u32) -> RadialTerm {
    let rc = WF_CUTOFF_RATIO * sigma;
    if dist >= rc {
        return RadialTerm::ZERO;
    }
    let two_mu = 2 * mu as i32;
    let s = (sigma / dist).powi(two_mu);
    let c = (rc / dist).powi(two_mu);
    let prefactor = epsilon * wang_frenkel_alpha(mu);

    let energy = prefactor * (s - 1.0) * (c - 1.0) * (c - 1.0);
    let derivative = prefactor * (-(two_mu as f64) / dist)
        * (s * (c - 1.0) * (c - 1.0) + 2.0 * c * (s - 1.0) * (c - 1.0));
    RadialTerm { energy, derivative }
}

/// Bare Coulomb interaction `A / r` with prefactor `A = k_e·q_i·q_j / ε_r`.
#[inline]
pub fn coulomb(dist: f64, prefactor: f64) -> RadialTerm {
    let energy = prefactor / dist;
    RadialTerm {
        energy,
        derivative: -energy / dist,
    }
}

/// Polynomial switch `S(x) = 1 - 10x³ + 15x⁴ - 6x⁵`, `x = (r - r_sw) / (r_c - r_sw)`.
///
/// `S` is one below `switch_start`, zero at `cutoff`, and has zero slope at both ends.
#[inline]
pub fn switching(dist: f64, switch_start: f64, cutoff: f64) -> RadialTerm {
    if dist <= switch_start {
        return RadialTerm {
            energy: 1.0,
            derivative: 0.0,
        };
    }
    if dist >= cutoff {
        return RadialTerm::ZERO;
    }
    let width = cutoff - switch_start;
    let x = (dist - switch_start) / width;
    let x2 = x * x;
    let x3 = x2 * x;
    RadialTerm {
        energy: 1.0 - 10.0 * x3 + 15.0 * x3 * x - 6.0 * x3 * x2,
        derivative: (-30.0 * x2 + 60.0 * x3 - 30.0 * x3 * x) / width,
    }
}

/// `U = ½k(r - r0)²`.
#[inline]
pub fn harmonic(dist: f64, length: f64, k: f64) -> RadialTerm {
    let stretch = dist - length;
    RadialTerm {
        energy: 0.5 * k * stretch * stretch,
        derivative: k * stretch,
    }
}
