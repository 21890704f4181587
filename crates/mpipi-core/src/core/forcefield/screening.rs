//! Debye-Hückel screening of the electrostatic term.
//!
//! The screening factor `exp(-r/λ)` is a pure multiplicative modifier on the bare Coulomb
//! interaction, so the screening length can be re-derived for a new temperature or salt
//! concentration without touching the dispersion term. Temperature enters only through
//! the Debye length; the amplitude of the interaction is a fixed model constant.

use super::potentials::{self, RadialTerm};
use thiserror::Error;

/// Electrostatic conversion factor `1 / (4πε₀)` in kJ·nm/(mol·e²).
pub const ELECTRIC_PREFACTOR: f64 = 138.935_456;

/// Relative permittivity folded into the Coulomb amplitude of the model.
pub const DEFAULT_RELATIVE_PERMITTIVITY: f64 = 80.0;

const AVOGADRO_PER_LITRE_TO_M3: f64 = 6.022e26;
const BJERRUM_NUMERATOR: f64 = 1.671e-5;

#[derive(Debug, Error, PartialEq)]
pub enum ScreeningError {
    #[error("Temperature must be positive and finite, got {0} K")]
    InvalidTemperature(f64),
    #[error("Ionic strength must be positive and finite, got {0} mM")]
    InvalidIonicStrength(f64),
    #[error("Debye length must be positive and finite, got {0} nm")]
    InvalidDebyeLength(f64),
    #[error("Relative permittivity must be positive and finite, got {0}")]
    InvalidPermittivity(f64),
}

/// Empirical relative permittivity of water as a function of temperature (K).
pub fn water_relative_permittivity(temperature: f64) -> f64 {
    let t = temperature;
    5321.0 / t + 233.76 - 0.9297 * t + 0.001417 * t * t - 0.000_000_829_2 * t * t * t
}

/// Debye length (nm) of a monovalent salt solution at `temperature` (K) and
/// `ionic_strength` (mM).
pub fn debye_length(temperature: f64, ionic_strength: f64) -> Result<f64, ScreeningError> {
    if !(temperature.is_finite() && temperature > 0.0) {
        return Err(ScreeningError::InvalidTemperature(temperature));
    }
    if !(ionic_strength.is_finite() && ionic_strength > 0.0) {
        return Err(ScreeningError::InvalidIonicStrength(ionic_strength));
    }
    let ions_per_m3 = ionic_strength / 1000.0 * AVOGADRO_PER_LITRE_TO_M3;
    let permittivity = water_relative_permittivity(temperature);
    let bjerrum_m = BJERRUM_NUMERATOR / (permittivity * temperature);
    Ok((1.0 / (8.0 * std::f64::consts::PI * bjerrum_m * ions_per_m3)).sqrt() * 1e9)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screening {
    debye_length: f64,
    relative_permittivity: f64,
}

impl Screening {
    pub fn new(debye_length: f64, relative_permittivity: f64) -> Result<Self, ScreeningError> {
        if !(debye_length.is_finite() && debye_length > 0.0) {
            return Err(ScreeningError::InvalidDebyeLength(debye_length));
        }
        if !(relative_permittivity.is_finite() && relative_permittivity > 0.0) {
            return Err(ScreeningError::InvalidPermittivity(relative_permittivity));
        }
        Ok(Self {
            debye_length,
            relative_permittivity,
        })
    }

    /// Screening for a salt solution. The water permittivity at `temperature` sets the
    /// Debye length only; the amplitude keeps [`DEFAULT_RELATIVE_PERMITTIVITY`].
    pub fn from_conditions(temperature: f64, ionic_strength: f64) -> Result<Self, ScreeningError> {
        let debye = debye_length(temperature, ionic_strength)?;
        Self::new(debye, DEFAULT_RELATIVE_PERMITTIVITY)
    }

    pub fn debye_length(&self) -> f64 {
        self.debye_length
    }

    pub fn relative_permittivity(&self) -> f64 {
        self.relative_permittivity
    }

    #[inline]
    pub fn kappa(&self) -> f64 {
        self.debye_length.recip()
    }

    /// Amplitude `A` of the screened interaction for a charge product `q_i·q_j`.
    #[inline]
    pub fn prefactor(&self, charge_product: f64) -> f64 {
        ELECTRIC_PREFACTOR * charge_product / self.relative_permittivity
    }

    /// `exp(-κr)` and its derivative.
    #[inline]
    pub fn factor(&self, dist: f64) -> RadialTerm {
        let kappa = self.kappa();
        let energy = (-kappa * dist).exp();
        RadialTerm {
            energy,
            derivative: -kappa * energy,
        }
    }

    #[inline]
    pub fn factor_derivative(&self, dist: f64) -> f64 {
        self.factor(dist).derivative
    }

    /// Screens an already evaluated bare Coulomb term.
    #[inline]
    pub fn apply(&self, bare: RadialTerm, dist: f64) -> RadialTerm {
        bare.modulated_by(self.factor(dist))
    }

    /// `A·exp(-κr)/r` for a charge product.
    #[inline]
    pub fn screened_coulomb(&self, dist: f64, charge_product: f64) -> RadialTerm {
        self.apply(potentials::coulomb(dist, self.prefactor(charge_product)), dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn debye_length_at_reference_conditions() {
        let lambda = debye_length(280.0, 150.0).unwrap();
        assert_relative_eq!(lambda, 0.793_643_6, max_relative = 1e-6);
    }

    #[test]
    fn debye_length_shrinks_with_added_salt() {
        let low = debye_length(300.0, 50.0).unwrap();
        let high = debye_length(300.0, 500.0).unwrap();
        assert!(high < low);
        assert_relative_eq!(low / high, 10f64.sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn debye_length_rejects_non_physical_conditions() {
        assert_eq!(
            debye_length(0.0, 150.0),
            Err(ScreeningError::InvalidTemperature(0.0))
        );
        assert_eq!(
            debye_length(300.0, -1.0),
            Err(ScreeningError::InvalidIonicStrength(-1.0))
        );
    }

    #[test]
    fn water_permittivity_is_close_to_eighty_near_room_temperature() {
        assert_relative_eq!(water_relative_permittivity(300.0), 77.728_27, epsilon = 1e-4);
    }

    #[test]
    fn amplitude_does_not_depend_on_temperature() {
        let cold = Screening::from_conditions(280.0, 150.0).unwrap();
        let warm = Screening::from_conditions(320.0, 150.0).unwrap();
        assert_eq!(cold.prefactor(-0.5625), warm.prefactor(-0.5625));
        assert_relative_eq!(
            cold.prefactor(-0.5625),
            ELECTRIC_PREFACTOR * -0.5625 / DEFAULT_RELATIVE_PERMITTIVITY,
            max_relative = 1e-12
        );
        assert!(cold.debye_length() != warm.debye_length());
    }

    #[test]
    fn factor_is_one_at_contact_and_decays_by_e_per_debye_length() {
        let screening = Screening::new(0.8, 80.0).unwrap();
        assert_relative_eq!(screening.factor(0.0).energy, 1.0);
        assert_relative_eq!(
            screening.factor(0.8).energy,
            (-1.0f64).exp(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            screening.factor(0.8).derivative,
            -(-1.0f64).exp() / 0.8,
            max_relative = 1e-12
        );
    }

    #[test]
    fn screened_coulomb_matches_closed_form() {
        let screening = Screening::new(0.8, 80.0).unwrap();
        let r = 1.2;
        let qq = -0.5625;
        let a = ELECTRIC_PREFACTOR * qq / 80.0;
        let term = screening.screened_coulomb(r, qq);
        let expected = a * (-r / 0.8).exp() / r;
        assert_relative_eq!(term.energy, expected, max_relative = 1e-12);
        assert_relative_eq!(
            term.derivative,
            -expected * (1.0 / r + 1.0 / 0.8),
            max_relative = 1e-12
        );
    }

    #[test]
    fn new_rejects_invalid_lengths() {
        assert!(matches!(
            Screening::new(0.0, 80.0),
            Err(ScreeningError::InvalidDebyeLength(_))
        ));
        assert!(matches!(
            Screening::new(1.0, f64::INFINITY),
            Err(ScreeningError::InvalidPermittivity(_))
        ));
    }
}
