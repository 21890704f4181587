use super::potentials::{self, RadialTerm};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CutoffError {
    #[error("Cutoff for {term} must be positive and finite, got {distance} nm")]
    InvalidDistance { term: &'static str, distance: f64 },
    #[error("Switching zone for {term} must lie strictly inside the cutoff: width {width} nm, cutoff {distance} nm")]
    SwitchOutsideCutoff {
        term: &'static str,
        width: f64,
        distance: f64,
    },
}

/// Cutoff of a single interaction term with an optional switching zone of width
/// `switch_width` ending at `distance`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TermCutoff {
    pub distance: f64,
    #[serde(default)]
    pub switch_width: Option<f64>,
}

impl TermCutoff {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            switch_width: None,
        }
    }

    pub fn switched(distance: f64, switch_width: f64) -> Self {
        Self {
            distance,
            switch_width: Some(switch_width),
        }
    }

    pub fn validate(&self, term: &'static str) -> Result<(), CutoffError> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(CutoffError::InvalidDistance {
                term,
                distance: self.distance,
            });
        }
        if let Some(width) = self.switch_width {
            if !(width.is_finite() && width > 0.0 && width < self.distance) {
                return Err(CutoffError::SwitchOutsideCutoff {
                    term,
                    width,
                    distance: self.distance,
                });
            }
        }
        Ok(())
    }

    pub fn switch_start(&self) -> Option<f64> {
        self.switch_width.map(|width| self.distance - width)
    }

    #[inline]
    pub fn contains(&self, dist: f64) -> bool {
        dist < self.distance
    }

    /// Truncates `term` at the cutoff, smoothing it over the switching zone if one is set.
    #[inline]
    pub fn apply(&self, term: RadialTerm, dist: f64) -> RadialTerm {
        if dist >= self.distance {
            return RadialTerm::ZERO;
        }
        match self.switch_start() {
            Some(start) if dist > start => {
                term.modulated_by(potentials::switching(dist, start, self.distance))
            }
            _ => term,
        }
    }
}

/// Cutoffs of the dispersion (Wang-Frenkel) and electrostatic (Yukawa) terms.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CutoffConfiguration {
    pub dispersion: TermCutoff,
    pub electrostatic: TermCutoff,
}

impl Default for CutoffConfiguration {
    fn default() -> Self {
        Self {
            dispersion: TermCutoff::new(2.5),
            electrostatic: TermCutoff::switched(3.5, 0.5),
        }
    }
}

impl CutoffConfiguration {
    pub fn validate(&self) -> Result<(), CutoffError> {
        self.dispersion.validate("dispersion")?;
        self.electrostatic.validate("electrostatics")
    }

    /// Interaction range: the larger of the two cutoffs.
    pub fn max_distance(&self) -> f64 {
        self.dispersion.distance.max(self.electrostatic.distance)
    }
}
