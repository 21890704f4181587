use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    pub dispersion: f64,
    pub electrostatic: f64,
    pub bonded: f64,
}

impl EnergyTerm {
    pub fn new(dispersion: f64, electrostatic: f64, bonded: f64) -> Self {
        Self {
            dispersion,
            electrostatic,
            bonded,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.dispersion + self.electrostatic + self.bonded
    }

    #[inline]
    pub fn nonbonded(&self) -> f64 {
        self.dispersion + self.electrostatic
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            dispersion: self.dispersion + rhs.dispersion,
            electrostatic: self.electrostatic + rhs.electrostatic,
            bonded: self.bonded + rhs.bonded,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.dispersion += rhs.dispersion;
        self.electrostatic += rhs.electrostatic;
        self.bonded += rhs.bonded;
    }
}

impl Sum for EnergyTerm {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, term| acc + term)
    }
}
