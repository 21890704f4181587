#![allow(dead_code)]

use mpipi::core::models::residue::ResidueType;
use mpipi::core::utils::geometry::{PeriodicBox, displacement};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random points in `[0, extent)³` no closer than `min_separation` to each other.
pub fn random_positions(
    n: usize,
    extent: f64,
    min_separation: f64,
    periodic_box: Option<&PeriodicBox>,
    seed: u64,
) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(n);
    while positions.len() < n {
        let candidate = Point3::new(
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
        );
        let clear = positions.iter().all(|p| {
            displacement(&candidate, p, periodic_box).norm() >= min_separation
        });
        if clear {
            positions.push(candidate);
        }
    }
    positions
}

pub fn random_residue_types(n: usize, seed: u64) -> Vec<ResidueType> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| *ResidueType::ALL.choose(&mut rng).unwrap_or(&ResidueType::Glycine))
        .collect()
}

/// A random protein sequence with a generous share of charged residues.
pub fn random_protein(n: usize, seed: u64) -> Vec<ResidueType> {
    use ResidueType::*;
    let pool = [
        Arginine, Lysine, AsparticAcid, GlutamicAcid, Tyrosine, Glycine, Serine, Phenylalanine,
    ];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| pool[rng.gen_range(0..pool.len())])
        .collect()
}

/// Points along a helix with consecutive spacing close to `spacing`.
pub fn helix(n: usize, spacing: f64, origin: Point3<f64>) -> Vec<Point3<f64>> {
    let radius = 0.25;
    let turn = 1.6_f64;
    let rise = (spacing * spacing - (2.0 * radius * (turn / 2.0).sin()).powi(2)).max(0.0).sqrt();
    (0..n)
        .map(|i| {
            let t = i as f64 * turn;
            origin + nalgebra::Vector3::new(radius * t.cos(), radius * t.sin(), rise * i as f64)
        })
        .collect()
}
