mod common;

use approx::assert_relative_eq;
use mpipi::core::forcefield::params::ParameterTable;
use mpipi::core::forcefield::potentials;
use mpipi::core::forcefield::screening::{
    DEFAULT_RELATIVE_PERMITTIVITY, ELECTRIC_PREFACTOR, debye_length,
};
use mpipi::core::models::residue::ResidueType::{self, *};
use mpipi::core::topology::builder::{ParticleTopology, TopologyBuilder};
use mpipi::core::topology::exclusions::ExclusionSet;
use mpipi::core::utils::geometry::PeriodicBox;
use mpipi::engine::config::{BackendKind, ModelConfig, ModelConfigBuilder, NeighborListConfig};
use mpipi::engine::error::EngineError;
use mpipi::engine::neighbors::NeighborStrategy;
use mpipi::host::force::{ForceProvider, MpipiForce};
use nalgebra::{Point3, Vector3};

fn placeholder() -> ParameterTable {
    ParameterTable::placeholder().unwrap()
}

fn disordered_chain(residues: &[ResidueType]) -> ParticleTopology {
    let mut builder = TopologyBuilder::new();
    builder.add_chain(residues, &[]).unwrap();
    builder.build(None).unwrap()
}

#[test]
fn opposite_charges_below_sigma_match_analytic_value() {
    let force = MpipiForce::new(
        &placeholder(),
        ParticleTopology::from_residue_types([Arginine, GlutamicAcid]),
        ModelConfig::default(),
    )
    .unwrap();
    let r = 0.5;
    let positions = [Point3::origin(), Point3::new(0.0, 0.0, r)];
    let result = force.compute(&positions, None, &[Arginine, GlutamicAcid]).unwrap();

    let table = placeholder();
    let arg = table.single(Arginine).unwrap();
    let glu = table.single(GlutamicAcid).unwrap();
    let sigma = 0.5 * (arg.sigma + glu.sigma);
    let epsilon = (arg.epsilon * glu.epsilon).sqrt();
    assert!(r < sigma);

    let wf = potentials::wang_frenkel(r, sigma, epsilon, 2);
    let lambda = debye_length(280.0, 150.0).unwrap();
    let amplitude = ELECTRIC_PREFACTOR * arg.charge * glu.charge / DEFAULT_RELATIVE_PERMITTIVITY;
    let yukawa = amplitude * (-r / lambda).exp() / r;
    let yukawa_slope = -yukawa * (1.0 / r + 1.0 / lambda);

    assert!(result.energy.dispersion > 0.0);
    assert!(result.energy.electrostatic < 0.0);
    assert_relative_eq!(result.energy.dispersion, wf.energy, max_relative = 1e-12);
    assert_relative_eq!(result.energy.electrostatic, yukawa, max_relative = 1e-12);
    assert_relative_eq!(result.total(), wf.energy + yukawa, max_relative = 1e-12);
    assert_relative_eq!(
        result.forces[1].z,
        -(wf.derivative + yukawa_slope),
        max_relative = 1e-10
    );
    assert_eq!(result.forces[0], -result.forces[1]);
}

#[test]
fn pairs_beyond_every_cutoff_contribute_exact_zero() {
    let force = MpipiForce::new(
        &placeholder(),
        ParticleTopology::from_residue_types([Arginine, GlutamicAcid]),
        ModelConfig::default(),
    )
    .unwrap();
    for r in [3.5, 3.6, 12.0] {
        let positions = [Point3::origin(), Point3::new(r, 0.0, 0.0)];
        let result = force.compute(&positions, None, &[Arginine, GlutamicAcid]).unwrap();
        assert_eq!(result.total(), 0.0);
        assert_eq!(result.forces, vec![Vector3::zeros(); 2]);
    }
}

#[test]
fn excluded_pairs_contribute_nothing() {
    let particles = ParticleTopology::from_residue_types([Arginine, GlutamicAcid]);
    let (particles, _, _) = particles.into_parts();
    let exclusions = ExclusionSet::from_pairs([(0, 1)], 2).unwrap();
    let topology = ParticleTopology::new(particles, Vec::new(), exclusions).unwrap();
    let force = MpipiForce::new(&placeholder(), topology, ModelConfig::default()).unwrap();

    let positions = [Point3::origin(), Point3::new(0.6, 0.0, 0.0)];
    let result = force.compute(&positions, None, &[Arginine, GlutamicAcid]).unwrap();
    assert_eq!(result.total(), 0.0);
    assert_eq!(result.forces, vec![Vector3::zeros(); 2]);
}

#[test]
fn unregistered_residue_type_yields_no_energy() {
    let mut partial = ParameterTable::new("protein-only", "1", Default::default());
    let table = placeholder();
    for residue in ResidueType::ALL.into_iter().filter(|r| !r.is_nucleotide()) {
        partial.register(residue, *table.single(residue).unwrap()).unwrap();
    }
    let topology = ParticleTopology::from_residue_types([Lysine, Uracil, Glycine]);
    let result = MpipiForce::new(&partial, topology, ModelConfig::default());
    assert!(matches!(result, Err(EngineError::UnknownResidueType(Uracil))));
}

#[test]
fn forces_sum_to_zero_and_obey_newtons_third_law() {
    let residues = common::random_protein(60, 1);
    let topology = disordered_chain(&residues);
    let force = MpipiForce::new(&placeholder(), topology, ModelConfig::default()).unwrap();
    let positions = common::helix(60, 0.381, Point3::new(1.0, 1.0, 1.0));

    let result = force.compute(&positions, None, &residues).unwrap();
    let scale = result.forces.iter().map(|f| f.norm()).fold(0.0, f64::max);
    assert!(scale > 0.0);
    assert!(result.net_force().norm() < 1e-10 * scale.max(1.0));
}

#[test]
fn forces_are_the_negative_energy_gradient() {
    let pbc = PeriodicBox::cubic(9.0).unwrap();
    let residues = common::random_residue_types(40, 2);
    let topology = ParticleTopology::from_residue_types(residues.iter().copied());
    let force = MpipiForce::new(&placeholder(), topology, ModelConfig::default()).unwrap();
    let positions = common::random_positions(40, 9.0, 0.45, Some(&pbc), 3);

    let result = force.compute(&positions, Some(&pbc), &residues).unwrap();
    let energy_at = |moved: &[Point3<f64>]| {
        force
            .compute(moved, Some(&pbc), &residues)
            .unwrap()
            .total()
    };

    let h = 1e-6;
    for particle in [0, 7, 19, 33] {
        for axis in 0..3 {
            let mut plus = positions.clone();
            let mut minus = positions.clone();
            plus[particle][axis] += h;
            minus[particle][axis] -= h;
            let numeric = -(energy_at(&plus) - energy_at(&minus)) / (2.0 * h);
            let analytic = result.forces[particle][axis];
            assert!(
                (numeric - analytic).abs() < 1e-4 * analytic.abs().max(1.0),
                "particle {particle}, axis {axis}: {numeric} vs {analytic}"
            );
        }
    }
}

#[test]
fn bonded_chain_forces_are_the_negative_energy_gradient() {
    let residues = common::random_protein(24, 4);
    let mut builder = TopologyBuilder::new();
    builder.add_chain(&residues, &[(8..16).collect()]).unwrap();
    let reference = common::helix(24, 0.381, Point3::origin());
    let topology = builder.build(Some(&reference[..])).unwrap();
    assert!(topology.bonds().len() > 23);
    let force = MpipiForce::new(&placeholder(), topology, ModelConfig::default()).unwrap();

    let positions: Vec<_> = reference
        .iter()
        .enumerate()
        .map(|(i, p)| p + Vector3::new(0.01 * (i as f64).sin(), 0.02 * (i as f64).cos(), 0.0))
        .collect();
    let result = force.compute(&positions, None, &residues).unwrap();
    assert!(result.energy.bonded > 0.0);

    let h = 1e-6;
    for particle in [0, 5, 11, 23] {
        for axis in 0..3 {
            let mut plus = positions.clone();
            let mut minus = positions.clone();
            plus[particle][axis] += h;
            minus[particle][axis] -= h;
            let e_plus = force.compute(&plus, None, &residues).unwrap().total();
            let e_minus = force.compute(&minus, None, &residues).unwrap().total();
            let numeric = -(e_plus - e_minus) / (2.0 * h);
            let analytic = result.forces[particle][axis];
            assert!(
                (numeric - analytic).abs() < 1e-4 * analytic.abs().max(1.0),
                "particle {particle}, axis {axis}: {numeric} vs {analytic}"
            );
        }
    }
}

fn with_strategy(strategy: NeighborStrategy, backend: BackendKind) -> ModelConfig {
    ModelConfigBuilder::new()
        .neighbor_list(NeighborListConfig {
            strategy,
            ..NeighborListConfig::default()
        })
        .backend(backend)
        .build()
        .unwrap()
}

#[test]
fn neighbor_strategies_produce_identical_results() {
    let pbc = PeriodicBox::cubic(12.0).unwrap();
    let residues = common::random_residue_types(300, 5);
    let positions = common::random_positions(300, 12.0, 0.4, Some(&pbc), 6);
    let topology = ParticleTopology::from_residue_types(residues.iter().copied());

    let reference = MpipiForce::new(
        &placeholder(),
        topology.clone(),
        with_strategy(NeighborStrategy::AllPairs, BackendKind::Serial),
    )
    .unwrap()
    .compute(&positions, Some(&pbc), &residues)
    .unwrap();
    assert!(reference.total() != 0.0);

    for strategy in [NeighborStrategy::CellList, NeighborStrategy::Auto] {
        let result = MpipiForce::new(
            &placeholder(),
            topology.clone(),
            with_strategy(strategy, BackendKind::Serial),
        )
        .unwrap()
        .compute(&positions, Some(&pbc), &residues)
        .unwrap();
        assert_eq!(result, reference, "{strategy:?}");
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_backend_is_bit_for_bit_identical_to_serial() {
    let pbc = PeriodicBox::cubic(10.0).unwrap();
    let residues = common::random_residue_types(200, 7);
    let positions = common::random_positions(200, 10.0, 0.4, Some(&pbc), 8);
    let topology = ParticleTopology::from_residue_types(residues.iter().copied());

    let serial = MpipiForce::new(
        &placeholder(),
        topology.clone(),
        with_strategy(NeighborStrategy::Auto, BackendKind::Serial),
    )
    .unwrap();
    let parallel = MpipiForce::new(
        &placeholder(),
        topology,
        with_strategy(NeighborStrategy::Auto, BackendKind::Parallel),
    )
    .unwrap();

    let expected = serial.compute(&positions, Some(&pbc), &residues).unwrap();
    for _ in 0..3 {
        assert_eq!(
            parallel.compute(&positions, Some(&pbc), &residues).unwrap(),
            expected
        );
    }
}

#[test]
fn repeated_calls_are_reproducible() {
    let residues = common::random_protein(80, 9);
    let topology = disordered_chain(&residues);
    let force = MpipiForce::new(&placeholder(), topology, ModelConfig::default()).unwrap();
    let positions = common::helix(80, 0.381, Point3::origin());

    let first = force.compute(&positions, None, &residues).unwrap();
    let second = force.compute(&positions, None, &residues).unwrap();
    assert_eq!(first, second);
}

#[test]
fn overlapping_particles_are_reported() {
    let force = MpipiForce::new(
        &placeholder(),
        ParticleTopology::from_residue_types([Lysine, Lysine, Serine]),
        ModelConfig::default(),
    )
    .unwrap();
    let positions = [
        Point3::origin(),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(2.0, 0.01, 0.0),
    ];
    let result = force.compute(&positions, None, &[Lysine, Lysine, Serine]);
    assert!(matches!(
        result,
        Err(EngineError::ParticleOverlap { i: 1, j: 2, .. })
    ));
}

#[test]
fn globular_pairs_interact_more_weakly() {
    let residues = [Tyrosine, Tyrosine];
    let positions = [Point3::origin(), Point3::new(0.75, 0.0, 0.0)];

    let free = MpipiForce::new(
        &placeholder(),
        ParticleTopology::from_residue_types(residues),
        ModelConfig::default(),
    )
    .unwrap()
        .compute(&positions, None, &residues)
        .unwrap();

    let mut builder = TopologyBuilder::new();
    builder.add_chain(&[Tyrosine], &[vec![0]]).unwrap();
    builder.add_chain(&[Tyrosine], &[vec![0]]).unwrap();
    let folded = MpipiForce::new(
        &placeholder(),
        builder.build(Some(&positions[..])).unwrap(),
        ModelConfig::default(),
    )
    .unwrap()
        .compute(&positions, None, &residues)
        .unwrap();

    assert!(free.energy.dispersion < 0.0);
    assert_relative_eq!(
        folded.energy.dispersion,
        0.7 * free.energy.dispersion,
        max_relative = 1e-12
    );
}
