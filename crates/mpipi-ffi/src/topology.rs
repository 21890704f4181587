use crate::status::{self, MpipiStatus, invalid_argument, report};
use mpipi::core::models::particle::Particle;
use mpipi::core::models::residue::ResidueType;
use mpipi::core::topology::builder::{ParticleTopology, TopologyBuilder};
use mpipi::core::topology::exclusions::ExclusionSet;
use mpipi::engine::error::EngineError;
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::ffi::{CStr, c_char};
use std::slice;

/// Particles and connectivity handed to `mpipi_force_create`.
///
/// With `chain_count == 0` every particle is unbonded and a non-negative domain id only
/// marks it globular. Otherwise consecutive runs of `chain_lengths` residues form
/// chains: neighbors are bonded unless both are globular, and residues of one chain
/// sharing a domain id are joined by an elastic network built from
/// `reference_positions`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MpipiTopology {
    /// `particle_count` NUL-terminated residue codes.
    pub residue_codes: *const *const c_char,
    pub particle_count: usize,
    /// `chain_count` lengths summing to `particle_count`. Null when `chain_count` is 0.
    pub chain_lengths: *const usize,
    pub chain_count: usize,
    /// One id per particle, negative for disordered residues. May be null.
    pub domain_ids: *const i32,
    /// `3 * particle_count` reference coordinates (nm). Required when a chain has a
    /// globular domain, otherwise may be null.
    pub reference_positions: *const f64,
    /// `exclusion_count` extra index pairs, flattened.
    pub exclusions: *const usize,
    pub exclusion_count: usize,
}

unsafe fn required_slice<'a, T>(
    ptr: *const T,
    len: usize,
    name: &str,
) -> Result<&'a [T], MpipiStatus> {
    if len == 0 {
        Ok(&[])
    } else if ptr.is_null() {
        Err(invalid_argument(format!("{name} is null")))
    } else {
        Ok(unsafe { slice::from_raw_parts(ptr, len) })
    }
}

unsafe fn optional_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    (!ptr.is_null() && len > 0).then(|| unsafe { slice::from_raw_parts(ptr, len) })
}

unsafe fn parse_residue_codes(
    codes: *const *const c_char,
    count: usize,
) -> Result<Vec<ResidueType>, MpipiStatus> {
    let codes = unsafe { required_slice(codes, count, "residue_codes") }?;
    codes
        .iter()
        .enumerate()
        .map(|(index, &code)| {
            if code.is_null() {
                return Err(invalid_argument(format!("residue code {index} is null")));
            }
            let text = unsafe { CStr::from_ptr(code) }.to_string_lossy();
            text.parse::<ResidueType>().map_err(|e| {
                status::set_last_error(format!("particle {index}: {e}"));
                MpipiStatus::UnknownResidueType
            })
        })
        .collect()
}

/// Groups chain-local residue indices by non-negative domain id.
fn chain_domains(ids: &[i32]) -> Vec<Vec<usize>> {
    let mut domains: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, &id) in ids.iter().enumerate().filter(|(_, id)| **id >= 0) {
        domains.entry(id).or_default().push(index);
    }
    domains.into_values().collect()
}

impl MpipiTopology {
    /// Decodes the description, bonding chains with `builder`.
    ///
    /// # Safety
    ///
    /// Every non-null pointer must be valid for the documented number of elements.
    pub(crate) unsafe fn decode(
        &self,
        mut builder: TopologyBuilder,
    ) -> Result<ParticleTopology, MpipiStatus> {
        let residue_types =
            unsafe { parse_residue_codes(self.residue_codes, self.particle_count) }?;
        let count = residue_types.len();
        let domain_ids = unsafe { optional_slice(self.domain_ids, count) };
        let pairs = unsafe { required_slice(self.exclusions, 2 * self.exclusion_count, "exclusions") }?;
        let pairs = pairs.chunks_exact(2).map(|pair| (pair[0], pair[1]));
        let chain_lengths =
            unsafe { required_slice(self.chain_lengths, self.chain_count, "chain_lengths") }?;

        if chain_lengths.is_empty() {
            let particles = residue_types
                .iter()
                .enumerate()
                .map(|(index, &residue_type)| match domain_ids {
                    Some(ids) if ids[index] >= 0 => Particle::globular(residue_type),
                    _ => Particle::new(residue_type),
                })
                .collect();
            let exclusions =
                ExclusionSet::from_pairs(pairs, count).map_err(|e| report(&e.into()))?;
            return ParticleTopology::new(particles, Vec::new(), exclusions)
                .map_err(|e| report(&e.into()));
        }

        let total = chain_lengths
            .iter()
            .try_fold(0usize, |sum, &length| sum.checked_add(length));
        if total != Some(count) {
            return Err(report(&EngineError::InconsistentInput(format!(
                "chain lengths do not add up to {count} particles"
            ))));
        }

        let mut start = 0;
        for &length in chain_lengths {
            let range = start..start + length;
            let domains = domain_ids.map_or_else(Vec::new, |ids| chain_domains(&ids[range.clone()]));
            builder
                .add_chain(&residue_types[range], &domains)
                .map_err(|e| report(&e.into()))?;
            start += length;
        }
        for (i, j) in pairs {
            builder.add_exclusion(i, j);
        }

        let reference: Option<Vec<Point3<f64>>> =
            unsafe { optional_slice(self.reference_positions, 3 * count) }.map(|coords| {
                coords
                    .chunks_exact(3)
                    .map(|c| Point3::new(c[0], c[1], c[2]))
                    .collect()
            });
        builder
            .build(reference.as_deref())
            .map_err(|e| report(&e.into()))
    }
}
