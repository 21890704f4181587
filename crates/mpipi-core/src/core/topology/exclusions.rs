use super::TopologyError;
use std::collections::{HashSet, VecDeque};

/// Unordered particle pairs that do not interact through the nonbonded terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    pairs: HashSet<(usize, usize)>,
}

#[inline]
fn ordered(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}

fn check_pair(i: usize, j: usize, particle_count: usize) -> Result<(), TopologyError> {
    for index in [i, j] {
        if index >= particle_count {
            return Err(TopologyError::IndexOutOfRange {
                index,
                count: particle_count,
            });
        }
    }
    if i == j {
        return Err(TopologyError::SelfPair(i));
    }
    Ok(())
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I, particle_count: usize) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut set = Self::new();
        for (i, j) in pairs {
            check_pair(i, j, particle_count)?;
            set.pairs.insert(ordered(i, j));
        }
        Ok(set)
    }

    /// Excludes every pair separated by at most `depth` bonds. A depth of 1 excludes
    /// directly bonded pairs only; 0 excludes nothing.
    pub fn from_bonds<I>(bonds: I, particle_count: usize, depth: usize) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut adjacency = vec![Vec::new(); particle_count];
        for (i, j) in bonds {
            check_pair(i, j, particle_count)?;
            adjacency[i].push(j);
            adjacency[j].push(i);
        }

        let mut set = Self::new();
        if depth == 0 {
            return Ok(set);
        }
        let mut distance = vec![usize::MAX; particle_count];
        let mut visited = Vec::new();
        let mut queue = VecDeque::new();
        for start in 0..particle_count {
            if adjacency[start].is_empty() {
                continue;
            }
            distance[start] = 0;
            visited.push(start);
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                if distance[current] == depth {
                    continue;
                }
                for &next in &adjacency[current] {
                    if distance[next] == usize::MAX {
                        distance[next] = distance[current] + 1;
                        visited.push(next);
                        queue.push_back(next);
                        if start < next {
                            set.pairs.insert((start, next));
                        }
                    }
                }
            }
            for index in visited.drain(..) {
                distance[index] = usize::MAX;
            }
        }
        Ok(set)
    }

    pub fn extend(&mut self, other: &ExclusionSet) {
        self.pairs.extend(other.pairs.iter().copied());
    }

    #[inline]
    pub fn is_excluded(&self, i: usize, j: usize) -> bool {
        self.pairs.contains(&ordered(i, j))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Largest particle index mentioned by any pair.
    pub fn max_index(&self) -> Option<usize> {
        self.pairs.iter().map(|&(_, j)| j).max()
    }

    /// The pairs as `(i, j)`, `i < j`, in ascending order.
    pub fn sorted_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<_> = self.pairs.iter().copied().collect();
        pairs.sort_unstable();
        pairs
    }
}
