use log::trace;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::closure::{is_candidate_key, is_superkey};
use crate::model::{AttributeSet, CandidateKey, FunctionalDependency};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneratorStats {
    pub n_key_attempts: usize,
    pub n_basic: usize,
    pub n_augmented: usize,
    pub n_rejected_augmentations: usize,
    pub n_split: usize,
    pub n_rejected_splits: usize,
    pub n_cross_referenced: usize,
    pub n_rejected_cross_references: usize,
    pub n_redundant: usize,
    pub n_rejected_redundant: usize,
    pub n_cycles: usize,
    pub n_rejected_cycles: usize,
    pub n_duplicates_removed: usize,
}

pub struct DependencyGeneratorState {
    pub universe: AttributeSet,
    pub candidate_keys: Vec<CandidateKey>,
    pub dependencies: Vec<FunctionalDependency>,
    pub rng: StdRng,
    pub seed: u64,
    pub stats: GeneratorStats,
}

impl DependencyGeneratorState {
    pub(crate) fn new(universe: AttributeSet, seed: u64) -> Self {
        Self {
            universe,
            candidate_keys: Vec::new(),
            dependencies: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            stats: GeneratorStats::default(),
        }
    }

    /// Every planted key still reaches the whole universe and has no redundant member.
    pub fn keys_remain_valid(&self, dependencies: &[FunctionalDependency]) -> bool {
        self.candidate_keys
            .iter()
            .all(|key| is_candidate_key(dependencies, key, &self.universe))
    }

    pub fn is_superkey(&self, dependencies: &[FunctionalDependency], set: &AttributeSet) -> bool {
        is_superkey(dependencies, set, &self.universe)
    }

    /// Current dependencies with the one at `idx` swapped for `replacement`.
    pub fn with_replacement(
        &self,
        idx: usize,
        replacement: Vec<FunctionalDependency>,
    ) -> Vec<FunctionalDependency> {
        let mut trial = Vec::with_capacity(self.dependencies.len() + replacement.len());
        trial.extend_from_slice(&self.dependencies[..idx]);
        trial.extend(replacement);
        trial.extend_from_slice(&self.dependencies[idx + 1..]);
        trial
    }

    pub fn with_addition(&self, fd: FunctionalDependency) -> Vec<FunctionalDependency> {
        let mut trial = self.dependencies.clone();
        trial.push(fd);
        trial
    }

    /// Swap in `replacement` for the dependency at `idx` if the planted keys survive it.
    pub fn try_replace(&mut self, idx: usize, replacement: Vec<FunctionalDependency>) -> bool {
        let n_new = replacement.len();
        let trial = self.with_replacement(idx, replacement);
        if self.keys_remain_valid(&trial) {
            trace!(
                target: "dependency_generator",
                "Replacing {:?} with {:?}",
                self.dependencies[idx],
                &trial[idx..idx + n_new]
            );
            self.dependencies = trial;
            true
        } else {
            trace!(
                target: "dependency_generator",
                "Rejected replacement of {:?}; planted keys would break",
                self.dependencies[idx]
            );
            false
        }
    }

    /// `size` distinct attributes drawn from `set`
    pub fn random_subset(&mut self, set: &AttributeSet, size: usize) -> AttributeSet {
        let mut items = set.to_vec();
        items.shuffle(&mut self.rng);
        items.into_iter().take(size).collect()
    }

    pub fn non_key_attributes(&self, key: &AttributeSet) -> AttributeSet {
        self.universe.difference(key)
    }
}
