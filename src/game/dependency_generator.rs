use std::collections::BTreeSet;

use itertools::Itertools;
use log::{debug, info, trace};
use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng, RngCore,
};

use super::dependency_generator_state::{DependencyGeneratorState, GeneratorStats};
use crate::errors::GenerationError;
use crate::model::{
    AttributeSet, CandidateKey, DependencySet, DifficultyProfile, FunctionalDependency,
    MAX_ATTRIBUTES,
};

/// Attempts per planted key before giving up on the profile.
pub const MAX_KEY_ATTEMPTS: usize = 100;
const AUGMENT_PROBABILITY: f64 = 0.5;
const SPLIT_PROBABILITY: f64 = 0.5;
/// Redundant dependencies added per key, as a share of the dependency target.
const REDUNDANT_SHARE: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct GeneratorResult {
    pub attributes: AttributeSet,
    pub candidate_keys: Vec<CandidateKey>,
    pub dependencies: DependencySet,
    /// Dependency count drawn from the profile; the final list may differ.
    pub n_dependencies: usize,
    pub seed: u64,
    pub stats: GeneratorStats,
}

/// Builds a dependency set over `universe_size` attributes whose planted
/// candidate keys are exactly as the profile asks for.
///
/// With the same `seed`, profile and size the output is identical. Without a
/// seed a fresh one is drawn and reported in the result.
pub fn generate_dependencies(
    universe_size: usize,
    profile: &DifficultyProfile,
    seed: Option<u64>,
) -> Result<GeneratorResult, GenerationError> {
    profile.validate()?;
    if universe_size == 0
        || universe_size > MAX_ATTRIBUTES
        || !profile.attribute_range().contains(&universe_size)
    {
        return Err(GenerationError::UniverseOutOfBounds {
            size: universe_size,
            min: profile.min_attributes.max(1),
            max: profile.max_attributes.min(MAX_ATTRIBUTES),
        });
    }

    let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
    let mut state = DependencyGeneratorState::new(AttributeSet::universe(universe_size), seed);
    let n_dependencies = state.rng.random_range(profile.dependency_range());

    info!(
        target: "dependency_generator",
        "Generating dependencies; profile: {:?}; attributes: {}; target: {}; seed: {}",
        profile.name,
        universe_size,
        n_dependencies,
        seed
    );

    plant_candidate_keys(&mut state, profile.candidate_keys)?;
    debug!(target: "dependency_generator", "Candidate keys: {:?}", state.candidate_keys);

    generate_basic_dependencies(&mut state, n_dependencies);
    debug!(target: "dependency_generator", "Basic: {:?}", state.dependencies);

    augment_dependencies(&mut state);
    debug!(target: "dependency_generator", "Augmented: {:?}", state.dependencies);

    split_transitive_dependencies(&mut state);
    cross_reference_dependencies(&mut state);
    debug!(target: "dependency_generator", "Transitive: {:?}", state.dependencies);

    if profile.redundant {
        add_redundant_dependencies(&mut state, n_dependencies);
        debug!(target: "dependency_generator", "Redundant: {:?}", state.dependencies);
    }

    if profile.cyclic {
        add_cyclic_dependencies(&mut state);
        debug!(target: "dependency_generator", "Cyclic: {:?}", state.dependencies);
    }

    let before = state.dependencies.len();
    let deduplicated: Vec<FunctionalDependency> = std::mem::take(&mut state.dependencies)
        .into_iter()
        .unique()
        .collect();
    state.dependencies = deduplicated;
    state.stats.n_duplicates_removed = before - state.dependencies.len();
    state.dependencies.shuffle(&mut state.rng);

    validate(&state)?;

    info!(
        target: "dependency_generator",
        "Generated {} dependencies. Stats: {:?}",
        state.dependencies.len(),
        state.stats
    );

    Ok(GeneratorResult {
        attributes: state.universe,
        candidate_keys: state.candidate_keys,
        dependencies: DependencySet::new(state.dependencies),
        n_dependencies,
        seed: state.seed,
        stats: state.stats,
    })
}

/// Plants `count` keys none of which contains another.
fn plant_candidate_keys(
    state: &mut DependencyGeneratorState,
    count: usize,
) -> Result<(), GenerationError> {
    for _ in 0..count {
        let key = generate_candidate_key(state).ok_or(GenerationError::InfeasibleProfile {
            requested: count,
            planted: state.candidate_keys.len(),
            attempts: MAX_KEY_ATTEMPTS,
        })?;
        state.candidate_keys.push(key);
    }
    Ok(())
}

fn generate_candidate_key(state: &mut DependencyGeneratorState) -> Option<AttributeSet> {
    let attributes = state.universe.to_vec();
    let n = attributes.len();
    for _ in 0..MAX_KEY_ATTEMPTS {
        state.stats.n_key_attempts += 1;
        // never more than about half the attributes
        let key_len = state
            .rng
            .random_range(1..=n.div_ceil(2))
            .max(n / 2)
            .max(1);
        let key: AttributeSet = attributes
            .choose_multiple(&mut state.rng, key_len)
            .copied()
            .collect();

        if state
            .candidate_keys
            .iter()
            .all(|existing| key.is_incomparable(existing))
        {
            return Some(key);
        }
        trace!(
            target: "dependency_generator",
            "Key {:?} overlaps planted keys {:?}",
            key,
            state.candidate_keys
        );
    }
    None
}

/// Each key gets its share of the target, spread over its non-key attributes
/// so every one of them is directly determined by the key.
fn generate_basic_dependencies(state: &mut DependencyGeneratorState, n_dependencies: usize) {
    let per_key = (n_dependencies / state.candidate_keys.len().max(1)).max(1);

    for key in state.candidate_keys.clone() {
        let mut non_key = state.non_key_attributes(&key).to_vec();
        non_key.shuffle(&mut state.rng);

        let mut remaining_fds = per_key;
        while !non_key.is_empty() {
            let group_size = non_key.len().div_ceil(remaining_fds.max(1));
            let dependent: AttributeSet = non_key.drain(..group_size).collect();
            remaining_fds = remaining_fds.saturating_sub(1);
            state
                .dependencies
                .push(FunctionalDependency::new(key.clone(), dependent));
            state.stats.n_basic += 1;
        }
    }
}

/// Drops attributes from determinants where the keys tolerate it.
fn augment_dependencies(state: &mut DependencyGeneratorState) {
    for idx in 0..state.dependencies.len() {
        let fd = state.dependencies[idx].clone();
        if fd.determinant.len() < 2 || !state.rng.random_bool(AUGMENT_PROBABILITY) {
            continue;
        }
        let size = state.rng.random_range(1..fd.determinant.len());
        let determinant = state.random_subset(&fd.determinant, size);
        let proposal = FunctionalDependency::new(determinant, fd.dependent.clone());

        if state.try_replace(idx, vec![proposal]) {
            state.stats.n_augmented += 1;
        } else {
            state.stats.n_rejected_augmentations += 1;
        }
    }
}

/// `X -> YZ` becomes `X -> Y` and `Y -> Z` for a random pivot `Y`.
fn split_transitive_dependencies(state: &mut DependencyGeneratorState) {
    let mut idx = 0;
    while idx < state.dependencies.len() {
        let fd = state.dependencies[idx].clone();
        if fd.dependent.len() > 1 && state.rng.random_bool(SPLIT_PROBABILITY) {
            if let Some(&pivot) = fd.dependent.to_vec().choose(&mut state.rng) {
                let first = FunctionalDependency::new(fd.determinant.clone(), AttributeSet::single(pivot));
                let second =
                    FunctionalDependency::new(AttributeSet::single(pivot), fd.dependent.without(&pivot));
                if state.try_replace(idx, vec![first, second]) {
                    state.stats.n_split += 1;
                    idx += 2;
                    continue;
                }
                state.stats.n_rejected_splits += 1;
            }
        }
        idx += 1;
    }
}

/// For `X -> Y` and `XZ -> W`, rewrite the second as `YZ -> W`.
fn cross_reference_dependencies(state: &mut DependencyGeneratorState) {
    let mut rewritten: BTreeSet<usize> = BTreeSet::new();
    for i in 0..state.dependencies.len() {
        for j in 0..state.dependencies.len() {
            if i == j || rewritten.contains(&i) || rewritten.contains(&j) {
                continue;
            }
            let first = &state.dependencies[i];
            let second = &state.dependencies[j];
            if !first.determinant.is_proper_subset(&second.determinant)
                || first.dependent.is_subset(&second.determinant)
            {
                continue;
            }

            let determinant = second
                .determinant
                .difference(&first.determinant)
                .union(&first.dependent);
            let proposal =
                FunctionalDependency::new(determinant, second.dependent.clone()).without_trivial_part();
            if proposal.dependent.is_empty() {
                continue;
            }

            if state.try_replace(j, vec![proposal]) {
                rewritten.insert(j);
                state.stats.n_cross_referenced += 1;
            } else {
                state.stats.n_rejected_cross_references += 1;
            }
        }
    }
}

/// Adds dependencies that mix key and non-key attributes on the left. None
/// of them may turn its own determinant into a superkey.
fn add_redundant_dependencies(state: &mut DependencyGeneratorState, n_dependencies: usize) {
    let per_key = ((n_dependencies as f64 * REDUNDANT_SHARE).floor() as usize).max(1);
    let universe_size = state.universe.len();

    for key in state.candidate_keys.clone() {
        let non_key = state.non_key_attributes(&key).to_vec();
        for _ in 0..per_key {
            let Some(&extra) = non_key.choose(&mut state.rng) else {
                break;
            };
            let determinant_size = state.rng.random_range(1..universe_size.max(2));
            let mut determinant = state.random_subset(&key, determinant_size - 1);
            determinant.insert(extra);

            let dependents = state
                .universe
                .difference(&determinant)
                .difference(&key)
                .to_vec();
            let Some(&dependent) = dependents.choose(&mut state.rng) else {
                state.stats.n_rejected_redundant += 1;
                continue;
            };

            let proposal = FunctionalDependency::new(determinant.clone(), AttributeSet::single(dependent));
            let trial = state.with_addition(proposal);
            if state.keys_remain_valid(&trial) && !state.is_superkey(&trial, &determinant) {
                state.dependencies = trial;
                state.stats.n_redundant += 1;
            } else {
                trace!(
                    target: "dependency_generator",
                    "Rejected redundant dependency from {:?}",
                    determinant
                );
                state.stats.n_rejected_redundant += 1;
            }
        }
    }
}

/// Closes `X -> r` back onto itself with `r -> a` for some `a` in `X`.
fn add_cyclic_dependencies(state: &mut DependencyGeneratorState) {
    let budget = state.candidate_keys.len().max(1);
    let mut order: Vec<usize> = (0..state.dependencies.len()).collect();
    order.shuffle(&mut state.rng);

    for idx in order {
        if state.stats.n_cycles >= budget {
            break;
        }
        let fd = state.dependencies[idx].clone();
        let Some(&from) = fd.dependent.to_vec().choose(&mut state.rng) else {
            continue;
        };
        let Some(&to) = fd.determinant.to_vec().choose(&mut state.rng) else {
            continue;
        };
        let proposal = FunctionalDependency::new(AttributeSet::single(from), AttributeSet::single(to));
        if state.dependencies.contains(&proposal) {
            continue;
        }
        let trial = state.with_addition(proposal);
        if state.keys_remain_valid(&trial) {
            state.dependencies = trial;
            state.stats.n_cycles += 1;
        } else {
            state.stats.n_rejected_cycles += 1;
        }
    }
}

fn validate(state: &DependencyGeneratorState) -> Result<(), GenerationError> {
    for fd in state.dependencies.iter() {
        if fd.determinant.is_empty() || fd.dependent.is_empty() {
            return Err(GenerationError::MalformedDependency(format!(
                "{} has an empty side",
                fd
            )));
        }
        if !fd.determinant.is_subset(&state.universe) || !fd.dependent.is_subset(&state.universe) {
            return Err(GenerationError::MalformedDependency(format!(
                "{} references attributes outside {}",
                fd, state.universe
            )));
        }
    }
    if !state.keys_remain_valid(&state.dependencies) {
        return Err(GenerationError::MalformedDependency(format!(
            "planted keys {:?} are not minimal keys",
            state.candidate_keys
        )));
    }
    Ok(())
}

/// Picks a universe size inside the profile's attribute bounds.
pub fn pick_universe_size<R: Rng>(profile: &DifficultyProfile, rng: &mut R) -> usize {
    let max = profile.max_attributes.min(MAX_ATTRIBUTES);
    let min = profile.min_attributes.clamp(1, max.max(1));
    rng.random_range(min..=max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::closure::{closure, is_candidate_key};
    use crate::game::tests::UsingLogger;
    use test_context::test_context;

    fn profile(candidate_keys: usize, redundant: bool, cyclic: bool) -> DifficultyProfile {
        DifficultyProfile {
            name: "Test".to_string(),
            min_attributes: 4,
            max_attributes: 10,
            min_fds: 4,
            max_fds: 6,
            candidate_keys,
            rounds: 3,
            redundant,
            cyclic,
        }
    }

    fn assert_structure(result: &GeneratorResult, universe_size: usize, n_keys: usize) {
        let universe = AttributeSet::universe(universe_size);
        let fds = result.dependencies.as_slice();
        assert_eq!(result.attributes, universe);
        assert_eq!(result.candidate_keys.len(), n_keys);

        for key in result.candidate_keys.iter() {
            assert_eq!(closure(fds, key), universe, "key {:?} in {:?}", key, fds);
            for attribute in key.iter() {
                assert_ne!(
                    closure(fds, &key.without(attribute)),
                    universe,
                    "key {:?} is not minimal in {:?}",
                    key,
                    fds
                );
            }
        }
        for (a, b) in result.candidate_keys.iter().tuple_combinations() {
            assert!(a.is_incomparable(b), "{:?} and {:?} are comparable", a, b);
        }
        for fd in fds {
            assert!(!fd.determinant.is_empty());
            assert!(!fd.dependent.is_empty());
            assert!(fd.determinant.is_subset(&universe));
            assert!(fd.dependent.is_subset(&universe));
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_two_keys_over_six_attributes(_: &mut UsingLogger) {
        // KEYGEN_ITERATIONS=1000 RUST_LOG=debug cargo test dependency_generator -- --nocapture
        let n_iterations = std::env::var("KEYGEN_ITERATIONS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(200);
        for seed in 0..n_iterations {
            let result = generate_dependencies(6, &profile(2, false, false), Some(seed)).unwrap();
            assert_structure(&result, 6, 2);
            assert!((4..=6).contains(&result.n_dependencies));
        }
    }

    #[test]
    fn test_redundant_profiles_keep_keys() {
        for seed in 0..200 {
            let result = generate_dependencies(8, &profile(2, true, false), Some(seed)).unwrap();
            assert_structure(&result, 8, 2);
        }
    }

    #[test]
    fn test_redundant_dependencies_are_added() {
        let added: usize = (0..50)
            .map(|seed| {
                generate_dependencies(8, &profile(1, true, false), Some(seed))
                    .unwrap()
                    .stats
                    .n_redundant
            })
            .sum();
        assert!(added > 0);
    }

    #[test]
    fn test_cyclic_profiles_keep_keys() {
        for seed in 0..200 {
            let result = generate_dependencies(9, &profile(3, true, true), Some(seed)).unwrap();
            assert_structure(&result, 9, 3);
        }
    }

    #[test]
    fn test_single_key_reaches_all_non_key_attributes() {
        for seed in 0..100 {
            let result = generate_dependencies(5, &profile(1, false, false), Some(seed)).unwrap();
            assert_structure(&result, 5, 1);
            let key = &result.candidate_keys[0];
            assert!(key.len() <= 3);
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_dependencies(7, &profile(2, true, true), Some(42)).unwrap();
        let b = generate_dependencies(7, &profile(2, true, true), Some(42)).unwrap();
        assert_eq!(a.candidate_keys, b.candidate_keys);
        assert_eq!(a.dependencies, b.dependencies);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn test_unseeded_generation_reports_seed() {
        let a = generate_dependencies(6, &profile(1, false, false), None).unwrap();
        let b = generate_dependencies(6, &profile(1, false, false), Some(a.seed)).unwrap();
        assert_eq!(a.dependencies, b.dependencies);
    }

    #[test]
    fn test_infeasible_key_count() {
        let mut profile = profile(2, false, false);
        profile.min_attributes = 1;
        let err = generate_dependencies(1, &profile, Some(3)).unwrap_err();
        assert!(err.is_infeasible());
        match err {
            GenerationError::InfeasibleProfile {
                requested, planted, ..
            } => {
                assert_eq!(requested, 2);
                assert_eq!(planted, 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_universe_out_of_bounds() {
        assert!(matches!(
            generate_dependencies(3, &profile(1, false, false), Some(0)),
            Err(GenerationError::UniverseOutOfBounds { size: 3, .. })
        ));
        assert!(matches!(
            generate_dependencies(11, &profile(1, false, false), Some(0)),
            Err(GenerationError::UniverseOutOfBounds { size: 11, .. })
        ));
    }

    #[test]
    fn test_invalid_profile() {
        let mut profile = profile(1, false, false);
        profile.max_fds = 1;
        assert!(matches!(
            generate_dependencies(6, &profile, Some(0)),
            Err(GenerationError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_basic_dependencies_cover_non_key_attributes() {
        let mut state = DependencyGeneratorState::new(AttributeSet::universe(6), 5);
        state.candidate_keys = vec!["AB".parse().unwrap()];
        generate_basic_dependencies(&mut state, 3);

        assert_eq!(state.dependencies.len(), 3);
        let mut covered = AttributeSet::new();
        for fd in state.dependencies.iter() {
            assert_eq!(fd.determinant.to_string(), "AB");
            assert!(fd.dependent.is_disjoint(&covered));
            covered.extend_from(&fd.dependent);
        }
        assert_eq!(covered.to_string(), "CDEF");
    }

    #[test]
    fn test_cross_reference_rewrites_determinant() {
        let mut state = DependencyGeneratorState::new(AttributeSet::universe(4), 5);
        state.candidate_keys = vec!["AC".parse().unwrap()];
        state.dependencies = vec![
            FunctionalDependency::parse("A->B"),
            FunctionalDependency::parse("AC->D"),
        ];
        cross_reference_dependencies(&mut state);
        assert_eq!(
            state.dependencies,
            vec![
                FunctionalDependency::parse("A->B"),
                FunctionalDependency::parse("BC->D"),
            ]
        );
        assert!(is_candidate_key(
            &state.dependencies,
            &"AC".parse().unwrap(),
            &state.universe
        ));
    }

    #[test]
    fn test_augmentation_shrinks_determinant() {
        let key: AttributeSet = "AB".parse().unwrap();
        let mut n_augmented = 0;
        for seed in 0..32 {
            let mut state = DependencyGeneratorState::new(AttributeSet::universe(4), seed);
            state.candidate_keys = vec![key.clone()];
            state.dependencies = vec![FunctionalDependency::parse("AB->CD")];
            augment_dependencies(&mut state);

            let fd = &state.dependencies[0];
            assert_eq!(state.dependencies.len(), 1);
            assert_eq!(fd.dependent.to_string(), "CD");
            if state.stats.n_augmented == 1 {
                assert_eq!(fd.determinant.len(), 1);
                assert!(fd.determinant.is_proper_subset(&key));
                n_augmented += 1;
            } else {
                assert_eq!(*fd, FunctionalDependency::parse("AB->CD"));
            }
            assert!(is_candidate_key(&state.dependencies, &key, &state.universe));
        }
        assert!(n_augmented > 0);
    }

    #[test]
    fn test_augmentation_rejected_when_it_creates_smaller_key() {
        let original = vec![
            FunctionalDependency::parse("AB->CD"),
            FunctionalDependency::parse("CD->AB"),
        ];
        let mut n_rejected = 0;
        for seed in 0..32 {
            let mut state = DependencyGeneratorState::new(AttributeSet::universe(4), seed);
            state.candidate_keys = vec!["AB".parse().unwrap(), "CD".parse().unwrap()];
            state.dependencies = original.clone();
            augment_dependencies(&mut state);

            assert_eq!(state.dependencies, original);
            assert_eq!(state.stats.n_augmented, 0);
            n_rejected += state.stats.n_rejected_augmentations;
        }
        assert!(n_rejected > 0);
    }

    #[test]
    fn test_split_builds_chain() {
        let key: AttributeSet = "A".parse().unwrap();
        let mut n_split = 0;
        for seed in 0..32 {
            let mut state = DependencyGeneratorState::new(AttributeSet::universe(4), seed);
            state.candidate_keys = vec![key.clone()];
            state.dependencies = vec![FunctionalDependency::parse("A->BCD")];
            split_transitive_dependencies(&mut state);

            if state.stats.n_split == 0 {
                assert_eq!(state.dependencies, vec![FunctionalDependency::parse("A->BCD")]);
                continue;
            }
            n_split += 1;
            assert_eq!(state.dependencies.len(), 2);
            let (first, second) = (&state.dependencies[0], &state.dependencies[1]);
            assert_eq!(first.determinant, key);
            assert_eq!(first.dependent.len(), 1);
            assert_eq!(second.determinant, first.dependent);
            assert_eq!(
                second.dependent,
                "BCD".parse::<AttributeSet>().unwrap().difference(&first.dependent)
            );
            assert_eq!(closure(&state.dependencies, &key), state.universe);
        }
        assert!(n_split > 0);
    }

    #[test]
    fn test_cycle_points_back_into_determinant() {
        let mut state = DependencyGeneratorState::new(AttributeSet::universe(4), 9);
        state.candidate_keys = vec!["AB".parse().unwrap()];
        state.dependencies = vec![
            FunctionalDependency::parse("AB->C"),
            FunctionalDependency::parse("C->D"),
        ];
        add_cyclic_dependencies(&mut state);

        assert_eq!(state.stats.n_cycles, 1);
        assert_eq!(state.dependencies.len(), 3);
        let added = &state.dependencies[2];
        assert!(state.dependencies[..2]
            .iter()
            .any(|fd| fd.dependent.is_superset(&added.determinant)
                && fd.determinant.is_superset(&added.dependent)));
        assert!(state.keys_remain_valid(&state.dependencies));
    }

    #[test]
    fn test_pick_universe_size_within_bounds() {
        let profile = profile(1, false, false);
        let mut rng = rand::rng();
        for _ in 0..100 {
            assert!(profile
                .attribute_range()
                .contains(&pick_universe_size(&profile, &mut rng)));
        }
    }
}
