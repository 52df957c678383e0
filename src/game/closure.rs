use log::trace;

use crate::model::{AttributeSet, FunctionalDependency};

/// Smallest superset of `start` closed under every dependency in `fds`.
///
/// Runs full passes over `fds` until one adds nothing. Each productive pass
/// grows the set, so the number of passes is bounded by the number of
/// distinct attributes. Attributes that no dependency mentions never expand,
/// and a determinant naming an attribute outside the working set simply
/// never fires.
pub fn closure(fds: &[FunctionalDependency], start: &AttributeSet) -> AttributeSet {
    let mut result = start.clone();
    let mut passes = 0;
    loop {
        passes += 1;
        let mut added = false;
        for fd in fds.iter() {
            if fd.expands(&result) {
                result.extend_from(&fd.dependent);
                added = true;
            }
        }
        if !added {
            break;
        }
    }
    trace!(
        target: "closure",
        "closure({}) = {} after {} passes",
        start,
        result,
        passes
    );
    result
}

pub fn is_superkey(fds: &[FunctionalDependency], set: &AttributeSet, universe: &AttributeSet) -> bool {
    closure(fds, set).is_superset(universe)
}

/// A superkey none of whose one-smaller subsets is a superkey. By
/// monotonicity that covers every proper subset.
pub fn is_candidate_key(
    fds: &[FunctionalDependency],
    set: &AttributeSet,
    universe: &AttributeSet,
) -> bool {
    is_superkey(fds, set, universe)
        && set
            .iter()
            .all(|attribute| !is_superkey(fds, &set.without(attribute), universe))
}
