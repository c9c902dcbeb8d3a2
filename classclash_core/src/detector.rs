use classclash_common::{Collision, UnitEntry};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Finds every cross-bundle pair of entries sharing a canonical name.
///
/// Output order is that of a nested loop over `left` then `right`. Entries
/// are never matched against others from the same side.
pub fn detect_collisions(left: &[UnitEntry], right: &[UnitEntry]) -> Vec<Collision> {
    detect_collisions_with(left, right, true)
}

/// Same as [`detect_collisions`], optionally running on a single thread
pub fn detect_collisions_with(
    left: &[UnitEntry],
    right: &[UnitEntry],
    parallel: bool,
) -> Vec<Collision> {
    let index = index_by_name(right);

    let matches_for = |entry: &UnitEntry| -> Vec<Collision> {
        index
            .get(entry.name())
            .map(|positions| {
                positions
                    .iter()
                    .map(|&i| Collision {
                        left: entry.clone(),
                        right: right[i].clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    let collisions: Vec<Collision> = if parallel {
        left.par_iter().flat_map_iter(matches_for).collect()
    } else {
        left.iter().flat_map(matches_for).collect()
    };

    debug!(
        "Detected {} collisions between {} and {} entries",
        collisions.len(),
        left.len(),
        right.len()
    );

    collisions
}

/// Positions of each canonical name, in ascending order
fn index_by_name(entries: &[UnitEntry]) -> HashMap<&str, Vec<usize>> {
    let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        index.entry(entry.name()).or_default().push(i);
    }
    index
}
