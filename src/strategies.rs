//! `proptest` strategies for workloads over the indexes.
//!
//! Enabled by the `proptest` feature so downstream crates can drive their own
//! wrappers with the same generators the crate's tests use.

use proptest::collection::vec;
use proptest::prelude::*;

/// A domain size together with an array of values drawn from it.
pub fn domain_and_values(max_domain: usize, max_len: usize) -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1..=max_domain.max(1)).prop_flat_map(move |domain| (Just(domain), vec(1..=domain, 0..=max_len)))
}

/// A random forest over `n` nodes as a parent array: node `u > 0` hangs
/// below some node `< u`, so the result is always acyclic.
pub fn parent_array(max_nodes: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    (1..=max_nodes.max(1)).prop_flat_map(|n| {
        let links: Vec<BoxedStrategy<Option<usize>>> = (0..n)
            .map(|u| if u == 0 { Just(None).boxed() } else { (0..u).prop_map(Some).boxed() })
            .collect();
        links
    })
}

/// An array assignment `(index, value)` for an array of `len` over `domain`.
pub fn assignment(len: usize, domain: usize) -> impl Strategy<Value = (usize, usize)> {
    (1..=len.max(1), 1..=domain.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{BinaryLifting, LcaOracle};
    use crate::{DynamicRangeIndex, GhostToken, VersionedIndex};

    proptest! {
        #[test]
        fn generated_forests_are_accepted(parents in parent_array(30)) {
            let oracle = BinaryLifting::new(&parents).unwrap();
            prop_assert_eq!(oracle.len(), parents.len());
            prop_assert_eq!(oracle.lca(0, 0), Some(0));
        }

        #[test]
        fn versioned_totals_track_prefix_lengths((domain, values) in domain_and_values(20, 30)) {
            GhostToken::new(|mut token| {
                let mut index = VersionedIndex::new(domain);
                index.build(&mut token, &values).unwrap();
                for n in 0..index.versions() {
                    let v = index.version(n).unwrap();
                    assert_eq!(index.total(&token, v).unwrap(), n as i64);
                }
            });
        }

        #[test]
        fn assignments_stay_in_bounds(writes in proptest::collection::vec(assignment(8, 6), 0..40)) {
            GhostToken::new(|mut token| {
                let mut index = DynamicRangeIndex::new(6, 8);
                for &(i, v) in &writes {
                    index.set(&mut token, i, v).unwrap();
                }
                let set = (1..=8).filter(|&i| index.get(i).is_some()).count();
                assert_eq!(index.range_count(&token, 1, 8, 1, 6).unwrap(), set as i64);
            });
        }
    }
}
