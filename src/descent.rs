//! Order-statistic descent over a composed multiset.
//!
//! Every version shares one implicit tree shape, so a list of signed roots can
//! be walked in lock-step: at each level the composed count of the left half is
//! `sum(sign_i * count(left(root_i)))`, and the search moves every cursor into
//! the same half. Nothing is materialized; a query touches one path per root.
//!
//! Time Complexity: O(r * log m) for `r` signed roots over a domain of `m`.

use crate::arena::NodeId;
use crate::compose::{Sign, SignedRoot};
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::{Domain, PersistentTree};
use smallvec::SmallVec;

type Cursor<'brand> = SmallVec<[(NodeId<'brand>, Sign); 16]>;

#[inline]
fn cursor<'brand>(roots: &[SignedRoot<'brand>]) -> Cursor<'brand> {
    roots.iter().map(|r| (r.root, r.sign)).collect()
}

#[inline]
fn sum<'brand>(tree: &PersistentTree<'brand>, cursor: &Cursor<'brand>) -> i64 {
    cursor.iter().map(|&(id, sign)| sign.apply(tree.node(id).count)).sum()
}

#[inline]
fn sum_left<'brand>(tree: &PersistentTree<'brand>, cursor: &Cursor<'brand>) -> i64 {
    cursor
        .iter()
        .map(|&(id, sign)| sign.apply(tree.node(tree.node(id).left()).count))
        .sum()
}

#[inline]
fn step<'brand>(tree: &PersistentTree<'brand>, cursor: &mut Cursor<'brand>, right: bool) {
    for (id, _) in cursor.iter_mut() {
        let node = tree.node(*id);
        *id = if right { node.right() } else { node.left() };
    }
}

/// Every root must be a slot of `tree`'s arena.
fn check_roots<'brand>(tree: &PersistentTree<'brand>, roots: &[SignedRoot<'brand>]) -> Result<()> {
    for r in roots {
        tree.arena().check(r.root)?;
    }
    Ok(())
}

/// Composed number of values across all signed roots.
pub fn composed_total<'brand>(
    tree: &PersistentTree<'brand>,
    _token: &GhostToken<'brand>,
    roots: &[SignedRoot<'brand>],
) -> Result<i64> {
    check_roots(tree, roots)?;
    Ok(roots.iter().map(|r| r.sign.apply(tree.node(r.root).count)).sum())
}

/// Position of the `k`-th smallest value (1-based) of the composed multiset.
///
/// Fails with [`IndexError::OutOfRange`] when `k` is zero, exceeds the composed
/// total, or the descent meets a negative partial count (the signed roots do
/// not describe a multiset), and with [`IndexError::UnknownNode`] when a root
/// is not a node of `tree`.
pub fn kth_smallest<'brand>(
    tree: &PersistentTree<'brand>,
    token: &GhostToken<'brand>,
    roots: &[SignedRoot<'brand>],
    k: usize,
) -> Result<usize> {
    let total = composed_total(tree, token, roots)?;
    if k == 0 || (k as i64) > total {
        return Err(IndexError::OutOfRange { k, available: total.max(0) });
    }

    let mut cursor = cursor(roots);
    let mut remaining = k as i64;
    let (mut lo, mut hi) = (1, tree.domain().size());
    while lo < hi {
        let mid = Domain::mid(lo, hi);
        let left = sum_left(tree, &cursor);
        if left < 0 {
            return Err(IndexError::OutOfRange { k, available: total });
        }
        if remaining <= left {
            step(tree, &mut cursor, false);
            hi = mid;
        } else {
            remaining -= left;
            step(tree, &mut cursor, true);
            lo = mid + 1;
        }
    }

    if sum(tree, &cursor) < remaining {
        return Err(IndexError::OutOfRange { k, available: total });
    }
    Ok(lo)
}

/// Position of the `k`-th largest value (1-based) of the composed multiset.
pub fn kth_largest<'brand>(
    tree: &PersistentTree<'brand>,
    token: &GhostToken<'brand>,
    roots: &[SignedRoot<'brand>],
    k: usize,
) -> Result<usize> {
    let total = composed_total(tree, token, roots)?;
    if k == 0 || (k as i64) > total {
        return Err(IndexError::OutOfRange { k, available: total.max(0) });
    }
    kth_smallest(tree, token, roots, (total - k as i64 + 1) as usize)
}

/// Composed number of values `<= position`, for `position` in `[0, domain]`.
fn count_at_most<'brand>(tree: &PersistentTree<'brand>, roots: &[SignedRoot<'brand>], position: usize) -> i64 {
    if position == 0 {
        return 0;
    }

    let mut cursor = cursor(roots);
    let mut acc = 0;
    let (mut lo, mut hi) = (1, tree.domain().size());
    while lo < hi {
        if position >= hi {
            break;
        }
        let mid = Domain::mid(lo, hi);
        if position <= mid {
            step(tree, &mut cursor, false);
            hi = mid;
        } else {
            acc += sum_left(tree, &cursor);
            step(tree, &mut cursor, true);
            lo = mid + 1;
        }
    }
    acc + sum(tree, &cursor)
}

/// Composed number of values strictly smaller than `position`.
///
/// This is the rank query inverse to [`kth_smallest`]: when `position` is
/// present, `kth_smallest(count_below(position) + 1) == position`.
pub fn count_below<'brand>(
    tree: &PersistentTree<'brand>,
    _token: &GhostToken<'brand>,
    roots: &[SignedRoot<'brand>],
    position: usize,
) -> Result<i64> {
    check_roots(tree, roots)?;
    let position = tree.domain().check(position)?;
    Ok(count_at_most(tree, roots, position - 1))
}

/// Composed number of values inside `[lo, hi]`.
pub fn composed_count<'brand>(
    tree: &PersistentTree<'brand>,
    _token: &GhostToken<'brand>,
    roots: &[SignedRoot<'brand>],
    lo: usize,
    hi: usize,
) -> Result<i64> {
    check_roots(tree, roots)?;
    let (lo, hi) = tree.domain().check_range(lo, hi)?;
    Ok(count_at_most(tree, roots, hi) - count_at_most(tree, roots, lo - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_all<'brand>(
        token: &mut GhostToken<'brand>,
        tree: &mut PersistentTree<'brand>,
        values: &[usize],
    ) -> Vec<NodeId<'brand>> {
        let mut roots = vec![tree.empty()];
        for &value in values {
            let last = *roots.last().unwrap();
            roots.push(tree.update(token, last, value, 1).unwrap());
        }
        roots
    }

    #[test]
    fn kth_over_single_root() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(10);
            let roots = insert_all(&mut token, &mut tree, &[7, 3, 3, 10, 1]);
            let all = [SignedRoot::plus(roots[5])];

            let sorted: Vec<usize> = (1..=5).map(|k| kth_smallest(&tree, &token, &all, k).unwrap()).collect();
            assert_eq!(sorted, vec![1, 3, 3, 7, 10]);
            assert_eq!(kth_largest(&tree, &token, &all, 1).unwrap(), 10);
            assert_eq!(kth_largest(&tree, &token, &all, 5).unwrap(), 1);
        });
    }

    #[test]
    fn kth_over_version_difference() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(10);
            let roots = insert_all(&mut token, &mut tree, &[7, 3, 3, 10, 1]);
            // Elements 3..=4 of the array: {3, 10}.
            let scope = [SignedRoot::plus(roots[4]), SignedRoot::minus(roots[2])];
            assert_eq!(kth_smallest(&tree, &token, &scope, 1).unwrap(), 3);
            assert_eq!(kth_smallest(&tree, &token, &scope, 2).unwrap(), 10);
            assert_eq!(
                kth_smallest(&tree, &token, &scope, 3),
                Err(IndexError::OutOfRange { k: 3, available: 2 })
            );
            assert_eq!(
                kth_smallest(&tree, &token, &scope, 0),
                Err(IndexError::OutOfRange { k: 0, available: 2 })
            );
        });
    }

    #[test]
    fn negative_partial_counts_are_rejected() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(4);
            let low = tree.update(&mut token, tree.empty(), 1, 1).unwrap();
            let high = tree.update(&mut token, tree.empty(), 4, 1).unwrap();
            let high = tree.update(&mut token, high, 4, 1).unwrap();
            // {4, 4} - {1}: total 1, but the left half is negative.
            let scope = [SignedRoot::plus(high), SignedRoot::minus(low)];
            assert!(matches!(
                kth_smallest(&tree, &token, &scope, 1),
                Err(IndexError::OutOfRange { k: 1, .. })
            ));
        });
    }

    #[test]
    fn counts_and_ranks_agree() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(9);
            let roots = insert_all(&mut token, &mut tree, &[2, 9, 4, 4, 6, 1]);
            let all = [SignedRoot::plus(roots[6])];

            assert_eq!(composed_count(&tree, &token, &all, 1, 9).unwrap(), 6);
            assert_eq!(composed_count(&tree, &token, &all, 4, 6).unwrap(), 3);
            assert_eq!(composed_count(&tree, &token, &all, 7, 8).unwrap(), 0);
            assert_eq!(count_below(&tree, &token, &all, 4).unwrap(), 2);
            assert_eq!(count_below(&tree, &token, &all, 1).unwrap(), 0);

            let rank = count_below(&tree, &token, &all, 6).unwrap();
            assert_eq!(kth_smallest(&tree, &token, &all, rank as usize + 1).unwrap(), 6);
        });
    }

    #[test]
    fn empty_composition_has_nothing_to_select() {
        GhostToken::new(|token| {
            let tree = PersistentTree::new(3);
            assert_eq!(composed_total(&tree, &token, &[]).unwrap(), 0);
            assert_eq!(
                kth_smallest(&tree, &token, &[], 1),
                Err(IndexError::OutOfRange { k: 1, available: 0 })
            );
        });
    }

    #[test]
    fn foreign_roots_are_rejected_before_descending() {
        GhostToken::new(|mut token| {
            let mut other = PersistentTree::new(16);
            let roots = insert_all(&mut token, &mut other, &[5, 6, 7]);
            let tree = PersistentTree::new(16);
            let scope = [SignedRoot::plus(roots[3])];
            let unknown = IndexError::UnknownNode { node: roots[3].index(), nodes: 1 };

            assert_eq!(composed_total(&tree, &token, &scope), Err(unknown));
            assert_eq!(kth_smallest(&tree, &token, &scope, 1), Err(unknown));
            assert_eq!(kth_largest(&tree, &token, &scope, 1), Err(unknown));
            assert_eq!(count_below(&tree, &token, &scope, 6), Err(unknown));
            assert_eq!(composed_count(&tree, &token, &scope, 1, 16), Err(unknown));
        });
    }
}
