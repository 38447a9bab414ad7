//! `FenwickRoots` - a Binary Indexed Tree whose cells are persistent roots.
//!
//! A classic Fenwick tree adds a scalar into every cell `j = i, i + lowbit(i), ...`.
//! Here each cell holds a persistent count tree over the value domain, and an
//! "add" is a path copy whose new root is chained back into the cell. A prefix
//! `[1, r]` of the array is then covered by the O(log n) cells visited by
//! `j = r, r - lowbit(r), ...`.
//!
//! Time Complexity:
//! - Register update: O(log n * log m) time and nodes
//! - Compose range: O(log n)
//!
//! where `n` is the array length and `m` the value domain size.

use crate::arena::NodeId;
use crate::compose::{push_root, Sign, SignedRoots};
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::PersistentTree;

#[inline(always)]
fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

/// One persistent root per Fenwick cell of an array of length `len`.
pub struct FenwickRoots<'brand> {
    /// 1-indexed; slot 0 is unused.
    slots: Vec<NodeId<'brand>>,
}

impl<'brand> FenwickRoots<'brand> {
    /// Creates `len` empty cells.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![NodeId::EMPTY; len + 1],
        }
    }

    /// Array length covered by the cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// Returns true if the array is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current root of cell `j` (1-based).
    #[inline]
    pub fn cell(&self, j: usize) -> Option<NodeId<'brand>> {
        if j == 0 {
            return None;
        }
        self.slots.get(j).copied()
    }

    fn check_index(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.len() {
            return Err(IndexError::OutOfDomain { position: index, domain: self.len() });
        }
        Ok(index)
    }

    /// Number of cells an update at `index` rewrites.
    pub fn cells_touched(&self, index: usize) -> usize {
        let mut touched = 0;
        let mut j = index;
        while j != 0 && j <= self.len() {
            touched += 1;
            j += lowbit(j);
        }
        touched
    }

    /// Adds `delta` at value `position` to array element `index`.
    ///
    /// Every covering cell receives a path copy; old cell roots are left
    /// intact, so earlier snapshots of the cell array stay valid.
    pub fn register_update(
        &mut self,
        _token: &mut GhostToken<'brand>,
        tree: &mut PersistentTree<'brand>,
        index: usize,
        position: usize,
        delta: i64,
    ) -> Result<()> {
        let index = self.check_index(index)?;
        let position = tree.domain().check(position)?;
        tree.arena().ensure_room(self.cells_touched(index) * tree.domain().path_len())?;
        self.apply(tree, index, position, delta)
    }

    /// Cell walk without checks; the caller validated and reserved room.
    pub(crate) fn apply(
        &mut self,
        tree: &mut PersistentTree<'brand>,
        index: usize,
        position: usize,
        delta: i64,
    ) -> Result<()> {
        let len = self.len();
        let mut j = index;
        while j <= len {
            self.slots[j] = tree.path_copy(self.slots[j], position, delta)?;
            j += lowbit(j);
        }
        Ok(())
    }

    /// Pushes the cells dominating prefix `[1, r]` with `sign`.
    fn prefix(&self, r: usize, sign: Sign, out: &mut SignedRoots<'brand>) {
        let mut j = r;
        while j > 0 {
            push_root(out, self.slots[j], sign);
            j -= lowbit(j);
        }
    }

    /// Signed roots whose sum is the multiset of array elements `[l, r]`.
    pub fn compose_range(&self, l: usize, r: usize) -> Result<SignedRoots<'brand>> {
        if l > r {
            return Err(IndexError::InvalidRange { lo: l, hi: r });
        }
        self.check_index(l)?;
        self.check_index(r)?;

        let mut out = SignedRoots::new();
        self.prefix(r, Sign::Plus, &mut out);
        self.prefix(l - 1, Sign::Minus, &mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descent;
    use crate::config::IndexConfig;

    #[test]
    fn lowbit_isolates_last_set_bit() {
        assert_eq!(lowbit(12), 4);
        assert_eq!(lowbit(7), 1);
        assert_eq!(lowbit(8), 8);
    }

    #[test]
    fn compose_range_counts_match_array() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(10);
            let values = [4, 9, 1, 4, 7, 2];
            let mut roots = FenwickRoots::new(values.len());
            for (i, &value) in values.iter().enumerate() {
                roots.register_update(&mut token, &mut tree, i + 1, value, 1).unwrap();
            }

            let scope = roots.compose_range(2, 5).unwrap();
            assert_eq!(descent::composed_total(&tree, &token, &scope).unwrap(), 4);
            assert_eq!(descent::composed_count(&tree, &token, &scope, 4, 4).unwrap(), 1);
            assert_eq!(descent::kth_smallest(&tree, &token, &scope, 1).unwrap(), 1);
            assert_eq!(descent::kth_smallest(&tree, &token, &scope, 4).unwrap(), 9);
        });
    }

    #[test]
    fn cells_touched_follows_lowbit_chain() {
        let roots: FenwickRoots<'_> = FenwickRoots::new(8);
        // 1 -> 2 -> 4 -> 8
        assert_eq!(roots.cells_touched(1), 4);
        // 6 -> 8
        assert_eq!(roots.cells_touched(6), 2);
        assert_eq!(roots.cells_touched(8), 1);
    }

    #[test]
    fn rejects_bad_indices() {
        GhostToken::new(|mut token| {
            let mut tree = PersistentTree::new(4);
            let mut roots = FenwickRoots::new(3);
            assert_eq!(
                roots.register_update(&mut token, &mut tree, 4, 1, 1),
                Err(IndexError::OutOfDomain { position: 4, domain: 3 })
            );
            assert_eq!(
                roots.register_update(&mut token, &mut tree, 1, 5, 1),
                Err(IndexError::OutOfDomain { position: 5, domain: 4 })
            );
            assert_eq!(roots.compose_range(3, 2).unwrap_err(), IndexError::InvalidRange { lo: 3, hi: 2 });
            assert_eq!(tree.stats().nodes, 1);
        });
    }

    #[test]
    fn capacity_failure_leaves_every_cell_untouched() {
        GhostToken::new(|mut token| {
            // Domain 4 costs 3 slots per cell; index 1 of 8 rewrites 4 cells.
            let mut tree = PersistentTree::with_config(IndexConfig::new(4).with_capacity(13));
            let mut roots = FenwickRoots::new(8);
            roots.register_update(&mut token, &mut tree, 8, 2, 1).unwrap();
            let nodes = tree.stats().nodes;
            let cells: Vec<_> = (1..=8).map(|j| roots.cell(j)).collect();

            assert_eq!(
                roots.register_update(&mut token, &mut tree, 1, 3, 1),
                Err(IndexError::CapacityExceeded { capacity: 13 })
            );
            assert_eq!(tree.stats().nodes, nodes);
            assert_eq!((1..=8).map(|j| roots.cell(j)).collect::<Vec<_>>(), cells);
            let scope = roots.compose_range(1, 8).unwrap();
            assert_eq!(descent::composed_total(&tree, &token, &scope).unwrap(), 1);
            assert_eq!(descent::kth_smallest(&tree, &token, &scope, 1).unwrap(), 2);

            // A smaller update still fits: index 6 rewrites cells 6 and 8.
            roots.register_update(&mut token, &mut tree, 6, 3, 1).unwrap();
            assert_eq!(tree.stats().nodes, nodes + 6);
        });
    }
}
