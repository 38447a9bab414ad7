//! `DynamicRangeIndex` - range order statistics over a mutable array.
//!
//! The array `a[1..=len]` holds optional domain values. Assigning `a[i]`
//! removes the old value from, and inserts the new value into, every Fenwick
//! cell covering `i`; each cell is a persistent root, so the composed scope of
//! any range `[l, r]` is O(log len) signed roots.

use crate::arena::ArenaStats;
use crate::compose::FenwickRoots;
use crate::config::IndexConfig;
use crate::descent;
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::PersistentTree;

/// A mutable array answering range k-th and range count queries.
pub struct DynamicRangeIndex<'brand> {
    tree: PersistentTree<'brand>,
    cells: FenwickRoots<'brand>,
    values: Vec<Option<usize>>,
}

impl<'brand> DynamicRangeIndex<'brand> {
    /// Creates an array of `len` unset elements over the value domain `[1, domain]`.
    pub fn new(domain: usize, len: usize) -> Self {
        Self::with_config(IndexConfig::new(domain), len)
    }

    /// Creates an array of `len` unset elements sized by `config`.
    pub fn with_config(config: IndexConfig, len: usize) -> Self {
        Self {
            tree: PersistentTree::with_config(config),
            cells: FenwickRoots::new(len),
            values: vec![None; len],
        }
    }

    /// Creates an array holding `values`.
    pub fn from_values(token: &mut GhostToken<'brand>, domain: usize, values: &[usize]) -> Result<Self> {
        let mut index = Self::new(domain, values.len());
        for &value in values {
            index.tree.domain().check(value)?;
        }
        for (i, &value) in values.iter().enumerate() {
            index.set(token, i + 1, value)?;
        }
        Ok(index)
    }

    /// Array length.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arena usage statistics.
    pub fn stats(&self) -> ArenaStats {
        self.tree.stats()
    }

    /// The underlying tree.
    #[inline]
    pub fn tree(&self) -> &PersistentTree<'brand> {
        &self.tree
    }

    /// Current value of `a[index]`.
    pub fn get(&self, index: usize) -> Option<usize> {
        index.checked_sub(1).and_then(|i| self.values.get(i).copied().flatten())
    }

    fn check_index(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.values.len() {
            return Err(IndexError::OutOfDomain { position: index, domain: self.values.len() });
        }
        Ok(index)
    }

    /// Assigns `a[index] = value`.
    ///
    /// Arena room for both the removal and the insertion is reserved first, so
    /// a capacity failure leaves the array unchanged.
    pub fn set(&mut self, _token: &mut GhostToken<'brand>, index: usize, value: usize) -> Result<()> {
        let index = self.check_index(index)?;
        let value = self.tree.domain().check(value)?;
        let previous = self.values[index - 1];
        if previous == Some(value) {
            return Ok(());
        }

        let copies = if previous.is_some() { 2 } else { 1 };
        self.tree
            .arena()
            .ensure_room(copies * self.cells.cells_touched(index) * self.tree.domain().path_len())?;

        if let Some(old) = previous {
            self.cells.apply(&mut self.tree, index, old, -1)?;
        }
        self.cells.apply(&mut self.tree, index, value, 1)?;
        self.values[index - 1] = Some(value);
        Ok(())
    }

    /// Clears `a[index]`, returning its previous value.
    pub fn unset(&mut self, token: &mut GhostToken<'brand>, index: usize) -> Result<Option<usize>> {
        let index = self.check_index(index)?;
        let Some(old) = self.values[index - 1] else {
            return Ok(None);
        };
        self.cells.register_update(token, &mut self.tree, index, old, -1)?;
        self.values[index - 1] = None;
        Ok(Some(old))
    }

    /// The `k`-th smallest set value among `a[l..=r]`.
    pub fn range_kth(&self, token: &GhostToken<'brand>, l: usize, r: usize, k: usize) -> Result<usize> {
        let scope = self.cells.compose_range(l, r)?;
        descent::kth_smallest(&self.tree, token, &scope, k)
    }

    /// The `k`-th largest set value among `a[l..=r]`.
    pub fn range_kth_largest(&self, token: &GhostToken<'brand>, l: usize, r: usize, k: usize) -> Result<usize> {
        let scope = self.cells.compose_range(l, r)?;
        descent::kth_largest(&self.tree, token, &scope, k)
    }

    /// Number of elements of `a[l..=r]` whose value lies in `[lo, hi]`.
    pub fn range_count(&self, token: &GhostToken<'brand>, l: usize, r: usize, lo: usize, hi: usize) -> Result<i64> {
        let scope = self.cells.compose_range(l, r)?;
        descent::composed_count(&self.tree, token, &scope, lo, hi)
    }
}
