//! `VersionedIndex` - persistent versions of a multiset over `[1, domain]`.
//!
//! Version 0 is empty. Every update derives a new version from an existing
//! one and moves the head to it; [`VersionedIndex::build`] inserts an array
//! one value per version, so version `i` holds the first `i` values and
//! `range_kth(version(l - 1), version(r), k)` is the k-th smallest of
//! `values[l..=r]`.

use crate::arena::ArenaStats;
use crate::compose::SignedRoot;
use crate::config::IndexConfig;
use crate::descent;
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::lazy::RollbackTree;
use crate::tree::PersistentTree;
use crate::version::{VersionHandle, VersionLog};

/// A range-k-th query: `(v_lo, v_hi, k)`.
pub type RangeKthQuery<'brand> = (VersionHandle<'brand>, VersionHandle<'brand>, usize);

/// A persistent multiset with an append-only version history.
pub struct VersionedIndex<'brand> {
    tree: PersistentTree<'brand>,
    log: VersionLog<'brand>,
}

impl<'brand> VersionedIndex<'brand> {
    /// Creates an unbounded index over `[1, domain]`.
    pub fn new(domain: usize) -> Self {
        Self::with_config(IndexConfig::new(domain))
    }

    /// Creates an index sized by `config`.
    pub fn with_config(config: IndexConfig) -> Self {
        let tree = PersistentTree::with_config(config);
        let log = VersionLog::new(tree.empty());
        Self { tree, log }
    }

    /// The underlying tree.
    #[inline]
    pub fn tree(&self) -> &PersistentTree<'brand> {
        &self.tree
    }

    /// Arena usage statistics.
    pub fn stats(&self) -> ArenaStats {
        self.tree.stats()
    }

    /// Version 0, the empty multiset.
    #[inline]
    pub fn initial(&self) -> VersionHandle<'brand> {
        self.log.initial()
    }

    /// The version writes currently extend.
    #[inline]
    pub fn head(&self) -> VersionHandle<'brand> {
        self.log.head()
    }

    /// Handle of version `number`.
    pub fn version(&self, number: usize) -> Result<VersionHandle<'brand>> {
        self.log.get(number)
    }

    /// Number of versions issued so far.
    #[inline]
    pub fn versions(&self) -> usize {
        self.log.len()
    }

    /// The version that `number` was derived from.
    pub fn parent(&self, number: usize) -> Result<Option<usize>> {
        self.log.parent(number)
    }

    /// Inserts every value, one version per value, starting at the head.
    ///
    /// All values are validated and arena room is reserved before the first
    /// insertion. Returns the last version recorded (the head when `values`
    /// is empty).
    pub fn build(&mut self, token: &mut GhostToken<'brand>, values: &[usize]) -> Result<VersionHandle<'brand>> {
        let domain = self.tree.domain();
        for &value in values {
            domain.check(value)?;
        }
        self.tree.arena().ensure_room(values.len() * domain.path_len())?;

        let mut head = self.log.head();
        for &value in values {
            let root = self.tree.path_copy(head.root(), value, 1)?;
            head = self.log.record(token, root, Some(head.number()));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(values = values.len(), versions = self.log.len(), "built versioned index");

        Ok(head)
    }

    /// Adds `delta` copies of `position` to version `v`, recording a new version.
    ///
    /// `v` stays queryable and unchanged. `delta` may be negative to remove
    /// values.
    pub fn update(
        &mut self,
        token: &mut GhostToken<'brand>,
        v: VersionHandle<'brand>,
        position: usize,
        delta: i64,
    ) -> Result<VersionHandle<'brand>> {
        let root = self.log.resolve(v)?;
        let root = self.tree.update(token, root, position, delta)?;
        Ok(self.log.record(token, root, Some(v.number())))
    }

    /// Applies [`update`](Self::update) to the head.
    pub fn update_head(&mut self, token: &mut GhostToken<'brand>, position: usize, delta: i64) -> Result<VersionHandle<'brand>> {
        let head = self.log.head();
        self.update(token, head, position, delta)
    }

    /// Re-binds the head to version `number` in O(1).
    pub fn rollback(&mut self, token: &mut GhostToken<'brand>, number: usize) -> Result<VersionHandle<'brand>> {
        self.log.rollback(token, number)
    }

    fn difference(&self, v_lo: VersionHandle<'brand>, v_hi: VersionHandle<'brand>) -> Result<[SignedRoot<'brand>; 2]> {
        Ok([
            SignedRoot::plus(self.log.resolve(v_hi)?),
            SignedRoot::minus(self.log.resolve(v_lo)?),
        ])
    }

    /// The `k`-th smallest value of the multiset difference `v_hi - v_lo`.
    pub fn range_kth(
        &self,
        token: &GhostToken<'brand>,
        v_lo: VersionHandle<'brand>,
        v_hi: VersionHandle<'brand>,
        k: usize,
    ) -> Result<usize> {
        let scope = self.difference(v_lo, v_hi)?;
        descent::kth_smallest(&self.tree, token, &scope, k)
    }

    /// The `k`-th largest value of the multiset difference `v_hi - v_lo`.
    pub fn range_kth_largest(
        &self,
        token: &GhostToken<'brand>,
        v_lo: VersionHandle<'brand>,
        v_hi: VersionHandle<'brand>,
        k: usize,
    ) -> Result<usize> {
        let scope = self.difference(v_lo, v_hi)?;
        descent::kth_largest(&self.tree, token, &scope, k)
    }

    /// Number of values inside `[lo, hi]` in the difference `v_hi - v_lo`.
    pub fn range_count(
        &self,
        token: &GhostToken<'brand>,
        v_lo: VersionHandle<'brand>,
        v_hi: VersionHandle<'brand>,
        lo: usize,
        hi: usize,
    ) -> Result<i64> {
        let scope = self.difference(v_lo, v_hi)?;
        descent::composed_count(&self.tree, token, &scope, lo, hi)
    }

    /// The `k`-th smallest value of a single version.
    pub fn kth(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>, k: usize) -> Result<usize> {
        let scope = [SignedRoot::plus(self.log.resolve(v)?)];
        descent::kth_smallest(&self.tree, token, &scope, k)
    }

    /// Number of values strictly smaller than `position` in version `v`.
    pub fn rank(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>, position: usize) -> Result<i64> {
        let scope = [SignedRoot::plus(self.log.resolve(v)?)];
        descent::count_below(&self.tree, token, &scope, position)
    }

    /// Copies of `position` in version `v`.
    pub fn count(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>, position: usize) -> Result<i64> {
        self.tree.point_count(token, self.log.resolve(v)?, position)
    }

    /// Number of values in version `v`.
    pub fn total(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>) -> Result<i64> {
        self.tree.total(token, self.log.resolve(v)?)
    }

    /// The positions present in version `v` as a [`RollbackTree`] whose
    /// version 1 mirrors `v`.
    ///
    /// Range assignments and rollbacks on the result leave this index and
    /// its versions untouched.
    pub fn occupancy(&self, token: &mut GhostToken<'brand>, v: VersionHandle<'brand>) -> Result<RollbackTree<'brand>> {
        let root = self.log.resolve(v)?;
        RollbackTree::from_tree(token, &self.tree, root)
    }

    /// Answers many range-k-th queries; in parallel with the `parallel` feature.
    ///
    /// Queries only read write-once nodes, so they share the index and the
    /// token across worker threads without synchronization.
    pub fn batch_range_kth(&self, token: &GhostToken<'brand>, queries: &[RangeKthQuery<'brand>]) -> Vec<Result<usize>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries
                .par_iter()
                .map(|&(lo, hi, k)| self.range_kth(token, lo, hi, k))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            queries.iter().map(|&(lo, hi, k)| self.range_kth(token, lo, hi, k)).collect()
        }
    }

    /// The k-th smallest of `values[l..=r]` (1-based, inclusive) for an index
    /// whose first versions were produced by [`build`](Self::build) from the
    /// empty version.
    pub fn prefix_kth(&self, token: &GhostToken<'brand>, l: usize, r: usize, k: usize) -> Result<usize> {
        if l == 0 || l > r {
            return Err(IndexError::InvalidRange { lo: l, hi: r });
        }
        let v_lo = self.version(l - 1)?;
        let v_hi = self.version(r)?;
        self.range_kth(token, v_lo, v_hi, k)
    }
}
