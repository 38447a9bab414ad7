//! `PersistentTree` - a path-copying segment tree of counts over `[1, domain]`.
//!
//! An update never touches an existing node: it walks from the old root to
//! the target leaf, allocates one fresh node per level, and links every
//! untouched sibling by reference. The old root keeps describing exactly the
//! multiset it described before.
//!
//! Time Complexity:
//! - Empty version: O(1), no allocation (the sentinel is the empty tree)
//! - Update: O(log n) time, exactly `depth + 1` new nodes
//! - Point / range count: O(log n)
//!
//! The node shape is implicit: a node spanning `[lo, hi]` splits at
//! `mid = lo + (hi - lo) / 2` into `[lo, mid]` and `[mid + 1, hi]`, so every
//! version shares one layout and multi-root descents can walk them in lock-step.

pub mod lazy;

use crate::arena::{ArenaStats, Node, NodeArena, NodeId};
use crate::compose::{Sign, SignedRoot};
use crate::config::IndexConfig;
use crate::descent;
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The fixed value domain `[1, size]` of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    size: usize,
}

impl Domain {
    /// Creates the domain `[1, size]`.
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of positions.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Validates a public position and returns it unchanged.
    #[inline]
    pub fn check(&self, position: usize) -> Result<usize> {
        if position == 0 || position > self.size {
            return Err(IndexError::OutOfDomain { position, domain: self.size });
        }
        Ok(position)
    }

    /// Validates a closed position range `[lo, hi]`.
    #[inline]
    pub fn check_range(&self, lo: usize, hi: usize) -> Result<(usize, usize)> {
        if lo > hi {
            return Err(IndexError::InvalidRange { lo, hi });
        }
        Ok((self.check(lo)?, self.check(hi)?))
    }

    /// Height of the tree: edges on the longest root-to-leaf path.
    #[inline]
    pub const fn depth(&self) -> usize {
        Self::depth_of(self.size)
    }

    /// `ceil(log2(size))`, zero for domains of one position or fewer.
    pub const fn depth_of(size: usize) -> usize {
        if size <= 1 {
            0
        } else {
            (usize::BITS - (size - 1).leading_zeros()) as usize
        }
    }

    /// Nodes allocated by one path copy.
    #[inline]
    pub const fn path_len(&self) -> usize {
        self.depth() + 1
    }

    /// Split point of the span `[lo, hi]`.
    #[inline(always)]
    pub(crate) const fn mid(lo: usize, hi: usize) -> usize {
        lo + (hi - lo) / 2
    }
}

/// A persistent count tree: one arena, many roots.
pub struct PersistentTree<'brand> {
    arena: NodeArena<'brand, Node>,
    domain: Domain,
}

impl<'brand> PersistentTree<'brand> {
    /// Creates an unbounded tree over `[1, domain]`.
    pub fn new(domain: usize) -> Self {
        Self::with_config(IndexConfig::new(domain))
    }

    /// Creates a tree sized by `config`.
    pub fn with_config(config: IndexConfig) -> Self {
        let arena = match config.capacity {
            Some(capacity) => NodeArena::with_capacity(capacity),
            None => NodeArena::new(),
        };
        Self {
            arena,
            domain: Domain::new(config.domain),
        }
    }

    /// The value domain.
    #[inline]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Arena usage statistics.
    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// The root of the empty version. Allocates nothing.
    #[inline]
    pub fn empty(&self) -> NodeId<'brand> {
        NodeId::EMPTY
    }

    /// Read-only projection of a node.
    #[inline]
    pub fn get(&self, token: &GhostToken<'brand>, id: NodeId<'brand>) -> Result<&Node> {
        self.arena.get(token, id)
    }

    #[inline(always)]
    pub(crate) fn node(&self, id: NodeId<'brand>) -> &Node {
        self.arena.node(id)
    }

    #[inline]
    pub(crate) fn arena(&self) -> &NodeArena<'brand, Node> {
        &self.arena
    }

    /// Adds `delta` to the count at `position`, returning the new root.
    ///
    /// `old_root` stays valid and describes the same multiset as before. A
    /// root that is not a slot of this tree's arena fails with
    /// [`IndexError::UnknownNode`]. On error nothing has been allocated.
    pub fn update(
        &mut self,
        _token: &mut GhostToken<'brand>,
        old_root: NodeId<'brand>,
        position: usize,
        delta: i64,
    ) -> Result<NodeId<'brand>> {
        let old_root = self.arena.check(old_root)?;
        let position = self.domain.check(position)?;
        self.arena.ensure_room(self.domain.path_len())?;
        self.path_copy(old_root, position, delta)
    }

    /// Path copy without boundary checks; callers validate `position` and
    /// reserve arena room for every copy they are about to make.
    pub(crate) fn path_copy(
        &mut self,
        old_root: NodeId<'brand>,
        position: usize,
        delta: i64,
    ) -> Result<NodeId<'brand>> {
        debug_assert!(self.domain.check(position).is_ok());

        // (old node, descended right)
        let mut path: SmallVec<[(NodeId<'brand>, bool); 64]> = SmallVec::new();
        let (mut lo, mut hi) = (1, self.domain.size());
        let mut node = old_root;
        while lo < hi {
            let mid = Domain::mid(lo, hi);
            let current = self.node(node);
            if position <= mid {
                path.push((node, false));
                node = current.left();
                hi = mid;
            } else {
                path.push((node, true));
                node = current.right();
                lo = mid + 1;
            }
        }

        let leaf_count = self.node(node).count + delta;
        let mut fresh = self.arena.push(Node { left: 0, right: 0, count: leaf_count })?;

        while let Some((old, went_right)) = path.pop() {
            let old = *self.node(old);
            let (left, right) = if went_right {
                (old.left, fresh.raw())
            } else {
                (fresh.raw(), old.right)
            };
            let count = self.node(NodeId::from_raw(left)).count + self.node(NodeId::from_raw(right)).count;
            fresh = self.arena.push(Node { left, right, count })?;
        }

        Ok(fresh)
    }

    /// Count stored at a single position.
    pub fn point_count(&self, _token: &GhostToken<'brand>, root: NodeId<'brand>, position: usize) -> Result<i64> {
        let position = self.domain.check(position)?;
        let (mut lo, mut hi) = (1, self.domain.size());
        let mut node = self.arena.check(root)?;
        while lo < hi && !node.is_empty() {
            let mid = Domain::mid(lo, hi);
            if position <= mid {
                node = self.node(node).left();
                hi = mid;
            } else {
                node = self.node(node).right();
                lo = mid + 1;
            }
        }
        Ok(self.node(node).count)
    }

    /// Number of values in `[lo, hi]` under `root`.
    pub fn range_count(&self, token: &GhostToken<'brand>, root: NodeId<'brand>, lo: usize, hi: usize) -> Result<i64> {
        descent::composed_count(self, token, &[SignedRoot::new(root, Sign::Plus)], lo, hi)
    }

    /// Total number of values under `root`.
    #[inline]
    pub fn total(&self, _token: &GhostToken<'brand>, root: NodeId<'brand>) -> Result<i64> {
        Ok(self.node(self.arena.check(root)?).count)
    }
}
