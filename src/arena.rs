//! `NodeArena` - a flat, append-only, token-gated pool of tree nodes.
//!
//! Nodes are written once and never freed or mutated afterwards, so a node is
//! shared by every version whose update path did not pass through it. Slot `0`
//! is a permanent sentinel holding `N::default()`: it stands for "absent
//! subtree" and doubles as the root of every empty version, which makes the
//! empty tree free to build.
//!
//! Growth requires `&mut GhostToken<'brand>` (single writer); reads require
//! `&GhostToken<'brand>`. Allocation is O(1) amortized; an arena created with a
//! capacity refuses to grow past it with [`IndexError::CapacityExceeded`].

use crate::error::{IndexError, Result};
use crate::token::{GhostToken, InvariantLifetime};
use serde::{Deserialize, Serialize};

/// Raw slot index of the sentinel node.
pub(crate) const NULL: u32 = 0;

/// A branded handle to a node stored in a [`NodeArena`].
///
/// ### Invariant
/// For any `id` returned by an arena, `id.index() < arena.len()` for the rest
/// of that arena's lifetime, because arenas never shrink. The brand is shared
/// by every arena of one token scope, so public entry points re-check the
/// bound with [`NodeArena::check`] and report [`IndexError::UnknownNode`]
/// for ids that do not fit.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId<'brand>(u32, InvariantLifetime<'brand>);

impl<'brand> NodeId<'brand> {
    /// The sentinel id: the empty subtree and the root of every empty version.
    pub const EMPTY: Self = Self(NULL, InvariantLifetime::new());

    #[inline(always)]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw, InvariantLifetime::new())
    }

    #[inline(always)]
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the slot index of this node inside its arena.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for the sentinel id.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == NULL
    }
}

/// A count-carrying segment tree node.
///
/// `left`/`right` are raw arena slots (`0` = absent). `count` is the signed
/// number of values routed through this node's subinterval.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub(crate) left: u32,
    pub(crate) right: u32,
    pub(crate) count: i64,
}

impl Node {
    /// Number of values inside this node's subinterval.
    #[inline(always)]
    pub const fn count(&self) -> i64 {
        self.count
    }

    /// Left child handle (the sentinel when absent).
    #[inline(always)]
    pub const fn left<'brand>(&self) -> NodeId<'brand> {
        NodeId::from_raw(self.left)
    }

    /// Right child handle (the sentinel when absent).
    #[inline(always)]
    pub const fn right<'brand>(&self) -> NodeId<'brand> {
        NodeId::from_raw(self.right)
    }
}

/// Memory usage statistics for a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaStats {
    /// Number of slots in use, sentinel included.
    pub nodes: usize,
    /// Configured node limit, if any.
    pub capacity: Option<usize>,
    /// Size of one node in bytes.
    pub node_size: usize,
}

impl ArenaStats {
    /// Approximate bytes held by live node slots.
    #[inline]
    pub fn approximate_memory_usage(&self) -> usize {
        self.nodes * self.node_size
    }

    /// Fraction of the configured capacity already used, `0.0` when unbounded.
    #[inline]
    pub fn fill_ratio(&self) -> f64 {
        match self.capacity {
            Some(capacity) if capacity > 0 => self.nodes as f64 / capacity as f64,
            _ => 0.0,
        }
    }
}

/// An append-only node pool branded with `'brand`.
pub struct NodeArena<'brand, N> {
    nodes: Vec<N>,
    capacity: Option<usize>,
    _brand: InvariantLifetime<'brand>,
}

impl<'brand, N: Copy + Default> NodeArena<'brand, N> {
    /// Creates an unbounded arena holding only the sentinel.
    pub fn new() -> Self {
        Self {
            nodes: vec![N::default()],
            capacity: None,
            _brand: InvariantLifetime::new(),
        }
    }

    /// Creates an arena that refuses to hold more than `capacity` slots
    /// (sentinel included). Storage for all of them is reserved up front.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut nodes = Vec::with_capacity(capacity);
        nodes.push(N::default());
        Self {
            nodes,
            capacity: Some(capacity),
            _brand: InvariantLifetime::new(),
        }
    }

    /// Number of slots in use, sentinel included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if only the sentinel is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The configured slot limit.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Fails unless `additional` more nodes fit.
    ///
    /// Callers check the whole path length before allocating its first node,
    /// so an operation either links a complete path or allocates nothing.
    #[inline]
    pub fn ensure_room(&self, additional: usize) -> Result<()> {
        let limit = self.capacity.unwrap_or(u32::MAX as usize).min(u32::MAX as usize);
        if self.nodes.len() + additional > limit {
            return Err(IndexError::CapacityExceeded { capacity: limit });
        }
        Ok(())
    }

    /// Appends a write-once node and returns its id.
    pub fn alloc(&mut self, _token: &mut GhostToken<'brand>, node: N) -> Result<NodeId<'brand>> {
        self.push(node)
    }

    /// Allocation path used by the tree cores, which already hold the
    /// writer token further up the call chain.
    #[inline]
    pub(crate) fn push(&mut self, node: N) -> Result<NodeId<'brand>> {
        self.ensure_room(1)?;
        let raw = self.nodes.len() as u32;
        self.nodes.push(node);

        #[cfg(feature = "tracing")]
        if self.nodes.len().is_power_of_two() {
            tracing::trace!(nodes = self.nodes.len(), "node arena grew");
        }

        Ok(NodeId::from_raw(raw))
    }

    /// Fails with [`IndexError::UnknownNode`] unless `id` names a slot of
    /// this arena.
    #[inline]
    pub fn check(&self, id: NodeId<'brand>) -> Result<NodeId<'brand>> {
        if id.index() >= self.nodes.len() {
            return Err(IndexError::UnknownNode { node: id.index(), nodes: self.nodes.len() });
        }
        Ok(id)
    }

    /// Read-only projection of a node.
    #[inline]
    pub fn get(&self, _token: &GhostToken<'brand>, id: NodeId<'brand>) -> Result<&N> {
        let id = self.check(id)?;
        Ok(self.node(id))
    }

    #[inline(always)]
    pub(crate) fn node(&self, id: NodeId<'brand>) -> &N {
        &self.nodes[id.index()]
    }

    /// Returns usage statistics.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            nodes: self.nodes.len(),
            capacity: self.capacity,
            node_size: core::mem::size_of::<N>(),
        }
    }
}

impl<'brand, N: Copy + Default> Default for NodeArena<'brand, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of arena slots needed for `steps` path-copying operations over a
/// domain of `domain` positions, sentinel included.
///
/// One step is an `update` call or one traversal step of a tree-path build;
/// each allocates exactly `ceil(log2(domain)) + 1` nodes.
pub fn capacity_for(steps: usize, domain: usize) -> usize {
    1 + steps.saturating_mul(crate::tree::Domain::depth_of(domain) + 1)
}
