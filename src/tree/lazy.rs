//! `RollbackTree` - a persistent occupancy bitset with copy-on-write lazy tags.
//!
//! Each position of `[1, domain]` is either occupied (`true`) or free. A range
//! assignment stops at every node fully covered by the range, stores the
//! resolved aggregate there and marks it [`Tag::Pending`]; the node's children
//! are left stale until a later write needs to descend through it. That write
//! clones both children with the tag applied (push-down) instead of editing
//! them, so older versions sharing those children are unaffected.
//!
//! Reads never push down: a pending tag met on the way masks the whole
//! subtree, so queries allocate nothing.
//!
//! Every write records a version; [`RollbackTree::rollback`] re-binds the
//! head to any earlier version in O(1).

use crate::arena::{ArenaStats, NodeArena, NodeId, NULL};
use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::{Domain, PersistentTree};
use crate::version::{VersionHandle, VersionLog};

/// Pending range assignment carried by a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The children describe this subtree.
    #[default]
    Clean,
    /// Every position of the subtree is `bit`; children may be stale.
    Pending(bool),
}

/// A node of the lazily tagged tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LazyNode {
    left: u32,
    right: u32,
    ones: u64,
    tag: Tag,
}

impl LazyNode {
    /// Occupied positions in this node's subinterval.
    #[inline]
    pub const fn ones(&self) -> u64 {
        self.ones
    }

    /// The node's pending assignment.
    #[inline]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    const fn filled(left: u32, right: u32, bit: bool, width: usize) -> Self {
        Self {
            left,
            right,
            ones: if bit { width as u64 } else { 0 },
            tag: Tag::Pending(bit),
        }
    }
}

#[inline(always)]
fn overlap(lo: usize, hi: usize, l: usize, r: usize) -> usize {
    let start = lo.max(l);
    let end = hi.min(r);
    if start > end {
        0
    } else {
        end - start + 1
    }
}

/// Upper bound on nodes one range assignment allocates per tree level: two
/// partially covered nodes, each cloning two children during push-down, plus
/// up to four rewritten children below them.
const ASSIGN_NODES_PER_LEVEL: usize = 8;

/// A versioned occupancy bitset over `[1, domain]`.
pub struct RollbackTree<'brand> {
    arena: NodeArena<'brand, LazyNode>,
    domain: Domain,
    log: VersionLog<'brand>,
}

impl<'brand> RollbackTree<'brand> {
    /// Creates an unbounded tree whose version 0 is the all-free bitset.
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
            log: VersionLog::new(NodeId::EMPTY),
        }
    }

    /// Builds version 1 from a bulk array: position `i + 1` is `bits[i]`.
    ///
    /// Positions beyond `bits.len()` are free. Allocates at most one node per
    /// segment of the full tree.
    pub fn from_bits(token: &mut GhostToken<'brand>, domain: usize, bits: &[bool]) -> Result<Self> {
        let mut tree = Self::new(domain);
        if bits.len() > domain {
            return Err(IndexError::OutOfDomain { position: bits.len(), domain });
        }
        if domain > 0 {
            let root = tree.build_rec(bits, 1, domain)?;
            tree.log.record(token, root, Some(0));
        }
        Ok(tree)
    }

    fn build_rec(&mut self, bits: &[bool], lo: usize, hi: usize) -> Result<NodeId<'brand>> {
        if lo > bits.len() {
            return Ok(NodeId::EMPTY);
        }
        if lo == hi {
            if !bits[lo - 1] {
                return Ok(NodeId::EMPTY);
            }
            return self.arena.push(LazyNode { left: NULL, right: NULL, ones: 1, tag: Tag::Clean });
        }
        let mid = Domain::mid(lo, hi);
        let left = self.build_rec(bits, lo, mid)?;
        let right = self.build_rec(bits, mid + 1, hi)?;
        let ones = self.arena.node(left).ones + self.arena.node(right).ones;
        if ones == 0 {
            return Ok(NodeId::EMPTY);
        }
        self.arena.push(LazyNode { left: left.raw(), right: right.raw(), ones, tag: Tag::Clean })
    }

    /// Builds version 1 from the support of `root` in `tree`: a position is
    /// occupied when its count under `root` is positive.
    ///
    /// The bitset shares the tree's domain and copies only the occupied part
    /// of its shape; later assignments never touch `tree`.
    pub fn from_tree(token: &mut GhostToken<'brand>, tree: &PersistentTree<'brand>, root: NodeId<'brand>) -> Result<Self> {
        let root = tree.arena().check(root)?;
        let domain = tree.domain().size();
        let mut bitset = Self::new(domain);
        if domain > 0 {
            let seeded = bitset.seed_rec(tree, root, 1, domain)?;
            bitset.log.record(token, seeded, Some(0));
        }
        Ok(bitset)
    }

    fn seed_rec(&mut self, tree: &PersistentTree<'brand>, id: NodeId<'brand>, lo: usize, hi: usize) -> Result<NodeId<'brand>> {
        if id.is_empty() {
            return Ok(NodeId::EMPTY);
        }
        let node = *tree.node(id);
        if lo == hi {
            if node.count() <= 0 {
                return Ok(NodeId::EMPTY);
            }
            return self.arena.push(LazyNode { left: NULL, right: NULL, ones: 1, tag: Tag::Clean });
        }
        let mid = Domain::mid(lo, hi);
        let left = self.seed_rec(tree, node.left(), lo, mid)?;
        let right = self.seed_rec(tree, node.right(), mid + 1, hi)?;
        let ones = self.arena.node(left).ones + self.arena.node(right).ones;
        if ones == 0 {
            return Ok(NodeId::EMPTY);
        }
        self.arena.push(LazyNode { left: left.raw(), right: right.raw(), ones, tag: Tag::Clean })
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

    /// Read-only projection of a node.
    pub fn get(&self, token: &GhostToken<'brand>, id: NodeId<'brand>) -> Result<&LazyNode> {
        self.arena.get(token, id)
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

    /// Re-binds the head to version `number` in O(1).
    pub fn rollback(&mut self, token: &mut GhostToken<'brand>, number: usize) -> Result<VersionHandle<'brand>> {
        self.log.rollback(token, number)
    }

    /// Sets every position of `[l, r]` to `bit`, deriving a new version from `v`.
    pub fn assign_range(
        &mut self,
        token: &mut GhostToken<'brand>,
        v: VersionHandle<'brand>,
        l: usize,
        r: usize,
        bit: bool,
    ) -> Result<VersionHandle<'brand>> {
        let root = self.log.resolve(v)?;
        let (l, r) = self.domain.check_range(l, r)?;
        self.arena.ensure_room(ASSIGN_NODES_PER_LEVEL * self.domain.path_len())?;

        let root = self.assign(root, 1, self.domain.size(), l, r, bit)?;
        Ok(self.log.record(token, root, Some(v.number())))
    }

    /// Marks `position` occupied in a new version derived from `v`.
    pub fn insert(&mut self, token: &mut GhostToken<'brand>, v: VersionHandle<'brand>, position: usize) -> Result<VersionHandle<'brand>> {
        self.assign_range(token, v, position, position, true)
    }

    /// Marks `position` free in a new version derived from `v`.
    pub fn remove(&mut self, token: &mut GhostToken<'brand>, v: VersionHandle<'brand>, position: usize) -> Result<VersionHandle<'brand>> {
        self.assign_range(token, v, position, position, false)
    }

    /// Applies `assign_range` to the head.
    pub fn assign_head(&mut self, token: &mut GhostToken<'brand>, l: usize, r: usize, bit: bool) -> Result<VersionHandle<'brand>> {
        let head = self.head();
        self.assign_range(token, head, l, r, bit)
    }

    fn assign(&mut self, id: NodeId<'brand>, lo: usize, hi: usize, l: usize, r: usize, bit: bool) -> Result<NodeId<'brand>> {
        if r < lo || hi < l {
            return Ok(id);
        }
        let node = *self.arena.node(id);
        if l <= lo && hi <= r {
            return self.arena.push(LazyNode::filled(node.left, node.right, bit, hi - lo + 1));
        }

        let mid = Domain::mid(lo, hi);
        let (left, right) = self.push_down(id, lo, mid, hi)?;
        let left = self.assign(left, lo, mid, l, r, bit)?;
        let right = self.assign(right, mid + 1, hi, l, r, bit)?;
        let ones = self.arena.node(left).ones + self.arena.node(right).ones;
        self.arena.push(LazyNode { left: left.raw(), right: right.raw(), ones, tag: Tag::Clean })
    }

    /// Children of `id` as a write sees them.
    ///
    /// A pending tag is materialized by cloning both children with the tag
    /// applied; the parent itself is never edited, the caller allocates its
    /// clean replacement. Leaves have no children and come back unchanged.
    fn push_down(&mut self, id: NodeId<'brand>, lo: usize, mid: usize, hi: usize) -> Result<(NodeId<'brand>, NodeId<'brand>)> {
        let node = *self.arena.node(id);
        if lo == hi {
            return Ok((node.left(), node.right()));
        }
        match node.tag {
            Tag::Clean => Ok((node.left(), node.right())),
            Tag::Pending(bit) => {
                let left = *self.arena.node(node.left());
                let right = *self.arena.node(node.right());
                let left = self.arena.push(LazyNode::filled(left.left, left.right, bit, mid - lo + 1))?;
                let right = self.arena.push(LazyNode::filled(right.left, right.right, bit, hi - mid))?;
                Ok((left, right))
            }
        }
    }

    /// Occupied positions inside `[l, r]` in version `v`.
    pub fn count_ones(&self, _token: &GhostToken<'brand>, v: VersionHandle<'brand>, l: usize, r: usize) -> Result<u64> {
        let root = self.log.resolve(v)?;
        let (l, r) = self.domain.check_range(l, r)?;
        Ok(self.ones_in(root, 1, self.domain.size(), l, r))
    }

    /// Free positions inside `[l, r]` in version `v`.
    pub fn count_zeros(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>, l: usize, r: usize) -> Result<u64> {
        let ones = self.count_ones(token, v, l, r)?;
        Ok((r - l + 1) as u64 - ones)
    }

    /// Whether `position` is occupied in version `v`.
    pub fn contains(&self, token: &GhostToken<'brand>, v: VersionHandle<'brand>, position: usize) -> Result<bool> {
        Ok(self.count_ones(token, v, position, position)? == 1)
    }

    fn ones_in(&self, id: NodeId<'brand>, lo: usize, hi: usize, l: usize, r: usize) -> u64 {
        if r < lo || hi < l || id.is_empty() {
            return 0;
        }
        let node = self.arena.node(id);
        if let Tag::Pending(bit) = node.tag {
            return if bit { overlap(lo, hi, l, r) as u64 } else { 0 };
        }
        if l <= lo && hi <= r {
            return node.ones;
        }
        let mid = Domain::mid(lo, hi);
        self.ones_in(node.left(), lo, mid, l, r) + self.ones_in(node.right(), mid + 1, hi, l, r)
    }

    /// The `k`-th occupied position (1-based) in version `v`.
    pub fn kth_one(&self, _token: &GhostToken<'brand>, v: VersionHandle<'brand>, k: usize) -> Result<usize> {
        let root = self.log.resolve(v)?;
        let total = self.arena.node(root).ones;
        if k == 0 || k as u64 > total {
            return Err(IndexError::OutOfRange { k, available: total as i64 });
        }

        let mut remaining = k as u64;
        let mut id = root;
        let (mut lo, mut hi) = (1, self.domain.size());
        while lo < hi {
            let node = self.arena.node(id);
            if let Tag::Pending(bit) = node.tag {
                debug_assert!(bit, "a free subtree cannot hold the k-th occupied position");
                return Ok(lo + remaining as usize - 1);
            }
            let mid = Domain::mid(lo, hi);
            let left = self.arena.node(node.left()).ones;
            if remaining <= left {
                id = node.left();
                hi = mid;
            } else {
                remaining -= left;
                id = node.right();
                lo = mid + 1;
            }
        }
        Ok(lo)
    }
}

impl LazyNode {
    #[inline(always)]
    const fn left<'brand>(&self) -> NodeId<'brand> {
        NodeId::from_raw(self.left)
    }

    #[inline(always)]
    const fn right<'brand>(&self) -> NodeId<'brand> {
        NodeId::from_raw(self.right)
    }
}
