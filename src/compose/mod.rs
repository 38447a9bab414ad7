//! Version composers: resolve a logical query scope into a short list of
//! signed roots whose structural sum is the multiset of that scope.
//!
//! Two policies share the same output contract:
//! - [`FenwickRoots`]: one persistent root per Fenwick cell of an array, so an
//!   array range `[l, r]` is `prefix(r) - prefix(l - 1)`, O(log n) roots each.
//! - [`PathRoots`]: one persistent root per tree node capturing its
//!   root-to-node path, so the path `u..v` is
//!   `root[u] + root[v] - root[lca] - root[parent(lca)]`.
//!
//! The composed multiset is never materialized; [`crate::descent`] walks the
//! listed roots in lock-step.

pub mod fenwick;
pub mod path;

pub use fenwick::FenwickRoots;
pub use path::PathRoots;

use crate::arena::NodeId;
use smallvec::SmallVec;

/// Sign of a root's contribution to a composed multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Counts are added.
    Plus,
    /// Counts are subtracted.
    Minus,
}

impl Sign {
    /// Applies the sign to a count.
    #[inline(always)]
    pub const fn apply(self, count: i64) -> i64 {
        match self {
            Sign::Plus => count,
            Sign::Minus => -count,
        }
    }
}

/// One term of a composed multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedRoot<'brand> {
    /// Root of the contributing version.
    pub root: NodeId<'brand>,
    /// Whether its counts are added or subtracted.
    pub sign: Sign,
}

impl<'brand> SignedRoot<'brand> {
    /// Pairs a root with a sign.
    #[inline]
    pub const fn new(root: NodeId<'brand>, sign: Sign) -> Self {
        Self { root, sign }
    }

    /// A positively signed root.
    #[inline]
    pub const fn plus(root: NodeId<'brand>) -> Self {
        Self::new(root, Sign::Plus)
    }

    /// A negatively signed root.
    #[inline]
    pub const fn minus(root: NodeId<'brand>) -> Self {
        Self::new(root, Sign::Minus)
    }
}

/// A bounded list of signed roots representing one logical multiset.
pub type SignedRoots<'brand> = SmallVec<[SignedRoot<'brand>; 16]>;

/// Appends `root` unless it is the empty tree, which contributes nothing.
#[inline]
pub(crate) fn push_root<'brand>(out: &mut SignedRoots<'brand>, root: NodeId<'brand>, sign: Sign) {
    if !root.is_empty() {
        out.push(SignedRoot::new(root, sign));
    }
}
