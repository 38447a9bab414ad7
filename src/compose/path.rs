//! `PathRoots` - one persistent root per tree node, built in a single traversal.
//!
//! Visiting nodes parent-before-child, node `u` receives
//! `root[u] = update(root[parent(u)], rank(u), +1)`, so `root[u]` holds the
//! values on the path from its traversal root down to `u`. The simple path
//! `u..v` is recovered by inclusion-exclusion over the lowest common ancestor.

use crate::arena::NodeId;
use crate::compose::{push_root, Sign, SignedRoots};
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use crate::tree::PersistentTree;
use std::collections::VecDeque;

/// Root-to-node prefix roots for every node of a rooted forest.
pub struct PathRoots<'brand> {
    roots: Vec<NodeId<'brand>>,
}

impl<'brand> PathRoots<'brand> {
    /// Builds the prefix roots of a forest.
    ///
    /// `parents[u]` is the parent of node `u` (`None` for a traversal root) and
    /// `ranks[u]` is the compressed value stored at `u`. All inputs are
    /// validated before the first node is allocated.
    pub fn build(
        _token: &mut GhostToken<'brand>,
        tree: &mut PersistentTree<'brand>,
        parents: &[Option<usize>],
        ranks: &[usize],
    ) -> Result<Self> {
        let n = parents.len();
        if ranks.len() != n {
            return Err(IndexError::UnknownNode { node: ranks.len().min(n), nodes: n });
        }

        let mut children = vec![Vec::new(); n];
        let mut queue = VecDeque::new();
        for (u, parent) in parents.iter().enumerate() {
            tree.domain().check(ranks[u])?;
            match *parent {
                Some(p) if p >= n => return Err(IndexError::UnknownNode { node: p, nodes: n }),
                Some(p) => children[p].push(u),
                None => queue.push_back(u),
            }
        }

        // Parent-before-child order; nodes on a parent cycle are never reached.
        let mut order = Vec::with_capacity(n);
        while let Some(u) = queue.pop_front() {
            order.push(u);
            queue.extend(children[u].iter().copied());
        }
        if order.len() != n {
            let mut seen = vec![false; n];
            for &u in &order {
                seen[u] = true;
            }
            let node = seen.iter().position(|&s| !s).unwrap_or(0);
            return Err(IndexError::UnknownNode { node, nodes: n });
        }

        tree.arena().ensure_room(n * tree.domain().path_len())?;

        let mut roots = vec![NodeId::EMPTY; n];
        for u in order {
            let base = parents[u].map_or(NodeId::EMPTY, |p| roots[p]);
            roots[u] = tree.path_copy(base, ranks[u], 1)?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(nodes = n, arena = tree.stats().nodes, "built path roots");

        Ok(Self { roots })
    }

    /// Number of tree nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true if the forest is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Prefix root of node `u`.
    pub fn root(&self, u: usize) -> Result<NodeId<'brand>> {
        self.roots
            .get(u)
            .copied()
            .ok_or(IndexError::UnknownNode { node: u, nodes: self.roots.len() })
    }

    /// Signed roots whose sum is the multiset of values on the path `u..v`.
    ///
    /// `lca` must be the lowest common ancestor of `u` and `v`, and
    /// `lca_parent` its parent (`None` when `lca` is a traversal root).
    pub fn compose_path(
        &self,
        u: usize,
        v: usize,
        lca: usize,
        lca_parent: Option<usize>,
    ) -> Result<SignedRoots<'brand>> {
        let mut out = SignedRoots::new();
        push_root(&mut out, self.root(u)?, Sign::Plus);
        push_root(&mut out, self.root(v)?, Sign::Plus);
        push_root(&mut out, self.root(lca)?, Sign::Minus);
        if let Some(p) = lca_parent {
            push_root(&mut out, self.root(p)?, Sign::Minus);
        }
        Ok(out)
    }
}
