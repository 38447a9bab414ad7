//! `TreePathIndex` - order statistics over simple paths of a rooted forest.
//!
//! Built once from an [`LcaOracle`]: every node gets a persistent root of the
//! values on its root-to-node path. A query for the path `u..v` composes
//! `root[u] + root[v] - root[lca] - root[parent(lca)]`.

use crate::arena::ArenaStats;
use crate::compose::{PathRoots, SignedRoots};
use crate::config::IndexConfig;
use crate::descent;
use crate::error::{IndexError, Result};
use crate::oracle::LcaOracle;
use crate::token::GhostToken;
use crate::tree::PersistentTree;

/// Path order statistics over a forest described by an LCA oracle `O`.
pub struct TreePathIndex<'brand, O> {
    tree: PersistentTree<'brand>,
    paths: PathRoots<'brand>,
    oracle: O,
}

impl<'brand, O: LcaOracle> TreePathIndex<'brand, O> {
    /// Builds path roots for every node of `oracle`'s forest.
    ///
    /// `ranks[u]` is the compressed value of node `u` in `[1, domain]`.
    pub fn build(token: &mut GhostToken<'brand>, domain: usize, oracle: O, ranks: &[usize]) -> Result<Self> {
        Self::with_config(token, IndexConfig::new(domain), oracle, ranks)
    }

    /// Like [`build`](Self::build), with an explicit arena configuration.
    pub fn with_config(token: &mut GhostToken<'brand>, config: IndexConfig, oracle: O, ranks: &[usize]) -> Result<Self> {
        let mut tree = PersistentTree::with_config(config);
        let parents: Vec<Option<usize>> = (0..oracle.len()).map(|u| oracle.parent(u)).collect();
        let paths = PathRoots::build(token, &mut tree, &parents, ranks)?;
        Ok(Self { tree, paths, oracle })
    }

    /// Number of tree nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the forest has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The supplied oracle.
    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
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

    /// Signed roots of the path `u..v`.
    pub fn compose(&self, u: usize, v: usize) -> Result<SignedRoots<'brand>> {
        let nodes = self.paths.len();
        for node in [u, v] {
            if node >= nodes {
                return Err(IndexError::UnknownNode { node, nodes });
            }
        }
        let lca = self.oracle.lca(u, v).ok_or(IndexError::UnknownNode { node: v, nodes })?;
        self.paths.compose_path(u, v, lca, self.oracle.parent(lca))
    }

    /// The `k`-th smallest value on the path `u..v`.
    pub fn tree_path_kth(&self, token: &GhostToken<'brand>, u: usize, v: usize, k: usize) -> Result<usize> {
        let scope = self.compose(u, v)?;
        descent::kth_smallest(&self.tree, token, &scope, k)
    }

    /// The `k`-th largest value on the path `u..v`.
    pub fn tree_path_kth_largest(&self, token: &GhostToken<'brand>, u: usize, v: usize, k: usize) -> Result<usize> {
        let scope = self.compose(u, v)?;
        descent::kth_largest(&self.tree, token, &scope, k)
    }

    /// Number of path values lying in `[lo, hi]`.
    pub fn path_count(&self, token: &GhostToken<'brand>, u: usize, v: usize, lo: usize, hi: usize) -> Result<i64> {
        let scope = self.compose(u, v)?;
        descent::composed_count(&self.tree, token, &scope, lo, hi)
    }

    /// Number of nodes on the path `u..v`.
    pub fn path_len(&self, token: &GhostToken<'brand>, u: usize, v: usize) -> Result<i64> {
        let scope = self.compose(u, v)?;
        descent::composed_total(&self.tree, token, &scope)
    }
}
