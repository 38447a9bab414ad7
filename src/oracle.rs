//! Collaborator interfaces consumed by the indexes, with default implementations.
//!
//! - [`Compressor`]: maps raw values onto the dense domain `[1, m]` and back.
//! - [`LcaOracle`]: parent and lowest-common-ancestor queries over a rooted forest.
//!
//! Both are supplied fully built before the first query.

use crate::error::{IndexError, Result};
use std::collections::VecDeque;

/// Coordinate compression into a dense 1-based domain.
pub trait Compressor<T> {
    /// Size of the compressed domain.
    fn domain(&self) -> usize;

    /// Rank of `raw` in `[1, domain]`, or `None` if it was never registered.
    fn rank(&self, raw: &T) -> Option<usize>;

    /// The raw value with rank `rank`.
    fn value(&self, rank: usize) -> Option<&T>;
}

/// Sort-and-dedup compressor: rank `i` is the `i`-th smallest distinct value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateCompressor<T> {
    sorted: Vec<T>,
}

impl<T: Ord + Clone> CoordinateCompressor<T> {
    /// Collects, sorts and deduplicates `values`.
    pub fn new<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut sorted: Vec<T> = values.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        Self { sorted }
    }

    /// Ranks every value of `raw`, failing on the first unknown one.
    pub fn ranks(&self, raw: &[T]) -> Result<Vec<usize>> {
        raw.iter()
            .enumerate()
            .map(|(i, value)| {
                self.rank(value)
                    .ok_or(IndexError::OutOfDomain { position: i + 1, domain: self.sorted.len() })
            })
            .collect()
    }
}

impl<T: Ord + Clone> FromIterator<T> for CoordinateCompressor<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T: Ord> Compressor<T> for CoordinateCompressor<T> {
    #[inline]
    fn domain(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    fn rank(&self, raw: &T) -> Option<usize> {
        self.sorted.binary_search(raw).ok().map(|i| i + 1)
    }

    #[inline]
    fn value(&self, rank: usize) -> Option<&T> {
        rank.checked_sub(1).and_then(|i| self.sorted.get(i))
    }
}

/// Ancestor queries over a rooted forest whose nodes are `0..len`.
pub trait LcaOracle {
    /// Number of nodes.
    fn len(&self) -> usize;

    /// Returns true if the forest has no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parent of `node`, `None` for a root.
    fn parent(&self, node: usize) -> Option<usize>;

    /// Lowest common ancestor of `u` and `v`, `None` when they lie in
    /// different trees of the forest.
    fn lca(&self, u: usize, v: usize) -> Option<usize>;
}

/// Binary-lifting LCA oracle: O(n log n) preprocessing, O(log n) per query.
#[derive(Debug, Clone)]
pub struct BinaryLifting {
    parent: Vec<Option<usize>>,
    depth: Vec<usize>,
    /// `up[j][u]` is the `2^j`-th ancestor of `u`, saturating at the root.
    up: Vec<Vec<usize>>,
}

impl BinaryLifting {
    /// Preprocesses a forest given by its parent array.
    pub fn new(parent: &[Option<usize>]) -> Result<Self> {
        let n = parent.len();
        let mut children = vec![Vec::new(); n];
        let mut queue = VecDeque::new();
        for (u, p) in parent.iter().enumerate() {
            match *p {
                Some(p) if p >= n => return Err(IndexError::UnknownNode { node: p, nodes: n }),
                Some(p) => children[p].push(u),
                None => queue.push_back(u),
            }
        }

        let mut depth = vec![0; n];
        let mut visited = 0;
        while let Some(u) = queue.pop_front() {
            visited += 1;
            for &c in &children[u] {
                depth[c] = depth[u] + 1;
                queue.push_back(c);
            }
        }
        if visited != n {
            let node = (0..n).find(|&u| parent[u].is_some() && depth[u] == 0).unwrap_or(0);
            return Err(IndexError::UnknownNode { node, nodes: n });
        }

        let levels = (usize::BITS - n.max(1).leading_zeros()) as usize;
        let mut up = Vec::with_capacity(levels.max(1));
        up.push((0..n).map(|u| parent[u].unwrap_or(u)).collect::<Vec<_>>());
        for j in 1..levels.max(1) {
            let prev = &up[j - 1];
            let next = (0..n).map(|u| prev[prev[u]]).collect();
            up.push(next);
        }

        Ok(Self {
            parent: parent.to_vec(),
            depth,
            up,
        })
    }

    /// Preprocesses a tree given as undirected edges, rooted at `root`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)], root: usize) -> Result<Self> {
        if root >= n {
            return Err(IndexError::UnknownNode { node: root, nodes: n });
        }
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in edges {
            if a >= n || b >= n {
                return Err(IndexError::UnknownNode { node: a.max(b), nodes: n });
            }
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        let mut parent = vec![None; n];
        let mut seen = vec![false; n];
        let mut queue = VecDeque::from([root]);
        seen[root] = true;
        while let Some(u) = queue.pop_front() {
            for &w in &adjacency[u] {
                if !seen[w] {
                    seen[w] = true;
                    parent[w] = Some(u);
                    queue.push_back(w);
                }
            }
        }
        Self::new(&parent)
    }

    /// Depth of `node` below its root, or `None` for an unknown node.
    #[inline]
    pub fn depth(&self, node: usize) -> Option<usize> {
        self.depth.get(node).copied()
    }

    /// The ancestor `steps` levels above `node`, saturating at the root, or
    /// `None` for an unknown node.
    pub fn ancestor(&self, node: usize, steps: usize) -> Option<usize> {
        let depth = self.depth(node)?;
        Some(self.lift(node, steps.min(depth)))
    }

    /// Climbs `steps <= depth[node]` levels.
    fn lift(&self, mut node: usize, steps: usize) -> usize {
        for (j, level) in self.up.iter().enumerate() {
            if steps >> j & 1 == 1 {
                node = level[node];
            }
        }
        node
    }
}

impl LcaOracle for BinaryLifting {
    #[inline]
    fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    fn parent(&self, node: usize) -> Option<usize> {
        self.parent.get(node).copied().flatten()
    }

    fn lca(&self, u: usize, v: usize) -> Option<usize> {
        if u >= self.len() || v >= self.len() {
            return None;
        }
        let (mut u, mut v) = if self.depth[u] >= self.depth[v] { (u, v) } else { (v, u) };
        u = self.lift(u, self.depth[u] - self.depth[v]);
        if u == v {
            return Some(u);
        }
        for level in self.up.iter().rev() {
            if level[u] != level[v] {
                u = level[u];
                v = level[v];
            }
        }
        let (pu, pv) = (self.parent(u), self.parent(v));
        match (pu, pv) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressor_ranks_are_dense_and_invertible() {
        let compressor: CoordinateCompressor<i64> = [40, -3, 40, 7, 1000].into_iter().collect();
        assert_eq!(compressor.domain(), 4);
        assert_eq!(compressor.rank(&-3), Some(1));
        assert_eq!(compressor.rank(&1000), Some(4));
        assert_eq!(compressor.rank(&8), None);
        assert_eq!(compressor.value(2), Some(&7));
        assert_eq!(compressor.value(0), None);
        assert_eq!(compressor.ranks(&[7, 40]).unwrap(), vec![2, 3]);
        assert!(compressor.ranks(&[7, 41]).is_err());
    }

    //        0
    //      / | \
    //     1  2  3
    //    /      |
    //   4       5
    //   |
    //   6
    fn sample() -> BinaryLifting {
        BinaryLifting::from_edges(7, &[(0, 1), (0, 2), (0, 3), (1, 4), (3, 5), (4, 6)], 0).unwrap()
    }

    #[test]
    fn lca_matches_hand_computed_ancestors() {
        let oracle = sample();
        assert_eq!(oracle.lca(6, 2), Some(0));
        assert_eq!(oracle.lca(6, 4), Some(4));
        assert_eq!(oracle.lca(6, 1), Some(1));
        assert_eq!(oracle.lca(5, 6), Some(0));
        assert_eq!(oracle.lca(3, 3), Some(3));
        assert_eq!(oracle.parent(0), None);
        assert_eq!(oracle.parent(6), Some(4));
        assert_eq!(oracle.depth(6), Some(3));
        assert_eq!(oracle.ancestor(6, 2), Some(1));
    }

    #[test]
    fn unknown_nodes_have_no_depth_or_ancestor() {
        let oracle = sample();
        assert_eq!(oracle.depth(7), None);
        assert_eq!(oracle.ancestor(7, 1), None);
        assert_eq!(oracle.ancestor(usize::MAX, 0), None);
        // Steps past the root saturate there.
        assert_eq!(oracle.ancestor(6, 3), Some(0));
        assert_eq!(oracle.ancestor(6, 1 << 20), Some(0));
        assert_eq!(oracle.ancestor(5, 0), Some(5));
    }

    #[test]
    fn forests_have_no_common_ancestor_across_trees() {
        let oracle = BinaryLifting::new(&[None, Some(0), None, Some(2)]).unwrap();
        assert_eq!(oracle.lca(1, 3), None);
        assert_eq!(oracle.lca(1, 0), Some(0));
    }

    #[test]
    fn cycles_are_rejected() {
        let err = BinaryLifting::new(&[Some(1), Some(0), None]).unwrap_err();
        assert!(matches!(err, IndexError::UnknownNode { nodes: 3, .. }));
    }
}
