//! Public index facades.
//!
//! Each facade owns one [`PersistentTree`](crate::tree::PersistentTree) arena
//! and one composition policy:
//!
//! - [`VersionedIndex`]: an append-only chain of versions; a query composes
//!   two versions as `v_hi - v_lo`.
//! - [`DynamicRangeIndex`]: a mutable array whose ranges are composed from
//!   Fenwick cells of persistent roots.
//! - [`TreePathIndex`]: per-node path roots; a tree path is composed by
//!   inclusion-exclusion over an external LCA oracle.

pub mod dynamic;
pub mod tree_path;
pub mod versioned;

pub use dynamic::DynamicRangeIndex;
pub use tree_path::TreePathIndex;
pub use versioned::VersionedIndex;
