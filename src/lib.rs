//! # `strata` - Persistent Versioned Order-Statistics Index
//!
//! A toolkit of path-copying segment trees over a fixed value domain
//! `[1, m]`, composed at query time to answer "k-th smallest" and range-count
//! questions over version differences, array ranges and tree paths.
//!
//! ## Guarantees
//!
//! ### Persistence
//! - **Write-once nodes**: an update allocates exactly one fresh path and links
//!   every untouched subtree by reference. No node reachable from a returned
//!   root is ever modified, so every older version answers queries exactly as
//!   it did when it was created.
//! - **O(1) rollback**: version tables only re-bind their head.
//! - **All-or-nothing writes**: inputs and arena room are checked before the
//!   first allocation, so a failed call never links a partial path.
//!
//! ### Single writer, many readers
//! - Structures are branded by a [`GhostToken`] scope. Writes take
//!   `&mut GhostToken<'brand>`, reads take `&GhostToken<'brand>`, so the
//!   borrow checker enforces the single-writer discipline. Readers on many
//!   threads may share one index and one token.
//! - Node ids and version handles carry the brand and cannot leak into
//!   structures of another scope. Inside one scope, a version handle only
//!   resolves in the structure that issued it, and a node id from a foreign
//!   arena is reported as [`IndexError::UnknownNode`] when it falls outside
//!   the receiving arena.
//!
//! ## Architecture
//!
//! 1. **Node arena** ([`NodeArena`]): flat append-only pool; slot 0 is the
//!    empty-subtree sentinel, which makes empty versions free.
//! 2. **Persistent core** ([`PersistentTree`]): path-copying point updates and
//!    count queries.
//! 3. **Composers** ([`compose`]): [`FenwickRoots`] for array ranges and
//!    [`PathRoots`] for tree paths, both producing lists of signed roots.
//! 4. **Descent** ([`descent`]): lock-step multi-root search for order
//!    statistics over a composed multiset, without materializing it.
//! 5. **Lazy extension** ([`RollbackTree`]): copy-on-write range assignment
//!    with pending tags and a version table.
//!
//! ## Example
//!
//! ```rust
//! use strata::{GhostToken, VersionedIndex};
//!
//! GhostToken::new(|mut token| {
//!     let mut index = VersionedIndex::new(5);
//!     let v5 = index.build(&mut token, &[1, 2, 3, 4, 5]).unwrap();
//!     let v0 = index.initial();
//!     assert_eq!(index.range_kth(&token, v0, v5, 3).unwrap(), 3);
//!
//!     let v3 = index.rollback(&mut token, 3).unwrap();
//!     assert_eq!(index.range_kth(&token, v0, v3, 2).unwrap(), 2);
//! });
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

pub mod arena;
pub mod compose;
pub mod config;
pub mod descent;
pub mod error;
pub mod index;
pub mod oracle;
#[cfg(any(test, feature = "proptest"))]
pub mod strategies;
pub mod token;
pub mod tree;
pub mod version;

pub use arena::{capacity_for, ArenaStats, Node, NodeArena, NodeId};
pub use compose::{FenwickRoots, PathRoots, Sign, SignedRoot, SignedRoots};
pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use index::{DynamicRangeIndex, TreePathIndex, VersionedIndex};
pub use oracle::{BinaryLifting, Compressor, CoordinateCompressor, LcaOracle};
pub use token::{GhostToken, InvariantLifetime};
pub use tree::lazy::{LazyNode, RollbackTree, Tag};
pub use tree::{Domain, PersistentTree};
pub use version::{VersionHandle, VersionLog};

// Compile-time assertions for node layout.
const _: () = {
    use core::mem;

    // Tokens are ZSTs.
    assert!(mem::size_of::<GhostToken<'static>>() == 0);

    // Branded ids are plain slot indices.
    assert!(mem::size_of::<NodeId<'static>>() == mem::size_of::<u32>());
    assert!(mem::size_of::<Option<NodeId<'static>>>() <= mem::size_of::<u64>());

    // Two links and a count: a node fits in two machine words.
    assert!(mem::size_of::<Node>() == 16);
    assert!(mem::size_of::<LazyNode>() <= 24);

    // Signed roots stay inline for the common composition sizes.
    assert!(mem::size_of::<SignedRoot<'static>>() <= 8);
};
