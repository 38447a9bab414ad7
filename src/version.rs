//! `VersionLog` - the append-only version table.
//!
//! Every write records a `(number, root)` pair; numbers increase
//! monotonically and entries are never removed or rewritten. Because nodes are
//! write-once, rolling back is just re-binding the active head to an earlier
//! entry: O(1), no recomputation, and later versions stay reachable.
//!
//! Each log draws a process-unique id at construction and stamps it on every
//! handle it issues. Structures sharing one token scope share a brand, so the
//! id is what keeps their handles apart.

use crate::arena::NodeId;
use crate::error::{IndexError, Result};
use crate::token::GhostToken;
use core::sync::atomic::{AtomicUsize, Ordering};

static NEXT_LOG: AtomicUsize = AtomicUsize::new(1);

/// A branded reference to one recorded version of one log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionHandle<'brand> {
    number: usize,
    root: NodeId<'brand>,
    log: usize,
}

impl<'brand> VersionHandle<'brand> {
    /// Monotonically increasing version number.
    #[inline]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Root of the version's tree.
    #[inline]
    pub const fn root(&self) -> NodeId<'brand> {
        self.root
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<'brand> {
    root: NodeId<'brand>,
    parent: Option<usize>,
}

/// Append-only table of versions with a movable head.
pub struct VersionLog<'brand> {
    id: usize,
    entries: Vec<Entry<'brand>>,
    head: usize,
}

impl<'brand> VersionLog<'brand> {
    /// Creates a log whose version 0 is `initial`.
    pub fn new(initial: NodeId<'brand>) -> Self {
        Self {
            id: NEXT_LOG.fetch_add(1, Ordering::Relaxed),
            entries: vec![Entry { root: initial, parent: None }],
            head: 0,
        }
    }

    #[inline]
    fn handle(&self, number: usize, root: NodeId<'brand>) -> VersionHandle<'brand> {
        VersionHandle { number, root, log: self.id }
    }

    /// Number of versions issued so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: version 0 exists from construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a new version derived from `parent` and moves the head to it.
    pub fn record(
        &mut self,
        _token: &mut GhostToken<'brand>,
        root: NodeId<'brand>,
        parent: Option<usize>,
    ) -> VersionHandle<'brand> {
        let number = self.entries.len();
        self.entries.push(Entry { root, parent });
        self.head = number;

        #[cfg(feature = "tracing")]
        tracing::trace!(version = number, parent = ?parent, root = root.index(), "recorded version");

        self.handle(number, root)
    }

    /// Handle of version `number`.
    pub fn get(&self, number: usize) -> Result<VersionHandle<'brand>> {
        self.entries
            .get(number)
            .map(|entry| self.handle(number, entry.root))
            .ok_or(IndexError::UnknownVersion { version: number, issued: self.entries.len() })
    }

    /// Validates a handle against this log and returns its root.
    ///
    /// A handle issued by any other log fails with
    /// [`IndexError::UnknownVersion`], even when its number and root happen to
    /// match an entry here.
    pub fn resolve(&self, handle: VersionHandle<'brand>) -> Result<NodeId<'brand>> {
        if handle.log != self.id {
            return Err(IndexError::UnknownVersion { version: handle.number, issued: self.entries.len() });
        }
        match self.entries.get(handle.number) {
            Some(entry) if entry.root == handle.root => Ok(entry.root),
            _ => Err(IndexError::UnknownVersion { version: handle.number, issued: self.entries.len() }),
        }
    }

    /// Version 0.
    #[inline]
    pub fn initial(&self) -> VersionHandle<'brand> {
        self.handle(0, self.entries[0].root)
    }

    /// The version writes currently extend.
    #[inline]
    pub fn head(&self) -> VersionHandle<'brand> {
        self.handle(self.head, self.entries[self.head].root)
    }

    /// The version `number` was derived from.
    pub fn parent(&self, number: usize) -> Result<Option<usize>> {
        self.entries
            .get(number)
            .map(|entry| entry.parent)
            .ok_or(IndexError::UnknownVersion { version: number, issued: self.entries.len() })
    }

    /// Re-binds the head to version `number` in O(1).
    pub fn rollback(&mut self, _token: &mut GhostToken<'brand>, number: usize) -> Result<VersionHandle<'brand>> {
        let handle = self.get(number)?;
        self.head = number;

        #[cfg(feature = "tracing")]
        tracing::trace!(version = number, "rolled back head");

        Ok(handle)
    }

    /// Iterates over every recorded version in issue order.
    pub fn iter(&self) -> impl Iterator<Item = VersionHandle<'brand>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(number, entry)| self.handle(number, entry.root))
    }
}
