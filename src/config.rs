//! Run-time configuration shared by the index constructors.

use crate::arena::capacity_for;
use serde::{Deserialize, Serialize};

/// Sizing parameters for an index.
///
/// The value domain `[1, domain]` is fixed for the lifetime of the index;
/// callers compress raw values into ranks before any update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Number of distinct positions in the value domain.
    pub domain: usize,
    /// Node arena limit; `None` lets the arena grow without bound.
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl IndexConfig {
    /// An unbounded configuration over `[1, domain]`.
    pub const fn new(domain: usize) -> Self {
        Self { domain, capacity: None }
    }

    /// Pre-sizes the arena for `steps` path-copying operations
    /// (updates plus traversal steps).
    pub fn for_workload(domain: usize, steps: usize) -> Self {
        Self {
            domain,
            capacity: Some(capacity_for(steps, domain)),
        }
    }

    /// Replaces the arena limit.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}
