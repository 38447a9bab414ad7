//! Error taxonomy shared by every structure in the crate.
//!
//! All errors are raised synchronously at the public boundary, before any node
//! is allocated. None of them is transient: the structures are deterministic,
//! so retrying the same call yields the same error.

use core::fmt;

/// The error type for index operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// A position or value lies outside the configured domain `[1, domain]`.
    OutOfDomain {
        /// The rejected position.
        position: usize,
        /// The configured domain size.
        domain: usize,
    },
    /// An order statistic was requested that the composed multiset cannot
    /// provide (`k < 1`, `k` above the composed total, or a negative partial
    /// count met during descent).
    OutOfRange {
        /// The requested rank.
        k: usize,
        /// Number of values available in the composed scope.
        available: i64,
    },
    /// A version number that was never issued by this log.
    UnknownVersion {
        /// The rejected version number.
        version: usize,
        /// Number of versions issued so far.
        issued: usize,
    },
    /// The arena refused to grow past its configured capacity.
    ///
    /// This indicates a sizing bug in the caller and is not recoverable.
    CapacityExceeded {
        /// The configured node capacity.
        capacity: usize,
    },
    /// A tree node that the path composer never recorded a root for, or an
    /// arena node id that does not belong to the arena it was passed to.
    UnknownNode {
        /// The rejected node id.
        node: usize,
        /// Number of nodes known to the composer or arena.
        nodes: usize,
    },
    /// A reversed or otherwise malformed range `[lo, hi]`.
    InvalidRange {
        /// Lower end of the rejected range.
        lo: usize,
        /// Upper end of the rejected range.
        hi: usize,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IndexError::OutOfDomain { position, domain } => {
                write!(f, "position {position} is outside the domain [1, {domain}]")
            }
            IndexError::OutOfRange { k, available } => {
                write!(f, "rank {k} is out of range for a scope holding {available} values")
            }
            IndexError::UnknownVersion { version, issued } => {
                write!(f, "version {version} was never issued ({issued} versions exist)")
            }
            IndexError::CapacityExceeded { capacity } => {
                write!(f, "node arena capacity of {capacity} nodes exceeded")
            }
            IndexError::UnknownNode { node, nodes } => {
                write!(f, "node {node} is unknown ({nodes} nodes recorded)")
            }
            IndexError::InvalidRange { lo, hi } => write!(f, "invalid range [{lo}, {hi}]"),
        }
    }
}

impl std::error::Error for IndexError {}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_the_offending_value() {
        let err = IndexError::OutOfDomain { position: 9, domain: 5 };
        assert_eq!(err.to_string(), "position 9 is outside the domain [1, 5]");

        let err = IndexError::UnknownVersion { version: 12, issued: 3 };
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn converts_into_boxed_error() {
        let boxed: Box<dyn std::error::Error> = IndexError::CapacityExceeded { capacity: 4 }.into();
        assert!(boxed.to_string().contains("capacity of 4"));
    }
}
