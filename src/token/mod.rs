//! `GhostToken` - the writer capability for a family of persistent structures.
//!
//! Every arena, version log and index is branded with the lifetime of the
//! token scope that created it. Handles minted inside one scope (node ids,
//! version handles) carry the same brand and cannot be presented to a
//! structure from another scope.
//!
//! The brand is per scope, not per structure. Within one scope, version
//! handles carry the identity of the log that issued them, so a handle of
//! another structure is rejected. Node ids only carry a slot index: they are
//! bounds-checked against the arena they are passed to, and an id past its end
//! is an error, never a panic.
//!
//! ## Core invariant (single writer)
//!
//! `GhostToken<'brand>` is **not** `Copy`/`Clone`. Anything that may grow an
//! arena or record a version takes `&mut GhostToken<'brand>`; every query takes
//! `&GhostToken<'brand>`. Rust's borrow rules then guarantee that no reader is
//! alive while a writer extends an arena, and that readers may be shared
//! freely across threads between writes.

/// Invariant lifetime definitions for branding.
pub mod invariant;

pub use invariant::InvariantLifetime;

/// A zero-sized token that brands a scope of persistent structures.
#[derive(Debug)]
pub struct GhostToken<'brand>(InvariantLifetime<'brand>);

impl<'brand> GhostToken<'brand> {
    /// Creates a new token and executes a closure with it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use strata::{GhostToken, VersionedIndex};
    ///
    /// let third = GhostToken::new(|mut token| {
    ///     let mut index = VersionedIndex::new(5);
    ///     let v5 = index.build(&mut token, &[5, 3, 1, 4, 2]).unwrap();
    ///     index.range_kth(&token, index.initial(), v5, 3).unwrap()
    /// });
    /// assert_eq!(third, 3);
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GhostToken<'new_brand>) -> R,
    {
        f(GhostToken(InvariantLifetime::new()))
    }

    /// Returns the brand marker carried by this token.
    #[inline(always)]
    pub const fn brand(&self) -> InvariantLifetime<'brand> {
        self.0
    }
}

// Sharing `&GhostToken<'brand>` only unlocks read-only queries over write-once
// nodes. Exclusive writes still need `&mut GhostToken<'brand>`, which cannot
// coexist with any shared borrow of the same token.
unsafe impl<'brand> Sync for GhostToken<'brand> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_zero_sized() {
        GhostToken::new(|token| {
            assert_eq!(core::mem::size_of_val(&token), 0);
            assert_eq!(token.brand(), InvariantLifetime::new());
        });
    }

    #[test]
    fn token_returns_closure_result() {
        let out = GhostToken::new(|_token| 7usize);
        assert_eq!(out, 7);
    }
}
