use core::marker::PhantomData;

/// A marker that is invariant in its lifetime parameter `'id`.
///
/// Node ids, version handles and arenas all carry one of these, so the
/// compiler refuses to unify two distinct token scopes by shrinking one
/// brand into the other.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvariantLifetime<'id>(PhantomData<fn(&'id ()) -> &'id ()>);

impl<'id> InvariantLifetime<'id> {
    /// Creates a new invariant lifetime marker.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}
