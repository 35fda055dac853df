//! Interned string names.
//!
//! A [`Name`] is a 4-byte handle into a [`StringInterner`]; equality and
//! hashing are O(1) integer operations. Names are only meaningful together
//! with the interner that produced them.
//!
//! [`StringInterner`]: crate::StringInterner

use std::fmt;

/// Interned string identifier.
///
/// Index into the interner's string table. Comparing two names compares
/// table indices, so two equal names always denote the same string.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, pre-interned at index 0 by every interner.
    pub const EMPTY: Name = Name(0);

    /// Create a name from a raw table index.
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Name(index)
    }

    /// The raw table index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Reconstruct a name from [`Name::raw`] output.
    ///
    /// Only valid for indices obtained from the same interner.
    #[inline]
    pub const fn from_raw(index: u32) -> Self {
        Name(index)
    }

    /// Check if this is the pre-interned empty string.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Name;
    crate::static_assert_size!(Name, 4);
    crate::static_assert_size!(Option<Name>, 8);
}
