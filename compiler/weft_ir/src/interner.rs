//! Thread-safe string interning.
//!
//! Interned strings live for the life of the process (`Box::leak`), which
//! keeps lookup free of lifetime plumbing: a [`Name`] resolves to a
//! `&'static str` without holding the interner's lock.

#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedInterner thread-safety"
)]

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::arena::to_u32;
use crate::Name;

/// Interner state behind the lock.
#[derive(Default)]
struct InternState {
    /// String → name, for dedup on intern.
    map: FxHashMap<&'static str, Name>,
    /// Name index → string, for lookup.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// Interning the same string twice returns the same [`Name`]. The store is
/// append-only; nothing is ever removed, so lookups of previously returned
/// names always succeed.
pub struct StringInterner {
    state: RwLock<InternState>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let interner = StringInterner {
            state: RwLock::new(InternState::default()),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern a string, returning its name.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned.
        if let Some(&name) = self.state.read().map.get(s) {
            return name;
        }

        let mut state = self.state.write();
        // Double-check: another thread may have interned between locks.
        if let Some(&name) = state.map.get(s) {
            return name;
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::new(to_u32(state.strings.len(), "interned strings"));
        state.strings.push(leaked);
        state.map.insert(leaked, name);
        name
    }

    /// Resolve a name to its string.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.try_lookup(name)
            .unwrap_or_else(|| panic!("{name:?} was not interned here"))
    }

    /// Resolve a name to its string, or `None` for a foreign name.
    pub fn try_lookup(&self, name: Name) -> Option<&'static str> {
        self.state.read().strings.get(name.raw() as usize).copied()
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.state.read().strings.len()
    }

    /// Check if only the pre-interned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`StringInterner`].
///
/// Cloning shares the underlying interner; names produced through any clone
/// resolve through every other clone.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a fresh shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
