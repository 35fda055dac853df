//! Substitution tables mapping symbolic dimension names to constants.
//!
//! A [`SubstitutionTable`] is built at runtime from whatever source the
//! caller has (CLI flags, a deployment manifest, profiler output) and is
//! immutable once handed to a pass. Passes hold a
//! [`SharedSubstitutionTable`] so the same table can back many functions
//! without cloning the map.

#![expect(
    clippy::disallowed_types,
    reason = "Arc required for SharedSubstitutionTable thread-safety"
)]

use std::ops::Deref;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use weft_ir::{Name, StringInterner};

/// Immutable mapping from symbolic dimension names to integer values.
///
/// Keys are interned [`Name`]s, so lookups during folding are a single
/// hash of a `u32`. Values are `i64` to match the dimension constant
/// domain; nothing here assumes they are non-negative.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubstitutionTable {
    entries: FxHashMap<Name, i64>,
}

impl SubstitutionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, value)` pairs, interning each name.
    ///
    /// Later pairs override earlier ones with the same name.
    pub fn from_pairs<'a>(
        interner: &StringInterner,
        pairs: impl IntoIterator<Item = (&'a str, i64)>,
    ) -> Self {
        let mut table = Self::new();
        for (name, value) in pairs {
            table.insert(interner.intern(name), value);
        }
        table
    }

    /// Insert a binding, returning the previous value if the name was
    /// already mapped.
    pub fn insert(&mut self, name: Name, value: i64) -> Option<i64> {
        self.entries.insert(name, value)
    }

    /// Look up the value bound to `name`, if any.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<i64> {
        self.entries.get(&name).copied()
    }

    /// Number of bindings in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What to do when a symbolic dimension has no entry in the table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum UnresolvedPolicy {
    /// Keep the dimension symbolic and record a warning diagnostic.
    #[default]
    WarnAndKeep,
    /// Treat the unresolved dimension as a hard error.
    Fail,
}

/// Thread-safe shared reference to an immutable [`SubstitutionTable`].
///
/// Cloning is cheap (reference count bump). The inner table cannot be
/// mutated through this handle.
#[derive(Clone, Debug, Default)]
pub struct SharedSubstitutionTable(Arc<SubstitutionTable>);

impl SharedSubstitutionTable {
    /// Wrap a finished table for sharing.
    pub fn new(table: SubstitutionTable) -> Self {
        SharedSubstitutionTable(Arc::new(table))
    }
}

impl From<SubstitutionTable> for SharedSubstitutionTable {
    fn from(table: SubstitutionTable) -> Self {
        Self::new(table)
    }
}

impl Deref for SharedSubstitutionTable {
    type Target = SubstitutionTable;

    fn deref(&self) -> &SubstitutionTable {
        &self.0
    }
}
