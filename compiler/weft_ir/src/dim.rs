//! Dimension expressions.
//!
//! A tensor shape is an ordered list of dimensions; each dimension is a
//! small arithmetic expression ([`DimKind`]) over integer constants and
//! symbolic variables such as `seq_len` or `batch`. Shape inference builds
//! these trees; the specialization pass folds them down to constants.
//!
//! Dim nodes live in [`GraphArena`](crate::GraphArena) and reference their
//! children by [`DimId`], keeping the kind enum `Copy` and 16 bytes.

use std::fmt;

use crate::{GraphArena, Name, StringInterner};

/// Index of a dimension expression node in a
/// [`GraphArena`](crate::GraphArena). Distinct from
/// [`ExprId`](crate::ExprId) — dims live in a separate index space.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct DimId(u32);

impl DimId {
    /// Sentinel value indicating "no dimension".
    pub const INVALID: DimId = DimId(u32::MAX);

    /// Create a new `DimId` from a raw index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is a valid (non-sentinel) ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for DimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "DimId::INVALID")
        } else {
            write!(f, "DimId({})", self.0)
        }
    }
}

impl Default for DimId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A contiguous run of dimension IDs in the arena's `dim_lists` storage.
///
/// One range per shape expression; position within the range is the
/// dimension index, so order is semantically meaningful.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct DimRange {
    pub start: u32,
    pub len: u16,
}

impl DimRange {
    /// Empty range constant (a rank-0 shape).
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    /// Create a new range.
    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        Self { start, len }
    }

    /// Returns `true` if the range contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of dimensions in the range.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for DimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DimRange({}..{})",
            self.start,
            self.start + u32::from(self.len)
        )
    }
}

/// Dimension expression node.
///
/// The arithmetic subset (`Var`, `Const`, `Add`, `Sub`, `Mul`, `FloorDiv`)
/// is what constant folding understands. `Min`/`Max` exist because newer
/// upstream shape inference emits them (padding, clipping); folding reports
/// them as unsupported rather than guessing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DimKind {
    /// Symbolic dimension variable, e.g. `seq_len`.
    Var(Name),
    /// Resolved integer dimension.
    Const(i64),
    /// `a + b`
    Add(DimId, DimId),
    /// `a - b`
    Sub(DimId, DimId),
    /// `a * b`
    Mul(DimId, DimId),
    /// `a // b`, rounding toward negative infinity.
    FloorDiv(DimId, DimId),
    /// `min(a, b)` — not foldable by this stage.
    Min(DimId, DimId),
    /// `max(a, b)` — not foldable by this stage.
    Max(DimId, DimId),
}

impl DimKind {
    /// Human-readable kind name for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            DimKind::Var(_) => "var",
            DimKind::Const(_) => "const",
            DimKind::Add(..) => "add",
            DimKind::Sub(..) => "sub",
            DimKind::Mul(..) => "mul",
            DimKind::FloorDiv(..) => "floor_div",
            DimKind::Min(..) => "min",
            DimKind::Max(..) => "max",
        }
    }

    /// Children of a binary node, `None` for leaves.
    pub const fn children(&self) -> Option<(DimId, DimId)> {
        match self {
            DimKind::Var(_) | DimKind::Const(_) => None,
            DimKind::Add(a, b)
            | DimKind::Sub(a, b)
            | DimKind::Mul(a, b)
            | DimKind::FloorDiv(a, b)
            | DimKind::Min(a, b)
            | DimKind::Max(a, b) => Some((*a, *b)),
        }
    }
}

/// Pretty-printer for a dimension expression tree.
///
/// Borrows the arena and interner; renders infix with full parenthesization
/// so the structure is unambiguous in logs and assertion messages.
pub struct DimDisplay<'a> {
    arena: &'a GraphArena,
    interner: &'a StringInterner,
    id: DimId,
}

impl<'a> DimDisplay<'a> {
    /// Create a display wrapper for one dim tree.
    pub fn new(arena: &'a GraphArena, interner: &'a StringInterner, id: DimId) -> Self {
        DimDisplay {
            arena,
            interner,
            id,
        }
    }

    fn fmt_dim(&self, f: &mut fmt::Formatter<'_>, id: DimId) -> fmt::Result {
        let infix = |f: &mut fmt::Formatter<'_>, op: &str, a: DimId, b: DimId| {
            write!(f, "(")?;
            self.fmt_dim(f, a)?;
            write!(f, " {op} ")?;
            self.fmt_dim(f, b)?;
            write!(f, ")")
        };
        let call = |f: &mut fmt::Formatter<'_>, op: &str, a: DimId, b: DimId| {
            write!(f, "{op}(")?;
            self.fmt_dim(f, a)?;
            write!(f, ", ")?;
            self.fmt_dim(f, b)?;
            write!(f, ")")
        };
        match *self.arena.dim_kind(id) {
            DimKind::Var(name) => match self.interner.try_lookup(name) {
                Some(s) => write!(f, "{s}"),
                None => write!(f, "{name:?}"),
            },
            DimKind::Const(v) => write!(f, "{v}"),
            DimKind::Add(a, b) => infix(f, "+", a, b),
            DimKind::Sub(a, b) => infix(f, "-", a, b),
            DimKind::Mul(a, b) => infix(f, "*", a, b),
            DimKind::FloorDiv(a, b) => infix(f, "//", a, b),
            DimKind::Min(a, b) => call(f, "min", a, b),
            DimKind::Max(a, b) => call(f, "max", a, b),
        }
    }
}

impl fmt::Display for DimDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_dim(f, self.id)
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{DimId, DimKind, DimRange};
    crate::static_assert_size!(DimId, 4);
    crate::static_assert_size!(DimRange, 8);
    crate::static_assert_size!(DimKind, 16);
}
