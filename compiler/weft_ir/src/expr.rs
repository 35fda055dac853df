//! Graph expressions and types.
//!
//! The body of a [`Function`](crate::Function) is a sequence of
//! let-bindings over these expressions. Operators stay opaque ([`Name`]s);
//! this IR carries enough structure for shape rewriting and liveness, not
//! for operator semantics.

use std::fmt;

use crate::{DimRange, Name};

/// Index of a graph expression node in a [`GraphArena`](crate::GraphArena).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Sentinel value indicating "no expression".
    pub const INVALID: ExprId = ExprId(u32::MAX);

    /// Create a new `ExprId` from a raw index.
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

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "ExprId::INVALID")
        } else {
            write!(f, "ExprId({})", self.0)
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A contiguous run of expression IDs in the arena's `expr_lists` storage.
///
/// Used for call arguments and tuple elements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct ExprRange {
    pub start: u32,
    pub len: u16,
}

impl ExprRange {
    /// Empty range constant.
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

    /// Number of elements in the range.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for ExprRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExprRange({}..{})",
            self.start,
            self.start + u32::from(self.len)
        )
    }
}

/// Graph expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Reference to a parameter or let-bound variable.
    Var(Name),
    /// Scalar integer literal.
    IntLit(i64),
    /// First-class shape expression: one dim per tensor axis, in order.
    Shape(DimRange),
    /// Operator application, e.g. `reshape(x, s)`. Operators are opaque.
    Call { op: Name, args: ExprRange },
    /// Tuple of expressions.
    Tuple(ExprRange),
}

/// Element type of a tensor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    Bool,
}

impl DType {
    /// Lowercase name as written in the textual form.
    pub const fn name(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a parameter or expression.
///
/// Rank-only: tensor types never embed shape expressions. Shapes are
/// ordinary [`ExprKind::Shape`] values in the body, which keeps shape
/// rewriting confined to expressions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ty {
    /// 64-bit signed scalar (dimension values, sizes).
    I64,
    /// Boolean scalar.
    Bool,
    /// Tensor with element type and rank.
    Tensor { dtype: DType, rank: u8 },
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::I64 => f.write_str("i64"),
            Ty::Bool => f.write_str("bool"),
            Ty::Tensor { dtype, rank } => write!(f, "tensor<{dtype}, {rank}>"),
        }
    }
}

// Size assertions to prevent accidental regressions
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ExprId, ExprKind, ExprRange};
    crate::static_assert_size!(ExprId, 4);
    crate::static_assert_size!(ExprRange, 8);
    crate::static_assert_size!(ExprKind, 16);
}
