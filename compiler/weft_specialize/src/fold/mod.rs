//! Bottom-up constant folding of dimension expressions.
//!
//! [`DimFolder`] resolves symbolic dimension variables through a
//! [`SubstitutionTable`] and evaluates the arithmetic above them. Folding
//! is identity-preserving: a node that does not change folds to its own
//! id, so callers can detect "nothing happened" with an id comparison.
//!
//! Arithmetic is evaluated in `i64` with overflow checks. An operation
//! that would overflow is left in symbolic form rather than wrapped or
//! rejected; division by zero and unsupported operators are hard errors.
//!
//! Only literal constant folding is performed. There is no reassociation,
//! so `(x + 1) + 1` with `x` unresolved stays nested instead of becoming
//! `x + 2`.

use tracing::trace;
use weft_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use weft_ir::{DimDisplay, DimId, DimKind, GraphArena, Name, Span, StringInterner};

use crate::{SubstitutionTable, UnresolvedPolicy};


/// Fatal conditions encountered while folding one dimension tree.
///
/// These abort the enclosing pass; the recoverable case (an unresolved
/// variable under the lenient policy) never surfaces here, it becomes a
/// warning diagnostic instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FoldError {
    /// A `//` whose divisor folded to zero.
    #[error("division by zero in dimension expression")]
    DivisionByZero {
        /// Location of the offending division node.
        span: Span,
    },
    /// A dimension operator this stage cannot evaluate.
    #[error("cannot specialize `{kind}` dimension expression")]
    UnsupportedDimExpr {
        /// Kind name of the rejected node.
        kind: &'static str,
        /// Location of the rejected node.
        span: Span,
    },
    /// An unresolved variable under [`UnresolvedPolicy::Fail`].
    #[error("unresolved symbolic dimension {name:?}")]
    UnresolvedVar {
        /// Interned name of the variable.
        name: Name,
        /// Location of the variable node.
        span: Span,
    },
}

impl FoldError {
    /// Location the error points at.
    pub fn span(&self) -> Span {
        match *self {
            FoldError::DivisionByZero { span }
            | FoldError::UnsupportedDimExpr { span, .. }
            | FoldError::UnresolvedVar { span, .. } => span,
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            FoldError::DivisionByZero { .. } => ErrorCode::E0401,
            FoldError::UnsupportedDimExpr { .. } => ErrorCode::E0402,
            FoldError::UnresolvedVar { .. } => ErrorCode::E0403,
        }
    }

    /// Render this error as a diagnostic for the queue.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        match *self {
            FoldError::DivisionByZero { span } => Diagnostic::error(ErrorCode::E0401)
                .with_message("division by zero in dimension expression")
                .with_label(span, "divisor evaluates to zero")
                .with_note(
                    "dimension arithmetic is evaluated at specialization time, \
                     so a zero divisor is a compile-time error",
                ),
            FoldError::UnsupportedDimExpr { kind, span } => Diagnostic::error(ErrorCode::E0402)
                .with_message(format!("cannot specialize `{kind}` dimension expression"))
                .with_label(span, "unsupported dimension operator")
                .with_note(
                    "only integer constants, symbolic variables, and the \
                     `+`, `-`, `*`, `//` operators can be folded",
                ),
            FoldError::UnresolvedVar { name, span } => {
                let text = interner.try_lookup(name).unwrap_or("<unknown>");
                Diagnostic::error(ErrorCode::E0403)
                    .with_message(format!("cannot resolve symbolic dimension `{text}`"))
                    .with_label(span, "no substitution table entry")
                    .with_note(
                        "every symbolic dimension must be mapped when the \
                         fail-on-unresolved policy is set",
                    )
            }
        }
    }
}

/// Arithmetic operators the folder evaluates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
}

impl BinOp {
    /// Rebuild a dim node of this operator over new children.
    fn node(self, lhs: DimId, rhs: DimId) -> DimKind {
        match self {
            BinOp::Add => DimKind::Add(lhs, rhs),
            BinOp::Sub => DimKind::Sub(lhs, rhs),
            BinOp::Mul => DimKind::Mul(lhs, rhs),
            BinOp::FloorDiv => DimKind::FloorDiv(lhs, rhs),
        }
    }
}

/// Evaluate one operator over constant operands.
///
/// `Ok(None)` means the value overflows `i64`; the caller keeps the
/// expression symbolic. Division rounds toward negative infinity, matching
/// the `//` operator of the shape language rather than Rust's truncating
/// `/`. The remainder is only taken after `checked_div` succeeds, so the
/// `i64::MIN % -1` overflow case is never evaluated.
fn eval_binary(op: BinOp, lhs: i64, rhs: i64, span: Span) -> Result<Option<i64>, FoldError> {
    match op {
        BinOp::Add => Ok(lhs.checked_add(rhs)),
        BinOp::Sub => Ok(lhs.checked_sub(rhs)),
        BinOp::Mul => Ok(lhs.checked_mul(rhs)),
        BinOp::FloorDiv => {
            if rhs == 0 {
                return Err(FoldError::DivisionByZero { span });
            }
            Ok(lhs.checked_div(rhs).map(|quotient| {
                if (lhs ^ rhs) < 0 && lhs % rhs != 0 {
                    quotient - 1
                } else {
                    quotient
                }
            }))
        }
    }
}

/// Bottom-up folder for dimension expression trees.
///
/// Borrows the arena mutably for the duration of one function's rewrite;
/// folded nodes are pushed, originals are never touched.
pub struct DimFolder<'a> {
    arena: &'a mut GraphArena,
    interner: &'a StringInterner,
    table: &'a SubstitutionTable,
    policy: UnresolvedPolicy,
    queue: &'a mut DiagnosticQueue,
    /// Function the folded dims belong to, for warning notes.
    function: Option<&'a str>,
}

impl<'a> DimFolder<'a> {
    /// Create a folder over one arena and substitution table.
    pub fn new(
        arena: &'a mut GraphArena,
        interner: &'a StringInterner,
        table: &'a SubstitutionTable,
        policy: UnresolvedPolicy,
        queue: &'a mut DiagnosticQueue,
    ) -> Self {
        DimFolder {
            arena,
            interner,
            table,
            policy,
            queue,
            function: None,
        }
    }

    /// Name the containing function in unresolved-dimension warnings.
    pub fn in_function(mut self, name: &'a str) -> Self {
        self.function = Some(name);
        self
    }

    /// Fold one dimension tree to its most-reduced form.
    ///
    /// Returns the id of the folded tree: the original id when nothing
    /// changed, a fresh id otherwise. Folding an already-folded tree is a
    /// no-op, so the operation is idempotent.
    pub fn fold(&mut self, id: DimId) -> Result<DimId, FoldError> {
        let span = self.arena.dim_span(id);
        match *self.arena.dim_kind(id) {
            DimKind::Const(_) => Ok(id),
            DimKind::Var(name) => self.fold_var(id, name, span),
            DimKind::Add(lhs, rhs) => self.fold_binary(id, BinOp::Add, lhs, rhs, span),
            DimKind::Sub(lhs, rhs) => self.fold_binary(id, BinOp::Sub, lhs, rhs, span),
            DimKind::Mul(lhs, rhs) => self.fold_binary(id, BinOp::Mul, lhs, rhs, span),
            DimKind::FloorDiv(lhs, rhs) => self.fold_binary(id, BinOp::FloorDiv, lhs, rhs, span),
            kind @ (DimKind::Min(..) | DimKind::Max(..)) => Err(FoldError::UnsupportedDimExpr {
                kind: kind.kind_name(),
                span,
            }),
        }
    }

    fn fold_var(&mut self, id: DimId, name: Name, span: Span) -> Result<DimId, FoldError> {
        if let Some(value) = self.table.lookup(name) {
            trace!(
                dim = %DimDisplay::new(self.arena, self.interner, id),
                value,
                "resolved symbolic dimension"
            );
            return Ok(self.arena.push_dim(DimKind::Const(value), span));
        }
        match self.policy {
            UnresolvedPolicy::WarnAndKeep => {
                self.warn_unresolved(name, span);
                Ok(id)
            }
            UnresolvedPolicy::Fail => Err(FoldError::UnresolvedVar { name, span }),
        }
    }

    fn fold_binary(
        &mut self,
        id: DimId,
        op: BinOp,
        lhs: DimId,
        rhs: DimId,
        span: Span,
    ) -> Result<DimId, FoldError> {
        let new_lhs = self.fold(lhs)?;
        let new_rhs = self.fold(rhs)?;

        if let (DimKind::Const(a), DimKind::Const(b)) =
            (*self.arena.dim_kind(new_lhs), *self.arena.dim_kind(new_rhs))
        {
            if let Some(value) = eval_binary(op, a, b, span)? {
                trace!(
                    dim = %DimDisplay::new(self.arena, self.interner, id),
                    value,
                    "folded dimension expression"
                );
                return Ok(self.arena.push_dim(DimKind::Const(value), span));
            }
            // Overflow: fall through and keep the node in symbolic form.
        }

        if new_lhs == lhs && new_rhs == rhs {
            return Ok(id);
        }
        Ok(self.arena.push_dim(op.node(new_lhs, new_rhs), span))
    }

    /// One warning per unresolved occurrence; the queue collapses exact
    /// repeats at the same position.
    fn warn_unresolved(&mut self, name: Name, span: Span) {
        let text = self.interner.try_lookup(name).unwrap_or("<unknown>");
        let mut diag = Diagnostic::warning(ErrorCode::W0401)
            .with_message(format!("symbolic dimension `{text}` has no substitution"))
            .with_label(span, "not in the substitution table")
            .with_note("the dimension is kept symbolic and the shape stays dynamic");
        if let Some(function) = self.function {
            diag = diag.with_note(format!("in function `{function}`"));
        }
        self.queue.add(diag);
    }
}
