//! Graph arena.
//!
//! [`GraphArena`] uses struct-of-arrays layout for cache locality: parallel
//! `kinds`/`spans` arrays per node family, indexed by [`ExprId`] and
//! [`DimId`]. Child lists are flattened into shared `Vec`s addressed by
//! [`ExprRange`]/[`DimRange`].
//!
//! # Index Spaces
//!
//! - `kinds`/`spans`: parallel arrays indexed by [`ExprId`]
//! - `dim_kinds`/`dim_spans`: parallel arrays indexed by [`DimId`]
//! - `expr_lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
//! - `dim_lists`: flat `Vec<DimId>` indexed by [`DimRange`]
//!
//! The arena is push-only. Rewrites push replacement nodes and let the old
//! ones go unreferenced; nothing is ever removed or mutated in place.

use crate::{DimId, DimKind, DimRange, ExprId, ExprKind, ExprRange, Span};

/// Convert a table length to a `u32` index.
///
/// # Panics
/// Panics when the table named by `what` outgrows the index type. This is a
/// capacity invariant, not a recoverable error.
#[inline]
pub(crate) fn to_u32(value: usize, what: &str) -> u32 {
    match u32::try_from(value) {
        Ok(v) => v,
        Err(_) => panic!("{what} exceed u32 index space"),
    }
}

/// Convert a list length to a `u16` range length.
///
/// # Panics
/// Panics when the list named by `what` outgrows `u16`.
#[inline]
pub(crate) fn to_u16(value: usize, what: &str) -> u16 {
    match u16::try_from(value) {
        Ok(v) => v,
        Err(_) => panic!("{what} exceed u16 range length"),
    }
}

/// Arena for graph expressions and dimension expressions.
///
/// One arena holds every node of a module; functions reference into it by
/// id. Identity of a node IS its id, which is what lets rewrites signal
/// "unchanged" by returning the id they were given.
#[derive(Clone, Debug, Default)]
pub struct GraphArena {
    /// Graph expression kinds (parallel with `spans`).
    kinds: Vec<ExprKind>,
    /// Source spans for graph expressions (parallel with `kinds`).
    spans: Vec<Span>,
    /// Dimension expression kinds (parallel with `dim_spans`).
    dim_kinds: Vec<DimKind>,
    /// Source spans for dimension expressions (parallel with `dim_kinds`).
    dim_spans: Vec<Span>,
    /// Flattened expression ID lists (call args, tuple elements).
    expr_lists: Vec<ExprId>,
    /// Flattened dimension ID lists (one list per shape expression).
    dim_lists: Vec<DimId>,
}

impl GraphArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // Graph expressions

    /// Push a graph expression node, returning its id.
    pub fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "graph expressions"));
        self.kinds.push(kind);
        self.spans.push(span);
        id
    }

    /// Get the kind of a graph expression.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    /// Get the span of a graph expression.
    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.spans[id.index()]
    }

    /// Number of graph expression nodes.
    pub fn expr_count(&self) -> usize {
        self.kinds.len()
    }

    /// Push a list of expression IDs, returning the range that names it.
    pub fn push_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression lists");
        self.expr_lists.extend_from_slice(ids);
        ExprRange::new(start, to_u16(ids.len(), "expression list"))
    }

    /// Get the expression IDs for a range.
    #[inline]
    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    // Dimension expressions

    /// Push a dimension expression node, returning its id.
    pub fn push_dim(&mut self, kind: DimKind, span: Span) -> DimId {
        let id = DimId::new(to_u32(self.dim_kinds.len(), "dimension expressions"));
        self.dim_kinds.push(kind);
        self.dim_spans.push(span);
        id
    }

    /// Get the kind of a dimension expression.
    #[inline]
    pub fn dim_kind(&self, id: DimId) -> &DimKind {
        &self.dim_kinds[id.index()]
    }

    /// Get the span of a dimension expression.
    #[inline]
    pub fn dim_span(&self, id: DimId) -> Span {
        self.dim_spans[id.index()]
    }

    /// Number of dimension expression nodes.
    pub fn dim_count(&self) -> usize {
        self.dim_kinds.len()
    }

    /// Push a list of dimension IDs, returning the range that names it.
    pub fn push_dim_list(&mut self, ids: &[DimId]) -> DimRange {
        let start = to_u32(self.dim_lists.len(), "dimension lists");
        self.dim_lists.extend_from_slice(ids);
        DimRange::new(start, to_u16(ids.len(), "dimension list"))
    }

    /// Get the dimension IDs for a range.
    #[inline]
    pub fn get_dim_list(&self, range: DimRange) -> &[DimId] {
        let start = range.start as usize;
        &self.dim_lists[start..start + range.len()]
    }

    // Structural comparison

    /// Structural value-equality of two dimension trees.
    ///
    /// Same-id trees are equal without walking. Distinct ids are compared
    /// node by node, so a rebuilt tree that happens to equal the original
    /// still counts as unchanged.
    pub fn dim_eq(&self, a: DimId, b: DimId) -> bool {
        if a == b {
            return true;
        }
        match (self.dim_kind(a), self.dim_kind(b)) {
            (DimKind::Var(x), DimKind::Var(y)) => x == y,
            (DimKind::Const(x), DimKind::Const(y)) => x == y,
            (DimKind::Add(al, ar), DimKind::Add(bl, br))
            | (DimKind::Sub(al, ar), DimKind::Sub(bl, br))
            | (DimKind::Mul(al, ar), DimKind::Mul(bl, br))
            | (DimKind::FloorDiv(al, ar), DimKind::FloorDiv(bl, br))
            | (DimKind::Min(al, ar), DimKind::Min(bl, br))
            | (DimKind::Max(al, ar), DimKind::Max(bl, br)) => {
                self.dim_eq(*al, *bl) && self.dim_eq(*ar, *br)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Name;

    #[test]
    fn test_push_and_read_back() {
        let mut arena = GraphArena::new();
        let id = arena.push_expr(ExprKind::IntLit(7), Span::new(3, 4));
        assert_eq!(*arena.kind(id), ExprKind::IntLit(7));
        assert_eq!(arena.span(id), Span::new(3, 4));
        assert_eq!(arena.expr_count(), 1);
    }

    #[test]
    fn test_dim_push_and_read_back() {
        let mut arena = GraphArena::new();
        let id = arena.push_dim(DimKind::Const(16), Span::new(0, 2));
        assert_eq!(*arena.dim_kind(id), DimKind::Const(16));
        assert_eq!(arena.dim_span(id), Span::new(0, 2));
        assert_eq!(arena.dim_count(), 1);
    }

    #[test]
    fn test_expr_list_round_trip() {
        let mut arena = GraphArena::new();
        let a = arena.push_expr(ExprKind::IntLit(1), Span::DUMMY);
        let b = arena.push_expr(ExprKind::IntLit(2), Span::DUMMY);
        let range = arena.push_expr_list(&[a, b]);
        assert_eq!(arena.get_expr_list(range), &[a, b]);
        assert_eq!(arena.get_expr_list(ExprRange::EMPTY), &[]);
    }

    #[test]
    fn test_dim_list_round_trip() {
        let mut arena = GraphArena::new();
        let a = arena.push_dim(DimKind::Const(1), Span::DUMMY);
        let b = arena.push_dim(DimKind::Const(2), Span::DUMMY);
        let range = arena.push_dim_list(&[a, b]);
        assert_eq!(arena.get_dim_list(range), &[a, b]);
    }

    #[test]
    fn test_dim_eq_same_id() {
        let mut arena = GraphArena::new();
        let a = arena.push_dim(DimKind::Const(4), Span::DUMMY);
        assert!(arena.dim_eq(a, a));
    }

    #[test]
    fn test_dim_eq_structural() {
        let mut arena = GraphArena::new();
        let n = Name::from_raw(1);
        let v1 = arena.push_dim(DimKind::Var(n), Span::DUMMY);
        let c1 = arena.push_dim(DimKind::Const(2), Span::DUMMY);
        let add1 = arena.push_dim(DimKind::Add(v1, c1), Span::DUMMY);
        // Same structure, different ids.
        let v2 = arena.push_dim(DimKind::Var(n), Span::new(10, 11));
        let c2 = arena.push_dim(DimKind::Const(2), Span::new(12, 13));
        let add2 = arena.push_dim(DimKind::Add(v2, c2), Span::new(10, 13));
        assert!(arena.dim_eq(add1, add2));
    }

    #[test]
    fn test_dim_eq_distinguishes_kind_and_value() {
        let mut arena = GraphArena::new();
        let a = arena.push_dim(DimKind::Const(2), Span::DUMMY);
        let b = arena.push_dim(DimKind::Const(3), Span::DUMMY);
        let add = arena.push_dim(DimKind::Add(a, b), Span::DUMMY);
        let sub = arena.push_dim(DimKind::Sub(a, b), Span::DUMMY);
        assert!(!arena.dim_eq(a, b));
        assert!(!arena.dim_eq(add, sub));
    }
}
