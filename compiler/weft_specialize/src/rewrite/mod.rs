//! Identity-preserving rewrite of graph expressions.
//!
//! [`ShapeRewriter`] walks a function body bottom-up and folds every
//! dimension expression reachable from it. Nodes whose contents do not
//! change rewrite to their own id, so an already-static function costs
//! one traversal and allocates nothing in the arena.

use smallvec::SmallVec;
use weft_diagnostic::DiagnosticQueue;
use weft_ir::{
    Binding, DimId, DimRange, ExprId, ExprKind, ExprRange, Function, GraphArena, Span,
    StringInterner,
};

use crate::{DimFolder, FoldError, SubstitutionTable, UnresolvedPolicy};


/// Rewrites expressions by folding the dimension trees inside them.
///
/// Shares the arena with the [`DimFolder`] it spins up per shape, so the
/// two stages append to the same node tables.
pub struct ShapeRewriter<'a> {
    arena: &'a mut GraphArena,
    interner: &'a StringInterner,
    table: &'a SubstitutionTable,
    policy: UnresolvedPolicy,
    queue: &'a mut DiagnosticQueue,
    /// Set while rewriting a function so warnings can name it.
    function: Option<&'static str>,
}

impl<'a> ShapeRewriter<'a> {
    /// Create a rewriter over one arena and substitution table.
    pub fn new(
        arena: &'a mut GraphArena,
        interner: &'a StringInterner,
        table: &'a SubstitutionTable,
        policy: UnresolvedPolicy,
        queue: &'a mut DiagnosticQueue,
    ) -> Self {
        ShapeRewriter {
            arena,
            interner,
            table,
            policy,
            queue,
            function: None,
        }
    }

    /// Rewrite one function, folding every shape its body references.
    ///
    /// Expression ids inside the returned function are the original ids
    /// wherever folding changed nothing, so downstream stages can compare
    /// ids to detect rewrites.
    #[tracing::instrument(level = "debug", skip_all, fields(
        function = self.interner.try_lookup(func.name).unwrap_or("<unknown>")
    ))]
    pub fn rewrite_function(&mut self, func: &Function) -> Result<Function, FoldError> {
        self.function = self.interner.try_lookup(func.name);
        let mut bindings = Vec::with_capacity(func.bindings.len());
        for binding in &func.bindings {
            let value = self.rewrite_expr(binding.value)?;
            bindings.push(Binding::new(binding.var, value, binding.span));
        }
        let result = self.rewrite_expr(func.result)?;
        Ok(Function {
            name: func.name,
            params: func.params.clone(),
            bindings,
            result,
            span: func.span,
        })
    }

    /// Rewrite one expression tree bottom-up.
    ///
    /// Returns the original id when nothing below it changed.
    pub fn rewrite_expr(&mut self, id: ExprId) -> Result<ExprId, FoldError> {
        let span = self.arena.span(id);
        match *self.arena.kind(id) {
            ExprKind::Var(_) | ExprKind::IntLit(_) => Ok(id),
            ExprKind::Shape(dims) => self.rewrite_shape(id, dims, span),
            ExprKind::Call { op, args } => match self.rewrite_list(args)? {
                Some(args) => Ok(self.arena.push_expr(ExprKind::Call { op, args }, span)),
                None => Ok(id),
            },
            ExprKind::Tuple(elems) => match self.rewrite_list(elems)? {
                Some(elems) => Ok(self.arena.push_expr(ExprKind::Tuple(elems), span)),
                None => Ok(id),
            },
        }
    }

    /// Fold each dim of a shape; rebuild the shape only if some dim moved.
    fn rewrite_shape(&mut self, id: ExprId, dims: DimRange, span: Span) -> Result<ExprId, FoldError> {
        let old: SmallVec<[DimId; 8]> = self.arena.get_dim_list(dims).iter().copied().collect();
        let mut folder = DimFolder::new(
            self.arena,
            self.interner,
            self.table,
            self.policy,
            self.queue,
        );
        if let Some(function) = self.function {
            folder = folder.in_function(function);
        }

        let mut new: SmallVec<[DimId; 8]> = SmallVec::with_capacity(old.len());
        for &dim in &old {
            new.push(folder.fold(dim)?);
        }

        // Compare by value, not id: a rebuilt dim that folded back to its
        // original form must not force a fresh shape node.
        let changed = old
            .iter()
            .zip(&new)
            .any(|(&before, &after)| !self.arena.dim_eq(before, after));
        if !changed {
            return Ok(id);
        }
        let range = self.arena.push_dim_list(&new);
        Ok(self.arena.push_expr(ExprKind::Shape(range), span))
    }

    /// Rewrite an id list; `None` means every element kept its id.
    fn rewrite_list(&mut self, range: ExprRange) -> Result<Option<ExprRange>, FoldError> {
        let old: SmallVec<[ExprId; 8]> = self.arena.get_expr_list(range).iter().copied().collect();
        let mut new: SmallVec<[ExprId; 8]> = SmallVec::with_capacity(old.len());
        let mut changed = false;
        for &expr in &old {
            let rewritten = self.rewrite_expr(expr)?;
            changed |= rewritten != expr;
            new.push(rewritten);
        }
        if changed {
            Ok(Some(self.arena.push_expr_list(&new)))
        } else {
            Ok(None)
        }
    }
}
