//! Removal of bindings and parameters that nothing references.
//!
//! After folding, a dimension variable like `n` may survive only in the
//! substitution table: every `Var(n)` node it used to occupy is now a
//! constant. The parameter that carried `n` (and any binding whose only
//! consumer folded away) is dead weight. This walk drops both.
//!
//! Liveness is by name: the result expression seeds the live set, then
//! bindings are scanned backward so a binding's uses are known before the
//! binding itself is judged. Backward order is sound because bindings may
//! only reference parameters and earlier bindings.
//!
//! All expressions are treated as pure. Operators are opaque names in
//! this IR, so an unused call is assumed droppable.

use rustc_hash::FxHashSet;
use weft_ir::{Binding, DimId, DimKind, ExprId, ExprKind, Function, GraphArena, Name, Param};

/// Drop bindings and parameters not reachable from the result.
///
/// Expression ids are untouched; only the function's item lists shrink.
pub fn remove_unused(arena: &GraphArena, func: &Function) -> Function {
    let mut live: FxHashSet<Name> = FxHashSet::default();
    mark_expr(arena, func.result, &mut live);

    let mut kept: Vec<Binding> = Vec::with_capacity(func.bindings.len());
    for binding in func.bindings.iter().rev() {
        if live.contains(&binding.var) {
            mark_expr(arena, binding.value, &mut live);
            kept.push(*binding);
        }
    }
    kept.reverse();

    let params: Vec<Param> = func
        .params
        .iter()
        .filter(|p| live.contains(&p.name))
        .copied()
        .collect();

    Function {
        name: func.name,
        params,
        bindings: kept,
        result: func.result,
        span: func.span,
    }
}

/// Add every variable name an expression tree mentions to `live`.
fn mark_expr(arena: &GraphArena, id: ExprId, live: &mut FxHashSet<Name>) {
    match *arena.kind(id) {
        ExprKind::Var(name) => {
            live.insert(name);
        }
        ExprKind::IntLit(_) => {}
        ExprKind::Shape(dims) => {
            for &dim in arena.get_dim_list(dims) {
                mark_dim(arena, dim, live);
            }
        }
        // The operator name is not a variable reference.
        ExprKind::Call { args, .. } => {
            for &arg in arena.get_expr_list(args) {
                mark_expr(arena, arg, live);
            }
        }
        ExprKind::Tuple(elems) => {
            for &elem in arena.get_expr_list(elems) {
                mark_expr(arena, elem, live);
            }
        }
    }
}

/// Add every symbolic dimension name a dim tree mentions to `live`.
fn mark_dim(arena: &GraphArena, id: DimId, live: &mut FxHashSet<Name>) {
    match *arena.dim_kind(id) {
        DimKind::Var(name) => {
            live.insert(name);
        }
        DimKind::Const(_) => {}
        kind => {
            if let Some((a, b)) = kind.children() {
                mark_dim(arena, a, live);
                mark_dim(arena, b, live);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use weft_ir::{Span, StringInterner, Ty};

    use super::*;

    fn param(interner: &StringInterner, name: &str, ty: Ty) -> Param {
        Param::new(interner.intern(name), ty, Span::DUMMY)
    }

    fn var_expr(arena: &mut GraphArena, interner: &StringInterner, name: &str) -> ExprId {
        arena.push_expr(ExprKind::Var(interner.intern(name)), Span::DUMMY)
    }

    fn static_shape(arena: &mut GraphArena, dims: &[i64]) -> ExprId {
        let ids: Vec<DimId> = dims
            .iter()
            .map(|&d| arena.push_dim(DimKind::Const(d), Span::DUMMY))
            .collect();
        let range = arena.push_dim_list(&ids);
        arena.push_expr(ExprKind::Shape(range), Span::DUMMY)
    }

    #[test]
    fn test_removes_unreferenced_binding() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let y_val = static_shape(&mut arena, &[2]);
        let z_val = arena.push_expr(ExprKind::IntLit(7), Span::DUMMY);
        let result = var_expr(&mut arena, &interner, "y");

        let func = Function {
            name: interner.intern("main"),
            params: Vec::new(),
            bindings: vec![
                Binding::new(interner.intern("y"), y_val, Span::DUMMY),
                Binding::new(interner.intern("z"), z_val, Span::DUMMY),
            ],
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert_eq!(cleaned.bindings.len(), 1);
        assert_eq!(cleaned.bindings[0].var, interner.intern("y"));
        assert_eq!(cleaned.result, result);
    }

    #[test]
    fn test_transitive_liveness_keeps_chains() {
        // result -> y -> z: both bindings survive even though z is not
        // mentioned by the result directly.
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let z_val = arena.push_expr(ExprKind::IntLit(1), Span::DUMMY);
        let y_val = var_expr(&mut arena, &interner, "z");
        let result = var_expr(&mut arena, &interner, "y");

        let func = Function {
            name: interner.intern("main"),
            params: Vec::new(),
            bindings: vec![
                Binding::new(interner.intern("z"), z_val, Span::DUMMY),
                Binding::new(interner.intern("y"), y_val, Span::DUMMY),
            ],
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert_eq!(cleaned.bindings.len(), 2);
    }

    #[test]
    fn test_removes_param_once_dims_fold_away() {
        // Post-fold state: the shape is all constants, so the dimension
        // parameter has no remaining reference.
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let y_val = static_shape(&mut arena, &[8, 9]);
        let result = var_expr(&mut arena, &interner, "y");

        let func = Function {
            name: interner.intern("main"),
            params: vec![param(&interner, "n", Ty::I64)],
            bindings: vec![Binding::new(interner.intern("y"), y_val, Span::DUMMY)],
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert!(cleaned.params.is_empty());
        assert_eq!(cleaned.bindings.len(), 1);
    }

    #[test]
    fn test_keeps_param_referenced_by_a_dim() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let n_dim = arena.push_dim(DimKind::Var(interner.intern("n")), Span::DUMMY);
        let range = arena.push_dim_list(&[n_dim]);
        let y_val = arena.push_expr(ExprKind::Shape(range), Span::DUMMY);
        let result = var_expr(&mut arena, &interner, "y");

        let func = Function {
            name: interner.intern("main"),
            params: vec![param(&interner, "n", Ty::I64)],
            bindings: vec![Binding::new(interner.intern("y"), y_val, Span::DUMMY)],
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert_eq!(cleaned.params.len(), 1);
        assert_eq!(cleaned.params[0].name, interner.intern("n"));
    }

    #[test]
    fn test_keeps_param_referenced_inside_dim_arithmetic() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let n_dim = arena.push_dim(DimKind::Var(interner.intern("n")), Span::DUMMY);
        let one = arena.push_dim(DimKind::Const(1), Span::DUMMY);
        let sum = arena.push_dim(DimKind::Add(n_dim, one), Span::DUMMY);
        let range = arena.push_dim_list(&[sum]);
        let result = arena.push_expr(ExprKind::Shape(range), Span::DUMMY);

        let func = Function {
            name: interner.intern("main"),
            params: vec![param(&interner, "n", Ty::I64)],
            bindings: Vec::new(),
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert_eq!(cleaned.params.len(), 1);
    }

    #[test]
    fn test_keeps_params_used_by_calls() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let x = var_expr(&mut arena, &interner, "x");
        let s = static_shape(&mut arena, &[4]);
        let args = arena.push_expr_list(&[x, s]);
        let result = arena.push_expr(
            ExprKind::Call {
                op: interner.intern("reshape"),
                args,
            },
            Span::DUMMY,
        );

        let func = Function {
            name: interner.intern("main"),
            params: vec![
                param(
                    &interner,
                    "x",
                    Ty::Tensor {
                        dtype: weft_ir::DType::F32,
                        rank: 1,
                    },
                ),
                param(&interner, "n", Ty::I64),
            ],
            bindings: Vec::new(),
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert_eq!(cleaned.params.len(), 1);
        assert_eq!(cleaned.params[0].name, interner.intern("x"));
    }

    #[test]
    fn test_operator_name_is_not_a_variable_use() {
        // A parameter that happens to share its name with an operator is
        // still dead if only the operator position mentions that name.
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let args = arena.push_expr_list(&[]);
        let result = arena.push_expr(
            ExprKind::Call {
                op: interner.intern("zeros"),
                args,
            },
            Span::DUMMY,
        );

        let func = Function {
            name: interner.intern("main"),
            params: vec![param(&interner, "zeros", Ty::I64)],
            bindings: Vec::new(),
            result,
            span: Span::DUMMY,
        };

        let cleaned = remove_unused(&arena, &func);
        assert!(cleaned.params.is_empty());
    }
}
