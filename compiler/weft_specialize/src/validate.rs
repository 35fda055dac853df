//! Structural validation of rewritten modules.
//!
//! Run in debug builds after a pass rewrites a module, so a broken rewrite
//! fails loudly at the pass boundary instead of corrupting a later stage.
//! Checks name resolution and arena discipline, not typing.
//!
//! # Panics
//!
//! Every check panics on violation; a validation failure is a bug in a
//! rewrite, never a user-input error.

use rustc_hash::FxHashSet;
use weft_ir::{DimId, DimKind, ExprId, ExprKind, Function, GraphArena, Module, Name};

/// Validate every function of a module against the arena it references.
pub fn validate(arena: &GraphArena, module: &Module) {
    for func in &module.functions {
        validate_function(arena, func);
    }
}

fn validate_function(arena: &GraphArena, func: &Function) {
    let mut declared: FxHashSet<Name> = FxHashSet::default();
    for param in &func.params {
        assert!(!param.name.is_empty(), "parameter with an empty name");
        assert!(
            declared.insert(param.name),
            "duplicate parameter {:?}",
            param.name
        );
    }

    // Bindings are in dependency order: each value may only use names
    // declared above it.
    for binding in &func.bindings {
        check_expr(arena, binding.value, &declared);
        assert!(
            declared.insert(binding.var),
            "duplicate binding {:?}",
            binding.var
        );
    }
    check_expr(arena, func.result, &declared);
}

fn check_expr(arena: &GraphArena, id: ExprId, declared: &FxHashSet<Name>) {
    assert!(id.is_valid(), "invalid expression id");
    assert!(
        id.index() < arena.expr_count(),
        "{id:?} out of arena bounds"
    );
    match *arena.kind(id) {
        ExprKind::Var(name) => {
            assert!(declared.contains(&name), "undeclared variable {name:?}");
        }
        ExprKind::IntLit(_) => {}
        ExprKind::Shape(dims) => {
            for &dim in arena.get_dim_list(dims) {
                check_dim(arena, dim, declared);
            }
        }
        ExprKind::Call { args, .. } => {
            for &arg in arena.get_expr_list(args) {
                // Push-only arenas keep children below their parent.
                assert!(arg.index() < id.index(), "{arg:?} not older than {id:?}");
                check_expr(arena, arg, declared);
            }
        }
        ExprKind::Tuple(elems) => {
            for &elem in arena.get_expr_list(elems) {
                assert!(elem.index() < id.index(), "{elem:?} not older than {id:?}");
                check_expr(arena, elem, declared);
            }
        }
    }
}

fn check_dim(arena: &GraphArena, id: DimId, declared: &FxHashSet<Name>) {
    assert!(id.is_valid(), "invalid dimension id");
    assert!(
        id.index() < arena.dim_count(),
        "{id:?} out of arena bounds"
    );
    let kind = arena.dim_kind(id);
    if let DimKind::Var(name) = *kind {
        assert!(
            declared.contains(&name),
            "undeclared symbolic dimension {name:?}"
        );
    }
    if let Some((a, b)) = kind.children() {
        assert!(a.index() < id.index(), "{a:?} not older than {id:?}");
        assert!(b.index() < id.index(), "{b:?} not older than {id:?}");
        check_dim(arena, a, declared);
        check_dim(arena, b, declared);
    }
}
