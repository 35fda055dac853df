//! Pass trait, pass context, and the name-keyed pass registry.
//!
//! Drivers look passes up by their stable string name and run them over a
//! module. [`ReplaceDynamicToStatic`] is the pass this crate exists for:
//! fold symbolic dimensions through a substitution table, then drop the
//! bindings and parameters the folding made unreachable.

use rustc_hash::FxHashMap;
use tracing::debug;
use weft_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use weft_ir::{GraphArena, Module, StringInterner};

use crate::{
    remove_unused, ShapeRewriter, SharedSubstitutionTable, UnresolvedPolicy,
};

/// Failure modes of running a pass through the registry.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum PassError {
    /// The requested name has no registered pass.
    #[error("no pass registered under `{0}`")]
    UnknownPass(String),
    /// The pass emitted error diagnostics and aborted.
    #[error("pass failed; diagnostics were emitted")]
    Failed(ErrorGuaranteed),
}

/// Mutable state a pass runs against.
///
/// The context borrows rather than owns so a driver can thread one arena
/// and one diagnostic queue through a whole pipeline.
pub struct PassContext<'a> {
    /// Node storage shared by every function in the module.
    pub arena: &'a mut GraphArena,
    /// Interner the module's names live in.
    pub interner: &'a StringInterner,
    /// Sink for warnings and errors.
    pub diagnostics: &'a mut DiagnosticQueue,
}

impl<'a> PassContext<'a> {
    /// Bundle the pieces a pass needs.
    pub fn new(
        arena: &'a mut GraphArena,
        interner: &'a StringInterner,
        diagnostics: &'a mut DiagnosticQueue,
    ) -> Self {
        PassContext {
            arena,
            interner,
            diagnostics,
        }
    }
}

/// A module-to-module transformation.
///
/// Passes are stateless between runs; per-run state lives in the
/// [`PassContext`]. On error the pass has already queued diagnostics, so
/// callers only see the [`ErrorGuaranteed`] proof.
pub trait FunctionPass {
    /// Stable name the registry files this pass under.
    fn name(&self) -> &'static str;

    /// Transform a module.
    fn run(&self, module: &Module, ctx: &mut PassContext<'_>) -> Result<Module, ErrorGuaranteed>;
}

/// Name-keyed collection of passes.
#[derive(Default)]
pub struct PassRegistry {
    passes: FxHashMap<&'static str, Box<dyn FunctionPass + Send + Sync>>,
}

impl PassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pass under its own [`FunctionPass::name`].
    ///
    /// Returns the previously registered pass when the name was taken.
    pub fn register(
        &mut self,
        pass: Box<dyn FunctionPass + Send + Sync>,
    ) -> Option<Box<dyn FunctionPass + Send + Sync>> {
        self.passes.insert(pass.name(), pass)
    }

    /// Look up a pass by name.
    pub fn get(&self, name: &str) -> Option<&(dyn FunctionPass + Send + Sync)> {
        self.passes.get(name).map(Box::as_ref)
    }

    /// Run the pass registered under `name` over a module.
    pub fn run(
        &self,
        name: &str,
        module: &Module,
        ctx: &mut PassContext<'_>,
    ) -> Result<Module, PassError> {
        let Some(pass) = self.get(name) else {
            return Err(PassError::UnknownPass(name.to_owned()));
        };
        pass.run(module, ctx).map_err(PassError::Failed)
    }

    /// Registered pass names, sorted for stable listings.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.passes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

/// Specialize symbolic tensor shapes to constants.
///
/// For every function: fold each dimension expression through the
/// substitution table, rewrite the expressions around the folded dims
/// (identity-preserving), then remove bindings and parameters nothing
/// references anymore. Unresolved dimensions follow the configured
/// [`UnresolvedPolicy`].
pub struct ReplaceDynamicToStatic {
    table: SharedSubstitutionTable,
    policy: UnresolvedPolicy,
}

impl ReplaceDynamicToStatic {
    /// Registry name; stable across releases.
    pub const NAME: &'static str = "ReplaceDynamicToStatic";

    /// Create the pass with the default lenient policy.
    pub fn new(table: SharedSubstitutionTable) -> Self {
        Self::with_policy(table, UnresolvedPolicy::default())
    }

    /// Create the pass with an explicit unresolved-dimension policy.
    pub fn with_policy(table: SharedSubstitutionTable, policy: UnresolvedPolicy) -> Self {
        ReplaceDynamicToStatic { table, policy }
    }
}

impl FunctionPass for ReplaceDynamicToStatic {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[tracing::instrument(level = "debug", skip_all, fields(pass = Self::NAME))]
    fn run(&self, module: &Module, ctx: &mut PassContext<'_>) -> Result<Module, ErrorGuaranteed> {
        let mut functions = Vec::with_capacity(module.functions.len());
        for func in &module.functions {
            let rewritten = ShapeRewriter::new(
                ctx.arena,
                ctx.interner,
                &self.table,
                self.policy,
                ctx.diagnostics,
            )
            .rewrite_function(func);

            let rewritten = match rewritten {
                Ok(f) => f,
                Err(err) => {
                    let diag = err.to_diagnostic(ctx.interner);
                    return Err(ctx.diagnostics.emit_error(diag));
                }
            };

            let cleaned = remove_unused(ctx.arena, &rewritten);
            debug!(
                function = ctx.interner.try_lookup(func.name).unwrap_or("<unknown>"),
                bindings_removed = rewritten.bindings.len() - cleaned.bindings.len(),
                params_removed = rewritten.params.len() - cleaned.params.len(),
                "specialized function"
            );
            functions.push(cleaned);
        }

        let result = Module::new(functions);
        #[cfg(debug_assertions)]
        crate::validate(ctx.arena, &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use weft_diagnostic::ErrorCode;
    use weft_ir::{
        Binding, DType, DimKind, ExprId, ExprKind, Function, Param, Span, Ty,
    };

    use super::*;
    use crate::SubstitutionTable;

    /// Module under test: `fn main(x: tensor<f32, 1>, n: i64)` with
    /// `y = reshape(x, [n, n + 1]); return y`.
    ///
    /// Each textual occurrence of `n` is its own node with its own span,
    /// the way a frontend would build it.
    fn dynamic_module(arena: &mut GraphArena, interner: &StringInterner) -> Module {
        let n = interner.intern("n");
        let first_n = arena.push_dim(DimKind::Var(n), Span::new(30, 31));
        let second_n = arena.push_dim(DimKind::Var(n), Span::new(33, 34));
        let one = arena.push_dim(DimKind::Const(1), Span::new(37, 38));
        let n_plus_1 = arena.push_dim(DimKind::Add(second_n, one), Span::new(33, 38));
        let range = arena.push_dim_list(&[first_n, n_plus_1]);
        let shape = arena.push_expr(ExprKind::Shape(range), Span::new(29, 39));

        let x = arena.push_expr(ExprKind::Var(interner.intern("x")), Span::new(26, 27));
        let args = arena.push_expr_list(&[x, shape]);
        let reshape = arena.push_expr(
            ExprKind::Call {
                op: interner.intern("reshape"),
                args,
            },
            Span::new(18, 40),
        );

        let y = interner.intern("y");
        let result = arena.push_expr(ExprKind::Var(y), Span::new(46, 47));

        Module::new(vec![Function {
            name: interner.intern("main"),
            params: vec![
                Param::new(
                    interner.intern("x"),
                    Ty::Tensor {
                        dtype: DType::F32,
                        rank: 1,
                    },
                    Span::new(8, 9),
                ),
                Param::new(n, Ty::I64, Span::new(11, 12)),
            ],
            bindings: vec![Binding::new(y, reshape, Span::new(14, 38))],
            result,
            span: Span::new(0, 48),
        }])
    }

    fn shape_dim_values(arena: &GraphArena, id: ExprId) -> Vec<Option<i64>> {
        let ExprKind::Shape(range) = *arena.kind(id) else {
            panic!("expected a shape expression, got {:?}", arena.kind(id));
        };
        arena
            .get_dim_list(range)
            .iter()
            .map(|&dim| match *arena.dim_kind(dim) {
                DimKind::Const(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pass_name_is_stable() {
        let pass = ReplaceDynamicToStatic::new(SharedSubstitutionTable::default());
        assert_eq!(pass.name(), "ReplaceDynamicToStatic");
    }

    #[test]
    fn test_end_to_end_specialization() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();
        let module = dynamic_module(&mut arena, &interner);

        let table = SubstitutionTable::from_pairs(&interner, [("n", 8)]);
        let pass = ReplaceDynamicToStatic::new(table.into());
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);
        let Ok(specialized) = pass.run(&module, &mut ctx) else {
            panic!("fully mapped module must specialize");
        };

        let func = &specialized.functions[0];
        // The now-constant dimension parameter is gone; the tensor stays.
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.params[0].name, interner.intern("x"));

        // The reshape call now carries the static shape [8, 9].
        let ExprKind::Call { args, .. } = *arena.kind(func.bindings[0].value) else {
            panic!("binding must still be a call");
        };
        let args = arena.get_expr_list(args).to_vec();
        assert_eq!(shape_dim_values(&arena, args[1]), vec![Some(8), Some(9)]);

        assert_eq!(queue.flush().len(), 0);
    }

    #[test]
    fn test_lenient_policy_keeps_dynamic_module_intact() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();
        let module = dynamic_module(&mut arena, &interner);
        let original_binding = module.functions[0].bindings[0].value;

        let pass = ReplaceDynamicToStatic::new(SharedSubstitutionTable::default());
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);
        let Ok(kept) = pass.run(&module, &mut ctx) else {
            panic!("lenient policy must not fail");
        };

        let func = &kept.functions[0];
        // Nothing folded, so the binding keeps its id and `n` stays live.
        assert_eq!(func.bindings[0].value, original_binding);
        assert_eq!(func.params.len(), 2);
        // One warning per unresolved occurrence of `n`.
        assert_eq!(queue.warning_count(), 2);
        let diags = queue.flush();
        assert!(diags.iter().all(|d| d.code == ErrorCode::W0401));
        // Warnings name the function whose shape stayed dynamic.
        assert!(diags[0].notes.iter().any(|n| n.contains("`main`")));
    }

    #[test]
    fn test_strict_policy_fails_with_diagnostic() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();
        let module = dynamic_module(&mut arena, &interner);

        let pass = ReplaceDynamicToStatic::with_policy(
            SharedSubstitutionTable::default(),
            UnresolvedPolicy::Fail,
        );
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);

        assert!(pass.run(&module, &mut ctx).is_err());
        assert!(queue.has_errors().is_some());
        let diags = queue.flush();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, ErrorCode::E0403);
        assert!(diags[0].message.contains("`n`"));
    }

    #[test]
    fn test_division_by_zero_aborts_with_diagnostic() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();

        let five = arena.push_dim(DimKind::Const(5), Span::DUMMY);
        let zero = arena.push_dim(DimKind::Const(0), Span::new(12, 17));
        let div = arena.push_dim(DimKind::FloorDiv(five, zero), Span::new(10, 17));
        let range = arena.push_dim_list(&[div]);
        let result = arena.push_expr(ExprKind::Shape(range), Span::new(9, 18));
        let module = Module::new(vec![Function {
            name: interner.intern("main"),
            params: Vec::new(),
            bindings: Vec::new(),
            result,
            span: Span::new(0, 19),
        }]);

        let pass = ReplaceDynamicToStatic::new(SharedSubstitutionTable::default());
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);

        assert!(pass.run(&module, &mut ctx).is_err());
        let diags = queue.flush();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, ErrorCode::E0401);
    }

    #[test]
    fn test_static_module_runs_clean() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();

        let two = arena.push_dim(DimKind::Const(2), Span::DUMMY);
        let range = arena.push_dim_list(&[two]);
        let result = arena.push_expr(ExprKind::Shape(range), Span::DUMMY);
        let module = Module::new(vec![Function {
            name: interner.intern("main"),
            params: Vec::new(),
            bindings: Vec::new(),
            result,
            span: Span::DUMMY,
        }]);

        let table = SubstitutionTable::from_pairs(&interner, [("unused", 3)]);
        let pass = ReplaceDynamicToStatic::new(table.into());
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);
        let Ok(out) = pass.run(&module, &mut ctx) else {
            panic!("static module must run clean");
        };

        assert_eq!(out.functions[0].result, result);
        assert_eq!(queue.flush().len(), 0);
    }

    #[test]
    fn test_registry_dispatches_by_name() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();
        let module = dynamic_module(&mut arena, &interner);
        let table = SubstitutionTable::from_pairs(&interner, [("n", 8)]);

        let mut registry = PassRegistry::new();
        registry.register(Box::new(ReplaceDynamicToStatic::new(table.into())));
        assert_eq!(registry.names(), vec!["ReplaceDynamicToStatic"]);
        assert!(registry.get("ReplaceDynamicToStatic").is_some());

        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);
        let ran = registry.run("ReplaceDynamicToStatic", &module, &mut ctx);
        assert!(ran.is_ok());
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        let interner = StringInterner::new();
        let mut arena = GraphArena::new();
        let mut queue = DiagnosticQueue::new();
        let module = Module::default();
        let registry = PassRegistry::new();
        let mut ctx = PassContext::new(&mut arena, &interner, &mut queue);

        assert_eq!(
            registry.run("NoSuchPass", &module, &mut ctx),
            Err(PassError::UnknownPass("NoSuchPass".to_owned()))
        );
    }

    #[test]
    fn test_registry_replaces_same_name() {
        let mut registry = PassRegistry::new();
        let first = registry.register(Box::new(ReplaceDynamicToStatic::new(
            SharedSubstitutionTable::default(),
        )));
        assert!(first.is_none());
        let second = registry.register(Box::new(ReplaceDynamicToStatic::new(
            SharedSubstitutionTable::default(),
        )));
        assert!(second.is_some());
        assert_eq!(registry.len(), 1);
    }
}
