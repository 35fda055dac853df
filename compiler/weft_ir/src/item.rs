//! Function and Module Types
//!
//! A module is a set of functions; a function body is a list of
//! let-bindings in dependency order followed by a result expression.
//! Expressions themselves live in the module's [`GraphArena`], so items
//! stay cheap to clone and compare.
//!
//! [`GraphArena`]: crate::GraphArena

use crate::{ExprId, Name, Span, Ty};

/// Parameter of a function.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Ty,
    pub span: Span,
}

impl Param {
    /// Create a parameter.
    pub fn new(name: Name, ty: Ty, span: Span) -> Self {
        Param { name, ty, span }
    }
}

/// A let-binding in a function body: `let var = value`.
///
/// Bindings appear in dependency order; a binding's value may only
/// reference parameters and earlier bindings.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct Binding {
    pub var: Name,
    pub value: ExprId,
    pub span: Span,
}

impl Binding {
    /// Create a binding.
    pub fn new(var: Name, value: ExprId, span: Span) -> Self {
        Binding { var, value, span }
    }
}

/// Function definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Function {
    pub name: Name,
    pub params: Vec<Param>,
    pub bindings: Vec<Binding>,
    /// Result expression; may reference parameters and any binding.
    pub result: ExprId,
    pub span: Span,
}

/// A module: the unit the pass pipeline operates on.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    /// Create a module from its functions.
    pub fn new(functions: Vec<Function>) -> Self {
        Module { functions }
    }

    /// Look up a function by name.
    pub fn function(&self, name: Name) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_function_lookup() {
        let f = Function {
            name: Name::from_raw(3),
            params: Vec::new(),
            bindings: Vec::new(),
            result: ExprId::INVALID,
            span: Span::DUMMY,
        };
        let module = Module::new(vec![f.clone()]);
        assert_eq!(module.function(Name::from_raw(3)), Some(&f));
        assert_eq!(module.function(Name::from_raw(4)), None);
    }
}
