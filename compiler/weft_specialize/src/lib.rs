//! Shape specialization for the Weft compiler.
//!
//! A tensor graph usually arrives with symbolic dimensions: `batch`,
//! `seq_len`, names whose values are only known at deployment time. Once
//! those values exist, specializing the graph to them unlocks static
//! memory planning and kernel selection. This crate performs that
//! specialization:
//!
//! ```text
//! Module ──ReplaceDynamicToStatic──▸ Module
//!             │
//!             ├── DimFolder       resolve variables, fold arithmetic
//!             ├── ShapeRewriter   rebuild only the expressions that changed
//!             └── remove_unused   drop bindings and params folding orphaned
//! ```
//!
//! # Identity preservation
//!
//! Every rewrite is identity-preserving at the node level: an expression
//! or dimension that does not change folds to its own arena id. Callers
//! compare ids to detect whether anything happened, and an already-static
//! module costs one traversal with zero allocation.
//!
//! # Unresolved dimensions
//!
//! A symbolic dimension missing from the [`SubstitutionTable`] is not an
//! error by default: the lenient policy records a warning and leaves the
//! dimension symbolic, so partial tables specialize what they can. The
//! strict policy ([`UnresolvedPolicy::Fail`]) turns the first miss into an
//! error diagnostic. Division by zero and unfoldable operators are always
//! fatal.

mod fold;
mod pass;
mod remove_unused;
mod rewrite;
mod subst;
mod validate;

pub use fold::{DimFolder, FoldError};
pub use pass::{FunctionPass, PassContext, PassError, PassRegistry, ReplaceDynamicToStatic};
pub use remove_unused::remove_unused;
pub use rewrite::ShapeRewriter;
pub use subst::{SharedSubstitutionTable, SubstitutionTable, UnresolvedPolicy};
pub use validate::validate;
