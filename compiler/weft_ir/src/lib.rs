//! Weft IR - Graph Intermediate Representation Types
//!
//! This crate contains the core data structures for Weft's graph pipeline:
//! - Spans for locating nodes in the textual graph form
//! - Names for interned identifiers
//! - Dimension expressions (`DimKind`) for symbolic tensor shapes
//! - Graph expressions (`ExprKind`) and the items that own them
//! - Arena allocation for both node families
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → `Name(u32)`
//! - **Flatten Everything**: No `Box<Expr>`, use `ExprId(u32)` / `DimId(u32)`
//!   indices into [`GraphArena`]; child lists are flattened ranges
//!
//! Arenas are push-only, so a node can only reference nodes created before
//! it — acyclicity is structural, not checked.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod dim;
mod expr;
mod interner;
mod item;
mod name;
mod span;

pub use arena::GraphArena;
pub use dim::{DimDisplay, DimId, DimKind, DimRange};
pub use expr::{DType, ExprId, ExprKind, ExprRange, Ty};
pub use interner::{SharedInterner, StringInterner};
pub use item::{Binding, Function, Module, Param};
pub use name::Name;
pub use span::Span;
