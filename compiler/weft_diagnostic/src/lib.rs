//! Diagnostic infrastructure for the Weft compiler.
//!
//! This crate defines how passes talk about problems: structured
//! [`Diagnostic`] values with labeled spans, stable [`ErrorCode`]s, and a
//! [`DiagnosticQueue`] that collects, deduplicates, and orders them for
//! presentation. Nothing here prints to the process output; callers decide
//! what to do with the flushed diagnostics.
//!
//! # `ErrorGuaranteed`
//!
//! [`ErrorGuaranteed`] is a zero-sized proof token: the only way to obtain
//! one is through the queue's error paths, so a function returning
//! `Result<T, ErrorGuaranteed>` can fail only if an error diagnostic was
//! actually recorded. This keeps "we reported it" and "we failed" in sync
//! by construction.
//!
//! # Error code ranges
//!
//! Codes are grouped by compiler phase; this crate carries the shape
//! specialization range (`04xx`) and the internal range (`9xxx`). Warning
//! codes start with `W`, error codes with `E`.

mod diagnostic;
mod error_code;
mod guarantee;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{too_many_errors, DiagnosticConfig, DiagnosticQueue};
