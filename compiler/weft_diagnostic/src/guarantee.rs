//! Type-level proof that an error was emitted.
//!
//! Returning `Result<T, ErrorGuaranteed>` makes "failed but forgot to
//! report anything" unrepresentable: the only way to construct the proof is
//! through the diagnostic queue's error-emitting methods.

use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Zero-sized; carry it instead of a boolean "had errors" flag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Construct the proof. Only the queue's emit paths may call this.
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Construct from an error count, `None` when the count is zero.
    pub fn from_error_count(count: usize) -> Option<Self> {
        if count > 0 {
            Some(ErrorGuaranteed(()))
        } else {
            None
        }
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
