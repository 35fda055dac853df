use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: `E####`/`W####` where the first digit indicates the phase:
/// - x4xx: Shape specialization
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Shape specialization (x4xx)
    /// Division by zero while folding a shape dimension
    E0401,
    /// Unsupported dimension expression kind in a shape
    E0402,
    /// Symbolic dimension required but absent from the substitution table
    /// (strict mode)
    E0403,
    /// Symbolic dimension absent from the substitution table, left symbolic
    W0401,

    // Internal (E9xxx)
    /// Error limit reached, remaining diagnostics suppressed
    E9001,
}

impl ErrorCode {
    /// String representation for display and searchability.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0401 => "E0401",
            ErrorCode::E0402 => "E0402",
            ErrorCode::E0403 => "E0403",
            ErrorCode::W0401 => "W0401",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a warning code (Wxxx range).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
