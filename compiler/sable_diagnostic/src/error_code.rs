use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E4xxx: Lowered-IR verification errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lowered-IR Verification (E4xxx)
    /// Function registered with a non-function type
    E4001,
    /// Function body is empty or does not end with a terminator
    E4002,
    /// Terminator in the interior of a function body
    E4003,
    /// Operand used before it is defined
    E4004,
    /// Reference to a function not registered in the module
    E4005,
    /// Cached type descriptor does not match the type's shape
    E4006,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Check if this is a lowered-IR verification error (E4xxx range).
    pub fn is_verifier_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Get the numeric code as a string (e.g., "E4001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E9001 => "E9001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_variant() {
        assert_eq!(ErrorCode::E4001.as_str(), "E4001");
        assert_eq!(ErrorCode::E9001.as_str(), "E9001");
    }

    #[test]
    fn display_uses_code() {
        assert_eq!(ErrorCode::E4005.to_string(), "E4005");
    }

    #[test]
    fn verifier_range_check() {
        assert!(ErrorCode::E4002.is_verifier_error());
        assert!(!ErrorCode::E9001.is_verifier_error());
    }
}
