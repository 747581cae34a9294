//! Type-level proof that an error was emitted.

use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Cannot be constructed outside this crate. Holding one guarantees a queue
/// recorded an error, so a phase returning `Result<T, ErrorGuaranteed>`
/// cannot fail without having reported why.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Produce a guarantee iff `count` is non-zero.
    pub(crate) fn from_error_count(count: usize) -> Option<ErrorGuaranteed> {
        (count > 0).then_some(ErrorGuaranteed(()))
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
