//! Diagnostic system for structured error reporting.
//!
//! The shared channel every Sable phase reports through:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels and notes (why it's wrong)
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error went
//! through a queue. Code that claims to have reported a failure can return
//! it, making silently-swallowed error paths unrepresentable.

mod diagnostic;
mod error_code;
mod guarantee;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::DiagnosticQueue;
