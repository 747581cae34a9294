//! Diagnostic queue for collecting and ordering diagnostics.
//!
//! Phases push diagnostics in whatever order they discover them; `flush`
//! hands them back sorted by source position so reports read
//! top-to-bottom regardless of traversal order.

use crate::{Diagnostic, ErrorGuaranteed};

/// Queue for collecting and ordering diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiagnosticQueue {
    /// Collected diagnostics, in emission order.
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notes), across the queue's lifetime.
    error_count: usize,
}

impl DiagnosticQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic to the queue.
    pub fn add(&mut self, diag: Diagnostic) {
        if diag.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
    }

    /// Add an error diagnostic, returning proof that an error was emitted.
    ///
    /// Debug-panics if `diag` does not have error severity.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error requires error severity");
        self.error_count += 1;
        self.diagnostics.push(diag);
        // The count was just incremented, so the proof always exists.
        ErrorGuaranteed::from_error_count(self.error_count)
            .unwrap_or_else(|| panic!("error count is zero after emit_error"))
    }

    /// Number of errors emitted over this queue's lifetime.
    ///
    /// Not reset by [`flush`](Self::flush); the count answers "did this
    /// compilation fail", not "how many are pending".
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Proof that at least one error was emitted, if any was.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Number of pending diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if no diagnostics are pending.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate pending diagnostics without consuming them.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Take all pending diagnostics, sorted by primary span position then
    /// code. Diagnostics without a primary span sort last. The error count
    /// survives the flush.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.sort_by_key(|d| (d.primary_span().map_or(u32::MAX, |s| s.start), d.code.as_str()));
        out
    }
}
