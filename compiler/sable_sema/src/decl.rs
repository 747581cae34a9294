//! The declaration table.
//!
//! Declarations are the source-level entities lowering starts from. The
//! table hands out stable [`DeclId`] handles; the records themselves are
//! small `Copy` values, so lookups return them by value.

use std::fmt;

use parking_lot::RwLock;

use crate::{Name, Span};

/// Identifies a declaration in the semantic context.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    /// Create from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DeclId(raw)
    }

    /// Get the index into the declaration table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// What kind of source entity a declaration is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKind {
    /// A function declaration.
    Func,
    /// A struct declaration.
    Struct,
}

/// A source-level declaration record.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Decl {
    /// The declared name.
    pub name: Name,
    /// Where the declaration appears in source.
    pub span: Span,
    /// What kind of entity it declares.
    pub kind: DeclKind,
}

/// Append-only declaration storage.
///
/// Wrapped by [`SemaContext`](crate::SemaContext); not exposed directly.
pub(crate) struct DeclTable {
    decls: RwLock<Vec<Decl>>,
}

impl DeclTable {
    pub(crate) fn new() -> Self {
        DeclTable {
            decls: RwLock::new(Vec::new()),
        }
    }

    /// Record a declaration and return its id.
    pub(crate) fn declare(&self, decl: Decl) -> DeclId {
        let mut guard = self.decls.write();
        let raw = u32::try_from(guard.len())
            .unwrap_or_else(|_| panic!("declaration count exceeds u32::MAX"));
        guard.push(decl);
        DeclId::from_raw(raw)
    }

    /// Look up a declaration record.
    ///
    /// # Panics
    /// Panics if `id` is out of range for this table.
    #[track_caller]
    pub(crate) fn get(&self, id: DeclId) -> Decl {
        self.decls.read()[id.index()]
    }

    pub(crate) fn len(&self) -> usize {
        self.decls.read().len()
    }
}
