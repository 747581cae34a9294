//! Declaration keys.

use std::fmt;

use sable_sema::DeclId;

/// Identity of the source entity a lowered function was generated from.
///
/// The module maps keys to function bodies. Functions reference each other
/// through keys (a module lookup), never through ownership, so mutually
/// recursive functions cannot form an ownership cycle.
///
/// Ordering puts [`Toplevel`](DeclKey::Toplevel) first, then declarations
/// by table index. The module itself iterates in insertion order; key
/// ordering only matters for sorted collections built on top.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DeclKey {
    /// The synthesized identity for top-level statements.
    Toplevel,
    /// A source-level declaration.
    Decl(DeclId),
}

impl DeclKey {
    /// Check if this is the top-level key.
    #[inline]
    pub fn is_toplevel(self) -> bool {
        matches!(self, DeclKey::Toplevel)
    }

    /// The underlying declaration, if this is not the top-level key.
    #[inline]
    pub fn decl(self) -> Option<DeclId> {
        match self {
            DeclKey::Toplevel => None,
            DeclKey::Decl(id) => Some(id),
        }
    }
}

impl From<DeclId> for DeclKey {
    fn from(id: DeclId) -> Self {
        DeclKey::Decl(id)
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKey::Toplevel => write!(f, "@toplevel"),
            DeclKey::Decl(id) => write!(f, "decl#{}", id.raw()),
        }
    }
}
