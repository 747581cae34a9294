//! Interned string identifier.

use std::fmt;

/// Interned string identifier.
///
/// A `Name` is an index into the context's [`StringInterner`]; two names
/// compare equal iff they intern the same string.
///
/// [`StringInterner`]: crate::StringInterner
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw u32 value.
    ///
    /// The caller must ensure the index came from the interner.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Name::EMPTY {
            write!(f, "Name::EMPTY")
        } else {
            write!(f, "Name({})", self.0)
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        let name = Name::from_raw(7);
        assert_eq!(name.raw(), 7);
        assert_eq!(name.index(), 7);
    }

    #[test]
    fn empty_is_default() {
        assert_eq!(Name::default(), Name::EMPTY);
        assert_eq!(Name::EMPTY.raw(), 0);
    }

    #[test]
    fn debug_formatting() {
        assert_eq!(format!("{:?}", Name::EMPTY), "Name::EMPTY");
        assert_eq!(format!("{:?}", Name::from_raw(3)), "Name(3)");
    }
}
