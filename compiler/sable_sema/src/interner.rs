//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. Interned strings are leaked, so
//! resolved `&str` references stay valid for the life of the process.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Interner exceeded capacity (over 4 billion strings).
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {} strings (0x{:X}), max is {} (0x{:X})",
                count,
                count,
                u32::MAX,
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Storage shared under the interner's lock.
struct InternInner {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::index()`.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Interning goes through `&self`; the single `RwLock` keeps the read path
/// (already-interned strings, all lookups) contention-free in the
/// build-then-read pipeline this crate serves.
pub struct StringInterner {
    inner: RwLock<InternInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let mut inner = InternInner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: &'static str = "";
        inner.map.insert(empty, 0);
        inner.strings.push(empty);
        StringInterner {
            inner: RwLock::new(inner),
        }
    }

    /// Try to intern a string, returning its [`Name`] or an error on
    /// overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.map.get(s) {
                return Ok(Name::from_raw(idx));
            }
        }

        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s) {
            return Ok(Name::from_raw(idx));
        }

        // Leak the string to get a 'static lifetime.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());

        let idx = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Ok(Name::from_raw(idx))
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    /// Use [`try_intern`](Self::try_intern) for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a [`Name`].
    ///
    /// The returned reference is `'static` because interned strings are
    /// leaked, never deallocated.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner and is out of range.
    pub fn resolve(&self, name: Name) -> &'static str {
        let guard = self.inner.read();
        guard.strings[name.index()]
    }

    /// Number of interned strings (including the pre-interned empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Check if the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_and_resolve() {
        let interner = StringInterner::new();

        let hello = interner.intern("hello");
        let world = interner.intern("world");
        let hello2 = interner.intern("hello");

        assert_eq!(hello, hello2);
        assert_ne!(hello, world);

        assert_eq!(interner.resolve(hello), "hello");
        assert_eq!(interner.resolve(world), "world");
    }

    #[test]
    fn empty_string_pre_interned() {
        let interner = StringInterner::new();
        assert!(interner.is_empty());

        let empty = interner.intern("");
        assert_eq!(empty, Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn resolved_str_outlives_guard() {
        let interner = StringInterner::new();
        let name = interner.intern("alpha");
        let s: &'static str = interner.resolve(name);
        // Interning more strings must not invalidate earlier resolutions.
        for i in 0..100 {
            interner.intern(&format!("filler{i}"));
        }
        assert_eq!(s, "alpha");
    }

    #[test]
    fn overflow_error_display() {
        let err = InternError::Overflow { count: 4_294_967_296 };
        let msg = err.to_string();
        assert!(msg.contains("exceeded capacity"));
        assert!(msg.contains("0x100000000"));
    }
}
