//! Interned types.
//!
//! `TypeIdx` is THE canonical type representation: a 32-bit index into the
//! context's type pool. Primitive types occupy fixed indices so they never
//! need pool access; everything else is interned on demand with structural
//! dedup, making type equality an O(1) index comparison.

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::DeclId;

/// A 32-bit index into the type pool.
///
/// Types are compared by index equality, never by structural comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeIdx(u32);

impl TypeIdx {
    // Primitive types, pre-interned at pool creation.

    /// The unit type `()`.
    pub const UNIT: Self = Self(0);
    /// The `bool` type.
    pub const BOOL: Self = Self(1);
    /// The `int` type (64-bit signed integer).
    pub const INT: Self = Self(2);
    /// The `float` type (64-bit floating point).
    pub const FLOAT: Self = Self(3);
    /// The `str` type (UTF-8 string).
    pub const STR: Self = Self(4);

    /// First index for dynamically interned types.
    pub const FIRST_DYNAMIC: u32 = 5;

    /// Create an index from a raw u32 value.
    ///
    /// The caller must ensure the index is valid in the pool.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index into the pool's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a primitive type (pre-interned).
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    /// Get the human-readable name for primitive types.
    ///
    /// Returns `None` for dynamic types, which need the pool to render.
    #[inline]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("()"),
            1 => Some("bool"),
            2 => Some("int"),
            3 => Some("float"),
            4 => Some("str"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UNIT => write!(f, "TypeIdx::UNIT"),
            Self::BOOL => write!(f, "TypeIdx::BOOL"),
            Self::INT => write!(f, "TypeIdx::INT"),
            Self::FLOAT => write!(f, "TypeIdx::FLOAT"),
            Self::STR => write!(f, "TypeIdx::STR"),
            _ => write!(f, "TypeIdx({})", self.0),
        }
    }
}

impl fmt::Display for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "type#{}", self.0),
        }
    }
}

// TypeIdx must stay pointer-half sized; it is embedded in every instruction.
const _: () = assert!(std::mem::size_of::<TypeIdx>() == 4);

/// Content of an interned type.
///
/// Stored once in the pool; user code holds [`TypeIdx`] handles and asks the
/// context for content only when shape matters.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeData {
    /// The unit type.
    Unit,
    /// The boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// UTF-8 string.
    Str,
    /// A function type.
    Fn {
        /// Parameter types, in declaration order.
        params: Vec<TypeIdx>,
        /// Result type.
        result: TypeIdx,
    },
    /// An anonymous tuple type.
    Tuple {
        /// Element types, in positional order.
        elems: Vec<TypeIdx>,
    },
    /// A nominal struct type.
    Struct {
        /// The declaration this type belongs to.
        decl: DeclId,
        /// Field types, in declaration order.
        fields: Vec<TypeIdx>,
    },
}

impl TypeData {
    /// Check if this is a function type.
    #[inline]
    pub fn is_fn(&self) -> bool {
        matches!(self, TypeData::Fn { .. })
    }

    /// Check if this is a compound (tuple or struct) type.
    #[inline]
    pub fn is_compound(&self) -> bool {
        matches!(self, TypeData::Tuple { .. } | TypeData::Struct { .. })
    }
}

/// Storage shared under the pool's lock.
struct PoolInner {
    /// Type contents, indexed by `TypeIdx::index()`.
    types: Vec<TypeData>,
    /// Structural dedup map.
    dedup: FxHashMap<TypeData, TypeIdx>,
}

/// Dedup-interning type pool.
///
/// Wrapped by [`SemaContext`](crate::SemaContext); not exposed directly.
pub(crate) struct TypePool {
    inner: RwLock<PoolInner>,
}

impl TypePool {
    /// Create a pool with the primitives pre-interned at their fixed
    /// indices.
    pub(crate) fn new() -> Self {
        let primitives = [
            TypeData::Unit,
            TypeData::Bool,
            TypeData::Int,
            TypeData::Float,
            TypeData::Str,
        ];
        let mut inner = PoolInner {
            types: Vec::with_capacity(64),
            dedup: FxHashMap::default(),
        };
        for (raw, data) in (0u32..).zip(primitives) {
            inner.dedup.insert(data.clone(), TypeIdx::from_raw(raw));
            inner.types.push(data);
        }
        debug_assert_eq!(inner.types.len(), TypeIdx::FIRST_DYNAMIC as usize);
        TypePool {
            inner: RwLock::new(inner),
        }
    }

    /// Intern a type, returning its index.
    ///
    /// Structurally equal types always intern to the same index.
    ///
    /// # Panics
    /// Panics if the pool exceeds `u32::MAX` entries.
    pub(crate) fn intern(&self, data: TypeData) -> TypeIdx {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&idx) = guard.dedup.get(&data) {
                return idx;
            }
        }

        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.dedup.get(&data) {
            return idx;
        }

        let raw = u32::try_from(guard.types.len())
            .unwrap_or_else(|_| panic!("type pool exceeds u32::MAX entries"));
        let idx = TypeIdx::from_raw(raw);
        guard.types.push(data.clone());
        guard.dedup.insert(data, idx);
        idx
    }

    /// Get a copy of the content for an index.
    ///
    /// # Panics
    /// Panics if `idx` is out of range for this pool.
    #[track_caller]
    pub(crate) fn get(&self, idx: TypeIdx) -> TypeData {
        self.inner.read().types[idx.index()].clone()
    }

    /// Check the shape of an index without cloning its content.
    ///
    /// # Panics
    /// Panics if `idx` is out of range for this pool.
    #[track_caller]
    pub(crate) fn is_fn(&self, idx: TypeIdx) -> bool {
        self.inner.read().types[idx.index()].is_fn()
    }

    /// See [`is_fn`](Self::is_fn).
    ///
    /// # Panics
    /// Panics if `idx` is out of range for this pool.
    #[track_caller]
    pub(crate) fn is_compound(&self, idx: TypeIdx) -> bool {
        self.inner.read().types[idx.index()].is_compound()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().types.len()
    }
}
