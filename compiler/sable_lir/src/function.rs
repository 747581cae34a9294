//! Lowered functions.

use sable_sema::{Name, Span, TypeIdx};

use crate::{Inst, ValueId};

/// A lowered function body.
///
/// Contains the flat SSA body plus the metadata later passes need: the
/// function's type, its source span, and the type of every value.
///
/// A `LirFunction` is owned exclusively by the module it is defined in; the
/// builder moves it in, and later passes mutate it in place through
/// [`LirModule::function_mut`](crate::LirModule::function_mut).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct LirFunction {
    /// The function's name. Identity is the module key, not the name.
    pub name: Name,
    /// The function's type. Function-shaped in any well-formed module.
    pub ty: TypeIdx,
    /// Where the originating declaration appears in source.
    pub span: Span,
    /// Instructions in execution order. Ends with `Ret` when well formed.
    pub body: Vec<Inst>,
    /// Type of each value, indexed by `ValueId::index()`.
    pub value_types: Vec<TypeIdx>,
}

impl LirFunction {
    /// Create a function with an empty body.
    pub fn new(name: Name, ty: TypeIdx, span: Span) -> Self {
        LirFunction {
            name,
            ty,
            span,
            body: Vec::new(),
            value_types: Vec::new(),
        }
    }

    /// Allocate a fresh value with the given type.
    ///
    /// Returns a [`ValueId`] that does not collide with any existing value
    /// in this function. The type is recorded in
    /// [`value_types`](Self::value_types).
    pub fn fresh_value(&mut self, ty: TypeIdx) -> ValueId {
        let id = u32::try_from(self.value_types.len())
            .unwrap_or_else(|_| panic!("value count exceeds u32::MAX"));
        self.value_types.push(ty);
        ValueId::new(id)
    }

    /// Append an instruction to the body.
    pub fn push(&mut self, inst: Inst) {
        self.body.push(inst);
    }

    /// Look up the type of a value.
    ///
    /// # Panics
    ///
    /// Panics if `value` was not allocated by this function.
    #[inline]
    #[track_caller]
    pub fn value_type(&self, value: ValueId) -> TypeIdx {
        debug_assert!(
            value.index() < self.value_types.len(),
            "ValueId {} out of bounds (have {} values)",
            value.raw(),
            self.value_types.len(),
        );
        self.value_types[value.index()]
    }

    /// Number of values allocated so far.
    pub fn value_count(&self) -> usize {
        self.value_types.len()
    }
}
