//! Lowered IR instructions.
//!
//! Function bodies are flat SSA: each instruction defines at most one value,
//! named by [`ValueId`], and may only read values defined earlier in the
//! body. [`Inst::Ret`] is the only terminator and must be the final
//! instruction. The verifier enforces both rules.

use std::fmt;

use crate::DeclKey;

// ── ID newtype ──────────────────────────────────────────────────────

/// Value ID within one lowered function.
///
/// Each `ValueId` names a unique SSA value within a single
/// [`LirFunction`](crate::LirFunction). IDs are allocated sequentially
/// starting from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    /// Create a new value ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

// ── Instructions ────────────────────────────────────────────────────

/// A single instruction in a lowered function body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Inst {
    /// Materialize an integer constant.
    IntConst { dst: ValueId, value: i64 },

    /// Materialize a reference to a function by its declaration key.
    ///
    /// The reference is resolved against the module at call time; holding
    /// one never implies ownership of the referenced body.
    FnRef { dst: ValueId, callee: DeclKey },

    /// Call a previously materialized function value.
    Apply {
        dst: ValueId,
        callee: ValueId,
        args: Vec<ValueId>,
    },

    /// Aggregate values into a tuple or struct.
    Aggregate { dst: ValueId, elems: Vec<ValueId> },

    /// Return from the function. Terminator; must be the last instruction.
    Ret { value: Option<ValueId> },
}

impl Inst {
    /// The value defined by this instruction, if any.
    ///
    /// Every instruction except the terminator defines exactly one value.
    pub fn defined_value(&self) -> Option<ValueId> {
        match self {
            Inst::IntConst { dst, .. }
            | Inst::FnRef { dst, .. }
            | Inst::Apply { dst, .. }
            | Inst::Aggregate { dst, .. } => Some(*dst),
            Inst::Ret { .. } => None,
        }
    }

    /// All values read by this instruction.
    pub fn used_values(&self) -> Vec<ValueId> {
        match self {
            Inst::IntConst { .. } | Inst::FnRef { .. } => vec![],
            Inst::Apply { callee, args, .. } => {
                let mut used = Vec::with_capacity(args.len() + 1);
                used.push(*callee);
                used.extend_from_slice(args);
                used
            }
            Inst::Aggregate { elems, .. } => elems.clone(),
            Inst::Ret { value } => value.iter().copied().collect(),
        }
    }

    /// Check if this instruction ends the function body.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Inst::Ret { .. })
    }

    /// The referenced declaration key, for function references.
    pub fn callee_key(&self) -> Option<DeclKey> {
        match self {
            Inst::FnRef { callee, .. } => Some(*callee),
            _ => None,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
