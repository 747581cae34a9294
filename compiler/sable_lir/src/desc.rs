//! Type descriptors.
//!
//! A descriptor captures the lowering-relevant shape of one type: calling
//! information for function types, field layout for compound types.
//! Primitive types need neither and never get a descriptor.
//!
//! Layout follows a fixed 64-bit model (8-byte words, natural alignment).
//! Descriptors are computed once per type and cached on the module; see
//! [`ModuleBuilder::ensure_desc`](crate::ModuleBuilder::ensure_desc).

use bitflags::bitflags;
use sable_sema::{SemaContext, TypeData, TypeIdx};
use smallvec::SmallVec;
use tracing::trace;

/// Word size of the layout model, in bytes.
const WORD_SIZE: u64 = 8;

/// Largest result size passed back in registers, in bytes.
const MAX_DIRECT_RESULT: u64 = 2 * WORD_SIZE;

bitflags! {
    /// Calling properties of a function type.
    ///
    /// All flags are derivable from the signature; the descriptor caches
    /// them so call lowering does not re-derive per call site.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DescFlags: u32 {
        /// The result is returned through memory, not registers.
        const INDIRECT_RESULT = 1 << 0;
        /// The result is unit; calls produce no meaningful value.
        const UNIT_RESULT = 1 << 1;
        /// The function takes no parameters.
        const NO_PARAMS = 1 << 2;
    }
}

// Serialized as the raw bit pattern. Unknown bits from a stale cache are
// dropped on the floor rather than rejected.
#[cfg(feature = "cache")]
impl serde::Serialize for DescFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

#[cfg(feature = "cache")]
impl<'de> serde::Deserialize<'de> for DescFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::Deserialize::deserialize(deserializer).map(DescFlags::from_bits_truncate)
    }
}

/// Descriptor for a function type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FnTypeDesc {
    /// Parameter types, in call order.
    pub params: SmallVec<[TypeIdx; 4]>,
    /// Result type.
    pub result: TypeIdx,
    /// Cached calling properties.
    pub flags: DescFlags,
}

impl FnTypeDesc {
    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Whether the result is returned through memory.
    pub fn has_indirect_result(&self) -> bool {
        self.flags.contains(DescFlags::INDIRECT_RESULT)
    }
}

/// One field of a compound type's layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDesc {
    /// The field's type.
    pub ty: TypeIdx,
    /// Byte offset from the start of the aggregate.
    pub offset: u64,
}

/// Descriptor for a tuple or struct type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CompoundTypeDesc {
    /// Field layout, in declaration order.
    pub fields: Vec<FieldDesc>,
    /// Total size in bytes, padded to alignment.
    pub size: u64,
    /// Alignment in bytes. At least 1, even for empty aggregates.
    pub align: u64,
}

impl CompoundTypeDesc {
    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Byte offset of field `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn field_offset(&self, index: usize) -> u64 {
        self.fields[index].offset
    }
}

/// Descriptor for one type used in a module.
///
/// Call sites almost always know statically which variant they expect, so
/// the module exposes narrowing accessors
/// ([`fn_desc`](crate::LirModule::fn_desc),
/// [`compound_desc`](crate::LirModule::compound_desc)) alongside the plain
/// [`desc`](crate::LirModule::desc) probe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeDesc {
    /// Calling information for a function type.
    Fn(FnTypeDesc),
    /// Memory layout for a tuple or struct type.
    Compound(CompoundTypeDesc),
}

impl TypeDesc {
    /// This descriptor as a function descriptor, if it is one.
    pub fn as_fn(&self) -> Option<&FnTypeDesc> {
        match self {
            TypeDesc::Fn(desc) => Some(desc),
            TypeDesc::Compound(_) => None,
        }
    }

    /// This descriptor as a compound descriptor, if it is one.
    pub fn as_compound(&self) -> Option<&CompoundTypeDesc> {
        match self {
            TypeDesc::Fn(_) => None,
            TypeDesc::Compound(desc) => Some(desc),
        }
    }
}

/// Compute the descriptor for `ty`.
///
/// # Panics
///
/// Panics if `ty` is neither function- nor compound-shaped.
#[track_caller]
pub fn compute_desc(ctx: &SemaContext, ty: TypeIdx) -> TypeDesc {
    match ctx.type_data(ty) {
        TypeData::Fn { params, result } => {
            TypeDesc::Fn(compute_fn_desc(ctx, &params, result))
        }
        TypeData::Tuple { elems } => {
            TypeDesc::Compound(compute_compound_desc(ctx, &elems))
        }
        TypeData::Struct { fields, .. } => {
            TypeDesc::Compound(compute_compound_desc(ctx, &fields))
        }
        _ => panic!("no descriptor for type {}", ctx.format_type(ty)),
    }
}

fn compute_fn_desc(ctx: &SemaContext, params: &[TypeIdx], result: TypeIdx) -> FnTypeDesc {
    let mut flags = DescFlags::empty();
    if result == TypeIdx::UNIT {
        flags |= DescFlags::UNIT_RESULT;
    }
    if layout_of(ctx, result).0 > MAX_DIRECT_RESULT {
        flags |= DescFlags::INDIRECT_RESULT;
    }
    if params.is_empty() {
        flags |= DescFlags::NO_PARAMS;
    }
    trace!(params = params.len(), ?flags, "computed function descriptor");
    FnTypeDesc {
        params: SmallVec::from_slice(params),
        result,
        flags,
    }
}

fn compute_compound_desc(ctx: &SemaContext, elems: &[TypeIdx]) -> CompoundTypeDesc {
    let mut fields = Vec::with_capacity(elems.len());
    let mut offset = 0u64;
    let mut align = 1u64;
    for &ty in elems {
        let (field_size, field_align) = layout_of(ctx, ty);
        offset = align_to(offset, field_align);
        fields.push(FieldDesc { ty, offset });
        offset += field_size;
        align = align.max(field_align);
    }
    let size = align_to(offset, align);
    trace!(fields = fields.len(), size, align, "computed compound descriptor");
    CompoundTypeDesc { fields, size, align }
}

/// Size and alignment of `ty` in bytes under the layout model.
fn layout_of(ctx: &SemaContext, ty: TypeIdx) -> (u64, u64) {
    match ctx.type_data(ty) {
        TypeData::Unit => (0, 1),
        TypeData::Bool => (1, 1),
        TypeData::Int | TypeData::Float => (WORD_SIZE, WORD_SIZE),
        // Pointer plus length.
        TypeData::Str => (2 * WORD_SIZE, WORD_SIZE),
        // Code pointer.
        TypeData::Fn { .. } => (WORD_SIZE, WORD_SIZE),
        TypeData::Tuple { elems } => {
            let desc = compute_compound_desc(ctx, &elems);
            (desc.size, desc.align)
        }
        TypeData::Struct { fields, .. } => {
            let desc = compute_compound_desc(ctx, &fields);
            (desc.size, desc.align)
        }
    }
}

fn align_to(offset: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}
