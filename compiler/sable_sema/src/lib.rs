//! Sable semantic context.
//!
//! This crate is the substrate the lowered IR borrows from:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The declaration table (`Decl` / `DeclId`)
//! - The interned type pool (`TypeData` / `TypeIdx`)
//! - [`SemaContext`], the façade that owns all of the above
//!
//! # Design Philosophy
//!
//! - **Intern everything**: strings become `Name(u32)`, types become
//!   `TypeIdx(u32)`; equality is an integer compare.
//! - **Handles, not pointers**: every cross-reference is a `u32` newtype
//!   into a table owned by the context.
//! - **`&self` mutation**: the context is borrowed for the whole lifetime of
//!   a lowered module, so interning goes through interior mutability rather
//!   than `&mut self`.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod context;
mod decl;
mod interner;
mod name;
mod span;
mod types;

pub use context::SemaContext;
pub use decl::{Decl, DeclId, DeclKind};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
pub use types::{TypeData, TypeIdx};
