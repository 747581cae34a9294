//! Lowered IR for the Sable compiler.
//!
//! This crate provides:
//!
//! - **The module registry** ([`LirModule`]) — the root container owning
//!   every function lowered from one translation unit, keyed by
//!   [`DeclKey`], plus the per-type descriptor cache.
//!
//! - **Construction** ([`ModuleBuilder`]) — the only way to create a
//!   module and the only holder of structural mutation. Lowering drives
//!   the builder; everything after lowering reads the finished module.
//!
//! - **Function bodies** ([`LirFunction`], [`Inst`], [`ValueId`]) — flat
//!   SSA instruction lists with a per-value type table.
//!
//! - **Type descriptors** ([`TypeDesc`], [`FnTypeDesc`],
//!   [`CompoundTypeDesc`]) — cached calling and layout information,
//!   computed once per type under a fixed 64-bit model.
//!
//! # Design
//!
//! The module is the sole owner of lowered artifacts. Functions reference
//! each other by [`DeclKey`] and resolve through the module, never by
//! pointer, so function identity survives table growth and serialization.
//! The module borrows the longer-lived `SemaContext` rather than owning
//! it; every name, declaration, and type in the module is an index into
//! that context.
//!
//! Registry misuse (looking up a key that was never defined, defining a
//! key twice) is a lowering bug and panics with the offending key.
//! Soft probes ([`LirModule::has_function`], [`LirModule::desc`]) exist
//! for the call sites where absence is an expected answer, and the
//! verifier ([`LirModule::verify`]) reports structural damage through the
//! diagnostic queue without aborting.
//!
//! # Crate Dependencies
//!
//! `sable_lir` depends on `sable_sema` (for `SemaContext`, `Name`,
//! `Span`, and the type pool) and `sable_diagnostic` (for verifier
//! findings). No backend dependency; code generation consumes the module
//! from its own crate.

mod builder;
mod desc;
mod function;
mod inst;
mod key;
mod module;
mod print;
#[cfg(test)]
mod test_helpers;
mod verify;

pub use builder::ModuleBuilder;
pub use desc::{
    CompoundTypeDesc, DescFlags, FieldDesc, FnTypeDesc, TypeDesc, compute_desc,
};
pub use function::LirFunction;
pub use inst::{Inst, ValueId};
pub use key::DeclKey;
pub use module::LirModule;
