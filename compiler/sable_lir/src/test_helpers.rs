//! Shared test utilities for module tests.
//!
//! Consolidates factory functions used across the `module`, `builder`,
//! `print`, and `verify` tests. Only compiled in test builds.

use sable_sema::{DeclId, DeclKind, SemaContext, Span, TypeIdx};

use crate::{Inst, LirFunction};

/// A fresh context with only the pre-interned primitives.
pub(crate) fn test_ctx() -> SemaContext {
    SemaContext::new()
}

/// Declare a function named `name` at a dummy span.
pub(crate) fn declare_fn(ctx: &SemaContext, name: &str) -> DeclId {
    ctx.declare(ctx.intern_name(name), Span::DUMMY, DeclKind::Func)
}

/// A `fn() -> ()` function whose body is a bare `ret`.
pub(crate) fn unit_fn(ctx: &SemaContext, name: &str) -> LirFunction {
    let ty = ctx.fn_type(&[], TypeIdx::UNIT);
    let mut func = LirFunction::new(ctx.intern_name(name), ty, Span::DUMMY);
    func.push(Inst::Ret { value: None });
    func
}

/// A `fn() -> int` function returning the constant `value`.
pub(crate) fn ret_const_fn(ctx: &SemaContext, name: &str, value: i64) -> LirFunction {
    let ty = ctx.fn_type(&[], TypeIdx::INT);
    let mut func = LirFunction::new(ctx.intern_name(name), ty, Span::DUMMY);
    let v = func.fresh_value(TypeIdx::INT);
    func.push(Inst::IntConst { dst: v, value });
    func.push(Inst::Ret { value: Some(v) });
    func
}
