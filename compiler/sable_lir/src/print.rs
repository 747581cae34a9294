//! Textual rendering of lowered modules.
//!
//! The printed form is for humans: compiler developers reading `dump`
//! output and tests asserting on structure. It is not a stable interchange
//! format and has no parser.

use std::fmt::{self, Write};

use sable_sema::SemaContext;

use crate::{DeclKey, Inst, LirFunction, LirModule};

/// Render `module` into `out`.
///
/// Keyed functions appear in definition order, then the top-level function.
/// Printing never mutates the module, so rendering twice without
/// intervening mutation produces identical text.
pub(crate) fn print_module(module: &LirModule<'_>, out: &mut impl Write) -> fmt::Result {
    let ctx = module.ctx();
    let mut first = true;
    for (key, func) in module.functions() {
        if !first {
            writeln!(out)?;
        }
        first = false;
        print_function(ctx, &render_key(ctx, key), func, out)?;
    }
    if module.has_toplevel_fn() {
        if !first {
            writeln!(out)?;
        }
        print_function(ctx, "@toplevel", module.toplevel_fn(), out)?;
    }
    Ok(())
}

fn print_function(
    ctx: &SemaContext,
    name: &str,
    func: &LirFunction,
    out: &mut impl Write,
) -> fmt::Result {
    writeln!(out, "fn {name} : {} {{", ctx.format_type(func.ty))?;
    for inst in &func.body {
        write!(out, "  ")?;
        print_inst(ctx, func, inst, out)?;
        writeln!(out)?;
    }
    writeln!(out, "}}")
}

fn print_inst(
    ctx: &SemaContext,
    func: &LirFunction,
    inst: &Inst,
    out: &mut impl Write,
) -> fmt::Result {
    match inst {
        Inst::IntConst { dst, value } => write!(out, "{dst} = int {value}")?,
        Inst::FnRef { dst, callee } => {
            write!(out, "{dst} = fnref {}", render_key(ctx, *callee))?;
        }
        Inst::Apply { dst, callee, args } => {
            write!(out, "{dst} = apply {callee}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{arg}")?;
            }
            write!(out, ")")?;
        }
        Inst::Aggregate { dst, elems } => {
            write!(out, "{dst} = aggregate (")?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{elem}")?;
            }
            write!(out, ")")?;
        }
        Inst::Ret { value: Some(v) } => write!(out, "ret {v}")?,
        Inst::Ret { value: None } => write!(out, "ret")?,
    }
    // Annotate the defined value's type when the function recorded one.
    // Malformed bodies may reference unallocated values; printing stays
    // total so broken modules can still be dumped.
    if let Some(dst) = inst.defined_value() {
        if let Some(&ty) = func.value_types.get(dst.index()) {
            write!(out, " : {}", ctx.format_type(ty))?;
        }
    }
    Ok(())
}

/// The printed name for a function key: `@name` for declarations,
/// `@toplevel` for the top-level slot.
pub(crate) fn render_key(ctx: &SemaContext, key: DeclKey) -> String {
    match key.decl() {
        Some(id) => format!("@{}", ctx.name_str(ctx.decl(id).name)),
        None => "@toplevel".to_owned(),
    }
}
